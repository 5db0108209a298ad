//! Derived financial indicators for a single company.

use serde::Serialize;

use crate::models::Company;

/// Ratios derived from a company's stored financials.
///
/// A ratio whose inputs are missing or whose denominator is not positive is
/// `None`; no field is ever NaN or infinite.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FinancialRatios {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profit_margin: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub revenue_growth: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roa: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub roe: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debt_to_equity: Option<f64>,
    pub performance_score: u32,
    pub export_presence: usize,
}

/// Points for a performance rating label. Unknown or absent labels score 0.
pub fn performance_points(rating: Option<&str>) -> u32 {
    match rating.map(|r| r.trim().to_lowercase()).as_deref() {
        Some("strong") => 80,
        Some("good") => 60,
        Some("medium") => 40,
        Some("developing") => 20,
        _ => 0,
    }
}

fn percent(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    ratio(numerator.map(|n| n * 100.0), denominator)
}

fn ratio(numerator: Option<f64>, denominator: Option<f64>) -> Option<f64> {
    let (n, d) = (numerator?, denominator?);
    if d > 0.0 && n.is_finite() && d.is_finite() {
        Some(n / d).filter(|r| r.is_finite())
    } else {
        None
    }
}

/// Compute [`FinancialRatios`] for `company`.
pub fn financial_ratios(company: &Company) -> FinancialRatios {
    let has_revenue = company.revenue.is_some_and(|r| r > 0.0);
    FinancialRatios {
        profit_margin: percent(company.profit, company.revenue),
        revenue_growth: if has_revenue {
            company.revenue_growth.filter(|g| g.is_finite())
        } else {
            None
        },
        roa: percent(company.profit, company.assets),
        roe: percent(company.profit, company.equity),
        debt_to_equity: ratio(company.debt, company.equity),
        performance_score: performance_points(company.performance_rating.as_deref()),
        export_presence: company
            .export_markets
            .split(',')
            .filter(|m| !m.trim().is_empty())
            .count(),
    }
}
