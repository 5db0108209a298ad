//! Listing helpers behind the dashboard endpoints.

use std::collections::{BTreeSet, HashSet};

use serde::{Deserialize, Serialize};

use crate::finance::performance_points;
use crate::models::{Article, Company};

/// Company listing filter. Empty fields are ignored.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct CompanyFilter {
    pub location: Option<String>,
    pub sector: Option<String>,
    pub export_market: Option<String>,
    /// Matches name, sector, or primary products.
    pub search: Option<String>,
    /// Minimum performance points (see [`performance_points`]).
    pub min_score: Option<u32>,
}

fn active(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_lowercase)
}

fn contains_ci(field: &str, needle: &str) -> bool {
    field.to_lowercase().contains(needle)
}

impl CompanyFilter {
    /// Return the companies that pass every active filter, in input order.
    pub fn apply<'a>(&self, companies: &'a [Company]) -> Vec<&'a Company> {
        let location = active(&self.location);
        let sector = active(&self.sector);
        let export_market = active(&self.export_market);
        let search = active(&self.search);

        companies
            .iter()
            .filter(|c| location.as_deref().map_or(true, |l| contains_ci(&c.location, l)))
            .filter(|c| sector.as_deref().map_or(true, |s| contains_ci(&c.sector, s)))
            .filter(|c| {
                export_market
                    .as_deref()
                    .map_or(true, |m| contains_ci(&c.export_markets, m))
            })
            .filter(|c| {
                search.as_deref().map_or(true, |q| {
                    contains_ci(&c.name, q)
                        || contains_ci(&c.sector, q)
                        || contains_ci(&c.primary_products, q)
                })
            })
            .filter(|c| {
                self.min_score.map_or(true, |min| {
                    performance_points(c.performance_rating.as_deref()) >= min
                })
            })
            .collect()
    }
}

/// Distinct values available for each dashboard filter, sorted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterOptions {
    pub locations: Vec<String>,
    pub sectors: Vec<String>,
    pub export_markets: Vec<String>,
}

pub fn filter_options(companies: &[Company]) -> FilterOptions {
    let mut locations = BTreeSet::new();
    let mut sectors = BTreeSet::new();
    let mut export_markets = BTreeSet::new();

    for c in companies {
        let location = c.location.trim();
        if !location.is_empty() {
            locations.insert(location.to_string());
        }
        let sector = c.sector.trim();
        if !sector.is_empty() {
            sectors.insert(sector.to_string());
        }
        for market in c.export_markets.split(',').map(str::trim) {
            if !market.is_empty() {
                export_markets.insert(market.to_string());
            }
        }
    }

    FilterOptions {
        locations: locations.into_iter().collect(),
        sectors: sectors.into_iter().collect(),
        export_markets: export_markets.into_iter().collect(),
    }
}

/// Newest articles first, one per title.
///
/// Dates compare as ISO 8601 strings; articles without a date sort last and
/// keep their relative storage order.
pub fn latest_articles(articles: &[Article], limit: usize) -> Vec<Article> {
    let mut sorted: Vec<&Article> = articles.iter().collect();
    sorted.sort_by(|a, b| match (a.published_at.is_empty(), b.published_at.is_empty()) {
        (false, false) => b.published_at.cmp(&a.published_at),
        (true, false) => std::cmp::Ordering::Greater,
        (false, true) => std::cmp::Ordering::Less,
        (true, true) => std::cmp::Ordering::Equal,
    });

    let mut seen = HashSet::new();
    sorted
        .into_iter()
        .filter(|a| seen.insert(a.title.trim().to_lowercase()))
        .take(limit)
        .cloned()
        .collect()
}
