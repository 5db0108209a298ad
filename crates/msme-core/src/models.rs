//! Stored record types.
//!
//! [`Company`] and [`Article`] mirror the documents held by the store.
//! Every field defaults when absent so a sparse record still ranks (missing
//! fields contribute no match). Fields the core does not use are kept in
//! `extra` so records round-trip through the store unchanged.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An MSME company record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Company {
    #[serde(default, alias = "_id")]
    pub id: String,
    #[serde(default, alias = "Company_Name")]
    pub name: String,
    #[serde(default, alias = "Sector")]
    pub sector: String,
    #[serde(default, alias = "Location")]
    pub location: String,
    #[serde(default, alias = "Primary_Products")]
    pub primary_products: String,
    /// Comma-separated list of export destinations.
    #[serde(default, alias = "Export_Markets")]
    pub export_markets: String,
    /// Precomputed at ingestion time; order is irrelevant.
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default, alias = "Revenue", skip_serializing_if = "Option::is_none")]
    pub revenue: Option<f64>,
    #[serde(default, alias = "Profit", skip_serializing_if = "Option::is_none")]
    pub profit: Option<f64>,
    #[serde(default, alias = "Assets", skip_serializing_if = "Option::is_none")]
    pub assets: Option<f64>,
    #[serde(default, alias = "Equity", skip_serializing_if = "Option::is_none")]
    pub equity: Option<f64>,
    #[serde(default, alias = "Debt", skip_serializing_if = "Option::is_none")]
    pub debt: Option<f64>,
    #[serde(default, alias = "Revenue_Growth", skip_serializing_if = "Option::is_none")]
    pub revenue_growth: Option<f64>,
    /// `Strong`, `Good`, `Medium`, `Developing`, or `Weak`.
    #[serde(
        default,
        alias = "Overall_Performance_Score",
        skip_serializing_if = "Option::is_none"
    )]
    pub performance_rating: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Company {
    /// Text compared against the raw query: name, sector, and products.
    pub fn descriptive_text(&self) -> String {
        format!("{} {} {}", self.name, self.sector, self.primary_products)
    }

    /// Text keywords are generated from at ingestion time.
    pub fn keyword_source_text(&self) -> String {
        format!(
            "{} {} {} {}",
            self.name, self.sector, self.primary_products, self.location
        )
    }
}

/// A news article record.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(default, alias = "_id", alias = "article_id")]
    pub id: String,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub content: String,
    #[serde(default, alias = "source_name")]
    pub source: String,
    #[serde(default)]
    pub link: String,
    /// ISO 8601 publication timestamp; empty when unknown.
    #[serde(default, alias = "pubDate")]
    pub published_at: String,
    #[serde(default)]
    pub category: Vec<String>,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Article {
    /// Text compared against the raw query: title and description.
    pub fn descriptive_text(&self) -> String {
        format!("{} {}", self.title, self.description)
    }

    /// Text keywords are generated from at ingestion time.
    pub fn keyword_source_text(&self) -> String {
        format!("{} {} {}", self.title, self.description, self.content)
    }
}

/// A candidate record annotated with its similarity to the query.
///
/// The record itself is a transient copy; stored records are never mutated.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Scored<T> {
    #[serde(flatten)]
    pub record: T,
    /// Final score in `(threshold, 1.0]`.
    pub similarity: f64,
    /// Scoring breakdown (populated when explain is requested).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub explain: Option<ScoreBreakdown>,
}

/// Per-signal scoring breakdown for a ranked candidate.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ScoreBreakdown {
    /// Keyword-set similarity (`None` when either keyword set was empty).
    pub keyword_score: Option<f64>,
    /// Free-text similarity against the descriptive fields.
    pub text_score: f64,
    pub location_bonus: f64,
    pub sector_bonus: f64,
    pub generic_bonus: f64,
    /// Threshold the final score had to exceed.
    pub threshold: f64,
}
