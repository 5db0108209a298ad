//! Structured response assembly.
//!
//! [`assemble_response`] merges ranked candidates, the matched intents, and
//! per-intent narrative outcomes into one [`StructuredResponse`]. Every
//! section is optional; a collaborator failure shows up in `degraded` and in
//! the affected section's narrative, never as an error.

use std::collections::HashMap;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::Serialize;

use crate::finance::{financial_ratios, FinancialRatios};
use crate::gazetteer::QueryTags;
use crate::intent::{Intent, IntentSet};
use crate::models::{Article, Company, Scored};
use crate::narrative::NarrativeOutcome;

/// Articles listed in the news section.
pub const NEWS_SECTION_ARTICLES: usize = 10;
/// Companies listed in the growth section.
pub const GROWTH_SECTION_COMPANIES: usize = 3;

/// `min(100, 25 × intents_used)`.
pub fn confidence_score(intents_used: usize) -> u32 {
    let score = intents_used.saturating_mul(25).min(100);
    score as u32
}

/// A sub-operation that failed while the request carried on.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CollaboratorFailure {
    pub operation: String,
    pub message: String,
}

impl CollaboratorFailure {
    pub fn new(operation: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            operation: operation.into(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FinancialReport {
    pub company_name: String,
    pub sector: String,
    pub location: String,
    pub similarity: f64,
    pub ratios: FinancialRatios,
    pub export_markets: Vec<String>,
    pub narrative: Option<NarrativeOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ArticleDigest {
    pub title: String,
    pub description: String,
    pub source: String,
    pub link: String,
    pub published_at: String,
    pub category: Vec<String>,
    pub similarity: f64,
}

impl From<&Scored<Article>> for ArticleDigest {
    fn from(scored: &Scored<Article>) -> Self {
        let a = &scored.record;
        Self {
            title: a.title.clone(),
            description: a.description.clone(),
            source: a.source.clone(),
            link: a.link.clone(),
            published_at: a.published_at.clone(),
            category: a.category.clone(),
            similarity: scored.similarity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NewsAnalysis {
    pub articles: Vec<ArticleDigest>,
    pub total_articles: usize,
    /// Distinct sources in first-seen order.
    pub sources: Vec<String>,
    pub narrative: Option<NarrativeOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyDigest {
    pub name: String,
    pub sector: String,
    pub location: String,
    pub primary_products: String,
    pub similarity: f64,
}

impl From<&Scored<Company>> for CompanyDigest {
    fn from(scored: &Scored<Company>) -> Self {
        let c = &scored.record;
        Self {
            name: c.name.clone(),
            sector: c.sector.clone(),
            location: c.location.clone(),
            primary_products: c.primary_products.clone(),
            similarity: scored.similarity,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GrowthRecommendations {
    /// First matched sector, or `general`.
    pub sector: String,
    pub location: Option<String>,
    pub top_companies: Vec<CompanyDigest>,
    pub narrative: Option<NarrativeOutcome>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompanyAnalysis {
    pub companies: Vec<Scored<Company>>,
    pub total_found: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Summary {
    pub query: String,
    /// RFC 3339, UTC.
    pub timestamp: String,
    /// Workflow labels of the intents that produced a section.
    pub agents_used: Vec<&'static str>,
    pub confidence_score: u32,
}

/// The assembled multi-section response.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StructuredResponse {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub financial_reports: Option<FinancialReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub news_analysis: Option<NewsAnalysis>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub growth_recommendations: Option<GrowthRecommendations>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_analysis: Option<CompanyAnalysis>,
    pub summary: Summary,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub degraded: Vec<CollaboratorFailure>,
}

/// Everything the assembler consumes for one query.
#[derive(Debug, Clone)]
pub struct AssemblyInput<'a> {
    pub query: &'a str,
    pub intents: &'a IntentSet,
    pub tags: &'a QueryTags,
    pub companies: &'a [Scored<Company>],
    pub articles: &'a [Scored<Article>],
    pub narratives: HashMap<Intent, NarrativeOutcome>,
    /// Failures recorded before assembly (e.g. store reads).
    pub failures: Vec<CollaboratorFailure>,
    pub generated_at: DateTime<Utc>,
}

fn distinct_sources(articles: &[Scored<Article>]) -> Vec<String> {
    let mut sources: Vec<String> = Vec::new();
    for scored in articles {
        let source = scored.record.source.trim();
        if !source.is_empty() && !sources.iter().any(|s| s == source) {
            sources.push(source.to_string());
        }
    }
    sources
}

fn split_markets(markets: &str) -> Vec<String> {
    markets
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(str::to_string)
        .collect()
}

/// Build the structured response.
///
/// Sections appear only for the intents that matched:
///
/// | Intent | Section | Condition |
/// |--------|---------|-----------|
/// | financial | `financial_reports` | at least one ranked company |
/// | news | `news_analysis` | always |
/// | growth | `growth_recommendations` | always |
/// | fallback | `news_analysis` | always |
///
/// `company_analysis` lists the ranked companies whenever a company branch
/// (financial, growth, fallback) ran and found any.
pub fn assemble_response(input: AssemblyInput<'_>) -> StructuredResponse {
    let AssemblyInput {
        query,
        intents,
        tags,
        companies,
        articles,
        mut narratives,
        failures,
        generated_at,
    } = input;

    let mut agents_used = Vec::new();
    let mut degraded = failures;

    let mut take_narrative = |intent: Intent| {
        let outcome = narratives.remove(&intent);
        if let Some(NarrativeOutcome::Failed { provider, error }) = &outcome {
            degraded.push(CollaboratorFailure::new(
                format!("narrative:{}", intent.as_str()),
                format!("{provider}: {error}"),
            ));
        }
        outcome
    };

    let financial_reports = match companies.first() {
        Some(top) if intents.contains(Intent::Financial) => {
            agents_used.push(Intent::Financial.workflow());
            let c = &top.record;
            Some(FinancialReport {
                company_name: c.name.clone(),
                sector: c.sector.clone(),
                location: c.location.clone(),
                similarity: top.similarity,
                ratios: financial_ratios(c),
                export_markets: split_markets(&c.export_markets),
                narrative: take_narrative(Intent::Financial),
            })
        }
        _ => None,
    };

    let news_intent = if intents.contains(Intent::News) {
        Some(Intent::News)
    } else if intents.is_fallback() {
        Some(Intent::Fallback)
    } else {
        None
    };
    let news_analysis = news_intent.map(|intent| {
        agents_used.push(intent.workflow());
        NewsAnalysis {
            articles: articles
                .iter()
                .take(NEWS_SECTION_ARTICLES)
                .map(ArticleDigest::from)
                .collect(),
            total_articles: articles.len(),
            sources: distinct_sources(articles),
            narrative: take_narrative(intent),
        }
    });

    let growth_recommendations = intents.contains(Intent::Growth).then(|| {
        agents_used.push(Intent::Growth.workflow());
        GrowthRecommendations {
            sector: tags
                .sectors
                .first()
                .cloned()
                .unwrap_or_else(|| "general".to_string()),
            location: tags.locations.first().cloned(),
            top_companies: companies
                .iter()
                .take(GROWTH_SECTION_COMPANIES)
                .map(CompanyDigest::from)
                .collect(),
            narrative: take_narrative(Intent::Growth),
        }
    });

    let company_analysis = (!companies.is_empty() && intents.needs_companies()).then(|| {
        CompanyAnalysis {
            companies: companies.to_vec(),
            total_found: companies.len(),
        }
    });

    let confidence = confidence_score(agents_used.len());
    StructuredResponse {
        financial_reports,
        news_analysis,
        growth_recommendations,
        company_analysis,
        summary: Summary {
            query: query.to_string(),
            timestamp: generated_at.to_rfc3339_opts(SecondsFormat::Secs, true),
            agents_used,
            confidence_score: confidence,
        },
        degraded,
    }
}

/// Free-text reply built from the successful narratives, in section order.
pub fn render_reply(response: &StructuredResponse) -> String {
    let sections = [
        (
            "Financial Analysis",
            response
                .financial_reports
                .as_ref()
                .and_then(|s| s.narrative.as_ref()),
        ),
        (
            "News Analysis",
            response
                .news_analysis
                .as_ref()
                .and_then(|s| s.narrative.as_ref()),
        ),
        (
            "Growth Recommendations",
            response
                .growth_recommendations
                .as_ref()
                .and_then(|s| s.narrative.as_ref()),
        ),
    ];

    let parts: Vec<String> = sections
        .iter()
        .filter_map(|(heading, narrative)| {
            narrative
                .and_then(NarrativeOutcome::text)
                .map(|text| format!("**{heading}:**\n{text}"))
        })
        .collect();

    if parts.is_empty() {
        format!(
            "No relevant information found for query: {}",
            response.summary.query
        )
    } else {
        parts.join("\n\n")
    }
}
