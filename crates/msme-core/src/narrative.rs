//! Narrative generation collaborator.
//!
//! The core never calls a text generator directly. Callers supply a
//! [`NarrativeProvider`]; [`narrate`] turns each call into a
//! [`NarrativeOutcome`] so a failing provider degrades one section instead
//! of the whole response.

use anyhow::{bail, Result};
use async_trait::async_trait;
use serde::Serialize;

use crate::intent::Intent;
use crate::models::{Article, Company, Scored};

/// Maximum candidates of each kind summarised in a prompt.
pub const MAX_PROMPT_CANDIDATES: usize = 10;

/// A structured request for narrative text.
#[derive(Debug, Clone, PartialEq)]
pub struct NarrativePrompt {
    pub intent: Intent,
    pub query: String,
    /// Role instructions for the generator.
    pub system: String,
    /// Query plus candidate summaries.
    pub user: String,
    pub company_count: usize,
    pub article_count: usize,
}

/// A text-generation backend.
#[async_trait]
pub trait NarrativeProvider: Send + Sync {
    /// Short identifier recorded in every outcome.
    fn name(&self) -> &str;

    async fn generate(&self, prompt: &NarrativePrompt) -> Result<String>;
}

/// Result of one narrative call.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum NarrativeOutcome {
    Generated { provider: String, text: String },
    Failed { provider: String, error: String },
}

impl NarrativeOutcome {
    pub fn text(&self) -> Option<&str> {
        match self {
            NarrativeOutcome::Generated { text, .. } => Some(text),
            NarrativeOutcome::Failed { .. } => None,
        }
    }

    pub fn is_failed(&self) -> bool {
        matches!(self, NarrativeOutcome::Failed { .. })
    }
}

/// Run `provider` on `prompt`, capturing any error as [`NarrativeOutcome::Failed`].
///
/// Blank output counts as a failure.
pub async fn narrate(provider: &dyn NarrativeProvider, prompt: &NarrativePrompt) -> NarrativeOutcome {
    let provider_name = provider.name().to_string();
    let result = match provider.generate(prompt).await {
        Ok(text) if text.trim().is_empty() => Err(anyhow::anyhow!("provider returned empty text")),
        other => other,
    };
    match result {
        Ok(text) => NarrativeOutcome::Generated {
            provider: provider_name,
            text: text.trim().to_string(),
        },
        Err(e) => NarrativeOutcome::Failed {
            provider: provider_name,
            error: format!("{:#}", e),
        },
    }
}

fn or_unknown(value: &str) -> &str {
    let value = value.trim();
    if value.is_empty() {
        "Unknown"
    } else {
        value
    }
}

fn system_prompt(intent: Intent) -> &'static str {
    match intent {
        Intent::Financial => {
            "You are a financial analyst for Indian MSMEs. Assess the companies' \
             financial health and performance, citing ratios where available."
        }
        Intent::News => {
            "You are a news analyst tracking the Indian MSME sector. Summarise the \
             key developments, market trends and policy impacts in the articles."
        }
        Intent::Growth => {
            "You are a growth strategist for Indian MSMEs. Recommend concrete \
             expansion opportunities and strategies for the companies listed."
        }
        Intent::Fallback => {
            "You are an MSME research assistant. Summarise what the matching \
             companies and news articles say about the query."
        }
    }
}

/// Build the prompt for one intent from the ranked candidates.
pub fn build_prompt(
    intent: Intent,
    query: &str,
    companies: &[Scored<Company>],
    articles: &[Scored<Article>],
) -> NarrativePrompt {
    let mut user = format!("User query: {}\n", query.trim());

    if !companies.is_empty() {
        user.push_str("\nCompanies:\n");
        for (i, scored) in companies.iter().take(MAX_PROMPT_CANDIDATES).enumerate() {
            let c = &scored.record;
            user.push_str(&format!(
                "{}. {} | sector: {} | location: {} | products: {} | performance: {}\n",
                i + 1,
                or_unknown(&c.name),
                or_unknown(&c.sector),
                or_unknown(&c.location),
                or_unknown(&c.primary_products),
                or_unknown(c.performance_rating.as_deref().unwrap_or_default()),
            ));
        }
    }

    if !articles.is_empty() {
        user.push_str("\nArticles:\n");
        for (i, scored) in articles.iter().take(MAX_PROMPT_CANDIDATES).enumerate() {
            let a = &scored.record;
            user.push_str(&format!(
                "{}. {} | {} | source: {} | date: {}\n",
                i + 1,
                or_unknown(&a.title),
                or_unknown(&a.description),
                or_unknown(&a.source),
                or_unknown(&a.published_at),
            ));
        }
    }

    NarrativePrompt {
        intent,
        query: query.trim().to_string(),
        system: system_prompt(intent).to_string(),
        user,
        company_count: companies.len(),
        article_count: articles.len(),
    }
}

/// Deterministic offline narrative for `prompt`.
pub fn template_narrative(prompt: &NarrativePrompt) -> String {
    let q = &prompt.query;
    match prompt.intent {
        Intent::Financial => format!(
            "Found {} relevant companies for query: {}",
            prompt.company_count, q
        ),
        Intent::News => format!(
            "Found {} relevant news articles for query: {}",
            prompt.article_count, q
        ),
        Intent::Growth => format!(
            "Found {} growth candidates for query: {}",
            prompt.company_count, q
        ),
        Intent::Fallback => format!(
            "Found {} relevant companies and {} relevant news articles for query: {}",
            prompt.company_count, prompt.article_count, q
        ),
    }
}

/// Provider that always fails. Used when narratives are switched off.
pub struct DisabledProvider;

#[async_trait]
impl NarrativeProvider for DisabledProvider {
    fn name(&self) -> &str {
        "disabled"
    }

    async fn generate(&self, _prompt: &NarrativePrompt) -> Result<String> {
        bail!("narrative generation is disabled")
    }
}

/// Provider backed by [`template_narrative`].
pub struct TemplateProvider;

#[async_trait]
impl NarrativeProvider for TemplateProvider {
    fn name(&self) -> &str {
        "template"
    }

    async fn generate(&self, prompt: &NarrativePrompt) -> Result<String> {
        Ok(template_narrative(prompt))
    }
}
