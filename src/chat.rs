//! The chat workflow: classify, rank, narrate, assemble.
//!
//! A store read failure or a narrative failure degrades the response; only
//! an empty query is an error.

use anyhow::{bail, Result};
use chrono::Utc;
use serde::Serialize;
use std::collections::HashMap;

use msme_core::assemble::{
    assemble_response, render_reply, AssemblyInput, CollaboratorFailure, StructuredResponse,
};
use msme_core::intent::{classify_intent, Intent, IntentSet};
use msme_core::models::{Article, Company};
use msme_core::narrative::{build_prompt, narrate};
use msme_core::rank::{rank_articles, rank_companies_tagged, RankOptions};

use crate::config::Config;
use crate::state::AppState;

/// Which intent lists matched, as booleans plus the routed set.
#[derive(Debug, Clone, Serialize)]
pub struct IntentDetection {
    pub financial: bool,
    pub news: bool,
    pub growth: bool,
    pub fallback: bool,
    pub intents: IntentSet,
}

impl From<&IntentSet> for IntentDetection {
    fn from(intents: &IntentSet) -> Self {
        Self {
            financial: intents.contains(Intent::Financial),
            news: intents.contains(Intent::News),
            growth: intents.contains(Intent::Growth),
            fallback: intents.is_fallback(),
            intents: intents.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ChatResponse {
    pub response: String,
    pub structured_data: StructuredResponse,
    pub agents_used: Vec<&'static str>,
    pub intent_detection: IntentDetection,
}

async fn snapshot<T, F>(
    operation: &str,
    read: F,
    failures: &mut Vec<CollaboratorFailure>,
) -> Vec<T>
where
    F: std::future::Future<Output = Result<Vec<T>>>,
{
    match read.await {
        Ok(records) => records,
        Err(e) => {
            tracing::warn!(operation, error = %format!("{:#}", e), "store read failed");
            failures.push(CollaboratorFailure::new(operation, format!("{:#}", e)));
            Vec::new()
        }
    }
}

/// Answer one chat query.
pub async fn run_chat(state: &AppState, query: &str) -> Result<ChatResponse> {
    let query = query.trim();
    if query.is_empty() {
        bail!("query must not be empty");
    }

    let intents = classify_intent(query);
    let tags = state.gazetteer.tag(query);
    let retrieval = &state.config.retrieval;
    let mut failures = Vec::new();

    // The fallback search ranks a short list of each kind.
    let (company_limit, news_limit) = if intents.is_fallback() {
        (retrieval.fallback_limit, retrieval.fallback_limit)
    } else {
        (retrieval.company_limit, retrieval.news_limit)
    };

    let companies = if intents.needs_companies() {
        let pool: Vec<Company> =
            snapshot("store:companies", state.store.find_companies(), &mut failures).await;
        rank_companies_tagged(query, &tags, &pool, RankOptions::new(company_limit))
    } else {
        Vec::new()
    };

    let articles = if intents.needs_articles() {
        let pool: Vec<Article> =
            snapshot("store:articles", state.store.find_articles(), &mut failures).await;
        rank_articles(query, &pool, RankOptions::new(news_limit))
    } else {
        Vec::new()
    };

    let mut narratives = HashMap::new();
    for intent in intents.iter() {
        // The financial section needs a top company.
        if intent == Intent::Financial && companies.is_empty() {
            continue;
        }
        let prompt = build_prompt(intent, query, &companies, &articles);
        let outcome = narrate(state.narrator.as_ref(), &prompt).await;
        if outcome.is_failed() {
            tracing::warn!(intent = %intent, provider = state.narrator.name(), "narrative failed");
        }
        narratives.insert(intent, outcome);
    }

    let structured = assemble_response(AssemblyInput {
        query,
        intents: &intents,
        tags: &tags,
        companies: &companies,
        articles: &articles,
        narratives,
        failures,
        generated_at: Utc::now(),
    });
    let response = render_reply(&structured);

    tracing::info!(
        intents = ?intents,
        companies = companies.len(),
        articles = articles.len(),
        confidence = structured.summary.confidence_score,
        degraded = structured.degraded.len(),
        "chat answered"
    );

    Ok(ChatResponse {
        response,
        agents_used: structured.summary.agents_used.clone(),
        intent_detection: IntentDetection::from(&intents),
        structured_data: structured,
    })
}

/// `msme chat <query>`: print the full response as JSON.
pub async fn run_chat_command(config: &Config, query: &str) -> Result<()> {
    let state = AppState::new(config.clone()).await?;
    let response = run_chat(&state, query).await?;
    println!("{}", serde_json::to_string_pretty(&response)?);
    Ok(())
}
