//! `msme search` and `msme classify`.

use anyhow::Result;
use serde::Serialize;

use msme_core::intent::{classify_intent, intent_scores, IntentScores, IntentSet};
use msme_core::models::{Article, Company, ScoreBreakdown, Scored};
use msme_core::narrative::DisabledProvider;
use msme_core::rank::{rank_articles, rank_companies, RankOptions};

use crate::config::Config;
use crate::sqlite_store::SqliteStore;
use crate::state::AppState;

/// Which collection to rank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SearchKind {
    Companies,
    News,
}

/// Intent routing for a query, as reported by `classify`.
#[derive(Debug, Clone, Serialize)]
pub struct Classification {
    pub query: String,
    pub intents: IntentSet,
    pub workflows: Vec<&'static str>,
    pub scores: IntentScores,
    pub primary: &'static str,
}

pub fn classify_query(query: &str) -> Classification {
    let intents = classify_intent(query);
    let scores = intent_scores(query);
    Classification {
        query: query.to_string(),
        workflows: intents.iter().map(|i| i.workflow()).collect(),
        primary: scores.primary(),
        intents,
        scores,
    }
}

/// Rank stored companies for `query`.
pub async fn search_companies(
    state: &AppState,
    query: &str,
    opts: RankOptions,
) -> Result<Vec<Scored<Company>>> {
    let pool = state.store.find_companies().await?;
    Ok(rank_companies(query, &pool, &state.gazetteer, opts))
}

/// Rank stored articles for `query`.
pub async fn search_news(
    state: &AppState,
    query: &str,
    opts: RankOptions,
) -> Result<Vec<Scored<Article>>> {
    let pool = state.store.find_articles().await?;
    Ok(rank_articles(query, &pool, opts))
}

fn print_breakdown(explain: Option<&ScoreBreakdown>) {
    if let Some(ex) = explain {
        let keyword = ex
            .keyword_score
            .map(|k| format!("{:.3}", k))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "    explain: keyword={} text={:.3} location=+{:.2} sector=+{:.2} generic=+{:.2} threshold={:.2}",
            keyword, ex.text_score, ex.location_bonus, ex.sector_bonus, ex.generic_bonus, ex.threshold
        );
    }
}

pub async fn run_search(
    config: &Config,
    kind: SearchKind,
    query: &str,
    limit: Option<usize>,
    explain: bool,
) -> Result<()> {
    if query.trim().is_empty() {
        println!("No results.");
        return Ok(());
    }

    let store = SqliteStore::open(config).await?;
    // Ranking never narrates.
    let state = AppState::with_parts(
        config.clone(),
        std::sync::Arc::new(store),
        std::sync::Arc::new(DisabledProvider),
    );

    let default_limit = match kind {
        SearchKind::Companies => config.retrieval.company_limit,
        SearchKind::News => config.retrieval.news_limit,
    };
    let mut opts = RankOptions::new(config.retrieval.clamp(limit, default_limit));
    opts.explain = explain;

    match kind {
        SearchKind::Companies => {
            let results = search_companies(&state, query, opts).await?;
            if results.is_empty() {
                println!("No results.");
                return Ok(());
            }
            for (i, r) in results.iter().enumerate() {
                let c = &r.record;
                println!("{}. [{:.2}] {} / {}", i + 1, r.similarity, c.name, c.sector);
                println!("    location: {}", c.location);
                if !c.primary_products.is_empty() {
                    println!("    products: {}", c.primary_products);
                }
                if !c.export_markets.is_empty() {
                    println!("    exports: {}", c.export_markets);
                }
                print_breakdown(r.explain.as_ref());
                println!("    id: {}", c.id);
                println!();
            }
        }
        SearchKind::News => {
            let results = search_news(&state, query, opts).await?;
            if results.is_empty() {
                println!("No results.");
                return Ok(());
            }
            for (i, r) in results.iter().enumerate() {
                let a = &r.record;
                let source = if a.source.is_empty() { "(unknown)" } else { &a.source };
                println!("{}. [{:.2}] {} / {}", i + 1, r.similarity, source, a.title);
                if !a.published_at.is_empty() {
                    println!("    published: {}", a.published_at);
                }
                if !a.link.is_empty() {
                    println!("    url: {}", a.link);
                }
                print_breakdown(r.explain.as_ref());
                println!("    id: {}", a.id);
                println!();
            }
        }
    }

    Ok(())
}

pub fn run_classify(query: &str) -> Result<()> {
    let c = classify_query(query);
    println!("{}", serde_json::to_string_pretty(&c)?);
    Ok(())
}
