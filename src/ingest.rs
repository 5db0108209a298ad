//! JSON ingestion for companies and articles.
//!
//! Records are cleaned before storage: strings are trimmed, empty optional
//! values dropped, keywords regenerated from the descriptive fields, and a
//! UUID v4 assigned when the record has no id.

use anyhow::{Context, Result};
use serde_json::Value;
use std::collections::HashSet;
use std::path::Path;
use uuid::Uuid;

use msme_core::models::{Article, Company};
use msme_core::store::Store;
use msme_core::text::extract_keywords;

use crate::config::Config;
use crate::sqlite_store::SqliteStore;

/// Which collection a file is loaded into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum Collection {
    /// Replace the company collection.
    Companies,
    /// Append articles, skipping duplicates.
    Articles,
}

/// Outcome of one load.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LoadReport {
    pub read: usize,
    pub stored: usize,
    pub skipped: usize,
}

fn trim_in_place(s: &mut String) {
    let trimmed = s.trim();
    if trimmed.len() != s.len() {
        *s = trimmed.to_string();
    }
}

fn clean_extra(extra: &mut serde_json::Map<String, Value>) {
    extra.retain(|_, v| match v {
        Value::Null => false,
        Value::String(s) => !s.trim().is_empty(),
        _ => true,
    });
}

fn ensure_id(id: &mut String) {
    if id.is_empty() {
        *id = Uuid::new_v4().to_string();
    }
}

/// Normalize a company record for storage.
pub fn prepare_company(mut company: Company) -> Company {
    for field in [
        &mut company.id,
        &mut company.name,
        &mut company.sector,
        &mut company.location,
        &mut company.primary_products,
        &mut company.export_markets,
    ] {
        trim_in_place(field);
    }
    company.performance_rating = company
        .performance_rating
        .map(|r| r.trim().to_string())
        .filter(|r| !r.is_empty());
    clean_extra(&mut company.extra);
    ensure_id(&mut company.id);
    company.keywords = extract_keywords(&company.keyword_source_text());
    company
}

/// Normalize an article record for storage.
pub fn prepare_article(mut article: Article) -> Article {
    for field in [
        &mut article.id,
        &mut article.title,
        &mut article.description,
        &mut article.content,
        &mut article.source,
        &mut article.link,
        &mut article.published_at,
    ] {
        trim_in_place(field);
    }
    article.category.retain(|c| !c.trim().is_empty());
    clean_extra(&mut article.extra);
    ensure_id(&mut article.id);
    article.keywords = extract_keywords(&article.keyword_source_text());
    article
}

fn read_json_array<T: serde::de::DeserializeOwned>(path: &Path) -> Result<Vec<T>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    serde_json::from_str(&content)
        .with_context(|| format!("Expected a JSON array of records in {}", path.display()))
}

/// Replace the company collection with `companies`.
///
/// Records without a name, repeated names (case-insensitive) and repeated
/// ids are skipped.
pub async fn load_companies(store: &dyn Store, companies: Vec<Company>) -> Result<LoadReport> {
    let read = companies.len();
    let mut seen_names = HashSet::new();
    let mut seen_ids = HashSet::new();
    let mut prepared = Vec::with_capacity(read);
    for company in companies.into_iter().map(prepare_company) {
        if company.name.is_empty()
            || seen_names.contains(&company.name.to_lowercase())
            || seen_ids.contains(&company.id)
        {
            tracing::debug!(name = %company.name, id = %company.id, "company skipped");
            continue;
        }
        seen_names.insert(company.name.to_lowercase());
        seen_ids.insert(company.id.clone());
        prepared.push(company);
    }

    let stored = store.replace_companies(&prepared).await?;
    Ok(LoadReport {
        read,
        stored,
        skipped: read - prepared.len(),
    })
}

/// Append `articles`, skipping untitled records and duplicates (same title,
/// id or link as a stored article).
pub async fn load_articles(store: &dyn Store, articles: Vec<Article>) -> Result<LoadReport> {
    let mut report = LoadReport {
        read: articles.len(),
        ..LoadReport::default()
    };
    for article in articles.into_iter().map(prepare_article) {
        if article.title.is_empty() {
            report.skipped += 1;
            continue;
        }
        if store.insert_article(&article).await? {
            report.stored += 1;
        } else {
            tracing::debug!(title = %article.title, "duplicate article skipped");
            report.skipped += 1;
        }
    }
    Ok(report)
}

/// `msme load <collection> <file>`.
pub async fn run_load(config: &Config, collection: Collection, path: &Path) -> Result<()> {
    let store = SqliteStore::open(config).await?;

    let report = match collection {
        Collection::Companies => load_companies(&store, read_json_array(path)?).await?,
        Collection::Articles => load_articles(&store, read_json_array(path)?).await?,
    };

    tracing::info!(
        ?collection,
        read = report.read,
        stored = report.stored,
        skipped = report.skipped,
        "load complete"
    );
    println!("load {:?} from {}", collection, path.display());
    println!("  records read: {}", report.read);
    println!("  stored: {}", report.stored);
    println!("  skipped: {}", report.skipped);
    Ok(())
}
