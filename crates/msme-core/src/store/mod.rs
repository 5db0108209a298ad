//! Document store abstraction.
//!
//! The [`Store`] trait is the only path from the core to persisted company
//! and article records. Reads return snapshots in insertion order; the core
//! never writes during a ranking request.
//!
//! Implementations must be `Send + Sync` to work with async runtimes.

pub mod memory;

use anyhow::Result;
use async_trait::async_trait;
use serde::Serialize;

use crate::models::{Article, Company};

/// Returned (inside `anyhow::Error`) by [`Store::insert_company`] when the
/// name or id is already taken. Callers detect it with `downcast_ref`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateCompany(pub String);

impl std::fmt::Display for DuplicateCompany {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "company '{}' already exists", self.0)
    }
}

impl std::error::Error for DuplicateCompany {}

/// Record counts per collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct StoreCounts {
    pub companies: usize,
    pub articles: usize,
}

/// Abstract storage backend.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`find_companies`](Store::find_companies) | All companies, insertion order |
/// | [`find_articles`](Store::find_articles) | All articles, insertion order |
/// | [`replace_companies`](Store::replace_companies) | Replace the company collection |
/// | [`insert_company`](Store::insert_company) | Add one company; rejects duplicate names |
/// | [`insert_article`](Store::insert_article) | Add one article unless a duplicate exists |
/// | [`counts`](Store::counts) | Collection sizes |
#[async_trait]
pub trait Store: Send + Sync {
    async fn find_companies(&self) -> Result<Vec<Company>>;

    async fn find_articles(&self) -> Result<Vec<Article>>;

    /// Replace every stored company with `companies`.
    ///
    /// Returns the number stored.
    async fn replace_companies(&self, companies: &[Company]) -> Result<usize>;

    /// Insert a single company.
    ///
    /// Fails with [`DuplicateCompany`] if a company with the same name
    /// (case-insensitive) or the same non-empty id exists.
    async fn insert_company(&self, company: &Company) -> Result<()>;

    /// Insert a single article.
    ///
    /// Returns `false` and stores nothing when an article with the same
    /// title, or the same non-empty id or link, is already stored.
    async fn insert_article(&self, article: &Article) -> Result<bool>;

    async fn counts(&self) -> Result<StoreCounts>;
}
