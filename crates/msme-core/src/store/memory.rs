//! In-memory [`Store`] implementation for tests and embedding.
//!
//! Uses `Vec` behind `std::sync::RwLock` so insertion order is storage
//! order.

use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Article, Company};

use super::{DuplicateCompany, Store, StoreCounts};

/// In-memory store.
#[derive(Default)]
pub struct InMemoryStore {
    companies: RwLock<Vec<Company>>,
    articles: RwLock<Vec<Article>>,
}

fn read<T>(lock: &RwLock<T>) -> Result<RwLockReadGuard<'_, T>> {
    lock.read().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

fn write<T>(lock: &RwLock<T>) -> Result<RwLockWriteGuard<'_, T>> {
    lock.write().map_err(|_| anyhow!("in-memory store lock poisoned"))
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a store pre-populated with `companies` and `articles`.
    pub fn with_records(companies: Vec<Company>, articles: Vec<Article>) -> Self {
        Self {
            companies: RwLock::new(companies),
            articles: RwLock::new(articles),
        }
    }
}

fn same_text(a: &str, b: &str) -> bool {
    a.trim().eq_ignore_ascii_case(b.trim())
}

#[async_trait]
impl Store for InMemoryStore {
    async fn find_companies(&self) -> Result<Vec<Company>> {
        Ok(read(&self.companies)?.clone())
    }

    async fn find_articles(&self) -> Result<Vec<Article>> {
        Ok(read(&self.articles)?.clone())
    }

    async fn replace_companies(&self, companies: &[Company]) -> Result<usize> {
        let mut stored = write(&self.companies)?;
        *stored = companies.to_vec();
        Ok(stored.len())
    }

    async fn insert_company(&self, company: &Company) -> Result<()> {
        let mut stored = write(&self.companies)?;
        let id = company.id.trim();
        let taken = stored
            .iter()
            .any(|c| same_text(&c.name, &company.name) || (!id.is_empty() && c.id.trim() == id));
        if taken {
            return Err(DuplicateCompany(company.name.clone()).into());
        }
        stored.push(company.clone());
        Ok(())
    }

    async fn insert_article(&self, article: &Article) -> Result<bool> {
        let mut stored = write(&self.articles)?;
        let id = article.id.trim();
        let link = article.link.trim();
        let duplicate = stored.iter().any(|a| {
            same_text(&a.title, &article.title)
                || (!id.is_empty() && a.id.trim() == id)
                || (!link.is_empty() && a.link.trim() == link)
        });
        if duplicate {
            return Ok(false);
        }
        stored.push(article.clone());
        Ok(true)
    }

    async fn counts(&self) -> Result<StoreCounts> {
        Ok(StoreCounts {
            companies: read(&self.companies)?.len(),
            articles: read(&self.articles)?.len(),
        })
    }
}
