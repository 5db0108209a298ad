//! SQLite-backed [`Store`] implementation.
//!
//! Each record is stored whole as JSON in `data_json`, so fields the core
//! does not model survive a round trip. The `seq` column preserves
//! insertion order.

use anyhow::{Context, Result};
use async_trait::async_trait;
use sqlx::SqlitePool;

use msme_core::models::{Article, Company};
use msme_core::store::{DuplicateCompany, Store, StoreCounts};

use crate::config::Config;
use crate::db;

/// SQLite implementation of the [`Store`] trait.
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Connect using `[db].path`. Expects `msme init` to have run.
    pub async fn open(config: &Config) -> Result<Self> {
        Ok(Self::new(db::connect(config).await?))
    }
}

fn record_id(id: &str) -> String {
    if id.trim().is_empty() {
        uuid::Uuid::new_v4().to_string()
    } else {
        id.to_string()
    }
}

/// Map a UNIQUE violation on `companies` to [`DuplicateCompany`].
fn duplicate_company(err: sqlx::Error, name: &str) -> anyhow::Error {
    if let sqlx::Error::Database(db) = &err {
        if db.is_unique_violation() {
            return DuplicateCompany(name.trim().to_string()).into();
        }
    }
    err.into()
}

fn decode<T: serde::de::DeserializeOwned>(rows: Vec<String>, table: &str) -> Result<Vec<T>> {
    rows.iter()
        .map(|json| {
            serde_json::from_str(json).with_context(|| format!("Corrupt record in {}", table))
        })
        .collect()
}

#[async_trait]
impl Store for SqliteStore {
    async fn find_companies(&self) -> Result<Vec<Company>> {
        let rows: Vec<String> = sqlx::query_scalar("SELECT data_json FROM companies ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;
        decode(rows, "companies")
    }

    async fn find_articles(&self) -> Result<Vec<Article>> {
        let rows: Vec<String> = sqlx::query_scalar("SELECT data_json FROM articles ORDER BY seq")
            .fetch_all(&self.pool)
            .await?;
        decode(rows, "articles")
    }

    async fn replace_companies(&self, companies: &[Company]) -> Result<usize> {
        let mut tx = self.pool.begin().await?;

        sqlx::query("DELETE FROM companies")
            .execute(&mut *tx)
            .await?;

        for company in companies {
            let mut company = company.clone();
            company.id = record_id(&company.id);
            let data_json = serde_json::to_string(&company)?;
            sqlx::query("INSERT INTO companies (id, name, data_json) VALUES (?, ?, ?)")
                .bind(&company.id)
                .bind(&company.name)
                .bind(&data_json)
                .execute(&mut *tx)
                .await
                .with_context(|| format!("Failed to store company '{}'", company.name))?;
        }

        tx.commit().await?;
        Ok(companies.len())
    }

    async fn insert_company(&self, company: &Company) -> Result<()> {
        let mut company = company.clone();
        company.id = record_id(&company.id);
        let data_json = serde_json::to_string(&company)?;
        // The UNIQUE name/id constraints decide duplicates atomically.
        sqlx::query("INSERT INTO companies (id, name, data_json) VALUES (?, ?, ?)")
            .bind(&company.id)
            .bind(company.name.trim())
            .bind(&data_json)
            .execute(&self.pool)
            .await
            .map_err(|e| duplicate_company(e, &company.name))?;
        Ok(())
    }

    async fn insert_article(&self, article: &Article) -> Result<bool> {
        let title = article.title.trim();
        let id = article.id.trim();
        let link = article.link.trim();

        let duplicate: bool = sqlx::query_scalar(
            "SELECT COUNT(*) > 0 FROM articles \
             WHERE title = ? COLLATE NOCASE OR (? != '' AND id = ?) OR (? != '' AND link = ?)",
        )
        .bind(title)
        .bind(id)
        .bind(id)
        .bind(link)
        .bind(link)
        .fetch_one(&self.pool)
        .await?;
        if duplicate {
            return Ok(false);
        }

        let mut article = article.clone();
        article.id = record_id(id);
        let data_json = serde_json::to_string(&article)?;
        let inserted = sqlx::query(
            "INSERT INTO articles (id, title, link, published_at, data_json) VALUES (?, ?, ?, ?, ?)",
        )
        .bind(&article.id)
        .bind(title)
        .bind(link)
        .bind(&article.published_at)
        .bind(&data_json)
        .execute(&self.pool)
        .await;

        match inserted {
            Ok(_) => Ok(true),
            // A concurrent insert claimed the id first.
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn counts(&self) -> Result<StoreCounts> {
        let companies: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM companies")
            .fetch_one(&self.pool)
            .await?;
        let articles: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM articles")
            .fetch_one(&self.pool)
            .await?;
        Ok(StoreCounts {
            companies: companies as usize,
            articles: articles as usize,
        })
    }
}
