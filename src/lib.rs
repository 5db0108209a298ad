//! # MSME Insight
//!
//! Company and news relevance ranking for MSMEs, with intent-routed
//! analysis on top.
//!
//! The ranking, routing, and assembly logic lives in the `msme-core` crate.
//! This crate supplies what surrounds it: configuration, a SQLite store,
//! narrative providers, JSON ingestion, the chat workflow, an HTTP API, and
//! the `msme` CLI.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌──────────────┐   ┌───────────┐
//! │  JSON files  │──▶│   ingest     │──▶│  SQLite   │
//! │ (load cmd)   │   │  + keywords  │   │  store    │
//! └──────────────┘   └──────────────┘   └─────┬─────┘
//!                                             │
//!                     ┌───────────────────────┤
//!                     ▼                       ▼
//!               ┌──────────┐            ┌──────────┐
//!               │   CLI    │            │   HTTP   │
//!               │  (msme)  │            │  (axum)  │
//!               └──────────┘            └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! msme init
//! msme load companies data/companies.json
//! msme load articles data/articles.json
//! msme search companies "textile exporters in surat" --explain
//! msme chat "latest growth strategy news for textile MSMEs"
//! msme serve
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema migrations |
//! | [`sqlite_store`] | SQLite `Store` implementation |
//! | [`narrative`] | Narrative provider selection |
//! | [`ingest`] | JSON ingestion |
//! | [`search`] | Ranked search and classification |
//! | [`chat`] | Chat workflow |
//! | [`state`] | Shared request state |
//! | [`server`] | HTTP server |

pub mod chat;
pub mod config;
pub mod db;
pub mod ingest;
pub mod migrate;
pub mod narrative;
pub mod search;
pub mod server;
pub mod sqlite_store;
pub mod state;
