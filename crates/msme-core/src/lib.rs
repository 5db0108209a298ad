//! # MSME Insight Core
//!
//! Request-scoped logic for MSME Insight: text normalization, lexical
//! similarity, gazetteer tagging, relevance ranking, intent routing, and
//! structured response assembly.
//!
//! This crate contains no tokio, sqlx, filesystem I/O, or network code.
//! Document storage and narrative generation are reached only through the
//! [`store::Store`] and [`narrative::NarrativeProvider`] traits, which the
//! `msme-insight` application implements.
//!
//! ## Data Flow
//!
//! ```text
//! query ─▶ text ─▶ keywords ─┬─▶ gazetteer ─┐
//!                            └─▶ similarity ─┴─▶ rank ─▶ ranked candidates ─┐
//! query ─▶ intent ─▶ intent set ──────────────────────────────────────────────┴─▶ assemble
//! ```

pub mod assemble;
pub mod dashboard;
pub mod finance;
pub mod gazetteer;
pub mod intent;
pub mod models;
pub mod narrative;
pub mod rank;
pub mod similarity;
pub mod store;
pub mod text;
