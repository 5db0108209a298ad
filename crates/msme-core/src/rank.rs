//! Relevance ranking for companies and news articles.
//!
//! The ranker is a pure function of the query, the candidate pool, and the
//! shared [`Gazetteer`]. It never mutates stored records; each result is a
//! transient [`Scored`] copy.
//!
//! # Company Scoring Algorithm
//!
//! 1. Extract query keywords and tag locations/sectors.
//! 2. Pre-filter by matched locations, then by matched sectors (AND across
//!    the two filters, OR within the matches of one filter).
//! 3. `base = max(keyword_set_similarity, text_similarity)`; the keyword
//!    signal only counts when both keyword sets are non-empty.
//! 4. Add `+0.20` location, `+0.15` sector, `+0.10` generic-query bonuses.
//! 5. Cap at `1.0`.
//! 6. Keep scores above `0.03` (generic query) or `0.05`.
//! 7. Stable sort by score descending, truncate to `limit`.
//!
//! Articles follow steps 1, 3, 6 (threshold `0.1`), and 7 with no filters
//! and no bonuses.

use std::cmp::Ordering;

use crate::gazetteer::{Gazetteer, QueryTags};
use crate::models::{Article, Company, ScoreBreakdown, Scored};
use crate::similarity::{keyword_set_similarity, text_similarity};
use crate::text::extract_keywords;

pub const LOCATION_BONUS: f64 = 0.20;
pub const SECTOR_BONUS: f64 = 0.15;
pub const GENERIC_BONUS: f64 = 0.10;

pub const GENERIC_COMPANY_THRESHOLD: f64 = 0.03;
pub const COMPANY_THRESHOLD: f64 = 0.05;
pub const ARTICLE_THRESHOLD: f64 = 0.1;

/// Query fragments that mark a broad "list everything" request.
pub const GENERIC_TERMS: &[&str] = &[
    "msmes", "msme", "companies", "company", "list", "all", "show me", "give me",
];

/// Per-call ranking options.
#[derive(Debug, Clone, Copy)]
pub struct RankOptions {
    /// Maximum number of results to return.
    pub limit: usize,
    /// If true, attach a [`ScoreBreakdown`] to each result.
    pub explain: bool,
}

impl RankOptions {
    pub fn new(limit: usize) -> Self {
        Self {
            limit,
            explain: false,
        }
    }

    pub fn explained(mut self) -> Self {
        self.explain = true;
        self
    }
}

/// True if the lowercased query contains any [`GENERIC_TERMS`] entry.
pub fn is_generic_query(query: &str) -> bool {
    let query_lower = query.to_lowercase();
    GENERIC_TERMS.iter().any(|term| query_lower.contains(term))
}

fn contains_any(field: &str, needles: &[String]) -> bool {
    let field_lower = field.to_lowercase();
    needles
        .iter()
        .any(|needle| field_lower.contains(&needle.to_lowercase()))
}

/// Max of the keyword-set and free-text signals.
fn base_similarity(
    query: &str,
    query_keywords: &[String],
    candidate_keywords: &[String],
    candidate_text: &str,
) -> (Option<f64>, f64, f64) {
    let keyword_score = if !query_keywords.is_empty() && !candidate_keywords.is_empty() {
        Some(keyword_set_similarity(query_keywords, candidate_keywords))
    } else {
        None
    };
    let text_score = text_similarity(query, candidate_text);
    let base = keyword_score.map_or(text_score, |k| k.max(text_score));
    (keyword_score, text_score, base)
}

/// Stable sort by descending similarity, then truncate.
fn sort_and_truncate<T>(results: &mut Vec<Scored<T>>, limit: usize) {
    results.sort_by(|a, b| {
        b.similarity
            .partial_cmp(&a.similarity)
            .unwrap_or(Ordering::Equal)
    });
    results.truncate(limit);
}

/// Rank `companies` against `query`.
///
/// Returns at most `opts.limit` results sorted by non-increasing score; ties
/// keep the pool's storage order.
pub fn rank_companies(
    query: &str,
    companies: &[Company],
    gazetteer: &Gazetteer,
    opts: RankOptions,
) -> Vec<Scored<Company>> {
    let tags = gazetteer.tag(query);
    rank_companies_tagged(query, &tags, companies, opts)
}

/// Like [`rank_companies`], with location/sector tags already extracted.
pub fn rank_companies_tagged(
    query: &str,
    tags: &QueryTags,
    companies: &[Company],
    opts: RankOptions,
) -> Vec<Scored<Company>> {
    if opts.limit == 0 || companies.is_empty() {
        return Vec::new();
    }

    let query_keywords = extract_keywords(query);
    let generic = is_generic_query(query);
    let threshold = if generic {
        GENERIC_COMPANY_THRESHOLD
    } else {
        COMPANY_THRESHOLD
    };
    let generic_bonus = if generic && tags.is_empty() {
        GENERIC_BONUS
    } else {
        0.0
    };

    let mut results: Vec<Scored<Company>> = companies
        .iter()
        .filter(|c| tags.locations.is_empty() || contains_any(&c.location, &tags.locations))
        .filter(|c| tags.sectors.is_empty() || contains_any(&c.sector, &tags.sectors))
        .filter_map(|company| {
            let (keyword_score, text_score, base) = base_similarity(
                query,
                &query_keywords,
                &company.keywords,
                &company.descriptive_text(),
            );

            let location_bonus =
                if !tags.locations.is_empty() && contains_any(&company.location, &tags.locations) {
                    LOCATION_BONUS
                } else {
                    0.0
                };
            let sector_bonus =
                if !tags.sectors.is_empty() && contains_any(&company.sector, &tags.sectors) {
                    SECTOR_BONUS
                } else {
                    0.0
                };

            let score = (base + location_bonus + sector_bonus + generic_bonus).min(1.0);
            if score <= threshold {
                return None;
            }

            let explain = opts.explain.then(|| ScoreBreakdown {
                keyword_score,
                text_score,
                location_bonus,
                sector_bonus,
                generic_bonus,
                threshold,
            });

            Some(Scored {
                record: company.clone(),
                similarity: score,
                explain,
            })
        })
        .collect();

    sort_and_truncate(&mut results, opts.limit);
    results
}

/// Rank `articles` against `query`.
///
/// No pre-filtering and no bonuses; the threshold is a flat `0.1`.
pub fn rank_articles(query: &str, articles: &[Article], opts: RankOptions) -> Vec<Scored<Article>> {
    if opts.limit == 0 || articles.is_empty() {
        return Vec::new();
    }

    let query_keywords = extract_keywords(query);

    let mut results: Vec<Scored<Article>> = articles
        .iter()
        .filter_map(|article| {
            let (keyword_score, text_score, score) = base_similarity(
                query,
                &query_keywords,
                &article.keywords,
                &article.descriptive_text(),
            );
            let score = score.min(1.0);
            if score <= ARTICLE_THRESHOLD {
                return None;
            }

            let explain = opts.explain.then(|| ScoreBreakdown {
                keyword_score,
                text_score,
                threshold: ARTICLE_THRESHOLD,
                ..ScoreBreakdown::default()
            });

            Some(Scored {
                record: article.clone(),
                similarity: score,
                explain,
            })
        })
        .collect();

    sort_and_truncate(&mut results, opts.limit);
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::text::extract_keywords;

    fn company(name: &str, sector: &str, location: &str, products: &str) -> Company {
        let mut c = Company {
            id: name.to_lowercase().replace(' ', "-"),
            name: name.to_string(),
            sector: sector.to_string(),
            location: location.to_string(),
            primary_products: products.to_string(),
            ..Company::default()
        };
        c.keywords = extract_keywords(&c.keyword_source_text());
        c
    }

    fn article(title: &str, description: &str) -> Article {
        let mut a = Article {
            id: title.to_lowercase().replace(' ', "-"),
            title: title.to_string(),
            description: description.to_string(),
            ..Article::default()
        };
        a.keywords = extract_keywords(&a.keyword_source_text());
        a
    }

    fn pool() -> Vec<Company> {
        vec![
            company("Shakti Looms", "Textiles", "Surat, Gujarat", "Silk sarees and fabrics"),
            company("Kaveri Spinning", "Textile", "Coimbatore, Tamil Nadu", "Cotton yarn"),
            company("Deccan Pharma", "Pharmaceutical", "Hyderabad, Telangana", "Generic tablets"),
            company("Pune Auto Parts", "Automotive", "Pune, Maharashtra", "Brake assemblies"),
            company("Malabar Spices", "Food Processing", "Kochi, Kerala", "Spice powders"),
        ]
    }

    fn assert_sorted<T>(results: &[Scored<T>]) {
        for pair in results.windows(2) {
            assert!(
                pair[0].similarity >= pair[1].similarity,
                "not sorted: {} < {}",
                pair[0].similarity,
                pair[1].similarity
            );
        }
    }

    #[test]
    fn test_generic_query_returns_all_companies() {
        let g = Gazetteer::builtin();
        let results = rank_companies("show me all companies", &pool(), &g, RankOptions::new(10));
        assert_eq!(results.len(), 5);
        for r in &results {
            assert!(r.similarity >= GENERIC_BONUS);
        }
        assert_sorted(&results);
    }

    #[test]
    fn test_generic_ties_keep_storage_order() {
        let g = Gazetteer::builtin();
        let results = rank_companies("show me all companies", &pool(), &g, RankOptions::new(10));
        let ids: Vec<&str> = results.iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(
            ids,
            vec![
                "shakti-looms",
                "kaveri-spinning",
                "deccan-pharma",
                "pune-auto-parts",
                "malabar-spices"
            ]
        );
    }

    #[test]
    fn test_sector_prefilter() {
        let g = Gazetteer::builtin();
        let results = rank_companies("textile exporters", &pool(), &g, RankOptions::new(10));
        assert_eq!(results.len(), 2);
        for r in &results {
            assert!(r.record.sector.to_lowercase().contains("textile"));
            assert!(r.similarity >= SECTOR_BONUS);
        }
    }

    #[test]
    fn test_matches_within_one_filter_are_ored() {
        let g = Gazetteer::builtin();
        let companies = vec![
            company("Alpha Weavers", "Textiles", "Surat, Gujarat", "Cotton fabric"),
            company("Kaveri Spinning", "Textile", "Coimbatore, Tamil Nadu", "Cotton yarn"),
            company("Bravo Weavers", "Textiles", "Pune, Maharashtra", "Cotton fabric"),
        ];
        let results = rank_companies(
            "textile mills in surat and pune",
            &companies,
            &g,
            RankOptions::new(10),
        );
        let ids: Vec<&str> = results.iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(ids, vec!["alpha-weavers", "bravo-weavers"]);
        assert_eq!(results[0].similarity, results[1].similarity);

        let results = rank_companies(
            "pharmaceutical or automotive makers",
            &pool(),
            &g,
            RankOptions::new(10),
        );
        let ids: Vec<&str> = results.iter().map(|r| r.record.id.as_str()).collect();
        assert_eq!(ids.len(), 2);
        assert!(ids.contains(&"deccan-pharma"));
        assert!(ids.contains(&"pune-auto-parts"));
    }

    #[test]
    fn test_location_and_sector_filters_are_anded() {
        let g = Gazetteer::builtin();
        let results = rank_companies(
            "textile mills in coimbatore",
            &pool(),
            &g,
            RankOptions::new(10).explained(),
        );
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].record.name, "Kaveri Spinning");
        let ex = results[0].explain.as_ref().unwrap();
        assert_eq!(ex.location_bonus, LOCATION_BONUS);
        assert_eq!(ex.sector_bonus, SECTOR_BONUS);
        assert_eq!(ex.generic_bonus, 0.0);
    }

    #[test]
    fn test_limit_respected() {
        let g = Gazetteer::builtin();
        let results = rank_companies("list all msmes", &pool(), &g, RankOptions::new(2));
        assert_eq!(results.len(), 2);
        assert!(rank_companies("list all msmes", &pool(), &g, RankOptions::new(0)).is_empty());
    }

    #[test]
    fn test_score_capped_at_one() {
        let g = Gazetteer::builtin();
        let pool = vec![company("Pune Auto", "Automotive", "Pune", "auto")];
        let results = rank_companies("Pune Auto Automotive auto", &pool, &g, RankOptions::new(5));
        assert_eq!(results.len(), 1);
        assert!(results[0].similarity <= 1.0);
        assert!((results[0].similarity - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_unrelated_query_filtered_by_threshold() {
        let g = Gazetteer::builtin();
        let results = rank_companies("quarterly weather outlook", &pool(), &g, RankOptions::new(10));
        assert!(results.is_empty());
    }

    #[test]
    fn test_empty_query_and_pool() {
        let g = Gazetteer::builtin();
        assert!(rank_companies("", &pool(), &g, RankOptions::new(10)).is_empty());
        assert!(rank_companies("show me companies", &[], &g, RankOptions::new(10)).is_empty());
        assert!(rank_articles("", &[article("a", "b")], RankOptions::new(10)).is_empty());
    }

    #[test]
    fn test_missing_fields_do_not_match_filters() {
        let g = Gazetteer::builtin();
        let pool = vec![Company {
            name: "Nameless Textile Unit".to_string(),
            ..Company::default()
        }];
        assert!(rank_companies("textile", &pool, &g, RankOptions::new(5)).is_empty());
    }

    #[test]
    fn test_keyword_signal_used_when_higher() {
        let g = Gazetteer::builtin();
        let mut c = company("Zeta Works", "", "", "");
        c.keywords = vec!["precision".to_string(), "gears".to_string()];
        let results = rank_companies(
            "precision gears supplier",
            &[c],
            &g,
            RankOptions::new(5).explained(),
        );
        assert_eq!(results.len(), 1);
        let ex = results[0].explain.as_ref().unwrap();
        // {precision, gears, supplier} vs {precision, gears}
        assert!((ex.keyword_score.unwrap() - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(ex.text_score, 0.0);
        assert!((results[0].similarity - 2.0 / 3.0).abs() < 1e-12);
    }

    #[test]
    fn test_rank_articles_threshold_and_order() {
        let articles = vec![
            article("Monsoon update", "Rainfall outlook for farmers"),
            article("Textile exports rise", "Surat textile exporters report strong orders"),
            article("Textile policy", "Government announces textile cluster scheme"),
        ];
        let results = rank_articles("textile exports", &articles, RankOptions::new(10));
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].record.title, "Textile exports rise");
        assert!(results.iter().all(|r| r.similarity > ARTICLE_THRESHOLD));
        assert_sorted(&results);
    }

    #[test]
    fn test_rank_articles_no_company_bonuses() {
        let articles = vec![article("Pune news", "Local roundup")];
        let results = rank_articles("show me all companies", &articles, RankOptions::new(5));
        assert!(results.is_empty());
    }

    #[test]
    fn test_is_generic_query() {
        assert!(is_generic_query("Show me textile firms"));
        assert!(is_generic_query("MSME list"));
        // "all" inside "small"
        assert!(is_generic_query("small units"));
        assert!(!is_generic_query("textile exporters"));
    }
}
