//! Multi-label query intent routing.
//!
//! A query matches an intent when its lowercased text contains any keyword
//! from that intent's list. Intents are not exclusive: every matched
//! intent's workflow runs and the outputs are merged. A query that matches
//! nothing routes to [`Intent::Fallback`].

use serde::Serialize;

pub const FINANCIAL_KEYWORDS: &[&str] = &[
    "financial", "revenue", "profit", "performance", "ratios", "roa", "roe", "debt", "equity",
    "stock", "market cap",
];

pub const NEWS_KEYWORDS: &[&str] = &[
    "news", "latest", "recent", "update", "trend", "market", "policy", "government", "industry",
];

pub const GROWTH_KEYWORDS: &[&str] = &[
    "growth", "strategy", "expansion", "opportunity", "development", "plan", "recommendation",
];

/// A query-purpose label.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    Financial,
    News,
    Growth,
    /// No keyword list matched.
    Fallback,
}

impl Intent {
    pub fn as_str(&self) -> &'static str {
        match self {
            Intent::Financial => "financial",
            Intent::News => "news",
            Intent::Growth => "growth",
            Intent::Fallback => "fallback",
        }
    }

    /// Name of the analysis workflow this intent runs.
    pub fn workflow(&self) -> &'static str {
        match self {
            Intent::Financial => "financial_analyst",
            Intent::News => "news_analyst",
            Intent::Growth => "growth_strategist",
            Intent::Fallback => "basic_search",
        }
    }

    fn keywords(&self) -> &'static [&'static str] {
        match self {
            Intent::Financial => FINANCIAL_KEYWORDS,
            Intent::News => NEWS_KEYWORDS,
            Intent::Growth => GROWTH_KEYWORDS,
            Intent::Fallback => &[],
        }
    }
}

impl std::fmt::Display for Intent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

const CLASSIFIED: [Intent; 3] = [Intent::Financial, Intent::News, Intent::Growth];

/// The intents matched by one query, in canonical order.
///
/// Never empty: contains exactly [`Intent::Fallback`] when nothing matched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct IntentSet(Vec<Intent>);

impl IntentSet {
    pub fn contains(&self, intent: Intent) -> bool {
        self.0.contains(&intent)
    }

    pub fn is_fallback(&self) -> bool {
        self.0 == [Intent::Fallback]
    }

    pub fn iter(&self) -> impl Iterator<Item = Intent> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Always false; kept for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// True if the company ranking feeds any matched workflow.
    pub fn needs_companies(&self) -> bool {
        self.contains(Intent::Financial) || self.contains(Intent::Growth) || self.is_fallback()
    }

    /// True if the article ranking feeds any matched workflow.
    pub fn needs_articles(&self) -> bool {
        self.contains(Intent::News) || self.is_fallback()
    }
}

fn matches(query_lower: &str, intent: Intent) -> bool {
    intent.keywords().iter().any(|kw| query_lower.contains(kw))
}

/// Classify `query` into one or more intents.
///
/// ```rust
/// use msme_core::intent::{classify_intent, Intent};
///
/// let intents = classify_intent("What is the latest growth strategy news for textile MSMEs?");
/// assert!(intents.contains(Intent::News));
/// assert!(intents.contains(Intent::Growth));
/// assert!(!intents.contains(Intent::Financial));
/// ```
pub fn classify_intent(query: &str) -> IntentSet {
    let query_lower = query.to_lowercase();
    let matched: Vec<Intent> = CLASSIFIED
        .into_iter()
        .filter(|intent| matches(&query_lower, *intent))
        .collect();
    if matched.is_empty() {
        IntentSet(vec![Intent::Fallback])
    } else {
        IntentSet(matched)
    }
}

/// Number of matching keywords per intent list.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct IntentScores {
    pub financial: usize,
    pub news: usize,
    pub growth: usize,
}

impl IntentScores {
    /// Highest-scoring intent name, or `"general"` when nothing matched.
    ///
    /// Ties resolve in canonical order (financial, news, growth).
    pub fn primary(&self) -> &'static str {
        let ranked = [
            (Intent::Financial, self.financial),
            (Intent::News, self.news),
            (Intent::Growth, self.growth),
        ];
        let mut best: Option<(Intent, usize)> = None;
        for (intent, score) in ranked {
            if score > best.map_or(0, |(_, s)| s) {
                best = Some((intent, score));
            }
        }
        best.map_or("general", |(intent, _)| intent.as_str())
    }

    pub fn max(&self) -> usize {
        self.financial.max(self.news).max(self.growth)
    }
}

/// Count keyword hits per intent list for `query`.
pub fn intent_scores(query: &str) -> IntentScores {
    let query_lower = query.to_lowercase();
    let count = |intent: Intent| {
        intent
            .keywords()
            .iter()
            .filter(|kw| query_lower.contains(*kw))
            .count()
    };
    IntentScores {
        financial: count(Intent::Financial),
        news: count(Intent::News),
        growth: count(Intent::Growth),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_and_growth() {
        let intents = classify_intent("What is the latest growth strategy news for textile MSMEs?");
        assert_eq!(intents.iter().collect::<Vec<_>>(), vec![Intent::News, Intent::Growth]);
        assert!(!intents.is_fallback());
    }

    #[test]
    fn test_no_match_is_fallback() {
        let intents = classify_intent("hello");
        assert!(intents.is_fallback());
        assert_eq!(intents.len(), 1);
        assert_eq!(intents.iter().next().unwrap().workflow(), "basic_search");
    }

    #[test]
    fn test_all_three() {
        let intents = classify_intent("Revenue trend and expansion plan");
        assert_eq!(
            intents.iter().collect::<Vec<_>>(),
            vec![Intent::Financial, Intent::News, Intent::Growth]
        );
    }

    #[test]
    fn test_case_insensitive_substring() {
        // "market cap" also contains the news keyword "market"
        let intents = classify_intent("MARKET CAP of listed firms");
        assert!(intents.contains(Intent::Financial));
        assert!(intents.contains(Intent::News));
        // "roe" inside "heroes"
        assert!(classify_intent("local heroes").contains(Intent::Financial));
    }

    #[test]
    fn test_needs_candidates() {
        let news_only = classify_intent("latest news");
        assert!(news_only.needs_articles());
        assert!(!news_only.needs_companies());

        let fallback = classify_intent("hello");
        assert!(fallback.needs_articles());
        assert!(fallback.needs_companies());
    }

    #[test]
    fn test_intent_scores_and_primary() {
        let scores = intent_scores("latest news on market policy and growth");
        assert_eq!(scores.news, 4);
        assert_eq!(scores.growth, 1);
        assert_eq!(scores.financial, 0);
        assert_eq!(scores.primary(), "news");
        assert_eq!(scores.max(), 4);
    }

    #[test]
    fn test_primary_general_and_ties() {
        assert_eq!(intent_scores("hello").primary(), "general");
        assert_eq!(intent_scores("profit growth").primary(), "financial");
    }

    #[test]
    fn test_intent_set_serializes_as_list() {
        let v = serde_json::to_value(classify_intent("debt news")).unwrap();
        assert_eq!(v, serde_json::json!(["financial", "news"]));
    }
}
