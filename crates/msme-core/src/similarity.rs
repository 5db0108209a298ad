//! Lexical similarity between text spans and keyword sets.
//!
//! Both measures are Jaccard similarity (`|A ∩ B| / |A ∪ B|`) and are total:
//! empty input scores `0.0` instead of failing.

use std::collections::HashSet;
use std::hash::Hash;

use crate::text::normalize;

/// Jaccard similarity of two sets. Returns `0.0` when either set is empty.
pub fn jaccard<T: Eq + Hash>(a: &HashSet<T>, b: &HashSet<T>) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.union(b).count();
    intersection as f64 / union as f64
}

/// Similarity of the normalized token sets of `a` and `b`, in `[0, 1]`.
///
/// ```rust
/// use msme_core::similarity::text_similarity;
///
/// assert_eq!(text_similarity("textile mills", "Textile Mills"), 1.0);
/// assert_eq!(text_similarity("", "textile"), 0.0);
/// ```
pub fn text_similarity(a: &str, b: &str) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let left: HashSet<String> = normalize(a).into_iter().collect();
    let right: HashSet<String> = normalize(b).into_iter().collect();
    jaccard(&left, &right)
}

/// Similarity of two keyword collections treated as sets, in `[0, 1]`.
pub fn keyword_set_similarity<A, B>(a: &[A], b: &[B]) -> f64
where
    A: AsRef<str>,
    B: AsRef<str>,
{
    let left: HashSet<&str> = a.iter().map(AsRef::as_ref).collect();
    let right: HashSet<&str> = b.iter().map(AsRef::as_ref).collect();
    jaccard(&left, &right)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_similarity_identical() {
        let s = "auto components manufacturer in pune";
        assert!((text_similarity(s, s) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_text_similarity_empty_either_side() {
        assert_eq!(text_similarity("", "anything"), 0.0);
        assert_eq!(text_similarity("anything", ""), 0.0);
        assert_eq!(text_similarity("!!!", "anything"), 0.0);
    }

    #[test]
    fn test_text_similarity_partial_overlap() {
        // {leather, goods, kanpur} vs {leather, exporters, kanpur} → 2 / 4
        let sim = text_similarity("leather goods kanpur", "Leather exporters, Kanpur");
        assert!((sim - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_text_similarity_disjoint() {
        assert_eq!(text_similarity("solar panels", "textile looms"), 0.0);
    }

    #[test]
    fn test_text_similarity_symmetric_and_bounded() {
        let pairs = [
            ("food processing", "processing of food grains"),
            ("chemicals gujarat", "gujarat petrochemicals hub"),
            ("a b c", "c d"),
        ];
        for (a, b) in pairs {
            let ab = text_similarity(a, b);
            let ba = text_similarity(b, a);
            assert!((ab - ba).abs() < 1e-12);
            assert!((0.0..=1.0).contains(&ab), "out of range: {}", ab);
        }
    }

    #[test]
    fn test_keyword_set_similarity_ignores_duplicates() {
        let a = ["textile", "textile", "export"];
        let b = ["export", "textile"];
        assert!((keyword_set_similarity(&a, &b) - 1.0).abs() < 1e-12);
    }

    #[test]
    fn test_keyword_set_similarity_empty() {
        let empty: [&str; 0] = [];
        assert_eq!(keyword_set_similarity(&empty, &["steel"]), 0.0);
        assert_eq!(keyword_set_similarity(&["steel"], &empty), 0.0);
    }

    #[test]
    fn test_keyword_set_similarity_mixed_types() {
        let owned = vec!["pharma".to_string(), "hyderabad".to_string()];
        let sim = keyword_set_similarity(&owned, &["pharma", "bulk", "drugs"]);
        assert!((sim - 0.25).abs() < 1e-12);
    }
}
