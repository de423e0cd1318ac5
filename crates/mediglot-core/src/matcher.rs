//! Single-token matching against the vocabulary.

use mediglot_vocab::MedicalVocabulary;
use rapidfuzz::distance::levenshtein;

/// Knobs for candidate selection.
#[derive(Debug, Clone)]
pub struct MatchConfig {
    /// Maximum number of candidates returned per token.
    pub max_results: usize,
    /// Minimum similarity score in [0,1] for a candidate to be kept.
    pub min_similarity: f64,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            max_results: 3,
            min_similarity: 0.6,
        }
    }
}

/// A vocabulary term suggested for an unrecognized token.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion {
    /// The suggested term, drawn verbatim from the vocabulary.
    pub term: String,
    /// Normalized Levenshtein similarity to the token, in [0,1].
    pub score: f64,
}

/// Normalized Levenshtein similarity between two strings.
///
/// `1 − distance / max(len(a), len(b))`: 1.0 for identical strings, 0.0 for
/// maximally dissimilar ones. Symmetric in its arguments.
pub fn similarity(a: &str, b: &str) -> f64 {
    levenshtein::normalized_similarity(a.chars(), b.chars())
}

/// Match one normalized token against the vocabulary.
///
/// Returns an empty vector when the token is empty or is an exact
/// (case-insensitive) member of the vocabulary — recognized tokens never
/// produce suggestions. Otherwise every vocabulary term is scored and the
/// best `max_results` candidates with `score >= min_similarity` are
/// returned, ordered by descending score with ties broken lexicographically
/// on the term.
pub fn match_token(
    token: &str,
    vocab: &MedicalVocabulary,
    config: &MatchConfig,
) -> Vec<Suggestion> {
    if token.is_empty() || vocab.contains(token) {
        return Vec::new();
    }

    let mut candidates: Vec<Suggestion> = vocab
        .iter()
        .map(|term| Suggestion {
            term: term.to_string(),
            score: similarity(token, term),
        })
        .filter(|s| s.score >= config.min_similarity)
        .collect();

    candidates.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.term.cmp(&b.term))
    });
    candidates.truncate(config.max_results);
    candidates
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(terms: &[&str]) -> MedicalVocabulary {
        MedicalVocabulary::from_lines(&terms.join("\n"))
    }

    #[test]
    fn similarity_of_identical_strings_is_one() {
        assert_eq!(similarity("hypertension", "hypertension"), 1.0);
        assert_eq!(similarity("", ""), 1.0);
    }

    #[test]
    fn similarity_is_symmetric() {
        let pairs = [
            ("hypertension", "hypertention"),
            ("asthma", "astma"),
            ("diabetes", "type"),
        ];
        for (a, b) in pairs {
            assert_eq!(similarity(a, b), similarity(b, a));
        }
    }

    #[test]
    fn similarity_of_disjoint_strings_is_zero() {
        assert_eq!(similarity("abc", "xyz"), 0.0);
    }

    #[test]
    fn similarity_matches_edit_distance_ratio() {
        // One substitution in a 12-character word: 1 - 1/12.
        let score = similarity("hypertension", "hypertention");
        assert!((score - (1.0 - 1.0 / 12.0)).abs() < 1e-9);
    }

    #[test]
    fn exact_match_returns_no_suggestions() {
        let vocab = vocab(&["hypertension", "diabetes", "asthma"]);
        let config = MatchConfig::default();
        assert!(match_token("hypertension", &vocab, &config).is_empty());
        assert!(match_token("diabetes", &vocab, &config).is_empty());
    }

    #[test]
    fn misspelling_suggests_close_term() {
        let vocab = vocab(&["hypertension"]);
        let results = match_token("hypertention", &vocab, &MatchConfig::default());
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].term, "hypertension");
        assert!(results[0].score >= 0.6);
    }

    #[test]
    fn empty_token_returns_no_suggestions() {
        let vocab = vocab(&["hypertension"]);
        assert!(match_token("", &vocab, &MatchConfig::default()).is_empty());
    }

    #[test]
    fn empty_vocabulary_returns_no_suggestions() {
        let vocab = MedicalVocabulary::empty();
        assert!(match_token("hypertention", &vocab, &MatchConfig::default()).is_empty());
    }

    #[test]
    fn distant_token_returns_no_suggestions() {
        let vocab = vocab(&["hypertension", "diabetes", "asthma"]);
        assert!(match_token("hello", &vocab, &MatchConfig::default()).is_empty());
        assert!(match_token("world", &vocab, &MatchConfig::default()).is_empty());
    }

    #[test]
    fn results_respect_max_results_and_threshold() {
        let vocab = vocab(&["nephritis", "neuritis", "enteritis", "arthritis", "gastritis"]);
        let config = MatchConfig {
            max_results: 3,
            min_similarity: 0.5,
        };
        let results = match_token("nephri", &vocab, &config);
        assert!(results.len() <= 3);
        for s in &results {
            assert!(s.score >= 0.5);
            assert!(vocab.contains(&s.term));
        }
    }

    #[test]
    fn results_sorted_by_score_then_term() {
        // "carditis" is equidistant from both; tie must break lexicographically.
        let vocab = vocab(&["carditi", "carditix"]);
        let config = MatchConfig {
            max_results: 5,
            min_similarity: 0.1,
        };
        let results = match_token("carditis", &vocab, &config);
        assert_eq!(results.len(), 2);
        assert_eq!(results[0].score, results[1].score);
        assert_eq!(results[0].term, "carditi");
        assert_eq!(results[1].term, "carditix");
    }

    #[test]
    fn match_is_deterministic() {
        let vocab = vocab(&["hypertension", "hypotension", "hyperthyroidism"]);
        let config = MatchConfig::default();
        let a = match_token("hypertenson", &vocab, &config);
        let b = match_token("hypertenson", &vocab, &config);
        assert_eq!(a, b);
    }
}
