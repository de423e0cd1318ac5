//! Whole-text suggestion aggregation.

use std::collections::{BTreeSet, HashSet};

use mediglot_vocab::MedicalVocabulary;

use crate::matcher::{match_token, MatchConfig, Suggestion};
use crate::token::tokenize;

/// Suggest vocabulary terms for unrecognized words in `text`, using the
/// default matching knobs.
///
/// Tokens are whitespace-split, lower-cased, and stripped of edge
/// punctuation before matching. The result is a de-duplicated set of term
/// names; an empty vocabulary always yields an empty set.
pub fn suggest(text: &str, vocab: &MedicalVocabulary) -> BTreeSet<String> {
    suggest_with_config(text, vocab, &MatchConfig::default())
}

/// [`suggest`] with explicit matching knobs.
pub fn suggest_with_config(
    text: &str,
    vocab: &MedicalVocabulary,
    config: &MatchConfig,
) -> BTreeSet<String> {
    let mut suggestions = BTreeSet::new();
    // Tokens repeat in real text; match each distinct token once.
    let mut seen = HashSet::new();

    for token in tokenize(text) {
        if !seen.insert(token.clone()) {
            continue;
        }
        for s in match_token(&token, vocab, config) {
            suggestions.insert(s.term);
        }
    }
    suggestions
}

/// Like [`suggest_with_config`] but keeps the similarity scores.
///
/// When the same term is suggested for several tokens, the highest score
/// wins. Results are ordered by descending score, ties broken by term.
pub fn suggest_detailed(
    text: &str,
    vocab: &MedicalVocabulary,
    config: &MatchConfig,
) -> Vec<Suggestion> {
    let mut best: std::collections::HashMap<String, f64> = std::collections::HashMap::new();
    let mut seen = HashSet::new();

    for token in tokenize(text) {
        if !seen.insert(token.clone()) {
            continue;
        }
        for s in match_token(&token, vocab, config) {
            let entry = best.entry(s.term).or_insert(s.score);
            if s.score > *entry {
                *entry = s.score;
            }
        }
    }

    let mut results: Vec<Suggestion> = best
        .into_iter()
        .map(|(term, score)| Suggestion { term, score })
        .collect();
    results.sort_by(|a, b| {
        b.score
            .partial_cmp(&a.score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.term.cmp(&b.term))
    });
    results
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vocab(terms: &[&str]) -> MedicalVocabulary {
        MedicalVocabulary::from_lines(&terms.join("\n"))
    }

    #[test]
    fn recognized_terms_produce_no_suggestions() {
        let vocab = vocab(&["hypertension", "diabetes", "asthma"]);
        let result = suggest("The patient has hypertension", &vocab);
        assert!(result.is_empty());
    }

    #[test]
    fn unrelated_text_produces_no_suggestions() {
        let vocab = vocab(&["hypertension", "diabetes", "asthma"]);
        let result = suggest("Hello world", &vocab);
        assert!(result.is_empty());
    }

    #[test]
    fn misspelling_is_caught() {
        let vocab = vocab(&["hypertension"]);
        let result = suggest("patient reports hypertention", &vocab);
        assert_eq!(result, BTreeSet::from(["hypertension".to_string()]));
    }

    #[test]
    fn empty_vocabulary_never_suggests() {
        let vocab = MedicalVocabulary::empty();
        assert!(suggest("any text at all hypertention", &vocab).is_empty());
        assert!(suggest("", &vocab).is_empty());
    }

    #[test]
    fn punctuation_adjacent_terms_still_match() {
        let vocab = vocab(&["hypertension", "diabetes"]);
        // Exact terms with trailing punctuation must be recognized, not
        // flagged as near-misses of themselves.
        let result = suggest("Diagnosis: hypertension, diabetes.", &vocab);
        assert!(result.is_empty());
    }

    #[test]
    fn suggestions_are_deduplicated_across_tokens() {
        let vocab = vocab(&["hypertension"]);
        let result = suggest("hypertention hypertantion hypertention", &vocab);
        assert_eq!(result.len(), 1);
    }

    #[test]
    fn suggest_is_idempotent() {
        let vocab = vocab(&["hypertension", "diabetes", "asthma"]);
        let text = "pt with hypertention and diabets, denies astma";
        assert_eq!(suggest(text, &vocab), suggest(text, &vocab));
    }

    #[test]
    fn suggestions_come_from_vocabulary_only() {
        let vocab = vocab(&["hypertension", "diabetes", "asthma"]);
        let result = suggest("hypertention diabets astma", &vocab);
        assert!(!result.is_empty());
        for term in &result {
            assert!(vocab.contains(term));
        }
    }

    #[test]
    fn detailed_keeps_best_score_per_term() {
        let vocab = vocab(&["hypertension"]);
        let config = MatchConfig::default();
        // Two misspellings at different distances from the same term.
        let results = suggest_detailed("hypertention hyprtansion", &vocab, &config);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].term, "hypertension");
        // Best of the two: one substitution out of twelve characters.
        assert!((results[0].score - (1.0 - 1.0 / 12.0)).abs() < 1e-9);
    }

    #[test]
    fn detailed_sorted_by_descending_score() {
        let vocab = vocab(&["hypertension", "hypotension"]);
        let config = MatchConfig {
            max_results: 5,
            min_similarity: 0.5,
        };
        let results = suggest_detailed("hypertention", &vocab, &config);
        assert!(results.len() >= 2);
        for pair in results.windows(2) {
            assert!(pair[0].score >= pair[1].score);
        }
    }
}
