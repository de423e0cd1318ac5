//! Medical terminology vocabulary for term validation.
//!
//! This crate loads and holds the controlled vocabulary that the suggestion
//! engine checks clinical text against. The vocabulary is immutable after
//! construction and safe to share across request handlers.
//!
//! # Loading Modes
//!
//! - **Embedded**: Load the compiled-in term list with [`MedicalVocabulary::embedded()`]
//! - **File-based**: Load from a file path with [`MedicalVocabulary::from_file()`]
//!   (`.json` files are parsed as a JSON array of strings, anything else as
//!   one term per line)

use std::collections::HashSet;
use std::path::Path;

use thiserror::Error;

/// Error loading a vocabulary definition.
#[derive(Debug, Error)]
pub enum VocabError {
    #[error("failed to read vocabulary file: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse vocabulary JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("vocabulary JSON must be an array of strings")]
    NotAnArray,
}

/// An immutable set of normalized medical terms.
///
/// All terms are lower-cased on load; duplicates collapse and empty entries
/// are dropped, so `contains` is a case-insensitive exact membership check.
/// An empty vocabulary is valid — the matcher then never produces
/// suggestions.
#[derive(Debug)]
pub struct MedicalVocabulary {
    terms: HashSet<String>,
}

impl MedicalVocabulary {
    /// Load the embedded term list (~500 common clinical terms).
    pub fn embedded() -> Self {
        Self::from_lines(include_str!("../data/medical_terms.txt"))
    }

    /// A vocabulary with no terms.
    ///
    /// Used as the degraded-mode fallback when the configured source cannot
    /// be loaded: translation keeps working, suggestions are simply absent.
    pub fn empty() -> Self {
        Self {
            terms: HashSet::new(),
        }
    }

    /// Load a vocabulary from a file path.
    ///
    /// Files ending in `.json` must contain a JSON array of strings (the
    /// format the original deployment shipped as `medical_terms.json`); any
    /// other extension is treated as line-oriented text.
    pub fn from_file(path: &Path) -> Result<Self, VocabError> {
        let content = std::fs::read_to_string(path)?;
        if path.extension().is_some_and(|ext| ext == "json") {
            Self::from_json(&content)
        } else {
            Ok(Self::from_lines(&content))
        }
    }

    /// Load a vocabulary from a file, falling back to an empty vocabulary on
    /// any error. The failure is logged, not surfaced.
    pub fn load_or_empty(path: &Path) -> Self {
        match Self::from_file(path) {
            Ok(vocab) => vocab,
            Err(e) => {
                tracing::warn!(
                    path = %path.display(),
                    error = %e,
                    "failed to load medical vocabulary, term suggestions disabled"
                );
                Self::empty()
            }
        }
    }

    /// Load a vocabulary from line-oriented text.
    ///
    /// Each line holds one term. Empty lines and lines starting with '#'
    /// are ignored.
    pub fn from_lines(content: &str) -> Self {
        let terms = content
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty() && !l.starts_with('#'))
            .map(|l| l.to_lowercase())
            .collect();
        Self { terms }
    }

    /// Load a vocabulary from a JSON array of strings.
    pub fn from_json(content: &str) -> Result<Self, VocabError> {
        let value: serde_json::Value = serde_json::from_str(content)?;
        let entries = value.as_array().ok_or(VocabError::NotAnArray)?;
        let terms = entries
            .iter()
            .filter_map(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| s.to_lowercase())
            .collect();
        Ok(Self { terms })
    }

    /// Check if a term exists in the vocabulary. Case-insensitive.
    pub fn contains(&self, term: &str) -> bool {
        self.terms.contains(&term.to_lowercase())
    }

    /// Iterate over the normalized terms, in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.terms.iter().map(String::as_str)
    }

    /// Number of terms in the vocabulary.
    pub fn len(&self) -> usize {
        self.terms.len()
    }

    /// Whether the vocabulary holds no terms.
    pub fn is_empty(&self) -> bool {
        self.terms.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn embedded_vocabulary_loads() {
        let vocab = MedicalVocabulary::embedded();
        assert!(vocab.len() > 300, "expected >300 terms, got {}", vocab.len());
    }

    #[test]
    fn embedded_contains_common_terms() {
        let vocab = MedicalVocabulary::embedded();

        assert!(vocab.contains("hypertension"));
        assert!(vocab.contains("diabetes"));
        assert!(vocab.contains("asthma"));
        assert!(vocab.contains("anticoagulant"));
        assert!(vocab.contains("tachycardia"));
    }

    #[test]
    fn contains_is_case_insensitive() {
        let vocab = MedicalVocabulary::embedded();

        assert!(vocab.contains("Hypertension"));
        assert!(vocab.contains("HYPERTENSION"));
        assert!(vocab.contains("hypertension"));
    }

    #[test]
    fn does_not_contain_gibberish() {
        let vocab = MedicalVocabulary::embedded();

        assert!(!vocab.contains("asdfghjkl"));
        assert!(!vocab.contains("xyzzy123"));
    }

    #[test]
    fn from_lines_skips_comments_and_blanks() {
        let content = "Hypertension\ndiabetes\n# comment\n\nAsthma";
        let vocab = MedicalVocabulary::from_lines(content);

        assert_eq!(vocab.len(), 3);
        assert!(vocab.contains("hypertension"));
        assert!(vocab.contains("asthma"));
    }

    #[test]
    fn from_lines_deduplicates_after_normalization() {
        let vocab = MedicalVocabulary::from_lines("Asthma\nasthma\nASTHMA");
        assert_eq!(vocab.len(), 1);
    }

    #[test]
    fn from_json_parses_string_array() {
        let vocab = MedicalVocabulary::from_json(r#"["Hypertension", "diabetes", ""]"#).unwrap();
        assert_eq!(vocab.len(), 2);
        assert!(vocab.contains("hypertension"));
        assert!(vocab.contains("diabetes"));
    }

    #[test]
    fn from_json_rejects_non_array() {
        let err = MedicalVocabulary::from_json(r#"{"terms": []}"#).unwrap_err();
        assert!(matches!(err, VocabError::NotAnArray));
    }

    #[test]
    fn from_file_dispatches_on_extension() {
        let dir = tempfile::tempdir().unwrap();

        let json_path = dir.path().join("terms.json");
        let mut f = std::fs::File::create(&json_path).unwrap();
        f.write_all(br#"["diabetes"]"#).unwrap();
        let vocab = MedicalVocabulary::from_file(&json_path).unwrap();
        assert!(vocab.contains("diabetes"));

        let txt_path = dir.path().join("terms.txt");
        let mut f = std::fs::File::create(&txt_path).unwrap();
        f.write_all(b"asthma\n").unwrap();
        let vocab = MedicalVocabulary::from_file(&txt_path).unwrap();
        assert!(vocab.contains("asthma"));
    }

    #[test]
    fn load_or_empty_falls_back_on_missing_file() {
        let vocab = MedicalVocabulary::load_or_empty(Path::new("/nonexistent/terms.json"));
        assert!(vocab.is_empty());
    }

    #[test]
    fn empty_vocabulary_contains_nothing() {
        let vocab = MedicalVocabulary::empty();
        assert!(vocab.is_empty());
        assert!(!vocab.contains("hypertension"));
    }
}
