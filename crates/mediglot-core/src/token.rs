//! Token normalization for suggestion requests.

/// Normalize a single token: lower-case and strip leading/trailing
/// punctuation.
///
/// Stripping edge punctuation is a deliberate fix — without it, terms
/// adjacent to sentence punctuation ("hypertension," or "asthma.") would
/// never match the vocabulary.
pub fn normalize_token(token: &str) -> String {
    token
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase()
}

/// Split text on whitespace and normalize each token, dropping anything
/// that normalizes to empty (lone punctuation, for example).
pub fn tokenize(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split_whitespace()
        .map(normalize_token)
        .filter(|t| !t.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_lowercases() {
        assert_eq!(normalize_token("Hypertension"), "hypertension");
        assert_eq!(normalize_token("ASTHMA"), "asthma");
    }

    #[test]
    fn normalize_strips_edge_punctuation() {
        assert_eq!(normalize_token("hypertension,"), "hypertension");
        assert_eq!(normalize_token("asthma."), "asthma");
        assert_eq!(normalize_token("(diabetes);"), "diabetes");
        assert_eq!(normalize_token("fever:"), "fever");
    }

    #[test]
    fn normalize_keeps_interior_punctuation() {
        // Interior hyphens are part of the token, only edges are stripped.
        assert_eq!(normalize_token("beta-blocker"), "beta-blocker");
    }

    #[test]
    fn normalize_handles_pure_punctuation() {
        assert_eq!(normalize_token("..."), "");
        assert_eq!(normalize_token("-"), "");
    }

    #[test]
    fn tokenize_splits_on_whitespace() {
        let tokens: Vec<String> = tokenize("The patient  has\thypertension.\n").collect();
        assert_eq!(tokens, vec!["the", "patient", "has", "hypertension"]);
    }

    #[test]
    fn tokenize_drops_empty_tokens() {
        let tokens: Vec<String> = tokenize("fever - chills").collect();
        assert_eq!(tokens, vec!["fever", "chills"]);
    }

    #[test]
    fn tokenize_empty_text() {
        assert_eq!(tokenize("").count(), 0);
        assert_eq!(tokenize("   \n\t").count(), 0);
    }
}
