//! Token-overlap similarity between two text fragments.

/// Score how similar `candidate` is to `query`.
///
/// Both texts are case-folded and split on whitespace. A query token longer
/// than 3 characters counts as a match when any candidate token contains it
/// as a substring or vice versa, which tolerates stems and prefixes
/// ("programming" matches "program"). The count is normalized by the larger
/// token count, so the result is in `[0, 1]`.
///
/// An empty text is treated as a single empty token: the denominator stays
/// >= 1 and the score degenerates to 0 rather than dividing by zero.
pub fn score(query: &str, candidate: &str) -> f64 {
    let query_tokens = tokenize(query);
    let candidate_tokens = tokenize(candidate);

    let matches = query_tokens
        .iter()
        .filter(|q| {
            q.chars().count() > 3
                && candidate_tokens
                    .iter()
                    .any(|c| c.contains(q.as_str()) || q.contains(c.as_str()))
        })
        .count();

    matches as f64 / query_tokens.len().max(candidate_tokens.len()) as f64
}

fn tokenize(text: &str) -> Vec<String> {
    let tokens: Vec<String> = text
        .to_lowercase()
        .split_whitespace()
        .map(str::to_owned)
        .collect();
    if tokens.is_empty() {
        vec![String::new()]
    } else {
        tokens
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identical_text_beats_unrelated_text() {
        assert!(score("hello world", "hello world") > score("hello world", "goodbye moon"));
    }

    #[test]
    fn test_substring_containment_matches_stems() {
        // "programming" contains "program"
        assert!(score("i love programming", "a program she wrote") > 0.0);
    }

    #[test]
    fn test_short_tokens_never_match() {
        // every token is <= 3 chars
        assert_eq!(score("the cat sat", "the cat sat"), 0.0);
    }

    #[test]
    fn test_empty_inputs_score_zero() {
        assert_eq!(score("", "hello world"), 0.0);
        assert_eq!(score("hello world", ""), 0.0);
        assert_eq!(score("", ""), 0.0);
    }

    #[test]
    fn test_case_folded() {
        assert!(score("RUST programming", "rust PROGRAMMING") > 0.0);
    }

    #[test]
    fn test_normalized_by_longer_text() {
        let short = score("database", "database");
        let long = score("database", "database indexes and query planners everywhere");
        assert!(short > long);
    }
}
