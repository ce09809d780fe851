//! Decides whether a finished user/assistant exchange contains a durable
//! fact worth remembering.

use crate::memory::prefix_chars;

/// Phrases that signal the user is disclosing something about themselves.
const SELF_DISCLOSURE_MARKERS: &[&str] = &[
    "my name is",
    "i am",
    "i work",
    "i like",
    "i don't like",
    "i prefer",
    "my favorite",
    "i live",
    "i study",
    "my job",
    "my hobby",
    "i enjoy",
    "remember that",
    "important:",
    "note:",
    "by the way",
];

/// A memory candidate produced from one exchange.
#[derive(Debug, Clone, PartialEq)]
pub struct FactCandidate {
    pub content: String,
    pub context: String,
    pub importance: i32,
}

/// Inspect one completed exchange and produce at most one memory candidate.
///
/// Policy, first match wins:
/// 1. user message contains a self-disclosure marker -> `User shared: ...`
/// 2. reply mentions "remember" or "note"            -> `AI noted: ...`
/// 3. otherwise nothing is remembered.
pub fn extract(user_message: &str, reply: &str) -> Option<FactCandidate> {
    let context = format!("User asked: \"{user_message}\"");

    let lower_user = user_message.to_lowercase();
    if SELF_DISCLOSURE_MARKERS.iter().any(|marker| lower_user.contains(marker)) {
        return Some(FactCandidate {
            content: format!("User shared: {}", clipped(user_message)),
            context,
            importance: 6,
        });
    }

    let lower_reply = reply.to_lowercase();
    if lower_reply.contains("remember") || lower_reply.contains("note") {
        return Some(FactCandidate {
            content: format!("AI noted: {}", clipped(reply)),
            context,
            importance: 6,
        });
    }

    None
}

/// First 200 chars, with an ellipsis only when something was cut.
fn clipped(text: &str) -> String {
    if text.chars().count() > 200 {
        format!("{}...", prefix_chars(text, 200))
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_self_disclosure_creates_user_shared_fact() {
        let fact = extract("My name is Alex and I live in Pune", "Nice to meet you!").unwrap();
        assert!(fact.content.starts_with("User shared: My name is Alex and I live in Pune"));
        assert_eq!(fact.context, "User asked: \"My name is Alex and I live in Pune\"");
        assert_eq!(fact.importance, 6);
    }

    #[test]
    fn test_marker_match_is_case_insensitive() {
        let fact = extract("BY THE WAY, i hate mondays", "Noted").unwrap();
        assert!(fact.content.starts_with("User shared:"));
    }

    #[test]
    fn test_no_marker_and_plain_reply_yields_nothing() {
        assert_eq!(extract("What's the weather?", "It's sunny today"), None);
    }

    #[test]
    fn test_reply_mentioning_remember_is_noted() {
        let fact = extract("ok thanks", "I'll remember you said that.").unwrap();
        assert!(fact.content.starts_with("AI noted: I'll remember you said that."));
        assert_eq!(fact.importance, 6);
    }

    #[test]
    fn test_user_marker_takes_precedence_over_reply() {
        let fact = extract("i like jazz", "I'll remember that!").unwrap();
        assert!(fact.content.starts_with("User shared:"));
    }

    #[test]
    fn test_long_message_truncated_with_ellipsis() {
        let long = format!("my name is {}", "a".repeat(300));
        let fact = extract(&long, "hello").unwrap();
        // "User shared: " + 200 chars + "..."
        assert!(fact.content.ends_with("..."));
        assert_eq!(fact.content.chars().count(), "User shared: ".chars().count() + 203);
    }
}
