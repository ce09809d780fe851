//! Condenses a recent window of turns into a short narrative summary plus a
//! bounded list of discrete key facts.
//!
//! The summary is a cheap template over the raw window, not model-backed; a
//! higher-quality summarizer can be swapped in behind the same contract
//! (window of turns + persona name in, short text out).

use std::sync::OnceLock;

use regex::Regex;

use crate::db::models::{ChatTurn, Role};
use crate::memory::prefix_chars;

/// Compression fires every time the transcript reaches a multiple of this.
pub const COMPRESSION_INTERVAL: usize = 6;

/// The compressed form of one window, ready for `update_summary`.
#[derive(Debug, Clone, PartialEq)]
pub struct CompressedWindow {
    pub summary: String,
    pub key_facts: Vec<String>,
}

/// Whether a transcript of `turn_count` turns is due for compression.
pub fn should_compress(turn_count: usize) -> bool {
    turn_count > 0 && turn_count % COMPRESSION_INTERVAL == 0
}

/// Condense the given window (normally the most recent 6 turns).
pub fn compress(window: &[ChatTurn], persona_name: &str) -> CompressedWindow {
    CompressedWindow {
        summary: summarize(window, persona_name),
        key_facts: extract_key_facts(window),
    }
}

fn summarize(window: &[ChatTurn], persona_name: &str) -> String {
    let conversation = window
        .iter()
        .map(|turn| format!("{}: {}", role_label(turn.role), turn.content))
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "Recent conversation with {persona_name} covered: {}...",
        prefix_chars(&conversation, 300)
    )
}

fn role_label(role: Role) -> &'static str {
    match role {
        Role::System => "system",
        Role::User => "user",
        Role::Assistant => "assistant",
    }
}

fn name_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"my name is (\w+)").expect("valid regex"))
}

/// Scan the window's user turns for discrete facts, in turn order, capped at 5.
fn extract_key_facts(window: &[ChatTurn]) -> Vec<String> {
    let mut facts = Vec::new();

    for turn in window.iter().filter(|t| t.role == Role::User) {
        let lower = turn.content.to_lowercase();

        if let Some(caps) = name_pattern().captures(&lower) {
            facts.push(format!("User's name: {}", &caps[1]));
        }
        if lower.contains("i work") || lower.contains("my job") {
            facts.push(format!("Work/Job mentioned: {}", prefix_chars(&turn.content, 100)));
        }
        if lower.contains("i live") {
            facts.push(format!("Location mentioned: {}", prefix_chars(&turn.content, 100)));
        }
    }

    facts.truncate(5);
    facts
}

#[cfg(test)]
mod tests {
    use super::*;

    fn window(turns: &[(&str, Role)]) -> Vec<ChatTurn> {
        turns
            .iter()
            .map(|(content, role)| ChatTurn { role: *role, content: (*content).into() })
            .collect()
    }

    #[test]
    fn test_should_compress_on_multiples_of_six() {
        assert!(!should_compress(0));
        assert!(!should_compress(5));
        assert!(should_compress(6));
        assert!(!should_compress(7));
        assert!(should_compress(12));
    }

    #[test]
    fn test_summary_names_persona_and_embeds_turns() {
        let w = window(&[("hello there", Role::User), ("hi!", Role::Assistant)]);
        let out = compress(&w, "Piyush Garg");
        assert!(out.summary.starts_with("Recent conversation with Piyush Garg covered:"));
        assert!(out.summary.contains("user: hello there"));
        assert!(out.summary.contains("assistant: hi!"));
        assert!(out.summary.ends_with("..."));
    }

    #[test]
    fn test_summary_truncates_long_windows() {
        let long_turn = "w".repeat(400);
        let w = window(&[(long_turn.as_str(), Role::User)]);
        let out = compress(&w, "Ada");
        let prefix = "Recent conversation with Ada covered: ";
        assert_eq!(out.summary.chars().count(), prefix.chars().count() + 303);
    }

    #[test]
    fn test_name_capture_is_case_folded() {
        let w = window(&[("my name is Sam", Role::User)]);
        let out = compress(&w, "Ada");
        assert_eq!(out.key_facts, vec!["User's name: sam"]);
    }

    #[test]
    fn test_assistant_turns_are_ignored_for_facts() {
        let w = window(&[("my name is Eve", Role::Assistant)]);
        assert!(compress(&w, "Ada").key_facts.is_empty());
    }

    #[test]
    fn test_work_and_location_facts_in_turn_order() {
        let w = window(&[
            ("I work at a bakery", Role::User),
            ("nice!", Role::Assistant),
            ("and i live near the river", Role::User),
        ]);
        let facts = compress(&w, "Ada").key_facts;
        assert_eq!(facts.len(), 2);
        assert_eq!(facts[0], "Work/Job mentioned: I work at a bakery");
        assert_eq!(facts[1], "Location mentioned: and i live near the river");
    }

    #[test]
    fn test_facts_capped_at_five() {
        // Each turn produces two facts (name + work).
        let w = window(&[
            ("my name is Ann, i work in a lab", Role::User),
            ("my name is Ann, i work in a lab", Role::User),
            ("my name is Ann, i work in a lab", Role::User),
        ]);
        assert_eq!(compress(&w, "Ada").key_facts.len(), 5);
    }

    #[test]
    fn test_fact_snippets_bounded_to_100_chars() {
        let msg = format!("i work {}", "z".repeat(200));
        let w = window(&[(msg.as_str(), Role::User)]);
        let fact = &compress(&w, "Ada").key_facts[0];
        assert_eq!(fact.chars().count(), "Work/Job mentioned: ".chars().count() + 100);
    }
}
