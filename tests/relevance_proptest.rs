//! Property tests for the memory retrieval invariants.

use proptest::prelude::*;

use persona_chat_core::memory::MemoryStore;

/// A small pool of persona slugs so memories cluster across tenants.
fn persona_slug() -> impl Strategy<Value = String> {
    prop_oneof![
        Just("hitesh-choudhary".to_string()),
        Just("piyush-garg".to_string()),
        Just("custom-mentor".to_string()),
    ]
}

fn memory_input() -> impl Strategy<Value = (String, String, String, i32)> {
    (
        persona_slug(),
        "[a-z ]{0,80}",
        "[a-z ]{0,40}",
        1..=10i32,
    )
}

proptest! {
    #[test]
    fn relevant_memories_respect_limit_and_tenancy(
        inputs in proptest::collection::vec(memory_input(), 0..30),
        query in "[a-z ]{0,60}",
        target in persona_slug(),
        limit in 0usize..8,
    ) {
        let store = MemoryStore::in_memory();
        for (persona, content, context, importance) in &inputs {
            store.add_memory(persona, content, context, *importance);
        }

        let results = store.get_relevant_memories(&target, &query, limit);

        // At most `limit` items, all owned by the queried persona.
        prop_assert!(results.len() <= limit);
        prop_assert!(results.iter().all(|m| m.persona_id == target));

        // Never fewer than min(limit, persona's memory count).
        let owned = inputs.iter().filter(|(p, ..)| *p == target).count();
        prop_assert_eq!(results.len(), owned.min(limit));
    }

    #[test]
    fn relevant_memories_sorted_by_nonincreasing_composite_score(
        inputs in proptest::collection::vec(memory_input(), 1..25),
        query in "[a-z ]{1,60}",
    ) {
        let store = MemoryStore::in_memory();
        for (persona, content, context, importance) in &inputs {
            store.add_memory(persona, content, context, *importance);
        }

        let results = store.get_relevant_memories("hitesh-choudhary", &query, 25);

        let scores: Vec<f64> = results
            .iter()
            .map(|m| {
                persona_chat_core::memory::similarity::score(&query, &m.content)
                    + persona_chat_core::memory::similarity::score(&query, &m.context)
                    + f64::from(m.importance) / 10.0
            })
            .collect();
        prop_assert!(scores.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn add_is_append_only(
        inputs in proptest::collection::vec(memory_input(), 0..30),
    ) {
        let store = MemoryStore::in_memory();
        let mut expected: std::collections::HashMap<String, usize> = Default::default();
        for (persona, content, context, importance) in &inputs {
            store.add_memory(persona, content, context, *importance);
            *expected.entry(persona.clone()).or_default() += 1;
        }

        for (persona, count) in expected {
            prop_assert_eq!(store.get_all_memories(&persona).len(), count);
        }
    }

    #[test]
    fn clear_empties_persona_and_leaves_others(
        inputs in proptest::collection::vec(memory_input(), 0..30),
        target in persona_slug(),
    ) {
        let store = MemoryStore::in_memory();
        for (persona, content, context, importance) in &inputs {
            store.add_memory(persona, content, context, *importance);
        }
        store.update_summary(&target, "summary", vec!["fact".into()]);

        let others_before: usize = store.get_all_memories("custom-mentor").len()
            + store.get_all_memories("piyush-garg").len()
            + store.get_all_memories("hitesh-choudhary").len()
            - store.get_all_memories(&target).len();

        store.clear_memories(&target);

        prop_assert!(store.get_all_memories(&target).is_empty());
        prop_assert!(store.get_summary(&target).is_none());
        prop_assert_eq!(store.get_memory_stats(&target).total_memories, 0);

        let others_after: usize = store.get_all_memories("custom-mentor").len()
            + store.get_all_memories("piyush-garg").len()
            + store.get_all_memories("hitesh-choudhary").len();
        prop_assert_eq!(others_after, others_before);
    }
}
