//! Per-persona conversational memory: atomic remembered facts plus rolling
//! summaries, ranked by relevance to the current message and persisted as
//! two named blobs in the kv store.

pub mod compressor;
pub mod extractor;
pub mod similarity;

use std::collections::HashMap;
use std::sync::Mutex;

use crate::db::models::{ConversationSummary, Memory, MemoryStats};
use crate::db::repos::kv;
use crate::db::DbPool;
use crate::validation::clamp_importance;

/// kv_store key holding the serialized memory list.
pub const MEMORIES_KEY: &str = "persona-memories";
/// kv_store key holding the serialized summary map.
pub const SUMMARIES_KEY: &str = "persona-summaries";

/// Memory content is bounded at creation.
const MAX_CONTENT_CHARS: usize = 200;
/// Importance used when the caller does not supply one.
pub const DEFAULT_IMPORTANCE: i32 = 5;

/// Take the first `max_chars` characters of `text` (char-boundary safe).
pub(crate) fn prefix_chars(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => &text[..idx],
        None => text,
    }
}

#[derive(Default)]
struct MemoryState {
    memories: Vec<Memory>,
    summaries: HashMap<String, ConversationSummary>,
}

/// Process-wide memory store. Construct exactly once at startup and share by
/// reference; the internal mutex serializes writers.
///
/// All state lives in memory. Every mutation synchronously rewrites both kv
/// blobs before returning, so a read following a write in the same process
/// always observes it. Persistence is best-effort: without a pool (or when a
/// write fails) the store logs and keeps operating in-memory.
pub struct MemoryStore {
    state: Mutex<MemoryState>,
    pool: Option<DbPool>,
}

impl MemoryStore {
    /// Create a store backed by the given pool, rehydrating any persisted
    /// state. A missing blob is treated as empty; a corrupt blob is logged
    /// and discarded.
    pub fn new(pool: Option<DbPool>) -> Self {
        let state = match &pool {
            Some(pool) => load_state(pool),
            None => {
                tracing::warn!("No storage medium; memories will not survive this process");
                MemoryState::default()
            }
        };
        Self { state: Mutex::new(state), pool }
    }

    /// Create a purely in-memory store (no persistence).
    pub fn in_memory() -> Self {
        Self { state: Mutex::new(MemoryState::default()), pool: None }
    }

    /// Append a new memory for `persona_id` and persist. Duplicate content is
    /// allowed; memories are never deduplicated or mutated.
    pub fn add_memory(&self, persona_id: &str, content: &str, context: &str, importance: i32) {
        let timestamp = now_millis();
        let suffix = uuid::Uuid::new_v4().simple().to_string();
        let memory = Memory {
            // Time prefix plus random suffix avoids collisions under rapid succession.
            id: format!("{}-{}", timestamp, &suffix[..8]),
            persona_id: persona_id.to_string(),
            content: bounded_content(content),
            context: context.to_string(),
            timestamp,
            importance: clamp_importance(importance),
        };

        let mut state = self.state.lock().expect("memory store poisoned");
        state.memories.push(memory);
        self.persist(&state);
    }

    /// Top `limit` memories for `persona_id` ranked against `query`.
    ///
    /// Composite score = similarity(query, content) + similarity(query,
    /// context) + importance/10. The sort is stable, so equal scores keep
    /// insertion order.
    pub fn get_relevant_memories(&self, persona_id: &str, query: &str, limit: usize) -> Vec<Memory> {
        let state = self.state.lock().expect("memory store poisoned");

        let mut scored: Vec<(f64, &Memory)> = state
            .memories
            .iter()
            .filter(|m| m.persona_id == persona_id)
            .map(|m| {
                let score = similarity::score(query, &m.content)
                    + similarity::score(query, &m.context)
                    + f64::from(m.importance) / 10.0;
                (score, m)
            })
            .collect();

        scored.sort_by(|a, b| b.0.partial_cmp(&a.0).unwrap_or(std::cmp::Ordering::Equal));
        scored.into_iter().take(limit).map(|(_, m)| m.clone()).collect()
    }

    /// All memories for `persona_id`, in insertion order.
    pub fn get_all_memories(&self, persona_id: &str) -> Vec<Memory> {
        let state = self.state.lock().expect("memory store poisoned");
        state
            .memories
            .iter()
            .filter(|m| m.persona_id == persona_id)
            .cloned()
            .collect()
    }

    /// Upsert the persona's rolling summary. Full overwrite: previous key
    /// facts are discarded, and the incoming list is bounded to 5 entries.
    pub fn update_summary(&self, persona_id: &str, summary: &str, key_facts: Vec<String>) {
        let mut key_facts = key_facts;
        key_facts.truncate(5);

        let entry = ConversationSummary {
            persona_id: persona_id.to_string(),
            summary: summary.to_string(),
            key_facts,
            last_updated: now_millis(),
        };

        let mut state = self.state.lock().expect("memory store poisoned");
        state.summaries.insert(persona_id.to_string(), entry);
        self.persist(&state);
    }

    /// The persona's current summary, if one has been compressed yet.
    pub fn get_summary(&self, persona_id: &str) -> Option<ConversationSummary> {
        let state = self.state.lock().expect("memory store poisoned");
        state.summaries.get(persona_id).cloned()
    }

    /// Remove all memories and the summary for `persona_id`. Idempotent.
    pub fn clear_memories(&self, persona_id: &str) {
        let mut state = self.state.lock().expect("memory store poisoned");
        state.memories.retain(|m| m.persona_id != persona_id);
        state.summaries.remove(persona_id);
        self.persist(&state);
    }

    pub fn get_memory_stats(&self, persona_id: &str) -> MemoryStats {
        let state = self.state.lock().expect("memory store poisoned");
        let mut total = 0usize;
        let mut last_interaction: Option<i64> = None;
        for m in state.memories.iter().filter(|m| m.persona_id == persona_id) {
            total += 1;
            last_interaction = Some(last_interaction.map_or(m.timestamp, |t| t.max(m.timestamp)));
        }
        MemoryStats { total_memories: total, last_interaction }
    }

    /// Write both collections to the kv blobs. Best-effort: failures are
    /// logged and the in-memory state stays authoritative for this process.
    fn persist(&self, state: &MemoryState) {
        let Some(pool) = &self.pool else { return };

        let memories = match serde_json::to_string(&state.memories) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize memories: {e}");
                return;
            }
        };
        let summaries = match serde_json::to_string(&state.summaries) {
            Ok(json) => json,
            Err(e) => {
                tracing::error!("Failed to serialize summaries: {e}");
                return;
            }
        };

        if let Err(e) = kv::set(pool, MEMORIES_KEY, &memories) {
            tracing::warn!("Failed to persist memories, continuing in-memory: {e}");
        }
        if let Err(e) = kv::set(pool, SUMMARIES_KEY, &summaries) {
            tracing::warn!("Failed to persist summaries, continuing in-memory: {e}");
        }
    }
}

/// Bound memory content, marking the cut with an ellipsis.
fn bounded_content(content: &str) -> String {
    if content.chars().count() > MAX_CONTENT_CHARS {
        format!("{}...", prefix_chars(content, MAX_CONTENT_CHARS))
    } else {
        content.to_string()
    }
}

fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}

fn load_state(pool: &DbPool) -> MemoryState {
    let memories = match kv::get(pool, MEMORIES_KEY) {
        Ok(Some(json)) => serde_json::from_str::<Vec<Memory>>(&json).unwrap_or_else(|e| {
            tracing::error!("Corrupt memories blob, starting empty: {e}");
            Vec::new()
        }),
        Ok(None) => Vec::new(),
        Err(e) => {
            tracing::warn!("Failed to load memories, starting empty: {e}");
            Vec::new()
        }
    };

    let summaries = match kv::get(pool, SUMMARIES_KEY) {
        Ok(Some(json)) => serde_json::from_str::<HashMap<String, ConversationSummary>>(&json)
            .unwrap_or_else(|e| {
                tracing::error!("Corrupt summaries blob, starting empty: {e}");
                HashMap::new()
            }),
        Ok(None) => HashMap::new(),
        Err(e) => {
            tracing::warn!("Failed to load summaries, starting empty: {e}");
            HashMap::new()
        }
    };

    MemoryState { memories, summaries }
}
