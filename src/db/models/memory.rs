use serde::{Deserialize, Serialize};

// ============================================================================
// Memories
// ============================================================================

/// An atomic remembered fact. Immutable once created; memories are only
/// appended or bulk-deleted per persona.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Memory {
    pub id: String,
    /// Owning persona slug, the sole tenancy key across the store.
    pub persona_id: String,
    /// The fact itself, truncated to 200 chars at creation.
    pub content: String,
    /// The triggering user utterance, kept for display/debugging.
    pub context: String,
    /// Creation time, epoch milliseconds.
    pub timestamp: i64,
    /// 1-10 scale; fixed at creation, no decay.
    pub importance: i32,
}

/// Rolling conversation summary, at most one live instance per persona.
/// Replacing it is a full overwrite; old key facts are discarded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationSummary {
    pub persona_id: String,
    pub summary: String,
    /// At most 5 entries, in extraction order within the compression window.
    pub key_facts: Vec<String>,
    /// Epoch milliseconds of the last compression.
    pub last_updated: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MemoryStats {
    pub total_memories: usize,
    /// Max memory timestamp for the persona, absent when it has none.
    pub last_interaction: Option<i64>,
}
