pub mod prompt;
pub mod provider;

use crate::db::models::{ChatTurn, Persona, Role};
use crate::error::AppError;
use crate::memory::{compressor, extractor, MemoryStore};
use crate::validation::require_non_empty;

use self::provider::CompletionProvider;

/// How many relevant memories are folded into each instruction.
const MEMORIES_PER_TURN: usize = 3;

/// Orchestrates one chat turn: assemble a memory-aware instruction, call the
/// completion service, then feed the finished exchange back into memory.
///
/// Owns the memory store and provider; construct once at startup (via
/// [`crate::ChatState`]) and share by reference.
pub struct ChatEngine {
    store: MemoryStore,
    provider: Box<dyn CompletionProvider>,
}

impl ChatEngine {
    pub fn new(store: MemoryStore, provider: Box<dyn CompletionProvider>) -> Self {
        Self { store, provider }
    }

    /// Direct access to the memory store (stats, clear, inspection).
    pub fn memory(&self) -> &MemoryStore {
        &self.store
    }

    /// Run one turn for `persona` over the full transcript (oldest first,
    /// ending with the user's latest message). Returns the reply text.
    ///
    /// Upstream and empty-reply failures surface to the caller and skip every
    /// memory update; no partial writes.
    pub async fn run_turn(
        &self,
        persona: &Persona,
        transcript: &[ChatTurn],
    ) -> Result<String, AppError> {
        if transcript.is_empty() {
            return Err(AppError::Validation("Transcript cannot be empty".into()));
        }
        require_non_empty("persona name", &persona.name)?;

        let persona_id = persona.slug();
        let current_message = transcript
            .iter()
            .rev()
            .find(|turn| turn.role == Role::User)
            .map(|turn| turn.content.as_str())
            .unwrap_or_default();

        let relevant = self
            .store
            .get_relevant_memories(&persona_id, current_message, MEMORIES_PER_TURN);
        let summary = self.store.get_summary(&persona_id);

        let instruction = prompt::build_instruction(persona, summary.as_ref(), &relevant);

        let mut turns = Vec::with_capacity(transcript.len() + 1);
        turns.push(ChatTurn::system(instruction));
        turns.extend_from_slice(transcript);

        tracing::debug!(
            persona = %persona_id,
            turns = turns.len(),
            memories = relevant.len(),
            "Dispatching chat turn"
        );

        let reply = self.provider.complete(&turns).await?;

        // The first exchange has no prior context to anchor against.
        if transcript.len() >= 2 {
            if let Some(fact) = extractor::extract(current_message, &reply) {
                self.store
                    .add_memory(&persona_id, &fact.content, &fact.context, fact.importance);
            }

            if compressor::should_compress(transcript.len()) {
                let window_start = transcript.len() - compressor::COMPRESSION_INTERVAL;
                let window = compressor::compress(&transcript[window_start..], &persona.name);
                self.store
                    .update_summary(&persona_id, &window.summary, window.key_facts);
            }
        }

        Ok(reply)
    }
}
