use crate::db::models::{ConversationSummary, Memory, Persona};

/// Assemble the system instruction for one turn: persona identity, style and
/// grounding material, then whatever the memory store knows about this user.
/// Sections are emitted only when they have content.
pub fn build_instruction(
    persona: &Persona,
    summary: Option<&ConversationSummary>,
    memories: &[Memory],
) -> String {
    let mut instruction = persona.system_prompt.clone().unwrap_or_else(|| {
        format!(
            "You are role-playing as {}. {} Always stay in character and respond in this style.",
            persona.name, persona.description
        )
    });

    let style_examples = persona.parsed_style_examples();
    if !style_examples.is_empty() {
        instruction.push_str(&format!(
            "\n\nExamples of {}'s real writing style:",
            persona.name
        ));
        for example in &style_examples {
            instruction.push_str(&format!("\n- {example}"));
        }
    }

    let reference_notes = persona.parsed_reference_notes();
    if !reference_notes.is_empty() {
        instruction.push_str("\n\nReference material to ground your answers:");
        for note in &reference_notes {
            instruction.push_str(&format!("\n- {note}"));
        }
    }

    if let Some(summary) = summary {
        instruction.push_str(&format!(
            "\n\nPrevious conversation context: {}",
            summary.summary
        ));
        if !summary.key_facts.is_empty() {
            instruction.push_str(&format!(
                "\nKey facts you remember: {}",
                summary.key_facts.join(", ")
            ));
        }
    }

    if !memories.is_empty() {
        instruction.push_str("\n\nRelevant memories from past conversations:");
        for (index, memory) in memories.iter().enumerate() {
            instruction.push_str(&format!(
                "\n{}. {} (Context: {})",
                index + 1,
                memory.content,
                memory.context
            ));
        }
    }

    instruction
}
