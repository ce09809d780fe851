mod chat;
mod memory;
mod persona;

pub use chat::{ChatTurn, Role};
pub use memory::{ConversationSummary, Memory, MemoryStats};
pub use persona::{CreatePersonaInput, Persona, UpdatePersonaInput};
