use serde::{Deserialize, Serialize};

// ============================================================================
// Persona
// ============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Persona {
    pub id: String,
    pub name: String,
    pub description: String,
    pub avatar: String,
    /// Explicit system-prompt override. When absent the engine derives a
    /// role-play instruction from `name` + `description`.
    pub system_prompt: Option<String>,
    /// JSON array of topic strings.
    pub specialties: Option<String>,
    /// JSON array of short writing samples used as style exemplars.
    pub style_examples: Option<String>,
    /// JSON array of grounding snippets (lecture/transcript excerpts).
    pub reference_notes: Option<String>,
    pub is_builtin: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl Persona {
    /// Memory tenancy key derived from the display name: lowercase,
    /// whitespace runs collapsed to a single hyphen. Recomputed on every
    /// call; renaming a persona moves it to a fresh memory namespace.
    pub fn slug(&self) -> String {
        slugify(&self.name)
    }

    pub fn parsed_specialties(&self) -> Vec<String> {
        parse_string_list(self.specialties.as_deref())
    }

    pub fn parsed_style_examples(&self) -> Vec<String> {
        parse_string_list(self.style_examples.as_deref())
    }

    pub fn parsed_reference_notes(&self) -> Vec<String> {
        parse_string_list(self.reference_notes.as_deref())
    }
}

/// Lowercase a display name and collapse whitespace runs to single hyphens.
pub fn slugify(name: &str) -> String {
    name.to_lowercase()
        .split_whitespace()
        .collect::<Vec<_>>()
        .join("-")
}

/// Parse a JSON string-array column. Returns empty on NULL or unparseable data.
fn parse_string_list(json: Option<&str>) -> Vec<String> {
    json.and_then(|s| serde_json::from_str::<Vec<String>>(s).ok())
        .unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePersonaInput {
    pub name: String,
    pub description: String,
    pub avatar: Option<String>,
    pub system_prompt: Option<String>,
    pub specialties: Option<String>,
    pub style_examples: Option<String>,
    pub reference_notes: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdatePersonaInput {
    pub name: Option<String>,
    pub description: Option<String>,
    pub avatar: Option<String>,
    pub system_prompt: Option<Option<String>>,
    pub specialties: Option<Option<String>>,
    pub style_examples: Option<Option<String>>,
    pub reference_notes: Option<Option<String>>,
}
