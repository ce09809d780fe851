use rusqlite::{params, Row};

use crate::db::models::{CreatePersonaInput, Persona, UpdatePersonaInput};
use crate::db::DbPool;
use crate::error::AppError;
use crate::validation::{require_non_empty, require_valid_id};

fn row_to_persona(row: &Row) -> rusqlite::Result<Persona> {
    Ok(Persona {
        id: row.get("id")?,
        name: row.get("name")?,
        description: row.get("description")?,
        avatar: row.get("avatar")?,
        system_prompt: row.get("system_prompt")?,
        specialties: row.get("specialties")?,
        style_examples: row.get("style_examples")?,
        reference_notes: row.get("reference_notes")?,
        is_builtin: row.get::<_, i32>("is_builtin")? != 0,
        created_at: row.get("created_at")?,
        updated_at: row.get("updated_at")?,
    })
}

/// Validate that an optional column holds a JSON string array.
fn validate_string_list(field: &str, json: Option<&str>) -> Result<(), AppError> {
    if let Some(json) = json {
        serde_json::from_str::<Vec<String>>(json).map_err(|e| {
            AppError::Validation(format!("{field} must be a JSON string array: {e}"))
        })?;
    }
    Ok(())
}

pub fn get_all(pool: &DbPool) -> Result<Vec<Persona>, AppError> {
    let conn = pool.get()?;
    let mut stmt = conn.prepare("SELECT * FROM personas ORDER BY created_at, name")?;
    let rows = stmt.query_map([], row_to_persona)?;
    let results: Vec<Persona> = rows.collect::<Result<Vec<_>, _>>().map_err(AppError::Database)?;
    Ok(results)
}

pub fn get_by_id(pool: &DbPool, id: &str) -> Result<Persona, AppError> {
    let conn = pool.get()?;
    conn.query_row("SELECT * FROM personas WHERE id = ?1", params![id], row_to_persona)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Persona {id}")),
            other => AppError::Database(other),
        })
}

pub fn get_by_name(pool: &DbPool, name: &str) -> Result<Persona, AppError> {
    let conn = pool.get()?;
    conn.query_row("SELECT * FROM personas WHERE name = ?1", params![name], row_to_persona)
        .map_err(|e| match e {
            rusqlite::Error::QueryReturnedNoRows => AppError::NotFound(format!("Persona '{name}'")),
            other => AppError::Database(other),
        })
}

pub fn create(pool: &DbPool, input: CreatePersonaInput) -> Result<Persona, AppError> {
    require_non_empty("name", &input.name)?;
    require_non_empty("description", &input.description)?;
    validate_string_list("specialties", input.specialties.as_deref())?;
    validate_string_list("style_examples", input.style_examples.as_deref())?;
    validate_string_list("reference_notes", input.reference_notes.as_deref())?;

    let id = uuid::Uuid::new_v4().to_string();
    let now = chrono::Utc::now().to_rfc3339();
    let avatar = input.avatar.unwrap_or_else(|| "🤖".into());

    let conn = pool.get()?;
    conn.execute(
        "INSERT INTO personas
         (id, name, description, avatar, system_prompt, specialties,
          style_examples, reference_notes, is_builtin, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, 0, ?9, ?9)",
        params![
            id,
            input.name.trim(),
            input.description,
            avatar,
            input.system_prompt,
            input.specialties,
            input.style_examples,
            input.reference_notes,
            now,
        ],
    )?;

    get_by_id(pool, &id)
}

pub fn update(pool: &DbPool, id: &str, input: UpdatePersonaInput) -> Result<Persona, AppError> {
    require_valid_id("id", id)?;

    // Verify exists
    get_by_id(pool, id)?;

    if let Some(ref name) = input.name {
        require_non_empty("name", name)?;
    }
    if let Some(ref description) = input.description {
        require_non_empty("description", description)?;
    }
    if let Some(Some(ref json)) = input.specialties {
        validate_string_list("specialties", Some(json))?;
    }
    if let Some(Some(ref json)) = input.style_examples {
        validate_string_list("style_examples", Some(json))?;
    }
    if let Some(Some(ref json)) = input.reference_notes {
        validate_string_list("reference_notes", Some(json))?;
    }

    let mut sets: Vec<String> = Vec::new();
    let mut param_idx = 1u32;

    push_field!(input.name, "name", sets, param_idx);
    push_field!(input.description, "description", sets, param_idx);
    push_field!(input.avatar, "avatar", sets, param_idx);
    push_field!(input.system_prompt, "system_prompt", sets, param_idx);
    push_field!(input.specialties, "specialties", sets, param_idx);
    push_field!(input.style_examples, "style_examples", sets, param_idx);
    push_field!(input.reference_notes, "reference_notes", sets, param_idx);

    if sets.is_empty() {
        return get_by_id(pool, id);
    }

    sets.push(format!("updated_at = ?{param_idx}"));
    let now = chrono::Utc::now().to_rfc3339();

    let mut param_values: Vec<Box<dyn rusqlite::types::ToSql>> = Vec::new();
    if let Some(v) = input.name {
        param_values.push(Box::new(v));
    }
    if let Some(v) = input.description {
        param_values.push(Box::new(v));
    }
    if let Some(v) = input.avatar {
        param_values.push(Box::new(v));
    }
    if let Some(v) = input.system_prompt {
        param_values.push(Box::new(v));
    }
    if let Some(v) = input.specialties {
        param_values.push(Box::new(v));
    }
    if let Some(v) = input.style_examples {
        param_values.push(Box::new(v));
    }
    if let Some(v) = input.reference_notes {
        param_values.push(Box::new(v));
    }
    param_values.push(Box::new(now));
    param_values.push(Box::new(id.to_string()));

    let sql = format!(
        "UPDATE personas SET {} WHERE id = ?{}",
        sets.join(", "),
        param_idx + 1
    );

    let params_ref: Vec<&dyn rusqlite::types::ToSql> =
        param_values.iter().map(|p| p.as_ref()).collect();

    let conn = pool.get()?;
    conn.execute(&sql, params_ref.as_slice())?;
    drop(conn);

    get_by_id(pool, id)
}

/// Delete a user-created persona. Builtin personas are refused.
pub fn delete(pool: &DbPool, id: &str) -> Result<bool, AppError> {
    let persona = get_by_id(pool, id)?;
    if persona.is_builtin {
        return Err(AppError::Validation("Builtin personas cannot be deleted".into()));
    }

    let conn = pool.get()?;
    let rows = conn.execute("DELETE FROM personas WHERE id = ?1", params![id])?;
    Ok(rows > 0)
}
