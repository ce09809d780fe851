use serde::Serialize;

/// App-wide error type. Every fallible function returns `Result<T, AppError>`.
/// Serializes as structured JSON so a front-end can map each kind to a message.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Authentication error: {0}")]
    Auth(String),

    #[error("Quota exceeded: {0}")]
    Quota(String),

    #[error("Completion service error: {0}")]
    Upstream(String),

    #[error("Completion service returned no usable text")]
    EmptyReply,
}

impl AppError {
    /// Stable category string for each variant.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::Database(_) => "database",
            AppError::Pool(_) => "pool",
            AppError::NotFound(_) => "not_found",
            AppError::Validation(_) => "validation",
            AppError::Io(_) => "io",
            AppError::Serde(_) => "serde",
            AppError::Config(_) => "config",
            AppError::Auth(_) => "auth",
            AppError::Quota(_) => "quota",
            AppError::Upstream(_) => "upstream",
            AppError::EmptyReply => "empty_reply",
        }
    }
}

/// Serialized as `{ error: "...", kind: "..." }` for frontend consumption.
impl Serialize for AppError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        use serde::ser::SerializeStruct;
        let mut s = serializer.serialize_struct("AppError", 2)?;
        s.serialize_field("error", &self.to_string())?;
        s.serialize_field("kind", self.kind())?;
        s.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_is_stable_per_variant() {
        assert_eq!(AppError::Config("no key".into()).kind(), "config");
        assert_eq!(AppError::Auth("bad key".into()).kind(), "auth");
        assert_eq!(AppError::Quota("limit".into()).kind(), "quota");
        assert_eq!(AppError::Upstream("boom".into()).kind(), "upstream");
        assert_eq!(AppError::EmptyReply.kind(), "empty_reply");
    }

    #[test]
    fn test_serializes_error_and_kind() {
        let json = serde_json::to_value(AppError::Quota("monthly limit reached".into())).unwrap();
        assert_eq!(json["kind"], "quota");
        assert!(json["error"].as_str().unwrap().contains("monthly limit reached"));
    }
}
