//! Error types for onboard.

use std::borrow::Cow;

use thiserror::Error;
use validator::{ValidationError, ValidationErrors, ValidationErrorsKind};

/// Application result type.
pub type AppResult<T> = Result<T, AppError>;

/// Application error type.
#[derive(Debug, Error)]
pub enum AppError {
    // === Client Errors ===
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Field-keyed validation failures for a record write.
    #[error("Invalid record: {0}")]
    InvalidRecord(ValidationErrors),

    #[error("Conflict: {0}")]
    Conflict(String),

    // === Server Errors ===
    #[error("Database error: {0}")]
    Database(String),

    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Queue error: {0}")]
    Queue(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal error: {0}")]
    Internal(String),
}

impl AppError {
    /// Build an [`AppError::InvalidRecord`] holding a single field error.
    #[must_use]
    pub fn invalid_field(field: &'static str, code: &'static str, message: &'static str) -> Self {
        let mut errors = ValidationErrors::new();
        errors.add(field, field_error(code, message));
        Self::InvalidRecord(errors)
    }

    /// Stable machine-readable code for logs and callers.
    #[must_use]
    pub const fn error_code(&self) -> &'static str {
        match self {
            Self::NotFound(_) => "NOT_FOUND",
            Self::Validation(_) | Self::InvalidRecord(_) => "VALIDATION_ERROR",
            Self::Conflict(_) => "CONFLICT",
            Self::Database(_) => "DATABASE_ERROR",
            Self::Redis(_) => "REDIS_ERROR",
            Self::Queue(_) => "QUEUE_ERROR",
            Self::Config(_) => "CONFIG_ERROR",
            Self::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            Self::Internal(_) => "INTERNAL_ERROR",
        }
    }

    /// Returns whether this error should be logged at error level.
    #[must_use]
    pub const fn is_server_error(&self) -> bool {
        matches!(
            self,
            Self::Database(_)
                | Self::Redis(_)
                | Self::Queue(_)
                | Self::Config(_)
                | Self::ExternalService(_)
                | Self::Internal(_)
        )
    }

    /// Flatten record validation failures into sorted `(field, message)` pairs.
    ///
    /// Returns an empty list for every other variant.
    #[must_use]
    pub fn field_errors(&self) -> Vec<(String, String)> {
        let Self::InvalidRecord(errors) = self else {
            return Vec::new();
        };

        let mut pairs: Vec<(String, String)> = errors
            .errors()
            .iter()
            .filter_map(|(field, kind)| match kind {
                ValidationErrorsKind::Field(list) => Some((field.to_string(), list)),
                _ => None,
            })
            .flat_map(|(field, list)| {
                list.iter().map(move |error| {
                    let message = error
                        .message
                        .as_ref()
                        .map_or_else(|| error.code.to_string(), ToString::to_string);
                    (field.clone(), message)
                })
            })
            .collect();

        pairs.sort();
        pairs
    }

    /// Whether `field` has at least one error with the given message.
    #[must_use]
    pub fn has_field_error(&self, field: &str, message: &str) -> bool {
        self.field_errors()
            .iter()
            .any(|(f, m)| f == field && m == message)
    }
}

/// Build a [`ValidationError`] with a human-readable message.
#[must_use]
pub fn field_error(code: &'static str, message: &'static str) -> ValidationError {
    let mut error = ValidationError::new(code);
    error.message = Some(Cow::Borrowed(message));
    error
}

// === From implementations ===

impl From<ValidationErrors> for AppError {
    fn from(err: ValidationErrors) -> Self {
        Self::InvalidRecord(err)
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        Self::Config(err.to_string())
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::Internal(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_field_is_client_error() {
        let err = AppError::invalid_field("email", "taken", "has already been taken");

        assert_eq!(err.error_code(), "VALIDATION_ERROR");
        assert!(!err.is_server_error());
        assert!(err.has_field_error("email", "has already been taken"));
    }

    #[test]
    fn test_field_errors_sorted_and_flattened() {
        let mut errors = ValidationErrors::new();
        errors.add("name", field_error("blank", "can't be blank"));
        errors.add("email", field_error("invalid", "is invalid"));
        errors.add(
            "email",
            field_error("used_by_user", "already used by an existing User"),
        );

        let err = AppError::from(errors);

        assert_eq!(
            err.field_errors(),
            vec![
                ("email".to_string(), "already used by an existing User".to_string()),
                ("email".to_string(), "is invalid".to_string()),
                ("name".to_string(), "can't be blank".to_string()),
            ]
        );
    }

    #[test]
    fn test_field_errors_falls_back_to_code() {
        let mut errors = ValidationErrors::new();
        errors.add("email", ValidationError::new("email"));

        let err = AppError::InvalidRecord(errors);
        assert!(err.has_field_error("email", "email"));
    }

    #[test]
    fn test_error_codes() {
        let cases = [
            (AppError::NotFound("x".into()), "NOT_FOUND", false),
            (AppError::Validation("x".into()), "VALIDATION_ERROR", false),
            (AppError::Conflict("x".into()), "CONFLICT", false),
            (AppError::Queue("x".into()), "QUEUE_ERROR", true),
            (AppError::ExternalService("x".into()), "EXTERNAL_SERVICE_ERROR", true),
            (AppError::Internal("x".into()), "INTERNAL_ERROR", true),
        ];

        for (err, code, server) in cases {
            assert_eq!(err.error_code(), code);
            assert_eq!(err.is_server_error(), server, "{code}");
        }
    }

    #[test]
    fn test_non_record_errors_have_no_fields() {
        assert!(AppError::Database("boom".to_string()).field_errors().is_empty());
        assert!(AppError::Database("boom".to_string()).is_server_error());
    }
}
