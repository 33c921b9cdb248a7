use thiserror::Error;

/// A single rejected input field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

impl FieldViolation {
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// Domain-specific errors of the users service
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("User with ID {id} not found")]
    UserNotFound { id: i64 },

    #[error("User with email {email} already exists")]
    EmailAlreadyExists { email: String },

    #[error("Validation failed: {}", summarize(.violations))]
    Validation { violations: Vec<FieldViolation> },

    #[error("Database error: {message}")]
    Database { message: String },
}

fn summarize(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(|v| format!("{}: {}", v.field, v.message))
        .collect::<Vec<_>>()
        .join("; ")
}

impl DomainError {
    #[must_use]
    pub fn user_not_found(id: i64) -> Self {
        Self::UserNotFound { id }
    }

    pub fn email_already_exists(email: impl Into<String>) -> Self {
        Self::EmailAlreadyExists {
            email: email.into(),
        }
    }

    pub fn validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            violations: vec![FieldViolation::new(field, message)],
        }
    }

    #[must_use]
    pub fn violations(violations: Vec<FieldViolation>) -> Self {
        Self::Validation { violations }
    }

    pub fn database(message: impl Into<String>) -> Self {
        Self::Database {
            message: message.into(),
        }
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    use super::*;

    #[test]
    fn messages() {
        assert_eq!(
            DomainError::user_not_found(7).to_string(),
            "User with ID 7 not found"
        );
        assert_eq!(
            DomainError::email_already_exists("a@b.io").to_string(),
            "User with email a@b.io already exists"
        );
        let err = DomainError::violations(vec![
            FieldViolation::new("name", "too short"),
            FieldViolation::new("email", "invalid"),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: name: too short; email: invalid"
        );
    }
}
