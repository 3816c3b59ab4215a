use std::borrow::Cow;

use validator::{ValidationError, ValidationErrors};

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{0}")]
    Validate(#[from] ValidationErrors),

    #[error("{message}")]
    Invalid {
        field: &'static str,
        message: String,
    },

    #[error("Unauthenticated.")]
    Unauthenticated,

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    NotFound(String),

    #[error("{0}")]
    Conflict(String),

    #[error("{0}")]
    Server(String),

    #[error("{0}")]
    Unknown(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Invalid {
            field,
            message: message.into(),
        }
    }

    /// Folds both validation variants into `ValidationErrors`.
    pub fn into_validation_errors(self) -> Option<ValidationErrors> {
        match self {
            Error::Validate(errors) => Some(errors),
            Error::Invalid { field, message } => {
                let mut errors = ValidationErrors::new();
                errors.add(
                    field,
                    ValidationError::new("invalid").with_message(Cow::Owned(message)),
                );
                Some(errors)
            }
            _ => None,
        }
    }
}

/// Records a single field failure with a fixed message.
pub fn add_field_error(
    errors: &mut ValidationErrors,
    field: &'static str,
    code: &'static str,
    message: &'static str,
) {
    errors.add(
        field,
        ValidationError::new(code).with_message(Cow::Borrowed(message)),
    );
}

impl From<sqlx::Error> for Error {
    fn from(value: sqlx::Error) -> Self {
        Self::Unknown(value.into())
    }
}

impl From<argon2::password_hash::Error> for Error {
    fn from(value: argon2::password_hash::Error) -> Self {
        Self::Unknown(anyhow::anyhow!("{value}"))
    }
}

impl From<serde_json::Error> for Error {
    fn from(value: serde_json::Error) -> Self {
        Self::Unknown(value.into())
    }
}

impl From<std::io::Error> for Error {
    fn from(value: std::io::Error) -> Self {
        Self::Unknown(value.into())
    }
}

#[macro_export]
macro_rules! bail {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Server(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::Server(format!($fmt, $($arg)*)))
    };
}

#[macro_export]
macro_rules! not_found {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::NotFound(format!($msg)))
    };
    ($fmt:expr, $($arg:tt)*) => {
        return Err($crate::Error::NotFound(format!($fmt, $($arg)*)))
    };
}

#[macro_export]
macro_rules! forbidden {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Forbidden(format!($msg)))
    };
}

#[macro_export]
macro_rules! conflict {
    ($msg:literal $(,)?) => {
        return Err($crate::Error::Conflict(format!($msg)))
    };
}

#[macro_export]
macro_rules! invalid {
    ($field:literal, $msg:literal $(,)?) => {
        return Err($crate::Error::invalid($field, $msg))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_folds_into_validation_errors() {
        let errors = Error::invalid("email", "The email has already been taken.")
            .into_validation_errors()
            .unwrap();

        let field = errors.field_errors();
        let messages = field.get("email").unwrap();
        assert_eq!(
            messages[0].message.as_deref(),
            Some("The email has already been taken.")
        );
    }

    #[test]
    fn non_validation_errors_are_not_folded() {
        assert!(
            Error::NotFound("Recipe not found.".to_owned())
                .into_validation_errors()
                .is_none()
        );
    }
}
