use axum::{
    Json,
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::{Map, Value, json};
use validator::{ValidationErrors, ValidationErrorsKind};

#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error(transparent)]
    Domain(#[from] cookbook_shared::Error),

    /// Malformed request body.
    #[error("{0}")]
    BadBody(String),

    #[error("Service Unavailable")]
    Unavailable,
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    pub fn unauthenticated() -> Self {
        Self::Domain(cookbook_shared::Error::Unauthenticated)
    }

    pub fn forbidden(message: impl Into<String>) -> Self {
        Self::Domain(cookbook_shared::Error::Forbidden(message.into()))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::Domain(cookbook_shared::Error::NotFound(message.into()))
    }

    pub fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        Self::Domain(cookbook_shared::Error::invalid(field, message))
    }
}

impl From<anyhow::Error> for AppError {
    fn from(value: anyhow::Error) -> Self {
        Self::Domain(cookbook_shared::Error::Unknown(value))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(value: sqlx::Error) -> Self {
        Self::Domain(value.into())
    }
}

impl From<JsonRejection> for AppError {
    fn from(value: JsonRejection) -> Self {
        Self::BadBody(value.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(value: QueryRejection) -> Self {
        Self::BadBody(value.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(_: PathRejection) -> Self {
        Self::not_found("Not Found")
    }
}

/// Laravel style `{message, errors}` body. Fields are sorted so the headline
/// message is stable.
fn validation_body(errors: &ValidationErrors) -> Value {
    let mut fields: Vec<(String, Vec<String>)> = errors
        .errors()
        .iter()
        .filter_map(|(field, kind)| match kind {
            ValidationErrorsKind::Field(errors) => Some((
                field.to_string(),
                errors
                    .iter()
                    .map(|error| match &error.message {
                        Some(message) => message.to_string(),
                        None => format!("The {} field is invalid.", field.replace('_', " ")),
                    })
                    .collect(),
            )),
            _ => None,
        })
        .collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    let total: usize = fields.iter().map(|(_, messages)| messages.len()).sum();
    let first = fields
        .first()
        .and_then(|(_, messages)| messages.first())
        .cloned()
        .unwrap_or_else(|| "The given data was invalid.".to_owned());

    let message = match total {
        0 | 1 => first,
        2 => format!("{first} (and 1 more error)"),
        n => format!("{first} (and {} more errors)", n - 1),
    };

    let errors: Map<String, Value> = fields
        .into_iter()
        .map(|(field, messages)| (field, json!(messages)))
        .collect();

    json!({ "message": message, "errors": errors })
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        use cookbook_shared::Error;

        let (status, body) = match self {
            AppError::BadBody(message) => (
                StatusCode::UNPROCESSABLE_ENTITY,
                json!({ "message": message, "errors": {} }),
            ),
            AppError::Unavailable => (
                StatusCode::SERVICE_UNAVAILABLE,
                json!({ "message": "Service Unavailable" }),
            ),
            AppError::Domain(error) => match error {
                Error::Validate(_) | Error::Invalid { .. } => {
                    let body = error
                        .into_validation_errors()
                        .map(|errors| validation_body(&errors))
                        .unwrap_or_else(|| json!({ "message": "The given data was invalid." }));
                    (StatusCode::UNPROCESSABLE_ENTITY, body)
                }
                Error::Unauthenticated => (
                    StatusCode::UNAUTHORIZED,
                    json!({ "message": "Unauthenticated." }),
                ),
                Error::Forbidden(message) => (StatusCode::FORBIDDEN, json!({ "message": message })),
                Error::NotFound(message) => (StatusCode::NOT_FOUND, json!({ "message": message })),
                Error::Conflict(message) => (StatusCode::CONFLICT, json!({ "message": message })),
                Error::Server(message) => {
                    tracing::error!("{message}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "message": "Server Error" }),
                    )
                }
                Error::Unknown(error) => {
                    tracing::error!("{error:?}");
                    (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        json!({ "message": "Server Error" }),
                    )
                }
            },
        };

        (status, Json(body)).into_response()
    }
}
