//! JSON error bodies returned by the API.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};

use lawxygen::controller::ControllerClosed;
use lawxygen::core::consultation::ConsultationError;
use lawxygen::core::types::FieldError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCode {
    NotFound,
    Validation,
    Conflict,
    Unavailable,
}

impl ErrorCode {
    pub fn status(self) -> StatusCode {
        match self {
            ErrorCode::NotFound => StatusCode::NOT_FOUND,
            ErrorCode::Validation => StatusCode::UNPROCESSABLE_ENTITY,
            ErrorCode::Conflict => StatusCode::CONFLICT,
            ErrorCode::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub details: Vec<String>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: Vec::new(),
        }
    }

    pub fn session_not_found() -> Self {
        Self::new(ErrorCode::NotFound, "session not found")
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.code.status(), Json(self)).into_response()
    }
}

impl From<ControllerClosed> for ApiError {
    fn from(_: ControllerClosed) -> Self {
        Self::session_not_found()
    }
}

impl From<FieldError> for ApiError {
    fn from(err: FieldError) -> Self {
        Self::new(ErrorCode::NotFound, err.to_string())
    }
}

impl From<ConsultationError> for ApiError {
    fn from(err: ConsultationError) -> Self {
        match err {
            ConsultationError::Validation(validation) => Self {
                code: ErrorCode::Validation,
                message: "invalid consultation request".to_string(),
                details: validation.problems.iter().map(|p| p.to_string()).collect(),
            },
            ConsultationError::NotEditable { .. } => Self::new(ErrorCode::Conflict, err.to_string()),
            ConsultationError::Closed => Self::session_not_found(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lawxygen::core::types::FormField;
    use lawxygen::core::validation::{FieldProblem, Problem, ValidationError};

    #[test]
    fn validation_error_lists_each_problem() {
        let err = ConsultationError::Validation(ValidationError {
            problems: vec![
                FieldProblem {
                    field: FormField::Name,
                    problem: Problem::Required,
                },
                FieldProblem {
                    field: FormField::Email,
                    problem: Problem::MalformedEmail,
                },
            ],
        });

        let api = ApiError::from(err);
        assert_eq!(api.code, ErrorCode::Validation);
        assert_eq!(api.details.len(), 2);
        assert!(api.details[0].starts_with("name"));
        assert!(api.details[1].starts_with("email"));
    }

    #[test]
    fn codes_serialize_snake_case() {
        let body = serde_json::to_value(ApiError::new(ErrorCode::NotFound, "gone")).expect("json");
        assert_eq!(body, serde_json::json!({"code": "not_found", "message": "gone"}));
        assert_eq!(ErrorCode::Unavailable.status(), StatusCode::SERVICE_UNAVAILABLE);
    }
}
