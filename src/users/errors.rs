use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum MassAssignmentError {
    #[error("Add [{}] to the fillable list to allow mass assignment", .0.join(", "))]
    Guarded(Vec<String>),

    #[error("Field {field} expects {expected}")]
    InvalidType {
        field: &'static str,
        expected: &'static str,
    },
}

impl IntoResponse for MassAssignmentError {
    fn into_response(self) -> Response {
        let code = match &self {
            MassAssignmentError::Guarded(_) => "GUARDED_ATTRIBUTES",
            MassAssignmentError::InvalidType { .. } => "INVALID_ATTRIBUTE_TYPE",
        };
        tracing::warn!(error = %self, "mass assignment rejected");

        let body = Json(json!({
            "error": {
                "code": code,
                "message": self.to_string()
            }
        }));

        (StatusCode::UNPROCESSABLE_ENTITY, body).into_response()
    }
}
