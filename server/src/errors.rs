// server/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use crossdock::CoreError;

#[derive(Debug, Error)]
pub enum ApiError {
  #[error("Validation Error: {0}")]
  Validation(String),

  #[error("Authentication Failed: {0}")]
  Auth(String),

  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  #[error("Conflict: {0}")]
  Conflict(String),

  #[error("Business rule rejected the request: {0}")]
  Business(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Collaborator Error: {0}")]
  Collaborator(String),

  #[error("Internal Server Error: {0}")]
  Internal(String),
}

/// The engine's error taxonomy maps onto HTTP statuses one-to-one:
/// validation → 422, conflicts and rejected transitions → 409, business
/// rejections (stock, discounts) → 400, collaborator outages → 502.
impl From<CoreError> for ApiError {
  fn from(err: CoreError) -> Self {
    match err {
      CoreError::Validation(m) => ApiError::Validation(m),
      CoreError::Conflict(m) => ApiError::Conflict(m),
      other @ CoreError::InvalidTransition { .. } => ApiError::Conflict(other.to_string()),
      other @ CoreError::InsufficientStock { .. } => ApiError::Business(other.to_string()),
      CoreError::Discount(reason) => ApiError::Business(reason.to_string()),
      other @ CoreError::NotFound { .. } => ApiError::NotFound(other.to_string()),
      other @ CoreError::Collaborator { .. } => ApiError::Collaborator(other.to_string()),
      CoreError::Internal(m) => ApiError::Internal(m),
    }
  }
}

impl ResponseError for ApiError {
  fn error_response(&self) -> HttpResponse {
    // Log the full error when it's turned into a response
    tracing::error!(api_error = %self, "Responding with error");
    match self {
      ApiError::Validation(m) => HttpResponse::UnprocessableEntity().json(json!({"error": m})),
      ApiError::Auth(m) => HttpResponse::Unauthorized().json(json!({"error": m})),
      ApiError::Forbidden(m) => HttpResponse::Forbidden().json(json!({"error": m})),
      ApiError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m})),
      ApiError::Conflict(m) => HttpResponse::Conflict().json(json!({"error": m})),
      ApiError::Business(m) => HttpResponse::BadRequest().json(json!({"error": m})),
      ApiError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m}))
      }
      ApiError::Collaborator(m) => {
        HttpResponse::BadGateway().json(json!({"error": "Upstream collaborator failed", "detail": m}))
      }
      ApiError::Internal(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "An internal error occurred", "detail": m}))
      }
    }
  }
}

// Define a Result type alias for the application
pub type Result<T, E = ApiError> = std::result::Result<T, E>;
