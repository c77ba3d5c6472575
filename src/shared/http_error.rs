use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::error;
use validator::ValidationErrors;

use crate::credentials::CredentialError;
use crate::shared::hash_worker::HashWorkerError;
use crate::users::repository::user_repository::UserRepositoryError;

/// Body of every error response.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HttpError {
  pub message: String,
  pub status: u16,
}

impl HttpError {
  pub fn new(message: impl Into<String>, status: StatusCode) -> Self {
    Self {
      message: message.into(),
      status: status.as_u16(),
    }
  }
}

/// Message of the conflict raised when a record changed between read and write.
pub const CONCURRENT_CHANGE: &str = "User was modified concurrently";

#[derive(Debug, Error)]
pub enum AppError {
  #[error("{0}")]
  NotFound(String),

  #[error("{0}")]
  Conflict(String),

  #[error("{0}")]
  Validation(String),

  #[error("Invalid payload: {0}")]
  InvalidPayload(#[from] ValidationErrors),

  #[error("Unauthorized")]
  Unauthorized,

  #[error("Forbidden")]
  Forbidden,

  #[error("Internal error: {0}")]
  Internal(String),
}

impl ResponseError for AppError {
  fn status_code(&self) -> StatusCode {
    match self {
      AppError::NotFound(_) => StatusCode::NOT_FOUND,
      AppError::Conflict(_) => StatusCode::CONFLICT,
      AppError::Validation(_) | AppError::InvalidPayload(_) => {
        StatusCode::BAD_REQUEST
      }
      AppError::Unauthorized => StatusCode::UNAUTHORIZED,
      AppError::Forbidden => StatusCode::FORBIDDEN,
      AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
    }
  }

  fn error_response(&self) -> HttpResponse {
    let status = self.status_code();
    let body = match self {
      AppError::InvalidPayload(errors) => {
        return HttpResponse::build(status).json(errors);
      }
      AppError::Internal(cause) => {
        error!(%cause, "request failed");
        HttpError::new("Internal Server Error", status)
      }
      other => HttpError::new(other.to_string(), status),
    };
    HttpResponse::build(status).json(body)
  }
}

impl From<UserRepositoryError> for AppError {
  fn from(error: UserRepositoryError) -> Self {
    match error {
      UserRepositoryError::DuplicateEmail(_) => {
        AppError::Conflict(String::from("User or Email already exists"))
      }
      other => AppError::Internal(other.to_string()),
    }
  }
}

impl From<HashWorkerError> for AppError {
  fn from(error: HashWorkerError) -> Self {
    AppError::Internal(error.to_string())
  }
}

impl From<CredentialError> for AppError {
  fn from(error: CredentialError) -> Self {
    AppError::Internal(error.to_string())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use actix_web::body::to_bytes;

  #[actix_web::test]
  async fn test_internal_error_hides_cause() {
    let response =
      AppError::Internal(String::from("lock poisoned")).error_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = to_bytes(response.into_body()).await.unwrap();
    let error: HttpError = serde_json::from_slice(&body).unwrap();
    assert_eq!(error.message, "Internal Server Error");
    assert_eq!(error.status, 500);
  }

  #[test]
  fn test_duplicate_email_maps_to_conflict() {
    let error = AppError::from(UserRepositoryError::DuplicateEmail(
      String::from("a@b.c"),
    ));
    assert_eq!(error.status_code(), StatusCode::CONFLICT);
    assert_eq!(error.to_string(), "User or Email already exists");
  }
}
