use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde_json::json;
use tempo_cycle::CycleError;
use thiserror::Error;
use tracing::error;

use crate::{auth::Role, database::DbError};

/// A route that only one side of the couple may use.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoleRequired(pub Role);

impl std::fmt::Display for RoleRequired {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let who = match self.0 {
            Role::Her => "Her",
            Role::Him => "Him",
        };

        write!(f, "This action can only be performed by {who}")
    }
}

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Malformed payload")]
    MalformedPayload,

    #[error("{0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("{0}")]
    Forbidden(RoleRequired),

    #[error("{0}")]
    NotFound(&'static str),

    #[error("Couple profile not found. Complete onboarding first.")]
    NoCouple,

    #[error("Onboarding not complete.")]
    OnboardingIncomplete,

    #[error(transparent)]
    InvalidConfiguration(#[from] CycleError),

    #[error("Internal error: {0}")]
    Internal(#[from] DbError),
}

impl AppError {
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::MalformedPayload | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::OnboardingIncomplete => StatusCode::BAD_REQUEST,
            AppError::Unauthorized => StatusCode::UNAUTHORIZED,
            AppError::Forbidden(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) | AppError::NoCouple => StatusCode::NOT_FOUND,
            AppError::InvalidConfiguration(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<rusqlite::Error> for AppError {
    fn from(e: rusqlite::Error) -> Self {
        AppError::Internal(DbError::Sqlite(e))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match &self {
            AppError::Internal(e) => {
                error!("{e}");
                json!({ "error": "Internal server error" })
            }
            AppError::NoCouple | AppError::OnboardingIncomplete => json!({
                "error": self.to_string(),
                "onboardingRequired": true,
            }),
            _ => json!({ "error": self.to_string() }),
        };

        (status, Json(body)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_by_variant() {
        assert_eq!(
            AppError::Forbidden(RoleRequired(Role::Her)).status(),
            StatusCode::FORBIDDEN
        );
        assert_eq!(AppError::NotFound("Article not found").status(), StatusCode::NOT_FOUND);
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::from(CycleError::InvalidConfiguration {
                cycle_length: 10,
                period_length: 10
            })
            .status(),
            StatusCode::UNPROCESSABLE_ENTITY
        );
    }

    #[test]
    fn test_role_messages() {
        assert_eq!(
            AppError::Forbidden(RoleRequired(Role::Him)).to_string(),
            "This action can only be performed by Him"
        );
        assert_eq!(
            AppError::Forbidden(RoleRequired(Role::Her)).to_string(),
            "This action can only be performed by Her"
        );
    }
}
