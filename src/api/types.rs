// REST API types
// Request/response shapes for the hero routes and the error rendering

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::HeroServiceError;

/// Status used for every generic failure
///
/// 408 is not a sensible status for these errors, but deployed clients
/// already branch on it.
pub const FAILURE_STATUS: StatusCode = StatusCode::REQUEST_TIMEOUT;

/// Status used when an envelope token fails verification
pub const TOKEN_FAILURE_STATUS: StatusCode = StatusCode::NOT_ACCEPTABLE;

/// Wire shape of every failure
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub message: String,
}

/// `{data: ...}` wrapper used by update, delete, batch create and the welcome route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataResponse<T> {
    pub data: T,
}

impl<T> DataResponse<T> {
    pub fn new(data: T) -> Self {
        Self { data }
    }
}

/// Query parameters for `GET /api/heroes`
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ListHeroesQuery {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub service: String,
    pub version: String,
}

impl HealthResponse {
    pub fn ok() -> Self {
        Self {
            status: "ok".to_string(),
            service: "hero-service".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }
}

pub fn create_error_response(err: &HeroServiceError) -> (StatusCode, ErrorResponse) {
    let status = match err {
        HeroServiceError::TokenVerification { .. } => TOKEN_FAILURE_STATUS,
        _ => FAILURE_STATUS,
    };
    (
        status,
        ErrorResponse {
            message: err.to_string(),
        },
    )
}

impl IntoResponse for HeroServiceError {
    fn into_response(self) -> Response {
        let (status, body) = create_error_response(&self);
        (status, Json(body)).into_response()
    }
}
