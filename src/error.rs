use axum::extract::rejection::JsonRejection;
use axum::{Json, http::StatusCode, response::{IntoResponse, Response}};
use serde::Serialize;
use thiserror::Error;
use tracing::error;

use crate::models::BucketRef;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Authentication failed: {code} - {description}")]
    Authentication { code: String, description: String },

    #[error("Graph API error {status} for {url}: {body}")]
    Graph { status: u16, url: String, body: String },

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("Failed to parse Graph response: {0}")]
    Parse(String),

    #[error("Plan '{0}' not found")]
    PlanNotFound(String),

    #[error("Bucket '{value}' not found")]
    BucketNotFound {
        value: String,
        available: Vec<BucketRef>,
    },

    #[error("Task ETag missing; cannot {0}")]
    EtagMissing(&'static str),

    #[error("No update fields were provided")]
    NoUpdateFields,

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// HTTP status of a Graph failure, if this error came from one.
    pub fn graph_status(&self) -> Option<u16> {
        match self {
            AppError::Graph { status, .. } => Some(*status),
            _ => None,
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::BadRequest(rejection.body_text())
    }
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub available_buckets: Option<Vec<BucketRef>>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::PlanNotFound(_) | AppError::BucketNotFound { .. } => StatusCode::NOT_FOUND,
            AppError::BadRequest(_) | AppError::NoUpdateFields => StatusCode::BAD_REQUEST,
            AppError::EtagMissing(_) => StatusCode::CONFLICT,
            AppError::Authentication { .. } => StatusCode::UNAUTHORIZED,
            AppError::Graph { status, .. } => {
                error!("graph error: {}", self);
                match *status {
                    404 => StatusCode::NOT_FOUND,
                    409 | 412 => StatusCode::CONFLICT,
                    _ => StatusCode::BAD_GATEWAY,
                }
            }
            AppError::Transport(e) => {
                error!("transport error: {}", e);
                StatusCode::BAD_GATEWAY
            }
            AppError::Parse(_) => StatusCode::BAD_GATEWAY,
            AppError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let available_buckets = match &self {
            AppError::BucketNotFound { available, .. } => Some(available.clone()),
            _ => None,
        };

        let body = Json(ErrorResponse {
            success: false,
            error: self.to_string(),
            available_buckets,
        });

        (status, body).into_response()
    }
}
