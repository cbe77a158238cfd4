// src/error.rs
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use log::{error, warn};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::use_cases::ledger_operations::LedgerOperationError;
use crate::application::use_cases::visit_tracking::VisitTrackingError;

pub const INTERNAL_SERVER_ERROR_MESSAGE: &str = "Internal server error";

/// JSON body of every failed API response
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub success: bool,
    pub error: String,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
        }
    }
}

/// Errors surfaced to HTTP callers
#[derive(Error, Debug)]
pub enum ApiError {
    /// The request is missing data or is malformed
    #[error("{0}")]
    Validation(String),

    /// Something broke while handling a well-formed request
    #[error("{0}")]
    Internal(String),
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::BAD_REQUEST,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(message) => warn!("Rejected request: {}", message),
            ApiError::Internal(message) => error!("Request failed: {}", message),
        }
        HttpResponse::build(self.status_code()).json(ErrorBody::new(self.to_string()))
    }
}

impl From<LedgerOperationError> for ApiError {
    fn from(error: LedgerOperationError) -> Self {
        match error {
            LedgerOperationError::MissingParameters(_) => ApiError::Validation(error.to_string()),
        }
    }
}

impl From<VisitTrackingError> for ApiError {
    fn from(error: VisitTrackingError) -> Self {
        ApiError::Internal(error.to_string())
    }
}

/// Errors that stop the server from starting
#[derive(Error, Debug)]
pub enum StartupError {
    #[error("Configuration error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("HTTP client error: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error("Template error: {0}")]
    Template(#[from] handlebars::TemplateError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
