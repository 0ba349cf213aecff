//! JSON envelope for the soil API.
//!
//! Success: `{ "data": T, "meta": { "timestamp", "api_version", "table" } }`
//!
//! Error: `{ "error": { "code", "message" }, "meta": { "timestamp", "api_version" } }`
//!
//! Error codes come from [`ErrorCode`]; [`ApiError`] converts from
//! [`InputError`] and extractor rejections so handlers can use `?`.

use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::advisory::InputError;

pub const API_VERSION: &str = "1";

/// Where the active soil table came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableSource {
    /// The nine-profile reference table
    Builtin,
    /// `[[profile]]` entries from `tbm_config.toml`
    Configured,
}

/// Which table produced a result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TableMeta {
    pub source: TableSource,
    pub profiles: usize,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub timestamp: DateTime<Utc>,
    pub api_version: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub table: Option<TableMeta>,
}

impl ResponseMeta {
    fn now(table: Option<TableMeta>) -> Self {
        Self {
            timestamp: Utc::now(),
            api_version: API_VERSION,
            table,
        }
    }
}

/// Successful response carrying the table it was computed against.
#[derive(Debug, Serialize)]
pub struct ApiResponse<T: Serialize> {
    pub data: T,
    pub meta: ResponseMeta,
}

impl<T: Serialize> ApiResponse<T> {
    pub fn new(data: T, table: TableMeta) -> Self {
        Self {
            data,
            meta: ResponseMeta::now(Some(table)),
        }
    }
}

impl<T: Serialize> IntoResponse for ApiResponse<T> {
    fn into_response(self) -> Response {
        (StatusCode::OK, Json(self)).into_response()
    }
}

// ============================================================================
// Errors
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    NotFound,
    /// Body or query string could not be decoded
    BadRequest,
    /// One or more of thrust, torque, speed absent
    MissingInput,
    /// A measurement is present but not a finite number
    InvalidInput,
}

impl ErrorCode {
    pub const fn status(self) -> StatusCode {
        match self {
            Self::NotFound => StatusCode::NOT_FOUND,
            Self::BadRequest | Self::MissingInput | Self::InvalidInput => StatusCode::BAD_REQUEST,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiError {
    pub code: ErrorCode,
    pub message: String,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }
}

impl From<InputError> for ApiError {
    fn from(e: InputError) -> Self {
        let code = match e {
            InputError::Missing(_) => ErrorCode::MissingInput,
            InputError::NonFinite(_) => ErrorCode::InvalidInput,
        };
        Self::new(code, e.to_string())
    }
}

impl From<JsonRejection> for ApiError {
    fn from(e: JsonRejection) -> Self {
        tracing::warn!(error = %e, "Rejected request body");
        Self::new(ErrorCode::BadRequest, e.body_text())
    }
}

impl From<QueryRejection> for ApiError {
    fn from(e: QueryRejection) -> Self {
        tracing::warn!(error = %e, "Rejected query string");
        Self::new(ErrorCode::BadRequest, e.body_text())
    }
}

#[derive(Serialize)]
struct ErrorDetail<'a> {
    code: ErrorCode,
    message: &'a str,
}

#[derive(Serialize)]
struct ErrorBody<'a> {
    error: ErrorDetail<'a>,
    meta: ResponseMeta,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let body = ErrorBody {
            error: ErrorDetail {
                code: self.code,
                message: &self.message,
            },
            meta: ResponseMeta::now(None),
        };
        (self.code.status(), Json(body)).into_response()
    }
}
