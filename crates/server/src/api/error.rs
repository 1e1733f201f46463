//! Mapping of library errors onto HTTP responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rdfin_core::{IngestError, LedgerError, LinkEntry, RefreshOutcome, TargetError, WriteError};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    BadRequest(String),

    #[error("{0}")]
    NotFound(String),

    /// The provider rejected our token; partial results ride along.
    #[error("{reason}")]
    ProviderAuth {
        reason: String,
        entries: Option<Vec<LinkEntry>>,
        outcomes: Option<Vec<RefreshOutcome>>,
    },

    #[error("{0}")]
    Internal(String),
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub entries: Option<Vec<LinkEntry>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub outcomes: Option<Vec<RefreshOutcome>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error, entries, outcomes) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg, None, None),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg, None, None),
            ApiError::ProviderAuth {
                reason,
                entries,
                outcomes,
            } => {
                tracing::error!(reason = %reason, "Provider rejected credentials");
                (StatusCode::BAD_GATEWAY, reason, entries, outcomes)
            }
            ApiError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, msg, None, None)
            }
        };

        (
            status,
            Json(ErrorResponse {
                error,
                entries,
                outcomes,
            }),
        )
            .into_response()
    }
}

impl From<IngestError> for ApiError {
    fn from(err: IngestError) -> Self {
        match err {
            IngestError::InvalidBatch(msg) => ApiError::BadRequest(msg),
            IngestError::ProviderAuth { reason, processed } => ApiError::ProviderAuth {
                reason,
                entries: Some(processed),
                outcomes: None,
            },
            IngestError::Ledger(e) => e.into(),
        }
    }
}

impl From<LedgerError> for ApiError {
    fn from(err: LedgerError) -> Self {
        match err {
            LedgerError::NotFound(key) => ApiError::NotFound(format!("No log for {}", key)),
            LedgerError::ProviderAuth { reason, outcomes } => ApiError::ProviderAuth {
                reason,
                entries: None,
                outcomes: Some(outcomes),
            },
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl From<TargetError> for ApiError {
    fn from(err: TargetError) -> Self {
        ApiError::BadRequest(err.to_string())
    }
}

impl From<WriteError> for ApiError {
    fn from(err: WriteError) -> Self {
        ApiError::Internal(err.to_string())
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
