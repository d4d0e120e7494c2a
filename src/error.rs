use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use chrono::{DateTime, Utc};
use thiserror::Error;
use tracing::error;

use crate::types::api::ErrorBody;

pub type StoreResult<T> = std::result::Result<T, StoreError>;

pub type ApiResult<T> = std::result::Result<T, ApiError>;

/// Errors produced by a paste store.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum StoreError {
    #[error("content is empty")]
    EmptyContent,
    #[error("time-to-live must be positive and within the representable time range")]
    InvalidTtl,
    #[error("content too large: {current_size} characters exceeds the maximum of {max_size}")]
    ContentTooLarge { max_size: usize, current_size: usize },
    #[error("not found")]
    NotFound,
    #[error("expired at {expired_at}")]
    Expired { expired_at: DateTime<Utc> },
    #[error("no unused id found after {attempts} attempts")]
    IdsExhausted { attempts: usize },
    #[error("IO error")]
    IO {
        #[from]
        source: std::io::Error,
    },
    #[error("corrupt record for paste '{id}'")]
    Corrupt {
        id: String,
        source: serde_json::Error,
    },
}

impl StoreError {
    /// Whether this is a failure of the store itself rather than a caller-facing outcome.
    pub fn is_internal(&self) -> bool {
        matches!(
            self,
            StoreError::IdsExhausted { .. } | StoreError::IO { .. } | StoreError::Corrupt { .. }
        )
    }
}

/// Errors returned by the JSON API.
#[derive(Error, Debug)]
#[non_exhaustive]
pub enum ApiError {
    #[error("{0}")]
    InvalidInput(&'static str),
    #[error("Request body too large")]
    BodyTooLarge,
    #[error("Content too large. Maximum size is {max_size} characters")]
    ContentTooLarge { max_size: usize, current_size: usize },
    #[error("Paste not found")]
    NotFound { id: String },
    #[error("Paste has expired")]
    Expired {
        id: String,
        expired_at: DateTime<Utc>,
    },
    #[error("Configured paste lifetime is out of range")]
    ExpiryOutOfRange,
    #[error("Internal server error")]
    CreateFailed,
    #[error("Failed to retrieve paste")]
    RetrieveFailed { id: String },
}

impl ApiError {
    /// Translate a store error raised while creating a paste.
    pub fn from_create(err: StoreError) -> Self {
        match err {
            StoreError::EmptyContent => ApiError::InvalidInput("Content must be a non-empty string"),
            StoreError::InvalidTtl => {
                error!("error creating paste: configured time-to-live is out of range");
                ApiError::ExpiryOutOfRange
            }
            StoreError::ContentTooLarge {
                max_size,
                current_size,
            } => ApiError::ContentTooLarge {
                max_size,
                current_size,
            },
            err => {
                error!("error creating paste: {err:?}");
                ApiError::CreateFailed
            }
        }
    }

    /// Translate a store error raised while reading paste `id`.
    pub fn from_get(id: &str, err: StoreError) -> Self {
        match err {
            StoreError::NotFound => ApiError::NotFound { id: id.to_owned() },
            StoreError::Expired { expired_at } => ApiError::Expired {
                id: id.to_owned(),
                expired_at,
            },
            err => {
                error!("error retrieving paste {id}: {err:?}");
                ApiError::RetrieveFailed { id: id.to_owned() }
            }
        }
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            ApiError::InvalidInput(_) => StatusCode::BAD_REQUEST,
            ApiError::BodyTooLarge => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::ContentTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::Expired { .. } => StatusCode::GONE,
            ApiError::ExpiryOutOfRange => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::CreateFailed => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::RetrieveFailed { .. } => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn body(&self) -> ErrorBody {
        let mut body = ErrorBody::new(self.to_string());
        match self {
            ApiError::InvalidInput(_)
            | ApiError::BodyTooLarge
            | ApiError::ExpiryOutOfRange
            | ApiError::CreateFailed => {}
            ApiError::ContentTooLarge {
                max_size,
                current_size,
            } => {
                body.max_size = Some(*max_size);
                body.current_size = Some(*current_size);
            }
            ApiError::NotFound { id } | ApiError::RetrieveFailed { id } => {
                body.id = Some(id.clone());
            }
            ApiError::Expired { id, expired_at } => {
                body.id = Some(id.clone());
                body.expired_at = Some(*expired_at);
            }
        }
        body
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(self.body())).into_response()
    }
}
