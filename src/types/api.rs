use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::PasteView;

/// Body of `POST /api/paste`.
///
/// `content` is kept loose so a missing value and a value of the wrong type
/// can be reported differently.
#[derive(Debug, Deserialize)]
pub struct CreatePaste {
    #[serde(default)]
    pub content: Option<serde_json::Value>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct CreatedPaste {
    pub id: String,
    pub url: String,
    pub expires_at: DateTime<Utc>,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct PasteResponse {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub expires_in_seconds: u64,
}

impl From<PasteView> for PasteResponse {
    fn from(view: PasteView) -> Self {
        PasteResponse {
            id: view.id,
            content: view.content,
            created_at: view.created_at,
            expires_at: view.expires_at,
            expires_in_seconds: view.seconds_until_expiry,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expired_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_size: Option<usize>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub current_size: Option<usize>,
}

impl ErrorBody {
    pub fn new(error: impl Into<String>) -> Self {
        ErrorBody {
            error: error.into(),
            id: None,
            expired_at: None,
            max_size: None,
            current_size: None,
        }
    }
}
