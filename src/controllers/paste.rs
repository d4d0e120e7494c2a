use serde_json::Value;

use crate::error::ApiError;
use crate::models::PasteView;
use crate::storage::PasteStore;
use crate::types::api::{CreatePaste, CreatedPaste};
use crate::App;

/// Validate a create request and store its content.
pub fn create(app: &App, request: CreatePaste) -> crate::ApiResult<CreatedPaste> {
    let content = match request.content {
        None | Some(Value::Null) => return Err(ApiError::InvalidInput("Content is required")),
        Some(Value::String(content)) => content,
        Some(_) => {
            return Err(ApiError::InvalidInput(
                "Content must be a non-empty string",
            ))
        }
    };

    let paste = app.store.create(&content).map_err(ApiError::from_create)?;

    Ok(CreatedPaste {
        url: app.config.paste_url(&paste.id),
        id: paste.id,
        expires_at: paste.expires_at,
    })
}

/// Look up a live paste.
pub fn fetch(app: &App, id: &str) -> crate::ApiResult<PasteView> {
    app.store.get(id).map_err(|e| ApiError::from_get(id, e))
}
