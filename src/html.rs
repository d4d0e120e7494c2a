use askama::Template;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use chrono::SecondsFormat;
use tracing::error;

use crate::error::ApiError;
use crate::models::PasteView;

#[derive(Template)]
#[template(path = "paste.html")]
struct PasteTemplate<'a> {
    id: &'a str,
    content: &'a str,
    created_at: String,
    expires_at: String,
    expires_in: String,
}

#[derive(Template)]
#[template(path = "error.html")]
struct ErrorTemplate<'a> {
    message: &'a str,
}

/// Render the page for a live paste.
pub fn render_paste(view: &PasteView) -> Result<String, askama::Error> {
    PasteTemplate {
        id: &view.id,
        content: &view.content,
        created_at: view.created_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        expires_at: view.expires_at.to_rfc3339_opts(SecondsFormat::Secs, true),
        expires_in: format_duration(view.seconds_until_expiry),
    }
    .render()
}

/// Format a number of seconds as e.g. `2 days, 1 hour, 5 seconds`.
///
/// Zero-valued units are left out; zero overall reads `less than a second`.
pub fn format_duration(seconds: u64) -> String {
    const UNITS: [(&str, u64); 4] = [("day", 86_400), ("hour", 3_600), ("minute", 60), ("second", 1)];

    let mut remaining = seconds;
    let mut parts = Vec::new();
    for (name, size) in UNITS {
        let count = remaining / size;
        remaining %= size;
        if count > 0 {
            let plural = if count > 1 { "s" } else { "" };
            parts.push(format!("{count} {name}{plural}"));
        }
    }

    if parts.is_empty() {
        "less than a second".to_owned()
    } else {
        parts.join(", ")
    }
}

/// An error shown to a browser instead of a paste.
#[derive(Debug)]
pub struct PageError {
    status: StatusCode,
    message: &'static str,
}

impl PageError {
    pub fn internal() -> Self {
        PageError {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            message: "Failed to load paste",
        }
    }
}

impl From<ApiError> for PageError {
    fn from(err: ApiError) -> Self {
        let message = match err {
            ApiError::NotFound { .. } => "Paste not found",
            ApiError::Expired { .. } => "Paste has expired",
            _ => return PageError::internal(),
        };
        PageError {
            status: err.status_code(),
            message,
        }
    }
}

impl IntoResponse for PageError {
    fn into_response(self) -> Response {
        match (ErrorTemplate {
            message: self.message,
        })
        .render()
        {
            Ok(body) => (self.status, Html(body)).into_response(),
            Err(e) => {
                error!("error rendering error page: {e}");
                (self.status, self.message).into_response()
            }
        }
    }
}
