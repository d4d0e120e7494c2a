use std::net::SocketAddr;

use anyhow::Context;
use axum::extract::rejection::JsonRejection;
use axum::extract::{DefaultBodyLimit, Path, State};
use axum::http::{header, HeaderValue, Method, StatusCode};
use axum::response::{Html, IntoResponse};
use axum::routing::{get, post};
use axum::{Json, Router};
use tower_http::cors::{Any, CorsLayer};
use tower_http::limit::RequestBodyLimitLayer;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::controllers::paste;
use crate::error::ApiError;
use crate::html::{render_paste, PageError};
use crate::types::api::{CreatePaste, PasteResponse};
use crate::App;

/// Usage text served at the root.
const USAGE: &str = include_str!("../../assets/usage.txt");

pub async fn run(app: App) -> anyhow::Result<()> {
    let addr = SocketAddr::new(app.config.bind_address, app.config.port);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {addr}"))?;
    info!("listening on {addr}");

    axum::serve(listener, router(app))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

pub fn router(app: App) -> Router {
    let body_limit = app.config.request_body_limit();

    Router::new()
        .route("/api/paste", post(create_paste))
        .route("/api/paste/:id", get(get_paste))
        .layer(cors_layer(&app.config))
        .route("/", get(index))
        .route("/p/:id", get(view_paste))
        .layer(DefaultBodyLimit::disable())
        .layer(RequestBodyLimitLayer::new(body_limit))
        .layer(TraceLayer::new_for_http())
        .with_state(app)
}

fn cors_layer(config: &Config) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE]);

    let origins = config.cors_origins();
    if origins.iter().any(|origin| origin == "*") {
        return layer.allow_origin(Any);
    }

    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|origin| match origin.parse() {
            Ok(value) => Some(value),
            Err(_) => {
                warn!("ignoring invalid CORS origin '{origin}'");
                None
            }
        })
        .collect();
    info!("CORS allowed origins: {origins:?}");

    layer.allow_origin(origins).allow_credentials(true)
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("failed to listen for shutdown signal: {e}");
        std::future::pending::<()>().await;
    }
    info!("shutting down");
}

async fn index() -> &'static str {
    USAGE
}

async fn create_paste(
    State(app): State<App>,
    body: Result<Json<CreatePaste>, JsonRejection>,
) -> crate::ApiResult<impl IntoResponse> {
    let Json(request) = body.map_err(|rejection| {
        if rejection.status() == StatusCode::PAYLOAD_TOO_LARGE {
            ApiError::BodyTooLarge
        } else {
            ApiError::InvalidInput("Request must be JSON")
        }
    })?;

    let created = paste::create(&app, request)?;
    let location = created.url.clone();

    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, location)],
        Json(created),
    ))
}

async fn get_paste(
    State(app): State<App>,
    Path(id): Path<String>,
) -> crate::ApiResult<Json<PasteResponse>> {
    let view = paste::fetch(&app, &id)?;
    Ok(Json(view.into()))
}

async fn view_paste(
    State(app): State<App>,
    Path(id): Path<String>,
) -> Result<Html<String>, PageError> {
    let view = paste::fetch(&app, &id)?;
    match render_paste(&view) {
        Ok(page) => Ok(Html(page)),
        Err(e) => {
            error!("error rendering paste {id}: {e}");
            Err(PageError::internal())
        }
    }
}
