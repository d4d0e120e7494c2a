use std::sync::Arc;

use axum::extract::FromRef;

pub mod clock;
pub mod commands;
pub mod config;
pub mod controllers;
pub mod error;
pub mod html;
pub mod id;
pub mod models;
pub mod storage;
pub mod types;

pub use crate::config::Config;
pub use error::{ApiError, ApiResult, StoreError, StoreResult};
pub use storage::{AnyStore, FileStore, MemoryStore, PasteStore};

/// State shared by every request handler.
#[derive(Clone, FromRef)]
pub struct App {
    pub config: Arc<Config>,
    pub store: AnyStore,
}

impl App {
    pub fn new(config: Config, store: impl Into<AnyStore>) -> Self {
        App {
            config: Arc::new(config),
            store: store.into(),
        }
    }
}
