use std::net::{IpAddr, Ipv4Addr};
use std::path::{Path, PathBuf};

use anyhow::Context;
use chrono::Duration;
use serde::Deserialize;

use crate::models::{Limits, DEFAULT_EXPIRY_DAYS, DEFAULT_MAX_CONTENT_LENGTH};

/// Runtime configuration.
///
/// Every field can be set from an environment variable of the same name in
/// upper case (`MAX_CONTENT_LENGTH`, `CORS_ORIGINS`, ...).
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_bind_address")]
    pub bind_address: IpAddr,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Prefix for paste URLs handed back on create; empty means relative.
    #[serde(default)]
    pub base_url: String,
    #[serde(default = "default_max_content_length")]
    pub max_content_length: usize,
    #[serde(default = "default_expiry_days")]
    pub default_expiry_days: u32,
    #[serde(default = "default_cors_origins")]
    pub cors_origins: Vec<String>,
    #[serde(default)]
    pub storage: StorageKind,
    pub storage_dir: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageKind {
    #[default]
    Memory,
    File,
}

fn default_bind_address() -> IpAddr {
    IpAddr::V4(Ipv4Addr::UNSPECIFIED)
}

fn default_port() -> u16 {
    5000
}

fn default_max_content_length() -> usize {
    DEFAULT_MAX_CONTENT_LENGTH
}

fn default_expiry_days() -> u32 {
    DEFAULT_EXPIRY_DAYS
}

fn default_cors_origins() -> Vec<String> {
    vec!["http://localhost:3000".to_owned()]
}

impl Config {
    /// Load from an optional TOML file overlaid with the process environment.
    ///
    /// A missing file is only an error when `path` was given explicitly.
    pub fn load(path: Option<&Path>) -> anyhow::Result<Self> {
        Self::load_from(path, config::Environment::default())
    }

    fn load_from(path: Option<&Path>, env: config::Environment) -> anyhow::Result<Self> {
        let file = match path {
            Some(path) => config::File::from(path).required(true),
            None => config::File::with_name("config.toml").required(false),
        };

        let config: Config = config::Config::builder()
            .add_source(file)
            .add_source(
                env.try_parsing(true)
                    .list_separator(",")
                    .with_list_parse_key("cors_origins"),
            )
            .build()
            .context("failed to read config")?
            .try_deserialize()
            .context("failed to deserialize config")?;

        Ok(config)
    }

    pub fn limits(&self) -> anyhow::Result<Limits> {
        let ttl = Duration::try_days(self.default_expiry_days.into())
            .context("default_expiry_days is out of range")?;
        Limits::new(self.max_content_length, ttl).context("invalid default_expiry_days")
    }

    /// Cap on raw request bodies.
    ///
    /// Sized for the worst JSON encoding of a paste at the content limit
    /// (a `\uXXXX\uXXXX` surrogate pair is 12 bytes per character), so any
    /// paste within the limit reaches the store, and oversized ones get the
    /// structured 413 rather than a bare transport error.
    pub fn request_body_limit(&self) -> usize {
        self.max_content_length
            .saturating_mul(12)
            .saturating_add(64 * 1024)
    }

    /// Configured origins, trimmed and without trailing slashes.
    pub fn cors_origins(&self) -> Vec<String> {
        self.cors_origins
            .iter()
            .map(|origin| origin.trim().trim_end_matches('/').to_owned())
            .filter(|origin| !origin.is_empty())
            .collect()
    }

    pub fn paste_url(&self, id: &str) -> String {
        format!("{base_url}/p/{id}", base_url = self.base_url.trim_end_matches('/'))
    }
}
