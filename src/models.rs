use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{StoreError, StoreResult};

/// Default maximum paste length, in characters.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 1_048_576;

/// Default lifetime of a paste, in days.
pub const DEFAULT_EXPIRY_DAYS: u32 = 7;

/// A stored paste.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Paste {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// What a successful create hands back to the caller.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewPaste {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
}

/// A live paste as seen at a particular instant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PasteView {
    pub id: String,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub seconds_until_expiry: u64,
}

/// Size and lifetime limits applied by a store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Limits {
    max_content_length: usize,
    ttl: Duration,
}

impl Limits {
    /// The TTL must be positive and small enough that `now + ttl` is a
    /// representable instant.
    pub fn new(max_content_length: usize, ttl: Duration) -> StoreResult<Self> {
        if ttl <= Duration::zero() || Utc::now().checked_add_signed(ttl).is_none() {
            return Err(StoreError::InvalidTtl);
        }
        Ok(Self {
            max_content_length,
            ttl,
        })
    }

    pub fn max_content_length(&self) -> usize {
        self.max_content_length
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Check `content` against the emptiness and size rules.
    ///
    /// Length is counted in characters, the same unit as the limit, and
    /// returned on success.
    pub fn validate(&self, content: &str) -> StoreResult<usize> {
        if content.trim().is_empty() {
            return Err(StoreError::EmptyContent);
        }

        let current_size = content.chars().count();
        if current_size > self.max_content_length {
            return Err(StoreError::ContentTooLarge {
                max_size: self.max_content_length,
                current_size,
            });
        }

        Ok(current_size)
    }
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
            ttl: Duration::days(DEFAULT_EXPIRY_DAYS.into()),
        }
    }
}

impl Paste {
    /// Build a record created at `now` that lives for `ttl`.
    pub fn new(id: String, content: String, now: DateTime<Utc>, ttl: Duration) -> StoreResult<Self> {
        if ttl <= Duration::zero() {
            return Err(StoreError::InvalidTtl);
        }
        let expires_at = now
            .checked_add_signed(ttl)
            .ok_or(StoreError::InvalidTtl)?;

        Ok(Paste {
            id,
            content,
            created_at: now,
            expires_at,
        })
    }

    /// A paste is expired strictly after its expiry instant.
    pub fn is_expired(&self, now: &DateTime<Utc>) -> bool {
        *now > self.expires_at
    }

    pub fn summary(&self) -> NewPaste {
        NewPaste {
            id: self.id.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
        }
    }

    /// The caller-facing view at `now`, or `None` once expired.
    pub fn view(&self, now: &DateTime<Utc>) -> Option<PasteView> {
        if self.is_expired(now) {
            return None;
        }

        // not expired, so the difference is non-negative
        let seconds_until_expiry = (self.expires_at - *now).num_seconds().max(0) as u64;

        Some(PasteView {
            id: self.id.clone(),
            content: self.content.clone(),
            created_at: self.created_at,
            expires_at: self.expires_at,
            seconds_until_expiry,
        })
    }
}
