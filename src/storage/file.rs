use std::fs;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use anyhow::bail;
use chrono::Duration;
use tracing::{info, warn};

use super::{IdGenerator, PasteStore, MAX_ID_ATTEMPTS};
use crate::clock::{Clock, SystemClock};
use crate::error::{StoreError, StoreResult};
use crate::id::{generate_id, is_well_formed};
use crate::models::{Limits, NewPaste, Paste, PasteView};

/// Paste store keeping one JSON document per paste in a directory.
///
/// A single lock serializes all filesystem access from this process, so the
/// expiry check and the removal that follows it happen as one step.
pub struct FileStore {
    dir: PathBuf,
    limits: Limits,
    clock: Arc<dyn Clock>,
    generate_id: IdGenerator,
    lock: Mutex<()>,
}

impl FileStore {
    pub fn new(dir: impl Into<PathBuf>, limits: Limits) -> anyhow::Result<Self> {
        let dir: PathBuf = dir.into();

        if !dir.exists() {
            bail!("directory does not exist: {}", dir.display());
        }

        if !dir.is_dir() {
            bail!("not a directory: {}", dir.display());
        }

        Ok(FileStore {
            dir,
            limits,
            clock: Arc::new(SystemClock),
            generate_id: Box::new(generate_id),
            lock: Mutex::new(()),
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    pub fn with_id_generator(mut self, generate: impl Fn() -> String + Send + Sync + 'static) -> Self {
        self.generate_id = Box::new(generate);
        self
    }

    fn path_for(&self, id: &str) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn read_paste(&self, id: &str) -> StoreResult<Paste> {
        let data = match fs::read(self.path_for(id)) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Err(StoreError::NotFound),
            Err(e) => return Err(e.into()),
        };

        serde_json::from_slice(&data).map_err(|source| StoreError::Corrupt {
            id: id.to_owned(),
            source,
        })
    }
}

impl PasteStore for FileStore {
    fn limits(&self) -> &Limits {
        &self.limits
    }

    fn create_with_ttl(&self, content: &str, ttl: Duration) -> StoreResult<NewPaste> {
        let size = self.limits.validate(content)?;
        // built before any file is opened so a bad ttl leaves nothing behind
        let mut paste = Paste::new(String::new(), content.to_owned(), self.clock.now(), ttl)?;

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());

        for _ in 0..MAX_ID_ATTEMPTS {
            let id = (self.generate_id)();
            if !is_well_formed(&id) {
                warn!("generated id '{id}' is not usable as a file name, retrying");
                continue;
            }

            let mut file = match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(self.path_for(&id))
            {
                Ok(file) => file,
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    warn!("id collision on '{id}', retrying");
                    continue;
                }
                Err(e) => return Err(e.into()),
            };

            paste.id = id;
            let written = serde_json::to_vec(&paste)
                .map_err(io::Error::from)
                .and_then(|data| file.write_all(&data));
            if let Err(e) = written {
                drop(file);
                _ = fs::remove_file(self.path_for(&paste.id));
                return Err(e.into());
            }

            info!(
                "new paste: id='{id}', size={size}, expires_at={expires_at}",
                id = paste.id,
                expires_at = paste.expires_at,
            );
            return Ok(paste.summary());
        }

        Err(StoreError::IdsExhausted {
            attempts: MAX_ID_ATTEMPTS,
        })
    }

    fn get(&self, id: &str) -> StoreResult<PasteView> {
        if !is_well_formed(id) {
            return Err(StoreError::NotFound);
        }

        let _guard = self.lock.lock().unwrap_or_else(|e| e.into_inner());
        let paste = self.read_paste(id)?;
        let now = self.clock.now();

        match paste.view(&now) {
            Some(view) => Ok(view),
            None => {
                info!("deleting expired paste: {id}");
                fs::remove_file(self.path_for(id))?;
                Err(StoreError::Expired {
                    expired_at: paste.expires_at,
                })
            }
        }
    }
}
