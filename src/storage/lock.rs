//! Per-scope advisory file locks.
//!
//! One writer per scope at a time: the load, transaction and commit of a
//! scope happen while its lock is held. Different scopes lock different
//! files and never wait on each other.

use std::fs::{self, File, OpenOptions};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::core::Scope;
use crate::error::{Result, StError};

/// Exclusive lock on one scope, released on drop.
pub struct ScopeLock {
    lock_file: File,
    lock_path: PathBuf,
    scope: Scope,
}

impl std::fmt::Debug for ScopeLock {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScopeLock")
            .field("scope", &self.scope)
            .field("lock_path", &self.lock_path)
            .finish_non_exhaustive()
    }
}

/// Information about the current lock holder
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LockHolder {
    pub pid: u32,
    pub scope: String,
    pub acquired_at: DateTime<Utc>,
    pub hostname: String,
}

impl ScopeLock {
    const LOCK_DIR: &'static str = "locks";

    /// Path of the lock file guarding `scope` under `st_root`.
    pub fn lock_path(st_root: &Path, scope: &Scope) -> PathBuf {
        st_root
            .join(Self::LOCK_DIR)
            .join(format!("{}.lock", encode_key(&scope.key())))
    }

    /// Acquire the lock, blocking until it is free.
    pub fn acquire(st_root: &Path, scope: &Scope) -> Result<Self> {
        let (lock_file, lock_path) = Self::open(st_root, scope)?;
        lock_file
            .lock_exclusive()
            .map_err(|e| StError::LockFailed(format!("acquire lock on {scope}: {e}")))?;
        Ok(Self::held(lock_file, lock_path, scope))
    }

    /// Try to acquire the lock without blocking.
    pub fn try_acquire(st_root: &Path, scope: &Scope) -> Result<Option<Self>> {
        let (lock_file, lock_path) = Self::open(st_root, scope)?;
        match lock_file.try_lock_exclusive() {
            Ok(()) => Ok(Some(Self::held(lock_file, lock_path, scope))),
            Err(e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                debug!(scope = %scope, "scope lock held by another writer");
                Ok(None)
            }
            Err(e) => Err(StError::LockFailed(format!("try lock on {scope}: {e}"))),
        }
    }

    /// Poll for the lock until `timeout` elapses, then fail with `LockTimeout`.
    pub fn acquire_timeout(st_root: &Path, scope: &Scope, timeout: Duration) -> Result<Self> {
        let start = Instant::now();
        let poll_interval = Duration::from_millis(25);

        loop {
            if let Some(lock) = Self::try_acquire(st_root, scope)? {
                return Ok(lock);
            }
            if start.elapsed() >= timeout {
                break;
            }
            std::thread::sleep(poll_interval);
        }

        warn!(scope = %scope, waited = ?start.elapsed(), "timed out waiting for scope lock");
        let holder = Self::status(st_root, scope)
            .ok()
            .flatten()
            .map(|h| format!(" (held by pid {} on {})", h.pid, h.hostname))
            .unwrap_or_default();
        Err(StError::LockTimeout(format!(
            "scope {scope} still locked after {}ms{holder}",
            timeout.as_millis()
        )))
    }

    /// Who holds the lock on `scope`, if anyone recorded it.
    pub fn status(st_root: &Path, scope: &Scope) -> Result<Option<LockHolder>> {
        let lock_path = Self::lock_path(st_root, scope);
        if !lock_path.exists() {
            return Ok(None);
        }
        let content = fs::read_to_string(&lock_path)?;
        if content.trim().is_empty() {
            return Ok(None);
        }
        let holder: LockHolder = serde_json::from_str(&content)
            .map_err(|e| StError::LockFailed(format!("parse lock holder: {e}")))?;
        Ok(Some(holder))
    }

    pub fn scope(&self) -> &Scope {
        &self.scope
    }

    fn open(st_root: &Path, scope: &Scope) -> Result<(File, PathBuf)> {
        let lock_path = Self::lock_path(st_root, scope);
        if let Some(parent) = lock_path.parent() {
            fs::create_dir_all(parent)?;
        }
        let lock_file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&lock_path)
            .map_err(|e| StError::LockFailed(format!("open lock file: {e}")))?;
        Ok((lock_file, lock_path))
    }

    fn held(lock_file: File, lock_path: PathBuf, scope: &Scope) -> Self {
        let holder = LockHolder {
            pid: std::process::id(),
            scope: scope.key(),
            acquired_at: Utc::now(),
            hostname: hostname::get()
                .ok()
                .and_then(|h| h.into_string().ok())
                .unwrap_or_else(|| "unknown".to_string()),
        };
        let holder_json = serde_json::to_string(&holder).unwrap_or_default();
        fs::write(&lock_path, holder_json).ok();

        debug!(scope = %scope, path = ?lock_path, "acquired scope lock");
        Self {
            lock_file,
            lock_path,
            scope: scope.clone(),
        }
    }
}

impl Drop for ScopeLock {
    fn drop(&mut self) {
        fs::write(&self.lock_path, "").ok();
        if let Err(e) = FileExt::unlock(&self.lock_file) {
            debug!("failed to release scope lock: {}", e);
        }
        debug!(scope = %self.scope, "released scope lock");
    }
}

/// File-name-safe, collision-free rendering of a scope key.
fn encode_key(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    for byte in key.bytes() {
        if byte.is_ascii_alphanumeric() || byte == b'-' || byte == b'_' {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}
