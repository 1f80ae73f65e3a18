//! Key-to-path resolution confined to the store root.
//!
//! Resolution is a two-layer check. [`StoreKey::parse`] enforces the
//! character whitelist; the resolver then canonicalizes `root/key` and
//! verifies the result still lies strictly inside the canonical root. The
//! whitelist alone lets `.` and `..` through, and a symlink inside the root
//! may point anywhere, so the containment check is never skipped.

use std::io;
use std::path::{Path, PathBuf};

use tokio::fs;
use tracing::{info, warn};

use crate::error::{StoreError, StoreResult};
use crate::key::StoreKey;

/// The canonical directory all values live in.
///
/// Fixed for the lifetime of the process once opened.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoreRoot {
    path: PathBuf,
}

impl StoreRoot {
    /// Create `dir` if it is missing and capture its canonical form.
    pub async fn open(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let dir = dir.as_ref();
        fs::create_dir_all(dir).await?;
        let path = fs::canonicalize(dir).await?;
        info!("Storage path: {}", path.display());
        Ok(Self { path })
    }

    /// Canonicalize `dir`, which must already exist; nothing is created.
    pub async fn existing(dir: impl AsRef<Path>) -> StoreResult<Self> {
        let path = fs::canonicalize(dir.as_ref()).await?;
        Ok(Self { path })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Whether `candidate` (already canonical) lies strictly below the root.
    pub fn contains(&self, candidate: &Path) -> bool {
        candidate
            .strip_prefix(&self.path)
            .map(|rest| rest.components().next().is_some())
            .unwrap_or(false)
    }
}

/// Maps validated keys to canonical file paths inside a [`StoreRoot`].
///
/// Performs no filesystem mutation and does not require the target to exist.
#[derive(Clone, Debug)]
pub struct KeyResolver {
    root: StoreRoot,
}

impl KeyResolver {
    pub fn new(root: StoreRoot) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &StoreRoot {
        &self.root
    }

    /// Resolve a validated key to its canonical path.
    pub async fn resolve_key(&self, key: &StoreKey) -> StoreResult<PathBuf> {
        let joined = self.root.path().join(key.as_str());

        let canonical = match fs::canonicalize(&joined).await {
            Ok(path) => path,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                // Something is there but cannot be followed: a dangling link.
                if fs::symlink_metadata(&joined).await.is_ok() {
                    warn!("INVALID PATH: key={} (dangling link {})", key, joined.display());
                    return Err(StoreError::PathEscape { key: key.to_string() });
                }
                // Separator-free name under a canonical root.
                joined
            }
            Err(e) => return Err(e.into()),
        };

        if !self.root.contains(&canonical) {
            warn!("INVALID PATH: key={} ({})", key, canonical.display());
            return Err(StoreError::PathEscape { key: key.to_string() });
        }

        Ok(canonical)
    }

    /// Validate and resolve a raw client-supplied key.
    pub async fn resolve(&self, raw_key: &str) -> StoreResult<PathBuf> {
        let key = StoreKey::parse(raw_key)?;
        self.resolve_key(&key).await
    }
}

/// Validate `raw_key` and resolve it inside `root`.
pub async fn resolve(root: &StoreRoot, raw_key: &str) -> StoreResult<PathBuf> {
    KeyResolver::new(root.clone()).resolve(raw_key).await
}
