use std::io;
use std::path::Path;
use std::time::SystemTime;

use tokio::fs::{self, File};
use tokio::io::AsyncRead;
use tracing::debug;

use crate::copy::copy_stream;
use crate::error::{StoreError, StoreResult};
use crate::key::StoreKey;
use crate::resolver::{KeyResolver, StoreRoot};

/// Size and modification time of a stored value.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ValueMeta {
    pub len: u64,
    pub modified: SystemTime,
}

/// File-backed value store: one regular file per key, directly under the root.
///
/// Every operation resolves its key afresh and owns its file handles for the
/// duration of the call only. There is no coordination between concurrent
/// writers; the last `replace` to finish wins.
#[derive(Clone, Debug)]
pub struct FileStore {
    resolver: KeyResolver,
}

impl FileStore {
    pub fn new(root: StoreRoot) -> Self {
        Self {
            resolver: KeyResolver::new(root),
        }
    }

    pub fn resolver(&self) -> &KeyResolver {
        &self.resolver
    }

    pub fn root(&self) -> &StoreRoot {
        self.resolver.root()
    }

    /// Metadata of the value stored under `key`.
    ///
    /// Returns [`StoreError::NotFound`] unless the key names an existing
    /// regular file.
    pub async fn stat(&self, key: &StoreKey) -> StoreResult<ValueMeta> {
        let path = self.resolver.resolve_key(key).await?;
        regular_file_meta(key, &path).await
    }

    /// Open the value stored under `key` for reading.
    pub async fn open(&self, key: &StoreKey) -> StoreResult<(File, ValueMeta)> {
        let path = self.resolver.resolve_key(key).await?;
        let meta = regular_file_meta(key, &path).await?;
        let file = File::open(&path).await.map_err(|e| not_found_or_io(key, e))?;
        Ok((file, meta))
    }

    /// Replace the value under `key` with the full contents of `reader`.
    ///
    /// The file is created if absent and truncated otherwise. Returns the
    /// number of bytes written.
    pub async fn replace<R>(&self, key: &StoreKey, reader: &mut R) -> StoreResult<u64>
    where
        R: AsyncRead + Unpin + ?Sized,
    {
        let path = self.resolver.resolve_key(key).await?;
        let mut file = File::create(&path).await?;
        let written = copy_stream(reader, &mut file).await?;
        debug!("Stored key={} ({} bytes)", key, written);
        Ok(written)
    }

    /// Delete the value under `key`.
    pub async fn remove(&self, key: &StoreKey) -> StoreResult<()> {
        let path = self.resolver.resolve_key(key).await?;
        regular_file_meta(key, &path).await?;
        fs::remove_file(&path)
            .await
            .map_err(|e| not_found_or_io(key, e))?;
        debug!("Deleted key={}", key);
        Ok(())
    }
}

async fn regular_file_meta(key: &StoreKey, path: &Path) -> StoreResult<ValueMeta> {
    let metadata = fs::metadata(path).await.map_err(|e| not_found_or_io(key, e))?;
    if !metadata.is_file() {
        return Err(StoreError::NotFound { key: key.to_string() });
    }
    Ok(ValueMeta {
        len: metadata.len(),
        modified: metadata.modified()?,
    })
}

fn not_found_or_io(key: &StoreKey, e: io::Error) -> StoreError {
    if e.kind() == io::ErrorKind::NotFound {
        StoreError::NotFound { key: key.to_string() }
    } else {
        StoreError::Io(e)
    }
}
