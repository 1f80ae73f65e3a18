//! File-backed value storage for simplestore.
//!
//! Every key maps to exactly one regular file directly inside a single store
//! root; the value is the file's raw bytes.
//!
//! # Modules
//!
//! - [`key`] — [`StoreKey`] validation (`[A-Za-z0-9._-]+`)
//! - [`resolver`] — [`StoreRoot`] and [`KeyResolver`]: canonical, confined
//!   key-to-path resolution
//! - [`fs`] — [`FileStore`]: stat, open, replace and remove by key
//! - [`copy`] — [`copy_stream`], the chunked streaming primitive
//! - [`error`] — [`StoreError`] and [`StoreResult`]
//!
//! # Design Rules
//!
//! 1. A key is validated before any path is built.
//! 2. A resolved path is always canonical and strictly inside the canonical root.
//! 3. Values are replaced whole (truncate), never appended or patched.
//! 4. No content is cached; each call opens and releases its own handles.
//! 5. "Absent" is reported as [`StoreError::NotFound`], distinct from I/O failure.

pub mod copy;
pub mod error;
pub mod fs;
pub mod key;
pub mod resolver;

pub use copy::{copy_stream, CHUNK_SIZE};
pub use error::{StoreError, StoreResult};
pub use fs::{FileStore, ValueMeta};
pub use key::StoreKey;
pub use resolver::{resolve, KeyResolver, StoreRoot};
