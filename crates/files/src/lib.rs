//! CENAD File Storage
//!
//! This crate stores the files that belong to each CENAD tenant (a training
//! facility) on the local filesystem, grouped by category.
//!
//! ## Storage Model
//!
//! Every tenant owns one folder below a configured root. Inside it each
//! category has its own folder; document categories add one more level keyed
//! by the resource or request the documents belong to:
//!
//! ```text
//! <root>/
//! └── Cenad <tenant id>/
//!     ├── escudos/
//!     ├── docRecursos/<resource id>/
//!     ├── docSolicitudes/<request id>/
//!     ├── cartografias/
//!     ├── normativas/
//!     └── infoCenads/
//! ```
//!
//! Folders are created on first write. Files keep the name they were uploaded
//! with and a second upload of the same name replaces the first. Every
//! identifier and file name is validated as a single path component before it
//! is joined, so no input can address anything outside the root.
//!
//! ## Example Usage
//!
//! ```no_run
//! use cenad_files::{Category, FilesService, FolderKey, StorageConfig};
//! use std::sync::Arc;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let cfg = StorageConfig::from_lookup(|key| std::env::var(key).ok())?;
//! let service = FilesService::new(Arc::new(cfg));
//!
//! let key = FolderKey::parse(Category::ResourceDoc, "7", Some("31"))?;
//! service.save(&key, "manual.pdf", b"%PDF-1.7")?;
//! for entry in service.list(&key)? {
//!     println!("{}", entry?.display());
//! }
//! # Ok(())
//! # }
//! ```

mod category;
mod config;
pub mod constants;
mod files;
mod fs_ops;
pub mod paths;
mod teardown;

pub use category::{parse_category, Category};
pub use cenad_types::{FileName, ResourceId, TenantId};
pub use config::{CategoryDirNames, StorageConfig};
pub use files::{FileHandle, FileMetadata, FilesService, FolderEntries, IncomingFile, SaveOutcome};
pub use paths::FolderKey;

/// Errors that can occur during file operations
#[derive(Debug, thiserror::Error)]
pub enum FilesError {
    /// An identifier or file name failed validation
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The requested file does not exist
    #[error("Not found: {0}")]
    NotFound(String),

    /// A category token did not match any known category
    #[error("Unknown category: {0}")]
    UnknownCategory(String),

    /// Storage configuration is unusable
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

pub type FilesResult<T> = std::result::Result<T, FilesError>;
