//! Error types for reference-data loading
//!
//! Resolution itself never fails: a cursor outside any recognised context is an
//! ordinary `None` / `Found::NotFound`. The errors here only describe defects in
//! supplied data (bundles and schema documents), which are surfaced at load time.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Defects in a declarative schema document
#[derive(Debug, Error)]
pub enum SchemaError {
    /// A node references a named definition that does not exist
    #[error("schema node at '{path}' references undefined definition '{name}'")]
    UndefinedReference { path: String, name: String },

    /// A mapping declares more than one wildcard key
    #[error("mapping at '{path}' declares more than one wildcard key")]
    DuplicateWildcard { path: String },

    /// A mapping declares more than one array key
    #[error("mapping at '{path}' declares more than one array key")]
    DuplicateArrayKey { path: String },

    /// An array key was declared without the dataset supplying its names
    #[error("array key at '{path}' has no dataset")]
    MissingArrayDataset { path: String },
}

/// Failures while loading a reference-data bundle
#[derive(Debug, Error)]
pub enum BundleError {
    #[error("failed to read bundle {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed bundle JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("invalid schema document: {0}")]
    Schema(#[from] SchemaError),
}
