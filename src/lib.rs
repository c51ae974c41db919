//! # catalog-graph - read-only package catalog queries
//!
//! Answers upgrade-graph and API-provider questions over a package
//! distribution catalog stored in SQLite.
//!
//! catalog-graph provides:
//! - Domain types for packages, channels and channel entries
//! - An immutable, read-only SQLite handle with a small connection pool
//! - A resolver with one query per question (heads, replaces edges, providers)
//! - Cancellation and deadlines for every query

pub mod model;
pub mod context;
pub mod storage;
pub mod query;
pub mod config;
pub mod ui;

// Re-exports for convenient access
pub use model::{ApiKey, ChannelEntry, PackageChannel, PackageManifest};
pub use context::{CancelHandle, QueryContext};
pub use storage::{CatalogStore, StoreOptions};
pub use query::{CatalogQuery, CatalogResolver};

/// Result type alias for catalog operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for catalog operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    NotFound(#[from] NotFound),

    #[error("Storage error: {0}")]
    Store(#[from] rusqlite::Error),

    #[error("Query cancelled")]
    Cancelled,

    #[error("Query deadline exceeded")]
    DeadlineExceeded,

    #[error("Decode error in column {column}: {reason}")]
    Decode { column: String, reason: String },

    #[error("Invalid catalog: {0}")]
    InvalidCatalog(String),

    #[error("Config error: {0}")]
    Config(String),
}

impl Error {
    /// True for the "no row satisfies the query" family
    pub fn is_not_found(&self) -> bool {
        matches!(self, Error::NotFound(_))
    }
}

/// No row satisfied a query. Each variant carries the query parameters.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum NotFound {
    #[error("package {name} not found")]
    Package { name: String },

    #[error("no bundle found for {package} {channel}")]
    ChannelHead { package: String, channel: String },

    #[error("no bundle found named {name}")]
    Bundle { name: String },

    #[error("no channel entries found that replace {bundle}")]
    EntriesReplacing { bundle: String },

    #[error("no bundle found that replaces {bundle} in {package} {channel}")]
    BundleReplacing {
        bundle: String,
        package: String,
        channel: String,
    },

    #[error("no channel entries found that provide {api}")]
    EntriesProviding { api: ApiKey },

    #[error("no bundle found that provides {api}")]
    BundleProviding { api: ApiKey },
}
