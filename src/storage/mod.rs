//! Storage Layer - read-only SQLite catalog
//!
//! The catalog is a SQLite file with tables:
//! - package(name, default_channel)
//! - channel(package_name, name, head_bundle_name)
//! - bundle(name, payload)
//! - channel_entry(entry_id, package_name, channel_name, bundle_name, replaces_entry_id, depth)
//! - api_provider(channel_entry_id, group_or_name, version, kind)

pub mod column;
pub mod schema;
pub mod sqlite;

pub use column::{NullInt, NullString};
pub use sqlite::{CatalogStats, CatalogStore, StoreOptions};
