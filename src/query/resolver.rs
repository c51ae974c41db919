//! Catalog graph resolver
//!
//! Answers catalog questions with one SQL statement each. The replaces
//! graph is never loaded into memory; edges are followed with self-joins
//! on `channel_entry`:
//! - "what replaces B": entries whose `replaces_entry_id` is an entry of B
//! - "latest provider": minimum `depth` per (package, channel)
//! - "default provider": the latter, restricted to each package's default channel
//!
//! Ties on minimum depth are broken by bundle name so repeated calls
//! return the same rows. NULL depths sort after every real depth.

use std::path::Path;
use std::sync::Arc;
use rusqlite::{Row, params};
use crate::{NotFound, Result};
use crate::context::QueryContext;
use crate::model::{ApiKey, ChannelEntry, PackageChannel, PackageManifest};
use crate::storage::column::{self, NullString};
use crate::storage::{CatalogStore, StoreOptions};
use super::CatalogQuery;

/// Resolver behavior switches
#[derive(Debug, Clone, Default)]
pub struct ResolverOptions {
    /// Maximum number of channels materialized by `get_package`.
    ///
    /// `None` returns every channel. `Some(2)` reproduces older catalog
    /// servers, which only ever reported the first two channels of a
    /// package; callers relying on that truncation can opt back in.
    /// `Some(0)` is treated as `Some(1)`; `CatalogConfig::validate`
    /// rejects it before it gets here.
    pub package_channel_limit: Option<usize>,
}

/// Resolves catalog questions against a shared store handle.
///
/// Cloning is cheap; clones share the store and may be used from many
/// threads at once.
#[derive(Clone)]
pub struct CatalogResolver {
    store: Arc<CatalogStore>,
    options: ResolverOptions,
}

impl CatalogResolver {
    pub fn new(store: Arc<CatalogStore>) -> Self {
        Self::with_options(store, ResolverOptions::default())
    }

    pub fn with_options(store: Arc<CatalogStore>, options: ResolverOptions) -> Self {
        Self { store, options }
    }

    /// Open a catalog file and wrap it in a resolver
    pub fn open(path: &Path) -> Result<Self> {
        Ok(Self::new(Arc::new(CatalogStore::open_with(path, &StoreOptions::default())?)))
    }

    pub fn store(&self) -> &CatalogStore {
        &self.store
    }

    pub fn options(&self) -> &ResolverOptions {
        &self.options
    }

    /// Helper to convert a (package, channel, bundle, replaces) row
    fn row_to_entry(row: &Row) -> rusqlite::Result<ChannelEntry> {
        Ok(ChannelEntry {
            package_name: column::text(row, 0)?,
            channel_name: column::text(row, 1)?,
            bundle_name: column::text(row, 2)?,
            replaces: column::text(row, 3)?,
        })
    }

    /// Helper to read a single payload column
    fn row_to_payload(row: &Row) -> rusqlite::Result<String> {
        column::text(row, 0)
    }
}

impl CatalogQuery for CatalogResolver {
    #[tracing::instrument(level = "debug", skip(self, ctx))]
    fn list_packages(&self, ctx: &QueryContext) -> Result<Vec<String>> {
        let names = self.store.query_rows(
            ctx,
            "SELECT DISTINCT name FROM package ORDER BY name",
            [],
            |row| row.get::<_, NullString>(0),
        )?;

        Ok(names.into_iter().filter_map(|n| n.0).collect())
    }

    #[tracing::instrument(level = "debug", skip(self, ctx))]
    fn get_package(&self, ctx: &QueryContext, name: &str) -> Result<PackageManifest> {
        // LIMIT -1 is unbounded in SQLite
        let limit = self
            .options
            .package_channel_limit
            .map(|n| n.max(1) as i64)
            .unwrap_or(-1);

        let rows = self.store.query_rows(
            ctx,
            r#"
            SELECT DISTINCT package.name, package.default_channel, channel.name, channel.head_bundle_name
            FROM package
            INNER JOIN channel ON channel.package_name = package.name
            WHERE package.name = ?1
            ORDER BY channel.name
            LIMIT ?2
            "#,
            params![name, limit],
            |row| {
                Ok((
                    column::text(row, 0)?,
                    column::text(row, 1)?,
                    PackageChannel {
                        name: column::text(row, 2)?,
                        head_bundle_name: column::text(row, 3)?,
                    },
                ))
            },
        )?;

        let mut rows = rows.into_iter();
        let Some((package_name, default_channel_name, first)) = rows.next() else {
            return Err(NotFound::Package { name: name.to_string() }.into());
        };

        let mut channels = vec![first];
        channels.extend(rows.map(|(_, _, channel)| channel));

        Ok(PackageManifest {
            package_name,
            default_channel_name,
            channels,
        })
    }

    #[tracing::instrument(level = "debug", skip(self, ctx))]
    fn get_bundle_for_channel(&self, ctx: &QueryContext, package: &str, channel: &str) -> Result<String> {
        self.store
            .query_first(
                ctx,
                r#"
                SELECT bundle.payload
                FROM channel
                INNER JOIN bundle ON channel.head_bundle_name = bundle.name
                WHERE channel.package_name = ?1 AND channel.name = ?2
                LIMIT 1
                "#,
                params![package, channel],
                Self::row_to_payload,
            )?
            .ok_or_else(|| {
                NotFound::ChannelHead {
                    package: package.to_string(),
                    channel: channel.to_string(),
                }
                .into()
            })
    }

    #[tracing::instrument(level = "debug", skip(self, ctx))]
    fn get_bundle_for_name(&self, ctx: &QueryContext, name: &str) -> Result<String> {
        self.store
            .query_first(
                ctx,
                "SELECT payload FROM bundle WHERE name = ?1 LIMIT 1",
                [name],
                Self::row_to_payload,
            )?
            .ok_or_else(|| NotFound::Bundle { name: name.to_string() }.into())
    }

    #[tracing::instrument(level = "debug", skip(self, ctx))]
    fn get_channel_entries_that_replace(&self, ctx: &QueryContext, bundle: &str) -> Result<Vec<ChannelEntry>> {
        let entries = self.store.query_rows(
            ctx,
            r#"
            SELECT DISTINCT entry.package_name, entry.channel_name, entry.bundle_name
            FROM channel_entry entry
            INNER JOIN channel_entry replaced ON entry.replaces_entry_id = replaced.entry_id
            WHERE replaced.bundle_name = ?1
            ORDER BY entry.package_name, entry.channel_name, entry.bundle_name
            "#,
            [bundle],
            |row| {
                Ok(ChannelEntry {
                    package_name: column::text(row, 0)?,
                    channel_name: column::text(row, 1)?,
                    bundle_name: column::text(row, 2)?,
                    replaces: bundle.to_string(),
                })
            },
        )?;

        if entries.is_empty() {
            return Err(NotFound::EntriesReplacing { bundle: bundle.to_string() }.into());
        }
        Ok(entries)
    }

    #[tracing::instrument(level = "debug", skip(self, ctx))]
    fn get_bundle_that_replaces(
        &self,
        ctx: &QueryContext,
        bundle: &str,
        package: &str,
        channel: &str,
    ) -> Result<String> {
        self.store
            .query_first(
                ctx,
                r#"
                SELECT bundle.payload
                FROM channel_entry entry
                INNER JOIN channel_entry replacement ON replacement.replaces_entry_id = entry.entry_id
                INNER JOIN bundle ON replacement.bundle_name = bundle.name
                WHERE entry.bundle_name = ?1 AND entry.package_name = ?2 AND entry.channel_name = ?3
                ORDER BY replacement.depth IS NULL, replacement.depth, replacement.bundle_name
                LIMIT 1
                "#,
                params![bundle, package, channel],
                Self::row_to_payload,
            )?
            .ok_or_else(|| {
                NotFound::BundleReplacing {
                    bundle: bundle.to_string(),
                    package: package.to_string(),
                    channel: channel.to_string(),
                }
                .into()
            })
    }

    #[tracing::instrument(level = "debug", skip(self, ctx))]
    fn get_channel_entries_that_provide(&self, ctx: &QueryContext, api: &ApiKey) -> Result<Vec<ChannelEntry>> {
        let entries = self.store.query_rows(
            ctx,
            r#"
            SELECT DISTINCT entry.package_name, entry.channel_name, entry.bundle_name, replaced.bundle_name
            FROM channel_entry entry
            INNER JOIN api_provider ON entry.entry_id = api_provider.channel_entry_id
            LEFT OUTER JOIN channel_entry replaced ON entry.replaces_entry_id = replaced.entry_id
            WHERE api_provider.group_or_name = ?1 AND api_provider.version = ?2 AND api_provider.kind = ?3
            ORDER BY entry.package_name, entry.channel_name, entry.bundle_name
            "#,
            params![api.group, api.version, api.kind],
            Self::row_to_entry,
        )?;

        if entries.is_empty() {
            return Err(NotFound::EntriesProviding { api: api.clone() }.into());
        }
        Ok(entries)
    }

    #[tracing::instrument(level = "debug", skip(self, ctx))]
    fn get_latest_channel_entries_that_provide(
        &self,
        ctx: &QueryContext,
        api: &ApiKey,
    ) -> Result<Vec<ChannelEntry>> {
        let entries = self.store.query_rows(
            ctx,
            r#"
            SELECT package_name, channel_name, bundle_name, replaces
            FROM (
                SELECT entry.package_name AS package_name,
                       entry.channel_name AS channel_name,
                       entry.bundle_name AS bundle_name,
                       replaced.bundle_name AS replaces,
                       ROW_NUMBER() OVER (
                           PARTITION BY entry.package_name, entry.channel_name
                           ORDER BY entry.depth IS NULL, entry.depth, entry.bundle_name
                       ) AS position
                FROM channel_entry entry
                INNER JOIN api_provider ON entry.entry_id = api_provider.channel_entry_id
                LEFT OUTER JOIN channel_entry replaced ON entry.replaces_entry_id = replaced.entry_id
                WHERE api_provider.group_or_name = ?1 AND api_provider.version = ?2 AND api_provider.kind = ?3
            )
            WHERE position = 1
            ORDER BY package_name, channel_name
            "#,
            params![api.group, api.version, api.kind],
            Self::row_to_entry,
        )?;

        if entries.is_empty() {
            return Err(NotFound::EntriesProviding { api: api.clone() }.into());
        }
        Ok(entries)
    }

    #[tracing::instrument(level = "debug", skip(self, ctx))]
    fn get_bundle_that_provides(&self, ctx: &QueryContext, api: &ApiKey) -> Result<String> {
        let candidates = self.store.query_rows(
            ctx,
            r#"
            SELECT payload, package_name, channel_name
            FROM (
                SELECT bundle.payload AS payload,
                       entry.package_name AS package_name,
                       entry.channel_name AS channel_name,
                       ROW_NUMBER() OVER (
                           PARTITION BY entry.package_name, entry.channel_name
                           ORDER BY entry.depth IS NULL, entry.depth, entry.bundle_name
                       ) AS position
                FROM channel_entry entry
                INNER JOIN api_provider ON entry.entry_id = api_provider.channel_entry_id
                INNER JOIN bundle ON bundle.name = entry.bundle_name
                INNER JOIN package ON package.name = entry.package_name
                WHERE api_provider.group_or_name = ?1 AND api_provider.version = ?2 AND api_provider.kind = ?3
                  AND package.default_channel = entry.channel_name
            )
            WHERE position = 1
            ORDER BY package_name, channel_name
            "#,
            params![api.group, api.version, api.kind],
            |row| {
                Ok((
                    row.get::<_, NullString>(0)?,
                    column::text(row, 1)?,
                    column::text(row, 2)?,
                ))
            },
        )?;

        if candidates.len() > 1 {
            let packages: Vec<&str> = candidates.iter().map(|(_, p, _)| p.as_str()).collect();
            tracing::warn!(%api, ?packages, "API provided by several default channels, using the first");
        }

        // a NULL payload is no usable provider
        match candidates.into_iter().next() {
            Some((NullString(Some(payload)), _, _)) => Ok(payload),
            _ => Err(NotFound::BundleProviding { api: api.clone() }.into()),
        }
    }
}
