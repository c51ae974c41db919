//! Catalog queries
//!
//! `CatalogQuery` is the contract package resolvers and installers depend
//! on; `CatalogResolver` answers it from a `CatalogStore`.

pub mod resolver;

pub use resolver::{CatalogResolver, ResolverOptions};

use crate::Result;
use crate::context::QueryContext;
use crate::model::{ApiKey, ChannelEntry, PackageManifest};

/// Read-only questions about a package catalog.
///
/// Every "no matching row" outcome is `Error::NotFound`, except
/// `list_packages`, which returns an empty list for an empty catalog.
pub trait CatalogQuery {
    /// Distinct package names, sorted
    fn list_packages(&self, ctx: &QueryContext) -> Result<Vec<String>>;

    /// Default channel and channel heads of a package
    fn get_package(&self, ctx: &QueryContext, name: &str) -> Result<PackageManifest>;

    /// Payload of the head bundle of a channel
    fn get_bundle_for_channel(&self, ctx: &QueryContext, package: &str, channel: &str) -> Result<String>;

    /// Payload of a bundle, looked up by name
    fn get_bundle_for_name(&self, ctx: &QueryContext, name: &str) -> Result<String>;

    /// Entries, across every channel, whose replaces edge points at `bundle`
    fn get_channel_entries_that_replace(&self, ctx: &QueryContext, bundle: &str) -> Result<Vec<ChannelEntry>>;

    /// Payload of the bundle that replaces `bundle` within one channel
    fn get_bundle_that_replaces(
        &self,
        ctx: &QueryContext,
        bundle: &str,
        package: &str,
        channel: &str,
    ) -> Result<String>;

    /// Every entry providing `api`
    fn get_channel_entries_that_provide(&self, ctx: &QueryContext, api: &ApiKey) -> Result<Vec<ChannelEntry>>;

    /// The entry closest to the head, per (package, channel), providing `api`
    fn get_latest_channel_entries_that_provide(
        &self,
        ctx: &QueryContext,
        api: &ApiKey,
    ) -> Result<Vec<ChannelEntry>>;

    /// Payload of the latest bundle providing `api` in a package's default channel
    fn get_bundle_that_provides(&self, ctx: &QueryContext, api: &ApiKey) -> Result<String>;
}
