//! Catalog domain types
//!
//! Values returned to callers:
//! - `PackageManifest`: a package, its default channel and channel heads
//! - `ChannelEntry`: a node of a channel's replaces graph
//! - `ApiKey`: an API descriptor (group, version, kind)

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// A package with its default channel and the head bundle of each channel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PackageManifest {
    pub package_name: String,
    pub default_channel_name: String,
    pub channels: Vec<PackageChannel>,
}

impl PackageManifest {
    /// Look up a channel by name
    pub fn channel(&self, name: &str) -> Option<&PackageChannel> {
        self.channels.iter().find(|c| c.name == name)
    }

    /// The channel named by `default_channel_name`, if it was materialized
    pub fn default_channel(&self) -> Option<&PackageChannel> {
        self.channel(&self.default_channel_name)
    }
}

/// A channel of a package and the bundle currently at its head.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PackageChannel {
    pub name: String,
    pub head_bundle_name: String,
}

/// A node in a channel's replaces graph, projected for callers.
///
/// `replaces` holds the name of the bundle this entry supersedes, or the
/// empty string when the entry replaces nothing.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ChannelEntry {
    pub package_name: String,
    pub channel_name: String,
    pub bundle_name: String,
    pub replaces: String,
}

impl ChannelEntry {
    pub fn new(
        package_name: impl Into<String>,
        channel_name: impl Into<String>,
        bundle_name: impl Into<String>,
        replaces: impl Into<String>,
    ) -> Self {
        Self {
            package_name: package_name.into(),
            channel_name: channel_name.into(),
            bundle_name: bundle_name.into(),
            replaces: replaces.into(),
        }
    }

    /// Whether this entry is the tail of its chain
    pub fn replaces_nothing(&self) -> bool {
        self.replaces.is_empty()
    }
}

/// API descriptor provided by a bundle.
///
/// `group` is the API group, or the full name for APIs without one.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ApiKey {
    pub group: String,
    pub version: String,
    pub kind: String,
}

impl ApiKey {
    pub fn new(group: impl Into<String>, version: impl Into<String>, kind: impl Into<String>) -> Self {
        Self {
            group: group.into(),
            version: version.into(),
            kind: kind.into(),
        }
    }
}

impl FromStr for ApiKey {
    type Err = crate::Error;

    /// Parse `group/version/kind`; none of the parts may contain a slash.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.split('/').collect();
        match parts.as_slice() {
            [group, version, kind] if !group.is_empty() && !version.is_empty() && !kind.is_empty() => {
                Ok(ApiKey::new(*group, *version, *kind))
            }
            _ => Err(crate::Error::Config(format!(
                "invalid API descriptor '{}', expected group/version/kind",
                s
            ))),
        }
    }
}

impl std::fmt::Display for ApiKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}, Kind={}", self.group, self.version, self.kind)
    }
}
