use tabled::{settings::Style, Table, Tabled};
use crate::model::{ChannelEntry, PackageManifest};
use crate::storage::CatalogStats;

#[derive(Tabled)]
struct EntryRow {
    #[tabled(rename = "Package")]
    package: String,
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Bundle")]
    bundle: String,
    #[tabled(rename = "Replaces")]
    replaces: String,
}

#[derive(Tabled)]
struct ChannelRow {
    #[tabled(rename = "Channel")]
    channel: String,
    #[tabled(rename = "Head bundle")]
    head: String,
    #[tabled(rename = "Default")]
    default: String,
}

#[derive(Tabled)]
struct MetricRow {
    #[tabled(rename = "Metric")]
    metric: String,
    #[tabled(rename = "Value")]
    value: String,
}

fn render<T: Tabled>(rows: &[T]) -> String {
    if rows.is_empty() {
        return String::new();
    }
    Table::new(rows).with(Style::rounded()).to_string()
}

pub fn entries_table(entries: &[ChannelEntry]) -> String {
    let rows: Vec<EntryRow> = entries
        .iter()
        .map(|e| EntryRow {
            package: e.package_name.clone(),
            channel: e.channel_name.clone(),
            bundle: e.bundle_name.clone(),
            replaces: if e.replaces_nothing() { "-".to_string() } else { e.replaces.clone() },
        })
        .collect();
    render(&rows)
}

pub fn channels_table(manifest: &PackageManifest) -> String {
    let rows: Vec<ChannelRow> = manifest
        .channels
        .iter()
        .map(|c| ChannelRow {
            channel: c.name.clone(),
            head: c.head_bundle_name.clone(),
            default: if c.name == manifest.default_channel_name { "yes".into() } else { String::new() },
        })
        .collect();
    render(&rows)
}

pub fn stats_table(stats: &CatalogStats) -> String {
    let rows: Vec<MetricRow> = [
        ("Packages", stats.packages),
        ("Channels", stats.channels),
        ("Bundles", stats.bundles),
        ("Channel entries", stats.channel_entries),
        ("API providers", stats.api_providers),
    ]
    .into_iter()
    .map(|(metric, value)| MetricRow { metric: metric.to_string(), value: value.to_string() })
    .collect();
    render(&rows)
}
