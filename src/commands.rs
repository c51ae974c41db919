use crate::{emit_success, OutputMode};
use catalog_graph::config::{self, CatalogConfig};
use catalog_graph::ui::{self, Icons};
use catalog_graph::{ApiKey, CatalogQuery, CatalogResolver, ChannelEntry, QueryContext};
use std::path::Path;

/// An opened catalog plus the context every query of this run shares
pub struct Session {
    pub resolver: CatalogResolver,
    pub ctx: QueryContext,
}

pub fn run_packages(output_mode: OutputMode, session: &Session) -> anyhow::Result<()> {
    let packages = session.resolver.list_packages(&session.ctx)?;

    if !output_mode.is_human() {
        return emit_success(output_mode, "packages", serde_json::json!(packages));
    }

    if packages.is_empty() {
        ui::empty("No packages in catalog.");
    } else {
        for name in &packages {
            println!("{} {}", Icons::PACKAGE, name);
        }
    }
    Ok(())
}

pub fn run_package(output_mode: OutputMode, session: &Session, name: &str) -> anyhow::Result<()> {
    let manifest = session.resolver.get_package(&session.ctx, name)?;

    if !output_mode.is_human() {
        return emit_success(output_mode, "package", serde_json::to_value(&manifest)?);
    }

    ui::header(Icons::PACKAGE, &manifest.package_name);
    ui::field("Default channel", &ui::highlight(&manifest.default_channel_name));
    println!("{}", ui::channels_table(&manifest));
    if manifest.default_channel().is_none() {
        ui::warn("Default channel not among the listed channels");
    }
    Ok(())
}

pub fn run_head(output_mode: OutputMode, session: &Session, package: &str, channel: &str) -> anyhow::Result<()> {
    let payload = session.resolver.get_bundle_for_channel(&session.ctx, package, channel)?;
    emit_payload(output_mode, "head", &payload)
}

pub fn run_bundle(output_mode: OutputMode, session: &Session, name: &str) -> anyhow::Result<()> {
    let payload = session.resolver.get_bundle_for_name(&session.ctx, name)?;
    emit_payload(output_mode, "bundle", &payload)
}

pub fn run_replacements(output_mode: OutputMode, session: &Session, bundle: &str) -> anyhow::Result<()> {
    let entries = session.resolver.get_channel_entries_that_replace(&session.ctx, bundle)?;

    if output_mode.is_human() {
        ui::header(Icons::LINK, &format!("Entries replacing {}", bundle));
    }
    emit_entries(output_mode, "replacements", &entries)
}

pub fn run_replacement(
    output_mode: OutputMode,
    session: &Session,
    bundle: &str,
    package: &str,
    channel: &str,
) -> anyhow::Result<()> {
    let payload = session
        .resolver
        .get_bundle_that_replaces(&session.ctx, bundle, package, channel)?;
    emit_payload(output_mode, "replacement", &payload)
}

pub fn run_providers(output_mode: OutputMode, session: &Session, api: &ApiKey, latest: bool) -> anyhow::Result<()> {
    let entries = if latest {
        session.resolver.get_latest_channel_entries_that_provide(&session.ctx, api)?
    } else {
        session.resolver.get_channel_entries_that_provide(&session.ctx, api)?
    };

    if output_mode.is_human() {
        let scope = if latest { "Latest providers" } else { "Providers" };
        ui::header(Icons::STAR, &format!("{} of {}", scope, api));
    }
    emit_entries(output_mode, "providers", &entries)
}

pub fn run_provider(output_mode: OutputMode, session: &Session, api: &ApiKey) -> anyhow::Result<()> {
    let payload = session.resolver.get_bundle_that_provides(&session.ctx, api)?;
    emit_payload(output_mode, "provider", &payload)
}

pub fn run_stats(output_mode: OutputMode, session: &Session) -> anyhow::Result<()> {
    let stats = session.resolver.store().stats(&session.ctx)?;

    if !output_mode.is_human() {
        return emit_success(output_mode, "stats", serde_json::to_value(&stats)?);
    }

    if stats.packages == 0 {
        ui::warn("Catalog has no packages");
    }
    ui::header(
        Icons::STATS,
        &format!("Catalog statistics ({})", session.resolver.store().path().display()),
    );
    println!("{}", ui::stats_table(&stats));
    Ok(())
}

pub fn run_init(output_mode: OutputMode, path: &Path, settings: &CatalogConfig, force: bool) -> anyhow::Result<()> {
    config::write_config(path, settings, force)?;

    if output_mode.is_human() {
        ui::success(&format!("Wrote {}", path.display()));
        Ok(())
    } else {
        emit_success(output_mode, "init", serde_json::json!({ "path": path.display().to_string() }))
    }
}

/// Payloads are printed verbatim in human mode
fn emit_payload(output_mode: OutputMode, command: &str, payload: &str) -> anyhow::Result<()> {
    if output_mode.is_human() {
        println!("{}", payload);
        Ok(())
    } else {
        emit_success(output_mode, command, serde_json::json!({ "bundle": payload }))
    }
}

fn emit_entries(output_mode: OutputMode, command: &str, entries: &[ChannelEntry]) -> anyhow::Result<()> {
    if output_mode.is_human() {
        println!("{}", ui::entries_table(entries));
        Ok(())
    } else {
        emit_success(output_mode, command, serde_json::to_value(entries)?)
    }
}
