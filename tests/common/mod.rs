#![allow(dead_code)]

use catalog_graph::storage::schema;
use catalog_graph::{CatalogResolver, CatalogStore};
use rusqlite::{Connection, params};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

pub const ETCD_GROUP: &str = "etcd.database.coreos.com";

/// Payload stored for a bundle built by `CatalogBuilder`
pub fn payload(bundle: &str) -> String {
    format!("{{\"name\":\"{}\"}}", bundle)
}

/// Writes a catalog file in a temp dir, row by row
pub struct CatalogBuilder {
    dir: TempDir,
    path: PathBuf,
    conn: Connection,
    next_entry: i64,
}

impl CatalogBuilder {
    pub fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("catalog.db");
        let conn = Connection::open(&path).unwrap();
        conn.pragma_update(None, "foreign_keys", true).unwrap();
        for stmt in schema::all_schema_statements() {
            conn.execute(stmt, []).unwrap();
        }
        Self { dir, path, conn, next_entry: 1 }
    }

    pub fn package(&mut self, name: &str, default_channel: &str) -> &mut Self {
        self.conn
            .execute(
                "INSERT INTO package (name, default_channel) VALUES (?1, ?2)",
                params![name, default_channel],
            )
            .unwrap();
        self
    }

    pub fn channel(&mut self, package: &str, name: &str, head: &str) -> &mut Self {
        self.conn
            .execute(
                "INSERT INTO channel (package_name, name, head_bundle_name) VALUES (?1, ?2, ?3)",
                params![package, name, head],
            )
            .unwrap();
        self
    }

    pub fn bundle(&mut self, name: &str) -> &mut Self {
        self.conn
            .execute(
                "INSERT OR IGNORE INTO bundle (name, payload) VALUES (?1, ?2)",
                params![name, payload(name)],
            )
            .unwrap();
        self
    }

    /// Insert one channel entry, returning its id
    pub fn entry(&mut self, package: &str, channel: &str, bundle: &str, replaces: Option<i64>, depth: i64) -> i64 {
        let id = self.next_entry;
        self.next_entry += 1;
        self.conn
            .execute(
                r#"
                INSERT INTO channel_entry (entry_id, package_name, channel_name, bundle_name, replaces_entry_id, depth)
                VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
                params![id, package, channel, bundle, replaces, depth],
            )
            .unwrap();
        id
    }

    /// A channel whose head is `bundles[0]`; each bundle replaces the next.
    /// Returns the entry ids in the same order (depth = index).
    ///
    /// Rows go in tail first so every `replaces_entry_id` already exists
    /// when it is written.
    pub fn chain(&mut self, package: &str, channel: &str, bundles: &[&str]) -> Vec<i64> {
        self.channel(package, channel, bundles[0]);
        let base = self.next_entry;
        self.next_entry += bundles.len() as i64;

        for (i, bundle) in bundles.iter().enumerate().rev() {
            self.bundle(bundle);
            let id = base + i as i64;
            let replaces = (i + 1 < bundles.len()).then_some(id + 1);
            self.conn
                .execute(
                    r#"
                    INSERT INTO channel_entry (entry_id, package_name, channel_name, bundle_name, replaces_entry_id, depth)
                    VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                    "#,
                    params![id, package, channel, bundle, replaces, i as i64],
                )
                .unwrap();
        }
        (base..base + bundles.len() as i64).collect()
    }

    /// Rows violating a foreign key, as reported by SQLite
    pub fn foreign_key_violations(&self) -> usize {
        let mut stmt = self.conn.prepare("PRAGMA foreign_key_check").unwrap();
        let violations = stmt.query_map([], |_| Ok(())).unwrap().count();
        violations
    }

    pub fn provides(&mut self, entry_id: i64, group: &str, version: &str, kind: &str) -> &mut Self {
        self.conn
            .execute(
                "INSERT INTO api_provider (channel_entry_id, group_or_name, version, kind) VALUES (?1, ?2, ?3, ?4)",
                params![entry_id, group, version, kind],
            )
            .unwrap();
        self
    }

    /// Raw SQL for rows the helpers cannot express
    pub fn exec(&mut self, sql: &str) -> &mut Self {
        self.conn.execute_batch(sql).unwrap();
        self
    }

    /// Close the writer and hand back the file; keep the `TempDir` alive
    pub fn finish(self) -> (TempDir, PathBuf) {
        drop(self.conn);
        (self.dir, self.path)
    }

    pub fn open(self) -> (TempDir, CatalogResolver) {
        let (dir, path) = self.finish();
        let store = CatalogStore::open(&path).unwrap();
        (dir, CatalogResolver::new(Arc::new(store)))
    }
}

/// etcd with a four-bundle `alpha` chain (default) and a two-bundle `beta`
/// chain; every bundle provides EtcdCluster v1
pub fn etcd_catalog() -> CatalogBuilder {
    let mut builder = CatalogBuilder::new();
    builder.package("etcd", "alpha");
    let alpha = builder.chain("etcd", "alpha", &["etcd.v1.0.0", "etcd.v0.9.2", "etcd.v0.9.0", "etcd.v0.6.1"]);
    let beta = builder.chain("etcd", "beta", &["etcd.v0.9.2", "etcd.v0.9.0"]);
    for id in alpha.into_iter().chain(beta) {
        builder.provides(id, ETCD_GROUP, "v1", "EtcdCluster");
    }
    builder
}
