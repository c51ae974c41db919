//! Catalog schema definitions
//!
//! The catalog is built by an external process; these statements document
//! the layout the resolver queries and are used to build test catalogs.
//! They are never executed against an opened catalog.

/// SQL to create the package table
pub const CREATE_PACKAGE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS package (
    name TEXT PRIMARY KEY,
    default_channel TEXT
)
"#;

/// SQL to create the channel table
pub const CREATE_CHANNEL_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS channel (
    package_name TEXT,
    name TEXT,
    head_bundle_name TEXT,
    PRIMARY KEY(package_name, name)
)
"#;

/// SQL to create the bundle table
pub const CREATE_BUNDLE_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS bundle (
    name TEXT PRIMARY KEY,
    payload TEXT
)
"#;

/// SQL to create the channel_entry table
/// One row per node of a channel's replaces graph; depth 0 is the head
pub const CREATE_CHANNEL_ENTRY_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS channel_entry (
    entry_id INTEGER PRIMARY KEY,
    package_name TEXT,
    channel_name TEXT,
    bundle_name TEXT,
    replaces_entry_id INTEGER,
    depth INTEGER,
    FOREIGN KEY(replaces_entry_id) REFERENCES channel_entry(entry_id)
)
"#;

/// SQL to create the api_provider table
pub const CREATE_API_PROVIDER_TABLE: &str = r#"
CREATE TABLE IF NOT EXISTS api_provider (
    channel_entry_id INTEGER,
    group_or_name TEXT,
    version TEXT,
    kind TEXT,
    FOREIGN KEY(channel_entry_id) REFERENCES channel_entry(entry_id)
)
"#;

/// SQL to create indexes
pub const CREATE_INDEXES: &[&str] = &[
    "CREATE INDEX IF NOT EXISTS idx_entry_bundle ON channel_entry(bundle_name)",
    "CREATE INDEX IF NOT EXISTS idx_entry_replaces ON channel_entry(replaces_entry_id)",
    "CREATE INDEX IF NOT EXISTS idx_entry_channel ON channel_entry(package_name, channel_name)",
    "CREATE INDEX IF NOT EXISTS idx_provider_api ON api_provider(group_or_name, version, kind)",
];

/// Tables a locator must contain to be treated as a catalog
pub const REQUIRED_TABLES: &[&str] = &["package", "channel", "bundle", "channel_entry", "api_provider"];

/// All schema creation statements
pub fn all_schema_statements() -> Vec<&'static str> {
    let mut stmts = vec![
        CREATE_PACKAGE_TABLE,
        CREATE_CHANNEL_TABLE,
        CREATE_BUNDLE_TABLE,
        CREATE_CHANNEL_ENTRY_TABLE,
        CREATE_API_PROVIDER_TABLE,
    ];
    stmts.extend(CREATE_INDEXES.iter().copied());
    stmts
}

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_schema_creates_required_tables() {
        let conn = Connection::open_in_memory().unwrap();
        for stmt in all_schema_statements() {
            conn.execute(stmt, []).unwrap();
        }

        for table in REQUIRED_TABLES {
            let count: i64 = conn
                .query_row(
                    "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = ?1",
                    [table],
                    |row| row.get(0),
                )
                .unwrap();
            assert_eq!(count, 1, "missing table {}", table);
        }
    }
}
