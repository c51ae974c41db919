//! SQLite catalog store - read-only, immutable handle

use std::ops::Deref;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, MutexGuard, TryLockError};
use std::time::Instant;
use rusqlite::{Connection, ErrorCode, OpenFlags, Params, Row};
use crate::context::QueryContext;
use crate::{Error, Result};
use super::schema;

/// Number of SQLite VM instructions between cancellation checks
const PROGRESS_INTERVAL: i32 = 1000;

/// Options for opening a catalog
#[derive(Debug, Clone)]
pub struct StoreOptions {
    /// Connections kept open for concurrent readers
    pub read_connections: usize,
}

impl Default for StoreOptions {
    fn default() -> Self {
        Self { read_connections: 4 }
    }
}

/// Read-only handle to a catalog database.
///
/// The file is opened with `immutable=1`: SQLite takes no locks and assumes
/// nothing writes to it while the handle is alive. A handful of connections
/// are kept so concurrent queries do not queue behind each other; when all
/// of them are busy a short-lived overflow connection is opened instead.
pub struct CatalogStore {
    path: PathBuf,
    readers: Vec<Mutex<Connection>>,
    next: AtomicUsize,
}

impl CatalogStore {
    /// Open a catalog file with default options
    pub fn open(path: &Path) -> Result<Self> {
        Self::open_with(path, &StoreOptions::default())
    }

    /// Open a catalog file. Fails if the file cannot be opened, is not a
    /// SQLite database, or lacks one of the catalog tables.
    pub fn open_with(path: &Path, options: &StoreOptions) -> Result<Self> {
        let first = open_connection(path)?;
        verify_schema(&first)?;

        let mut readers = vec![Mutex::new(first)];
        for _ in 1..options.read_connections.max(1) {
            readers.push(Mutex::new(open_connection(path)?));
        }

        tracing::debug!(path = %path.display(), connections = readers.len(), "opened catalog");
        Ok(Self {
            path: path.to_path_buf(),
            readers,
            next: AtomicUsize::new(0),
        })
    }

    /// Location the catalog was opened from
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Run a parameterized query and map every row.
    ///
    /// The context is checked before the statement runs, between rows and
    /// inside SQLite; a fired context aborts the query with `Cancelled` or
    /// `DeadlineExceeded` and discards any rows read so far.
    pub fn query_rows<T, P, F>(&self, ctx: &QueryContext, sql: &str, params: P, map: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row) -> rusqlite::Result<T>,
    {
        self.run(ctx, sql, params, None, map)
    }

    /// Run a parameterized query and map the first row, if any
    pub fn query_first<T, P, F>(&self, ctx: &QueryContext, sql: &str, params: P, map: F) -> Result<Option<T>>
    where
        P: Params,
        F: FnMut(&Row) -> rusqlite::Result<T>,
    {
        Ok(self.run(ctx, sql, params, Some(1), map)?.into_iter().next())
    }

    /// Row counts of the catalog tables
    pub fn stats(&self, ctx: &QueryContext) -> Result<CatalogStats> {
        let count = |table: &str| -> Result<usize> {
            let sql = format!("SELECT COUNT(*) FROM {}", table);
            let n = self
                .query_first(ctx, &sql, [], |row| super::column::int(row, 0))?
                .unwrap_or(0);
            Ok(n as usize)
        };

        Ok(CatalogStats {
            packages: count("package")?,
            channels: count("channel")?,
            bundles: count("bundle")?,
            channel_entries: count("channel_entry")?,
            api_providers: count("api_provider")?,
        })
    }

    fn run<T, P, F>(&self, ctx: &QueryContext, sql: &str, params: P, limit: Option<usize>, mut map: F) -> Result<Vec<T>>
    where
        P: Params,
        F: FnMut(&Row) -> rusqlite::Result<T>,
    {
        ctx.check()?;
        let started = Instant::now();
        let conn = self.acquire()?;

        let watch = ctx.clone();
        conn.progress_handler(PROGRESS_INTERVAL, Some(move || watch.is_done()));
        let result = collect_rows(&conn, ctx, sql, params, limit, &mut map);
        conn.progress_handler(0, None::<fn() -> bool>);

        match result {
            Ok(rows) => {
                tracing::debug!(rows = rows.len(), elapsed = ?started.elapsed(), "query complete");
                Ok(rows)
            }
            Err(e) => {
                let e = classify(e, ctx);
                tracing::debug!(error = %e, elapsed = ?started.elapsed(), "query failed");
                Err(e)
            }
        }
    }

    /// Take an idle pooled connection, or open an overflow one
    fn acquire(&self) -> Result<Lease<'_>> {
        let start = self.next.fetch_add(1, Ordering::Relaxed);
        for i in 0..self.readers.len() {
            let slot = &self.readers[(start + i) % self.readers.len()];
            match slot.try_lock() {
                Ok(guard) => return Ok(Lease::Pooled(guard)),
                // connections carry no in-memory state worth discarding
                Err(TryLockError::Poisoned(poisoned)) => return Ok(Lease::Pooled(poisoned.into_inner())),
                Err(TryLockError::WouldBlock) => continue,
            }
        }

        tracing::debug!(path = %self.path.display(), "all readers busy, opening overflow connection");
        Ok(Lease::Overflow(open_connection(&self.path)?))
    }
}

/// A connection borrowed for the duration of one query
enum Lease<'a> {
    Pooled(MutexGuard<'a, Connection>),
    Overflow(Connection),
}

impl Deref for Lease<'_> {
    type Target = Connection;

    fn deref(&self) -> &Connection {
        match self {
            Lease::Pooled(guard) => &**guard,
            Lease::Overflow(conn) => conn,
        }
    }
}

fn collect_rows<T, P, F>(
    conn: &Connection,
    ctx: &QueryContext,
    sql: &str,
    params: P,
    limit: Option<usize>,
    map: &mut F,
) -> Result<Vec<T>>
where
    P: Params,
    F: FnMut(&Row) -> rusqlite::Result<T>,
{
    let mut stmt = conn.prepare_cached(sql)?;
    let mut rows = stmt.query(params)?;
    let mut out = Vec::new();

    while let Some(row) = rows.next()? {
        ctx.check()?;
        out.push(map(row).map_err(|e| decode_error(row, e))?);
        if limit.is_some_and(|n| out.len() >= n) {
            break;
        }
    }
    Ok(out)
}

/// Column conversion failures become `Decode`; anything else stays a store error
fn decode_error(row: &Row, err: rusqlite::Error) -> Error {
    let column_name = |idx: usize| {
        row.as_ref()
            .column_name(idx)
            .map(str::to_string)
            .unwrap_or_else(|_| format!("#{}", idx))
    };

    match err {
        rusqlite::Error::FromSqlConversionFailure(idx, ty, source) => Error::Decode {
            column: column_name(idx),
            reason: format!("cannot read {} value: {}", ty, source),
        },
        rusqlite::Error::InvalidColumnType(idx, _, ty) => Error::Decode {
            column: column_name(idx),
            reason: format!("unexpected {} value", ty),
        },
        rusqlite::Error::IntegralValueOutOfRange(idx, value) => Error::Decode {
            column: column_name(idx),
            reason: format!("value {} out of range", value),
        },
        other => Error::Store(other),
    }
}

/// An interrupted statement is reported as the context's own failure
fn classify(err: Error, ctx: &QueryContext) -> Error {
    match err {
        Error::Store(rusqlite::Error::SqliteFailure(ref failure, _))
            if failure.code == ErrorCode::OperationInterrupted =>
        {
            ctx.check().err().unwrap_or(Error::Cancelled)
        }
        other => other,
    }
}

fn open_connection(path: &Path) -> Result<Connection> {
    let flags = OpenFlags::SQLITE_OPEN_READ_ONLY
        | OpenFlags::SQLITE_OPEN_URI
        | OpenFlags::SQLITE_OPEN_NO_MUTEX;
    let conn = Connection::open_with_flags(immutable_uri(path), flags)?;
    Ok(conn)
}

/// `file:` URI for a read-only, immutable open
fn immutable_uri(path: &Path) -> String {
    let raw = path.to_string_lossy();
    let mut escaped = String::with_capacity(raw.len());
    for c in raw.chars() {
        match c {
            '%' => escaped.push_str("%25"),
            '?' => escaped.push_str("%3f"),
            '#' => escaped.push_str("%23"),
            _ => escaped.push(c),
        }
    }
    format!("file:{}?immutable=1", escaped)
}

fn verify_schema(conn: &Connection) -> Result<()> {
    let mut stmt = conn.prepare("SELECT name FROM sqlite_master WHERE type = 'table'")?;
    let tables: Vec<String> = stmt
        .query_map([], |row| row.get(0))?
        .collect::<rusqlite::Result<_>>()?;

    let missing: Vec<&str> = schema::REQUIRED_TABLES
        .iter()
        .copied()
        .filter(|t| !tables.iter().any(|name| name == t))
        .collect();

    if !missing.is_empty() {
        return Err(Error::InvalidCatalog(format!("missing tables: {}", missing.join(", "))));
    }
    Ok(())
}

/// Catalog row counts
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct CatalogStats {
    pub packages: usize,
    pub channels: usize,
    pub bundles: usize,
    pub channel_entries: usize,
    pub api_providers: usize,
}
