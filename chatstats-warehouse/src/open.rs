//! Opening the warehouse database file.

use crate::error::{WarehouseError, WarehouseResult};
use duckdb::Connection;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Open the warehouse at `path` and apply `memory_limit` and `threads`.
///
/// A database held by another process fails with
/// [`WarehouseError::Locked`]; its write-ahead log belongs to that process
/// and is left alone. Any other failed open is retried once after
/// discarding a leftover `.wal` file, which is what an unclean shutdown
/// leaves behind.
pub fn open_warehouse_db(
    path: &Path,
    memory_limit: &str,
    threads: u32,
) -> WarehouseResult<Connection> {
    let conn = match Connection::open(path) {
        Ok(conn) => conn,
        Err(source) if is_lock_conflict(&source.to_string()) => {
            return Err(WarehouseError::Locked {
                path: path.display().to_string(),
                source,
            });
        }
        Err(error) => reopen_without_wal(path, error)?,
    };

    conn.execute_batch(&format!(
        "PRAGMA memory_limit='{}'; PRAGMA threads={threads};",
        memory_limit.replace('\'', "''"),
    ))?;
    Ok(conn)
}

fn reopen_without_wal(path: &Path, error: duckdb::Error) -> WarehouseResult<Connection> {
    let wal = wal_path(path);
    if !wal.exists() {
        return Err(error.into());
    }

    warn!(wal = %wal.display(), %error, "warehouse open failed, discarding WAL");
    if std::fs::remove_file(&wal).is_err() {
        return Err(error.into());
    }
    Ok(Connection::open(path)?)
}

/// DuckDB keeps its log next to the database as `<file>.wal`.
fn wal_path(path: &Path) -> PathBuf {
    let mut name = OsString::from(path.as_os_str());
    name.push(".wal");
    PathBuf::from(name)
}

/// Whether an open error means another process holds the file lock.
fn is_lock_conflict(message: &str) -> bool {
    let message = message.to_ascii_lowercase();
    ["could not set lock", "conflicting lock", "used by another process"]
        .iter()
        .any(|needle| message.contains(needle))
}
