//! Ordered schema steps for the notes database.
//!
//! Each step runs once; the highest applied step is stored in
//! `PRAGMA user_version`. Steps are append-only and never edited after
//! release.

use crate::db::{DbError, DbResult};
use log::info;
use rusqlite::Connection;

/// `(version, name, sql)`, ascending by version.
const STEPS: &[(u32, &str, &str)] = &[
    (1, "modules", include_str!("0001_modules.sql")),
    (2, "session_data", include_str!("0002_session_data.sql")),
];

/// Schema version produced by a full migration run.
pub fn latest_version() -> u32 {
    STEPS.last().map_or(0, |(version, _, _)| *version)
}

/// Brings `conn` up to [`latest_version`] inside one transaction.
pub fn apply_migrations(conn: &mut Connection) -> DbResult<()> {
    let found: u32 = conn.query_row("PRAGMA user_version;", [], |row| row.get(0))?;
    let supported = latest_version();
    if found > supported {
        return Err(DbError::UnsupportedSchemaVersion { found, supported });
    }

    let pending: Vec<_> = STEPS
        .iter()
        .filter(|(version, _, _)| *version > found)
        .collect();
    if pending.is_empty() {
        return Ok(());
    }

    let tx = conn.transaction()?;
    for (version, name, sql) in &pending {
        tx.execute_batch(sql)?;
        tx.pragma_update(None, "user_version", version)?;
        info!("event=db_migrate_step module=db status=ok version={version} name={name}");
    }
    tx.commit()?;

    info!("event=db_migrate module=db status=ok from_version={found} to_version={supported}");
    Ok(())
}
