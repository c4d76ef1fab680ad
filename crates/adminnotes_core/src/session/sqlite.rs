//! SQLite-backed session store.
//!
//! Lets throttle history survive across separate process invocations that
//! share one session id.

use super::{SessionResult, SessionStore};
use rusqlite::{params, Connection, OptionalExtension};
use serde_json::Value;
use uuid::Uuid;

/// Stable session identifier.
pub type SessionId = Uuid;

pub struct SqliteSessionStore<'conn> {
    conn: &'conn Connection,
    session_id: SessionId,
}

impl<'conn> SqliteSessionStore<'conn> {
    pub fn new(conn: &'conn Connection, session_id: SessionId) -> Self {
        Self { conn, session_id }
    }

    /// Opens a store for a freshly generated session id.
    pub fn start(conn: &'conn Connection) -> Self {
        Self::new(conn, Uuid::new_v4())
    }

    pub fn session_id(&self) -> SessionId {
        self.session_id
    }

    /// Drops every value stored for this session.
    pub fn destroy(&mut self) -> SessionResult<usize> {
        let removed = self.conn.execute(
            "DELETE FROM session_data WHERE session_id = ?1;",
            [self.session_id.to_string()],
        )?;
        Ok(removed)
    }
}

impl SessionStore for SqliteSessionStore<'_> {
    fn get(&self, key: &str) -> SessionResult<Option<Value>> {
        let raw: Option<String> = self
            .conn
            .query_row(
                "SELECT value FROM session_data WHERE session_id = ?1 AND key = ?2;",
                params![self.session_id.to_string(), key],
                |row| row.get(0),
            )
            .optional()?;

        match raw {
            Some(text) => Ok(Some(serde_json::from_str(&text)?)),
            None => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: Value) -> SessionResult<()> {
        let encoded = serde_json::to_string(&value)?;
        self.conn.execute(
            "INSERT INTO session_data (session_id, key, value)
             VALUES (?1, ?2, ?3)
             ON CONFLICT (session_id, key) DO UPDATE SET
                value = excluded.value,
                updated_at = (strftime('%s', 'now') * 1000);",
            params![self.session_id.to_string(), key, encoded],
        )?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::SqliteSessionStore;
    use crate::db::open_db_in_memory;
    use crate::session::SessionStore;
    use serde_json::json;

    #[test]
    fn values_are_scoped_per_session() {
        let conn = open_db_in_memory().expect("db");
        let mut first = SqliteSessionStore::start(&conn);
        let second = SqliteSessionStore::start(&conn);

        first.set("k", json!([1])).expect("set");
        first.set("k", json!([1, 2])).expect("overwrite");

        assert_eq!(first.get("k").expect("read"), Some(json!([1, 2])));
        assert_eq!(second.get("k").expect("read"), None);

        let reopened = SqliteSessionStore::new(&conn, first.session_id());
        assert_eq!(reopened.get("k").expect("read"), Some(json!([1, 2])));

        assert_eq!(first.destroy().expect("destroy"), 1);
        assert_eq!(first.get("k").expect("read"), None);
    }
}
