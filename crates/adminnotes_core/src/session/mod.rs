//! Session-scoped key/value storage.
//!
//! # Responsibility
//! - Hold per-session state (currently the save throttle history).
//! - Keep the store explicit: callers pass it in through `RequestContext`.
//!
//! # Invariants
//! - Values are JSON documents; a missing key reads as `None`.

use crate::db::DbError;
use serde_json::Value;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

mod sqlite;

pub use sqlite::{SessionId, SqliteSessionStore};

pub type SessionResult<T> = Result<T, SessionError>;

#[derive(Debug)]
pub enum SessionError {
    Db(DbError),
    Encoding(serde_json::Error),
}

impl Display for SessionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Db(err) => write!(f, "{err}"),
            Self::Encoding(err) => write!(f, "invalid session value: {err}"),
        }
    }
}

impl Error for SessionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Db(err) => Some(err),
            Self::Encoding(err) => Some(err),
        }
    }
}

impl From<rusqlite::Error> for SessionError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Db(DbError::Sqlite(value))
    }
}

impl From<serde_json::Error> for SessionError {
    fn from(value: serde_json::Error) -> Self {
        Self::Encoding(value)
    }
}

/// Key/value store bound to one user session.
pub trait SessionStore {
    fn get(&self, key: &str) -> SessionResult<Option<Value>>;
    fn set(&mut self, key: &str, value: Value) -> SessionResult<()>;

    /// Reads `key`, falling back to `default` when it is unset.
    fn get_or(&self, key: &str, default: Value) -> SessionResult<Value> {
        Ok(self.get(key)?.unwrap_or(default))
    }
}

/// Process-local session, used for tests and single-shot requests.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    values: HashMap<String, Value>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }
}

impl SessionStore for MemorySession {
    fn get(&self, key: &str) -> SessionResult<Option<Value>> {
        Ok(self.values.get(key).cloned())
    }

    fn set(&mut self, key: &str, value: Value) -> SessionResult<()> {
        self.values.insert(key.to_string(), value);
        Ok(())
    }
}
