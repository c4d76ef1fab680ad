//! Sliding-window limit on save attempts per session.
//!
//! # Responsibility
//! - Bound write attempts to `max_attempts` within a trailing `window`.
//! - Keep the attempt history in session storage, pruned lazily.
//!
//! # Invariants
//! - An attempt at `t` counts while `now - t < window`.
//! - Every recorded attempt counts, successful or not.
//! - History is per session only; other sessions of the same user are
//!   not aggregated.

use crate::session::SessionStore;
use log::warn;
use serde_json::Value;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Session key holding the attempt timestamps.
pub const SAVE_ATTEMPTS_KEY: &str = "adminnotes.save_attempts";
pub const DEFAULT_MAX_ATTEMPTS: usize = 10;
pub const DEFAULT_WINDOW: Duration = Duration::from_secs(60);

/// Source of the current unix time in seconds.
pub trait Clock {
    fn now_secs(&self) -> i64;
}

/// Wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_secs(&self) -> i64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs() as i64)
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ThrottleConfig {
    pub max_attempts: usize,
    pub window: Duration,
}

impl Default for ThrottleConfig {
    fn default() -> Self {
        Self {
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            window: DEFAULT_WINDOW,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ThrottleDecision {
    Allowed { remaining: usize },
    Denied { retry_after_secs: i64 },
}

impl ThrottleDecision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Self::Allowed { .. })
    }
}

/// Save rate limiter over a session store.
#[derive(Debug, Clone, Copy, Default)]
pub struct SaveThrottle {
    config: ThrottleConfig,
}

impl SaveThrottle {
    pub fn new(config: ThrottleConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> ThrottleConfig {
        self.config
    }

    /// Prunes expired attempts and decides whether another save may run.
    pub fn check(&self, session: &mut dyn SessionStore, now: i64) -> ThrottleDecision {
        let attempts = self.pruned_attempts(session, now);
        self.store(session, &attempts);

        if attempts.len() >= self.config.max_attempts {
            let window = self.window_secs();
            let oldest = attempts.iter().copied().min().unwrap_or(now);
            return ThrottleDecision::Denied {
                retry_after_secs: (oldest + window - now).max(1),
            };
        }

        ThrottleDecision::Allowed {
            remaining: self.config.max_attempts - attempts.len(),
        }
    }

    /// Appends an attempt at `now`.
    pub fn record(&self, session: &mut dyn SessionStore, now: i64) {
        let mut attempts = self.pruned_attempts(session, now);
        attempts.push(now);
        self.store(session, &attempts);
    }

    /// Attempts currently inside the window.
    pub fn attempts(&self, session: &dyn SessionStore, now: i64) -> Vec<i64> {
        self.pruned_attempts(session, now)
    }

    fn window_secs(&self) -> i64 {
        self.config.window.as_secs() as i64
    }

    fn pruned_attempts(&self, session: &dyn SessionStore, now: i64) -> Vec<i64> {
        let window = self.window_secs();
        load_attempts(session)
            .into_iter()
            .filter(|attempt| now - attempt < window)
            .collect()
    }

    fn store(&self, session: &mut dyn SessionStore, attempts: &[i64]) {
        let value = Value::from(attempts.to_vec());
        if let Err(err) = session.set(SAVE_ATTEMPTS_KEY, value) {
            warn!(
                "event=throttle_store module=throttle status=error error_code=session_write_failed error={}",
                err
            );
        }
    }
}

fn load_attempts(session: &dyn SessionStore) -> Vec<i64> {
    let value = match session.get_or(SAVE_ATTEMPTS_KEY, Value::Array(Vec::new())) {
        Ok(value) => value,
        Err(err) => {
            warn!(
                "event=throttle_load module=throttle status=error error_code=session_read_failed error={}",
                err
            );
            return Vec::new();
        }
    };

    match value {
        Value::Array(items) => items.iter().filter_map(Value::as_i64).collect(),
        other => {
            warn!(
                "event=throttle_load module=throttle status=error error_code=session_value_malformed kind={}",
                json_kind(&other)
            );
            Vec::new()
        }
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
