//! User-visible message queue for one request.
//!
//! Service entry points never return faults to the panel; they push a notice
//! here and hand back a plain `bool`/`Option` instead.

/// Severity of a queued notice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Message,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

/// Fixed notice texts.
pub mod text {
    pub const SAVED: &str = "Notes saved.";
    pub const FAILED: &str = "Saving notes failed";
    pub const INVALID_MODULE_ID: &str = "Invalid notes module id.";
    pub const RATE_LIMIT_EXCEEDED: &str =
        "Too many save attempts. Please wait a moment before saving again.";
    pub const INVALID_TOKEN: &str = "Invalid form token. Please reload the page and try again.";
    pub const MODULE_NOT_FOUND: &str = "Notes module not found.";
    pub const NOT_PERMITTED: &str = "You are not allowed to edit these notes.";
    pub const INVALID_CONFIGURATION: &str = "Notes module configuration is invalid";
}

/// Ordered list of notices queued during a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Notices {
    items: Vec<Notice>,
}

impl Notices {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn message(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Message, text);
    }

    pub fn error(&mut self, text: impl Into<String>) {
        self.push(NoticeLevel::Error, text);
    }

    /// Queues `"<prefix>: <detail>"` as an error.
    pub fn error_with_detail(&mut self, prefix: &str, detail: impl std::fmt::Display) {
        self.error(format!("{prefix}: {detail}"));
    }

    pub fn push(&mut self, level: NoticeLevel, text: impl Into<String>) {
        self.items.push(Notice {
            level,
            text: text.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Notice> {
        self.items.iter()
    }

    pub fn has_errors(&self) -> bool {
        self.items
            .iter()
            .any(|notice| notice.level == NoticeLevel::Error)
    }

    /// True when any notice text starts with `text`.
    pub fn contains(&self, text: &str) -> bool {
        self.items.iter().any(|notice| notice.text.starts_with(text))
    }

    /// Removes and returns all queued notices.
    pub fn take(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.items)
    }
}
