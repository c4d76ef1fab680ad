//! Per-instance configuration blob.
//!
//! # Invariants
//! - Absent keys take the host's absent-value defaults (`ModuleParams::default`).
//! - Provisioning writes `ModuleParams::provisioning_defaults`.
//! - Flags are stored as `"1"`/`"0"` to match the host's format.

use super::id_set::IdSet;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

pub const DEFAULT_EDITOR: &str = "tinymce";

/// Typed configuration for one notes panel instance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModuleParams {
    /// Groups allowed to edit. Empty together with `edit_users` means
    /// unrestricted.
    pub edit_user_groups: IdSet,
    /// Users allowed to edit.
    pub edit_users: IdSet,
    /// Rich-text editor plugin name.
    pub editor: String,
    /// Open straight into the editor instead of the read view.
    #[serde(rename = "forceEditor", with = "flag")]
    pub force_editor: bool,
    /// Show the print action.
    #[serde(with = "flag")]
    pub print: bool,
    /// Show the plain-text download action.
    #[serde(with = "flag")]
    pub download: bool,
    pub header_icon: String,
    pub module_tag: String,
    pub bootstrap_size: String,
    pub header_tag: String,
    pub header_class: String,
    pub style: String,
}

impl Default for ModuleParams {
    fn default() -> Self {
        Self {
            edit_user_groups: IdSet::new(),
            edit_users: IdSet::new(),
            editor: DEFAULT_EDITOR.to_string(),
            force_editor: false,
            print: false,
            download: false,
            header_icon: String::new(),
            module_tag: "div".to_string(),
            bootstrap_size: "0".to_string(),
            header_tag: "h3".to_string(),
            header_class: String::new(),
            style: "0".to_string(),
        }
    }
}

impl ModuleParams {
    /// Settings written when the panel is first published.
    pub fn provisioning_defaults() -> Self {
        Self {
            force_editor: true,
            print: true,
            download: true,
            header_icon: "fa-regular fa-note-sticky".to_string(),
            header_tag: "h2".to_string(),
            ..Self::default()
        }
    }

    /// Parses a stored JSON blob. Blank input yields the defaults.
    pub fn parse(raw: &str) -> Result<Self, ParamsError> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(raw).map_err(ParamsError::Malformed)
    }

    pub fn to_json(&self) -> Result<String, ParamsError> {
        serde_json::to_string(self).map_err(ParamsError::Malformed)
    }
}

/// Configuration blob could not be parsed or encoded.
#[derive(Debug)]
pub enum ParamsError {
    Malformed(serde_json::Error),
}

impl Display for ParamsError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(err) => write!(f, "malformed module configuration: {err}"),
        }
    }
}

impl Error for ParamsError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Malformed(err) => Some(err),
        }
    }
}

mod flag {
    use serde::de::Error as _;
    use serde::{Deserialize, Deserializer, Serializer};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawFlag {
        Bool(bool),
        Number(i64),
        Text(String),
        Missing(Option<()>),
    }

    pub fn serialize<S: Serializer>(value: &bool, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(if *value { "1" } else { "0" })
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<bool, D::Error> {
        match RawFlag::deserialize(deserializer)? {
            RawFlag::Bool(value) => Ok(value),
            RawFlag::Number(value) => Ok(value != 0),
            RawFlag::Text(value) => match value.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => Ok(true),
                "0" | "false" | "no" | "off" | "" => Ok(false),
                other => Err(D::Error::custom(format!("invalid flag value `{other}`"))),
            },
            RawFlag::Missing(_) => Ok(false),
        }
    }
}
