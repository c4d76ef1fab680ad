//! Note record stored per widget placement.
//!
//! # Invariants
//! - `ModuleId` is always a positive integer.
//! - At most one record exists per `ModuleId`.

use super::params::{ModuleParams, ParamsError};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Extension type name stored in `modules.module`.
pub const MODULE_NAME: &str = "mod_adminnotes";
/// Administrator dashboard position the panel is published at.
pub const CPANEL_POSITION: &str = "cpanel";
/// Menu assignment sentinel meaning "all pages".
pub const ALL_PAGES_MENU_ID: i64 = 0;

/// Identifier of one notes panel instance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "i64")]
pub struct ModuleId(i64);

impl ModuleId {
    /// Validates that `value` is a positive integer.
    pub fn new(value: i64) -> Result<Self, ModuleIdError> {
        if value <= 0 {
            return Err(ModuleIdError::NotPositive(value));
        }
        Ok(Self(value))
    }

    /// Parses user input such as a CLI argument or form field.
    pub fn parse(value: &str) -> Result<Self, ModuleIdError> {
        let trimmed = value.trim();
        let parsed = trimmed
            .parse::<i64>()
            .map_err(|_| ModuleIdError::NotAnInteger(trimmed.to_string()))?;
        Self::new(parsed)
    }

    pub fn get(self) -> i64 {
        self.0
    }
}

impl Display for ModuleId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl TryFrom<i64> for ModuleId {
    type Error = ModuleIdError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModuleId> for i64 {
    fn from(value: ModuleId) -> Self {
        value.0
    }
}

/// Rejected instance identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModuleIdError {
    NotPositive(i64),
    NotAnInteger(String),
}

impl Display for ModuleIdError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotPositive(value) => write!(f, "module id must be positive, got {value}"),
            Self::NotAnInteger(value) => write!(f, "module id must be an integer, got `{value}`"),
        }
    }
}

impl Error for ModuleIdError {}

/// Raw identifier input accepted by service entry points.
pub trait IntoModuleId {
    fn into_module_id(self) -> Result<ModuleId, ModuleIdError>;
}

impl IntoModuleId for ModuleId {
    fn into_module_id(self) -> Result<ModuleId, ModuleIdError> {
        Ok(self)
    }
}

impl IntoModuleId for i64 {
    fn into_module_id(self) -> Result<ModuleId, ModuleIdError> {
        ModuleId::new(self)
    }
}

impl IntoModuleId for &str {
    fn into_module_id(self) -> Result<ModuleId, ModuleIdError> {
        ModuleId::parse(self)
    }
}

impl IntoModuleId for &String {
    fn into_module_id(self) -> Result<ModuleId, ModuleIdError> {
        ModuleId::parse(self)
    }
}

/// Full note record as persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NoteModule {
    pub id: ModuleId,
    /// Extension type name, `mod_adminnotes` for this panel.
    pub module: String,
    pub title: String,
    pub published: bool,
    pub position: String,
    /// Host access level required to see the panel.
    pub access: i64,
    /// HTML note content; `None` until first saved.
    pub content: Option<String>,
    /// Configuration blob as stored. The host may hold values the typed
    /// form rejects, so parsing happens at the point of use.
    pub raw_params: String,
}

impl NoteModule {
    pub fn params(&self) -> Result<ModuleParams, ParamsError> {
        ModuleParams::parse(&self.raw_params)
    }
}

/// Settings applied when publishing an instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishSettings {
    pub title: String,
    pub position: String,
    pub access: i64,
    pub params: ModuleParams,
}

impl PublishSettings {
    /// Dashboard defaults used by provisioning.
    pub fn dashboard() -> Self {
        Self {
            title: "Notes".to_string(),
            position: CPANEL_POSITION.to_string(),
            access: 3,
            params: ModuleParams::provisioning_defaults(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{IntoModuleId, ModuleId, ModuleIdError};

    #[test]
    fn accepts_only_positive_ids() {
        assert_eq!(ModuleId::new(17).expect("positive").get(), 17);
        assert_eq!(ModuleId::new(0), Err(ModuleIdError::NotPositive(0)));
        assert_eq!(ModuleId::new(-3), Err(ModuleIdError::NotPositive(-3)));
    }

    #[test]
    fn parses_string_input() {
        assert_eq!(" 5 ".into_module_id().expect("trimmed").get(), 5);
        assert_eq!(
            "5.5".into_module_id(),
            Err(ModuleIdError::NotAnInteger("5.5".to_string()))
        );
        assert_eq!("-1".into_module_id(), Err(ModuleIdError::NotPositive(-1)));
    }

    #[test]
    fn serde_rejects_non_positive_ids() {
        let id: ModuleId = serde_json::from_str("12").expect("valid id");
        assert_eq!(id.get(), 12);
        assert!(serde_json::from_str::<ModuleId>("0").is_err());
    }
}
