//! Normalized integer allow-list.
//!
//! Host configuration stores allow-lists either as a comma-separated string
//! (`"42, 43,"`) or as a JSON array of numbers or numeric strings. Both
//! shapes collapse into one `IdSet` here so call sites never sniff types.

use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::BTreeSet;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Ordered, deduplicated set of integer ids.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct IdSet(BTreeSet<i64>);

impl IdSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a comma-separated list: split, trim, drop empties, parse.
    pub fn parse_list(value: &str) -> Result<Self, IdSetError> {
        let mut ids = BTreeSet::new();
        for token in value.split(',') {
            if let Some(id) = parse_token(token)? {
                ids.insert(id);
            }
        }
        Ok(Self(ids))
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn contains(&self, id: i64) -> bool {
        self.0.contains(&id)
    }

    pub fn insert(&mut self, id: i64) -> bool {
        self.0.insert(id)
    }

    /// First id shared with `other`, in ascending order.
    pub fn first_shared(&self, other: &BTreeSet<i64>) -> Option<i64> {
        self.0.iter().copied().find(|id| other.contains(id))
    }

    pub fn iter(&self) -> impl Iterator<Item = i64> + '_ {
        self.0.iter().copied()
    }

    /// Host storage form: `"1,2,3"`.
    pub fn to_list_string(&self) -> String {
        self.0
            .iter()
            .map(i64::to_string)
            .collect::<Vec<_>>()
            .join(",")
    }
}

impl FromStr for IdSet {
    type Err = IdSetError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse_list(s)
    }
}

impl FromIterator<i64> for IdSet {
    fn from_iter<T: IntoIterator<Item = i64>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Malformed allow-list entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IdSetError {
    NotAnInteger(String),
}

impl Display for IdSetError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NotAnInteger(token) => write!(f, "allow-list entry is not an integer: `{token}`"),
        }
    }
}

impl Error for IdSetError {}

fn parse_token(token: &str) -> Result<Option<i64>, IdSetError> {
    let trimmed = token.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<i64>()
        .map(Some)
        .map_err(|_| IdSetError::NotAnInteger(trimmed.to_string()))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawId {
    Number(i64),
    Text(String),
}

#[derive(Deserialize)]
#[serde(untagged)]
enum RawIdList {
    Text(String),
    Many(Vec<RawId>),
    One(i64),
    Missing(Option<()>),
}

impl<'de> Deserialize<'de> for IdSet {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = RawIdList::deserialize(deserializer)?;
        let normalized = match raw {
            RawIdList::Text(value) => Self::parse_list(&value),
            RawIdList::Many(values) => {
                let mut ids = BTreeSet::new();
                for value in values {
                    match value {
                        RawId::Number(id) => {
                            ids.insert(id);
                        }
                        RawId::Text(text) => {
                            if let Some(id) = parse_token(&text).map_err(D::Error::custom)? {
                                ids.insert(id);
                            }
                        }
                    }
                }
                Ok(Self(ids))
            }
            RawIdList::One(id) => Ok(Self(BTreeSet::from([id]))),
            RawIdList::Missing(_) => Ok(Self::new()),
        };
        normalized.map_err(D::Error::custom)
    }
}

impl Serialize for IdSet {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_list_string())
    }
}
