//! Acting user for one request.

use std::collections::BTreeSet;

/// Group id of the platform's highest privilege tier.
pub const SUPER_USER_GROUP: i64 = 8;

/// User performing the current request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Actor {
    /// User id. `0` for an anonymous guest.
    pub id: i64,
    /// Group memberships.
    pub groups: BTreeSet<i64>,
}

impl Actor {
    pub fn new(id: i64, groups: impl IntoIterator<Item = i64>) -> Self {
        Self {
            id,
            groups: groups.into_iter().collect(),
        }
    }

    /// Anonymous actor without any group membership.
    pub fn guest() -> Self {
        Self::default()
    }

    pub fn is_super_user(&self) -> bool {
        self.groups.contains(&SUPER_USER_GROUP)
    }
}
