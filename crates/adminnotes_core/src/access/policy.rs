//! Allow-list evaluation.
//!
//! # Responsibility
//! - Decide whether an actor may edit a panel's content.
//! - Turn configuration faults into a denial plus a user-visible notice.
//!
//! # Invariants
//! - Empty group and user lists mean unrestricted editing.
//! - Membership in `SUPER_USER_GROUP` always allows, even when the stored
//!   configuration cannot be parsed.

use crate::model::actor::Actor;
use crate::model::id_set::{IdSet, IdSetError};
use crate::model::params::ModuleParams;
use crate::notice::{text, Notices};
use log::{debug, warn};

/// Who may edit one panel instance.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccessConfig {
    pub groups: IdSet,
    pub users: IdSet,
}

impl AccessConfig {
    pub fn unrestricted() -> Self {
        Self::default()
    }

    pub fn new(groups: IdSet, users: IdSet) -> Self {
        Self { groups, users }
    }

    /// Builds a config from comma-separated group and user lists.
    pub fn from_lists(groups: &str, users: &str) -> Result<Self, IdSetError> {
        Ok(Self {
            groups: IdSet::parse_list(groups)?,
            users: IdSet::parse_list(users)?,
        })
    }

    pub fn from_params(params: &ModuleParams) -> Self {
        Self {
            groups: params.edit_user_groups.clone(),
            users: params.edit_users.clone(),
        }
    }

    pub fn is_unrestricted(&self) -> bool {
        self.groups.is_empty() && self.users.is_empty()
    }
}

/// Reason an edit was allowed, or the denial.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Unrestricted,
    GroupMember(i64),
    ListedUser,
    SuperUser,
    Denied,
}

impl AccessDecision {
    pub fn is_allowed(self) -> bool {
        self != Self::Denied
    }

    fn as_str(self) -> &'static str {
        match self {
            Self::Unrestricted => "unrestricted",
            Self::GroupMember(_) => "group_member",
            Self::ListedUser => "listed_user",
            Self::SuperUser => "super_user",
            Self::Denied => "denied",
        }
    }
}

/// Evaluates the allow-lists for `actor`.
pub fn evaluate(actor: &Actor, config: &AccessConfig) -> AccessDecision {
    if config.is_unrestricted() {
        return AccessDecision::Unrestricted;
    }
    if let Some(group) = config.groups.first_shared(&actor.groups) {
        return AccessDecision::GroupMember(group);
    }
    if config.users.contains(actor.id) {
        return AccessDecision::ListedUser;
    }
    if actor.is_super_user() {
        return AccessDecision::SuperUser;
    }
    AccessDecision::Denied
}

/// Returns whether `actor` may edit under `config`.
pub fn can_edit(actor: &Actor, config: &AccessConfig) -> bool {
    let decision = evaluate(actor, config);
    debug!(
        "event=access_check module=access status={} actor_id={} reason={}",
        if decision.is_allowed() { "ok" } else { "denied" },
        actor.id,
        decision.as_str()
    );
    decision.is_allowed()
}

/// Evaluates access from a raw stored configuration blob.
///
/// Parse failures queue an error notice and deny everyone but super users;
/// this never fails.
pub fn can_edit_with_raw_params(actor: &Actor, raw_params: &str, notices: &mut Notices) -> bool {
    match ModuleParams::parse(raw_params) {
        Ok(params) => can_edit(actor, &AccessConfig::from_params(&params)),
        Err(err) => {
            let allowed = actor.is_super_user();
            warn!(
                "event=access_check module=access status={} actor_id={} reason={} error_code=params_malformed error={}",
                if allowed { "ok" } else { "denied" },
                actor.id,
                if allowed { "super_user" } else { "denied" },
                err
            );
            notices.error_with_detail(text::INVALID_CONFIGURATION, &err);
            allowed
        }
    }
}
