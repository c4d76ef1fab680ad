//! Lifecycle hooks: preflight checks, provisioning and removal.
//!
//! # Invariants
//! - Provisioning never creates a second published dashboard instance.
//! - A provisioned instance is visible on all pages (menu id `0`).

use crate::model::module::{
    ModuleId, PublishSettings, ALL_PAGES_MENU_ID, CPANEL_POSITION, MODULE_NAME,
};
use crate::repo::module_repo::{ModuleRepository, RepoError};
use log::{error, info, warn};
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Lowest host platform version the panel supports.
pub const MINIMUM_HOST_VERSION: &str = "4.0";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InstallKind {
    Install,
    Update,
    DiscoverInstall,
    Uninstall,
}

impl InstallKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Install => "install",
            Self::Update => "update",
            Self::DiscoverInstall => "discover_install",
            Self::Uninstall => "uninstall",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    AlreadyPublished(ModuleId),
    Published(ModuleId),
}

impl ProvisionOutcome {
    pub fn module_id(self) -> ModuleId {
        match self {
            Self::AlreadyPublished(id) | Self::Published(id) => id,
        }
    }
}

#[derive(Debug)]
pub enum InstallError {
    HostVersionTooOld { found: String, minimum: &'static str },
    InvalidHostVersion(String),
    Repo(RepoError),
}

impl Display for InstallError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::HostVersionTooOld { found, minimum } => write!(
                f,
                "host version {found} is older than the minimum supported {minimum}"
            ),
            Self::InvalidHostVersion(value) => write!(f, "unparsable host version `{value}`"),
            Self::Repo(err) => write!(f, "{err}"),
        }
    }
}

impl Error for InstallError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Repo(err) => Some(err),
            _ => None,
        }
    }
}

impl From<RepoError> for InstallError {
    fn from(value: RepoError) -> Self {
        Self::Repo(value)
    }
}

/// Rejects hosts older than `MINIMUM_HOST_VERSION`. Uninstall always passes.
pub fn preflight(kind: InstallKind, host_version: &str) -> Result<(), InstallError> {
    if kind == InstallKind::Uninstall {
        return Ok(());
    }

    let found = parse_version(host_version)
        .ok_or_else(|| InstallError::InvalidHostVersion(host_version.to_string()))?;
    let minimum = parse_version(MINIMUM_HOST_VERSION)
        .ok_or_else(|| InstallError::InvalidHostVersion(MINIMUM_HOST_VERSION.to_string()))?;

    if compare_versions(&found, &minimum).is_lt() {
        warn!(
            "event=install_preflight module=install status=denied kind={} host_version={}",
            kind.as_str(),
            host_version
        );
        return Err(InstallError::HostVersionTooOld {
            found: host_version.trim().to_string(),
            minimum: MINIMUM_HOST_VERSION,
        });
    }
    Ok(())
}

/// Publishes the panel on the dashboard unless an instance already is.
pub fn enable_module<R: ModuleRepository>(repo: &R) -> Result<ProvisionOutcome, InstallError> {
    if let Some(id) = repo.find_published(MODULE_NAME, CPANEL_POSITION)? {
        info!(
            "event=install_enable module=install status=ok module_id={} action=already_published",
            id
        );
        return Ok(ProvisionOutcome::AlreadyPublished(id));
    }

    let result = publish_first_instance(repo);
    match &result {
        Ok(id) => info!(
            "event=install_enable module=install status=ok module_id={} action=published",
            id
        ),
        Err(err) => error!(
            "event=install_enable module=install status=error error_code=publish_failed error={}",
            err
        ),
    }
    Ok(ProvisionOutcome::Published(result?))
}

/// Removes every panel instance. Returns how many were removed.
pub fn uninstall<R: ModuleRepository>(repo: &R) -> Result<usize, InstallError> {
    let ids = repo.list_instances(MODULE_NAME)?;
    for id in &ids {
        repo.delete_module(*id)?;
    }
    info!(
        "event=install_remove module=install status=ok removed={}",
        ids.len()
    );
    Ok(ids.len())
}

fn publish_first_instance<R: ModuleRepository>(repo: &R) -> Result<ModuleId, InstallError> {
    let id = match repo.first_instance(MODULE_NAME)? {
        Some(id) => id,
        None => repo.create_module(MODULE_NAME)?,
    };
    repo.publish_module(id, &PublishSettings::dashboard())?;
    repo.assign_menu(id, ALL_PAGES_MENU_ID)?;
    Ok(id)
}

fn parse_version(value: &str) -> Option<Vec<u64>> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return None;
    }
    // Pre-release suffixes (`5.1.0-beta2`) compare by their numeric part.
    let numeric = trimmed.split(['-', '+']).next().unwrap_or(trimmed);
    numeric
        .split('.')
        .map(|part| part.parse::<u64>().ok())
        .collect()
}

fn compare_versions(left: &[u64], right: &[u64]) -> std::cmp::Ordering {
    let len = left.len().max(right.len());
    for idx in 0..len {
        let l = left.get(idx).copied().unwrap_or(0);
        let r = right.get(idx).copied().unwrap_or(0);
        match l.cmp(&r) {
            std::cmp::Ordering::Equal => continue,
            other => return other,
        }
    }
    std::cmp::Ordering::Equal
}
