//! Core logic for the administrator notes panel.
//! This crate is the single source of truth for access, storage and
//! throttling invariants.

pub mod access;
pub mod cache;
pub mod config;
pub mod context;
pub mod db;
pub mod install;
pub mod logging;
pub mod model;
pub mod notice;
pub mod panel;
pub mod repo;
pub mod sanitize;
pub mod service;
pub mod session;
pub mod throttle;

pub use access::policy::{
    can_edit, can_edit_with_raw_params, evaluate, AccessConfig, AccessDecision,
};
pub use cache::{CacheError, CacheKey, MemoryRenderCache, NoopCache, RenderCache};
pub use config::{ConfigError, CoreConfig};
pub use context::RequestContext;
pub use install::{
    enable_module, preflight, uninstall, InstallError, InstallKind, ProvisionOutcome,
};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::actor::{Actor, SUPER_USER_GROUP};
pub use model::id_set::{IdSet, IdSetError};
pub use model::module::{
    IntoModuleId, ModuleId, ModuleIdError, NoteModule, PublishSettings,
};
pub use model::params::{ModuleParams, ParamsError};
pub use notice::{Notice, NoticeLevel, Notices};
pub use repo::module_repo::{ModuleRepository, RepoError, RepoResult, SqliteModuleRepository};
pub use sanitize::HtmlFilter;
pub use service::notes_service::NotesService;
pub use session::{MemorySession, SessionError, SessionId, SessionStore, SqliteSessionStore};
pub use throttle::{Clock, SaveThrottle, SystemClock, ThrottleConfig, ThrottleDecision};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
