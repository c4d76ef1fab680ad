//! Rendered-content cache keyed per panel instance.
//!
//! Invalidation is best-effort: callers log and ignore `CacheError`.

use crate::model::module::ModuleId;
use std::collections::HashMap;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Cache namespace owning module renderings.
pub const MODULE_CACHE_NAMESPACE: &str = "com_modules";
/// Cache entry kind for module renderings.
pub const MODULE_CACHE_KIND: &str = "module";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CacheKey {
    pub namespace: &'static str,
    pub kind: &'static str,
    pub id: ModuleId,
}

impl CacheKey {
    /// Key of one module's rendered content.
    pub fn module(id: ModuleId) -> Self {
        Self {
            namespace: MODULE_CACHE_NAMESPACE,
            kind: MODULE_CACHE_KIND,
            id,
        }
    }
}

impl Display for CacheKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}/{}", self.namespace, self.kind, self.id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheError {
    Unavailable(String),
}

impl Display for CacheError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable(details) => write!(f, "cache unavailable: {details}"),
        }
    }
}

impl Error for CacheError {}

pub trait RenderCache {
    fn get(&self, key: &CacheKey) -> Option<String>;
    fn store(&mut self, key: CacheKey, html: String) -> Result<(), CacheError>;
    fn clean(&mut self, key: &CacheKey) -> Result<(), CacheError>;
}

/// In-process cache.
#[derive(Debug, Clone, Default)]
pub struct MemoryRenderCache {
    entries: HashMap<CacheKey, String>,
}

impl MemoryRenderCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RenderCache for MemoryRenderCache {
    fn get(&self, key: &CacheKey) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn store(&mut self, key: CacheKey, html: String) -> Result<(), CacheError> {
        self.entries.insert(key, html);
        Ok(())
    }

    fn clean(&mut self, key: &CacheKey) -> Result<(), CacheError> {
        self.entries.remove(key);
        Ok(())
    }
}

/// Cache that never holds anything.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopCache;

impl RenderCache for NoopCache {
    fn get(&self, _key: &CacheKey) -> Option<String> {
        None
    }

    fn store(&mut self, _key: CacheKey, _html: String) -> Result<(), CacheError> {
        Ok(())
    }

    fn clean(&mut self, _key: &CacheKey) -> Result<(), CacheError> {
        Ok(())
    }
}
