//! Notes content use-cases.
//!
//! # Responsibility
//! - Read note content for display.
//! - Validate, throttle, sanitize, persist and invalidate on save.
//! - Answer edit-permission questions for a panel configuration.
//!
//! # Invariants
//! - Invalid ids are rejected before any side effect, including the
//!   throttle history.
//! - Every save that reaches persistence is recorded in the throttle,
//!   whether it succeeds or not.
//! - Persistence and cache faults never escape this service.

use crate::access::policy::can_edit_with_raw_params;
use crate::cache::{CacheKey, RenderCache};
use crate::context::RequestContext;
use crate::model::module::{IntoModuleId, ModuleId, NoteModule};
use crate::notice::text;
use crate::repo::module_repo::ModuleRepository;
use crate::sanitize::HtmlFilter;
use crate::throttle::{SaveThrottle, ThrottleConfig, ThrottleDecision};
use log::{error, info, warn};
use std::time::Instant;

/// Notes service facade over repository and cache implementations.
pub struct NotesService<R: ModuleRepository, C: RenderCache> {
    repo: R,
    cache: C,
    throttle: SaveThrottle,
    filter: HtmlFilter,
}

impl<R: ModuleRepository, C: RenderCache> NotesService<R, C> {
    /// Creates a service with the default save throttle (10 per 60s).
    pub fn new(repo: R, cache: C) -> Self {
        Self::with_throttle(repo, cache, ThrottleConfig::default())
    }

    pub fn with_throttle(repo: R, cache: C, throttle: ThrottleConfig) -> Self {
        Self {
            repo,
            cache,
            throttle: SaveThrottle::new(throttle),
            filter: HtmlFilter::new(),
        }
    }

    pub fn repo(&self) -> &R {
        &self.repo
    }

    pub fn cache(&self) -> &C {
        &self.cache
    }

    pub fn throttle(&self) -> SaveThrottle {
        self.throttle
    }

    /// Access check against a stored record. A malformed configuration
    /// queues a notice and only lets super users through.
    pub fn can_edit_module(&self, ctx: &mut RequestContext<'_>, module: &NoteModule) -> bool {
        can_edit_with_raw_params(&ctx.actor, &module.raw_params, &mut ctx.notices)
    }

    /// Returns stored content, or `None` for invalid ids, missing records
    /// and read failures (the latter two also queue a notice).
    pub fn get_data(&self, ctx: &mut RequestContext<'_>, id: impl IntoModuleId) -> Option<String> {
        let id = match id.into_module_id() {
            Ok(id) => id,
            Err(err) => {
                warn!(
                    "event=notes_read module=service status=error error_code=invalid_module_id error={}",
                    err
                );
                ctx.notices.error(text::INVALID_MODULE_ID);
                return None;
            }
        };

        match self.repo.get_content(id) {
            Ok(content) => content,
            Err(err) => {
                error!(
                    "event=notes_read module=service status=error module_id={} error_code=read_failed error={}",
                    id, err
                );
                ctx.notices.error_with_detail(text::FAILED, &err);
                None
            }
        }
    }

    /// Saves `data` as the content of `id`. Returns whether it was persisted.
    pub fn save_data(
        &mut self,
        ctx: &mut RequestContext<'_>,
        id: impl IntoModuleId,
        data: &str,
    ) -> bool {
        let started_at = Instant::now();
        let id = match id.into_module_id() {
            Ok(id) => id,
            Err(err) => {
                warn!(
                    "event=notes_save module=service status=error error_code=invalid_module_id error={}",
                    err
                );
                ctx.notices.error(text::INVALID_MODULE_ID);
                return false;
            }
        };

        let now = ctx.now();
        if let ThrottleDecision::Denied { retry_after_secs } =
            self.throttle.check(&mut *ctx.session, now)
        {
            warn!(
                "event=notes_save module=service status=denied module_id={} actor_id={} error_code=rate_limited retry_after_secs={}",
                id, ctx.actor.id, retry_after_secs
            );
            ctx.notices.error(text::RATE_LIMIT_EXCEEDED);
            return false;
        }

        let safe = self.filter.clean(data);
        let saved = match self.repo.set_content(id, &safe) {
            Ok(()) => {
                self.invalidate(id);
                info!(
                    "event=notes_save module=service status=ok module_id={} actor_id={} input_bytes={} stored_bytes={} duration_ms={}",
                    id,
                    ctx.actor.id,
                    data.len(),
                    safe.len(),
                    started_at.elapsed().as_millis()
                );
                true
            }
            Err(err) => {
                error!(
                    "event=notes_save module=service status=error module_id={} actor_id={} error_code=persist_failed duration_ms={} error={}",
                    id,
                    ctx.actor.id,
                    started_at.elapsed().as_millis(),
                    err
                );
                ctx.notices.error_with_detail(text::FAILED, &err);
                false
            }
        };

        let recorded_at = ctx.now();
        self.throttle.record(&mut *ctx.session, recorded_at);
        saved
    }

    /// Prepared content fragment for display, served from the render cache
    /// when present.
    pub fn rendered_content(&mut self, id: ModuleId, content: &str) -> String {
        let key = CacheKey::module(id);
        if let Some(html) = self.cache.get(&key) {
            return html;
        }

        let html = content.to_string();
        if let Err(err) = self.cache.store(key, html.clone()) {
            warn!(
                "event=cache_store module=service status=error module_id={} error={}",
                id, err
            );
        }
        html
    }

    fn invalidate(&mut self, id: ModuleId) {
        let key = CacheKey::module(id);
        if let Err(err) = self.cache.clean(&key) {
            warn!(
                "event=cache_clean module=service status=error key={} error={}",
                key, err
            );
        }
    }
}
