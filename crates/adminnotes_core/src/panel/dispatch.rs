//! Request handling for one panel render.
//!
//! # Invariants
//! - Only actors passing the access check can trigger a save; other posts
//!   are ignored without a notice.
//! - A save needs a valid form token.
//! - A successful save answers with a redirect back to read mode.
//! - A stored configuration that does not parse still renders: the access
//!   check queues a notice and display settings fall back to defaults.

use super::urls::PanelUrls;
use super::view::{render_html, PanelMode, PanelView};
use crate::cache::RenderCache;
use crate::context::RequestContext;
use crate::model::module::IntoModuleId;
use crate::notice::text;
use crate::repo::module_repo::ModuleRepository;
use crate::service::notes_service::NotesService;
use log::{debug, error};

const SAVE_TASK: &str = "save";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestMethod {
    Get,
    Post,
}

/// Host request data relevant to the panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PanelRequest<'r> {
    pub method: RequestMethod,
    pub current_url: &'r str,
    /// Submitted `task` field.
    pub task: Option<&'r str>,
    /// Submitted `data` field, taken raw.
    pub data: Option<&'r str>,
    /// Name of the host's anti-forgery field for rendered forms.
    pub form_token: &'r str,
    /// Whether the host validated the submitted anti-forgery field.
    pub token_valid: bool,
}

impl<'r> PanelRequest<'r> {
    pub fn get(current_url: &'r str, form_token: &'r str) -> Self {
        Self {
            method: RequestMethod::Get,
            current_url,
            task: None,
            data: None,
            form_token,
            token_valid: false,
        }
    }

    pub fn save(
        current_url: &'r str,
        form_token: &'r str,
        data: &'r str,
        token_valid: bool,
    ) -> Self {
        Self {
            method: RequestMethod::Post,
            current_url,
            task: Some(SAVE_TASK),
            data: Some(data),
            form_token,
            token_valid,
        }
    }

    fn is_save(&self) -> bool {
        self.method == RequestMethod::Post && self.task == Some(SAVE_TASK)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PanelResponse {
    Redirect(String),
    Render { view: PanelView, html: String },
    /// Nothing to show; the reason is in the request notices.
    Empty,
}

/// Handles one panel request for instance `module_id`.
pub fn dispatch<R: ModuleRepository, C: RenderCache>(
    service: &mut NotesService<R, C>,
    ctx: &mut RequestContext<'_>,
    module_id: impl IntoModuleId,
    request: &PanelRequest<'_>,
) -> PanelResponse {
    let id = match module_id.into_module_id() {
        Ok(id) => id,
        Err(_) => {
            ctx.notices.error(text::INVALID_MODULE_ID);
            return PanelResponse::Empty;
        }
    };

    let module = match service.repo().get_module(id) {
        Ok(Some(module)) => module,
        Ok(None) => {
            ctx.notices.error(text::MODULE_NOT_FOUND);
            return PanelResponse::Empty;
        }
        Err(err) => {
            error!(
                "event=panel_dispatch module=panel status=error module_id={} error_code=module_load_failed error={}",
                id, err
            );
            ctx.notices.error_with_detail(text::FAILED, &err);
            return PanelResponse::Empty;
        }
    };

    let urls = PanelUrls::from_current(request.current_url);
    let content = service.get_data(ctx, id).unwrap_or_default();
    let can_edit = service.can_edit_module(ctx, &module);
    let params = module.params().unwrap_or_default();

    if request.is_save() && can_edit {
        if !request.token_valid {
            ctx.notices.error(text::INVALID_TOKEN);
        } else if service.save_data(ctx, id, request.data.unwrap_or_default()) {
            ctx.notices.message(text::SAVED);
            return PanelResponse::Redirect(urls.save);
        } else {
            ctx.notices.error(text::FAILED);
        }
    }

    let show_editor = params.force_editor || urls.is_edit_request();
    let mode = if can_edit && show_editor {
        PanelMode::Edit
    } else {
        PanelMode::Read
    };
    debug!(
        "event=panel_dispatch module=panel status=ok module_id={} actor_id={} mode={:?}",
        id, ctx.actor.id, mode
    );

    let view = PanelView {
        module_id: id,
        title: module.title,
        mode,
        content: service.rendered_content(id, &content),
        can_edit,
        show_print: params.print,
        show_download: params.download,
        editor: params.editor,
        urls,
        form_token: request.form_token.to_string(),
    };
    let html = render_html(&view);
    PanelResponse::Render { view, html }
}
