//! Presentation layer for the notes panel.
//!
//! # Responsibility
//! - Decide between the edit form and the read view for one request.
//! - Handle the save form post and its redirect.
//! - Produce the print document and the plain-text download.

pub mod dispatch;
pub mod urls;
pub mod view;

pub use dispatch::{dispatch, PanelRequest, PanelResponse, RequestMethod};
pub use urls::PanelUrls;
pub use view::{download_text, print_document, render_html, PanelMode, PanelView};
