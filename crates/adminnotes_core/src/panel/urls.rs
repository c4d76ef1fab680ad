//! Edit/save link construction from the current page URL.

const EDIT_PARAM: &str = "edit=1";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelUrls {
    /// Form action: the page being rendered.
    pub current: String,
    /// Link that opens the editor.
    pub edit: String,
    /// Redirect target after a successful save, back in read mode.
    pub save: String,
}

impl PanelUrls {
    pub fn from_current(current: &str) -> Self {
        if current.contains(EDIT_PARAM) {
            let stripped = current.replace("edit=1&", "").replace(EDIT_PARAM, "");
            let save = stripped.trim_end_matches('&').trim_end_matches('?');
            return Self {
                current: current.to_string(),
                edit: current.to_string(),
                save: save.to_string(),
            };
        }

        let separator = if current.contains('?') { '&' } else { '?' };
        Self {
            current: current.to_string(),
            edit: format!("{current}{separator}{EDIT_PARAM}"),
            save: current.to_string(),
        }
    }

    /// Whether the current URL already requests edit mode.
    pub fn is_edit_request(&self) -> bool {
        self.current.contains(EDIT_PARAM)
    }
}
