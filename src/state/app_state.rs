//! Application state definitions

use super::forms::FormSession;
use super::template::Template;
use std::collections::VecDeque;

/// Current view in the application
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum View {
    /// Catalog of available templates
    #[default]
    Templates,
    /// Filling in the selected template
    FormFill,
    /// Shown once the session is no longer valid
    Landing,
}

impl View {
    pub fn title(&self) -> &'static str {
        match self {
            Self::Templates => "Templates",
            Self::FormFill => "Inspection",
            Self::Landing => "Session expired",
        }
    }

    /// Views that require a valid session to be shown
    pub fn is_protected(&self) -> bool {
        !matches!(self, Self::Landing)
    }
}

/// Main application state
#[derive(Default)]
pub struct AppState {
    pub current_view: View,

    // Catalog
    pub templates: Vec<Template>,
    pub templates_loading: bool,
    pub templates_error: Option<String>,
    pub selected_index: usize,

    // Form being filled in
    pub form: Option<FormSession>,

    /// Errors waiting to be acknowledged, oldest first
    errors: VecDeque<String>,
}

impl AppState {
    pub fn push_error(&mut self, message: String) {
        self.errors.push_back(message);
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    pub fn current_error(&self) -> Option<&str> {
        self.errors.front().map(String::as_str)
    }

    pub fn dismiss_error(&mut self) {
        self.errors.pop_front();
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    pub fn selected_template(&self) -> Option<&Template> {
        self.templates.get(self.selected_index)
    }

    /// Move selection down
    pub fn move_selection_down(&mut self) {
        if self.selected_index + 1 < self.templates.len() {
            self.selected_index += 1;
        }
    }

    /// Move selection up
    pub fn move_selection_up(&mut self) {
        self.selected_index = self.selected_index.saturating_sub(1);
    }

    pub fn set_templates(&mut self, templates: Vec<Template>) {
        self.templates = templates;
        self.templates_error = None;
        self.templates_loading = false;
        if self.selected_index >= self.templates.len() {
            self.selected_index = self.templates.len().saturating_sub(1);
        }
    }

    pub fn clear_form(&mut self) {
        self.form = None;
    }
}
