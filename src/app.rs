//! Application state and core logic

use crate::api::{ApiClient, ApiClientTrait};
use crate::config::TuiConfig;
use crate::platform::SHORTCUT_MODIFIER;
use crate::session::{Clock, SessionGuard, SessionOutcome, SessionValidator, SystemClock};
use crate::state::{AppState, FocusTarget, Form, FormAction, FormError, FormSession, View};
use anyhow::Result;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::sync::Arc;

/// Main application struct
pub struct App {
    /// Current application state
    pub state: AppState,
    api: Box<dyn ApiClientTrait>,
    validator: Box<dyn SessionValidator>,
    session: SessionGuard,
    clock: Arc<dyn Clock>,
    expanded_depth: usize,
    /// Whether the app should quit
    quit: bool,
    /// Feedback shown in the status bar until the next key press
    pub status_message: Option<String>,
}

impl App {
    /// Create a new App instance talking to the configured API
    pub async fn new(config: &TuiConfig) -> Result<Self> {
        let client = ApiClient::new(config)?;
        tracing::info!(address = client.base_url(), "using inspection API");

        let mut app = Self::with_services(
            Box::new(client.clone()),
            Box::new(client),
            Arc::new(SystemClock),
            config,
        );
        app.check_session().await;
        if app.state.current_view != View::Landing {
            app.load_templates().await;
        }
        Ok(app)
    }

    pub fn with_services(
        api: Box<dyn ApiClientTrait>,
        validator: Box<dyn SessionValidator>,
        clock: Arc<dyn Clock>,
        config: &TuiConfig,
    ) -> Self {
        Self {
            state: AppState::default(),
            api,
            validator,
            session: SessionGuard::new(config.session_check_interval(), clock.clone()),
            clock,
            expanded_depth: config.expanded_depth(),
            quit: false,
            status_message: None,
        }
    }

    /// Check if app should quit
    pub fn should_quit(&self) -> bool {
        self.quit
    }

    /// Push an error message to the error queue for display
    pub fn push_error(&mut self, message: impl Into<String>) {
        self.state.push_error(message.into());
    }

    /// Run a session check if one is due; an invalid session leaves the
    /// protected views
    pub async fn check_session(&mut self) {
        match self.session.check(self.validator.as_ref()).await {
            SessionOutcome::Invalid => {
                tracing::info!("session no longer valid");
                self.state.clear_form();
                self.state.current_view = View::Landing;
            }
            SessionOutcome::Valid | SessionOutcome::Unreachable | SessionOutcome::Skipped => {}
        }
    }

    /// Navigate to a new view
    pub async fn navigate(&mut self, view: View) {
        self.state.current_view = view;
        if view.is_protected() {
            self.check_session().await;
        }
    }

    /// Fetch the template catalog; failures are shown once, not retried
    pub async fn load_templates(&mut self) {
        self.state.templates_loading = true;
        match self.api.list_templates().await {
            Ok(templates) => {
                tracing::info!(count = templates.len(), "template catalog loaded");
                self.state.set_templates(templates);
            }
            Err(e) => {
                tracing::error!("Failed to load templates: {:#}", e);
                self.state.templates_loading = false;
                self.state.templates_error = Some(e.to_string());
                self.push_error(format!("Failed to load templates: {}", e));
            }
        }
    }

    /// Start a form session for the selected template
    pub async fn open_selected_template(&mut self) {
        let Some(template) = self.state.selected_template().cloned() else {
            return;
        };

        let name = template.name.clone();
        match FormSession::with_expanded_depth(template, self.expanded_depth) {
            Ok(mut form) => {
                tracing::info!(template = %name, questions = form.answers().len(), "form opened");
                self.resume_draft(&mut form).await;
                self.state.form = Some(form);
                self.navigate(View::FormFill).await;
                self.load_suggestions().await;
            }
            Err(e) => {
                tracing::error!(template = %name, "Failed to open template: {}", e);
                self.push_error(format!("Cannot open \"{}\": {}", name, e));
            }
        }
    }

    /// Load the newest stored draft of the template into a fresh form.
    /// A failed lookup only means starting from an empty form.
    async fn resume_draft(&mut self, form: &mut FormSession) {
        match self.api.latest_draft(&form.template().id).await {
            Ok(Some(draft)) => {
                let restored = form.restore(&draft);
                tracing::info!(template_id = %draft.template_id, restored, "draft resumed");
                self.status_message = Some(format!("Resumed saved draft: {restored} answer(s)"));
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!("Failed to load saved draft: {:#}", e);
            }
        }
    }

    /// Fill autocomplete fields from their data sources; a failing source
    /// leaves the field without suggestions
    async fn load_suggestions(&mut self) {
        let sources = match &self.state.form {
            Some(form) => form.data_sources(),
            None => return,
        };

        for (index, source) in sources {
            match self.api.fetch_data_source(source).await {
                Ok(values) => {
                    if let Some(form) = self.state.form.as_mut() {
                        form.set_suggestions(index, values);
                    }
                }
                Err(e) => {
                    tracing::warn!(source = source.as_str(), "Failed to load suggestions: {:#}", e);
                }
            }
        }
    }

    /// Send the current values as a draft, without validation
    pub async fn save_draft(&mut self) {
        let Some(form) = self.state.form.as_ref() else {
            return;
        };
        let document = form.save_draft(self.clock.now());

        match self.api.save_draft(&document).await {
            Ok(()) => {
                self.status_message = Some("Draft saved".to_string());
            }
            Err(e) => {
                tracing::error!("Failed to save draft: {:#}", e);
                self.push_error(format!("Failed to save draft: {}", e));
            }
        }
    }

    /// Validate and send the completed response
    pub async fn submit(&mut self) {
        let now = self.clock.now();
        let Some(form) = self.state.form.as_mut() else {
            return;
        };

        let document = match form.submit(now) {
            Ok(document) => document,
            Err(FormError::Invalid(failures)) => {
                self.status_message = Some(format!(
                    "{} field(s) need attention",
                    failures.len()
                ));
                return;
            }
            Err(e) => {
                self.push_error(e.to_string());
                return;
            }
        };

        match self.api.submit_response(&document).await {
            Ok(()) => {
                self.state.clear_form();
                self.status_message = Some("Inspection submitted".to_string());
                self.navigate(View::Templates).await;
            }
            Err(e) => {
                tracing::error!("Failed to submit response: {:#}", e);
                self.push_error(format!("Failed to submit: {}", e));
            }
        }
    }

    /// Handle a key event
    pub async fn handle_key(&mut self, key: KeyEvent) -> Result<()> {
        // Handle error dialog dismissal first (modal)
        if self.state.has_errors() {
            if matches!(key.code, KeyCode::Enter | KeyCode::Esc) {
                self.state.dismiss_error();
            }
            return Ok(());
        }

        // Clear any status messages on key press
        self.status_message = None;

        match self.state.current_view {
            View::Templates => self.handle_templates_key(key).await,
            View::FormFill => self.handle_form_key(key).await,
            View::Landing => self.handle_landing_key(key).await,
        }

        Ok(())
    }

    async fn handle_templates_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Char('j') | KeyCode::Down => self.state.move_selection_down(),
            KeyCode::Char('k') | KeyCode::Up => self.state.move_selection_up(),
            KeyCode::Char('r') => self.load_templates().await,
            KeyCode::Enter => self.open_selected_template().await,
            _ => {}
        }
    }

    async fn handle_form_key(&mut self, key: KeyEvent) {
        if key.modifiers.contains(SHORTCUT_MODIFIER) {
            match key.code {
                KeyCode::Char('s') => self.submit().await,
                KeyCode::Char('d') => self.save_draft().await,
                _ => {}
            }
            return;
        }

        if key.code == KeyCode::Esc {
            self.state.clear_form();
            self.navigate(View::Templates).await;
            return;
        }

        let mut action = None;
        if let Some(form) = self.state.form.as_mut() {
            action = handle_form_input(form, key);
        }

        match action {
            Some(FormAction::SaveDraft) => self.save_draft().await,
            Some(FormAction::Submit) => self.submit().await,
            None => {}
        }
    }

    async fn handle_landing_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Char('q') => self.quit = true,
            KeyCode::Enter => {
                self.session.reset();
                if self.session.check(self.validator.as_ref()).await != SessionOutcome::Invalid {
                    self.state.current_view = View::Templates;
                    if self.state.templates.is_empty() {
                        self.load_templates().await;
                    }
                }
            }
            _ => {}
        }
    }
}

/// Apply an editing key to the form; returns a button press, if any
fn handle_form_input(form: &mut FormSession, key: KeyEvent) -> Option<FormAction> {
    let focus = form.focus().clone();
    let toggles = form.focused_field().map(|f| f.is_toggle()).unwrap_or(false);

    match key.code {
        KeyCode::Tab | KeyCode::Down => form.next_field(),
        KeyCode::BackTab | KeyCode::Up => form.prev_field(),
        KeyCode::Enter => match focus {
            FocusTarget::Section(id) => form.toggle_section(id),
            FocusTarget::Action(action) => return Some(action),
            _ => {
                if !form.newline() {
                    form.next_field();
                }
            }
        },
        KeyCode::Char(' ') if toggles => form.toggle(true),
        KeyCode::Char(' ') => match focus {
            FocusTarget::Section(id) => form.toggle_section(id),
            FocusTarget::Action(action) => return Some(action),
            _ => form.input_char(' '),
        },
        KeyCode::Right if toggles || matches!(focus, FocusTarget::Verification(_)) => {
            form.toggle(true)
        }
        KeyCode::Left if toggles || matches!(focus, FocusTarget::Verification(_)) => {
            form.toggle(false)
        }
        KeyCode::Backspace => form.backspace(),
        KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::ALT) => form.input_char(c),
        _ => {}
    }
    None
}
