//! UI module for rendering the TUI

mod components;
mod forms;
mod landing;
mod layout;
mod templates;
mod widgets;

use crate::app::App;
use crate::state::View;
use components::render_error_dialog;
use ratatui::Frame;

/// Main draw function
pub fn draw(frame: &mut Frame, app: &App) {
    let (main_area, status_area) = layout::create_layout(frame.area());

    match app.state.current_view {
        View::Templates => templates::draw(frame, main_area, app),
        View::FormFill => forms::draw_inspection_form(frame, main_area, app),
        View::Landing => landing::draw(frame, main_area),
    }

    layout::draw_status_bar(frame, status_area, app);

    // Error dialog is modal and drawn on top
    if let Some(error) = app.state.current_error() {
        render_error_dialog(frame, error, app.state.error_count().saturating_sub(1));
    }
}
