//! Template catalog view

use super::widgets::render_scrollable_list;
use crate::app::App;
use crate::state::Template;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

fn template_item(template: &Template) -> ListItem<'static> {
    ListItem::new(Line::from(vec![
        Span::styled(
            template.name.clone(),
            Style::default().add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!("  {} · {}", template.code, template.revision),
            Style::default().fg(Color::Gray),
        ),
        Span::styled(
            format!("  [{}]", template.kind.label()),
            Style::default().fg(Color::Magenta),
        ),
    ]))
}

/// Draw the template list
pub fn draw(frame: &mut Frame, area: Rect, app: &App) {
    let state = &app.state;
    let block = Block::default()
        .title(format!(" Templates ({}) ", state.templates.len()))
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::Cyan));

    if state.templates.is_empty() {
        let message = if state.templates_loading {
            Line::from(Span::styled("Loading templates…", Style::default().fg(Color::Gray)))
        } else if let Some(error) = &state.templates_error {
            Line::from(vec![
                Span::styled("Could not load templates: ", Style::default().fg(Color::Red)),
                Span::raw(error.clone()),
                Span::styled("  (r to retry)", Style::default().fg(Color::DarkGray)),
            ])
        } else {
            Line::from(Span::styled(
                "No templates available",
                Style::default().fg(Color::Gray),
            ))
        };
        frame.render_widget(Paragraph::new(message).block(block), area);
        return;
    }

    let items: Vec<ListItem> = state.templates.iter().map(template_item).collect();
    let list = List::new(items)
        .block(block)
        .highlight_style(
            Style::default()
                .bg(Color::DarkGray)
                .add_modifier(Modifier::BOLD),
        )
        .highlight_symbol("▶ ");

    render_scrollable_list(frame, area, list, state.selected_index);
}
