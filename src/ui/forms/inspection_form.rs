//! Inspection form view

use super::field_renderer::{draw_help_text, field_lines};
use crate::app::App;
use crate::platform::{DRAFT_SHORTCUT, SUBMIT_SHORTCUT};
use crate::state::{FieldRef, FocusTarget, FormAction, FormRow, FormSession};
use crate::ui::components::{render_button, BUTTON_HEIGHT};
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Suggestions shown under an active autocomplete field
const MAX_SUGGESTIONS: usize = 5;

/// Form body as lines, plus the line holding the focused element
pub fn form_lines(form: &FormSession) -> (Vec<Line<'static>>, usize) {
    let mut lines = Vec::new();
    let mut focus_line = 0;

    lines.push(Line::from(Span::styled(
        "Verification",
        Style::default().add_modifier(Modifier::BOLD),
    )));

    for (i, entry) in form.verification().iter().enumerate() {
        let target = FocusTarget::Verification(i);
        let active = form.is_focused(&target);
        if active {
            focus_line = lines.len();
        }
        lines.extend(field_lines(
            &entry.field,
            active,
            form.error_for(&FieldRef::Verification(i)),
            2,
        ));

        if active && !entry.suggestions.is_empty() {
            let matches = entry.matching_suggestions();
            let shown: Vec<&str> = matches.iter().take(MAX_SUGGESTIONS).copied().collect();
            let more = matches.len().saturating_sub(shown.len());
            let mut text = format!("    ↔ {}", shown.join(" | "));
            if more > 0 {
                text.push_str(&format!(" (+{more})"));
            }
            lines.push(Line::from(Span::styled(
                text,
                Style::default().fg(Color::DarkGray),
            )));
        }
    }

    if form.verification().is_empty() {
        lines.push(Line::from(Span::styled(
            "  (no verification fields)",
            Style::default().fg(Color::DarkGray),
        )));
    }

    for row in form.rows() {
        match row {
            FormRow::Section { id, node, expanded } => {
                let active = form.is_focused(&FocusTarget::Section(id));
                lines.push(Line::from(""));
                if active {
                    focus_line = lines.len();
                }

                let indent = " ".repeat(node.depth() * 2);
                let marker = if expanded { "▾" } else { "▸" };
                let style = if active {
                    Style::default()
                        .fg(Color::Cyan)
                        .add_modifier(Modifier::BOLD | Modifier::REVERSED)
                } else {
                    Style::default()
                        .fg(Color::Yellow)
                        .add_modifier(Modifier::BOLD)
                };
                lines.push(Line::from(vec![
                    Span::raw(indent.clone()),
                    Span::styled(format!("{marker} {}", node.title), style),
                ]));

                if !expanded {
                    continue;
                }
                if let Some(description) = &node.description {
                    lines.push(Line::from(Span::styled(
                        format!("{indent}  {description}"),
                        Style::default().fg(Color::Gray),
                    )));
                }
                for image in &node.images {
                    lines.push(Line::from(Span::styled(
                        format!("{indent}  [image] {} <{}>", image.caption, image.url),
                        Style::default().fg(Color::DarkGray),
                    )));
                }
            }
            FormRow::Question { path, entry, depth } => {
                let indent = (depth + 1) * 2;
                let answer_target = FocusTarget::Answer(path.clone());
                let answer_active = form.is_focused(&answer_target);
                if answer_active {
                    focus_line = lines.len();
                }
                lines.extend(field_lines(
                    &entry.field,
                    answer_active,
                    form.error_for(&FieldRef::Answer(path.clone())),
                    indent,
                ));

                if let Some(image) = &entry.image {
                    lines.push(Line::from(Span::styled(
                        format!("{}[image] {} <{}>", " ".repeat(indent + 2), image.caption, image.url),
                        Style::default().fg(Color::DarkGray),
                    )));
                }

                if let Some(note) = &entry.note {
                    let note_active = form.is_focused(&FocusTarget::Note(path.clone()));
                    if note_active {
                        focus_line = lines.len();
                    }
                    lines.extend(field_lines(note, note_active, None, indent + 2));
                }
            }
        }
    }

    (lines, focus_line)
}

/// First line to show so the focused line stays on screen
fn scroll_offset(focus_line: usize, height: usize) -> usize {
    if height == 0 || focus_line < height.saturating_sub(2) {
        0
    } else {
        focus_line.saturating_sub(height / 2)
    }
}

/// Draw the form fill view
pub fn draw_inspection_form(frame: &mut Frame, area: Rect, app: &App) {
    let Some(form) = app.state.form.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),             // Template header
            Constraint::Min(5),                // Form body
            Constraint::Length(BUTTON_HEIGHT), // Buttons
            Constraint::Length(1),             // Help text
        ])
        .split(area);

    draw_header(frame, chunks[0], form);

    let (lines, focus_line) = form_lines(form);
    let body_block = Block::default().borders(Borders::LEFT | Borders::RIGHT);
    let inner_height = chunks[1].height as usize;
    let scroll = scroll_offset(focus_line, inner_height);
    let body = Paragraph::new(lines)
        .block(body_block)
        .scroll((scroll.min(u16::MAX as usize) as u16, 0));
    frame.render_widget(body, chunks[1]);

    let button_chunks = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Length(18),
            Constraint::Length(1),
            Constraint::Length(18),
            Constraint::Min(0),
        ])
        .split(chunks[2]);
    let buttons = [
        (FormAction::SaveDraft, button_chunks[0]),
        (FormAction::Submit, button_chunks[2]),
    ];
    for (action, rect) in buttons {
        let selected = form.is_focused(&FocusTarget::Action(action));
        render_button(frame, rect, action.label(), selected, true);
    }

    draw_help_text(
        frame,
        chunks[3],
        &format!(
            "Tab/↑↓:move  Space:toggle  Enter:expand/next  {DRAFT_SHORTCUT}:draft  {SUBMIT_SHORTCUT}:submit  Esc:back"
        ),
    );
}

fn draw_header(frame: &mut Frame, area: Rect, form: &FormSession) {
    let template = form.template();
    let (answered, total) = form.progress();
    let mut spans = vec![
        Span::styled(
            template.name.clone(),
            Style::default()
                .fg(Color::Cyan)
                .add_modifier(Modifier::BOLD),
        ),
        Span::raw(format!("  {}  {}  ", template.code, template.revision)),
        Span::styled(
            template.kind.label().to_string(),
            Style::default().fg(Color::Magenta),
        ),
        Span::styled(
            format!("  {answered}/{total} answered"),
            Style::default().fg(Color::DarkGray),
        ),
    ];
    if form.has_errors() {
        spans.push(Span::styled(
            "  ✗ fix the highlighted fields",
            Style::default().fg(Color::Red),
        ));
    }
    let line = Line::from(spans);
    let header = Paragraph::new(line).block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::DarkGray)),
    );
    frame.render_widget(header, area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{
        Question, ResponseConfig, Section, Template, TemplateKind, VerificationField,
        VerificationKind,
    };
    use chrono::Utc;
    use ratatui::{backend::TestBackend, Terminal};

    fn form() -> FormSession {
        FormSession::new(template(vec![])).unwrap()
    }

    fn template(verification_fields: Vec<VerificationField>) -> Template {
        let question = |text: &str, kind: &str| Question {
            id: None,
            text: text.to_string(),
            required: false,
            response_config: ResponseConfig {
                kind: kind.to_string(),
                ..Default::default()
            },
            order: None,
            image: None,
        };
        Template {
            id: "t".to_string(),
            name: "T".to_string(),
            code: "C".to_string(),
            revision: "1".to_string(),
            kind: TemplateKind::Internal,
            verification_fields,
            sections: vec![Section {
                title: "General".to_string(),
                description: Some("Revisar antes de usar".to_string()),
                questions: vec![question("Operativo", "boolean"), question("Firma", "signature")],
                ..Default::default()
            }],
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    fn header_text(form: &FormSession) -> String {
        let mut terminal = Terminal::new(TestBackend::new(120, 3)).unwrap();
        terminal
            .draw(|frame| draw_header(frame, frame.area(), form))
            .unwrap();
        let buffer = terminal.backend().buffer();
        (0..120)
            .map(|x| buffer[(x, 1)].symbol().to_string())
            .collect()
    }

    fn rendered(lines: &[Line]) -> Vec<String> {
        lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect()
    }

    #[test]
    fn test_lines_include_sections_and_markers() {
        let (lines, focus_line) = form_lines(&form());
        let text = rendered(&lines);
        assert!(text.iter().any(|l| l == "▾ General"));
        assert!(text.iter().any(|l| l.contains("Revisar antes de usar")));
        assert!(text.iter().any(|l| l.contains("Unsupported response type: signature")));
        // First focusable element is the section header
        assert_eq!(text[focus_line], "▾ General");
    }

    #[test]
    fn test_collapsed_section_hides_questions() {
        let mut form = form();
        form.toggle_section(0);
        let (lines, _) = form_lines(&form);
        let text = rendered(&lines);
        assert!(text.iter().any(|l| l == "▸ General"));
        assert!(!text.iter().any(|l| l.contains("Operativo")));
    }

    #[test]
    fn test_header_flags_failed_validation() {
        let mut form = FormSession::new(template(vec![VerificationField {
            label: "Inspector".to_string(),
            kind: VerificationKind::Text,
            options: vec![],
            data_source: None,
        }]))
        .unwrap();
        assert!(header_text(&form).contains("0/0 answered"));
        assert!(!header_text(&form).contains("fix the highlighted fields"));

        form.validate();
        assert!(header_text(&form).contains("fix the highlighted fields"));
    }

    #[test]
    fn test_scroll_keeps_focus_visible() {
        assert_eq!(scroll_offset(3, 20), 0);
        assert_eq!(scroll_offset(40, 20), 30);
        assert_eq!(scroll_offset(5, 0), 0);
    }
}
