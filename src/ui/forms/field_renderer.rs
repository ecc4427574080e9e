//! Field rendering utilities for forms

use crate::state::{FieldKind, FormField, ValidationError};
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

const CURSOR: &str = "▌";

fn pad(indent: usize) -> String {
    " ".repeat(indent)
}

/// Lines for one field: label, value, inline error
pub fn field_lines(
    field: &FormField,
    is_active: bool,
    error: Option<&ValidationError>,
    indent: usize,
) -> Vec<Line<'static>> {
    let label_style = if is_active {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(Color::White)
    };

    let mut label = vec![
        Span::raw(pad(indent)),
        Span::styled(field.label.clone(), label_style),
    ];
    if field.required {
        label.push(Span::styled(" *", Style::default().fg(Color::Red)));
    }

    let mut lines = vec![Line::from(label)];

    if let FieldKind::Unsupported(kind) = &field.kind {
        lines.push(Line::from(vec![
            Span::raw(pad(indent + 2)),
            Span::styled(
                format!("⚠ Unsupported response type: {kind}"),
                Style::default().fg(Color::Red),
            ),
        ]));
        return lines;
    }

    lines.extend(value_lines(field, is_active, indent + 2));

    if let Some(error) = error {
        lines.push(Line::from(vec![
            Span::raw(pad(indent + 2)),
            Span::styled(format!("✗ {error}"), Style::default().fg(Color::Red)),
        ]));
    }

    lines
}

fn value_lines(field: &FormField, is_active: bool, indent: usize) -> Vec<Line<'static>> {
    let style = if is_active {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::Gray)
    };
    let cursor_style = Style::default().fg(Color::Cyan);

    if field.is_toggle() {
        let mut spans = vec![
            Span::raw(pad(indent)),
            Span::styled(field.display_value(), style),
        ];
        if is_active {
            spans.push(Span::styled(
                "  (Space/←/→ to change)",
                Style::default().fg(Color::DarkGray),
            ));
        }
        return vec![Line::from(spans)];
    }

    let display_value = field.display_value();
    if display_value.is_empty() && !is_active {
        let placeholder = field
            .placeholder
            .clone()
            .unwrap_or_else(|| "(empty)".to_string());
        return vec![Line::from(vec![
            Span::raw(pad(indent)),
            Span::styled(placeholder, Style::default().fg(Color::DarkGray)),
        ])];
    }

    let mut lines: Vec<Line<'static>> = display_value
        .split('\n')
        .map(|l| Line::from(vec![Span::raw(pad(indent)), Span::styled(l.to_string(), style)]))
        .collect();

    if is_active {
        if let Some(last) = lines.last_mut() {
            last.spans.push(Span::styled(CURSOR, cursor_style));
        }
        if matches!(field.kind, FieldKind::Date) {
            lines.push(Line::from(vec![
                Span::raw(pad(indent)),
                Span::styled("YYYY-MM-DD", Style::default().fg(Color::DarkGray)),
            ]));
        }
    }

    lines
}

/// Draw a one-line keyboard help text
pub fn draw_help_text(frame: &mut Frame, area: Rect, text: &str) {
    let help = Paragraph::new(text.to_string()).style(Style::default().fg(Color::DarkGray));
    frame.render_widget(help, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn text_of(line: &Line) -> String {
        line.spans.iter().map(|s| s.content.as_ref()).collect()
    }

    #[test]
    fn test_required_marker_and_placeholder() {
        let field = FormField::new("f", "Inspector", FieldKind::Text).required(true);
        let lines = field_lines(&field, false, None, 0);
        assert_eq!(text_of(&lines[0]), "Inspector *");
        assert_eq!(text_of(&lines[1]), "  (empty)");
    }

    #[test]
    fn test_active_field_shows_cursor() {
        let mut field = FormField::new("f", "Notes", FieldKind::MultilineText);
        field.set_text("a\nb");
        let lines = field_lines(&field, true, None, 2);
        assert_eq!(lines.len(), 3);
        assert_eq!(text_of(&lines[2]), "    b▌");
    }

    #[test]
    fn test_error_line() {
        let field = FormField::new("f", "Carga", FieldKind::Number { min: Some(5.0), max: None });
        let lines = field_lines(&field, false, Some(&ValidationError::BelowMinimum(5.0)), 0);
        assert_eq!(text_of(lines.last().unwrap()), "  ✗ Minimum: 5");
    }

    #[test]
    fn test_unsupported_marker() {
        let field = FormField::new("f", "Firma", FieldKind::Unsupported("signature".into()));
        let lines = field_lines(&field, false, None, 0);
        assert!(text_of(&lines[1]).contains("Unsupported response type: signature"));
    }
}
