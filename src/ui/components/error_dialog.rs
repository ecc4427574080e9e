//! Modal error dialog

use ratatui::{
    layout::{Constraint, Flex, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Clear, Padding, Paragraph},
    Frame,
};

const MAX_WIDTH: u16 = 64;

/// Two border columns plus one column of padding on each side
const CHROME: u16 = 4;

fn key_span(key: &'static str) -> Span<'static> {
    Span::styled(
        key,
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD),
    )
}

/// Render the oldest queued error centered on the screen.
/// `queued` is the number of errors waiting behind it.
pub fn render_error_dialog(frame: &mut Frame, message: &str, queued: usize) {
    let screen = frame.area();
    let width = MAX_WIDTH.min(screen.width).max(CHROME + 8);

    let mut lines: Vec<Line> = wrap_text(message, (width - CHROME) as usize)
        .into_iter()
        .map(Line::from)
        .collect();
    if queued > 0 {
        lines.push(Line::from(""));
        lines.push(Line::styled(
            format!("{queued} more queued"),
            Style::default().fg(Color::DarkGray),
        ));
    }
    lines.push(Line::from(""));
    lines.push(Line::from(vec![
        Span::raw("Press "),
        key_span("Enter"),
        Span::raw(" or "),
        key_span("Esc"),
        Span::raw(" to dismiss"),
    ]));

    let height = (lines.len() as u16 + 2).min(screen.height);
    let area = centered(screen, width, height);

    let block = Block::bordered()
        .title(Span::styled(
            " Error ",
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD),
        ))
        .border_style(Style::default().fg(Color::Red))
        .padding(Padding::horizontal(1))
        .style(Style::default().bg(Color::Black));

    frame.render_widget(Clear, area);
    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

/// Greedy word wrap counting characters, not bytes
fn wrap_text(text: &str, max_width: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let mut current = String::new();
        for word in paragraph.split_whitespace() {
            let len = current.chars().count();
            if len > 0 && len + 1 + word.chars().count() > max_width {
                lines.push(std::mem::take(&mut current));
            }
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
        }
        lines.push(current);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    fn screen(message: &str, queued: usize) -> String {
        let mut terminal = Terminal::new(TestBackend::new(70, 12)).unwrap();
        terminal
            .draw(|frame| render_error_dialog(frame, message, queued))
            .unwrap();

        let buffer = terminal.backend().buffer();
        (0..12)
            .flat_map(|y| (0..70).map(move |x| (x, y)))
            .map(|(x, y)| buffer[(x, y)].symbol().to_string())
            .collect()
    }

    #[test]
    fn test_dialog_shows_message_and_hint() {
        let text = screen("Failed to save draft: timeout", 0);
        assert!(text.contains("Error"));
        assert!(text.contains("Failed to save draft: timeout"));
        assert!(text.contains("to dismiss"));
        assert!(!text.contains("more queued"));
    }

    #[test]
    fn test_dialog_mentions_queued_errors() {
        assert!(screen("boom", 2).contains("2 more queued"));
    }

    #[test]
    fn test_wrap_text_breaks_on_words() {
        let lines = wrap_text("Failed to load templates: connection refused", 20);
        assert_eq!(
            lines,
            vec!["Failed to load", "templates:", "connection refused"]
        );
    }

    #[test]
    fn test_wrap_text_counts_characters() {
        // Accented letters take one column each
        let lines = wrap_text("Área válida ñandú", 11);
        assert_eq!(lines, vec!["Área válida", "ñandú"]);
    }

    #[test]
    fn test_wrap_text_keeps_blank_lines() {
        let lines = wrap_text("first\n\nsecond", 40);
        assert_eq!(lines, vec!["first", "", "second"]);
        assert_eq!(wrap_text("", 10), vec![String::new()]);
    }
}
