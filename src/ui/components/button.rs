//! Button component for TUI

use ratatui::{
    layout::{Alignment, Rect},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

/// Button height in rows (top border + content + bottom border)
pub const BUTTON_HEIGHT: u16 = 3;

fn button_styles(is_selected: bool, is_enabled: bool) -> (Style, Style) {
    let border = if is_selected {
        Style::default().fg(Color::Cyan)
    } else {
        Style::default().fg(Color::DarkGray)
    };

    let text = if is_selected {
        Style::default()
            .fg(Color::Cyan)
            .add_modifier(Modifier::BOLD)
    } else if !is_enabled {
        Style::default().fg(Color::DarkGray)
    } else {
        Style::default()
    };

    (border, text)
}

/// Render a bordered button with centered label
pub fn render_button(
    frame: &mut Frame,
    area: Rect,
    content: &str,
    is_selected: bool,
    is_enabled: bool,
) {
    let (border_style, text_style) = button_styles(is_selected, is_enabled);

    let paragraph = Paragraph::new(content.to_string())
        .style(text_style)
        .alignment(Alignment::Center);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(border_style);

    frame.render_widget(paragraph.block(block), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::{backend::TestBackend, Terminal};

    #[test]
    fn test_selected_button_is_highlighted() {
        let (border, text) = button_styles(true, true);
        assert_eq!(border.fg, Some(Color::Cyan));
        assert!(text.add_modifier.contains(Modifier::BOLD));

        let (_, disabled) = button_styles(false, false);
        assert_eq!(disabled.fg, Some(Color::DarkGray));
    }

    #[test]
    fn test_render_button_label() {
        let mut terminal = Terminal::new(TestBackend::new(12, BUTTON_HEIGHT)).unwrap();
        terminal
            .draw(|frame| render_button(frame, frame.area(), "Submit", true, true))
            .unwrap();

        let buffer = terminal.backend().buffer();
        let middle: String = (0..12)
            .map(|x| buffer[(x, 1)].symbol().to_string())
            .collect();
        assert!(middle.contains("Submit"));
    }
}
