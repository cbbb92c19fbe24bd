use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
    Frame,
};

use crate::core::app::{App, ChatPhase, Overlay};
use crate::core::providers::ProviderId;
use crate::ui::theme::{provider_brand_color, Theme};

const MAX_INPUT_ROWS: usize = 6;

pub fn ui(f: &mut Frame, app: &mut App) {
    let theme = app.theme().clone();
    let area = f.area();
    f.render_widget(Block::default().style(theme.base_style()), area);

    let input_rows = app.input.lines().len().clamp(1, MAX_INPUT_ROWS) as u16;
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(0),
            Constraint::Length(input_rows + 2), // +2 for borders
            Constraint::Length(1),
        ])
        .split(area);

    f.render_widget(Paragraph::new(header_line(app, &theme)), chunks[0]);
    render_transcript(f, app, &theme, chunks[1]);
    render_input(f, app, &theme, chunks[2]);
    f.render_widget(
        Paragraph::new(status_line(app)).style(theme.status_style),
        chunks[3],
    );

    if app.overlay().is_some() {
        render_overlay(f, app, &theme, area);
    }
}

/// App title plus one tab per provider in its brand color; the current one
/// is filled.
fn header_line(app: &App, theme: &Theme) -> Line<'static> {
    let mut spans = vec![Span::styled(" Palaver ", theme.title_style), Span::raw(" ")];
    for provider in ProviderId::ALL {
        let brand = provider_brand_color(provider);
        let style = if provider == app.provider() {
            Style::default()
                .fg(Color::White)
                .bg(brand)
                .add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(brand)
        };
        spans.push(Span::styled(format!(" {} ", provider.display_name()), style));
        spans.push(Span::raw(" "));
    }
    Line::from(spans)
}

fn render_transcript(f: &mut Frame, app: &mut App, theme: &Theme, area: Rect) {
    let (lines, offset) = app.view.layout(area.width, area.height);
    let end = (offset + area.height as usize).min(lines.len());
    let visible = lines[offset.min(end)..end].to_vec();
    f.render_widget(Paragraph::new(visible).style(theme.base_style()), area);
}

fn render_input(f: &mut Frame, app: &mut App, theme: &Theme, area: Rect) {
    let strings = app.language().strings();
    let busy = !app.phase().accepts_input();
    let (title, text_style) = if busy {
        (strings.input_busy_title, theme.input_disabled_style)
    } else {
        (strings.input_title, theme.input_text_style)
    };

    app.input.set_block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(theme.input_border_style)
            .title(Line::styled(title, theme.input_title_style)),
    );
    app.input.set_style(text_style);
    app.input.set_cursor_line_style(Style::default());
    app.input.set_cursor_style(if busy {
        text_style
    } else {
        text_style.add_modifier(Modifier::REVERSED)
    });
    f.render_widget(&app.input, area);
}

fn status_line(app: &App) -> String {
    let strings = app.language().strings();
    let phase = match app.phase() {
        ChatPhase::Idle => strings.status_ready,
        ChatPhase::Sending | ChatPhase::AwaitingResponse => strings.status_waiting,
        ChatPhase::Presenting => strings.status_typing,
    };
    let detail = app.status().unwrap_or(phase);
    format!(
        " {detail} | {} | {} | F1 ?",
        app.theme().name,
        app.language().code()
    )
}

fn render_overlay(f: &mut Frame, app: &App, theme: &Theme, area: Rect) {
    let strings = app.language().strings();
    let (title, body) = match app.overlay() {
        Some(Overlay::Help) => (strings.help_title, strings.help_text.to_string()),
        Some(Overlay::History(text)) => (strings.history_title, text.clone()),
        None => return,
    };

    let popup = centered_rect(80, 80, area);
    f.render_widget(Clear, popup);
    let paragraph = Paragraph::new(body)
        .style(theme.overlay_style)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .title(format!(" {title} (Esc) ")),
        )
        .wrap(Wrap { trim: false })
        .scroll((app.overlay_scroll, 0));
    f.render_widget(paragraph, popup);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
    let vertical = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(area);
    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(vertical[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::test_utils::{create_test_app, RecordingTransport};
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;
    use std::sync::Arc;
    use tempfile::TempDir;

    fn draw(app: &mut App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|f| ui(f, app)).unwrap();
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn frame_shows_header_transcript_and_input() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));
        app.post_system("hello from the system");

        let screen = draw(&mut app, 80, 20);
        assert!(screen.contains("Palaver"));
        assert!(screen.contains("DeepSeek AI"));
        assert!(screen.contains("ChatGPT"));
        assert!(screen.contains("Claude"));
        assert!(screen.contains("hello from the system"));
        assert!(screen.contains("Message (Enter to send"));
        assert!(screen.contains("Ready"));
    }

    #[test]
    fn busy_input_changes_title() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));
        let _ = app.submit_message("question".to_string());

        let screen = draw(&mut app, 80, 20);
        assert!(screen.contains("Waiting for reply"));
        assert!(screen.contains("Requesting"));
    }

    #[test]
    fn help_overlay_is_drawn_over_transcript() {
        let dir = TempDir::new().unwrap();
        let mut app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));
        app.open_help();

        let screen = draw(&mut app, 80, 30);
        assert!(screen.contains("Help (Esc)"));
        assert!(screen.contains("Toggle theme"));
    }

    #[test]
    fn selected_provider_tab_uses_brand_background() {
        let dir = TempDir::new().unwrap();
        let app = create_test_app(dir.path(), Arc::new(RecordingTransport::new()));
        let line = header_line(&app, app.theme());
        let selected = line
            .spans
            .iter()
            .find(|s| s.content.contains("DeepSeek AI"))
            .unwrap();
        assert_eq!(
            selected.style.bg,
            Some(provider_brand_color(ProviderId::DeepSeek))
        );
        let other = line
            .spans
            .iter()
            .find(|s| s.content.contains("Claude"))
            .unwrap();
        assert_eq!(other.style.bg, None);
    }
}
