//! Status bar rendering with keybindings and state indicators

use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

pub struct StatusRenderData<'a> {
    pub message: &'a str,
    pub current_step: usize,
    /// `None` while more steps can still be executed
    pub total_steps: Option<usize>,
    pub is_error: bool,
    pub is_playing: bool,
    pub is_input: bool,
    /// Snapshot history bytes in use and the limit
    pub snapshot_memory: (usize, usize),
}

/// Snapshot memory as `used/limit MB`
fn format_memory((used, limit): (usize, usize)) -> String {
    const MB: f64 = 1024.0 * 1024.0;
    format!("{:.1}/{:.0} MB", used as f64 / MB, limit as f64 / MB)
}

fn indicator(text: &'static str, bg: Color) -> Span<'static> {
    Span::styled(
        text,
        Style::default()
            .bg(bg)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD),
    )
}

/// Render the status bar at the bottom
pub fn render_status_bar(frame: &mut Frame, area: Rect, data: StatusRenderData) {
    let layout = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(45), Constraint::Percentage(55)])
        .split(area);

    let step_text = match data.total_steps {
        Some(total) => format!(" Step {}/{} ", data.current_step, total),
        None => format!(" Step {}/? ", data.current_step),
    };

    let step_bg = if data.is_error {
        DEFAULT_THEME.error
    } else if data.is_input {
        DEFAULT_THEME.secondary
    } else {
        DEFAULT_THEME.primary
    };

    let left_spans = vec![
        Span::styled(
            step_text,
            Style::default()
                .bg(step_bg)
                .fg(Color::Black)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" {} ", format_memory(data.snapshot_memory)),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            " | ",
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(DEFAULT_THEME.comment),
        ),
        Span::styled(
            format!(" {} ", data.message),
            Style::default()
                .bg(DEFAULT_THEME.current_line_bg)
                .fg(if data.is_error {
                    DEFAULT_THEME.error
                } else {
                    DEFAULT_THEME.fg
                }),
        ),
    ];

    let left_paragraph = Paragraph::new(Line::from(left_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Left);
    frame.render_widget(left_paragraph, layout[0]);

    let key_style = Style::default().bg(DEFAULT_THEME.comment).fg(Color::Black);
    let desc_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.fg);
    let sep_style = Style::default()
        .bg(DEFAULT_THEME.current_line_bg)
        .fg(DEFAULT_THEME.comment);

    let mut right_spans = Vec::new();
    if data.is_input {
        right_spans.extend([
            Span::styled(" 0-9 - ", key_style),
            Span::styled(" type ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" ↵ ", key_style),
            Span::styled(" submit ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" esc ", key_style),
            Span::styled(" cancel ", desc_style),
        ]);
    } else {
        right_spans.extend([
            Span::styled(" ←/→ ", key_style),
            Span::styled(" step ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" ⎵ ", key_style),
            Span::styled(" play ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled(" ↵ / ⌫ ", key_style),
            Span::styled(" end/start ", desc_style),
            Span::styled("│", sep_style),
            Span::styled(" ", desc_style),
            Span::styled("q", key_style),
            Span::styled(" quit ", desc_style),
        ]);
    }

    let is_at_start = data.current_step == 0;
    let is_at_end = data
        .total_steps
        .is_some_and(|total| data.current_step >= total);

    let state = if data.is_input {
        Some(indicator(" ⌨ INPUT ", DEFAULT_THEME.secondary))
    } else if data.is_playing {
        Some(indicator(" ▶ PLAYING ", DEFAULT_THEME.secondary))
    } else if is_at_end {
        Some(indicator(" END ", DEFAULT_THEME.error))
    } else if is_at_start {
        Some(indicator(" START ", DEFAULT_THEME.success))
    } else {
        None
    };
    if let Some(state) = state {
        right_spans.push(Span::styled("│", sep_style));
        right_spans.push(state);
    }

    let right_paragraph = Paragraph::new(Line::from(right_spans))
        .style(Style::default().bg(DEFAULT_THEME.current_line_bg))
        .alignment(Alignment::Right);
    frame.render_widget(right_paragraph, layout[1]);
}
