//! Terminal output pane rendering

use crate::snapshot::{LineKind, MockTerminal};
use crate::ui::panes::utils::{clamp_scroll, inner_height, pane_block};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Padding, Paragraph},
    Frame,
};

/// Render the output pane. `pending_input` is the partially typed value
/// while the program waits on SYS input.
pub fn render_terminal_pane(
    frame: &mut Frame,
    area: Rect,
    terminal: &MockTerminal,
    pending_input: Option<&str>,
    is_focused: bool,
    scroll_offset: &mut usize,
) {
    let block = pane_block(" Output ".to_string(), is_focused);

    if terminal.lines.is_empty() && pending_input.is_none() {
        let paragraph = Paragraph::new("(no output)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let block = block.padding(Padding::new(1, 0, 0, 0));
    let mut all_items: Vec<ListItem> = terminal
        .lines
        .iter()
        .map(|line| {
            let style = match line.kind {
                LineKind::Output(_) => Style::default().fg(DEFAULT_THEME.output),
                LineKind::Input(_) => Style::default().fg(DEFAULT_THEME.secondary),
                LineKind::Diagnostic => Style::default()
                    .fg(DEFAULT_THEME.error)
                    .add_modifier(Modifier::BOLD),
            };
            ListItem::new(line.text.as_str()).style(style)
        })
        .collect();

    if let Some(buffer) = pending_input {
        all_items.push(ListItem::new(Line::from(vec![
            Span::styled(
                "Please Enter an Integer: ",
                Style::default().fg(DEFAULT_THEME.secondary),
            ),
            Span::styled(
                format!("{}_", buffer),
                Style::default()
                    .fg(DEFAULT_THEME.fg)
                    .add_modifier(Modifier::BOLD),
            ),
        ])));
    }

    let total_items = all_items.len();
    let visible_height = inner_height(area.height);
    *scroll_offset = clamp_scroll(*scroll_offset, total_items, visible_height);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(*scroll_offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
