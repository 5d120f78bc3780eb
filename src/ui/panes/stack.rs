//! Stack pane rendering with activation records
//!
//! Cells are listed from the top of the address space down to SP, the way
//! the stack grows. Every activation record starts with a header line and
//! its first three cells are labelled with their linkage role. BP and SP are
//! marked where they point.

use crate::interpreter::engine::Registers;
use crate::memory::{frames::FrameTracker, Addr, AddressSpace};
use crate::ui::panes::utils::{clamp_scroll, inner_height, pane_block};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{List, ListItem, Paragraph},
    Frame,
};

const LINKAGE_LABELS: [&str; 3] = ["SL", "DL", "RA"];

/// Scroll state for the stack pane
pub struct StackScrollState {
    pub offset: usize,
    pub prev_item_count: usize,
}

impl StackScrollState {
    pub fn new() -> Self {
        StackScrollState {
            offset: 0,
            prev_item_count: 0,
        }
    }
}

impl Default for StackScrollState {
    fn default() -> Self {
        Self::new()
    }
}

/// Data needed to render the stack pane
pub struct StackRenderData<'a> {
    pub memory: &'a AddressSpace,
    pub frames: &'a FrameTracker,
    pub registers: Registers,
    pub is_focused: bool,
}

/// Base of the record owning `addr`: the deepest base at or above it
fn owning_base(bases: &[Addr], addr: Addr) -> Option<Addr> {
    bases.iter().rev().find(|base| **base >= addr).copied()
}

/// Render the stack pane
pub fn render_stack_pane(
    frame: &mut Frame,
    area: Rect,
    data: StackRenderData,
    scroll_state: &mut StackScrollState,
) {
    let Registers { pc, bp, sp } = data.registers;
    let block = pane_block(
        format!(" Stack  PC {}  BP {}  SP {} ", pc, bp, sp),
        data.is_focused,
    );

    let capacity = data.memory.capacity();
    if sp.index() >= capacity {
        let paragraph = Paragraph::new("(empty stack)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        scroll_state.prev_item_count = 0;
        return;
    }

    // The outermost record is never pushed by CAL
    let mut bases = vec![Addr::new(capacity - 1)];
    bases.extend_from_slice(data.frames.bases());
    let boundaries = data.frames.boundary_set();

    let mut all_items = Vec::new();
    for index in (sp.index()..capacity).rev() {
        let addr = Addr::new(index);

        if index == capacity - 1 || boundaries.contains(&addr) {
            let depth = bases.iter().position(|base| *base == addr).unwrap_or(0);
            let title = if depth == 0 {
                "main".to_string()
            } else {
                format!("frame {}", depth)
            };
            all_items.push(ListItem::new(Line::from(vec![
                Span::styled(
                    "▸ ",
                    Style::default()
                        .fg(DEFAULT_THEME.frame)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    title,
                    Style::default()
                        .fg(DEFAULT_THEME.frame)
                        .add_modifier(Modifier::BOLD),
                ),
                Span::styled(
                    format!("  base {}", addr),
                    Style::default().fg(DEFAULT_THEME.comment),
                ),
            ])));
        }

        let value = data.memory.cells().get(index).copied().unwrap_or_default();
        let label = owning_base(&bases, addr)
            .and_then(|base| LINKAGE_LABELS.get(base.index() - index))
            .copied()
            .unwrap_or("");

        let mut spans = vec![
            Span::styled(
                format!("  {:>4} ", addr),
                Style::default().fg(DEFAULT_THEME.comment),
            ),
            Span::styled(
                format!("{:<3}", label),
                Style::default().fg(DEFAULT_THEME.linkage),
            ),
            Span::styled(
                format!("{:>11}", value),
                Style::default().fg(DEFAULT_THEME.number),
            ),
        ];

        let mut markers = Vec::new();
        if addr == bp {
            markers.push("BP");
        }
        if addr == sp {
            markers.push("SP");
        }
        if !markers.is_empty() {
            spans.push(Span::styled(
                format!("  ◀ {}", markers.join(" ")),
                Style::default()
                    .fg(DEFAULT_THEME.register)
                    .add_modifier(Modifier::BOLD),
            ));
        }

        all_items.push(ListItem::new(Line::from(spans)));
    }

    let total_items = all_items.len();
    let visible_height = inner_height(area.height);

    // Follow the top of the stack while it grows, otherwise keep the user's position
    if total_items > scroll_state.prev_item_count {
        scroll_state.offset = total_items.saturating_sub(visible_height);
    } else {
        scroll_state.offset = clamp_scroll(scroll_state.offset, total_items, visible_height);
    }
    scroll_state.prev_item_count = total_items;

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .collect();

    frame.render_widget(List::new(visible_items).block(block), area);
}
