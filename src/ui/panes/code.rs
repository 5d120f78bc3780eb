//! Code pane: the loaded instruction listing
//!
//! Each row shows the address of a triple, its mnemonic and the raw `L` and
//! `M` operands. The row at PC carries an arrow and a highlighted background;
//! when execution is blocked on input or stopped by an error the row is
//! painted in the secondary or error colour instead.

use crate::interpreter::isa::disassemble;
use crate::memory::Addr;
use crate::parser::program::RawInstruction;
use crate::ui::panes::utils::{clamp_scroll, inner_height, pane_block};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

/// Scroll state for the code pane
pub struct CodeScrollState {
    pub offset: usize,
    /// Visual row the PC line is pinned to (None = centre on first render)
    pub target_line_row: Option<usize>,
}

impl CodeScrollState {
    pub fn new() -> Self {
        CodeScrollState {
            offset: 0,
            target_line_row: None,
        }
    }
}

impl Default for CodeScrollState {
    fn default() -> Self {
        Self::new()
    }
}

pub struct CodeRenderData<'a> {
    pub instructions: &'a [(Addr, RawInstruction)],
    /// Address of the next instruction
    pub pc: Addr,
    /// Address of the instruction that produced the current state
    pub last_executed: Option<Addr>,
    pub is_error: bool,
    pub is_input: bool,
    pub is_focused: bool,
}

fn instruction_spans(raw: RawInstruction) -> Vec<Span<'static>> {
    let mnemonic = disassemble(raw);
    let mnemonic_style = if mnemonic == "???" {
        Style::default().fg(DEFAULT_THEME.error)
    } else {
        Style::default()
            .fg(DEFAULT_THEME.mnemonic)
            .add_modifier(Modifier::BOLD)
    };

    vec![
        Span::styled(format!("{:<4}", mnemonic), mnemonic_style),
        Span::styled(
            format!("{:>4}", raw.l),
            Style::default().fg(DEFAULT_THEME.number),
        ),
        Span::styled(
            format!("{:>7}", raw.m),
            Style::default().fg(DEFAULT_THEME.number),
        ),
        Span::styled(
            format!("   ; {} {} {}", raw.op, raw.l, raw.m),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
    ]
}

/// Render the code pane
pub fn render_code_pane(
    frame: &mut Frame,
    area: Rect,
    data: CodeRenderData,
    scroll_state: &mut CodeScrollState,
) {
    let block = pane_block(" Code ".to_string(), data.is_focused);

    if data.instructions.is_empty() {
        let paragraph = Paragraph::new("(empty program)")
            .block(block)
            .style(Style::default().fg(DEFAULT_THEME.comment));
        frame.render_widget(paragraph, area);
        return;
    }

    let total_lines = data.instructions.len();
    let visible_height = inner_height(area.height);

    let target_row = scroll_state
        .target_line_row
        .unwrap_or(visible_height / 2)
        .min(visible_height.saturating_sub(1));
    scroll_state.target_line_row = Some(target_row);

    // PC may point outside the code after a bad jump; keep the last position then
    if let Some(current_idx) = data.instructions.iter().position(|(a, _)| *a == data.pc) {
        scroll_state.offset = clamp_scroll(
            current_idx.saturating_sub(target_row),
            total_lines,
            visible_height,
        );
    } else {
        scroll_state.offset = clamp_scroll(scroll_state.offset, total_lines, visible_height);
    }

    let lines: Vec<Line> = data
        .instructions
        .iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .map(|(addr, raw)| {
            let is_current = *addr == data.pc;
            let is_last = data.last_executed == Some(*addr);

            let (marker, addr_style, background) = if is_current && data.is_error {
                (
                    "✖ ",
                    Style::default()
                        .fg(DEFAULT_THEME.error)
                        .add_modifier(Modifier::BOLD),
                    Some(Style::default().bg(DEFAULT_THEME.error).fg(Color::White)),
                )
            } else if is_current && data.is_input {
                (
                    "⌨ ",
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                    Some(Style::default().bg(DEFAULT_THEME.secondary).fg(Color::Black)),
                )
            } else if is_current {
                (
                    "▶ ",
                    Style::default()
                        .fg(DEFAULT_THEME.secondary)
                        .add_modifier(Modifier::BOLD),
                    Some(Style::default().bg(DEFAULT_THEME.current_line_bg)),
                )
            } else if is_last {
                ("· ", Style::default().fg(DEFAULT_THEME.fg), None)
            } else {
                ("  ", Style::default().fg(DEFAULT_THEME.comment), None)
            };

            let mut spans = vec![
                Span::styled(marker, addr_style),
                Span::styled(format!("{:>4}  ", addr), addr_style),
            ];
            spans.extend(instruction_spans(*raw));

            if let Some(background) = background {
                for span in &mut spans {
                    span.style = span.style.patch(background);
                }
                Line::from(spans).style(background)
            } else {
                Line::from(spans)
            }
        })
        .collect();

    let paragraph = Paragraph::new(lines).block(block);
    frame.render_widget(paragraph, area);
}
