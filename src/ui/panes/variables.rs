//! Variables pane rendering with scope frames and live variables
//!
//! The top of the pane lists the scope-frame stack from the entry routine
//! inwards; stopped frames (after `break` or `give`) are dimmed. Below it
//! every live variable is shown with its qualified name, type, declaration
//! depth and current value.

use crate::interpreter::constants::{RETURN_VALUE, UNIVERSAL_PREFIX};
use crate::interpreter::scope::FrameKind;
use crate::memory::value::VarType;
use crate::snapshot::{FrameView, VariableView};
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Scroll state for a list pane that follows new entries
#[derive(Default)]
pub struct ListScrollState {
    pub offset: usize,
    pub prev_item_count: usize,
}

impl ListScrollState {
    /// Auto-scrolls to the bottom when the list grew, otherwise clamps the
    /// user's position.
    pub fn settle(&mut self, total_items: usize, visible_height: usize) {
        let max_scroll = total_items.saturating_sub(visible_height);
        if total_items > self.prev_item_count {
            self.offset = max_scroll;
        } else {
            self.offset = self.offset.min(max_scroll);
        }
        self.prev_item_count = total_items;
    }
}

/// Data needed to render the variables pane
pub struct VariablesRenderData<'a> {
    pub frames: &'a [FrameView],
    pub variables: &'a [VariableView],
    pub call_depth: usize,
}

fn frame_line(index: usize, frame: &FrameView) -> Line<'static> {
    let label = match frame.kind {
        FrameKind::Method => format!(
            "{}() level {}",
            frame.method.as_deref().unwrap_or("?"),
            frame.level
        ),
        FrameKind::Loop => "loop".to_string(),
        FrameKind::IfElse => "if/else".to_string(),
    };
    let label_style = if !frame.running {
        Style::default()
            .fg(DEFAULT_THEME.comment)
            .add_modifier(Modifier::CROSSED_OUT)
    } else if frame.kind == FrameKind::Method {
        Style::default()
            .fg(DEFAULT_THEME.function)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    };

    Line::from(vec![
        Span::styled(
            format!("{}▸ ", "  ".repeat(index.min(12))),
            Style::default().fg(DEFAULT_THEME.secondary),
        ),
        Span::styled(label, label_style),
    ])
}

fn variable_line(variable: &VariableView, content_width: usize) -> Line<'static> {
    let name_style = if variable.name.ends_with(RETURN_VALUE) {
        Style::default().fg(DEFAULT_THEME.return_value)
    } else if variable.name.starts_with(UNIVERSAL_PREFIX) {
        Style::default()
            .fg(DEFAULT_THEME.primary)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.fg)
    };
    let value_style = Style::default().fg(match variable.var_type {
        VarType::Char | VarType::Word => DEFAULT_THEME.string,
        _ => DEFAULT_THEME.number,
    });

    let type_str = format!("{} @{}", variable.var_type, variable.depth);
    let left_width = variable.name.chars().count() + 3 + variable.value.chars().count();
    let padding = content_width.saturating_sub(left_width + type_str.len()).max(1);

    Line::from(vec![
        Span::styled(variable.name.clone(), name_style),
        Span::styled(" = ", Style::default().fg(DEFAULT_THEME.comment)),
        Span::styled(variable.value.clone(), value_style),
        Span::raw(" ".repeat(padding)),
        Span::styled(type_str, Style::default().fg(DEFAULT_THEME.type_name)),
    ])
}

/// Render the variables pane
pub fn render_variables_pane(
    frame: &mut Frame,
    area: Rect,
    data: VariablesRenderData,
    is_focused: bool,
    scroll_state: &mut ListScrollState,
) {
    let border_style = if is_focused {
        Style::default()
            .fg(DEFAULT_THEME.border_focused)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(DEFAULT_THEME.border_normal)
    };

    let block = Block::default()
        .title(format!(" Variables (call depth {}) ", data.call_depth))
        .borders(Borders::ALL)
        .border_style(border_style);

    let content_width = area.width.saturating_sub(2) as usize;
    let header_style = Style::default()
        .fg(DEFAULT_THEME.comment)
        .add_modifier(Modifier::BOLD);

    let mut all_items = vec![ListItem::new(Span::styled("Frames", header_style))];
    all_items.extend(
        data.frames
            .iter()
            .enumerate()
            .map(|(i, f)| ListItem::new(frame_line(i, f))),
    );
    all_items.push(ListItem::new(""));
    all_items.push(ListItem::new(Span::styled("Variables", header_style)));

    if data.variables.is_empty() {
        all_items.push(
            ListItem::new("(none)").style(Style::default().fg(DEFAULT_THEME.comment)),
        );
    } else {
        all_items.extend(
            data.variables
                .iter()
                .map(|v| ListItem::new(variable_line(v, content_width))),
        );
    }

    let visible_height = area.height.saturating_sub(2).max(1) as usize;
    scroll_state.settle(all_items.len(), visible_height);

    let visible_items: Vec<ListItem> = all_items
        .into_iter()
        .skip(scroll_state.offset)
        .take(visible_height)
        .collect();

    let list = List::new(visible_items).block(block);
    frame.render_widget(list, area);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scroll_follows_growth() {
        let mut state = ListScrollState::default();
        state.settle(30, 10);
        assert_eq!(state.offset, 20);

        state.offset = 5;
        state.settle(30, 10);
        assert_eq!(state.offset, 5);

        state.settle(8, 10);
        assert_eq!(state.offset, 0);
    }

    #[test]
    fn test_variable_line_aligns_type_right() {
        let variable = VariableView {
            name: "-2.n".to_string(),
            var_type: VarType::Integer,
            depth: 3,
            value: "42".to_string(),
        };
        let line = variable_line(&variable, 30);
        let text: String = line.spans.iter().map(|s| s.content.as_ref()).collect();
        assert_eq!(text.chars().count(), 30);
        assert!(text.starts_with("-2.n = 42"));
        assert!(text.ends_with("integer @3"));
    }
}
