//! Memory pane rendering with bucket layout and raw bits
//!
//! Shows how full the simulated memory is, then every live bucket in
//! address order: its bit range, type, the names sharing it and its bits
//! wrapped to the pane width. For doubles the fraction field is separated
//! from the sign and integer field by a `|`.

use super::variables::ListScrollState;
use crate::snapshot::BucketView;
use crate::ui::theme::DEFAULT_THEME;
use ratatui::{
    layout::Rect,
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

/// Data needed to render the memory pane
pub struct MemoryRenderData<'a> {
    pub buckets: &'a [BucketView],
    pub high_water: usize,
    pub capacity: usize,
}

/// A `[####....]` bar of `width` cells for `used` out of `total`
fn usage_bar(used: usize, total: usize, width: usize) -> String {
    let filled = if total == 0 {
        0
    } else {
        (used * width).div_ceil(total).min(width)
    };
    format!("[{}{}]", "#".repeat(filled), ".".repeat(width - filled))
}

fn bit_span(bit: char) -> Span<'static> {
    let color = if bit == '1' {
        DEFAULT_THEME.bit_set
    } else {
        DEFAULT_THEME.bit_clear
    };
    Span::styled(bit.to_string(), Style::default().fg(color))
}

/// Bit rows for a bucket, each at most `row_width` cells wide
fn bit_lines(bucket: &BucketView, row_width: usize) -> Vec<Line<'static>> {
    let mut cells: Vec<Span<'static>> = Vec::with_capacity(bucket.bits.len() + 1);
    for (i, bit) in bucket.bits.chars().enumerate() {
        if bucket.split == Some(i) {
            cells.push(Span::styled("|", Style::default().fg(DEFAULT_THEME.secondary)));
        }
        cells.push(bit_span(bit));
    }

    let row_width = row_width.max(8);
    cells
        .chunks(row_width)
        .map(|row| {
            let mut spans = vec![Span::raw("  ")];
            spans.extend(row.iter().cloned());
            Line::from(spans)
        })
        .collect()
}

fn bucket_header(bucket: &BucketView) -> Line<'static> {
    Line::from(vec![
        Span::styled(
            format!("{:>7}..{:<7}", bucket.start, bucket.start + bucket.width),
            Style::default().fg(DEFAULT_THEME.secondary),
        ),
        Span::styled(
            format!("{} ", bucket.var_type),
            Style::default().fg(DEFAULT_THEME.type_name),
        ),
        Span::styled(
            bucket.names.join(", "),
            Style::default()
                .fg(DEFAULT_THEME.fg)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled(
            format!(" ({} bits)", bucket.width),
            Style::default().fg(DEFAULT_THEME.comment),
        ),
    ])
}

/// Render the memory pane
pub fn render_memory_pane(
    frame: &mut Frame,
    area: Rect,
    data: MemoryRenderData,
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
        .title(" Memory ")
        .borders(Borders::ALL)
        .border_style(border_style);

    let content_width = area.width.saturating_sub(2) as usize;
    let used: usize = data.buckets.iter().map(|b| b.width).sum();

    let mut all_items = vec![
        ListItem::new(Line::from(vec![
            Span::styled("used ", Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(used.to_string(), Style::default().fg(DEFAULT_THEME.number)),
            Span::styled("  high-water ", Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(
                data.high_water.to_string(),
                Style::default().fg(DEFAULT_THEME.number),
            ),
            Span::styled("  capacity ", Style::default().fg(DEFAULT_THEME.comment)),
            Span::styled(
                data.capacity.to_string(),
                Style::default().fg(DEFAULT_THEME.number),
            ),
        ])),
        ListItem::new(Span::styled(
            usage_bar(data.high_water, data.capacity, content_width.saturating_sub(2)),
            Style::default().fg(DEFAULT_THEME.success),
        )),
        ListItem::new(""),
    ];

    if data.buckets.is_empty() {
        all_items.push(
            ListItem::new("(no live buckets)").style(Style::default().fg(DEFAULT_THEME.comment)),
        );
    }
    for bucket in data.buckets {
        all_items.push(ListItem::new(bucket_header(bucket)));
        all_items.extend(
            bit_lines(bucket, content_width.saturating_sub(2))
                .into_iter()
                .map(ListItem::new),
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
    use crate::memory::value::VarType;

    #[test]
    fn test_usage_bar() {
        assert_eq!(usage_bar(0, 100, 10), "[..........]");
        assert_eq!(usage_bar(50, 100, 10), "[#####.....]");
        assert_eq!(usage_bar(1, 100, 10), "[#.........]");
        assert_eq!(usage_bar(5, 0, 4), "[....]");
    }

    #[test]
    fn test_bit_lines_mark_split_and_wrap() {
        let bucket = BucketView {
            names: vec!["d".to_string()],
            var_type: VarType::Double,
            start: 0,
            width: 12,
            split: Some(4),
            bits: "010111110000".to_string(),
        };
        let lines = bit_lines(&bucket, 8);
        let rows: Vec<String> = lines
            .iter()
            .map(|l| l.spans.iter().map(|s| s.content.as_ref()).collect())
            .collect();
        assert_eq!(rows, vec!["  0101|111", "  10000"]);
    }
}
