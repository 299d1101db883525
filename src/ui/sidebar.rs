use chrono::{DateTime, Local};
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Widget, Wrap},
};
use unicode_width::UnicodeWidthChar;

use crate::saved_texts::SavedTextEntry;

/// Lines used per entry: preview, date, spacer.
const ENTRY_HEIGHT: u16 = 3;

/// Cut `text` to at most `width` terminal cells, ending in `…` when shortened.
/// Newlines are flattened to spaces.
pub fn truncate_to_width(text: &str, width: usize) -> String {
    let flat: String = text
        .chars()
        .map(|c| if c == '\n' || c == '\t' { ' ' } else { c })
        .collect();
    let total: usize = flat.chars().map(|c| c.width().unwrap_or(0)).sum();
    if total <= width {
        return flat;
    }
    let mut out = String::new();
    let mut used = 0;
    for c in flat.chars() {
        let w = c.width().unwrap_or(0);
        if used + w + 1 > width {
            break;
        }
        out.push(c);
        used += w;
    }
    out.push('…');
    out
}

pub fn format_date(timestamp_ms: i64) -> String {
    DateTime::from_timestamp_millis(timestamp_ms)
        .map(|dt| dt.with_timezone(&Local).format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_default()
}

/// Saved texts list with its search box.
pub struct SidebarView<'a> {
    pub entries: &'a [&'a SavedTextEntry],
    pub total: usize,
    pub query: &'a str,
    pub selected: usize,
    pub searching: bool,
    pub enabled: bool,
}

impl SidebarView<'_> {
    fn empty_message(&self) -> &'static str {
        if self.total == 0 {
            "No saved texts yet. Save a text to get started."
        } else {
            "No matching texts found."
        }
    }
}

impl Widget for SidebarView<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Saved Texts ({}) ", self.total));
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(2), Constraint::Min(0)].as_ref())
            .split(inner);

        let search_style = if self.searching {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default().add_modifier(Modifier::DIM)
        };
        let search = if self.query.is_empty() && !self.searching {
            Line::from(Span::styled("/ Search texts...", search_style))
        } else {
            let cursor = if self.searching { "▏" } else { "" };
            Line::from(vec![
                Span::styled("/ ", search_style),
                Span::raw(self.query.to_string()),
                Span::styled(cursor, search_style),
            ])
        };
        Paragraph::new(search).render(chunks[0], buf);

        let list_area = chunks[1];
        if self.entries.is_empty() {
            Paragraph::new(Span::styled(
                self.empty_message(),
                Style::default().add_modifier(Modifier::ITALIC | Modifier::DIM),
            ))
            .wrap(Wrap { trim: true })
            .render(list_area, buf);
            return;
        }

        let visible = (list_area.height / ENTRY_HEIGHT).max(1) as usize;
        let first = (self.selected + 1).saturating_sub(visible);
        let width = list_area.width as usize;

        for (row, (idx, entry)) in self
            .entries
            .iter()
            .enumerate()
            .skip(first)
            .take(visible)
            .enumerate()
        {
            let y = list_area.y + row as u16 * ENTRY_HEIGHT;
            let is_selected = idx == self.selected && self.enabled;
            let (marker, preview_style) = if is_selected {
                ("▶ ", Style::default().add_modifier(Modifier::BOLD | Modifier::REVERSED))
            } else {
                ("  ", Style::default())
            };
            let preview = truncate_to_width(&entry.preview, width.saturating_sub(2));
            let preview_line = Line::from(vec![
                Span::raw(marker),
                Span::styled(preview, preview_style),
            ]);
            buf.set_line(list_area.x, y, &preview_line, list_area.width);

            if y + 1 < list_area.bottom() {
                let date_line = Line::from(Span::styled(
                    format!("  {}", format_date(entry.timestamp)),
                    Style::default().add_modifier(Modifier::DIM),
                ));
                buf.set_line(list_area.x, y + 1, &date_line, list_area.width);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, text: &str) -> SavedTextEntry {
        SavedTextEntry {
            id: id.to_string(),
            text: text.to_string(),
            preview: crate::saved_texts::make_preview(text),
            timestamp: 1_700_000_000_000,
        }
    }

    fn render(view: SidebarView) -> String {
        let area = Rect::new(0, 0, 30, 16);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);
        buf.content().iter().map(|c| c.symbol()).collect()
    }

    #[test]
    fn test_empty_store_message() {
        let rendered = render(SidebarView {
            entries: &[],
            total: 0,
            query: "",
            selected: 0,
            searching: false,
            enabled: true,
        });

        assert!(rendered.contains("No saved texts yet."));
        assert!(rendered.contains("Saved Texts (0)"));
    }

    #[test]
    fn test_no_matches_message() {
        let rendered = render(SidebarView {
            entries: &[],
            total: 3,
            query: "zzz",
            selected: 0,
            searching: true,
            enabled: true,
        });

        assert!(rendered.contains("No matching texts found."));
        assert!(rendered.contains("zzz"));
    }

    #[test]
    fn test_entries_show_previews() {
        let a = entry("1", "first practice text");
        let b = entry("2", "second one");
        let entries = vec![&b, &a];
        let rendered = render(SidebarView {
            entries: &entries,
            total: 2,
            query: "",
            selected: 1,
            searching: false,
            enabled: true,
        });

        assert!(rendered.contains("second one"));
        assert!(rendered.contains("▶ first practice"));
    }

    #[test]
    fn test_truncate_to_width() {
        assert_eq!(truncate_to_width("short", 10), "short");
        assert_eq!(truncate_to_width("abcdefghij", 5), "abcd…");
        assert_eq!(truncate_to_width("a\nb", 5), "a b");
        // Wide glyphs take two cells each.
        assert_eq!(truncate_to_width("日本語テキスト", 7), "日本語…");
    }

    #[test]
    fn test_format_date_handles_out_of_range() {
        assert_eq!(format_date(i64::MAX), "");
        assert!(!format_date(0).is_empty());
    }
}
