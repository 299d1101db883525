pub mod keyboard;
pub mod sidebar;

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Gauge, Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

use crate::app::{App, Focus, NoticeKind, Snapshot};
use crate::scoring::format_clock;
use crate::session::{Orientation, Status};
use keyboard::{KeyboardView, KEYBOARD_HEIGHT};
use sidebar::SidebarView;

const SIDEBAR_WIDTH: u16 = 36;
const HORIZONTAL_MARGIN: u16 = 1;

/// Break `text` into rows at most `width` cells wide. A newline closes its
/// row and stays in it so it can be drawn.
fn char_rows(text: &str, width: u16) -> Vec<Vec<(usize, char)>> {
    let width = width.max(1) as usize;
    let mut rows = vec![Vec::new()];
    let mut used = 0;
    for (idx, c) in text.chars().enumerate() {
        let w = c.width().unwrap_or(1).max(1);
        if used + w > width && used > 0 {
            rows.push(Vec::new());
            used = 0;
        }
        if let Some(row) = rows.last_mut() {
            row.push((idx, c));
        }
        used += w;
        if c == '\n' {
            rows.push(Vec::new());
            used = 0;
        }
    }
    rows
}

/// Row holding char index `idx`, or the last row when `idx` is past the end.
fn row_of(rows: &[Vec<(usize, char)>], idx: usize) -> usize {
    rows.iter()
        .position(|row| row.iter().any(|(i, _)| *i == idx))
        .unwrap_or(rows.len().saturating_sub(1))
}

fn visible_char(c: char) -> String {
    match c {
        '\n' => "↵".to_string(),
        '\t' => " ".to_string(),
        c => c.to_string(),
    }
}

fn max_errors_label(max_errors: usize, unlimited: bool) -> String {
    if unlimited {
        "∞".to_string()
    } else {
        max_errors.to_string()
    }
}

impl App {
    fn pane_block(&self, title: &str, focused: bool) -> Block<'static> {
        let style = if focused {
            Style::default().fg(Color::Yellow)
        } else {
            Style::default()
        };
        Block::default()
            .borders(Borders::ALL)
            .border_style(style)
            .title(format!(" {title} "))
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let session = self.session();
        let settings = session.settings();
        let status_style = match session.status() {
            Status::Idle => Style::default().add_modifier(Modifier::DIM),
            Status::Running => Style::default().fg(Color::Green).add_modifier(Modifier::BOLD),
            Status::Stopped => Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD),
        };
        let dim = Style::default().add_modifier(Modifier::DIM);

        let title = Line::from(vec![
            Span::styled(
                "Typing Simulator",
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("  "),
            Span::styled(format!("[{}]", session.status()), status_style),
        ]);
        let controls = Line::from(vec![
            Span::raw(format!(
                "Max errors: {} ",
                max_errors_label(settings.max_errors, settings.unlimited_errors())
            )),
            Span::styled("(m)", dim),
            Span::raw(format!("  Height: {} ", settings.text_height)),
            Span::styled("(h)", dim),
            Span::raw(format!("  Alphabet: {} ", settings.alphabet)),
            Span::styled("(c)", dim),
            Span::raw(format!("  Layout: {} ", settings.orientation)),
            Span::styled("(v)", dim),
        ]);
        Paragraph::new(vec![title, controls]).render(area, buf);
    }

    fn render_stats(&self, snapshot: &Snapshot, area: Rect, buf: &mut Buffer) {
        let block = Block::default().borders(Borders::ALL).title(" Statistics ");
        let inner = block.inner(area);
        block.render(area, buf);

        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(10), Constraint::Length(56)].as_ref())
            .split(inner);

        let progress = snapshot.stats.display_progress();
        Gauge::default()
            .gauge_style(Style::default().fg(Color::Cyan))
            .percent(progress as u16)
            .label(format!("Progress {progress}%"))
            .render(chunks[0], buf);

        let label = Style::default().add_modifier(Modifier::DIM);
        let unlimited = self.session().settings().unlimited_errors();
        let errors_style = if snapshot.errors >= snapshot.max_errors {
            Style::default().fg(Color::Red).add_modifier(Modifier::BOLD)
        } else {
            Style::default()
        };
        let numbers = Line::from(vec![
            Span::styled(" Time ", label),
            Span::raw(format_clock(snapshot.elapsed_secs)),
            Span::styled("  WPM ", label),
            Span::raw(snapshot.stats.wpm.to_string()),
            Span::styled("  Accuracy ", label),
            Span::raw(format!("{}%", snapshot.stats.accuracy)),
            Span::styled("  Errors ", label),
            Span::styled(
                format!(
                    "{} / {}",
                    snapshot.errors,
                    max_errors_label(snapshot.max_errors, unlimited)
                ),
                errors_style,
            ),
            Span::styled("  Chars ", label),
            Span::raw(snapshot.stats.total_typed.to_string()),
        ]);
        Paragraph::new(numbers).render(chunks[1], buf);
    }

    fn source_lines(&self, width: u16, scroll: usize, height: usize) -> Vec<Line<'static>> {
        let source = self.session().source_text();
        if source.is_empty() && self.focus() != Focus::SourceEditor {
            return vec![Line::from(Span::styled(
                "Enter the text to practice typing... (e)",
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            ))];
        }
        char_rows(source, width)
            .into_iter()
            .skip(scroll)
            .take(height)
            .map(|row| {
                Line::from(
                    row.into_iter()
                        .map(|(_, c)| Span::raw(visible_char(c)))
                        .collect::<Vec<_>>(),
                )
            })
            .collect()
    }

    fn typing_lines(&self, width: u16, scroll: usize, height: usize) -> Vec<Line<'static>> {
        let session = self.session();
        if session.status() == Status::Idle {
            return vec![Line::from(Span::styled(
                "Press Enter to begin typing...",
                Style::default().add_modifier(Modifier::DIM | Modifier::ITALIC),
            ))];
        }

        let bold = Style::default().add_modifier(Modifier::BOLD);
        let green = bold.fg(Color::Green);
        let red = bold.fg(Color::Red).add_modifier(Modifier::UNDERLINED);
        let pending = Style::default().add_modifier(Modifier::DIM);
        let cursor = pending.add_modifier(Modifier::UNDERLINED | Modifier::BOLD);

        let typed: Vec<char> = session.typed_text().chars().collect();
        let running = session.is_running();
        char_rows(session.source_text(), width)
            .into_iter()
            .skip(scroll)
            .take(height)
            .map(|row| {
                let spans = row
                    .into_iter()
                    .map(|(idx, expected)| match typed.get(idx) {
                        Some(actual) if *actual == expected => {
                            Span::styled(visible_char(expected), green)
                        }
                        Some(_) if expected == ' ' => Span::styled("·", red),
                        Some(_) => Span::styled(visible_char(expected), red),
                        None if running && idx == typed.len() => {
                            Span::styled(visible_char(expected), cursor)
                        }
                        None => Span::styled(visible_char(expected), pending),
                    })
                    .collect::<Vec<_>>();
                Line::from(spans)
            })
            .collect()
    }

    /// First visible row so the caret stays on screen. Both panes share it.
    fn pane_scroll(&self, width: u16, height: usize) -> usize {
        let session = self.session();
        let caret = match self.focus() {
            Focus::SourceEditor => session.source_text().chars().count(),
            _ => session.typed_text().chars().count(),
        };
        let rows = char_rows(session.source_text(), width);
        row_of(&rows, caret).saturating_sub(height.saturating_sub(1))
    }

    fn render_panes(&self, area: Rect, buf: &mut Buffer) {
        let settings = self.session().settings();
        let pane_height = settings.text_height.saturating_add(2);
        let direction = match settings.orientation {
            Orientation::Horizontal => Direction::Horizontal,
            Orientation::Vertical => Direction::Vertical,
        };
        let constraints = match settings.orientation {
            Orientation::Horizontal => [Constraint::Percentage(50), Constraint::Percentage(50)],
            Orientation::Vertical => [Constraint::Length(pane_height), Constraint::Length(pane_height)],
        };
        let chunks = Layout::default()
            .direction(direction)
            .constraints(constraints.as_ref())
            .split(area);

        let source_block = self.pane_block("Source Text", self.focus() == Focus::SourceEditor);
        let typing_block = self.pane_block("Type Here", self.session().is_running());
        let source_inner = source_block.inner(chunks[0]);
        let typing_inner = typing_block.inner(chunks[1]);
        source_block.render(chunks[0], buf);
        typing_block.render(chunks[1], buf);

        let height = typing_inner.height as usize;
        let scroll = self.pane_scroll(typing_inner.width, height);
        Paragraph::new(self.source_lines(source_inner.width, scroll, source_inner.height as usize))
            .render(source_inner, buf);
        Paragraph::new(self.typing_lines(typing_inner.width, scroll, height))
            .render(typing_inner, buf);
    }

    fn legend(&self) -> &'static str {
        match self.focus() {
            Focus::Typing if self.session().is_running() => "(esc) stop",
            Focus::Typing => "(esc) back",
            Focus::SourceEditor => "editing source text / (esc) done",
            Focus::Search => "(enter) keep filter / (esc) clear",
            Focus::Main => {
                "(enter) start / (e)dit / (s)ave / (/) search / (o)pen / (d)elete / (r)eset / (q)uit"
            }
        }
    }
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let snapshot = self.snapshot();

        let columns = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(40), Constraint::Length(SIDEBAR_WIDTH)].as_ref())
            .split(area);

        let settings = self.session().settings();
        let panes_height = match settings.orientation {
            Orientation::Horizontal => settings.text_height.saturating_add(2),
            Orientation::Vertical => settings.text_height.saturating_add(2).saturating_mul(2),
        };
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .horizontal_margin(HORIZONTAL_MARGIN)
            .constraints(
                [
                    Constraint::Length(2),               // title and controls
                    Constraint::Length(3),               // statistics
                    Constraint::Length(panes_height),    // source and typing
                    Constraint::Length(KEYBOARD_HEIGHT), // keyboard
                    Constraint::Length(1),               // notice
                    Constraint::Length(1),               // legend
                    Constraint::Min(0),
                ]
                .as_ref(),
            )
            .split(columns[0]);

        self.render_header(chunks[0], buf);
        self.render_stats(&snapshot, chunks[1], buf);
        self.render_panes(chunks[2], buf);

        KeyboardView {
            alphabet: settings.alphabet,
            pressed: snapshot.pressed_key,
        }
        .render(chunks[3], buf);

        if let Some(notice) = self.notice() {
            let color = match notice.kind {
                NoticeKind::Success => Color::Green,
                NoticeKind::Error => Color::Red,
            };
            Paragraph::new(Span::styled(
                notice.message.clone(),
                Style::default().fg(color).add_modifier(Modifier::BOLD),
            ))
            .render(chunks[4], buf);
        }

        Paragraph::new(Span::styled(
            self.legend(),
            Style::default().add_modifier(Modifier::ITALIC),
        ))
        .render(chunks[5], buf);

        SidebarView {
            entries: &snapshot.saved_texts,
            total: self.store().len(),
            query: self.search_query(),
            selected: self.selected(),
            searching: self.focus() == Focus::Search,
            enabled: !self.session().is_running(),
        }
        .render(columns[1], buf);
    }
}
