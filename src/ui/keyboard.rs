use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Widget},
};

use crate::finger::{keyboard_rows, Alphabet, Finger, KeyCap};

/// Cells per regular key cap, including the gap to its right neighbour.
const CAP_WIDTH: u16 = 4;
const INDENT_WIDTH: u16 = 2;

/// Five rows of caps, a spacer, the finger legend and the border.
pub const KEYBOARD_HEIGHT: u16 = 9;

pub fn finger_color(finger: Finger) -> Color {
    match finger {
        Finger::LeftPinky | Finger::RightPinky => Color::Rgb(0xEF, 0x44, 0x44),
        Finger::LeftRing | Finger::RightRing => Color::Rgb(0xF5, 0x9E, 0x0B),
        Finger::LeftMiddle | Finger::RightMiddle => Color::Rgb(0xEA, 0xB3, 0x08),
        Finger::LeftIndex | Finger::RightIndex => Color::Rgb(0x22, 0xC5, 0x5E),
        Finger::Thumb => Color::Rgb(0x3B, 0x82, 0xF6),
        Finger::Neutral => Color::Rgb(0x9C, 0xA3, 0xAF),
    }
}

fn cap_style(cap: &KeyCap, pressed: Option<char>) -> Style {
    let color = finger_color(cap.finger());
    if pressed.is_some_and(|key| cap.is_pressed(key)) {
        Style::default()
            .bg(color)
            .fg(Color::Black)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(color)
    }
}

fn cap_span(cap: &KeyCap, pressed: Option<char>) -> Span<'static> {
    let inner = (cap.span * CAP_WIDTH - 1) as usize;
    Span::styled(format!("{:^inner$}", cap.label), cap_style(cap, pressed))
}

/// On-screen keyboard with finger colours and the most recent key lit.
pub struct KeyboardView {
    pub alphabet: Alphabet,
    pub pressed: Option<char>,
}

impl KeyboardView {
    fn lines(&self) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = keyboard_rows(self.alphabet)
            .iter()
            .map(|(indent, caps)| {
                let mut spans = vec![Span::raw(" ".repeat((indent * INDENT_WIDTH) as usize))];
                for cap in caps.iter() {
                    spans.push(cap_span(cap, self.pressed));
                    spans.push(Span::raw(" "));
                }
                Line::from(spans)
            })
            .collect();

        lines.push(Line::default());
        let mut legend = Vec::new();
        for finger in [
            Finger::LeftPinky,
            Finger::LeftRing,
            Finger::LeftMiddle,
            Finger::LeftIndex,
            Finger::Thumb,
        ] {
            let label = match finger {
                Finger::LeftPinky => "pinky".to_string(),
                Finger::LeftRing => "ring".to_string(),
                Finger::LeftMiddle => "middle".to_string(),
                Finger::LeftIndex => "index".to_string(),
                other => other.to_string(),
            };
            legend.push(Span::styled("■ ", Style::default().fg(finger_color(finger))));
            legend.push(Span::raw(format!("{label}  ")));
        }
        lines.push(Line::from(legend));
        lines
    }
}

impl Widget for KeyboardView {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" Keyboard ({}) ", self.alphabet));
        let inner = block.inner(area);
        block.render(area, buf);

        for (i, line) in self.lines().into_iter().enumerate() {
            let y = inner.y + i as u16;
            if y >= inner.bottom() {
                break;
            }
            buf.set_line(inner.x, y, &line, inner.width);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn render(view: KeyboardView) -> Buffer {
        let area = Rect::new(0, 0, 64, KEYBOARD_HEIGHT);
        let mut buf = Buffer::empty(area);
        view.render(area, &mut buf);
        buf
    }

    fn find(buf: &Buffer, symbol: &str) -> Option<(u16, u16)> {
        let area = *buf.area();
        for y in area.top()..area.bottom() {
            for x in area.left()..area.right() {
                if buf[(x, y)].symbol() == symbol {
                    return Some((x, y));
                }
            }
        }
        None
    }

    #[test]
    fn test_caps_use_finger_colors() {
        let buf = render(KeyboardView {
            alphabet: Alphabet::Latin,
            pressed: None,
        });

        let (x, y) = find(&buf, "A").unwrap();
        assert_eq!(buf[(x, y)].fg, finger_color(Finger::LeftPinky));
        let (x, y) = find(&buf, "J").unwrap();
        assert_eq!(buf[(x, y)].fg, finger_color(Finger::RightIndex));
    }

    #[test]
    fn test_pressed_cap_is_filled() {
        let buf = render(KeyboardView {
            alphabet: Alphabet::Latin,
            pressed: Some('F'),
        });

        let (x, y) = find(&buf, "F").unwrap();
        assert_eq!(buf[(x, y)].bg, finger_color(Finger::LeftIndex));
        let (x, y) = find(&buf, "G").unwrap();
        assert_eq!(buf[(x, y)].bg, Color::Reset);
    }

    #[test]
    fn test_shifted_symbol_lights_its_cap() {
        let buf = render(KeyboardView {
            alphabet: Alphabet::Latin,
            pressed: Some('@'),
        });

        let (x, y) = find(&buf, "@").unwrap();
        assert_eq!(buf[(x, y)].bg, finger_color(Finger::LeftRing));
    }

    #[test]
    fn test_cyrillic_layout() {
        let buf = render(KeyboardView {
            alphabet: Alphabet::Cyrillic,
            pressed: Some('ж'),
        });

        assert!(find(&buf, "Й").is_some());
        let (x, y) = find(&buf, "Ж").unwrap();
        assert_eq!(buf[(x, y)].bg, finger_color(Finger::RightPinky));
    }

    #[test]
    fn test_unknown_finger_is_gray() {
        assert_eq!(finger_color(Finger::Neutral), Color::Rgb(0x9C, 0xA3, 0xAF));
    }
}
