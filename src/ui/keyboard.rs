use std::time::Instant;

use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::Span,
};
use unicode_width::UnicodeWidthStr;

use crate::keyboard::{PressedKeys, KEYBOARD_LAYOUT};
use crate::ui::put_spans;

const SPACE_WIDTH: usize = 17;

/// One rendered key cap, e.g. "[q]" or "[     space     ]"
fn cap(label: &str) -> String {
    if label == "Space" {
        let pad = SPACE_WIDTH.saturating_sub(label.width());
        let left = pad / 2;
        format!("[{}{}{}]", " ".repeat(left), label.to_lowercase(), " ".repeat(pad - left))
    } else {
        format!("[{label}]")
    }
}

pub fn row_width(row: &[&str]) -> usize {
    let caps: usize = row.iter().map(|k| cap(k).width()).sum();
    caps + row.len().saturating_sub(1)
}

/// Draw the on-screen keyboard, lighting keys pressed in the last moment
pub fn render_keyboard(keys: &PressedKeys, now: Instant, area: Rect, buf: &mut Buffer) {
    let idle = Style::default().fg(Color::DarkGray);
    let lit = Style::default()
        .fg(Color::Black)
        .bg(Color::Yellow)
        .add_modifier(Modifier::BOLD);

    for (r, row) in KEYBOARD_LAYOUT.iter().enumerate() {
        let y = area.y + r as u16;
        if y >= area.bottom() {
            break;
        }
        let mut spans = Vec::new();
        for (i, label) in row.iter().enumerate() {
            if i > 0 {
                spans.push(Span::raw(" "));
            }
            let style = if keys.is_pressed(label, now) { lit } else { idle };
            spans.push(Span::styled(cap(label), style));
        }
        // stagger like a physical board
        let x = (area.width as i32 - row_width(row) as i32) / 2 + r.min(3) as i32;
        put_spans(buf, area, x, y, &spans);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ui::buffer_text;

    #[test]
    fn caps_and_widths() {
        assert_eq!(cap("q"), "[q]");
        assert_eq!(cap("Space").width(), SPACE_WIDTH + 2);
        assert!(cap("Space").contains("space"));
        assert_eq!(row_width(&["1", "2"]), 7);
    }

    #[test]
    fn pressed_key_is_highlighted() {
        let now = Instant::now();
        let mut keys = PressedKeys::default();
        keys.press('a', now);

        let area = Rect::new(0, 0, 60, 5);
        let mut buf = Buffer::empty(area);
        render_keyboard(&keys, now, area, &mut buf);

        let text = buffer_text(&buf);
        let row = text.lines().nth(2).unwrap();
        let col = row.find("[a]").unwrap() as u16;
        assert_eq!(buf[(col + 1, 2)].bg, Color::Yellow);
        let col_s = row.find("[s]").unwrap() as u16;
        assert_eq!(buf[(col_s + 1, 2)].bg, Color::Reset);
    }
}
