pub mod dashboard;
pub mod keyboard;
pub mod landing;
pub mod profile;
pub mod screen;
pub mod settings;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Paragraph, Widget},
};
use unicode_width::UnicodeWidthChar;

use crate::app::App;

const VERTICAL_MARGIN: u16 = 1;

pub fn bold() -> Style {
    Style::default().add_modifier(Modifier::BOLD)
}

pub fn dim() -> Style {
    Style::default().add_modifier(Modifier::DIM)
}

pub fn italic() -> Style {
    Style::default().add_modifier(Modifier::ITALIC)
}

pub fn rgb((r, g, b): (u8, u8, u8)) -> Color {
    Color::Rgb(r, g, b)
}

impl Widget for &App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .vertical_margin(VERTICAL_MARGIN)
            .constraints([Constraint::Min(1), Constraint::Length(1)])
            .split(area);

        screen::current_screen(&self.state).render(self, chunks[0], buf);

        if let Some(status) = &self.status {
            Paragraph::new(Span::styled(
                status.text.as_str(),
                Style::default().fg(Color::Cyan).add_modifier(Modifier::ITALIC),
            ))
            .alignment(Alignment::Center)
            .render(chunks[1], buf);
        }
    }
}

/// Legend line in the same italic register on every screen
pub fn legend(text: &str) -> Paragraph<'_> {
    Paragraph::new(Span::styled(text, italic())).alignment(Alignment::Center)
}

/// A `width` x `height` rect centred in `area`, shrunk to fit
pub fn centered(area: Rect, width: u16, height: u16) -> Rect {
    let w = width.min(area.width);
    let h = height.min(area.height);
    Rect {
        x: area.x + (area.width - w) / 2,
        y: area.y + (area.height - h) / 2,
        width: w,
        height: h,
    }
}

/// Write styled spans starting at column `x` (relative to `clip.x`, may be
/// negative) on row `y`, dropping any cell outside `clip`
pub fn put_spans(buf: &mut Buffer, clip: Rect, x: i32, y: u16, spans: &[Span]) {
    if y < clip.y || y >= clip.bottom() {
        return;
    }
    let mut col = x;
    for span in spans {
        for c in span.content.chars() {
            let w = c.width().unwrap_or(0) as i32;
            if w == 0 {
                continue;
            }
            if col >= 0 && col + w <= clip.width as i32 {
                if let Some(cell) = buf.cell_mut((clip.x + col as u16, y)) {
                    cell.set_char(c);
                    cell.set_style(span.style);
                }
            }
            col += w;
        }
    }
}

/// Text of a buffer, row by row; used by render tests
pub fn buffer_text(buf: &Buffer) -> String {
    let area = buf.area;
    (area.y..area.bottom())
        .map(|y| {
            (area.x..area.right())
                .map(|x| buf[(x, y)].symbol())
                .collect::<String>()
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn title_line<'a>(title: &'a str, right: String) -> Line<'a> {
    Line::from(vec![
        Span::styled(title, bold().fg(Color::Magenta)),
        Span::raw("  "),
        Span::styled(right, dim()),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{App, AppState};
    use crate::config::Config;
    use crate::storage::MemoryStore;
    use std::time::Instant;

    #[test]
    fn centered_rect_fits_inside() {
        let area = Rect::new(0, 0, 80, 24);
        let r = centered(area, 40, 10);
        assert_eq!(r, Rect::new(20, 7, 40, 10));
        let r = centered(Rect::new(0, 0, 10, 5), 40, 10);
        assert_eq!(r, Rect::new(0, 0, 10, 5));
    }

    #[test]
    fn put_spans_clips_both_edges() {
        let area = Rect::new(0, 0, 5, 1);
        let mut buf = Buffer::empty(area);
        put_spans(&mut buf, area, -2, 0, &[Span::raw("abcdefgh")]);
        assert_eq!(buffer_text(&buf), "cdefg");
    }

    #[test]
    fn put_spans_skips_wide_glyph_at_edge() {
        let area = Rect::new(0, 0, 3, 1);
        let mut buf = Buffer::empty(area);
        put_spans(&mut buf, area, 0, 0, &[Span::raw("a日本")]);
        assert!(buffer_text(&buf).starts_with("a日"));
    }

    #[test]
    fn status_line_renders_at_bottom() {
        let mut app = App::new(Config::default(), Box::new(MemoryStore::new()), Instant::now());
        app.state = AppState::Auth;
        app.set_status("Exported to /tmp/x.json");
        let area = Rect::new(0, 0, 60, 20);
        let mut buf = Buffer::empty(area);
        (&app).render(area, &mut buf);
        let text = buffer_text(&buf);
        let last_rows: Vec<&str> = text.lines().rev().take(2).collect();
        assert!(last_rows.iter().any(|row| row.contains("Exported to /tmp/x.json")));
    }

    #[test]
    fn every_screen_renders_in_tiny_areas() {
        let mut app = App::new(Config::default(), Box::new(MemoryStore::new()), Instant::now());
        app.continue_as_guest();
        for state in [
            AppState::Landing,
            AppState::Auth,
            AppState::Dashboard,
            AppState::Typing,
            AppState::Profile,
            AppState::Settings,
        ] {
            app.navigate(state);
            for (w, h) in [(1, 1), (10, 3), (30, 8), (120, 40)] {
                let area = Rect::new(0, 0, w, h);
                let mut buf = Buffer::empty(area);
                (&app).render(area, &mut buf);
            }
        }
    }
}
