use std::time::Duration;

use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget, Wrap},
};

use crate::app::{App, AuthOption};
use crate::ui::{bold, centered, dim, italic, legend, put_spans, rgb};

pub const LANDING_TITLE: &str = "Scores .";

const GRADIENT: [(u8, u8, u8); 4] = [
    (0x29, 0x8e, 0xaa),
    (0xfd, 0x86, 0x1f),
    (0xa6, 0x45, 0x3f),
    (0x22, 0x23, 0x29),
];

const REVEAL_DELAY: Duration = Duration::from_millis(500);
const REVEAL: Duration = Duration::from_millis(1500);
const SWEEP_DELAY: Duration = Duration::from_millis(1200);
const SWEEP: Duration = Duration::from_millis(3500);
const LOADING_DELAY: Duration = Duration::from_millis(4500);

fn progress(elapsed: Duration, delay: Duration, span: Duration) -> f64 {
    let t = elapsed.saturating_sub(delay).as_secs_f64() / span.as_secs_f64();
    t.clamp(0.0, 1.0)
}

fn lerp(a: u8, b: u8, t: f64) -> u8 {
    (a as f64 + (b as f64 - a as f64) * t).round() as u8
}

/// Colour at `t` along the title gradient; wraps so the sweep can scroll it
pub fn gradient_at(t: f64) -> Color {
    let t = t.rem_euclid(1.0) * (GRADIENT.len() - 1) as f64;
    let i = (t.floor() as usize).min(GRADIENT.len() - 2);
    let f = t - i as f64;
    let (a, b) = (GRADIENT[i], GRADIENT[i + 1]);
    rgb((lerp(a.0, b.0, f), lerp(a.1, b.1, f), lerp(a.2, b.2, f)))
}

/// How many title characters are showing `elapsed` into the landing screen
pub fn revealed_chars(elapsed: Duration) -> usize {
    let n = LANDING_TITLE.chars().count();
    let eased = 1.0 - (1.0 - progress(elapsed, REVEAL_DELAY, REVEAL)).powi(3);
    (eased * n as f64).round() as usize
}

pub fn render_landing(app: &App, area: Rect, buf: &mut Buffer) {
    let elapsed = app.now.saturating_duration_since(app.landing_started);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Fill(1),
            Constraint::Length(1),
        ])
        .split(area);

    let shown = revealed_chars(elapsed);
    let sweep = progress(elapsed, SWEEP_DELAY, SWEEP);
    let n = LANDING_TITLE.chars().count().max(1);
    let spans: Vec<Span> = LANDING_TITLE
        .chars()
        .take(shown)
        .enumerate()
        .map(|(i, c)| {
            let t = i as f64 / n as f64 / 2.0 - sweep;
            Span::styled(c.to_string(), bold().fg(gradient_at(t)))
        })
        .collect();
    let title_width = n as i32;
    let x = (chunks[1].width as i32 - title_width) / 2;
    put_spans(buf, chunks[1], x, chunks[1].y, &spans);

    if elapsed >= LOADING_DELAY {
        // three pulsing dots, one lit per 200ms
        let lit = (elapsed.as_millis() / 200 % 3) as usize;
        let dots: String = (0..3).map(|i| if i == lit { '●' } else { '·' }).collect();
        Paragraph::new(Line::from(vec![
            Span::styled(dots, Style::default().fg(Color::Yellow)),
            Span::styled("  LOADING EXPERIENCE", dim()),
        ]))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);
    }

    legend("press any key to continue").render(chunks[5], buf);
}

fn option_line(label: &str, selected: bool) -> Line<'_> {
    let style = if selected {
        bold().fg(Color::Black).bg(Color::Cyan)
    } else {
        Style::default().fg(Color::Cyan)
    };
    let marker = if selected { "▸ " } else { "  " };
    Line::from(Span::styled(format!("{marker}{label}"), style)).alignment(Alignment::Center)
}

pub fn render_auth(app: &App, area: Rect, buf: &mut Buffer) {
    let card = centered(area, 48, 13);
    let block = Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Cyan));
    let inner = block.inner(card);
    block.render(card, buf);

    let lines = vec![
        Line::from(Span::styled("Welcome", bold())).alignment(Alignment::Center),
        Line::from(Span::styled(
            "Sign in with Google or continue as guest",
            dim(),
        ))
        .alignment(Alignment::Center),
        Line::default(),
        option_line("Continue with Google", app.auth_option == AuthOption::Google),
        Line::default(),
        option_line("Continue as Guest", app.auth_option == AuthOption::Guest),
        Line::default(),
        Line::from(Span::styled("By continuing you accept the app terms.", italic()))
            .alignment(Alignment::Center),
        Line::default(),
        Line::from(Span::styled(
            "↑/↓ choose · enter select · (r)efresh sign-in · (q)uit",
            italic(),
        ))
        .alignment(Alignment::Center),
    ];
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(inner, buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::config::Config;
    use crate::storage::MemoryStore;
    use crate::ui::buffer_text;
    use std::time::Instant;

    #[test]
    fn title_reveals_over_time() {
        assert_eq!(revealed_chars(Duration::ZERO), 0);
        assert_eq!(revealed_chars(Duration::from_millis(400)), 0);
        let mid = revealed_chars(Duration::from_millis(1000));
        assert!(mid > 0 && mid < LANDING_TITLE.len());
        assert_eq!(revealed_chars(Duration::from_secs(3)), LANDING_TITLE.len());
    }

    #[test]
    fn gradient_endpoints_match_stops() {
        assert_eq!(gradient_at(0.0), Color::Rgb(0x29, 0x8e, 0xaa));
        assert_eq!(gradient_at(0.999_999), Color::Rgb(0x22, 0x23, 0x29));
        assert_eq!(gradient_at(-0.5), gradient_at(0.5));
    }

    #[test]
    fn landing_shows_title_and_loading_hint_late() {
        let start = Instant::now();
        let mut app = App::new(Config::default(), Box::new(MemoryStore::new()), start);
        let area = Rect::new(0, 0, 60, 12);

        app.now = start + Duration::from_secs(1);
        let mut buf = Buffer::empty(area);
        render_landing(&app, area, &mut buf);
        assert!(!buffer_text(&buf).contains("LOADING"));

        app.now = start + Duration::from_secs(5);
        let mut buf = Buffer::empty(area);
        render_landing(&app, area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("Scores ."));
        assert!(text.contains("LOADING EXPERIENCE"));
    }

    #[test]
    fn auth_card_marks_selected_option() {
        let mut app = App::new(Config::default(), Box::new(MemoryStore::new()), Instant::now());
        app.state = AppState::Auth;
        let area = Rect::new(0, 0, 80, 20);
        let mut buf = Buffer::empty(area);
        render_auth(&app, area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("▸ Continue as Guest"));
        assert!(text.contains("  Continue with Google"));

        app.auth_option = AuthOption::Google;
        let mut buf = Buffer::empty(area);
        render_auth(&app, area, &mut buf);
        assert!(buffer_text(&buf).contains("▸ Continue with Google"));
    }
}
