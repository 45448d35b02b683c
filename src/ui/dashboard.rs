use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::Style,
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Circle, Context},
        Paragraph, Widget,
    },
};

use crate::app::{App, DashboardOption, Palette};
use crate::ui::{bold, dim, legend, rgb, title_line};

fn describe(option: DashboardOption) -> &'static str {
    match option {
        DashboardOption::Typing => "Take a timed or word-count typing test",
        DashboardOption::Stats => "Your best runs, streaks and recent tests",
        DashboardOption::Profile => "Name, bio and avatar",
        DashboardOption::Settings => "Sounds, metrics and words per test",
        DashboardOption::Practice => "Warm up with a fresh word list",
    }
}

/// Shaded disc: dark rim, body colour, and a highlight up and to the left
fn sphere(palette: &Palette) -> impl Fn(&mut Context) + '_ {
    move |ctx: &mut Context| {
        for step in 0..12 {
            let r = 0.95 - step as f64 * 0.07;
            let color = match step {
                0..=2 => rgb(palette.c2),
                3..=9 => rgb(palette.c1),
                _ => rgb(palette.c3),
            };
            let shift = step as f64 * 0.025;
            ctx.draw(&Circle {
                x: -shift,
                y: shift,
                radius: r,
                color,
            });
        }
    }
}

pub fn render_dashboard(app: &App, area: Rect, buf: &mut Buffer) {
    let active = app.dashboard_option();
    let palette = active.palette();

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(2)
        .constraints([
            Constraint::Length(1),
            Constraint::Min(3),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(1),
        ])
        .split(area);

    let who = app
        .user
        .as_ref()
        .map_or("signed out".to_string(), |u| format!("Welcome, {}", u.display_name()));
    Paragraph::new(title_line("typeslide", who)).render(chunks[0], buf);

    // keep the sphere roughly round: cells are about twice as tall as wide
    let side = chunks[1].height.min(chunks[1].width / 2);
    let sphere_area = Rect {
        x: chunks[1].x + (chunks[1].width.saturating_sub(side * 2)) / 2,
        y: chunks[1].y,
        width: side * 2,
        height: side,
    };
    Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([-1.0, 1.0])
        .y_bounds([-1.0, 1.0])
        .paint(sphere(&palette))
        .render(sphere_area, buf);

    Paragraph::new(Span::styled(
        active.to_string(),
        bold().fg(rgb(palette.c1)),
    ))
    .alignment(Alignment::Center)
    .render(chunks[2], buf);

    Paragraph::new(Span::styled(describe(active), dim()))
        .alignment(Alignment::Center)
        .render(chunks[3], buf);

    let mut tabs = Vec::new();
    for (i, option) in DashboardOption::ALL.iter().enumerate() {
        if i > 0 {
            tabs.push(Span::styled(" · ", dim()));
        }
        let style = if *option == active {
            bold().fg(rgb(option.palette().c3))
        } else {
            Style::default().fg(rgb(option.palette().c1))
        };
        tabs.push(Span::styled(option.to_string(), style));
    }
    Paragraph::new(Line::from(tabs))
        .alignment(Alignment::Center)
        .render(chunks[5], buf);

    legend("←/→ choose · enter open · (q)uit").render(chunks[6], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::config::Config;
    use crate::storage::MemoryStore;
    use crate::ui::buffer_text;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::style::Color;
    use std::time::Instant;

    fn dashboard_app() -> App {
        let mut app = App::new(Config::default(), Box::new(MemoryStore::new()), Instant::now());
        app.continue_as_guest();
        app
    }

    #[test]
    fn shows_active_option_and_greeting() {
        let app = dashboard_app();
        assert_eq!(app.state, AppState::Dashboard);
        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        render_dashboard(&app, area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("Welcome, Guest"));
        assert!(text.contains("Take a timed or word-count typing test"));
        assert!(text.contains("Typing · Stats · Profile · Settings · Practice"));
    }

    #[test]
    fn active_tab_uses_accent_colour() {
        let mut app = dashboard_app();
        app.on_key(KeyEvent::new(KeyCode::Left, KeyModifiers::NONE), Instant::now());
        assert_eq!(app.dashboard_option(), DashboardOption::Practice);

        let area = Rect::new(0, 0, 80, 24);
        let mut buf = Buffer::empty(area);
        render_dashboard(&app, area, &mut buf);
        let text = buffer_text(&buf);
        let row = text
            .lines()
            .position(|l| l.contains("Typing · Stats"))
            .unwrap();
        let line = text.lines().nth(row).unwrap();
        let col = line.find("Practice").unwrap();
        let col = line[..col].chars().count() as u16;
        assert_eq!(buf[(col, row as u16)].fg, Color::Rgb(0xfe, 0xe0, 0x8b));
    }
}
