use ratatui::{
    buffer::Buffer,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Cell, Clear, Paragraph, Row, Table, Widget, Wrap},
};

use crate::app::{App, ProfileView};
use crate::profile::{EditField, ProfileEditor, RecentTests, TestResult};
use crate::ui::{bold, centered, dim, italic, legend, title_line};

const RESULT_WIDTHS: [Constraint; 5] = [
    Constraint::Length(17),
    Constraint::Min(10),
    Constraint::Length(5),
    Constraint::Length(5),
    Constraint::Length(6),
];

fn rounded(title: &str) -> Block<'_> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(Color::Blue))
        .title(Span::styled(title, bold()))
}

/// Pure presenter for one recent-test row
pub fn present_result(result: &TestResult) -> Row<'static> {
    Row::new(vec![
        Cell::from(result.date.format("%Y-%m-%d %H:%M").to_string()),
        Cell::from(result.mode.clone()),
        Cell::from(result.wpm.to_string()).style(bold().fg(Color::Green)),
        Cell::from(format!("{}%", result.accuracy)),
        Cell::from(result.words.to_string()),
    ])
}

fn render_header(view: &ProfileView, area: Rect, buf: &mut Buffer) {
    let block = rounded("Profile");
    let inner = block.inner(area);
    block.render(area, buf);

    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(8), Constraint::Min(10)])
        .split(inner);

    let profile = &view.profile;
    let avatar = Style::default()
        .fg(Color::Black)
        .bg(Color::LightBlue)
        .add_modifier(Modifier::BOLD);
    Paragraph::new(vec![
        Line::default(),
        Line::from(Span::styled(format!("  {}  ", profile.initials()), avatar)),
    ])
    .render(cols[0], buf);

    let visibility = if profile.public { "public" } else { "private" };
    let mut lines = vec![
        Line::from(vec![
            Span::styled(profile.name.as_str(), bold()),
            Span::raw("  "),
            Span::styled(format!("@{}", profile.username), dim()),
            Span::raw("  "),
            Span::styled(visibility, italic()),
        ]),
        Line::from(profile.bio.as_str()),
        Line::from(Span::styled(
            profile.joined_label(chrono::Local::now()),
            dim(),
        )),
    ];
    if let Some(path) = &profile.avatar_path {
        lines.push(Line::from(Span::styled(
            format!("avatar: {}", path.display()),
            dim(),
        )));
    }
    Paragraph::new(lines)
        .wrap(Wrap { trim: true })
        .render(cols[1], buf);
}

fn render_stats(view: &ProfileView, area: Rect, buf: &mut Buffer) {
    let stats = &view.stats;
    let tiles = [
        ("Tests", stats.total_tests.to_string()),
        ("Best WPM", stats.best_wpm.to_string()),
        ("Accuracy", format!("{}%", stats.avg_accuracy)),
        ("Words", stats.total_words.to_string()),
        ("Streak", format!("{}d", stats.longest_streak)),
    ];
    let cols = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 5); 5])
        .split(area);
    for ((label, value), col) in tiles.iter().zip(cols.iter()) {
        Paragraph::new(vec![
            Line::from(Span::styled(value.as_str(), bold().fg(Color::Cyan))),
            Line::from(Span::styled(*label, dim())),
        ])
        .alignment(Alignment::Center)
        .block(Block::default().borders(Borders::ALL).border_type(BorderType::Rounded))
        .render(*col, buf);
    }
}

fn render_recent(view: &ProfileView, area: Rect, buf: &mut Buffer) {
    let title = if view.showing_samples {
        "Recent tests (sample)"
    } else {
        "Recent tests"
    };
    let block = rounded(title);
    let inner = block.inner(area);
    block.render(area, buf);

    let rows_area = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(1)])
        .split(inner);

    let header = Row::new(vec!["Date", "Mode", "WPM", "Acc", "Words"])
        .style(dim().add_modifier(Modifier::UNDERLINED));
    let rows: Vec<Row> = view.recent.rows(&view.results).iter().map(present_result).collect();
    Table::new(rows, RESULT_WIDTHS)
        .header(header)
        .render(rows_area[0], buf);

    let pages = RecentTests::total_pages(&view.results);
    Paragraph::new(Line::from(vec![
        Span::styled(view.recent.showing_label(&view.results), dim()),
        Span::raw("   "),
        Span::styled(format!("‹ {}/{} ›", view.recent.page + 1, pages), dim()),
    ]))
    .alignment(Alignment::Right)
    .render(rows_area[1], buf);
}

fn render_editor(editor: &ProfileEditor, area: Rect, buf: &mut Buffer) {
    let modal = centered(area, 60, 14);
    Clear.render(modal, buf);
    let block = rounded("Edit profile");
    let inner = block.inner(modal);
    block.render(modal, buf);

    let mut lines = Vec::new();
    for field in EditField::ALL {
        let selected = field == editor.field;
        let label_style = if selected { bold().fg(Color::Yellow) } else { dim() };
        let mut value = vec![Span::raw(editor.field_value(field).to_string())];
        if selected {
            value.push(Span::styled("▏", Style::default().fg(Color::Yellow)));
        }
        lines.push(Line::from(Span::styled(field.to_string(), label_style)));
        lines.push(Line::from(value));
    }
    lines.push(Line::default());
    if let Some(error) = &editor.error {
        lines.push(Line::from(Span::styled(error.as_str(), Style::default().fg(Color::Red))));
    }
    lines.push(Line::from(Span::styled(
        "(tab) next field · (enter) save · (del) clear avatar · (esc) cancel",
        italic(),
    )));
    Paragraph::new(lines)
        .wrap(Wrap { trim: false })
        .render(inner, buf);
}

pub fn render_profile(app: &App, area: Rect, buf: &mut Buffer) {
    let Some(view) = app.profile.as_ref() else {
        return;
    };

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(2)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(6),
            Constraint::Length(4),
            Constraint::Min(5),
            Constraint::Length(1),
        ])
        .split(area);

    let who = app
        .user
        .as_ref()
        .map_or(String::new(), |u| format!("signed in as {}", u.display_name()));
    Paragraph::new(title_line("typeslide", who)).render(chunks[0], buf);
    render_header(view, chunks[1], buf);
    render_stats(view, chunks[2], buf);
    render_recent(view, chunks[3], buf);
    legend("(e)dit · ←/→ recent tests · (x) export · (esc) back").render(chunks[4], buf);

    if let Some(editor) = &view.editor {
        render_editor(editor, area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::config::Config;
    use crate::storage::MemoryStore;
    use crate::ui::buffer_text;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use std::time::Instant;

    fn profile_app() -> App {
        let mut app = App::new(Config::default(), Box::new(MemoryStore::new()), Instant::now());
        app.continue_as_guest();
        app.navigate(AppState::Profile);
        app
    }

    fn render(app: &App) -> String {
        let area = Rect::new(0, 0, 90, 30);
        let mut buf = Buffer::empty(area);
        render_profile(app, area, &mut buf);
        buffer_text(&buf)
    }

    #[test]
    fn shows_profile_stats_and_sample_rows() {
        let app = profile_app();
        let text = render(&app);
        assert!(text.contains("Pizza"));
        assert!(text.contains("@pizza_scores"));
        assert!(text.contains("PI"));
        assert!(text.contains("Best WPM"));
        assert!(text.contains("88"));
        assert!(text.contains("Recent tests (sample)"));
        assert!(text.contains("Time (60s)"));
        assert!(text.contains("Showing 2 of 2"));
    }

    #[test]
    fn editor_overlay_shows_draft_and_errors() {
        let mut app = profile_app();
        let now = Instant::now();
        app.on_key(KeyEvent::new(KeyCode::Char('e'), KeyModifiers::NONE), now);
        let text = render(&app);
        assert!(text.contains("Edit profile"));
        assert!(text.contains("Display name"));

        if let Some(editor) = app.profile.as_mut().and_then(|v| v.editor.as_mut()) {
            editor.error = Some("avatar too large".into());
        }
        assert!(render(&app).contains("avatar too large"));
    }

    #[test]
    fn present_result_formats_accuracy() {
        let now = chrono::Local::now();
        let row = present_result(&TestResult {
            date: now,
            mode: "Words (25)".into(),
            wpm: 70,
            accuracy: 93,
            words: 25,
        });
        let area = Rect::new(0, 0, 60, 1);
        let mut buf = Buffer::empty(area);
        Table::new(vec![row], RESULT_WIDTHS).render(area, &mut buf);
        let text = buffer_text(&buf);
        assert!(text.contains("93%"));
        assert!(text.contains("Words (25)"));
    }
}
