use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Paragraph, Widget},
};

use crate::app::App;
use crate::settings::{Settings, SettingsField, MAX_WORDS_PER_TEST, MIN_WORDS_PER_TEST};
use crate::ui::{bold, dim, legend, title_line};

fn on_off(value: bool) -> &'static str {
    if value {
        "ON"
    } else {
        "OFF"
    }
}

pub fn field_value(settings: &Settings, field: SettingsField) -> String {
    match field {
        SettingsField::KeySounds => on_off(settings.key_sounds).to_string(),
        SettingsField::ShowMetrics => on_off(settings.show_metrics).to_string(),
        SettingsField::WordsPerTest => format!(
            "‹ {} ›  ({MIN_WORDS_PER_TEST}-{MAX_WORDS_PER_TEST})",
            settings.words_per_test
        ),
    }
}

pub fn render_settings(app: &App, area: Rect, buf: &mut Buffer) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .horizontal_margin(2)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(5),
            Constraint::Length(4),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    Paragraph::new(title_line("typeslide", "settings".to_string())).render(chunks[0], buf);

    let selected = app.selected_setting();
    let lines: Vec<Line> = SettingsField::ALL
        .iter()
        .map(|field| {
            let (marker, label_style) = if *field == selected {
                ("▸ ", bold().fg(Color::Green))
            } else {
                ("  ", Style::default())
            };
            Line::from(vec![
                Span::styled(format!("{marker}{:<32}", field.to_string()), label_style),
                Span::styled(field_value(&app.settings, *field), bold()),
            ])
        })
        .collect();
    Paragraph::new(lines)
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_type(BorderType::Rounded)
                .title(Span::styled("Typing", bold())),
        )
        .render(chunks[1], buf);

    let account = match &app.user {
        Some(user) if user.is_guest() => format!("Guest session ({})", user.id()),
        Some(user) => format!("Signed in as {}", user.display_name()),
        None => "Not signed in".to_string(),
    };
    Paragraph::new(vec![
        Line::from(account),
        Line::from(Span::styled("(l) log out", dim())),
    ])
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title(Span::styled("Account", bold())),
    )
    .render(chunks[2], buf);

    legend("↑/↓ select · (space) toggle · ←/→ adjust · (d)efaults · (j)son · (v) csv export · (esc) back")
        .render(chunks[4], buf);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::AppState;
    use crate::config::Config;
    use crate::storage::MemoryStore;
    use crate::ui::buffer_text;
    use std::time::Instant;

    fn render(app: &App) -> String {
        let area = Rect::new(0, 0, 100, 16);
        let mut buf = Buffer::empty(area);
        render_settings(app, area, &mut buf);
        buffer_text(&buf)
    }

    #[test]
    fn values_reflect_settings() {
        let mut app = App::new(Config::default(), Box::new(MemoryStore::new()), Instant::now());
        app.continue_as_guest();
        app.navigate(AppState::Settings);
        let text = render(&app);
        assert!(text.contains("▸ Key sounds"));
        assert!(text.contains("‹ 36 ›"));
        assert!(text.contains("Guest session (guest_"));

        app.settings.key_sounds = false;
        app.settings_index = 2;
        let text = render(&app);
        assert!(text.contains("OFF"));
        assert!(text.contains("▸ Words per test"));
    }

    #[test]
    fn field_value_formats() {
        let settings = Settings::default();
        assert_eq!(field_value(&settings, SettingsField::KeySounds), "ON");
        assert_eq!(
            field_value(&settings, SettingsField::WordsPerTest),
            "‹ 36 ›  (1-200)"
        );
    }
}
