use ratatui::{buffer::Buffer, layout::Rect};

use crate::app::{App, AppState};
use crate::ui::{dashboard, landing, profile, settings, typing_test};

/// A UI Screen boundary: draws one app state into the area it is given
pub trait Screen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer);
}

pub struct LandingScreen;

impl Screen for LandingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        landing::render_landing(app, area, buf);
    }
}

pub struct AuthScreen;

impl Screen for AuthScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        landing::render_auth(app, area, buf);
    }
}

pub struct DashboardScreen;

impl Screen for DashboardScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        dashboard::render_dashboard(app, area, buf);
    }
}

pub struct TypingScreen;

impl Screen for TypingScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        typing_test::render_typing(app, area, buf);
    }
}

pub struct ProfileScreen;

impl Screen for ProfileScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        profile::render_profile(app, area, buf);
    }
}

pub struct SettingsScreen;

impl Screen for SettingsScreen {
    fn render(&self, app: &App, area: Rect, buf: &mut Buffer) {
        settings::render_settings(app, area, buf);
    }
}

/// Helper to construct the appropriate screen for the current state
pub fn current_screen(state: &AppState) -> Box<dyn Screen> {
    match state {
        AppState::Landing => Box::new(LandingScreen),
        AppState::Auth => Box::new(AuthScreen),
        AppState::Dashboard => Box::new(DashboardScreen),
        AppState::Typing => Box::new(TypingScreen),
        AppState::Profile => Box::new(ProfileScreen),
        AppState::Settings => Box::new(SettingsScreen),
    }
}
