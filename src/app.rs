//! Application state: which screen is up, and how keys and ticks move it.
//!
//! Nothing in here touches the terminal or the network. Side effects the main
//! loop must perform (starting a word fetch, ringing the bell) are left as
//! pending requests for it to take.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use std::time::{Duration, Instant};

use crate::auth::{self, AuthUser};
use crate::config::Config;
use crate::keyboard::PressedKeys;
use crate::pagination::{paginate, CellMeasurer, PageLayout, Pager};
use crate::profile::{self, Profile, ProfileEditor, ProfileStats, RecentTests, TestResult};
use crate::session::SessionConfig;
use crate::settings::{Settings, SettingsField};
use crate::storage::KeyValueStore;
use crate::typing::{KeyInput, TypingSession};

pub const LANDING_DURATION: Duration = Duration::from_secs(6);
const STATUS_TTL: Duration = Duration::from_secs(4);

/// Widest the word viewport gets, in cells
pub const VIEWPORT_MAX_WIDTH: u16 = 90;
pub const VIEWPORT_LINES: usize = 3;
pub const HORIZONTAL_MARGIN: u16 = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum AppState {
    Landing,
    Auth,
    Dashboard,
    Typing,
    Profile,
    Settings,
}

impl AppState {
    /// Screens that need a signed-in (or guest) user
    pub fn is_protected(&self) -> bool {
        matches!(
            self,
            AppState::Dashboard | AppState::Typing | AppState::Profile | AppState::Settings
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthOption {
    Google,
    Guest,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum_macros::Display)]
pub enum DashboardOption {
    Typing,
    Stats,
    Profile,
    Settings,
    Practice,
}

/// Sphere colours per dashboard entry: highlight, base, accent
pub struct Palette {
    pub c1: (u8, u8, u8),
    pub c2: (u8, u8, u8),
    pub c3: (u8, u8, u8),
}

impl DashboardOption {
    pub const ALL: [DashboardOption; 5] = [
        DashboardOption::Typing,
        DashboardOption::Stats,
        DashboardOption::Profile,
        DashboardOption::Settings,
        DashboardOption::Practice,
    ];

    pub fn palette(&self) -> Palette {
        match self {
            DashboardOption::Typing => Palette {
                c1: (0x66, 0x7e, 0xea),
                c2: (0x1a, 0x20, 0x2c),
                c3: (0xa7, 0x8b, 0xfa),
            },
            DashboardOption::Stats => Palette {
                c1: (0xf0, 0x93, 0xfb),
                c2: (0x2d, 0x1b, 0x69),
                c3: (0xf8, 0xb5, 0xd1),
            },
            DashboardOption::Profile => Palette {
                c1: (0x4f, 0xac, 0xfe),
                c2: (0x0f, 0x17, 0x2a),
                c3: (0x7d, 0xd3, 0xfc),
            },
            DashboardOption::Settings => Palette {
                c1: (0x43, 0xe9, 0x7b),
                c2: (0x0f, 0x20, 0x27),
                c3: (0x84, 0xfa, 0xb0),
            },
            DashboardOption::Practice => Palette {
                c1: (0xfa, 0x70, 0x9a),
                c2: (0x2c, 0x18, 0x10),
                c3: (0xfe, 0xe0, 0x8b),
            },
        }
    }

    pub fn destination(&self) -> AppState {
        match self {
            DashboardOption::Typing | DashboardOption::Practice => AppState::Typing,
            DashboardOption::Stats | DashboardOption::Profile => AppState::Profile,
            DashboardOption::Settings => AppState::Settings,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchRequest {
    pub request_id: u64,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StatusLine {
    pub text: String,
    pub at: Instant,
}

#[derive(Debug)]
pub struct TypingView {
    pub session: TypingSession,
    pub pager: Pager,
    pub layout: PageLayout,
    pub keys: PressedKeys,
    pub loading: bool,
    request_id: u64,
    /// Config and list size the current words were fetched for
    loaded_for: Option<(SessionConfig, usize)>,
    recorded: bool,
}

impl TypingView {
    fn new(config: SessionConfig) -> Self {
        Self {
            session: TypingSession::new(config, Vec::new()),
            pager: Pager::default(),
            layout: PageLayout::new(VIEWPORT_MAX_WIDTH as usize, VIEWPORT_LINES),
            keys: PressedKeys::default(),
            loading: false,
            request_id: 0,
            loaded_for: None,
            recorded: false,
        }
    }

    fn repaginate(&mut self) {
        let pages = paginate(self.session.words(), &CellMeasurer, self.layout);
        self.pager.set_pages(pages);
    }
}

#[derive(Debug)]
pub struct ProfileView {
    pub profile: Profile,
    pub results: Vec<TestResult>,
    /// True while `results` holds the placeholder rows
    pub showing_samples: bool,
    pub stats: ProfileStats,
    pub recent: RecentTests,
    pub editor: Option<ProfileEditor>,
}

impl ProfileView {
    fn load(store: &dyn KeyValueStore, now: chrono::DateTime<chrono::Local>) -> Self {
        let profile = Profile::load(store);
        let (results, showing_samples) = match profile::load_results(store) {
            Some(results) => (results, false),
            None => (profile::sample_results(now), true),
        };
        let stats = ProfileStats::from_results(&results);
        Self {
            profile,
            results,
            showing_samples,
            stats,
            recent: RecentTests::default(),
            editor: None,
        }
    }
}

/// Page width and line budget for a terminal of the given width
pub fn viewport_layout(term_width: u16) -> PageLayout {
    let width = term_width
        .saturating_sub(HORIZONTAL_MARGIN * 2)
        .min(VIEWPORT_MAX_WIDTH)
        .max(1);
    PageLayout::new(width as usize, VIEWPORT_LINES)
}

pub struct App {
    pub config: Config,
    pub store: Box<dyn KeyValueStore>,
    pub state: AppState,
    pub user: Option<AuthUser>,
    pub settings: Settings,
    pub session_config: SessionConfig,
    pub typing: TypingView,
    pub profile: Option<ProfileView>,
    pub auth_option: AuthOption,
    pub dashboard_index: usize,
    pub settings_index: usize,
    pub status: Option<StatusLine>,
    pub export_dir: PathBuf,
    pub landing_started: Instant,
    pub now: Instant,
    last_tick: Instant,
    pub should_quit: bool,
    pending_fetch: Option<FetchRequest>,
    bell: bool,
}

impl App {
    pub fn new(config: Config, store: Box<dyn KeyValueStore>, now: Instant) -> Self {
        let user = auth::current_user(store.as_ref());
        let settings = Settings::load(store.as_ref());
        let session_config = SessionConfig::default();
        let skip_landing = config.skip_landing;

        let mut app = Self {
            config,
            store,
            state: AppState::Landing,
            user,
            settings,
            session_config,
            typing: TypingView::new(session_config),
            profile: None,
            auth_option: AuthOption::Guest,
            dashboard_index: 0,
            settings_index: 0,
            status: None,
            export_dir: PathBuf::from("."),
            landing_started: now,
            now,
            last_tick: now,
            should_quit: false,
            pending_fetch: None,
            bell: false,
        };
        if skip_landing {
            app.leave_landing();
        }
        app
    }

    pub fn with_export_dir(mut self, dir: PathBuf) -> Self {
        self.export_dir = dir;
        self
    }

    /// Word fetch the main loop should start, if any
    pub fn take_fetch_request(&mut self) -> Option<FetchRequest> {
        self.pending_fetch.take()
    }

    /// Whether a keystroke asked for the terminal bell
    pub fn take_bell(&mut self) -> bool {
        std::mem::take(&mut self.bell)
    }

    pub fn set_status(&mut self, text: impl Into<String>) {
        self.status = Some(StatusLine {
            text: text.into(),
            at: self.now,
        });
    }

    pub fn dashboard_option(&self) -> DashboardOption {
        DashboardOption::ALL[self.dashboard_index % DashboardOption::ALL.len()]
    }

    fn leave_landing(&mut self) {
        let next = if self.user.is_some() {
            AppState::Dashboard
        } else {
            AppState::Auth
        };
        self.navigate(next);
    }

    /// Switch screens, bouncing to auth when a protected screen has no user
    pub fn navigate(&mut self, target: AppState) {
        let target = if target.is_protected() && self.user.is_none() {
            AppState::Auth
        } else {
            target
        };
        log::debug!("navigate {} -> {}", self.state, target);
        self.state = target;

        match target {
            AppState::Typing => self.ensure_words(),
            AppState::Profile => {
                self.profile = Some(ProfileView::load(self.store.as_ref(), chrono::Local::now()));
            }
            _ => {}
        }
    }

    fn word_count(&self) -> usize {
        self.session_config.word_count(self.settings.words_per_test)
    }

    /// Fetch only when the config (or the list size it implies) changed
    fn ensure_words(&mut self) {
        let wanted = (self.session_config, self.word_count());
        if self.typing.loaded_for != Some(wanted) && !self.typing.loading {
            self.request_words();
        }
    }

    /// Start over with a new list for the current config
    pub fn request_words(&mut self) {
        self.typing.request_id += 1;
        self.typing.loading = true;
        self.typing.session = TypingSession::new(self.session_config, Vec::new());
        self.typing.pager.reset();
        self.typing.recorded = false;
        self.pending_fetch = Some(FetchRequest {
            request_id: self.typing.request_id,
            count: self.word_count(),
        });
    }

    pub fn on_words_loaded(&mut self, request_id: u64, words: Vec<String>) {
        if request_id != self.typing.request_id {
            log::debug!("dropping stale word list {request_id}");
            return;
        }
        self.typing.loaded_for = Some((self.session_config, self.word_count()));
        self.typing.loading = false;
        self.typing.session = TypingSession::new(self.session_config, words);
        self.typing.recorded = false;
        self.typing.pager.reset();
        self.typing.repaginate();
    }

    pub fn on_resize(&mut self, term_width: u16) {
        let layout = viewport_layout(term_width);
        if layout != self.typing.layout {
            self.typing.layout = layout;
            self.typing.repaginate();
            let idx = self.typing.session.word_index();
            if let Some(page) = self.typing.pager.page_of(idx) {
                self.typing.pager.slide_to(page, self.now);
            }
        }
    }

    pub fn on_tick(&mut self, now: Instant) {
        self.now = now;

        if self.state == AppState::Landing
            && now.saturating_duration_since(self.landing_started) >= LANDING_DURATION
        {
            self.leave_landing();
        }

        self.advance_clock(now);
        self.typing.pager.settle(now);
        self.typing.keys.expire(now);

        if self
            .status
            .as_ref()
            .is_some_and(|s| now.saturating_duration_since(s.at) >= STATUS_TTL)
        {
            self.status = None;
        }
    }

    /// Run the session timer up to `now`, recording the result if that ends it
    fn advance_clock(&mut self, now: Instant) {
        let dt = now.saturating_duration_since(self.last_tick);
        self.last_tick = self.last_tick.max(now);

        let was_finished = self.typing.session.has_finished();
        self.typing.session.on_tick(dt);
        if !was_finished && self.typing.session.has_finished() {
            self.record_result();
        }
    }

    /// Something on screen moves without input
    pub fn is_animating(&self) -> bool {
        if self.status.is_some() {
            return true;
        }
        match self.state {
            AppState::Landing => true,
            AppState::Typing => {
                self.is_typing()
                    || self.typing.pager.is_sliding(self.now)
                    || !self.typing.keys.is_empty()
                    || self.typing.loading
            }
            _ => false,
        }
    }

    pub fn on_key(&mut self, key: KeyEvent, now: Instant) {
        self.now = now;
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            self.should_quit = true;
            return;
        }

        match self.state {
            AppState::Landing => self.leave_landing(),
            AppState::Auth => self.on_auth_key(key),
            AppState::Dashboard => self.on_dashboard_key(key),
            AppState::Typing => self.on_typing_key(key),
            AppState::Profile => self.on_profile_key(key),
            AppState::Settings => self.on_settings_key(key),
        }
    }

    fn on_auth_key(&mut self, key: KeyEvent) {
        match key.code {
            KeyCode::Up | KeyCode::Down | KeyCode::Tab | KeyCode::BackTab => {
                self.auth_option = match self.auth_option {
                    AuthOption::Google => AuthOption::Guest,
                    AuthOption::Guest => AuthOption::Google,
                };
            }
            KeyCode::Enter => match self.auth_option {
                AuthOption::Google => self.start_google_sign_in(),
                AuthOption::Guest => self.continue_as_guest(),
            },
            KeyCode::Char('g') => self.start_google_sign_in(),
            KeyCode::Char('c') => self.continue_as_guest(),
            KeyCode::Char('r') => {
                // pick up an identity the browser flow left behind
                self.user = auth::current_user(self.store.as_ref());
                if self.user.is_some() {
                    self.navigate(AppState::Dashboard);
                } else {
                    self.set_status("Not signed in yet");
                }
            }
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn start_google_sign_in(&mut self) {
        match auth::sign_in_with_google(&self.config) {
            Ok(()) => self.set_status("Finish signing in in your browser, then press r"),
            Err(e) => {
                log::error!("google sign-in: {e}");
                self.set_status(e.to_string());
            }
        }
    }

    pub fn continue_as_guest(&mut self) {
        self.user = Some(auth::continue_as_guest(self.store.as_ref()));
        self.navigate(AppState::Dashboard);
    }

    fn on_dashboard_key(&mut self, key: KeyEvent) {
        let n = DashboardOption::ALL.len();
        match key.code {
            KeyCode::Up | KeyCode::Left => {
                self.dashboard_index = (self.dashboard_index + n - 1) % n;
            }
            KeyCode::Down | KeyCode::Right => {
                self.dashboard_index = (self.dashboard_index + 1) % n;
            }
            KeyCode::Enter => self.navigate(self.dashboard_option().destination()),
            KeyCode::Esc | KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    /// A run is in progress, so printable keys belong to the test
    pub fn is_typing(&self) -> bool {
        self.typing.session.has_started() && !self.typing.session.has_finished()
    }

    fn change_session_config(&mut self, config: SessionConfig) {
        if config != self.session_config {
            self.session_config = config;
            self.request_words();
        }
    }

    fn on_typing_key(&mut self, key: KeyEvent) {
        let modified = key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT | KeyModifiers::SUPER | KeyModifiers::META);
        // a key can land past the deadline before the next tick does
        self.advance_clock(self.now);

        match key.code {
            KeyCode::Esc => {
                self.navigate(AppState::Dashboard);
                return;
            }
            KeyCode::Char('r') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.request_words();
                return;
            }
            KeyCode::F(5) => {
                self.request_words();
                return;
            }
            KeyCode::Enter if self.typing.session.has_finished() => {
                self.request_words();
                return;
            }
            KeyCode::Tab => {
                self.change_session_config(SessionConfig::with_mode(self.session_config.mode.toggled()));
                return;
            }
            KeyCode::Up | KeyCode::Down => {
                let mut next = self.session_config;
                next.cycle_target(key.code == KeyCode::Down);
                self.change_session_config(next);
                return;
            }
            KeyCode::Left if !self.is_typing() => {
                self.typing.pager.prev(self.now);
                return;
            }
            KeyCode::Right if !self.is_typing() => {
                self.typing.pager.next(self.now);
                return;
            }
            KeyCode::Char('[') if !self.is_typing() => {
                self.typing.pager.prev(self.now);
                return;
            }
            KeyCode::Char(']') if !self.is_typing() => {
                self.typing.pager.next(self.now);
                return;
            }
            _ => {}
        }

        if modified {
            return;
        }
        let input = match key.code {
            KeyCode::Char(' ') => KeyInput::Space,
            KeyCode::Char(c) => KeyInput::Char(c),
            KeyCode::Backspace => KeyInput::Backspace,
            _ => return,
        };

        let was_finished = self.typing.session.has_finished();
        if !self.typing.session.handle(input) {
            return;
        }
        if let KeyCode::Char(c) = key.code {
            self.typing.keys.press(c, self.now);
        }
        if self.settings.key_sounds {
            self.bell = true;
        }
        self.typing
            .pager
            .follow(self.typing.session.word_index(), self.now);
        if !was_finished && self.typing.session.has_finished() {
            self.record_result();
        }
    }

    fn record_result(&mut self) {
        if self.typing.recorded {
            return;
        }
        self.typing.recorded = true;
        let summary = self.typing.session.summary();
        if summary.words == 0 {
            return;
        }
        let result = TestResult {
            date: chrono::Local::now(),
            mode: self.typing.session.config().label(),
            wpm: summary.wpm,
            accuracy: summary.accuracy,
            words: summary.words,
        };
        log::info!(
            "recording result: {} wpm, {}% over {} words",
            result.wpm,
            result.accuracy,
            result.words
        );
        profile::record_result(self.store.as_ref(), result);
    }

    fn on_profile_key(&mut self, key: KeyEvent) {
        if self.profile.is_none() {
            self.navigate(AppState::Profile);
        }
        let Some(view) = self.profile.as_mut() else {
            return;
        };

        if let Some(editor) = view.editor.as_mut() {
            match key.code {
                KeyCode::Esc => view.editor = None,
                KeyCode::Tab | KeyCode::Down => editor.field = editor.field.next(),
                KeyCode::BackTab | KeyCode::Up => editor.field = editor.field.prev(),
                KeyCode::Backspace => editor.pop(),
                KeyCode::Delete => editor.clear_avatar(),
                KeyCode::Enter => match editor.commit() {
                    Ok(profile) => {
                        profile.save(self.store.as_ref());
                        view.profile = profile;
                        view.editor = None;
                    }
                    Err(e) => editor.error = Some(e.to_string()),
                },
                KeyCode::Char(c) => editor.push(c),
                _ => {}
            }
            return;
        }

        match key.code {
            KeyCode::Char('e') => view.editor = Some(ProfileEditor::new(&view.profile)),
            KeyCode::Left | KeyCode::Char('p') => view.recent.prev(),
            KeyCode::Right | KeyCode::Char('n') => view.recent.next(&view.results),
            KeyCode::Char('x') => {
                match profile::export_profile(&self.export_dir, &view.profile, &view.stats) {
                    Ok(path) => self.set_status(format!("Exported to {}", path.display())),
                    Err(e) => {
                        log::error!("profile export failed: {e}");
                        self.set_status("Export failed");
                    }
                }
            }
            KeyCode::Esc | KeyCode::Char('b') => self.navigate(AppState::Dashboard),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    pub fn selected_setting(&self) -> SettingsField {
        SettingsField::ALL[self.settings_index % SettingsField::ALL.len()]
    }

    fn update_settings(&mut self, f: impl FnOnce(&mut Settings)) {
        f(&mut self.settings);
        self.settings.save(self.store.as_ref());
    }

    fn on_settings_key(&mut self, key: KeyEvent) {
        let n = SettingsField::ALL.len();
        let field = self.selected_setting();
        match key.code {
            KeyCode::Up => self.settings_index = (self.settings_index + n - 1) % n,
            KeyCode::Down | KeyCode::Tab => self.settings_index = (self.settings_index + 1) % n,
            KeyCode::Char(' ') | KeyCode::Enter => self.update_settings(|s| s.toggle(field)),
            KeyCode::Left | KeyCode::Char('-') if field == SettingsField::WordsPerTest => {
                self.update_settings(|s| s.adjust_words_per_test(-1))
            }
            KeyCode::Right | KeyCode::Char('+') if field == SettingsField::WordsPerTest => {
                self.update_settings(|s| s.adjust_words_per_test(1))
            }
            KeyCode::Char('d') => {
                self.update_settings(|s| *s = Settings::default());
                self.set_status("Defaults restored");
            }
            KeyCode::Char('j') => {
                let result = self.settings.export_json(&self.export_dir);
                self.report_export(result);
            }
            KeyCode::Char('v') => {
                let result = self.settings.export_csv(&self.export_dir);
                self.report_export(result);
            }
            KeyCode::Char('l') => self.logout(),
            KeyCode::Esc | KeyCode::Char('b') => self.navigate(AppState::Dashboard),
            KeyCode::Char('q') => self.should_quit = true,
            _ => {}
        }
    }

    fn report_export(&mut self, result: Result<PathBuf, crate::export::ExportError>) {
        match result {
            Ok(path) => self.set_status(format!("Exported to {}", path.display())),
            Err(e) => {
                log::error!("settings export failed: {e}");
                self.set_status("Export failed");
            }
        }
    }

    pub fn logout(&mut self) {
        auth::sign_out(self.store.as_ref());
        self.user = None;
        self.profile = None;
        self.navigate(AppState::Auth);
    }
}
