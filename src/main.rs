use anyhow::{Context, Result};
use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    style::Print,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    io::{self, stdin},
    path::PathBuf,
    sync::Arc,
    time::{Duration, Instant},
};

use typeslide::{
    app::App,
    app_dirs::AppDirs,
    auth::{self, AuthUser},
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    runtime::{AppEvent, AppEventSource, CrosstermEventSource, FixedTicker, Runner, Ticker},
    storage::FileStore,
    words::{self, HttpWordSource, StaticWordSource, WordSource},
};

/// retro typing test with paged word slides
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A typing test for the terminal: pick a timed or word-count run, type through pages of words that slide as you go, and keep a local profile with your results."
)]
pub struct Cli {
    /// endpoint serving a JSON array of {"word": ...} entries
    #[clap(short = 'e', long)]
    word_endpoint: Option<String>,

    /// base url of the sign-in service
    #[clap(long)]
    auth_url: Option<String>,

    /// directory holding the stored profile, settings and results
    #[clap(short = 'd', long)]
    data_dir: Option<PathBuf>,

    /// directory exports are written to
    #[clap(long, default_value = ".")]
    export_dir: PathBuf,

    /// redraw interval in milliseconds
    #[clap(long)]
    tick_rate: Option<u64>,

    /// go straight past the landing screen
    #[clap(long)]
    skip_landing: bool,

    /// continue as a guest when nobody is signed in
    #[clap(long)]
    guest: bool,

    /// record a signed-in user (JSON as handed back by the sign-in service)
    #[clap(long)]
    user_json: Option<String>,

    /// type these space-separated words instead of fetching a list
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// keep the endpoint, auth url, data dir and tick rate flags as defaults
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Flags win over the stored config for this run only
    fn apply(&self, mut config: Config) -> Config {
        if let Some(endpoint) = &self.word_endpoint {
            config.word_endpoint = endpoint.clone();
        }
        if let Some(url) = &self.auth_url {
            config.auth_base_url = url.clone();
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = Some(dir.clone());
        }
        if let Some(ms) = self.tick_rate {
            config.tick_rate_ms = ms.max(1);
        }
        config.skip_landing |= self.skip_landing;
        config
    }

    fn word_source(&self, config: &Config) -> Result<Arc<dyn WordSource>> {
        Ok(match &self.prompt {
            Some(prompt) => Arc::new(StaticWordSource::new(prompt.split_whitespace())),
            None => Arc::new(
                HttpWordSource::new(config.word_endpoint.clone())
                    .context("could not build the word list client")?,
            ),
        })
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    if let Err(e) = logging::init(&AppDirs::log_path()) {
        eprintln!("logging disabled: {e}");
    }

    let config_store = FileConfigStore::new();
    let config = cli.apply(config_store.load());
    if cli.save_config {
        config_store
            .save(&config)
            .with_context(|| format!("could not write {}", config_store.path().display()))?;
    }
    log::info!("starting with {config:?}");
    let store = FileStore::new(config.storage_dir());

    if let Some(json) = &cli.user_json {
        let user: AuthUser =
            serde_json::from_str(json).context("--user-json is not a valid user record")?;
        auth::complete_sign_in(&store, user);
    }

    let source = cli.word_source(&config)?;
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(config.tick_rate_ms)),
    );

    let mut app = App::new(config, Box::new(store), Instant::now())
        .with_export_dir(cli.export_dir.clone());
    if cli.guest && app.user.is_none() {
        app.continue_as_guest();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app, &runner, &source);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &result {
        log::error!("exiting after error: {e:#}");
    }
    result
}

fn start_tui<B: Backend, E: AppEventSource, T: Ticker>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    runner: &Runner<E, T>,
    source: &Arc<dyn WordSource>,
) -> Result<()> {
    app.on_resize(terminal.size()?.width);

    loop {
        if let Some(request) = app.take_fetch_request() {
            words::spawn_fetch(
                Arc::clone(source),
                request.request_id,
                request.count,
                runner.sender(),
            );
        }

        terminal.draw(|f| f.render_widget(&*app, f.area()))?;

        if app.take_bell() {
            execute!(io::stdout(), Print('\x07'))?;
        }
        if app.should_quit {
            break;
        }

        // block until something changed what is on screen
        loop {
            match runner.step() {
                AppEvent::Tick => {
                    let was_animating = app.is_animating();
                    app.on_tick(Instant::now());
                    if was_animating || app.is_animating() {
                        break;
                    }
                }
                AppEvent::Resize => {
                    app.on_resize(terminal.size()?.width);
                    break;
                }
                AppEvent::Key(key) => {
                    app.on_key(key, Instant::now());
                    break;
                }
                AppEvent::WordsLoaded { request_id, words } => {
                    app.on_words_loaded(request_id, words);
                    break;
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["typeslide"]);

        assert_eq!(cli.word_endpoint, None);
        assert_eq!(cli.export_dir, PathBuf::from("."));
        assert!(!cli.skip_landing);
        assert!(!cli.guest);
        assert_eq!(cli.apply(Config::default()), Config::default());
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from([
            "typeslide",
            "-e",
            "http://words.test/list",
            "--auth-url",
            "http://auth.test",
            "-d",
            "/tmp/typeslide",
            "--tick-rate",
            "0",
            "--skip-landing",
        ]);
        let config = cli.apply(Config::default());

        assert_eq!(config.word_endpoint, "http://words.test/list");
        assert_eq!(config.oauth_start_url(), "http://auth.test/api/auth/google");
        assert_eq!(config.storage_dir(), PathBuf::from("/tmp/typeslide"));
        assert_eq!(config.tick_rate_ms, 1);
        assert!(config.skip_landing);
    }

    #[test]
    fn test_prompt_builds_static_source() {
        let cli = Cli::parse_from(["typeslide", "-p", "hi there"]);
        let source = cli.word_source(&Config::default()).unwrap();
        let mut words = source.fetch(10).unwrap();
        words.sort();
        assert_eq!(words, vec!["hi".to_string(), "there".to_string()]);
    }

    #[test]
    fn test_user_json_parses() {
        let json = r#"{"type":"user","id":"u1","name":"Ada","email":null,"photoURL":null}"#;
        let user: AuthUser = serde_json::from_str(json).unwrap();
        assert_eq!(user.display_name(), "Ada");
        assert!(!user.is_guest());
    }
}
