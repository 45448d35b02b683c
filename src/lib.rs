// Library surface for headless/integration tests and reuse.
// Keep this lean to avoid coupling to bin-only types in main.rs.
pub mod app;
pub mod app_dirs;
pub mod auth;
pub mod config;
pub mod export;
pub mod keyboard;
pub mod logging;
pub mod pagination;
pub mod profile;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod storage;
pub mod typing;
pub mod ui;
pub mod util;
pub mod words;
