// Library surface shared by the binary and the integration tests.
pub mod app;
pub mod app_dirs;
pub mod config;
pub mod error;
pub mod finger;
pub mod kv;
pub mod pulse;
pub mod runtime;
pub mod saved_texts;
pub mod scoring;
pub mod session;
pub mod ui;

pub use app::App;
