mod app;
pub mod config;
mod logging;
mod ui;

pub use app::run_app;
