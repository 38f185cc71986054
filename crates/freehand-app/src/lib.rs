//! Freehand Application
//!
//! The headless application shell: configuration, palette commands, scene
//! files, the element library and PNG export.

mod app;
pub mod config;
pub mod error;
pub mod export;

pub use app::{App, CommandOutcome, image_data_uri};
pub use config::AppConfig;
pub use error::{AppError, AppResult};
