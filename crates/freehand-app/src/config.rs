//! Application configuration.

use crate::error::AppResult;
use freehand_core::{DEFAULT_BACKGROUND, Theme, ToolSettings};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default margin around exported content, in world units.
pub const DEFAULT_EXPORT_PADDING: f64 = 20.0;

/// Default viewport size in screen pixels.
pub const DEFAULT_VIEWPORT: (u32, u32) = (1280, 720);

/// Startup configuration, read from a JSON file. Missing fields take defaults.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Canvas background color.
    pub background: String,
    pub theme: Theme,
    /// Keep drawing tools active after each shape.
    pub tool_lock: bool,
    /// Style for new elements.
    pub style: ToolSettings,
    /// Where the library and other documents live. Defaults to the
    /// platform data directory.
    pub storage_dir: Option<PathBuf>,
    /// Margin around exported content.
    pub export_padding: f64,
    /// Width and height of the visible canvas, in pixels.
    pub viewport: (u32, u32),
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND.to_string(),
            theme: Theme::default(),
            tool_lock: false,
            style: ToolSettings::default(),
            storage_dir: None,
            export_padding: DEFAULT_EXPORT_PADDING,
            viewport: DEFAULT_VIEWPORT,
        }
    }
}

impl AppConfig {
    /// Load a config file.
    pub fn load(path: &Path) -> AppResult<Self> {
        let json = std::fs::read_to_string(path)?;
        let config = serde_json::from_str(&json)?;
        log::info!("Loaded config from {:?}", path);
        Ok(config)
    }

    /// Directory for persisted documents.
    pub fn storage_dir(&self) -> PathBuf {
        if let Some(dir) = &self.storage_dir {
            return dir.clone();
        }
        dirs::data_local_dir()
            .or_else(dirs::home_dir)
            .unwrap_or_else(|| PathBuf::from("."))
            .join("freehand")
    }
}
