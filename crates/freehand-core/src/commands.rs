//! Named commands offered by menus and the command palette.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Default canvas background.
pub const DEFAULT_BACKGROUND: &str = "#000";

/// Background swatches offered by the background picker.
pub const BACKGROUND_PALETTE: [&str; 14] = [
    "#fff", "#f28b82", "#aecbfa", "#cbf0f8", "#a7ffeb", "#d7aefb", "#fdcfe8", "#e6c9a8",
    "#e8eaed", "#000", "#18181b", "#23242a", "#292a31", "#35363c",
];

/// Command errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum CommandError {
    #[error("Unknown command: {0}")]
    Unknown(String),
}

/// The closed set of commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    Open,
    Save,
    Export,
    Reset,
    Background,
    ThemeLight,
    ThemeDark,
}

impl Command {
    pub const ALL: [Command; 7] = [
        Command::Open,
        Command::Save,
        Command::Export,
        Command::Reset,
        Command::Background,
        Command::ThemeLight,
        Command::ThemeDark,
    ];

    /// Identifier used by the command palette.
    pub fn name(self) -> &'static str {
        match self {
            Command::Open => "open",
            Command::Save => "save",
            Command::Export => "export",
            Command::Reset => "reset",
            Command::Background => "background",
            Command::ThemeLight => "theme-light",
            Command::ThemeDark => "theme-dark",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Command::Open => "Open",
            Command::Save => "Save to...",
            Command::Export => "Export image...",
            Command::Reset => "Reset the canvas",
            Command::Background => "Canvas background",
            Command::ThemeLight => "Light theme",
            Command::ThemeDark => "Dark theme",
        }
    }
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Command {
    type Err = CommandError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Command::ALL
            .into_iter()
            .find(|command| command.name() == s)
            .ok_or_else(|| CommandError::Unknown(s.to_string()))
    }
}

/// UI color theme.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    Light,
    #[default]
    Dark,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for command in Command::ALL {
            assert_eq!(command.name().parse::<Command>(), Ok(command));
        }
        assert_eq!("theme-light".parse::<Command>(), Ok(Command::ThemeLight));
    }

    #[test]
    fn test_unknown_command() {
        assert_eq!(
            "explode".parse::<Command>(),
            Err(CommandError::Unknown("explode".to_string()))
        );
    }

    #[test]
    fn test_default_background_in_palette() {
        assert!(BACKGROUND_PALETTE.contains(&DEFAULT_BACKGROUND));
    }
}
