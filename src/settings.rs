//! The persisted user settings record: theme choice plus the two external
//! API credentials. Read once at startup, rewritten wholesale on any change.
//! Color palettes themselves are presentation and live with the frontend;
//! only the theme *name* is state.

use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs;
use std::path::Path;
use std::str::FromStr;
use tracing::{debug, info, warn};

/// The closed set of theme names the frontend knows how to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    #[default]
    #[serde(rename = "Dark Mint")]
    DarkMint,
    #[serde(rename = "Dark Blue")]
    DarkBlue,
    #[serde(rename = "Light Teal")]
    LightTeal,
    #[serde(rename = "Light Coral")]
    LightCoral,
}

impl Theme {
    pub const ALL: [Theme; 4] = [
        Theme::DarkMint,
        Theme::DarkBlue,
        Theme::LightTeal,
        Theme::LightCoral,
    ];

    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::DarkMint => "Dark Mint",
            Self::DarkBlue => "Dark Blue",
            Self::LightTeal => "Light Teal",
            Self::LightCoral => "Light Coral",
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

impl FromStr for Theme {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::ALL
            .into_iter()
            .find(|t| t.name().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| Error::Config(format!("Unknown theme '{}'", s)))
    }
}

/// Theme plus the two opaque API credentials.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub theme: Theme,
    pub spoonacular_api_key: String,
    pub groq_api_key: String,
}

impl Settings {
    /// Loads settings from disk. A missing, unreadable or corrupt file yields
    /// defaults with a warning; startup never fails over settings.
    #[must_use]
    pub fn load(path: &Path) -> Self {
        match fs::read_to_string(path) {
            Ok(contents) => match serde_json::from_str(&contents) {
                Ok(settings) => {
                    debug!("Loaded settings from {:?}", path);
                    settings
                }
                Err(e) => {
                    warn!("Settings file {:?} is corrupt ({}); using defaults", path, e);
                    Self::default()
                }
            },
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!("Settings file {:?} not found; using defaults", path);
                Self::default()
            }
            Err(e) => {
                warn!("Could not read settings file {:?} ({}); using defaults", path, e);
                Self::default()
            }
        }
    }

    /// Rewrites the whole record to disk as pretty JSON.
    pub fn save(&self, path: &Path) -> Result<()> {
        let contents = serde_json::to_string_pretty(self)
            .map_err(|e| Error::Config(format!("Failed to serialize settings: {}", e)))?;
        fs::write(path, contents)
            .map_err(|e| Error::Config(format!("Failed to write settings to {:?}: {}", path, e)))?;
        info!("Saved settings to {:?}", path);
        Ok(())
    }
}
