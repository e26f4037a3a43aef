//! User configuration.
//!
//! Read from `--config <path>` or `config.toml` in the user config directory:
//!
//! ```toml
//! [display]
//! decimals = 2
//! show_formulas = false
//!
//! [names]
//! uppercase = false
//!
//! [sheet]
//! version = "default"
//! ```

use cellgrid_core::{DEFAULT_VERSION, NamePolicy};
use cellgrid_engine::engine::DEFAULT_DECIMALS;
use directories::ProjectDirs;
use serde::Deserialize;
use std::path::PathBuf;

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub display: DisplayConfig,
    pub names: NamesConfig,
    pub sheet: SheetConfig,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct DisplayConfig {
    /// Digits shown for non-integral numbers.
    pub decimals: usize,
    /// List raw contents instead of values.
    pub show_formulas: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            decimals: DEFAULT_DECIMALS,
            show_formulas: false,
        }
    }
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct NamesConfig {
    /// Normalize cell names to upper case.
    pub uppercase: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq)]
#[serde(default)]
pub struct SheetConfig {
    /// Version label written to and expected from sheet files.
    pub version: String,
}

impl Default for SheetConfig {
    fn default() -> Self {
        SheetConfig {
            version: DEFAULT_VERSION.to_string(),
        }
    }
}

impl Config {
    pub fn name_policy(&self) -> NamePolicy {
        if self.names.uppercase {
            NamePolicy::uppercase()
        } else {
            NamePolicy::default()
        }
    }
}

/// Load configuration, falling back to defaults.
/// Problems are returned as warnings rather than errors.
pub fn load_config(config_file: Option<&PathBuf>) -> (Config, Vec<String>) {
    let mut warnings = Vec::new();
    let Some(path) = config_file.cloned().or_else(user_config_path) else {
        return (Config::default(), warnings);
    };

    if !path.exists() {
        if config_file.is_some() {
            warnings.push(format!("Config file not found: {}", path.display()));
        }
        return (Config::default(), warnings);
    }

    match std::fs::read_to_string(&path) {
        Ok(content) => match parse_config(&content) {
            Ok(config) => {
                log::debug!("loaded config from {}", path.display());
                return (config, warnings);
            }
            Err(err) => warnings.push(format!("Failed to parse {}: {}", path.display(), err)),
        },
        Err(err) => warnings.push(format!("Failed to read {}: {}", path.display(), err)),
    }

    (Config::default(), warnings)
}

pub fn parse_config(content: &str) -> Result<Config, toml::de::Error> {
    toml::from_str(content)
}

fn user_config_path() -> Option<PathBuf> {
    let proj = ProjectDirs::from("", "", "cellgrid")?;
    let mut path = proj.config_dir().to_path_buf();
    path.push("config.toml");
    Some(path)
}
