//! Configuration loaded from `config.toml` with environment overrides
//!
//! Lookup order for the file: `--config`, `$CAFE_REPORTS_CONFIG`, then
//! `<config dir>/cafe-reports/config.toml`. A missing file means defaults.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::workbook::{ParseOptions, YearWindow};

pub const APP_DIR: &str = "cafe-reports";
pub const CONFIG_ENV: &str = "CAFE_REPORTS_CONFIG";
pub const DATABASE_ENV: &str = "CAFE_REPORTS_DATABASE";

/// Largest accepted upload (10 MiB)
pub const DEFAULT_MAX_FILE_SIZE: u64 = 10 * 1024 * 1024;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub database: DatabaseConfig,
    pub parser: ParserConfig,
    pub import: ImportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    pub path: PathBuf,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        let base = dirs::data_dir().unwrap_or_else(|| PathBuf::from("."));
        Self {
            path: base.join(APP_DIR).join("reports.db"),
        }
    }
}

/// Which report years are accepted.
///
/// `min_year`/`max_year` pin the window; otherwise it rolls with the
/// current year.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParserConfig {
    pub years_back: i32,
    pub years_ahead: i32,
    pub min_year: Option<i32>,
    pub max_year: Option<i32>,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            years_back: YearWindow::YEARS_BACK,
            years_ahead: YearWindow::YEARS_AHEAD,
            min_year: None,
            max_year: None,
        }
    }
}

impl ParserConfig {
    pub fn year_window(&self, current_year: i32) -> YearWindow {
        YearWindow::new(
            self.min_year.unwrap_or(current_year - self.years_back),
            self.max_year.unwrap_or(current_year + self.years_ahead),
        )
    }

    pub fn parse_options(&self) -> ParseOptions {
        use chrono::Datelike;
        ParseOptions::with_year_window(self.year_window(chrono::Utc::now().year()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub max_file_size: u64,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            max_file_size: DEFAULT_MAX_FILE_SIZE,
        }
    }
}

impl Config {
    /// Default config file location
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join(APP_DIR).join("config.toml"))
    }

    /// Load configuration, applying environment overrides
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        let path = match explicit {
            Some(p) => Some(p.to_path_buf()),
            None => std::env::var_os(CONFIG_ENV)
                .map(PathBuf::from)
                .or_else(Self::default_path),
        };

        let mut config = match path {
            Some(ref p) if p.exists() => Self::from_file(p)?,
            Some(ref p) if explicit.is_some() => {
                anyhow::bail!("Config file does not exist: {}", p.display())
            }
            _ => Self::default(),
        };

        if let Some(db) = std::env::var_os(DATABASE_ENV) {
            config.database.path = PathBuf::from(db);
        }

        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config = Self::from_toml(&content)
            .with_context(|| format!("Invalid config file: {}", path.display()))?;
        log::debug!("Loaded config from {}", path.display());
        Ok(config)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        toml::from_str(content).context("Failed to parse TOML")
    }
}
