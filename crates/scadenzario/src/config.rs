//! Configuration loading from environment variables.

use anyhow::{Context, Result};
use chrono::NaiveDate;
use clap::ValueEnum;
use std::path::PathBuf;

/// Which key-value backend holds the assignments
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Backend {
    /// SQLite database file
    Sqlite,
    /// Directory of JSON files
    File,
    /// Nothing is saved
    Memory,
}

impl std::str::FromStr for Backend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        <Backend as ValueEnum>::from_str(s, true).map_err(|e| anyhow::anyhow!(e))
    }
}

/// Runtime settings. Command-line flags override these after loading.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Database file (sqlite) or directory (file backend)
    pub db_path: PathBuf,
    pub backend: Backend,
    pub port: u16,
    /// Fixed calendar day to classify against instead of the local clock
    pub today: Option<NaiveDate>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_path: PathBuf::from("scadenzario.db"),
            backend: Backend::Sqlite,
            port: 8080,
            today: None,
        }
    }
}

impl Settings {
    /// Load settings from the environment.
    ///
    /// Reads `SCADENZARIO_DB`, `SCADENZARIO_BACKEND`, `SCADENZARIO_PORT` and
    /// `SCADENZARIO_TODAY`, either from the environment or from a `.env` file.
    /// Unset variables fall back to the defaults.
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut settings = Self::default();

        if let Some(db) = lookup("SCADENZARIO_DB") {
            settings.db_path = PathBuf::from(db);
        }

        if let Some(backend) = lookup("SCADENZARIO_BACKEND") {
            settings.backend = backend
                .parse()
                .with_context(|| format!("SCADENZARIO_BACKEND has invalid value {backend:?}"))?;
        }

        if let Some(port) = lookup("SCADENZARIO_PORT") {
            settings.port = port
                .parse()
                .with_context(|| format!("SCADENZARIO_PORT has invalid value {port:?}"))?;
        }

        if let Some(today) = lookup("SCADENZARIO_TODAY") {
            let date = NaiveDate::parse_from_str(&today, "%Y-%m-%d")
                .with_context(|| format!("SCADENZARIO_TODAY has invalid value {today:?}"))?;
            settings.today = Some(date);
        }

        Ok(settings)
    }

    /// The calendar day to classify against
    pub fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(crate::urgency::today)
    }
}
