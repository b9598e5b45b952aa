//! Layered settings for the quiz binary.
//!
//! Later layers win:
//! 1. Built-in defaults
//! 2. TOML file at `$DIAMOND_QUIZ_CONFIG`
//! 3. `DIAMOND_QUIZ_DB_URL`, `DIAMOND_QUIZ_CATALOG`, `DIAMOND_QUIZ_PLAYER`
//! 4. Command-line flags (see `main.rs`)

use std::fmt;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use trivia_core::model::PlayerId;

pub const CONFIG_ENV: &str = "DIAMOND_QUIZ_CONFIG";
pub const DB_URL_ENV: &str = "DIAMOND_QUIZ_DB_URL";
pub const CATALOG_ENV: &str = "DIAMOND_QUIZ_CATALOG";
pub const PLAYER_ENV: &str = "DIAMOND_QUIZ_PLAYER";

pub const DEFAULT_DB_URL: &str = "sqlite://diamond-quiz.sqlite3";
pub const DEFAULT_PLAYER: &str = "local";

/// Contents of the TOML config file. Every key is optional.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct FileConfig {
    pub store: StoreConfig,
    pub quiz: QuizConfig,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// `SQLite` URL or plain file path.
    pub db_url: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct QuizConfig {
    /// JSON question catalog. Default: the built-in sample.
    pub catalog: Option<PathBuf>,
    pub player: Option<String>,
    pub data_only: bool,
}

#[derive(Debug)]
pub enum ConfigError {
    Read { path: PathBuf, source: std::io::Error },
    Parse { path: PathBuf, source: toml::de::Error },
    InvalidPlayer { raw: String },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Read { path, source } => {
                write!(f, "reading {}: {source}", path.display())
            }
            ConfigError::Parse { path, source } => {
                write!(f, "parsing {}: {source}", path.display())
            }
            ConfigError::InvalidPlayer { raw } => write!(f, "invalid player id: {raw:?}"),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Read { source, .. } => Some(source),
            ConfigError::Parse { source, .. } => Some(source),
            ConfigError::InvalidPlayer { .. } => None,
        }
    }
}

/// Resolved settings the binary runs with.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    pub db_url: String,
    pub catalog: Option<PathBuf>,
    pub player: PlayerId,
    pub data_only: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            db_url: DEFAULT_DB_URL.into(),
            catalog: None,
            player: PlayerId::new(DEFAULT_PLAYER),
            data_only: false,
        }
    }
}

impl Settings {
    /// Defaults, then the config file, then the process environment.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if the config file is unreadable or malformed, or
    /// a player id is blank.
    pub fn load() -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        if let Some(path) = std::env::var_os(CONFIG_ENV).map(PathBuf::from) {
            if path.exists() {
                settings.apply_file(read_config(&path)?)?;
            } else {
                tracing::warn!(path = %path.display(), "config file not found, using defaults");
            }
        }
        settings.apply_env(|key| std::env::var(key).ok())?;
        Ok(settings)
    }

    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPlayer` for a blank player id.
    pub fn apply_file(&mut self, file: FileConfig) -> Result<(), ConfigError> {
        if let Some(db_url) = file.store.db_url {
            self.db_url = db_url;
        }
        if let Some(catalog) = file.quiz.catalog {
            self.catalog = Some(catalog);
        }
        if let Some(player) = file.quiz.player {
            self.player = parse_player(player)?;
        }
        self.data_only |= file.quiz.data_only;
        Ok(())
    }

    /// Apply environment overrides through `lookup`; empty values are ignored.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::InvalidPlayer` for a blank player id.
    pub fn apply_env(
        &mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<(), ConfigError> {
        let get = |key: &str| lookup(key).filter(|v: &String| !v.trim().is_empty());
        if let Some(db_url) = get(DB_URL_ENV) {
            self.db_url = db_url;
        }
        if let Some(catalog) = get(CATALOG_ENV) {
            self.catalog = Some(PathBuf::from(catalog));
        }
        if let Some(player) = get(PLAYER_ENV) {
            self.player = parse_player(player)?;
        }
        Ok(())
    }
}

/// # Errors
///
/// Returns `ConfigError::InvalidPlayer` for blank input.
pub fn parse_player(raw: String) -> Result<PlayerId, ConfigError> {
    raw.parse::<PlayerId>()
        .map_err(|_| ConfigError::InvalidPlayer { raw })
}

fn read_config(path: &Path) -> Result<FileConfig, ConfigError> {
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
        path: path.to_path_buf(),
        source,
    })?;
    let config = toml::from_str(&content).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })?;
    tracing::debug!(path = %path.display(), "config loaded");
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn defaults() {
        let settings = Settings::default();
        assert_eq!(settings.db_url, DEFAULT_DB_URL);
        assert_eq!(settings.catalog, None);
        assert_eq!(settings.player.as_str(), "local");
        assert!(!settings.data_only);
    }

    #[test]
    fn parse_minimal_toml() {
        let config: FileConfig = toml::from_str("[quiz]\ndata_only = true\n").unwrap();
        assert!(config.quiz.data_only);
        assert!(config.store.db_url.is_none());
    }

    #[test]
    fn file_then_env_layering() {
        let config: FileConfig = toml::from_str(
            r#"
[store]
db_url = "sqlite:///tmp/from-file.sqlite3"

[quiz]
catalog = "questions.json"
player = "casey"
"#,
        )
        .unwrap();

        let mut settings = Settings::default();
        settings.apply_file(config).unwrap();
        assert_eq!(settings.player.as_str(), "casey");
        assert_eq!(settings.catalog, Some(PathBuf::from("questions.json")));

        let env: HashMap<&str, String> = [
            (DB_URL_ENV, "sqlite::memory:".to_string()),
            (PLAYER_ENV, "  ".to_string()),
        ]
        .into_iter()
        .collect();
        settings.apply_env(|key| env.get(key).cloned()).unwrap();

        assert_eq!(settings.db_url, "sqlite::memory:");
        // blank env values do not override
        assert_eq!(settings.player.as_str(), "casey");
        assert_eq!(settings.catalog, Some(PathBuf::from("questions.json")));
    }

    #[test]
    fn blank_player_in_file_is_rejected() {
        let config: FileConfig = toml::from_str("[quiz]\nplayer = \"\"\n").unwrap();
        let err = Settings::default().apply_file(config).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidPlayer { .. }));
    }

    #[test]
    fn malformed_toml_is_reported() {
        assert!(toml::from_str::<FileConfig>("[quiz]\ndata_only = \"yes\"\n").is_err());
    }
}
