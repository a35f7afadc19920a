use anyhow::Context;
use serde::Deserialize;
use std::path::{Path, PathBuf};

pub const DEFAULT_DB_PATH: &str = "database/music_library.db";

/// Overrides the database file location
pub const DB_STORAGE_ENV: &str = "DB_STORAGE";
/// Overrides the http port
pub const PORT_ENV: &str = "PORT";

#[derive(Debug, Deserialize)]
pub struct Config {
    #[serde(default = "default_version")]
    pub version: u32,
    #[serde(default)]
    pub database: Database,
    #[serde(default)]
    pub http: HttpConfig,
}

fn default_version() -> u32 {
    1
}

impl Default for Config {
    fn default() -> Self {
        Self {
            version: default_version(),
            database: Database::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Reads the config file if it exists, falling back to defaults,
    /// then applies overrides from the environment (and `.env`).
    pub fn load(path: &Path) -> anyhow::Result<Config> {
        let mut config = Self::from_file(path)?;

        dotenvy::dotenv().ok();
        config.apply_overrides(|key| std::env::var(key).ok())?;
        Ok(config)
    }

    /// config file contents only, without environment overrides
    pub fn from_file(path: &Path) -> anyhow::Result<Config> {
        let config: Config = if path.exists() {
            let contents = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config {}", path.display()))?;
            toml::from_str(&contents).with_context(|| "Failed to parse config TOML")?
        } else {
            log::debug!("config {} not found, using defaults", path.display());
            Config::default()
        };
        anyhow::ensure!(
            config.version == 1,
            "unsupported config version {}",
            config.version
        );
        Ok(config)
    }

    pub fn apply_overrides<F>(&mut self, lookup: F) -> anyhow::Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup(DB_STORAGE_ENV).filter(|p| !p.is_empty()) {
            self.database.in_memory = false;
            self.database.path = Some(PathBuf::from(path));
        }

        if let Some(port) = lookup(PORT_ENV).filter(|p| !p.is_empty()) {
            self.http.port = port
                .parse()
                .with_context(|| format!("{PORT_ENV} must be a port number, got '{port}'"))?;
        }

        Ok(())
    }
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct HttpConfig {
    pub bind_addr: String,
    pub port: u16,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            bind_addr: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct Database {
    pub in_memory: bool,
    pub path: Option<PathBuf>,
}

impl Database {
    pub fn in_memory() -> Self {
        Self {
            in_memory: true,
            path: None,
        }
    }

    pub fn from_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            in_memory: false,
            path: Some(p.as_ref().to_path_buf()),
        }
    }

    /// location of the database file, `None` for in-memory databases
    pub fn file_path(&self) -> Option<PathBuf> {
        if self.in_memory {
            None
        } else {
            Some(
                self.path
                    .clone()
                    .unwrap_or_else(|| PathBuf::from(DEFAULT_DB_PATH)),
            )
        }
    }
}
