//! Handles settings for the application. Configuration is read from
//! `settings.toml` (or the file given with `--config`) and can be overridden
//! with `BILLSPLIT__<SECTION>__<KEY>` environment variables.
use std::path::PathBuf;

use clap::Parser;
use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const DEFAULT_CONFIG_PATH: &str = "settings";

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct App {
    /// Tracing level for every workspace crate (`info`, `debug`, ...).
    pub level: String,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Server {
    pub bind: String,
    pub port: u16,
}

impl Default for Server {
    fn default() -> Self {
        Self {
            bind: "127.0.0.1".to_string(),
            port: 3000,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct Store {
    /// JSON file rooms are loaded from at startup and saved to on shutdown.
    pub snapshot: Option<PathBuf>,
    pub code_attempts: usize,
}

impl Default for Store {
    fn default() -> Self {
        Self {
            snapshot: None,
            code_attempts: engine::DEFAULT_CODE_ATTEMPTS,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub store: Store,
}

#[derive(Debug, Parser)]
#[command(name = "billsplit", about = "Shared bill splitting server")]
struct Args {
    /// Optional config file path (TOML), without or with extension.
    #[arg(long, env = "BILLSPLIT_CONFIG")]
    config: Option<String>,
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let args = Args::parse();
        let path = args.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        Self::from_sources(File::with_name(path).required(args.config.is_some()))
    }

    fn from_sources<S>(file: S) -> Result<Self, ConfigError>
    where
        S: config::Source + Send + Sync + 'static,
    {
        Config::builder()
            .add_source(file)
            .add_source(Environment::with_prefix("BILLSPLIT").separator("__"))
            .build()?
            .try_deserialize()
    }

    /// Address the HTTP server binds to.
    pub fn addr(&self) -> String {
        format!("{}:{}", self.server.bind, self.server.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_without_file() {
        let settings = Settings::from_sources(
            File::with_name("definitely/not/here").required(false),
        )
        .unwrap();
        assert_eq!(settings.app.level, "info");
        assert_eq!(settings.addr(), "127.0.0.1:3000");
        assert!(settings.store.snapshot.is_none());
        assert_eq!(settings.store.code_attempts, engine::DEFAULT_CODE_ATTEMPTS);
    }

    #[test]
    fn file_overrides_defaults() {
        let dir = std::env::temp_dir().join(format!("billsplit-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("settings.toml");
        std::fs::write(
            &path,
            "[app]\nlevel = \"debug\"\n\n[server]\nport = 8080\n\n[store]\nsnapshot = \"rooms.json\"\n",
        )
        .unwrap();

        let settings =
            Settings::from_sources(File::from(path.as_path()).required(true)).unwrap();

        assert_eq!(settings.app.level, "debug");
        assert_eq!(settings.addr(), "127.0.0.1:8080");
        assert_eq!(settings.store.snapshot, Some(PathBuf::from("rooms.json")));
        std::fs::remove_dir_all(dir).unwrap();
    }
}
