//! # tb-config
//!
//! Layered settings for the Threadboard binary. Sources, lowest priority first:
//! built-in defaults, `config/default.toml`, the file named by
//! `THREADBOARD_CONFIG`, then `THREADBOARD__SECTION__KEY` environment variables.
//! A `.env` file in the working directory is loaded before any of them.

use std::path::PathBuf;

use config::builder::DefaultState;
use config::{ConfigBuilder, Environment, File};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_CONFIG_FILE: &str = "config/default";
pub const CONFIG_FILE_ENV: &str = "THREADBOARD_CONFIG";
pub const ENV_PREFIX: &str = "THREADBOARD";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("failed to read .env file: {0}")]
    DotEnv(#[from] dotenvy::Error),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub server: ServerSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    /// 0 binds an ephemeral port.
    pub port: u16,
    /// Directory holding `board.html` and `thread.html`.
    pub static_dir: PathBuf,
    /// Allowed CORS origins. Empty allows any origin.
    pub cors_origins: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageBackend {
    Sqlite,
    Memory,
}

#[derive(Debug, Deserialize)]
pub struct StorageSettings {
    pub backend: StorageBackend,
    /// May embed credentials for remote backends, so it is kept out of Debug output.
    pub database_url: SecretString,
    pub max_connections: u32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    /// Default filter directive; `RUST_LOG` takes precedence when set.
    pub level: String,
    pub format: LogFormat,
}

impl Settings {
    /// Loads `.env`, then every configured source.
    pub fn load() -> Result<Self> {
        if let Err(err) = dotenvy::dotenv() {
            if !err.not_found() {
                return Err(err.into());
            }
        }

        let mut builder =
            defaults()?.add_source(File::with_name(DEFAULT_CONFIG_FILE).required(false));
        if let Ok(path) = std::env::var(CONFIG_FILE_ENV) {
            builder = builder.add_source(File::with_name(&path).required(true));
        }
        builder = builder.add_source(environment());

        Self::build(builder)
    }

    fn build(builder: ConfigBuilder<DefaultState>) -> Result<Self> {
        let settings: Settings = builder.build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.server.host.trim().is_empty() {
            return Err(ConfigError::Invalid("server.host must not be empty".into()));
        }
        if self.storage.backend == StorageBackend::Sqlite {
            if self.storage.database_url.expose_secret().trim().is_empty() {
                return Err(ConfigError::Invalid(
                    "storage.database_url is required for the sqlite backend".into(),
                ));
            }
            if self.storage.max_connections == 0 {
                return Err(ConfigError::Invalid(
                    "storage.max_connections must be at least 1".into(),
                ));
            }
        }
        Ok(())
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>> {
    Ok(config::Config::builder()
        .set_default("server.host", "127.0.0.1")?
        .set_default("server.port", 3000)?
        .set_default("server.static_dir", "static")?
        .set_default("server.cors_origins", Vec::<String>::new())?
        .set_default("storage.backend", "sqlite")?
        .set_default("storage.database_url", "sqlite://threadboard.db")?
        .set_default("storage.max_connections", 5)?
        .set_default("logging.level", "info")?
        .set_default("logging.format", "pretty")?)
}

fn environment() -> Environment {
    Environment::with_prefix(ENV_PREFIX)
        .prefix_separator("__")
        .separator("__")
        .try_parsing(true)
        .list_separator(",")
        .with_list_parse_key("server.cors_origins")
}

#[cfg(test)]
mod tests {
    use super::*;
    use config::FileFormat;
    use std::collections::HashMap;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        environment().source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let settings = Settings::build(defaults().unwrap()).unwrap();
        assert_eq!(settings.bind_addr(), "127.0.0.1:3000");
        assert_eq!(settings.storage.backend, StorageBackend::Sqlite);
        assert_eq!(settings.storage.database_url.expose_secret(), "sqlite://threadboard.db");
        assert_eq!(settings.logging.format, LogFormat::Pretty);
        assert!(settings.server.cors_origins.is_empty());
    }

    #[test]
    fn test_file_then_env_override() {
        let toml = r#"
            [server]
            port = 8080

            [storage]
            backend = "memory"

            [logging]
            format = "json"
        "#;
        let builder = defaults()
            .unwrap()
            .add_source(File::from_str(toml, FileFormat::Toml))
            .add_source(env(&[
                ("THREADBOARD__SERVER__PORT", "9090"),
                ("THREADBOARD__LOGGING__LEVEL", "debug"),
            ]));

        let settings = Settings::build(builder).unwrap();
        assert_eq!(settings.server.port, 9090);
        assert_eq!(settings.storage.backend, StorageBackend::Memory);
        assert_eq!(settings.logging.level, "debug");
        assert_eq!(settings.logging.format, LogFormat::Json);
    }

    #[test]
    fn test_cors_origins_from_env_list() {
        let builder = defaults().unwrap().add_source(env(&[(
            "THREADBOARD__SERVER__CORS_ORIGINS",
            "http://a.test,http://b.test",
        )]));

        let settings = Settings::build(builder).unwrap();
        assert_eq!(settings.server.cors_origins, vec!["http://a.test", "http://b.test"]);
    }

    #[test]
    fn test_rejects_empty_database_url_for_sqlite() {
        let builder = defaults()
            .unwrap()
            .add_source(env(&[("THREADBOARD__STORAGE__DATABASE_URL", "")]));

        assert!(matches!(Settings::build(builder), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_unknown_backend_fails_to_load() {
        let builder = defaults()
            .unwrap()
            .add_source(env(&[("THREADBOARD__STORAGE__BACKEND", "mongo")]));

        assert!(matches!(Settings::build(builder), Err(ConfigError::Load(_))));
    }

    #[test]
    fn test_debug_redacts_database_url() {
        let builder = defaults().unwrap().add_source(env(&[(
            "THREADBOARD__STORAGE__DATABASE_URL",
            "sqlite://secret-path.db",
        )]));

        let settings = Settings::build(builder).unwrap();
        assert!(!format!("{:?}", settings).contains("secret-path"));
    }
}
