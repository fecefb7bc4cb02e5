//! Application settings: an optional `settings.toml` overlaid by
//! `MONEYBOOK__<SECTION>__<KEY>` environment variables.

use config::{Config, ConfigBuilder, ConfigError, Environment, File, builder::DefaultState};
use secrecy::SecretString;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct App {
    pub level: String,
}

#[derive(Debug, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Database {
    Memory,
    Sqlite(String),
}

#[derive(Debug, Deserialize)]
pub struct Server {
    pub bind: Option<String>,
    pub port: u16,
    pub database: Database,
}

#[derive(Debug, Deserialize)]
pub struct Secret {
    /// Key material for values sealed under the global scope.
    pub encryption_key: SecretString,
}

#[derive(Debug, Deserialize)]
pub struct Auth {
    pub token_key: SecretString,
    pub token_ttl_hours: u32,
}

#[derive(Debug, Deserialize)]
pub struct Settings {
    pub app: App,
    pub server: Server,
    pub secret: Secret,
    pub auth: Auth,
}

impl Settings {
    /// Reads `path` (extension optional, file optional) and the environment.
    pub fn new(path: &str) -> Result<Self, ConfigError> {
        Self::from_builder(
            defaults()?
                .add_source(File::with_name(path).required(false))
                .add_source(Environment::with_prefix("MONEYBOOK").separator("__")),
        )
    }

    fn from_builder(builder: ConfigBuilder<DefaultState>) -> Result<Self, ConfigError> {
        builder.build()?.try_deserialize()
    }
}

fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
    Config::builder()
        .set_default("app.level", "info")?
        .set_default("server.port", 3000)?
        .set_default("server.database", "memory")?
        .set_default("auth.token_ttl_hours", 72)
}
