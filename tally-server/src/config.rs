//! Server configuration options.

use std::path::Path;

use anyhow::Error;

use figment::{
    Figment,
    providers::{Env, Format as _, Serialized, Toml},
    value::Uncased,
};
use serde::{Deserialize, Serialize};

/// The default port the server is hosted on.
pub const DEFAULT_PORT: u16 = 4000;

/// The default database the server connects to.
pub const DEFAULT_DATABASE_URL: &str = "sqlite://tally.db?mode=rwc";

/// The default lifetime of a session, in hours.
pub const DEFAULT_SESSION_LIFETIME_HOURS: i64 = 12;

/// Server configuration.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Config {
    pub server: ServerConfig,
}

impl Config {
    /// Reads the config from the environment.
    pub fn load(config_path: impl AsRef<Path>) -> Result<Config, Error> {
        Config::figment(config_path).extract().map_err(Error::from)
    }

    fn figment(config_path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Toml::file(config_path))
            .merge(Env::prefixed("TALLY_").split("__"))
            .merge(
                Env::raw()
                    .only(&["DATABASE_URL", "PORT"])
                    .map(|k| Uncased::from(format!("SERVER.{}", k))),
            )
    }
}

/// Server config.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct ServerConfig {
    /// The port the server is binded to.
    pub port: u16,
    /// The database url the server will connect to.
    pub database_url: String,
    /// The base64 signing key used to sign session tokens.
    #[serde(default)]
    pub signing_key: Option<String>,
    /// A key mixed into every password digest.
    ///
    /// Changing this invalidates every stored password.
    #[serde(default)]
    pub password_key: Option<String>,
    /// How many hours a session stays valid after logging in.
    pub session_lifetime_hours: i64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            port: DEFAULT_PORT,
            database_url: DEFAULT_DATABASE_URL.to_owned(),
            signing_key: None,
            password_key: None,
            session_lifetime_hours: DEFAULT_SESSION_LIFETIME_HOURS,
        }
    }
}
