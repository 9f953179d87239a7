//! Server configuration: built-in defaults, then a TOML file, then the environment.

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

/// Optional configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "videovisor.toml";

/// Prefix of environment variables overriding the configuration.
pub const ENV_PREFIX: &str = "VIDEOVISOR_";

/// Server configuration.
///
/// Built-in defaults are overridden by [`CONFIG_FILE`], which is in turn
/// overridden by `VIDEOVISOR_*` environment variables (e.g. `VIDEOVISOR_PORT=8080`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub host: String,
    pub port: u16,
    /// Where browsers reach the dashboard; the OAuth redirect URI is derived from it.
    pub public_url: String,
    pub client_secrets: PathBuf,
    pub favorites: PathBuf,
    pub api_base_url: String,
    pub request_timeout_secs: u64,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 5000,
            public_url: "http://localhost:5000".to_string(),
            client_secrets: PathBuf::from("client_secrets.json"),
            favorites: PathBuf::from("favs.md"),
            api_base_url: crate::youtube_api::client::DEFAULT_BASE_URL.to_string(),
            request_timeout_secs: 30,
        }
    }
}

impl Config {
    pub fn figment() -> Figment {
        Figment::from(Serialized::defaults(Config::default()))
            .merge(Toml::file(CONFIG_FILE))
            .merge(Env::prefixed(ENV_PREFIX))
    }

    pub fn load() -> Result<Self, figment::Error> {
        Self::figment().extract()
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}
