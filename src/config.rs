use std::env;
use std::path::PathBuf;
use std::time::Duration;

use url::Url;

/// Paths to the PEM files used for the mutually-authenticated channel:
/// client certificate and key presented to the service, CA certificate
/// used to verify it.
#[derive(Debug, Clone)]
pub struct TlsMaterial {
    pub client_cert: PathBuf,
    pub client_key: PathBuf,
    pub ca_cert: PathBuf,
}

/// Process configuration. Every field falls back to the composer worker
/// defaults and can be overridden through the environment; nothing here is
/// read from a configuration file.
#[derive(Debug, Clone)]
pub struct Config {
    /// Base URL of the compose API, e.g. `https://localhost/api/composer-koji/v1`.
    pub api_url: Url,
    /// Koji hub the service should report the finished build to.
    pub koji_hub: Url,
    /// When `None` the client speaks plain TLS-less HTTP (tests only).
    pub tls: Option<TlsMaterial>,
    /// Delay between status polls.
    pub poll_interval: Duration,
    /// Non-terminal polls allowed before giving up on the compose.
    pub max_poll_attempts: u32,
    /// Build identity placeholders carried verbatim in the request.
    pub name: String,
    pub version: String,
    pub release: String,
    pub koji_task_id: u64,
}

const DEFAULT_API_URL: &str = "https://localhost/api/composer-koji/v1";
const DEFAULT_KOJI_HUB: &str = "https://localhost:4343/kojihub";
const DEFAULT_CLIENT_CERT: &str = "/etc/osbuild-composer/worker-crt.pem";
const DEFAULT_CLIENT_KEY: &str = "/etc/osbuild-composer/worker-key.pem";
const DEFAULT_CA_CERT: &str = "/etc/osbuild-composer/ca-crt.pem";
const DEFAULT_POLL_INTERVAL_SECS: u64 = 10;
// At the default interval this caps a compose at roughly one hour.
const DEFAULT_MAX_POLL_ATTEMPTS: u32 = 360;

fn env_or(var: &str, default: &str) -> String {
    env::var(var).unwrap_or_else(|_| default.to_string())
}

impl Config {
    /// Build the configuration from environment overrides and defaults.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_url = parse_url("COMPOSER_API_URL", &env_or("COMPOSER_API_URL", DEFAULT_API_URL))?;
        let koji_hub = parse_url("KOJI_HUB_URL", &env_or("KOJI_HUB_URL", DEFAULT_KOJI_HUB))?;

        let tls = Some(TlsMaterial {
            client_cert: env_or("COMPOSER_CLIENT_CERT", DEFAULT_CLIENT_CERT).into(),
            client_key: env_or("COMPOSER_CLIENT_KEY", DEFAULT_CLIENT_KEY).into(),
            ca_cert: env_or("COMPOSER_CA_CERT", DEFAULT_CA_CERT).into(),
        });

        let poll_interval = Duration::from_secs(parse_number(
            "COMPOSE_POLL_INTERVAL_SECS",
            DEFAULT_POLL_INTERVAL_SECS,
        )?);
        let max_poll_attempts =
            parse_number("COMPOSE_MAX_POLL_ATTEMPTS", DEFAULT_MAX_POLL_ATTEMPTS)?;

        Ok(Config {
            api_url,
            koji_hub,
            tls,
            poll_interval,
            max_poll_attempts,
            name: env_or("COMPOSE_NAME", "name"),
            version: env_or("COMPOSE_VERSION", "version"),
            release: env_or("COMPOSE_RELEASE", "release"),
            koji_task_id: parse_number("KOJI_TASK_ID", 1)?,
        })
    }
}

fn parse_url(var: &str, value: &str) -> Result<Url, ConfigError> {
    Url::parse(value).map_err(|source| ConfigError::InvalidUrl {
        var: var.to_string(),
        value: value.to_string(),
        source,
    })
}

fn parse_number<T: std::str::FromStr>(var: &str, default: T) -> Result<T, ConfigError> {
    match env::var(var) {
        Ok(raw) => raw.parse().map_err(|_| ConfigError::InvalidNumber {
            var: var.to_string(),
            value: raw,
        }),
        Err(_) => Ok(default),
    }
}

/// ---- Errors ----
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("invalid URL in {var}: {value}")]
    InvalidUrl {
        var: String,
        value: String,
        #[source]
        source: url::ParseError,
    },
    #[error("invalid number in {var}: {value}")]
    InvalidNumber { var: String, value: String },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_composer_worker_layout() {
        // Environment overrides are exercised end to end by the CLI; here we
        // only pin the defaults the tool ships with.
        let cfg = Config::from_env().unwrap();
        assert_eq!(cfg.api_url.as_str(), "https://localhost/api/composer-koji/v1");
        assert_eq!(cfg.koji_hub.as_str(), "https://localhost:4343/kojihub");
        assert_eq!(cfg.poll_interval, Duration::from_secs(10));
        assert_eq!(cfg.max_poll_attempts, 360);
        assert_eq!(cfg.koji_task_id, 1);
        let tls = cfg.tls.expect("mutual TLS is on by default");
        assert_eq!(tls.ca_cert, PathBuf::from("/etc/osbuild-composer/ca-crt.pem"));
    }
}
