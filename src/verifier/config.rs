use std::net::{AddrParseError, SocketAddr};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::{VerifierPolicy, DEFAULT_MAX_CHALLENGES_PER_USER};
use crate::config::GroupSettings;

/// Verifier process configuration.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Hostname or IP address to bind to.
    pub host: String,
    /// Port number to listen on.
    pub port: u16,
    /// Group parameters, shared with the client configuration.
    pub group: GroupSettings,
    /// Challenge and session limits.
    pub policy: PolicySettings,
    /// Metrics exporter configuration.
    pub metrics: MetricsSettings,
}

/// Challenge cap, lifetimes and sweep interval.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct PolicySettings {
    pub max_challenges_per_user: usize,
    /// Seconds an unanswered challenge stays valid. Unset disables expiry.
    pub challenge_ttl_secs: Option<u64>,
    /// Seconds a session stays valid. Unset disables expiry.
    pub session_ttl_secs: Option<u64>,
    /// Seconds between sweeps of expired challenges and sessions.
    pub cleanup_interval_secs: u64,
}

impl Default for PolicySettings {
    fn default() -> Self {
        Self {
            max_challenges_per_user: DEFAULT_MAX_CHALLENGES_PER_USER,
            challenge_ttl_secs: Some(300),
            session_ttl_secs: Some(3600),
            cleanup_interval_secs: 60,
        }
    }
}

impl PolicySettings {
    pub fn verifier_policy(&self) -> VerifierPolicy {
        VerifierPolicy {
            max_challenges_per_user: self.max_challenges_per_user,
            challenge_ttl: self.challenge_ttl_secs.map(Duration::from_secs),
            session_ttl: self.session_ttl_secs.map(Duration::from_secs),
        }
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs)
    }

    /// Whether anything can expire, i.e. whether a sweep task is useful.
    pub fn expires(&self) -> bool {
        self.challenge_ttl_secs.is_some() || self.session_ttl_secs.is_some()
    }
}

/// Metrics exporter settings.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct MetricsSettings {
    /// Whether metrics export is enabled.
    pub enabled: bool,
    /// Hostname or IP address for metrics server.
    pub host: String,
    /// Port number for metrics server.
    pub port: u16,
}

impl Default for MetricsSettings {
    fn default() -> Self {
        Self {
            enabled: false,
            host: "127.0.0.1".to_string(),
            port: 9090,
        }
    }
}

impl MetricsSettings {
    pub fn addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 50051,
            group: GroupSettings::default(),
            policy: PolicySettings::default(),
            metrics: MetricsSettings::default(),
        }
    }
}

impl ServerConfig {
    /// Converts host and port into a socket address.
    pub fn addr(&self) -> Result<SocketAddr, AddrParseError> {
        format!("{}:{}", self.host, self.port).parse()
    }

    /// Loads configuration from `.env`, a TOML file and environment variables.
    ///
    /// Priority, highest first:
    /// 1. Environment variables with the `ZKP_` prefix; nested keys are
    ///    separated by `__` (e.g. `ZKP_POLICY__SESSION_TTL_SECS=600`)
    /// 2. TOML file at `ZKP_CONFIG_PATH` (default `config/server.toml`),
    ///    skipped if missing
    /// 3. Built-in defaults
    ///
    /// A `.env` file in the current directory or a parent is loaded into the
    /// environment first, if present.
    ///
    /// ```bash
    /// ZKP_HOST=0.0.0.0
    /// ZKP_PORT=50051
    /// ZKP_GROUP__PRESET=rfc5114
    /// ZKP_POLICY__MAX_CHALLENGES_PER_USER=5
    /// ZKP_METRICS__ENABLED=true
    /// ```
    #[allow(clippy::result_large_err)]
    pub fn from_env() -> figment::error::Result<Self> {
        use figment::providers::{Env, Format, Serialized, Toml};
        use figment::Figment;

        let _ = dotenvy::dotenv();

        let config_path =
            std::env::var("ZKP_CONFIG_PATH").unwrap_or_else(|_| "config/server.toml".to_string());

        Figment::from(Serialized::defaults(ServerConfig::default()))
            .merge(Toml::file(&config_path))
            .merge(Env::prefixed("ZKP_").ignore(&["config_path"]).split("__"))
            .extract()
    }

    /// Checks values that serde cannot.
    ///
    /// Group parameters are not checked here; they are validated when built.
    ///
    /// # Errors
    /// Returns a message describing the first invalid setting.
    pub fn validate(&self) -> Result<(), String> {
        self.addr()
            .map_err(|e| format!("Invalid server address {}:{}: {e}", self.host, self.port))?;

        if self.policy.max_challenges_per_user == 0 {
            return Err("policy.max_challenges_per_user cannot be zero".to_string());
        }

        if self.policy.challenge_ttl_secs == Some(0) {
            return Err("policy.challenge_ttl_secs cannot be zero".to_string());
        }

        if self.policy.session_ttl_secs == Some(0) {
            return Err("policy.session_ttl_secs cannot be zero".to_string());
        }

        if self.policy.cleanup_interval_secs == 0 {
            return Err("policy.cleanup_interval_secs cannot be zero".to_string());
        }

        if self.metrics.enabled {
            let metrics_addr = self.metrics.addr().map_err(|e| {
                format!(
                    "Invalid metrics address {}:{}: {e}",
                    self.metrics.host, self.metrics.port
                )
            })?;
            if self.addr().is_ok_and(|addr| addr == metrics_addr) {
                return Err(format!("Metrics and gRPC both bound to {metrics_addr}"));
            }
        }

        Ok(())
    }
}
