//! Forced-IP HTTP transport configuration

use crate::error::ConfigResult;
use crate::validation::{validate_positive, validate_required_string, Validatable};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;

/// HTTP transport configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    /// URL scheme; plain `http` is only useful against test endpoints
    #[serde(default)]
    pub scheme: HttpScheme,

    /// Port dialed on the POP address (defaults to the scheme's port)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<u16>,

    /// Dial plus TLS handshake deadline
    #[serde(
        with = "crate::domains::utils::serde_seconds",
        default = "default_connect_timeout"
    )]
    pub connect_timeout: Duration,

    /// Whole-request deadline, body included
    #[serde(
        with = "crate::domains::utils::serde_seconds",
        default = "default_request_timeout"
    )]
    pub request_timeout: Duration,

    /// TCP keep-alive interval
    #[serde(
        with = "crate::domains::utils::serde_seconds",
        default = "default_tcp_keepalive"
    )]
    pub tcp_keepalive: Duration,

    /// User agent string
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Whether to verify TLS certificates against the logical hostname
    #[serde(default = "crate::domains::utils::default_true")]
    pub verify_tls: bool,
}

/// Scheme used for forced-IP fetches
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum HttpScheme {
    #[default]
    Https,
    Http,
}

impl HttpScheme {
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpScheme::Https => "https",
            HttpScheme::Http => "http",
        }
    }

    pub fn default_port(&self) -> u16 {
        match self {
            HttpScheme::Https => 443,
            HttpScheme::Http => 80,
        }
    }
}

impl fmt::Display for HttpScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for HttpScheme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "https" => Ok(HttpScheme::Https),
            "http" => Ok(HttpScheme::Http),
            _ => Err(format!("Invalid scheme: {}", s)),
        }
    }
}

impl HttpConfig {
    /// Port to dial, falling back to the scheme default
    pub fn effective_port(&self) -> u16 {
        self.port.unwrap_or_else(|| self.scheme.default_port())
    }
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            scheme: HttpScheme::default(),
            port: None,
            connect_timeout: default_connect_timeout(),
            request_timeout: default_request_timeout(),
            tcp_keepalive: default_tcp_keepalive(),
            user_agent: default_user_agent(),
            verify_tls: true,
        }
    }
}

impl Validatable for HttpConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_positive(
            self.connect_timeout.as_secs(),
            "connect_timeout",
            self.domain_name(),
        )?;
        validate_positive(
            self.request_timeout.as_secs(),
            "request_timeout",
            self.domain_name(),
        )?;

        if self.connect_timeout > self.request_timeout {
            return Err(self.validation_error(format!(
                "connect_timeout ({}s) cannot exceed request_timeout ({}s)",
                self.connect_timeout.as_secs(),
                self.request_timeout.as_secs()
            )));
        }

        if self.port == Some(0) {
            return Err(self.validation_error("port must be greater than 0"));
        }

        validate_required_string(&self.user_agent, "user_agent", self.domain_name())?;

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "http"
    }
}

// Default value functions
fn default_connect_timeout() -> Duration {
    Duration::from_secs(10)
}

fn default_request_timeout() -> Duration {
    Duration::from_secs(30)
}

fn default_tcp_keepalive() -> Duration {
    Duration::from_secs(30)
}

fn default_user_agent() -> String {
    concat!("pop-prewarm/", env!("CARGO_PKG_VERSION")).to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_config_defaults() {
        let config = HttpConfig::default();
        assert_eq!(config.scheme, HttpScheme::Https);
        assert_eq!(config.effective_port(), 443);
        assert_eq!(config.connect_timeout, Duration::from_secs(10));
        assert_eq!(config.request_timeout, Duration::from_secs(30));
        assert!(config.verify_tls);
        assert!(config.user_agent.starts_with("pop-prewarm/"));
    }

    #[test]
    fn test_http_config_validation() {
        let mut config = HttpConfig::default();
        assert!(config.validate().is_ok());

        config.request_timeout = Duration::from_secs(0);
        assert!(config.validate().is_err());

        let mut config = HttpConfig::default();
        config.connect_timeout = Duration::from_secs(60);
        assert!(config.validate().is_err());

        let mut config = HttpConfig::default();
        config.port = Some(0);
        assert!(config.validate().is_err());

        let mut config = HttpConfig::default();
        config.user_agent = String::new();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_scheme_parsing_and_ports() {
        assert_eq!("HTTP".parse::<HttpScheme>().unwrap(), HttpScheme::Http);
        assert!("ftp".parse::<HttpScheme>().is_err());

        let config = HttpConfig {
            scheme: HttpScheme::Http,
            ..Default::default()
        };
        assert_eq!(config.effective_port(), 80);

        let config = HttpConfig {
            port: Some(8443),
            ..Default::default()
        };
        assert_eq!(config.effective_port(), 8443);
    }
}
