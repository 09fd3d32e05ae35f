//! Fetcher configuration

use prewarm_config::domains::http::HttpConfig as ConfigHttpConfig;
use prewarm_config::HttpScheme;
use std::time::Duration;

/// Forced-IP fetcher configuration
#[derive(Debug, Clone)]
pub struct FetchConfig {
    pub scheme: HttpScheme,

    /// Port dialed on the POP address
    pub port: u16,

    /// Dial plus TLS handshake deadline
    pub connect_timeout: Duration,

    /// Whole-request deadline, body included
    pub request_timeout: Duration,

    pub tcp_keepalive: Duration,

    pub user_agent: String,

    /// Whether to verify certificates against the logical hostname
    pub verify_tls: bool,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            scheme: HttpScheme::Https,
            port: HttpScheme::Https.default_port(),
            connect_timeout: Duration::from_secs(10),
            request_timeout: Duration::from_secs(30),
            tcp_keepalive: Duration::from_secs(30),
            user_agent: concat!("pop-prewarm/", env!("CARGO_PKG_VERSION")).to_string(),
            verify_tls: true,
        }
    }
}

impl FetchConfig {
    /// Plain HTTP on an explicit port, for local endpoints
    pub fn plain_http(port: u16) -> Self {
        Self {
            scheme: HttpScheme::Http,
            port,
            ..Default::default()
        }
    }
}

impl From<ConfigHttpConfig> for FetchConfig {
    fn from(config: ConfigHttpConfig) -> Self {
        Self {
            scheme: config.scheme,
            port: config.effective_port(),
            connect_timeout: config.connect_timeout,
            request_timeout: config.request_timeout,
            tcp_keepalive: config.tcp_keepalive,
            user_agent: config.user_agent,
            verify_tls: config.verify_tls,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_config_uses_scheme_port() {
        let config = ConfigHttpConfig {
            scheme: HttpScheme::Http,
            ..Default::default()
        };
        let fetch = FetchConfig::from(config);
        assert_eq!(fetch.port, 80);
        assert_eq!(fetch.request_timeout, Duration::from_secs(30));

        let config = ConfigHttpConfig {
            port: Some(8443),
            ..Default::default()
        };
        assert_eq!(FetchConfig::from(config).port, 8443);
    }
}
