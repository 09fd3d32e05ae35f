//! CDN distribution hostnames

use crate::pop::PopCode;
use serde::{Deserialize, Serialize};

/// Custom-domain value shipped in deployment templates; treated as "not set".
pub const PLACEHOLDER_DOMAIN: &str = "www.example.com";

const CLOUDFRONT_SUFFIX: &str = "cloudfront.net";

/// A CDN distribution and the hostnames derived from it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Distribution {
    id: String,
    custom_domain: Option<String>,
}

impl Distribution {
    /// Create a distribution without a custom domain
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            custom_domain: None,
        }
    }

    /// Attach a custom domain.
    ///
    /// Empty values and [`PLACEHOLDER_DOMAIN`] are ignored so that an
    /// unconfigured template parameter falls back to the distribution host.
    pub fn with_custom_domain(mut self, domain: Option<impl Into<String>>) -> Self {
        self.custom_domain = domain
            .map(Into::into)
            .map(|d| d.trim().to_string())
            .filter(|d| !d.is_empty() && d != PLACEHOLDER_DOMAIN);
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn custom_domain(&self) -> Option<&str> {
        self.custom_domain.as_deref()
    }

    /// Hostname that resolves to one specific POP: `<id>.<pop>.cloudfront.net`
    pub fn probe_host(&self, pop: &PopCode) -> String {
        format!("{}.{}.{}", self.id, pop, CLOUDFRONT_SUFFIX)
    }

    /// Hostname presented as TLS server name and HTTP `Host`
    pub fn logical_host(&self) -> String {
        match &self.custom_domain {
            Some(domain) => domain.clone(),
            None => format!("{}.{}", self.id, CLOUDFRONT_SUFFIX),
        }
    }
}
