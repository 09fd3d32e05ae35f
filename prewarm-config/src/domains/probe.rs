//! Probe inputs: which distribution, path and POPs to exercise

use crate::error::ConfigResult;
use crate::validation::{validate_hostname, validate_required_string, Validatable};
use prewarm_core::{parse_pop_list, Distribution, PopCode, PopCodeError, PLACEHOLDER_DOMAIN};
use serde::{Deserialize, Serialize};

/// Probe configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProbeConfig {
    /// Distribution ID, e.g. `d111111abcdef8`
    #[serde(default)]
    pub distribution_id: String,

    /// Path requested from every POP
    #[serde(default = "default_url_path")]
    pub url_path: String,

    /// POP codes, either a list or a comma-separated string
    #[serde(default = "default_pops")]
    pub pops: PopList,

    /// Fetches per POP per run (0 disables fetching)
    #[serde(default = "default_requests_per_pop")]
    pub requests_per_pop: u32,

    /// Hostname to present instead of `<id>.cloudfront.net`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub custom_domain: Option<String>,
}

/// POP list accepting both `"FRA,LHR"` and `[FRA, LHR]`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(from = "PopListRepr", into = "Vec<String>")]
pub struct PopList(Vec<String>);

#[derive(Deserialize)]
#[serde(untagged)]
enum PopListRepr {
    Csv(String),
    List(Vec<String>),
}

impl From<PopListRepr> for PopList {
    fn from(repr: PopListRepr) -> Self {
        match repr {
            PopListRepr::Csv(csv) => PopList::from_csv(&csv),
            PopListRepr::List(list) => PopList(list),
        }
    }
}

impl From<PopList> for Vec<String> {
    fn from(list: PopList) -> Self {
        list.0
    }
}

impl PopList {
    pub fn new(pops: Vec<String>) -> Self {
        PopList(pops)
    }

    /// Split a comma-separated list, dropping blank entries
    pub fn from_csv(csv: &str) -> Self {
        PopList(
            csv.split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect(),
        )
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Parse every entry into a [`PopCode`]
    pub fn codes(&self) -> Result<Vec<PopCode>, PopCodeError> {
        parse_pop_list(&self.0.join(","))
    }
}

impl ProbeConfig {
    /// Build the distribution with its logical-host rules applied
    pub fn distribution(&self) -> Distribution {
        Distribution::new(self.distribution_id.trim()).with_custom_domain(self.custom_domain.clone())
    }
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            distribution_id: String::new(),
            url_path: default_url_path(),
            pops: default_pops(),
            requests_per_pop: default_requests_per_pop(),
            custom_domain: None,
        }
    }
}

impl Validatable for ProbeConfig {
    fn validate(&self) -> ConfigResult<()> {
        validate_required_string(&self.distribution_id, "distribution_id", self.domain_name())?;
        validate_hostname(
            self.distribution_id.trim(),
            "distribution_id",
            self.domain_name(),
        )?;

        if !self.url_path.starts_with('/') {
            return Err(self.validation_error(format!(
                "url_path must start with '/', got '{}'",
                self.url_path
            )));
        }

        if self.pops.is_empty() {
            return Err(self.validation_error("At least one POP must be configured"));
        }
        self.pops
            .codes()
            .map_err(|e| self.validation_error(format!("pops: {}", e)))?;

        if let Some(domain) = &self.custom_domain {
            let domain = domain.trim();
            if !domain.is_empty() && domain != PLACEHOLDER_DOMAIN {
                validate_hostname(domain, "custom_domain", self.domain_name())?;
            }
        }

        Ok(())
    }

    fn domain_name(&self) -> &'static str {
        "probe"
    }
}

// Default value functions
fn default_url_path() -> String {
    "/".to_string()
}

fn default_pops() -> PopList {
    PopList::from_csv("FRA,LHR")
}

fn default_requests_per_pop() -> u32 {
    60
}
