//! Fetch result model

use crate::pop::PopCode;
use crate::timing::TimingMetrics;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::net::IpAddr;

/// Response headers: lower-cased name to values in the order received
pub type HeaderValues = BTreeMap<String, Vec<String>>;

/// One completed forced-IP fetch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FetchResult {
    pub pop: PopCode,

    /// Address the connection was dialed to
    pub ip: IpAddr,

    /// Hostname sent as SNI and `Host`
    pub logical_host: String,

    pub status: u16,

    pub metrics: TimingMetrics,

    pub headers: HeaderValues,

    #[serde(skip)]
    pub body: Vec<u8>,
}

impl FetchResult {
    /// First value of a header, if present
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .and_then(|values| values.first())
            .map(String::as_str)
    }

    /// CloudFront reports the POP that served the request in `x-amz-cf-pop`
    pub fn served_by(&self) -> Option<&str> {
        self.header("x-amz-cf-pop")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let mut headers = HeaderValues::new();
        headers.insert(
            "x-amz-cf-pop".to_string(),
            vec!["LHR62-C2".to_string(), "LHR50-P1".to_string()],
        );
        let result = FetchResult {
            pop: PopCode::new("lhr").unwrap(),
            ip: "192.0.2.10".parse().unwrap(),
            logical_host: "d1.cloudfront.net".to_string(),
            status: 200,
            metrics: TimingMetrics::with_end_time(Duration::from_millis(40)),
            headers,
            body: b"ok".to_vec(),
        };

        assert_eq!(result.header("X-Amz-Cf-Pop"), Some("LHR62-C2"));
        assert_eq!(result.served_by(), Some("LHR62-C2"));
        assert_eq!(result.header("server"), None);
    }
}
