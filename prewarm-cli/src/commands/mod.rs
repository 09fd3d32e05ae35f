//! Command implementations

pub mod config;
pub mod resolve;
pub mod run;

use crate::cli::{ProbeArgs, ResolvePin};
use prewarm_config::domains::probe::PopList;
use prewarm_config::PrewarmConfig;
use prewarm_dns::{PopResolver, StaticResolver, SystemResolver};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

/// Layer command-line probe overrides over file and environment values
pub fn apply_probe_args(config: &mut PrewarmConfig, args: &ProbeArgs) {
    if let Some(id) = &args.distribution_id {
        config.probe.distribution_id = id.clone();
    }
    if let Some(path) = &args.path {
        config.probe.url_path = path.clone();
    }
    if let Some(pops) = &args.pops {
        config.probe.pops = PopList::from_csv(pops);
    }
    if let Some(n) = args.requests_per_pop {
        config.probe.requests_per_pop = n;
    }
    if let Some(domain) = &args.custom_domain {
        config.probe.custom_domain = Some(domain.clone());
    }
}

/// System DNS, with `--resolve` pins taking precedence when given
pub fn build_resolver(pins: &[ResolvePin]) -> Arc<dyn PopResolver> {
    if pins.is_empty() {
        return Arc::new(SystemResolver::new());
    }

    let mut resolver = StaticResolver::new();
    for pin in pins {
        info!("Pinning {}", pin);
        resolver.insert(pin.host.clone(), pin.ip);
    }
    Arc::new(resolver.with_fallback(Arc::new(SystemResolver::new())))
}

/// Token cancelled on the first Ctrl-C
pub fn interrupt_token() -> CancellationToken {
    let shutdown = CancellationToken::new();
    let trigger = shutdown.clone();
    tokio::spawn(async move {
        match tokio::signal::ctrl_c().await {
            Ok(()) => {
                warn!("Interrupt received, cancelling");
                trigger.cancel();
            }
            Err(e) => warn!("Failed to listen for Ctrl-C: {}", e),
        }
    });
    shutdown
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_probe_args() {
        let mut config = PrewarmConfig::default();
        let args = ProbeArgs {
            distribution_id: Some("dcli".to_string()),
            pops: Some("sin, nrt".to_string()),
            requests_per_pop: Some(0),
            ..Default::default()
        };
        apply_probe_args(&mut config, &args);

        assert_eq!(config.probe.distribution_id, "dcli");
        assert_eq!(config.probe.pops.len(), 2);
        assert_eq!(config.probe.requests_per_pop, 0);
        assert_eq!(config.probe.url_path, "/");
        assert!(config.validate_all().is_ok());
    }

    #[tokio::test]
    async fn test_build_resolver_prefers_pins() {
        let pins = vec!["dcli.lhr.cloudfront.net=192.0.2.9".parse::<ResolvePin>().unwrap()];
        let resolver = build_resolver(&pins);
        let ips = resolver.lookup("dcli.lhr.cloudfront.net").await.unwrap();
        assert_eq!(ips, vec![pins[0].ip]);
    }
}
