//! CLI argument parsing definitions

use clap::{Args, Parser, Subcommand};
use std::fmt;
use std::net::IpAddr;
use std::path::PathBuf;
use std::str::FromStr;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Set the log level (trace, debug, info, warn, error)
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Resolve every POP and fetch the target through each of them (default)
    Run(RunArgs),

    /// Resolve POP addresses only and print them
    Resolve {
        #[command(flatten)]
        probe: ProbeArgs,
    },

    /// Configuration management commands
    Config {
        #[command(subcommand)]
        config_cmd: ConfigCommands,
    },
}

/// Overrides for the probe section of the configuration
#[derive(Args, Debug, Clone, Default)]
pub struct ProbeArgs {
    /// Distribution ID, e.g. d111111abcdef8
    #[arg(long, value_name = "ID")]
    pub distribution_id: Option<String>,

    /// Path requested from every POP
    #[arg(long, value_name = "PATH")]
    pub path: Option<String>,

    /// Comma-separated POP codes, e.g. FRA,LHR
    #[arg(long, value_name = "CODES")]
    pub pops: Option<String>,

    /// Fetches per POP
    #[arg(long, value_name = "N")]
    pub requests_per_pop: Option<u32>,

    /// Hostname presented instead of <id>.cloudfront.net
    #[arg(long, value_name = "HOST")]
    pub custom_domain: Option<String>,

    /// Pin a probe hostname to an address instead of asking DNS (repeatable)
    #[arg(long = "resolve", value_name = "HOST=IP")]
    pub resolve: Vec<ResolvePin>,
}

#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    #[command(flatten)]
    pub probe: ProbeArgs,

    /// Maximum fetches in flight
    #[arg(long, value_name = "N")]
    pub max_concurrency: Option<usize>,

    /// Repeat a run every N seconds until interrupted
    #[arg(long, value_name = "SECONDS")]
    pub every: Option<u64>,

    /// Stop after this many scheduled runs
    #[arg(long, value_name = "N")]
    pub max_runs: Option<u32>,

    /// Skip TLS certificate verification
    #[arg(long)]
    pub insecure: bool,
}

#[derive(Subcommand)]
pub enum ConfigCommands {
    /// Validate a configuration file
    Validate {
        /// Path to the configuration file
        #[arg(long, value_name = "PATH")]
        config_file: PathBuf,
    },

    /// Print or write the default configuration
    Generate {
        /// Output file path (stdout when omitted)
        #[arg(long, value_name = "PATH")]
        output: Option<PathBuf>,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}

/// `HOST=IP` pair given with `--resolve`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvePin {
    pub host: String,
    pub ip: IpAddr,
}

impl FromStr for ResolvePin {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (host, ip) = s
            .split_once('=')
            .ok_or_else(|| format!("expected HOST=IP, got '{}'", s))?;
        let host = host.trim();
        if host.is_empty() {
            return Err(format!("missing host in '{}'", s));
        }
        let ip = ip
            .trim()
            .parse()
            .map_err(|e| format!("invalid address in '{}': {}", s, e))?;
        Ok(Self {
            host: host.to_string(),
            ip,
        })
    }
}

impl fmt::Display for ResolvePin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}={}", self.host, self.ip)
    }
}
