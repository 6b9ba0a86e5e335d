//! pow: resolve development hostnames to local applications.
//!
//! # Architecture Overview
//!
//! ```text
//!   overrides ──┐
//!   ~/.powconfig ┼─▶ config ──▶ DomainMatcher (dns / http)
//!   environment ─┘      │
//!                       ▼
//!   hostname ───────▶ routing::lookup ◀── roots::scanner ◀── host root dir
//!                       │
//!                       ▼
//!               (domain, application root) | no match
//! ```

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use pow::config::{loader::load_overrides, ConfigOverrides, Configuration, DomainList};
use pow::observability::logging;
use pow::roots::ApplicationRootResolver;
use pow::routing::HostLookup;

#[derive(Parser)]
#[command(name = "pow")]
#[command(about = "Resolve development hostnames to local applications", long_about = None)]
struct Cli {
    /// TOML file of explicit option overrides
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Comma-separated domains (overrides POW_DOMAINS)
    #[arg(long, global = true)]
    domains: Option<String>,

    /// Comma-separated HTTP-only domains (overrides POW_EXT_DOMAINS)
    #[arg(long, global = true)]
    ext_domains: Option<String>,

    /// Host root directory (overrides POW_HOST_ROOT)
    #[arg(long, global = true)]
    host_root: Option<PathBuf>,

    /// Maximum workers per application (overrides POW_WORKERS)
    #[arg(long, global = true)]
    workers: Option<usize>,

    /// Worker idle timeout in seconds (overrides POW_TIMEOUT)
    #[arg(long, global = true)]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the resolved configuration as JSON
    Config,
    /// List the applications found in the host root
    Roots,
    /// Find the application that serves a hostname
    Lookup { host: String },
    /// Show whether the DNS and HTTP sides accept a hostname
    Check { host: String },
}

impl Cli {
    fn overrides(&self) -> Result<ConfigOverrides, Box<dyn std::error::Error>> {
        let mut overrides = match &self.config {
            Some(path) => load_overrides(path)?,
            None => ConfigOverrides::default(),
        };
        if let Some(domains) = &self.domains {
            overrides.domains = Some(DomainList::from(domains.as_str()));
        }
        if let Some(ext) = &self.ext_domains {
            overrides.ext_domains = Some(DomainList::from(ext.as_str()));
        }
        if let Some(root) = &self.host_root {
            overrides.host_root = Some(root.clone());
        }
        overrides.workers = self.workers.or(overrides.workers);
        overrides.timeout = self.timeout.or(overrides.timeout);
        Ok(overrides)
    }
}

#[tokio::main]
async fn main() -> Result<ExitCode, Box<dyn std::error::Error>> {
    logging::init("pow=info");

    let cli = Cli::parse();
    let config = Configuration::load(cli.overrides()?).await?.into_shared();

    match cli.command {
        Commands::Config => {
            println!("{}", serde_json::to_string_pretty(&config.snapshot())?);
        }
        Commands::Roots => {
            let roots = ApplicationRootResolver::new(config.host_root())
                .gather_application_roots()
                .await?;
            println!("{}", serde_json::to_string_pretty(&roots.into_inner())?);
        }
        Commands::Lookup { host } => {
            let resolver = ApplicationRootResolver::new(config.host_root());
            let lookup = HostLookup::new(config.clone(), resolver);
            match lookup.lookup(&host).await? {
                Some(found) => println!("{}", serde_json::to_string_pretty(&found)?),
                None => {
                    eprintln!("No application for {}", host);
                    return Ok(ExitCode::FAILURE);
                }
            }
        }
        Commands::Check { host } => {
            let report = serde_json::json!({
                "host": host,
                "dns": config.dns_domain_matcher().matches(&host),
                "http": config.http_domain_matcher().matches(&host),
            });
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    Ok(ExitCode::SUCCESS)
}
