//! The resolved, immutable process configuration.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::config::environment::Environment;
use crate::config::loader::{resolve_options, ConfigError, ResolvedOptions};
use crate::config::schema::{ConfigOverrides, ConfigSnapshot};
use crate::config::user_env::{load_user_env, ScriptEvaluator, ShellEvaluator, USER_CONFIG_FILE};
use crate::observability::logging::{LogHandle, LoggerRegistry};
use crate::routing::matcher::DomainMatcher;

/// Resolved options plus the state derived from them: domain matchers, the
/// environment inherited by spawned children, and the log-handle registry.
#[derive(Debug)]
pub struct Configuration {
    options: ResolvedOptions,
    all_domains: Vec<String>,
    dns_domain_matcher: DomainMatcher,
    http_domain_matcher: DomainMatcher,
    environment: Environment,
    loggers: LoggerRegistry,
}

impl Configuration {
    /// Boot path: capture the process environment, evaluate the user
    /// configuration script, then resolve.
    pub async fn load(overrides: ConfigOverrides) -> Result<Self, ConfigError> {
        Self::load_with(overrides, Environment::from_process(), &ShellEvaluator::default()).await
    }

    /// `load` with an explicit base environment and script evaluator.
    pub async fn load_with<E: ScriptEvaluator>(
        overrides: ConfigOverrides,
        base: Environment,
        evaluator: &E,
    ) -> Result<Self, ConfigError> {
        let user_vars = match base.home_dir() {
            Some(home) => load_user_env(evaluator, &home.join(USER_CONFIG_FILE), &base).await?,
            None => {
                tracing::warn!("No home directory; skipping user configuration script");
                Default::default()
            }
        };
        Self::resolve(&overrides, base.merged(&user_vars))
    }

    /// Resolve against an already-prepared environment.
    pub fn resolve(overrides: &ConfigOverrides, environment: Environment) -> Result<Self, ConfigError> {
        let options = resolve_options(overrides, &environment)?;

        let mut all_domains = options.domains.clone();
        for domain in &options.ext_domains {
            if !all_domains.contains(domain) {
                all_domains.push(domain.clone());
            }
        }

        let config = Self {
            dns_domain_matcher: DomainMatcher::new(&options.domains),
            http_domain_matcher: DomainMatcher::new(&all_domains),
            loggers: LoggerRegistry::new(&options.log_root),
            all_domains,
            environment,
            options,
        };

        tracing::info!(
            domains = ?config.options.domains,
            ext_domains = ?config.options.ext_domains,
            host_root = %config.options.host_root.display(),
            http_port = config.options.http_port,
            dns_port = config.options.dns_port,
            "Configuration loaded"
        );
        Ok(config)
    }

    pub fn into_shared(self) -> Arc<Self> {
        Arc::new(self)
    }

    pub fn bin_path(&self) -> &Path {
        &self.options.bin
    }

    pub fn dst_port(&self) -> u16 {
        self.options.dst_port
    }

    pub fn http_port(&self) -> u16 {
        self.options.http_port
    }

    pub fn dns_port(&self) -> u16 {
        self.options.dns_port
    }

    /// Worker idle timeout in seconds.
    pub fn timeout(&self) -> u64 {
        self.options.timeout
    }

    pub fn workers(&self) -> usize {
        self.options.workers
    }

    pub fn domains(&self) -> &[String] {
        &self.options.domains
    }

    pub fn ext_domains(&self) -> &[String] {
        &self.options.ext_domains
    }

    /// `domains` followed by any `ext_domains` not already listed.
    pub fn all_domains(&self) -> &[String] {
        &self.all_domains
    }

    pub fn host_root(&self) -> &Path {
        &self.options.host_root
    }

    pub fn log_root(&self) -> &Path {
        &self.options.log_root
    }

    pub fn rvm_path(&self) -> &Path {
        &self.options.rvm_path
    }

    /// Matcher for DNS queries: `domains` only.
    pub fn dns_domain_matcher(&self) -> &DomainMatcher {
        &self.dns_domain_matcher
    }

    /// Matcher for HTTP requests: `domains` and `ext_domains`.
    pub fn http_domain_matcher(&self) -> &DomainMatcher {
        &self.http_domain_matcher
    }

    /// Environment to hand to spawned children.
    pub fn inherited_env(&self) -> &Environment {
        &self.environment
    }

    pub fn get_logger(&self, name: &str) -> Arc<LogHandle> {
        self.loggers.get_logger(name)
    }

    pub fn snapshot(&self) -> ConfigSnapshot {
        let o = &self.options;
        ConfigSnapshot {
            bin: o.bin.clone(),
            dst_port: o.dst_port,
            http_port: o.http_port,
            dns_port: o.dns_port,
            timeout: o.timeout,
            workers: o.workers,
            domains: o.domains.clone(),
            ext_domains: o.ext_domains.clone(),
            host_root: o.host_root.clone(),
            log_root: o.log_root.clone(),
            rvm_path: o.rvm_path.clone(),
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(&self.snapshot())
    }

    /// Path of the user configuration script for this environment.
    pub fn user_config_path(&self) -> Option<PathBuf> {
        self.environment.home_dir().map(|home| home.join(USER_CONFIG_FILE))
    }
}
