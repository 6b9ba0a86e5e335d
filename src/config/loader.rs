//! Configuration loading and option resolution.
//!
//! Every option resolves as: explicit override, else its environment
//! variable, else the built-in default.

use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use crate::config::environment::Environment;
use crate::config::schema::{
    ConfigOverrides, DomainList, DEFAULT_DNS_PORT, DEFAULT_DOMAIN, DEFAULT_DST_PORT,
    DEFAULT_HTTP_PORT, DEFAULT_TIMEOUT_SECS, DEFAULT_WORKERS,
};
use crate::config::user_env::ConfigLoadError;
use crate::config::validation::{validate, ResolvedValues, ValidationError};

pub const ENV_BIN: &str = "POW_BIN";
pub const ENV_DST_PORT: &str = "POW_DST_PORT";
pub const ENV_HTTP_PORT: &str = "POW_HTTP_PORT";
pub const ENV_DNS_PORT: &str = "POW_DNS_PORT";
pub const ENV_TIMEOUT: &str = "POW_TIMEOUT";
pub const ENV_WORKERS: &str = "POW_WORKERS";
pub const ENV_DOMAINS: &str = "POW_DOMAINS";
pub const ENV_DOMAIN_LEGACY: &str = "POW_DOMAIN";
pub const ENV_EXT_DOMAINS: &str = "POW_EXT_DOMAINS";
pub const ENV_HOST_ROOT: &str = "POW_HOST_ROOT";
pub const ENV_LOG_ROOT: &str = "POW_LOG_ROOT";
pub const ENV_RVM_PATH: &str = "POW_RVM_PATH";

/// Error type for configuration loading.
#[derive(Debug)]
pub enum ConfigError {
    Io(PathBuf, std::io::Error),
    Parse(toml::de::Error),
    InvalidNumber { option: &'static str, value: String },
    NoHomeDirectory { option: &'static str },
    Validation(Vec<ValidationError>),
    UserConfig(ConfigLoadError),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::Io(path, e) => write!(f, "IO error reading {}: {}", path.display(), e),
            ConfigError::Parse(e) => write!(f, "Parse error: {}", e),
            ConfigError::InvalidNumber { option, value } => {
                write!(f, "Invalid value {:?} for {}", value, option)
            }
            ConfigError::NoHomeDirectory { option } => {
                write!(f, "Cannot determine a default for {}: no home directory", option)
            }
            ConfigError::Validation(errors) => {
                write!(f, "Validation failed: ")?;
                for (i, err) in errors.iter().enumerate() {
                    if i > 0 { write!(f, ", ")?; }
                    write!(f, "{}", err)?;
                }
                Ok(())
            }
            ConfigError::UserConfig(e) => write!(f, "User configuration failed: {}", e),
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::Io(_, e) => Some(e),
            ConfigError::Parse(e) => Some(e),
            ConfigError::UserConfig(e) => Some(e),
            _ => None,
        }
    }
}

impl From<ConfigLoadError> for ConfigError {
    fn from(e: ConfigLoadError) -> Self {
        ConfigError::UserConfig(e)
    }
}

/// Load explicit overrides from a TOML file.
pub fn load_overrides(path: &Path) -> Result<ConfigOverrides, ConfigError> {
    let content = fs::read_to_string(path).map_err(|e| ConfigError::Io(path.to_path_buf(), e))?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Fully resolved option values, before derived state is built.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedOptions {
    pub bin: PathBuf,
    pub dst_port: u16,
    pub http_port: u16,
    pub dns_port: u16,
    pub timeout: u64,
    pub workers: usize,
    pub domains: Vec<String>,
    pub ext_domains: Vec<String>,
    pub host_root: PathBuf,
    pub log_root: PathBuf,
    pub rvm_path: PathBuf,
}

/// Resolve every option against `overrides` and `env`, then validate.
pub fn resolve_options(
    overrides: &ConfigOverrides,
    env: &Environment,
) -> Result<ResolvedOptions, ConfigError> {
    let dst_port = resolve_number(overrides.dst_port, env, ENV_DST_PORT, DEFAULT_DST_PORT)?;
    let http_port = resolve_number(overrides.http_port, env, ENV_HTTP_PORT, DEFAULT_HTTP_PORT)?;
    let dns_port = resolve_number(overrides.dns_port, env, ENV_DNS_PORT, DEFAULT_DNS_PORT)?;
    let timeout = resolve_number(overrides.timeout, env, ENV_TIMEOUT, DEFAULT_TIMEOUT_SECS)?;
    let workers = resolve_number(overrides.workers, env, ENV_WORKERS, DEFAULT_WORKERS)?;

    let mut domains = resolve_list(
        overrides.domains.as_ref(),
        env,
        &[ENV_DOMAINS, ENV_DOMAIN_LEGACY],
    );
    if domains.is_empty() {
        domains.push(DEFAULT_DOMAIN.to_string());
    }
    let ext_domains = resolve_list(overrides.ext_domains.as_ref(), env, &[ENV_EXT_DOMAINS]);

    validate(&ResolvedValues {
        dst_port,
        http_port,
        dns_port,
        timeout,
        workers,
        domains: &domains,
    })
    .map_err(ConfigError::Validation)?;

    let bin = match resolve_path(overrides.bin.as_ref(), env, ENV_BIN) {
        Some(path) => path,
        None => std::env::current_exe().unwrap_or_else(|_| PathBuf::from("pow")),
    };
    let host_root = match resolve_path(overrides.host_root.as_ref(), env, ENV_HOST_ROOT) {
        Some(path) => path,
        None => default_host_root(env)?,
    };
    let log_root = match resolve_path(overrides.log_root.as_ref(), env, ENV_LOG_ROOT) {
        Some(path) => path,
        None => default_log_root(env)?,
    };
    let rvm_path = match resolve_path(overrides.rvm_path.as_ref(), env, ENV_RVM_PATH) {
        Some(path) => path,
        None => home(env, "rvm_path")?.join(".rvm/scripts/rvm"),
    };

    Ok(ResolvedOptions {
        bin,
        dst_port,
        http_port,
        dns_port,
        timeout,
        workers,
        domains,
        ext_domains,
        host_root,
        log_root,
        rvm_path,
    })
}

fn resolve_number<T: FromStr>(
    explicit: Option<T>,
    env: &Environment,
    var: &'static str,
    default: T,
) -> Result<T, ConfigError> {
    if let Some(value) = explicit {
        return Ok(value);
    }
    match env.get(var) {
        Some(raw) => raw.trim().parse().map_err(|_| ConfigError::InvalidNumber {
            option: var,
            value: raw.to_string(),
        }),
        None => Ok(default),
    }
}

fn resolve_list(explicit: Option<&DomainList>, env: &Environment, vars: &[&'static str]) -> Vec<String> {
    match explicit {
        Some(list) => list.normalize(),
        None => env
            .get_any(vars)
            .map(|(_, raw)| DomainList::from(raw).normalize())
            .unwrap_or_default(),
    }
}

fn resolve_path(explicit: Option<&PathBuf>, env: &Environment, var: &'static str) -> Option<PathBuf> {
    explicit.cloned().or_else(|| env.get(var).map(PathBuf::from))
}

fn home(env: &Environment, option: &'static str) -> Result<PathBuf, ConfigError> {
    env.home_dir().ok_or(ConfigError::NoHomeDirectory { option })
}

fn default_host_root(env: &Environment) -> Result<PathBuf, ConfigError> {
    Ok(application_support(env, "host_root")?.join("Pow").join("Hosts"))
}

fn default_log_root(env: &Environment) -> Result<PathBuf, ConfigError> {
    if cfg!(target_os = "macos") {
        Ok(home(env, "log_root")?.join("Library").join("Logs").join("Pow"))
    } else {
        Ok(application_support(env, "log_root")?.join("Pow").join("Logs"))
    }
}

/// `~/Library/Application Support` on macOS, the XDG data directory elsewhere.
/// Derived from `HOME` in `env` so an explicit home always wins.
fn application_support(env: &Environment, option: &'static str) -> Result<PathBuf, ConfigError> {
    let home = home(env, option)?;
    if cfg!(target_os = "macos") {
        Ok(home.join("Library").join("Application Support"))
    } else {
        Ok(env
            .get("XDG_DATA_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|| home.join(".local").join("share")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn env(vars: &[(&str, &str)]) -> Environment {
        let mut all = vec![("HOME", "/home/pow")];
        all.extend_from_slice(vars);
        Environment::from_vars(all.iter().copied())
    }

    #[test]
    fn test_defaults() {
        let opts = resolve_options(&ConfigOverrides::default(), &env(&[])).unwrap();
        assert_eq!(opts.dst_port, 80);
        assert_eq!(opts.http_port, 20559);
        assert_eq!(opts.dns_port, 20560);
        assert_eq!(opts.timeout, 900);
        assert_eq!(opts.workers, 2);
        assert_eq!(opts.domains, vec!["dev"]);
        assert!(opts.ext_domains.is_empty());
        assert_eq!(opts.rvm_path, PathBuf::from("/home/pow/.rvm/scripts/rvm"));
        assert!(opts.host_root.starts_with("/home/pow"));
        assert!(opts.host_root.ends_with("Pow/Hosts"));
    }

    #[test]
    fn test_environment_beats_default() {
        let opts = resolve_options(
            &ConfigOverrides::default(),
            &env(&[(ENV_WORKERS, "8"), (ENV_DOMAINS, "dev,test"), (ENV_HOST_ROOT, "/srv/hosts")]),
        )
        .unwrap();
        assert_eq!(opts.workers, 8);
        assert_eq!(opts.domains, vec!["dev", "test"]);
        assert_eq!(opts.host_root, PathBuf::from("/srv/hosts"));
    }

    #[test]
    fn test_override_beats_environment() {
        let overrides = ConfigOverrides {
            workers: Some(3),
            domains: Some(DomainList::from(vec!["local".to_string()])),
            ..Default::default()
        };
        let opts = resolve_options(&overrides, &env(&[(ENV_WORKERS, "8"), (ENV_DOMAINS, "dev,test")])).unwrap();
        assert_eq!(opts.workers, 3);
        assert_eq!(opts.domains, vec!["local"]);
    }

    #[test]
    fn test_legacy_domain_variable() {
        let opts = resolve_options(&ConfigOverrides::default(), &env(&[(ENV_DOMAIN_LEGACY, "test")])).unwrap();
        assert_eq!(opts.domains, vec!["test"]);

        let opts = resolve_options(
            &ConfigOverrides::default(),
            &env(&[(ENV_DOMAIN_LEGACY, "test"), (ENV_DOMAINS, "dev")]),
        )
        .unwrap();
        assert_eq!(opts.domains, vec!["dev"]);
    }

    #[test]
    fn test_empty_domain_list_falls_back() {
        let opts = resolve_options(&ConfigOverrides::default(), &env(&[(ENV_DOMAINS, " , ")])).unwrap();
        assert_eq!(opts.domains, vec!["dev"]);
    }

    #[test]
    fn test_malformed_number() {
        let err = resolve_options(&ConfigOverrides::default(), &env(&[(ENV_HTTP_PORT, "http")])).unwrap_err();
        match err {
            ConfigError::InvalidNumber { option, value } => {
                assert_eq!(option, ENV_HTTP_PORT);
                assert_eq!(value, "http");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_zero_workers_rejected() {
        let err = resolve_options(&ConfigOverrides::default(), &env(&[(ENV_WORKERS, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(ref errors) if errors.len() == 1));
    }

    #[test]
    fn test_load_overrides_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("pow.toml");
        fs::write(&path, "timeout = 60\next_domains = \"example.com\"\n").unwrap();

        let overrides = load_overrides(&path).unwrap();
        assert_eq!(overrides.timeout, Some(60));

        let missing = load_overrides(&dir.path().join("missing.toml"));
        assert!(matches!(missing, Err(ConfigError::Io(..))));
    }
}
