//! User configuration script evaluation.
//!
//! # Responsibilities
//! - Evaluate `~/.powconfig` once at boot, if it exists
//! - Report the variables the script added or changed
//!
//! # Design Decisions
//! - A missing script is not an error and yields no variables
//! - The script sees only the captured environment, never ambient state
//! - Evaluation sits behind `ScriptEvaluator` so boot can be tested
//!   without a shell

use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::Stdio;

use thiserror::Error;
use tokio::process::Command;

use crate::config::environment::Environment;

/// File name of the user configuration script, relative to the home directory.
pub const USER_CONFIG_FILE: &str = ".powconfig";

/// Variables a shell sets on its own; never reported as user configuration.
const SHELL_BOOKKEEPING: &[&str] = &["PWD", "OLDPWD", "SHLVL", "_"];

/// Failure while evaluating the user configuration script.
#[derive(Debug, Error)]
pub enum ConfigLoadError {
    #[error("failed to run {shell} for {path}: {source}")]
    Spawn {
        shell: String,
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("{path} exited with status {status:?}: {stderr}")]
    Failed {
        path: PathBuf,
        status: Option<i32>,
        stderr: String,
    },

    #[error("{path} produced an environment that is not valid UTF-8")]
    InvalidOutput { path: PathBuf },
}

/// Something that can run a configuration script and dump the resulting
/// environment as NUL-terminated `NAME=value` records.
pub trait ScriptEvaluator {
    fn evaluate(
        &self,
        script: &Path,
        base: &Environment,
    ) -> impl Future<Output = Result<String, ConfigLoadError>> + Send;
}

/// Sources the script with a POSIX shell and prints `env -0`.
#[derive(Debug, Clone)]
pub struct ShellEvaluator {
    shell: String,
}

impl ShellEvaluator {
    pub fn new(shell: impl Into<String>) -> Self {
        Self { shell: shell.into() }
    }
}

impl Default for ShellEvaluator {
    fn default() -> Self {
        Self::new("/bin/sh")
    }
}

impl ScriptEvaluator for ShellEvaluator {
    async fn evaluate(&self, script: &Path, base: &Environment) -> Result<String, ConfigLoadError> {
        let output = Command::new(&self.shell)
            .arg("-c")
            .arg(r#". "$1" >/dev/null && env -0"#)
            .arg("sh")
            .arg(script)
            .env_clear()
            .envs(base.iter())
            .stdin(Stdio::null())
            .output()
            .await
            .map_err(|source| ConfigLoadError::Spawn {
                shell: self.shell.clone(),
                path: script.to_path_buf(),
                source,
            })?;

        if !output.status.success() {
            return Err(ConfigLoadError::Failed {
                path: script.to_path_buf(),
                status: output.status.code(),
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_string(),
            });
        }

        String::from_utf8(output.stdout).map_err(|_| ConfigLoadError::InvalidOutput {
            path: script.to_path_buf(),
        })
    }
}

/// Evaluate the script at `path` and return the variables it introduced.
pub async fn load_user_env<E: ScriptEvaluator>(
    evaluator: &E,
    path: &Path,
    base: &Environment,
) -> Result<BTreeMap<String, String>, ConfigLoadError> {
    match tokio::fs::metadata(path).await {
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            tracing::debug!(path = %path.display(), "No user configuration script");
            return Ok(BTreeMap::new());
        }
        _ => {}
    }

    let output = evaluator.evaluate(path, base).await?;
    let vars = diff_env(parse_env_output(&output), base);

    tracing::info!(
        path = %path.display(),
        variables = vars.len(),
        "Loaded user configuration script"
    );
    Ok(vars)
}

/// Parse `env -0` output. Values may contain newlines; records that are
/// not a valid `NAME=value` assignment are skipped.
pub fn parse_env_output(output: &str) -> BTreeMap<String, String> {
    output
        .split('\0')
        .filter_map(split_assignment)
        .map(|(name, value)| (name.to_string(), value.to_string()))
        .collect()
}

fn split_assignment(record: &str) -> Option<(&str, &str)> {
    let (name, value) = record.split_once('=')?;
    let mut chars = name.chars();
    let first = chars.next()?;
    let valid = (first.is_ascii_alphabetic() || first == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_');
    valid.then_some((name, value))
}

fn diff_env(vars: BTreeMap<String, String>, base: &Environment) -> BTreeMap<String, String> {
    vars.into_iter()
        .filter(|(k, _)| !SHELL_BOOKKEEPING.contains(&k.as_str()))
        .filter(|(k, v)| base.as_map().get(k) != Some(v))
        .collect()
}
