//! Environment variable names consumed by the logger, plus the one-shot
//! snapshot the factory takes of them.
//!
//! Environment access happens exactly once, inside [`Environment::capture`].
//! Everything downstream works off the captured snapshot, so no component
//! re-reads process state after construction.

use std::collections::BTreeMap;

/// Deployment environment name; selects production vs. development output.
pub const DEPLOY_ENV_VAR: &str = "APP_ENV";

/// Optional minimum-level override, e.g. `debug` or `silent`.
pub const LOG_LEVEL_VAR: &str = "CONSOLE_LOG_LEVEL";

/// System identity code attached as `systemCode` metadata.
pub const SYSTEM_CODE_VAR: &str = "SYSTEM_CODE";

/// Primary source for the `environment` metadata key.
pub const ENVIRONMENT_VAR: &str = "ENVIRONMENT";

/// Fallback source for the `environment` metadata key.
pub const STAGE_VAR: &str = "STAGE";

/// Serverless task-root marker; set by the Lambda runtime.
pub const LAMBDA_TASK_ROOT_VAR: &str = "LAMBDA_TASK_ROOT";

/// Serverless execution-environment marker, e.g. `AWS_Lambda_nodejs18.x`.
pub const EXECUTION_ENV_VAR: &str = "AWS_EXECUTION_ENV";

/// Region the function runs in.
pub const REGION_VAR: &str = "AWS_REGION";

/// Name of the invoked function.
pub const FUNCTION_NAME_VAR: &str = "AWS_LAMBDA_FUNCTION_NAME";

/// Configured memory size in megabytes.
pub const FUNCTION_MEMORY_VAR: &str = "AWS_LAMBDA_FUNCTION_MEMORY_SIZE";

/// Published version of the invoked function.
pub const FUNCTION_VERSION_VAR: &str = "AWS_LAMBDA_FUNCTION_VERSION";

/// CloudWatch log stream the runtime writes to.
pub const LOG_STREAM_VAR: &str = "AWS_LAMBDA_LOG_STREAM_NAME";

/// Lowercased values of [`DEPLOY_ENV_VAR`] that count as production.
const PRODUCTION_ALIASES: [&str; 3] = ["production", "prod", "p"];

/// Immutable snapshot of the process environment, taken once per logger
/// construction.
///
/// Tests build synthetic snapshots with [`Environment::from_iter`] instead of
/// mutating process-global state.
#[derive(Clone, Debug, Default)]
pub struct Environment {
    vars: BTreeMap<String, String>,
}

impl Environment {
    /// Capture the current process environment.
    pub fn capture() -> Self {
        Self {
            vars: std::env::vars().collect(),
        }
    }

    /// Build a snapshot from explicit key/value pairs.
    pub fn from_iter<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            vars: pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    /// Raw lookup. Absent variables are valid inputs, never errors.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    /// Lookup that treats the empty string the same as an absent variable.
    pub fn get_non_empty(&self, key: &str) -> Option<&str> {
        self.get(key).filter(|v| !v.is_empty())
    }

    /// First defined value among the given keys.
    pub fn first_of(&self, keys: &[&str]) -> Option<&str> {
        keys.iter().find_map(|key| self.get(key))
    }
}

/// Runtime classification derived from an [`Environment`] snapshot.
///
/// Computed once per logger construction and immutable for that logger's
/// lifetime; passed by plain argument to every component that branches on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RuntimeContext {
    /// `APP_ENV` named a production alias.
    pub is_production: bool,
    /// Both serverless markers were present and non-empty.
    pub is_serverless: bool,
}

impl RuntimeContext {
    /// Classify the given snapshot.
    pub fn from_env(env: &Environment) -> Self {
        Self {
            is_production: is_production(env),
            is_serverless: is_serverless(env),
        }
    }
}

fn is_production(env: &Environment) -> bool {
    env.get(DEPLOY_ENV_VAR)
        .map(|value| PRODUCTION_ALIASES.contains(&value.to_lowercase().as_str()))
        .unwrap_or(false)
}

fn is_serverless(env: &Environment) -> bool {
    env.get_non_empty(LAMBDA_TASK_ROOT_VAR).is_some()
        && env.get_non_empty(EXECUTION_ENV_VAR).is_some()
}
