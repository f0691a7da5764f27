//! Static metadata bound to every record a logger emits.
//!
//! Keys follow a strict define-or-omit rule, applied recursively: a key whose
//! source resolves to nothing is left out of the mapping entirely, so emitted
//! records never carry literal `null` metadata fields.

use crate::env::{
    Environment, RuntimeContext, ENVIRONMENT_VAR, EXECUTION_ENV_VAR, FUNCTION_MEMORY_VAR,
    FUNCTION_NAME_VAR, FUNCTION_VERSION_VAR, LOG_STREAM_VAR, REGION_VAR, STAGE_VAR,
    SYSTEM_CODE_VAR,
};
use serde_json::{Map, Value};
use std::collections::BTreeMap;

/// Fixed `sourceType` value marking machine-readable output.
pub const SOURCE_TYPE_JSON: &str = "_json";

/// Compute the static metadata set for one logger.
///
/// Every candidate key is computed as either a defined value or an explicit
/// absence, then the defined subset is kept. Pure: reads only the captured
/// snapshot and the derived context.
pub fn static_metadata(env: &Environment, ctx: &RuntimeContext) -> BTreeMap<String, Value> {
    let candidates = [
        (
            "sourceType",
            ctx.is_production
                .then(|| Value::String(SOURCE_TYPE_JSON.to_string())),
        ),
        ("systemCode", string_value(env.get(SYSTEM_CODE_VAR))),
        (
            "environment",
            string_value(env.first_of(&[ENVIRONMENT_VAR, STAGE_VAR])),
        ),
        ("lambda", ctx.is_serverless.then(|| lambda_facts(env))),
    ];

    candidates
        .into_iter()
        .filter_map(|(key, value)| value.map(|value| (key.to_string(), value)))
        .collect()
}

/// Serverless execution facts, each omitted individually when its source
/// variable is absent.
fn lambda_facts(env: &Environment) -> Value {
    let candidates = [
        ("region", REGION_VAR),
        ("executionEnv", EXECUTION_ENV_VAR),
        ("functionName", FUNCTION_NAME_VAR),
        ("functionMemorySize", FUNCTION_MEMORY_VAR),
        ("functionVersion", FUNCTION_VERSION_VAR),
        ("logStreamName", LOG_STREAM_VAR),
    ];

    let mut facts = Map::new();
    for (key, var) in candidates {
        if let Some(value) = string_value(env.get(var)) {
            facts.insert(key.to_string(), value);
        }
    }
    Value::Object(facts)
}

fn string_value(value: Option<&str>) -> Option<Value> {
    value.map(|v| Value::String(v.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::{DEPLOY_ENV_VAR, LAMBDA_TASK_ROOT_VAR};

    fn context(env: &Environment) -> RuntimeContext {
        RuntimeContext::from_env(env)
    }

    #[test]
    fn source_type_present_only_in_production() {
        let prod = Environment::from_iter([(DEPLOY_ENV_VAR, "production")]);
        let metadata = static_metadata(&prod, &context(&prod));
        assert_eq!(metadata["sourceType"], SOURCE_TYPE_JSON);

        let dev = Environment::from_iter([(DEPLOY_ENV_VAR, "development")]);
        let metadata = static_metadata(&dev, &context(&dev));
        assert!(!metadata.contains_key("sourceType"));
    }

    #[test]
    fn system_code_from_env() {
        let env = Environment::from_iter([(SYSTEM_CODE_VAR, "stubSystemCode")]);
        let metadata = static_metadata(&env, &context(&env));
        assert_eq!(metadata["systemCode"], "stubSystemCode");
    }

    #[test]
    fn environment_prefers_primary_then_stage() {
        let primary =
            Environment::from_iter([(ENVIRONMENT_VAR, "env-test"), (STAGE_VAR, "stage-test")]);
        let metadata = static_metadata(&primary, &context(&primary));
        assert_eq!(metadata["environment"], "env-test");

        let stage_only = Environment::from_iter([(STAGE_VAR, "stage-test")]);
        let metadata = static_metadata(&stage_only, &context(&stage_only));
        assert_eq!(metadata["environment"], "stage-test");
    }

    #[test]
    fn absent_sources_leave_no_keys_behind() {
        let env = Environment::default();
        let metadata = static_metadata(&env, &context(&env));
        assert!(metadata.is_empty());
    }

    #[test]
    fn lambda_facts_follow_define_or_omit_recursively() {
        let env = Environment::from_iter([
            (LAMBDA_TASK_ROOT_VAR, "/var/task"),
            (EXECUTION_ENV_VAR, "AWS_Lambda_nodejs18.x"),
            (REGION_VAR, "eu-west-1"),
            (FUNCTION_NAME_VAR, "ingest"),
        ]);
        let metadata = static_metadata(&env, &context(&env));
        let lambda = metadata["lambda"].as_object().unwrap();
        assert_eq!(lambda["region"], "eu-west-1");
        assert_eq!(lambda["functionName"], "ingest");
        assert_eq!(lambda["executionEnv"], "AWS_Lambda_nodejs18.x");
        assert!(!lambda.contains_key("functionMemorySize"));
        assert!(!lambda.contains_key("functionVersion"));
        assert!(!lambda.contains_key("logStreamName"));
    }

    #[test]
    fn lambda_absent_outside_serverless() {
        let env = Environment::from_iter([(REGION_VAR, "eu-west-1")]);
        let metadata = static_metadata(&env, &context(&env));
        assert!(!metadata.contains_key("lambda"));
    }
}
