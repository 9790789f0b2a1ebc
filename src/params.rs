use crate::config::stack::StackConfig;
use crate::error::Error;
use eyre::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// A single stack input value, as stored in parameters-<env>.json
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Parameter {
    pub parameter_key: String,
    pub parameter_value: String,
}

impl Parameter {
    pub fn new(key: &str, value: &str) -> Self {
        Parameter {
            parameter_key: key.to_string(),
            parameter_value: value.to_string(),
        }
    }
}

impl From<&Parameter> for aws_sdk_cloudformation::types::Parameter {
    fn from(parameter: &Parameter) -> Self {
        aws_sdk_cloudformation::types::Parameter::builder()
            .parameter_key(&parameter.parameter_key)
            .parameter_value(&parameter.parameter_value)
            .build()
    }
}

/// Assemble the full parameter list for a create or update request
///
/// Build-time overrides win over the per-environment file. ApplicationName
/// and DeploymentEnv are appended when the file does not set them.
pub fn assemble(config: &StackConfig) -> eyre::Result<Vec<Parameter>> {
    let merged = merge(load(&config.params_file())?, overrides(config));
    Ok(finalize(merged, config))
}

/// Build-time overrides, BuildVersion defaulted from the configured version
fn overrides(config: &StackConfig) -> Vec<Parameter> {
    let mut result: Vec<Parameter> = config
        .params
        .iter()
        .map(|(key, value)| Parameter::new(key, value))
        .collect();

    if let Some(version) = &config.version {
        if !contains(&result, "BuildVersion") {
            result.push(Parameter::new("BuildVersion", version));
        }
    }

    result
}

fn load(path: &Path) -> eyre::Result<Vec<Parameter>> {
    let raw = std::fs::read_to_string(path).wrap_err(Error::new(
        &format!("No parameters found at {path:?}"),
        Some("The parameters file follows the pattern 'parameters-<env>.json'"),
    ))?;

    serde_json::from_str(&raw).wrap_err(format!("Failed to parse {path:?} as JSON"))
}

fn merge(file: Vec<Parameter>, overrides: Vec<Parameter>) -> Vec<Parameter> {
    let mut result: Vec<Parameter> = file
        .into_iter()
        .filter(|parameter| !contains(&overrides, &parameter.parameter_key))
        .collect();

    result.extend(overrides);
    result
}

fn finalize(mut params: Vec<Parameter>, config: &StackConfig) -> Vec<Parameter> {
    if !contains(&params, "ApplicationName") {
        params.push(Parameter::new("ApplicationName", &config.name));
    }

    if let Some(env) = &config.env {
        if !contains(&params, "DeploymentEnv") {
            params.push(Parameter::new("DeploymentEnv", env));
        }
    }

    params
}

fn contains(params: &[Parameter], key: &str) -> bool {
    params.iter().any(|parameter| parameter.parameter_key == key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::StackArgs;
    use crate::config::stack::StackConfig;
    use std::fs;

    fn config(dir: &std::path::Path, env: Option<&str>) -> StackConfig {
        let args = StackArgs {
            name: Some("orders".to_string()),
            env: env.map(|e| e.to_string()),
            version: Some("42".to_string()),
            ..StackArgs::default()
        };

        StackConfig::resolve_in(&args, dir).expect("config")
    }

    fn write_params(config: &StackConfig, content: &str) {
        let path = config.params_file();
        fs::create_dir_all(path.parent().expect("parent")).expect("mkdir");
        fs::write(path, content).expect("write");
    }

    #[test]
    fn overrides_win_over_file_entries() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = config(dir.path(), Some("dev"));
        config.params = vec![("InstanceCount".to_string(), "5".to_string())];

        write_params(
            &config,
            r#"[
                {"ParameterKey": "InstanceCount", "ParameterValue": "1"},
                {"ParameterKey": "LogLevel", "ParameterValue": "info"}
            ]"#,
        );

        let params = assemble(&config).expect("params");
        let count = params
            .iter()
            .find(|p| p.parameter_key == "InstanceCount")
            .expect("InstanceCount");

        assert_eq!(count.parameter_value, "5");
        assert!(params.iter().any(|p| p.parameter_key == "LogLevel"));
    }

    #[test]
    fn build_version_defaults_but_can_be_overridden() {
        let dir = tempfile::tempdir().expect("tempdir");
        let mut config = config(dir.path(), Some("dev"));
        write_params(&config, "[]");

        let params = assemble(&config).expect("params");
        let version = params
            .iter()
            .find(|p| p.parameter_key == "BuildVersion")
            .expect("BuildVersion");
        assert_eq!(version.parameter_value, "42");

        config.params = vec![("BuildVersion".to_string(), "43".to_string())];
        let params = assemble(&config).expect("params");
        let versions: Vec<_> = params
            .iter()
            .filter(|p| p.parameter_key == "BuildVersion")
            .collect();

        assert_eq!(versions.len(), 1);
        assert_eq!(versions[0].parameter_value, "43");
    }

    #[test]
    fn identity_parameters_are_appended_only_when_absent() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config(dir.path(), Some("dev"));

        write_params(
            &config,
            r#"[{"ParameterKey": "ApplicationName", "ParameterValue": "legacy-name"}]"#,
        );

        let params = assemble(&config).expect("params");
        let names: Vec<_> = params
            .iter()
            .filter(|p| p.parameter_key == "ApplicationName")
            .collect();

        assert_eq!(names.len(), 1);
        assert_eq!(names[0].parameter_value, "legacy-name");

        let env = params
            .iter()
            .find(|p| p.parameter_key == "DeploymentEnv")
            .expect("DeploymentEnv");
        assert_eq!(env.parameter_value, "dev");
    }

    #[test]
    fn static_stacks_have_no_deployment_env() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config(dir.path(), None);
        write_params(&config, "[]");

        let params = assemble(&config).expect("params");
        assert!(!params.iter().any(|p| p.parameter_key == "DeploymentEnv"));
        assert!(params.iter().any(|p| p.parameter_key == "ApplicationName"));
    }

    #[test]
    fn missing_file_error_names_the_pattern() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = config(dir.path(), Some("dev"));

        let error = assemble(&config).expect_err("should fail").to_string();
        assert!(error.contains("No parameters found"));
    }

    #[test]
    fn file_keys_deserialize_from_pascal_case() {
        let params: Vec<Parameter> =
            serde_json::from_str(r#"[{"ParameterKey": "A", "ParameterValue": "b"}]"#)
                .expect("parse");

        assert_eq!(params[0], Parameter::new("A", "b"));
    }
}
