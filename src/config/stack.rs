use crate::commands::StackArgs;
use crate::config::file::FileConfig;
use crate::error::Error;
use crate::location::S3Location;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use eyre::Context;
use serde::Deserialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

const DEFAULT_REGION: &str = "eu-west-1";
const DEFAULT_ARTIFACTS_BUCKET: &str = "artifacts-repo";

/// Whether the stack serves a single environment or is shared infrastructure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TemplateType {
    Static,
    Dynamic,
}

impl TemplateType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TemplateType::Static => "static",
            TemplateType::Dynamic => "dynamic",
        }
    }
}

impl fmt::Display for TemplateType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TemplateType {
    type Err = String;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        match raw {
            "static" => Ok(TemplateType::Static),
            "dynamic" => Ok(TemplateType::Dynamic),
            other => Err(format!(
                "unknown template type '{other}', expected 'static' or 'dynamic'"
            )),
        }
    }
}

/// A tag attached to the stack and propagated to its resources
#[derive(Debug, Clone, Deserialize)]
pub struct Tag {
    pub key: String,
    pub value: String,
}

/// Fully resolved stack configuration
///
/// Built from defaults, stackctl.toml and CLI arguments, in that order.
#[derive(Debug, Clone)]
pub struct StackConfig {
    /// Application name, a trailing "-service" suffix already trimmed
    pub name: String,

    /// Deployment environment; env-less stacks are shared (static) infrastructure
    pub env: Option<String>,

    /// Build version, drives the artifacts location and the BuildVersion parameter
    pub version: Option<String>,

    pub region: String,
    pub profile: String,
    pub template_type: TemplateType,

    /// Root of the local templates and parameters tree
    pub path: PathBuf,

    pub tags: Vec<Tag>,

    /// Build-time parameter overrides from the command line
    pub params: Vec<(String, String)>,

    /// Explicit artifacts location; defaults are derived per version otherwise
    pub template_s3_uri: Option<S3Location>,
}

impl StackConfig {
    pub fn resolve(args: &StackArgs) -> eyre::Result<Self> {
        let cwd = std::env::current_dir().wrap_err("Failed to read current directory")?;
        Self::resolve_in(args, &cwd)
    }

    /// Resolution rooted at an explicit directory
    pub fn resolve_in(args: &StackArgs, dir: &Path) -> eyre::Result<Self> {
        let file = FileConfig::from_dir(dir)?;

        let name = args
            .name
            .clone()
            .or(file.stack.name)
            .ok_or_else(|| {
                Error::new(
                    "Missing stack name",
                    Some("Pass --name <name> or set name under [stack] in stackctl.toml"),
                )
            })?;

        // Service crates are conventionally named "<app>-service", while the
        // stack is named after the app alone
        let name = name.strip_suffix("-service").unwrap_or(&name).to_string();
        let env = args.env.clone().or(file.stack.env);

        let template_type = args
            .template_type
            .or(file.stack.template_type)
            .unwrap_or(if env.is_some() {
                TemplateType::Dynamic
            } else {
                TemplateType::Static
            });

        let profile = args.profile.clone().or(file.stack.profile).unwrap_or_else(|| {
            if template_type == TemplateType::Static || env.as_deref() == Some("prod") {
                "prod".to_string()
            } else {
                "preprod".to_string()
            }
        });

        let path = args
            .path
            .clone()
            .or(file.stack.path.map(PathBuf::from))
            .unwrap_or_else(|| dir.join("infrastructure").join(template_type.as_str()));

        let template_s3_uri = args
            .template_s3_uri
            .clone()
            .or(file.stack.template_s3_uri)
            .map(|raw| raw.parse::<S3Location>())
            .transpose()
            .wrap_err("Invalid template S3 URI")?;

        Ok(StackConfig {
            name,
            env,
            version: args.version.clone(),
            region: args
                .region
                .clone()
                .or(file.stack.region)
                .unwrap_or_else(|| DEFAULT_REGION.to_string()),
            profile,
            template_type,
            path,
            tags: file.tags.unwrap_or_else(|| {
                vec![Tag {
                    key: "Billing".to_string(),
                    value: "Platforms".to_string(),
                }]
            }),
            params: args.params.clone(),
            template_s3_uri,
        })
    }

    /// Name of the deployed stack
    pub fn stack_name(&self) -> String {
        match &self.env {
            Some(env) => format!("{}-{}", self.name, env),
            None => self.name.clone(),
        }
    }

    /// Build version, required by the verbs that publish or deploy
    pub fn version(&self) -> eyre::Result<&str> {
        self.version.as_deref().ok_or_else(|| {
            eyre::Report::new(Error::new(
                "Missing stack version",
                Some("Pass --version <version>, usually the build number of the pipeline"),
            ))
        })
    }

    /// S3 location holding the published templates and parameters
    pub fn artifacts_location(&self) -> eyre::Result<S3Location> {
        if let Some(location) = &self.template_s3_uri {
            return Ok(location.clone());
        }

        format!(
            "s3://{DEFAULT_ARTIFACTS_BUCKET}/{name}/{version}/cloudformation/{template_type}",
            name = self.name,
            version = self.version()?,
            template_type = self.template_type
        )
        .parse()
    }

    /// HTTPS URL of the main template, passed to CreateStack/UpdateStack
    pub fn template_url(&self) -> eyre::Result<String> {
        Ok(self
            .artifacts_location()?
            .join("templates/template.json")
            .https_url(&self.region))
    }

    /// Parameters file for the configured environment
    pub fn params_file(&self) -> PathBuf {
        let file_name = match &self.env {
            Some(env) => format!("parameters-{env}.json"),
            None => "parameters.json".to_string(),
        };

        self.path.join("parameters").join(file_name)
    }

    /// Load the AWS SDK configuration for the configured profile and region
    pub async fn sdk(&self) -> SdkConfig {
        aws_config::defaults(BehaviorVersion::v2025_01_17())
            .profile_name(&self.profile)
            .region(Region::new(self.region.clone()))
            .load()
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::StackArgs;

    fn args(name: &str) -> StackArgs {
        StackArgs {
            name: Some(name.to_string()),
            ..StackArgs::default()
        }
    }

    #[test]
    fn defaults_for_an_env_stack() {
        let mut args = args("orders-service");
        args.env = Some("dev".to_string());

        let dir = tempfile::tempdir().expect("tempdir");
        let config = StackConfig::resolve_in(&args, dir.path()).expect("config");

        assert_eq!(config.name, "orders");
        assert_eq!(config.stack_name(), "orders-dev");
        assert_eq!(config.region, "eu-west-1");
        assert_eq!(config.profile, "preprod");
        assert_eq!(config.template_type, TemplateType::Dynamic);
        assert_eq!(
            config.path,
            dir.path().join("infrastructure").join("dynamic")
        );
        assert_eq!(
            config.params_file(),
            config.path.join("parameters").join("parameters-dev.json")
        );
    }

    #[test]
    fn env_less_stack_is_static_and_uses_prod_profile() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = StackConfig::resolve_in(&args("registry"), dir.path()).expect("config");

        assert_eq!(config.stack_name(), "registry");
        assert_eq!(config.template_type, TemplateType::Static);
        assert_eq!(config.profile, "prod");
        assert_eq!(
            config.params_file(),
            config.path.join("parameters").join("parameters.json")
        );
    }

    #[test]
    fn prod_env_uses_prod_profile() {
        let mut args = args("orders");
        args.env = Some("prod".to_string());

        let dir = tempfile::tempdir().expect("tempdir");
        let config = StackConfig::resolve_in(&args, dir.path()).expect("config");

        assert_eq!(config.profile, "prod");
        assert_eq!(config.template_type, TemplateType::Dynamic);
    }

    #[test]
    fn artifacts_location_derives_from_name_version_and_type() {
        let mut args = args("orders");
        args.env = Some("dev".to_string());
        args.version = Some("1.2.3".to_string());

        let dir = tempfile::tempdir().expect("tempdir");
        let config = StackConfig::resolve_in(&args, dir.path()).expect("config");

        assert_eq!(
            config.artifacts_location().expect("location").to_string(),
            "s3://artifacts-repo/orders/1.2.3/cloudformation/dynamic"
        );
        assert_eq!(
            config.template_url().expect("url"),
            "https://s3-eu-west-1.amazonaws.com/artifacts-repo/orders/1.2.3/cloudformation/dynamic/templates/template.json"
        );
    }

    #[test]
    fn artifacts_location_requires_a_version_unless_explicit() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = StackConfig::resolve_in(&args("orders"), dir.path()).expect("config");
        assert!(config.artifacts_location().is_err());

        let mut args = args("orders");
        args.template_s3_uri = Some("s3://my-bucket/custom/prefix".to_string());
        let config = StackConfig::resolve_in(&args, dir.path()).expect("config");

        assert_eq!(
            config.artifacts_location().expect("location").to_string(),
            "s3://my-bucket/custom/prefix"
        );
    }

    #[test]
    fn file_config_fills_gaps_and_cli_wins() {
        let dir = tempfile::tempdir().expect("tempdir");
        std::fs::write(
            dir.path().join("stackctl.toml"),
            r#"
                [stack]
                name = "billing-service"
                env = "staging"
                region = "us-east-1"

                [[tags]]
                key = "Team"
                value = "Payments"
            "#,
        )
        .expect("write config");

        let config = StackConfig::resolve_in(&StackArgs::default(), dir.path()).expect("config");
        assert_eq!(config.name, "billing");
        assert_eq!(config.env.as_deref(), Some("staging"));
        assert_eq!(config.region, "us-east-1");
        assert_eq!(config.tags.len(), 1);
        assert_eq!(config.tags[0].key, "Team");

        let mut args = StackArgs::default();
        args.env = Some("prod".to_string());
        let config = StackConfig::resolve_in(&args, dir.path()).expect("config");
        assert_eq!(config.env.as_deref(), Some("prod"));
        assert_eq!(config.region, "us-east-1");
    }

    #[test]
    fn missing_name_is_an_error() {
        let dir = tempfile::tempdir().expect("tempdir");
        let result = StackConfig::resolve_in(&StackArgs::default(), dir.path());

        assert!(result
            .expect_err("should fail")
            .to_string()
            .contains("Missing stack name"));
    }

    #[test]
    fn default_tags_apply_without_a_file() {
        let dir = tempfile::tempdir().expect("tempdir");
        let config = StackConfig::resolve_in(&args("orders"), dir.path()).expect("config");

        assert_eq!(config.tags.len(), 1);
        assert_eq!(config.tags[0].key, "Billing");
        assert_eq!(config.tags[0].value, "Platforms");
    }
}
