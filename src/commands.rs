pub mod describe;
pub mod publish;
pub mod setup;
pub mod teardown;
use crate::config::stack::{StackConfig, TemplateType};
use clap::Subcommand;
use std::path::PathBuf;

#[derive(Subcommand)]
pub enum Commands {
    /// Show the deployed stack's status, outputs and parameters
    Describe(describe::DescribeCommand),

    /// Publish assets, then create or update the stack and wait for it
    Setup(setup::SetupCommand),

    /// Upload templates and parameters to the artifacts location
    Publish(publish::PublishCommand),

    /// [DANGER] Delete the stack and wait until it is gone
    Teardown(teardown::TeardownCommand),
}

/// Arguments shared by every verb
///
/// Each one maps onto a stackctl.toml field; command line values win.
#[derive(clap::Args, Clone, Debug, Default)]
pub(crate) struct StackArgs {
    /// Application name; a trailing "-service" suffix is trimmed
    #[arg(short, long)]
    pub(crate) name: Option<String>,

    /// Deployment environment, e.g. dev or prod; omit for a static stack
    #[arg(short, long)]
    pub(crate) env: Option<String>,

    /// Build version, published under the artifacts location
    #[arg(long)]
    pub(crate) version: Option<String>,

    /// AWS region the stack lives in
    #[arg(short, long)]
    pub(crate) region: Option<String>,

    /// Credentials profile from the shared AWS config
    #[arg(long)]
    pub(crate) profile: Option<String>,

    /// Stack parameter override, repeatable
    #[arg(short, long = "param", value_name = "KEY=VALUE", value_parser = parse_param)]
    pub(crate) params: Vec<(String, String)>,

    /// Artifacts location, e.g. s3://artifacts-repo/orders/1.2.3/cloudformation/dynamic
    #[arg(long, value_name = "S3_URI")]
    pub(crate) template_s3_uri: Option<String>,

    /// Root of the local templates and parameters tree
    #[arg(long, value_name = "PATH")]
    pub(crate) path: Option<PathBuf>,

    /// Template type, otherwise derived from --env
    #[arg(long, value_name = "static|dynamic")]
    pub(crate) template_type: Option<TemplateType>,
}

/// Parse a KEY=VALUE parameter override
fn parse_param(raw: &str) -> Result<(String, String), String> {
    raw.split_once('=')
        .map(|(key, value)| (key.trim().to_string(), value.to_string()))
        .filter(|(key, _)| !key.is_empty())
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))
}

/// Print the operation banner in the cargo style
pub(crate) fn announce(operation: &str, config: &StackConfig) {
    let label = |name: &str| console::style(format!("{name:>14}:")).dim();

    println!();
    println!(
        "{} {}",
        console::style(format!("{operation:>14}")).cyan().bold(),
        console::style(config.stack_name()).bold()
    );
    println!(
        "{} {}",
        label("Environment"),
        config.env.as_deref().unwrap_or("static")
    );
    println!("{} Profile('{}')", label("Credentials"), config.profile);
    println!("{} {}", label("Region"), config.region);
    println!("{} {}", label("Path"), config.path.display());

    if let Ok(location) = config.artifacts_location() {
        println!("{} {}", label("S3 Uri"), location);
    }

    println!();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn param_splits_on_the_first_equals_sign() {
        assert_eq!(
            parse_param("BuildVersion=1.2.3").expect("param"),
            ("BuildVersion".to_string(), "1.2.3".to_string())
        );

        assert_eq!(
            parse_param("ConnectionString=host=db;port=5432").expect("param"),
            (
                "ConnectionString".to_string(),
                "host=db;port=5432".to_string()
            )
        );
    }

    #[test]
    fn param_without_a_key_or_separator_is_rejected() {
        assert!(parse_param("NoSeparator").is_err());
        assert!(parse_param("=value-only").is_err());
    }
}
