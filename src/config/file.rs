use crate::config::stack::{Tag, TemplateType};
use eyre::Context;
use serde::Deserialize;
use std::path::Path;

/// FileConfig is the structure of stackctl.toml
///
/// Every field is optional; CLI arguments take precedence over the file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct FileConfig {
    /// [stack]
    /// name = "orders"
    #[serde(default)]
    pub stack: StackSection,

    /// [[tags]]
    /// key = "Billing"
    /// value = "Platforms"
    pub tags: Option<Vec<Tag>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct StackSection {
    pub name: Option<String>,
    pub env: Option<String>,
    pub region: Option<String>,
    pub profile: Option<String>,
    pub template_type: Option<TemplateType>,
    pub template_s3_uri: Option<String>,
    pub path: Option<String>,
}

impl FileConfig {
    pub fn from_dir(dir: &Path) -> eyre::Result<Self> {
        let config_toml_path = dir.join("stackctl.toml");

        if let Ok(toml_string) = std::fs::read_to_string(&config_toml_path) {
            let config = toml::from_str(&toml_string).wrap_err("Failed to parse stackctl.toml")?;
            Ok(config)
        } else {
            // Return default config if stackctl.toml is not found
            Ok(FileConfig::default())
        }
    }
}
