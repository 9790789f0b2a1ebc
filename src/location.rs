use eyre::bail;
use std::fmt;
use std::path::Path;
use std::str::FromStr;

/// Bucket and key prefix parsed from an s3:// URI
///
/// All published assets and the stack template live under this location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct S3Location {
    bucket: String,
    prefix: String,
}

impl S3Location {
    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Append a path to the key prefix
    pub fn join(&self, suffix: &str) -> Self {
        let suffix = suffix.trim_matches('/');

        let prefix = if self.prefix.is_empty() {
            suffix.to_string()
        } else {
            format!("{}/{}", self.prefix, suffix)
        };

        S3Location {
            bucket: self.bucket.clone(),
            prefix,
        }
    }

    /// Object key for a local file, relative to the published root
    ///
    /// Keys always use forward slashes regardless of the local separator.
    pub fn key_for(&self, root: &Path, file: &Path) -> eyre::Result<String> {
        let relative = file.strip_prefix(root)?;

        let relative = relative
            .components()
            .map(|c| c.as_os_str().to_string_lossy())
            .collect::<Vec<_>>()
            .join("/");

        if relative.is_empty() {
            bail!("File {file:?} is not below the publish root {root:?}");
        }

        Ok(self.join(&relative).prefix)
    }

    /// Region-qualified HTTPS form, as required by CloudFormation's TemplateURL
    pub fn https_url(&self, region: &str) -> String {
        format!(
            "https://s3-{region}.amazonaws.com/{bucket}/{prefix}",
            bucket = self.bucket,
            prefix = self.prefix
        )
    }
}

impl FromStr for S3Location {
    type Err = eyre::Report;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let Some(rest) = raw.strip_prefix("s3://") else {
            bail!("Not an s3:// URI: '{raw}'");
        };

        let (bucket, prefix) = rest.split_once('/').unwrap_or((rest, ""));

        if bucket.is_empty() {
            bail!("Missing bucket name in '{raw}'");
        }

        Ok(S3Location {
            bucket: bucket.to_string(),
            prefix: prefix.trim_matches('/').to_string(),
        })
    }
}

impl fmt::Display for S3Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.prefix.is_empty() {
            write!(f, "s3://{}", self.bucket)
        } else {
            write!(f, "s3://{}/{}", self.bucket, self.prefix)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn parses_bucket_and_prefix() {
        let location: S3Location = "s3://artifacts-repo/orders/1.2.3".parse().expect("location");
        assert_eq!(location.bucket(), "artifacts-repo");
        assert_eq!(location.prefix(), "orders/1.2.3");
    }

    #[test]
    fn parses_bucket_without_prefix() {
        let location: S3Location = "s3://artifacts-repo".parse().expect("location");
        assert_eq!(location.bucket(), "artifacts-repo");
        assert_eq!(location.prefix(), "");
        assert_eq!(location.to_string(), "s3://artifacts-repo");
    }

    #[test]
    fn rejects_other_schemes() {
        assert!("https://example.com/x".parse::<S3Location>().is_err());
        assert!("s3://".parse::<S3Location>().is_err());
    }

    #[test]
    fn join_extends_the_prefix() {
        let location: S3Location = "s3://bucket/base/".parse().expect("location");
        assert_eq!(location.join("templates/template.json").prefix(), "base/templates/template.json");

        let bare: S3Location = "s3://bucket".parse().expect("location");
        assert_eq!(bare.join("/file.json").prefix(), "file.json");
    }

    #[test]
    fn key_for_uses_forward_slashes() {
        let location: S3Location = "s3://bucket/orders/1.0.0".parse().expect("location");
        let root = PathBuf::from("/work/infrastructure/dynamic");
        let file = root.join("templates").join("template.json");

        let key = location.key_for(&root, &file).expect("key");
        assert_eq!(key, "orders/1.0.0/templates/template.json");
    }

    #[test]
    fn key_for_rejects_files_outside_root() {
        let location: S3Location = "s3://bucket/prefix".parse().expect("location");
        let root = PathBuf::from("/work/infrastructure");

        assert!(location.key_for(&root, &PathBuf::from("/tmp/other.json")).is_err());
    }

    #[test]
    fn https_url_is_region_qualified() {
        let location: S3Location = "s3://bucket/a/b.json".parse().expect("location");
        assert_eq!(
            location.https_url("eu-west-1"),
            "https://s3-eu-west-1.amazonaws.com/bucket/a/b.json"
        );
    }
}
