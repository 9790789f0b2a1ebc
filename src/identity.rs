use aws_config::SdkConfig;
use eyre::Context;

/// Caller account and ARN behind the configured credentials
///
/// Logged before mutating operations so pipeline output shows which
/// account was touched.
pub struct Identity {
    pub account: String,
    pub arn: String,
}

pub async fn resolve(sdk_config: &SdkConfig) -> eyre::Result<Identity> {
    let client = aws_sdk_sts::Client::new(sdk_config);

    let identity = client
        .get_caller_identity()
        .send()
        .await
        .wrap_err("Failed to resolve caller identity")?;

    let account = identity
        .account()
        .ok_or_else(|| eyre::Error::msg("Failed to get AWS account ID"))?;

    let arn = identity
        .arn()
        .ok_or_else(|| eyre::Error::msg("Failed to get caller ARN"))?;

    Ok(Identity {
        account: account.to_string(),
        arn: arn.to_string(),
    })
}
