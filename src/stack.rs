use crate::config::stack::StackConfig;
use crate::error::Error;
use crate::logger::Logger;
use crate::params::Parameter;
use aws_config::SdkConfig;
use aws_sdk_cloudformation::error::{ProvideErrorMetadata, SdkError};
use aws_sdk_cloudformation::types::{Capability, StackStatus, Tag};
use eyre::Context;
use std::time::{Duration, Instant};

const CAPABILITIES: [Capability; 2] = [Capability::CapabilityIam, Capability::CapabilityNamedIam];

/// How a polled stack status should be treated
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Readiness {
    InProgress,
    Complete,
    Failed,
}

/// Classify a stack status for the poll loop
///
/// Rollback statuses are terminal for CloudFormation but mean the requested
/// operation failed.
pub fn readiness(status: &StackStatus) -> Readiness {
    match status {
        StackStatus::CreateComplete
        | StackStatus::UpdateComplete
        | StackStatus::DeleteComplete => Readiness::Complete,

        StackStatus::RollbackComplete | StackStatus::UpdateRollbackComplete => Readiness::Failed,

        other if other.as_str().ends_with("FAILED") => Readiness::Failed,

        _ => Readiness::InProgress,
    }
}

/// Outcome of an update request
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpdateOutcome {
    Updating,
    NotChanged,
}

/// The deployed CloudFormation stack addressed by the resolved configuration
pub struct Stack {
    client: aws_sdk_cloudformation::Client,
    config: StackConfig,
}

impl Stack {
    pub fn new(sdk_config: &SdkConfig, config: StackConfig) -> Self {
        Stack {
            client: aws_sdk_cloudformation::Client::new(sdk_config),
            config,
        }
    }

    pub fn name(&self) -> String {
        self.config.stack_name()
    }

    /// Full description of the deployed stack
    pub async fn describe(&self) -> eyre::Result<aws_sdk_cloudformation::types::Stack> {
        let name = self.name();

        let response = match self.client.describe_stacks().stack_name(&name).send().await {
            Ok(response) => response,
            Err(e) if error_code(&e) == Some("ValidationError") => {
                return Err(Error::new(
                    &format!("No stack found with name '{name}'"),
                    Some("Run `stackctl setup` to create it"),
                )
                .into());
            }
            Err(e) => return Err(e).wrap_err("Failed to describe stack"),
        };

        response
            .stacks()
            .first()
            .cloned()
            .ok_or_else(|| Error::new(&format!("No stack found with name '{name}'"), None).into())
    }

    /// Check if the stack already exists
    pub async fn exists(&self) -> eyre::Result<bool> {
        let result = self
            .client
            .describe_stacks()
            .stack_name(self.name())
            .send()
            .await;

        if let Err(e) = &result {
            if error_code(e) == Some("ValidationError") {
                return Ok(false);
            }

            return Err(eyre::eyre!("Failed to describe stack: {:?}", e));
        }

        Ok(true)
    }

    /// Request stack creation from the published template
    pub async fn create(&self, params: &[Parameter]) -> eyre::Result<()> {
        log::debug!(
            "Creating stack '{}' from {} with parameters {params:?}",
            self.name(),
            self.config.template_url()?
        );

        self.client
            .create_stack()
            .stack_name(self.name())
            .set_capabilities(Some(CAPABILITIES.to_vec()))
            .set_parameters(Some(params.iter().map(Into::into).collect()))
            .set_tags(Some(self.tags()?))
            .template_url(self.config.template_url()?)
            .send()
            .await
            .wrap_err("Failed to create stack")?;

        Ok(())
    }

    /// Request a stack update from the published template
    ///
    /// An update with nothing to change is reported as NotChanged, not as an
    /// error.
    pub async fn update(&self, params: &[Parameter]) -> eyre::Result<UpdateOutcome> {
        log::debug!(
            "Updating stack '{}' from {} with parameters {params:?}",
            self.name(),
            self.config.template_url()?
        );

        let result = self
            .client
            .update_stack()
            .stack_name(self.name())
            .set_capabilities(Some(CAPABILITIES.to_vec()))
            .set_parameters(Some(params.iter().map(Into::into).collect()))
            .set_tags(Some(self.tags()?))
            .template_url(self.config.template_url()?)
            .send()
            .await;

        match result {
            Ok(_) => Ok(UpdateOutcome::Updating),
            Err(e) if is_noop_update(&e) => Ok(UpdateOutcome::NotChanged),
            Err(e) => Err(e).wrap_err("Failed to update stack"),
        }
    }

    pub async fn delete(&self) -> eyre::Result<()> {
        self.client
            .delete_stack()
            .stack_name(self.name())
            .send()
            .await
            .wrap_err("Failed to delete stack")?;

        Ok(())
    }

    /// Poll the stack until the in-flight operation reaches a terminal status
    ///
    /// A stack that disappears while polling terminates the wait as a
    /// completed deletion.
    pub async fn wait(&self, poll_interval: Duration, timeout: Duration) -> eyre::Result<StackStatus> {
        let name = self.name();
        let progress = Logger::spinner();
        progress.enable_steady_tick(Duration::from_millis(120));
        progress.set_message(format!("Waiting for {name}"));

        let started = Instant::now();

        loop {
            if started.elapsed() > timeout {
                progress.finish_and_clear();

                return Err(Error::new(
                    &format!("Timed out waiting for stack '{name}'"),
                    Some("The operation keeps running remotely, check the CloudFormation console"),
                )
                .into());
            }

            tokio::time::sleep(poll_interval).await;

            let response = match self
                .client
                .describe_stacks()
                .stack_name(&name)
                .send()
                .await
            {
                Ok(response) => response,
                Err(e) if error_code(&e) == Some("ValidationError") => {
                    // The stack is gone, which is how a delete ends
                    progress.finish_and_clear();
                    return Ok(StackStatus::DeleteComplete);
                }
                Err(e) => {
                    progress.finish_and_clear();
                    return Err(e).wrap_err("Failed to poll stack status");
                }
            };

            let Some(status) = response.stacks().first().and_then(|s| s.stack_status()) else {
                continue;
            };

            log::debug!("Stack '{name}' is {status}", status = status.as_str());
            progress.set_message(format!("{name}: {status}", status = status.as_str()));

            match readiness(status) {
                Readiness::InProgress => continue,
                Readiness::Complete => {
                    progress.finish_and_clear();
                    return Ok(status.clone());
                }
                Readiness::Failed => {
                    progress.finish_and_clear();

                    return Err(Error::new(
                        &format!("Stack '{name}' settled in {} state", status.as_str()),
                        Some("Inspect the stack events in the CloudFormation console for the failed resource"),
                    )
                    .into());
                }
            }
        }
    }

    fn tags(&self) -> eyre::Result<Vec<Tag>> {
        self.config
            .tags
            .iter()
            .map(|tag| {
                Ok(Tag::builder()
                    .key(&tag.key)
                    .value(&tag.value)
                    .build())
            })
            .collect()
    }
}

fn error_code<E: ProvideErrorMetadata, R>(error: &SdkError<E, R>) -> Option<&str> {
    match error {
        SdkError::ServiceError(service) => service.err().meta().code(),
        _ => None,
    }
}

/// CloudFormation rejects an update with nothing to do as a ValidationError
fn is_noop_update<E: ProvideErrorMetadata, R>(error: &SdkError<E, R>) -> bool {
    error_code(error) == Some("ValidationError")
        && match error {
            SdkError::ServiceError(service) => service
                .err()
                .meta()
                .message()
                .is_some_and(|message| message.contains("No updates are to be performed")),
            _ => false,
        }
}
