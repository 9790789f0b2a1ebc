use crate::commands::announce;
use crate::commands::setup::SetupCommand;
use crate::error::Error;
use crate::identity;
use crate::params;
use crate::runner::Runner;
use crate::stack::{Stack, UpdateOutcome};
use crate::upload::Uploader;

pub(crate) struct SetupRunner {
    pub(crate) command: SetupCommand,
}

impl Runner for SetupRunner {
    async fn run(&mut self) -> Result<(), Error> {
        let config = self.config(&self.command.stack)?;

        // Setup always publishes, so fail fast without a version
        config.version()?;

        announce("Setting up", &config);

        let sdk = config.sdk().await;
        let identity = identity::resolve(&sdk).await?;

        println!(
            "{} {} ({})",
            console::style("    Identity").cyan().bold(),
            identity.arn,
            identity.account
        );

        // Publish assets first so the template URL resolves during create/update
        let uploaded = Uploader::new(&sdk, config.artifacts_location()?)
            .publish_dir(&config.path)
            .await?;

        println!(
            "{} {uploaded} file(s)",
            console::style("   Published").green().bold()
        );

        let params = params::assemble(&config)?;
        let stack = Stack::new(&sdk, config.clone());

        if stack.exists().await? {
            if stack.update(&params).await? == UpdateOutcome::NotChanged {
                println!("{}", console::style("No changes to deploy").yellow().bold());
                return Ok(());
            }

            println!(
                "{} {}",
                console::style("    Updating").cyan().bold(),
                stack.name()
            );
        } else {
            stack.create(&params).await?;

            println!(
                "{} {}",
                console::style("    Creating").cyan().bold(),
                stack.name()
            );
        }

        let status = stack
            .wait(self.command.poll_interval, self.command.timeout)
            .await?;

        println!(
            "{} {} ({})",
            console::style("Stack set up successfully").green().bold(),
            stack.name(),
            status.as_str()
        );

        Ok(())
    }
}
