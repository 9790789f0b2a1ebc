use crate::commands::announce;
use crate::commands::publish::PublishCommand;
use crate::error::Error;
use crate::identity;
use crate::runner::Runner;
use crate::upload::Uploader;

pub(crate) struct PublishRunner {
    pub(crate) command: PublishCommand,
}

impl Runner for PublishRunner {
    async fn run(&mut self) -> Result<(), Error> {
        let config = self.config(&self.command.stack)?;
        let location = config.artifacts_location()?;

        announce("Publishing", &config);

        let sdk = config.sdk().await;
        let identity = identity::resolve(&sdk).await?;

        println!(
            "{} {} ({})",
            console::style("    Identity").cyan().bold(),
            identity.arn,
            identity.account
        );

        let uploaded = Uploader::new(&sdk, location.clone())
            .publish_dir(&config.path)
            .await?;

        println!(
            "{} {uploaded} file(s) to {location}",
            console::style("   Published").green().bold()
        );

        Ok(())
    }
}
