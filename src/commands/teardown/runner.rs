use crate::commands::announce;
use crate::commands::teardown::TeardownCommand;
use crate::error::Error;
use crate::identity;
use crate::runner::Runner;
use crate::stack::Stack;
use eyre::Context;
use std::io::{self, Write};

pub(crate) struct TeardownRunner {
    pub(crate) command: TeardownCommand,
}

impl Runner for TeardownRunner {
    async fn run(&mut self) -> Result<(), Error> {
        let config = self.config(&self.command.stack)?;

        announce("Tearing down", &config);

        let sdk = config.sdk().await;
        let stack = Stack::new(&sdk, config);

        if !stack.exists().await? {
            println!(
                "{} '{}'",
                console::style("Nothing to tear down, no stack named").yellow(),
                stack.name()
            );
            return Ok(());
        }

        if !self.command.yes && !confirmed(&stack.name())? {
            println!("{}", console::style("Teardown canceled").dim().bold());
            return Ok(());
        }

        let identity = identity::resolve(&sdk).await?;

        println!(
            "{} {} ({})",
            console::style("    Identity").cyan().bold(),
            identity.arn,
            identity.account
        );

        stack.delete().await?;

        stack
            .wait(self.command.poll_interval, self.command.timeout)
            .await?;

        println!(
            "{} {}",
            console::style("Stack torn down").green().bold(),
            stack.name()
        );

        Ok(())
    }
}

/// Ask before deleting, teardown is not reversible
fn confirmed(name: &str) -> Result<bool, Error> {
    print!(
        "{} {}: ",
        console::style(format!("Tear down '{name}'?")).bold(),
        console::style("[y/N]").dim()
    );
    io::stdout().flush().wrap_err("Failed to flush stdout")?;

    let mut input = String::new();
    io::stdin()
        .read_line(&mut input)
        .wrap_err("Failed to read input")?;

    Ok(matches!(input.trim().to_lowercase().as_ref(), "y" | "yes"))
}
