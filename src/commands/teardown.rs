mod runner;
use crate::commands::StackArgs;
use crate::runner::{Runnable, Runner};
use clap::ArgAction;
use runner::TeardownRunner;
use std::time::Duration;

#[derive(clap::Args, Clone)]
pub(crate) struct TeardownCommand {
    #[command(flatten)]
    stack: StackArgs,

    /// Skip the interactive confirmation
    #[arg(short, long, action = ArgAction::SetTrue)]
    yes: bool,

    /// How often to poll the stack status while waiting
    #[arg(long, default_value = "2s", value_parser = humantime::parse_duration)]
    poll_interval: Duration,

    /// Give up waiting after this long
    #[arg(long, default_value = "30m", value_parser = humantime::parse_duration)]
    timeout: Duration,
}

impl Runnable for TeardownCommand {
    fn runner(&self) -> impl Runner {
        TeardownRunner {
            command: self.clone(),
        }
    }
}
