mod runner;
use crate::commands::StackArgs;
use crate::runner::{Runnable, Runner};
use runner::SetupRunner;
use std::time::Duration;

#[derive(clap::Args, Clone)]
pub(crate) struct SetupCommand {
    #[command(flatten)]
    stack: StackArgs,

    /// How often to poll the stack status while waiting
    #[arg(long, default_value = "2s", value_parser = humantime::parse_duration)]
    poll_interval: Duration,

    /// Give up waiting after this long
    #[arg(long, default_value = "30m", value_parser = humantime::parse_duration)]
    timeout: Duration,
}

impl Runnable for SetupCommand {
    fn runner(&self) -> impl Runner {
        SetupRunner {
            command: self.clone(),
        }
    }
}
