mod runner;
use crate::commands::StackArgs;
use crate::runner::{Runnable, Runner};
use clap::ArgAction;
use runner::DescribeRunner;

#[derive(clap::Args, Clone)]
pub(crate) struct DescribeCommand {
    #[command(flatten)]
    stack: StackArgs,

    /// Print the raw stack description as JSON
    #[arg(long, action = ArgAction::SetTrue)]
    json: bool,
}

impl Runnable for DescribeCommand {
    fn runner(&self) -> impl Runner {
        DescribeRunner {
            command: self.clone(),
        }
    }
}
