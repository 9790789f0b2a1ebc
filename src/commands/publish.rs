mod runner;
use crate::commands::StackArgs;
use crate::runner::{Runnable, Runner};
use runner::PublishRunner;

#[derive(clap::Args, Clone)]
pub(crate) struct PublishCommand {
    #[command(flatten)]
    stack: StackArgs,
}

impl Runnable for PublishCommand {
    fn runner(&self) -> impl Runner {
        PublishRunner {
            command: self.clone(),
        }
    }
}
