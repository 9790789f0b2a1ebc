use crate::commands::StackArgs;
use crate::config::stack::StackConfig;
use crate::error::Error;
use std::error::Error as StdError;

pub(crate) trait Runner {
    /// Resolved stack configuration for the current working directory
    fn config(&self, args: &StackArgs) -> Result<StackConfig, Error> {
        StackConfig::resolve(args).map_err(Error::from)
    }

    /// Run the command
    ///
    /// Returns an error shown to the user in case of failure
    async fn run(&mut self) -> Result<(), Error>;

    /// Construct an error shown to the user
    fn error(
        &self,
        title: Option<&str>,
        description: Option<&str>,
        origin: Option<Box<dyn StdError>>,
    ) -> Error {
        if let Some(origin) = origin {
            log::error!("{origin:?}");
        }

        if let Some(title) = title {
            Error::new(title, description)
        } else {
            Error::new(
                "Failed to run the command",
                Some("Check the arguments and try again"),
            )
        }
    }
}

/// Return a runner for a command
pub(crate) trait Runnable {
    fn runner(&self) -> impl Runner;
}
