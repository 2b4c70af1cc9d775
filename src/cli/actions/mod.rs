pub mod navigate;
pub mod request;
pub mod session;

// Internal "interpreter" for `Action`.
mod run;

use crate::cli::globals::GlobalArgs;

#[derive(Debug)]
pub enum Action {
    Get { globals: GlobalArgs, path: String },
    Verify { globals: GlobalArgs },
    Refresh { globals: GlobalArgs, show_token: bool },
    Navigate { globals: GlobalArgs, path: String },
    Logout { globals: GlobalArgs },
}

impl Action {
    /// Execute the action and print its output to stdout.
    /// # Errors
    /// Returns an error if the action fails.
    pub async fn execute(self) -> anyhow::Result<()> {
        let output = run::execute(self).await?;
        println!("{output}");
        Ok(())
    }
}
