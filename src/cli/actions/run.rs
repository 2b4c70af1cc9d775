use crate::cli::actions::{navigate, request, session, Action};
use anyhow::Result;

/// Execute the provided action and return what should be printed.
// This is the single dispatch point for all CLI actions.
/// # Errors
/// Returns an error if the action fails.
pub async fn execute(action: Action) -> Result<String> {
    match action {
        Action::Get { globals, path } => request::get(&globals, &path).await,
        Action::Verify { globals } => session::verify(&globals).await,
        Action::Refresh {
            globals,
            show_token,
        } => session::refresh(&globals, show_token).await,
        Action::Navigate { globals, path } => navigate::execute(&globals, &path).await,
        Action::Logout { globals } => session::logout(&globals).await,
    }
}
