use crate::{
    cli::globals::GlobalArgs,
    navigation::{routes::RouteTable, Navigation, NavigationGuard},
};
use anyhow::Result;

/// Evaluates the navigation guard for `path` against the dashboard routes.
///
/// # Errors
/// Returns an error if the client cannot be built.
pub async fn execute(globals: &GlobalArgs, path: &str) -> Result<String> {
    let guard = NavigationGuard::new(
        globals.client()?,
        RouteTable::dashboard(),
        globals.guard_config(),
    );

    Ok(match guard.before_each(path).await {
        Navigation::Proceed => "proceed".to_string(),
        Navigation::Redirect { to } => format!("redirect {to}"),
    })
}
