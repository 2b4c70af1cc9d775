use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};
use secrecy::ExposeSecret;
use tracing::info;

/// Runs the session verification call.
///
/// # Errors
/// Returns an error if the session is not valid or the call fails.
pub async fn verify(globals: &GlobalArgs) -> Result<String> {
    let client = globals.client()?;
    let status = client
        .verify_session()
        .await
        .context("session verification failed")?;

    Ok(format!("verified ({})", status.as_u16()))
}

/// Runs a coordinated renewal. The token is only printed when asked for.
///
/// # Errors
/// Returns an error if the renewal fails.
pub async fn refresh(globals: &GlobalArgs, show_token: bool) -> Result<String> {
    let client = globals.client()?;
    let token = client.renew().await.context("access token renewal failed")?;
    info!("access token renewed");

    if show_token {
        Ok(token.expose_secret().to_string())
    } else {
        Ok("renewed".to_string())
    }
}

/// Ends the session. The local token is dropped even when the call fails.
///
/// # Errors
/// Returns an error if the logout call fails.
pub async fn logout(globals: &GlobalArgs) -> Result<String> {
    let client = globals.client()?;
    client.logout().await.context("logout failed")?;

    Ok("logged out".to_string())
}
