use crate::cli::globals::GlobalArgs;
use anyhow::{Context, Result};
use serde_json::Value;
use tracing::debug;

/// GET `path` through the renewal interceptor and pretty-print the JSON body.
///
/// # Errors
/// Returns an error if the request or a needed renewal fails.
pub async fn get(globals: &GlobalArgs, path: &str) -> Result<String> {
    let client = globals.client()?;
    let body: Value = client
        .get_json(path)
        .await
        .with_context(|| format!("GET {path} failed"))?;
    debug!(renewal_state = ?client.coordinator().state(), "request complete");

    Ok(serde_json::to_string_pretty(&body)?)
}
