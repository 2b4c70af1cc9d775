use crate::{
    cli::{
        actions::Action,
        commands::{self, session},
        globals::GlobalArgs,
    },
    navigation::FailurePolicy,
};
use anyhow::{anyhow, Context, Result};
use clap::ArgMatches;
use secrecy::SecretString;
use std::time::Duration;

/// Reads the session options, which clap propagates to every subcommand.
///
/// # Errors
/// Returns an error if `--api-base-url` is missing.
pub fn globals(matches: &ArgMatches) -> Result<GlobalArgs> {
    let api_base_url = matches
        .get_one::<String>(session::ARG_API_BASE_URL)
        .cloned()
        .context("missing required argument: --api-base-url")?;

    let mut globals = GlobalArgs::new(api_base_url);

    if let Some(token) = matches.get_one::<String>(session::ARG_ACCESS_TOKEN) {
        globals.set_token(SecretString::from(token.clone()));
    }
    globals.cookies = matches
        .get_many::<String>(session::ARG_COOKIE)
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    globals.request_timeout = matches
        .get_one::<u64>(session::ARG_REQUEST_TIMEOUT)
        .map(|secs| Duration::from_secs(*secs));
    globals.renewal_timeout = matches
        .get_one::<u64>(session::ARG_RENEWAL_TIMEOUT)
        .map(|secs| Duration::from_secs(*secs));
    globals.refresh_path = matches.get_one::<String>(session::ARG_REFRESH_PATH).cloned();
    globals.verify_path = matches.get_one::<String>(session::ARG_VERIFY_PATH).cloned();
    globals.logout_path = matches.get_one::<String>(session::ARG_LOGOUT_PATH).cloned();
    if let Some(login_path) = matches.get_one::<String>(session::ARG_LOGIN_PATH) {
        globals.login_path.clone_from(login_path);
    }
    if matches.get_flag(session::ARG_FAIL_OPEN) {
        globals.failure_policy = FailurePolicy::Open;
    }

    Ok(globals)
}

fn path(matches: &ArgMatches) -> Result<String> {
    matches
        .get_one::<String>(commands::ARG_PATH)
        .cloned()
        .context("missing required argument: <path>")
}

/// # Errors
/// Returns an error if the subcommand is unknown or required arguments are missing.
pub fn handler(matches: &ArgMatches) -> Result<Action> {
    let Some((name, sub_m)) = matches.subcommand() else {
        return Err(anyhow!("missing command"));
    };
    let globals = globals(sub_m)?;

    match name {
        commands::CMD_GET => Ok(Action::Get {
            globals,
            path: path(sub_m)?,
        }),
        commands::CMD_VERIFY => Ok(Action::Verify { globals }),
        commands::CMD_REFRESH => Ok(Action::Refresh {
            globals,
            show_token: sub_m.get_flag(commands::ARG_SHOW_TOKEN),
        }),
        commands::CMD_NAVIGATE => Ok(Action::Navigate {
            globals,
            path: path(sub_m)?,
        }),
        commands::CMD_LOGOUT => Ok(Action::Logout { globals }),
        other => Err(anyhow!("unknown command: {other}")),
    }
}
