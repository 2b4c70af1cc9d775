use crate::api::config::{
    ENV_API_BASE_URL, ENV_LOGOUT_PATH, ENV_REFRESH_PATH, ENV_RENEWAL_TIMEOUT, ENV_REQUEST_TIMEOUT,
    ENV_VERIFY_PATH,
};
use clap::{Arg, ArgAction, Command};

pub const ARG_API_BASE_URL: &str = "api-base-url";
pub const ARG_ACCESS_TOKEN: &str = "access-token";
pub const ARG_COOKIE: &str = "cookie";
pub const ARG_REQUEST_TIMEOUT: &str = "request-timeout";
pub const ARG_RENEWAL_TIMEOUT: &str = "renewal-timeout";
pub const ARG_REFRESH_PATH: &str = "refresh-path";
pub const ARG_VERIFY_PATH: &str = "verify-path";
pub const ARG_LOGOUT_PATH: &str = "logout-path";
pub const ARG_LOGIN_PATH: &str = "login-path";
pub const ARG_FAIL_OPEN: &str = "fail-open";

#[must_use]
pub fn with_args(command: Command) -> Command {
    command
        .arg(
            Arg::new(ARG_API_BASE_URL)
                .short('u')
                .long("api-base-url")
                .help("API origin, example: https://api.tld")
                .env(ENV_API_BASE_URL)
                .global(true),
        )
        .arg(
            Arg::new(ARG_ACCESS_TOKEN)
                .long("access-token")
                .help("Access token to start with; renewed on 401")
                .env("TOKENGATE_ACCESS_TOKEN")
                .hide_env_values(true)
                .global(true),
        )
        .arg(
            Arg::new(ARG_COOKIE)
                .short('c')
                .long("cookie")
                .help("Cookie for the API origin in Set-Cookie syntax, e.g. the refresh cookie")
                .action(ArgAction::Append)
                .global(true),
        )
        .arg(
            Arg::new(ARG_REQUEST_TIMEOUT)
                .long("request-timeout")
                .help("Per-request timeout in seconds (default: 10)")
                .env(ENV_REQUEST_TIMEOUT)
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_RENEWAL_TIMEOUT)
                .long("renewal-timeout")
                .help("Upper bound for one renewal in seconds (default: 10)")
                .env(ENV_RENEWAL_TIMEOUT)
                .global(true)
                .value_parser(clap::value_parser!(u64).range(1..)),
        )
        .arg(
            Arg::new(ARG_REFRESH_PATH)
                .long("refresh-path")
                .help("Renewal endpoint (default: /auth/refresh)")
                .env(ENV_REFRESH_PATH)
                .global(true),
        )
        .arg(
            Arg::new(ARG_VERIFY_PATH)
                .long("verify-path")
                .help("Session verification endpoint (default: /auth/verify)")
                .env(ENV_VERIFY_PATH)
                .global(true),
        )
        .arg(
            Arg::new(ARG_LOGOUT_PATH)
                .long("logout-path")
                .help("Logout endpoint (default: /auth/logout)")
                .env(ENV_LOGOUT_PATH)
                .global(true),
        )
        .arg(
            Arg::new(ARG_LOGIN_PATH)
                .long("login-path")
                .help("Redirect target when the session cannot be renewed")
                .default_value("/login")
                .env("TOKENGATE_LOGIN_PATH")
                .global(true),
        )
        .arg(
            Arg::new(ARG_FAIL_OPEN)
                .long("fail-open")
                .help("Let navigation proceed when verification fails for reasons other than 401")
                .env("TOKENGATE_FAIL_OPEN")
                .global(true)
                .action(ArgAction::SetTrue),
        )
}
