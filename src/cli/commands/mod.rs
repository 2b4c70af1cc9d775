pub mod logging;
pub mod session;

use clap::{
    builder::styling::{AnsiColor, Effects, Styles},
    Arg, ArgAction, ColorChoice, Command,
};

pub const CMD_GET: &str = "get";
pub const CMD_VERIFY: &str = "verify";
pub const CMD_REFRESH: &str = "refresh";
pub const CMD_NAVIGATE: &str = "navigate";
pub const CMD_LOGOUT: &str = "logout";

pub const ARG_PATH: &str = "path";
pub const ARG_SHOW_TOKEN: &str = "show-token";

fn path_arg(help: &'static str) -> Arg {
    Arg::new(ARG_PATH).help(help).required(true)
}

#[must_use]
pub fn new() -> Command {
    let styles = Styles::styled()
        .header(AnsiColor::Yellow.on_default() | Effects::BOLD)
        .usage(AnsiColor::Green.on_default() | Effects::BOLD)
        .literal(AnsiColor::Blue.on_default() | Effects::BOLD)
        .placeholder(AnsiColor::Green.on_default());

    let command = Command::new("tokengate")
        .about(env!("CARGO_PKG_DESCRIPTION"))
        .version(env!("CARGO_PKG_VERSION"))
        .color(ColorChoice::Auto)
        .styles(styles)
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new(CMD_GET)
                .about("GET a path through the renewal interceptor and print the JSON body")
                .arg(path_arg("API path, example: /users")),
        )
        .subcommand(Command::new(CMD_VERIFY).about("Check the session and print the status"))
        .subcommand(
            Command::new(CMD_REFRESH)
                .about("Renew the access token")
                .arg(
                    Arg::new(ARG_SHOW_TOKEN)
                        .long("show-token")
                        .help("Print the renewed access token")
                        .action(ArgAction::SetTrue),
                ),
        )
        .subcommand(
            Command::new(CMD_NAVIGATE)
                .about("Evaluate the navigation guard for a destination")
                .arg(path_arg("Destination, example: /groups")),
        )
        .subcommand(Command::new(CMD_LOGOUT).about("End the session"));

    let command = session::with_args(command);
    logging::with_args(command)
}

#[cfg(test)]
mod tests {
    use super::*;

    const CLEARED: [(&str, Option<&str>); 6] = [
        ("TOKENGATE_API_BASE_URL", None),
        ("TOKENGATE_ACCESS_TOKEN", None),
        ("TOKENGATE_LOG_LEVEL", None),
        ("TOKENGATE_LOG_JSON", None),
        ("TOKENGATE_LOGIN_PATH", None),
        ("TOKENGATE_FAIL_OPEN", None),
    ];

    #[test]
    fn test_new() {
        let command = new();

        assert_eq!(command.get_name(), "tokengate");
        assert_eq!(
            command.get_about().map(ToString::to_string),
            Some(env!("CARGO_PKG_DESCRIPTION").to_string())
        );
        assert_eq!(
            command.get_version().map(ToString::to_string),
            Some(env!("CARGO_PKG_VERSION").to_string())
        );
    }

    #[test]
    fn test_get_with_globals() {
        temp_env::with_vars(CLEARED, || {
            let matches = new().get_matches_from(vec![
                "tokengate",
                "--api-base-url",
                "https://api.tld",
                "--cookie",
                "refresh_token=r1",
                "--cookie",
                "lang=es",
                "get",
                "/users",
            ]);

            assert_eq!(
                matches.get_one::<String>(session::ARG_API_BASE_URL).cloned(),
                Some("https://api.tld".to_string())
            );
            let cookies: Vec<&String> = matches
                .get_many::<String>(session::ARG_COOKIE)
                .map(Iterator::collect)
                .unwrap_or_default();
            assert_eq!(cookies, ["refresh_token=r1", "lang=es"]);

            let Some((name, sub)) = matches.subcommand() else {
                panic!("subcommand expected");
            };
            assert_eq!(name, CMD_GET);
            assert_eq!(
                sub.get_one::<String>(ARG_PATH).cloned(),
                Some("/users".to_string())
            );
        });
    }

    #[test]
    fn test_globals_after_subcommand() {
        temp_env::with_vars(CLEARED, || {
            let matches = new().get_matches_from(vec![
                "tokengate",
                "navigate",
                "/groups",
                "--fail-open",
                "--login-path",
                "/signin",
            ]);
            let Some((name, sub)) = matches.subcommand() else {
                panic!("subcommand expected");
            };
            assert_eq!(name, CMD_NAVIGATE);
            assert!(sub.get_flag(session::ARG_FAIL_OPEN));
            assert_eq!(
                sub.get_one::<String>(session::ARG_LOGIN_PATH).cloned(),
                Some("/signin".to_string())
            );
        });
    }

    #[test]
    fn test_check_env() {
        temp_env::with_vars(
            [
                ("TOKENGATE_API_BASE_URL", Some("https://api.tld")),
                ("TOKENGATE_RENEWAL_TIMEOUT_SECONDS", Some("3")),
                ("TOKENGATE_LOG_LEVEL", Some("info")),
            ],
            || {
                let matches = new().get_matches_from(vec!["tokengate", "verify"]);
                assert_eq!(
                    matches.get_one::<String>(session::ARG_API_BASE_URL).cloned(),
                    Some("https://api.tld".to_string())
                );
                assert_eq!(
                    matches.get_one::<u64>(session::ARG_RENEWAL_TIMEOUT).copied(),
                    Some(3)
                );
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    Some(2)
                );
            },
        );
    }

    #[test]
    fn test_zero_timeout_is_rejected() {
        temp_env::with_vars(CLEARED, || {
            let result =
                new().try_get_matches_from(vec!["tokengate", "--request-timeout", "0", "verify"]);
            assert_eq!(
                result.map(|_| ()).map_err(|e| e.kind()),
                Err(clap::error::ErrorKind::ValueValidation)
            );
        });
    }

    #[test]
    fn test_subcommand_is_required() {
        temp_env::with_vars(CLEARED, || {
            let result = new().try_get_matches_from(vec!["tokengate", "-u", "https://api.tld"]);
            assert!(result.is_err());
        });
    }

    #[test]
    fn test_check_log_level_env() {
        // loop cover all possible value_parse
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, &level) in levels.iter().enumerate() {
            temp_env::with_vars([("TOKENGATE_LOG_LEVEL", Some(level))], || {
                let matches = new().get_matches_from(vec!["tokengate", "logout"]);
                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }

    #[test]
    fn test_check_log_level_verbosity() {
        let levels = ["error", "warn", "info", "debug", "trace"];
        for (index, _) in levels.iter().enumerate() {
            temp_env::with_vars([("TOKENGATE_LOG_LEVEL", None::<String>)], || {
                let mut args = vec!["tokengate".to_string(), "refresh".to_string()];

                // Add the appropriate number of "-v" flags based on the index
                if index > 0 {
                    let v = format!("-{}", "v".repeat(index));
                    args.push(v);
                }

                let matches = new().get_matches_from(args);

                assert_eq!(
                    matches.get_one::<u8>(logging::ARG_VERBOSITY).copied(),
                    u8::try_from(index).ok()
                );
            });
        }
    }
}
