use anyhow::Result;
use tracing::Level;
use tracing_subscriber::{fmt, layer::SubscriberExt, EnvFilter, Layer, Registry};

/// Builds the level filter: `RUST_LOG` wins, otherwise `verbosity_level`
/// (ERROR when unset). Transport crates are kept quiet.
///
/// # Errors
///
/// Returns an error if a directive cannot be parsed
fn filter(verbosity_level: Option<Level>) -> Result<EnvFilter> {
    let verbosity_level = verbosity_level.unwrap_or(Level::ERROR);

    Ok(EnvFilter::builder()
        .with_default_directive(verbosity_level.into())
        .from_env_lossy()
        .add_directive("hyper=error".parse()?)
        .add_directive("hyper_util=error".parse()?))
}

/// Initialize logging on stderr, keeping stdout for command output.
///
/// # Errors
///
/// Returns an error if the subscriber is already set or the filter is invalid
pub fn init(verbosity_level: Option<Level>, json: bool) -> Result<()> {
    let fmt_layer = if json {
        fmt::layer()
            .json()
            .with_current_span(true)
            .with_writer(std::io::stderr)
            .boxed()
    } else {
        fmt::layer()
            .with_file(false)
            .with_line_number(false)
            .with_thread_ids(false)
            .with_target(false)
            .with_writer(std::io::stderr)
            .boxed()
    };

    let subscriber = Registry::default()
        .with(fmt_layer)
        .with(filter(verbosity_level)?);
    tracing::subscriber::set_global_default(subscriber)?;

    Ok(())
}
