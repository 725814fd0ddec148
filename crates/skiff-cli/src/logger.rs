//! Logging setup on the tracing ecosystem.

use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Initialize the tracing subscriber. Call once, before any logging.
///
/// Level selection: `--verbose` wins, then `--quiet`, then `RUST_LOG`, then
/// info for the skiff crates.
pub fn init_logger(verbose: bool, quiet: bool, no_color: bool) {
    let filter = if verbose {
        EnvFilter::new("skiff=debug,skiff_config=debug,skiff_pipeline=debug,skiff_cli=debug")
    } else if quiet {
        EnvFilter::new("skiff=error,skiff_config=error,skiff_pipeline=error,skiff_cli=error")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("skiff=info,skiff_config=info,skiff_pipeline=info,skiff_cli=info")
        })
    };

    let fmt_layer = fmt::layer()
        .with_target(false)
        .with_level(true)
        .with_ansi(!no_color)
        .compact();

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .init();
}

#[cfg(test)]
mod tests {
    use super::*;

    // tracing is global and can only be initialized once per process, so
    // these only check that the filters construct.

    #[test]
    fn verbose_filter_constructs() {
        let _ = EnvFilter::new("skiff=debug,skiff_pipeline=debug");
    }

    #[test]
    fn quiet_filter_constructs() {
        let _ = EnvFilter::new("skiff=error");
    }
}
