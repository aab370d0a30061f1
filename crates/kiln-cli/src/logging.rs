//! Diagnostics go to stderr through `tracing`; stdout stays reserved for
//! generated listings and `kiln config get` values so they can be piped.
//!
//! Only the binary installs a subscriber. `kiln-core` and `kiln-adapters`
//! emit spans and events under their own targets, which is why the filter
//! names all three crates. At `-vvv` the crate list is dropped and every
//! target traces.
//!
//! A non-empty `RUST_LOG` replaces the flag mapping outright.

use std::io::IsTerminal as _;

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use crate::cli::GlobalArgs;

const KILN_TARGETS: [&str; 3] = ["kiln", "kiln_core", "kiln_adapters"];

/// Must be called once, before any tracing macros fire.
pub fn init_logging(args: &GlobalArgs) -> anyhow::Result<()> {
    let rust_log = std::env::var(EnvFilter::DEFAULT_ENV).ok();
    let directives = filter_directives(rust_log.as_deref(), args);
    let filter = EnvFilter::try_new(&directives)
        .map_err(|e| anyhow::anyhow!("invalid log filter `{directives}`: {e}"))?;

    let fmt_layer = tracing_subscriber::fmt::layer()
        .with_target(args.verbose >= 2)
        .with_file(false)
        .with_line_number(false)
        .with_ansi(!args.no_color && std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|e| anyhow::anyhow!("Failed to initialise tracing: {e}"))?;

    Ok(())
}

/// `RUST_LOG` if it says anything, otherwise the verbosity flags.
fn filter_directives(rust_log: Option<&str>, args: &GlobalArgs) -> String {
    if let Some(env) = rust_log.map(str::trim).filter(|s| !s.is_empty()) {
        return env.to_owned();
    }
    match (args.quiet, args.verbose) {
        (true, _) => scoped("error"),
        (false, 0) => scoped("warn"),
        (false, 1) => scoped("info"),
        (false, 2) => scoped("debug"),
        (false, _) => "trace".to_owned(),
    }
}

fn scoped(level: &str) -> String {
    KILN_TARGETS
        .iter()
        .map(|target| format!("{target}={level}"))
        .collect::<Vec<_>>()
        .join(",")
}
