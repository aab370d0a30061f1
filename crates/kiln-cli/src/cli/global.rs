//! Flags accepted by every subcommand, flattened into [`super::Cli`].

use clap::Args;
use std::path::PathBuf;

#[derive(Debug, Args)]
pub struct GlobalArgs {
    /// Show more of what kiln decides while composing a project.
    #[arg(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        help = "Explain composition decisions (-v, -vv, -vvv)",
        long_help = "Show more of what kiln decides while composing a project:
    (none)  - warnings only, e.g. an answer given for a question that does not apply
    -v      - catalog loaded, project composed, project written
    -vv     - each answer, skipped questions, excluded entries, files written
    -vvv    - everything, including the libraries kiln is built on

RUST_LOG, when set, replaces this mapping entirely."
    )]
    pub verbose: u8,

    /// Only errors reach stderr; the summary after `kiln new` is dropped too.
    #[arg(
        short = 'q',
        long = "quiet",
        global = true,
        conflicts_with = "verbose",
        help = "Print errors only"
    )]
    pub quiet: bool,

    /// Honoured automatically when `NO_COLOR` is set (<https://no-color.org>).
    #[arg(
        long = "no-color",
        global = true,
        env = "NO_COLOR",
        help = "Plain output without ANSI colors"
    )]
    pub no_color: bool,

    #[arg(
        short = 'c',
        long = "config",
        global = true,
        value_name = "FILE",
        help = "Use FILE instead of the user config.toml",
        long_help = "Use FILE instead of config.toml in the platform config directory \
(see `kiln config path`). KILN_<SECTION>__<KEY> variables still override \
whatever the file sets."
    )]
    pub config: Option<PathBuf>,
}
