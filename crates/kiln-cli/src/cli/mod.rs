//! CLI argument definitions using the clap derive API.
//!
//! This module is the only place that knows about argument names, aliases,
//! help text and value enums. No business logic lives here.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};

pub mod global;
pub use global::GlobalArgs;

// ── Top-level CLI ─────────────────────────────────────────────────────────────

#[derive(Debug, Parser)]
#[command(
    name     = "kiln",
    bin_name = "kiln",
    version  = env!("CARGO_PKG_VERSION"),
    author   = env!("CARGO_PKG_AUTHORS"),
    about    = "Answer a few questions, get a ready-to-run Python project",
    long_about = "kiln asks the questions of a template catalog (or takes the \
                  answers from flags and files) and renders a complete Python \
                  project: package, tests, lint config and CI workflows.",
    after_help = "EXAMPLES:\n\
        \x20 kiln new my-tool\n\
        \x20 kiln new my-api --defaults -d project_name='My API' -d author_username=octo -d project_type=service\n\
        \x20 kiln new my-api --data-file answers.yaml\n\
        \x20 kiln list --questions\n\
        \x20 kiln completions bash > /usr/share/bash-completion/completions/kiln",
    arg_required_else_help = true,
    subcommand_required    = true,
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalArgs,

    #[command(subcommand)]
    pub command: Commands,
}

// ── Subcommands ───────────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Generate a new project.
    #[command(
        visible_alias = "n",
        about = "Generate a new project",
        after_help = "EXAMPLES:\n\
            \x20 kiln new my-tool                                # ask every question\n\
            \x20 kiln new my-tool --defaults -d project_name=Tool -d author_username=octo\n\
            \x20 kiln new my-api  --data-file answers.toml --interactive\n\
            \x20 kiln new my-api  --data-file my-api/.kiln-answers.toml --force"
    )]
    New(NewArgs),

    /// Show what a catalog generates and asks.
    #[command(
        visible_alias = "ls",
        about = "List catalog files or questions",
        after_help = "EXAMPLES:\n\
            \x20 kiln list\n\
            \x20 kiln list --questions\n\
            \x20 kiln list --questions --format json"
    )]
    List(ListArgs),

    /// Write a default configuration file.
    #[command(
        about = "Initialise configuration",
        after_help = "EXAMPLES:\n\
            \x20 kiln init\n\
            \x20 kiln init --force\n\
            \x20 kiln --config ./kiln.toml init"
    )]
    Init(InitArgs),

    #[command(
        about = "Generate shell completions",
        after_help = "EXAMPLES:\n\
            \x20 kiln completions bash > ~/.local/share/bash-completion/completions/kiln\n\
            \x20 kiln completions zsh  > ~/.zfunc/_kiln\n\
            \x20 kiln completions fish > ~/.config/fish/completions/kiln.fish"
    )]
    Completions(CompletionsArgs),

    #[command(
        about = "Configuration management",
        subcommand,
        after_help = "EXAMPLES:\n\
            \x20 kiln config get defaults.author_username\n\
            \x20 kiln config set defaults.author_username octo\n\
            \x20 kiln config list"
    )]
    Config(ConfigCommands),
}

// ── new ───────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct NewArgs {
    /// Directory to generate into. Created if missing; must be empty of
    /// generated paths unless `--force` is given.
    #[arg(value_name = "DEST", help = "Destination directory")]
    pub dest: PathBuf,

    /// Built-in catalog name (`python`, `python@1.0.0`) or a catalog
    /// directory holding `catalog.toml` and `template/`.
    #[arg(long = "catalog", value_name = "NAME|DIR", help = "Catalog to generate from")]
    pub catalog: Option<String>,

    #[arg(
        short = 'd',
        long = "data",
        value_name = "KEY=VALUE",
        help = "Answer a question (repeatable)"
    )]
    pub data: Vec<String>,

    #[arg(
        long = "data-file",
        value_name = "FILE",
        help = "Read answers from a JSON, TOML or YAML record"
    )]
    pub data_file: Option<PathBuf>,

    #[arg(long = "defaults", help = "Accept defaults for every unanswered question")]
    pub defaults: bool,

    /// With `--data`, `--data-file` or `--defaults`: still prompt for what
    /// was not supplied.
    #[arg(short = 'i', long = "interactive", help = "Prompt for unanswered questions")]
    pub interactive: bool,

    #[arg(short = 'y', long = "yes", help = "Skip the confirmation prompt")]
    pub yes: bool,

    #[arg(long = "force", help = "Overwrite files that already exist")]
    pub force: bool,

    #[arg(long = "dry-run", help = "Show what would be created without writing")]
    pub dry_run: bool,

    #[arg(long = "no-answers-file", help = "Do not write .kiln-answers.toml")]
    pub no_answers_file: bool,
}

impl NewArgs {
    /// Any pre-supplied answers (or `--defaults`) switch prompting off,
    /// unless `--interactive` asks for it back.
    pub fn is_interactive(&self) -> bool {
        let supplied = self.defaults || self.data_file.is_some() || !self.data.is_empty();
        !supplied || self.interactive
    }
}

// ── list ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct ListArgs {
    #[arg(long = "catalog", value_name = "NAME|DIR", help = "Catalog to describe")]
    pub catalog: Option<String>,

    #[arg(long = "questions", help = "List questions instead of files")]
    pub questions: bool,

    #[arg(
        long = "format",
        value_enum,
        help = "Output format [default: output.format from config, else table]"
    )]
    pub format: Option<ListFormat>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ListFormat {
    /// Human-readable table.
    Table,
    /// One key or path per line.
    List,
    Json,
    Csv,
}

// ── init ──────────────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct InitArgs {
    #[arg(short = 'f', long = "force", help = "Overwrite existing configuration")]
    pub force: bool,
}

// ── completions ───────────────────────────────────────────────────────────────

#[derive(Debug, Args)]
pub struct CompletionsArgs {
    #[arg(value_enum, help = "Shell to generate completions for")]
    pub shell: Shell,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Shell {
    Bash,
    Zsh,
    Fish,
    PowerShell,
    Elvish,
}

// ── config subcommands ────────────────────────────────────────────────────────

#[derive(Debug, Subcommand)]
pub enum ConfigCommands {
    /// Print the value of a configuration key.
    Get {
        /// Dotted key path, e.g. `defaults.author_username`.
        key: String,
    },
    /// Set a configuration key in the config file.
    Set {
        /// Dotted key path.
        key: String,
        value: String,
    },
    /// Print the effective configuration.
    List,
    /// Print the path of the configuration file.
    Path,
}

// ── tests ─────────────────────────────────────────────────────────────────────
