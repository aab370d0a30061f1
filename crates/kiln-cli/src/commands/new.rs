//! Implementation of the `kiln new` command.
//!
//! Responsibility: turn flags into an answer source, call the core
//! services, and display results. No business logic lives here.

use std::path::Path;

use tracing::{info, instrument};

use kiln_adapters::{
    LocalFilesystem, MapAnswerSource,
    answers::{ANSWERS_FILE, answers_record},
};
use kiln_core::{
    application::{AnswerSource, GenerateOptions, GenerateService},
    domain::{AnswerSet, OutputFileSet},
};

use crate::{
    cli::{GlobalArgs, NewArgs},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

/// Execute `kiln new`.
///
/// 1. Resolve the catalog
/// 2. Build the answer source from `--data-file`, `--data` and the prompt
/// 3. Collect and validate answers, then compose the file set
/// 4. Stop at `--dry-run`, or confirm when prompting
/// 5. Write; a destination this run created is removed again if writing
///    fails
#[instrument(skip_all, fields(dest = %args.dest.display()))]
pub fn execute(
    args: NewArgs,
    _global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let catalog = super::load_catalog(args.catalog.as_deref(), &config)?;
    let service = GenerateService::new(catalog, Box::new(LocalFilesystem::new()));
    let interactive = args.is_interactive();

    // ── Answers ───────────────────────────────────────────────────────────
    let supplied = supplied_answers(&args)?;
    let mut source = answer_source(supplied, interactive)?;
    if interactive {
        output.header(&format!("{} ({})", service.catalog().description(), service.catalog().id()))?;
    }
    let answers = service.collect(source.as_mut(), config.user_defaults())?;

    // ── Plan ──────────────────────────────────────────────────────────────
    let plan = service.plan(&answers)?;
    let record = if args.no_answers_file || !config.templates.answers_file {
        None
    } else {
        Some(answers_record(service.catalog().id(), &answers)?)
    };
    let options = GenerateOptions {
        overwrite: args.force,
        answers_record: record,
        remove_created_root: true,
    };

    if args.dry_run {
        service.preflight(&args.dest, &plan, &options)?;
        show_plan(&args.dest, &answers, &plan, options.answers_record.is_some(), &output)?;
        return Ok(());
    }

    if interactive && !args.yes && !output.is_quiet() {
        show_plan(&args.dest, &answers, &plan, options.answers_record.is_some(), &output)?;
        if !confirm()? {
            return Err(CliError::Cancelled);
        }
    }

    // ── Write ─────────────────────────────────────────────────────────────
    let progress = output.progress(plan.len() as u64);
    let result = service.write_with(&args.dest, &plan, &options, |file| {
        if let Some(bar) = &progress {
            bar.set_message(file.path.to_string());
            bar.inc(1);
        }
    });
    if let Some(bar) = &progress {
        bar.finish_and_clear();
    }

    let report = result?;
    info!(files = report.file_count(), "project generated");

    // ── Summary ───────────────────────────────────────────────────────────
    output.success(&format!(
        "Generated {} files in {}",
        report.file_count(),
        args.dest.display()
    ))?;
    if !output.is_quiet() {
        output.print("")?;
        output.print("Next steps:")?;
        output.print(&format!("  cd {}", args.dest.display()))?;
        output.print("  make install")?;
        output.print("  make test")?;
    }

    Ok(())
}

// ── Answer sources ────────────────────────────────────────────────────────────

/// `--data-file` first, `--data` on top.
fn supplied_answers(args: &NewArgs) -> CliResult<MapAnswerSource> {
    let from_file = match &args.data_file {
        Some(path) => MapAnswerSource::from_file(path)?,
        None => MapAnswerSource::new(),
    };
    let from_flags = MapAnswerSource::new().with_data(args.data.iter().map(String::as_str))?;
    Ok(from_file.overlay(from_flags))
}

#[cfg(feature = "interactive")]
fn answer_source(
    supplied: MapAnswerSource,
    interactive: bool,
) -> CliResult<Box<dyn AnswerSource>> {
    use std::io::IsTerminal;

    use kiln_adapters::LayeredAnswerSource;

    use crate::prompt::TerminalPrompt;

    if !interactive {
        return Ok(Box::new(supplied));
    }
    if !std::io::stdin().is_terminal() {
        return Err(CliError::InvalidInput {
            message: "no terminal to prompt on; pass --defaults, --data or --data-file".into(),
        });
    }
    Ok(Box::new(LayeredAnswerSource::new(supplied, TerminalPrompt::new())))
}

#[cfg(not(feature = "interactive"))]
fn answer_source(
    supplied: MapAnswerSource,
    interactive: bool,
) -> CliResult<Box<dyn AnswerSource>> {
    if interactive {
        return Err(CliError::FeatureNotAvailable {
            feature: "interactive",
        });
    }
    Ok(Box::new(supplied))
}

#[cfg(feature = "interactive")]
fn confirm() -> CliResult<bool> {
    Ok(crate::prompt::confirm_write("Generate these files?")?)
}

#[cfg(not(feature = "interactive"))]
fn confirm() -> CliResult<bool> {
    Ok(true)
}

// ── UI helpers ────────────────────────────────────────────────────────────────

fn show_plan(
    dest: &Path,
    answers: &AnswerSet,
    plan: &OutputFileSet,
    with_record: bool,
    out: &OutputManager,
) -> CliResult<()> {
    let width = answers.keys().map(str::len).max().unwrap_or(0);

    out.header("Answers")?;
    for (key, value) in answers.iter() {
        out.field(key, width, &value.to_string())?;
    }
    out.print("")?;

    out.header(&format!("Files ({})", dest.display()))?;
    for file in plan.files() {
        let marker = if file.permissions.executable_flag() { "  (executable)" } else { "" };
        out.print(&format!("  {}{marker}", file.path))?;
    }
    if with_record {
        out.print(&format!("  {ANSWERS_FILE}"))?;
    }
    out.print("")?;
    out.info(&format!(
        "{} files, {} bytes",
        plan.len() + usize::from(with_record),
        plan.total_bytes()
    ))?;
    Ok(())
}
