//! Implementation of the `kiln list` command.

use clap::ValueEnum;
use serde_json::json;

use kiln_adapters::MemoryFilesystem;
use kiln_core::application::{EntryInfo, GenerateService, QuestionInfo};

use crate::{
    cli::{GlobalArgs, ListArgs, ListFormat},
    config::AppConfig,
    error::{CliError, CliResult},
    output::OutputManager,
};

pub fn execute(
    args: ListArgs,
    _global: GlobalArgs,
    config: AppConfig,
    output: OutputManager,
) -> CliResult<()> {
    let format = match args.format {
        Some(format) => format,
        None => ListFormat::from_str(&config.output.format, true)
            .map_err(|_| CliError::config(format!("unknown output.format '{}'", config.output.format)))?,
    };

    let catalog = super::load_catalog(args.catalog.as_deref(), &config)?;
    // Listing never writes; the service only needs a filesystem to exist.
    let service = GenerateService::new(catalog, Box::new(MemoryFilesystem::new()));

    if args.questions {
        show_questions(&service.list_questions(), format, &service, &output)
    } else {
        show_entries(&service.list_entries(), format, &service, &output)
    }
}

// ── Questions ─────────────────────────────────────────────────────────────────

fn show_questions(
    questions: &[QuestionInfo],
    format: ListFormat,
    service: &GenerateService,
    output: &OutputManager,
) -> CliResult<()> {
    match format {
        ListFormat::Table => {
            let info = service.catalog_info();
            output.header(&format!("{} ({} questions)", info.id, info.questions))?;
            let width = questions.iter().map(|q| q.key.len()).max().unwrap_or(0);
            for q in questions {
                output.print(&format!("  {:<width$}  {:<7}  {}", q.key, q.kind, q.prompt))?;
                if !q.choices.is_empty() {
                    output.print(&format!("  {:<width$}  choices: {}", "", q.choices.join(", ")))?;
                }
                if let Some(default) = &q.default {
                    output.print(&format!("  {:<width$}  default: {default}", ""))?;
                }
                if let Some(when) = &q.when {
                    output.print(&format!("  {:<width$}  when: {when}", ""))?;
                }
            }
        }
        ListFormat::List => {
            for q in questions {
                output.data(&q.key)?;
            }
        }
        ListFormat::Json => {
            let rows: Vec<_> = questions
                .iter()
                .map(|q| {
                    json!({
                        "key": q.key,
                        "type": q.kind,
                        "prompt": q.prompt,
                        "default": q.default,
                        "choices": q.choices,
                        "when": q.when,
                    })
                })
                .collect();
            output.data(&to_json(&rows)?)?;
        }
        ListFormat::Csv => {
            output.data("key,type,prompt,default,choices,when")?;
            for q in questions {
                output.data(&csv_row(&[
                    &q.key,
                    &q.kind,
                    &q.prompt,
                    q.default.as_deref().unwrap_or(""),
                    &q.choices.join("|"),
                    q.when.as_deref().unwrap_or(""),
                ]))?;
            }
        }
    }
    Ok(())
}

// ── Files ─────────────────────────────────────────────────────────────────────

fn show_entries(
    entries: &[EntryInfo],
    format: ListFormat,
    service: &GenerateService,
    output: &OutputManager,
) -> CliResult<()> {
    match format {
        ListFormat::Table => {
            let info = service.catalog_info();
            output.header(&format!("{}: {}", info.id, info.description))?;
            let width = entries.iter().map(|e| e.path.len()).max().unwrap_or(0);
            for e in entries {
                let exec = if e.executable { " (executable)" } else { "" };
                match &e.when {
                    Some(when) => output.print(&format!("  {:<width$}  if {when}{exec}", e.path))?,
                    None => output.print(&format!("  {:<width$}{exec}", e.path))?,
                }
            }
            output.print("")?;
            output.info(&format!("{} entries, {} questions", info.entries, info.questions))?;
        }
        ListFormat::List => {
            for e in entries {
                output.data(&e.path)?;
            }
        }
        ListFormat::Json => {
            let rows: Vec<_> = entries
                .iter()
                .map(|e| {
                    json!({
                        "source": e.source,
                        "path": e.path,
                        "when": e.when,
                        "executable": e.executable,
                    })
                })
                .collect();
            output.data(&to_json(&rows)?)?;
        }
        ListFormat::Csv => {
            output.data("source,path,when,executable")?;
            for e in entries {
                output.data(&csv_row(&[
                    &e.source,
                    &e.path,
                    e.when.as_deref().unwrap_or(""),
                    if e.executable { "true" } else { "false" },
                ]))?;
            }
        }
    }
    Ok(())
}

// ── helpers ───────────────────────────────────────────────────────────────────

fn to_json(rows: &[serde_json::Value]) -> CliResult<String> {
    serde_json::to_string_pretty(rows).map_err(|e| CliError::IoError {
        message: "failed to serialise listing".into(),
        source: e.into(),
    })
}

fn csv_row(fields: &[&str]) -> String {
    fields
        .iter()
        .map(|f| {
            if f.contains([',', '"', '\n']) {
                format!("\"{}\"", f.replace('"', "\"\""))
            } else {
                (*f).to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(",")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn csv_quotes_only_when_needed() {
        assert_eq!(csv_row(&["a", "b c", ""]), "a,b c,");
        assert_eq!(
            csv_row(&["x", "project_type == 'service', maybe", "say \"hi\""]),
            "x,\"project_type == 'service', maybe\",\"say \"\"hi\"\"\""
        );
    }

    #[test]
    fn config_format_is_parsed_case_insensitively() {
        assert_eq!(ListFormat::from_str("JSON", true), Ok(ListFormat::Json));
        assert!(ListFormat::from_str("yaml", true).is_err());
    }
}
