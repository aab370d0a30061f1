//! The `.kiln-answers.toml` record written next to a generated project.

use serde::Serialize;

use kiln_core::{
    application::AnswersRecord,
    domain::{AnswerSet, CatalogId, RelativePath},
    error::{Context, KilnResult},
};

pub const ANSWERS_FILE: &str = ".kiln-answers.toml";

#[derive(Serialize)]
struct Record<'a> {
    #[serde(rename = "_catalog")]
    catalog: String,
    #[serde(flatten)]
    answers: &'a AnswerSet,
}

/// TOML text of the record. `_catalog` comes first, answers follow in the
/// order they were asked.
pub fn render_record(catalog: &CatalogId, answers: &AnswerSet) -> KilnResult<String> {
    let body = toml::to_string(&Record {
        catalog: catalog.to_string(),
        answers,
    })
    .context("failed to serialize answers record")?;

    Ok(format!(
        "# Answers used by kiln to generate this project.\n\
         # Regenerate with: kiln new <DEST> --data-file {ANSWERS_FILE}\n\
         {body}"
    ))
}

pub fn answers_record(catalog: &CatalogId, answers: &AnswerSet) -> KilnResult<AnswersRecord> {
    Ok(AnswersRecord {
        file_name: RelativePath::try_new(ANSWERS_FILE)?,
        content: render_record(catalog, answers)?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::answers::{MapAnswerSource, RecordFormat};
    use kiln_core::domain::Value;

    fn answers() -> AnswerSet {
        [
            ("project_name", Value::from("My App")),
            ("package_name", Value::from("my_app")),
            ("enable_github_action", Value::from(true)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn record_keeps_answer_order() {
        let text = render_record(&CatalogId::new("python", "1.0.0"), &answers()).unwrap();
        let body: Vec<_> = text.lines().filter(|l| !l.starts_with('#')).collect();
        assert_eq!(
            body,
            [
                "_catalog = \"python@1.0.0\"",
                "project_name = \"My App\"",
                "package_name = \"my_app\"",
                "enable_github_action = true",
            ]
        );
    }

    #[test]
    fn record_reads_back_as_answers() {
        let record = answers_record(&CatalogId::new("python", "1.0.0"), &answers()).unwrap();
        assert_eq!(record.file_name.as_str(), ANSWERS_FILE);

        let source = MapAnswerSource::parse_record(&record.content, RecordFormat::Toml).unwrap();
        assert_eq!(source.len(), 3);
        assert_eq!(source.get("enable_github_action"), Some(&Value::from(true)));
    }
}
