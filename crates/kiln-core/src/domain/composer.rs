//! Answer set + catalog → output file set.

use tracing::{debug, instrument};

use crate::domain::{
    entities::{
        answers::AnswerSet,
        catalog::TemplateCatalog,
        common::RelativePath,
        output::{OutputFile, OutputFileSet},
    },
    error::DomainError,
    validation::DomainValidator,
};

/// Compose the project described by `answers`.
///
/// Pure: the result depends only on the catalog and the answers. Steps:
///
/// 1. validate the whole answer set against the questionnaire (nothing is
///    rendered if any answer is wrong)
/// 2. drop entries whose guard is false
/// 3. render each path, which must stay inside the destination
/// 4. render each content pattern
///
/// Two included entries rendering to the same path is an error.
#[instrument(skip_all, fields(catalog = %catalog.id(), answers = answers.len()))]
pub fn compose(catalog: &TemplateCatalog, answers: &AnswerSet) -> Result<OutputFileSet, DomainError> {
    DomainValidator::validate_answers(catalog.questionnaire(), answers)?;

    let mut output = OutputFileSet::new();
    for entry in catalog.entries() {
        if let Some(guard) = &entry.guard {
            if !guard.evaluate(answers, &entry.source)? {
                debug!(entry = %entry.source, guard = %guard, "entry excluded");
                continue;
            }
        }

        let path = RelativePath::try_new(entry.path.render(answers)?)?;
        let content = entry.content.render(answers)?;
        debug!(entry = %entry.source, path = %path, bytes = content.len(), "entry rendered");

        output.push(OutputFile {
            path,
            content,
            permissions: entry.permissions,
        })?;
    }

    debug!(files = output.len(), "composition complete");
    Ok(output)
}
