pub mod answers;
pub mod catalog;
pub mod common;
pub mod output;
pub mod questionnaire;

pub use crate::domain::DomainError;
pub use answers::{AnswerSet, Value};
pub use catalog::{CatalogEntry, CatalogId, TemplateCatalog, TemplateCatalogBuilder};
pub use output::{OutputFile, OutputFileSet};
pub use questionnaire::{DefaultValue, Question, QuestionKind, Questionnaire, Validator};
