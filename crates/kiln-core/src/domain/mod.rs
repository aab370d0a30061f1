// ============================================================================
//  CLEAN MODULE BOUNDARIES
// ============================================================================

//! Core domain layer for kiln.
//!
//! Pure business logic: answers, questionnaires, catalogs, the template
//! language and the composer. All I/O (prompting, reading catalogs, writing
//! files) is handled via ports defined in the application layer.
//!
//! - **No async**: domain logic is synchronous
//! - **No I/O**: no filesystem, terminal or environment access
//! - **Immutable entities**: a built catalog and a collected answer set are
//!   never mutated
pub mod composer;
pub mod entities;
pub mod error;
pub mod template;

mod validation;

pub use composer::compose;
pub use entities::{
    answers::{AnswerSet, Value},
    catalog::{CatalogEntry, CatalogId, TemplateCatalog, TemplateCatalogBuilder},
    common::{Permissions, RelativePath},
    output::{OutputFile, OutputFileSet},
    questionnaire::{DefaultValue, Question, QuestionKind, Questionnaire, Validator},
};
pub use error::{DomainError, ErrorCategory};
pub use template::{Condition, Filter, Pattern};
pub use validation::DomainValidator;
