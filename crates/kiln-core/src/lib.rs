//! kiln core: answer collection and template composition.
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │            kiln-cli (CLI)               │
//! │   prompts, flags, config, progress      │
//! └──────────────────┬──────────────────────┘
//!                    │ calls
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │         Application Services            │
//! │  (AnswerCollector, GenerateService)     │
//! └──────────────────┬──────────────────────┘
//!                    │ uses
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     Application Ports (Traits)          │
//! │     (Filesystem, AnswerSource)          │
//! └──────────────────┬──────────────────────┘
//!                    │ implemented by
//!                    ▼
//! ┌─────────────────────────────────────────┐
//! │     kiln-adapters (Infrastructure)      │
//! │ (LocalFilesystem, catalog loader, ...)  │
//! └─────────────────────────────────────────┘
//!
//!   Domain (pure): AnswerSet, Questionnaire, TemplateCatalog,
//!                  Pattern, compose()
//! ```
//!
//! ## Usage
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use kiln_core::prelude::*;
//!
//! let catalog: Arc<TemplateCatalog> = load_catalog()?;
//! let service = GenerateService::new(catalog, Box::new(filesystem));
//! let answers = service.collect(&mut source, user_defaults)?;
//! service.generate("./my-project".as_ref(), &answers, &GenerateOptions::default())?;
//! ```

pub mod application;
pub mod domain;
pub mod error;

pub mod prelude {
    pub use crate::application::{
        AnswerCollector, AnswersRecord, GenerateOptions, GenerateReport, GenerateService,
        ports::{AnswerSource, Filesystem},
    };
    pub use crate::domain::{
        AnswerSet, CatalogEntry, CatalogId, OutputFileSet, Pattern, Question, QuestionKind,
        Questionnaire, TemplateCatalog, Value, compose,
    };
    pub use crate::error::{KilnError, KilnResult};
}

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
