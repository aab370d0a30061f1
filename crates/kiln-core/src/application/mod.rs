//! Application layer for kiln.
//!
//! - **Services**: use case orchestration (`AnswerCollector`, `GenerateService`)
//! - **Ports**: traits for the outside world (`Filesystem`, `AnswerSource`)
//! - **Errors**: orchestration and I/O failures
//!
//! No business rules live here; those are in `crate::domain`.

pub mod error;
pub mod ports;
pub mod services;

pub use services::{
    AnswerCollector, AnswersRecord, CatalogInfo, EntryInfo, GenerateOptions, GenerateReport,
    GenerateService, QuestionInfo,
};

pub use ports::{AnswerSource, Filesystem};

pub use error::ApplicationError;
