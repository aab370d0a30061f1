//! Application services - orchestrate use cases.

pub mod collector;
pub mod generate_service;

pub use collector::AnswerCollector;
pub use generate_service::{
    AnswersRecord, CatalogInfo, EntryInfo, GenerateOptions, GenerateReport, GenerateService,
    QuestionInfo,
};
