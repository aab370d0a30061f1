use crate::domain::{
    entities::{
        answers::{AnswerSet, Value},
        questionnaire::{Question, Questionnaire},
    },
    error::DomainError,
};

/// Centralized domain validation.
///
/// The collector validates single answers through here, the composer whole
/// answer sets.
pub struct DomainValidator;

impl DomainValidator {
    pub fn validate_answers(
        questionnaire: &Questionnaire,
        answers: &AnswerSet,
    ) -> Result<(), DomainError> {
        questionnaire.validate_answers(answers)
    }

    /// Coerce then validate a single answer, as the collector does per
    /// question.
    pub fn validate_answer(question: &Question, value: Value) -> Result<Value, DomainError> {
        let value = question.coerce(value)?;
        question.validate(&value)?;
        Ok(value)
    }
}
