//! Pre-supplied answers in front of an interactive prompt.

use kiln_core::{
    application::ports::AnswerSource,
    domain::{Question, Value},
    error::KilnResult,
};

use super::MapAnswerSource;

/// Uses `fixed` where it has a value and asks `fallback` for the rest.
///
/// When a fixed value fails validation the collector re-asks with an error
/// message; that retry goes to `fallback`, so an interactive user can correct
/// a bad `--data` value instead of the run failing.
pub struct LayeredAnswerSource<F> {
    fixed: MapAnswerSource,
    fallback: F,
}

impl<F: AnswerSource> LayeredAnswerSource<F> {
    pub fn new(fixed: MapAnswerSource, fallback: F) -> Self {
        Self { fixed, fallback }
    }

    pub fn into_fallback(self) -> F {
        self.fallback
    }
}

impl<F: AnswerSource> AnswerSource for LayeredAnswerSource<F> {
    fn is_interactive(&self) -> bool {
        self.fallback.is_interactive()
    }

    fn ask(
        &mut self,
        question: &Question,
        default: Option<&Value>,
        error: Option<&str>,
    ) -> KilnResult<Option<Value>> {
        if error.is_none() {
            if let Some(value) = self.fixed.get(&question.key) {
                return Ok(Some(value.clone()));
            }
        }
        self.fallback.ask(question, default, error)
    }

    fn provided_keys(&self) -> Vec<String> {
        self.fixed.provided_keys()
    }
}
