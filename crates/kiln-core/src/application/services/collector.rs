//! Answer collection: walk the questionnaire, ask each applicable question,
//! validate, and produce an [`AnswerSet`].

use std::collections::BTreeMap;

use tracing::{debug, instrument, warn};

use crate::{
    application::ports::AnswerSource,
    domain::{AnswerSet, DomainError, DomainValidator, Question, Questionnaire, Value},
    error::KilnResult,
};

/// Collects one answer set for a questionnaire.
///
/// User defaults (from configuration) replace a question's own default but
/// are still validated like any other answer.
pub struct AnswerCollector<'a> {
    questionnaire: &'a Questionnaire,
    user_defaults: BTreeMap<String, Value>,
}

impl<'a> AnswerCollector<'a> {
    pub fn new(questionnaire: &'a Questionnaire) -> Self {
        Self {
            questionnaire,
            user_defaults: BTreeMap::new(),
        }
    }

    /// Override question defaults. Keys that name no question are ignored.
    pub fn with_user_defaults<K, I>(mut self, defaults: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Value)>,
    {
        self.user_defaults
            .extend(defaults.into_iter().map(|(k, v)| (k.into(), v)));
        self
    }

    /// Ask every applicable question in order.
    ///
    /// Pre-supplied keys naming no question fail with `UnknownQuestion`
    /// before anything is asked. Pre-supplied keys for skipped questions are
    /// ignored with a warning.
    #[instrument(skip_all, fields(questions = self.questionnaire.len()))]
    pub fn collect(&self, source: &mut dyn AnswerSource) -> KilnResult<AnswerSet> {
        let provided = source.provided_keys();
        if let Some(unknown) = provided.iter().find(|k| !self.questionnaire.contains(k)) {
            return Err(DomainError::UnknownQuestion {
                key: unknown.clone(),
            }
            .into());
        }

        let mut answers = AnswerSet::new();
        for question in self.questionnaire {
            if !question.applies(&answers)? {
                if provided.contains(&question.key) {
                    warn!(
                        key = %question.key,
                        "ignoring supplied answer: question does not apply"
                    );
                } else {
                    debug!(key = %question.key, "question skipped");
                }
                continue;
            }

            let default = self.default_for(question, &answers)?;
            let value = self.ask_until_valid(question, default, source)?;
            debug!(key = %question.key, value = %value, "answered");
            answers.insert(question.key.clone(), value);
        }

        Ok(answers)
    }

    fn default_for(&self, question: &Question, answers: &AnswerSet) -> KilnResult<Option<Value>> {
        match self.user_defaults.get(&question.key) {
            Some(value) => Ok(Some(question.coerce(value.clone())?)),
            None => Ok(question.resolve_default(answers)?),
        }
    }

    fn ask_until_valid(
        &self,
        question: &Question,
        default: Option<Value>,
        source: &mut dyn AnswerSource,
    ) -> KilnResult<Value> {
        let mut last_error: Option<DomainError> = None;

        loop {
            let message = last_error.as_ref().map(ToString::to_string);
            let supplied = source.ask(question, default.as_ref(), message.as_deref())?;

            let result = match supplied.or_else(|| default.clone()) {
                Some(value) => DomainValidator::validate_answer(question, value),
                None => Err(DomainError::MissingAnswer {
                    key: question.key.clone(),
                }),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(err) if source.is_interactive() => {
                    debug!(key = %question.key, error = %err, "re-asking");
                    last_error = Some(err);
                }
                Err(err) => return Err(err.into()),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{HashMap, VecDeque};

    use super::*;
    use crate::domain::{Condition, DefaultValue, Pattern, Validator};
    use crate::error::KilnError;

    /// Answers from a fixed map, like a `--data-file` record.
    struct Fixed(HashMap<String, Value>);

    impl AnswerSource for Fixed {
        fn is_interactive(&self) -> bool {
            false
        }

        fn ask(
            &mut self,
            question: &Question,
            _default: Option<&Value>,
            _error: Option<&str>,
        ) -> KilnResult<Option<Value>> {
            Ok(self.0.get(&question.key).cloned())
        }

        fn provided_keys(&self) -> Vec<String> {
            self.0.keys().cloned().collect()
        }
    }

    /// A scripted terminal: pops replies in order and records error prompts.
    struct Scripted {
        replies: VecDeque<Option<Value>>,
        errors_seen: Vec<String>,
    }

    impl AnswerSource for Scripted {
        fn is_interactive(&self) -> bool {
            true
        }

        fn ask(
            &mut self,
            _question: &Question,
            _default: Option<&Value>,
            error: Option<&str>,
        ) -> KilnResult<Option<Value>> {
            if let Some(e) = error {
                self.errors_seen.push(e.to_string());
            }
            Ok(self.replies.pop_front().flatten())
        }
    }

    fn fixed(pairs: &[(&str, Value)]) -> Fixed {
        Fixed(pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    fn questionnaire() -> Questionnaire {
        let pattern = |s: &str| DefaultValue::Pattern(Pattern::parse("default", s).unwrap());
        Questionnaire::new(vec![
            Question::text("project_name", "Project name"),
            Question::text("package_name", "Package name")
                .with_default(pattern("{{ project_name | snake }}"))
                .with_validator(Validator::Identifier),
            Question::choice("project_type", "Project type", ["cli", "service"])
                .with_default(pattern("cli")),
            Question::choice("service_framework", "Framework", ["fastapi", "flask"])
                .with_default(pattern("fastapi"))
                .when(Condition::parse("project_type == 'service'").unwrap()),
            Question::text("author_username", "GitHub username"),
            Question::confirm("enable_github_action", "CI?").with_default(DefaultValue::Bool(true)),
            Question::confirm("publish_to_pypi", "Publish?")
                .with_default(DefaultValue::Bool(false))
                .when(Condition::parse("enable_github_action").unwrap()),
        ])
        .unwrap()
    }

    #[test]
    fn fills_defaults_and_skips_guarded_questions() {
        let q = questionnaire();
        let mut source = fixed(&[
            ("project_name", Value::from("My Tool")),
            ("author_username", Value::from("octo")),
        ]);

        let answers = AnswerCollector::new(&q).collect(&mut source).unwrap();

        assert_eq!(answers.get_str("package_name"), Some("my_tool"));
        assert_eq!(answers.get_str("project_type"), Some("cli"));
        assert!(!answers.contains("service_framework"));
        assert_eq!(answers.get_bool("publish_to_pypi"), Some(false));
        assert_eq!(
            answers.keys().collect::<Vec<_>>(),
            [
                "project_name",
                "package_name",
                "project_type",
                "author_username",
                "enable_github_action",
                "publish_to_pypi"
            ]
        );
    }

    #[test]
    fn coerces_string_flags() {
        let q = questionnaire();
        let mut source = fixed(&[
            ("project_name", Value::from("x")),
            ("author_username", Value::from("octo")),
            ("enable_github_action", Value::from("no")),
        ]);
        let answers = AnswerCollector::new(&q).collect(&mut source).unwrap();
        assert_eq!(answers.get_bool("enable_github_action"), Some(false));
        assert!(!answers.contains("publish_to_pypi"));
    }

    #[test]
    fn non_interactive_invalid_package_name_fails() {
        let q = questionnaire();
        let mut source = fixed(&[
            ("project_name", Value::from("x")),
            ("package_name", Value::from("123-bad name")),
            ("author_username", Value::from("octo")),
        ]);
        let err = AnswerCollector::new(&q).collect(&mut source).unwrap_err();
        assert_eq!(err.answer_key(), Some("package_name"));
        assert!(matches!(err, KilnError::Domain(DomainError::InvalidAnswer { .. })));
    }

    #[test]
    fn non_interactive_missing_required_fails() {
        let q = questionnaire();
        let mut source = fixed(&[("project_name", Value::from("x"))]);
        let err = AnswerCollector::new(&q).collect(&mut source).unwrap_err();
        assert_eq!(
            err,
            KilnError::Domain(DomainError::MissingAnswer {
                key: "author_username".into()
            })
        );
    }

    #[test]
    fn unknown_supplied_key_is_rejected_up_front() {
        let q = questionnaire();
        let mut source = fixed(&[("favourite_colour", Value::from("blue"))]);
        let err = AnswerCollector::new(&q).collect(&mut source).unwrap_err();
        assert_eq!(err.answer_key(), Some("favourite_colour"));
    }

    #[test]
    fn supplied_key_for_skipped_question_is_ignored() {
        let q = questionnaire();
        let mut source = fixed(&[
            ("project_name", Value::from("x")),
            ("author_username", Value::from("octo")),
            ("service_framework", Value::from("flask")),
        ]);
        let answers = AnswerCollector::new(&q).collect(&mut source).unwrap();
        assert!(!answers.contains("service_framework"));
    }

    #[test]
    fn interactive_source_is_reprompted_with_the_error() {
        let q = questionnaire();
        let mut source = Scripted {
            replies: VecDeque::from([
                Some(Value::from("My App")),
                Some(Value::from("123-bad name")),
                Some(Value::from("my_app")),
                None,
                Some(Value::from("octo")),
                None,
                None,
            ]),
            errors_seen: Vec::new(),
        };

        let answers = AnswerCollector::new(&q).collect(&mut source).unwrap();

        assert_eq!(answers.get_str("package_name"), Some("my_app"));
        assert_eq!(source.errors_seen.len(), 1);
        assert!(source.errors_seen[0].contains("package_name"));
    }

    #[test]
    fn user_defaults_override_question_defaults() {
        let q = questionnaire();
        let mut source = fixed(&[("project_name", Value::from("x"))]);
        let answers = AnswerCollector::new(&q)
            .with_user_defaults([
                ("author_username", Value::from("octo")),
                ("enable_github_action", Value::from("false")),
            ])
            .collect(&mut source)
            .unwrap();
        assert_eq!(answers.get_str("author_username"), Some("octo"));
        assert_eq!(answers.get_bool("enable_github_action"), Some(false));
    }
}
