//! Typed questions and the ordered questionnaire a catalog is answered by.
//!
//! Questions are data: the catalog manifest declares them, the collector
//! asks them, and the composer re-validates a finished [`AnswerSet`] against
//! them before any file is rendered.

use std::collections::{BTreeSet, HashSet};
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::domain::{
    entities::answers::{AnswerSet, Value},
    error::DomainError,
    template::{Condition, Pattern},
};

static IDENTIFIER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("identifier regex is valid"));

static EMAIL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("email regex is valid"));

/// Reserved words that cannot name a Python module.
const PYTHON_KEYWORDS: &[&str] = &[
    "False", "None", "True", "and", "as", "assert", "async", "await", "break", "class",
    "continue", "def", "del", "elif", "else", "except", "finally", "for", "from", "global", "if",
    "import", "in", "is", "lambda", "nonlocal", "not", "or", "pass", "raise", "return", "try",
    "while", "with", "yield",
];

// ============================================================================
// Question kinds
// ============================================================================

#[derive(Debug, Clone, PartialEq)]
pub enum QuestionKind {
    /// Free text.
    Text,
    /// One of a closed set of strings.
    Choice(Vec<String>),
    /// Yes / no.
    Confirm,
}

impl QuestionKind {
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Choice(_) => "choice",
            Self::Confirm => "confirm",
        }
    }

    pub fn choices(&self) -> &[String] {
        match self {
            Self::Choice(choices) => choices,
            _ => &[],
        }
    }
}

impl fmt::Display for QuestionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A question's own default: a fixed flag, or a pattern rendered against the
/// answers collected so far (`{{ project_name | snake }}`).
#[derive(Debug, Clone, PartialEq)]
pub enum DefaultValue {
    Bool(bool),
    Pattern(Pattern),
}

impl DefaultValue {
    pub fn resolve(&self, answers: &AnswerSet) -> Result<Value, DomainError> {
        match self {
            Self::Bool(b) => Ok(Value::Bool(*b)),
            Self::Pattern(p) => p.render(answers).map(Value::Str),
        }
    }

    fn variables(&self) -> BTreeSet<String> {
        match self {
            Self::Bool(_) => BTreeSet::new(),
            Self::Pattern(p) => p.variables(),
        }
    }
}

impl fmt::Display for DefaultValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Bool(b) => write!(f, "{b}"),
            Self::Pattern(p) => f.write_str(p.source()),
        }
    }
}

// ============================================================================
// Validators
// ============================================================================

/// Constraint on a text answer.
#[derive(Debug, Clone)]
pub enum Validator {
    /// Importable Python module name.
    Identifier,
    Email,
    NonEmpty,
    Regex(Regex),
}

impl Validator {
    /// Parse the manifest spelling: `identifier`, `email`, `non-empty`, or
    /// `regex:<pattern>`.
    pub fn parse(s: &str) -> Result<Self, String> {
        match s {
            "identifier" => Ok(Self::Identifier),
            "email" => Ok(Self::Email),
            "non-empty" => Ok(Self::NonEmpty),
            other => match other.strip_prefix("regex:") {
                Some(pattern) => Regex::new(pattern)
                    .map(Self::Regex)
                    .map_err(|e| format!("invalid validator regex '{pattern}': {e}")),
                None => Err(format!(
                    "unknown validator '{other}' (expected identifier, email, non-empty or regex:<pattern>)"
                )),
            },
        }
    }

    /// Check `input`; the error is the human-readable constraint.
    pub fn check(&self, input: &str) -> Result<(), String> {
        match self {
            Self::Identifier => {
                if !IDENTIFIER_RE.is_match(input) {
                    return Err(format!(
                        "'{input}' is not a valid module name (lowercase letters, digits and underscores, not starting with a digit)"
                    ));
                }
                if PYTHON_KEYWORDS.contains(&input) {
                    return Err(format!("'{input}' is a reserved Python keyword"));
                }
                Ok(())
            }
            Self::Email => {
                if EMAIL_RE.is_match(input) {
                    Ok(())
                } else {
                    Err(format!("'{input}' is not an email address"))
                }
            }
            Self::NonEmpty => {
                if input.trim().is_empty() {
                    Err("value cannot be empty".into())
                } else {
                    Ok(())
                }
            }
            Self::Regex(re) => {
                if re.is_match(input) {
                    Ok(())
                } else {
                    Err(format!("'{input}' does not match /{}/", re.as_str()))
                }
            }
        }
    }
}

impl PartialEq for Validator {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Regex(a), Self::Regex(b)) => a.as_str() == b.as_str(),
            _ => std::mem::discriminant(self) == std::mem::discriminant(other),
        }
    }
}

impl fmt::Display for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Identifier => f.write_str("identifier"),
            Self::Email => f.write_str("email"),
            Self::NonEmpty => f.write_str("non-empty"),
            Self::Regex(re) => write!(f, "regex:{}", re.as_str()),
        }
    }
}

// ============================================================================
// Question
// ============================================================================

/// One prompt of the questionnaire.
///
/// A question without a default is required.
#[derive(Debug, Clone, PartialEq)]
pub struct Question {
    pub key: String,
    pub prompt: String,
    pub help: Option<String>,
    pub kind: QuestionKind,
    pub default: Option<DefaultValue>,
    pub validator: Option<Validator>,
    pub when: Option<Condition>,
}

impl Question {
    pub fn new(key: impl Into<String>, prompt: impl Into<String>, kind: QuestionKind) -> Self {
        Self {
            key: key.into(),
            prompt: prompt.into(),
            help: None,
            kind,
            default: None,
            validator: None,
            when: None,
        }
    }

    pub fn text(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(key, prompt, QuestionKind::Text)
    }

    pub fn choice<S: Into<String>>(
        key: impl Into<String>,
        prompt: impl Into<String>,
        choices: impl IntoIterator<Item = S>,
    ) -> Self {
        Self::new(
            key,
            prompt,
            QuestionKind::Choice(choices.into_iter().map(Into::into).collect()),
        )
    }

    pub fn confirm(key: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self::new(key, prompt, QuestionKind::Confirm)
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    pub fn with_default(mut self, default: DefaultValue) -> Self {
        self.default = Some(default);
        self
    }

    pub fn with_validator(mut self, validator: Validator) -> Self {
        self.validator = Some(validator);
        self
    }

    pub fn when(mut self, condition: Condition) -> Self {
        self.when = Some(condition);
        self
    }

    pub fn is_required(&self) -> bool {
        self.default.is_none()
    }

    /// Evaluate the `when` guard against the answers collected so far.
    pub fn applies(&self, answers: &AnswerSet) -> Result<bool, DomainError> {
        match &self.when {
            Some(cond) => cond.evaluate(answers, &format!("question '{}'", self.key)),
            None => Ok(true),
        }
    }

    /// Render the question's own default against the answers so far.
    pub fn resolve_default(&self, answers: &AnswerSet) -> Result<Option<Value>, DomainError> {
        self.default.as_ref().map(|d| d.resolve(answers)).transpose()
    }

    /// Convert a raw value to this question's kind.
    ///
    /// Confirm questions accept `yes/no`, `y/n`, `true/false`, `on/off` and
    /// `1/0` spelled as strings; text questions accept booleans as their
    /// lowercase spelling.
    pub fn coerce(&self, value: Value) -> Result<Value, DomainError> {
        match (&self.kind, value) {
            (QuestionKind::Confirm, Value::Bool(b)) => Ok(Value::Bool(b)),
            (QuestionKind::Confirm, Value::Str(s)) => parse_flag(&s).map(Value::Bool).ok_or_else(|| {
                DomainError::invalid_answer(&self.key, format!("expected yes or no, got '{s}'"))
            }),
            (QuestionKind::Text, Value::Bool(b)) => Ok(Value::Str(b.to_string())),
            (QuestionKind::Choice(_), Value::Bool(b)) => Err(DomainError::invalid_answer(
                &self.key,
                format!("expected one of {}, got {b}", self.kind.choices().join(", ")),
            )),
            (_, v @ Value::Str(_)) => Ok(v),
        }
    }

    /// Check kind, enum membership and validator.
    pub fn validate(&self, value: &Value) -> Result<(), DomainError> {
        let text = match (&self.kind, value) {
            (QuestionKind::Confirm, Value::Bool(_)) => return Ok(()),
            (QuestionKind::Confirm, other) | (_, other @ Value::Bool(_)) => {
                return Err(DomainError::invalid_answer(
                    &self.key,
                    format!("expected a {} answer, got a {}", self.kind, other.kind_name()),
                ));
            }
            (_, Value::Str(s)) => s.as_str(),
        };

        if let QuestionKind::Choice(choices) = &self.kind {
            if !choices.iter().any(|c| c == text) {
                return Err(DomainError::invalid_answer(
                    &self.key,
                    format!("'{text}' is not one of: {}", choices.join(", ")),
                ));
            }
        }

        if self.is_required() && text.trim().is_empty() {
            return Err(DomainError::invalid_answer(&self.key, "a value is required"));
        }

        if let Some(validator) = &self.validator {
            validator
                .check(text)
                .map_err(|reason| DomainError::invalid_answer(&self.key, reason))?;
        }

        Ok(())
    }

    /// Answer keys read by the default pattern and the guard.
    pub fn dependencies(&self) -> BTreeSet<String> {
        let mut keys = self
            .default
            .as_ref()
            .map(DefaultValue::variables)
            .unwrap_or_default();
        if let Some(cond) = &self.when {
            keys.extend(cond.variables());
        }
        keys
    }
}

fn parse_flag(s: &str) -> Option<bool> {
    match s.trim().to_ascii_lowercase().as_str() {
        "y" | "yes" | "true" | "on" | "1" => Some(true),
        "n" | "no" | "false" | "off" | "0" => Some(false),
        _ => None,
    }
}

// ============================================================================
// Questionnaire
// ============================================================================

/// Ordered, closed set of questions.
///
/// Invariants (checked by [`Questionnaire::new`]): keys are unique, and a
/// question's default and guard only read keys of questions before it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Questionnaire {
    questions: Vec<Question>,
}

impl Questionnaire {
    pub fn new(questions: Vec<Question>) -> Result<Self, DomainError> {
        let mut seen: HashSet<&str> = HashSet::new();
        for q in &questions {
            if q.key.is_empty() {
                return Err(DomainError::InvalidCatalog("question key cannot be empty".into()));
            }
            if let QuestionKind::Choice(choices) = &q.kind {
                if choices.is_empty() {
                    return Err(DomainError::InvalidCatalog(format!(
                        "question '{}' has no choices",
                        q.key
                    )));
                }
            }
            for dep in q.dependencies() {
                if !seen.contains(dep.as_str()) {
                    return Err(DomainError::InvalidCatalog(format!(
                        "question '{}' reads '{dep}', which is not an earlier question",
                        q.key
                    )));
                }
            }
            if !seen.insert(q.key.as_str()) {
                return Err(DomainError::InvalidCatalog(format!(
                    "duplicate question key '{}'",
                    q.key
                )));
            }
        }
        Ok(Self { questions })
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.questions.iter()
    }

    pub fn get(&self, key: &str) -> Option<&Question> {
        self.questions.iter().find(|q| q.key == key)
    }

    pub fn contains(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.questions.iter().map(|q| q.key.as_str())
    }

    pub fn len(&self) -> usize {
        self.questions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.questions.is_empty()
    }

    /// All-or-nothing check of a finished answer set.
    ///
    /// Every applicable question must be answered with a valid value; no key
    /// may belong to an unknown or skipped question. Defaults are not filled
    /// in here: that is the collector's job.
    pub fn validate_answers(&self, answers: &AnswerSet) -> Result<(), DomainError> {
        if let Some(unknown) = answers.keys().find(|k| !self.contains(k)) {
            return Err(DomainError::UnknownQuestion {
                key: unknown.to_string(),
            });
        }

        for question in &self.questions {
            let applies = question.applies(answers)?;
            match (applies, answers.get(&question.key)) {
                (true, Some(value)) => question.validate(value)?,
                (true, None) => {
                    return Err(DomainError::MissingAnswer {
                        key: question.key.clone(),
                    });
                }
                (false, Some(_)) => {
                    return Err(DomainError::UnexpectedAnswer {
                        key: question.key.clone(),
                        reason: format!(
                            "condition '{}' is false",
                            question.when.as_ref().map(Condition::source).unwrap_or_default()
                        ),
                    });
                }
                (false, None) => {}
            }
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a Questionnaire {
    type Item = &'a Question;
    type IntoIter = std::slice::Iter<'a, Question>;

    fn into_iter(self) -> Self::IntoIter {
        self.questions.iter()
    }
}
