//! Terminal prompt implementing the [`AnswerSource`] port.

use console::{Term, style};
use dialoguer::{Confirm, Input, Select, theme::ColorfulTheme};

use kiln_core::{
    application::{ApplicationError, ports::AnswerSource},
    domain::{Question, QuestionKind, Value},
    error::KilnResult,
};

/// Asks each question on the terminal: text input, a select list for
/// choices, `y/n` for confirms.
pub struct TerminalPrompt {
    theme: ColorfulTheme,
    term: Term,
}

impl TerminalPrompt {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
            term: Term::stderr(),
        }
    }

    fn note(&self, line: String) -> KilnResult<()> {
        self.term.write_line(&line).map_err(prompt_failed)
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl AnswerSource for TerminalPrompt {
    fn is_interactive(&self) -> bool {
        true
    }

    fn ask(
        &mut self,
        question: &Question,
        default: Option<&Value>,
        error: Option<&str>,
    ) -> KilnResult<Option<Value>> {
        match error {
            Some(error) => self.note(format!("  {}", style(error).red()))?,
            None => {
                if let Some(help) = &question.help {
                    self.note(format!("  {}", style(help).dim()))?;
                }
            }
        }

        let value = match &question.kind {
            QuestionKind::Text => {
                let mut input = Input::<String>::with_theme(&self.theme)
                    .with_prompt(&question.prompt)
                    .allow_empty(true);
                if let Some(default) = default {
                    input = input.default(default.to_string());
                }
                Value::Str(input.interact_text_on(&self.term).map_err(prompt_failed)?)
            }
            QuestionKind::Choice(choices) => {
                let selected = default
                    .and_then(Value::as_str)
                    .and_then(|d| choices.iter().position(|c| c == d))
                    .unwrap_or(0);
                let index = Select::with_theme(&self.theme)
                    .with_prompt(&question.prompt)
                    .items(choices.as_slice())
                    .default(selected)
                    .interact_on(&self.term)
                    .map_err(prompt_failed)?;
                Value::Str(choices[index].clone())
            }
            QuestionKind::Confirm => {
                let answer = Confirm::with_theme(&self.theme)
                    .with_prompt(&question.prompt)
                    .default(default.and_then(Value::as_bool).unwrap_or(false))
                    .interact_on(&self.term)
                    .map_err(prompt_failed)?;
                Value::Bool(answer)
            }
        };
        Ok(Some(value))
    }
}

fn prompt_failed(e: impl std::fmt::Display) -> kiln_core::error::KilnError {
    ApplicationError::PromptFailed {
        reason: e.to_string(),
    }
    .into()
}

/// Final `Continue?` before anything is written.
pub fn confirm_write(prompt: &str) -> KilnResult<bool> {
    Confirm::with_theme(&ColorfulTheme::default())
        .with_prompt(prompt)
        .default(true)
        .interact_on(&Term::stderr())
        .map_err(prompt_failed)
}
