//! Guard expressions: `enable_github_action and project_type == 'service'`.
//!
//! Grammar (lowest precedence first):
//!
//! ```text
//! or_expr  := and_expr ("or" and_expr)*
//! and_expr := not_expr ("and" not_expr)*
//! not_expr := "not" not_expr | compare
//! compare  := atom (("==" | "!=") atom)?
//! atom     := IDENT | STRING | "true" | "false" | "(" or_expr ")"
//! ```

use std::collections::BTreeSet;
use std::fmt;

use crate::domain::{
    entities::answers::{AnswerSet, Value},
    error::DomainError,
};

/// A parsed boolean guard.
///
/// Keeps its source text for display and error messages.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    source: String,
    expr: Expr,
}

impl Condition {
    /// Parse a guard expression. The error is a bare reason; callers attach
    /// the template name and line.
    pub fn parse(source: &str) -> Result<Self, String> {
        let tokens = tokenize(source)?;
        let mut parser = Parser { tokens, pos: 0 };
        let expr = parser.or_expr()?;
        if let Some(tok) = parser.peek() {
            return Err(format!("unexpected '{tok}' in expression '{source}'"));
        }
        Ok(Self {
            source: source.trim().to_string(),
            expr,
        })
    }

    /// Evaluate against the answers. `context` names the template or
    /// question the guard belongs to, for error reporting.
    ///
    /// `and`/`or` short-circuit, so `enable_github_action and publish_to_pypi`
    /// is safe when `publish_to_pypi` was skipped.
    pub fn evaluate(&self, answers: &AnswerSet, context: &str) -> Result<bool, DomainError> {
        Ok(self.expr.eval(answers, context)?.is_truthy())
    }

    /// Every answer key the expression can read.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut out = BTreeSet::new();
        self.expr.collect_vars(&mut out);
        out
    }

    pub fn source(&self) -> &str {
        &self.source
    }
}

impl fmt::Display for Condition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.source)
    }
}

#[derive(Debug, Clone, PartialEq)]
enum Expr {
    Var(String),
    Literal(Value),
    Not(Box<Expr>),
    And(Box<Expr>, Box<Expr>),
    Or(Box<Expr>, Box<Expr>),
    Eq(Box<Expr>, Box<Expr>),
    Ne(Box<Expr>, Box<Expr>),
}

impl Expr {
    fn eval(&self, answers: &AnswerSet, context: &str) -> Result<Value, DomainError> {
        Ok(match self {
            Self::Var(name) => answers
                .get(name)
                .cloned()
                .ok_or_else(|| DomainError::UnknownToken {
                    token: name.clone(),
                    template: context.to_string(),
                })?,
            Self::Literal(v) => v.clone(),
            Self::Not(inner) => Value::Bool(!inner.eval(answers, context)?.is_truthy()),
            Self::And(l, r) => Value::Bool(
                l.eval(answers, context)?.is_truthy() && r.eval(answers, context)?.is_truthy(),
            ),
            Self::Or(l, r) => Value::Bool(
                l.eval(answers, context)?.is_truthy() || r.eval(answers, context)?.is_truthy(),
            ),
            Self::Eq(l, r) => Value::Bool(l.eval(answers, context)? == r.eval(answers, context)?),
            Self::Ne(l, r) => Value::Bool(l.eval(answers, context)? != r.eval(answers, context)?),
        })
    }

    fn collect_vars(&self, out: &mut BTreeSet<String>) {
        match self {
            Self::Var(name) => {
                out.insert(name.clone());
            }
            Self::Literal(_) => {}
            Self::Not(inner) => inner.collect_vars(out),
            Self::And(l, r) | Self::Or(l, r) | Self::Eq(l, r) | Self::Ne(l, r) => {
                l.collect_vars(out);
                r.collect_vars(out);
            }
        }
    }
}

// ── Lexing ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq)]
enum Tok {
    Ident(String),
    Str(String),
    EqEq,
    NotEq,
    LParen,
    RParen,
}

impl fmt::Display for Tok {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ident(s) => f.write_str(s),
            Self::Str(s) => write!(f, "'{s}'"),
            Self::EqEq => f.write_str("=="),
            Self::NotEq => f.write_str("!="),
            Self::LParen => f.write_str("("),
            Self::RParen => f.write_str(")"),
        }
    }
}

fn tokenize(source: &str) -> Result<Vec<Tok>, String> {
    let mut tokens = Vec::new();
    let mut chars = source.chars().peekable();

    while let Some(&c) = chars.peek() {
        match c {
            c if c.is_whitespace() => {
                chars.next();
            }
            '(' => {
                chars.next();
                tokens.push(Tok::LParen);
            }
            ')' => {
                chars.next();
                tokens.push(Tok::RParen);
            }
            '=' | '!' => {
                chars.next();
                if chars.next_if_eq(&'=').is_none() {
                    return Err(format!("expected '{c}=' in expression '{source}'"));
                }
                tokens.push(if c == '=' { Tok::EqEq } else { Tok::NotEq });
            }
            '\'' | '"' => {
                chars.next();
                let mut lit = String::new();
                loop {
                    match chars.next() {
                        Some(ch) if ch == c => break,
                        Some(ch) => lit.push(ch),
                        None => return Err(format!("unterminated string in expression '{source}'")),
                    }
                }
                tokens.push(Tok::Str(lit));
            }
            c if c.is_alphabetic() || c == '_' => {
                let mut ident = String::new();
                while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                    ident.push(ch);
                }
                tokens.push(Tok::Ident(ident));
            }
            other => return Err(format!("unexpected character '{other}' in expression '{source}'")),
        }
    }

    if tokens.is_empty() {
        return Err("empty expression".into());
    }
    Ok(tokens)
}

// ── Parsing ──────────────────────────────────────────────────────────────────

struct Parser {
    tokens: Vec<Tok>,
    pos: usize,
}

impl Parser {
    fn peek(&self) -> Option<&Tok> {
        self.tokens.get(self.pos)
    }

    fn next(&mut self) -> Option<Tok> {
        let tok = self.tokens.get(self.pos).cloned();
        self.pos += 1;
        tok
    }

    fn eat_keyword(&mut self, keyword: &str) -> bool {
        if matches!(self.peek(), Some(Tok::Ident(s)) if s == keyword) {
            self.pos += 1;
            true
        } else {
            false
        }
    }

    fn or_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.and_expr()?;
        while self.eat_keyword("or") {
            let right = self.and_expr()?;
            left = Expr::Or(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn and_expr(&mut self) -> Result<Expr, String> {
        let mut left = self.not_expr()?;
        while self.eat_keyword("and") {
            let right = self.not_expr()?;
            left = Expr::And(Box::new(left), Box::new(right));
        }
        Ok(left)
    }

    fn not_expr(&mut self) -> Result<Expr, String> {
        if self.eat_keyword("not") {
            return Ok(Expr::Not(Box::new(self.not_expr()?)));
        }
        self.compare()
    }

    fn compare(&mut self) -> Result<Expr, String> {
        let left = self.atom()?;
        match self.peek() {
            Some(Tok::EqEq) => {
                self.pos += 1;
                Ok(Expr::Eq(Box::new(left), Box::new(self.atom()?)))
            }
            Some(Tok::NotEq) => {
                self.pos += 1;
                Ok(Expr::Ne(Box::new(left), Box::new(self.atom()?)))
            }
            _ => Ok(left),
        }
    }

    fn atom(&mut self) -> Result<Expr, String> {
        match self.next() {
            Some(Tok::Ident(name)) => match name.as_str() {
                "true" => Ok(Expr::Literal(Value::Bool(true))),
                "false" => Ok(Expr::Literal(Value::Bool(false))),
                "and" | "or" | "not" => Err(format!("unexpected keyword '{name}'")),
                _ => Ok(Expr::Var(name)),
            },
            Some(Tok::Str(s)) => Ok(Expr::Literal(Value::Str(s))),
            Some(Tok::LParen) => {
                let inner = self.or_expr()?;
                match self.next() {
                    Some(Tok::RParen) => Ok(inner),
                    _ => Err("expected ')'".into()),
                }
            }
            Some(tok) => Err(format!("unexpected '{tok}'")),
            None => Err("unexpected end of expression".into()),
        }
    }
}
