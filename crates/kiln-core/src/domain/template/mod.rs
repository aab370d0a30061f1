//! Content and path patterns.
//!
//! A [`Pattern`] is parsed once into a tree of literal / token / conditional
//! nodes and then evaluated against an [`AnswerSet`] as often as needed.
//! Parsing catches every syntax problem up front; rendering can only fail on
//! answers (a token whose key is absent from the set).
//!
//! ```text
//! [project]
//! name = "{{ project_name | kebab }}"
//! {% if project_type == 'service' %}
//! dependencies = ["{{ service_framework }}"]
//! {% endif %}
//! ```

pub mod case;
pub mod expr;
pub mod parser;

use std::collections::BTreeSet;

use crate::domain::{
    entities::answers::{AnswerSet, Value},
    error::DomainError,
};

pub use case::Filter;
pub use expr::Condition;
pub use parser::{Branch, Conditional, Node, Token};

/// A parsed template: content of a catalog file, an output path, or a
/// question default.
#[derive(Debug, Clone, PartialEq)]
pub struct Pattern {
    name: String,
    source: String,
    nodes: Vec<Node>,
}

impl Pattern {
    /// Parse `source`. `name` identifies the pattern in errors.
    pub fn parse(name: impl Into<String>, source: impl Into<String>) -> Result<Self, DomainError> {
        let name = name.into();
        let source = source.into();
        let nodes = parser::parse(&name, &source)?;
        Ok(Self {
            name,
            source,
            nodes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn source(&self) -> &str {
        &self.source
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// `true` when the pattern contains no tokens or conditionals.
    pub fn is_static(&self) -> bool {
        self.nodes.iter().all(|n| matches!(n, Node::Text(_)))
    }

    /// Evaluate against `answers`.
    ///
    /// Only taken branches are evaluated, so a token for a conditionally
    /// skipped question is fine inside a guard that excludes it.
    pub fn render(&self, answers: &AnswerSet) -> Result<String, DomainError> {
        let mut out = String::with_capacity(self.source.len());
        render_nodes(&self.nodes, answers, &self.name, &mut out)?;
        Ok(out)
    }

    /// Every answer key this pattern can read, in any branch.
    pub fn variables(&self) -> BTreeSet<String> {
        let mut vars = BTreeSet::new();
        collect_vars(&self.nodes, &mut vars);
        vars
    }
}

fn render_nodes(
    nodes: &[Node],
    answers: &AnswerSet,
    name: &str,
    out: &mut String,
) -> Result<(), DomainError> {
    for node in nodes {
        match node {
            Node::Text(text) => out.push_str(text),
            Node::Token(token) => out.push_str(&render_token(token, answers, name)?),
            Node::Conditional(cond) => {
                let mut taken = None;
                for branch in &cond.branches {
                    if branch.condition.evaluate(answers, name)? {
                        taken = Some(&branch.body);
                        break;
                    }
                }
                if let Some(body) = taken.or(cond.otherwise.as_ref()) {
                    render_nodes(body, answers, name, out)?;
                }
            }
        }
    }
    Ok(())
}

fn render_token(token: &Token, answers: &AnswerSet, name: &str) -> Result<String, DomainError> {
    let value = answers
        .get(&token.key)
        .ok_or_else(|| DomainError::UnknownToken {
            token: token.key.clone(),
            template: name.to_string(),
        })?;

    let mut rendered = match value {
        Value::Str(s) => s.clone(),
        Value::Bool(b) => b.to_string(),
    };
    for filter in &token.filters {
        rendered = filter.apply(&rendered);
    }
    Ok(rendered)
}

fn collect_vars(nodes: &[Node], out: &mut BTreeSet<String>) {
    for node in nodes {
        match node {
            Node::Text(_) => {}
            Node::Token(token) => {
                out.insert(token.key.clone());
            }
            Node::Conditional(cond) => {
                for branch in &cond.branches {
                    out.extend(branch.condition.variables());
                    collect_vars(&branch.body, out);
                }
                if let Some(body) = &cond.otherwise {
                    collect_vars(body, out);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service_answers(framework: &str) -> AnswerSet {
        [
            ("project_name", Value::from("My Api")),
            ("project_type", Value::from("service")),
            ("service_framework", Value::from(framework)),
            ("enable_github_action", Value::from(true)),
        ]
        .into_iter()
        .collect()
    }

    #[test]
    fn renders_tokens_with_filters() {
        let p = Pattern::parse("t", "{{ project_name }} / {{ project_name | snake }}").unwrap();
        assert_eq!(p.render(&service_answers("flask")).unwrap(), "My Api / my_api");
    }

    #[test]
    fn renders_nested_regions() {
        let src = "\
start
{% if project_type == 'service' %}
{% if service_framework == 'fastapi' %}
app = FastAPI()
{% else %}
app = Flask(__name__)
{% endif %}
{% endif %}
end
";
        let p = Pattern::parse("main.py", src).unwrap();
        assert_eq!(
            p.render(&service_answers("fastapi")).unwrap(),
            "start\napp = FastAPI()\nend\n"
        );
        assert_eq!(
            p.render(&service_answers("flask")).unwrap(),
            "start\napp = Flask(__name__)\nend\n"
        );
    }

    #[test]
    fn unknown_token_fails_fast() {
        let p = Pattern::parse("README.md", "by {{ author_username }}").unwrap();
        assert_eq!(
            p.render(&service_answers("flask")),
            Err(DomainError::UnknownToken {
                token: "author_username".into(),
                template: "README.md".into(),
            })
        );
    }

    #[test]
    fn untaken_branches_are_not_evaluated() {
        let cli: AnswerSet = [("project_type", Value::from("cli"))].into_iter().collect();
        let p = Pattern::parse(
            "t",
            "{% if project_type == 'service' %}{{ service_framework }}{% else %}cli{% endif %}",
        )
        .unwrap();
        assert_eq!(p.render(&cli).unwrap(), "cli");
    }

    #[test]
    fn booleans_render_lowercase() {
        let p = Pattern::parse("t", "{{ enable_github_action }}").unwrap();
        assert_eq!(p.render(&service_answers("flask")).unwrap(), "true");
    }

    #[test]
    fn variables_cover_all_branches() {
        let p = Pattern::parse(
            "t",
            "{{ a }}{% if b == 'x' %}{{ c }}{% elif d %}{% else %}{{ e | upper }}{% endif %}",
        )
        .unwrap();
        let vars: Vec<_> = p.variables().into_iter().collect();
        assert_eq!(vars, ["a", "b", "c", "d", "e"]);
    }

    #[test]
    fn static_detection() {
        assert!(Pattern::parse("t", "plain text").unwrap().is_static());
        assert!(!Pattern::parse("t", "{{ a }}").unwrap().is_static());
    }
}
