//! Two-stage parser: source text → pieces (lexing) → node tree.
//!
//! Block tags (`{% … %}`) and comments (`{# … #}`) that sit alone on a line
//! swallow that whole line, newline included, so templates can indent
//! control flow without leaking blank lines into the output.

use crate::domain::error::DomainError;

use super::{case::Filter, expr::Condition};

/// One node of a parsed pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Text(String),
    Token(Token),
    Conditional(Conditional),
}

/// `{{ key | filter }}`
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub key: String,
    pub filters: Vec<Filter>,
    pub line: usize,
}

/// `{% if %} … {% elif %} … {% else %} … {% endif %}`
#[derive(Debug, Clone, PartialEq)]
pub struct Conditional {
    pub branches: Vec<Branch>,
    pub otherwise: Option<Vec<Node>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub condition: Condition,
    pub body: Vec<Node>,
}

/// Parse `source` into a node tree. `name` labels errors.
pub(crate) fn parse(name: &str, source: &str) -> Result<Vec<Node>, DomainError> {
    let pieces = lex(name, source)?;
    let mut parser = TreeParser {
        name,
        pieces,
        pos: 0,
    };
    let (nodes, terminator) = parser.nodes()?;
    if let Some(tag) = terminator {
        return Err(syntax(name, tag.line, format!("unexpected {{% {} %}}", tag.keyword)));
    }
    Ok(nodes)
}

fn syntax(name: &str, line: usize, reason: impl Into<String>) -> DomainError {
    DomainError::TemplateSyntax {
        template: name.to_string(),
        line,
        reason: reason.into(),
    }
}

// ── Lexing ───────────────────────────────────────────────────────────────────

#[derive(Debug)]
enum Piece {
    Text(String),
    Expr { inner: String, line: usize },
    Block { inner: String, line: usize },
}

fn line_of(source: &str, pos: usize) -> usize {
    source[..pos].matches('\n').count() + 1
}

/// Compute where the preceding text should stop and where lexing resumes
/// for a block tag spanning `start..end`.
fn block_span(source: &str, start: usize, end: usize, cursor: usize) -> (usize, usize) {
    let line_start = source[..start].rfind('\n').map_or(0, |i| i + 1);
    let rest = &source[end..];
    let newline = rest.find('\n');
    let trailing = &rest[..newline.unwrap_or(rest.len())];

    let standalone = line_start >= cursor
        && source[line_start..start].chars().all(|c| c == ' ' || c == '\t')
        && trailing.chars().all(|c| c == ' ' || c == '\t' || c == '\r');

    if standalone {
        (line_start, end + newline.map_or(rest.len(), |i| i + 1))
    } else {
        (start, end)
    }
}

/// Find the next tag opener at or after `from`.
fn next_open(source: &str, from: usize) -> Option<(usize, &'static str, &'static str)> {
    let mut search = from;
    while let Some(rel) = source[search..].find('{') {
        let pos = search + rel;
        let rest = &source[pos..];
        if rest.starts_with("{{") {
            return Some((pos, "{{", "}}"));
        }
        if rest.starts_with("{%") {
            return Some((pos, "{%", "%}"));
        }
        if rest.starts_with("{#") {
            return Some((pos, "{#", "#}"));
        }
        search = pos + 1;
    }
    None
}

fn lex(name: &str, source: &str) -> Result<Vec<Piece>, DomainError> {
    let mut pieces = Vec::new();
    let mut cursor = 0;

    while let Some((start, open, close)) = next_open(source, cursor) {
        let line = line_of(source, start);
        let body_start = start + open.len();
        let close_rel = source[body_start..]
            .find(close)
            .ok_or_else(|| syntax(name, line, format!("unterminated '{open}' tag")))?;
        let inner = &source[body_start..body_start + close_rel];
        let end = body_start + close_rel + close.len();

        if open == "{{" {
            push_text(&mut pieces, &source[cursor..start]);
            pieces.push(Piece::Expr {
                inner: inner.trim().to_string(),
                line,
            });
            cursor = end;
            continue;
        }

        let (text_end, resume) = block_span(source, start, end, cursor);
        push_text(&mut pieces, &source[cursor..text_end]);
        cursor = resume;

        if open == "{#" {
            continue;
        }

        if inner.trim() == "raw" {
            let (raw_end, after) = find_endraw(name, source, cursor, line)?;
            push_text(&mut pieces, &source[cursor..raw_end]);
            cursor = after;
        } else {
            pieces.push(Piece::Block {
                inner: inner.trim().to_string(),
                line,
            });
        }
    }

    push_text(&mut pieces, &source[cursor..]);
    Ok(pieces)
}

fn push_text(pieces: &mut Vec<Piece>, text: &str) {
    if !text.is_empty() {
        pieces.push(Piece::Text(text.to_string()));
    }
}

/// Locate the `{% endraw %}` closing a raw block opened on `line`.
fn find_endraw(
    name: &str,
    source: &str,
    from: usize,
    line: usize,
) -> Result<(usize, usize), DomainError> {
    let mut search = from;
    while let Some(rel) = source[search..].find("{%") {
        let start = search + rel;
        let Some(close_rel) = source[start + 2..].find("%}") else {
            break;
        };
        let end = start + 2 + close_rel + 2;
        if source[start + 2..start + 2 + close_rel].trim() == "endraw" {
            return Ok(block_span(source, start, end, from));
        }
        search = start + 2;
    }
    Err(syntax(name, line, "unterminated {% raw %} block"))
}

// ── Tree building ────────────────────────────────────────────────────────────

struct BlockTag {
    keyword: String,
    rest: String,
    line: usize,
}

struct TreeParser<'a> {
    name: &'a str,
    pieces: Vec<Piece>,
    pos: usize,
}

impl TreeParser<'_> {
    /// Parse nodes until a block tag that is not `if`; return that tag.
    fn nodes(&mut self) -> Result<(Vec<Node>, Option<BlockTag>), DomainError> {
        let mut nodes = Vec::new();

        while self.pos < self.pieces.len() {
            let piece = std::mem::replace(&mut self.pieces[self.pos], Piece::Text(String::new()));
            self.pos += 1;

            match piece {
                Piece::Text(text) => nodes.push(Node::Text(text)),
                Piece::Expr { inner, line } => nodes.push(Node::Token(self.token(&inner, line)?)),
                Piece::Block { inner, line } => {
                    let (keyword, rest) = match inner.split_once(char::is_whitespace) {
                        Some((kw, rest)) => (kw.to_string(), rest.trim().to_string()),
                        None => (inner.clone(), String::new()),
                    };
                    let tag = BlockTag {
                        keyword,
                        rest,
                        line,
                    };
                    match tag.keyword.as_str() {
                        "if" => nodes.push(Node::Conditional(self.conditional(tag)?)),
                        "elif" | "else" | "endif" => return Ok((nodes, Some(tag))),
                        other => {
                            return Err(syntax(
                                self.name,
                                line,
                                format!("unknown block tag '{other}'"),
                            ));
                        }
                    }
                }
            }
        }

        Ok((nodes, None))
    }

    fn conditional(&mut self, opening: BlockTag) -> Result<Conditional, DomainError> {
        let mut branches = Vec::new();
        let mut otherwise = None;
        let mut current = opening;

        loop {
            let (body, terminator) = self.nodes()?;
            let terminator = terminator.ok_or_else(|| {
                syntax(self.name, current.line, "missing {% endif %}")
            })?;

            match current.keyword.as_str() {
                "if" | "elif" => branches.push(Branch {
                    condition: self.condition(&current)?,
                    body,
                }),
                _ => otherwise = Some(body),
            }

            match terminator.keyword.as_str() {
                "endif" => {
                    if !terminator.rest.is_empty() {
                        return Err(syntax(self.name, terminator.line, "endif takes no arguments"));
                    }
                    break;
                }
                "elif" | "else" if otherwise.is_some() => {
                    return Err(syntax(
                        self.name,
                        terminator.line,
                        format!("{{% {} %}} after {{% else %}}", terminator.keyword),
                    ));
                }
                "else" if !terminator.rest.is_empty() => {
                    return Err(syntax(self.name, terminator.line, "else takes no arguments"));
                }
                _ => current = terminator,
            }
        }

        Ok(Conditional {
            branches,
            otherwise,
        })
    }

    fn condition(&self, tag: &BlockTag) -> Result<Condition, DomainError> {
        if tag.rest.is_empty() {
            return Err(syntax(
                self.name,
                tag.line,
                format!("{{% {} %}} needs a condition", tag.keyword),
            ));
        }
        Condition::parse(&tag.rest).map_err(|reason| syntax(self.name, tag.line, reason))
    }

    fn token(&self, inner: &str, line: usize) -> Result<Token, DomainError> {
        let mut parts = inner.split('|').map(str::trim);
        let key = parts.next().unwrap_or_default();

        if !is_identifier(key) {
            return Err(syntax(self.name, line, format!("invalid token '{{{{ {inner} }}}}'")));
        }

        let filters = parts
            .map(|f| f.parse::<Filter>())
            .collect::<Result<Vec<_>, _>>()
            .map_err(|reason| syntax(self.name, line, reason))?;

        Ok(Token {
            key: key.to_string(),
            filters,
            line,
        })
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(nodes: &[Node]) -> String {
        nodes
            .iter()
            .map(|n| match n {
                Node::Text(t) => t.clone(),
                Node::Token(t) => format!("<{}>", t.key),
                Node::Conditional(_) => "<if>".into(),
            })
            .collect()
    }

    #[test]
    fn tokens_and_text() {
        let nodes = parse("t", "name = {{ project_name | snake }}!").unwrap();
        assert_eq!(texts(&nodes), "name = <project_name>!");
        match &nodes[1] {
            Node::Token(t) => assert_eq!(t.filters, vec![Filter::Snake]),
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn standalone_block_lines_are_removed() {
        let src = "a\n  {% if x %}\nb\n  {% endif %}\nc\n";
        let nodes = parse("t", src).unwrap();
        assert_eq!(nodes.len(), 3);
        assert_eq!(nodes[0], Node::Text("a\n".into()));
        assert_eq!(nodes[2], Node::Text("c\n".into()));
        match &nodes[1] {
            Node::Conditional(c) => assert_eq!(c.branches[0].body, vec![Node::Text("b\n".into())]),
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn inline_blocks_keep_surrounding_text() {
        let nodes = parse("t", "x{% if a %}y{% endif %}z").unwrap();
        assert_eq!(texts(&nodes), "x<if>z");
    }

    #[test]
    fn comments_are_dropped() {
        let nodes = parse("t", "{# header #}\nbody {# inline #}end").unwrap();
        assert_eq!(texts(&nodes), "body end");
    }

    #[test]
    fn raw_blocks_are_verbatim() {
        let src = "{% raw %}\ntoken: ${{ secrets.PYPI_TOKEN }}\n{% endraw %}\n";
        let nodes = parse("t", src).unwrap();
        assert_eq!(nodes, vec![Node::Text("token: ${{ secrets.PYPI_TOKEN }}\n".into())]);
    }

    #[test]
    fn elif_else_chain() {
        let src = "{% if a %}1{% elif b %}2{% else %}3{% endif %}";
        let nodes = parse("t", src).unwrap();
        match &nodes[0] {
            Node::Conditional(c) => {
                assert_eq!(c.branches.len(), 2);
                assert_eq!(c.otherwise, Some(vec![Node::Text("3".into())]));
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn nested_conditionals() {
        let src = "{% if a %}{% if b %}x{% endif %}{% endif %}";
        let nodes = parse("t", src).unwrap();
        match &nodes[0] {
            Node::Conditional(outer) => {
                assert!(matches!(outer.branches[0].body[0], Node::Conditional(_)));
            }
            other => panic!("unexpected node {other:?}"),
        }
    }

    #[test]
    fn syntax_errors_carry_line_numbers() {
        let cases = [
            ("line1\n{{ unterminated", 2),
            ("{% if a %}\nno end\n", 1),
            ("ok\n\n{% endif %}", 3),
            ("{% if a %}{% else %}{% elif b %}{% endif %}", 1),
            ("{% for x in y %}{% endfor %}", 1),
            ("{{ not-an-ident }}", 1),
            ("{{ name | shout }}", 1),
            ("{% if %}x{% endif %}", 1),
            ("{% raw %}never closed", 1),
        ];
        for (src, expected_line) in cases {
            match parse("t", src) {
                Err(DomainError::TemplateSyntax { line, .. }) => {
                    assert_eq!(line, expected_line, "wrong line for {src:?}")
                }
                other => panic!("expected syntax error for {src:?}, got {other:?}"),
            }
        }
    }
}
