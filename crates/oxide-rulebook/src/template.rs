//! Template compilation.
//!
//! A template is literal text with `{}` placeholders:
//!
//! - `{name}` - one or more alphanumeric characters
//! - `{name?}` - same, but the whole group may be absent
//! - `{name*}` - one or more of any character, separators included
//! - `{name:pattern}` - `pattern` used verbatim as the group body
//! - `{name:pattern?}` - typed and optional
//!
//! `/` and `.` are path separators: each is matched literally but may be
//! absent, so `/api/{model}/{id?}` accepts both `/api/users` and
//! `/api/users/324`. A leading `VERB ` token (`GET /users`) is not part of
//! the template itself; see [`split_verb`].

use crate::request::Method;

/// Group body for a bare placeholder.
pub const DEFAULT_CHARSET: &str = "[A-Za-z0-9]+";

/// Group body for a `*` placeholder.
pub const ANY_CHARSET: &str = ".+";

/// One parsed `{...}` placeholder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Placeholder {
    /// Capture name.
    pub name: String,
    /// Explicit `:pattern`, if any.
    pub pattern: Option<String>,
    /// Trailing `?`.
    pub optional: bool,
    /// Trailing `*` on the name.
    pub any: bool,
}

impl Placeholder {
    /// Parses the text between the braces.
    pub fn parse(body: &str) -> Self {
        let (body, optional) = match body.strip_suffix('?') {
            Some(stripped) => (stripped, true),
            None => (body, false),
        };

        let (name, pattern) = match body.split_once(':') {
            Some((name, pattern)) => (name, Some(pattern.to_string())),
            None => (body, None),
        };

        let (name, any) = match name.strip_suffix('*') {
            Some(stripped) => (stripped, true),
            None => (name, false),
        };

        Self {
            name: name.to_string(),
            pattern,
            optional,
            any,
        }
    }

    /// The group body: explicit pattern first, then the any/default charset.
    pub fn charset(&self) -> &str {
        match &self.pattern {
            Some(pattern) => pattern,
            None if self.any => ANY_CHARSET,
            None => DEFAULT_CHARSET,
        }
    }

    fn write_group(&self, expr: &mut String) {
        if self.name.is_empty() {
            expr.push('(');
        } else {
            expr.push_str("(?P<");
            expr.push_str(&self.name);
            expr.push('>');
        }
        expr.push_str(self.charset());
        expr.push(')');
        if self.optional {
            expr.push('?');
        }
    }
}

enum Token {
    Literal(char),
    Group(Placeholder),
}

/// Splits a template into literal characters and placeholders.
///
/// A `{` only opens a placeholder when its matching `}` follows and the
/// body is not empty; otherwise it is literal text. Braces inside the body
/// nest, so `{year:[0-9]{4}}` is one placeholder.
fn tokenize(template: &str) -> Vec<Token> {
    let mut tokens = Vec::new();
    let mut rest = template;

    while let Some(c) = rest.chars().next() {
        if c == '{' {
            if let Some(end) = placeholder_end(&rest[1..]) {
                tokens.push(Token::Group(Placeholder::parse(&rest[1..=end])));
                rest = &rest[end + 2..];
                continue;
            }
        }
        tokens.push(Token::Literal(c));
        rest = &rest[c.len_utf8()..];
    }

    tokens
}

fn placeholder_end(body: &str) -> Option<usize> {
    let mut depth = 0usize;
    let mut escaped = false;

    for (i, c) in body.char_indices() {
        match c {
            _ if escaped => escaped = false,
            '\\' => escaped = true,
            '{' => depth += 1,
            '}' if depth == 0 => return (i > 0).then_some(i),
            '}' => depth -= 1,
            _ => {}
        }
    }

    None
}

fn push_literal(expr: &mut String, c: char) {
    match c {
        '/' => expr.push_str("/?"),
        '.' => expr.push_str(r"\.?"),
        '{' => expr.push_str(r"\{"),
        '}' => expr.push_str(r"\}"),
        _ => expr.push(c),
    }
}

/// Compiles a template into an anchored expression with named groups.
///
/// Compilation is total: unbalanced braces become literal text. Duplicate
/// placeholder names are kept as they are.
///
/// # Example
///
/// ```
/// use oxide_rulebook::template::compile;
///
/// assert_eq!(
///     compile("/api/{model}/{id?}"),
///     "^/?api/?(?P<model>[A-Za-z0-9]+)/?(?P<id>[A-Za-z0-9]+)?$",
/// );
/// ```
pub fn compile(template: &str) -> String {
    let mut expr = String::with_capacity(template.len() * 2 + 2);
    expr.push('^');

    for token in tokenize(template) {
        match token {
            Token::Literal(c) => push_literal(&mut expr, c),
            Token::Group(placeholder) => placeholder.write_group(&mut expr),
        }
    }

    expr.push('$');
    expr
}

/// Returns the placeholders of a template, left to right.
pub fn placeholders(template: &str) -> Vec<Placeholder> {
    tokenize(template)
        .into_iter()
        .filter_map(|token| match token {
            Token::Group(placeholder) => Some(placeholder),
            Token::Literal(_) => None,
        })
        .collect()
}

/// Splits a leading `VERB ` token off a template.
///
/// The token must be upper case and name a known [`Method`].
///
/// ```
/// use oxide_rulebook::{template::split_verb, Method};
///
/// assert_eq!(split_verb("GET /users"), (Some(Method::Get), "/users"));
/// assert_eq!(split_verb("/users"), (None, "/users"));
/// ```
pub fn split_verb(template: &str) -> (Option<Method>, &str) {
    if let Some((head, tail)) = template.split_once(char::is_whitespace) {
        if head.chars().all(|c| c.is_ascii_uppercase()) {
            if let Some(method) = Method::parse(head) {
                return (Some(method), tail.trim_start());
            }
        }
    }
    (None, template)
}
