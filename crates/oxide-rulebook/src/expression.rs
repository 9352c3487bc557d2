//! Rule sources and capture-group name handling.

use crate::template;

/// Where a rule's expression comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expression {
    /// An expression used as given.
    Raw(String),
    /// A template, compiled with [`template::compile`].
    Template(String),
}

impl Expression {
    /// Wraps a raw expression.
    pub fn raw(source: impl Into<String>) -> Self {
        Self::Raw(source.into())
    }

    /// Wraps a template.
    pub fn template(source: impl Into<String>) -> Self {
        Self::Template(source.into())
    }

    /// The source text as written.
    pub fn source(&self) -> &str {
        match self {
            Self::Raw(s) | Self::Template(s) => s,
        }
    }
}

/// How the keys of a bulk load are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SourceKind {
    /// Keys are raw expressions.
    Raw,
    /// Keys are templates.
    #[default]
    Template,
}

impl SourceKind {
    /// Tags `source` with this kind.
    pub fn expression(self, source: impl Into<String>) -> Expression {
        match self {
            Self::Raw => Expression::Raw(source.into()),
            Self::Template => Expression::Template(source.into()),
        }
    }
}

/// Rewrites the name of every named capture group.
///
/// Both `(?P<name>` and `(?<name>` are recognised, and both are written
/// back as `(?P<...>`. Escaped parentheses and parentheses inside a
/// character class are left alone. Classes nest, and a `]` right after the
/// opening `[` or `[^` is literal.
fn rewrite_names(expr: &str, mut rename: impl FnMut(usize, &str) -> String) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut index = 0;
    let mut class_depth = 0usize;
    let mut rest = expr;

    while let Some(c) = rest.chars().next() {
        match c {
            '\\' => {
                let escaped = rest[1..].chars().next().map_or(0, char::len_utf8);
                out.push_str(&rest[..=escaped]);
                rest = &rest[1 + escaped..];
                continue;
            }
            '[' => {
                let len = match ascii_class_len(rest) {
                    Some(len) if class_depth > 0 => len,
                    _ => {
                        class_depth += 1;
                        class_open_len(rest)
                    }
                };
                out.push_str(&rest[..len]);
                rest = &rest[len..];
                continue;
            }
            ']' if class_depth > 0 => class_depth -= 1,
            '(' if class_depth == 0 => {
                let opener = ["(?P<", "(?<"]
                    .into_iter()
                    .find(|opener| rest.starts_with(opener));
                if let Some(opener) = opener {
                    let after = &rest[opener.len()..];
                    let lookbehind = after.starts_with(['=', '!']);
                    if let (false, Some(end)) = (lookbehind, after.find('>')) {
                        out.push_str("(?P<");
                        out.push_str(&rename(index, &after[..end]));
                        out.push('>');
                        index += 1;
                        rest = &after[end + 1..];
                        continue;
                    }
                }
            }
            _ => {}
        }
        out.push(c);
        rest = &rest[c.len_utf8()..];
    }

    out
}

/// Length of a class opener: `[`, an optional `^`, and a leading literal `]`.
fn class_open_len(rest: &str) -> usize {
    let mut len = 1;
    if rest[len..].starts_with('^') {
        len += 1;
    }
    if rest[len..].starts_with(']') {
        len += 1;
    }
    len
}

/// Length of an ASCII class such as `[:alpha:]` or `[:^digit:]`.
fn ascii_class_len(rest: &str) -> Option<usize> {
    let body = rest.strip_prefix("[:")?;
    let end = body.find(":]")?;
    let name = &body[..end];
    (!name.is_empty() && name.chars().all(|c| c.is_ascii_alphabetic() || c == '^'))
        .then_some(end + 4)
}

/// Erases every capture-group name, keeping the group structure.
///
/// Two expressions that differ only in group naming canonicalize to the
/// same text.
///
/// ```
/// use oxide_rulebook::expression::canonicalize;
///
/// assert_eq!(
///     canonicalize(r"^(?P<id>\d+)$"),
///     canonicalize(r"^(?<key>\d+)$"),
/// );
/// ```
pub fn canonicalize(expr: &str) -> String {
    rewrite_names(expr, |_, _| String::new())
}

/// Gives every named group a unique internal name.
///
/// Returns the rewritten expression and the public names, indexed by the
/// number in the internal name (`_0`, `_1`, ...). Public names may repeat.
pub(crate) fn uniquify(expr: &str) -> (String, Vec<String>) {
    let mut names = Vec::new();
    let rewritten = rewrite_names(expr, |index, name| {
        names.push(name.to_string());
        internal_name(index)
    });
    (rewritten, names)
}

pub(crate) fn internal_name(index: usize) -> String {
    format!("_{index}")
}

/// Resolves an [`Expression`] into the expression text to build.
///
/// For templates, a leading `VERB ` token is split off and returned
/// alongside.
pub(crate) fn resolve(expression: &Expression) -> (String, Option<crate::Method>) {
    match expression {
        Expression::Raw(expr) => (expr.clone(), None),
        Expression::Template(source) => {
            let (method, template) = template::split_verb(source);
            (template::compile(template), method)
        }
    }
}
