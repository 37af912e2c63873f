//! Typed OData filter AST.
//!
//! Filters are built as a tree and rendered to the service's OData mini
//! language only at the edge (`FilterExpr::render`). Sanitization of
//! untrusted terms happens at construction time (`FilterExpr::is_match`),
//! not at render time, so a rendered filter can never embed an unescaped
//! or suspicious term.

use serde::{Deserialize, Serialize};

/// A filter expression tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum FilterExpr {
    /// `field eq 'value'`, with `value` already quote-escaped.
    Eq { field: String, value: String },
    /// `search.ismatch('term', 'field')`, with `term` already escaped.
    IsMatch { term: String, field: String },
    /// Literal no-match sentinel, `(1 eq 0)`.
    NoMatch,
    /// Conjunction of sub-expressions.
    And(Vec<FilterExpr>),
    /// Disjunction of sub-expressions.
    Or(Vec<FilterExpr>),
    /// Negation of a sub-expression.
    Not(Box<FilterExpr>),
    /// An opaque, already-rendered clause, used for caller-supplied
    /// pre-validated filters.
    Raw(String),
}

impl FilterExpr {
    /// Escape single quotes by doubling them, as OData requires.
    pub fn escape(value: &str) -> String {
        value.replace('\'', "''")
    }

    /// Build an `eq` clause, escaping `value`.
    pub fn eq(field: impl Into<String>, value: &str) -> Self {
        Self::Eq { field: field.into(), value: Self::escape(value) }
    }

    /// Build an `ismatch` clause, escaping `term`.
    pub fn is_match(term: &str, field: impl Into<String>) -> Self {
        Self::IsMatch { term: Self::escape(term), field: field.into() }
    }

    /// Render this expression to an OData filter string.
    pub fn render(&self) -> String {
        match self {
            Self::Eq { field, value } => format!("{field} eq '{value}'"),
            Self::IsMatch { term, field } => format!("search.ismatch('{term}', '{field}')"),
            Self::NoMatch => "(1 eq 0)".to_string(),
            Self::And(parts) => Self::join(parts, " and "),
            Self::Or(parts) => Self::join(parts, " or "),
            Self::Not(inner) => format!("not ({})", inner.render()),
            Self::Raw(s) => s.clone(),
        }
    }

    fn join(parts: &[FilterExpr], sep: &str) -> String {
        if parts.is_empty() {
            return FilterExpr::NoMatch.render();
        }
        if parts.len() == 1 {
            return parts[0].render();
        }
        let rendered: Vec<String> = parts.iter().map(|p| format!("({})", p.render())).collect();
        rendered.join(sep)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escapes_single_quotes() {
        assert_eq!(FilterExpr::escape("o'brien"), "o''brien");
    }

    #[test]
    fn eq_renders_escaped() {
        let e = FilterExpr::eq("language", "rust's");
        assert_eq!(e.render(), "language eq 'rust''s'");
    }

    #[test]
    fn and_or_compose() {
        let expr = FilterExpr::And(vec![
            FilterExpr::eq("repository", "repo"),
            FilterExpr::Or(vec![
                FilterExpr::eq("language", "rust"),
                FilterExpr::eq("language", "python"),
            ]),
        ]);
        assert_eq!(
            expr.render(),
            "(repository eq 'repo') and ((language eq 'rust') or (language eq 'python'))"
        );
    }

    #[test]
    fn empty_or_renders_no_match() {
        assert_eq!(FilterExpr::Or(vec![]).render(), "(1 eq 0)");
    }
}
