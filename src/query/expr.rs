// file: src/query/expr.rs
// description: structured query expressions rendered to CQL or JQL
// reference: https://developer.atlassian.com/cloud/confluence/advanced-searching-using-cql/

use std::fmt;

/// Right-hand side of a clause.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Value {
    /// Rendered inside double quotes with `\` and `"` escaped.
    Quoted(String),
    /// Rendered verbatim. Only for keywords and identifiers.
    Bare(String),
}

impl Value {
    pub fn quoted(text: impl Into<String>) -> Self {
        Value::Quoted(text.into())
    }

    /// Bare when the identifier is a plain token, quoted otherwise.
    pub fn identifier(id: impl Into<String>) -> Self {
        let id = id.into();
        let plain = !id.is_empty()
            && id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if plain { Value::Bare(id) } else { Value::Quoted(id) }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Bare(token) => f.write_str(token),
            Value::Quoted(text) => {
                f.write_str("\"")?;
                for c in text.chars() {
                    match c {
                        '"' => f.write_str("\\\"")?,
                        '\\' => f.write_str("\\\\")?,
                        _ => write!(f, "{}", c)?,
                    }
                }
                f.write_str("\"")
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Expr {
    /// `field ~ value`
    Contains { field: String, value: Value },
    /// `field = value`
    Equals { field: String, value: Value },
    /// `field in (v1, v2)`
    In { field: String, values: Vec<Value> },
    Not(Box<Expr>),
    And(Vec<Expr>),
    Or(Vec<Expr>),
}

impl Expr {
    pub fn contains(field: &str, text: &str) -> Self {
        Expr::Contains {
            field: field.to_string(),
            value: Value::quoted(text),
        }
    }

    pub fn equals(field: &str, value: Value) -> Self {
        Expr::Equals {
            field: field.to_string(),
            value,
        }
    }

    pub fn not_equals(field: &str, value: Value) -> Self {
        Expr::Not(Box::new(Expr::equals(field, value)))
    }

    pub fn is_in(field: &str, values: Vec<Value>) -> Self {
        Expr::In {
            field: field.to_string(),
            values,
        }
    }

    /// Conjunction of `parts`; `None` when empty, the lone part when there is one.
    pub fn all(parts: Vec<Expr>) -> Option<Expr> {
        Self::combine(parts, Expr::And)
    }

    /// Disjunction of `parts`; `None` when empty, the lone part when there is one.
    pub fn any(parts: Vec<Expr>) -> Option<Expr> {
        Self::combine(parts, Expr::Or)
    }

    fn combine(mut parts: Vec<Expr>, wrap: fn(Vec<Expr>) -> Expr) -> Option<Expr> {
        match parts.len() {
            0 => None,
            1 => parts.pop(),
            _ => Some(wrap(parts)),
        }
    }

    /// True when some clause of the tree is `field != value`.
    pub fn has_exclusion(&self, field: &str, value: &Value) -> bool {
        match self {
            Expr::Not(inner) => matches!(
                inner.as_ref(),
                Expr::Equals { field: f, value: v } if f == field && v == value
            ),
            Expr::And(parts) | Expr::Or(parts) => {
                parts.iter().any(|p| p.has_exclusion(field, value))
            }
            _ => false,
        }
    }

    fn is_compound(&self) -> bool {
        matches!(self, Expr::And(parts) | Expr::Or(parts) if parts.len() > 1)
    }

    fn write_joined(f: &mut fmt::Formatter<'_>, parts: &[Expr], op: &str) -> fmt::Result {
        for (i, part) in parts.iter().enumerate() {
            if i > 0 {
                write!(f, " {} ", op)?;
            }
            if part.is_compound() {
                write!(f, "({})", part)?;
            } else {
                write!(f, "{}", part)?;
            }
        }
        Ok(())
    }

    fn write_values(f: &mut fmt::Formatter<'_>, values: &[Value]) -> fmt::Result {
        f.write_str("(")?;
        for (i, value) in values.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", value)?;
        }
        f.write_str(")")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Contains { field, value } => write!(f, "{} ~ {}", field, value),
            Expr::Equals { field, value } => write!(f, "{} = {}", field, value),
            Expr::In { field, values } => {
                write!(f, "{} in ", field)?;
                Self::write_values(f, values)
            }
            Expr::Not(inner) => match inner.as_ref() {
                Expr::Equals { field, value } => write!(f, "{} != {}", field, value),
                Expr::In { field, values } => {
                    write!(f, "{} not in ", field)?;
                    Self::write_values(f, values)
                }
                other => write!(f, "NOT ({})", other),
            },
            Expr::And(parts) => Self::write_joined(f, parts, "AND"),
            Expr::Or(parts) => Self::write_joined(f, parts, "OR"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortDirection {
    Asc,
    Desc,
}

/// A filter plus an optional ordering, e.g. a full JQL statement.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Query {
    pub filter: Expr,
    pub order_by: Option<(String, SortDirection)>,
}

impl Query {
    pub fn new(filter: Expr) -> Self {
        Self {
            filter,
            order_by: None,
        }
    }

    pub fn order_by(mut self, field: &str, direction: SortDirection) -> Self {
        self.order_by = Some((field.to_string(), direction));
        self
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.filter)?;
        if let Some((field, direction)) = &self.order_by {
            let dir = match direction {
                SortDirection::Asc => "ASC",
                SortDirection::Desc => "DESC",
            };
            write!(f, " ORDER BY {} {}", field, dir)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_quoting_escapes_specials() {
        let expr = Expr::contains("title", r#"say "hi" \o/"#);
        assert_eq!(expr.to_string(), r#"title ~ "say \"hi\" \\o/""#);
    }

    #[test]
    fn test_identifier_values() {
        assert_eq!(Value::identifier("12345"), Value::Bare("12345".into()));
        assert_eq!(Value::identifier("OPS-7"), Value::Bare("OPS-7".into()));
        assert_eq!(
            Value::identifier("1 OR 1=1"),
            Value::Quoted("1 OR 1=1".into())
        );
    }

    #[test]
    fn test_nested_groups_are_parenthesized() {
        let kw = Expr::any(vec![
            Expr::contains("title", "alpha"),
            Expr::contains("title", "beta"),
        ])
        .unwrap();
        let filter = Expr::all(vec![
            Expr::equals("type", Value::Bare("page".into())),
            Expr::not_equals("id", Value::identifier("9")),
            kw,
        ])
        .unwrap();

        assert_eq!(
            filter.to_string(),
            r#"type = page AND id != 9 AND (title ~ "alpha" OR title ~ "beta")"#
        );
    }

    #[test]
    fn test_single_part_is_not_wrapped() {
        let only = Expr::any(vec![Expr::contains("summary", "deploy")]).unwrap();
        assert!(matches!(only, Expr::Contains { .. }));
        assert!(Expr::all(vec![]).is_none());
    }

    #[test]
    fn test_negations_and_in_lists() {
        let values = vec![Value::quoted("a"), Value::quoted("b")];
        assert_eq!(
            Expr::is_in("labels", values.clone()).to_string(),
            r#"labels in ("a", "b")"#
        );
        assert_eq!(
            Expr::Not(Box::new(Expr::is_in("labels", values))).to_string(),
            r#"labels not in ("a", "b")"#
        );
        assert_eq!(
            Expr::Not(Box::new(Expr::contains("title", "x"))).to_string(),
            r#"NOT (title ~ "x")"#
        );
    }

    #[test]
    fn test_query_order_by() {
        let query = Query::new(Expr::not_equals("issuekey", Value::identifier("OPS-1")))
            .order_by("updated", SortDirection::Desc);
        assert_eq!(query.to_string(), "issuekey != OPS-1 ORDER BY updated DESC");
    }
}
