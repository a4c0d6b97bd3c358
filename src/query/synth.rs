// file: src/query/synth.rs
// description: related-item query synthesis for pages (CQL) and issues (JQL)

use super::expr::{Expr, Query, SortDirection, Value};
use super::keywords::extract_keywords;

/// The fields of a fetched page or issue that relatedness is derived from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceItem {
    pub identifier: String,
    /// Page title or issue summary.
    pub text: String,
    pub labels: Vec<String>,
    /// Owning project key, issues only.
    pub scope: Option<String>,
}

impl SourceItem {
    pub fn keywords(&self) -> Vec<String> {
        extract_keywords(&self.text)
    }

    fn labels(&self) -> impl Iterator<Item = &str> {
        self.labels
            .iter()
            .map(|l| l.trim())
            .filter(|l| !l.is_empty())
    }
}

/// CQL for pages related to `source`.
///
/// Keyword matches are AND'ed onto the base clause. Label matches widen the
/// result with a top-level OR when keyword matches exist, and are AND'ed onto
/// the base clause when they are the only signal.
pub fn related_pages_query(source: &SourceItem) -> Query {
    let mut clauses = vec![
        Expr::equals("type", Value::Bare("page".to_string())),
        Expr::not_equals("id", Value::identifier(source.identifier.as_str())),
    ];

    let keyword_match = Expr::any(
        source
            .keywords()
            .iter()
            .map(|kw| Expr::contains("title", kw))
            .collect(),
    );
    let label_match = Expr::any(
        source
            .labels()
            .map(|label| Expr::equals("labelText", Value::quoted(label)))
            .collect(),
    );

    let filter = match (keyword_match, label_match) {
        (Some(keywords), Some(labels)) => {
            clauses.push(keywords);
            Expr::Or(vec![Expr::And(clauses), labels])
        }
        (Some(signal), None) | (None, Some(signal)) => {
            clauses.push(signal);
            Expr::And(clauses)
        }
        (None, None) => Expr::And(clauses),
    };

    Query::new(filter)
}

/// JQL for issues related to `source`, most recently updated first.
///
/// Any of same project, a summary keyword or a shared label qualifies; the
/// source issue itself is always excluded.
pub fn related_issues_query(source: &SourceItem) -> Query {
    let mut signals = Vec::new();

    if let Some(project) = source.scope.as_deref().filter(|p| !p.is_empty()) {
        signals.push(Expr::equals("project", Value::identifier(project)));
    }

    signals.extend(
        source
            .keywords()
            .iter()
            .map(|kw| Expr::contains("summary", kw)),
    );

    let labels: Vec<Value> = source.labels().map(Value::quoted).collect();
    if !labels.is_empty() {
        signals.push(Expr::is_in("labels", labels));
    }

    let exclusion = Expr::not_equals("issuekey", Value::identifier(source.identifier.as_str()));
    let filter = match Expr::any(signals) {
        Some(related) => Expr::And(vec![related, exclusion]),
        None => exclusion,
    };

    Query::new(filter).order_by("updated", SortDirection::Desc)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn page(id: &str, title: &str, labels: &[&str]) -> SourceItem {
        SourceItem {
            identifier: id.to_string(),
            text: title.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            scope: None,
        }
    }

    fn issue(key: &str, summary: &str, labels: &[&str], project: Option<&str>) -> SourceItem {
        SourceItem {
            identifier: key.to_string(),
            text: summary.to_string(),
            labels: labels.iter().map(|l| l.to_string()).collect(),
            scope: project.map(str::to_string),
        }
    }

    #[test]
    fn test_page_query_without_signals_is_base_clause() {
        let query = related_pages_query(&page("123", "", &[]));
        assert_eq!(query.to_string(), "type = page AND id != 123");
        match &query.filter {
            Expr::And(parts) => assert_eq!(parts.len(), 2),
            other => panic!("expected conjunction, got {other:?}"),
        }
    }

    #[test]
    fn test_page_query_keywords_and_labels_broaden_with_or() {
        let query = related_pages_query(&page("42", "meeting notes", &["oncall"]));

        let Expr::Or(top) = &query.filter else {
            panic!("expected top-level OR, got {:?}", query.filter);
        };
        assert_eq!(top.len(), 2);
        assert!(matches!(&top[0], Expr::And(parts) if parts.len() == 3));
        assert_eq!(
            top[1],
            Expr::equals("labelText", Value::quoted("oncall"))
        );
        assert_eq!(
            query.to_string(),
            r#"(type = page AND id != 42 AND (title ~ "meeting" OR title ~ "notes")) OR labelText = "oncall""#
        );
    }

    #[test]
    fn test_page_query_labels_only_narrow_with_and() {
        let query = related_pages_query(&page("42", "", &["oncall", "runbook"]));

        let Expr::And(parts) = &query.filter else {
            panic!("expected top-level AND, got {:?}", query.filter);
        };
        assert_eq!(parts.len(), 3);
        assert!(matches!(&parts[2], Expr::Or(labels) if labels.len() == 2));
        assert_eq!(
            query.to_string(),
            r#"type = page AND id != 42 AND (labelText = "oncall" OR labelText = "runbook")"#
        );
    }

    #[test]
    fn test_page_query_keywords_only() {
        let query = related_pages_query(&page("7", "Incident postmortem", &[]));
        assert_eq!(
            query.to_string(),
            r#"type = page AND id != 7 AND (title ~ "Incident" OR title ~ "postmortem")"#
        );
    }

    #[test]
    fn test_page_query_always_excludes_source() {
        for source in [
            page("1", "", &[]),
            page("2", "Team onboarding guide", &[]),
            page("3", "", &["hr"]),
            page("4", "Team onboarding guide", &["hr"]),
        ] {
            let query = related_pages_query(&source);
            assert!(
                query
                    .filter
                    .has_exclusion("id", &Value::identifier(source.identifier.as_str())),
                "{query}"
            );
        }
    }

    #[test]
    fn test_blank_labels_are_ignored() {
        let query = related_pages_query(&page("5", "", &["", "  "]));
        assert_eq!(query.to_string(), "type = page AND id != 5");
    }

    #[test]
    fn test_issue_query_combines_signals_with_or() {
        let query = related_issues_query(&issue(
            "OPS-12",
            "Database failover drill",
            &["dr", "postgres"],
            Some("OPS"),
        ));
        assert_eq!(
            query.to_string(),
            r#"(project = OPS OR summary ~ "Database" OR summary ~ "failover" OR summary ~ "drill" OR labels in ("dr", "postgres")) AND issuekey != OPS-12 ORDER BY updated DESC"#
        );
        assert!(query
            .filter
            .has_exclusion("issuekey", &Value::identifier("OPS-12")));
    }

    #[test]
    fn test_issue_query_without_signals() {
        let query = related_issues_query(&issue("OPS-1", "fix", &[], None));
        assert_eq!(query.to_string(), "issuekey != OPS-1 ORDER BY updated DESC");
    }

    #[test]
    fn test_issue_query_single_signal_not_grouped() {
        let query = related_issues_query(&issue("OPS-1", "", &[], Some("OPS")));
        assert_eq!(
            query.to_string(),
            "project = OPS AND issuekey != OPS-1 ORDER BY updated DESC"
        );
    }
}
