use serde::{Deserialize, Serialize};

/// Query language used when a statement carries no explicit language tag.
pub const DEFAULT_QUERY_LANGUAGE: &str = "xpath";

/// A query statement plus an optional language tag.
///
/// The language defaults to [`DEFAULT_QUERY_LANGUAGE`] when omitted; an
/// explicit language is used verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryStatement {
    statement: String,
    language: Option<String>,
}

impl QueryStatement {
    pub fn new(statement: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            language: None,
        }
    }

    pub fn with_language(statement: impl Into<String>, language: impl Into<String>) -> Self {
        Self {
            statement: statement.into(),
            language: Some(language.into()),
        }
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn language(&self) -> Option<&str> {
        self.language.as_deref()
    }

    /// The language this statement will actually run under.
    pub fn resolved_language(&self) -> &str {
        self.language.as_deref().unwrap_or(DEFAULT_QUERY_LANGUAGE)
    }
}

/// Result of a single query execution: the statement, the language it ran
/// under and the matched node paths in repository order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryOutcome {
    statement: String,
    language: String,
    node_paths: Vec<String>,
}

impl QueryOutcome {
    pub fn new(
        statement: impl Into<String>,
        language: impl Into<String>,
        node_paths: Vec<String>,
    ) -> Self {
        Self {
            statement: statement.into(),
            language: language.into(),
            node_paths,
        }
    }

    pub fn statement(&self) -> &str {
        &self.statement
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn node_paths(&self) -> &[String] {
        &self.node_paths
    }

    pub fn row_count(&self) -> usize {
        self.node_paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.node_paths.is_empty()
    }
}
