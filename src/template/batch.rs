//! Batch query execution: many statements, one session.

use log::warn;
use serde::Serialize;

use super::RepoTemplate;
use crate::core::Result;
use crate::query::{DEFAULT_QUERY_LANGUAGE, QueryOutcome};
use crate::session::binding::BindingContext;

/// Ordered mapping from statement to its query result (or `None` for a
/// statement that failed under `ignore_errors`).
///
/// Iteration order equals statement submission order. A duplicate statement
/// overwrites its earlier entry in place, last one wins.
#[derive(Debug, Default, Serialize)]
pub struct BatchResults {
    entries: Vec<(String, Option<QueryOutcome>)>,
}

impl BatchResults {
    pub fn new() -> Self {
        Self::default()
    }

    fn with_capacity(capacity: usize) -> Self {
        Self {
            entries: Vec::with_capacity(capacity),
        }
    }

    /// Insert an entry, overwriting any earlier entry for the same statement.
    pub fn insert(&mut self, statement: String, outcome: Option<QueryOutcome>) {
        match self.entries.iter_mut().find(|(s, _)| *s == statement) {
            Some(entry) => entry.1 = outcome,
            None => self.entries.push((statement, outcome)),
        }
    }

    /// The successful outcome recorded for `statement`, if any. `None` for
    /// both unknown statements and statements that failed under
    /// `ignore_errors`; use [`contains`](Self::contains) to tell them apart.
    pub fn outcome(&self, statement: &str) -> Option<&QueryOutcome> {
        self.entries
            .iter()
            .find(|(s, _)| s == statement)
            .and_then(|(_, outcome)| outcome.as_ref())
    }

    pub fn contains(&self, statement: &str) -> bool {
        self.entries.iter().any(|(s, _)| s == statement)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, Option<&QueryOutcome>)> {
        self.entries
            .iter()
            .map(|(statement, outcome)| (statement.as_str(), outcome.as_ref()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl RepoTemplate {
    /// Execute `statements` in order as independent queries within a single
    /// session acquisition.
    ///
    /// Each statement runs under `language`, or the default language when
    /// omitted. Per-statement failure policy: with `ignore_errors` the failed
    /// statement maps to `None` and the batch continues; without it the whole
    /// batch aborts with the translated error and partial results are
    /// discarded.
    pub fn query_batch<S: AsRef<str>>(
        &self,
        ctx: &BindingContext,
        statements: &[S],
        language: Option<&str>,
        ignore_errors: bool,
    ) -> Result<BatchResults> {
        let language = language.unwrap_or(DEFAULT_QUERY_LANGUAGE);

        self.execute_with(ctx, true, |session| {
            let mut results = BatchResults::with_capacity(statements.len());
            for statement in statements {
                let statement = statement.as_ref();
                match session.run_query(statement, language) {
                    Ok(outcome) => results.insert(statement.to_string(), Some(outcome)),
                    Err(err) if ignore_errors => {
                        warn!("ignoring failed batch statement '{statement}': {err}");
                        results.insert(statement.to_string(), None);
                    }
                    Err(err) => return Err(err.into()),
                }
            }
            Ok(results)
        })
    }
}
