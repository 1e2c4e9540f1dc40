pub mod github;

use async_trait::async_trait;

use crate::model::issue::SourceIssue;

/// Outcome of a best-effort fetch. A transport failure is an expected
/// outcome here, not an error: callers degrade to an empty result.
#[derive(Debug, Clone, PartialEq)]
pub enum Fetched<T> {
    Available(T),
    Unavailable(String),
}

impl<T: Default> Fetched<T> {
    pub fn unwrap_or_default(self) -> T {
        match self {
            Fetched::Available(value) => value,
            Fetched::Unavailable(_) => T::default(),
        }
    }
}

impl<T> From<anyhow::Result<T>> for Fetched<T> {
    fn from(result: anyhow::Result<T>) -> Self {
        match result {
            Ok(value) => Fetched::Available(value),
            Err(e) => Fetched::Unavailable(format!("{e:#}")),
        }
    }
}

#[async_trait]
pub trait IssueSource: Send + Sync {
    fn name(&self) -> &str;
    async fn fetch_issues(&self) -> Fetched<Vec<SourceIssue>>;
    async fn fetch_comments(&self, issue_number: u64) -> Fetched<Vec<String>>;
}
