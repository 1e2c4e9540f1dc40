use anyhow::{Context, Result};
use async_trait::async_trait;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use tracing::{info, warn};

use super::{Fetched, IssueSource};
use crate::config::GitHubConfig;
use crate::model::issue::SourceIssue;

const USER_AGENT: &str = "shutdown-exclusions-dashboard-data";

pub struct GitHubSource {
    repo_url: String,
    per_page: u32,
    token: Option<String>,
    client: reqwest::Client,
}

impl GitHubSource {
    pub fn new(config: &GitHubConfig) -> Self {
        Self {
            repo_url: format!(
                "{}/repos/{}/{}",
                config.api_url.trim_end_matches('/'),
                config.owner,
                config.repo
            ),
            per_page: config.per_page,
            token: config.token.clone(),
            client: reqwest::Client::new(),
        }
    }

    async fn get_json<T: DeserializeOwned>(&self, url: &str) -> Result<T> {
        let mut request = self
            .client
            .get(url)
            .header("Accept", "application/vnd.github.v3+json")
            .header("User-Agent", USER_AGENT);
        if let Some(token) = &self.token {
            request = request.header("Authorization", format!("token {token}"));
        }

        let resp = request.send().await.context("GitHub API request failed")?;
        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            anyhow::bail!("GitHub API returned {status}: {text}");
        }
        resp.json().await.context("Failed to parse GitHub response")
    }

    async fn list_issues(&self) -> Result<Vec<SourceIssue>> {
        let url = format!(
            "{}/issues?state=all&per_page={}&sort=created&direction=desc",
            self.repo_url, self.per_page
        );
        self.get_json(&url).await
    }

    async fn list_comments(&self, issue_number: u64) -> Result<Vec<String>> {
        let url = format!("{}/issues/{issue_number}/comments", self.repo_url);
        let comments: Vec<GhComment> = self.get_json(&url).await?;
        Ok(comments.into_iter().filter_map(|c| c.body).collect())
    }
}

#[derive(Deserialize)]
struct GhComment {
    body: Option<String>,
}

#[async_trait]
impl IssueSource for GitHubSource {
    fn name(&self) -> &str {
        "GitHub"
    }

    async fn fetch_issues(&self) -> Fetched<Vec<SourceIssue>> {
        info!("Fetching recent issues from {}", self.repo_url);
        let fetched = Fetched::from(self.list_issues().await);
        if let Fetched::Unavailable(reason) = &fetched {
            warn!("Error fetching GitHub issues: {reason}");
        }
        fetched
    }

    async fn fetch_comments(&self, issue_number: u64) -> Fetched<Vec<String>> {
        let fetched = Fetched::from(self.list_comments(issue_number).await);
        if let Fetched::Unavailable(reason) = &fetched {
            warn!("Error fetching comments for issue #{issue_number}: {reason}");
        }
        fetched
    }
}
