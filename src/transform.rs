use crate::extract::cost::extract_cost;
use crate::extract::fields::{self, extract};
use crate::extract::status::classify;
use crate::model::entry::{Entry, REQUEST_TYPE_STOP};
use crate::model::issue::SourceIssue;
use crate::providers::IssueSource;

const TITLE_KEYWORDS: &[&str] = &["auto shutdown", "autoshutdown", "exclusion"];
const REQUEST_LABELS: &[&str] = &["auto-approved", "approved", "pending"];

/// Whether an issue is a shutdown-exclusion request at all.
pub fn is_exclusion_request(issue: &SourceIssue) -> bool {
    let title = issue.title.to_lowercase();
    TITLE_KEYWORDS.iter().any(|kw| title.contains(kw))
        || issue
            .labels
            .iter()
            .any(|l| REQUEST_LABELS.contains(&l.name.as_str()))
}

/// Build an entry from an issue and the comments already fetched for it.
pub fn build_entry<S: AsRef<str>>(issue: SourceIssue, comments: &[S]) -> Entry {
    let labels = issue.label_names();
    let status = classify(&labels, &issue.title);
    let body = issue.body.unwrap_or_default();

    Entry {
        issue_number: Some(issue.number),
        status,
        created_at: issue.created_at,
        updated_at: issue.updated_at,
        issue_link: issue.html_url,
        requester: issue.user.map(|u| u.login).unwrap_or_default(),
        labels,
        business_area: extract(&body, &fields::BUSINESS_AREA),
        team_name: extract(&body, &fields::TEAM_NAME),
        environment: extract(&body, &fields::ENVIRONMENT),
        start_date: extract(&body, &fields::START_DATE),
        end_date: extract(&body, &fields::END_DATE),
        justification: extract(&body, &fields::JUSTIFICATION),
        change_jira_id: extract(&body, &fields::CHANGE_JIRA_ID),
        stay_on_late: extract(&body, &fields::STAY_ON_LATE),
        cost: extract_cost(comments),
        title: issue.title,
        body,
        request_type: REQUEST_TYPE_STOP.to_string(),
        extra: serde_json::Map::new(),
    }
}

/// Fetch the issue's comments and build its entry. An unavailable comment
/// stream leaves the cost empty.
pub async fn transform(issue: SourceIssue, source: &dyn IssueSource) -> Entry {
    let comments = source.fetch_comments(issue.number).await.unwrap_or_default();
    build_entry(issue, &comments)
}
