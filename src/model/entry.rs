use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

pub const REQUEST_TYPE_STOP: &str = "stop";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum Status {
    #[default]
    Pending,
    AutoApproved,
    Approved,
    Denied,
    Cancelled,
}

impl Status {
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Pending => "pending",
            Status::AutoApproved => "auto-approved",
            Status::Approved => "approved",
            Status::Denied => "denied",
            Status::Cancelled => "cancelled",
        }
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognised values read back as `Pending`.
impl From<String> for Status {
    fn from(value: String) -> Self {
        match value.trim().to_lowercase().as_str() {
            "auto-approved" => Status::AutoApproved,
            "approved" => Status::Approved,
            "denied" => Status::Denied,
            "cancelled" => Status::Cancelled,
            _ => Status::Pending,
        }
    }
}

impl From<Status> for String {
    fn from(status: Status) -> Self {
        status.as_str().to_string()
    }
}

/// One shutdown-exclusion request as persisted for the dashboard.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Entry {
    #[serde(default, deserialize_with = "lenient_issue_number")]
    pub issue_number: Option<u64>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub title: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub status: Status,
    #[serde(default, deserialize_with = "null_as_default")]
    pub created_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub updated_at: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub issue_link: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub requester: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub labels: Vec<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub business_area: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub team_name: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub environment: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub start_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub end_date: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub justification: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub change_jira_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub stay_on_late: String,
    #[serde(default, deserialize_with = "lenient_cost")]
    pub cost: Option<String>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub body: String,
    #[serde(default = "default_request_type", deserialize_with = "lenient_request_type")]
    pub request_type: String,
    /// Keys written by hand into locally authored entries, kept on rewrite.
    #[serde(flatten)]
    pub extra: serde_json::Map<String, serde_json::Value>,
}

fn default_request_type() -> String {
    REQUEST_TYPE_STOP.to_string()
}

impl Entry {
    /// Team, start date and business area must all be present.
    pub fn is_valid(&self) -> bool {
        !self.team_name.trim().is_empty()
            && !self.start_date.trim().is_empty()
            && !self.business_area.trim().is_empty()
    }

    /// Dedup key: the issue number rendered as a string.
    pub fn key(&self) -> Option<String> {
        self.issue_number.map(|n| n.to_string())
    }

    /// Short human label for log lines.
    pub fn describe(&self) -> String {
        match self.issue_number {
            Some(n) => format!("#{n} {}", self.title),
            None if !self.team_name.is_empty() => self.team_name.clone(),
            None if !self.title.is_empty() => self.title.clone(),
            None => "<untitled>".to_string(),
        }
    }
}

fn lenient_request_type<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<String>::deserialize(deserializer)?.unwrap_or_else(default_request_type))
}

/// Hand-edited files carry `null` where a value was never filled in.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn lenient_cost<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Amount(f64),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Text(s)) if s.trim().is_empty() => None,
        Some(Raw::Text(s)) => Some(s),
        Some(Raw::Amount(n)) => Some(n.to_string()),
        None => None,
    })
}

fn lenient_issue_number<'de, D>(deserializer: D) -> Result<Option<u64>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Number(u64),
        Text(String),
    }

    Ok(match Option::<Raw>::deserialize(deserializer)? {
        Some(Raw::Number(n)) => Some(n),
        Some(Raw::Text(s)) => s.trim().trim_start_matches('#').parse().ok(),
        None => None,
    })
}
