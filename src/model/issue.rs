use serde::Deserialize;

/// Raw issue as returned by the tracker's issue listing.
#[derive(Debug, Clone, Deserialize)]
pub struct SourceIssue {
    pub number: u64,
    #[serde(default)]
    pub title: String,
    #[serde(default)]
    pub labels: Vec<SourceLabel>,
    #[serde(default)]
    pub created_at: String,
    #[serde(default)]
    pub updated_at: String,
    #[serde(default)]
    pub html_url: String,
    pub user: Option<SourceUser>,
    pub body: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceLabel {
    pub name: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SourceUser {
    pub login: String,
}

impl SourceIssue {
    pub fn label_names(&self) -> Vec<String> {
        self.labels.iter().map(|l| l.name.clone()).collect()
    }
}
