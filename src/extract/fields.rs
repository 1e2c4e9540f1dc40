use regex::{Regex, RegexBuilder};
use std::sync::OnceLock;

/// A logical entry field and the template labels it may appear under.
/// The first label is the current issue-form heading, the rest are older
/// aliases. Patterns are compiled on first use and reused afterwards.
pub struct FieldSpec {
    pub labels: &'static [&'static str],
    patterns: OnceLock<Vec<Regex>>,
}

impl FieldSpec {
    const fn new(labels: &'static [&'static str]) -> Self {
        Self {
            labels,
            patterns: OnceLock::new(),
        }
    }

    /// Every label's pattern shapes, label by label in alias order.
    fn patterns(&self) -> &[Regex] {
        self.patterns.get_or_init(|| {
            self.labels
                .iter()
                .flat_map(|label| patterns_for(label))
                .filter_map(|p| compile(&p))
                .collect()
        })
    }
}

pub static BUSINESS_AREA: FieldSpec = FieldSpec::new(&["Business area", "business_area"]);
pub static TEAM_NAME: FieldSpec = FieldSpec::new(&["Team/Application Name", "team_name"]);
pub static ENVIRONMENT: FieldSpec = FieldSpec::new(&["Environment", "environment"]);
pub static START_DATE: FieldSpec = FieldSpec::new(&["Skip shutdown start date", "start_date"]);
pub static END_DATE: FieldSpec = FieldSpec::new(&["Skip shutdown end date", "end_date"]);
pub static JUSTIFICATION: FieldSpec =
    FieldSpec::new(&["Justification for exclusion", "justification"]);
pub static CHANGE_JIRA_ID: FieldSpec =
    FieldSpec::new(&["Change or Jira reference", "change_jira_id"]);
pub static STAY_ON_LATE: FieldSpec =
    FieldSpec::new(&["Do you need this exclusion past 11pm", "stay_on_late"]);

/// Pattern shapes tried in order for a single label.
fn patterns_for(label: &str) -> Vec<String> {
    let label = regex::escape(label);
    vec![
        // "Label: value" up to the end of the line
        format!(r"(?m){label}\??[:\s]*(.*?)$"),
        // "### Label" followed by a block of text up to the next heading
        format!(r"(?ms)^###\s*{label}\??\s*\n\s*(.*?)(?:\n###|\z)"),
        // "### Label:" heading with an inline colon
        format!(r"(?ms)^###\s*{label}\??[:\s]*\n\s*(.*?)(?:\n###|\z)"),
    ]
}

fn compile(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .build()
        .ok()
}

/// Extract a field: the first non-empty capture across its labels and
/// their pattern shapes, or an empty string.
pub fn extract(body: &str, field: &FieldSpec) -> String {
    field
        .patterns()
        .iter()
        .filter_map(|re| {
            re.captures(body)
                .and_then(|caps| caps.get(1))
                .map(|m| m.as_str().trim().to_string())
        })
        .find(|value| !value.is_empty())
        .unwrap_or_default()
}
