use chrono::NaiveDate;
use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::model::entry::Entry;

// Two-digit years first: %Y would read "24" as the year 24.
const DAY_FIRST_FORMATS: &[&str] = &[
    "%d/%m/%y",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%d %B %Y",
    "%d %b %Y",
    "%B %d %Y",
    "%b %d %Y",
    "%Y-%m-%d",
    "%Y/%m/%d",
];

static ORDINAL_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\b(\d{1,2})(?:st|nd|rd|th)(?:\s+of)?\b").unwrap());

// A time of day after the date, as in "07/06/2024 00:00" or "2024-06-07T09:30:00Z".
static TRAILING_TIME_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)[T\s]+\d{1,2}:\d{2}(?::\d{2}(?:\.\d+)?)?\s*(?:Z|[+-]\d{2}:?\d{2})?$").unwrap()
});

#[derive(Debug, Error, PartialEq)]
pub enum PruneError {
    #[error("entry {entry} has an unreadable end_date {value:?}")]
    InvalidEndDate { entry: String, value: String },
}

/// What to do with an entry whose end date cannot be read.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DateErrorPolicy {
    /// Abort the whole run; nothing is written.
    #[default]
    FailFast,
    /// Keep the entry, report the error and carry on.
    Report,
}

#[derive(Debug, Default)]
pub struct PruneOutcome {
    pub kept: Vec<Entry>,
    pub removed: Vec<Entry>,
    pub date_errors: Vec<PruneError>,
}

/// Parse a date written day-first (`31/05/2024`), falling back to ISO.
pub fn parse_day_first(value: &str) -> Option<NaiveDate> {
    let value = normalize_date(value);
    DAY_FIRST_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(&value, fmt).ok())
}

/// Drop ordinal suffixes, commas and a trailing time so that
/// "7th June, 2024 09:00" reads as "7 June 2024".
fn normalize_date(value: &str) -> String {
    let value = TRAILING_TIME_RE.replace(value.trim(), "");
    let value = ORDINAL_RE.replace_all(&value, "$1");
    value
        .replace(',', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

/// Keep entries whose exclusion window ends on or after `today`.
pub fn prune(
    batch: Vec<Entry>,
    today: NaiveDate,
    policy: DateErrorPolicy,
) -> Result<PruneOutcome, PruneError> {
    let mut outcome = PruneOutcome::default();

    for entry in batch {
        let Some(end_date) = parse_day_first(&entry.end_date) else {
            let err = PruneError::InvalidEndDate {
                entry: entry.describe(),
                value: entry.end_date.clone(),
            };
            match policy {
                DateErrorPolicy::FailFast => return Err(err),
                DateErrorPolicy::Report => {
                    warn!("{err}; keeping it");
                    outcome.date_errors.push(err);
                    outcome.kept.push(entry);
                    continue;
                }
            }
        };

        if end_date < today {
            info!("Deleting expired entry {} (ended {end_date})", entry.describe());
            outcome.removed.push(entry);
        } else {
            debug!("Valid entry {} (ends {end_date})", entry.describe());
            outcome.kept.push(entry);
        }
    }

    Ok(outcome)
}
