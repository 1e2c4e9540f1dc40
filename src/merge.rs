use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::collections::{HashMap, HashSet};
use tracing::{info, warn};

use crate::model::entry::Entry;

/// Number of entries kept after a merge.
pub const MAX_ENTRIES: usize = 50;

/// Reconcile freshly fetched entries with the previously persisted batch.
///
/// Remote entries win on issue-number collisions. Local entries without an
/// issue number (or whose issue is no longer returned by the tracker) are
/// kept if they are valid; among locals sharing an issue number the first
/// valid one is kept. The result is newest-first and capped at
/// [`MAX_ENTRIES`].
pub fn merge(remote: Vec<Entry>, local: Vec<Entry>) -> Vec<Entry> {
    let mut merged: Vec<Entry> = Vec::with_capacity(remote.len() + local.len());
    let mut remote_index: HashMap<String, usize> = HashMap::new();

    for entry in remote {
        match entry.key() {
            Some(key) => match remote_index.get(&key) {
                Some(&pos) => merged[pos] = entry,
                None => {
                    remote_index.insert(key, merged.len());
                    merged.push(entry);
                }
            },
            None => merged.push(entry),
        }
    }

    let mut local_keys: HashSet<String> = HashSet::new();
    for entry in local {
        let key = entry.key();
        if key.as_ref().is_some_and(|key| remote_index.contains_key(key)) {
            continue;
        }
        if !entry.is_valid() {
            info!("Dropping local entry with missing data: {}", entry.describe());
            continue;
        }
        if let Some(key) = key {
            if !local_keys.insert(key) {
                warn!("Dropping duplicate local entry: {}", entry.describe());
                continue;
            }
        }
        info!("Preserving local entry: {}", entry.describe());
        merged.push(entry);
    }

    let mut valid: Vec<Entry> = merged
        .into_iter()
        .filter(|entry| {
            let keep = entry.is_valid();
            if !keep {
                info!("Skipping entry with missing data: {}", entry.describe());
            }
            keep
        })
        .collect();

    sort_newest_first(&mut valid);
    valid.truncate(MAX_ENTRIES);
    valid
}

/// Sort by `created_at` descending. If any timestamp is unreadable the
/// batch is left in its original order.
pub fn sort_newest_first(entries: &mut Vec<Entry>) {
    let mut keys = Vec::with_capacity(entries.len());
    for entry in entries.iter() {
        match parse_timestamp(&entry.created_at) {
            Some(ts) => keys.push(ts),
            None => {
                warn!(
                    "Could not sort by created_at ({:?} on {}), using original order",
                    entry.created_at,
                    entry.describe()
                );
                return;
            }
        }
    }

    let mut keyed: Vec<(DateTime<Utc>, Entry)> =
        keys.into_iter().zip(entries.drain(..)).collect();
    keyed.sort_by(|a, b| b.0.cmp(&a.0));
    entries.extend(keyed.into_iter().map(|(_, e)| e));
}

/// Parse an ISO 8601 timestamp. An empty value counts as the epoch.
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return Some(DateTime::<Utc>::UNIX_EPOCH);
    }
    if let Ok(ts) = DateTime::parse_from_rfc3339(value) {
        return Some(ts.with_timezone(&Utc));
    }
    if let Ok(ts) = NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S") {
        return Some(ts.and_utc());
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|ts| ts.and_utc())
}
