use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use crate::config::AppConfig;
use crate::merge::merge;
use crate::providers::github::GitHubSource;
use crate::providers::{Fetched, IssueSource};
use crate::prune::{prune, DateErrorPolicy};
use crate::store::{BatchStore, StoredBatch};
use crate::transform::{is_exclusion_request, transform};

/// Environment variable naming the file that receives step outputs.
const GITHUB_ENV: &str = "GITHUB_ENV";
const FILE_EXISTS_FLAG: &str = "JSON_FILE_EXISTS";

#[derive(Debug, Default, PartialEq)]
pub struct SyncSummary {
    pub remote: usize,
    pub local: usize,
    pub persisted: Option<usize>,
}

#[derive(Debug, Default, PartialEq)]
pub struct PruneSummary {
    pub file_existed: bool,
    pub kept: usize,
    pub removed: usize,
    pub date_errors: usize,
}

pub async fn run_sync(config: &AppConfig) -> Result<SyncSummary> {
    let source = GitHubSource::new(&config.github);
    let store = BatchStore::from_config(&config.storage);
    sync(&source, &store).await
}

/// Fetch, transform and merge into the stored batch.
pub async fn sync(source: &dyn IssueSource, store: &BatchStore) -> Result<SyncSummary> {
    info!("Starting dashboard data generation");
    let local = store.load()?.into_entries();

    let issues = match source.fetch_issues().await {
        Fetched::Available(issues) => issues,
        Fetched::Unavailable(reason) => {
            warn!("{} unavailable, continuing with local data: {reason}", source.name());
            Vec::new()
        }
    };
    let issues: Vec<_> = issues.into_iter().filter(is_exclusion_request).collect();
    info!("Found {} shutdown exclusion issues", issues.len());

    let mut summary = SyncSummary {
        remote: issues.len(),
        local: local.len(),
        persisted: None,
    };
    if issues.is_empty() && local.is_empty() {
        info!("No data available from {} or local file", source.name());
        return Ok(summary);
    }

    let mut remote = Vec::with_capacity(issues.len());
    for issue in issues {
        remote.push(transform(issue, source).await);
    }

    let merged = merge(remote, local);
    info!("Final dataset contains {} entries", merged.len());
    store.save(&merged)?;
    summary.persisted = Some(merged.len());
    Ok(summary)
}

pub fn run_prune(
    config: &AppConfig,
    today: NaiveDate,
    policy: DateErrorPolicy,
) -> Result<PruneSummary> {
    let store = BatchStore::from_config(&config.storage);
    let env_file = std::env::var_os(GITHUB_ENV).map(PathBuf::from);
    prune_store(&store, today, policy, env_file.as_deref())
}

/// Remove expired entries from the stored batch. The file-exists flag is
/// recorded as soon as the file has been looked at, so later steps see it
/// even when pruning fails. Nothing is written to the batch when the file
/// is missing or the run fails.
pub fn prune_store(
    store: &BatchStore,
    today: NaiveDate,
    policy: DateErrorPolicy,
    env_file: Option<&Path>,
) -> Result<PruneSummary> {
    let batch = store.load()?;
    let file_existed = !matches!(batch, StoredBatch::Missing);
    if let Some(env_file) = env_file {
        record_file_exists(env_file, file_existed)?;
    }
    info!("{FILE_EXISTS_FLAG}={file_existed}");

    let entries = match batch {
        StoredBatch::Missing => {
            info!("No file to clean up");
            return Ok(PruneSummary::default());
        }
        StoredBatch::Malformed(reason) => {
            anyhow::bail!("{} is not a valid batch: {reason}", store.primary().display())
        }
        // Rewriting would silently drop the items that could not be read.
        StoredBatch::Loaded { rejected, .. } if rejected > 0 => anyhow::bail!(
            "{} has {rejected} unreadable entries, refusing to rewrite it",
            store.primary().display()
        ),
        StoredBatch::Loaded { entries, .. } => entries,
    };

    let outcome = prune(entries, today, policy)
        .with_context(|| format!("Pruning {} aborted", store.primary().display()))?;
    store.save(&outcome.kept)?;

    Ok(PruneSummary {
        file_existed,
        kept: outcome.kept.len(),
        removed: outcome.removed.len(),
        date_errors: outcome.date_errors.len(),
    })
}

fn record_file_exists(env_file: &Path, exists: bool) -> Result<()> {
    let mut file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(env_file)
        .with_context(|| format!("Failed to open {}", env_file.display()))?;
    writeln!(file, "{FILE_EXISTS_FLAG}={exists}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::entry::fixtures::valid_entry;

    fn store_in(dir: &Path) -> BatchStore {
        BatchStore::new(dir.join("issues_list.json"), Some(dir.join("docs/issues_list.json")))
    }

    fn june_first() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
    }

    #[test]
    fn prune_missing_file_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let summary = prune_store(&store, june_first(), DateErrorPolicy::FailFast, None).unwrap();
        assert!(!summary.file_existed);
        assert!(!store.primary().exists());
    }

    #[test]
    fn prune_rewrites_both_locations() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let mut expired = valid_entry(Some(2), "2024-05-01T00:00:00Z");
        expired.end_date = "31/05/2024".into();
        store
            .save(&[valid_entry(Some(1), "2024-05-02T00:00:00Z"), expired])
            .unwrap();

        let summary = prune_store(&store, june_first(), DateErrorPolicy::FailFast, None).unwrap();
        assert_eq!(
            summary,
            PruneSummary {
                file_existed: true,
                kept: 1,
                removed: 1,
                date_errors: 0,
            }
        );
        let mirrored = std::fs::read_to_string(dir.path().join("docs/issues_list.json")).unwrap();
        assert!(!mirrored.contains("31/05/2024"));
    }

    #[test]
    fn prune_failure_leaves_file_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let mut broken = valid_entry(Some(2), "2024-05-01T00:00:00Z");
        broken.end_date = "soon".into();
        let mut expired = valid_entry(Some(3), "2024-05-01T00:00:00Z");
        expired.end_date = "01/01/2024".into();
        store.save(&[expired, broken]).unwrap();
        let before = std::fs::read_to_string(store.primary()).unwrap();

        let err = prune_store(&store, june_first(), DateErrorPolicy::FailFast, None).unwrap_err();
        assert!(format!("{err:#}").contains("soon"));
        assert_eq!(std::fs::read_to_string(store.primary()).unwrap(), before);
    }

    #[test]
    fn prune_malformed_file_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        std::fs::write(store.primary(), "{not json").unwrap();
        assert!(prune_store(&store, june_first(), DateErrorPolicy::Report, None).is_err());
    }

    #[test]
    fn prune_refuses_to_rewrite_with_unreadable_items() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let contents = r#"[{"team_name": "Payments", "business_area": "SDS", "start_date": "02/06/2024", "end_date": "01/01/2024"}, {"labels": 7}]"#;
        std::fs::write(store.primary(), contents).unwrap();

        let err = prune_store(&store, june_first(), DateErrorPolicy::FailFast, None).unwrap_err();
        assert!(err.to_string().contains("1 unreadable"));
        assert_eq!(std::fs::read_to_string(store.primary()).unwrap(), contents);
    }

    #[test]
    fn flag_is_recorded_even_when_pruning_fails() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let env_file = dir.path().join("github_env");
        let mut broken = valid_entry(Some(2), "2024-05-01T00:00:00Z");
        broken.end_date = "soon".into();
        store.save(&[broken]).unwrap();

        assert!(prune_store(&store, june_first(), DateErrorPolicy::FailFast, Some(&env_file)).is_err());
        assert_eq!(
            std::fs::read_to_string(&env_file).unwrap(),
            "JSON_FILE_EXISTS=true\n"
        );
    }

    #[test]
    fn missing_file_records_false_flag() {
        let dir = tempfile::tempdir().unwrap();
        let store = store_in(dir.path());
        let env_file = dir.path().join("github_env");

        prune_store(&store, june_first(), DateErrorPolicy::FailFast, Some(&env_file)).unwrap();
        assert_eq!(
            std::fs::read_to_string(&env_file).unwrap(),
            "JSON_FILE_EXISTS=false\n"
        );
    }

    #[test]
    fn file_exists_flag_is_appended() {
        let dir = tempfile::tempdir().unwrap();
        let env_file = dir.path().join("github_env");
        std::fs::write(&env_file, "OTHER=1\n").unwrap();
        record_file_exists(&env_file, true).unwrap();
        assert_eq!(
            std::fs::read_to_string(&env_file).unwrap(),
            "OTHER=1\nJSON_FILE_EXISTS=true\n"
        );
    }
}
