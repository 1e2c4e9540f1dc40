use anyhow::{bail, Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};

const LOCAL_CONFIG_FILE: &str = "shutdown-exclusions.toml";

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
pub struct AppConfig {
    pub github: GitHubConfig,
    pub storage: StorageConfig,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct GitHubConfig {
    pub owner: String,
    pub repo: String,
    pub api_url: String,
    pub per_page: u32,
    pub token: Option<String>,
}

impl Default for GitHubConfig {
    fn default() -> Self {
        Self {
            owner: "hmcts".into(),
            repo: "auto-shutdown-dev".into(),
            api_url: "https://api.github.com".into(),
            per_page: 100,
            token: None,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    pub primary: PathBuf,
    /// Copy published alongside the dashboard; written best-effort.
    pub mirror: Option<PathBuf>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            primary: PathBuf::from("issues_list.json"),
            mirror: Some(PathBuf::from("docs/issues_list.json")),
        }
    }
}

impl StorageConfig {
    /// An empty `mirror` path disables the mirrored copy.
    pub fn mirror_path(&self) -> Option<&Path> {
        self.mirror
            .as_deref()
            .filter(|p| !p.as_os_str().is_empty())
    }
}

fn user_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|d| d.join("shutdown-exclusions").join("config.toml"))
}

fn resolve_path(explicit: Option<&Path>) -> Result<Option<PathBuf>> {
    if let Some(path) = explicit {
        if !path.exists() {
            bail!("Config file {} does not exist", path.display());
        }
        return Ok(Some(path.to_path_buf()));
    }
    let local = PathBuf::from(LOCAL_CONFIG_FILE);
    if local.exists() {
        return Ok(Some(local));
    }
    Ok(user_config_path().filter(|p| p.exists()))
}

pub fn parse_config(contents: &str) -> Result<AppConfig> {
    toml::from_str(contents).context("Failed to parse config")
}

pub fn load_config(explicit: Option<&Path>) -> Result<AppConfig> {
    let mut config = match resolve_path(explicit)? {
        Some(path) => {
            let contents = std::fs::read_to_string(&path)
                .with_context(|| format!("Failed to read config from {}", path.display()))?;
            parse_config(&contents).with_context(|| format!("in {}", path.display()))?
        }
        None => AppConfig::default(),
    };

    if let Ok(token) = std::env::var("GH_TOKEN") {
        if !token.trim().is_empty() {
            config.github.token = Some(token);
        }
    }
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_config_uses_defaults() {
        let config = parse_config("").unwrap();
        assert_eq!(config.github.owner, "hmcts");
        assert_eq!(config.github.repo, "auto-shutdown-dev");
        assert_eq!(config.github.per_page, 100);
        assert_eq!(config.storage.primary, PathBuf::from("issues_list.json"));
        assert_eq!(
            config.storage.mirror,
            Some(PathBuf::from("docs/issues_list.json"))
        );
    }

    #[test]
    fn partial_sections_keep_remaining_defaults() {
        let config = parse_config(
            r#"
            [github]
            repo = "auto-shutdown"

            [storage]
            primary = "data/requests.json"
            "#,
        )
        .unwrap();
        assert_eq!(config.github.owner, "hmcts");
        assert_eq!(config.github.repo, "auto-shutdown");
        assert_eq!(config.storage.primary, PathBuf::from("data/requests.json"));
        assert!(config.storage.mirror_path().is_some());
    }

    #[test]
    fn empty_mirror_disables_it() {
        let config = parse_config("[storage]\nmirror = \"\"\n").unwrap();
        assert_eq!(config.storage.mirror_path(), None);
    }

    #[test]
    fn invalid_toml_is_an_error() {
        assert!(parse_config("[github\nowner =").is_err());
    }

    #[test]
    fn explicit_missing_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let result = load_config(Some(&dir.path().join("absent.toml")));
        assert!(result.unwrap_err().to_string().contains("does not exist"));
    }

    #[test]
    fn explicit_path_is_loaded() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "[github]\nowner = \"acme\"\n").unwrap();
        let config = load_config(Some(&path)).unwrap();
        assert_eq!(config.github.owner, "acme");
    }
}
