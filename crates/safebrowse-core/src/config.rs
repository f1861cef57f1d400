use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use crate::allow_list::{AllowList, DEFAULT_SAFE_DOMAINS};
use crate::policy::{ClassificationPolicy, DEFAULT_IGNORED_SCHEMES, DEFAULT_WARN_THRESHOLD};

/// File name of the exported model under the XDG data dir.
pub const MODEL_FILE_NAME: &str = "model_export.json";

/// Global configuration loaded from `~/.config/safebrowse/config.toml`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SafebrowseConfig {
    /// Model artifact path. Defaults to `~/.local/share/safebrowse/model_export.json`.
    #[serde(default)]
    pub model_path: Option<PathBuf>,
    /// Scores strictly above this raise a warning.
    #[serde(default = "default_warn_threshold")]
    pub warn_threshold: f64,
    /// Domains (and their subdomains) that are never scored.
    #[serde(default = "default_allow_list")]
    pub allow_list: Vec<String>,
    /// URL schemes of browser-internal pages that are skipped.
    #[serde(default = "default_ignored_schemes")]
    pub ignored_schemes: Vec<String>,
}

fn default_warn_threshold() -> f64 {
    DEFAULT_WARN_THRESHOLD
}

fn default_allow_list() -> Vec<String> {
    DEFAULT_SAFE_DOMAINS.iter().map(|d| d.to_string()).collect()
}

fn default_ignored_schemes() -> Vec<String> {
    DEFAULT_IGNORED_SCHEMES.iter().map(|s| s.to_string()).collect()
}

impl Default for SafebrowseConfig {
    fn default() -> Self {
        Self {
            model_path: None,
            warn_threshold: default_warn_threshold(),
            allow_list: default_allow_list(),
            ignored_schemes: default_ignored_schemes(),
        }
    }
}

impl SafebrowseConfig {
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.warn_threshold) {
            anyhow::bail!(
                "warn_threshold must be within [0, 1], got {}",
                self.warn_threshold
            );
        }
        Ok(())
    }

    /// Configured model path, or the XDG data default.
    pub fn resolved_model_path(&self) -> Result<PathBuf> {
        match &self.model_path {
            Some(p) => Ok(p.clone()),
            None => default_model_path(),
        }
    }

    pub fn policy(&self) -> ClassificationPolicy {
        ClassificationPolicy::new(AllowList::new(&self.allow_list))
            .with_warn_threshold(self.warn_threshold)
            .with_ignored_schemes(self.ignored_schemes.iter().cloned())
    }
}

pub fn config_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("safebrowse")?;
    Ok(xdg_dirs.place_config_file("config.toml")?)
}

pub fn default_model_path() -> Result<PathBuf> {
    let xdg_dirs = xdg::BaseDirectories::with_prefix("safebrowse")?;
    Ok(xdg_dirs.get_data_home().join("safebrowse").join(MODEL_FILE_NAME))
}

/// Load configuration from disk, creating a default file if none exists.
pub fn load_or_init() -> Result<SafebrowseConfig> {
    let path = config_path()?;
    if !path.exists() {
        let default_cfg = SafebrowseConfig::default();
        let toml = toml::to_string_pretty(&default_cfg)?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, toml)?;
        tracing::info!("created default config at {}", path.display());
        return Ok(default_cfg);
    }
    load_from(&path)
}

/// Load and validate configuration from an explicit path.
pub fn load_from(path: &Path) -> Result<SafebrowseConfig> {
    let data =
        fs::read_to_string(path).with_context(|| format!("read config {}", path.display()))?;
    let cfg: SafebrowseConfig =
        toml::from_str(&data).with_context(|| format!("parse config {}", path.display()))?;
    cfg.validate()?;
    Ok(cfg)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn default_config_values() {
        let cfg = SafebrowseConfig::default();
        assert!(cfg.model_path.is_none());
        assert_eq!(cfg.warn_threshold, 0.5);
        assert_eq!(cfg.allow_list.len(), 20);
        assert_eq!(cfg.ignored_schemes, ["chrome", "chrome-extension", "about"]);
        cfg.validate().unwrap();
    }

    #[test]
    fn config_toml_roundtrip() {
        let cfg = SafebrowseConfig::default();
        let toml = toml::to_string_pretty(&cfg).unwrap();
        let parsed: SafebrowseConfig = toml::from_str(&toml).unwrap();
        assert_eq!(parsed.warn_threshold, cfg.warn_threshold);
        assert_eq!(parsed.allow_list, cfg.allow_list);
        assert_eq!(parsed.ignored_schemes, cfg.ignored_schemes);
    }

    #[test]
    fn config_toml_custom_values() {
        let toml = r#"
            model_path = "/opt/safebrowse/model.json"
            warn_threshold = 0.7
            allow_list = ["intranet.example", "example.org"]
        "#;
        let cfg: SafebrowseConfig = toml::from_str(toml).unwrap();
        assert_eq!(cfg.model_path, Some(PathBuf::from("/opt/safebrowse/model.json")));
        assert_eq!(cfg.warn_threshold, 0.7);
        assert_eq!(cfg.allow_list, ["intranet.example", "example.org"]);
        assert_eq!(cfg.ignored_schemes.len(), 3);

        let policy = cfg.policy();
        assert_eq!(policy.warn_threshold(), 0.7);
        assert!(policy.allow_list().contains_host("wiki.intranet.example"));
        assert!(!policy.allow_list().contains_host("google.com"));
    }

    #[test]
    fn empty_file_uses_defaults() {
        let cfg: SafebrowseConfig = toml::from_str("").unwrap();
        assert_eq!(cfg.warn_threshold, 0.5);
        assert_eq!(cfg.allow_list.len(), 20);
    }

    #[test]
    fn load_from_rejects_out_of_range_threshold() {
        let mut f = tempfile::NamedTempFile::new().unwrap();
        f.write_all(b"warn_threshold = 1.5\n").unwrap();
        f.flush().unwrap();
        let err = load_from(f.path()).unwrap_err();
        assert!(err.to_string().contains("warn_threshold"));
    }

    #[test]
    fn explicit_model_path_wins() {
        let cfg = SafebrowseConfig {
            model_path: Some(PathBuf::from("/tmp/m.json")),
            ..SafebrowseConfig::default()
        };
        assert_eq!(cfg.resolved_model_path().unwrap(), PathBuf::from("/tmp/m.json"));
    }
}
