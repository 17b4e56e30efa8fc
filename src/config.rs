use std::path::PathBuf;

use crate::error::{ReportError, Result};
use crate::platform::PlatformRegistry;

/// Runtime settings for the `ad-report` binary, read from the environment.
#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    /// Directory holding one `<platform_id>.csv` per platform.
    pub data_dir: PathBuf,
    pub output_dir: PathBuf,
    /// JSON file replacing the built-in platform table.
    pub platforms_file: Option<PathBuf>,
    pub preview_rows: usize,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("./data"),
            output_dir: PathBuf::from("./reports"),
            platforms_file: None,
            preview_rows: 5,
        }
    }
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from an arbitrary variable lookup; `from_env` uses the process environment.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let defaults = Self::default();
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Ok(Self {
            data_dir: non_empty("AD_REPORT_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.data_dir),
            output_dir: non_empty("AD_REPORT_OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.output_dir),
            platforms_file: non_empty("AD_REPORT_PLATFORMS").map(PathBuf::from),
            preview_rows: match non_empty("AD_REPORT_PREVIEW_ROWS") {
                Some(raw) => raw.trim().parse().map_err(|e| {
                    ReportError::Config(format!("invalid AD_REPORT_PREVIEW_ROWS {raw:?}: {e}"))
                })?,
                None => defaults.preview_rows,
            },
        })
    }

    /// The configured platform table, or the built-in one.
    pub fn registry(&self) -> Result<PlatformRegistry> {
        match &self.platforms_file {
            Some(path) => PlatformRegistry::from_path(path),
            None => Ok(PlatformRegistry::builtin()),
        }
    }

    pub fn data_file(&self, platform: &str) -> PathBuf {
        self.data_dir.join(format!("{platform}.csv"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn defaults_apply_when_unset() {
        let cfg = AppConfig::from_lookup(lookup(&[])).expect("config");
        assert_eq!(cfg, AppConfig::default());
        assert_eq!(cfg.data_file("facebook"), PathBuf::from("./data/facebook.csv"));
    }

    #[test]
    fn reads_overrides() {
        let cfg = AppConfig::from_lookup(lookup(&[
            ("AD_REPORT_DATA_DIR", "/srv/sheets"),
            ("AD_REPORT_OUTPUT_DIR", "out"),
            ("AD_REPORT_PREVIEW_ROWS", " 12 "),
            ("AD_REPORT_PLATFORMS", ""),
        ]))
        .expect("config");
        assert_eq!(cfg.data_dir, PathBuf::from("/srv/sheets"));
        assert_eq!(cfg.output_dir, PathBuf::from("out"));
        assert_eq!(cfg.preview_rows, 12);
        assert_eq!(cfg.platforms_file, None);
    }

    #[test]
    fn rejects_bad_preview_rows() {
        let err = AppConfig::from_lookup(lookup(&[("AD_REPORT_PREVIEW_ROWS", "lots")]))
            .expect_err("invalid");
        assert!(matches!(err, ReportError::Config(_)));
    }

    #[test]
    fn loads_platform_file() {
        let dir = tempfile::tempdir().expect("temp dir");
        let path = dir.path().join("platforms.json");
        std::fs::write(
            &path,
            r#"[{"id":"x","name":"X","endpoint":"/x","groupBy":"Keyword",
                "baseMetrics":[{"canonical":"mentions","source":"Mentions"}]}]"#,
        )
        .expect("write");
        let cfg = AppConfig {
            platforms_file: Some(path),
            ..AppConfig::default()
        };
        let registry = cfg.registry().expect("registry");
        assert_eq!(registry.ids().collect::<Vec<_>>(), vec!["x"]);
    }
}
