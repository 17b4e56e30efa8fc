// Declarative per-platform configuration.
//
// A `PlatformConfig` tells the engine which source columns are metrics,
// what canonical key each maps to, which column to group by and which
// derived metrics to compute. The engine has no per-platform branches; adding
// a platform means adding a config entry.

use std::collections::BTreeMap;
use std::path::Path;

use once_cell::sync::Lazy;
use serde::{Deserialize, Serialize};

use crate::error::{ReportError, Result};
use crate::metrics::{keys, DerivedMetric, MetricCalculator};
use crate::normalize::FieldSpec;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldMapping {
    pub canonical: String,
    pub source: String,
}

impl FieldMapping {
    pub fn new(canonical: impl Into<String>, source: impl Into<String>) -> Self {
        Self {
            canonical: canonical.into(),
            source: source.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlatformConfig {
    pub id: String,
    pub name: String,
    /// Upstream path the rows are fetched from.
    pub endpoint: String,
    pub group_by: String,
    #[serde(default)]
    pub date_field: Option<String>,
    pub base_metrics: Vec<FieldMapping>,
    #[serde(default)]
    pub derived_metrics: Vec<DerivedMetric>,
    /// Canonical key used as the `cpa` denominator.
    #[serde(default)]
    pub cpa_action: Option<String>,
    #[serde(default)]
    pub display_fields: Vec<String>,
    #[serde(default)]
    pub supports_comparison: bool,
}

impl PlatformConfig {
    pub fn source_fields(&self) -> impl Iterator<Item = &str> {
        self.base_metrics.iter().map(|m| m.source.as_str())
    }

    pub fn canonical_keys(&self) -> Vec<&str> {
        self.base_metrics.iter().map(|m| m.canonical.as_str()).collect()
    }

    pub fn field_spec(&self) -> FieldSpec<'_> {
        FieldSpec::new(self.source_fields(), self.date_field.as_deref())
    }

    pub fn calculator(&self) -> MetricCalculator {
        MetricCalculator::new(
            self.derived_metrics.clone(),
            self.cpa_action.as_deref().unwrap_or(keys::CONVERSIONS),
        )
    }

    /// Column order for tables: the configured order, or base then derived keys.
    pub fn display_order(&self) -> Vec<String> {
        if !self.display_fields.is_empty() {
            return self.display_fields.clone();
        }
        self.base_metrics
            .iter()
            .map(|m| m.canonical.clone())
            .chain(self.derived_metrics.iter().map(|d| d.key().to_string()))
            .collect()
    }

    fn validate(&self) -> Result<()> {
        if self.id.trim().is_empty() {
            return Err(ReportError::Config("platform id must not be empty".into()));
        }
        if self.group_by.trim().is_empty() {
            return Err(ReportError::Config(format!(
                "platform {}: groupBy must not be empty",
                self.id
            )));
        }
        if self.base_metrics.is_empty() {
            return Err(ReportError::Config(format!(
                "platform {}: at least one base metric is required",
                self.id
            )));
        }
        if let Some(action) = self.cpa_action.as_deref() {
            if !self.canonical_keys().contains(&action) {
                return Err(ReportError::Config(format!(
                    "platform {}: cpaAction {} is not a base metric",
                    self.id, action
                )));
            }
        }
        if self.supports_comparison && self.date_field.is_none() {
            return Err(ReportError::Config(format!(
                "platform {}: comparison requires a dateField",
                self.id
            )));
        }
        Ok(())
    }
}

fn mappings(pairs: &[(&str, &str)]) -> Vec<FieldMapping> {
    pairs
        .iter()
        .map(|(canonical, source)| FieldMapping::new(*canonical, *source))
        .collect()
}

static BUILTIN_PLATFORMS: Lazy<Vec<PlatformConfig>> = Lazy::new(|| {
    use crate::metrics::DerivedMetric::*;
    vec![
        PlatformConfig {
            id: "facebook".into(),
            name: "Facebook Ads".into(),
            endpoint: "/api/sheets/facebook".into(),
            group_by: "Ad set name".into(),
            date_field: Some("Day".into()),
            base_metrics: mappings(&[
                ("impressions", "Impressions"),
                ("reach", "Reach"),
                ("clicks", "Link clicks"),
                ("spent", "Amount spent (USD)"),
                ("conversions", "Website conversions"),
                ("engagements", "Post engagements"),
                ("videoViews", "ThruPlays"),
                ("conversionValue", "Website purchases conversion value"),
            ]),
            derived_metrics: vec![
                Frequency, Cpr, Ctr, Cpc, ConRate, Cpl, Cpm, Cpv, Cpe, Roas, EngagementRate,
            ],
            cpa_action: None,
            display_fields: vec![
                "spent".into(),
                "impressions".into(),
                "reach".into(),
                "frequency".into(),
                "clicks".into(),
                "ctr".into(),
                "cpc".into(),
                "cpm".into(),
                "conversions".into(),
                "conRate".into(),
                "cpl".into(),
                "roas".into(),
            ],
            supports_comparison: true,
        },
        PlatformConfig {
            id: "google_ads".into(),
            name: "Google Ads".into(),
            endpoint: "/api/sheets/google-ads".into(),
            group_by: "Campaign".into(),
            date_field: Some("Day".into()),
            base_metrics: mappings(&[
                ("impressions", "Impr."),
                ("clicks", "Clicks"),
                ("spent", "Cost"),
                ("conversions", "Conversions"),
                ("conversionValue", "Conv. value"),
            ]),
            derived_metrics: vec![Ctr, Cpc, Cpm, ConRate, Cpl, Cpa, Roas],
            cpa_action: Some("conversions".into()),
            display_fields: vec![],
            supports_comparison: true,
        },
        PlatformConfig {
            id: "linkedin".into(),
            name: "LinkedIn Ads".into(),
            endpoint: "/api/sheets/linkedin".into(),
            group_by: "Campaign Name".into(),
            date_field: Some("Start Date (in UTC)".into()),
            base_metrics: mappings(&[
                ("impressions", "Impressions"),
                ("clicks", "Clicks"),
                ("spent", "Total Spent"),
                ("conversions", "Conversions"),
                ("leads", "Leads"),
                ("engagements", "Total Engagements"),
            ]),
            derived_metrics: vec![Ctr, Cpc, Cpm, ConRate, Cpl, Cpa, EngagementRate],
            cpa_action: Some("leads".into()),
            display_fields: vec![],
            supports_comparison: true,
        },
        PlatformConfig {
            id: "tiktok".into(),
            name: "TikTok Ads".into(),
            endpoint: "/api/sheets/tiktok".into(),
            group_by: "Ad group name".into(),
            date_field: Some("Date".into()),
            base_metrics: mappings(&[
                ("impressions", "Impressions"),
                ("reach", "Reach"),
                ("clicks", "Clicks"),
                ("spent", "Cost"),
                ("videoViews", "Video views"),
                ("conversions", "Conversions"),
            ]),
            derived_metrics: vec![Frequency, Ctr, Cpc, Cpm, Cpv, ViewRate, Cpa],
            cpa_action: Some("conversions".into()),
            display_fields: vec![],
            supports_comparison: true,
        },
        PlatformConfig {
            id: "youtube".into(),
            name: "YouTube".into(),
            endpoint: "/api/sheets/youtube".into(),
            group_by: "Video title".into(),
            date_field: Some("Date".into()),
            base_metrics: mappings(&[
                ("impressions", "Impressions"),
                ("videoViews", "Views"),
                ("clicks", "Clicks"),
                ("spent", "Cost"),
                ("engagements", "Engagements"),
            ]),
            derived_metrics: vec![Ctr, Cpm, Cpv, Cpe, ViewRate, EngagementRate],
            cpa_action: None,
            display_fields: vec![],
            supports_comparison: true,
        },
        PlatformConfig {
            id: "social_listening".into(),
            name: "Social Listening".into(),
            endpoint: "/api/sheets/social-listening".into(),
            group_by: "Keyword".into(),
            date_field: Some("Date".into()),
            base_metrics: mappings(&[
                ("mentions", "Mentions"),
                ("impressions", "Impressions"),
                ("reach", "Reach"),
                ("engagements", "Engagements"),
            ]),
            derived_metrics: vec![EngagementRate, Frequency],
            cpa_action: None,
            display_fields: vec![],
            supports_comparison: true,
        },
    ]
});

/// Lookup table from platform identifier to its configuration.
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    platforms: BTreeMap<String, PlatformConfig>,
}

impl PlatformRegistry {
    pub fn builtin() -> Self {
        Self {
            platforms: BUILTIN_PLATFORMS
                .iter()
                .map(|p| (p.id.clone(), p.clone()))
                .collect(),
        }
    }

    pub fn from_configs(configs: Vec<PlatformConfig>) -> Result<Self> {
        let mut platforms = BTreeMap::new();
        for config in configs {
            config.validate()?;
            let id = config.id.clone();
            if platforms.insert(id.clone(), config).is_some() {
                return Err(ReportError::Config(format!("duplicate platform id: {id}")));
            }
        }
        Ok(Self { platforms })
    }

    /// Parse a JSON array of platform configs.
    pub fn from_json_str(s: &str) -> Result<Self> {
        let configs: Vec<PlatformConfig> = serde_json::from_str(s)?;
        Self::from_configs(configs)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let s = std::fs::read_to_string(path)?;
        Self::from_json_str(&s)
    }

    /// Resolve a platform id; unknown ids are rejected before the engine runs.
    pub fn get(&self, id: &str) -> Result<&PlatformConfig> {
        self.platforms
            .get(id)
            .ok_or_else(|| ReportError::UnknownPlatform(id.to_string()))
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.platforms.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = &PlatformConfig> {
        self.platforms.values()
    }

    pub fn len(&self) -> usize {
        self.platforms.len()
    }

    pub fn is_empty(&self) -> bool {
        self.platforms.is_empty()
    }
}
