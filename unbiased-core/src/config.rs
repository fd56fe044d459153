//! Configuration for bias audits.
//!
//! Uses `figment` for layered configuration: defaults -> user config file ->
//! workspace config file -> explicit file -> environment. The workspace file
//! lives at `.unbiased/config.toml`.

use crate::error::AuditError;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Top-level audit configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AuditConfig {
    /// Dataset ingestion settings.
    #[serde(default)]
    pub data: DataConfig,
    /// Column-eligibility heuristics.
    #[serde(default)]
    pub columns: ColumnRules,
    /// Supervised severity normalization and verdict tiers.
    #[serde(default)]
    pub severity: SeverityConfig,
    /// Representation-only verdict tiers.
    #[serde(default)]
    pub unsupervised: UnsupervisedConfig,
    /// Bias-type classification thresholds.
    #[serde(default)]
    pub diagnosis: DiagnosisThresholds,
    /// Report rendering.
    #[serde(default)]
    pub output: OutputConfig,
}

/// Dataset ingestion settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DataConfig {
    /// Field delimiter for `.csv` files.
    #[serde(default = "default_delimiter")]
    pub delimiter: char,
    /// Stop reading after this many rows.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_rows: Option<usize>,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            delimiter: default_delimiter(),
            max_rows: None,
        }
    }
}

fn default_delimiter() -> char {
    ','
}

/// Heuristics deciding which columns may serve as sensitive or target attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnRules {
    /// Maximum distinct values for a sensitive attribute.
    #[serde(default = "default_max_unique")]
    pub max_unique: usize,
    /// Distinct/rows ratio above which a column is treated as an identifier.
    #[serde(default = "default_identifier_ratio")]
    pub identifier_ratio: f64,
    /// Same ratio, applied to candidate target columns.
    #[serde(default = "default_target_identifier_ratio")]
    pub target_identifier_ratio: f64,
}

impl Default for ColumnRules {
    fn default() -> Self {
        Self {
            max_unique: default_max_unique(),
            identifier_ratio: default_identifier_ratio(),
            target_identifier_ratio: default_target_identifier_ratio(),
        }
    }
}

fn default_max_unique() -> usize {
    10
}

fn default_identifier_ratio() -> f64 {
    0.9
}

fn default_target_identifier_ratio() -> f64 {
    0.7
}

/// Normalization scales and tier cut-offs for the supervised verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SeverityConfig {
    /// Representation at or above this share scores zero.
    #[serde(default = "default_balanced_share")]
    pub balanced_share: f64,
    /// Rate spread that saturates the label score.
    #[serde(default = "default_rate_scale")]
    pub label_scale: f64,
    /// Rate spread that saturates the historical score.
    #[serde(default = "default_rate_scale")]
    pub historical_scale: f64,
    /// Parity gap that saturates the parity score.
    #[serde(default = "default_rate_scale")]
    pub parity_scale: f64,
    /// Impact deviation that saturates the impact score.
    #[serde(default = "default_impact_scale")]
    pub impact_scale: f64,
    /// Minimum percentage for `BIASED`.
    #[serde(default = "default_biased_at")]
    pub biased_at: u8,
    /// Minimum percentage for `POTENTIALLY BIASED`.
    #[serde(default = "default_potential_at")]
    pub potential_at: u8,
}

impl Default for SeverityConfig {
    fn default() -> Self {
        Self {
            balanced_share: default_balanced_share(),
            label_scale: default_rate_scale(),
            historical_scale: default_rate_scale(),
            parity_scale: default_rate_scale(),
            impact_scale: default_impact_scale(),
            biased_at: default_biased_at(),
            potential_at: default_potential_at(),
        }
    }
}

fn default_balanced_share() -> f64 {
    0.5
}

fn default_rate_scale() -> f64 {
    0.3
}

fn default_impact_scale() -> f64 {
    0.5
}

fn default_biased_at() -> u8 {
    60
}

fn default_potential_at() -> u8 {
    30
}

/// Representation cut-offs for the unsupervised verdict.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnsupervisedConfig {
    /// Below this share the dataset is at high risk.
    #[serde(default = "default_high_risk_below")]
    pub high_risk_below: f64,
    /// Below this share the dataset is potentially biased.
    #[serde(default = "default_potential_below")]
    pub potential_below: f64,
    /// Representation at or above this share scores zero.
    #[serde(default = "default_balanced_share")]
    pub balanced_share: f64,
}

impl Default for UnsupervisedConfig {
    fn default() -> Self {
        Self {
            high_risk_below: default_high_risk_below(),
            potential_below: default_potential_below(),
            balanced_share: default_balanced_share(),
        }
    }
}

fn default_high_risk_below() -> f64 {
    0.3
}

fn default_potential_below() -> f64 {
    0.4
}

/// Thresholds that trigger each bias type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DiagnosisThresholds {
    #[serde(default = "default_representation_below")]
    pub representation_below: f64,
    #[serde(default = "default_spread_above")]
    pub label_diff_above: f64,
    #[serde(default = "default_spread_above")]
    pub historical_diff_above: f64,
    #[serde(default = "default_spd_above")]
    pub spd_above: f64,
    #[serde(default = "default_di_deviation_above")]
    pub di_deviation_above: f64,
}

impl Default for DiagnosisThresholds {
    fn default() -> Self {
        Self {
            representation_below: default_representation_below(),
            label_diff_above: default_spread_above(),
            historical_diff_above: default_spread_above(),
            spd_above: default_spd_above(),
            di_deviation_above: default_di_deviation_above(),
        }
    }
}

fn default_representation_below() -> f64 {
    0.4
}

fn default_spread_above() -> f64 {
    0.2
}

fn default_spd_above() -> f64 {
    0.1
}

fn default_di_deviation_above() -> f64 {
    0.2
}

/// Report rendering settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputConfig {
    /// Default output format: `text` or `json`.
    #[serde(default = "default_format")]
    pub format: String,
    /// Include recommendations and explanations in reports.
    #[serde(default = "default_true")]
    pub recommendations: bool,
    /// Wrap width for prose in text reports.
    #[serde(default = "default_wrap_width")]
    pub wrap_width: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            format: default_format(),
            recommendations: true,
            wrap_width: default_wrap_width(),
        }
    }
}

fn default_format() -> String {
    "text".to_string()
}

fn default_true() -> bool {
    true
}

fn default_wrap_width() -> usize {
    88
}

impl AuditConfig {
    /// Reject settings that would make scores meaningless.
    pub fn validate(&self) -> Result<(), AuditError> {
        let s = &self.severity;
        let scales = [
            ("severity.balanced_share", s.balanced_share),
            ("severity.label_scale", s.label_scale),
            ("severity.historical_scale", s.historical_scale),
            ("severity.parity_scale", s.parity_scale),
            ("severity.impact_scale", s.impact_scale),
            ("unsupervised.balanced_share", self.unsupervised.balanced_share),
        ];
        for (name, value) in scales {
            if value.is_nan() || value <= 0.0 {
                return Err(AuditError::config(format!("{name} must be positive, got {value}")));
            }
        }
        if s.potential_at > s.biased_at || s.biased_at > 100 {
            return Err(AuditError::config(format!(
                "severity tiers must satisfy potential_at <= biased_at <= 100, got {} and {}",
                s.potential_at, s.biased_at
            )));
        }
        let u = &self.unsupervised;
        if u.high_risk_below > u.potential_below {
            return Err(AuditError::config(format!(
                "unsupervised.high_risk_below ({}) exceeds potential_below ({})",
                u.high_risk_below, u.potential_below
            )));
        }
        if self.columns.max_unique == 0 {
            return Err(AuditError::config("columns.max_unique must be at least 1"));
        }
        match self.output.format.as_str() {
            "text" | "json" => Ok(()),
            other => Err(AuditError::config(format!(
                "output.format must be 'text' or 'json', got '{other}'"
            ))),
        }
    }
}

/// Path of the workspace-level config file.
pub fn workspace_config_path(workspace: &Path) -> PathBuf {
    workspace.join(".unbiased").join("config.toml")
}

fn user_config_path() -> Option<PathBuf> {
    directories::ProjectDirs::from("dev", "unbiased", "unbiased")
        .map(|dirs| dirs.config_dir().join("config.toml"))
}

/// Load configuration from layered sources.
///
/// Priority (highest to lowest):
/// 1. Environment variables (prefixed with `UNBIASED_`)
/// 2. Explicit config file (`--config`)
/// 3. Workspace-local config (`.unbiased/config.toml`)
/// 4. User config (`~/.config/unbiased/config.toml`)
/// 5. Built-in defaults
pub fn load_config(
    workspace: Option<&Path>,
    explicit: Option<&Path>,
) -> Result<AuditConfig, AuditError> {
    let mut figment = Figment::from(Serialized::defaults(AuditConfig::default()));

    if let Some(user_config) = user_config_path() {
        if user_config.exists() {
            figment = figment.merge(Toml::file(&user_config));
        }
    }

    if let Some(ws) = workspace {
        let ws_config = workspace_config_path(ws);
        if ws_config.exists() {
            figment = figment.merge(Toml::file(&ws_config));
        }
    }

    if let Some(path) = explicit {
        if !path.exists() {
            return Err(AuditError::config(format!(
                "config file not found: {}",
                path.display()
            )));
        }
        figment = figment.merge(Toml::file(path));
    }

    // UNBIASED_SEVERITY__BIASED_AT, UNBIASED_OUTPUT__FORMAT, ...
    figment = figment.merge(Env::prefixed("UNBIASED_").split("__"));

    let config: AuditConfig = figment
        .extract()
        .map_err(|e| AuditError::config(e.to_string()))?;
    config.validate()?;
    Ok(config)
}

/// Check whether a user-level or workspace-level config file exists.
pub fn config_exists(workspace: Option<&Path>) -> bool {
    if user_config_path().is_some_and(|p| p.exists()) {
        return true;
    }
    workspace.is_some_and(|ws| workspace_config_path(ws).exists())
}

/// Write the default configuration to `<workspace>/.unbiased/config.toml`.
pub fn write_default_config(workspace: &Path, force: bool) -> Result<PathBuf, AuditError> {
    let path = workspace_config_path(workspace);
    if path.exists() && !force {
        return Err(AuditError::config(format!(
            "{} already exists (use --force to overwrite)",
            path.display()
        )));
    }
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let body = toml::to_string_pretty(&AuditConfig::default())
        .map_err(|e| AuditError::config(e.to_string()))?;
    std::fs::write(&path, body)?;
    Ok(path)
}
