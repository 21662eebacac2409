//! Package-level validation configuration
//!
//! Loads configuration from `skillcheck.toml` or `.skillcheckrc.json` in the
//! package root, or from an explicit file passed on the command line.
//!
//! # Configuration Format
//!
//! ```toml
//! # skillcheck.toml
//!
//! [scoring]
//! pass_threshold = 75.0
//! weights = { structure = 20, content = 30, efficiency = 20, security = 15, style = 15 }
//!
//! [style]
//! full_threshold = 0.6
//! partial_threshold = 0.3
//!
//! [budget]
//! warning_fraction = 0.8
//! priorities = { "references/api.md" = "critical" }
//!
//! [tokens]
//! monthly_volume = 5000
//!
//! [security]
//! disabled_rules = ["outbound-network-call"]
//!
//! [references]
//! entrypoints = ["scripts/main.py"]
//! ```

use crate::models::Severity;
use crate::package::PriorityTier;
use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// Config file names searched in the package root, in order
pub const CONFIG_FILE_NAMES: &[&str] = &["skillcheck.toml", ".skillcheckrc.json"];

/// Top-level validation configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ValidationConfig {
    #[serde(default)]
    pub scoring: ScoringConfig,

    #[serde(default)]
    pub style: StyleConfig,

    #[serde(default)]
    pub budget: BudgetConfig,

    #[serde(default)]
    pub tokens: TokenConfig,

    #[serde(default)]
    pub security: SecurityConfig,

    #[serde(default)]
    pub references: ReferencesConfig,
}

/// Scoring configuration for the quality score
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Point pools per category (normalised to sum to 100)
    #[serde(default)]
    pub weights: CategoryWeights,

    /// Points deducted per finding, by severity
    #[serde(default)]
    pub penalties: SeverityPenalties,

    /// Minimum total score for a passing run (default: 70)
    #[serde(default = "default_pass_threshold")]
    pub pass_threshold: f64,

    #[serde(default)]
    pub grade_bands: GradeBands,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            penalties: SeverityPenalties::default(),
            pass_threshold: default_pass_threshold(),
            grade_bands: GradeBands::default(),
        }
    }
}

fn default_pass_threshold() -> f64 {
    70.0
}

/// Point pools for the five score categories
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub structure: f64,
    pub content: f64,
    pub efficiency: f64,
    pub security: f64,
    pub style: f64,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            structure: 20.0,
            content: 30.0,
            efficiency: 20.0,
            security: 15.0,
            style: 15.0,
        }
    }
}

impl CategoryWeights {
    fn sum(&self) -> f64 {
        self.structure + self.content + self.efficiency + self.security + self.style
    }

    /// Validate that pools are non-negative and sum to 100 (with tolerance)
    pub fn is_valid(&self) -> bool {
        self.all_non_negative() && (self.sum() - 100.0).abs() < 0.001
    }

    pub fn all_non_negative(&self) -> bool {
        [
            self.structure,
            self.content,
            self.efficiency,
            self.security,
            self.style,
        ]
        .iter()
        .all(|w| w.is_finite() && *w >= 0.0)
    }

    /// Scale pools to two decimals so they sum to exactly 100.
    /// The rounding remainder goes to the largest pool.
    pub fn normalize(&mut self) {
        let sum = self.sum();
        if sum <= 0.0 {
            return;
        }
        let factor = 100.0 / sum;
        let mut pools = [
            &mut self.structure,
            &mut self.content,
            &mut self.efficiency,
            &mut self.security,
            &mut self.style,
        ];
        for pool in pools.iter_mut() {
            **pool = round_cents(**pool * factor);
        }
        let largest = (1..pools.len()).fold(0, |best, i| if *pools[i] > *pools[best] { i } else { best });
        let others: f64 = pools
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != largest)
            .map(|(_, pool)| **pool)
            .sum();
        *pools[largest] = round_cents(100.0 - others);
    }
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SeverityPenalties {
    pub critical: f64,
    pub high: f64,
    pub medium: f64,
    pub low: f64,
    pub info: f64,
}

impl Default for SeverityPenalties {
    fn default() -> Self {
        Self {
            critical: 10.0,
            high: 6.0,
            medium: 4.0,
            low: 1.0,
            info: 0.0,
        }
    }
}

impl SeverityPenalties {
    pub fn for_severity(&self, severity: Severity) -> f64 {
        match severity {
            Severity::Critical => self.critical,
            Severity::High => self.high,
            Severity::Medium => self.medium,
            Severity::Low => self.low,
            Severity::Info => self.info,
        }
    }
}

/// Lower bounds of each grade band
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GradeBands {
    pub a: f64,
    pub b: f64,
    pub c: f64,
    pub d: f64,
}

impl Default for GradeBands {
    fn default() -> Self {
        Self {
            a: 90.0,
            b: 80.0,
            c: 70.0,
            d: 60.0,
        }
    }
}

impl GradeBands {
    pub fn grade(&self, score: f64) -> &'static str {
        if score >= self.a {
            "A"
        } else if score >= self.b {
            "B"
        } else if score >= self.c {
            "C"
        } else if score >= self.d {
            "D"
        } else {
            "F"
        }
    }
}

/// Imperative-voice and wording policy
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StyleConfig {
    /// Verbs that mark a sentence as imperative when among its first three words
    #[serde(default = "default_verbs")]
    pub verbs: Vec<String>,

    /// Imperative fraction for full style credit (default: 0.5)
    #[serde(default = "default_full_threshold")]
    pub full_threshold: f64,

    /// Imperative fraction for half style credit (default: 0.3)
    #[serde(default = "default_partial_threshold")]
    pub partial_threshold: f64,

    #[serde(default = "default_weak_phrases")]
    pub weak_phrases: Vec<String>,

    /// More weak phrases than this emits a finding (default: 5)
    #[serde(default = "default_weak_phrase_limit")]
    pub weak_phrase_limit: usize,
}

impl Default for StyleConfig {
    fn default() -> Self {
        Self {
            verbs: default_verbs(),
            full_threshold: default_full_threshold(),
            partial_threshold: default_partial_threshold(),
            weak_phrases: default_weak_phrases(),
            weak_phrase_limit: default_weak_phrase_limit(),
        }
    }
}

pub const DEFAULT_IMPERATIVE_VERBS: &[&str] = &[
    "add", "analyze", "apply", "ask", "avoid", "build", "call", "check", "choose", "configure",
    "confirm", "copy", "create", "define", "delete", "describe", "determine", "do", "document",
    "ensure", "extract", "fetch", "find", "fix", "follow", "generate", "identify", "implement",
    "include", "install", "keep", "list", "load", "make", "move", "never", "open", "parse",
    "prefer", "provide", "read", "remove", "replace", "report", "return", "review", "run", "save",
    "search", "select", "set", "show", "skip", "split", "start", "stop", "summarize", "test",
    "update", "use", "validate", "verify", "write",
];

fn default_verbs() -> Vec<String> {
    DEFAULT_IMPERATIVE_VERBS.iter().map(|s| s.to_string()).collect()
}

fn default_full_threshold() -> f64 {
    0.5
}

fn default_partial_threshold() -> f64 {
    0.3
}

fn default_weak_phrases() -> Vec<String> {
    [
        "you can",
        "you may",
        "you should",
        "you might",
        "it is possible",
        "one could",
        "consider",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_weak_phrase_limit() -> usize {
    5
}

/// Minimum line counts per tier; 0 means no minimum
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierMinLines {
    pub critical: usize,
    pub important: usize,
    pub optional: usize,
}

impl Default for TierMinLines {
    fn default() -> Self {
        Self {
            critical: 50,
            important: 10,
            optional: 0,
        }
    }
}

impl TierMinLines {
    pub fn get(&self, tier: PriorityTier) -> usize {
        match tier {
            PriorityTier::Critical => self.critical,
            PriorityTier::Important => self.important,
            PriorityTier::Optional => self.optional,
        }
    }
}

/// Per-file estimated-token ceilings per tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierTokenCeilings {
    pub critical: usize,
    pub important: usize,
    pub optional: usize,
}

impl Default for TierTokenCeilings {
    fn default() -> Self {
        Self {
            critical: 5000,
            important: 3000,
            optional: 2000,
        }
    }
}

impl TierTokenCeilings {
    pub fn get(&self, tier: PriorityTier) -> usize {
        match tier {
            PriorityTier::Critical => self.critical,
            PriorityTier::Important => self.important,
            PriorityTier::Optional => self.optional,
        }
    }
}

/// How much of each tier counts as "paid" in the aggregate check
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TierPaidWeights {
    pub critical: f64,
    pub important: f64,
    pub optional: f64,
}

impl Default for TierPaidWeights {
    fn default() -> Self {
        Self {
            critical: 1.0,
            important: 1.0,
            optional: 0.0,
        }
    }
}

impl TierPaidWeights {
    pub fn get(&self, tier: PriorityTier) -> f64 {
        match tier {
            PriorityTier::Critical => self.critical,
            PriorityTier::Important => self.important,
            PriorityTier::Optional => self.optional,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BudgetConfig {
    #[serde(default)]
    pub min_lines: TierMinLines,

    #[serde(default)]
    pub token_ceilings: TierTokenCeilings,

    /// Fraction of a ceiling that triggers a warning (default: 0.8)
    #[serde(default = "default_warning_fraction")]
    pub warning_fraction: f64,

    /// Fraction of the declared token target the paid total may use (default: 0.7)
    #[serde(default = "default_aggregate_fraction")]
    pub aggregate_fraction: f64,

    #[serde(default)]
    pub paid_weights: TierPaidWeights,

    /// Per-file tier overrides, keyed by package-relative path
    #[serde(default)]
    pub priorities: BTreeMap<String, PriorityTier>,

    /// Manifest line count that emits a medium finding (default: 500)
    #[serde(default = "default_manifest_warn_lines")]
    pub manifest_warn_lines: usize,

    /// Manifest line count that emits a high finding (default: 800)
    #[serde(default = "default_manifest_max_lines")]
    pub manifest_max_lines: usize,
}

impl Default for BudgetConfig {
    fn default() -> Self {
        Self {
            min_lines: TierMinLines::default(),
            token_ceilings: TierTokenCeilings::default(),
            warning_fraction: default_warning_fraction(),
            aggregate_fraction: default_aggregate_fraction(),
            paid_weights: TierPaidWeights::default(),
            priorities: BTreeMap::new(),
            manifest_warn_lines: default_manifest_warn_lines(),
            manifest_max_lines: default_manifest_max_lines(),
        }
    }
}

fn default_warning_fraction() -> f64 {
    0.8
}
fn default_aggregate_fraction() -> f64 {
    0.7
}
fn default_manifest_warn_lines() -> usize {
    500
}
fn default_manifest_max_lines() -> usize {
    800
}

/// Cost projection inputs
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenConfig {
    /// Invocations per month (default: 1000)
    #[serde(default = "default_monthly_volume")]
    pub monthly_volume: u64,

    /// Input price per million tokens (default: 3.00)
    #[serde(default = "default_input_rate")]
    pub input_rate: f64,

    /// Output price per million tokens (default: 15.00)
    #[serde(default = "default_output_rate")]
    pub output_rate: f64,

    /// Output tokens as a fraction of input tokens (default: 0.2)
    #[serde(default = "default_output_ratio")]
    pub output_ratio: f64,

    /// Fixed output estimate; overrides the ratio when set
    #[serde(default)]
    pub output_tokens: Option<u64>,
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self {
            monthly_volume: default_monthly_volume(),
            input_rate: default_input_rate(),
            output_rate: default_output_rate(),
            output_ratio: default_output_ratio(),
            output_tokens: None,
        }
    }
}

fn default_monthly_volume() -> u64 {
    1000
}
fn default_input_rate() -> f64 {
    3.0
}
fn default_output_rate() -> f64 {
    15.0
}
fn default_output_ratio() -> f64 {
    0.2
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SecurityConfig {
    /// Rule ids to skip (e.g. `outbound-network-call`)
    #[serde(default)]
    pub disabled_rules: Vec<String>,
}

impl SecurityConfig {
    pub fn is_rule_enabled(&self, id: &str) -> bool {
        !self.disabled_rules.iter().any(|r| r == id)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReferencesConfig {
    /// Files exempt from orphan detection
    #[serde(default)]
    pub entrypoints: Vec<String>,
}

impl ValidationConfig {
    /// Check invariants and normalise category weights to 100.
    pub fn prepare(mut self) -> anyhow::Result<Self> {
        if !self.scoring.weights.all_non_negative() {
            anyhow::bail!("scoring.weights must all be non-negative numbers");
        }
        if self.scoring.weights.sum() <= 0.0 {
            anyhow::bail!("scoring.weights must not all be zero");
        }
        if !self.scoring.weights.is_valid() {
            debug!("Normalising category weights to sum to 100");
            self.scoring.weights.normalize();
        }
        for (name, value) in [
            ("style.full_threshold", self.style.full_threshold),
            ("style.partial_threshold", self.style.partial_threshold),
            ("budget.warning_fraction", self.budget.warning_fraction),
        ] {
            if !(0.0..=1.0).contains(&value) {
                anyhow::bail!("{} must be between 0 and 1 (got {})", name, value);
            }
        }
        if self.style.partial_threshold > self.style.full_threshold {
            anyhow::bail!(
                "style.partial_threshold ({}) must not exceed style.full_threshold ({})",
                self.style.partial_threshold,
                self.style.full_threshold
            );
        }
        Ok(self)
    }
}

/// Load configuration from the package root.
///
/// Searches for configuration files in this order:
/// 1. `skillcheck.toml`
/// 2. `.skillcheckrc.json`
///
/// Returns default configuration if no usable config file is found.
pub fn load_validation_config(package_root: &Path) -> ValidationConfig {
    for name in CONFIG_FILE_NAMES {
        let path = package_root.join(name);
        if !path.is_file() {
            continue;
        }
        match load_config_file(&path) {
            Ok(config) => {
                debug!("Loaded validation config from {}", path.display());
                return config;
            }
            Err(e) => {
                warn!("Failed to load {}: {:#}", path.display(), e);
            }
        }
    }

    debug!("No validation config found, using defaults");
    ValidationConfig::default()
}

/// Load and validate a config file, choosing the format by extension.
pub fn load_config_file(path: &Path) -> anyhow::Result<ValidationConfig> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read config file {}", path.display()))?;

    let is_json = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    let config: ValidationConfig = if is_json {
        serde_json::from_str(&content)
            .with_context(|| format!("Invalid JSON in {}", path.display()))?
    } else {
        toml::from_str(&content).with_context(|| format!("Invalid TOML in {}", path.display()))?
    };

    config.prepare()
}

/// Commented default configuration printed by `skillcheck init`.
pub const DEFAULT_CONFIG_TOML: &str = r#"# skillcheck.toml - validation policy for a capability package.
# Every key is optional; the values below are the built-in defaults.

[scoring]
pass_threshold = 70.0

# Point pools per category. Normalised to sum to 100.
[scoring.weights]
structure = 20.0
content = 30.0
efficiency = 20.0
security = 15.0
style = 15.0

# Points deducted per finding.
[scoring.penalties]
critical = 10.0
high = 6.0
medium = 4.0
low = 1.0
info = 0.0

[scoring.grade_bands]
a = 90.0
b = 80.0
c = 70.0
d = 60.0

[style]
# Fraction of body sentences that must open with an imperative verb.
full_threshold = 0.5
partial_threshold = 0.3
weak_phrase_limit = 5
# verbs = ["add", "run", "use"]

[budget]
warning_fraction = 0.8
aggregate_fraction = 0.7
manifest_warn_lines = 500
manifest_max_lines = 800

[budget.min_lines]
critical = 50
important = 10
optional = 0

[budget.token_ceilings]
critical = 5000
important = 3000
optional = 2000

[budget.paid_weights]
critical = 1.0
important = 1.0
optional = 0.0

# Per-file tier overrides.
[budget.priorities]
# "references/api.md" = "critical"

[tokens]
monthly_volume = 1000
input_rate = 3.0
output_rate = 15.0
output_ratio = 0.2
# output_tokens = 500

[security]
disabled_rules = []

[references]
entrypoints = []
"#;

#[cfg(test)]
mod tests;
