//! Category scorer
//!
//! Buckets findings into the five score areas, deducts severity penalties
//! from each area's pool, and adds the imperative-voice credit to Style.

use super::voice::VoiceStats;
use crate::config::ValidationConfig;
use crate::models::{Finding, FindingCategory};
use crate::package::Package;
use serde::Serialize;
use std::collections::BTreeMap;
use tracing::{debug, info};

/// One of the five scored areas.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ScoreArea {
    Structure,
    Content,
    Efficiency,
    Security,
    Style,
}

impl ScoreArea {
    pub const ALL: [ScoreArea; 5] = [
        ScoreArea::Structure,
        ScoreArea::Content,
        ScoreArea::Efficiency,
        ScoreArea::Security,
        ScoreArea::Style,
    ];

    /// Area a finding category deducts from.
    pub fn for_category(category: FindingCategory) -> Self {
        match category {
            FindingCategory::Structure | FindingCategory::Reference => ScoreArea::Structure,
            FindingCategory::Content => ScoreArea::Content,
            FindingCategory::Budget => ScoreArea::Efficiency,
            FindingCategory::Security => ScoreArea::Security,
            FindingCategory::Style => ScoreArea::Style,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ScoreArea::Structure => "structure",
            ScoreArea::Content => "content",
            ScoreArea::Efficiency => "efficiency",
            ScoreArea::Security => "security",
            ScoreArea::Style => "style",
        }
    }

    fn pool(&self, config: &ValidationConfig) -> f64 {
        let weights = &config.scoring.weights;
        match self {
            ScoreArea::Structure => weights.structure,
            ScoreArea::Content => weights.content,
            ScoreArea::Efficiency => weights.efficiency,
            ScoreArea::Security => weights.security,
            ScoreArea::Style => weights.style,
        }
    }
}

impl std::fmt::Display for ScoreArea {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Score for one area
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScoreCategory {
    pub name: ScoreArea,
    pub earned: f64,
    pub possible: f64,
    pub deductions: f64,
    /// Ids of the findings that deducted from this area
    pub findings: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QualityReport {
    pub total: f64,
    pub grade: String,
    pub passed: bool,
    /// Keyed by area name
    pub categories: BTreeMap<String, ScoreCategory>,
    pub voice: VoiceStats,
}

impl QualityReport {
    pub fn category(&self, area: ScoreArea) -> Option<&ScoreCategory> {
        self.categories.get(area.as_str())
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Quality scorer over a loaded package and its findings
pub struct QualityScorer<'a> {
    config: &'a ValidationConfig,
}

impl<'a> QualityScorer<'a> {
    pub fn new(config: &'a ValidationConfig) -> Self {
        Self { config }
    }

    /// Score `findings` (all analyzers and checks combined) for `package`.
    pub fn calculate(&self, package: &Package, findings: &[Finding]) -> QualityReport {
        let penalties = &self.config.scoring.penalties;

        let mut deductions: BTreeMap<ScoreArea, (f64, Vec<String>)> = BTreeMap::new();
        for finding in findings {
            let area = ScoreArea::for_category(finding.category);
            let entry = deductions.entry(area).or_default();
            entry.0 += penalties.for_severity(finding.severity);
            entry.1.push(finding.id.clone());
        }

        let voice = VoiceStats::measure(&package.body, &self.config.style);
        debug!(
            "Imperative voice: {}/{} sentences ({:.1}%), band {:?}",
            voice.imperative,
            voice.sentences,
            voice.ratio * 100.0,
            voice.band
        );

        let mut categories = BTreeMap::new();
        for area in ScoreArea::ALL {
            let possible = area.pool(self.config);
            let (deducted, ids) = deductions.remove(&area).unwrap_or_default();
            let earned = if area == ScoreArea::Style {
                (voice.credit(possible) - deducted).max(0.0)
            } else {
                (possible - deducted).clamp(0.0, possible)
            };
            categories.insert(
                area.as_str().to_string(),
                ScoreCategory {
                    name: area,
                    earned: round2(earned),
                    possible,
                    deductions: deducted,
                    findings: ids,
                },
            );
        }

        let total = round2(categories.values().map(|c| c.earned).sum::<f64>().clamp(0.0, 100.0));
        let grade = self.config.scoring.grade_bands.grade(total).to_string();
        let blocking = findings.iter().any(|f| f.severity.is_blocking());
        let passed = !blocking && total >= self.config.scoring.pass_threshold;

        let earned = |area: ScoreArea| categories.get(area.as_str()).map_or(0.0, |c| c.earned);
        info!(
            "Quality score: {:.2} ({}) - Structure: {:.2}, Content: {:.2}, Efficiency: {:.2}, Security: {:.2}, Style: {:.2}",
            total,
            grade,
            earned(ScoreArea::Structure),
            earned(ScoreArea::Content),
            earned(ScoreArea::Efficiency),
            earned(ScoreArea::Security),
            earned(ScoreArea::Style)
        );

        QualityReport {
            total,
            grade,
            passed,
            categories,
            voice,
        }
    }
}
