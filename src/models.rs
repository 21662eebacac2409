//! Core data models for skillcheck
//!
//! These models are shared by every analyzer: findings, their severities and
//! categories, and the summary counts reporters print.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;

/// Generate a deterministic finding ID based on content hash.
///
/// The ID is a 16-character hex string derived from the rule that fired,
/// the file and line it fired on, and the message. Identical packages always
/// produce identical IDs, which keeps reports byte-identical across runs.
pub fn deterministic_finding_id(rule: &str, file: &str, line: u32, message: &str) -> String {
    let input = format!("{rule}\n{file}\n{line}\n{message}");
    let digest = Sha256::digest(input.as_bytes());
    format!("{:x}", digest)[..16].to_string()
}

/// Severity levels for findings
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default,
)]
#[serde(rename_all = "lowercase")]
pub enum Severity {
    #[default]
    Info,
    Low,
    Medium,
    High,
    Critical,
}

impl Severity {
    /// High or critical; these fail the run regardless of score.
    pub fn is_blocking(&self) -> bool {
        *self >= Severity::High
    }
}

impl std::fmt::Display for Severity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Severity::Info => write!(f, "info"),
            Severity::Low => write!(f, "low"),
            Severity::Medium => write!(f, "medium"),
            Severity::High => write!(f, "high"),
            Severity::Critical => write!(f, "critical"),
        }
    }
}

impl std::str::FromStr for Severity {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "info" => Ok(Severity::Info),
            "low" => Ok(Severity::Low),
            "medium" => Ok(Severity::Medium),
            "high" => Ok(Severity::High),
            "critical" => Ok(Severity::Critical),
            other => anyhow::bail!(
                "Unknown severity '{}'. Valid: critical, high, medium, low, info",
                other
            ),
        }
    }
}

/// Which analysis domain produced a finding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FindingCategory {
    Structure,
    Reference,
    Content,
    Security,
    Budget,
    Style,
}

impl FindingCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            FindingCategory::Structure => "structure",
            FindingCategory::Reference => "reference",
            FindingCategory::Content => "content",
            FindingCategory::Security => "security",
            FindingCategory::Budget => "budget",
            FindingCategory::Style => "style",
        }
    }
}

impl std::fmt::Display for FindingCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single reported issue.
///
/// Findings are append-only: analyzers build them with [`Finding::new`] and
/// the builder methods, and nothing downstream mutates them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Finding {
    pub id: String,
    /// Rule or check that produced the finding (e.g. `broken-reference`)
    pub rule: String,
    pub category: FindingCategory,
    pub severity: Severity,
    pub message: String,
    /// Package-relative path, forward slashes
    pub file: Option<String>,
    /// 1-based line number
    pub line: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub suggestion: Option<String>,
}

impl Finding {
    pub fn new(
        rule: &str,
        category: FindingCategory,
        severity: Severity,
        message: impl Into<String>,
    ) -> Self {
        let message = message.into();
        Self {
            id: deterministic_finding_id(rule, "", 0, &message),
            rule: rule.to_string(),
            category,
            severity,
            message,
            file: None,
            line: None,
            suggestion: None,
        }
    }

    /// Attach a location; the ID is recomputed so it covers file and line.
    pub fn at(mut self, file: impl Into<String>, line: Option<u32>) -> Self {
        let file = file.into();
        self.id = deterministic_finding_id(&self.rule, &file, line.unwrap_or(0), &self.message);
        self.file = Some(file);
        self.line = line;
        self
    }

    pub fn with_suggestion(mut self, suggestion: impl Into<String>) -> Self {
        self.suggestion = Some(suggestion.into());
        self
    }

    /// Report ordering: severity (desc), then file, line, rule, message.
    pub fn report_order(a: &Finding, b: &Finding) -> Ordering {
        b.severity
            .cmp(&a.severity)
            .then_with(|| a.file.cmp(&b.file))
            .then_with(|| a.line.cmp(&b.line))
            .then_with(|| a.rule.cmp(&b.rule))
            .then_with(|| a.message.cmp(&b.message))
    }
}

/// Sort findings into the canonical report order.
pub fn sort_findings(findings: &mut [Finding]) {
    findings.sort_by(Finding::report_order);
}

/// Summary of findings by severity
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FindingsSummary {
    pub critical: usize,
    pub high: usize,
    pub medium: usize,
    pub low: usize,
    pub info: usize,
    pub total: usize,
}

impl FindingsSummary {
    pub fn from_findings(findings: &[Finding]) -> Self {
        let mut summary = Self::default();
        for f in findings {
            match f.severity {
                Severity::Critical => summary.critical += 1,
                Severity::High => summary.high += 1,
                Severity::Medium => summary.medium += 1,
                Severity::Low => summary.low += 1,
                Severity::Info => summary.info += 1,
            }
            summary.total += 1;
        }
        summary
    }

    pub fn has_blocking(&self) -> bool {
        self.critical > 0 || self.high > 0
    }
}
