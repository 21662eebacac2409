//! Per-file content budgets by priority tier
//!
//! Each budgeted file (manifest, references, scripts) is checked against its
//! tier's minimum line count and per-file token ceiling:
//!
//! - under the minimum, or over the ceiling: `violation`
//! - over `warning_fraction` of the ceiling: `warning`
//! - otherwise: `ok`
//!
//! The minimum is inclusive: a file with exactly the minimum is `ok`.
//! The optional tier has no minimum, so placeholder files are fine there.

use crate::config::BudgetConfig;
use crate::models::{Finding, FindingCategory, Severity};
use crate::package::{FileNode, FileRole, Package, PriorityTier};
use crate::tokens::estimate_tokens;
use serde::Serialize;
use tracing::debug;

/// Front matter locations of the package's own token target
const TOKEN_TARGET_KEYS: &[&[&str]] = &[
    &["token_budget"],
    &["token_target"],
    &["metadata", "token_budget"],
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BudgetStatus {
    Ok,
    Warning,
    Violation,
}

impl std::fmt::Display for BudgetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            BudgetStatus::Ok => write!(f, "ok"),
            BudgetStatus::Warning => write!(f, "warning"),
            BudgetStatus::Violation => write!(f, "violation"),
        }
    }
}

/// Budget outcome for one file.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BudgetResult {
    pub file: String,
    pub tier: PriorityTier,
    pub lines: usize,
    pub tokens: usize,
    /// `None` when the tier has no minimum
    pub min_lines: Option<usize>,
    pub token_ceiling: usize,
    pub warning_fraction: f64,
    pub status: BudgetStatus,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct BudgetReport {
    pub results: Vec<BudgetResult>,
    /// Tier-weighted sum of budgeted tokens
    pub paid_tokens: f64,
    /// Declared in front matter, if any
    pub token_target: Option<f64>,
    pub findings: Vec<Finding>,
}

/// Classify one file against its tier limits.
pub fn evaluate(
    file: &str,
    tier: PriorityTier,
    lines: usize,
    tokens: usize,
    config: &BudgetConfig,
) -> BudgetResult {
    let min = config.min_lines.get(tier);
    let min_lines = (min > 0).then_some(min);
    let ceiling = config.token_ceilings.get(tier);

    let under_minimum = min_lines.is_some_and(|m| lines < m);
    let over_ceiling = tokens > ceiling;
    let near_ceiling = tokens as f64 > ceiling as f64 * config.warning_fraction;

    let status = if under_minimum || over_ceiling {
        BudgetStatus::Violation
    } else if near_ceiling {
        BudgetStatus::Warning
    } else {
        BudgetStatus::Ok
    };

    BudgetResult {
        file: file.to_string(),
        tier,
        lines,
        tokens,
        min_lines,
        token_ceiling: ceiling,
        warning_fraction: config.warning_fraction,
        status,
    }
}

fn file_tokens(package: &Package, file: &FileNode) -> usize {
    match file.role {
        FileRole::Manifest => {
            estimate_tokens(&package.front_matter.raw) + estimate_tokens(&package.body)
        }
        _ => file.text.as_deref().map_or(0, estimate_tokens),
    }
}

fn result_finding(result: &BudgetResult) -> Option<Finding> {
    let mut reasons = Vec::new();
    if let Some(min) = result.min_lines.filter(|m| result.lines < *m) {
        reasons.push(format!(
            "{} lines is under the {} minimum of {}",
            result.lines, result.tier, min
        ));
    }
    if result.tokens > result.token_ceiling {
        reasons.push(format!(
            "~{} tokens exceeds the {} ceiling of {}",
            result.tokens, result.tier, result.token_ceiling
        ));
    } else if result.status == BudgetStatus::Warning {
        reasons.push(format!(
            "~{} tokens is over {:.0}% of the {} ceiling of {}",
            result.tokens,
            result.warning_fraction * 100.0,
            result.tier,
            result.token_ceiling
        ));
    }

    let (rule, severity) = match result.status {
        BudgetStatus::Ok => return None,
        BudgetStatus::Warning => ("budget-warning", Severity::Low),
        BudgetStatus::Violation => ("budget-violation", Severity::Medium),
    };
    Some(
        Finding::new(rule, FindingCategory::Budget, severity, reasons.join("; "))
            .at(&result.file, None),
    )
}

/// Check every budgeted file plus the package-level limits.
pub fn track_budgets(package: &Package, config: &BudgetConfig) -> BudgetReport {
    let mut report = BudgetReport::default();

    for file in &package.files {
        if file.role == FileRole::Asset || file.is_binary() {
            continue;
        }
        let tokens = file_tokens(package, file);
        let result = evaluate(&file.path, file.priority, file.lines, tokens, config);
        report.paid_tokens += config.paid_weights.get(file.priority) * tokens as f64;
        if let Some(finding) = result_finding(&result) {
            report.findings.push(finding);
        }
        report.results.push(result);
    }

    report.token_target = TOKEN_TARGET_KEYS
        .iter()
        .find_map(|path| package.front_matter.number_at(path))
        .filter(|t| *t > 0.0);
    if let Some(target) = report.token_target {
        let ceiling = target * config.aggregate_fraction;
        if report.paid_tokens > ceiling {
            report.findings.push(
                Finding::new(
                    "reference-budget-exceeded",
                    FindingCategory::Budget,
                    Severity::Medium,
                    format!(
                        "Reference budget exceeds recommended ceiling: ~{:.0} paid tokens is over {:.0}% of the declared target of {:.0}",
                        report.paid_tokens,
                        config.aggregate_fraction * 100.0,
                        target
                    ),
                )
                .at(&package.manifest_path, None)
                .with_suggestion("Move detail into references/ files that are loaded on demand"),
            );
        }
    }

    let manifest_lines = package.manifest_lines;
    let long_manifest = if manifest_lines > config.manifest_max_lines {
        Some((Severity::High, config.manifest_max_lines))
    } else if manifest_lines > config.manifest_warn_lines {
        Some((Severity::Medium, config.manifest_warn_lines))
    } else {
        None
    };
    if let Some((severity, limit)) = long_manifest {
        report.findings.push(
            Finding::new(
                "manifest-too-long",
                FindingCategory::Budget,
                severity,
                format!("{} has {} lines (limit {})", package.manifest_path, manifest_lines, limit),
            )
            .at(&package.manifest_path, None)
            .with_suggestion("Split detailed sections into references/"),
        );
    }

    debug!(
        "Budgets for '{}': {} files, {} warnings, {} violations",
        package.name,
        report.results.len(),
        report
            .results
            .iter()
            .filter(|r| r.status == BudgetStatus::Warning)
            .count(),
        report
            .results
            .iter()
            .filter(|r| r.status == BudgetStatus::Violation)
            .count()
    );
    report
}
