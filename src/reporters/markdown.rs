//! Markdown reporter for GitHub-flavored Markdown output
//!
//! Generates reports suitable for:
//! - Pull request comments
//! - CI job summaries
//! - Package READMEs

use crate::models::{Finding, FindingsSummary, Severity};
use crate::pipeline::{ValidationReport, ValidationResponse};
use crate::scoring::ScoreArea;
use crate::tokens::TokenReport;
use anyhow::Result;

/// Maximum findings to show per severity level
const MAX_FINDINGS_PER_SEVERITY: usize = 10;

/// Render response as GitHub-flavored Markdown
pub fn render(response: &ValidationResponse) -> Result<String> {
    let report = match response {
        ValidationResponse::Success(report) => report,
        ValidationResponse::Error(err) => {
            return Ok(format!(
                "# ❌ Validation failed\n\n**{}**: {}\n",
                err.error_type, err.message
            ));
        }
    };

    let mut md = String::new();
    md.push_str(&render_header(report));
    md.push('\n');
    md.push_str(&render_category_scores(report));
    md.push('\n');
    md.push_str(&render_tokens_section(&report.token_estimate));
    md.push('\n');
    md.push_str(&render_findings_summary(&report.summary));
    md.push('\n');
    md.push_str(&render_detailed_findings(&report.findings));
    Ok(md)
}

fn render_header(report: &ValidationReport) -> String {
    let grade_emoji = match report.score.grade.as_str() {
        "A" => "🏆",
        "B" => "⭐",
        "C" => "⚠️",
        "D" => "❌",
        _ => "💀",
    };
    let verdict = if report.score.passed { "Passed" } else { "Failed" };

    format!(
        "# {} {}\n\n**Grade: {}** | **Score: {:.2}/100** | **{}**\n",
        grade_emoji, report.package_name, report.score.grade, report.score.total, verdict
    )
}

fn render_category_scores(report: &ValidationReport) -> String {
    let mut md = String::from(
        "## Category Scores\n\n| Category | Earned | Possible | Status |\n|----------|--------|----------|--------|\n",
    );
    for area in ScoreArea::ALL {
        let Some(category) = report.score.category(area) else {
            continue;
        };
        md.push_str(&format!(
            "| {} | {:.2} | {:.0} | {} |\n",
            capitalize(area.as_str()),
            category.earned,
            category.possible,
            score_indicator(category.earned, category.possible)
        ));
    }
    md
}

fn render_tokens_section(tokens: &TokenReport) -> String {
    format!(
        "## Token Budget\n\n| Scenario | Tokens | Monthly cost |\n|----------|--------|--------------|\n| Idle | {} | ${:.2} |\n| Typical | {} | ${:.2} |\n| With reference | {} | ${:.2} |\n| Worst | {} | ${:.2} |\n",
        tokens.scenarios.idle,
        tokens.costs.idle.monthly_cost,
        tokens.scenarios.typical,
        tokens.costs.typical.monthly_cost,
        tokens.with_reference,
        tokens.costs.with_reference.monthly_cost,
        tokens.scenarios.worst,
        tokens.costs.worst.monthly_cost
    )
}

/// Token report on its own (tokens command)
pub fn render_tokens(package_name: &str, tokens: &TokenReport) -> String {
    let mut md = format!("# Token estimate: {}\n\n", package_name);
    md.push_str(&format!(
        "| Tier | Tokens |\n|------|--------|\n| Metadata | {} |\n| Body | {} |\n| References | {} |\n\n",
        tokens.metadata, tokens.body, tokens.references_total
    ));
    md.push_str(&render_tokens_section(tokens));
    if !tokens.recommendations.is_empty() {
        md.push_str("\n## Recommendations\n\n");
        for rec in &tokens.recommendations {
            md.push_str(&format!("- {}\n", rec));
        }
    }
    md
}

/// Findings on their own (scan command)
pub fn render_findings(package_name: &str, findings: &[Finding]) -> String {
    let mut md = format!("# Security scan: {}\n\n", package_name);
    md.push_str(&render_findings_summary(&FindingsSummary::from_findings(findings)));
    md.push('\n');
    md.push_str(&render_detailed_findings(findings));
    md
}

fn render_findings_summary(fs: &FindingsSummary) -> String {
    format!(
        r#"## Findings Summary

| Severity | Count | Emoji |
|----------|-------|-------|
| Critical | {} | 🔴 |
| High | {} | 🟠 |
| Medium | {} | 🟡 |
| Low | {} | 🔵 |
| Info | {} | ℹ️ |
| **Total** | **{}** | |
"#,
        fs.critical, fs.high, fs.medium, fs.low, fs.info, fs.total
    )
}

fn render_detailed_findings(findings: &[Finding]) -> String {
    let mut md = String::from("## Detailed Findings\n\n");

    if findings.is_empty() {
        md.push_str("✅ No issues found.\n");
        return md;
    }

    for severity in [
        Severity::Critical,
        Severity::High,
        Severity::Medium,
        Severity::Low,
        Severity::Info,
    ] {
        let group: Vec<&Finding> = findings.iter().filter(|f| f.severity == severity).collect();
        if group.is_empty() {
            continue;
        }

        let label = severity.to_string();
        md.push_str(&format!(
            "### {} {} Findings ({})\n\n",
            severity_emoji(severity),
            capitalize(&label),
            group.len()
        ));

        for finding in group.iter().take(MAX_FINDINGS_PER_SEVERITY) {
            md.push_str(&render_finding(finding));
        }

        let hidden = group.len().saturating_sub(MAX_FINDINGS_PER_SEVERITY);
        if hidden > 0 {
            md.push_str(&format!("*...and {} more {} findings*\n\n", hidden, label));
        }
    }

    md
}

fn render_finding(finding: &Finding) -> String {
    let mut md = format!("- **{}** `{}`", finding.message, finding.rule);
    match (&finding.file, finding.line) {
        (Some(file), Some(line)) => md.push_str(&format!(" at `{}:{}`", file, line)),
        (Some(file), None) => md.push_str(&format!(" in `{}`", file)),
        _ => {}
    }
    md.push('\n');
    if let Some(suggestion) = &finding.suggestion {
        md.push_str(&format!("  > 💡 {}\n", suggestion));
    }
    md
}

fn score_indicator(earned: f64, possible: f64) -> &'static str {
    let ratio = if possible > 0.0 { earned / possible } else { 1.0 };
    if ratio >= 0.8 {
        "✅ Good"
    } else if ratio >= 0.6 {
        "⚠️ Fair"
    } else {
        "❌ Poor"
    }
}

fn severity_emoji(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "🔴",
        Severity::High => "🟠",
        Severity::Medium => "🟡",
        Severity::Low => "🔵",
        Severity::Info => "ℹ️",
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}
