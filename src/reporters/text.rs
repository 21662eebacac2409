//! Text (terminal) reporter with colors and formatting

use crate::budget::BudgetStatus;
use crate::models::{Finding, FindingsSummary, Severity};
use crate::pipeline::{ErrorResponse, ValidationReport, ValidationResponse};
use crate::scoring::ScoreArea;
use crate::tokens::TokenReport;
use anyhow::Result;
use console::{style, Style};

/// Findings listed before the "...and N more" line
const MAX_LISTED_FINDINGS: usize = 25;

/// Grade colors
fn grade_style(grade: &str) -> Style {
    match grade {
        "A" => Style::new().green(),
        "B" => Style::new().green().bright(),
        "C" => Style::new().yellow(),
        "D" => Style::new().red().bright(),
        _ => Style::new().red(),
    }
}

/// Severity colors
fn severity_style(severity: Severity) -> Style {
    match severity {
        Severity::Critical => Style::new().red(),
        Severity::High => Style::new().red().bright(),
        Severity::Medium => Style::new().yellow(),
        Severity::Low => Style::new().blue(),
        Severity::Info => Style::new().dim(),
    }
}

/// Severity tag
fn severity_tag(severity: Severity) -> &'static str {
    match severity {
        Severity::Critical => "[C]",
        Severity::High => "[H]",
        Severity::Medium => "[M]",
        Severity::Low => "[L]",
        Severity::Info => "[I]",
    }
}

fn rule_line() -> String {
    format!("{}\n", style("──────────────────────────────────────").dim())
}

/// Render a response as formatted terminal output
pub fn render(response: &ValidationResponse) -> Result<String> {
    Ok(match response {
        ValidationResponse::Success(report) => render_report(report),
        ValidationResponse::Error(err) => render_error(err),
    })
}

/// Render each response, then a one-line batch summary
pub fn render_batch(responses: &[ValidationResponse]) -> Result<String> {
    let mut out = String::new();
    for response in responses {
        out.push_str(&render(response)?);
    }
    let passed = responses
        .iter()
        .filter(|r| r.report().is_some_and(|rep| rep.score.passed))
        .count();
    let errors = responses.iter().filter(|r| r.report().is_none()).count();
    out.push_str(&format!(
        "\n{} {} packages: {} passed, {} failed, {} could not be loaded\n",
        style("BATCH").bold(),
        responses.len(),
        passed,
        responses.len() - passed - errors,
        errors
    ));
    Ok(out)
}

fn render_error(err: &ErrorResponse) -> String {
    format!(
        "\n{} {}: {}\n",
        style("error").red().bold(),
        err.error_type,
        err.message
    )
}

fn render_report(report: &ValidationReport) -> String {
    let mut out = String::new();
    let score = &report.score;

    // Header
    out.push_str(&format!("\n{}\n", style(format!("skillcheck: {}", report.package_name)).bold()));
    out.push_str(&rule_line());
    let verdict = if score.passed {
        style("PASS").green().bold()
    } else {
        style("FAIL").red().bold()
    };
    out.push_str(&format!(
        "Score: {}  Grade: {}  {}\n\n",
        style(format!("{:.2}/100", score.total)).bold(),
        grade_style(&score.grade).bold().apply_to(&score.grade),
        verdict
    ));

    // Category scores
    out.push_str(&format!("{}\n", style("SCORES").bold()));
    let parts: Vec<String> = ScoreArea::ALL
        .iter()
        .filter_map(|area| report.score.category(*area))
        .map(|c| format!("{}: {}", capitalize(c.name.as_str()), format_points(c.earned, c.possible)))
        .collect();
    out.push_str(&format!("  {}\n", parts.join("  ")));
    out.push_str(&format!(
        "  {}\n\n",
        style(format!(
            "Imperative voice: {}/{} sentences ({:.0}%)",
            score.voice.imperative,
            score.voice.sentences,
            score.voice.ratio * 100.0
        ))
        .dim()
    ));

    // Token tiers
    let t = &report.token_estimate;
    out.push_str(&format!("{}\n", style("TOKENS").bold()));
    out.push_str(&format!(
        "  idle {}  typical {}  worst {}  ({} reference file(s))\n",
        t.scenarios.idle,
        t.scenarios.typical,
        t.scenarios.worst,
        t.references.len()
    ));
    out.push_str(&format!(
        "  {}\n\n",
        style(format!(
            "~${:.2}/month typical at {} uses",
            t.costs.typical.monthly_cost, t.costs.monthly_volume
        ))
        .dim()
    ));

    // Budgets outside their limits
    let flagged: Vec<_> = report
        .budget
        .iter()
        .filter(|b| b.status != BudgetStatus::Ok)
        .collect();
    if !flagged.is_empty() {
        out.push_str(&format!("{}\n", style("BUDGET").bold()));
        for b in flagged {
            let status = match b.status {
                BudgetStatus::Violation => style(b.status.to_string()).red(),
                _ => style(b.status.to_string()).yellow(),
            };
            out.push_str(&format!(
                "  {:<9}  {:<40}  {} lines, ~{} tokens ({})\n",
                status, b.file, b.lines, b.tokens, b.tier
            ));
        }
        out.push('\n');
    }

    out.push_str(&render_findings_table(&report.findings, &report.summary));

    // Tips based on grade
    let tip = match score.grade.as_str() {
        "A" => "Excellent! This package is ready to ship.",
        "B" => "Good shape. Address remaining findings for an A.",
        _ => "Run with --format json for every finding and suggestion.",
    };
    out.push_str(&format!("{}\n", style(tip).dim()));
    out
}

fn render_findings_table(findings: &[Finding], summary: &FindingsSummary) -> String {
    let mut out = String::new();
    out.push_str(&format!("{} ({} total)\n", style("FINDINGS").bold(), summary.total));

    let mut summary_parts = Vec::new();
    for (severity, count) in [
        (Severity::Critical, summary.critical),
        (Severity::High, summary.high),
        (Severity::Medium, summary.medium),
        (Severity::Low, summary.low),
    ] {
        if count > 0 {
            summary_parts.push(
                severity_style(severity)
                    .apply_to(format!("{} {}", count, severity))
                    .to_string(),
            );
        }
    }
    if !summary_parts.is_empty() {
        out.push_str(&format!("  {}\n\n", summary_parts.join(" | ")));
    }

    if findings.is_empty() {
        out.push('\n');
        return out;
    }

    for (i, finding) in findings.iter().take(MAX_LISTED_FINDINGS).enumerate() {
        let message: String = finding.message.chars().take(60).collect();
        let message = if finding.message.chars().count() > 60 {
            format!("{}...", message)
        } else {
            message
        };
        out.push_str(&format!(
            "  {:>3}  {}  {:<63}  {}\n",
            style(i + 1).dim(),
            severity_style(finding.severity).apply_to(severity_tag(finding.severity)),
            message,
            style(format_file_location(finding)).dim()
        ));
    }

    let remaining = findings.len().saturating_sub(MAX_LISTED_FINDINGS);
    if remaining > 0 {
        out.push_str(&format!(
            "\n  {}\n",
            style(format!("...and {} more", remaining)).dim()
        ));
    }
    out.push('\n');
    out
}

/// Findings-only listing (security scan)
pub fn render_findings(package_name: &str, findings: &[Finding]) -> String {
    let mut out = format!("\n{}\n", style(format!("skillcheck scan: {}", package_name)).bold());
    out.push_str(&rule_line());
    out.push_str(&render_findings_table(findings, &FindingsSummary::from_findings(findings)));
    if findings.is_empty() {
        out.push_str(&format!("{}\n", style("No security patterns matched.").dim()));
    }
    out
}

/// Token tiers, scenario costs and recommendations
pub fn render_tokens(package_name: &str, tokens: &TokenReport) -> String {
    let mut out = format!("\n{}\n", style(format!("skillcheck tokens: {}", package_name)).bold());
    out.push_str(&rule_line());

    out.push_str(&format!("{}\n", style("TIERS").bold()));
    out.push_str(&format!("  metadata    {:>7}\n", tokens.metadata));
    out.push_str(&format!("  body        {:>7}\n", tokens.body));
    out.push_str(&format!("  references  {:>7}\n", tokens.references_total));
    for (path, count) in &tokens.references {
        out.push_str(&format!("    {:<38} {:>7}\n", path, count));
    }
    if !tokens.scripts.is_empty() {
        out.push_str(&format!(
            "  {}\n",
            style(format!(
                "{} script(s), ~{} output tokens each when run",
                tokens.scripts.len(),
                tokens.scripts.values().next().copied().unwrap_or(0)
            ))
            .dim()
        ));
    }

    let costs = &tokens.costs;
    out.push_str(&format!(
        "\n{} ({} uses/month)\n",
        style("SCENARIOS").bold(),
        costs.monthly_volume
    ));
    out.push_str(&format!(
        "  {:<15} {:>7} {:>10} {:>12} {:>12}\n",
        "scenario", "input", "output", "per use", "monthly"
    ));
    for (name, cost) in [
        ("idle", &costs.idle),
        ("typical", &costs.typical),
        ("with reference", &costs.with_reference),
        ("worst", &costs.worst),
    ] {
        out.push_str(&format!(
            "  {:<15} {:>7} {:>10} {:>12} {:>12}\n",
            name,
            cost.tokens,
            cost.output_tokens,
            format!("${:.6}", cost.cost_per_use),
            format!("${:.2}", cost.monthly_cost)
        ));
    }

    if !tokens.recommendations.is_empty() {
        out.push_str(&format!("\n{}\n", style("RECOMMENDATIONS").bold()));
        for rec in &tokens.recommendations {
            out.push_str(&format!("  - {}\n", rec));
        }
    }
    out.push_str(&format!(
        "\n{}\n",
        style("Estimates use ~4 characters per token; treat them as approximate.").dim()
    ));
    out
}

fn format_file_location(finding: &Finding) -> String {
    let Some(file) = finding.file.as_deref() else {
        return String::new();
    };
    let short_file = if file.chars().count() > 30 {
        let skip = file.chars().count() - 27;
        format!("...{}", file.chars().skip(skip).collect::<String>())
    } else {
        file.to_string()
    };
    match finding.line {
        Some(line) => format!("{}:{}", short_file, line),
        None => short_file,
    }
}

fn format_points(earned: f64, possible: f64) -> String {
    let ratio = if possible > 0.0 { earned / possible } else { 1.0 };
    let color = if ratio >= 0.8 {
        Style::new().green()
    } else if ratio >= 0.6 {
        Style::new().yellow()
    } else {
        Style::new().red()
    };
    format!("{}/{:.0}", color.apply_to(format!("{:.1}", earned)), possible)
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(c) => c.to_uppercase().collect::<String>() + chars.as_str(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{test_report, test_response};

    #[test]
    fn test_text_render_has_score_and_findings() {
        let out = render(&test_response()).expect("render text");
        assert!(out.contains("skillcheck: demo-skill"));
        assert!(out.contains("FAIL"));
        assert!(out.contains("SKILL.md:6"));
        assert!(out.contains("Structure:"));
    }

    #[test]
    fn test_text_render_error() {
        let response = ValidationResponse::Error(ErrorResponse {
            error_type: "ManifestParseError".into(),
            message: "SKILL.md:2:1: invalid front matter: bad".into(),
        });
        let out = render(&response).expect("render text");
        assert!(out.contains("ManifestParseError"));
    }

    #[test]
    fn test_batch_summary_line() {
        let out = render_batch(&[test_response()]).expect("render batch");
        assert!(out.contains("1 packages: 0 passed, 1 failed, 0 could not be loaded"));
    }

    #[test]
    fn test_tokens_render() {
        let report = test_report();
        let out = render_tokens("demo-skill", &report.token_estimate);
        assert!(out.contains("SCENARIOS"));
        assert!(out.contains("with reference"));
        assert!(out.contains("approximate"));
    }

    #[test]
    fn test_file_location_truncates() {
        let finding = Finding::new(
            "orphan-file",
            crate::models::FindingCategory::Reference,
            Severity::Low,
            "orphan",
        )
        .at("references/a/very/deeply/nested/path/file.md", Some(3));
        let loc = format_file_location(&finding);
        assert!(loc.starts_with("..."));
        assert!(loc.ends_with("file.md:3"));
    }
}
