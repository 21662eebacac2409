//! JSON reporter
//!
//! Outputs the response object as pretty-printed JSON. Field names are the
//! stable external contract; piping to jq is the intended use.

use crate::models::{Finding, FindingsSummary};
use crate::pipeline::ValidationResponse;
use crate::tokens::TokenReport;
use anyhow::Result;
use serde_json::json;

/// Render response as JSON
pub fn render(response: &ValidationResponse) -> Result<String> {
    Ok(serde_json::to_string_pretty(response)?)
}

/// Render a batch as a JSON array in input order
pub fn render_batch(responses: &[ValidationResponse]) -> Result<String> {
    Ok(serde_json::to_string_pretty(responses)?)
}

pub fn render_tokens(package_name: &str, tokens: &TokenReport) -> Result<String> {
    let value = json!({
        "status": "success",
        "package_name": package_name,
        "token_estimate": tokens,
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

pub fn render_findings(package_name: &str, findings: &[Finding]) -> Result<String> {
    let value = json!({
        "status": "success",
        "package_name": package_name,
        "findings": findings,
        "summary": FindingsSummary::from_findings(findings),
    });
    Ok(serde_json::to_string_pretty(&value)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reporters::tests::{test_report, test_response};

    #[test]
    fn test_json_render_valid() {
        let json_str = render(&test_response()).expect("render JSON");
        let parsed: serde_json::Value = serde_json::from_str(&json_str).expect("parse JSON");
        assert_eq!(parsed["status"], "success");
        assert_eq!(parsed["package_name"], "demo-skill");
        let finding = &parsed["findings"][0];
        for key in ["category", "severity", "message", "file", "line", "id", "rule"] {
            assert!(finding.get(key).is_some(), "missing {key}");
        }
    }

    #[test]
    fn test_json_batch_is_array() {
        let responses = vec![test_response(), test_response()];
        let parsed: serde_json::Value =
            serde_json::from_str(&render_batch(&responses).expect("render")).expect("parse");
        assert_eq!(parsed.as_array().expect("array").len(), 2);
    }

    #[test]
    fn test_json_findings_only() {
        let report = test_report();
        let parsed: serde_json::Value =
            serde_json::from_str(&render_findings("demo", &report.findings).expect("render"))
                .expect("parse");
        assert_eq!(parsed["summary"]["total"], report.findings.len());
    }
}
