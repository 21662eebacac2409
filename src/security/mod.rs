//! Security pattern scanning
//!
//! Line-based classification of package text against a fixed rule table.
//! This is not dataflow analysis: a rule fires on any line whose content
//! matches it, in the contexts the rule covers.
//!
//! - Scripts: every line is code.
//! - Markdown (manifest body, references): fenced blocks are code, the rest
//!   is prose. Prose only gets the secret rules, so a URL in documentation
//!   never counts as a network call.
//! - Front matter: secrets, plus the declared-permission check.

mod rules;

pub use rules::{line_rules, LineContext, LineRule, RuleId};

use crate::config::SecurityConfig;
use crate::models::{Finding, FindingCategory};
use crate::package::{value_strings, FenceTracker, FileRole, Package};
use serde::Serialize;
use tracing::debug;

/// Front matter keys declaring tools or permissions
const PERMISSION_KEYS: &[&str] = &["allowed-tools", "allowed_tools", "tools", "permissions"];

/// Output of a security scan.
#[derive(Debug, Clone, Default, Serialize)]
pub struct SecurityReport {
    pub findings: Vec<Finding>,
    pub files_scanned: usize,
    pub lines_scanned: usize,
}

struct Scanner<'a> {
    config: &'a SecurityConfig,
    rules: Vec<&'static LineRule>,
    report: SecurityReport,
}

impl<'a> Scanner<'a> {
    fn new(config: &'a SecurityConfig) -> Self {
        let rules = line_rules()
            .iter()
            .filter(|r| config.is_rule_enabled(r.rule.id()))
            .collect();
        Self {
            config,
            rules,
            report: SecurityReport::default(),
        }
    }

    fn scan_line(&mut self, file: &str, line_no: usize, line: &str, context: LineContext) {
        self.report.lines_scanned += 1;
        let matched: Vec<RuleId> = self
            .rules
            .iter()
            .filter(|r| r.matches(line, context))
            .map(|r| r.rule)
            .collect();
        for rule in &matched {
            if rule.superseded_by().is_some_and(|s| matched.contains(&s)) {
                continue;
            }
            self.report
                .findings
                .push(rule_finding(*rule, file, line_no, line));
        }
    }

    fn scan_markdown<'l>(&mut self, file: &str, lines: impl Iterator<Item = (usize, &'l str)>) {
        let mut fence = FenceTracker::default();
        for (line_no, line) in lines {
            let was_in_fence = fence.in_fence();
            let is_fence_line = fence.update(line);
            let context = if was_in_fence && fence.in_fence() {
                LineContext::FencedCode
            } else if is_fence_line {
                continue;
            } else {
                LineContext::Prose
            };
            self.scan_line(file, line_no, line, context);
        }
    }

    fn enabled(&self, rule: RuleId) -> bool {
        self.config.is_rule_enabled(rule.id())
    }
}

fn rule_finding(rule: RuleId, file: &str, line_no: usize, line: &str) -> Finding {
    let message = if rule == RuleId::HardcodedSecret {
        // Never echo the secret itself
        rule.title().to_string()
    } else {
        format!("{}: {}", rule.title(), snippet(line))
    };
    Finding::new(rule.id(), FindingCategory::Security, rule.severity(), message)
        .at(file, Some(line_no as u32))
        .with_suggestion(rule.suggestion())
}

fn snippet(line: &str) -> String {
    let trimmed = line.trim();
    if trimmed.chars().count() > 80 {
        format!("{}...", trimmed.chars().take(77).collect::<String>())
    } else {
        trimmed.to_string()
    }
}

/// Scan every text file of the package.
pub fn scan_package(package: &Package, config: &SecurityConfig) -> SecurityReport {
    let mut scanner = Scanner::new(config);
    let manifest = package.manifest_path.as_str();

    // Front matter is structured data: prose context
    let fm = &package.front_matter;
    for (i, line) in fm.raw.lines().enumerate() {
        scanner.scan_line(manifest, fm.start_line + i, line, LineContext::Prose);
    }
    scanner.scan_markdown(manifest, package.numbered_body_lines());
    scanner.report.files_scanned += 1;

    for file in &package.files {
        let Some(text) = file.text.as_deref() else {
            continue;
        };
        let numbered = text.lines().enumerate().map(|(i, l)| (i + 1, l));
        match file.role {
            FileRole::Script => {
                for (line_no, line) in numbered {
                    scanner.scan_line(&file.path, line_no, line, LineContext::Script);
                }
            }
            FileRole::Reference => scanner.scan_markdown(&file.path, numbered),
            FileRole::Manifest | FileRole::Asset => continue,
        }
        scanner.report.files_scanned += 1;
    }

    if scanner.enabled(RuleId::BroadPermission) {
        scanner.report.findings.extend(broad_permissions(package));
    }
    if scanner.enabled(RuleId::PromptInjectionGuidance) {
        scanner.report.findings.extend(prompt_injection_guidance(package));
    }

    let report = scanner.report;
    debug!(
        "Security scan of '{}': {} files, {} lines, {} findings",
        package.name,
        report.files_scanned,
        report.lines_scanned,
        report.findings.len()
    );
    report
}

/// Split a declared permission value into individual entries.
fn permission_entries(value: &serde_yaml::Value) -> Vec<String> {
    let mut out = Vec::new();
    for item in value_strings(value) {
        for part in item.split(',') {
            let part = part.trim();
            if part.contains('(') {
                out.push(part.to_string());
            } else {
                out.extend(part.split_whitespace().map(str::to_string));
            }
        }
    }
    out
}

fn is_broad(entry: &str) -> bool {
    let lower = entry.to_lowercase();
    entry.contains('*') && !entry.contains('(')
        || lower == "all"
        || entry == "Bash"
        || entry == "Write"
        || entry == "Bash(*)"
        || entry == "Write(*)"
}

fn broad_permissions(package: &Package) -> Vec<Finding> {
    let fm = &package.front_matter;
    let mut findings = Vec::new();
    for key in PERMISSION_KEYS {
        let Some(value) = fm.get(key) else {
            continue;
        };
        let broad: Vec<String> = permission_entries(value)
            .into_iter()
            .filter(|e| is_broad(e))
            .collect();
        if broad.is_empty() {
            continue;
        }
        let rule = RuleId::BroadPermission;
        let line = fm.line_of(key).map(|l| l as u32);
        findings.push(
            Finding::new(
                rule.id(),
                FindingCategory::Security,
                rule.severity(),
                format!("{}: '{}' grants {}", rule.title(), key, broad.join(", ")),
            )
            .at(&package.manifest_path, line)
            .with_suggestion(rule.suggestion()),
        );
    }
    findings
}

fn prompt_injection_guidance(package: &Package) -> Vec<Finding> {
    let body = package.body.to_lowercase();
    if body.contains("validat") || body.contains("sanitiz") {
        return Vec::new();
    }
    let first_mention = package.numbered_body_lines().find(|(_, line)| {
        let lower = line.to_lowercase();
        lower.contains("user input") || lower.contains("user data")
    });
    let Some((line_no, line)) = first_mention else {
        return Vec::new();
    };
    let rule = RuleId::PromptInjectionGuidance;
    vec![Finding::new(
        rule.id(),
        FindingCategory::Security,
        rule.severity(),
        format!("{}: {}", rule.title(), snippet(line)),
    )
    .at(&package.manifest_path, Some(line_no as u32))
    .with_suggestion(rule.suggestion())]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Severity;
    use crate::package::tests::{manifest_with_body, test_package};

    fn scan(files: &[(&str, &str)]) -> SecurityReport {
        let (_dir, package) = test_package(files);
        scan_package(&package, &SecurityConfig::default())
    }

    #[test]
    fn test_interpolated_shell_call_is_one_critical() {
        let manifest = manifest_with_body("Run `scripts/convert.py`.\n");
        let report = scan(&[
            ("SKILL.md", &manifest),
            (
                "scripts/convert.py",
                "import os\n\ndef convert(name):\n    os.system(f\"convert {name} out.png\")\n",
            ),
        ]);
        assert_eq!(report.findings.len(), 1, "{:?}", report.findings);
        let f = &report.findings[0];
        assert_eq!(f.severity, Severity::Critical);
        assert_eq!(f.rule, "shell-interpolation");
        assert_eq!(f.file.as_deref(), Some("scripts/convert.py"));
        assert_eq!(f.line, Some(4));
    }

    #[test]
    fn test_interpolated_js_exec_is_shell_only() {
        let manifest = manifest_with_body("Run `scripts/run.js`.\n");
        let report = scan(&[
            ("SKILL.md", &manifest),
            (
                "scripts/run.js",
                "const { exec } = require('child_process');\nexec(`ls ${dir}`);\n",
            ),
        ]);
        assert_eq!(report.findings.len(), 1, "{:?}", report.findings);
        let f = &report.findings[0];
        assert_eq!(f.rule, "shell-interpolation");
        assert_eq!(f.severity, Severity::Critical);
        assert_eq!(f.line, Some(2));
    }

    #[test]
    fn test_plain_eval_still_reports_dynamic_code() {
        let report = scan(&[
            ("SKILL.md", &manifest_with_body("Body.\n")),
            ("scripts/run.js", "const out = eval(input);\n"),
        ]);
        let rules: Vec<&str> = report.findings.iter().map(|f| f.rule.as_str()).collect();
        assert_eq!(rules, vec!["dynamic-code-execution"]);
    }

    #[test]
    fn test_prose_url_is_not_a_network_call() {
        let manifest = manifest_with_body(
            "# Links\nThe API reference lives at https://example.com/api and is public.\n",
        );
        let report = scan(&[
            ("SKILL.md", &manifest),
            ("references/links.md", "More at http://example.org/docs.\n"),
        ]);
        assert!(report
            .findings
            .iter()
            .all(|f| f.rule != "outbound-network-call"));
        assert!(report.findings.is_empty());
    }

    #[test]
    fn test_fenced_code_in_manifest() {
        let manifest = manifest_with_body("# Example\n```python\ndata = pickle.load(fh)\n```\npickle.load(fh) in prose is fine\n");
        let report = scan(&[("SKILL.md", &manifest)]);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule, "unsafe-deserialization");
        assert_eq!(report.findings[0].line, Some(7));
    }

    #[test]
    fn test_one_finding_per_rule_per_line() {
        let report = scan(&[
            ("SKILL.md", &manifest_with_body("Body.\n")),
            ("scripts/a.py", "x = eval(a) + eval(b)\n"),
        ]);
        assert_eq!(
            report
                .findings
                .iter()
                .filter(|f| f.rule == "dynamic-code-execution")
                .count(),
            1
        );
    }

    #[test]
    fn test_secret_message_does_not_echo_value() {
        let report = scan(&[
            ("SKILL.md", &manifest_with_body("Body.\n")),
            ("scripts/cfg.py", "API_KEY = \"sk-abcdefghijklmnopqrstuvwxyz0123456789\"\n"),
        ]);
        assert_eq!(report.findings.len(), 1);
        assert!(!report.findings[0].message.contains("sk-abc"));
    }

    #[test]
    fn test_broad_permissions() {
        let manifest = "---\nname: demo\ndescription: Use when testing permissions\nallowed-tools: Bash, Read, Write(/tmp/*)\ntools:\n  - Bash(git:*)\n  - Read\n---\nBody.\n";
        let report = scan(&[("SKILL.md", manifest)]);
        assert_eq!(report.findings.len(), 1, "{:?}", report.findings);
        let f = &report.findings[0];
        assert_eq!(f.rule, "broad-permission");
        assert_eq!(f.line, Some(4));
        assert!(f.message.contains("Bash"));
    }

    #[test]
    fn test_prompt_injection_guidance() {
        let risky = manifest_with_body("# Flow\nTake the user input and pass it to the tool.\n");
        let report = scan(&[("SKILL.md", &risky)]);
        assert_eq!(report.findings.len(), 1);
        assert_eq!(report.findings[0].rule, "prompt-injection-guidance");
        assert_eq!(report.findings[0].line, Some(6));

        let safe = manifest_with_body("Take the user input.\nValidate it first.\n");
        assert!(scan(&[("SKILL.md", &safe)]).findings.is_empty());
    }

    #[test]
    fn test_disabled_rules() {
        let (_dir, package) = test_package(&[
            ("SKILL.md", &manifest_with_body("Body.\n")),
            ("scripts/net.py", "requests.get('https://example.com')\n"),
        ]);
        let config = SecurityConfig {
            disabled_rules: vec!["outbound-network-call".into()],
        };
        assert!(scan_package(&package, &config).findings.is_empty());
        assert_eq!(
            scan_package(&package, &SecurityConfig::default()).findings.len(),
            1
        );
    }
}
