//! Content checks: description quality, body organisation, examples

use super::{check_finding, Check, CheckContext};
use crate::models::{Finding, FindingCategory, Severity};
use crate::package::{FenceTracker, FileRole};
use regex::Regex;
use std::sync::OnceLock;

const DESCRIPTION_MIN_CHARS: usize = 20;
const DESCRIPTION_MAX_CHARS: usize = 1024;

/// Phrases telling the runtime when to activate the package.
const TRIGGER_PHRASES: &[&str] = &[
    "use when",
    "trigger on",
    "for tasks involving",
    "activate when",
    "applies to",
    "when the user",
];

const HEADING_CHECK_LINES: usize = 100;
const MIN_HEADINGS: usize = 3;
const EXAMPLE_CHECK_LINES: usize = 50;
const LONG_BODY_LINES: usize = 350;
const TOC_CHECK_LINES: usize = 100;
const TOC_WINDOW_CHARS: usize = 500;

fn toc_link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"\[.*\]\(#.*\)").expect("valid regex"))
}

fn description_line(ctx: &CheckContext) -> Option<u32> {
    ctx.package
        .front_matter
        .line_of("description")
        .map(|l| l as u32)
}

pub struct DescriptionLengthCheck;

impl Check for DescriptionLengthCheck {
    fn name(&self) -> &'static str {
        "description-length"
    }

    fn description(&self) -> &'static str {
        "Detects descriptions that are too short to route on or too long to keep in context"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Content
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some(description) = ctx.package.front_matter.description() else {
            return vec![];
        };
        let len = description.trim().chars().count();
        let (severity, message, suggestion) = if len == 0 {
            return vec![];
        } else if len < DESCRIPTION_MIN_CHARS {
            (
                Severity::Medium,
                format!(
                    "Description is {} characters (minimum {})",
                    len, DESCRIPTION_MIN_CHARS
                ),
                "Say what the package does and when to use it",
            )
        } else if len > DESCRIPTION_MAX_CHARS {
            (
                Severity::High,
                format!(
                    "Description is {} characters (maximum {})",
                    len, DESCRIPTION_MAX_CHARS
                ),
                "Shorten the description; move detail into the body",
            )
        } else {
            return vec![];
        };
        vec![check_finding(self, severity, message)
            .at(&ctx.package.manifest_path, description_line(ctx))
            .with_suggestion(suggestion)]
    }
}

pub struct TriggerPhraseCheck;

impl Check for TriggerPhraseCheck {
    fn name(&self) -> &'static str {
        "trigger-phrase"
    }

    fn description(&self) -> &'static str {
        "Detects descriptions that never say when the package applies"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Content
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let Some(description) = ctx
            .package
            .front_matter
            .description()
            .filter(|d| !d.trim().is_empty())
        else {
            return vec![];
        };
        let lower = description.to_lowercase();
        if TRIGGER_PHRASES.iter().any(|p| lower.contains(p)) {
            return vec![];
        }
        vec![check_finding(
            self,
            Severity::Medium,
            "Description has no trigger phrase such as 'Use when ...'",
        )
        .at(&ctx.package.manifest_path, description_line(ctx))
        .with_suggestion("Add a sentence starting with 'Use when' describing the tasks it handles")]
    }
}

pub struct HeadingDensityCheck;

impl Check for HeadingDensityCheck {
    fn name(&self) -> &'static str {
        "few-headings"
    }

    fn description(&self) -> &'static str {
        "Detects long bodies with too few headings to navigate"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Content
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let package = ctx.package;
        let lines = package.body_lines();
        let headings = package.blocks.iter().filter(|b| b.level > 0).count();
        if lines <= HEADING_CHECK_LINES || headings >= MIN_HEADINGS {
            return vec![];
        }
        vec![check_finding(
            self,
            Severity::Medium,
            format!(
                "Body has {} lines but only {} heading(s)",
                lines, headings
            ),
        )
        .at(&package.manifest_path, None)
        .with_suggestion("Organise the body into sections with markdown headings")]
    }
}

pub struct MissingExampleCheck;

impl Check for MissingExampleCheck {
    fn name(&self) -> &'static str {
        "missing-example"
    }

    fn description(&self) -> &'static str {
        "Detects substantial bodies without a single fenced code example"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Content
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let package = ctx.package;
        if package.body_lines() <= EXAMPLE_CHECK_LINES {
            return vec![];
        }
        let mut fence = FenceTracker::default();
        let has_example = package.body.lines().any(|line| fence.update(line));
        if has_example {
            return vec![];
        }
        vec![check_finding(self, Severity::Medium, "Body has no fenced code example")
            .at(&package.manifest_path, None)
            .with_suggestion("Show at least one concrete invocation in a fenced code block")]
    }
}

pub struct LongBodyCheck;

impl Check for LongBodyCheck {
    fn name(&self) -> &'static str {
        "long-body"
    }

    fn description(&self) -> &'static str {
        "Detects bodies over 350 lines that keep all detail inline"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Content
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let package = ctx.package;
        let lines = package.body_lines();
        if lines <= LONG_BODY_LINES || package.has_dir("references") {
            return vec![];
        }
        vec![check_finding(
            self,
            Severity::Low,
            format!("Body has {} lines with no references/ to offload detail", lines),
        )
        .at(&package.manifest_path, None)
        .with_suggestion("Keep the body to the workflow; move reference material into references/")]
    }
}

pub struct ReferenceTocCheck;

impl Check for ReferenceTocCheck {
    fn name(&self) -> &'static str {
        "reference-toc"
    }

    fn description(&self) -> &'static str {
        "Detects long reference documents without a table of contents"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Content
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let toc = toc_link_pattern();
        ctx.package
            .files_with_role(FileRole::Reference)
            .filter(|f| f.extension() == Some("md") && f.lines > TOC_CHECK_LINES)
            .filter_map(|f| {
                let text = f.text.as_deref()?;
                let head: String = text.chars().take(TOC_WINDOW_CHARS).collect();
                if toc.is_match(&head) {
                    return None;
                }
                Some(
                    check_finding(
                        self,
                        Severity::Low,
                        format!("{} has {} lines but no table of contents", f.path, f.lines),
                    )
                    .at(&f.path, None)
                    .with_suggestion("Start the file with a list of links to its sections"),
                )
            })
            .collect()
    }
}

pub struct EmptyBodyCheck;

impl Check for EmptyBodyCheck {
    fn name(&self) -> &'static str {
        "empty-body"
    }

    fn description(&self) -> &'static str {
        "Detects manifests with nothing after the front matter"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Content
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        if !ctx.package.body.trim().is_empty() {
            return vec![];
        }
        vec![check_finding(self, Severity::High, "Manifest body is empty")
            .at(&ctx.package.manifest_path, None)
            .with_suggestion("Describe the workflow the agent should follow")]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ValidationConfig;
    use crate::package::tests::{manifest_with_body, test_package};

    fn run_check(check: &dyn Check, files: &[(&str, &str)]) -> Vec<Finding> {
        let (_dir, package) = test_package(files);
        let config = ValidationConfig::default();
        check.run(&CheckContext {
            package: &package,
            config: &config,
        })
    }

    fn with_description(description: &str) -> String {
        format!("---\nname: demo\ndescription: {description}\n---\nBody.\n")
    }

    #[test]
    fn test_description_length() {
        let short = run_check(&DescriptionLengthCheck, &[("SKILL.md", &with_description("Too short"))]);
        assert_eq!(short.len(), 1);
        assert_eq!(short[0].severity, Severity::Medium);
        assert_eq!(short[0].line, Some(3));

        let long = with_description(&"word ".repeat(220));
        let long = run_check(&DescriptionLengthCheck, &[("SKILL.md", &long)]);
        assert_eq!(long[0].severity, Severity::High);

        let ok = with_description("Use when converting PDF files to text");
        assert!(run_check(&DescriptionLengthCheck, &[("SKILL.md", &ok)]).is_empty());
    }

    #[test]
    fn test_trigger_phrase() {
        let missing = with_description("Converts PDF files into plain text");
        assert_eq!(run_check(&TriggerPhraseCheck, &[("SKILL.md", &missing)]).len(), 1);

        for phrase in ["Use when the", "Applies to PDF", "Helps WHEN THE USER asks"] {
            let manifest = with_description(phrase);
            assert!(
                run_check(&TriggerPhraseCheck, &[("SKILL.md", &manifest)]).is_empty(),
                "{phrase}"
            );
        }
    }

    #[test]
    fn test_heading_density() {
        let flat = manifest_with_body(&format!("# Only\n{}", "Run it.\n".repeat(120)));
        assert_eq!(run_check(&HeadingDensityCheck, &[("SKILL.md", &flat)]).len(), 1);

        let sections: String = (0..3)
            .map(|i| format!("## Step {i}\n{}", "Run it.\n".repeat(40)))
            .collect();
        let organised = manifest_with_body(&sections);
        assert!(run_check(&HeadingDensityCheck, &[("SKILL.md", &organised)]).is_empty());
    }

    #[test]
    fn test_missing_example() {
        let prose = manifest_with_body(&"Run it.\n".repeat(51));
        assert_eq!(run_check(&MissingExampleCheck, &[("SKILL.md", &prose)]).len(), 1);

        let with_code = manifest_with_body(&format!("{}```bash\nls\n```\n", "Run it.\n".repeat(51)));
        assert!(run_check(&MissingExampleCheck, &[("SKILL.md", &with_code)]).is_empty());

        let short = manifest_with_body(&"Run it.\n".repeat(50));
        assert!(run_check(&MissingExampleCheck, &[("SKILL.md", &short)]).is_empty());
    }

    #[test]
    fn test_long_body() {
        let manifest = manifest_with_body(&"Run it.\n".repeat(351));
        assert_eq!(run_check(&LongBodyCheck, &[("SKILL.md", &manifest)]).len(), 1);
        assert!(run_check(
            &LongBodyCheck,
            &[("SKILL.md", &manifest), ("references/a.md", "a\n")]
        )
        .is_empty());
    }

    #[test]
    fn test_reference_toc() {
        let manifest = manifest_with_body("Body.\n");
        let plain = "Detail line.\n".repeat(101);
        let with_toc = format!("- [Setup](#setup)\n- [Usage](#usage)\n{}", plain);
        let findings = run_check(
            &ReferenceTocCheck,
            &[
                ("SKILL.md", &manifest),
                ("references/plain.md", &plain),
                ("references/toc.md", &with_toc),
                ("references/data.txt", &plain),
                ("references/short.md", "Short.\n"),
            ],
        );
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].file.as_deref(), Some("references/plain.md"));
    }

    #[test]
    fn test_empty_body() {
        let findings = run_check(&EmptyBodyCheck, &[("SKILL.md", "---\nname: demo\n---\n\n  \n")]);
        assert_eq!(findings.len(), 1);
        assert_eq!(findings[0].severity, Severity::High);
    }
}
