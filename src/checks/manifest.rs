//! Structure checks on the manifest and package layout

use super::{check_finding, Check, CheckContext};
use crate::models::{Finding, FindingCategory, Severity};
use crate::package::FileRole;

const MAX_NAME_LEN: usize = 64;
const BODY_SPLIT_LINES: usize = 500;
const ROOT_SCRIPT_EXTENSIONS: &[&str] = &["py", "sh"];

/// `name` and `description` must be present and non-empty.
pub struct RequiredFieldsCheck;

impl Check for RequiredFieldsCheck {
    fn name(&self) -> &'static str {
        "required-field"
    }

    fn description(&self) -> &'static str {
        "Detects manifests missing the name or description field"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Structure
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let fm = &ctx.package.front_matter;
        ["name", "description"]
            .into_iter()
            .filter(|key| !fm.get_str(key).is_some_and(|v| !v.trim().is_empty()))
            .map(|key| {
                check_finding(
                    self,
                    Severity::High,
                    format!("Missing required front matter field '{}'", key),
                )
                .at(&ctx.package.manifest_path, Some(fm.start_line as u32))
                .with_suggestion(format!("Add a '{}:' line to the front matter", key))
            })
            .collect()
    }
}

fn is_kebab_case(name: &str) -> bool {
    !name.is_empty()
        && !name.starts_with('-')
        && !name.ends_with('-')
        && !name.contains("--")
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}

/// Package names are kebab-case and at most 64 characters.
pub struct NameFormatCheck;

impl Check for NameFormatCheck {
    fn name(&self) -> &'static str {
        "name-format"
    }

    fn description(&self) -> &'static str {
        "Detects package names that are not short kebab-case identifiers"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Structure
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let fm = &ctx.package.front_matter;
        let Some(name) = fm.get_str("name").map(str::trim).filter(|n| !n.is_empty()) else {
            return vec![];
        };

        let mut problems = Vec::new();
        if !is_kebab_case(name) {
            problems.push("is not kebab-case".to_string());
        }
        let len = name.chars().count();
        if len > MAX_NAME_LEN {
            problems.push(format!("is {} characters (max {})", len, MAX_NAME_LEN));
        }
        if problems.is_empty() {
            return vec![];
        }

        let line = fm.line_of("name").map(|l| l as u32);
        vec![check_finding(
            self,
            Severity::Medium,
            format!("Name '{}' {}", name, problems.join(" and ")),
        )
        .at(&ctx.package.manifest_path, line)
        .with_suggestion("Use lowercase letters, digits and single hyphens, e.g. 'pdf-tools'")]
    }
}

/// Scripts belong in `scripts/`.
pub struct RootScriptsCheck;

impl Check for RootScriptsCheck {
    fn name(&self) -> &'static str {
        "root-scripts"
    }

    fn description(&self) -> &'static str {
        "Detects helper scripts at the package root when there is no scripts/ folder"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Structure
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let package = ctx.package;
        if package.has_dir("scripts") {
            return vec![];
        }
        package
            .files_with_role(FileRole::Asset)
            .filter(|f| f.dir().is_empty())
            .filter(|f| f.extension().is_some_and(|e| ROOT_SCRIPT_EXTENSIONS.contains(&e)))
            .map(|f| {
                check_finding(
                    self,
                    Severity::Low,
                    format!("Script '{}' sits at the package root", f.path),
                )
                .at(&f.path, None)
                .with_suggestion("Move helper scripts into scripts/")
            })
            .collect()
    }
}

/// Very long bodies should be split into reference files.
pub struct BodyWithoutReferencesCheck;

impl Check for BodyWithoutReferencesCheck {
    fn name(&self) -> &'static str {
        "body-without-references"
    }

    fn description(&self) -> &'static str {
        "Detects bodies over 500 lines in packages without a references/ folder"
    }

    fn category(&self) -> FindingCategory {
        FindingCategory::Structure
    }

    fn run(&self, ctx: &CheckContext) -> Vec<Finding> {
        let package = ctx.package;
        let lines = package.body_lines();
        if lines <= BODY_SPLIT_LINES || package.has_dir("references") {
            return vec![];
        }
        vec![check_finding(
            self,
            Severity::Low,
            format!(
                "Body has {} lines but the package has no references/ folder",
                lines
            ),
        )
        .at(&package.manifest_path, None)
        .with_suggestion("Move detailed sections into references/ and link them")]
    }
}
