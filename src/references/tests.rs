use super::*;
use crate::package::tests::{manifest_with_body, test_package};

fn run(files: &[(&str, &str)]) -> ReferenceReport {
    let (_dir, package) = test_package(files);
    validate_references(&package, &ReferencesConfig::default())
}

fn rules(report: &ReferenceReport, rule: &str) -> Vec<Finding> {
    report
        .findings
        .iter()
        .filter(|f| f.rule == rule)
        .cloned()
        .collect()
}

#[test]
fn test_resolved_links_are_not_orphans() {
    let manifest = manifest_with_body("# Usage\nRead [the guide](references/guide.md).\n");
    let report = run(&[
        ("SKILL.md", &manifest),
        ("references/guide.md", "# Guide\n"),
    ]);
    assert!(report.findings.is_empty(), "{:?}", report.findings);
    assert_eq!(report.edges.len(), 1);
    assert_eq!(report.edges[0].resolved.as_deref(), Some("references/guide.md"));
    assert_eq!(report.edges[0].line, 6);
}

#[test]
fn test_broken_reference_reported_once_at_line() {
    let manifest = manifest_with_body(
        "# Usage\nintro\nSee [x](references/missing.md) and `references/missing.md`.\n",
    );
    let report = run(&[("SKILL.md", &manifest)]);
    let broken = rules(&report, "broken-reference");
    assert_eq!(broken.len(), 1);
    assert_eq!(broken[0].severity, Severity::High);
    assert_eq!(broken[0].file.as_deref(), Some("SKILL.md"));
    assert_eq!(broken[0].line, Some(7));
}

#[test]
fn test_orphan_detection() {
    let manifest = manifest_with_body("Use [a](references/a.md).\n");
    let report = run(&[
        ("SKILL.md", &manifest),
        ("references/a.md", "linked\n"),
        ("references/b.md", "never linked\n"),
        ("scripts/tool.py", "print(1)\n"),
        ("assets/logo.txt", "assets are never orphans\n"),
    ]);
    assert_eq!(report.orphans, vec!["references/b.md", "scripts/tool.py"]);
    let orphans = rules(&report, "orphan-file");
    assert_eq!(orphans.len(), 2);
    assert!(orphans.iter().all(|f| f.severity == Severity::Low));
}

#[test]
fn test_self_reference_does_not_count() {
    let manifest = manifest_with_body("No links here.\n");
    let report = run(&[
        ("SKILL.md", &manifest),
        ("references/loop.md", "See [me](loop.md).\n"),
    ]);
    assert_eq!(report.orphans, vec!["references/loop.md"]);
}

#[test]
fn test_reference_files_link_relative_to_own_dir() {
    let manifest = manifest_with_body("Start with [index](references/index.md).\n");
    let report = run(&[
        ("SKILL.md", &manifest),
        ("references/index.md", "Then [details](api/details.md) and [up](../scripts/run.sh).\n"),
        ("references/api/details.md", "details\n"),
        ("scripts/run.sh", "echo hi\n"),
    ]);
    assert!(report.findings.is_empty(), "{:?}", report.findings);
    assert!(report.orphans.is_empty());
}

#[test]
fn test_entrypoints_exempt_from_orphans() {
    let manifest = "---\nname: demo\ndescription: Use when testing entrypoints\nentrypoint: ./scripts/main.py\nmetadata:\n  entrypoints: [scripts/extra.py]\n---\nBody.\n";
    let (_dir, package) = test_package(&[
        ("SKILL.md", manifest),
        ("scripts/main.py", "main\n"),
        ("scripts/extra.py", "extra\n"),
        ("scripts/cli.py", "cli\n"),
        ("scripts/lonely.py", "lonely\n"),
    ]);
    let config = ReferencesConfig {
        entrypoints: vec!["scripts/cli.py".into()],
    };
    let report = validate_references(&package, &config);
    assert_eq!(report.orphans, vec!["scripts/lonely.py"]);
    assert_eq!(
        report.entrypoints,
        vec!["scripts/cli.py", "scripts/extra.py", "scripts/main.py"]
    );
}

#[test]
fn test_basename_fallback_and_ambiguity() {
    let manifest = manifest_with_body("Read `unique.md`.\nAlso `notes.md`.\n");
    let report = run(&[
        ("SKILL.md", &manifest),
        ("references/deep/unique.md", "u\n"),
        ("references/a/notes.md", "a\n"),
        ("references/b/notes.md", "b\n"),
    ]);

    let ambiguous = rules(&report, "ambiguous-reference");
    assert_eq!(ambiguous.len(), 1);
    assert_eq!(ambiguous[0].severity, Severity::Medium);
    assert!(ambiguous[0].message.contains("references/a/notes.md"));

    let notes = report.edges.iter().find(|e| e.target == "notes.md").unwrap();
    assert_eq!(notes.resolved.as_deref(), Some("references/a/notes.md"));
    assert!(rules(&report, "broken-reference").is_empty());
    // b/notes.md lost the tie-break and nobody else links it
    assert_eq!(report.orphans, vec!["references/b/notes.md"]);
}

#[test]
fn test_unique_suffix_match_with_directory_is_silent() {
    let manifest = manifest_with_body("Read [guide](api/guide.md).\n");
    let report = run(&[
        ("SKILL.md", &manifest),
        ("references/api/guide.md", "guide\n"),
    ]);
    assert!(rules(&report, "ambiguous-reference").is_empty(), "{:?}", report.findings);
    assert!(report.findings.is_empty(), "{:?}", report.findings);
    assert_eq!(report.edges[0].resolved.as_deref(), Some("references/api/guide.md"));
}

#[test]
fn test_source_relative_resolution_wins_over_root() {
    let manifest = manifest_with_body("Start with [index](references/index.md).\n");
    let report = run(&[
        ("SKILL.md", &manifest),
        ("references/index.md", "See [x](x.md) and [nested](references/x.md).\n"),
        ("references/x.md", "top\n"),
        ("references/references/x.md", "nested\n"),
    ]);
    assert!(report.findings.is_empty(), "{:?}", report.findings);
    let resolved = |target: &str| {
        report
            .edges
            .iter()
            .find(|e| e.source == "references/index.md" && e.target == target)
            .and_then(|e| e.resolved.clone())
    };
    assert_eq!(resolved("x.md").as_deref(), Some("references/x.md"));
    assert_eq!(
        resolved("references/x.md").as_deref(),
        Some("references/references/x.md")
    );
    assert!(report.orphans.is_empty());
}

#[test]
fn test_urls_are_prose_mentions_never_broken() {
    let manifest = manifest_with_body("Docs at [site](https://example.com/docs.md).\n[mail](mailto:x@y.z)\n");
    let report = run(&[("SKILL.md", &manifest)]);
    assert!(report.findings.is_empty());
    assert!(report.edges.iter().all(|e| e.kind == EdgeKind::ProseMention));
    assert!(report.edges.iter().all(|e| !e.is_broken()));
}

#[test]
fn test_escaping_root_is_broken() {
    let manifest = manifest_with_body("See [secret](../outside.md).\n");
    let report = run(&[("SKILL.md", &manifest)]);
    assert_eq!(rules(&report, "broken-reference").len(), 1);
}

#[test]
fn test_anchor_suffix_stripped() {
    let manifest = manifest_with_body("See [part](references/a.md#part-two).\n");
    let report = run(&[("SKILL.md", &manifest), ("references/a.md", "a\n")]);
    assert!(report.findings.is_empty());
}
