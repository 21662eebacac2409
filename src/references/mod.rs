//! Reference graph validation
//!
//! Every manifest body block and every reference file is scanned for
//! references to other package files. Targets are resolved into a directed
//! graph over the package's files; unresolved targets are broken references
//! and reference/script files nobody points at are orphans.
//!
//! Resolution order for a target:
//! 1. relative to the referencing file's directory
//! 2. relative to the package root
//! 3. basename match over all files (lexicographically first wins; more
//!    than one candidate is reported as ambiguous)

mod extract;
mod resolve;

pub use extract::{extract_references, has_scheme, looks_like_path, RawReference, KNOWN_EXTENSIONS};
pub use resolve::{clean_target, normalize_join, resolve, Resolution};

use crate::config::ReferencesConfig;
use crate::models::{Finding, FindingCategory, Severity};
use crate::package::{value_strings, FileRole, Package};
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::Direction;
use rustc_hash::FxHashMap;
use serde::Serialize;
use std::collections::{BTreeSet, HashSet};
use tracing::debug;

/// Front matter keys naming entrypoint files
const ENTRYPOINT_KEYS: &[&[&str]] = &[
    &["entrypoint"],
    &["entrypoints"],
    &["entry_point"],
    &["metadata", "entrypoints"],
];

/// How a reference was written
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum EdgeKind {
    MarkdownLink,
    CodePath,
    ProseMention,
}

/// A directed reference from a source location to a target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReferenceEdge {
    pub source: String,
    pub line: usize,
    /// Target as written
    pub target: String,
    /// Resolved package path, or `None` when broken or external
    pub resolved: Option<String>,
    pub kind: EdgeKind,
}

impl ReferenceEdge {
    pub fn is_broken(&self) -> bool {
        self.resolved.is_none() && self.kind != EdgeKind::ProseMention
    }
}

/// Output of reference validation.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ReferenceReport {
    pub edges: Vec<ReferenceEdge>,
    pub orphans: Vec<String>,
    pub entrypoints: Vec<String>,
    pub findings: Vec<Finding>,
}

/// Build the reference graph and report broken, ambiguous and orphaned files.
pub fn validate_references(package: &Package, config: &ReferencesConfig) -> ReferenceReport {
    let mut report = ReferenceReport::default();

    let mut graph: DiGraph<&str, EdgeKind> = DiGraph::new();
    let nodes: FxHashMap<&str, NodeIndex> = package
        .files
        .iter()
        .map(|f| (f.path.as_str(), graph.add_node(f.path.as_str())))
        .collect();

    let mut seen: HashSet<(String, usize, String)> = HashSet::new();
    for (source, source_dir, raw) in collect_raw(package) {
        if !seen.insert((source.to_string(), raw.line, raw.target.clone())) {
            continue;
        }
        let edge = resolve_edge(package, source, source_dir, raw, &mut report.findings);
        if let (Some(from), Some(to)) = (
            nodes.get(edge.source.as_str()),
            edge.resolved.as_deref().and_then(|p| nodes.get(p)),
        ) {
            graph.add_edge(*from, *to, edge.kind);
        }
        report.edges.push(edge);
    }

    report.entrypoints = entrypoints(package, config);
    let exempt: BTreeSet<&str> = report.entrypoints.iter().map(String::as_str).collect();

    for file in &package.files {
        if !matches!(file.role, FileRole::Reference | FileRole::Script)
            || exempt.contains(file.path.as_str())
        {
            continue;
        }
        let Some(idx) = nodes.get(file.path.as_str()) else {
            continue;
        };
        let referenced = graph
            .neighbors_directed(*idx, Direction::Incoming)
            .any(|n| n != *idx);
        if !referenced {
            report.orphans.push(file.path.clone());
            report.findings.push(
                Finding::new(
                    "orphan-file",
                    FindingCategory::Reference,
                    Severity::Low,
                    format!("'{}' is never referenced from the manifest or other references", file.path),
                )
                .at(&file.path, None)
                .with_suggestion("Link it from SKILL.md or a reference file, or delete it"),
            );
        }
    }

    debug!(
        "Reference graph for '{}': {} edges, {} broken, {} orphans",
        package.name,
        report.edges.len(),
        report.edges.iter().filter(|e| e.is_broken()).count(),
        report.orphans.len()
    );
    report
}

/// Raw references with their source file and that file's directory.
fn collect_raw(package: &Package) -> Vec<(&str, &str, RawReference)> {
    let mut out = Vec::new();
    let manifest = package.manifest_path.as_str();
    let manifest_dir = manifest.rsplit_once('/').map_or("", |(d, _)| d);

    for block in &package.blocks {
        for raw in extract_references(&block.text, block.start_line) {
            out.push((manifest, manifest_dir, raw));
        }
    }
    for file in package.files_with_role(FileRole::Reference) {
        let Some(text) = file.text.as_deref() else {
            continue;
        };
        for raw in extract_references(text, 1) {
            out.push((file.path.as_str(), file.dir(), raw));
        }
    }
    out
}

fn resolve_edge(
    package: &Package,
    source: &str,
    source_dir: &str,
    raw: RawReference,
    findings: &mut Vec<Finding>,
) -> ReferenceEdge {
    let cleaned = clean_target(&raw.target);
    let line = raw.line as u32;

    let resolved = match resolve(package, source_dir, &cleaned) {
        Resolution::File(path) | Resolution::Directory(path) => Some(path),
        Resolution::Fallback {
            chosen,
            candidates,
            silent,
        } => {
            if !silent {
                findings.push(
                    Finding::new(
                        "ambiguous-reference",
                        FindingCategory::Reference,
                        Severity::Medium,
                        format!(
                            "Ambiguous reference '{}' matches {}; resolved to '{}'",
                            raw.target,
                            candidates.join(", "),
                            chosen
                        ),
                    )
                    .at(source, Some(line))
                    .with_suggestion(format!("Use the full package path, e.g. '{chosen}'")),
                );
            }
            Some(chosen)
        }
        Resolution::External => None,
        Resolution::Broken => {
            findings.push(
                Finding::new(
                    "broken-reference",
                    FindingCategory::Reference,
                    Severity::High,
                    format!("Broken reference: '{}' does not exist in the package", raw.target),
                )
                .at(source, Some(line)),
            );
            None
        }
    };

    let kind = if has_scheme(&cleaned) {
        EdgeKind::ProseMention
    } else {
        raw.kind
    };

    ReferenceEdge {
        source: source.to_string(),
        line: raw.line,
        target: raw.target,
        resolved,
        kind,
    }
}

/// Files exempt from orphan detection, normalised to package paths.
fn entrypoints(package: &Package, config: &ReferencesConfig) -> Vec<String> {
    let mut out = BTreeSet::new();
    for path in ENTRYPOINT_KEYS {
        if let Some(value) = package.front_matter.lookup(path) {
            out.extend(value_strings(value));
        }
    }
    out.extend(config.entrypoints.iter().cloned());
    out.into_iter()
        .filter_map(|p| normalize_join("", &clean_target(&p)))
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect()
}

#[cfg(test)]
mod tests;
