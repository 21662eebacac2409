//! Package directory walker

use super::blocks::split_blocks;
use super::manifest::split_manifest;
use super::{FileNode, FileRole, Package, PriorityTier, MANIFEST_FILE, MANIFEST_FILE_FALLBACK};
use crate::error::LoadError;
use ignore::WalkBuilder;
use std::collections::BTreeMap;
use std::path::Path;
use tracing::{debug, warn};

/// System paths never considered part of a package
const SYSTEM_NAMES: &[&str] = &["__pycache__", "node_modules", ".DS_Store"];

/// Options applied while loading.
#[derive(Debug, Clone, Default)]
pub struct LoadOptions {
    /// Package-relative path -> tier, applied after role defaults
    pub priority_overrides: BTreeMap<String, PriorityTier>,
}

/// Read a package directory into memory.
pub fn load_package(root: &Path, options: &LoadOptions) -> Result<Package, LoadError> {
    if !root.is_dir() {
        return Err(LoadError::PackageNotFound {
            path: root.to_path_buf(),
            reason: "not a directory".into(),
        });
    }

    let manifest_path = [MANIFEST_FILE, MANIFEST_FILE_FALLBACK]
        .into_iter()
        .find(|name| root.join(name).is_file())
        .ok_or_else(|| LoadError::PackageNotFound {
            path: root.to_path_buf(),
            reason: format!("no {MANIFEST_FILE} manifest"),
        })?
        .to_string();

    let manifest_abs = root.join(&manifest_path);
    let manifest_text = read_text(&manifest_abs)?.unwrap_or_default();
    let split = split_manifest(&manifest_abs, &manifest_text)?;
    debug!(
        "Parsed manifest {} ({} front matter keys)",
        manifest_abs.display(),
        split.front_matter.fields.len()
    );

    let (mut files, directories) = walk(root, &manifest_path)?;
    for file in &mut files {
        if let Some(tier) = options.priority_overrides.get(&file.path) {
            file.priority = *tier;
        }
    }
    for path in options.priority_overrides.keys() {
        if files.binary_search_by(|f| f.path.as_str().cmp(path)).is_err() {
            warn!("Priority override for unknown file '{}' ignored", path);
        }
    }

    let name = split
        .front_matter
        .name()
        .map(str::to_string)
        .or_else(|| {
            root.canonicalize()
                .ok()
                .and_then(|p| p.file_name().map(|n| n.to_string_lossy().into_owned()))
        })
        .unwrap_or_else(|| root.display().to_string());

    let blocks = split_blocks(&split.body, split.body_start_line);
    debug!(
        "Loaded package '{}': {} files, {} content blocks",
        name,
        files.len(),
        blocks.len()
    );

    Ok(Package {
        root: root.to_path_buf(),
        name,
        manifest_lines: manifest_text.lines().count(),
        manifest_path,
        front_matter: split.front_matter,
        body: split.body,
        body_start_line: split.body_start_line,
        blocks,
        files,
        directories,
    })
}

fn walk(root: &Path, manifest_path: &str) -> Result<(Vec<FileNode>, Vec<String>), LoadError> {
    let walker = WalkBuilder::new(root)
        .hidden(true)
        .git_ignore(false)
        .git_global(false)
        .git_exclude(false)
        .ignore(false)
        .parents(false)
        .follow_links(false)
        .filter_entry(|entry| {
            let name = entry.file_name().to_string_lossy();
            !SYSTEM_NAMES.contains(&name.as_ref())
        })
        .build();

    let mut files = Vec::new();
    let mut directories = Vec::new();

    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                warn!("Skipping unreadable entry under {}: {}", root.display(), e);
                continue;
            }
        };
        let path = entry.path();
        let Some(rel) = relative_path(root, path) else {
            continue;
        };
        let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
        if is_dir {
            directories.push(rel);
            continue;
        }
        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let size = std::fs::metadata(path)
            .map_err(|e| LoadError::io(path, e))?
            .len();
        let text = read_text(path)?;
        let role = FileRole::classify(&rel, manifest_path);
        files.push(FileNode {
            lines: text.as_deref().map_or(0, |t| t.lines().count()),
            priority: role.default_priority(),
            path: rel,
            size,
            role,
            text,
        });
    }

    files.sort_by(|a, b| a.path.cmp(&b.path));
    directories.sort();
    Ok((files, directories))
}

/// Forward-slash relative path; `None` for the root itself.
fn relative_path(root: &Path, path: &Path) -> Option<String> {
    let rel = path.strip_prefix(root).ok()?;
    let parts: Vec<String> = rel
        .components()
        .map(|c| c.as_os_str().to_string_lossy().into_owned())
        .collect();
    if parts.is_empty() {
        None
    } else {
        Some(parts.join("/"))
    }
}

/// Read a file as text; `None` when it contains NUL bytes.
fn read_text(path: &Path) -> Result<Option<String>, LoadError> {
    let bytes = std::fs::read(path).map_err(|e| LoadError::io(path, e))?;
    if bytes.contains(&0) {
        return Ok(None);
    }
    Ok(Some(String::from_utf8_lossy(&bytes).into_owned()))
}
