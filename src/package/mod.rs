//! In-memory package model
//!
//! A package is a directory holding a `SKILL.md` manifest (YAML front matter
//! plus a markdown body), optional `scripts/` and `references/` folders, and
//! any other assets. [`load_package`] reads it once; every analyzer works on
//! the resulting immutable [`Package`].

mod blocks;
mod loader;
mod manifest;

pub use blocks::{parse_heading, split_blocks, ContentBlock, FenceTracker};
pub use loader::{load_package, LoadOptions};
pub use manifest::ManifestFrontMatter;
pub(crate) use manifest::value_strings;

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Primary manifest file name
pub const MANIFEST_FILE: &str = "SKILL.md";
/// Accepted lowercase fallback
pub const MANIFEST_FILE_FALLBACK: &str = "skill.md";

/// What a file is for, decided by its location in the package.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileRole {
    Manifest,
    Script,
    Reference,
    Asset,
}

impl FileRole {
    pub fn classify(rel_path: &str, manifest_path: &str) -> Self {
        if rel_path == manifest_path {
            FileRole::Manifest
        } else if rel_path.starts_with("scripts/") {
            FileRole::Script
        } else if rel_path.starts_with("references/") {
            FileRole::Reference
        } else {
            FileRole::Asset
        }
    }

    /// Priority tier a file gets unless overridden.
    pub fn default_priority(&self) -> PriorityTier {
        match self {
            FileRole::Manifest => PriorityTier::Critical,
            FileRole::Reference => PriorityTier::Important,
            FileRole::Script | FileRole::Asset => PriorityTier::Optional,
        }
    }
}

impl std::fmt::Display for FileRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            FileRole::Manifest => write!(f, "manifest"),
            FileRole::Script => write!(f, "script"),
            FileRole::Reference => write!(f, "reference"),
            FileRole::Asset => write!(f, "asset"),
        }
    }
}

/// Budget priority of a file
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PriorityTier {
    Critical,
    Important,
    Optional,
}

impl std::str::FromStr for PriorityTier {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "critical" => Ok(PriorityTier::Critical),
            "important" => Ok(PriorityTier::Important),
            "optional" => Ok(PriorityTier::Optional),
            other => anyhow::bail!(
                "Unknown priority tier '{}'. Valid: critical, important, optional",
                other
            ),
        }
    }
}

impl std::fmt::Display for PriorityTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PriorityTier::Critical => write!(f, "critical"),
            PriorityTier::Important => write!(f, "important"),
            PriorityTier::Optional => write!(f, "optional"),
        }
    }
}

/// A file discovered in the package tree.
#[derive(Debug, Clone)]
pub struct FileNode {
    /// Package-relative path with forward slashes
    pub path: String,
    pub size: u64,
    pub lines: usize,
    pub role: FileRole,
    pub priority: PriorityTier,
    /// `None` for binary files
    pub text: Option<String>,
}

impl FileNode {
    pub fn is_binary(&self) -> bool {
        self.text.is_none()
    }

    pub fn file_name(&self) -> &str {
        self.path.rsplit('/').next().unwrap_or(&self.path)
    }

    /// Directory part of the path, empty at the package root.
    pub fn dir(&self) -> &str {
        self.path.rsplit_once('/').map_or("", |(dir, _)| dir)
    }

    pub fn extension(&self) -> Option<&str> {
        let name = self.file_name();
        name.rsplit_once('.')
            .map(|(_, ext)| ext)
            .filter(|_| !name.starts_with('.'))
    }
}

/// A loaded package. Immutable once built.
#[derive(Debug, Clone)]
pub struct Package {
    pub root: PathBuf,
    /// Front matter `name`, or the directory name when absent
    pub name: String,
    pub manifest_path: String,
    pub front_matter: ManifestFrontMatter,
    pub body: String,
    /// Manifest line on which the body starts
    pub body_start_line: usize,
    pub manifest_lines: usize,
    pub blocks: Vec<ContentBlock>,
    /// Sorted by path
    pub files: Vec<FileNode>,
    /// Every directory seen in the walk, package-relative, sorted
    pub directories: Vec<String>,
}

impl Package {
    pub fn file(&self, path: &str) -> Option<&FileNode> {
        self.files
            .binary_search_by(|f| f.path.as_str().cmp(path))
            .ok()
            .map(|i| &self.files[i])
    }

    pub fn files_with_role(&self, role: FileRole) -> impl Iterator<Item = &FileNode> {
        self.files.iter().filter(move |f| f.role == role)
    }

    pub fn manifest(&self) -> Option<&FileNode> {
        self.file(&self.manifest_path)
    }

    pub fn has_dir(&self, dir: &str) -> bool {
        self.directories.binary_search_by(|d| d.as_str().cmp(dir)).is_ok()
    }

    pub fn body_lines(&self) -> usize {
        self.body.lines().count()
    }

    /// Iterate body lines as `(manifest_line, text)`.
    pub fn numbered_body_lines(&self) -> impl Iterator<Item = (usize, &str)> {
        self.body
            .lines()
            .enumerate()
            .map(move |(i, line)| (self.body_start_line + i, line))
    }
}
