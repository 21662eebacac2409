//! Target resolution against the package file tree

use super::extract::has_scheme;
use crate::package::Package;

/// Outcome of resolving one target string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// Matched a file directly
    File(String),
    /// Matched a directory of the package
    Directory(String),
    /// Matched by basename only; `candidates` is sorted and non-empty
    Fallback {
        chosen: String,
        candidates: Vec<String>,
        /// Exactly one file matched the suffix
        silent: bool,
    },
    /// Has a scheme; never resolved, never broken
    External,
    Broken,
}

/// Strip fragment, query and leading `./`; decode `%20`.
pub fn clean_target(target: &str) -> String {
    let end = target.find(['#', '?']).unwrap_or(target.len());
    let path = &target[..end];
    let path = path.strip_prefix("./").unwrap_or(path);
    path.replace("%20", " ")
}

/// Join `rel` onto `base` and collapse `.`/`..`; `None` if it escapes the root.
pub fn normalize_join(base: &str, rel: &str) -> Option<String> {
    let mut parts: Vec<&str> = base.split('/').filter(|p| !p.is_empty()).collect();
    for segment in rel.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                parts.pop()?;
            }
            other => parts.push(other),
        }
    }
    Some(parts.join("/"))
}

/// Resolve a cleaned target referenced from a file in `source_dir`.
pub fn resolve(package: &Package, source_dir: &str, target: &str) -> Resolution {
    if has_scheme(target) {
        return Resolution::External;
    }
    if target.is_empty() || target.starts_with('/') {
        return Resolution::Broken;
    }

    let mut escaped = false;
    for base in [source_dir, ""] {
        match normalize_join(base, target) {
            Some(path) if package.file(&path).is_some() => return Resolution::File(path),
            Some(path) if !path.is_empty() && package.has_dir(&path) => {
                return Resolution::Directory(path)
            }
            Some(_) => {}
            None => escaped = true,
        }
    }
    if escaped || target.split('/').any(|s| s == "..") {
        return Resolution::Broken;
    }

    let suffix = format!("/{target}");
    let candidates: Vec<String> = package
        .files
        .iter()
        .filter(|f| f.path == target || f.path.ends_with(&suffix))
        .map(|f| f.path.clone())
        .collect();

    match candidates.first() {
        None => Resolution::Broken,
        Some(first) => Resolution::Fallback {
            chosen: first.clone(),
            silent: candidates.len() == 1,
            candidates,
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_target() {
        assert_eq!(clean_target("./references/a.md#section"), "references/a.md");
        assert_eq!(clean_target("guide.md?raw=1"), "guide.md");
        assert_eq!(clean_target("my%20notes.md"), "my notes.md");
        assert_eq!(clean_target("#only"), "");
    }

    #[test]
    fn test_normalize_join() {
        assert_eq!(normalize_join("references", "a.md").as_deref(), Some("references/a.md"));
        assert_eq!(
            normalize_join("references/api", "../b.md").as_deref(),
            Some("references/b.md")
        );
        assert_eq!(normalize_join("", "./x/./y.md").as_deref(), Some("x/y.md"));
        assert_eq!(normalize_join("", "../outside.md"), None);
        assert_eq!(normalize_join("references", "../../etc/passwd"), None);
    }
}
