//! Manifest front matter
//!
//! A manifest opens with a `---` line, carries a YAML mapping, and closes at
//! the next line that is exactly `---`. Everything after the closing line is
//! the body.

use crate::error::LoadError;
use serde_yaml::{Mapping, Value};
use std::path::Path;

/// Parsed front matter plus the raw text it came from.
#[derive(Debug, Clone, Default)]
pub struct ManifestFrontMatter {
    /// Text between the delimiters, newlines included
    pub raw: String,
    pub fields: Mapping,
    /// Manifest line of the first front matter line (1-based)
    pub start_line: usize,
}

impl ManifestFrontMatter {
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn get_str(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(Value::as_str)
    }

    /// Walk nested mappings, e.g. `["metadata", "entrypoints"]`.
    pub fn lookup(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.fields.get(*first)?;
        for key in rest {
            current = current.as_mapping()?.get(*key)?;
        }
        Some(current)
    }

    /// String values at `path`, accepting a scalar or a sequence of scalars.
    pub fn strings_at(&self, path: &[&str]) -> Vec<String> {
        match self.lookup(path) {
            Some(value) => value_strings(value),
            None => Vec::new(),
        }
    }

    /// Numeric value at `path`; integers and floats both accepted.
    pub fn number_at(&self, path: &[&str]) -> Option<f64> {
        match self.lookup(path)? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        }
    }

    /// Manifest line on which a top-level key is declared.
    pub fn line_of(&self, key: &str) -> Option<usize> {
        self.raw.lines().enumerate().find_map(|(i, line)| {
            let trimmed = line.strip_prefix(key)?;
            trimmed
                .trim_start()
                .starts_with(':')
                .then_some(self.start_line + i)
        })
    }

    pub fn name(&self) -> Option<&str> {
        self.get_str("name").map(str::trim).filter(|s| !s.is_empty())
    }

    pub fn description(&self) -> Option<&str> {
        self.get_str("description")
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }
}

/// Flatten a YAML scalar or list into strings.
pub(crate) fn value_strings(value: &Value) -> Vec<String> {
    match value {
        Value::String(s) => vec![s.clone()],
        Value::Sequence(items) => items
            .iter()
            .filter_map(|item| item.as_str().map(str::to_string))
            .collect(),
        _ => Vec::new(),
    }
}

/// Split result: front matter and body with its starting manifest line.
#[derive(Debug)]
pub(crate) struct SplitManifest {
    pub front_matter: ManifestFrontMatter,
    pub body: String,
    pub body_start_line: usize,
}

fn is_delimiter(line: &str) -> bool {
    line.trim_end_matches(['\n', '\r']) == "---"
}

fn parse_error(path: &Path, line: usize, column: usize, message: impl Into<String>) -> LoadError {
    LoadError::ManifestParse {
        path: path.to_path_buf(),
        line,
        column,
        message: message.into(),
    }
}

/// Split manifest text into front matter and body, parsing the YAML.
pub(crate) fn split_manifest(path: &Path, text: &str) -> Result<SplitManifest, LoadError> {
    let mut lines = text.split_inclusive('\n');

    match lines.next() {
        Some(first) if is_delimiter(first.trim_start_matches('\u{feff}')) => {}
        _ => return Err(parse_error(path, 1, 1, "missing front matter (expected '---' on line 1)")),
    }

    let mut raw = String::new();
    let mut closing_line = None;
    for (i, line) in lines.by_ref().enumerate() {
        if is_delimiter(line) {
            closing_line = Some(i + 2);
            break;
        }
        raw.push_str(line);
    }

    let Some(closing_line) = closing_line else {
        return Err(parse_error(path, 1, 1, "unterminated front matter (no closing '---')"));
    };

    let body: String = lines.collect();

    let value: Value = serde_yaml::from_str(&raw).map_err(|e| {
        let (line, column) = e
            .location()
            .map(|loc| (loc.line() + 1, loc.column()))
            .unwrap_or((2, 1));
        parse_error(path, line, column, e.to_string())
    })?;

    let fields = match value {
        Value::Mapping(map) => map,
        _ => return Err(parse_error(path, 2, 1, "front matter must be a key/value mapping")),
    };

    Ok(SplitManifest {
        front_matter: ManifestFrontMatter {
            raw,
            fields,
            start_line: 2,
        },
        body,
        body_start_line: closing_line + 1,
    })
}
