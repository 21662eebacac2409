//! Reference extraction from markdown text

use super::EdgeKind;
use crate::package::FenceTracker;
use regex::Regex;
use std::sync::OnceLock;

/// Extensions that make a code span look like a file path
pub const KNOWN_EXTENSIONS: &[&str] = &[
    "md", "py", "sh", "js", "ts", "json", "yaml", "yml", "txt", "toml", "csv",
];

/// Commands whose first path-like argument is a file mention
const SHELL_VERBS: &[&str] = &["python", "python3", "bash", "sh", "node", "cat", "source"];

static LINK_RE: OnceLock<Regex> = OnceLock::new();
static CODE_SPAN_RE: OnceLock<Regex> = OnceLock::new();

fn link_re() -> &'static Regex {
    LINK_RE.get_or_init(|| {
        Regex::new(r#"!?\[[^\]]*\]\(\s*<?([^)\s>]+)>?(?:\s+(?:"[^"]*"|'[^']*'))?\s*\)"#)
            .expect("valid regex")
    })
}

fn code_span_re() -> &'static Regex {
    CODE_SPAN_RE.get_or_init(|| Regex::new(r"`([^`\s]+)`").expect("valid regex"))
}

/// A reference found in text, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawReference {
    pub line: usize,
    pub target: String,
    pub kind: EdgeKind,
}

/// True when the target carries a URI scheme (`https:`, `mailto:`).
pub fn has_scheme(target: &str) -> bool {
    let Some((scheme, _)) = target.split_once(':') else {
        return false;
    };
    scheme.len() > 1
        && scheme.starts_with(|c: char| c.is_ascii_alphabetic())
        && scheme
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn has_known_extension(token: &str) -> bool {
    let name = token.rsplit('/').next().unwrap_or(token);
    name.rsplit_once('.')
        .is_some_and(|(stem, ext)| !stem.is_empty() && KNOWN_EXTENSIONS.contains(&ext))
}

/// Relative-path shaped token: path characters only, not absolute, not a directory.
pub fn looks_like_path(token: &str) -> bool {
    if token.is_empty() || token.starts_with('/') || token.ends_with('/') || has_scheme(token) {
        return false;
    }
    let charset_ok = token
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '/' | '.' | '_' | '-'));
    charset_ok && token.chars().any(|c| c.is_alphanumeric()) && (token.contains('/') || has_known_extension(token))
}

/// First path token in a fenced shell command line.
fn fenced_path_mention(line: &str) -> Option<String> {
    let line = line.trim_start();
    let line = line.strip_prefix("$ ").unwrap_or(line);
    let mut tokens = line.split_whitespace();
    let first = tokens.next()?;

    if let Some(local) = first.strip_prefix("./") {
        let local = clean_token(local);
        return looks_like_path(local).then(|| local.to_string());
    }

    let is_verb = SHELL_VERBS.contains(&first)
        || (first == "uv" && tokens.next() == Some("run"));
    if !is_verb {
        return None;
    }

    tokens
        .filter(|t| !t.starts_with('-'))
        .map(clean_token)
        .find(|t| looks_like_path(t))
        .map(|t| t.trim_start_matches("./").to_string())
}

fn clean_token(token: &str) -> &str {
    token.trim_matches(|c| matches!(c, '"' | '\'' | '`' | ';' | ',' | '(' | ')'))
}

/// Extract every reference from `text`, whose first line is `first_line`.
pub fn extract_references(text: &str, first_line: usize) -> Vec<RawReference> {
    let mut refs = Vec::new();
    let mut fence = FenceTracker::default();

    for (i, line) in text.lines().enumerate() {
        let line_no = first_line + i;
        let was_in_fence = fence.in_fence();
        let is_fence_line = fence.update(line);

        if was_in_fence && fence.in_fence() {
            if let Some(target) = fenced_path_mention(line) {
                refs.push(RawReference {
                    line: line_no,
                    target,
                    kind: EdgeKind::CodePath,
                });
            }
            continue;
        }
        if is_fence_line {
            continue;
        }

        for cap in link_re().captures_iter(line) {
            let target = &cap[1];
            if target.starts_with('#') {
                continue;
            }
            let kind = if has_scheme(target) {
                EdgeKind::ProseMention
            } else {
                EdgeKind::MarkdownLink
            };
            refs.push(RawReference {
                line: line_no,
                target: target.to_string(),
                kind,
            });
        }

        for cap in code_span_re().captures_iter(line) {
            let span = &cap[1];
            if looks_like_path(span) {
                refs.push(RawReference {
                    line: line_no,
                    target: span.trim_start_matches("./").to_string(),
                    kind: EdgeKind::CodePath,
                });
            }
        }
    }

    refs
}
