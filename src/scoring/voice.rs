//! Imperative-voice heuristic
//!
//! Splits a markdown body into prose sentences and checks whether each one
//! opens with an instruction verb. This is a calibrated heuristic, not a
//! grammar: the verb list and thresholds come from configuration.

use crate::config::StyleConfig;
use crate::package::{parse_heading, FenceTracker};
use regex::Regex;
use rustc_hash::FxHashSet;
use serde::Serialize;
use std::sync::OnceLock;

/// How many leading words may carry the verb ("Always run ...", "First, check ...")
const VERB_WINDOW: usize = 3;

fn link_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"!?\[([^\]]*)\]\([^)]*\)").expect("valid regex"))
}

fn comment_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"<!--.*?-->").expect("valid regex"))
}

fn list_marker_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^\s*(?:[-*+]|\d+[.)])\s+").expect("valid regex"))
}

/// Which style credit band the body reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum VoiceBand {
    Full,
    Partial,
    None,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VoiceStats {
    pub sentences: usize,
    pub imperative: usize,
    pub ratio: f64,
    pub band: VoiceBand,
}

impl VoiceStats {
    pub fn measure(body: &str, style: &StyleConfig) -> Self {
        let verbs: FxHashSet<String> = style.verbs.iter().map(|v| v.to_lowercase()).collect();
        let sentences = split_sentences(body);
        let imperative = sentences
            .iter()
            .filter(|s| is_imperative(s, &verbs))
            .count();
        let ratio = if sentences.is_empty() {
            0.0
        } else {
            imperative as f64 / sentences.len() as f64
        };
        // No sentences means no credit
        let band = if sentences.is_empty() {
            VoiceBand::None
        } else if ratio >= style.full_threshold {
            VoiceBand::Full
        } else if ratio >= style.partial_threshold {
            VoiceBand::Partial
        } else {
            VoiceBand::None
        };
        Self {
            sentences: sentences.len(),
            imperative,
            ratio,
            band,
        }
    }

    /// Points earned from voice alone, before style findings are deducted.
    pub fn credit(&self, pool: f64) -> f64 {
        match self.band {
            VoiceBand::Full => pool,
            VoiceBand::Partial => pool / 2.0,
            VoiceBand::None => 0.0,
        }
    }
}

/// True when one of the first words is an instruction verb.
pub fn is_imperative(sentence: &str, verbs: &FxHashSet<String>) -> bool {
    sentence
        .split_whitespace()
        .map(|w| w.trim_matches(|c: char| !c.is_alphanumeric()).to_lowercase())
        .filter(|w| !w.is_empty())
        .take(VERB_WINDOW)
        .any(|w| verbs.contains(&w))
}

fn strip_inline(text: &str) -> String {
    let text = comment_pattern().replace_all(text, " ");
    let text = link_pattern().replace_all(&text, "$1");
    text.chars()
        .filter(|c| !matches!(c, '*' | '_' | '`'))
        .collect()
}

fn strip_list_marker(line: &str) -> Option<&str> {
    let m = list_marker_pattern().find(line)?;
    Some(&line[m.end()..])
}

fn push_sentences(paragraph: &str, out: &mut Vec<String>) {
    let text = strip_inline(paragraph);
    let mut current = String::new();
    let mut chars = text.chars().peekable();
    while let Some(c) = chars.next() {
        current.push(c);
        let at_boundary = !matches!(chars.peek(), Some(n) if !n.is_whitespace());
        if matches!(c, '.' | '!' | '?') && at_boundary {
            flush_sentence(&mut current, out);
        }
    }
    flush_sentence(&mut current, out);
}

fn flush(paragraph: &mut String, sentences: &mut Vec<String>) {
    if !paragraph.trim().is_empty() {
        push_sentences(paragraph, sentences);
    }
    paragraph.clear();
}

fn flush_sentence(current: &mut String, out: &mut Vec<String>) {
    let sentence = current.trim();
    if sentence.chars().any(char::is_alphabetic) {
        out.push(sentence.to_string());
    }
    current.clear();
}

/// Split a markdown body into prose sentences.
///
/// Fenced code, headings, tables and HTML comments are dropped. Blank lines
/// end a paragraph and every list item starts a new one.
pub fn split_sentences(body: &str) -> Vec<String> {
    let mut sentences = Vec::new();
    let mut paragraph = String::new();
    let mut fence = FenceTracker::default();
    let mut in_comment = false;

    for line in body.lines() {
        if fence.update(line) {
            flush(&mut paragraph, &mut sentences);
            continue;
        }
        if in_comment {
            if line.contains("-->") {
                in_comment = false;
            }
            continue;
        }
        let trimmed = line.trim();
        if let Some(start) = trimmed.find("<!--") {
            if !trimmed[start..].contains("-->") {
                in_comment = true;
                let before = &trimmed[..start];
                if !before.trim().is_empty() {
                    paragraph.push(' ');
                    paragraph.push_str(before);
                }
                continue;
            }
        }
        if trimmed.is_empty() || parse_heading(line).is_some() || trimmed.starts_with('|') {
            flush(&mut paragraph, &mut sentences);
            continue;
        }
        if let Some(item) = strip_list_marker(line) {
            flush(&mut paragraph, &mut sentences);
            paragraph.push_str(item);
            continue;
        }
        paragraph.push(' ');
        paragraph.push_str(trimmed);
    }
    flush(&mut paragraph, &mut sentences);
    sentences
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verbs() -> FxHashSet<String> {
        ["run", "use", "check"].iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_split_on_terminators() {
        let sentences = split_sentences("Run it. Then check it! Done? v1.2 stays whole.\n");
        assert_eq!(
            sentences,
            vec!["Run it.", "Then check it!", "Done?", "v1.2 stays whole."]
        );
    }

    #[test]
    fn test_markdown_is_stripped() {
        let body = "# Heading\n\nUse **bold** and [the guide](references/guide.md).\n\n```bash\nrun this.\n```\n| a | b |\n<!-- hidden. -->\n<!--\nmulti.\n-->\n- check the list item\n1. run step one\n";
        let sentences = split_sentences(body);
        assert_eq!(
            sentences,
            vec![
                "Use bold and the guide.",
                "check the list item",
                "run step one"
            ]
        );
    }

    #[test]
    fn test_blank_line_ends_paragraph() {
        let sentences = split_sentences("No terminator here\n\nAnother paragraph\n");
        assert_eq!(sentences.len(), 2);
    }

    #[test]
    fn test_imperative_window() {
        let verbs = verbs();
        assert!(is_imperative("Run the tests.", &verbs));
        assert!(is_imperative("First, always run it.", &verbs));
        assert!(!is_imperative("This tool will eventually run.", &verbs));
        assert!(is_imperative("**Use** it", &verbs));
    }

    #[test]
    fn test_bands() {
        let style = StyleConfig::default();
        let full = VoiceStats::measure("Run it. Use it. It works.\n", &style);
        assert_eq!(full.band, VoiceBand::Full);
        assert_eq!(full.credit(15.0), 15.0);

        let partial = VoiceStats::measure("Run it. It works. It is fine.\n", &style);
        assert_eq!(partial.band, VoiceBand::Partial);
        assert_eq!(partial.credit(15.0), 7.5);

        let none = VoiceStats::measure("It works. It is fine. All good.\n", &style);
        assert_eq!(none.band, VoiceBand::None);

        let empty = VoiceStats::measure("```\ncode only\n```\n", &style);
        assert_eq!(empty.sentences, 0);
        assert_eq!(empty.credit(15.0), 0.0);
    }
}
