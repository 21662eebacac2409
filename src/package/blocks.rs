//! Body splitting into heading-delimited content blocks.

use serde::Serialize;

/// A heading plus the lines it owns.
///
/// Line numbers are manifest-file lines, inclusive on both ends. Blocks of
/// one package are contiguous and never overlap.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ContentBlock {
    /// Heading text without the `#` markers; empty for the implicit leading block
    pub heading: String,
    /// 1..=6 for ATX headings, 0 for the implicit leading block
    pub level: u8,
    pub start_line: usize,
    pub end_line: usize,
    pub text: String,
}

/// Tracks whether a line sits inside a fenced code block.
#[derive(Debug, Default)]
pub struct FenceTracker {
    open: Option<(char, usize)>,
}

impl FenceTracker {
    /// Feed a line; returns true when the line is a fence delimiter or inside a fence.
    pub fn update(&mut self, line: &str) -> bool {
        let trimmed = line.trim_start();
        let marker = trimmed.chars().next().filter(|c| *c == '`' || *c == '~');
        let run = marker.map_or(0, |c| trimmed.chars().take_while(|x| *x == c).count());

        match (self.open, marker) {
            (Some((open_char, open_len)), Some(c)) if c == open_char && run >= open_len => {
                if trimmed[run * c.len_utf8()..].trim().is_empty() {
                    self.open = None;
                }
                true
            }
            (Some(_), _) => true,
            (None, Some(c)) if run >= 3 => {
                self.open = Some((c, run));
                true
            }
            (None, _) => false,
        }
    }

    pub fn in_fence(&self) -> bool {
        self.open.is_some()
    }
}

/// Parse an ATX heading line into `(level, text)`.
pub fn parse_heading(line: &str) -> Option<(u8, String)> {
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let hashes = rest.chars().take_while(|c| *c == '#').count();
    if !(1..=6).contains(&hashes) {
        return None;
    }
    let after = &rest[hashes..];
    if !after.is_empty() && !after.starts_with([' ', '\t']) {
        return None;
    }
    let text = after.trim().trim_end_matches('#').trim_end().to_string();
    Some((hashes as u8, text))
}

/// Split a body into blocks at headings outside fenced code.
pub fn split_blocks(body: &str, first_line: usize) -> Vec<ContentBlock> {
    let mut blocks = Vec::new();
    let mut fence = FenceTracker::default();
    let mut current: Option<ContentBlock> = None;

    for (i, line) in body.lines().enumerate() {
        let line_no = first_line + i;
        let was_in_fence = fence.in_fence();
        let fenced = fence.update(line);
        let heading = if was_in_fence || fenced {
            None
        } else {
            parse_heading(line)
        };

        match heading {
            Some((level, text)) => {
                if let Some(done) = current.take() {
                    blocks.push(done);
                }
                current = Some(ContentBlock {
                    heading: text,
                    level,
                    start_line: line_no,
                    end_line: line_no,
                    text: format!("{line}\n"),
                });
            }
            None => {
                let block = current.get_or_insert_with(|| ContentBlock {
                    heading: String::new(),
                    level: 0,
                    start_line: line_no,
                    end_line: line_no,
                    text: String::new(),
                });
                block.end_line = line_no;
                block.text.push_str(line);
                block.text.push('\n');
            }
        }
    }

    if let Some(done) = current {
        blocks.push(done);
    }
    blocks
}
