//! Paragraph splitting for pasted input.

use log::warn;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::sync::OnceLock;

use super::Paragraph;
use super::normalize::normalize_whitespace;
use super::sentence::split_sentences;

const DEFAULT_MAX_CHARS: usize = 1200;
const DEFAULT_MAX_PARAGRAPHS: usize = 40;

static BLANK_LINE: OnceLock<Regex> = OnceLock::new();

fn blank_line() -> &'static Regex {
    BLANK_LINE.get_or_init(|| Regex::new(r"\n\s*\n").expect("blank line pattern is valid"))
}

/// Size and count limits for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParagraphLimits {
    /// Longer paragraphs are split at sentence boundaries
    #[serde(default = "default_max_chars")]
    pub max_chars: usize,

    /// Paragraphs beyond this are dropped
    #[serde(default = "default_max_paragraphs")]
    pub max_paragraphs: usize,
}

fn default_max_chars() -> usize {
    DEFAULT_MAX_CHARS
}

fn default_max_paragraphs() -> usize {
    DEFAULT_MAX_PARAGRAPHS
}

impl Default for ParagraphLimits {
    fn default() -> Self {
        Self {
            max_chars: DEFAULT_MAX_CHARS,
            max_paragraphs: DEFAULT_MAX_PARAGRAPHS,
        }
    }
}

/// Split raw text on blank lines into normalized, non-empty paragraphs.
pub fn split_paragraphs(text: &str, limits: &ParagraphLimits) -> Vec<Paragraph> {
    let mut pieces: Vec<String> = Vec::new();

    for block in blank_line().split(text) {
        let block = normalize_whitespace(block);
        if block.is_empty() {
            continue;
        }

        if block.chars().count() <= limits.max_chars {
            pieces.push(block);
        } else {
            pieces.extend(split_oversized(&block, limits.max_chars));
        }
    }

    if pieces.len() > limits.max_paragraphs {
        warn!(
            "input has {} paragraphs, keeping the first {}",
            pieces.len(),
            limits.max_paragraphs
        );
        pieces.truncate(limits.max_paragraphs);
    }

    pieces
        .into_iter()
        .enumerate()
        .map(|(index, text)| Paragraph::new(index, text))
        .collect()
}

/// Pack whole sentences into pieces of at most `max_chars`. A sentence that
/// is longer on its own becomes its own piece.
fn split_oversized(block: &str, max_chars: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();

    for sentence in split_sentences(block) {
        let fits = current.chars().count() + 1 + sentence.chars().count() <= max_chars;
        if current.is_empty() {
            current = sentence;
        } else if fits {
            current.push(' ');
            current.push_str(&sentence);
        } else {
            pieces.push(std::mem::replace(&mut current, sentence));
        }
    }

    if !current.is_empty() {
        pieces.push(current);
    }

    pieces
}
