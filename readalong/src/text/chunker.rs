//! Speakable chunking.
//!
//! Each sentence is cut into runs of at most nine words, preferring to
//! break after pause punctuation where the next word opens a new clause.
//! Chunks never cross a sentence boundary.

use log::warn;

use super::Chunk;
use super::normalize::normalize_whitespace;
use super::sentence::split_sentences;

/// Hard cap on words in a chunk.
pub const MAX_CHUNK_WORDS: usize = 9;

/// Chunks shorter than this at the end of a sentence are folded back.
pub const MIN_CHUNK_WORDS: usize = 5;

/// From this length any pause punctuation closes the chunk.
const SOFT_BREAK_WORDS: usize = 7;

const PAUSE_MARKS: &[char] = &[',', ';', ':', '\u{2014}', '\u{2013}', '.', '!', '?', '\u{2026}'];

const TRAILING_CLOSERS: &[char] = &['"', '\'', '\u{201d}', '\u{2019}', ')', ']', '}'];

/// Conjunctions, conjunctive adverbs and relative pronouns.
const CLAUSE_WORDS: &[&str] = &[
    "and", "but", "or", "nor", "so", "yet", "for", "because", "although", "though", "while",
    "whereas", "since", "unless", "until", "when", "whenever", "where", "wherever", "if",
    "after", "before", "once", "however", "therefore", "moreover", "furthermore", "meanwhile",
    "nevertheless", "consequently", "thus", "hence", "instead", "otherwise", "which", "who",
    "whom", "whose", "that",
];

/// Articles, demonstratives, pronouns and positional adverbs.
const IDEA_STARTERS: &[&str] = &[
    "the", "a", "an", "this", "these", "those", "i", "you", "he", "she", "it", "we", "they",
    "my", "your", "his", "her", "its", "our", "their", "here", "there", "then", "now",
];

/// Split a paragraph into speakable chunks.
///
/// Deterministic. Logs a warning if the chunks do not reproduce the
/// normalized paragraph.
pub fn split_into_chunks(paragraph: &str) -> Vec<String> {
    let normalized = normalize_whitespace(paragraph);

    let chunks: Vec<String> = split_sentences(&normalized)
        .iter()
        .flat_map(|sentence| chunk_sentence(sentence))
        .collect();

    if !verify_round_trip(&normalized, &chunks) {
        warn!(
            "chunking did not reproduce the paragraph ({} chunks, {} chars)",
            chunks.len(),
            normalized.len()
        );
    }

    chunks
}

/// Split a paragraph into indexed chunks.
pub fn chunk_paragraph(paragraph: &str) -> Vec<Chunk> {
    split_into_chunks(paragraph)
        .into_iter()
        .enumerate()
        .map(|(index, text)| Chunk::new(index, text))
        .collect()
}

/// Check that joining `chunks` with single spaces gives back `original`,
/// modulo whitespace.
pub fn verify_round_trip<S: AsRef<str>>(original: &str, chunks: &[S]) -> bool {
    let joined = chunks
        .iter()
        .map(AsRef::as_ref)
        .collect::<Vec<_>>()
        .join(" ");

    normalize_whitespace(&joined) == normalize_whitespace(original)
}

fn chunk_sentence(sentence: &str) -> Vec<String> {
    let words: Vec<&str> = sentence.split_whitespace().collect();

    if words.len() <= MAX_CHUNK_WORDS {
        return vec![words.join(" ")];
    }

    let mut chunks: Vec<String> = Vec::new();
    let mut current: Vec<&str> = Vec::with_capacity(MAX_CHUNK_WORDS);

    for (i, &word) in words.iter().enumerate() {
        current.push(word);

        let next = words.get(i + 1).copied();
        if should_close(current.len(), word, next) {
            chunks.push(current.join(" "));
            current.clear();
        }
    }

    if !current.is_empty() {
        let fragment = current.join(" ");
        match chunks.last_mut() {
            Some(previous) if current.len() < MIN_CHUNK_WORDS => {
                previous.push(' ');
                previous.push_str(&fragment);
            }
            _ => chunks.push(fragment),
        }
    }

    chunks
}

/// First matching rule wins. The last word is left to the caller so a short
/// tail can be folded into the previous chunk.
fn should_close(len: usize, word: &str, next: Option<&str>) -> bool {
    let Some(next) = next else {
        return false;
    };

    if len >= MAX_CHUNK_WORDS {
        return true;
    }

    let pause = ends_with_pause(word);
    if len >= SOFT_BREAK_WORDS && pause {
        return true;
    }

    len >= MIN_CHUNK_WORDS && pause && opens_clause(next)
}

fn ends_with_pause(word: &str) -> bool {
    word.trim_end_matches(TRAILING_CLOSERS)
        .chars()
        .next_back()
        .is_some_and(|c| PAUSE_MARKS.contains(&c))
}

fn opens_clause(word: &str) -> bool {
    let bare = word
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    CLAUSE_WORDS.contains(&bare.as_str()) || IDEA_STARTERS.contains(&bare.as_str())
}
