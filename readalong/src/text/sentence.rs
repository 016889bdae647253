//! Heuristic sentence boundary detection.
//!
//! A `.`, `!` or `?` ends a sentence only when what follows looks like the
//! start of a new one. Decimals, abbreviations and ellipses are skipped.
//! The rules are approximate but fully deterministic.

use super::normalize::normalize_whitespace;

const TERMINATORS: [char; 3] = ['.', '!', '?'];

const CLOSING_QUOTES: [char; 4] = ['"', '\'', '\u{201d}', '\u{2019}'];

/// Characters allowed between the space and the capital that opens the next
/// sentence: `He left. "Stop," she said.`
const OPENERS: [char; 6] = ['"', '\'', '\u{201c}', '\u{2018}', '(', '['];

/// Words that end in a period without ending the sentence. Compared
/// lowercase, without the final period.
const ABBREVIATIONS: &[&str] = &[
    // titles
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "rev", "gen", "col", "capt", "lt",
    "sgt", "hon", "gov", "pres", "fr",
    // latin and editorial
    "etc", "vs", "e.g", "i.e", "cf", "al", "viz", "approx", "fig", "vol", "pp", "ch", "ed",
    // time
    "a.m", "p.m", "jan", "feb", "apr", "jun", "jul", "aug", "sep", "sept", "oct", "nov", "dec",
    // organizations and places
    "inc", "ltd", "co", "corp", "dept", "u.s", "u.k", "u.n", "ave", "blvd",
    // units
    "km", "kg", "cm", "mm", "mg", "ml", "lb", "lbs", "oz", "ft", "yd", "hr", "hrs", "sec",
];

/// Split `text` into trimmed sentences.
///
/// The input is whitespace-normalized first. Returns an empty vector for
/// empty input.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = normalize_whitespace(text);
    if text.is_empty() {
        return Vec::new();
    }

    let chars: Vec<char> = text.chars().collect();
    let mut sentences = Vec::new();
    let mut start = 0;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];

        if c == '.' {
            let run = chars[i..].iter().take_while(|&&ch| ch == '.').count();
            if run >= 3 {
                // ellipsis, never a terminator
                i += run;
                continue;
            }
        }

        if !TERMINATORS.contains(&c) {
            i += 1;
            continue;
        }

        match boundary_end(&chars, i) {
            Some(end) => {
                push_sentence(&mut sentences, &chars[start..end]);
                start = end;
                i = end;
            }
            None => i += 1,
        }
    }

    if start < chars.len() {
        push_sentence(&mut sentences, &chars[start..]);
    }

    sentences
}

fn push_sentence(sentences: &mut Vec<String>, chars: &[char]) {
    let sentence: String = chars.iter().collect();
    let sentence = sentence.trim();
    if !sentence.is_empty() {
        sentences.push(sentence.to_string());
    }
}

/// Decide whether the terminator at `i` closes a sentence. Returns the
/// exclusive end index of the sentence when it does.
fn boundary_end(chars: &[char], i: usize) -> Option<usize> {
    let next = chars.get(i + 1).copied();

    if next.is_some_and(|c| c.is_ascii_digit()) {
        return None;
    }

    if next.is_some_and(|c| CLOSING_QUOTES.contains(&c)) {
        return match chars.get(i + 2).copied() {
            Some(c) if c.is_uppercase() => Some(i + 2),
            Some(' ') if chars.get(i + 3).is_some_and(|c| c.is_uppercase()) => Some(i + 2),
            _ => None,
        };
    }

    if chars[i] == '.' && is_abbreviation(chars, i) {
        return None;
    }

    match next {
        None | Some('\n') => Some(i + 1),
        Some(' ') if starts_sentence(&chars[i + 2..]) => Some(i + 1),
        _ => None,
    }
}

/// Uppercase letter, optionally behind one opening quote or bracket.
fn starts_sentence(rest: &[char]) -> bool {
    match rest {
        [c, ..] if c.is_uppercase() => true,
        [open, c, ..] if OPENERS.contains(open) => c.is_uppercase(),
        _ => false,
    }
}

/// Whether the word before the period at `i` is a known abbreviation.
fn is_abbreviation(chars: &[char], i: usize) -> bool {
    let begin = chars[..i]
        .iter()
        .rposition(|c| !(c.is_alphabetic() || *c == '.'))
        .map_or(0, |p| p + 1);

    let word: String = chars[begin..i].iter().collect();
    let word = word.trim_start_matches('.').to_lowercase();

    !word.is_empty() && ABBREVIATIONS.contains(&word.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_split() {
        assert_eq!(
            split_sentences("Hello there. How are you? Fine!"),
            vec!["Hello there.", "How are you?", "Fine!"]
        );
    }

    #[test]
    fn test_empty_input() {
        assert!(split_sentences("").is_empty());
        assert!(split_sentences("   \n ").is_empty());
    }

    #[test]
    fn test_abbreviation_title() {
        assert_eq!(
            split_sentences("Dr. Smith arrived. He left."),
            vec!["Dr. Smith arrived.", "He left."]
        );
    }

    #[test]
    fn test_abbreviation_latin_with_inner_periods() {
        let sentences = split_sentences("Bring fruit, e.g. Apples and pears. Then go.");
        assert_eq!(sentences, vec!["Bring fruit, e.g. Apples and pears.", "Then go."]);
    }

    #[test]
    fn test_abbreviation_case_insensitive() {
        assert_eq!(split_sentences("We met MR. Jones today.").len(), 1);
        assert_eq!(split_sentences("It starts at 9 a.m. Tomorrow we rest.").len(), 1);
    }

    #[test]
    fn test_decimal_not_split() {
        assert_eq!(
            split_sentences("The value is 3.14 exactly."),
            vec!["The value is 3.14 exactly."]
        );
    }

    #[test]
    fn test_lowercase_continuation_not_split() {
        assert_eq!(split_sentences("Version 2. and more follows.").len(), 1);
    }

    #[test]
    fn test_quote_followed_by_capital() {
        assert_eq!(
            split_sentences("\"Run!\" She ran. It worked."),
            vec!["\"Run!\"", "She ran.", "It worked."]
        );
    }

    #[test]
    fn test_quote_followed_by_lowercase_continues() {
        assert_eq!(
            split_sentences("\"Stop!\" he shouted at them."),
            vec!["\"Stop!\" he shouted at them."]
        );
    }

    #[test]
    fn test_quote_directly_followed_by_capital() {
        assert_eq!(
            split_sentences("He said \"go.\"Then left."),
            vec!["He said \"go.\"", "Then left."]
        );
    }

    #[test]
    fn test_next_sentence_opens_with_quote() {
        assert_eq!(
            split_sentences("He left. \"Stop,\" she said."),
            vec!["He left.", "\"Stop,\" she said."]
        );
    }

    #[test]
    fn test_ellipsis_not_terminator() {
        assert_eq!(
            split_sentences("Wait... What happened? Nothing."),
            vec!["Wait... What happened?", "Nothing."]
        );
        assert_eq!(split_sentences("Well\u{2026} Maybe later.").len(), 1);
    }

    #[test]
    fn test_repeated_terminators_stay_together() {
        assert_eq!(
            split_sentences("Really?! Yes. Wow!!"),
            vec!["Really?!", "Yes.", "Wow!!"]
        );
    }

    #[test]
    fn test_trailing_text_without_terminator() {
        assert_eq!(
            split_sentences("First one. and then a trailing bit"),
            vec!["First one. and then a trailing bit"]
        );
        assert_eq!(
            split_sentences("First one. Trailing bit"),
            vec!["First one.", "Trailing bit"]
        );
    }

    #[test]
    fn test_newlines_normalized_before_scan() {
        assert_eq!(
            split_sentences("Line one.\n\nLine two."),
            vec!["Line one.", "Line two."]
        );
    }

    #[test]
    fn test_deterministic() {
        let text = "Mr. Brown paid $4.50 at 5 p.m. on Friday. Then he left... Quietly!";
        assert_eq!(split_sentences(text), split_sentences(text));
    }
}
