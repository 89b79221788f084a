use unicode_normalization::UnicodeNormalization;

/// Combining diacritical marks block, stripped after decomposition
const COMBINING_MARKS: std::ops::RangeInclusive<char> = '\u{0300}'..='\u{036f}';

/// Turn arbitrary text into a lowercase, hyphen-separated path segment
///
/// Accents are folded to their base letter, anything outside `[a-z0-9]`
/// becomes a hyphen, and the result never starts or ends with a hyphen nor
/// contains two in a row. The output is at most `max_length` characters.
///
/// ```
/// use frpd::sanitize;
///
/// assert_eq!(sanitize("Café de la Presse", 100), "cafe-de-la-presse");
/// assert_eq!(sanitize("A!!!B", 10), "a-b");
/// ```
pub fn sanitize(input: &str, max_length: usize) -> String {
    if input.is_empty() {
        return String::new();
    }

    let folded: String = input
        .nfd()
        .filter(|c| !COMBINING_MARKS.contains(c))
        .collect::<String>()
        .to_lowercase();

    let collapsed = collapse_separators(&folded);
    let trimmed = collapsed.trim_matches('-');

    let truncated: String = trimmed.chars().take(max_length).collect();
    match truncated.strip_suffix('-') {
        Some(stripped) => stripped.to_string(),
        None => truncated,
    }
}

/// Check if a character survives sanitization unchanged
fn is_kept_char(c: char) -> bool {
    c.is_ascii_lowercase() || c.is_ascii_digit()
}

/// Replace every run of whitespace, hyphens and disallowed characters with
/// a single hyphen
fn collapse_separators(s: &str) -> String {
    let mut result = String::with_capacity(s.len());
    let mut last_was_separator = false;

    for c in s.chars() {
        if is_kept_char(c) {
            result.push(c);
            last_was_separator = false;
        } else {
            if !last_was_separator {
                result.push('-');
            }
            last_was_separator = true;
        }
    }

    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_input_gives_empty_output() {
        assert_eq!(sanitize("", 100), "");
    }

    #[test]
    fn folds_accents_to_base_letters() {
        assert_eq!(sanitize("Café de la Presse", 100), "cafe-de-la-presse");
        assert_eq!(sanitize("Ça m'émeut à Noël", 100), "ca-m-emeut-a-noel");
    }

    #[test]
    fn collapses_runs_of_invalid_chars() {
        assert_eq!(sanitize("A!!!B", 10), "a-b");
        assert_eq!(sanitize("a:::b///c", 100), "a-b-c");
    }

    #[test]
    fn collapses_mixed_spaces_and_dashes() {
        assert_eq!(sanitize("a - - - b", 100), "a-b");
        assert_eq!(sanitize("line1\nline2\ttab", 100), "line1-line2-tab");
    }

    #[test]
    fn trims_leading_and_trailing_separators() {
        assert_eq!(sanitize("  --Hello--  ", 100), "hello");
        assert_eq!(sanitize("« Le Grand Entretien »", 100), "le-grand-entretien");
    }

    #[test]
    fn only_invalid_chars_give_empty_output() {
        assert_eq!(sanitize(":::///", 100), "");
        assert_eq!(sanitize("🎙️", 100), "");
    }

    #[test]
    fn non_latin_scripts_are_replaced() {
        assert_eq!(sanitize("Episode 中文 42", 100), "episode-42");
    }

    #[test]
    fn uppercase_is_lowered() {
        assert_eq!(sanitize("LE JOURNAL DE 8H", 100), "le-journal-de-8h");
    }

    #[test]
    fn truncates_to_max_length() {
        let long = "a".repeat(150);
        assert_eq!(sanitize(&long, 80).len(), 80);
    }

    #[test]
    fn truncation_drops_dangling_hyphen() {
        // "hello-world" cut at 6 chars is "hello-"
        assert_eq!(sanitize("Hello World", 6), "hello");
    }

    #[test]
    fn zero_length_gives_empty_output() {
        assert_eq!(sanitize("Hello", 0), "");
    }

    #[test]
    fn output_respects_invariants() {
        let inputs = vec![
            "Café de la Presse".to_string(),
            "L'Œil du Tigre : épisode n°12 — « spécial » !".to_string(),
            "   ---   ".to_string(),
            "Ünïcödé Şțřïñğ with ÉMOJI 🎧 and\ttabs".to_string(),
            "a".to_string(),
            "x-y-z-".repeat(40),
        ];

        for input in &inputs {
            for max in [1, 5, 17, 80, 100] {
                let out = sanitize(input, max);
                assert!(out.chars().count() <= max, "{out:?} exceeds {max}");
                assert!(!out.starts_with('-'), "{out:?} starts with hyphen");
                assert!(!out.ends_with('-'), "{out:?} ends with hyphen");
                assert!(!out.contains("--"), "{out:?} has consecutive hyphens");
                assert!(
                    out.chars().all(|c| is_kept_char(c) || c == '-'),
                    "{out:?} has disallowed chars"
                );
            }
        }
    }

    #[test]
    fn sanitize_is_idempotent() {
        for input in ["Café de la Presse", "A!!!B", "  Hello   World  ", "Épisode 3/4"] {
            for max in [3, 10, 100] {
                let once = sanitize(input, max);
                assert_eq!(sanitize(&once, max), once);
            }
        }
    }
}
