//! Trailer-line code extraction and page text line scanning.
//!
//! Every page is expected to end with a fixed-format trailer line:
//! `<3 alnum chars> <M/D/Y date> <4 alpha chars>`, e.g. `AB1 4/5/23 WXYZ`.
//! The 3-character prefix is the code that gets tallied and used as a
//! secondary sort key when collating pages.

use std::sync::LazyLock;

use regex::Regex;

/// Trailer grammar, anchored at both ends. The date slot is shape only;
/// the digits are never checked against a calendar ("13/45/99" matches).
static TRAILER: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([a-zA-Z0-9]{3})\s+\d{1,2}/\d{1,2}/\d{2,4}\s+[a-zA-Z]{4}$")
        .expect("trailer grammar is a valid regex")
});

/// Extract the 3-character code from a trailer line.
///
/// The whole line, after trimming surrounding whitespace, must match the
/// grammar. The code is returned exactly as written (no case folding).
/// Lines with extra content, wrong component lengths, or missing
/// separators yield `None`; there is no partial matching.
///
/// # Example
///
/// ```
/// use pdf_collate::extract::extract_code;
///
/// assert_eq!(extract_code("AB1 4/5/23 WXYZ"), Some("AB1"));
/// assert_eq!(extract_code("AB12 4/5/23 WXYZ"), None);
/// ```
pub fn extract_code(line: &str) -> Option<&str> {
    TRAILER
        .captures(line.trim())
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

/// First non-empty line of a page's text, trimmed.
///
/// Returns an empty string when the text has no content at all.
pub fn first_line(text: &str) -> &str {
    text.lines()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

/// Last non-empty line of a page's text, trimmed.
///
/// This is where the trailer line lives. Returns an empty string when the
/// text has no content at all.
pub fn last_line(text: &str) -> &str {
    text.lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .unwrap_or("")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_code_from_exact_trailer() {
        assert_eq!(extract_code("AB1 4/5/23 WXYZ"), Some("AB1"));
        assert_eq!(extract_code("zx9 12/31/2023 abcd"), Some("zx9"));
        assert_eq!(extract_code("123 1/1/22 ABCD"), Some("123"));
    }

    #[test]
    fn preserves_code_case() {
        assert_eq!(extract_code("aB1 4/5/23 WXYZ"), Some("aB1"));
    }

    #[test]
    fn tolerates_surrounding_whitespace_and_flexible_gaps() {
        assert_eq!(extract_code("  AB1 4/5/23 WXYZ  "), Some("AB1"));
        assert_eq!(extract_code("AB1   4/5/23\t WXYZ"), Some("AB1"));
    }

    #[test]
    fn accepts_any_digit_pattern_in_date_slot() {
        // Calendar validity is not checked, only the digit shape.
        assert_eq!(extract_code("AB1 13/45/99 WXYZ"), Some("AB1"));
        assert_eq!(extract_code("AB1 1/1/2023 WXYZ"), Some("AB1"));
    }

    #[test]
    fn rejects_wrong_component_lengths() {
        assert_eq!(extract_code("AB12 4/5/23 WXYZ"), None); // 4-char prefix
        assert_eq!(extract_code("AB 4/5/23 WXYZ"), None); // 2-char prefix
        assert_eq!(extract_code("AB1 4/5/23 WXY"), None); // 3-char suffix
        assert_eq!(extract_code("AB1 4/5/23 WXYZV"), None); // 5-char suffix
        assert_eq!(extract_code("AB1 4/5/12345 WXYZ"), None); // 5-digit year
    }

    #[test]
    fn rejects_missing_separators_and_trailing_garbage() {
        assert_eq!(extract_code("AB14/5/23 WXYZ"), None);
        assert_eq!(extract_code("AB1 4/5/23WXYZ"), None);
        assert_eq!(extract_code("AB1 4/5/23 WXYZ extra"), None);
        assert_eq!(extract_code("prefix AB1 4/5/23 WXYZ"), None);
    }

    #[test]
    fn rejects_non_alnum_code_and_non_alpha_suffix() {
        assert_eq!(extract_code("A-1 4/5/23 WXYZ"), None);
        assert_eq!(extract_code("AB1 4/5/23 WXY1"), None);
    }

    #[test]
    fn rejects_empty_and_unrelated_lines() {
        assert_eq!(extract_code(""), None);
        assert_eq!(extract_code("   "), None);
        assert_eq!(extract_code("Chapter 4: Introduction"), None);
    }

    #[test]
    fn first_line_skips_blank_lines() {
        assert_eq!(first_line("\n   \n  Title line  \nbody"), "Title line");
        assert_eq!(first_line("only"), "only");
    }

    #[test]
    fn last_line_scans_from_the_end() {
        assert_eq!(last_line("header\nbody\nAB1 4/5/23 WXYZ\n\n  \n"), "AB1 4/5/23 WXYZ");
        assert_eq!(last_line("single"), "single");
    }

    #[test]
    fn empty_text_yields_empty_lines() {
        assert_eq!(first_line(""), "");
        assert_eq!(last_line(""), "");
        assert_eq!(first_line(" \n \n "), "");
        assert_eq!(last_line(" \n \n "), "");
    }

    #[test]
    fn carriage_returns_are_trimmed() {
        assert_eq!(last_line("head\r\nAB1 4/5/23 WXYZ\r\n"), "AB1 4/5/23 WXYZ");
    }
}
