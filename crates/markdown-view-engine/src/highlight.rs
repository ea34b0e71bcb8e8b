//! # Search Highlighting
//!
//! Case-insensitive, non-overlapping substring search over run text.
//!
//! Both sides are folded char by char with Unicode lowercase mapping. A char
//! may fold to several chars (`'İ'` becomes `"i̇"`), so the folded haystack
//! keeps, for each of its bytes, the byte offset of the original char it came
//! from. A match is accepted only when it starts and ends on the fold of whole
//! original chars; a match splitting an expansion is skipped.

use std::ops::Range;

use crate::attributed::StyledText;
use crate::attributes::AttributeContainer;

/// Lowercase-folded copy of a string with a map back to original offsets.
struct Folded {
    text: String,
    /// Original byte offset for every byte of `text`.
    origin: Vec<usize>,
    /// Whether a byte of `text` starts the fold of an original char.
    char_start: Vec<bool>,
    original_len: usize,
}

impl Folded {
    fn new(original: &str) -> Self {
        let mut text = String::with_capacity(original.len());
        let mut origin = Vec::with_capacity(original.len());
        let mut char_start = Vec::with_capacity(original.len());

        for (offset, ch) in original.char_indices() {
            let mut first = true;
            for lower in ch.to_lowercase() {
                let len = lower.len_utf8();
                text.push(lower);
                origin.extend(std::iter::repeat_n(offset, len));
                char_start.push(first);
                char_start.extend(std::iter::repeat_n(false, len - 1));
                first = false;
            }
        }

        Self {
            text,
            origin,
            char_start,
            original_len: original.len(),
        }
    }

    /// Whether folded offset `pos` lies between two original chars.
    fn is_boundary(&self, pos: usize) -> bool {
        pos == self.text.len() || self.char_start[pos]
    }

    fn original_offset(&self, pos: usize) -> usize {
        if pos == self.text.len() {
            self.original_len
        } else {
            self.origin[pos]
        }
    }
}

fn fold_query(query: &str) -> String {
    query.chars().flat_map(char::to_lowercase).collect()
}

/// Find every case-insensitive occurrence of `query` in `text`.
///
/// Scans left to right and resumes after the end of each match, so matches
/// never overlap. Returned ranges are byte ranges into `text`. An empty query
/// disables highlighting and yields no ranges.
pub fn find_matches(text: &str, query: &str) -> Vec<Range<usize>> {
    if query.is_empty() || text.is_empty() {
        return Vec::new();
    }

    let needle = fold_query(query);
    let folded = Folded::new(text);
    let mut matches = Vec::new();
    let mut cursor = 0;

    while let Some(found) = folded.text[cursor..].find(&needle) {
        let start = cursor + found;
        let end = start + needle.len();

        if folded.is_boundary(start) && folded.is_boundary(end) {
            matches.push(folded.original_offset(start)..folded.original_offset(end));
            cursor = end;
        } else {
            // Inside a multi-char fold; retry from the next folded char.
            let step = folded.text[start..]
                .chars()
                .next()
                .map_or(1, char::len_utf8);
            cursor = start + step;
        }

        if cursor >= folded.text.len() {
            break;
        }
    }

    matches
}

/// Build a styled text run for `text`, highlighting matches of `search_text`.
///
/// `attributes` are stored as given; highlights are kept as separate ranges
/// layered over them.
pub fn build_styled_text(
    text: &str,
    attributes: &AttributeContainer,
    search_text: &str,
) -> StyledText {
    StyledText::new(text, attributes.clone()).with_highlights(find_matches(text, search_text))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::Font;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case::spec_example("find me here", "ME", vec![5..7])]
    #[case::empty_query("find me here", "", vec![])]
    #[case::no_match("find me here", "xyz", vec![])]
    #[case::repeated("abcabc", "ABC", vec![0..3, 3..6])]
    #[case::non_overlapping("aaaa", "aa", vec![0..2, 2..4])]
    #[case::odd_overlap("aaa", "aa", vec![0..2])]
    #[case::whole_text("Cat", "cAT", vec![0..3])]
    #[case::query_longer_than_text("ab", "abc", vec![])]
    fn ascii_matches(#[case] text: &str, #[case] query: &str, #[case] expected: Vec<Range<usize>>) {
        assert_eq!(find_matches(text, query), expected);
    }

    #[test]
    fn cyrillic_case_insensitive() {
        let text = "Привет, ПРИВЕТ";
        let matches = find_matches(text, "привет");
        assert_eq!(matches.len(), 2);
        assert_eq!(&text[matches[0].clone()], "Привет");
        assert_eq!(&text[matches[1].clone()], "ПРИВЕТ");
    }

    #[test]
    fn greek_final_sigma_in_query() {
        let text = "ΟΔΟΣ οδοσ";
        let matches = find_matches(text, "ΟΔΟΣ");
        assert_eq!(matches.len(), 2);
        assert_eq!(&text[matches[0].clone()], "ΟΔΟΣ");
    }

    #[test]
    fn multi_char_fold_is_matched_whole_not_split() {
        // 'İ' lowercases to "i\u{307}"; a bare "i" must not match half of it.
        let text = "İx ix";
        let matches = find_matches(text, "i");
        assert_eq!(matches, vec![4..5]);

        let whole = find_matches(text, "İ");
        assert_eq!(whole, vec![0..2]);
    }

    #[test]
    fn ranges_are_on_char_boundaries() {
        let text = "Ünïcödé ÜNÏCÖDÉ";
        for range in find_matches(text, "üNÏ") {
            assert!(text.is_char_boundary(range.start));
            assert!(text.is_char_boundary(range.end));
            assert_eq!(text[range].to_lowercase(), "ünï");
        }
    }

    #[test]
    fn build_keeps_attributes_and_adds_highlights() {
        let attributes = AttributeContainer::new().with_font(Font::default().italic());
        let styled = build_styled_text("find me here", &attributes, "ME");

        assert_eq!(styled.content(), "find me here");
        assert_eq!(styled.uniform_attributes(), Some(&attributes));
        assert_eq!(styled.highlights(), &[5..7]);
    }
}
