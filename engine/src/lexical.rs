//! Case-insensitive substring scanning over the concatenated corpus text:
//! passage extraction and keyword-in-context concordance. No regex; the scan
//! is char-by-char so offsets always land on UTF-8 boundaries.

/// Context chars shown on each side of a passage match.
pub const PASSAGE_CONTEXT: usize = 50;

/// One keyword-in-context line: the matched text with its clipped
/// left and right windows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KwicEntry {
    pub left: String,
    pub matched: String,
    pub right: String,
}

/// Byte ranges of every case-insensitive occurrence of `needle` in
/// `haystack`, in scan order. Overlapping occurrences are all reported;
/// an empty needle matches nothing.
pub fn match_ranges(haystack: &str, needle: &str) -> Vec<(usize, usize)> {
    let needle_lower: Vec<char> = needle.chars().flat_map(char::to_lowercase).collect();
    let mut ranges = Vec::new();
    if needle_lower.is_empty() {
        return ranges;
    }
    for (start, _) in haystack.char_indices() {
        if let Some(len) = match_len_at(&haystack[start..], &needle_lower) {
            ranges.push((start, start + len));
        }
    }
    ranges
}

/// If `haystack` starts with the lowered needle (case-insensitively),
/// the byte length of the matched prefix. The match must end on a char
/// boundary of the haystack.
fn match_len_at(haystack: &str, needle_lower: &[char]) -> Option<usize> {
    let mut want = needle_lower.iter();
    let mut next_want = want.next();
    for (idx, c) in haystack.char_indices() {
        for lc in c.to_lowercase() {
            match next_want {
                Some(&w) if w == lc => next_want = want.next(),
                _ => return None,
            }
        }
        if next_want.is_none() {
            return Some(idx + c.len_utf8());
        }
    }
    None
}

/// Byte index `width` chars before `pos`, clipped to the start of `text`.
fn context_start(text: &str, pos: usize, width: usize) -> usize {
    text[..pos]
        .char_indices()
        .rev()
        .take(width)
        .last()
        .map(|(i, _)| i)
        .unwrap_or(pos)
}

/// Byte index `width` chars after `pos`, clipped to the end of `text`.
fn context_end(text: &str, pos: usize, width: usize) -> usize {
    text[pos..]
        .char_indices()
        .take(width)
        .last()
        .map(|(i, c)| pos + i + c.len_utf8())
        .unwrap_or(pos)
}

/// Every occurrence of `keyword`, padded with up to [`PASSAGE_CONTEXT`]
/// chars of surrounding text on each side (fewer at the boundaries).
pub fn find_passages(text: &str, keyword: &str) -> Vec<String> {
    match_ranges(text, keyword)
        .into_iter()
        .map(|(start, end)| {
            let from = context_start(text, start, PASSAGE_CONTEXT);
            let to = context_end(text, end, PASSAGE_CONTEXT);
            text[from..to].to_string()
        })
        .collect()
}

/// Keyword-in-context listing for `expression`, each context side clipped
/// to `context_width` chars. Width 0 yields empty contexts but still-valid
/// matches.
pub fn concordance(text: &str, expression: &str, context_width: usize) -> Vec<KwicEntry> {
    match_ranges(text, expression)
        .into_iter()
        .map(|(start, end)| {
            let from = context_start(text, start, context_width);
            let to = context_end(text, end, context_width);
            KwicEntry {
                left: text[from..start].to_string(),
                matched: text[start..end].to_string(),
                right: text[end..to].to_string(),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn matching_is_case_insensitive() {
        let ranges = match_ranges("The CAT and the cat", "cat");
        assert_eq!(ranges.len(), 2);
        assert_eq!(&"The CAT and the cat"[ranges[0].0..ranges[0].1], "CAT");
    }

    #[test]
    fn overlapping_matches_are_all_reported() {
        assert_eq!(match_ranges("aaa", "aa"), vec![(0, 2), (1, 3)]);
    }

    #[test]
    fn empty_needle_matches_nothing() {
        assert!(match_ranges("anything", "").is_empty());
    }

    #[test]
    fn context_clipping_is_char_based() {
        // 2-byte chars; widths count chars, not bytes
        let entries = concordance("ééé★ééé", "★", 2);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].left, "éé");
        assert_eq!(entries[0].right, "éé");
    }

    #[test]
    fn width_zero_yields_empty_contexts() {
        let entries = concordance("a cat sat", "cat", 0);
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].left, "");
        assert_eq!(entries[0].matched, "cat");
        assert_eq!(entries[0].right, "");
    }
}
