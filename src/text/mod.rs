//! # Text Utilities
//!
//! Line breaking for the headless measurement backend and whitespace
//! snapping for paragraph splits.
//!
//! All offsets are character offsets, not byte offsets.

use unicode_linebreak::{linebreaks, BreakOpportunity};

/// A line produced by [`break_into_lines`], as a half-open char range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineSpan {
    pub start: usize,
    pub end: usize,
}

/// Compute UAX#14 break opportunities indexed by char position.
///
/// Returns a vec of length `text.chars().count()`. Each entry is the break
/// opportunity *before* that character position (i.e. "can we break before
/// char[i]?"). Index 0 is always `None` (no break before the first char).
fn compute_break_opportunities(text: &str) -> Vec<Option<BreakOpportunity>> {
    let char_count = text.chars().count();
    let mut result = vec![None; char_count];

    // linebreaks() reports the byte offset where the next segment starts
    let byte_to_char: Vec<usize> = {
        let mut map = vec![0usize; text.len() + 1];
        for (char_idx, (byte_idx, _)) in text.char_indices().enumerate() {
            map[byte_idx] = char_idx;
        }
        map[text.len()] = char_count;
        map
    };

    for (byte_offset, opp) in linebreaks(text) {
        let char_idx = byte_to_char[byte_offset];
        if char_idx > 0 && char_idx < char_count {
            result[char_idx] = Some(opp);
        }
    }

    result
}

/// Break `text` into lines no wider than `max_width`.
///
/// Greedy: a line is closed at the last allowed break once the next
/// non-whitespace character would not fit. Trailing whitespace hangs past
/// the edge. A word wider than the line is broken between characters.
/// Always returns at least one line, even for empty text.
pub fn break_into_lines(
    text: &str,
    max_width: f64,
    char_width: impl Fn(char) -> f64,
) -> Vec<LineSpan> {
    let chars: Vec<char> = text.chars().collect();
    if chars.is_empty() {
        return vec![LineSpan { start: 0, end: 0 }];
    }

    let opps = compute_break_opportunities(text);
    let mut lines = Vec::new();
    let mut line_start = 0;
    let mut line_width = 0.0;
    let mut last_break: Option<usize> = None;

    for (i, &ch) in chars.iter().enumerate() {
        if i > line_start {
            match opps[i] {
                Some(BreakOpportunity::Mandatory) => {
                    lines.push(LineSpan {
                        start: line_start,
                        end: i,
                    });
                    line_start = i;
                    line_width = 0.0;
                    last_break = None;
                }
                Some(BreakOpportunity::Allowed) => last_break = Some(i),
                None => {}
            }
        }

        let w = char_width(ch);
        if !ch.is_whitespace() && i > line_start && line_width + w > max_width {
            let brk = last_break.unwrap_or(i);
            lines.push(LineSpan {
                start: line_start,
                end: brk,
            });
            line_start = brk;
            last_break = None;
            line_width = chars[brk..i].iter().map(|&c| char_width(c)).sum();
        }
        line_width += w;
    }

    lines.push(LineSpan {
        start: line_start,
        end: chars.len(),
    });
    lines
}

/// Move `offset` to the nearest whitespace character within `window` chars.
///
/// The returned offset points *at* the whitespace, so a split there leaves
/// the preceding word intact on the first half. On equal distance the
/// earlier position wins.
pub fn snap_to_whitespace(text: &str, offset: usize, window: usize) -> Option<usize> {
    let chars: Vec<char> = text.chars().collect();
    let is_ws = |p: usize| chars.get(p).is_some_and(|c| c.is_whitespace());

    for d in 0..=window {
        if d <= offset && is_ws(offset - d) {
            return Some(offset - d);
        }
        if d > 0 && is_ws(offset + d) {
            return Some(offset + d);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn texts(text: &str, lines: &[LineSpan]) -> Vec<String> {
        let chars: Vec<char> = text.chars().collect();
        lines
            .iter()
            .map(|l| chars[l.start..l.end].iter().collect())
            .collect()
    }

    #[test]
    fn empty_text_is_one_line() {
        assert_eq!(
            break_into_lines("", 100.0, |_| 10.0),
            vec![LineSpan { start: 0, end: 0 }]
        );
    }

    #[test]
    fn breaks_at_spaces() {
        let text = "aaa bbb ccc";
        let lines = break_into_lines(text, 70.0, |_| 10.0);
        assert_eq!(texts(text, &lines), vec!["aaa bbb ", "ccc"]);
    }

    #[test]
    fn trailing_space_hangs() {
        // "aaa " is 40 wide but the space doesn't count against the edge
        let text = "aaa bbb";
        let lines = break_into_lines(text, 30.0, |_| 10.0);
        assert_eq!(texts(text, &lines), vec!["aaa ", "bbb"]);
    }

    #[test]
    fn long_word_breaks_mid_word() {
        let text = "abcdefgh";
        let lines = break_into_lines(text, 30.0, |_| 10.0);
        assert_eq!(texts(text, &lines), vec!["abc", "def", "gh"]);
    }

    #[test]
    fn newline_forces_break() {
        let text = "a\nb\nc";
        let lines = break_into_lines(text, 1000.0, |_| 10.0);
        assert_eq!(texts(text, &lines), vec!["a\n", "b\n", "c"]);
    }

    #[test]
    fn snap_prefers_nearest_whitespace() {
        // whitespace at 505, straddle at 512, no whitespace after within the window
        let mut text = "x".repeat(505);
        text.push(' ');
        text.push_str(&"y".repeat(100));
        assert_eq!(snap_to_whitespace(&text, 512, 30), Some(505));
    }

    #[test]
    fn snap_on_whitespace_stays() {
        assert_eq!(snap_to_whitespace("ab cd", 2, 30), Some(2));
    }

    #[test]
    fn snap_tie_prefers_earlier() {
        assert_eq!(snap_to_whitespace("a b c", 2, 30), Some(1));
    }

    #[test]
    fn snap_outside_window_fails() {
        let text = format!("{} {}", "x".repeat(50), "y".repeat(50));
        assert_eq!(snap_to_whitespace(&text, 10, 30), None);
    }
}
