//! Detection of safe render boundaries in partially streamed markdown.
//!
//! The detector is a heuristic over the tail of the text, not a grammar: a
//! prefix is "complete" when nothing near its end is still waiting for a
//! closing delimiter. Wrongly rejecting a prefix only delays output; wrongly
//! accepting one lets a half-formed construct reach the view, so every check
//! errs on the rejecting side.

const FENCE: &str = "```";

/// Decides whether a text prefix ends on a complete syntactic unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoundaryDetector {
    window: usize,
}

impl Default for BoundaryDetector {
    fn default() -> Self {
        Self::new(4 * 1024)
    }
}

/// Checks `text` with the default trailing window.
pub fn is_complete_prefix(text: &str) -> bool {
    BoundaryDetector::default().is_complete_prefix(text)
}

impl BoundaryDetector {
    /// Creates a detector that inspects at most `window` trailing bytes.
    pub fn new(window: usize) -> Self {
        Self { window: window.max(1) }
    }

    pub fn is_complete_prefix(&self, text: &str) -> bool {
        self.is_complete_with_fence_parity(text, has_odd_fences(text))
    }

    /// Same as [`is_complete_prefix`](Self::is_complete_prefix), with the
    /// fence parity of `text` supplied by a caller that already tracks it.
    /// Only the trailing window of `text` is inspected.
    pub(crate) fn is_complete_with_fence_parity(&self, text: &str, odd_fences: bool) -> bool {
        if text.is_empty() {
            return true;
        }

        // Inside an unterminated fence everything is literal code, so the
        // partial block may render as-is.
        if odd_fences {
            return true;
        }

        let Some(tail) = mask_inline(self.trailing_window(text)) else {
            return false;
        };

        !(ends_with_dangling_marker(&tail)
            || has_open_emphasis(&tail)
            || has_open_tag(&tail)
            || has_open_bracket(&tail))
    }

    /// The part of `text` the inline checks look at: bounded by the window
    /// size, the last paragraph break and the last fence line.
    fn trailing_window<'a>(&self, text: &'a str) -> &'a str {
        let mut start = text.len().saturating_sub(self.window);
        while !text.is_char_boundary(start) {
            start += 1;
        }
        let window = &text[start..];

        let mut skip = 0;
        if let Some(pos) = window.rfind("\n\n") {
            skip = pos + 2;
        }
        if let Some(pos) = window.rfind(FENCE) {
            let line_end = window[pos..]
                .find('\n')
                .map_or(window.len(), |nl| pos + nl + 1);
            skip = skip.max(line_end);
        }
        &window[skip..]
    }
}

/// Whether `text` holds an odd number of fence markers.
pub(crate) fn has_odd_fences(text: &str) -> bool {
    fence_markers(text) % 2 == 1
}

/// Number of fence markers in `text`, counted without overlap.
pub(crate) fn fence_markers(text: &str) -> usize {
    text.matches(FENCE).count()
}

/// Replaces escaped characters and closed inline code spans with a neutral
/// placeholder so delimiter checks ignore them.
///
/// Returns `None` while an inline code span is still open.
fn mask_inline(text: &str) -> Option<Vec<char>> {
    let chars: Vec<char> = text.chars().collect();
    let mut out = Vec::with_capacity(chars.len());
    let mut code_run: Option<usize> = None;
    let mut i = 0;

    while i < chars.len() {
        let c = chars[i];
        if c == '`' {
            let run = chars[i..].iter().take_while(|c| **c == '`').count();
            match code_run {
                Some(open) if open == run => {
                    code_run = None;
                    out.push('x');
                }
                Some(_) => {}
                None => code_run = Some(run),
            }
            i += run;
            continue;
        }
        if code_run.is_none() {
            if c == '\\' && i + 1 < chars.len() {
                out.push('x');
                i += 2;
                continue;
            }
            out.push(c);
        }
        i += 1;
    }

    code_run.is_none().then_some(out)
}

fn is_marker(c: char) -> bool {
    c == '*' || c == '_'
}

/// A marker run at the very end that could still open emphasis, or a `]`
/// that may still be followed by a link destination.
fn ends_with_dangling_marker(tail: &[char]) -> bool {
    let Some(&last) = tail.last() else {
        return false;
    };
    if last == ']' {
        return true;
    }
    if !is_marker(last) {
        return false;
    }
    let run = tail.iter().rev().take_while(|c| **c == last).count();
    tail.len() == run || tail[tail.len() - run - 1].is_whitespace()
}

/// Walks `*`/`_` delimiter runs, pairing closers with earlier openers of the
/// same character. Anything left unpaired means emphasis is still open.
fn has_open_emphasis(tail: &[char]) -> bool {
    let mut openers: Vec<(char, usize)> = Vec::new();
    let mut i = 0;

    while i < tail.len() {
        let c = tail[i];
        if !is_marker(c) {
            i += 1;
            continue;
        }
        let run = tail[i..].iter().take_while(|x| **x == c).count();
        let prev = if i == 0 { ' ' } else { tail[i - 1] };
        let next = tail.get(i + run).copied().unwrap_or(' ');
        i += run;

        let left_flanking = !next.is_whitespace();
        let right_flanking = !prev.is_whitespace();
        if !left_flanking && !right_flanking {
            continue;
        }
        if c == '_' && prev.is_alphanumeric() && next.is_alphanumeric() {
            continue;
        }

        let mut remaining = run;
        if right_flanking {
            while remaining > 0 {
                let Some(idx) = openers.iter().rposition(|(m, _)| *m == c) else {
                    break;
                };
                let used = openers[idx].1.min(remaining);
                openers[idx].1 -= used;
                remaining -= used;
                if openers[idx].1 == 0 {
                    openers.remove(idx);
                }
            }
        }
        if remaining > 0 && left_flanking {
            openers.push((c, remaining));
        }
    }

    !openers.is_empty()
}

/// A `<` that starts something tag-like with no `>` after it.
fn has_open_tag(tail: &[char]) -> bool {
    let Some(lt) = tail.iter().rposition(|c| *c == '<') else {
        return false;
    };
    let tag_like = match tail.get(lt + 1) {
        None => true,
        Some(c) => c.is_ascii_alphabetic() || *c == '/' || *c == '!',
    };
    tag_like && !tail[lt..].contains(&'>')
}

/// An opening bracket whose last occurrence comes after the last matching
/// closer. Deliberately not nesting-aware.
fn has_open_bracket(tail: &[char]) -> bool {
    [('(', ')'), ('[', ']'), ('{', '}')]
        .into_iter()
        .any(|(open, close)| {
            let last_open = tail.iter().rposition(|c| *c == open);
            let last_close = tail.iter().rposition(|c| *c == close);
            last_open > last_close
        })
}
