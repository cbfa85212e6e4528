//! Line-level tracking of fenced code blocks.
//!
//! This is a lightweight scanner, not a markdown parser: it understands
//! top-level backtick and tilde fences indented by at most three spaces, which
//! is what streamed model output uses in practice.

use crate::repair::split_embedded_fence;

/// An opening or closing fence line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct FenceMarker<'a> {
    marker: char,
    len: usize,
    info: &'a str,
}

fn parse_marker(line: &str) -> Option<FenceMarker<'_>> {
    let line = line.trim_end_matches(['\n', '\r']);
    let indent = line.len() - line.trim_start_matches(' ').len();
    if indent > 3 {
        return None;
    }
    let rest = &line[indent..];
    let marker = rest.chars().next().filter(|c| *c == '`' || *c == '~')?;
    let len = rest.chars().take_while(|c| *c == marker).count();
    if len < 3 {
        return None;
    }
    let info = rest[len..].trim();
    // Backtick fences cannot carry backticks in their info string.
    if marker == '`' && info.contains('`') {
        return None;
    }
    Some(FenceMarker { marker, len, info })
}

/// A fenced block that has been opened but not closed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct OpenFence<'a> {
    /// Byte offset of the opening fence line.
    pub start: usize,
    /// Full info string of the opening fence.
    pub info: &'a str,
    /// Whether the opening line has been terminated by a newline.
    pub info_complete: bool,
}

impl<'a> OpenFence<'a> {
    /// First word of the info string, the block's language.
    pub fn lang(&self) -> &'a str {
        self.info.split_whitespace().next().unwrap_or_default()
    }
}

/// Incremental fence state over a sequence of lines.
#[derive(Debug, Default)]
pub(crate) struct FenceScanner<'a> {
    open: Option<(FenceMarker<'a>, OpenFence<'a>)>,
}

impl<'a> FenceScanner<'a> {
    /// Feeds one line (including its trailing newline, if any) that starts at
    /// byte `offset`.
    pub(crate) fn feed(&mut self, line: &'a str, offset: usize) {
        let Some(found) = parse_marker(line) else {
            return;
        };
        match &self.open {
            Some((opening, _)) => {
                if found.marker == opening.marker && found.len >= opening.len && found.info.is_empty()
                {
                    self.open = None;
                }
            }
            None => {
                let fence = OpenFence {
                    start: offset,
                    info: found.info,
                    info_complete: line.ends_with('\n'),
                };
                self.open = Some((found, fence));
            }
        }
    }

    /// Feeds one line, also treating a closing fence glued to the end of a
    /// code line as closing the block.
    pub(crate) fn advance(&mut self, line: &'a str, offset: usize) {
        let glued_close = split_embedded_fence(line)
            .is_some_and(|(_, fence)| self.matches_marker(fence));
        if glued_close {
            self.close();
        } else {
            self.feed(line, offset);
        }
    }

    /// Whether a bare marker run `fence` can close the open block.
    pub(crate) fn matches_marker(&self, fence: &str) -> bool {
        self.open.is_some_and(|(opening, _)| {
            fence.starts_with(opening.marker) && fence.len() >= opening.len
        })
    }

    pub(crate) fn close(&mut self) {
        self.open = None;
    }

    pub(crate) fn open_fence(&self) -> Option<OpenFence<'a>> {
        self.open.map(|(_, fence)| fence)
    }
}

/// Reports the fenced block left open at the end of `text`, if any.
pub fn open_fence(text: &str) -> Option<OpenFence<'_>> {
    let mut scanner = FenceScanner::default();
    let mut offset = 0;
    for line in text.split_inclusive('\n') {
        scanner.advance(line, offset);
        offset += line.len();
    }
    scanner.open_fence()
}

/// Whether byte offset `pos` of `text` falls inside a fenced block or an
/// unterminated inline code span.
pub(crate) fn is_inside_code(text: &str, pos: usize) -> bool {
    let before = &text[..pos];
    let mut scanner = FenceScanner::default();
    let mut segment_start = 0;
    let mut offset = 0;

    for line in before.split_inclusive('\n') {
        let was_in_code = scanner.open_fence().is_some();
        scanner.advance(line, offset);
        offset += line.len();
        // Code spans never cross blank lines or fence lines.
        if was_in_code || scanner.open_fence().is_some() || line.trim().is_empty() {
            segment_start = offset;
        }
    }

    scanner.open_fence().is_some() || has_open_code_span(&before[segment_start..])
}

fn has_open_code_span(segment: &str) -> bool {
    let bytes = segment.as_bytes();
    let mut open: Option<usize> = None;
    let mut i = 0;

    while i < bytes.len() {
        match bytes[i] {
            b'\\' if open.is_none() => i += 2,
            b'`' => {
                let run = bytes[i..].iter().take_while(|b| **b == b'`').count();
                open = match open {
                    Some(len) if len == run => None,
                    Some(len) => Some(len),
                    None => Some(run),
                };
                i += run;
            }
            _ => i += 1,
        }
    }

    open.is_some()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_no_fence() {
        assert_eq!(open_fence("plain text\nmore"), None);
    }

    #[test]
    fn test_closed_fence() {
        assert_eq!(open_fence("```rust\nfn main() {}\n```\n"), None);
    }

    #[test]
    fn test_open_fence_reports_offset_and_lang() {
        let fixture = "intro\n\n```echarts title\n{\"a\":";
        let actual = open_fence(fixture).unwrap();
        assert_eq!(actual.start, 7);
        assert_eq!(actual.lang(), "echarts");
        assert!(actual.info_complete);
    }

    #[test]
    fn test_opening_line_still_arriving() {
        let actual = open_fence("intro\n```ech").unwrap();
        assert_eq!(actual.lang(), "ech");
        assert!(!actual.info_complete);
    }

    #[test]
    fn test_shorter_marker_does_not_close() {
        let fixture = "````md\n```\ninner\n";
        let actual = open_fence(fixture).unwrap();
        assert_eq!(actual.start, 0);
        assert_eq!(actual.lang(), "md");
    }

    #[test]
    fn test_tilde_fence() {
        assert_eq!(open_fence("~~~\ncode\n~~~\n"), None);
        assert!(open_fence("~~~python\ncode\n").is_some());
    }

    #[test]
    fn test_glued_closing_fence_closes() {
        assert_eq!(open_fence("```js\nfoo()```\nafter\n"), None);
    }

    #[test]
    fn test_inside_code() {
        let fixture = "plain <a>\n```html\n<b>\n```\nuse `<c>` and `<d>";
        let pos = |needle: &str| fixture.find(needle).unwrap();
        assert!(!is_inside_code(fixture, pos("<a>")));
        assert!(is_inside_code(fixture, pos("<b>")));
        assert!(is_inside_code(fixture, pos("<c>")));
        assert!(is_inside_code(fixture, pos("<d>")));
    }

    #[test]
    fn test_code_span_does_not_cross_paragraphs() {
        let fixture = "a `stray\n\nthen <x>";
        assert!(!is_inside_code(fixture, fixture.find("<x>").unwrap()));
    }

    #[test]
    fn test_closed_code_span_is_outside() {
        let fixture = "`a` then \\`b <x>";
        assert!(!is_inside_code(fixture, fixture.find("<x>").unwrap()));
    }

    #[test]
    fn test_deep_indent_is_not_a_fence() {
        assert_eq!(open_fence("    ```\ncode\n"), None);
    }
}
