//! Separation of `<think>...</think>` reasoning segments from visible text.

use std::sync::LazyLock;

use regex::Regex;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::fence::is_inside_code;

static DEFAULT_SPLITTER: LazyLock<ThinkSplitter> = LazyLock::new(|| {
    ThinkSplitter::new("think").expect("the default think pattern is a valid regex")
});

/// Text with its closed reasoning segments pulled out.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ThinkSplit {
    /// The input with every closed segment (tags included) removed.
    pub visible_text: String,
    /// Inner contents of the closed segments, concatenated in order.
    pub thinking_text: String,
}

/// Splits reasoning segments delimited by `<tag>` and `</tag>`.
///
/// Only closed segments are matched. An opening tag without a closing tag
/// stays in the visible text together with everything after it.
#[derive(Debug, Clone)]
pub struct ThinkSplitter {
    open: String,
    pattern: Regex,
}

impl Default for ThinkSplitter {
    fn default() -> Self {
        DEFAULT_SPLITTER.clone()
    }
}

impl ThinkSplitter {
    pub fn new(tag: &str) -> Result<Self> {
        let open = format!("<{tag}>");
        let close = format!("</{tag}>");
        let pattern = format!("(?s){}(.*?){}", regex::escape(&open), regex::escape(&close));
        let pattern = Regex::new(&pattern)
            .map_err(|source| Error::ThinkTag { tag: tag.to_string(), source })?;
        Ok(Self { open, pattern })
    }

    /// The literal opening tag, e.g. `<think>`.
    pub fn open_tag(&self) -> &str {
        &self.open
    }

    pub fn split(&self, text: &str) -> ThinkSplit {
        let mut visible_text = String::with_capacity(text.len());
        let mut thinking_text = String::new();
        let mut last = 0;

        for captures in self.pattern.captures_iter(text) {
            let (Some(segment), Some(inner)) = (captures.get(0), captures.get(1)) else {
                continue;
            };
            visible_text.push_str(&text[last..segment.start()]);
            thinking_text.push_str(inner.as_str());
            last = segment.end();
        }
        visible_text.push_str(&text[last..]);

        ThinkSplit { visible_text, thinking_text }
    }

    /// Byte offset of an opening tag in `visible` that has no closing tag.
    ///
    /// Expects text already passed through [`split`](Self::split), where any
    /// remaining opening tag is unterminated. Tags quoted inside code spans or
    /// fenced blocks are not reasoning markers and are skipped.
    pub fn dangling_open(&self, visible: &str) -> Option<usize> {
        visible
            .match_indices(&self.open)
            .map(|(pos, _)| pos)
            .find(|pos| !is_inside_code(visible, *pos))
    }
}

/// Splits `<think>` segments using the default tag.
pub fn split_thinking(text: &str) -> ThinkSplit {
    DEFAULT_SPLITTER.split(text)
}

/// Escapes reasoning text for display as HTML text with line breaks.
pub fn escape_for_display(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\n' => out.push_str("<br>"),
            c => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn split(visible_text: &str, thinking_text: &str) -> ThinkSplit {
        ThinkSplit { visible_text: visible_text.to_string(), thinking_text: thinking_text.to_string() }
    }

    #[test]
    fn test_closed_segment_is_removed() {
        let actual = split_thinking("A<think>B</think>C");
        let expected = split("AC", "B");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_unterminated_segment_stays_visible() {
        let actual = split_thinking("A<think>B");
        let expected = split("A<think>B", "");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_no_segments() {
        let actual = split_thinking("plain text");
        let expected = split("plain text", "");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_multiple_segments_span_lines() {
        let fixture = "<think>one\ntwo</think>Answer <think>three</think>done";
        let actual = split_thinking(fixture);
        let expected = split("Answer done", "one\ntwothree");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_segments_match_lazily() {
        let actual = split_thinking("<think>a</think>x</think>");
        let expected = split("x</think>", "a");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_custom_tag() {
        let splitter = ThinkSplitter::new("reasoning").unwrap();
        let actual = splitter.split("<think>kept</think><reasoning>gone</reasoning>");
        let expected = split("<think>kept</think>", "gone");
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_dangling_open_after_split() {
        let splitter = ThinkSplitter::default();
        let visible = splitter.split("A<think>B</think>C<think>D").visible_text;
        assert_eq!(visible, "AC<think>D");
        assert_eq!(splitter.dangling_open(&visible), Some(2));
        assert_eq!(splitter.dangling_open("AC"), None);
    }

    #[test]
    fn test_quoted_tag_is_not_dangling() {
        let splitter = ThinkSplitter::default();
        assert_eq!(splitter.dangling_open("Write `<think>` first."), None);
        assert_eq!(splitter.dangling_open("```xml\n<think>\n"), None);

        let fixture = "Use `<think>` like so: <think>real";
        assert_eq!(splitter.dangling_open(fixture), fixture.rfind("<think>"));
    }

    #[test]
    fn test_escape_for_display() {
        let actual = escape_for_display("if a < b && c > d\nthen <b>");
        insta::assert_snapshot!(actual, @"if a &lt; b &amp;&amp; c &gt; d<br>then &lt;b&gt;");
    }
}
