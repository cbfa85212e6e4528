//! Repair malformed markdown before parsing.
//!
//! Models frequently close a code fence on the same line as the last line of
//! code (`}```). The markdown engine would keep the block open until the end
//! of the document, swallowing everything after it.

use std::borrow::Cow;

use crate::fence::FenceScanner;

/// Rewrites glued closing fences inside code blocks as separate lines.
///
/// Text outside fenced blocks is never modified. Returns the input unchanged
/// (borrowed) when nothing needed repair.
pub fn repair_fences(text: &str) -> Cow<'_, str> {
    let mut scanner = FenceScanner::default();
    let mut repaired: Option<String> = None;
    let mut offset = 0;

    for line in text.split_inclusive('\n') {
        let split = split_embedded_fence(line).filter(|(_, fence)| scanner.matches_marker(fence));

        match split {
            Some((content, fence)) => {
                let out = repaired.get_or_insert_with(|| text[..offset].to_string());
                out.push_str(content);
                out.push('\n');
                out.push_str(fence);
                if line.ends_with('\n') {
                    out.push('\n');
                }
                scanner.close();
            }
            None => {
                if let Some(out) = repaired.as_mut() {
                    out.push_str(line);
                }
                scanner.feed(line, offset);
            }
        }
        offset += line.len();
    }

    match repaired {
        Some(text) => Cow::Owned(text),
        None => Cow::Borrowed(text),
    }
}

/// Split a line if it contains an embedded closing fence at the end.
/// e.g., `}``` ` becomes Some((`}`, ```` ``` ````))
pub(crate) fn split_embedded_fence(line: &str) -> Option<(&str, &'static str)> {
    let trimmed = line.trim_end();

    for fence in ["```", "~~~"] {
        if let Some(stripped) = trimmed.strip_suffix(fence)
            && !stripped.trim().is_empty()
            && !stripped.ends_with(&fence[..1])
        {
            return Some((stripped, fence));
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_normal_text_unchanged() {
        let fixture = "hello world\n\nmore text";
        let actual = repair_fences(fixture);
        assert!(matches!(actual, Cow::Borrowed(_)));
        assert_eq!(actual, fixture);
    }

    #[test]
    fn test_valid_fences_unchanged() {
        let fixture = "```rust\nfn main() {}\n```\n";
        let actual = repair_fences(fixture);
        assert!(matches!(actual, Cow::Borrowed(_)));
    }

    #[test]
    fn test_embedded_fence_not_split_outside_code_block() {
        let fixture = "return x;```\n";
        let actual = repair_fences(fixture);
        assert_eq!(actual, fixture);
    }

    #[test]
    fn test_embedded_backtick_fence_split_in_code_block() {
        let fixture = "```js\nfoo() {\n}```\nafter";
        let actual = repair_fences(fixture);
        let expected = "```js\nfoo() {\n}\n```\nafter";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_embedded_tilde_fence_split_in_code_block() {
        let fixture = "~~~\nreturn x;~~~";
        let actual = repair_fences(fixture);
        let expected = "~~~\nreturn x;\n~~~";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_indented_content_keeps_indent() {
        let fixture = "```\n     }```\n";
        let actual = repair_fences(fixture);
        let expected = "```\n     }\n```\n";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_mismatched_marker_is_not_split() {
        let fixture = "````
x```
~~~
";
        let actual = repair_fences(fixture);
        assert!(matches!(actual, Cow::Borrowed(_)));
    }

    #[test]
    fn test_whitespace_only_before_fence_is_a_real_fence() {
        assert_eq!(split_embedded_fence("   ```"), None);
        assert_eq!(split_embedded_fence("\t```"), None);
    }

    #[test]
    fn test_longer_fence_run_is_not_split() {
        assert_eq!(split_embedded_fence("````"), None);
    }
}
