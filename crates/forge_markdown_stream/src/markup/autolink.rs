//! Links for bare URLs in plain text.

use std::sync::LazyLock;

use pulldown_cmark::{CowStr, Event, LinkType, Tag, TagEnd};
use regex::Regex;

static URL: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:https?://|www\.)[^\s<>]+").expect("the url pattern is a valid regex")
});

/// Punctuation that ends a sentence rather than a URL.
const TRAILING: &str = ".,:;!?'\"*_~]}";

/// A URL found in text.
#[derive(Debug, Clone, PartialEq, Eq)]
struct UrlMatch {
    start: usize,
    end: usize,
    href: String,
}

/// Drops sentence punctuation and unbalanced closing parentheses from the
/// end of a URL candidate.
fn trim_trailing(url: &str) -> &str {
    let mut url = url;
    while let Some(last) = url.chars().last() {
        let unbalanced = last == ')' && url.matches('(').count() < url.matches(')').count();
        if !TRAILING.contains(last) && !unbalanced {
            break;
        }
        url = &url[..url.len() - last.len_utf8()];
    }
    url
}

fn find_urls(text: &str) -> Vec<UrlMatch> {
    URL.find_iter(text)
        .filter_map(|found| {
            let url = trim_trailing(found.as_str());
            let lower = url.to_ascii_lowercase();
            let prefix = ["https://", "http://", "www."]
                .into_iter()
                .find(|prefix| lower.starts_with(prefix))?;
            if url.len() == prefix.len() {
                return None;
            }
            let href = if prefix == "www." { format!("http://{url}") } else { url.to_string() };
            Some(UrlMatch { start: found.start(), end: found.start() + url.len(), href })
        })
        .collect()
}

/// Pushes `text` as text events, wrapping every bare URL in a link.
pub(super) fn push_linked<'a>(events: &mut Vec<Event<'a>>, text: CowStr<'a>) {
    let urls = find_urls(&text);
    if urls.is_empty() {
        events.push(Event::Text(text));
        return;
    }

    let mut last = 0;
    for url in urls {
        if url.start > last {
            events.push(Event::Text(text[last..url.start].to_string().into()));
        }
        events.push(Event::Start(Tag::Link {
            link_type: LinkType::Autolink,
            dest_url: url.href.into(),
            title: CowStr::Borrowed(""),
            id: CowStr::Borrowed(""),
        }));
        events.push(Event::Text(text[url.start..url.end].to_string().into()));
        events.push(Event::End(TagEnd::Link));
        last = url.end;
    }
    if last < text.len() {
        events.push(Event::Text(text[last..].to_string().into()));
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    fn hrefs(text: &str) -> Vec<String> {
        find_urls(text).into_iter().map(|url| url.href).collect()
    }

    #[test]
    fn test_url_in_sentence() {
        let fixture = "See https://example.com/a?b=1 for details.";
        let actual = find_urls(fixture);
        let expected = vec![UrlMatch {
            start: 4,
            end: 29,
            href: "https://example.com/a?b=1".to_string(),
        }];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_trailing_punctuation_is_not_part_of_the_url() {
        let actual = hrefs("Go to https://example.com. Or (http://example.org), \"https://a.io\"!");
        let expected = vec!["https://example.com", "http://example.org", "https://a.io"];
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_balanced_parentheses_are_kept() {
        let actual = hrefs("(see https://en.wikipedia.org/wiki/Rust_(language))");
        assert_eq!(actual, vec!["https://en.wikipedia.org/wiki/Rust_(language)"]);
    }

    #[test]
    fn test_www_gets_a_scheme() {
        let actual = hrefs("visit www.example.com today");
        assert_eq!(actual, vec!["http://www.example.com"]);
    }

    #[test]
    fn test_bare_scheme_is_not_a_url() {
        assert_eq!(hrefs("the https:// prefix and www. alone"), Vec::<String>::new());
        assert_eq!(hrefs("no links here"), Vec::<String>::new());
    }

    #[test]
    fn test_push_linked_splits_text() {
        let mut actual = Vec::new();
        push_linked(&mut actual, CowStr::Borrowed("a www.x.io b"));
        let expected = vec![
            Event::Text("a ".into()),
            Event::Start(Tag::Link {
                link_type: LinkType::Autolink,
                dest_url: "http://www.x.io".into(),
                title: "".into(),
                id: "".into(),
            }),
            Event::Text("www.x.io".into()),
            Event::End(TagEnd::Link),
            Event::Text(" b".into()),
        ];
        assert_eq!(actual, expected);
    }
}
