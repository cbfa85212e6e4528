//! `video`, `audio` and `iframe` fences.
//!
//! The fence body is a JSON object describing the media. It becomes an empty
//! `div.<kind>-placeholder` whose `data-<kind>-<field>` attributes carry every
//! field (string fields percent-encoded) so the player can be created after
//! the markup is inserted.

use forge_template::Element;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer};
use strum_macros::{AsRefStr, Display};

use super::handler::{FenceContext, FenceHandler, parse_payload};
use crate::error::Result;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Display, AsRefStr)]
#[strum(serialize_all = "lowercase")]
pub enum MediaKind {
    Video,
    Audio,
    Iframe,
}

fn enabled() -> bool {
    true
}

fn default_width() -> u32 {
    560
}

fn default_height() -> u32 {
    315
}

/// Reads an iframe dimension written either as a number or as an attribute
/// string such as `"480"` or `"100%"`. Only the leading integer is kept.
fn dimension<'de, D: Deserializer<'de>>(deserializer: D) -> std::result::Result<u32, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Dimension {
        Number(f64),
        Text(String),
    }

    match Dimension::deserialize(deserializer)? {
        Dimension::Number(value) if (0.0..=f64::from(u32::MAX)).contains(&value) => {
            Ok(value.trunc() as u32)
        }
        Dimension::Number(value) => Err(D::Error::custom(format!("invalid dimension {value}"))),
        Dimension::Text(text) => leading_integer(&text)
            .ok_or_else(|| D::Error::custom(format!("invalid dimension {text:?}"))),
    }
}

fn leading_integer(text: &str) -> Option<u32> {
    let text = text.trim_start();
    let digits = text.len() - text.trim_start_matches(|c: char| c.is_ascii_digit()).len();
    text[..digits].parse().ok()
}

#[derive(Debug, Deserialize)]
struct VideoPayload {
    src: String,
    #[serde(default)]
    poster: String,
    #[serde(default = "enabled")]
    controls: bool,
}

#[derive(Debug, Deserialize)]
struct AudioPayload {
    src: String,
    #[serde(default = "enabled")]
    controls: bool,
    #[serde(default)]
    autoplay: bool,
    #[serde(default)]
    muted: bool,
    #[serde(default, rename = "loop")]
    looping: bool,
}

#[derive(Debug, Deserialize)]
struct IframePayload {
    src: String,
    #[serde(default = "default_width", deserialize_with = "dimension")]
    width: u32,
    #[serde(default = "default_height", deserialize_with = "dimension")]
    height: u32,
    #[serde(default)]
    title: String,
    #[serde(default, deserialize_with = "dimension")]
    frameborder: u32,
    #[serde(default)]
    allow: String,
    #[serde(default)]
    allowfullscreen: bool,
}

fn encoded(value: &str) -> String {
    urlencoding::encode(value).into_owned()
}

impl MediaKind {
    /// Field name / attribute value pairs for the placeholder.
    fn fields(&self, body: &str) -> Result<Vec<(&'static str, String)>> {
        let kind = self.as_ref();
        let fields = match self {
            Self::Video => {
                let payload: VideoPayload = parse_payload(kind, body)?;
                vec![
                    ("src", encoded(&payload.src)),
                    ("poster", encoded(&payload.poster)),
                    ("controls", payload.controls.to_string()),
                ]
            }
            Self::Audio => {
                let payload: AudioPayload = parse_payload(kind, body)?;
                vec![
                    ("src", encoded(&payload.src)),
                    ("controls", payload.controls.to_string()),
                    ("autoplay", payload.autoplay.to_string()),
                    ("muted", payload.muted.to_string()),
                    ("loop", payload.looping.to_string()),
                ]
            }
            Self::Iframe => {
                let payload: IframePayload = parse_payload(kind, body)?;
                vec![
                    ("src", encoded(&payload.src)),
                    ("width", payload.width.to_string()),
                    ("height", payload.height.to_string()),
                    ("title", encoded(&payload.title)),
                    ("frameborder", payload.frameborder.to_string()),
                    ("allow", encoded(&payload.allow)),
                    ("allowfullscreen", payload.allowfullscreen.to_string()),
                ]
            }
        };
        Ok(fields)
    }
}

/// Placeholder handler for one media kind.
#[derive(Debug, Clone, Copy)]
pub struct MediaHandler {
    kind: MediaKind,
}

impl MediaHandler {
    pub fn new(kind: MediaKind) -> Self {
        Self { kind }
    }
}

impl FenceHandler for MediaHandler {
    fn lang(&self) -> &str {
        self.kind.as_ref()
    }

    fn render(&self, body: &str, ctx: &FenceContext<'_>) -> Result<String> {
        let kind = self.kind.as_ref();
        let element = Element::new("div")
            .class(format!("{kind}-placeholder"))
            .attr("id", ctx.placeholder_id(kind, body));

        let element = self
            .kind
            .fields(body)?
            .into_iter()
            .fold(element, |element, (field, value)| {
                element.attr(format!("data-{kind}-{field}"), value)
            });

        Ok(element.render())
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::error::Error;
    use crate::markup::test_context;

    fn render(kind: MediaKind, body: &str) -> Result<String> {
        test_context(|ctx| MediaHandler::new(kind).render(body, ctx))
    }

    /// Strips the generated id so the rest of the markup can be compared.
    fn without_id(html: &str) -> String {
        let start = html.find(" id=\"").unwrap();
        let end = start + html[start + 5..].find('"').unwrap() + 6;
        format!("{}{}", &html[..start], &html[end..])
    }

    #[test]
    fn test_video_defaults() {
        let actual = render(MediaKind::Video, r#"{"src": "https://cdn.example.com/a b.mp4"}"#).unwrap();
        let expected = r#"<div class="video-placeholder" data-video-src="https%3A%2F%2Fcdn.example.com%2Fa%20b.mp4" data-video-poster="" data-video-controls="true"></div>"#;
        assert_eq!(without_id(&actual), expected);
    }

    #[test]
    fn test_audio_flags() {
        let actual = render(
            MediaKind::Audio,
            r#"{"src": "x.mp3", "autoplay": true, "loop": true, "controls": false}"#,
        )
        .unwrap();
        let expected = r#"<div class="audio-placeholder" data-audio-src="x.mp3" data-audio-controls="false" data-audio-autoplay="true" data-audio-muted="false" data-audio-loop="true"></div>"#;
        assert_eq!(without_id(&actual), expected);
    }

    #[test]
    fn test_iframe_defaults() {
        let actual = render(MediaKind::Iframe, r#"{"src": "https://example.com/embed", "title": "A & B"}"#).unwrap();
        let expected = r#"<div class="iframe-placeholder" data-iframe-src="https%3A%2F%2Fexample.com%2Fembed" data-iframe-width="560" data-iframe-height="315" data-iframe-title="A%20%26%20B" data-iframe-frameborder="0" data-iframe-allow="" data-iframe-allowfullscreen="false"></div>"#;
        assert_eq!(without_id(&actual), expected);
    }

    #[test]
    fn test_iframe_dimensions_accept_strings() {
        let actual = render(
            MediaKind::Iframe,
            r#"{"src": "e", "width": "100%", "height": " 480px", "frameborder": 1.0}"#,
        )
        .unwrap();
        assert!(actual.contains(r#"data-iframe-width="100""#));
        assert!(actual.contains(r#"data-iframe-height="480""#));
        assert!(actual.contains(r#"data-iframe-frameborder="1""#));
    }

    #[test]
    fn test_iframe_dimension_without_digits_is_an_error() {
        let actual = render(MediaKind::Iframe, r#"{"src": "e", "width": "wide"}"#);
        assert!(matches!(actual, Err(Error::InvalidPayload { ref kind, .. }) if kind == "iframe"));

        let actual = render(MediaKind::Iframe, r#"{"src": "e", "height": -5}"#);
        assert!(matches!(actual, Err(Error::InvalidPayload { .. })));
    }

    #[test]
    fn test_leading_integer() {
        assert_eq!(leading_integer("560"), Some(560));
        assert_eq!(leading_integer("100%"), Some(100));
        assert_eq!(leading_integer("auto"), None);
        assert_eq!(leading_integer(""), None);
    }

    #[test]
    fn test_placeholder_carries_kind_prefixed_id() {
        let actual = render(MediaKind::Video, r#"{"src": "a.mp4"}"#).unwrap();
        assert!(actual.contains(r#" id="video-"#));
    }

    #[test]
    fn test_missing_src_is_an_error() {
        let actual = render(MediaKind::Iframe, r#"{"width": 100}"#);
        assert!(matches!(actual, Err(Error::InvalidPayload { .. })));
    }

    #[test]
    fn test_malformed_json_is_an_error() {
        let actual = render(MediaKind::Audio, "{src: nope");
        assert!(matches!(actual, Err(Error::InvalidPayload { ref kind, .. }) if kind == "audio"));
    }
}
