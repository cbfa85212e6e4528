//! Renderer configuration.

use derive_setters::Setters;
use pulldown_cmark::Options;
use serde::{Deserialize, Serialize};
use strum::IntoEnumIterator;
use strum_macros::{AsRefStr, Display, EnumIter, EnumString};

/// Fence languages that render as placeholder markup instead of code.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    Serialize,
    Deserialize,
    Display,
    EnumString,
    EnumIter,
    AsRefStr,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ReservedKind {
    Mermaid,
    Echarts,
    Video,
    Audio,
    Iframe,
    Math,
}

/// Markdown extensions passed to the parser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[serde(default)]
pub struct MarkdownOptions {
    pub tables: bool,
    pub strikethrough: bool,
    pub tasklists: bool,
    pub footnotes: bool,
    pub smart_punctuation: bool,
    /// `$inline$` and `$$display$$` formula spans.
    pub math: bool,
    /// Turn bare `http(s)://` and `www.` URLs in text into links.
    pub linkify: bool,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklists: true,
            footnotes: true,
            smart_punctuation: false,
            math: true,
            linkify: true,
        }
    }
}

impl MarkdownOptions {
    pub fn to_parser_options(&self) -> Options {
        let mut options = Options::empty();
        let flags = [
            (self.tables, Options::ENABLE_TABLES),
            (self.strikethrough, Options::ENABLE_STRIKETHROUGH),
            (self.tasklists, Options::ENABLE_TASKLISTS),
            (self.footnotes, Options::ENABLE_FOOTNOTES),
            (self.smart_punctuation, Options::ENABLE_SMART_PUNCTUATION),
            (self.math, Options::ENABLE_MATH),
        ];
        for (enabled, flag) in flags {
            if enabled {
                options.insert(flag);
            }
        }
        options
    }
}

/// Configuration shared by the markup engine and the incremental renderer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Setters)]
#[serde(default)]
#[setters(into)]
pub struct RenderConfig {
    pub markdown: MarkdownOptions,

    /// Reserved fence kinds that get placeholder handlers.
    pub reserved: Vec<ReservedKind>,

    /// Upper bound, in bytes, of the text the boundary detector inspects.
    pub trailing_window: usize,

    /// Hold back an unterminated reserved fence until it closes.
    pub hold_reserved_fences: bool,

    /// Render raw HTML found in the markdown as literal text.
    pub escape_raw_html: bool,

    /// Split closing fences glued to the end of a code line.
    pub repair_fences: bool,

    /// Tag name delimiting reasoning segments, without angle brackets.
    pub think_tag: String,
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            markdown: MarkdownOptions::default(),
            reserved: ReservedKind::iter().collect(),
            trailing_window: 4 * 1024,
            hold_reserved_fences: true,
            escape_raw_html: true,
            repair_fences: true,
            think_tag: "think".to_string(),
        }
    }
}
