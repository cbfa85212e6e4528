use forge_template::Element;

use super::formula::FormulaEngine;
use super::ids::PlaceholderIds;
use crate::error::{Error, Result};

/// Per-block data handed to a [`FenceHandler`].
pub struct FenceContext<'a> {
    /// 1-based position of this reserved block within the document.
    pub ordinal: usize,
    pub(crate) ids: &'a PlaceholderIds,
    pub(crate) formula: &'a dyn FormulaEngine,
}

impl FenceContext<'_> {
    /// Unique, render-stable element id for the current block.
    pub fn placeholder_id(&self, kind: &str, body: &str) -> String {
        self.ids.id(kind, self.ordinal, body)
    }

    pub fn formula(&self) -> &dyn FormulaEngine {
        self.formula
    }
}

/// Renders the body of a fenced block with a reserved info-string.
///
/// Handlers return their own markup or an error; the engine turns errors into
/// a visible `<lang>-error` block so one bad block never aborts a document.
pub trait FenceHandler: Send + Sync {
    /// Info-string (first word) this handler is registered under.
    fn lang(&self) -> &str;

    fn render(&self, body: &str, ctx: &FenceContext<'_>) -> Result<String>;
}

/// Shared header strip used above code blocks and reserved containers.
pub(crate) fn lang_header(lang: &str) -> Element {
    Element::new("div.code-block-header").append(Element::new("span.code-block-header__lang").text(lang))
}

/// Visible, non-fatal replacement for a block that failed to render.
pub(crate) fn error_placeholder(lang: &str, error: &Error) -> String {
    Element::new("div")
        .class(format!("{lang}-error"))
        .text(error.to_string())
        .render()
}

/// Parses a reserved block's JSON payload, tagging failures with its kind.
pub(crate) fn parse_payload<T: serde::de::DeserializeOwned>(kind: &str, body: &str) -> Result<T> {
    serde_json::from_str(body)
        .map_err(|source| Error::InvalidPayload { kind: kind.to_string(), source })
}
