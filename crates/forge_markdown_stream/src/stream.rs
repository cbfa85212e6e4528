//! Per-message streaming state on top of [`IncrementalRenderer`].

use std::sync::Arc;

use serde::Serialize;

use crate::incremental::{IncrementalRenderer, apply_delta};
use crate::sanitize::{HtmlSanitizer, Sanitizer};
use crate::think::escape_for_display;

/// What a pushed chunk changed.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct StreamUpdate {
    /// HTML to append to the visible answer once `retract` bytes are dropped.
    pub html_delta: String,
    /// Trailing bytes of the answer HTML that this chunk replaced.
    pub retract: usize,
    /// The full reasoning text so far, escaped for display. Includes the
    /// still-open segment when a think block has not closed yet.
    pub thinking_html: String,
}

impl StreamUpdate {
    /// Applies this update to the answer HTML shown so far.
    pub fn apply(&self, html: &mut String) {
        apply_delta(html, self.retract, &self.html_delta);
    }
}

/// Accumulates the chunks of one streamed message.
///
/// Reasoning segments are routed to [`StreamUpdate::thinking_html`]. Visible
/// text is fed to the renderer only up to an unterminated opening think tag,
/// so a segment that closes later never retracts HTML already emitted.
pub struct MessageStream<S = HtmlSanitizer> {
    renderer: Arc<IncrementalRenderer<S>>,
    raw: String,
    html: String,
    cursor: usize,
}

impl<S: Sanitizer> MessageStream<S> {
    pub fn new(renderer: Arc<IncrementalRenderer<S>>) -> Self {
        Self { renderer, raw: String::new(), html: String::new(), cursor: 0 }
    }

    /// The raw text received so far.
    pub fn text(&self) -> &str {
        &self.raw
    }

    /// The answer HTML with every update applied.
    pub fn html(&self) -> &str {
        &self.html
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn push(&mut self, chunk: &str) -> StreamUpdate {
        self.raw.push_str(chunk);

        let splitter = self.renderer.splitter();
        let split = splitter.split(&self.raw);
        let (visible, pending_thinking) = match splitter.dangling_open(&split.visible_text) {
            Some(start) => (
                &split.visible_text[..start],
                &split.visible_text[start + splitter.open_tag().len()..],
            ),
            None => (split.visible_text.as_str(), ""),
        };

        let result = self.renderer.step(visible, self.cursor);
        self.cursor = result.cursor;
        result.apply(&mut self.html);

        let mut thinking = split.thinking_text.clone();
        thinking.push_str(pending_thinking);

        StreamUpdate {
            html_delta: result.html_delta,
            retract: result.retract,
            thinking_html: escape_for_display(&thinking),
        }
    }

    /// Final render of the whole visible text. An unterminated think tag is
    /// shown as written.
    pub fn finish(&self) -> String {
        let split = self.renderer.splitter().split(&self.raw);
        self.renderer.render_message(&split.visible_text)
    }

    /// Starts a new message.
    pub fn reset(&mut self) {
        self.raw.clear();
        self.html.clear();
        self.cursor = 0;
    }
}
