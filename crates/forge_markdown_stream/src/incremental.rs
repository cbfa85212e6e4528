//! Prefix-diff rendering of an append-only markdown buffer.

use serde::Serialize;
use tracing::{debug, warn};

use crate::boundary::{BoundaryDetector, fence_markers};
use crate::config::RenderConfig;
use crate::error::{Error, Result};
use crate::fence::FenceScanner;
use crate::markup::MarkupEngine;
use crate::sanitize::{HtmlSanitizer, Sanitizer};
use crate::think::ThinkSplitter;

/// Outcome of one [`IncrementalRenderer::step`].
///
/// The HTML emitted so far is brought up to date by dropping its last
/// `retract` bytes and appending `html_delta`; [`RenderResult::apply`] does
/// exactly that. `retract` is zero whenever the previous render is a prefix of
/// the new one, which is the case for every step that only adds blocks.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RenderResult {
    /// HTML to append once `retract` bytes have been dropped.
    pub html_delta: String,
    /// Byte offset up to which the text has been rendered.
    pub cursor: usize,
    /// Number of trailing bytes of the previously emitted HTML that changed.
    /// Always a whole number of lines.
    pub retract: usize,
}

impl RenderResult {
    fn unchanged(cursor: usize) -> Self {
        Self { html_delta: String::new(), cursor, retract: 0 }
    }

    /// Applies this step to the HTML emitted for the previous steps.
    pub fn apply(&self, html: &mut String) {
        apply_delta(html, self.retract, &self.html_delta);
    }
}

/// Drops the last `retract` bytes of `html` and appends `delta`.
pub(crate) fn apply_delta(html: &mut String, retract: usize, delta: &str) {
    let mut keep = html.len().saturating_sub(retract);
    while !html.is_char_boundary(keep) {
        keep -= 1;
    }
    html.truncate(keep);
    html.push_str(delta);
}

/// A line end (or the end of the text) the next render may stop at.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Candidate {
    end: usize,
    /// The prefix holds an odd number of fence markers.
    odd_fences: bool,
    /// The prefix ends inside a fence that must not be rendered yet.
    held: bool,
}

/// Renders growing markdown text into HTML deltas.
///
/// Each step re-renders the last safe prefix of the text and diffs it against
/// the render of the previous prefix. The renderer is immutable; callers keep
/// the cursor.
pub struct IncrementalRenderer<S = HtmlSanitizer> {
    engine: MarkupEngine,
    sanitizer: S,
    detector: BoundaryDetector,
    splitter: ThinkSplitter,
    hold_reserved_fences: bool,
}

impl IncrementalRenderer {
    pub fn new(config: &RenderConfig) -> Result<Self> {
        let renderer = Self::with_parts(
            MarkupEngine::new(config),
            HtmlSanitizer::default(),
            BoundaryDetector::new(config.trailing_window),
            ThinkSplitter::new(&config.think_tag)?,
        );
        Ok(renderer.hold_reserved_fences(config.hold_reserved_fences))
    }
}

impl<S: Sanitizer> IncrementalRenderer<S> {
    /// Assembles a renderer from explicit parts. Reserved fences are held
    /// until they close.
    pub fn with_parts(
        engine: MarkupEngine,
        sanitizer: S,
        detector: BoundaryDetector,
        splitter: ThinkSplitter,
    ) -> Self {
        Self { engine, sanitizer, detector, splitter, hold_reserved_fences: true }
    }

    pub fn with_sanitizer<T: Sanitizer>(self, sanitizer: T) -> IncrementalRenderer<T> {
        IncrementalRenderer {
            engine: self.engine,
            sanitizer,
            detector: self.detector,
            splitter: self.splitter,
            hold_reserved_fences: self.hold_reserved_fences,
        }
    }

    pub fn hold_reserved_fences(mut self, hold: bool) -> Self {
        self.hold_reserved_fences = hold;
        self
    }

    pub fn engine(&self) -> &MarkupEngine {
        &self.engine
    }

    pub fn splitter(&self) -> &ThinkSplitter {
        &self.splitter
    }

    /// Advances rendering of `full_text` past `cursor`.
    ///
    /// Never fails: errors are logged and reported as an empty delta with the
    /// cursor unchanged, so the next chunk simply retries.
    pub fn step(&self, full_text: &str, cursor: usize) -> RenderResult {
        self.try_step(full_text, cursor).unwrap_or_else(|error| {
            warn!(error = %error, cursor, "Render step failed, keeping cursor");
            RenderResult::unchanged(cursor)
        })
    }

    pub fn try_step(&self, full_text: &str, cursor: usize) -> Result<RenderResult> {
        if full_text.len() <= cursor {
            return Ok(RenderResult::unchanged(cursor));
        }
        if !full_text.is_char_boundary(cursor) {
            return Err(Error::InvalidCursor { cursor, len: full_text.len() });
        }

        let end = self.find_boundary(full_text, cursor);
        if end == cursor {
            debug!(cursor, len = full_text.len(), "No new complete prefix");
            return Ok(RenderResult::unchanged(cursor));
        }

        let previous = if cursor == 0 {
            String::new()
        } else {
            self.render_message(&full_text[..cursor])
        };
        let current = self.render_message(&full_text[..end]);

        let keep = if current.starts_with(&previous) {
            previous.len()
        } else {
            // Resume after the last line both renders share.
            let common = previous
                .bytes()
                .zip(current.bytes())
                .take_while(|(old, new)| old == new)
                .count();
            current.as_bytes()[..common]
                .iter()
                .rposition(|byte| *byte == b'\n')
                .map_or(0, |nl| nl + 1)
        };

        let result = RenderResult {
            html_delta: current[keep..].to_string(),
            cursor: end,
            retract: previous.len() - keep,
        };
        debug!(
            cursor,
            end,
            retract = result.retract,
            delta_len = result.html_delta.len(),
            "Rendered step"
        );
        Ok(result)
    }

    /// Sanitized HTML for a complete text, used when the message finishes.
    pub fn render_message(&self, text: &str) -> String {
        self.sanitizer.sanitize(&self.engine.render(text))
    }

    /// Largest candidate end offset whose prefix may be rendered, or
    /// `cursor` when there is none.
    fn find_boundary(&self, text: &str, cursor: usize) -> usize {
        self.candidates(text, cursor)
            .into_iter()
            .rev()
            .find(|candidate| {
                !candidate.held
                    && self
                        .detector
                        .is_complete_with_fence_parity(&text[..candidate.end], candidate.odd_fences)
            })
            .map_or(cursor, |candidate| candidate.end)
    }

    /// Every line end after `cursor` plus the end of the text, in order.
    ///
    /// Fence state and marker parity are tracked in one forward pass, so
    /// checking a candidate only costs the detector's trailing window.
    fn candidates(&self, text: &str, cursor: usize) -> Vec<Candidate> {
        let mut scanner = FenceScanner::default();
        let mut markers = 0;
        let mut offset = 0;
        let mut candidates = Vec::new();

        for line in text.split_inclusive('\n') {
            scanner.advance(line, offset);
            markers += fence_markers(line);
            offset += line.len();
            if offset <= cursor {
                continue;
            }

            let held = self.hold_reserved_fences
                && scanner.open_fence().is_some_and(|fence| {
                    !fence.info_complete || self.engine.is_reserved(fence.lang())
                });
            candidates.push(Candidate { end: offset, odd_fences: markers % 2 == 1, held });
        }

        candidates
    }
}
