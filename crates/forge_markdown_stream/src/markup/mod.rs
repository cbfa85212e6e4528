//! Markdown to HTML conversion with reserved fenced-block handlers.

mod autolink;
mod chart;
mod code;
mod diagram;
mod formula;
mod handler;
mod ids;
mod media;

use std::collections::HashMap;
use std::sync::Arc;

pub use chart::EchartsHandler;
pub use code::CodeHighlighter;
pub use diagram::MermaidHandler;
pub use formula::{FormulaEngine, FormulaMode, MathHandler, MathMlEngine};
pub use handler::{FenceContext, FenceHandler};
pub use ids::PlaceholderIds;
pub use media::{MediaHandler, MediaKind};
use pulldown_cmark::{
    CodeBlockKind, CowStr, Event, Options, Parser, Tag, TagEnd, TextMergeStream, html,
};
use tracing::warn;

use crate::config::{RenderConfig, ReservedKind};
use crate::repair::repair_fences;

/// Immutable markdown-to-HTML pipeline.
///
/// Fence handlers, the formula engine and parser options are fixed when the
/// engine is built; rendering never mutates it, so one engine can be shared
/// across threads behind an `Arc`.
#[derive(Clone)]
pub struct MarkupEngine {
    options: Options,
    handlers: HashMap<String, Arc<dyn FenceHandler>>,
    formula: Arc<dyn FormulaEngine>,
    highlighter: CodeHighlighter,
    ids: PlaceholderIds,
    escape_raw_html: bool,
    repair_fences: bool,
    linkify: bool,
}

impl Default for MarkupEngine {
    fn default() -> Self {
        Self::new(&RenderConfig::default())
    }
}

fn reserved_handler(kind: ReservedKind) -> Arc<dyn FenceHandler> {
    match kind {
        ReservedKind::Mermaid => Arc::new(MermaidHandler),
        ReservedKind::Echarts => Arc::new(EchartsHandler),
        ReservedKind::Video => Arc::new(MediaHandler::new(MediaKind::Video)),
        ReservedKind::Audio => Arc::new(MediaHandler::new(MediaKind::Audio)),
        ReservedKind::Iframe => Arc::new(MediaHandler::new(MediaKind::Iframe)),
        ReservedKind::Math => Arc::new(MathHandler),
    }
}

/// A code block being collected between its start and end events.
struct PendingBlock {
    lang: Option<String>,
    body: String,
}

impl MarkupEngine {
    /// Builds an engine with a handler for every reserved kind enabled in
    /// `config`.
    pub fn new(config: &RenderConfig) -> Self {
        let handlers = config
            .reserved
            .iter()
            .map(|kind| (kind.to_string(), reserved_handler(*kind)))
            .collect();

        Self {
            options: config.markdown.to_parser_options(),
            handlers,
            formula: Arc::new(MathMlEngine),
            highlighter: CodeHighlighter::default(),
            ids: PlaceholderIds::default(),
            escape_raw_html: config.escape_raw_html,
            repair_fences: config.repair_fences,
            linkify: config.markdown.linkify,
        }
    }

    /// Registers (or replaces) the handler for `handler.lang()`.
    pub fn with_handler(mut self, handler: Arc<dyn FenceHandler>) -> Self {
        self.handlers.insert(handler.lang().to_string(), handler);
        self
    }

    pub fn with_formula_engine(mut self, engine: Arc<dyn FormulaEngine>) -> Self {
        self.formula = engine;
        self
    }

    pub fn with_ids(mut self, ids: PlaceholderIds) -> Self {
        self.ids = ids;
        self
    }

    /// Whether fences tagged `lang` render as placeholders.
    pub fn is_reserved(&self, lang: &str) -> bool {
        self.handlers.contains_key(lang)
    }

    /// Converts a markdown document to (unsanitized) HTML.
    pub fn render(&self, markdown: &str) -> String {
        let source = if self.repair_fences {
            repair_fences(markdown)
        } else {
            markdown.into()
        };

        let mut ordinal = 0;
        let mut link_depth = 0_usize;
        let mut pending: Option<PendingBlock> = None;
        let mut events: Vec<Event<'_>> = Vec::new();

        for event in TextMergeStream::new(Parser::new_ext(&source, self.options)) {
            match event {
                Event::Start(Tag::CodeBlock(kind)) => {
                    let lang = match kind {
                        CodeBlockKind::Fenced(info) => {
                            info.split_whitespace().next().map(str::to_string)
                        }
                        CodeBlockKind::Indented => None,
                    };
                    pending = Some(PendingBlock { lang, body: String::new() });
                }
                Event::Text(text) if pending.is_some() => {
                    if let Some(block) = pending.as_mut() {
                        block.body.push_str(&text);
                    }
                }
                Event::End(TagEnd::CodeBlock) => {
                    if let Some(block) = pending.take() {
                        let html = self.render_block(&block, &mut ordinal);
                        events.push(Event::Html(CowStr::from(html)));
                    }
                }
                Event::Html(raw) | Event::InlineHtml(raw) if self.escape_raw_html => {
                    events.push(Event::Text(raw));
                }
                Event::Start(tag @ (Tag::Link { .. } | Tag::Image { .. })) => {
                    link_depth += 1;
                    events.push(Event::Start(tag));
                }
                Event::End(tag @ (TagEnd::Link | TagEnd::Image)) => {
                    link_depth = link_depth.saturating_sub(1);
                    events.push(Event::End(tag));
                }
                Event::Text(text) if self.linkify && link_depth == 0 => {
                    autolink::push_linked(&mut events, text);
                }
                Event::InlineMath(formula) => {
                    let html = formula::render_span(&*self.formula, &formula, FormulaMode::Inline);
                    events.push(Event::InlineHtml(CowStr::from(html)));
                }
                Event::DisplayMath(formula) => {
                    let html = formula::render_span(&*self.formula, &formula, FormulaMode::Display);
                    events.push(Event::InlineHtml(CowStr::from(html)));
                }
                other => events.push(other),
            }
        }

        let mut out = String::with_capacity(source.len() * 3 / 2);
        html::push_html(&mut out, events.into_iter());
        out
    }

    fn render_block(&self, block: &PendingBlock, ordinal: &mut usize) -> String {
        let lang = block.lang.as_deref().unwrap_or_default();
        let mut html = match self.handlers.get(lang) {
            Some(handler) => {
                *ordinal += 1;
                let ctx =
                    FenceContext { ordinal: *ordinal, ids: &self.ids, formula: &*self.formula };
                handler.render(&block.body, &ctx).unwrap_or_else(|error| {
                    warn!(lang, error = %error, "Reserved block failed to render");
                    handler::error_placeholder(lang, &error)
                })
            }
            None => self.highlighter.render_block(&block.body, lang),
        };
        html.push('\n');
        html
    }
}

#[cfg(test)]
pub(crate) fn test_context<T>(f: impl FnOnce(&FenceContext<'_>) -> T) -> T {
    let ids = PlaceholderIds::default();
    let ctx = FenceContext { ordinal: 1, ids: &ids, formula: &MathMlEngine };
    f(&ctx)
}
