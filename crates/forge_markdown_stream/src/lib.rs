//! Forge Markdown Stream - Incremental markdown to HTML rendering for
//! streamed LLM output.
//!
//! Text arrives in arbitrary chunks. The renderer finds the longest prefix
//! that ends on a complete syntactic unit, renders it to sanitized HTML and
//! returns only the lines that changed since the previous step. Fenced blocks tagged
//! `mermaid`, `echarts`, `video`, `audio`, `iframe` or `math` become
//! placeholder markup for client-side activation; other fences are
//! syntax-highlighted.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use forge_markdown_stream::{IncrementalRenderer, MessageStream, RenderConfig};
//!
//! fn main() -> forge_markdown_stream::Result<()> {
//!     let renderer = Arc::new(IncrementalRenderer::new(&RenderConfig::default())?);
//!     let mut stream = MessageStream::new(renderer);
//!
//!     // Push tokens as they arrive from the model
//!     for chunk in ["Hello **wor", "ld**!\n\n", "```rust\nfn main() {}\n```\n"] {
//!         let update = stream.push(chunk);
//!         println!("drop {} bytes, append {:?}", update.retract, update.html_delta);
//!     }
//!
//!     assert_eq!(stream.html(), stream.finish());
//!     Ok(())
//! }
//! ```

mod boundary;
mod config;
mod error;
mod fence;
mod incremental;
mod markup;
mod repair;
mod sanitize;
mod stream;
mod think;

pub use boundary::{BoundaryDetector, is_complete_prefix};
pub use config::{MarkdownOptions, RenderConfig, ReservedKind};
pub use error::{Error, Result};
pub use fence::{OpenFence, open_fence};
pub use incremental::{IncrementalRenderer, RenderResult};
pub use markup::{
    CodeHighlighter, EchartsHandler, FenceContext, FenceHandler, FormulaEngine, FormulaMode,
    MarkupEngine, MathHandler, MathMlEngine, MediaHandler, MediaKind, MermaidHandler,
    PlaceholderIds,
};
pub use repair::repair_fences;
pub use sanitize::{HtmlSanitizer, Sanitizer};
pub use stream::{MessageStream, StreamUpdate};
pub use think::{ThinkSplit, ThinkSplitter, escape_for_display, split_thinking};
