use forge_template::Element;

use super::handler::{FenceContext, FenceHandler, lang_header};
use crate::error::Result;

/// `mermaid` fences: the diagram source is kept as text content of a
/// `.mermaid` element for the client-side renderer to pick up.
#[derive(Debug, Default, Clone, Copy)]
pub struct MermaidHandler;

impl FenceHandler for MermaidHandler {
    fn lang(&self) -> &str {
        "mermaid"
    }

    fn render(&self, body: &str, _ctx: &FenceContext<'_>) -> Result<String> {
        Ok(Element::new("div.mermaid-container")
            .append(lang_header("mermaid"))
            .append(Element::new("div.mermaid").text(body))
            .render())
    }
}
