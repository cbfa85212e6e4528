use forge_template::Element;
use latex2mathml::{DisplayStyle, latex_to_mathml};
use tracing::warn;

use super::handler::{FenceContext, FenceHandler};
use crate::error::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormulaMode {
    /// `$...$` inside running text.
    Inline,
    /// `$$...$$` spans and `math` fences.
    Display,
}

/// Typesets TeX-style formula source into markup.
pub trait FormulaEngine: Send + Sync {
    fn typeset(&self, formula: &str, mode: FormulaMode) -> Result<String>;
}

/// Formula engine producing MathML.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathMlEngine;

impl FormulaEngine for MathMlEngine {
    fn typeset(&self, formula: &str, mode: FormulaMode) -> Result<String> {
        let style = match mode {
            FormulaMode::Inline => DisplayStyle::Inline,
            FormulaMode::Display => DisplayStyle::Block,
        };
        latex_to_mathml(formula.trim(), style).map_err(|e| Error::Formula {
            message: e.to_string(),
            formula: formula.to_string(),
        })
    }
}

/// Renders a formula span found inside a paragraph.
///
/// Spans stay `span`s, including the error case, so the surrounding
/// paragraph remains well-formed.
pub(crate) fn render_span(engine: &dyn FormulaEngine, formula: &str, mode: FormulaMode) -> String {
    let class = match mode {
        FormulaMode::Inline => "span.math-inline",
        FormulaMode::Display => "span.math-display",
    };
    match engine.typeset(formula, mode) {
        Ok(markup) => Element::new(class).raw(markup).render(),
        Err(error) => {
            warn!(error = %error, "Formula span failed to render");
            Element::new("span.math-error").text(error.to_string()).render()
        }
    }
}

/// `math` fences, typeset in display mode.
#[derive(Debug, Default, Clone, Copy)]
pub struct MathHandler;

impl FenceHandler for MathHandler {
    fn lang(&self) -> &str {
        "math"
    }

    fn render(&self, body: &str, ctx: &FenceContext<'_>) -> Result<String> {
        let markup = ctx.formula().typeset(body, FormulaMode::Display)?;
        Ok(Element::new("div.math-block").raw(markup).render())
    }
}
