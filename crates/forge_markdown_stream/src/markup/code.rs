//! Code block rendering with class-based syntax highlighting.

use std::sync::Arc;

use forge_template::Element;
use syntect::html::{ClassStyle, ClassedHTMLGenerator};
use syntect::parsing::SyntaxSet;
use syntect::util::LinesWithEndings;
use tracing::debug;

use super::handler::lang_header;
use crate::error::Result;

/// Prefix for the token classes emitted inside highlighted code.
const CLASS_STYLE: ClassStyle = ClassStyle::SpacedPrefixed { prefix: "hl-" };

/// Code block highlighter using syntect.
///
/// Emits `<span class="hl-...">` token markup; colors come from the page
/// stylesheet, so no theme is loaded here.
#[derive(Clone)]
pub struct CodeHighlighter {
    syntax_set: Arc<SyntaxSet>,
}

impl Default for CodeHighlighter {
    fn default() -> Self {
        Self { syntax_set: Arc::new(SyntaxSet::load_defaults_newlines()) }
    }
}

impl CodeHighlighter {
    /// Highlight a whole code block. Unknown languages are escaped only.
    fn highlight(&self, code: &str, lang: &str) -> Result<String> {
        let syntax = (!lang.is_empty())
            .then(|| self.syntax_set.find_syntax_by_token(lang))
            .flatten();
        let Some(syntax) = syntax else {
            return Ok(html_escape::encode_text(code).into_owned());
        };

        let mut generator =
            ClassedHTMLGenerator::new_with_class_style(syntax, &self.syntax_set, CLASS_STYLE);
        for line in LinesWithEndings::from(code) {
            generator.parse_html_for_line_which_includes_newline(line)?;
        }
        Ok(generator.finalize())
    }

    /// Render a fenced or indented code block with its language header and
    /// copy affordance.
    pub fn render_block(&self, code: &str, lang: &str) -> String {
        let body = self.highlight(code, lang).unwrap_or_else(|error| {
            debug!(error = %error, lang, "Highlighting failed, falling back to plain text");
            html_escape::encode_text(code).into_owned()
        });

        let header = lang_header(lang)
            .append(Element::new("span.code-block-header__copy").text("Copy"));
        let mut code_element = Element::new("code.code-block-body");
        if !lang.is_empty() {
            code_element = code_element.class(format!("language-{lang}"));
        }

        Element::new("pre.code-block-wrapper")
            .append(header)
            .append(code_element.raw(body))
            .render()
    }
}
