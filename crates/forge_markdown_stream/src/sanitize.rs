//! HTML sanitization applied to every rendered fragment.

/// Cleans rendered HTML before it reaches the view.
pub trait Sanitizer: Send + Sync {
    fn sanitize(&self, raw_html: &str) -> String;
}

impl<F> Sanitizer for F
where
    F: Fn(&str) -> String + Send + Sync,
{
    fn sanitize(&self, raw_html: &str) -> String {
        self(raw_html)
    }
}

/// MathML elements emitted by the formula engine.
const MATHML_TAGS: &[&str] = &[
    "math", "mrow", "mi", "mo", "mn", "ms", "msup", "msub", "msubsup", "mfrac", "msqrt", "mroot",
    "mtext", "mspace", "mstyle", "mtable", "mtr", "mtd", "munder", "mover", "munderover",
    "semantics", "annotation", "mpadded", "mphantom", "menclose",
];

/// [`Sanitizer`] backed by `ammonia`.
///
/// Scripts, styles and event-handler attributes are removed. Placeholder
/// markup survives: `id`, `class`, `title` and every `data-*` attribute are
/// allowed on all elements, along with MathML and task-list checkboxes.
pub struct HtmlSanitizer {
    builder: ammonia::Builder<'static>,
}

impl Default for HtmlSanitizer {
    fn default() -> Self {
        let mut builder = ammonia::Builder::default();
        builder
            .add_tags(MATHML_TAGS)
            .add_tags(&["input"])
            .add_generic_attributes(&["class", "id", "title"])
            .add_generic_attribute_prefixes(&["data-"])
            .add_tag_attributes("input", &["type", "checked", "disabled"])
            .add_tag_attributes("math", &["display", "xmlns"])
            .add_tag_attributes("mo", &["stretchy", "fence", "separator", "lspace", "rspace"])
            .add_tag_attributes("mi", &["mathvariant"])
            .add_tag_attributes("mfrac", &["linethickness"])
            .add_tag_attributes("mspace", &["width"])
            .add_tag_attributes("mstyle", &["displaystyle", "scriptlevel"])
            .add_tag_attributes("mtable", &["columnalign"])
            .add_tag_attributes("menclose", &["notation"])
            .add_tag_attributes("annotation", &["encoding"]);
        Self { builder }
    }
}

impl Sanitizer for HtmlSanitizer {
    fn sanitize(&self, raw_html: &str) -> String {
        self.builder.clean(raw_html).to_string()
    }
}
