use std::fmt::Write;

use html_escape::{encode_double_quoted_attribute, encode_text};

/// Elements that never carry children or a closing tag.
const VOID_ELEMENTS: &[&str] = &["br", "hr", "img", "input", "wbr"];

#[derive(Debug, Clone, PartialEq, Eq)]
enum Node {
    Element(Element),
    Text(String),
    Raw(String),
}

/// An HTML element under construction.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    name: String,
    classes: Vec<String>,
    attrs: Vec<(String, String)>,
    children: Vec<Node>,
}

impl Element {
    /// Creates an element from a `tag.class1.class2` shorthand.
    pub fn new(selector: impl AsRef<str>) -> Self {
        let mut parts = selector.as_ref().split('.');
        let name = parts.next().unwrap_or_default().to_string();
        let classes = parts
            .filter(|class| !class.is_empty())
            .map(str::to_string)
            .collect();
        Self { name, classes, attrs: Vec::new(), children: Vec::new() }
    }

    pub fn class(mut self, class: impl ToString) -> Self {
        self.classes.push(class.to_string());
        self
    }

    /// Sets an attribute. The value is escaped when rendered.
    pub fn attr(mut self, name: impl ToString, value: impl ToString) -> Self {
        self.attrs.push((name.to_string(), value.to_string()));
        self
    }

    /// Appends an escaped text node.
    pub fn text(mut self, text: impl AsRef<str>) -> Self {
        self.children.push(Node::Text(text.as_ref().to_string()));
        self
    }

    /// Appends trusted markup verbatim.
    pub fn raw(mut self, html: impl Into<String>) -> Self {
        self.children.push(Node::Raw(html.into()));
        self
    }

    pub fn append(mut self, item: impl CanAppend) -> Self {
        item.append_to(&mut self);
        self
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        self.render_into(&mut out);
        out
    }

    fn render_into(&self, out: &mut String) {
        out.push('<');
        out.push_str(&self.name);
        if !self.classes.is_empty() {
            let _ = write!(
                out,
                " class=\"{}\"",
                encode_double_quoted_attribute(&self.classes.join(" "))
            );
        }
        for (name, value) in &self.attrs {
            let _ = write!(out, " {}=\"{}\"", name, encode_double_quoted_attribute(value));
        }
        out.push('>');

        if VOID_ELEMENTS.contains(&self.name.as_str()) {
            return;
        }

        for child in &self.children {
            match child {
                Node::Element(element) => element.render_into(out),
                Node::Text(text) => out.push_str(&encode_text(text)),
                Node::Raw(html) => out.push_str(html),
            }
        }

        let _ = write!(out, "</{}>", self.name);
    }
}

/// Anything that can be appended as children of an [`Element`].
pub trait CanAppend {
    fn append_to(self, parent: &mut Element);
}

impl CanAppend for Element {
    fn append_to(self, parent: &mut Element) {
        parent.children.push(Node::Element(self));
    }
}


#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn test_shorthand_classes() {
        let actual = Element::new("div.mermaid-container.wide").render();
        insta::assert_snapshot!(actual, @r#"<div class="mermaid-container wide"></div>"#);
    }

    #[test]
    fn test_text_is_escaped() {
        let actual = Element::new("span").text("<b>&</b>").render();
        let expected = "<span>&lt;b&gt;&amp;&lt;/b&gt;</span>";
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_attribute_is_escaped() {
        let actual = Element::new("div")
            .attr("data-config", r#"{"a":"<x>"}"#)
            .render();
        let expected = r#"<div data-config="{&quot;a&quot;:&quot;&lt;x&gt;&quot;}"></div>"#;
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_raw_is_verbatim() {
        let actual = Element::new("span.math-inline").raw("<math></math>").render();
        insta::assert_snapshot!(actual, @r#"<span class="math-inline"><math></math></span>"#);
    }

    #[test]
    fn test_nested_children_in_order() {
        let actual = Element::new("div.outer")
            .append(Element::new("span.a").text("one"))
            .append(Element::new("i").text("two").append(Element::new("b").text("three")))
            .render();
        let expected =
            r#"<div class="outer"><span class="a">one</span><i>two<b>three</b></i></div>"#;
        assert_eq!(actual, expected);
    }

    #[test]
    fn test_void_element_has_no_closing_tag() {
        let actual = Element::new("br").render();
        insta::assert_snapshot!(actual, @"<br>");
    }
}
