//! Minimal HTML element builder.
//!
//! Elements are declared with a CSS-like shorthand (`div.section.wide`) and
//! rendered to a string. Text children and attribute values are escaped at
//! render time; [`Element::raw`] is the only way to inject pre-built markup.

mod element;

pub use element::{CanAppend, Element};
