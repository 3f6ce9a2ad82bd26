//! Retained element tree for the LaceKit toolkit
//!
//! Widgets do not bind a browser document; they manipulate this in-process
//! tree through the same vocabulary (classes, attributes, inline styles,
//! selector queries). The tree is the single substrate the event dispatcher
//! bubbles through and the animator writes styles into.

mod document;
mod node;
mod selector;
mod style;

pub use document::Document;
pub use node::ElementId;
pub use selector::Selector;
pub use style::StyleMap;
