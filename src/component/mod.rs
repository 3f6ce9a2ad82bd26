//! Component model for the LaceKit toolkit
//!
//! This module contains the lifecycle contract every widget implements, the
//! element-resolution step widgets run at construction, and the per-context
//! instance registry.

mod context;
mod error;
mod registry;

pub use context::Context;
pub use error::ComponentError;
pub use registry::{InstanceRegistry, WidgetHandle};

use std::any::Any;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::dom::ElementId;

/// Unique id per constructed widget instance
///
/// Lets the registry tell "this exact instance" apart from "a newer widget
/// on the same element", so a destroyed predecessor cannot evict its
/// replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct WidgetId(u64);

impl WidgetId {
    #[allow(clippy::new_without_default)]
    pub fn new() -> Self {
        static NEXT: AtomicU64 = AtomicU64::new(1);
        Self(NEXT.fetch_add(1, Ordering::Relaxed))
    }
}

/// Lifecycle contract implemented by every widget
///
/// Construction is per-widget (`Widget::new(&ctx, target, config)` by
/// convention — one calling shape across the whole kit); this trait covers
/// the polymorphic surface the registry and teardown paths need.
///
/// `destroy` must remove every listener the widget registered, cancel any
/// fade or timer it still holds, revert the DOM mutations it performed
/// (classes, created children, ARIA attributes), and unregister the
/// instance. A widget that skips any of those leaks listeners or pollutes
/// shared tree state for the next occupant of its element.
pub trait Widget: Send + Sync + 'static {
    /// Kit name, e.g. `"toast"`; also the middle segment of emitted
    /// `cl.<name>.<verb>` events
    fn name(&self) -> &'static str;

    fn widget_id(&self) -> WidgetId;

    /// The element this instance is bound to
    fn element(&self) -> ElementId;

    /// Release listeners, cancel in-flight work, revert DOM mutations, and
    /// unregister
    fn destroy(&self);

    /// Downcast support for registry lookups
    fn as_any(&self) -> &dyn Any;
}

/// What a widget binds to: a live element or a selector to resolve
#[derive(Debug, Clone)]
pub enum ElementRef {
    Element(ElementId),
    Selector(String),
}

impl From<ElementId> for ElementRef {
    fn from(el: ElementId) -> Self {
        Self::Element(el)
    }
}

impl From<&str> for ElementRef {
    fn from(selector: &str) -> Self {
        Self::Selector(selector.to_string())
    }
}

impl From<String> for ElementRef {
    fn from(selector: String) -> Self {
        Self::Selector(selector)
    }
}

/// What to do when a selector resolves to nothing
///
/// The policy travels in each widget's configuration; whether a missing
/// element is fatal is the caller's decision, not a property of whichever
/// base the widget happens to build on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MissingElementPolicy {
    /// Construction fails with [`ComponentError::ElementNotFound`]
    #[default]
    Fail,
    /// Bind to the document body instead
    FallbackToBody,
}

/// Resolve a widget's target element against the context's document
pub fn resolve_element(
    ctx: &Context,
    target: ElementRef,
    policy: MissingElementPolicy,
) -> Result<ElementId, ComponentError> {
    match target {
        ElementRef::Element(el) => Ok(el),
        ElementRef::Selector(selector) => {
            let document = ctx.document();
            match document.query_selector(document.body(), &selector) {
                Some(el) => Ok(el),
                None => match policy {
                    MissingElementPolicy::Fail => {
                        Err(ComponentError::ElementNotFound(selector))
                    }
                    MissingElementPolicy::FallbackToBody => {
                        log::debug!("selector `{selector}` resolved to nothing; binding to body");
                        Ok(document.body())
                    }
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resolve_by_element_is_identity() {
        let ctx = Context::new_manual();
        let el = ctx.document().create_element("div");
        ctx.document().append_child(ctx.document().body(), el);

        let resolved =
            resolve_element(&ctx, el.into(), MissingElementPolicy::Fail).expect("live element");
        assert_eq!(resolved, el);
    }

    #[test]
    fn missing_selector_fails_or_falls_back_by_policy() {
        let ctx = Context::new_manual();

        let err = resolve_element(&ctx, ".nope".into(), MissingElementPolicy::Fail)
            .expect_err("strict policy");
        assert!(matches!(err, ComponentError::ElementNotFound(s) if s == ".nope"));

        let fallback =
            resolve_element(&ctx, ".nope".into(), MissingElementPolicy::FallbackToBody)
                .expect("fallback policy");
        assert_eq!(fallback, ctx.document().body());
    }

    #[test]
    fn selector_resolution_finds_attached_elements() {
        let ctx = Context::new_manual();
        let el = ctx.document().create_element("div");
        ctx.document().add_class(el, "cl-alert");
        ctx.document().append_child(ctx.document().body(), el);

        let resolved = resolve_element(&ctx, ".cl-alert".into(), MissingElementPolicy::Fail)
            .expect("attached element");
        assert_eq!(resolved, el);
    }
}
