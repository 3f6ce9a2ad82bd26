//! Context passed to widgets providing access to the document, events,
//! animation, and the instance registry

use crate::animation::{Animator, FrameClock};
use crate::component::registry::InstanceRegistry;
use crate::dom::Document;
use crate::events::EventDispatcher;

/// The injected service bundle every widget is constructed against
///
/// Nothing in the toolkit is process-global: an application owns one (or
/// several, e.g. one per embedded frame or per test) and hands it to widget
/// constructors. All four services are cheap-clone handles over shared
/// state, so cloning a `Context` aliases the same document, listener
/// registry, animator, and instance registry.
#[derive(Clone)]
pub struct Context {
    document: Document,
    events: EventDispatcher,
    animator: Animator,
    registry: InstanceRegistry,
}

impl Default for Context {
    fn default() -> Self {
        Self::new()
    }
}

impl Context {
    /// Context on a monotonic frame clock (production)
    pub fn new() -> Self {
        Self::with_clock(FrameClock::monotonic())
    }

    /// Context on a manually advanced clock; tests drive frames with
    /// [`Animator::advance`] / [`Animator::settle`]
    pub fn new_manual() -> Self {
        Self::with_clock(FrameClock::manual())
    }

    pub fn with_clock(clock: FrameClock) -> Self {
        let document = Document::new();
        Self {
            animator: Animator::new(document.clone(), clock),
            events: EventDispatcher::new(),
            registry: InstanceRegistry::new(),
            document,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn events(&self) -> &EventDispatcher {
        &self.events
    }

    pub fn animator(&self) -> &Animator {
        &self.animator
    }

    pub fn registry(&self) -> &InstanceRegistry {
        &self.registry
    }
}
