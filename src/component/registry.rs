//! Instance registry: element -> live widget instance

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use crate::component::{Widget, WidgetId};
use crate::dom::ElementId;

/// Type-erased, cloneable reference to a live widget
#[derive(Clone)]
pub struct WidgetHandle {
    widget: Arc<dyn Widget>,
}

impl WidgetHandle {
    pub fn new<W: Widget>(widget: W) -> Self {
        Self {
            widget: Arc::new(widget),
        }
    }

    pub fn name(&self) -> &'static str {
        self.widget.name()
    }

    pub fn widget_id(&self) -> WidgetId {
        self.widget.widget_id()
    }

    pub fn element(&self) -> ElementId {
        self.widget.element()
    }

    pub fn destroy(&self) {
        self.widget.destroy();
    }

    /// Clone out the concrete widget, if this handle wraps a `W`
    pub fn downcast<W: Widget + Clone>(&self) -> Option<W> {
        self.widget.as_any().downcast_ref::<W>().cloned()
    }
}

/// Per-context mapping from element to its bound widget instance
///
/// Invariant: at most one instance per element. Registering over a live
/// instance destroys the previous one first — replacement is loud (a
/// `warn!`) and leak-free, never a silent orphaning of the old listeners.
#[derive(Clone, Default)]
pub struct InstanceRegistry {
    inner: Arc<Mutex<HashMap<ElementId, WidgetHandle>>>,
}

impl InstanceRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, HashMap<ElementId, WidgetHandle>> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    /// Bind `widget` to `el`, destroying any previous occupant
    pub fn register<W: Widget + Clone>(&self, el: ElementId, widget: &W) {
        let handle = WidgetHandle::new(widget.clone());
        let replaced = self.lock().insert(el, handle);
        if let Some(previous) = replaced {
            if previous.widget_id() != widget.widget_id() {
                log::warn!(
                    "replacing live `{}` instance on element {el}; destroying the old one",
                    previous.name()
                );
                // The old instance's destroy() unregisters by id, so it
                // cannot evict the entry we just inserted.
                previous.destroy();
            }
        }
    }

    pub fn get(&self, el: ElementId) -> Option<WidgetHandle> {
        self.lock().get(&el).cloned()
    }

    /// Lookup and downcast in one step
    pub fn get_as<W: Widget + Clone>(&self, el: ElementId) -> Option<W> {
        self.get(el).and_then(|handle| handle.downcast::<W>())
    }

    /// Remove the entry for `el` only if it still belongs to `id`
    pub fn unregister(&self, el: ElementId, id: WidgetId) {
        let mut map = self.lock();
        if map.get(&el).is_some_and(|handle| handle.widget_id() == id) {
            map.remove(&el);
        }
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }
}
