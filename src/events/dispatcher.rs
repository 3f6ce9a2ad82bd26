//! Listener registry and dispatch walk
//!
//! Registration returns an opaque [`HandlerId`] token; removal is by token,
//! never by structurally re-matching `(root, type, selector, callback)`
//! tuples. Dispatch bubbles from the target up the ancestor chain, checking
//! delegate selectors with ancestor-matching bounded by the listening root.

use std::sync::{Arc, Mutex};

use crate::dom::{Document, ElementId, Selector};
use crate::events::event::{CustomEvent, EventScope};

/// Opaque token identifying one listener registration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct HandlerId(u64);

/// Result of dispatching one event
#[derive(Debug, Clone, Copy, Default)]
pub struct DispatchOutcome {
    /// A handler called `prevent_default` on a cancelable event
    pub default_prevented: bool,
    /// Number of handler invocations
    pub handlers_run: usize,
}

type EventCallback = Arc<dyn Fn(&mut EventScope<'_>) + Send + Sync>;

struct HandlerRecord {
    id: HandlerId,
    root: ElementId,
    event_type: String,
    delegate: Option<Selector>,
    callback: EventCallback,
}

#[derive(Default)]
struct Registrations {
    records: Vec<HandlerRecord>,
    next_id: u64,
}

/// Cheap-clone handle to a listener registry
///
/// Registration never fails; `off` and `remove_all` on absent state are
/// no-ops. The internal lock is released before any callback runs, so
/// handlers may register, unregister, and re-trigger re-entrantly.
#[derive(Clone, Default)]
pub struct EventDispatcher {
    inner: Arc<Mutex<Registrations>>,
}

impl EventDispatcher {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Registrations> {
        self.inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn insert(
        &self,
        root: ElementId,
        event_type: &str,
        delegate: Option<Selector>,
        callback: EventCallback,
    ) -> HandlerId {
        let mut inner = self.lock();
        inner.next_id += 1;
        let id = HandlerId(inner.next_id);
        inner.records.push(HandlerRecord {
            id,
            root,
            event_type: event_type.to_string(),
            delegate,
            callback,
        });
        id
    }

    /// Listen for `event_type` anywhere on (or bubbling through) `root`
    pub fn on<F>(&self, root: ElementId, event_type: &str, callback: F) -> HandlerId
    where
        F: Fn(&mut EventScope<'_>) + Send + Sync + 'static,
    {
        self.insert(root, event_type, None, Arc::new(callback))
    }

    /// Delegated listen: fires only when the event target, or an ancestor of
    /// it no higher than `root`, matches `selector`; that match becomes the
    /// scope's `current_target`
    pub fn on_delegated<F>(
        &self,
        root: ElementId,
        event_type: &str,
        selector: &str,
        callback: F,
    ) -> HandlerId
    where
        F: Fn(&mut EventScope<'_>) + Send + Sync + 'static,
    {
        let delegate = Selector::parse(selector);
        if delegate.is_empty() {
            log::warn!("delegate selector `{selector}` parsed to nothing; handler will never fire");
        }
        self.insert(root, event_type, Some(delegate), Arc::new(callback))
    }

    /// Remove one registration by token; unknown tokens are a no-op
    pub fn off(&self, id: HandlerId) {
        self.lock().records.retain(|record| record.id != id);
    }

    /// Remove every registration rooted at `root` (widget teardown)
    pub fn off_all_for(&self, root: ElementId) {
        self.lock().records.retain(|record| record.root != root);
    }

    /// Remove every registration (full teardown, e.g. test cleanup)
    pub fn remove_all(&self) {
        self.lock().records.clear();
    }

    pub fn len(&self) -> usize {
        self.lock().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().records.is_empty()
    }

    /// Synthesize and dispatch an event on `target`
    ///
    /// Bubbling events visit the target's ancestor chain root-ward; at each
    /// hop, every record listening there is checked (direct records always
    /// fire, delegated records only on a selector match). `stop_propagation`
    /// ends the walk after the current hop.
    pub fn trigger(
        &self,
        document: &Document,
        target: ElementId,
        event: CustomEvent,
    ) -> DispatchOutcome {
        let path = if event.bubbles() {
            document.ancestor_path(target)
        } else {
            vec![target]
        };

        let mut outcome = DispatchOutcome::default();

        for hop in path {
            // Snapshot matching callbacks, then invoke without the lock held.
            let matched: Vec<(EventCallback, ElementId)> = {
                let inner = self.lock();
                inner
                    .records
                    .iter()
                    .filter(|record| record.root == hop && record.event_type == event.event_type())
                    .filter_map(|record| match &record.delegate {
                        None => Some((record.callback.clone(), hop)),
                        Some(selector) => document
                            .closest_parsed(target, selector, Some(hop))
                            .map(|delegate| (record.callback.clone(), delegate)),
                    })
                    .collect()
            };

            let mut stopped = false;
            for (callback, current_target) in matched {
                let mut scope = EventScope::new(&event, target, current_target);
                callback(&mut scope);
                outcome.handlers_run += 1;
                outcome.default_prevented |= scope.prevented;
                stopped |= scope.stopped;
            }

            if stopped {
                break;
            }
        }

        outcome
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;
    use crate::dom::Document;

    fn list_with_items(doc: &Document) -> (ElementId, ElementId, ElementId) {
        let list = doc.create_element("ul");
        doc.append_child(doc.body(), list);

        let item = doc.create_element("li");
        doc.add_class(item, "item");
        doc.append_child(list, item);

        let other = doc.create_element("li");
        doc.add_class(other, "other");
        doc.append_child(list, other);

        (list, item, other)
    }

    #[test]
    fn delegated_handler_fires_once_for_matching_descendant() {
        let doc = Document::new();
        let dispatcher = EventDispatcher::new();
        let (list, item, other) = list_with_items(&doc);

        let hits = Arc::new(AtomicUsize::new(0));
        let seen = Arc::new(Mutex::new(None));
        {
            let hits = hits.clone();
            let seen = seen.clone();
            dispatcher.on_delegated(list, "click", ".item", move |scope| {
                hits.fetch_add(1, Ordering::SeqCst);
                *seen.lock().unwrap() = Some(scope.current_target);
            });
        }

        dispatcher.trigger(&doc, item, CustomEvent::new("click"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
        assert_eq!(*seen.lock().unwrap(), Some(item));

        dispatcher.trigger(&doc, other, CustomEvent::new("click"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn delegation_matches_closest_ancestor_of_the_target() {
        let doc = Document::new();
        let dispatcher = EventDispatcher::new();
        let (list, item, _) = list_with_items(&doc);

        let icon = doc.create_element("span");
        doc.append_child(item, icon);

        let seen = Arc::new(Mutex::new(None));
        {
            let seen = seen.clone();
            dispatcher.on_delegated(list, "click", ".item", move |scope| {
                *seen.lock().unwrap() = Some(scope.current_target);
            });
        }

        // Click lands on the icon; the delegate match is the enclosing item.
        dispatcher.trigger(&doc, icon, CustomEvent::new("click"));
        assert_eq!(*seen.lock().unwrap(), Some(item));
    }

    #[test]
    fn direct_handlers_fire_for_bubbled_events() {
        let doc = Document::new();
        let dispatcher = EventDispatcher::new();
        let (list, item, _) = list_with_items(&doc);

        let hits = Arc::new(AtomicUsize::new(0));
        {
            let hits = hits.clone();
            dispatcher.on(doc.body(), "click", move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        dispatcher.trigger(&doc, item, CustomEvent::new("click"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);

        // Non-bubbling events stay at the target.
        dispatcher.trigger(&doc, list, CustomEvent::new("click").with_bubbles(false));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn off_removes_exactly_one_registration() {
        let doc = Document::new();
        let dispatcher = EventDispatcher::new();
        let (list, item, _) = list_with_items(&doc);

        let hits = Arc::new(AtomicUsize::new(0));
        let first = {
            let hits = hits.clone();
            dispatcher.on(list, "click", move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            })
        };
        {
            let hits = hits.clone();
            dispatcher.on(list, "click", move |_| {
                hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        dispatcher.off(first);
        dispatcher.off(first); // second removal is a no-op
        assert_eq!(dispatcher.len(), 1);

        dispatcher.trigger(&doc, item, CustomEvent::new("click"));
        assert_eq!(hits.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn stop_propagation_halts_the_bubble_walk() {
        let doc = Document::new();
        let dispatcher = EventDispatcher::new();
        let (list, item, _) = list_with_items(&doc);

        let body_hits = Arc::new(AtomicUsize::new(0));
        dispatcher.on(list, "click", |scope| scope.stop_propagation());
        {
            let body_hits = body_hits.clone();
            dispatcher.on(doc.body(), "click", move |_| {
                body_hits.fetch_add(1, Ordering::SeqCst);
            });
        }

        dispatcher.trigger(&doc, item, CustomEvent::new("click"));
        assert_eq!(body_hits.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn prevent_default_is_reported_only_for_cancelable_events() {
        let doc = Document::new();
        let dispatcher = EventDispatcher::new();
        let (_, item, _) = list_with_items(&doc);

        dispatcher.on(doc.body(), "click", |scope| scope.prevent_default());

        let outcome = dispatcher.trigger(&doc, item, CustomEvent::new("click"));
        assert!(outcome.default_prevented);

        let outcome = dispatcher.trigger(
            &doc,
            item,
            CustomEvent::new("click").with_cancelable(false),
        );
        assert!(!outcome.default_prevented);
    }

    #[test]
    fn remove_all_clears_every_registration() {
        let doc = Document::new();
        let dispatcher = EventDispatcher::new();
        let (list, _, _) = list_with_items(&doc);

        dispatcher.on(list, "click", |_| {});
        dispatcher.on_delegated(list, "click", ".item", |_| {});
        assert_eq!(dispatcher.len(), 2);

        dispatcher.remove_all();
        assert!(dispatcher.is_empty());
        dispatcher.remove_all(); // no-op on empty state
    }
}
