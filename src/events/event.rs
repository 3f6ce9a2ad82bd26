//! Event values and the per-invocation handler scope

use serde_json::Value;

use crate::dom::ElementId;

/// An event traveling through the element tree
///
/// Covers both native-style interaction events (`click`, `keydown`) and the
/// namespaced notification events widgets emit (`cl.modal.shown`). Payload
/// data rides in `detail` as JSON, mirroring the untyped `detail` of the
/// platform this toolkit models.
#[derive(Debug, Clone)]
pub struct CustomEvent {
    event_type: String,
    bubbles: bool,
    cancelable: bool,
    detail: Value,
    key: Option<String>,
}

impl CustomEvent {
    /// A bubbling, cancelable event with no payload
    pub fn new(event_type: &str) -> Self {
        Self {
            event_type: event_type.to_string(),
            bubbles: true,
            cancelable: true,
            detail: Value::Null,
            key: None,
        }
    }

    /// A keyboard event carrying a key name (`"Escape"`, `"ArrowRight"`)
    pub fn keyboard(event_type: &str, key: &str) -> Self {
        let mut event = Self::new(event_type);
        event.key = Some(key.to_string());
        event
    }

    pub fn with_detail(mut self, detail: Value) -> Self {
        self.detail = detail;
        self
    }

    pub fn with_bubbles(mut self, bubbles: bool) -> Self {
        self.bubbles = bubbles;
        self
    }

    pub fn with_cancelable(mut self, cancelable: bool) -> Self {
        self.cancelable = cancelable;
        self
    }

    pub fn event_type(&self) -> &str {
        &self.event_type
    }

    pub fn bubbles(&self) -> bool {
        self.bubbles
    }

    pub fn cancelable(&self) -> bool {
        self.cancelable
    }

    pub fn detail(&self) -> &Value {
        &self.detail
    }

    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }
}

/// Handler view of one event delivery
///
/// `target` is the element the event was dispatched on; `current_target` is
/// the element this registration matched — for a delegated handler, the
/// descendant (or the root itself) that matched the delegate selector.
pub struct EventScope<'a> {
    pub event: &'a CustomEvent,
    pub target: ElementId,
    pub current_target: ElementId,
    pub(crate) stopped: bool,
    pub(crate) prevented: bool,
}

impl<'a> EventScope<'a> {
    pub(crate) fn new(event: &'a CustomEvent, target: ElementId, current_target: ElementId) -> Self {
        Self {
            event,
            target,
            current_target,
            stopped: false,
            prevented: false,
        }
    }

    /// Stop the event from reaching ancestors; handlers already matched at
    /// the current element still run
    pub fn stop_propagation(&mut self) {
        self.stopped = true;
    }

    /// Mark the default action as prevented (honored only for cancelable
    /// events)
    pub fn prevent_default(&mut self) {
        if self.event.cancelable() {
            self.prevented = true;
        }
    }

    pub fn event_type(&self) -> &str {
        self.event.event_type()
    }

    pub fn detail(&self) -> &Value {
        self.event.detail()
    }

    pub fn key(&self) -> Option<&str> {
        self.event.key()
    }
}
