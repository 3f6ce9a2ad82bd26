// Switch component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::{CustomEvent, HandlerId};

const CLASS_SWITCH: &str = "cl-switch";
const CLASS_TRACK: &str = "cl-switch-track";
const CLASS_THUMB: &str = "cl-switch-thumb";
const CLASS_LABEL: &str = "cl-switch-label";
const CLASS_ON: &str = "cl-switch-on";
const CLASS_DISABLED: &str = "cl-switch-disabled";
const CLASS_LOADING: &str = "cl-switch-loading";

const EVENT_CHANGE: &str = "cl.switch.change";

/// Which side of the track the label sits on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum LabelPosition {
    Left,
    #[default]
    Right,
}

/// Switch configuration
#[derive(Debug, Clone, Default)]
pub struct SwitchConfig {
    pub checked: bool,
    pub disabled: bool,
    /// While loading the switch renders a spinner and ignores input
    pub loading: bool,
    pub label: Option<String>,
    pub label_position: LabelPosition,
    pub missing_element: MissingElementPolicy,
}

#[derive(Default)]
struct SwitchState {
    checked: bool,
    disabled: bool,
    loading: bool,
    handlers: Vec<HandlerId>,
    label_el: Option<ElementId>,
}

struct SwitchInner {
    ctx: Context,
    element: ElementId,
    track: ElementId,
    id: WidgetId,
    state: Mutex<SwitchState>,
}

/// Binary toggle with track/thumb rendering and keyboard support
#[derive(Clone)]
pub struct Switch {
    inner: Arc<SwitchInner>,
}

impl Switch {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: SwitchConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;

        // Evict any previous occupant before rendering, so its teardown
        // cannot clear the subtree built here.
        if let Some(previous) = ctx.registry().get(element) {
            previous.destroy();
        }

        let doc = ctx.document();
        doc.add_class(element, CLASS_SWITCH);
        if config.disabled {
            doc.add_class(element, CLASS_DISABLED);
        }
        if config.loading {
            doc.add_class(element, CLASS_LOADING);
        }

        let label_el = config.label.as_ref().map(|text| {
            let label = doc.create_element("span");
            doc.add_class(label, CLASS_LABEL);
            doc.set_text(label, text);
            label
        });

        let track = doc.create_element("span");
        doc.add_class(track, CLASS_TRACK);
        doc.set_attribute(track, "role", "switch");
        doc.set_attribute(track, "tabindex", "0");
        let thumb = doc.create_element("span");
        doc.add_class(thumb, CLASS_THUMB);
        doc.append_child(track, thumb);

        // Label placement decides child order.
        match (label_el, config.label_position) {
            (Some(label), LabelPosition::Left) => {
                doc.append_child(element, label);
                doc.append_child(element, track);
            }
            (Some(label), LabelPosition::Right) => {
                doc.append_child(element, track);
                doc.append_child(element, label);
            }
            (None, _) => doc.append_child(element, track),
        }

        let switch = Self {
            inner: Arc::new(SwitchInner {
                ctx: ctx.clone(),
                element,
                track,
                id: WidgetId::new(),
                state: Mutex::new(SwitchState {
                    checked: config.checked,
                    disabled: config.disabled,
                    loading: config.loading,
                    label_el,
                    ..SwitchState::default()
                }),
            }),
        };
        ctx.registry().register(element, &switch);
        switch.sync_view();
        switch.bind_events();
        Ok(switch)
    }

    fn state(&self) -> MutexGuard<'_, SwitchState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn bind_events(&self) {
        let events = self.inner.ctx.events();
        let mut handlers = Vec::new();

        let this = self.clone();
        handlers.push(events.on(self.inner.element, "click", move |_| this.toggle()));

        let this = self.clone();
        handlers.push(events.on(self.inner.element, "keydown", move |scope| {
            if matches!(scope.key(), Some(" ") | Some("Enter")) {
                this.toggle();
            }
        }));

        self.state().handlers = handlers;
    }

    fn sync_view(&self) {
        let doc = self.inner.ctx.document();
        let checked = self.state().checked;
        doc.set_attribute(
            self.inner.track,
            "aria-checked",
            if checked { "true" } else { "false" },
        );
        doc.toggle_class(self.inner.element, CLASS_ON, Some(checked));
    }

    pub fn toggle(&self) {
        {
            let mut state = self.state();
            if state.disabled || state.loading {
                return;
            }
            state.checked = !state.checked;
        }
        self.sync_view();

        let checked = self.state().checked;
        self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_CHANGE)
                .with_cancelable(false)
                .with_detail(json!({ "checked": checked })),
        );
    }

    pub fn check(&self) {
        if !self.is_on() {
            self.toggle();
        }
    }

    pub fn uncheck(&self) {
        if self.is_on() {
            self.toggle();
        }
    }

    pub fn is_on(&self) -> bool {
        self.state().checked
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.state().disabled = disabled;
        self.inner
            .ctx
            .document()
            .toggle_class(self.inner.element, CLASS_DISABLED, Some(disabled));
    }

    pub fn set_loading(&self, loading: bool) {
        self.state().loading = loading;
        self.inner
            .ctx
            .document()
            .toggle_class(self.inner.element, CLASS_LOADING, Some(loading));
    }

    pub fn set_label(&self, text: &str) {
        let label_el = self.state().label_el;
        if let Some(label) = label_el {
            self.inner.ctx.document().set_text(label, text);
        }
    }
}

impl Widget for Switch {
    fn name(&self) -> &'static str {
        "switch"
    }

    fn widget_id(&self) -> WidgetId {
        self.inner.id
    }

    fn element(&self) -> ElementId {
        self.inner.element
    }

    fn destroy(&self) {
        let doc = self.inner.ctx.document();
        let handlers = std::mem::take(&mut self.state().handlers);
        for handler in handlers {
            self.inner.ctx.events().off(handler);
        }
        for child in doc.children(self.inner.element) {
            doc.remove(child);
        }
        for class in [CLASS_SWITCH, CLASS_ON, CLASS_DISABLED, CLASS_LOADING] {
            doc.remove_class(self.inner.element, class);
        }
        self.inner.ctx.registry().unregister(self.inner.element, self.inner.id);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use super::*;

    fn host(ctx: &Context) -> ElementId {
        let el = ctx.document().create_element("div");
        ctx.document().append_child(ctx.document().body(), el);
        el
    }

    #[test]
    fn renders_track_thumb_and_label_order() {
        let ctx = Context::new_manual();
        let el = host(&ctx);
        let _switch = Switch::new(
            &ctx,
            el,
            SwitchConfig {
                label: Some("Notifications".to_string()),
                label_position: LabelPosition::Left,
                ..SwitchConfig::default()
            },
        )
        .expect("switch");

        let doc = ctx.document();
        let children = doc.children(el);
        assert_eq!(children.len(), 2);
        assert!(doc.has_class(children[0], "cl-switch-label"));
        assert!(doc.has_class(children[1], "cl-switch-track"));
        assert!(doc.query_selector(el, ".cl-switch-thumb").is_some());
    }

    #[test]
    fn toggle_flips_state_and_emits_change() {
        let ctx = Context::new_manual();
        let el = host(&ctx);
        let changes = Arc::new(AtomicUsize::new(0));

        let switch = Switch::new(&ctx, el, SwitchConfig::default()).expect("switch");
        {
            let changes = changes.clone();
            ctx.events().on(el, "cl.switch.change", move |scope| {
                changes.fetch_add(1, Ordering::SeqCst);
                assert!(scope.detail()["checked"].is_boolean());
            });
        }

        ctx.events().trigger(ctx.document(), el, CustomEvent::new("click"));
        assert!(switch.is_on());
        assert!(ctx.document().has_class(el, "cl-switch-on"));
        assert_eq!(changes.load(Ordering::SeqCst), 1);

        switch.uncheck();
        assert!(!switch.is_on());
        assert_eq!(changes.load(Ordering::SeqCst), 2);

        switch.uncheck(); // already off: no event
        assert_eq!(changes.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn loading_switch_ignores_toggles() {
        let ctx = Context::new_manual();
        let el = host(&ctx);
        let switch = Switch::new(
            &ctx,
            el,
            SwitchConfig {
                loading: true,
                ..SwitchConfig::default()
            },
        )
        .expect("switch");

        switch.toggle();
        assert!(!switch.is_on());

        switch.set_loading(false);
        switch.toggle();
        assert!(switch.is_on());
    }

    #[test]
    fn keyboard_toggles_with_space_and_enter() {
        let ctx = Context::new_manual();
        let el = host(&ctx);
        let switch = Switch::new(&ctx, el, SwitchConfig::default()).expect("switch");

        ctx.events().trigger(
            ctx.document(),
            el,
            CustomEvent::keyboard("keydown", "Enter"),
        );
        assert!(switch.is_on());
    }
}
