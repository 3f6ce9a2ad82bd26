// Checkbox component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};

use serde_json::json;

use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::{CustomEvent, HandlerId};

const CLASS_CHECKBOX: &str = "cl-checkbox";
const CLASS_BOX: &str = "cl-checkbox-box";
const CLASS_LABEL: &str = "cl-checkbox-label";
const CLASS_CHECKED: &str = "cl-checked";
const CLASS_INDETERMINATE: &str = "cl-indeterminate";
const CLASS_DISABLED: &str = "cl-checkbox-disabled";

const EVENT_CHANGE: &str = "cl.checkbox.change";
const EVENT_VALIDATION: &str = "cl.checkbox.validation";

/// Checkbox configuration
#[derive(Debug, Clone, Default)]
pub struct CheckboxConfig {
    pub checked: bool,
    pub disabled: bool,
    pub label: Option<String>,
    /// Validation: the box must be checked (consent-style forms)
    pub required: bool,
    pub missing_element: MissingElementPolicy,
}

#[derive(Default)]
struct CheckboxState {
    checked: bool,
    indeterminate: bool,
    disabled: bool,
    handlers: Vec<HandlerId>,
}

struct CheckboxInner {
    ctx: Context,
    element: ElementId,
    box_el: ElementId,
    config: CheckboxConfig,
    id: WidgetId,
    state: Mutex<CheckboxState>,
}

/// Tri-state checkbox (checked / unchecked / indeterminate)
///
/// The box carries `role="checkbox"` with `aria-checked` of
/// `true`/`false`/`mixed`; clicking anywhere in the component or pressing
/// Space/Enter toggles. Indeterminate always resolves to checked on the
/// next toggle.
#[derive(Clone)]
pub struct Checkbox {
    inner: Arc<CheckboxInner>,
}

impl Checkbox {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: CheckboxConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;

        // Evict any previous occupant before rendering, so its teardown
        // cannot clear the subtree built here.
        if let Some(previous) = ctx.registry().get(element) {
            previous.destroy();
        }

        let doc = ctx.document();
        doc.add_class(element, CLASS_CHECKBOX);
        if config.disabled {
            doc.add_class(element, CLASS_DISABLED);
        }

        let box_el = doc.create_element("span");
        doc.add_class(box_el, CLASS_BOX);
        doc.set_attribute(box_el, "role", "checkbox");
        doc.set_attribute(box_el, "tabindex", "0");
        doc.append_child(element, box_el);

        if let Some(label_text) = &config.label {
            let label = doc.create_element("span");
            doc.add_class(label, CLASS_LABEL);
            doc.set_text(label, label_text);
            doc.append_child(element, label);
        }

        let checked = config.checked;
        let disabled = config.disabled;
        let checkbox = Self {
            inner: Arc::new(CheckboxInner {
                ctx: ctx.clone(),
                element,
                box_el,
                config,
                id: WidgetId::new(),
                state: Mutex::new(CheckboxState {
                    checked,
                    disabled,
                    ..CheckboxState::default()
                }),
            }),
        };
        ctx.registry().register(element, &checkbox);
        checkbox.sync_view();
        checkbox.bind_events();
        Ok(checkbox)
    }

    fn state(&self) -> MutexGuard<'_, CheckboxState> {
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
        let (checked, indeterminate) = {
            let state = self.state();
            (state.checked, state.indeterminate)
        };

        let aria = if indeterminate {
            "mixed"
        } else if checked {
            "true"
        } else {
            "false"
        };
        doc.set_attribute(self.inner.box_el, "aria-checked", aria);
        doc.toggle_class(self.inner.element, CLASS_CHECKED, Some(checked));
        doc.toggle_class(self.inner.element, CLASS_INDETERMINATE, Some(indeterminate));
    }

    fn emit_change(&self) {
        let checked = self.state().checked;
        self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_CHANGE)
                .with_cancelable(false)
                .with_detail(json!({ "checked": checked })),
        );
        self.validate();
    }

    /// Required-rule check; emits `cl.checkbox.validation`
    pub fn validate(&self) -> bool {
        if !self.inner.config.required {
            return true;
        }
        let is_valid = self.state().checked;
        let error = (!is_valid).then(|| "This field is required".to_string());
        self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_VALIDATION)
                .with_cancelable(false)
                .with_detail(json!({ "isValid": is_valid, "error": error })),
        );
        is_valid
    }

    pub fn toggle(&self) {
        {
            let mut state = self.state();
            if state.disabled {
                return;
            }
            // Indeterminate resolves to checked.
            if state.indeterminate {
                state.indeterminate = false;
                state.checked = true;
            } else {
                state.checked = !state.checked;
            }
        }
        self.sync_view();
        self.emit_change();
    }

    pub fn set_checked(&self, checked: bool) {
        {
            let mut state = self.state();
            if state.checked == checked && !state.indeterminate {
                return;
            }
            state.checked = checked;
            state.indeterminate = false;
        }
        self.sync_view();
        self.emit_change();
    }

    pub fn set_indeterminate(&self) {
        self.state().indeterminate = true;
        self.sync_view();
    }

    pub fn is_checked(&self) -> bool {
        self.state().checked
    }

    pub fn is_indeterminate(&self) -> bool {
        self.state().indeterminate
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.state().disabled = disabled;
        self.inner
            .ctx
            .document()
            .toggle_class(self.inner.element, CLASS_DISABLED, Some(disabled));
    }
}

impl Widget for Checkbox {
    fn name(&self) -> &'static str {
        "checkbox"
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
        for class in [CLASS_CHECKBOX, CLASS_CHECKED, CLASS_INDETERMINATE, CLASS_DISABLED] {
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
    use super::*;

    fn host(ctx: &Context) -> ElementId {
        let el = ctx.document().create_element("div");
        ctx.document().append_child(ctx.document().body(), el);
        el
    }

    #[test]
    fn click_toggles_and_updates_aria() {
        let ctx = Context::new_manual();
        let el = host(&ctx);
        let checkbox = Checkbox::new(&ctx, el, CheckboxConfig::default()).expect("checkbox");
        let doc = ctx.document();
        let box_el = doc.query_selector(el, ".cl-checkbox-box").expect("box");

        assert_eq!(doc.get_attribute(box_el, "aria-checked").as_deref(), Some("false"));

        ctx.events().trigger(doc, el, CustomEvent::new("click"));
        assert!(checkbox.is_checked());
        assert_eq!(doc.get_attribute(box_el, "aria-checked").as_deref(), Some("true"));
        assert!(doc.has_class(el, "cl-checked"));
    }

    #[test]
    fn indeterminate_resolves_to_checked_on_toggle() {
        let ctx = Context::new_manual();
        let el = host(&ctx);
        let checkbox = Checkbox::new(&ctx, el, CheckboxConfig::default()).expect("checkbox");
        let doc = ctx.document();
        let box_el = doc.query_selector(el, ".cl-checkbox-box").expect("box");

        checkbox.set_indeterminate();
        assert_eq!(doc.get_attribute(box_el, "aria-checked").as_deref(), Some("mixed"));

        checkbox.toggle();
        assert!(checkbox.is_checked());
        assert!(!checkbox.is_indeterminate());
    }

    #[test]
    fn required_validation_reports_through_the_event() {
        let ctx = Context::new_manual();
        let el = host(&ctx);
        let seen = Arc::new(Mutex::new(Vec::new()));

        let checkbox = Checkbox::new(
            &ctx,
            el,
            CheckboxConfig {
                required: true,
                checked: true,
                ..CheckboxConfig::default()
            },
        )
        .expect("checkbox");

        {
            let log = seen.clone();
            ctx.events().on(el, "cl.checkbox.validation", move |scope| {
                log.lock().unwrap().push(scope.detail().clone());
            });
        }

        checkbox.toggle(); // now unchecked -> invalid
        let log = seen.lock().unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0]["isValid"], json!(false));
    }

    #[test]
    fn disabled_checkbox_ignores_interaction() {
        let ctx = Context::new_manual();
        let el = host(&ctx);
        let checkbox = Checkbox::new(
            &ctx,
            el,
            CheckboxConfig {
                disabled: true,
                ..CheckboxConfig::default()
            },
        )
        .expect("checkbox");

        ctx.events().trigger(ctx.document(), el, CustomEvent::new("click"));
        assert!(!checkbox.is_checked());
    }

    #[test]
    fn space_key_toggles() {
        let ctx = Context::new_manual();
        let el = host(&ctx);
        let checkbox = Checkbox::new(&ctx, el, CheckboxConfig::default()).expect("checkbox");

        ctx.events().trigger(
            ctx.document(),
            el,
            CustomEvent::keyboard("keydown", " "),
        );
        assert!(checkbox.is_checked());
    }
}
