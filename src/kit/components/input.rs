// Input component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};

use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::{CustomEvent, HandlerId};

const CLASS_WRAPPER: &str = "cl-input-wrapper";
const CLASS_INPUT: &str = "cl-input";
const CLASS_LABEL: &str = "cl-input-label";
const CLASS_REQUIRED: &str = "cl-input-required";
const CLASS_CONTAINER: &str = "cl-input-container";
const CLASS_HELPER: &str = "cl-input-helper";
const CLASS_CLEAR: &str = "cl-input-clear";
const CLASS_DISABLED: &str = "cl-input-disabled";
const CLASS_FOCUSED: &str = "is-focused";
const CLASS_ERROR: &str = "has-error";

const EVENT_INPUT: &str = "cl.input.input";
const EVENT_CHANGE: &str = "cl.input.change";
const EVENT_VALIDATION: &str = "cl.input.validation";

/// Control height variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InputSize {
    Small,
    #[default]
    Medium,
    Large,
}

impl InputSize {
    fn suffix(self) -> &'static str {
        match self {
            Self::Small => "small",
            Self::Medium => "medium",
            Self::Large => "large",
        }
    }
}

/// Declarative validation rules checked on input and blur
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InputValidation {
    pub required: bool,
    pub min_length: Option<usize>,
    pub max_length: Option<usize>,
    /// Regular expression the whole value must match
    pub pattern: Option<String>,
}

/// Input configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    /// `type` attribute of the rendered input (`text`, `password`, ...)
    pub input_type: String,
    pub placeholder: Option<String>,
    pub label: Option<String>,
    /// Helper line shown under the control when no error is active
    pub helper_text: Option<String>,
    pub disabled: bool,
    pub size: InputSize,
    pub validation: InputValidation,
    /// Render a clear button while the value is non-empty
    pub clearable: bool,
    pub missing_element: MissingElementPolicy,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            input_type: "text".to_string(),
            placeholder: None,
            label: None,
            helper_text: None,
            disabled: false,
            size: InputSize::Medium,
            validation: InputValidation::default(),
            clearable: false,
            missing_element: MissingElementPolicy::default(),
        }
    }
}

#[derive(Default)]
struct InputState {
    value: String,
    error: Option<String>,
    dirty: bool,
    disabled: bool,
    handlers: Vec<HandlerId>,
}

struct InputInner {
    ctx: Context,
    element: ElementId,
    input: ElementId,
    helper: ElementId,
    clear_button: Option<ElementId>,
    config: InputConfig,
    pattern: Option<Regex>,
    id: WidgetId,
    state: Mutex<InputState>,
}

/// Validating text field
///
/// The host element becomes a wrapper around a rendered
/// label/container/input/helper subtree. Validation failure is state, not
/// an error: the current problem lands in the helper line (with
/// `has-error`) and in a `cl.input.validation` event carrying
/// `{isValid, error}`.
#[derive(Clone)]
pub struct Input {
    inner: Arc<InputInner>,
}

impl std::fmt::Debug for Input {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Input").field("id", &self.inner.id).finish()
    }
}

impl Input {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: InputConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;

        // Evict any previous occupant before rendering, so its teardown
        // cannot clear the subtree built here.
        if let Some(previous) = ctx.registry().get(element) {
            previous.destroy();
        }

        let pattern = match &config.validation.pattern {
            Some(pattern) => Some(Regex::new(pattern).map_err(|err| {
                ComponentError::InvalidConfig(format!("bad validation pattern: {err}"))
            })?),
            None => None,
        };

        let (input, helper, clear_button) = Self::render(ctx, element, &config);
        let disabled = config.disabled;

        let widget = Self {
            inner: Arc::new(InputInner {
                ctx: ctx.clone(),
                element,
                input,
                helper,
                clear_button,
                config,
                pattern,
                id: WidgetId::new(),
                state: Mutex::new(InputState {
                    disabled,
                    ..InputState::default()
                }),
            }),
        };
        ctx.registry().register(element, &widget);
        widget.bind_events();
        Ok(widget)
    }

    fn state(&self) -> MutexGuard<'_, InputState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn render(
        ctx: &Context,
        element: ElementId,
        config: &InputConfig,
    ) -> (ElementId, ElementId, Option<ElementId>) {
        let doc = ctx.document();
        doc.add_class(element, CLASS_WRAPPER);
        doc.add_class(element, &format!("cl-input-{}", config.size.suffix()));
        if config.disabled {
            doc.add_class(element, CLASS_DISABLED);
        }

        if let Some(label_text) = &config.label {
            let label = doc.create_element("label");
            doc.add_class(label, CLASS_LABEL);
            doc.set_text(label, label_text);
            doc.append_child(element, label);

            if config.validation.required {
                let marker = doc.create_element("span");
                doc.add_class(marker, CLASS_REQUIRED);
                doc.set_text(marker, "*");
                doc.append_child(label, marker);
            }
        }

        let container = doc.create_element("div");
        doc.add_class(container, CLASS_CONTAINER);
        doc.append_child(element, container);

        let input = doc.create_element("input");
        doc.add_class(input, CLASS_INPUT);
        doc.set_attribute(input, "type", &config.input_type);
        if let Some(placeholder) = &config.placeholder {
            doc.set_attribute(input, "placeholder", placeholder);
        }
        if config.disabled {
            doc.set_attribute(input, "disabled", "");
        }
        if config.validation.required {
            doc.set_attribute(input, "required", "");
        }
        doc.append_child(container, input);

        let clear_button = config.clearable.then(|| {
            let button = doc.create_element("button");
            doc.add_class(button, CLASS_CLEAR);
            doc.set_attribute(button, "type", "button");
            doc.set_attribute(button, "aria-label", "Clear input");
            doc.set_text(button, "\u{d7}");
            doc.set_style(button, "display", "none");
            doc.append_child(container, button);
            button
        });

        let helper = doc.create_element("div");
        doc.add_class(helper, CLASS_HELPER);
        if let Some(helper_text) = &config.helper_text {
            doc.set_text(helper, helper_text);
        }
        doc.append_child(element, helper);

        (input, helper, clear_button)
    }

    fn bind_events(&self) {
        let events = self.inner.ctx.events();
        let mut handlers = Vec::new();

        // The host application routes keystrokes as `input` events carrying
        // the new value in detail.
        let this = self.clone();
        handlers.push(events.on(self.inner.input, "input", move |scope| {
            if let Some(value) = scope.detail().get("value").and_then(|v| v.as_str()) {
                this.accept_input(value);
            }
        }));

        let this = self.clone();
        handlers.push(events.on(self.inner.input, "focus", move |_| {
            let doc = this.inner.ctx.document();
            doc.add_class(this.inner.element, CLASS_FOCUSED);
            doc.focus(this.inner.input);
        }));

        let this = self.clone();
        handlers.push(events.on(self.inner.input, "blur", move |_| {
            let doc = this.inner.ctx.document();
            doc.remove_class(this.inner.element, CLASS_FOCUSED);
            doc.blur(this.inner.input);
            this.validate();
        }));

        if let Some(clear_button) = self.inner.clear_button {
            let this = self.clone();
            handlers.push(events.on(clear_button, "click", move |_| this.clear()));
        }

        self.state().handlers = handlers;
    }

    fn accept_input(&self, value: &str) {
        {
            let mut state = self.state();
            if state.disabled {
                return;
            }
            state.value = value.to_string();
            state.dirty = true;
        }
        self.validate();
        self.sync_view();
        self.emit(EVENT_INPUT, json!({ "value": value }));
    }

    /// Re-check the rules against the current value
    ///
    /// Pristine (never-edited) inputs always validate clean, matching the
    /// usual "don't yell before the user has typed" contract.
    pub fn validate(&self) -> bool {
        let (value, dirty) = {
            let state = self.state();
            (state.value.clone(), state.dirty)
        };
        if !dirty {
            return true;
        }

        let rules = &self.inner.config.validation;
        let error = if rules.required && value.is_empty() {
            Some("This field is required".to_string())
        } else if rules.min_length.is_some_and(|min| value.chars().count() < min) {
            rules
                .min_length
                .map(|min| format!("Minimum length is {min} characters"))
        } else if rules.max_length.is_some_and(|max| value.chars().count() > max) {
            rules
                .max_length
                .map(|max| format!("Maximum length is {max} characters"))
        } else if self
            .inner
            .pattern
            .as_ref()
            .is_some_and(|pattern| !pattern.is_match(&value))
        {
            Some("Invalid format".to_string())
        } else {
            None
        };

        let is_valid = error.is_none();
        self.state().error = error.clone();
        self.sync_view();
        self.emit(
            EVENT_VALIDATION,
            json!({ "isValid": is_valid, "error": error }),
        );
        is_valid
    }

    /// Reflect value/error state into the rendered subtree
    fn sync_view(&self) {
        let doc = self.inner.ctx.document();
        let (value, error) = {
            let state = self.state();
            (state.value.clone(), state.error.clone())
        };

        doc.set_attribute(self.inner.input, "value", &value);

        match &error {
            Some(message) => {
                doc.add_class(self.inner.input, CLASS_ERROR);
                doc.add_class(self.inner.helper, CLASS_ERROR);
                doc.set_text(self.inner.helper, message);
            }
            None => {
                doc.remove_class(self.inner.input, CLASS_ERROR);
                doc.remove_class(self.inner.helper, CLASS_ERROR);
                doc.set_text(
                    self.inner.helper,
                    self.inner.config.helper_text.as_deref().unwrap_or(""),
                );
            }
        }

        if let Some(clear_button) = self.inner.clear_button {
            let show = !value.is_empty() && !self.state().disabled;
            doc.set_style(clear_button, "display", if show { "block" } else { "none" });
        }
    }

    fn emit(&self, event_type: &str, detail: serde_json::Value) {
        self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(event_type)
                .with_cancelable(false)
                .with_detail(detail),
        );
    }

    pub fn value(&self) -> String {
        self.state().value.clone()
    }

    pub fn set_value(&self, value: &str) {
        {
            let mut state = self.state();
            state.value = value.to_string();
            state.dirty = true;
        }
        self.validate();
        self.sync_view();
        self.emit(EVENT_CHANGE, json!({ "value": value }));
    }

    pub fn clear(&self) {
        self.set_value("");
    }

    pub fn error(&self) -> Option<String> {
        self.state().error.clone()
    }

    pub fn is_valid(&self) -> bool {
        self.state().error.is_none()
    }

    pub fn disable(&self) {
        self.state().disabled = true;
        let doc = self.inner.ctx.document();
        doc.add_class(self.inner.element, CLASS_DISABLED);
        doc.set_attribute(self.inner.input, "disabled", "");
    }

    pub fn enable(&self) {
        self.state().disabled = false;
        let doc = self.inner.ctx.document();
        doc.remove_class(self.inner.element, CLASS_DISABLED);
        doc.remove_attribute(self.inner.input, "disabled");
    }

    /// Back to pristine: empty value, no error, not dirty
    pub fn reset(&self) {
        {
            let mut state = self.state();
            state.value.clear();
            state.error = None;
            state.dirty = false;
        }
        self.sync_view();
    }

    /// The rendered inner input element
    pub fn input_element(&self) -> ElementId {
        self.inner.input
    }
}

impl Widget for Input {
    fn name(&self) -> &'static str {
        "input"
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
        doc.remove_class(self.inner.element, CLASS_WRAPPER);
        doc.remove_class(
            self.inner.element,
            &format!("cl-input-{}", self.inner.config.size.suffix()),
        );
        doc.remove_class(self.inner.element, CLASS_DISABLED);
        doc.remove_class(self.inner.element, CLASS_FOCUSED);
        self.inner.ctx.registry().unregister(self.inner.element, self.inner.id);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn wrapper(ctx: &Context) -> ElementId {
        let el = ctx.document().create_element("div");
        ctx.document().append_child(ctx.document().body(), el);
        el
    }

    fn type_into(ctx: &Context, input: ElementId, value: &str) {
        ctx.events().trigger(
            ctx.document(),
            input,
            CustomEvent::new("input")
                .with_cancelable(false)
                .with_detail(json!({ "value": value })),
        );
    }

    #[test]
    fn renders_label_input_and_helper() {
        let ctx = Context::new_manual();
        let el = wrapper(&ctx);
        let _input = Input::new(
            &ctx,
            el,
            InputConfig {
                label: Some("Email".to_string()),
                helper_text: Some("We never share it".to_string()),
                validation: InputValidation {
                    required: true,
                    ..InputValidation::default()
                },
                ..InputConfig::default()
            },
        )
        .expect("input");

        let doc = ctx.document();
        let label = doc.query_selector(el, ".cl-input-label").expect("label");
        assert_eq!(doc.text(label), "Email");
        assert!(doc.query_selector(label, ".cl-input-required").is_some());
        let helper = doc.query_selector(el, ".cl-input-helper").expect("helper");
        assert_eq!(doc.text(helper), "We never share it");
        assert!(doc.query_selector(el, ".cl-input").is_some());
    }

    #[test]
    fn min_length_error_surfaces_and_clears() {
        let ctx = Context::new_manual();
        let el = wrapper(&ctx);
        let events = Arc::new(Mutex::new(Vec::new()));

        let input = Input::new(
            &ctx,
            el,
            InputConfig {
                validation: InputValidation {
                    min_length: Some(5),
                    ..InputValidation::default()
                },
                ..InputConfig::default()
            },
        )
        .expect("input");

        {
            let log = events.clone();
            ctx.events().on(el, "cl.input.validation", move |scope| {
                log.lock().unwrap().push(scope.detail().clone());
            });
        }

        type_into(&ctx, input.input_element(), "abc");
        assert_eq!(
            input.error().as_deref(),
            Some("Minimum length is 5 characters")
        );
        let doc = ctx.document();
        let helper = doc.query_selector(el, ".cl-input-helper").expect("helper");
        assert!(doc.has_class(helper, "has-error"));

        type_into(&ctx, input.input_element(), "abcdef");
        assert!(input.is_valid());
        assert!(!doc.has_class(helper, "has-error"));

        let log = events.lock().unwrap();
        assert_eq!(log.len(), 2);
        assert_eq!(log[0]["isValid"], json!(false));
        assert_eq!(log[1]["isValid"], json!(true));
    }

    #[test]
    fn pristine_input_does_not_validate() {
        let ctx = Context::new_manual();
        let el = wrapper(&ctx);
        let input = Input::new(
            &ctx,
            el,
            InputConfig {
                validation: InputValidation {
                    required: true,
                    ..InputValidation::default()
                },
                ..InputConfig::default()
            },
        )
        .expect("input");

        assert!(input.validate());
        assert!(input.error().is_none());
    }

    #[test]
    fn pattern_validation_uses_the_compiled_regex() {
        let ctx = Context::new_manual();
        let el = wrapper(&ctx);
        let input = Input::new(
            &ctx,
            el,
            InputConfig {
                validation: InputValidation {
                    pattern: Some(r"^\d+$".to_string()),
                    ..InputValidation::default()
                },
                ..InputConfig::default()
            },
        )
        .expect("input");

        input.set_value("12a");
        assert_eq!(input.error().as_deref(), Some("Invalid format"));
        input.set_value("123");
        assert!(input.is_valid());
    }

    #[test]
    fn invalid_pattern_is_rejected_at_construction() {
        let ctx = Context::new_manual();
        let el = wrapper(&ctx);
        let err = Input::new(
            &ctx,
            el,
            InputConfig {
                validation: InputValidation {
                    pattern: Some("(unclosed".to_string()),
                    ..InputValidation::default()
                },
                ..InputConfig::default()
            },
        )
        .expect_err("bad regex");
        assert!(matches!(err, ComponentError::InvalidConfig(_)));
    }

    #[test]
    fn clear_button_appears_with_content_and_clears_it() {
        let ctx = Context::new_manual();
        let el = wrapper(&ctx);
        let input = Input::new(
            &ctx,
            el,
            InputConfig {
                clearable: true,
                ..InputConfig::default()
            },
        )
        .expect("input");

        let doc = ctx.document();
        let clear = doc.query_selector(el, ".cl-input-clear").expect("clear button");
        assert_eq!(doc.style(clear, "display").as_deref(), Some("none"));

        input.set_value("hello");
        assert_eq!(doc.style(clear, "display").as_deref(), Some("block"));

        ctx.events().trigger(doc, clear, CustomEvent::new("click"));
        assert_eq!(input.value(), "");
        assert_eq!(doc.style(clear, "display").as_deref(), Some("none"));
    }

    #[test]
    fn destroy_removes_the_rendered_subtree() {
        let ctx = Context::new_manual();
        let el = wrapper(&ctx);
        let input = Input::new(&ctx, el, InputConfig::default()).expect("input");

        input.destroy();
        assert!(ctx.document().children(el).is_empty());
        assert!(!ctx.document().has_class(el, "cl-input-wrapper"));
    }
}
