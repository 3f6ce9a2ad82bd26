// Button component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::HandlerId;
use crate::kit::Callback;

const CLASS_BTN: &str = "cl-btn";
const CLASS_DISABLED: &str = "cl-btn-disabled";
const CLASS_SPINNER: &str = "cl-spinner";
const ATTR_LOADING: &str = "data-loading";

/// Button configuration
#[derive(Clone, Default)]
pub struct ButtonConfig {
    /// Start in the loading state
    pub loading: bool,
    /// Start disabled
    pub disabled: bool,
    /// Fired for clicks on the element
    pub on_click: Option<Callback>,
    pub missing_element: MissingElementPolicy,
}

#[derive(Default)]
struct ButtonState {
    original_text: String,
    spinner: Option<ElementId>,
    handlers: Vec<HandlerId>,
    loading: bool,
    disabled: bool,
}

struct ButtonInner {
    ctx: Context,
    element: ElementId,
    config: ButtonConfig,
    id: WidgetId,
    state: Mutex<ButtonState>,
}

/// Push button with loading and disabled states
#[derive(Clone)]
pub struct Button {
    inner: Arc<ButtonInner>,
}

impl Button {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: ButtonConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;
        let button = Self {
            inner: Arc::new(ButtonInner {
                ctx: ctx.clone(),
                element,
                config,
                id: WidgetId::new(),
                state: Mutex::new(ButtonState::default()),
            }),
        };
        ctx.registry().register(element, &button);
        button.init();
        Ok(button)
    }

    fn state(&self) -> MutexGuard<'_, ButtonState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn init(&self) {
        let doc = self.inner.ctx.document();
        doc.add_class(self.inner.element, CLASS_BTN);
        self.state().original_text = doc.text(self.inner.element);

        if self.inner.config.loading {
            self.set_loading(true);
        }
        if self.inner.config.disabled {
            self.set_disabled(true);
        }

        if let Some(on_click) = self.inner.config.on_click.clone() {
            let this = self.clone();
            let handler = self
                .inner
                .ctx
                .events()
                .on(self.inner.element, "click", move |_| {
                    if !this.state().disabled {
                        on_click();
                    }
                });
            self.state().handlers.push(handler);
        }
    }

    /// Swap content for a spinner while a long operation runs
    pub fn set_loading(&self, loading: bool) {
        let doc = self.inner.ctx.document();
        let mut state = self.state();
        if state.loading == loading {
            return;
        }
        state.loading = loading;

        if loading {
            doc.set_attribute(self.inner.element, ATTR_LOADING, "");
            doc.set_text(self.inner.element, "Loading\u{2026}");
            let spinner = doc.create_element("span");
            doc.add_class(spinner, CLASS_SPINNER);
            doc.append_child(self.inner.element, spinner);
            state.spinner = Some(spinner);
        } else {
            doc.remove_attribute(self.inner.element, ATTR_LOADING);
            doc.set_text(self.inner.element, &state.original_text);
            if let Some(spinner) = state.spinner.take() {
                doc.remove(spinner);
            }
        }
    }

    pub fn set_disabled(&self, disabled: bool) {
        let doc = self.inner.ctx.document();
        self.state().disabled = disabled;
        if disabled {
            doc.set_attribute(self.inner.element, "disabled", "");
            doc.add_class(self.inner.element, CLASS_DISABLED);
        } else {
            doc.remove_attribute(self.inner.element, "disabled");
            doc.remove_class(self.inner.element, CLASS_DISABLED);
        }
    }

    pub fn is_loading(&self) -> bool {
        self.state().loading
    }

    pub fn is_disabled(&self) -> bool {
        self.state().disabled
    }
}

impl Widget for Button {
    fn name(&self) -> &'static str {
        "button"
    }

    fn widget_id(&self) -> WidgetId {
        self.inner.id
    }

    fn element(&self) -> ElementId {
        self.inner.element
    }

    fn destroy(&self) {
        let doc = self.inner.ctx.document();
        let (handlers, spinner, original_text) = {
            let mut state = self.state();
            (
                std::mem::take(&mut state.handlers),
                state.spinner.take(),
                state.original_text.clone(),
            )
        };

        for handler in handlers {
            self.inner.ctx.events().off(handler);
        }
        if let Some(spinner) = spinner {
            doc.remove(spinner);
            doc.set_text(self.inner.element, &original_text);
        }
        doc.remove_attribute(self.inner.element, ATTR_LOADING);
        doc.remove_class(self.inner.element, CLASS_BTN);
        doc.remove_class(self.inner.element, CLASS_DISABLED);
        self.inner.ctx.registry().unregister(self.inner.element, self.inner.id);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
