// Collapse component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::animation::TimerHandle;
use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::{CustomEvent, HandlerId};
use crate::kit::{run_hook, TransitionHooks, Visibility};

const CLASS_COLLAPSE: &str = "cl-collapse";
const CLASS_COLLAPSING: &str = "cl-collapsing";
const CLASS_SHOW: &str = "cl-show";

const EVENT_SHOW: &str = "cl.collapse.show";
const EVENT_SHOWN: &str = "cl.collapse.shown";
const EVENT_HIDE: &str = "cl.collapse.hide";
const EVENT_HIDDEN: &str = "cl.collapse.hidden";

/// Collapse configuration
#[derive(Clone)]
pub struct CollapseConfig {
    /// Accordion container; showing this panel hides sibling panels
    /// registered under the same parent
    pub parent: Option<ElementRef>,
    /// Assumed duration of the CSS height transition
    pub transition: Duration,
    pub hooks: TransitionHooks,
    pub missing_element: MissingElementPolicy,
}

impl Default for CollapseConfig {
    fn default() -> Self {
        Self {
            parent: None,
            transition: Duration::from_millis(300),
            hooks: TransitionHooks::default(),
            missing_element: MissingElementPolicy::default(),
        }
    }
}

#[derive(Default)]
struct CollapseState {
    visibility: Visibility,
    handlers: Vec<HandlerId>,
    transition: Option<TimerHandle>,
    triggers: Vec<ElementId>,
}

struct CollapseInner {
    ctx: Context,
    element: ElementId,
    parent: Option<ElementId>,
    config: CollapseConfig,
    id: WidgetId,
    state: Mutex<CollapseState>,
}

/// Expanding/collapsing panel with optional accordion parenting
///
/// Triggers are discovered once at construction: any
/// `[data-cl-toggle="collapse"]` whose `href` or `data-cl-target` points at
/// this panel's id. ARIA `aria-expanded` is written synchronously with the
/// class mutation on both the panel and each trigger; assistive technology
/// never waits for the transition.
#[derive(Clone)]
pub struct Collapse {
    inner: Arc<CollapseInner>,
}

impl Collapse {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: CollapseConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;
        let parent = match config.parent.clone() {
            Some(parent_ref) => Some(resolve_element(ctx, parent_ref, config.missing_element)?),
            None => None,
        };

        let collapse = Self {
            inner: Arc::new(CollapseInner {
                ctx: ctx.clone(),
                element,
                parent,
                config,
                id: WidgetId::new(),
                state: Mutex::new(CollapseState::default()),
            }),
        };
        ctx.registry().register(element, &collapse);
        collapse.init();
        Ok(collapse)
    }

    fn state(&self) -> MutexGuard<'_, CollapseState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn init(&self) {
        let doc = self.inner.ctx.document();
        doc.add_class(self.inner.element, CLASS_COLLAPSE);
        doc.set_style(self.inner.element, "display", "none");
        doc.set_attribute(self.inner.element, "aria-expanded", "false");

        self.bind_triggers();
    }

    fn bind_triggers(&self) {
        let doc = self.inner.ctx.document();
        let Some(panel_id) = doc.get_attribute(self.inner.element, "id") else {
            return; // triggers reference the panel by fragment id
        };

        let selector = format!(
            "[data-cl-toggle=\"collapse\"][href=\"#{panel_id}\"], \
             [data-cl-toggle=\"collapse\"][data-cl-target=\"#{panel_id}\"]"
        );
        let triggers = doc.query_selector_all(doc.body(), &selector);

        let mut state = self.state();
        for &trigger in &triggers {
            doc.set_attribute(trigger, "aria-controls", &panel_id);
            doc.set_attribute(trigger, "aria-expanded", "false");

            let this = self.clone();
            state.handlers.push(self.inner.ctx.events().on(
                trigger,
                "click",
                move |scope| {
                    scope.prevent_default();
                    this.toggle();
                },
            ));
        }
        state.triggers = triggers;
    }

    fn set_expanded(&self, expanded: bool) {
        let doc = self.inner.ctx.document();
        let value = if expanded { "true" } else { "false" };
        doc.set_attribute(self.inner.element, "aria-expanded", value);
        let triggers = self.state().triggers.clone();
        for trigger in triggers {
            doc.set_attribute(trigger, "aria-expanded", value);
        }
    }

    /// Close sibling panels registered under the accordion parent
    fn hide_siblings(&self) {
        let Some(parent) = self.inner.parent else { return };
        let doc = self.inner.ctx.document();
        let selector = format!(".{CLASS_COLLAPSE}.{CLASS_SHOW}");
        for sibling in doc.query_selector_all(parent, &selector) {
            if sibling == self.inner.element {
                continue;
            }
            if let Some(other) = self.inner.ctx.registry().get_as::<Collapse>(sibling) {
                other.hide();
            }
        }
    }

    pub fn show(&self) {
        {
            let state = self.state();
            if state.visibility != Visibility::Hidden {
                return;
            }
        }

        run_hook(&self.inner.config.hooks.on_show);
        let outcome = self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_SHOW),
        );
        if outcome.default_prevented {
            return;
        }

        self.hide_siblings();

        let doc = self.inner.ctx.document();
        {
            let mut state = self.state();
            state.visibility = Visibility::Showing;
            if let Some(timer) = state.transition.take() {
                timer.cancel();
            }
        }

        doc.set_style(self.inner.element, "display", "block");
        doc.remove_class(self.inner.element, CLASS_COLLAPSE);
        doc.add_class(self.inner.element, CLASS_COLLAPSING);
        self.set_expanded(true);

        let this = self.clone();
        let timer = self
            .inner
            .ctx
            .animator()
            .after(self.inner.config.transition, move || this.finish_show());
        self.state().transition = Some(timer);
    }

    fn finish_show(&self) {
        let doc = self.inner.ctx.document();
        doc.remove_class(self.inner.element, CLASS_COLLAPSING);
        doc.add_class(self.inner.element, CLASS_COLLAPSE);
        doc.add_class(self.inner.element, CLASS_SHOW);

        {
            let mut state = self.state();
            state.visibility = Visibility::Shown;
            state.transition = None;
        }

        run_hook(&self.inner.config.hooks.on_shown);
        self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_SHOWN).with_cancelable(false),
        );
    }

    pub fn hide(&self) {
        {
            let state = self.state();
            if state.visibility != Visibility::Shown {
                return;
            }
        }

        run_hook(&self.inner.config.hooks.on_hide);
        let outcome = self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_HIDE),
        );
        if outcome.default_prevented {
            return;
        }

        let doc = self.inner.ctx.document();
        {
            let mut state = self.state();
            state.visibility = Visibility::Hiding;
            if let Some(timer) = state.transition.take() {
                timer.cancel();
            }
        }

        doc.add_class(self.inner.element, CLASS_COLLAPSING);
        doc.remove_class(self.inner.element, CLASS_COLLAPSE);
        doc.remove_class(self.inner.element, CLASS_SHOW);
        self.set_expanded(false);

        let this = self.clone();
        let timer = self
            .inner
            .ctx
            .animator()
            .after(self.inner.config.transition, move || this.finish_hide());
        self.state().transition = Some(timer);
    }

    fn finish_hide(&self) {
        let doc = self.inner.ctx.document();
        doc.remove_class(self.inner.element, CLASS_COLLAPSING);
        doc.add_class(self.inner.element, CLASS_COLLAPSE);
        doc.set_style(self.inner.element, "display", "none");

        {
            let mut state = self.state();
            state.visibility = Visibility::Hidden;
            state.transition = None;
        }

        run_hook(&self.inner.config.hooks.on_hidden);
        self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_HIDDEN).with_cancelable(false),
        );
    }

    pub fn toggle(&self) {
        if self.state().visibility.is_opening_or_open() {
            self.hide();
        } else {
            self.show();
        }
    }

    pub fn is_shown(&self) -> bool {
        self.state().visibility.is_shown()
    }

    pub fn visibility(&self) -> Visibility {
        self.state().visibility
    }
}

impl Widget for Collapse {
    fn name(&self) -> &'static str {
        "collapse"
    }

    fn widget_id(&self) -> WidgetId {
        self.inner.id
    }

    fn element(&self) -> ElementId {
        self.inner.element
    }

    fn destroy(&self) {
        let doc = self.inner.ctx.document();
        let (handlers, triggers) = {
            let mut state = self.state();
            if let Some(timer) = state.transition.take() {
                timer.cancel();
            }
            (
                std::mem::take(&mut state.handlers),
                std::mem::take(&mut state.triggers),
            )
        };

        for handler in handlers {
            self.inner.ctx.events().off(handler);
        }
        for trigger in triggers {
            doc.remove_attribute(trigger, "aria-controls");
            doc.remove_attribute(trigger, "aria-expanded");
        }
        doc.remove_attribute(self.inner.element, "aria-expanded");
        doc.remove_class(self.inner.element, CLASS_COLLAPSE);
        doc.remove_class(self.inner.element, CLASS_COLLAPSING);
        doc.remove_class(self.inner.element, CLASS_SHOW);
        doc.remove_style(self.inner.element, "display");
        self.inner.ctx.registry().unregister(self.inner.element, self.inner.id);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
