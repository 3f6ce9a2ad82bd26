// Card component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::animation::{FadeHandle, TimerHandle, DEFAULT_FADE_DURATION};
use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::{CustomEvent, HandlerId};

const SELECTOR_BODY: &str = ".cl-card-body";
const SELECTOR_COLLAPSE_TOGGLE: &str = "[data-cl-toggle=\"collapse\"]";
const SELECTOR_DISMISS: &str = "[data-cl-dismiss=\"card\"]";

const CLASS_CARD: &str = "cl-card";
const CLASS_COLLAPSING: &str = "cl-collapsing";
const CLASS_COLLAPSED: &str = "cl-collapsed";

const EVENT_DISMISSED: &str = "cl.card.dismissed";

/// How long the body's height transition is assumed to run
const COLLAPSE_TRANSITION: Duration = Duration::from_millis(200);

/// Card configuration
#[derive(Debug, Clone, Default)]
pub struct CardConfig {
    pub missing_element: MissingElementPolicy,
}

#[derive(Default)]
struct CardState {
    handlers: Vec<HandlerId>,
    transition: Option<TimerHandle>,
    fade: Option<FadeHandle>,
    dismissed: bool,
}

struct CardInner {
    ctx: Context,
    element: ElementId,
    id: WidgetId,
    state: Mutex<CardState>,
}

/// Content card with collapsible body and dismiss support
///
/// Both behaviors ride delegated clicks, so markup inside the card can move
/// freely: any `[data-cl-toggle="collapse"]` descendant collapses the
/// `.cl-card-body`, any `[data-cl-dismiss="card"]` descendant dismisses the
/// card.
#[derive(Clone)]
pub struct Card {
    inner: Arc<CardInner>,
}

impl Card {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: CardConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;
        let card = Self {
            inner: Arc::new(CardInner {
                ctx: ctx.clone(),
                element,
                id: WidgetId::new(),
                state: Mutex::new(CardState::default()),
            }),
        };
        ctx.registry().register(element, &card);
        card.init();
        Ok(card)
    }

    fn state(&self) -> MutexGuard<'_, CardState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn init(&self) {
        let doc = self.inner.ctx.document();
        doc.add_class(self.inner.element, CLASS_CARD);

        let events = self.inner.ctx.events();
        let mut handlers = Vec::new();

        let this = self.clone();
        handlers.push(events.on_delegated(
            self.inner.element,
            "click",
            SELECTOR_COLLAPSE_TOGGLE,
            move |scope| {
                scope.prevent_default();
                this.toggle_collapse();
            },
        ));

        let this = self.clone();
        handlers.push(events.on_delegated(
            self.inner.element,
            "click",
            SELECTOR_DISMISS,
            move |scope| {
                scope.prevent_default();
                this.dismiss();
            },
        ));

        self.state().handlers = handlers;
    }

    fn body(&self) -> Option<ElementId> {
        self.inner
            .ctx
            .document()
            .query_selector(self.inner.element, SELECTOR_BODY)
    }

    pub fn toggle_collapse(&self) {
        if self.is_collapsed() {
            self.expand();
        } else {
            self.collapse();
        }
    }

    /// Collapse the body: mark the card, run the height transition, then
    /// hide the body outright
    pub fn collapse(&self) {
        let Some(body) = self.body() else { return };
        let doc = self.inner.ctx.document();
        {
            let state = self.state();
            if state.transition.is_some() || state.dismissed {
                return;
            }
        }
        if doc.has_class(self.inner.element, CLASS_COLLAPSED) {
            return;
        }

        doc.add_class(self.inner.element, CLASS_COLLAPSING);
        doc.add_class(self.inner.element, CLASS_COLLAPSED);
        doc.set_style(body, "height", "0");

        let this = self.clone();
        let timer = self.inner.ctx.animator().after(COLLAPSE_TRANSITION, move || {
            let doc = this.inner.ctx.document();
            doc.remove_class(this.inner.element, CLASS_COLLAPSING);
            if let Some(body) = this.body() {
                doc.set_style(body, "display", "none");
            }
            this.state().transition = None;
        });
        self.state().transition = Some(timer);
    }

    pub fn expand(&self) {
        let Some(body) = self.body() else { return };
        let doc = self.inner.ctx.document();
        {
            let state = self.state();
            if state.transition.is_some() || state.dismissed {
                return;
            }
        }
        if !doc.has_class(self.inner.element, CLASS_COLLAPSED) {
            return;
        }

        doc.remove_style(body, "display");
        doc.add_class(self.inner.element, CLASS_COLLAPSING);
        doc.remove_style(body, "height");

        let this = self.clone();
        let timer = self.inner.ctx.animator().after(COLLAPSE_TRANSITION, move || {
            let doc = this.inner.ctx.document();
            doc.remove_class(this.inner.element, CLASS_COLLAPSING);
            doc.remove_class(this.inner.element, CLASS_COLLAPSED);
            this.state().transition = None;
        });
        self.state().transition = Some(timer);
    }

    /// Fade the whole card out and detach it
    pub fn dismiss(&self) {
        {
            let mut state = self.state();
            if state.dismissed || state.fade.is_some() {
                return;
            }
            if let Some(timer) = state.transition.take() {
                timer.cancel();
            }
        }

        let fade = self
            .inner
            .ctx
            .animator()
            .fade_out(self.inner.element, DEFAULT_FADE_DURATION);
        let this = self.clone();
        fade.on_complete(move || {
            this.state().dismissed = true;
            this.inner.ctx.document().remove(this.inner.element);
            this.inner.ctx.events().trigger(
                this.inner.ctx.document(),
                this.inner.element,
                CustomEvent::new(EVENT_DISMISSED).with_cancelable(false),
            );
        });
        self.state().fade = Some(fade);
    }

    pub fn is_collapsed(&self) -> bool {
        self.inner
            .ctx
            .document()
            .has_class(self.inner.element, CLASS_COLLAPSED)
    }

    pub fn is_dismissed(&self) -> bool {
        self.state().dismissed
    }
}

impl Widget for Card {
    fn name(&self) -> &'static str {
        "card"
    }

    fn widget_id(&self) -> WidgetId {
        self.inner.id
    }

    fn element(&self) -> ElementId {
        self.inner.element
    }

    fn destroy(&self) {
        let doc = self.inner.ctx.document();
        let handlers = {
            let mut state = self.state();
            if let Some(fade) = state.fade.take() {
                fade.cancel();
            }
            if let Some(timer) = state.transition.take() {
                timer.cancel();
            }
            std::mem::take(&mut state.handlers)
        };

        for handler in handlers {
            self.inner.ctx.events().off(handler);
        }
        doc.remove_class(self.inner.element, CLASS_CARD);
        doc.remove_class(self.inner.element, CLASS_COLLAPSING);
        doc.remove_class(self.inner.element, CLASS_COLLAPSED);
        if let Some(body) = self.body() {
            doc.remove_style(body, "height");
            doc.remove_style(body, "display");
        }
        self.inner.ctx.registry().unregister(self.inner.element, self.inner.id);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
