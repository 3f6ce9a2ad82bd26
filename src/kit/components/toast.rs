// Toast component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::animation::{FadeHandle, TimerHandle, DEFAULT_FADE_DURATION};
use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::{CustomEvent, HandlerId};
use crate::kit::{run_hook, TransitionHooks, Visibility};

const SELECTOR_DISMISS: &str = "[data-cl-dismiss=\"toast\"]";

const CLASS_TOAST: &str = "cl-toast";
const CLASS_CONTAINER: &str = "cl-toast-container";
const CLASS_CLOSE: &str = "cl-toast-close";

const EVENT_SHOW: &str = "cl.toast.show";
const EVENT_SHOWN: &str = "cl.toast.shown";
const EVENT_HIDE: &str = "cl.toast.hide";
const EVENT_HIDDEN: &str = "cl.toast.hidden";

/// Screen corner a toast stack lives in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ToastPosition {
    #[default]
    TopRight,
    TopLeft,
    TopCenter,
    BottomRight,
    BottomLeft,
    BottomCenter,
}

impl ToastPosition {
    fn suffix(self) -> &'static str {
        match self {
            Self::TopRight => "top-right",
            Self::TopLeft => "top-left",
            Self::TopCenter => "top-center",
            Self::BottomRight => "bottom-right",
            Self::BottomLeft => "bottom-left",
            Self::BottomCenter => "bottom-center",
        }
    }
}

/// Toast configuration
#[derive(Clone)]
pub struct ToastConfig {
    /// Hide automatically after `delay`
    pub autohide: bool,
    pub delay: Duration,
    pub position: ToastPosition,
    /// Fade transitions; `false` snaps display on and off
    pub animation: bool,
    pub hooks: TransitionHooks,
    pub missing_element: MissingElementPolicy,
}

impl Default for ToastConfig {
    fn default() -> Self {
        Self {
            autohide: true,
            delay: Duration::from_millis(5000),
            position: ToastPosition::TopRight,
            animation: true,
            hooks: TransitionHooks::default(),
            missing_element: MissingElementPolicy::default(),
        }
    }
}

#[derive(Default)]
struct ToastState {
    visibility: Visibility,
    handlers: Vec<HandlerId>,
    fade: Option<FadeHandle>,
    hide_timer: Option<TimerHandle>,
    created_close_button: Option<ElementId>,
}

struct ToastInner {
    ctx: Context,
    element: ElementId,
    container: ElementId,
    config: ToastConfig,
    id: WidgetId,
    state: Mutex<ToastState>,
}

/// Transient notification stacked in a shared positional container
///
/// The container (`#cl-toast-container-<position>`) is created under the
/// body the first time a toast needs it and shared by every toast at that
/// position. Hovering pauses the autohide timer; leaving restarts it.
#[derive(Clone)]
pub struct Toast {
    inner: Arc<ToastInner>,
}

impl Toast {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: ToastConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;
        let container = Self::ensure_container(ctx, config.position);

        let toast = Self {
            inner: Arc::new(ToastInner {
                ctx: ctx.clone(),
                element,
                container,
                config,
                id: WidgetId::new(),
                state: Mutex::new(ToastState::default()),
            }),
        };
        ctx.registry().register(element, &toast);
        toast.init();
        Ok(toast)
    }

    fn state(&self) -> MutexGuard<'_, ToastState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn ensure_container(ctx: &Context, position: ToastPosition) -> ElementId {
        let doc = ctx.document();
        let container_id = format!("cl-toast-container-{}", position.suffix());
        if let Some(existing) = doc.get_element_by_id(&container_id) {
            return existing;
        }
        let container = doc.create_element("div");
        doc.set_attribute(container, "id", &container_id);
        doc.add_class(container, CLASS_CONTAINER);
        doc.add_class(container, &format!("cl-toast-{}", position.suffix()));
        doc.append_child(doc.body(), container);
        container
    }

    fn init(&self) {
        let doc = self.inner.ctx.document();
        doc.add_class(self.inner.element, CLASS_TOAST);
        doc.set_attribute(self.inner.element, "role", "alert");
        doc.set_attribute(self.inner.element, "aria-live", "assertive");
        doc.set_attribute(self.inner.element, "aria-atomic", "true");
        doc.set_style(self.inner.element, "display", "none");

        self.ensure_close_button();

        let events = self.inner.ctx.events();
        let mut handlers = Vec::new();

        let this = self.clone();
        handlers.push(events.on_delegated(
            self.inner.element,
            "click",
            SELECTOR_DISMISS,
            move |_| this.hide(),
        ));

        if self.inner.config.autohide {
            let this = self.clone();
            handlers.push(events.on(self.inner.element, "mouseenter", move |_| this.pause()));
            let this = self.clone();
            handlers.push(events.on(self.inner.element, "mouseleave", move |_| this.resume()));
        }

        self.state().handlers = handlers;
    }

    fn ensure_close_button(&self) {
        let doc = self.inner.ctx.document();
        if doc
            .query_selector(self.inner.element, SELECTOR_DISMISS)
            .is_some()
        {
            return;
        }
        let button = doc.create_element("button");
        doc.set_attribute(button, "type", "button");
        doc.set_attribute(button, "data-cl-dismiss", "toast");
        doc.set_attribute(button, "aria-label", "Close");
        doc.add_class(button, CLASS_CLOSE);
        doc.set_text(button, "\u{d7}");

        // Prefer the header when the markup has one.
        let parent = doc
            .query_selector(self.inner.element, ".cl-toast-header")
            .unwrap_or(self.inner.element);
        doc.append_child(parent, button);
        self.state().created_close_button = Some(button);
    }

    fn start_hide_timer(&self) {
        if !self.inner.config.autohide {
            return;
        }
        let this = self.clone();
        let timer = self
            .inner
            .ctx
            .animator()
            .after(self.inner.config.delay, move || this.hide());
        let mut state = self.state();
        if let Some(old) = state.hide_timer.replace(timer) {
            old.cancel();
        }
    }

    fn clear_hide_timer(&self) {
        if let Some(timer) = self.state().hide_timer.take() {
            timer.cancel();
        }
    }

    /// Suspend the autohide countdown (mouse is over the toast)
    pub fn pause(&self) {
        self.clear_hide_timer();
    }

    /// Restart the autohide countdown from zero
    pub fn resume(&self) {
        if self.state().visibility.is_opening_or_open() {
            self.start_hide_timer();
        }
    }

    pub fn show(&self) {
        {
            let state = self.state();
            if state.visibility.is_opening_or_open() {
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

        let doc = self.inner.ctx.document();
        // The shared container disappears when its last toast is destroyed;
        // bring it back before stacking into it.
        if !doc.is_attached(self.inner.container) {
            doc.append_child(doc.body(), self.inner.container);
        }
        doc.append_child(self.inner.container, self.inner.element);

        let fade = {
            let mut state = self.state();
            state.visibility = Visibility::Showing;
            if let Some(old) = state.fade.take() {
                old.cancel();
            }
            let fade = if self.inner.config.animation {
                self.inner
                    .ctx
                    .animator()
                    .fade_in(self.inner.element, DEFAULT_FADE_DURATION, "block")
            } else {
                doc.set_style(self.inner.element, "display", "block");
                FadeHandle::completed()
            };
            state.fade = Some(fade.clone());
            fade
        };

        let this = self.clone();
        fade.on_complete(move || {
            this.state().visibility = Visibility::Shown;
            this.start_hide_timer();
            run_hook(&this.inner.config.hooks.on_shown);
            this.inner.ctx.events().trigger(
                this.inner.ctx.document(),
                this.inner.element,
                CustomEvent::new(EVENT_SHOWN).with_cancelable(false),
            );
        });
    }

    pub fn hide(&self) {
        {
            let state = self.state();
            if !state.visibility.is_opening_or_open() {
                return;
            }
        }

        self.clear_hide_timer();
        run_hook(&self.inner.config.hooks.on_hide);
        let outcome = self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_HIDE),
        );
        if outcome.default_prevented {
            self.resume();
            return;
        }

        let doc = self.inner.ctx.document();
        let fade = {
            let mut state = self.state();
            state.visibility = Visibility::Hiding;
            if let Some(old) = state.fade.take() {
                old.cancel();
            }
            let fade = if self.inner.config.animation {
                self.inner
                    .ctx
                    .animator()
                    .fade_out(self.inner.element, DEFAULT_FADE_DURATION)
            } else {
                doc.set_style(self.inner.element, "display", "none");
                FadeHandle::completed()
            };
            state.fade = Some(fade.clone());
            fade
        };

        let this = self.clone();
        fade.on_complete(move || {
            this.state().visibility = Visibility::Hidden;
            this.inner.ctx.document().remove(this.inner.element);
            run_hook(&this.inner.config.hooks.on_hidden);
            this.inner.ctx.events().trigger(
                this.inner.ctx.document(),
                this.inner.element,
                CustomEvent::new(EVENT_HIDDEN).with_cancelable(false),
            );
        });
    }

    pub fn is_shown(&self) -> bool {
        self.state().visibility.is_shown()
    }

    pub fn visibility(&self) -> Visibility {
        self.state().visibility
    }
}

impl Widget for Toast {
    fn name(&self) -> &'static str {
        "toast"
    }

    fn widget_id(&self) -> WidgetId {
        self.inner.id
    }

    fn element(&self) -> ElementId {
        self.inner.element
    }

    fn destroy(&self) {
        let doc = self.inner.ctx.document();
        let (handlers, close_button) = {
            let mut state = self.state();
            if let Some(fade) = state.fade.take() {
                fade.cancel();
            }
            if let Some(timer) = state.hide_timer.take() {
                timer.cancel();
            }
            (
                std::mem::take(&mut state.handlers),
                state.created_close_button.take(),
            )
        };

        for handler in handlers {
            self.inner.ctx.events().off(handler);
        }
        if let Some(button) = close_button {
            doc.remove(button);
        }
        doc.remove(self.inner.element);
        doc.remove_class(self.inner.element, CLASS_TOAST);
        doc.remove_attribute(self.inner.element, "role");
        doc.remove_attribute(self.inner.element, "aria-live");
        doc.remove_attribute(self.inner.element, "aria-atomic");
        doc.remove_style(self.inner.element, "display");

        // Drop the shared container once the last toast leaves it.
        if doc.children(self.inner.container).is_empty() {
            doc.remove(self.inner.container);
        }
        self.inner.ctx.registry().unregister(self.inner.element, self.inner.id);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
