// Popover component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::animation::{FadeHandle, TimerHandle, DEFAULT_FADE_DURATION};
use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::{CustomEvent, HandlerId};
use crate::kit::components::dropdown::Placement;
use crate::kit::{run_hook, TransitionHooks, Visibility};

const CLASS_POPOVER: &str = "cl-popover";
const CLASS_ARROW: &str = "cl-popover-arrow";
const CLASS_HEADER: &str = "cl-popover-header";
const CLASS_BODY: &str = "cl-popover-body";

const EVENT_SHOW: &str = "cl.popover.show";
const EVENT_SHOWN: &str = "cl.popover.shown";
const EVENT_HIDE: &str = "cl.popover.hide";
const EVENT_HIDDEN: &str = "cl.popover.hidden";

/// What opens and closes the popover
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TriggerMode {
    #[default]
    Click,
    Hover,
    Focus,
    /// Only the `show`/`hide`/`toggle` API
    Manual,
}

/// Popover configuration
#[derive(Clone)]
pub struct PopoverConfig {
    /// Body text of the tip
    pub content: String,
    /// Optional header line
    pub title: Option<String>,
    pub placement: Placement,
    pub trigger: TriggerMode,
    pub animation: bool,
    /// Hover-mode delay before showing/hiding
    pub delay: Duration,
    /// Gap between host and tip, in pixels
    pub offset: u32,
    pub hooks: TransitionHooks,
    pub missing_element: MissingElementPolicy,
}

impl Default for PopoverConfig {
    fn default() -> Self {
        Self {
            content: String::new(),
            title: None,
            placement: Placement::Top,
            trigger: TriggerMode::Click,
            animation: true,
            delay: Duration::ZERO,
            offset: 8,
            hooks: TransitionHooks::default(),
            missing_element: MissingElementPolicy::default(),
        }
    }
}

#[derive(Default)]
struct PopoverState {
    visibility: Visibility,
    tip: Option<ElementId>,
    handlers: Vec<HandlerId>,
    fade: Option<FadeHandle>,
    hover_timer: Option<TimerHandle>,
}

struct PopoverInner {
    ctx: Context,
    element: ElementId,
    tip_id: String,
    config: PopoverConfig,
    id: WidgetId,
    state: Mutex<PopoverState>,
}

/// Floating tip anchored to a host element
///
/// The tip subtree (`.cl-popover` with arrow, optional header, and body) is
/// built under the document body on first show and reused afterwards. The
/// host advertises it via `aria-describedby` against a generated id.
#[derive(Clone)]
pub struct Popover {
    inner: Arc<PopoverInner>,
}

impl Popover {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: PopoverConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;
        let popover = Self {
            inner: Arc::new(PopoverInner {
                ctx: ctx.clone(),
                element,
                tip_id: format!("popover-{}", random_suffix()),
                config,
                id: WidgetId::new(),
                state: Mutex::new(PopoverState::default()),
            }),
        };
        ctx.registry().register(element, &popover);
        popover.init();
        Ok(popover)
    }

    fn state(&self) -> MutexGuard<'_, PopoverState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn init(&self) {
        let doc = self.inner.ctx.document();
        doc.set_attribute(self.inner.element, "aria-describedby", &self.inner.tip_id);

        let events = self.inner.ctx.events();
        let mut handlers = Vec::new();

        match self.inner.config.trigger {
            TriggerMode::Click => {
                let this = self.clone();
                handlers.push(events.on(self.inner.element, "click", move |_| this.toggle()));
            }
            TriggerMode::Hover => {
                let this = self.clone();
                handlers.push(events.on(self.inner.element, "mouseenter", move |_| this.enter()));
                let this = self.clone();
                handlers.push(events.on(self.inner.element, "mouseleave", move |_| this.leave()));
            }
            TriggerMode::Focus => {
                let this = self.clone();
                handlers.push(events.on(self.inner.element, "focus", move |_| this.show()));
                let this = self.clone();
                handlers.push(events.on(self.inner.element, "blur", move |_| this.hide()));
            }
            TriggerMode::Manual => {}
        }

        self.state().handlers = handlers;
    }

    /// Build the tip subtree on first use
    fn ensure_tip(&self) -> ElementId {
        if let Some(tip) = self.state().tip {
            return tip;
        }

        let doc = self.inner.ctx.document();
        let tip = doc.create_element("div");
        doc.add_class(tip, CLASS_POPOVER);
        doc.add_class(tip, &format!("cl-popover-{}", placement_suffix(self.inner.config.placement)));
        doc.set_attribute(tip, "id", &self.inner.tip_id);
        doc.set_attribute(tip, "role", "tooltip");
        doc.set_style(tip, "display", "none");
        doc.set_style(tip, "margin", &format!("{}px", self.inner.config.offset));

        let arrow = doc.create_element("div");
        doc.add_class(arrow, CLASS_ARROW);
        doc.append_child(tip, arrow);

        if let Some(title) = &self.inner.config.title {
            let header = doc.create_element("h3");
            doc.add_class(header, CLASS_HEADER);
            doc.set_text(header, title);
            doc.append_child(tip, header);
        }

        let body = doc.create_element("div");
        doc.add_class(body, CLASS_BODY);
        doc.set_text(body, &self.inner.config.content);
        doc.append_child(tip, body);

        doc.append_child(doc.body(), tip);
        self.state().tip = Some(tip);
        tip
    }

    fn enter(&self) {
        if self.inner.config.delay.is_zero() {
            self.show();
            return;
        }
        let this = self.clone();
        let timer = self
            .inner
            .ctx
            .animator()
            .after(self.inner.config.delay, move || this.show());
        let mut state = self.state();
        if let Some(old) = state.hover_timer.replace(timer) {
            old.cancel();
        }
    }

    fn leave(&self) {
        if self.inner.config.delay.is_zero() {
            self.hide();
            return;
        }
        let this = self.clone();
        let timer = self
            .inner
            .ctx
            .animator()
            .after(self.inner.config.delay, move || this.hide());
        let mut state = self.state();
        if let Some(old) = state.hover_timer.replace(timer) {
            old.cancel();
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

        let tip = self.ensure_tip();
        let doc = self.inner.ctx.document();

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
                    .fade_in(tip, DEFAULT_FADE_DURATION, "block")
            } else {
                doc.set_style(tip, "display", "block");
                FadeHandle::completed()
            };
            state.fade = Some(fade.clone());
            fade
        };

        let this = self.clone();
        fade.on_complete(move || {
            this.state().visibility = Visibility::Shown;
            run_hook(&this.inner.config.hooks.on_shown);
            this.inner.ctx.events().trigger(
                this.inner.ctx.document(),
                this.inner.element,
                CustomEvent::new(EVENT_SHOWN).with_cancelable(false),
            );
        });
    }

    pub fn hide(&self) {
        let tip = {
            let state = self.state();
            if !state.visibility.is_opening_or_open() {
                return;
            }
            state.tip
        };
        let Some(tip) = tip else { return };

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
        let fade = {
            let mut state = self.state();
            state.visibility = Visibility::Hiding;
            if let Some(old) = state.fade.take() {
                old.cancel();
            }
            let fade = if self.inner.config.animation {
                self.inner.ctx.animator().fade_out(tip, DEFAULT_FADE_DURATION)
            } else {
                doc.set_style(tip, "display", "none");
                FadeHandle::completed()
            };
            state.fade = Some(fade.clone());
            fade
        };

        let this = self.clone();
        fade.on_complete(move || {
            this.state().visibility = Visibility::Hidden;
            run_hook(&this.inner.config.hooks.on_hidden);
            this.inner.ctx.events().trigger(
                this.inner.ctx.document(),
                this.inner.element,
                CustomEvent::new(EVENT_HIDDEN).with_cancelable(false),
            );
        });
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

    /// The tip element, if it has been built
    pub fn tip(&self) -> Option<ElementId> {
        self.state().tip
    }
}

impl Widget for Popover {
    fn name(&self) -> &'static str {
        "popover"
    }

    fn widget_id(&self) -> WidgetId {
        self.inner.id
    }

    fn element(&self) -> ElementId {
        self.inner.element
    }

    fn destroy(&self) {
        let doc = self.inner.ctx.document();
        let (handlers, tip) = {
            let mut state = self.state();
            if let Some(fade) = state.fade.take() {
                fade.cancel();
            }
            if let Some(timer) = state.hover_timer.take() {
                timer.cancel();
            }
            (std::mem::take(&mut state.handlers), state.tip.take())
        };

        for handler in handlers {
            self.inner.ctx.events().off(handler);
        }
        if let Some(tip) = tip {
            doc.remove(tip);
        }
        doc.remove_attribute(self.inner.element, "aria-describedby");
        self.inner.ctx.registry().unregister(self.inner.element, self.inner.id);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

fn placement_suffix(placement: Placement) -> &'static str {
    match placement {
        Placement::Top => "top",
        Placement::Bottom => "bottom",
        Placement::Left => "left",
        Placement::Right => "right",
    }
}

fn random_suffix() -> String {
    const ALPHABET: &[u8] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    let mut rng = rand::thread_rng();
    (0..7)
        .map(|_| ALPHABET[rng.gen_range(0..ALPHABET.len())] as char)
        .collect()
}
