// Alert component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use crate::animation::{FadeHandle, TimerHandle, DEFAULT_FADE_DURATION};
use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::{CustomEvent, HandlerId};
use crate::kit::Callback;

const CLASS_ALERT: &str = "cl-alert";
const CLASS_CLOSE: &str = "cl-alert-close";
const EVENT_CLOSE: &str = "cl.alert.close";
const EVENT_CLOSED: &str = "cl.alert.closed";

/// Alert configuration
#[derive(Clone)]
pub struct AlertConfig {
    /// Inject a close button and wire it to [`Alert::close`]
    pub dismissible: bool,
    /// Auto-close after this long; zero disables
    pub duration: Duration,
    /// Fired once, after the close fade settles and the element is detached
    pub on_close: Option<Callback>,
    pub missing_element: MissingElementPolicy,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            dismissible: true,
            duration: Duration::ZERO,
            on_close: None,
            missing_element: MissingElementPolicy::default(),
        }
    }
}

#[derive(Default)]
struct AlertState {
    close_button: Option<ElementId>,
    handlers: Vec<HandlerId>,
    fade: Option<FadeHandle>,
    auto_close: Option<TimerHandle>,
    closing: bool,
    closed: bool,
}

struct AlertInner {
    ctx: Context,
    element: ElementId,
    config: AlertConfig,
    id: WidgetId,
    state: Mutex<AlertState>,
}

/// Dismissible message box
///
/// Construction marks the element with `cl-alert` and, when dismissible,
/// appends one `.cl-alert-close` button. `close()` fades the element out,
/// detaches it, and fires `on_close` exactly once.
#[derive(Clone)]
pub struct Alert {
    inner: Arc<AlertInner>,
}

impl Alert {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: AlertConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;
        let alert = Self {
            inner: Arc::new(AlertInner {
                ctx: ctx.clone(),
                element,
                config,
                id: WidgetId::new(),
                state: Mutex::new(AlertState::default()),
            }),
        };
        ctx.registry().register(element, &alert);
        alert.init();
        Ok(alert)
    }

    fn state(&self) -> MutexGuard<'_, AlertState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn init(&self) {
        let doc = self.inner.ctx.document();
        doc.add_class(self.inner.element, CLASS_ALERT);

        if self.inner.config.dismissible {
            self.setup_dismiss_button();
        }

        if !self.inner.config.duration.is_zero() {
            let this = self.clone();
            let timer = self
                .inner
                .ctx
                .animator()
                .after(self.inner.config.duration, move || this.close());
            self.state().auto_close = Some(timer);
        }
    }

    fn setup_dismiss_button(&self) {
        let doc = self.inner.ctx.document();
        let button = doc.create_element("button");
        doc.add_class(button, CLASS_CLOSE);
        doc.set_attribute(button, "type", "button");
        doc.set_attribute(button, "aria-label", "Close");
        doc.set_text(button, "\u{d7}");
        doc.append_child(self.inner.element, button);

        let this = self.clone();
        let handler = self
            .inner
            .ctx
            .events()
            .on(button, "click", move |_| this.close());

        let mut state = self.state();
        state.close_button = Some(button);
        state.handlers.push(handler);
    }

    /// Fade out, detach from the document, and fire `on_close` once
    ///
    /// Idempotent: repeat calls while closing (or after) are no-ops. The
    /// `cl.alert.close` event fires first and may prevent the close.
    pub fn close(&self) {
        {
            let mut state = self.state();
            if state.closing || state.closed {
                return;
            }
            state.closing = true;
            if let Some(timer) = state.auto_close.take() {
                timer.cancel();
            }
        }

        let outcome = self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_CLOSE),
        );
        if outcome.default_prevented {
            self.state().closing = false;
            return;
        }

        let fade = self
            .inner
            .ctx
            .animator()
            .fade_out(self.inner.element, DEFAULT_FADE_DURATION);
        let this = self.clone();
        fade.on_complete(move || this.finish_close());
        self.state().fade = Some(fade);
    }

    fn finish_close(&self) {
        {
            let mut state = self.state();
            if state.closed {
                return;
            }
            state.closed = true;
            state.closing = false;
        }

        self.inner.ctx.document().remove(self.inner.element);
        if let Some(on_close) = &self.inner.config.on_close {
            on_close();
        }
        self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_CLOSED).with_cancelable(false),
        );
    }

    pub fn is_closed(&self) -> bool {
        self.state().closed
    }
}

impl Widget for Alert {
    fn name(&self) -> &'static str {
        "alert"
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
            if let Some(timer) = state.auto_close.take() {
                timer.cancel();
            }
            (std::mem::take(&mut state.handlers), state.close_button.take())
        };

        for handler in handlers {
            self.inner.ctx.events().off(handler);
        }
        if let Some(button) = close_button {
            doc.remove(button);
        }
        doc.remove_class(self.inner.element, CLASS_ALERT);
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
    use crate::events::CustomEvent;

    fn alert_element(ctx: &Context) -> ElementId {
        let el = ctx.document().create_element("div");
        ctx.document().append_child(ctx.document().body(), el);
        el
    }

    #[test]
    fn construction_adds_marker_class_and_close_button() {
        let ctx = Context::new_manual();
        let el = alert_element(&ctx);

        let _alert = Alert::new(&ctx, el, AlertConfig::default()).expect("alert");

        assert!(ctx.document().has_class(el, "cl-alert"));
        assert_eq!(
            ctx.document().query_selector_all(el, ".cl-alert-close").len(),
            1
        );
    }

    #[test]
    fn non_dismissible_alert_has_no_close_button() {
        let ctx = Context::new_manual();
        let el = alert_element(&ctx);

        let _alert = Alert::new(
            &ctx,
            el,
            AlertConfig {
                dismissible: false,
                ..AlertConfig::default()
            },
        )
        .expect("alert");

        assert!(ctx.document().query_selector(el, ".cl-alert-close").is_none());
    }

    #[test]
    fn clicking_close_removes_the_element_and_fires_on_close_once() {
        let ctx = Context::new_manual();
        let el = alert_element(&ctx);
        let closed = Arc::new(AtomicUsize::new(0));

        let closed_count = closed.clone();
        let _alert = Alert::new(
            &ctx,
            el,
            AlertConfig {
                on_close: crate::kit::callback(move || {
                    closed_count.fetch_add(1, Ordering::SeqCst);
                }),
                ..AlertConfig::default()
            },
        )
        .expect("alert");

        let button = ctx
            .document()
            .query_selector(el, ".cl-alert-close")
            .expect("close button");
        ctx.events()
            .trigger(ctx.document(), button, CustomEvent::new("click"));

        // Fade still in flight: element attached, callback not yet fired.
        assert!(ctx.document().is_attached(el));
        assert_eq!(closed.load(Ordering::SeqCst), 0);

        ctx.animator().settle();
        assert!(!ctx.document().is_attached(el));
        assert_eq!(closed.load(Ordering::SeqCst), 1);

        // A second click after close is a no-op.
        ctx.events()
            .trigger(ctx.document(), button, CustomEvent::new("click"));
        ctx.animator().settle();
        assert_eq!(closed.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn auto_close_after_duration() {
        let ctx = Context::new_manual();
        let el = alert_element(&ctx);

        let alert = Alert::new(
            &ctx,
            el,
            AlertConfig {
                duration: Duration::from_millis(1000),
                ..AlertConfig::default()
            },
        )
        .expect("alert");

        ctx.animator().advance(Duration::from_millis(999));
        assert!(!alert.is_closed());

        ctx.animator().advance(Duration::from_millis(1));
        ctx.animator().settle();
        assert!(alert.is_closed());
        assert!(!ctx.document().is_attached(el));
    }

    #[test]
    fn preventing_the_close_event_aborts_the_close() {
        let ctx = Context::new_manual();
        let el = alert_element(&ctx);

        let alert = Alert::new(&ctx, el, AlertConfig::default()).expect("alert");
        ctx.events().on(el, "cl.alert.close", |scope| {
            scope.prevent_default();
        });

        alert.close();
        ctx.animator().settle();
        assert!(!alert.is_closed());
        assert!(ctx.document().is_attached(el));
    }

    #[test]
    fn destroy_reverts_dom_and_unregisters() {
        let ctx = Context::new_manual();
        let el = alert_element(&ctx);
        let before = ctx.events().len();

        let alert = Alert::new(&ctx, el, AlertConfig::default()).expect("alert");
        assert!(ctx.registry().get(el).is_some());

        alert.destroy();
        assert_eq!(ctx.events().len(), before);
        assert!(!ctx.document().has_class(el, "cl-alert"));
        assert!(ctx.document().query_selector(el, ".cl-alert-close").is_none());
        assert!(ctx.registry().get(el).is_none());
    }
}
