// Modal component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::animation::{FadeHandle, DEFAULT_FADE_DURATION};
use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::{CustomEvent, HandlerId};
use crate::kit::{run_hook, TransitionHooks, Visibility};

const SELECTOR_DISMISS: &str = "[data-cl-dismiss=\"modal\"]";
const SELECTOR_FOCUSABLE: &str = "input, button, [tabindex]";

const CLASS_MODAL: &str = "cl-modal";
const CLASS_BACKDROP: &str = "cl-modal-backdrop";
const CLASS_OPEN: &str = "cl-modal-open";

const EVENT_SHOW: &str = "cl.modal.show";
const EVENT_SHOWN: &str = "cl.modal.shown";
const EVENT_HIDE: &str = "cl.modal.hide";
const EVENT_HIDDEN: &str = "cl.modal.hidden";

/// Backdrop behavior behind the dialog
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Backdrop {
    /// No backdrop element
    None,
    /// Backdrop shown; clicking it hides the modal
    #[default]
    Dismiss,
    /// Backdrop shown; clicks on it are ignored
    Static,
}

/// Modal configuration
#[derive(Clone)]
pub struct ModalConfig {
    pub backdrop: Backdrop,
    /// Hide on Escape
    pub keyboard: bool,
    /// Move focus to the first focusable descendant once shown
    pub focus: bool,
    pub hooks: TransitionHooks,
    pub missing_element: MissingElementPolicy,
}

impl Default for ModalConfig {
    fn default() -> Self {
        Self {
            backdrop: Backdrop::Dismiss,
            keyboard: true,
            focus: true,
            hooks: TransitionHooks::default(),
            missing_element: MissingElementPolicy::default(),
        }
    }
}

#[derive(Default)]
struct ModalState {
    visibility: Visibility,
    handlers: Vec<HandlerId>,
    fade: Option<FadeHandle>,
    backdrop_fade: Option<FadeHandle>,
}

struct ModalInner {
    ctx: Context,
    element: ElementId,
    backdrop: Option<ElementId>,
    config: ModalConfig,
    id: WidgetId,
    state: Mutex<ModalState>,
}

/// Dialog overlay with backdrop, Escape handling, and focus hand-off
///
/// Showing fades the backdrop in before the dialog and marks the body with
/// `cl-modal-open`; hiding mirrors in reverse order.
#[derive(Clone)]
pub struct Modal {
    inner: Arc<ModalInner>,
}

impl Modal {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: ModalConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;

        let backdrop = if config.backdrop != Backdrop::None {
            let doc = ctx.document();
            let backdrop = doc.create_element("div");
            doc.add_class(backdrop, CLASS_BACKDROP);
            doc.set_style(backdrop, "display", "none");
            doc.append_child(doc.body(), backdrop);
            Some(backdrop)
        } else {
            None
        };

        let modal = Self {
            inner: Arc::new(ModalInner {
                ctx: ctx.clone(),
                element,
                backdrop,
                config,
                id: WidgetId::new(),
                state: Mutex::new(ModalState::default()),
            }),
        };
        ctx.registry().register(element, &modal);
        modal.init();
        Ok(modal)
    }

    fn state(&self) -> MutexGuard<'_, ModalState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn init(&self) {
        let doc = self.inner.ctx.document();
        doc.add_class(self.inner.element, CLASS_MODAL);
        doc.set_attribute(self.inner.element, "role", "dialog");
        doc.set_attribute(self.inner.element, "aria-modal", "true");
        doc.set_style(self.inner.element, "display", "none");

        let events = self.inner.ctx.events();
        let mut handlers = Vec::new();

        let this = self.clone();
        handlers.push(events.on_delegated(
            self.inner.element,
            "click",
            SELECTOR_DISMISS,
            move |_| this.hide(),
        ));

        if let Some(backdrop) = self.inner.backdrop {
            if self.inner.config.backdrop == Backdrop::Dismiss {
                let this = self.clone();
                handlers.push(events.on(backdrop, "click", move |_| this.hide()));
            }
        }

        if self.inner.config.keyboard {
            let this = self.clone();
            handlers.push(events.on(doc.body(), "keydown", move |scope| {
                if scope.key() == Some("Escape") && this.state().visibility.is_opening_or_open() {
                    this.hide();
                }
            }));
        }

        self.state().handlers = handlers;
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
        doc.add_class(doc.body(), CLASS_OPEN);

        {
            let mut state = self.state();
            state.visibility = Visibility::Showing;
            if let Some(old) = state.fade.take() {
                old.cancel();
            }
            if let Some(old) = state.backdrop_fade.take() {
                old.cancel();
            }
        }

        // Backdrop first, then the dialog on its completion.
        let this = self.clone();
        let open_dialog = move || {
            let fade = this
                .inner
                .ctx
                .animator()
                .fade_in(this.inner.element, DEFAULT_FADE_DURATION, "block");
            let done = this.clone();
            fade.on_complete(move || {
                let doc = done.inner.ctx.document();
                if done.inner.config.focus {
                    if let Some(first) =
                        doc.query_selector(done.inner.element, SELECTOR_FOCUSABLE)
                    {
                        doc.focus(first);
                    }
                }
                done.state().visibility = Visibility::Shown;
                run_hook(&done.inner.config.hooks.on_shown);
                done.inner.ctx.events().trigger(
                    done.inner.ctx.document(),
                    done.inner.element,
                    CustomEvent::new(EVENT_SHOWN).with_cancelable(false),
                );
            });
            this.state().fade = Some(fade);
        };

        match self.inner.backdrop {
            Some(backdrop) => {
                let fade = self
                    .inner
                    .ctx
                    .animator()
                    .fade_in(backdrop, DEFAULT_FADE_DURATION, "block");
                fade.on_complete(open_dialog);
                self.state().backdrop_fade = Some(fade);
            }
            None => open_dialog(),
        }
    }

    pub fn hide(&self) {
        {
            let state = self.state();
            if !state.visibility.is_opening_or_open() {
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

        {
            let mut state = self.state();
            state.visibility = Visibility::Hiding;
            if let Some(old) = state.fade.take() {
                old.cancel();
            }
            if let Some(old) = state.backdrop_fade.take() {
                old.cancel();
            }
        }

        let this = self.clone();
        let finish = move || {
            let doc = this.inner.ctx.document();
            doc.remove_class(doc.body(), CLASS_OPEN);
            this.state().visibility = Visibility::Hidden;
            run_hook(&this.inner.config.hooks.on_hidden);
            this.inner.ctx.events().trigger(
                this.inner.ctx.document(),
                this.inner.element,
                CustomEvent::new(EVENT_HIDDEN).with_cancelable(false),
            );
        };

        let fade = self
            .inner
            .ctx
            .animator()
            .fade_out(self.inner.element, DEFAULT_FADE_DURATION);
        match self.inner.backdrop {
            Some(backdrop) => {
                let animator = self.inner.ctx.animator().clone();
                let this = self.clone();
                fade.on_complete(move || {
                    let backdrop_fade = animator.fade_out(backdrop, DEFAULT_FADE_DURATION);
                    backdrop_fade.on_complete(finish);
                    this.state().backdrop_fade = Some(backdrop_fade);
                });
            }
            None => fade.on_complete(finish),
        }
        self.state().fade = Some(fade);
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

impl Widget for Modal {
    fn name(&self) -> &'static str {
        "modal"
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
            if let Some(fade) = state.backdrop_fade.take() {
                fade.cancel();
            }
            std::mem::take(&mut state.handlers)
        };

        for handler in handlers {
            self.inner.ctx.events().off(handler);
        }
        if let Some(backdrop) = self.inner.backdrop {
            doc.remove(backdrop);
        }
        doc.remove_class(doc.body(), CLASS_OPEN);
        doc.remove_class(self.inner.element, CLASS_MODAL);
        doc.remove_attribute(self.inner.element, "role");
        doc.remove_attribute(self.inner.element, "aria-modal");
        doc.remove_style(self.inner.element, "display");
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

    fn modal_element(ctx: &Context) -> ElementId {
        let el = ctx.document().create_element("div");
        ctx.document().append_child(ctx.document().body(), el);
        el
    }

    #[test]
    fn construction_sets_dialog_role_and_creates_backdrop() {
        let ctx = Context::new_manual();
        let el = modal_element(&ctx);
        let _modal = Modal::new(&ctx, el, ModalConfig::default()).expect("modal");

        assert_eq!(
            ctx.document().get_attribute(el, "role").as_deref(),
            Some("dialog")
        );
        assert_eq!(
            ctx.document()
                .query_selector_all(ctx.document().body(), ".cl-modal-backdrop")
                .len(),
            1
        );
    }

    #[test]
    fn show_marks_body_and_settles_shown_in_order() {
        let ctx = Context::new_manual();
        let el = modal_element(&ctx);
        let order = Arc::new(Mutex::new(Vec::new()));

        let log_show = order.clone();
        let log_shown = order.clone();
        let modal = Modal::new(
            &ctx,
            el,
            ModalConfig {
                hooks: TransitionHooks {
                    on_show: crate::kit::callback(move || log_show.lock().unwrap().push("show")),
                    on_shown: crate::kit::callback(move || log_shown.lock().unwrap().push("shown")),
                    ..TransitionHooks::default()
                },
                ..ModalConfig::default()
            },
        )
        .expect("modal");

        modal.show();
        assert!(ctx.document().has_class(ctx.document().body(), "cl-modal-open"));
        assert_eq!(order.lock().unwrap().as_slice(), ["show"]);

        ctx.animator().settle();
        assert!(modal.is_shown());
        assert_eq!(order.lock().unwrap().as_slice(), ["show", "shown"]);
        assert_eq!(ctx.document().opacity(el), 1.0);
    }

    #[test]
    fn hide_before_show_is_a_noop() {
        let ctx = Context::new_manual();
        let el = modal_element(&ctx);
        let modal = Modal::new(&ctx, el, ModalConfig::default()).expect("modal");

        modal.hide();
        ctx.animator().settle();
        assert_eq!(modal.visibility(), Visibility::Hidden);
    }

    #[test]
    fn escape_hides_when_keyboard_is_enabled() {
        let ctx = Context::new_manual();
        let el = modal_element(&ctx);
        let modal = Modal::new(&ctx, el, ModalConfig::default()).expect("modal");

        modal.show();
        ctx.animator().settle();
        assert!(modal.is_shown());

        ctx.events().trigger(
            ctx.document(),
            ctx.document().body(),
            CustomEvent::keyboard("keydown", "Escape"),
        );
        ctx.animator().settle();
        assert!(!modal.is_shown());
        assert!(!ctx.document().has_class(ctx.document().body(), "cl-modal-open"));
    }

    #[test]
    fn static_backdrop_ignores_backdrop_clicks() {
        let ctx = Context::new_manual();
        let el = modal_element(&ctx);
        let modal = Modal::new(
            &ctx,
            el,
            ModalConfig {
                backdrop: Backdrop::Static,
                ..ModalConfig::default()
            },
        )
        .expect("modal");

        modal.show();
        ctx.animator().settle();

        let backdrop = ctx
            .document()
            .query_selector(ctx.document().body(), ".cl-modal-backdrop")
            .expect("backdrop");
        ctx.events().trigger(ctx.document(), backdrop, CustomEvent::new("click"));
        ctx.animator().settle();
        assert!(modal.is_shown());
    }

    #[test]
    fn dismiss_button_hides_via_delegation() {
        let ctx = Context::new_manual();
        let el = modal_element(&ctx);
        let close = ctx.document().create_element("button");
        ctx.document().set_attribute(close, "data-cl-dismiss", "modal");
        ctx.document().append_child(el, close);

        let hidden = Arc::new(AtomicUsize::new(0));
        let hidden_count = hidden.clone();
        let modal = Modal::new(
            &ctx,
            el,
            ModalConfig {
                hooks: TransitionHooks {
                    on_hidden: crate::kit::callback(move || {
                        hidden_count.fetch_add(1, Ordering::SeqCst);
                    }),
                    ..TransitionHooks::default()
                },
                ..ModalConfig::default()
            },
        )
        .expect("modal");

        modal.show();
        ctx.animator().settle();

        ctx.events().trigger(ctx.document(), close, CustomEvent::new("click"));
        ctx.animator().settle();
        assert!(!modal.is_shown());
        assert_eq!(hidden.load(Ordering::SeqCst), 1);
        assert_eq!(ctx.document().style(el, "display").as_deref(), Some("none"));
    }

    #[test]
    fn double_show_settles_into_one_shown_state() {
        let ctx = Context::new_manual();
        let el = modal_element(&ctx);
        let shown = Arc::new(AtomicUsize::new(0));

        let shown_count = shown.clone();
        let modal = Modal::new(
            &ctx,
            el,
            ModalConfig {
                hooks: TransitionHooks {
                    on_shown: crate::kit::callback(move || {
                        shown_count.fetch_add(1, Ordering::SeqCst);
                    }),
                    ..TransitionHooks::default()
                },
                ..ModalConfig::default()
            },
        )
        .expect("modal");

        modal.show();
        modal.show();
        ctx.animator().settle();
        assert!(modal.is_shown());
        assert_eq!(shown.load(Ordering::SeqCst), 1);
    }
}
