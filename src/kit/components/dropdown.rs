// Dropdown component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::animation::{FadeHandle, DEFAULT_FADE_DURATION};
use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::{CustomEvent, HandlerId};
use crate::kit::{run_hook, Callback, Visibility};

const SELECTOR_TOGGLE: &str = "[data-cl-toggle=\"dropdown\"]";
const SELECTOR_MENU: &str = ".cl-dropdown-menu";
const SELECTOR_MENU_ITEM: &str = "a, button";

const CLASS_DROPDOWN: &str = "cl-dropdown";
const CLASS_TOGGLE: &str = "cl-dropdown-toggle";

const EVENT_SHOW: &str = "cl.dropdown.show";
const EVENT_SHOWN: &str = "cl.dropdown.shown";
const EVENT_HIDE: &str = "cl.dropdown.hide";
const EVENT_HIDDEN: &str = "cl.dropdown.hidden";

/// Which side of the trigger the menu opens on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Placement {
    Top,
    #[default]
    Bottom,
    Left,
    Right,
}

/// Dropdown configuration
#[derive(Clone)]
pub struct DropdownConfig {
    pub placement: Placement,
    /// Gap between trigger and menu, in pixels
    pub offset: u32,
    /// Open on hover instead of click
    pub hover: bool,
    /// Close when a menu item (`a`/`button`) is clicked
    pub close_on_click: bool,
    pub on_show: Option<Callback>,
    pub on_hide: Option<Callback>,
    pub missing_element: MissingElementPolicy,
}

impl Default for DropdownConfig {
    fn default() -> Self {
        Self {
            placement: Placement::Bottom,
            offset: 5,
            hover: false,
            close_on_click: true,
            on_show: None,
            on_hide: None,
            missing_element: MissingElementPolicy::default(),
        }
    }
}

#[derive(Default)]
struct DropdownState {
    visibility: Visibility,
    handlers: Vec<HandlerId>,
    outside_click: Option<HandlerId>,
    fade: Option<FadeHandle>,
}

struct DropdownInner {
    ctx: Context,
    element: ElementId,
    /// `None` when construction found no trigger/menu pair; the instance is
    /// inert in that case
    parts: Option<(ElementId, ElementId)>,
    config: DropdownConfig,
    id: WidgetId,
    state: Mutex<DropdownState>,
}

/// Toggleable menu anchored to a trigger
///
/// Requires a `[data-cl-toggle="dropdown"]` trigger and a
/// `.cl-dropdown-menu` inside the root element; constructing without either
/// logs an error and yields an inert instance rather than failing.
#[derive(Clone)]
pub struct Dropdown {
    inner: Arc<DropdownInner>,
}

impl Dropdown {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: DropdownConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;

        let doc = ctx.document();
        let trigger = doc.query_selector(element, SELECTOR_TOGGLE);
        let menu = doc.query_selector(element, SELECTOR_MENU);
        let parts = match (trigger, menu) {
            (Some(trigger), Some(menu)) => Some((trigger, menu)),
            _ => {
                log::error!("dropdown on {element} requires a trigger and menu element");
                None
            }
        };

        let dropdown = Self {
            inner: Arc::new(DropdownInner {
                ctx: ctx.clone(),
                element,
                parts,
                config,
                id: WidgetId::new(),
                state: Mutex::new(DropdownState::default()),
            }),
        };
        ctx.registry().register(element, &dropdown);
        dropdown.init();
        Ok(dropdown)
    }

    fn state(&self) -> MutexGuard<'_, DropdownState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn init(&self) {
        let doc = self.inner.ctx.document();
        doc.add_class(self.inner.element, CLASS_DROPDOWN);

        let Some((trigger, menu)) = self.inner.parts else {
            return;
        };

        doc.add_class(trigger, CLASS_TOGGLE);
        doc.set_attribute(trigger, "aria-haspopup", "true");
        doc.set_attribute(trigger, "aria-expanded", "false");
        doc.set_attribute(menu, "aria-hidden", "true");
        doc.set_style(menu, "display", "none");
        self.position_menu(menu);

        let events = self.inner.ctx.events();
        let mut handlers = Vec::new();

        if self.inner.config.hover {
            let this = self.clone();
            handlers.push(events.on(self.inner.element, "mouseenter", move |_| this.show()));
            let this = self.clone();
            handlers.push(events.on(self.inner.element, "mouseleave", move |_| this.hide()));
        } else {
            let this = self.clone();
            handlers.push(events.on(trigger, "click", move |scope| {
                scope.prevent_default();
                this.toggle();
            }));
        }

        if self.inner.config.close_on_click {
            let this = self.clone();
            handlers.push(events.on_delegated(menu, "click", SELECTOR_MENU_ITEM, move |_| {
                this.hide();
            }));
        }

        self.state().handlers = handlers;
    }

    fn position_menu(&self, menu: ElementId) {
        let doc = self.inner.ctx.document();
        let offset = format!("{}px", self.inner.config.offset);
        match self.inner.config.placement {
            Placement::Top => {
                doc.set_style(menu, "bottom", "100%");
                doc.set_style(menu, "left", "0");
                doc.set_style(menu, "margin-bottom", &offset);
            }
            Placement::Right => {
                doc.set_style(menu, "top", "0");
                doc.set_style(menu, "left", "100%");
                doc.set_style(menu, "margin-left", &offset);
            }
            Placement::Left => {
                doc.set_style(menu, "top", "0");
                doc.set_style(menu, "right", "100%");
                doc.set_style(menu, "margin-right", &offset);
            }
            Placement::Bottom => {
                doc.set_style(menu, "top", "100%");
                doc.set_style(menu, "left", "0");
                doc.set_style(menu, "margin-top", &offset);
            }
        }
    }

    pub fn show(&self) {
        let Some((trigger, menu)) = self.inner.parts else {
            return;
        };
        {
            let state = self.state();
            if state.visibility.is_opening_or_open() {
                return;
            }
        }

        run_hook(&self.inner.config.on_show);
        let outcome = self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_SHOW),
        );
        if outcome.default_prevented {
            return;
        }

        let doc = self.inner.ctx.document();
        doc.set_attribute(trigger, "aria-expanded", "true");
        doc.set_attribute(menu, "aria-hidden", "false");

        // Clicks that land outside the dropdown close it while open.
        let this = self.clone();
        let outside = self.inner.ctx.events().on(doc.body(), "click", move |scope| {
            let doc = this.inner.ctx.document();
            if !doc.contains(this.inner.element, scope.target) {
                this.hide();
            }
        });

        let fade = {
            let mut state = self.state();
            state.visibility = Visibility::Showing;
            if let Some(old) = state.fade.take() {
                old.cancel();
            }
            if let Some(old) = state.outside_click.replace(outside) {
                self.inner.ctx.events().off(old);
            }
            let fade = self
                .inner
                .ctx
                .animator()
                .fade_in(menu, DEFAULT_FADE_DURATION, "block");
            state.fade = Some(fade.clone());
            fade
        };

        let this = self.clone();
        fade.on_complete(move || {
            this.state().visibility = Visibility::Shown;
            this.inner.ctx.events().trigger(
                this.inner.ctx.document(),
                this.inner.element,
                CustomEvent::new(EVENT_SHOWN).with_cancelable(false),
            );
        });
    }

    pub fn hide(&self) {
        let Some((trigger, menu)) = self.inner.parts else {
            return;
        };
        {
            let state = self.state();
            if !state.visibility.is_opening_or_open() {
                return;
            }
        }

        run_hook(&self.inner.config.on_hide);
        let outcome = self.inner.ctx.events().trigger(
            self.inner.ctx.document(),
            self.inner.element,
            CustomEvent::new(EVENT_HIDE),
        );
        if outcome.default_prevented {
            return;
        }

        let doc = self.inner.ctx.document();
        doc.set_attribute(trigger, "aria-expanded", "false");
        doc.set_attribute(menu, "aria-hidden", "true");

        let fade = {
            let mut state = self.state();
            state.visibility = Visibility::Hiding;
            if let Some(old) = state.fade.take() {
                old.cancel();
            }
            if let Some(outside) = state.outside_click.take() {
                self.inner.ctx.events().off(outside);
            }
            let fade = self.inner.ctx.animator().fade_out(menu, DEFAULT_FADE_DURATION);
            state.fade = Some(fade.clone());
            fade
        };

        let this = self.clone();
        fade.on_complete(move || {
            this.state().visibility = Visibility::Hidden;
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

    pub fn visibility(&self) -> Visibility {
        self.state().visibility
    }
}

impl Widget for Dropdown {
    fn name(&self) -> &'static str {
        "dropdown"
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
            let mut handlers = std::mem::take(&mut state.handlers);
            handlers.extend(state.outside_click.take());
            handlers
        };

        for handler in handlers {
            self.inner.ctx.events().off(handler);
        }
        if let Some((trigger, menu)) = self.inner.parts {
            doc.remove_class(trigger, CLASS_TOGGLE);
            doc.remove_attribute(trigger, "aria-haspopup");
            doc.remove_attribute(trigger, "aria-expanded");
            doc.remove_attribute(menu, "aria-hidden");
            doc.remove_style(menu, "display");
        }
        doc.remove_class(self.inner.element, CLASS_DROPDOWN);
        self.inner.ctx.registry().unregister(self.inner.element, self.inner.id);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::CustomEvent;

    fn dropdown_markup(ctx: &Context) -> (ElementId, ElementId, ElementId, ElementId) {
        let doc = ctx.document();
        let root = doc.create_element("div");
        doc.append_child(doc.body(), root);

        let trigger = doc.create_element("button");
        doc.set_attribute(trigger, "data-cl-toggle", "dropdown");
        doc.append_child(root, trigger);

        let menu = doc.create_element("div");
        doc.add_class(menu, "cl-dropdown-menu");
        doc.append_child(root, menu);

        let item = doc.create_element("a");
        doc.append_child(menu, item);

        (root, trigger, menu, item)
    }

    #[test]
    fn trigger_click_opens_and_sets_aria() {
        let ctx = Context::new_manual();
        let (root, trigger, menu, _) = dropdown_markup(&ctx);
        let dropdown = Dropdown::new(&ctx, root, DropdownConfig::default()).expect("dropdown");

        ctx.events().trigger(ctx.document(), trigger, CustomEvent::new("click"));
        assert_eq!(
            ctx.document().get_attribute(trigger, "aria-expanded").as_deref(),
            Some("true")
        );
        assert_eq!(
            ctx.document().get_attribute(menu, "aria-hidden").as_deref(),
            Some("false")
        );

        ctx.animator().settle();
        assert!(dropdown.is_shown());
        assert_eq!(ctx.document().opacity(menu), 1.0);
    }

    #[test]
    fn outside_click_closes_an_open_dropdown() {
        let ctx = Context::new_manual();
        let (root, trigger, _, _) = dropdown_markup(&ctx);
        let outside = ctx.document().create_element("div");
        ctx.document().append_child(ctx.document().body(), outside);

        let dropdown = Dropdown::new(&ctx, root, DropdownConfig::default()).expect("dropdown");
        ctx.events().trigger(ctx.document(), trigger, CustomEvent::new("click"));
        ctx.animator().settle();
        assert!(dropdown.is_shown());

        ctx.events().trigger(ctx.document(), outside, CustomEvent::new("click"));
        ctx.animator().settle();
        assert!(!dropdown.is_shown());
    }

    #[test]
    fn menu_item_click_closes_when_configured() {
        let ctx = Context::new_manual();
        let (root, _, _, item) = dropdown_markup(&ctx);
        let dropdown = Dropdown::new(&ctx, root, DropdownConfig::default()).expect("dropdown");

        dropdown.show();
        ctx.animator().settle();
        assert!(dropdown.is_shown());

        ctx.events().trigger(ctx.document(), item, CustomEvent::new("click"));
        ctx.animator().settle();
        assert!(!dropdown.is_shown());
    }

    #[test]
    fn missing_menu_constructs_inert() {
        let ctx = Context::new_manual();
        let bare = ctx.document().create_element("div");
        ctx.document().append_child(ctx.document().body(), bare);

        let dropdown = Dropdown::new(&ctx, bare, DropdownConfig::default()).expect("dropdown");
        dropdown.show();
        ctx.animator().settle();
        assert!(!dropdown.is_shown());
    }

    #[test]
    fn reopening_mid_hide_cancels_the_stale_fade() {
        let ctx = Context::new_manual();
        let (root, _, menu, _) = dropdown_markup(&ctx);
        let dropdown = Dropdown::new(&ctx, root, DropdownConfig::default()).expect("dropdown");

        dropdown.show();
        ctx.animator().settle();

        dropdown.hide();
        ctx.animator().advance(std::time::Duration::from_millis(150));
        dropdown.show(); // cancels the half-done fade-out

        ctx.animator().settle();
        assert!(dropdown.is_shown());
        assert_eq!(ctx.document().opacity(menu), 1.0);
        assert_eq!(ctx.document().style(menu, "display").as_deref(), Some("block"));
    }
}
