// Navbar component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};

use serde::{Deserialize, Serialize};

use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::HandlerId;

const SELECTOR_TOGGLE: &str = "[data-cl-toggle=\"navbar\"]";
const SELECTOR_COLLAPSE: &str = ".cl-navbar-collapse";
const SELECTOR_DROPDOWN_TOGGLE: &str = "[data-cl-toggle=\"dropdown\"]";
const SELECTOR_DROPDOWN: &str = ".cl-dropdown";
const SELECTOR_DROPDOWN_MENU: &str = ".cl-dropdown-menu";

const CLASS_NAVBAR: &str = "cl-navbar";
const CLASS_SHOW: &str = "cl-show";
const CLASS_STICKY: &str = "cl-navbar-sticky";
const CLASS_FIXED_TOP: &str = "cl-navbar-fixed-top";
const CLASS_FIXED_BOTTOM: &str = "cl-navbar-fixed-bottom";

/// Edge a fixed navbar pins to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FixedEdge {
    Top,
    Bottom,
}

/// Navbar configuration
#[derive(Debug, Clone, Default)]
pub struct NavbarConfig {
    pub sticky: bool,
    pub fixed: Option<FixedEdge>,
    pub missing_element: MissingElementPolicy,
}

#[derive(Default)]
struct NavbarState {
    handlers: Vec<HandlerId>,
}

struct NavbarInner {
    ctx: Context,
    element: ElementId,
    id: WidgetId,
    state: Mutex<NavbarState>,
}

/// Navigation bar with a collapsible section and nested dropdown menus
///
/// All interaction is delegated from the navbar root, so menu items added
/// after construction participate without re-wiring.
#[derive(Clone)]
pub struct Navbar {
    inner: Arc<NavbarInner>,
}

impl Navbar {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: NavbarConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;
        let navbar = Self {
            inner: Arc::new(NavbarInner {
                ctx: ctx.clone(),
                element,
                id: WidgetId::new(),
                state: Mutex::new(NavbarState::default()),
            }),
        };
        ctx.registry().register(element, &navbar);
        navbar.init(&config);
        Ok(navbar)
    }

    fn state(&self) -> MutexGuard<'_, NavbarState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn init(&self, config: &NavbarConfig) {
        let doc = self.inner.ctx.document();
        doc.add_class(self.inner.element, CLASS_NAVBAR);

        if config.sticky {
            doc.add_class(self.inner.element, CLASS_STICKY);
        } else {
            match config.fixed {
                Some(FixedEdge::Top) => doc.add_class(self.inner.element, CLASS_FIXED_TOP),
                Some(FixedEdge::Bottom) => doc.add_class(self.inner.element, CLASS_FIXED_BOTTOM),
                None => {}
            }
        }

        let events = self.inner.ctx.events();
        let mut handlers = Vec::new();

        let this = self.clone();
        handlers.push(events.on_delegated(
            self.inner.element,
            "click",
            SELECTOR_TOGGLE,
            move |scope| {
                scope.prevent_default();
                this.toggle_collapse();
            },
        ));

        let this = self.clone();
        handlers.push(events.on_delegated(
            self.inner.element,
            "click",
            SELECTOR_DROPDOWN_TOGGLE,
            move |scope| {
                scope.prevent_default();
                this.toggle_dropdown(scope.current_target);
            },
        ));

        self.state().handlers = handlers;
    }

    fn collapse_section(&self) -> Option<ElementId> {
        self.inner
            .ctx
            .document()
            .query_selector(self.inner.element, SELECTOR_COLLAPSE)
    }

    pub fn toggle_collapse(&self) {
        let Some(collapse) = self.collapse_section() else {
            return;
        };
        let doc = self.inner.ctx.document();
        doc.toggle_class(collapse, CLASS_SHOW, None);
    }

    pub fn is_collapse_shown(&self) -> bool {
        self.collapse_section()
            .map(|collapse| self.inner.ctx.document().has_class(collapse, CLASS_SHOW))
            .unwrap_or(false)
    }

    /// Open the dropdown owning `toggle`, closing any other open one
    fn toggle_dropdown(&self, toggle: ElementId) {
        let doc = self.inner.ctx.document();
        let Some(dropdown) =
            doc.closest(toggle, SELECTOR_DROPDOWN, Some(self.inner.element))
        else {
            return;
        };
        let Some(menu) = doc.query_selector(dropdown, SELECTOR_DROPDOWN_MENU) else {
            return;
        };

        let opening = !doc.has_class(menu, CLASS_SHOW);

        // One open menu at a time within the navbar.
        for other in doc.query_selector_all(self.inner.element, SELECTOR_DROPDOWN_MENU) {
            doc.remove_class(other, CLASS_SHOW);
        }
        if opening {
            doc.add_class(menu, CLASS_SHOW);
        }
    }
}

impl Widget for Navbar {
    fn name(&self) -> &'static str {
        "navbar"
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
        for class in [CLASS_NAVBAR, CLASS_STICKY, CLASS_FIXED_TOP, CLASS_FIXED_BOTTOM] {
            doc.remove_class(self.inner.element, class);
        }
        self.inner.ctx.registry().unregister(self.inner.element, self.inner.id);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
