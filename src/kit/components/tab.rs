// Tab component for LaceKit

use std::any::Any;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::component::{
    resolve_element, ComponentError, Context, ElementRef, MissingElementPolicy, Widget, WidgetId,
};
use crate::dom::ElementId;
use crate::events::{CustomEvent, HandlerId};

const SELECTOR_TRIGGER: &str = "[data-cl-toggle=\"tab\"]";
const SELECTOR_TAB_LIST: &str = ".cl-tabs-list";

const CLASS_TABS: &str = "cl-tabs";
const CLASS_ACTIVE: &str = "cl-active";

const EVENT_SHOWN: &str = "cl.tab.shown";
const EVENT_HIDDEN: &str = "cl.tab.hidden";

/// Callback receiving the affected tab id
pub type TabHook = Arc<dyn Fn(&str) + Send + Sync>;

/// Tab configuration
#[derive(Clone)]
pub struct TabConfig {
    /// Tab id to activate at construction; first discovered tab otherwise
    pub active_tab: Option<String>,
    /// Arrow-key navigation between triggers
    pub keyboard: bool,
    pub on_show: Option<TabHook>,
    pub on_shown: Option<TabHook>,
    pub on_hide: Option<TabHook>,
    pub on_hidden: Option<TabHook>,
    pub missing_element: MissingElementPolicy,
}

impl Default for TabConfig {
    fn default() -> Self {
        Self {
            active_tab: None,
            keyboard: true,
            on_show: None,
            on_shown: None,
            on_hide: None,
            on_hidden: None,
            missing_element: MissingElementPolicy::default(),
        }
    }
}

#[derive(Clone)]
struct TabItem {
    trigger: ElementId,
    pane: ElementId,
    id: String,
}

#[derive(Default)]
struct TabState {
    tabs: Vec<TabItem>,
    active: Option<usize>,
    handlers: Vec<HandlerId>,
}

struct TabInner {
    ctx: Context,
    element: ElementId,
    config: TabConfig,
    id: WidgetId,
    state: Mutex<TabState>,
}

/// Tabbed panel group
///
/// Triggers (`[data-cl-toggle="tab"]`) and their panes are discovered at
/// construction by fragment reference (`href="#pane"` or
/// `data-cl-target="#pane"`). Exactly one tab is active at a time;
/// activation is synchronous (no transition), with ARIA `role`/`aria-*`
/// bookkeeping on both sides.
#[derive(Clone)]
pub struct Tab {
    inner: Arc<TabInner>,
}

impl Tab {
    pub fn new(
        ctx: &Context,
        target: impl Into<ElementRef>,
        config: TabConfig,
    ) -> Result<Self, ComponentError> {
        let element = resolve_element(ctx, target.into(), config.missing_element)?;
        let tab = Self {
            inner: Arc::new(TabInner {
                ctx: ctx.clone(),
                element,
                config,
                id: WidgetId::new(),
                state: Mutex::new(TabState::default()),
            }),
        };
        ctx.registry().register(element, &tab);
        tab.init();
        Ok(tab)
    }

    fn state(&self) -> MutexGuard<'_, TabState> {
        self.inner.state.lock().unwrap_or_else(|p| p.into_inner())
    }

    fn init(&self) {
        let doc = self.inner.ctx.document();
        doc.add_class(self.inner.element, CLASS_TABS);

        self.discover_tabs();
        if let Some(list) = doc.query_selector(self.inner.element, SELECTOR_TAB_LIST) {
            doc.set_attribute(list, "role", "tablist");
        }

        let initial = {
            let state = self.state();
            match &self.inner.config.active_tab {
                Some(wanted) => state.tabs.iter().find(|tab| &tab.id == wanted).cloned(),
                None => state.tabs.first().cloned(),
            }
        };
        if let Some(initial) = initial {
            self.activate(&initial.id);
        }

        self.bind_events();
    }

    fn discover_tabs(&self) {
        let doc = self.inner.ctx.document();
        let mut tabs = Vec::new();

        for trigger in doc.query_selector_all(self.inner.element, SELECTOR_TRIGGER) {
            let target_id = doc
                .get_attribute(trigger, "href")
                .or_else(|| doc.get_attribute(trigger, "data-cl-target"))
                .and_then(|raw| raw.strip_prefix('#').map(str::to_string));
            let Some(target_id) = target_id else { continue };
            let Some(pane) = doc.get_element_by_id(&target_id) else {
                continue;
            };

            doc.set_attribute(trigger, "role", "tab");
            doc.set_attribute(trigger, "aria-controls", &target_id);
            if doc.get_attribute(trigger, "id").is_none() {
                doc.set_attribute(trigger, "id", &format!("tab-{target_id}"));
            }
            doc.set_attribute(pane, "role", "tabpanel");
            let trigger_id = doc
                .get_attribute(trigger, "id")
                .unwrap_or_else(|| format!("tab-{target_id}"));
            doc.set_attribute(pane, "aria-labelledby", &trigger_id);

            // Every pane starts hidden; activation reveals exactly one.
            doc.set_style(pane, "display", "none");

            tabs.push(TabItem {
                trigger,
                pane,
                id: target_id,
            });
        }

        self.state().tabs = tabs;
    }

    fn bind_events(&self) {
        let events = self.inner.ctx.events();
        let mut handlers = Vec::new();

        let tabs = self.state().tabs.clone();
        for tab in &tabs {
            let this = self.clone();
            let id = tab.id.clone();
            handlers.push(events.on(tab.trigger, "click", move |scope| {
                scope.prevent_default();
                this.activate(&id);
            }));
        }

        if self.inner.config.keyboard {
            let this = self.clone();
            handlers.push(events.on(self.inner.element, "keydown", move |scope| {
                if let Some(key) = scope.key() {
                    this.handle_key(key);
                }
            }));
        }

        self.state().handlers.extend(handlers);
    }

    fn handle_key(&self, key: &str) {
        let (count, current) = {
            let state = self.state();
            (state.tabs.len(), state.active)
        };
        if count == 0 {
            return;
        }
        let Some(current) = current else { return };

        let next = match key {
            "ArrowRight" | "ArrowDown" => Some((current + 1) % count),
            "ArrowLeft" | "ArrowUp" => Some((current + count - 1) % count),
            "Home" => Some(0),
            "End" => Some(count - 1),
            _ => None,
        };

        if let Some(next) = next {
            let id = self.state().tabs[next].id.clone();
            self.activate(&id);
        }
    }

    fn deactivate_current(&self) {
        let doc = self.inner.ctx.document();
        let current = {
            let mut state = self.state();
            state.active.take().map(|index| state.tabs[index].clone())
        };
        let Some(current) = current else { return };

        if let Some(on_hide) = &self.inner.config.on_hide {
            on_hide(&current.id);
        }

        doc.set_attribute(current.trigger, "aria-selected", "false");
        doc.set_attribute(current.trigger, "tabindex", "-1");
        doc.remove_class(current.trigger, CLASS_ACTIVE);
        doc.set_style(current.pane, "display", "none");

        if let Some(on_hidden) = &self.inner.config.on_hidden {
            on_hidden(&current.id);
        }
        self.inner.ctx.events().trigger(
            doc,
            current.trigger,
            CustomEvent::new(EVENT_HIDDEN).with_cancelable(false),
        );
    }

    /// Activate the tab with the given id; a no-op for unknown ids and for
    /// the already-active tab
    pub fn activate(&self, tab_id: &str) {
        let target = {
            let state = self.state();
            let index = state.tabs.iter().position(|tab| tab.id == tab_id);
            match index {
                Some(index) if state.active == Some(index) => None,
                Some(index) => Some((index, state.tabs[index].clone())),
                None => None,
            }
        };
        let Some((index, tab)) = target else { return };

        self.deactivate_current();

        let doc = self.inner.ctx.document();
        if let Some(on_show) = &self.inner.config.on_show {
            on_show(&tab.id);
        }

        doc.set_attribute(tab.trigger, "aria-selected", "true");
        doc.set_attribute(tab.trigger, "tabindex", "0");
        doc.add_class(tab.trigger, CLASS_ACTIVE);
        doc.focus(tab.trigger);
        doc.set_style(tab.pane, "display", "block");

        self.state().active = Some(index);

        if let Some(on_shown) = &self.inner.config.on_shown {
            on_shown(&tab.id);
        }
        self.inner.ctx.events().trigger(
            doc,
            tab.trigger,
            CustomEvent::new(EVENT_SHOWN).with_cancelable(false),
        );
    }

    pub fn active_tab(&self) -> Option<String> {
        let state = self.state();
        state.active.map(|index| state.tabs[index].id.clone())
    }
}

impl Widget for Tab {
    fn name(&self) -> &'static str {
        "tab"
    }

    fn widget_id(&self) -> WidgetId {
        self.inner.id
    }

    fn element(&self) -> ElementId {
        self.inner.element
    }

    fn destroy(&self) {
        let doc = self.inner.ctx.document();
        let (handlers, tabs) = {
            let mut state = self.state();
            (
                std::mem::take(&mut state.handlers),
                std::mem::take(&mut state.tabs),
            )
        };

        for handler in handlers {
            self.inner.ctx.events().off(handler);
        }
        for tab in tabs {
            doc.remove_attribute(tab.trigger, "role");
            doc.remove_attribute(tab.trigger, "aria-controls");
            doc.remove_attribute(tab.trigger, "aria-selected");
            doc.remove_attribute(tab.trigger, "tabindex");
            doc.remove_class(tab.trigger, CLASS_ACTIVE);
            doc.remove_attribute(tab.pane, "role");
            doc.remove_attribute(tab.pane, "aria-labelledby");
            doc.remove_style(tab.pane, "display");
        }
        if let Some(list) = doc.query_selector(self.inner.element, SELECTOR_TAB_LIST) {
            doc.remove_attribute(list, "role");
        }
        doc.remove_class(self.inner.element, CLASS_TABS);
        self.inner.ctx.registry().unregister(self.inner.element, self.inner.id);
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}
