// Core module of the LaceKit widget toolkit
pub mod animation;
pub mod component;
pub mod dom;
pub mod events;

pub mod kit; // LaceKit widget library

/// Version of the LaceKit toolkit
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Re-export of common types for convenience
pub mod prelude {
    pub use crate::animation::{Animator, FadeHandle, FrameClock, TimerHandle};
    pub use crate::component::{
        resolve_element, ComponentError, Context, ElementRef, InstanceRegistry,
        MissingElementPolicy, Widget, WidgetId,
    };
    pub use crate::dom::{Document, ElementId, Selector};
    pub use crate::events::{CustomEvent, DispatchOutcome, EventDispatcher, HandlerId};
    pub use crate::kit::components::alert::{Alert, AlertConfig};
    pub use crate::kit::components::button::{Button, ButtonConfig};
    pub use crate::kit::components::collapse::{Collapse, CollapseConfig};
    pub use crate::kit::components::dropdown::{Dropdown, DropdownConfig};
    pub use crate::kit::components::modal::{Modal, ModalConfig};
    pub use crate::kit::components::tab::{Tab, TabConfig};
    pub use crate::kit::components::toast::{Toast, ToastConfig};
}

/// Errors that can occur in the LaceKit toolkit
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Initialization error: {0}")]
    Init(String),

    #[error("Component error: {0}")]
    Component(#[from] component::ComponentError),

    #[error("Selector error: {0}")]
    Selector(String),
}

/// Initialize the toolkit with default settings
///
/// Builds a [`component::Context`] backed by a monotonic frame clock. The
/// context owns the document, dispatcher, animator, and instance registry;
/// widgets are constructed against it.
pub fn init() -> Result<component::Context, Error> {
    Ok(component::Context::new())
}
