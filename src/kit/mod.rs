// LaceKit widget library

pub mod components;

use std::sync::Arc;

/// Shared state machine for every show/hide widget
///
/// `Showing`/`Hiding` are the transition guards: while a fade is in flight
/// the widget ignores further `show`/`hide` calls toward the same end
/// state, so double-calls collapse into one visible transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Visibility {
    #[default]
    Hidden,
    Showing,
    Shown,
    Hiding,
}

impl Visibility {
    pub fn is_shown(self) -> bool {
        matches!(self, Visibility::Shown)
    }

    pub fn is_transitioning(self) -> bool {
        matches!(self, Visibility::Showing | Visibility::Hiding)
    }

    /// Already at or heading toward the visible end state
    pub fn is_opening_or_open(self) -> bool {
        matches!(self, Visibility::Showing | Visibility::Shown)
    }
}

/// Parameterless widget callback
pub type Callback = Arc<dyn Fn() + Send + Sync>;

/// Wrap a closure as an optional [`Callback`] for config fields
pub fn callback<F>(f: F) -> Option<Callback>
where
    F: Fn() + Send + Sync + 'static,
{
    Some(Arc::new(f))
}

/// Hooks fired around a show/hide transition, in the fixed order
/// `on_show` -> mutation -> settle -> `on_shown` (mirrored for hide)
#[derive(Clone, Default)]
pub struct TransitionHooks {
    pub on_show: Option<Callback>,
    pub on_shown: Option<Callback>,
    pub on_hide: Option<Callback>,
    pub on_hidden: Option<Callback>,
}

pub(crate) fn run_hook(hook: &Option<Callback>) {
    if let Some(hook) = hook {
        hook();
    }
}

/// Re-export of common widgets for convenience
pub mod prelude {
    pub use crate::kit::components::alert::Alert;
    pub use crate::kit::components::button::Button;
    pub use crate::kit::components::card::Card;
    pub use crate::kit::components::checkbox::Checkbox;
    pub use crate::kit::components::collapse::Collapse;
    pub use crate::kit::components::dropdown::Dropdown;
    pub use crate::kit::components::input::Input;
    pub use crate::kit::components::modal::Modal;
    pub use crate::kit::components::navbar::Navbar;
    pub use crate::kit::components::popover::Popover;
    pub use crate::kit::components::switch::Switch;
    pub use crate::kit::components::tab::Tab;
    pub use crate::kit::components::toast::Toast;
    pub use crate::kit::{callback, TransitionHooks, Visibility};
}
