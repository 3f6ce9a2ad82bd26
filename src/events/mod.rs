//! Event dispatch for the LaceKit toolkit
//!
//! One dispatcher tracks every listener registration (direct or delegated)
//! so widgets can tear themselves down without re-matching callbacks, and
//! synthesizes the bubbling `cl.<widget>.<verb>` notification events.

mod dispatcher;
mod event;

pub use dispatcher::{DispatchOutcome, EventDispatcher, HandlerId};
pub use event::{CustomEvent, EventScope};
