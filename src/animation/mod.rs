//! Fade animation and timers for the LaceKit toolkit
//!
//! Suspension in this toolkit is a chain of frame-clock ticks, not an
//! awaited future: the [`Animator`] owns every in-flight opacity ramp and
//! pending timer, advances them on `tick`, and runs completion callbacks
//! with no internal lock held. Fades are cancelable tasks; the widget state
//! machines hold the returned handles and cancel a stale fade before
//! starting a new one on the same element.

mod clock;
mod fade;
mod scheduler;

pub use clock::FrameClock;
pub use fade::FadeHandle;
pub use scheduler::{Animator, TimerHandle, DEFAULT_FADE_DURATION};
