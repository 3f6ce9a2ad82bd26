//! Fade state shared between the animator and its callers

use std::sync::{Arc, Mutex};

use crate::dom::ElementId;

pub(crate) type CompletionCallback = Box<dyn FnOnce() + Send>;

/// Which way the opacity ramp runs
#[derive(Debug, Clone)]
pub(crate) enum FadeDirection {
    /// Ramp 0 -> 1; `display` is written up front
    In { display: String },
    /// Ramp current -> 0; `display: none` is written on completion
    Out,
}

pub(crate) struct FadeShared {
    pub done: bool,
    pub cancelled: bool,
    pub callbacks: Vec<CompletionCallback>,
}

/// One in-flight fade tracked by the animator
pub(crate) struct ActiveFade {
    pub element: ElementId,
    pub direction: FadeDirection,
    pub started: std::time::Duration,
    pub duration: std::time::Duration,
    pub from_opacity: f32,
    pub shared: Arc<Mutex<FadeShared>>,
}

/// Cancelable handle to a fade started with
/// [`Animator::fade_in`](crate::animation::Animator::fade_in) /
/// [`Animator::fade_out`](crate::animation::Animator::fade_out)
///
/// Dropping the handle does not cancel the fade; only `cancel` does.
/// Cancellation freezes the element at its current opacity and suppresses
/// completion callbacks.
#[derive(Clone)]
pub struct FadeHandle {
    shared: Arc<Mutex<FadeShared>>,
}

impl FadeHandle {
    pub(crate) fn new(shared: Arc<Mutex<FadeShared>>) -> Self {
        Self { shared }
    }

    /// Handle that is already complete (animation disabled paths)
    pub(crate) fn completed() -> Self {
        Self {
            shared: Arc::new(Mutex::new(FadeShared {
                done: true,
                cancelled: false,
                callbacks: Vec::new(),
            })),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, FadeShared> {
        self.shared.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn is_done(&self) -> bool {
        self.lock().done
    }

    pub fn is_cancelled(&self) -> bool {
        self.lock().cancelled
    }

    /// Stop future frame writes and suppress pending completion callbacks
    pub fn cancel(&self) {
        let mut shared = self.lock();
        if !shared.done {
            shared.cancelled = true;
            shared.callbacks.clear();
        }
    }

    /// Run `callback` when the fade completes; runs immediately if the fade
    /// already finished, never if it was cancelled
    pub fn on_complete<F>(&self, callback: F)
    where
        F: FnOnce() + Send + 'static,
    {
        let mut shared = self.lock();
        if shared.cancelled {
            return;
        }
        if shared.done {
            drop(shared);
            callback();
        } else {
            shared.callbacks.push(Box::new(callback));
        }
    }
}
