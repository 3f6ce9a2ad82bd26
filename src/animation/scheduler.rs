//! Animator: ticks every in-flight fade and pending timer
//!
//! One style write per element per frame. Overlapping fades on the same
//! element are not de-duplicated here; the widget layer cancels the handle
//! it holds before starting a replacement ramp.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::animation::clock::FrameClock;
use crate::animation::fade::{ActiveFade, CompletionCallback, FadeDirection, FadeHandle, FadeShared};
use crate::dom::{Document, ElementId};

/// Duration used by widgets that fade without an explicit override
pub const DEFAULT_FADE_DURATION: Duration = Duration::from_millis(300);

/// Nominal frame step used by `settle` on a manual clock
const FRAME_STEP: Duration = Duration::from_millis(16);

/// Upper bound on settle iterations; a fade or timer that survives this many
/// frames indicates a stuck clock, not pending work
const SETTLE_LIMIT: usize = 100_000;

struct TimerShared {
    fired: bool,
    cancelled: bool,
    callback: Option<CompletionCallback>,
}

struct ActiveTimer {
    deadline: Duration,
    shared: Arc<Mutex<TimerShared>>,
}

/// Cancelable handle to a one-shot timer from
/// [`Animator::after`]
#[derive(Clone)]
pub struct TimerHandle {
    shared: Arc<Mutex<TimerShared>>,
}

impl TimerHandle {
    fn lock(&self) -> std::sync::MutexGuard<'_, TimerShared> {
        self.shared.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn cancel(&self) {
        let mut shared = self.lock();
        if !shared.fired {
            shared.cancelled = true;
            shared.callback = None;
        }
    }

    pub fn is_fired(&self) -> bool {
        self.lock().fired
    }
}

#[derive(Default)]
struct AnimatorState {
    fades: Vec<ActiveFade>,
    timers: Vec<ActiveTimer>,
}

/// Cheap-clone handle driving fades and timers against one document
#[derive(Clone)]
pub struct Animator {
    document: Document,
    clock: FrameClock,
    inner: Arc<Mutex<AnimatorState>>,
}

impl Animator {
    pub fn new(document: Document, clock: FrameClock) -> Self {
        Self {
            document,
            clock,
            inner: Arc::new(Mutex::new(AnimatorState::default())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, AnimatorState> {
        self.inner.lock().unwrap_or_else(|p| p.into_inner())
    }

    pub fn clock(&self) -> &FrameClock {
        &self.clock
    }

    /// Ramp opacity 0 -> 1 over `duration`, writing `display` up front
    ///
    /// A zero duration completes on the next tick. Callers must not race a
    /// second fade on the same element without cancelling the first; the
    /// frames would interleave last-writer-wins.
    pub fn fade_in(&self, element: ElementId, duration: Duration, display: &str) -> FadeHandle {
        self.document.set_style(element, "opacity", "0");
        self.document.set_style(element, "display", display);

        self.push_fade(ActiveFade {
            element,
            direction: FadeDirection::In {
                display: display.to_string(),
            },
            started: self.clock.now(),
            duration,
            from_opacity: 0.0,
            shared: new_shared(),
        })
    }

    /// Ramp opacity from its current value toward 0, then write
    /// `display: none`
    pub fn fade_out(&self, element: ElementId, duration: Duration) -> FadeHandle {
        let from_opacity = self.document.opacity(element);

        self.push_fade(ActiveFade {
            element,
            direction: FadeDirection::Out,
            started: self.clock.now(),
            duration,
            from_opacity,
            shared: new_shared(),
        })
    }

    fn push_fade(&self, fade: ActiveFade) -> FadeHandle {
        let handle = FadeHandle::new(fade.shared.clone());
        self.lock().fades.push(fade);
        handle
    }

    /// One-shot timer on the animation clock
    pub fn after<F>(&self, delay: Duration, callback: F) -> TimerHandle
    where
        F: FnOnce() + Send + 'static,
    {
        let shared = Arc::new(Mutex::new(TimerShared {
            fired: false,
            cancelled: false,
            callback: Some(Box::new(callback)),
        }));
        self.lock().timers.push(ActiveTimer {
            deadline: self.clock.now() + delay,
            shared: shared.clone(),
        });
        TimerHandle { shared }
    }

    /// True while any fade or timer is still pending
    pub fn has_work(&self) -> bool {
        let inner = self.lock();
        !inner.fades.is_empty() || !inner.timers.is_empty()
    }

    /// Advance a manual clock and run one frame
    pub fn advance(&self, delta: Duration) {
        self.clock.advance(delta);
        self.tick();
    }

    /// Tick until no fades or timers remain
    pub fn settle(&self) {
        for _ in 0..SETTLE_LIMIT {
            if !self.has_work() {
                return;
            }
            if self.clock.is_manual() {
                self.clock.advance(FRAME_STEP);
            }
            self.tick();
        }
        log::warn!("settle() hit its iteration bound with work still pending");
    }

    /// Run one animation frame: write each active fade's opacity for the
    /// current clock reading, fire due timers, then run completion
    /// callbacks with no lock held
    pub fn tick(&self) {
        let now = self.clock.now();
        let mut ready: Vec<CompletionCallback> = Vec::new();

        {
            let mut inner = self.lock();

            inner.fades.retain_mut(|fade| {
                let mut shared = fade.shared.lock().unwrap_or_else(|p| p.into_inner());
                if shared.cancelled {
                    return false;
                }

                let progress = progress(now, fade.started, fade.duration);
                match &fade.direction {
                    FadeDirection::In { .. } => {
                        let opacity = progress.min(1.0);
                        self.document
                            .set_style(fade.element, "opacity", &format_opacity(opacity));
                    }
                    FadeDirection::Out => {
                        let opacity = (fade.from_opacity - progress).max(0.0);
                        self.document
                            .set_style(fade.element, "opacity", &format_opacity(opacity));
                    }
                }

                if progress >= 1.0 {
                    if matches!(fade.direction, FadeDirection::Out) {
                        self.document.set_style(fade.element, "display", "none");
                    }
                    shared.done = true;
                    ready.append(&mut shared.callbacks);
                    false
                } else {
                    true
                }
            });

            inner.timers.retain_mut(|timer| {
                let mut shared = timer.shared.lock().unwrap_or_else(|p| p.into_inner());
                if shared.cancelled {
                    return false;
                }
                if now >= timer.deadline {
                    shared.fired = true;
                    if let Some(callback) = shared.callback.take() {
                        ready.push(callback);
                    }
                    false
                } else {
                    true
                }
            });
        }

        for callback in ready {
            callback();
        }
    }
}

fn new_shared() -> Arc<Mutex<FadeShared>> {
    Arc::new(Mutex::new(FadeShared {
        done: false,
        cancelled: false,
        callbacks: Vec::new(),
    }))
}

fn progress(now: Duration, started: Duration, duration: Duration) -> f32 {
    if duration.is_zero() {
        return 1.0;
    }
    let elapsed = now.saturating_sub(started);
    (elapsed.as_secs_f32() / duration.as_secs_f32()).min(1.0)
}

fn format_opacity(value: f32) -> String {
    // Trim trailing zeros so settled values read as "0"/"1"
    let mut text = format!("{value:.4}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    text
}
