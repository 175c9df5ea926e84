//! Interaction controller: the only writer of the generation count.
//!
//! Input arrives as wheel ticks, touch gestures and hover/click requests, and time
//! arrives through [`Controller::tick`]. Between them the controller keeps:
//!
//! - at most one in-flight [`Tween`],
//! - a wheel snap-back slot that pulls an overscrolled value back into range once
//!   the wheel has been idle for a while,
//! - a hover-scroll slot that debounces "bring this generation into view"
//!   requests coming from hover events.
//!
//! Nothing here blocks or spawns; the host calls `tick` once per animation frame
//! for as long as [`Controller::needs_frames`] says so.

use crate::config::InteractionConfig;
use crate::schedule::ScheduledTask;
use crate::store::Store;
use crate::tween::Tween;

/// Elastic bound: the excess past `min`/`max` is scaled by `factor`.
pub fn apply_overscroll(desired: f64, min: f64, max: f64, factor: f64) -> f64 {
    if desired < min {
        let overshoot = min - desired;
        return min - overshoot * factor;
    }
    if desired > max {
        let overshoot = desired - max;
        return max + overshoot * factor;
    }
    desired
}

/// Surface-independent view of what the user is currently doing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Gesture {
    Idle,
    Dragging { start_y: f64, start_value: f64 },
    Animating { target: f64 },
}

/// Result of a hover-scroll request.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScrollSchedule {
    /// Already at, or already animating to, the target; nothing pending.
    AlreadyThere,
    /// A new timer was armed for this target.
    Armed { target: f64 },
    /// A timer for the same target was already pending.
    Pending { target: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct HoverScroll {
    target: f64,
    duration_ms: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct DragAnchor {
    start_y: f64,
    start_value: f64,
}

#[derive(Debug)]
pub struct Controller {
    store: Store,
    config: InteractionConfig,
    min: f64,
    max: f64,
    tween: Option<Tween>,
    wheel_snap: ScheduledTask<f64>,
    hover_scroll: ScheduledTask<HoverScroll>,
    drag: Option<DragAnchor>,
}

impl Controller {
    /// Bounds come from the store's dataset: `[min_generations, total]`, with the
    /// lower bound pulled down for datasets shallower than `min_generations`.
    pub fn new(store: Store, config: InteractionConfig) -> Self {
        let max = store.roster().dataset.generation_count() as f64;
        let min = config.min_generations.min(max);
        Self {
            store,
            config,
            min,
            max,
            tween: None,
            wheel_snap: ScheduledTask::new(),
            hover_scroll: ScheduledTask::new(),
            drag: None,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }

    pub fn bounds(&self) -> (f64, f64) {
        (self.min, self.max)
    }

    pub fn value(&self) -> f64 {
        self.store.generations()
    }

    pub fn clamp_to_bounds(&self, value: f64) -> f64 {
        value.clamp(self.min, self.max)
    }

    pub fn overscroll(&self, desired: f64) -> f64 {
        apply_overscroll(desired, self.min, self.max, self.config.overscroll_factor)
    }

    pub fn gesture(&self) -> Gesture {
        if let Some(anchor) = self.drag {
            return Gesture::Dragging {
                start_y: anchor.start_y,
                start_value: anchor.start_value,
            };
        }
        match &self.tween {
            Some(t) => Gesture::Animating { target: t.target() },
            None => Gesture::Idle,
        }
    }

    pub fn tween_target(&self) -> Option<f64> {
        self.tween.as_ref().map(Tween::target)
    }

    pub fn pending_wheel_snap(&self) -> Option<f64> {
        self.wheel_snap.pending().copied()
    }

    pub fn pending_scroll_target(&self) -> Option<f64> {
        self.hover_scroll.pending().map(|h| h.target)
    }

    /// True while a tween runs or a timer is pending.
    pub fn needs_frames(&self) -> bool {
        self.tween.is_some() || self.wheel_snap.is_armed() || self.hover_scroll.is_armed()
    }

    /// Earliest pending timer deadline, for hosts that prefer sleeping to polling.
    pub fn next_deadline_ms(&self) -> Option<f64> {
        match (
            self.wheel_snap.deadline_ms(),
            self.hover_scroll.deadline_ms(),
        ) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    fn near(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.config.epsilon
    }

    /// Start an eased animation to `target`.
    ///
    /// Returns `false` without touching anything when the value is already within
    /// epsilon of `target`, or a tween to (nearly) the same target is in flight.
    /// Otherwise the current tween, if any, is replaced.
    pub fn tween_to(&mut self, target: f64, duration_ms: f64) -> bool {
        let current = self.value();
        if self.near(current, target) {
            return false;
        }
        if self.tween_target().is_some_and(|t| self.near(t, target)) {
            return false;
        }
        tracing::debug!(from = current, target, duration_ms, "tween start");
        self.tween = Some(Tween::new(current, target, duration_ms));
        true
    }

    /// Drop the in-flight tween, leaving the value where it is.
    pub fn stop_tween(&mut self) {
        self.tween = None;
    }

    /// Per-frame step: fire due timers, then advance the tween.
    /// Returns whether the generation value may have changed.
    ///
    /// A drag owns the value, so nothing runs while one is in progress.
    pub fn tick(&mut self, now_ms: f64) -> bool {
        if self.drag.is_some() {
            return false;
        }
        if let Some(bound) = self.wheel_snap.poll(now_ms) {
            tracing::debug!(bound, "wheel snap-back");
            self.tween_to(bound, self.config.wheel_snap_duration_ms);
        }
        if let Some(req) = self.hover_scroll.poll(now_ms) {
            self.tween_to(req.target, req.duration_ms);
        }

        let Some(tween) = self.tween.as_mut() else {
            return false;
        };
        let step = tween.step(now_ms);
        if step.done {
            self.tween = None;
            tracing::debug!(value = step.value, "tween done");
        }
        self.store.set_generations(step.value);
        true
    }

    /// Wheel tick: commit immediately with elastic bounds; if the result is out of
    /// range, (re)arm the idle snap-back, otherwise disarm it.
    pub fn wheel(&mut self, delta_y: f64, now_ms: f64) {
        self.tween = None;
        self.hover_scroll.cancel();
        let desired = self.value() + delta_y * self.config.wheel_scale;
        let next = self.overscroll(desired);
        self.store.set_generations(next);

        if next < self.min || next > self.max {
            let bound = if next < self.min { self.min } else { self.max };
            self.wheel_snap.arm(bound, now_ms + self.config.wheel_snap_delay_ms);
        } else {
            self.wheel_snap.cancel();
        }
    }

    /// Touch start; only single-finger gestures drag the pyramid.
    pub fn touch_start(&mut self, touch_count: usize, client_y: f64) -> bool {
        if touch_count != 1 {
            return false;
        }
        self.tween = None;
        self.wheel_snap.cancel();
        self.hover_scroll.cancel();
        self.drag = Some(DragAnchor {
            start_y: client_y,
            start_value: self.value(),
        });
        true
    }

    /// Dragging up (smaller `client_y`) reveals more generations.
    pub fn touch_move(&mut self, touch_count: usize, client_y: f64) -> bool {
        let Some(anchor) = self.drag else {
            return false;
        };
        if touch_count != 1 {
            return false;
        }
        let dy = anchor.start_y - client_y;
        let desired = anchor.start_value + dy * self.config.touch_scale;
        let next = self.overscroll(desired);
        self.store.set_generations(next);
        true
    }

    /// Touch end. Lifting away from every avatar also clears the hover, which is
    /// what separates "drag to navigate" from "tap an avatar".
    pub fn touch_end(&mut self, lift_over_icon: bool) {
        if !lift_over_icon {
            self.store.set_hovered(None);
        }
        self.finish_drag();
    }

    pub fn touch_cancel(&mut self) {
        self.finish_drag();
    }

    fn finish_drag(&mut self) {
        if self.drag.take().is_none() {
            return;
        }
        let target = self.clamp_to_bounds(self.value().round());
        self.tween_to(target, self.config.touch_snap_duration_ms);
    }

    /// Generation count that shows `generation` fully, one tier above the edge.
    pub fn scroll_target(&self, generation: usize) -> f64 {
        self.clamp_to_bounds(generation as f64 + 1.0)
    }

    /// Debounced scroll with the configured hover delay and scroll duration.
    pub fn schedule_scroll_to_generation(
        &mut self,
        generation: usize,
        now_ms: f64,
    ) -> ScrollSchedule {
        self.schedule_scroll_to_generation_with(
            generation,
            self.config.hover_delay_ms,
            self.config.scroll_duration_ms,
            now_ms,
        )
    }

    pub fn schedule_scroll_to_generation_with(
        &mut self,
        generation: usize,
        delay_ms: f64,
        duration_ms: f64,
        now_ms: f64,
    ) -> ScrollSchedule {
        let target = self.scroll_target(generation);

        let already_there = self.near(self.value(), target)
            || self.tween_target().is_some_and(|t| self.near(t, target));
        if already_there {
            self.hover_scroll.cancel();
            return ScrollSchedule::AlreadyThere;
        }

        if let Some(pending) = self.hover_scroll.pending() {
            if self.near(pending.target, target) {
                return ScrollSchedule::Pending { target };
            }
            self.hover_scroll.cancel();
        }

        self.hover_scroll.arm(
            HoverScroll {
                target,
                duration_ms,
            },
            now_ms + delay_ms,
        );
        ScrollSchedule::Armed { target }
    }
}
