//! Time-based eased interpolation of a single scalar.
//!
//! A tween does not own a clock. It is stepped with frame timestamps (in
//! milliseconds, e.g. the value handed to a `requestAnimationFrame` callback) and
//! anchors its start on the first timestamp it sees, so a late first frame does
//! not make the animation skip ahead.

pub fn ease_in_out_cubic(t: f64) -> f64 {
    if t < 0.5 {
        4.0 * t * t * t
    } else {
        1.0 - (-2.0 * t + 2.0).powi(3) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TweenStep {
    pub value: f64,
    pub done: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Tween {
    from: f64,
    to: f64,
    duration_ms: f64,
    started_at: Option<f64>,
}

impl Tween {
    pub fn new(from: f64, to: f64, duration_ms: f64) -> Self {
        Self {
            from,
            to,
            duration_ms: duration_ms.max(0.0),
            started_at: None,
        }
    }

    pub fn from(&self) -> f64 {
        self.from
    }

    pub fn target(&self) -> f64 {
        self.to
    }

    pub fn duration_ms(&self) -> f64 {
        self.duration_ms
    }

    pub fn started_at(&self) -> Option<f64> {
        self.started_at
    }

    /// Eased value after `elapsed_ms`; clamps past the end.
    pub fn value_at(&self, elapsed_ms: f64) -> f64 {
        let progress = self.progress(elapsed_ms);
        self.from + (self.to - self.from) * ease_in_out_cubic(progress)
    }

    fn progress(&self, elapsed_ms: f64) -> f64 {
        if self.duration_ms <= 0.0 {
            return 1.0;
        }
        (elapsed_ms / self.duration_ms).clamp(0.0, 1.0)
    }

    /// Advance to frame timestamp `now_ms`. The final step lands on the target exactly.
    pub fn step(&mut self, now_ms: f64) -> TweenStep {
        let started_at = *self.started_at.get_or_insert(now_ms);
        let progress = self.progress(now_ms - started_at);
        if progress >= 1.0 {
            return TweenStep {
                value: self.to,
                done: true,
            };
        }
        TweenStep {
            value: self.from + (self.to - self.from) * ease_in_out_cubic(progress),
            done: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easing_endpoints_and_midpoint() {
        assert_eq!(ease_in_out_cubic(0.0), 0.0);
        assert_eq!(ease_in_out_cubic(0.5), 0.5);
        assert_eq!(ease_in_out_cubic(1.0), 1.0);
        assert!((ease_in_out_cubic(0.25) - 0.0625).abs() < 1e-12);
        assert!((ease_in_out_cubic(0.75) - 0.9375).abs() < 1e-12);
    }

    #[test]
    fn easing_is_monotonic() {
        let mut prev = 0.0;
        for i in 1..=100 {
            let v = ease_in_out_cubic(i as f64 / 100.0);
            assert!(v >= prev);
            prev = v;
        }
    }

    #[test]
    fn step_anchors_on_first_frame() {
        let mut t = Tween::new(4.0, 6.0, 700.0);
        let first = t.step(1_000.0);
        assert_eq!(first.value, 4.0);
        assert!(!first.done);
        assert_eq!(t.started_at(), Some(1_000.0));

        let mid = t.step(1_350.0);
        let expected = 4.0 + 2.0 * ease_in_out_cubic(0.5);
        assert!((mid.value - expected).abs() < 1e-12);

        let end = t.step(1_800.0);
        assert_eq!(end.value, 6.0);
        assert!(end.done);
    }

    #[test]
    fn zero_duration_finishes_immediately() {
        let mut t = Tween::new(1.0, 3.0, 0.0);
        let s = t.step(5.0);
        assert!(s.done);
        assert_eq!(s.value, 3.0);
        assert_eq!(t.value_at(0.0), 3.0);
    }
}
