//! Tuning constants for the pyramid, grouped by the component that reads them.
//!
//! Defaults reproduce the shipped look and feel; every struct has a
//! `validate()` so callers loading overrides from disk can reject nonsense early.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Pyramid silhouette in SVG user units.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PyramidGeometry {
    pub width: f64,
    pub top: f64,
    pub bottom: f64,
    /// Fraction of the full pyramid covered by the visible outline triangle.
    pub clip_ratio: f64,
    /// SVG `viewBox` as `(min_x, min_y, width, height)`.
    pub view_box: (f64, f64, f64, f64),
}

impl Default for PyramidGeometry {
    fn default() -> Self {
        Self {
            width: 1000.0,
            top: 0.0,
            bottom: 800.0,
            clip_ratio: 0.8,
            view_box: (100.0, -50.0, 900.0, 480.0),
        }
    }
}

impl PyramidGeometry {
    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> f64 {
        self.width / 2.0
    }

    pub fn half_base(&self) -> f64 {
        self.width / 2.0
    }

    pub fn left(&self) -> f64 {
        self.center() - self.half_base()
    }

    pub fn right(&self) -> f64 {
        self.center() + self.half_base()
    }

    /// Half width of the pyramid at `y`: zero at the apex, `half_base` at the base.
    pub fn half_width_at(&self, y: f64) -> f64 {
        self.half_base() * (y - self.top) / self.height()
    }

    /// `(left_x, right_x)` of the silhouette at `y`.
    pub fn edges_at(&self, y: f64) -> (f64, f64) {
        let hw = self.half_width_at(y);
        (self.center() - hw, self.center() + hw)
    }

    pub fn visible_left(&self) -> f64 {
        self.center() - self.clip_ratio * self.center()
    }

    pub fn visible_right(&self) -> f64 {
        self.center() + self.clip_ratio * self.center()
    }

    pub fn clip_height(&self) -> f64 {
        self.top + self.height() * self.clip_ratio
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.width.is_finite() && self.width > 0.0) {
            return Err("width must be finite and > 0");
        }
        if !(self.top.is_finite() && self.bottom.is_finite()) || self.bottom <= self.top {
            return Err("bottom must be below top");
        }
        if !(0.0..=1.0).contains(&self.clip_ratio) {
            return Err("clip_ratio must be in [0, 1]");
        }
        Ok(())
    }
}

/// Segment height rules.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct LayoutConfig {
    /// Relative weights of the first generations while the pyramid is shallow.
    pub special_weights: Vec<f64>,
    /// Depth up to which `special_weights` are used directly.
    pub weighted_depth: usize,
    /// Factor applied to every existing tier when a new generation is added.
    pub compression_ratio: f64,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            special_weights: vec![2.0, 1.0, 1.2, 1.0],
            weighted_depth: 4,
            compression_ratio: 0.8,
        }
    }
}

impl LayoutConfig {
    /// Weight of a 1-based generation; generations past the table weigh 1.0.
    pub fn weight(&self, generation: usize) -> f64 {
        generation
            .checked_sub(1)
            .and_then(|idx| self.special_weights.get(idx))
            .copied()
            .unwrap_or(1.0)
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if self.weighted_depth == 0 {
            return Err("weighted_depth must be >= 1");
        }
        if self.special_weights.iter().any(|w| !w.is_finite() || *w <= 0.0) {
            return Err("special_weights must be finite and > 0");
        }
        if !(self.compression_ratio > 0.0 && self.compression_ratio < 1.0) {
            return Err("compression_ratio must be in (0, 1)");
        }
        Ok(())
    }
}

/// One row of the apex layout.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ApexRow {
    pub slots: usize,
    /// Vertical position inside the segment, as a fraction of its height.
    pub y_ratio: f64,
}

/// Avatar packing rules.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PlacementConfig {
    /// Icon size as a fraction of segment height.
    pub size_ratio: f64,
    /// Icon size of the apex generation as a fraction of its segment height.
    pub apex_size_ratio: f64,
    pub apex_rows: Vec<ApexRow>,
    /// Band width for multi-slot apex rows.
    pub apex_packing: f64,
    /// Band width for zigzag rows.
    pub packing_factor: f64,
    pub zigzag_offset_ratio: f64,
    /// Zigzag offset used by generation 3.
    pub wide_zigzag_offset_ratio: f64,
    /// How many tiers above the deepest one still get avatars.
    pub visible_generations: usize,
}

impl Default for PlacementConfig {
    fn default() -> Self {
        Self {
            size_ratio: 0.4,
            apex_size_ratio: 0.2,
            apex_rows: vec![
                ApexRow {
                    slots: 1,
                    y_ratio: 0.35,
                },
                ApexRow {
                    slots: 3,
                    y_ratio: 0.6,
                },
                ApexRow {
                    slots: 4,
                    y_ratio: 0.85,
                },
            ],
            apex_packing: 0.8,
            packing_factor: 0.9,
            zigzag_offset_ratio: 0.3,
            wide_zigzag_offset_ratio: 0.5,
            visible_generations: 16,
        }
    }
}

impl PlacementConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        if self.size_ratio <= 0.0 || self.apex_size_ratio <= 0.0 {
            return Err("size ratios must be > 0");
        }
        if !(0.0..=1.0).contains(&self.packing_factor) || !(0.0..=1.0).contains(&self.apex_packing)
        {
            return Err("packing factors must be in [0, 1]");
        }
        if self.apex_rows.iter().any(|r| r.slots == 0) {
            return Err("apex rows need at least one slot");
        }
        Ok(())
    }
}

/// Interaction timings and scales. Durations and delays are in milliseconds.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct InteractionConfig {
    pub min_generations: f64,
    /// Distance under which two generation values count as the same target.
    pub epsilon: f64,
    /// Overscroll moves at this fraction of normal speed beyond the bounds.
    pub overscroll_factor: f64,
    /// Generation units per wheel `deltaY`.
    pub wheel_scale: f64,
    /// Generation units per pixel of vertical drag.
    pub touch_scale: f64,
    pub wheel_snap_delay_ms: f64,
    pub wheel_snap_duration_ms: f64,
    pub touch_snap_duration_ms: f64,
    pub hover_delay_ms: f64,
    pub scroll_duration_ms: f64,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self {
            min_generations: 4.0,
            epsilon: 0.05,
            overscroll_factor: 0.3,
            wheel_scale: 0.002,
            touch_scale: 0.015,
            wheel_snap_delay_ms: 250.0,
            wheel_snap_duration_ms: 250.0,
            touch_snap_duration_ms: 300.0,
            hover_delay_ms: 120.0,
            scroll_duration_ms: 700.0,
        }
    }
}

impl InteractionConfig {
    pub fn with_min_generations(mut self, min_generations: f64) -> Self {
        self.min_generations = min_generations;
        self
    }

    pub fn validate(&self) -> Result<(), &'static str> {
        if !(self.min_generations.is_finite() && self.min_generations >= 1.0) {
            return Err("min_generations must be >= 1");
        }
        if self.epsilon.is_nan() || self.epsilon <= 0.0 {
            return Err("epsilon must be > 0");
        }
        if !(0.0..=1.0).contains(&self.overscroll_factor) {
            return Err("overscroll_factor must be in [0, 1]");
        }
        let timings = [
            self.wheel_snap_delay_ms,
            self.wheel_snap_duration_ms,
            self.touch_snap_duration_ms,
            self.hover_delay_ms,
            self.scroll_duration_ms,
        ];
        if timings.iter().any(|t| !t.is_finite() || *t < 0.0) {
            return Err("timings must be finite and >= 0");
        }
        Ok(())
    }
}

/// Everything a session needs, loadable as one JSON document.
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct PyramidConfig {
    pub geometry: PyramidGeometry,
    pub layout: LayoutConfig,
    pub placement: PlacementConfig,
    pub interaction: InteractionConfig,
}

impl PyramidConfig {
    pub fn validate(&self) -> Result<(), &'static str> {
        self.geometry.validate()?;
        self.layout.validate()?;
        self.placement.validate()?;
        self.interaction.validate()
    }
}
