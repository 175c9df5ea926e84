//! Pyramid layout: fractional generation count -> stacked trapezoid segments.
//!
//! Heights for an integer depth `n` are derived recursively:
//!
//! - `n <= weighted_depth`: the special weight table, normalized to sum to 1.
//! - `n > weighted_depth`: the `n - 1` heights scaled by `compression_ratio`, plus a
//!   final tier of `1 - compression_ratio`. Existing boundaries therefore move
//!   uniformly toward the apex as depth grows, while the newest tier always keeps
//!   the same share of the total height.
//!
//! A fractional depth interpolates every boundary between its position in the
//! `floor` and `ceil` solutions, so geometry never jumps when the count crosses an
//! integer.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::rc::Rc;

use hashbrown::HashMap;

use crate::config::{LayoutConfig, PyramidGeometry};

/// Memoized `segment_heights` results.
///
/// Entries are never evicted: keys are depths, bounded by the dataset's total
/// generation count plus the overscroll margin.
#[derive(Debug, Default)]
pub struct HeightTable {
    config: LayoutConfig,
    cache: RefCell<HashMap<usize, Rc<[f64]>>>,
}

impl HeightTable {
    pub fn new(config: LayoutConfig) -> Self {
        Self {
            config,
            cache: RefCell::new(HashMap::new()),
        }
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    /// Normalized heights of an `n`-generation pyramid. `n == 0` yields no tiers.
    pub fn segment_heights(&self, n: usize) -> Rc<[f64]> {
        if let Some(hit) = self.cache.borrow().get(&n) {
            return Rc::clone(hit);
        }

        let heights: Rc<[f64]> = if n <= self.config.weighted_depth {
            let weights: Vec<f64> = (1..=n).map(|g| self.config.weight(g)).collect();
            let sum: f64 = weights.iter().sum();
            if sum > 0.0 {
                weights.iter().map(|w| w / sum).collect()
            } else {
                weights.into()
            }
        } else {
            // The recursive call fills the cache for every smaller depth too.
            let prev = self.segment_heights(n - 1);
            let ratio = self.config.compression_ratio;
            prev.iter()
                .map(|h| h * ratio)
                .chain(std::iter::once(1.0 - ratio))
                .collect()
        };

        self.cache.borrow_mut().insert(n, Rc::clone(&heights));
        heights
    }

    /// Relative position (0 at the apex, 1 at the base) of the boundary below
    /// generation `m` in an `n`-generation pyramid.
    pub fn boundary_position(&self, m: usize, n: usize) -> f64 {
        if m == 0 {
            return 0.0;
        }
        if m >= n {
            return 1.0;
        }
        self.segment_heights(n)[..m].iter().sum()
    }

    pub fn cached_depths(&self) -> usize {
        self.cache.borrow().len()
    }
}

/// Horizontal line between two generations.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Boundary {
    pub y: f64,
    pub left_x: f64,
    pub right_x: f64,
}

/// On-screen trapezoid of one generation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Segment {
    /// 1-based generation number.
    pub generation: usize,
    pub top_y: f64,
    pub bottom_y: f64,
    pub top_left_x: f64,
    pub top_right_x: f64,
    pub bottom_left_x: f64,
    pub bottom_right_x: f64,
}

impl Segment {
    pub fn height(&self) -> f64 {
        self.bottom_y - self.top_y
    }

    pub fn mid_y(&self) -> f64 {
        (self.top_y + self.bottom_y) / 2.0
    }

    /// Corners clockwise from the top left.
    pub fn corners(&self) -> [(f64, f64); 4] {
        [
            (self.top_left_x, self.top_y),
            (self.top_right_x, self.top_y),
            (self.bottom_right_x, self.bottom_y),
            (self.bottom_left_x, self.bottom_y),
        ]
    }

    /// Corners formatted for an SVG `points` attribute.
    pub fn svg_points(&self) -> String {
        let mut out = String::with_capacity(64);
        for (i, (x, y)) in self.corners().iter().enumerate() {
            if i > 0 {
                out.push(' ');
            }
            let _ = write!(out, "{x},{y}");
        }
        out
    }
}

/// Layout engine bound to one pyramid geometry.
#[derive(Debug, Default)]
pub struct Layout {
    geometry: PyramidGeometry,
    heights: HeightTable,
}

impl Layout {
    pub fn new(geometry: PyramidGeometry, config: LayoutConfig) -> Self {
        Self {
            geometry,
            heights: HeightTable::new(config),
        }
    }

    pub fn geometry(&self) -> &PyramidGeometry {
        &self.geometry
    }

    pub fn heights(&self) -> &HeightTable {
        &self.heights
    }

    pub fn segment_heights(&self, n: usize) -> Rc<[f64]> {
        self.heights.segment_heights(n)
    }

    pub fn boundary_position(&self, m: usize, n: usize) -> f64 {
        self.heights.boundary_position(m, n)
    }

    /// Interior boundaries for a fractional tier count, top to bottom.
    pub fn boundaries(&self, count: f64) -> Vec<Boundary> {
        if !count.is_finite() || count <= 1.0 {
            return Vec::new();
        }

        let full = count.floor() as usize;
        let frac = count - count.floor();
        let target = if frac > 0.0 { full + 1 } else { full };
        let g = &self.geometry;

        (1..target)
            .map(|i| {
                let in_current = self.heights.boundary_position(i, full);
                let in_next = self.heights.boundary_position(i, target);
                let position = in_current + (in_next - in_current) * frac;
                let y = g.top + g.height() * position;
                let (left_x, right_x) = g.edges_at(y);
                Boundary { y, left_x, right_x }
            })
            .collect()
    }

    /// Segments for a fractional tier count. `count` is the number of tiers drawn,
    /// so `ceil(count)` segments come back; `count <= 0` yields none.
    pub fn segments(&self, count: f64) -> Vec<Segment> {
        if !count.is_finite() || count <= 0.0 {
            return Vec::new();
        }

        let target = count.ceil() as usize;
        let lines = self.boundaries(count);
        let g = &self.geometry;

        (1..=target)
            .map(|generation| {
                let (top_y, top_left_x, top_right_x) = if generation == 1 {
                    (g.top, g.center(), g.center())
                } else {
                    let above = lines[generation - 2];
                    (above.y, above.left_x, above.right_x)
                };
                let (bottom_y, bottom_left_x, bottom_right_x) = if generation == target {
                    (g.bottom, g.left(), g.right())
                } else {
                    let below = lines[generation - 1];
                    (below.y, below.left_x, below.right_x)
                };
                Segment {
                    generation,
                    top_y,
                    bottom_y,
                    top_left_x,
                    top_right_x,
                    bottom_left_x,
                    bottom_right_x,
                }
            })
            .collect()
    }
}
