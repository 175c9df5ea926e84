//! Avatar placement inside pyramid segments.
//!
//! The apex generation is laid out in fixed rows; every other generation is a
//! zigzag strip across the middle of its trapezoid. Icon centers are kept inside
//! the silhouette by shrinking the usable width by one icon size.

use loyalists::Dataset;

use crate::config::{LayoutConfig, PlacementConfig, PyramidGeometry};
use crate::layout::Segment;

#[derive(Debug, Clone, PartialEq)]
pub struct AvatarPlacement {
    pub username: String,
    pub generation: usize,
    pub cx: f64,
    pub cy: f64,
    /// Icon edge length; the icon is a circle of diameter `size`.
    pub size: f64,
}

/// Horizontal band of slot centers at one `y`.
#[derive(Debug, Clone, Copy, PartialEq)]
struct Band {
    left: f64,
    width: f64,
}

#[derive(Debug, Clone, Copy)]
pub struct AvatarPlacer<'a> {
    geometry: &'a PyramidGeometry,
    layout: &'a LayoutConfig,
    config: &'a PlacementConfig,
}

impl<'a> AvatarPlacer<'a> {
    pub fn new(
        geometry: &'a PyramidGeometry,
        layout: &'a LayoutConfig,
        config: &'a PlacementConfig,
    ) -> Self {
        Self {
            geometry,
            layout,
            config,
        }
    }

    /// Whether segment `index` of `len` gets avatars: never the last (unformed)
    /// tier, and only the `visible_generations` tiers above it.
    pub fn is_populated(&self, index: usize, len: usize) -> bool {
        index + 1 < len && index + 1 + self.config.visible_generations >= len
    }

    /// Placements for every populated segment, in segment order.
    pub fn place(&self, segments: &[Segment], dataset: &Dataset) -> Vec<AvatarPlacement> {
        let mut out = Vec::new();
        for (index, segment) in segments.iter().enumerate() {
            if !self.is_populated(index, segments.len()) {
                continue;
            }
            let Some(members) = dataset.generation(segment.generation) else {
                continue;
            };
            if members.is_empty() {
                continue;
            }
            self.place_segment(segment, members, &mut out);
        }
        out
    }

    fn place_segment(&self, segment: &Segment, members: &[String], out: &mut Vec<AvatarPlacement>) {
        let generation = segment.generation;
        let height = segment.height();

        if generation == 1 {
            self.place_apex(segment, members, out);
            return;
        }

        if generation <= self.layout.weighted_depth {
            let size = height * self.config.size_ratio / self.layout.weight(generation);
            let offset_ratio = if generation == 3 {
                self.config.wide_zigzag_offset_ratio
            } else {
                self.config.zigzag_offset_ratio
            };
            self.place_zigzag(segment, members, size, offset_ratio, out);
            return;
        }

        let size = height * self.config.size_ratio;
        self.place_zigzag(segment, members, size, self.config.zigzag_offset_ratio, out);
    }

    fn band_at(&self, y: f64, size: f64, packing: f64) -> Band {
        let (left_x, right_x) = self.geometry.edges_at(y);
        let usable_left = left_x + size / 2.0;
        let usable = (right_x - size / 2.0) - usable_left;
        let width = usable * packing;
        Band {
            left: usable_left + (usable - width) / 2.0,
            width,
        }
    }

    fn place_apex(&self, segment: &Segment, members: &[String], out: &mut Vec<AvatarPlacement>) {
        let height = segment.height();
        let size = height * self.config.apex_size_ratio;
        let mut members = members.iter();

        for row in &self.config.apex_rows {
            let y = segment.top_y + height * row.y_ratio;
            let packing = if row.slots == 1 {
                1.0
            } else {
                self.config.apex_packing
            };
            let band = self.band_at(y, size, packing);
            let step = if row.slots > 1 {
                band.width / (row.slots - 1) as f64
            } else {
                0.0
            };

            for slot in 0..row.slots {
                let Some(username) = members.next() else {
                    return;
                };
                let cx = if row.slots == 1 {
                    self.geometry.center()
                } else {
                    band.left + step * slot as f64
                };
                out.push(AvatarPlacement {
                    username: username.clone(),
                    generation: segment.generation,
                    cx,
                    cy: y,
                    size,
                });
            }
        }

        let dropped = members.len();
        if dropped > 0 {
            tracing::warn!(dropped, "apex generation has more members than apex slots");
        }
    }

    fn place_zigzag(
        &self,
        segment: &Segment,
        members: &[String],
        size: f64,
        offset_ratio: f64,
        out: &mut Vec<AvatarPlacement>,
    ) {
        let center_y = segment.mid_y();
        let band = self.band_at(center_y, size, self.config.packing_factor);

        let count = members.len();
        let step = if count > 1 {
            band.width / (count - 1) as f64
        } else {
            0.0
        };
        // With an even count the last icon sits high; shift the strip left to balance it.
        let shift = if count % 2 == 0 {
            -size * offset_ratio * 0.5
        } else {
            0.0
        };
        let offset = size * offset_ratio;

        for (i, username) in members.iter().enumerate() {
            let lifted = (i + 1) % 2 == 0;
            out.push(AvatarPlacement {
                username: username.clone(),
                generation: segment.generation,
                cx: band.left + step * i as f64 + shift,
                cy: if lifted {
                    center_y - offset
                } else {
                    center_y + offset
                },
                size,
            });
        }
    }
}
