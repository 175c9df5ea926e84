//! Retained vector scene for one frame of the pyramid.
//!
//! The scene is a flat, back-to-front list of primitives. The browser front-end
//! maps it onto SVG elements; [`Scene::to_svg`] serializes it to a standalone
//! document for snapshots and the CLI.

use std::fmt::Write as _;

use loyalists::Directory;

use crate::config::PyramidGeometry;
use crate::layout::Segment;
use crate::placement::AvatarPlacement;
use crate::store::{HoveredProfile, Origin};

/// How many of the most recent generation labels are drawn, besides the unformed tier.
pub const LABELS_VISIBLE_LIMIT: usize = 15;
const LABEL_GAP: f64 = 12.0;
const DIMMED_OPACITY: f64 = 0.7;
const RING_PAD: f64 = 2.0;

pub fn to_roman(n: i64) -> String {
    const NUMERALS: [(i64, &str); 13] = [
        (1000, "M"),
        (900, "CM"),
        (500, "D"),
        (400, "CD"),
        (100, "C"),
        (90, "XC"),
        (50, "L"),
        (40, "XL"),
        (10, "X"),
        (9, "IX"),
        (5, "V"),
        (4, "IV"),
        (1, "I"),
    ];
    let mut rest = n;
    let mut out = String::new();
    if rest <= 0 {
        return out;
    }
    for (value, numeral) in NUMERALS {
        while rest >= value {
            out.push_str(numeral);
            rest -= value;
        }
    }
    out
}

#[derive(Debug, Clone, PartialEq)]
pub struct SegmentShape {
    pub generation: usize,
    pub points: [(f64, f64); 4],
}

#[derive(Debug, Clone, PartialEq)]
pub struct Line {
    pub from: (f64, f64),
    pub to: (f64, f64),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Label {
    pub x: f64,
    pub y: f64,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AvatarIcon {
    pub placement: AvatarPlacement,
    /// Image reference; empty when the member has no avatar.
    pub href: String,
    pub opacity: f64,
    pub grayscale: bool,
    /// Radius of the highlight ring, if hovered.
    pub ring_radius: Option<f64>,
}

impl AvatarIcon {
    /// Emphasis rules: a list-origin hover dims and desaturates every other icon;
    /// the hovered icon always gets a ring.
    pub fn new(placement: AvatarPlacement, href: String, hovered: Option<&HoveredProfile>) -> Self {
        let is_hovered = hovered.is_some_and(|h| h.username == placement.username);
        let from_list = hovered.is_some_and(|h| h.origin == Origin::List);
        let dimmed = from_list && !is_hovered;
        let ring_radius = is_hovered.then(|| placement.size / 2.0 + RING_PAD);
        Self {
            placement,
            href,
            opacity: if dimmed { DIMMED_OPACITY } else { 1.0 },
            grayscale: dimmed,
            ring_radius,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum SceneItem {
    Segment(SegmentShape),
    BaseLine(Line),
    Avatar(AvatarIcon),
    Label(Label),
    Outline([(f64, f64); 3]),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub view_box: (f64, f64, f64, f64),
    pub items: Vec<SceneItem>,
}

impl Scene {
    /// `placements` must be in segment order, as produced by
    /// [`crate::placement::AvatarPlacer::place`].
    pub fn build(
        geometry: &PyramidGeometry,
        segments: &[Segment],
        placements: &[AvatarPlacement],
        directory: &Directory,
        hovered: Option<&HoveredProfile>,
    ) -> Self {
        let mut items = Vec::with_capacity(segments.len() * 3 + placements.len() + 1);
        let label_start = segments.len().saturating_sub(LABELS_VISIBLE_LIMIT + 1);

        for (index, segment) in segments.iter().enumerate() {
            items.push(SceneItem::Segment(SegmentShape {
                generation: segment.generation,
                points: segment.corners(),
            }));
            items.push(SceneItem::BaseLine(Line {
                from: (segment.bottom_left_x, segment.bottom_y),
                to: (segment.bottom_right_x, segment.bottom_y),
            }));

            for placement in placements
                .iter()
                .filter(|p| p.generation == segment.generation)
            {
                let href = directory
                    .avatar(&placement.username)
                    .unwrap_or_default()
                    .to_string();
                items.push(SceneItem::Avatar(AvatarIcon::new(
                    placement.clone(),
                    href,
                    hovered,
                )));
            }

            if index >= label_start {
                let y = segment.mid_y();
                let (_, right) = geometry.edges_at(y);
                items.push(SceneItem::Label(Label {
                    x: right.min(geometry.visible_right()) + LABEL_GAP,
                    y,
                    text: format!("Gen {}", to_roman(segment.generation as i64)),
                }));
            }
        }

        items.push(SceneItem::Outline([
            (geometry.center(), geometry.top),
            (geometry.visible_left(), geometry.clip_height()),
            (geometry.visible_right(), geometry.clip_height()),
        ]));

        Self {
            view_box: geometry.view_box,
            items,
        }
    }

    pub fn avatars(&self) -> impl Iterator<Item = &AvatarIcon> {
        self.items.iter().filter_map(|item| match item {
            SceneItem::Avatar(icon) => Some(icon),
            _ => None,
        })
    }

    pub fn labels(&self) -> impl Iterator<Item = &Label> {
        self.items.iter().filter_map(|item| match item {
            SceneItem::Label(label) => Some(label),
            _ => None,
        })
    }

    pub fn to_svg(&self) -> String {
        let (x, y, w, h) = self.view_box;
        let mut svg = String::new();
        // Writing into a String cannot fail.
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="{x} {y} {w} {h}" preserveAspectRatio="xMidYMid meet">"#
        );
        let _ = writeln!(
            svg,
            r#"<defs><filter id="grayscale"><feColorMatrix type="saturate" values="0"/></filter></defs>"#
        );
        for item in &self.items {
            match item {
                SceneItem::Segment(shape) => {
                    let _ = writeln!(
                        svg,
                        r#"<polygon points="{}" fill="rgb(40,40,40)" opacity="0.3" stroke="white" stroke-width="1"/>"#,
                        svg_points(&shape.points)
                    );
                }
                SceneItem::BaseLine(line) => {
                    let _ = writeln!(
                        svg,
                        r#"<line x1="{}" y1="{}" x2="{}" y2="{}" stroke="white" stroke-width="2" opacity="0.9"/>"#,
                        line.from.0,
                        line.from.1,
                        line.to.0,
                        line.to.1
                    );
                }
                SceneItem::Avatar(icon) => write_avatar(&mut svg, icon),
                SceneItem::Label(label) => {
                    let _ = writeln!(
                        svg,
                        r#"<text x="{}" y="{}" fill="rgba(255,255,255,0.9)" text-anchor="start" dominant-baseline="middle" font-size="28" opacity="0.9">{}</text>"#,
                        label.x,
                        label.y,
                        escape(&label.text)
                    );
                }
                SceneItem::Outline(points) => {
                    let _ = writeln!(
                        svg,
                        r#"<polygon points="{}" fill="none" stroke="white" stroke-width="4" opacity="0.9"/>"#,
                        svg_points(points)
                    );
                }
            }
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn write_avatar(svg: &mut String, icon: &AvatarIcon) {
    let p = &icon.placement;
    let half = p.size / 2.0;
    let filter = if icon.grayscale {
        r#" filter="url(#grayscale)""#
    } else {
        ""
    };
    let _ = writeln!(
        svg,
        r#"<g data-username="{}"><clipPath id="clip-{}"><circle cx="{}" cy="{}" r="{}"/></clipPath><image href="{}" x="{}" y="{}" width="{}" height="{}" preserveAspectRatio="xMidYMid slice" clip-path="url(#clip-{})" opacity="{}"{}/>"#,
        escape(&p.username),
        escape(&p.username),
        p.cx,
        p.cy,
        half,
        escape(&icon.href),
        p.cx - half,
        p.cy - half,
        p.size,
        p.size,
        escape(&p.username),
        icon.opacity,
        filter
    );
    if let Some(r) = icon.ring_radius {
        let _ = writeln!(
            svg,
            r#"<circle cx="{}" cy="{}" r="{}" fill="none" stroke="rgb(59,130,246)" stroke-width="3"/>"#,
            p.cx,
            p.cy,
            r
        );
    }
    svg.push_str("</g>\n");
}

/// `points` attribute value for an SVG polygon.
pub fn svg_points(points: &[(f64, f64)]) -> String {
    points
        .iter()
        .map(|(x, y)| format!("{x},{y}"))
        .collect::<Vec<_>>()
        .join(" ")
}

fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{LayoutConfig, PlacementConfig};
    use crate::layout::Layout;
    use crate::placement::AvatarPlacer;
    use hashbrown::HashMap;
    use loyalists::Dataset;

    #[test]
    fn roman_numerals() {
        assert_eq!(to_roman(0), "");
        assert_eq!(to_roman(-3), "");
        assert_eq!(to_roman(1), "I");
        assert_eq!(to_roman(4), "IV");
        assert_eq!(to_roman(9), "IX");
        assert_eq!(to_roman(14), "XIV");
        assert_eq!(to_roman(40), "XL");
        assert_eq!(to_roman(1994), "MCMXCIV");
        assert_eq!(to_roman(2024), "MMXXIV");
    }

    fn scene(count: f64, hovered: Option<&HoveredProfile>) -> Scene {
        let geometry = PyramidGeometry::default();
        let layout_cfg = LayoutConfig::default();
        let placement = PlacementConfig::default();
        let dataset = Dataset::new(vec![
            vec!["apex".into()],
            vec!["ann".into(), "bob".into()],
            vec!["cat".into()],
            vec!["dan".into()],
            vec!["eve".into()],
        ])
        .unwrap();
        let mut avatars = HashMap::new();
        avatars.insert("ann".to_string(), "ann.webp".to_string());
        let directory = Directory::new(HashMap::new(), avatars);

        let segments = Layout::new(geometry, layout_cfg.clone()).segments(count);
        let placements =
            AvatarPlacer::new(&geometry, &layout_cfg, &placement).place(&segments, &dataset);
        Scene::build(&geometry, &segments, &placements, &directory, hovered)
    }

    #[test]
    fn scene_has_shape_line_and_label_per_segment() {
        let s = scene(5.0, None);
        let shapes = s
            .items
            .iter()
            .filter(|i| matches!(i, SceneItem::Segment(_)))
            .count();
        assert_eq!(shapes, 5);
        let labels: Vec<_> = s.labels().map(|l| l.text.as_str()).collect();
        assert_eq!(labels, ["Gen I", "Gen II", "Gen III", "Gen IV", "Gen V"]);
        assert!(matches!(s.items.last(), Some(SceneItem::Outline(_))));
    }

    #[test]
    fn labels_hug_the_visible_outline() {
        let s = scene(5.0, None);
        let g = PyramidGeometry::default();
        for label in s.labels() {
            let (_, right) = g.edges_at(label.y);
            let expected = right.min(g.visible_right()) + 12.0;
            assert!((label.x - expected).abs() < 1e-9);
            assert!(label.x <= g.visible_right() + 12.0);
        }
    }

    #[test]
    fn only_recent_labels_are_drawn() {
        let geometry = PyramidGeometry::default();
        let segments = Layout::new(geometry, LayoutConfig::default()).segments(20.0);
        let s = Scene::build(&geometry, &segments, &[], &Directory::default(), None);
        let labels: Vec<_> = s.labels().map(|l| l.text.clone()).collect();
        assert_eq!(labels.len(), LABELS_VISIBLE_LIMIT + 1);
        assert_eq!(labels.first().map(String::as_str), Some("Gen V"));
        assert_eq!(labels.last().map(String::as_str), Some("Gen XX"));
    }

    #[test]
    fn list_hover_dims_other_avatars() {
        let hovered = HoveredProfile::new(2, "ann", Origin::List);
        let s = scene(5.0, Some(&hovered));
        for icon in s.avatars() {
            if icon.placement.username == "ann" {
                assert_eq!(icon.opacity, 1.0);
                assert!(!icon.grayscale);
                let r = icon.ring_radius.unwrap();
                assert!((r - (icon.placement.size / 2.0 + 2.0)).abs() < 1e-12);
            } else {
                assert_eq!(icon.opacity, 0.7);
                assert!(icon.grayscale);
                assert!(icon.ring_radius.is_none());
            }
        }
    }

    #[test]
    fn pyramid_hover_only_rings() {
        let hovered = HoveredProfile::new(2, "bob", Origin::Pyramid);
        let s = scene(5.0, Some(&hovered));
        assert!(s.avatars().all(|i| i.opacity == 1.0 && !i.grayscale));
        let ringed: Vec<_> = s
            .avatars()
            .filter(|i| i.ring_radius.is_some())
            .map(|i| i.placement.username.as_str())
            .collect();
        assert_eq!(ringed, ["bob"]);
    }

    #[test]
    fn missing_avatar_renders_empty_href() {
        let s = scene(5.0, None);
        let hrefs: HashMap<_, _> = s
            .avatars()
            .map(|i| (i.placement.username.clone(), i.href.clone()))
            .collect();
        assert_eq!(hrefs["ann"], "ann.webp");
        assert_eq!(hrefs["bob"], "");
    }

    #[test]
    fn svg_export_contains_every_primitive() {
        let hovered = HoveredProfile::new(1, "apex", Origin::List);
        let svg = scene(4.5, Some(&hovered)).to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.trim_end().ends_with("</svg>"));
        assert!(svg.contains(r#"viewBox="100 -50 900 480""#));
        assert_eq!(svg.matches("<polygon").count(), 5 + 1);
        assert!(svg.contains("Gen IV"));
        assert!(svg.contains(r#"data-username="apex""#));
        assert!(svg.contains(r#"filter="url(#grayscale)""#));
        assert!(svg.contains("stroke=\"rgb(59,130,246)\""));
    }
}
