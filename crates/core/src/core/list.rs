//! List panel: view model and scroll-into-view math.
//!
//! The panel groups the filtered roster by generation under sticky headers.
//! [`scroll_target`] works on measured client rectangles so the browser layer
//! only has to read the DOM and apply the result.

use loyalists::{FilteredLoyalists, Roster};

use crate::store::HoveredProfile;

/// Gap kept between a scrolled-to row and the container edges.
pub const SCROLL_MARGIN: f64 = 8.0;

pub fn profile_url(username: &str) -> String {
    format!("https://x.com/{username}")
}

pub fn count_label(count: usize) -> String {
    if count == 1 {
        "1 loyalist".to_string()
    } else {
        format!("{count} loyalists")
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListRow {
    pub generation: usize,
    pub username: String,
    pub display_name: String,
    /// Empty when the member has no avatar.
    pub avatar: String,
    pub profile_url: String,
    pub hovered: bool,
}

impl ListRow {
    pub fn handle(&self) -> String {
        format!("@{}", self.username)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListGroup {
    pub generation: usize,
    pub rows: Vec<ListRow>,
}

impl ListGroup {
    pub fn title(&self) -> String {
        format!("Generation {}", self.generation)
    }

    pub fn count_label(&self) -> String {
        count_label(self.rows.len())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListView {
    /// Size of the whole roster, independent of the filter.
    pub total: usize,
    pub groups: Vec<ListGroup>,
}

impl ListView {
    /// Generations without a match are left out.
    pub fn build(
        roster: &Roster,
        filtered: &FilteredLoyalists,
        hovered: Option<&HoveredProfile>,
    ) -> Self {
        let groups = filtered
            .non_empty()
            .map(|(generation, members)| ListGroup {
                generation,
                rows: members
                    .iter()
                    .map(|username| ListRow {
                        generation,
                        username: username.clone(),
                        display_name: roster.directory.display_name(username).to_string(),
                        avatar: roster
                            .directory
                            .avatar(username)
                            .unwrap_or_default()
                            .to_string(),
                        profile_url: profile_url(username),
                        hovered: hovered.is_some_and(|h| h.username == *username),
                    })
                    .collect(),
            })
            .collect();
        Self {
            total: roster.dataset.total_members(),
            groups,
        }
    }

    pub fn title(&self) -> String {
        format!("Loyalists ({} total)", self.total)
    }

    pub fn row_count(&self) -> usize {
        self.groups.iter().map(|g| g.rows.len()).sum()
    }

    pub fn hovered_row(&self) -> Option<&ListRow> {
        self.groups
            .iter()
            .flat_map(|g| g.rows.iter())
            .find(|r| r.hovered)
    }
}

/// Vertical extent of a client rectangle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Span {
    pub top: f64,
    pub bottom: f64,
}

impl Span {
    pub fn new(top: f64, bottom: f64) -> Self {
        Self { top, bottom }
    }

    pub fn height(&self) -> f64 {
        self.bottom - self.top
    }

    pub fn center(&self) -> f64 {
        (self.top + self.bottom) / 2.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScrollMetrics {
    pub scroll_top: f64,
    pub scroll_height: f64,
    pub client_height: f64,
}

impl ScrollMetrics {
    pub fn max_scroll(&self) -> f64 {
        (self.scroll_height - self.client_height).max(0.0)
    }
}

/// New `scroll_top` that brings `row` into view inside `container`, or `None`
/// when it is already visible within [`SCROLL_MARGIN`] below the sticky header.
///
/// When the whole generation `group` fits, centering it is preferred as long as
/// the row stays visible afterwards. Otherwise the row is aligned to whichever
/// safe boundary it crossed; a row taller than the safe area aligns to the top.
pub fn scroll_target(
    container: Span,
    group: Span,
    row: Span,
    sticky_header_height: f64,
    metrics: ScrollMetrics,
) -> Option<f64> {
    let top_boundary = container.top + SCROLL_MARGIN + sticky_header_height;
    let bottom_boundary = container.bottom - SCROLL_MARGIN;
    let visible_height = container.height() - 2.0 * SCROLL_MARGIN - sticky_header_height;

    if row.top >= top_boundary && row.bottom <= bottom_boundary {
        return None;
    }

    let align_row = || {
        if row.top < top_boundary {
            metrics.scroll_top + (row.top - top_boundary)
        } else {
            metrics.scroll_top + (row.bottom - bottom_boundary)
        }
    };

    let target = if group.height() <= visible_height {
        let delta = group.center() - container.center();
        let top_after = row.top - delta;
        let bottom_after = row.bottom - delta;
        if top_after >= top_boundary && bottom_after <= bottom_boundary {
            metrics.scroll_top + delta
        } else {
            align_row()
        }
    } else if row.height() > visible_height {
        metrics.scroll_top + (row.top - top_boundary)
    } else {
        align_row()
    };

    Some(target.clamp(0.0, metrics.max_scroll()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use hashbrown::HashMap;
    use loyalists::{Dataset, Directory};

    use crate::store::Origin;

    fn roster() -> Roster {
        let dataset = Dataset::new(vec![
            vec!["apex".into()],
            vec!["ann".into(), "bob".into()],
            vec!["cat".into()],
        ])
        .unwrap();
        let mut names = HashMap::new();
        names.insert("ann".to_string(), "Ann Example".to_string());
        let mut avatars = HashMap::new();
        avatars.insert("bob".to_string(), "bob.webp".to_string());
        Roster::new(dataset, Directory::new(names, avatars))
    }

    #[test]
    fn builds_groups_with_fallbacks() {
        let r = roster();
        let filtered = FilteredLoyalists::new(&r.dataset, &r.directory, "");
        let hovered = HoveredProfile::new(2, "bob", Origin::Pyramid);
        let view = ListView::build(&r, &filtered, Some(&hovered));

        assert_eq!(view.title(), "Loyalists (4 total)");
        assert_eq!(view.groups.len(), 3);
        let g2 = &view.groups[1];
        assert_eq!(g2.title(), "Generation 2");
        assert_eq!(g2.count_label(), "2 loyalists");
        assert_eq!(view.groups[0].count_label(), "1 loyalist");

        assert_eq!(g2.rows[0].display_name, "Ann Example");
        assert_eq!(g2.rows[0].avatar, "");
        assert_eq!(g2.rows[1].display_name, "bob");
        assert_eq!(g2.rows[1].handle(), "@bob");
        assert_eq!(g2.rows[1].avatar, "bob.webp");
        assert_eq!(g2.rows[1].profile_url, "https://x.com/bob");
        assert_eq!(view.hovered_row().map(|r| r.username.as_str()), Some("bob"));
    }

    #[test]
    fn filter_hides_empty_generations_but_keeps_total() {
        let r = roster();
        let filtered = FilteredLoyalists::new(&r.dataset, &r.directory, "example");
        let view = ListView::build(&r, &filtered, None);
        assert_eq!(view.total, 4);
        assert_eq!(view.row_count(), 1);
        assert_eq!(view.groups[0].generation, 2);
        assert!(view.hovered_row().is_none());
    }

    fn metrics(scroll_top: f64) -> ScrollMetrics {
        ScrollMetrics {
            scroll_top,
            scroll_height: 2_000.0,
            client_height: 400.0,
        }
    }

    const CONTAINER: Span = Span {
        top: 100.0,
        bottom: 500.0,
    };

    #[test]
    fn visible_row_needs_no_scroll() {
        let row = Span::new(200.0, 240.0);
        let group = Span::new(150.0, 300.0);
        assert_eq!(
            scroll_target(CONTAINER, group, row, 40.0, metrics(0.0)),
            None
        );
    }

    #[test]
    fn row_under_sticky_header_is_not_visible() {
        // Inside the container but hidden behind the 40px header.
        let row = Span::new(120.0, 160.0);
        let group = Span::new(-400.0, 600.0);
        let target = scroll_target(CONTAINER, group, row, 40.0, metrics(500.0));
        // Align to top boundary: 100 + 8 + 40 = 148.
        assert_eq!(target, Some(500.0 + (120.0 - 148.0)));
    }

    #[test]
    fn small_group_is_centered() {
        let group = Span::new(700.0, 800.0);
        let row = Span::new(740.0, 780.0);
        let target = scroll_target(CONTAINER, group, row, 40.0, metrics(100.0)).unwrap();
        // Group center 750, container center 300.
        assert_eq!(target, 100.0 + 450.0);
    }

    #[test]
    fn centering_that_hides_row_falls_back_to_alignment() {
        // Group fits (340 <= 400 - 16 - 40) but centering it puts the row under the header.
        let group = Span::new(600.0, 940.0);
        let row = Span::new(600.0, 640.0);
        let target = scroll_target(CONTAINER, group, row, 40.0, metrics(0.0)).unwrap();
        assert_eq!(target, 640.0 - 492.0);
    }

    #[test]
    fn tall_group_aligns_row_below() {
        let group = Span::new(0.0, 1_500.0);
        let row = Span::new(900.0, 940.0);
        let target = scroll_target(CONTAINER, group, row, 40.0, metrics(200.0)).unwrap();
        assert_eq!(target, 200.0 + (940.0 - 492.0));
    }

    #[test]
    fn row_taller_than_viewport_aligns_top() {
        let group = Span::new(0.0, 1_500.0);
        let row = Span::new(600.0, 1_200.0);
        let target = scroll_target(CONTAINER, group, row, 40.0, metrics(0.0)).unwrap();
        assert_eq!(target, 600.0 - 148.0);
    }

    #[test]
    fn target_is_clamped_to_scroll_range() {
        let group = Span::new(-900.0, 900.0);
        let row = Span::new(-900.0, -860.0);
        let target = scroll_target(CONTAINER, group, row, 0.0, metrics(50.0));
        assert_eq!(target, Some(0.0));

        let row = Span::new(5_000.0, 5_040.0);
        let group = Span::new(-900.0, 5_100.0);
        let target = scroll_target(CONTAINER, group, row, 0.0, metrics(1_500.0));
        assert_eq!(target, Some(1_600.0));
    }
}
