//! Shared hover/selection state machine.
//!
//! Both panels feed [`HoverEvent`]s through [`reduce`], which decides the next
//! hovered profile plus any follow-up work: a debounced pyramid scroll, or a list
//! scroll-into-view. The reducer is pure; [`crate::session::Session`] applies its
//! output to the store and controller.

use crate::store::{HoveredProfile, Origin};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HoverEvent {
    /// Pointer entered an avatar in the pyramid.
    AvatarEnter {
        generation: usize,
        username: String,
    },
    AvatarClick {
        generation: usize,
        username: String,
    },
    /// Pointer entered a row in the list panel.
    ListRowEnter {
        generation: usize,
        username: String,
    },
    ListRowClick {
        generation: usize,
        username: String,
    },
    /// Pointer left an avatar or a list row.
    Leave,
    /// A confirmed tap on an avatar.
    Tap {
        generation: usize,
        username: String,
    },
    /// A touch lifted away from every avatar.
    TouchMissed,
    /// The search query changed. `first_match` is the first filtered member in
    /// generation order, if any.
    SearchChanged {
        query_blank: bool,
        first_match: Option<(usize, String)>,
    },
}

/// What `reduce` wants done.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoverOutcome {
    pub hovered: Option<HoveredProfile>,
    /// Generation the pyramid should (debounced) scroll to.
    pub schedule_scroll: Option<usize>,
    /// Whether the list panel should bring `hovered` into view.
    pub scroll_list: bool,
}

impl HoverOutcome {
    fn keep(current: Option<&HoveredProfile>) -> Self {
        Self {
            hovered: current.cloned(),
            schedule_scroll: None,
            scroll_list: false,
        }
    }

    fn set(hovered: Option<HoveredProfile>) -> Self {
        let scroll_list = hovered
            .as_ref()
            .is_some_and(|h| h.origin == Origin::Pyramid);
        Self {
            hovered,
            schedule_scroll: None,
            scroll_list,
        }
    }
}

pub fn reduce(current: Option<&HoveredProfile>, event: HoverEvent) -> HoverOutcome {
    match event {
        HoverEvent::AvatarEnter {
            generation,
            username,
        }
        | HoverEvent::AvatarClick {
            generation,
            username,
        }
        | HoverEvent::Tap {
            generation,
            username,
        } => HoverOutcome::set(Some(HoveredProfile::new(
            generation,
            username,
            Origin::Pyramid,
        ))),
        HoverEvent::ListRowEnter {
            generation,
            username,
        }
        | HoverEvent::ListRowClick {
            generation,
            username,
        } => HoverOutcome {
            schedule_scroll: Some(generation),
            ..HoverOutcome::set(Some(HoveredProfile::new(generation, username, Origin::List)))
        },
        HoverEvent::Leave | HoverEvent::TouchMissed => HoverOutcome::set(None),
        HoverEvent::SearchChanged {
            query_blank: true, ..
        } => HoverOutcome {
            scroll_list: current.is_some(),
            ..HoverOutcome::keep(current)
        },
        HoverEvent::SearchChanged {
            first_match: Some((generation, username)),
            ..
        } => {
            if current.is_some_and(|h| h.username == username) {
                return HoverOutcome::keep(current);
            }
            HoverOutcome {
                schedule_scroll: Some(generation),
                ..HoverOutcome::set(Some(HoveredProfile::new(generation, username, Origin::List)))
            }
        }
        HoverEvent::SearchChanged {
            first_match: None, ..
        } => HoverOutcome::set(None),
    }
}

/// Where a tracked touch was lifted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LiftTarget<'a> {
    Icon(&'a str),
    Nothing,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapResult {
    /// Same finger went down and up on the same avatar.
    Activate {
        generation: usize,
        username: String,
    },
    /// Lifted away from every avatar.
    Clear,
    /// Lifted over a different avatar, or no tap was being tracked.
    Ignore,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct TrackedTouch {
    id: i32,
    generation: usize,
    username: String,
}

/// Distinguishes a tap on an avatar from a drag that happens to start on one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TapTracker {
    touch: Option<TrackedTouch>,
}

impl TapTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only single-finger touches are tracked.
    pub fn begin(&mut self, touch_count: usize, touch_id: i32, generation: usize, username: &str) {
        if touch_count != 1 {
            return;
        }
        self.touch = Some(TrackedTouch {
            id: touch_id,
            generation,
            username: username.to_string(),
        });
    }

    pub fn is_tracking(&self) -> bool {
        self.touch.is_some()
    }

    pub fn finish(&mut self, touch_id: i32, lift: LiftTarget<'_>) -> TapResult {
        let Some(touch) = self.touch.take() else {
            return TapResult::Ignore;
        };
        match lift {
            LiftTarget::Icon(name) if touch.id == touch_id && name == touch.username => {
                TapResult::Activate {
                    generation: touch.generation,
                    username: touch.username,
                }
            }
            LiftTarget::Icon(_) => TapResult::Ignore,
            LiftTarget::Nothing => TapResult::Clear,
        }
    }

    pub fn cancel(&mut self) {
        self.touch = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(generation: usize, username: &str) -> HoveredProfile {
        HoveredProfile::new(generation, username, Origin::List)
    }

    #[test]
    fn avatar_enter_hovers_from_pyramid_and_scrolls_list() {
        let out = reduce(
            None,
            HoverEvent::AvatarEnter {
                generation: 3,
                username: "cat".into(),
            },
        );
        assert_eq!(
            out.hovered,
            Some(HoveredProfile::new(3, "cat", Origin::Pyramid))
        );
        assert!(out.scroll_list);
        assert_eq!(out.schedule_scroll, None);
    }

    #[test]
    fn list_row_enter_schedules_pyramid_scroll() {
        let out = reduce(
            None,
            HoverEvent::ListRowEnter {
                generation: 4,
                username: "dan".into(),
            },
        );
        assert_eq!(out.hovered, Some(list(4, "dan")));
        assert_eq!(out.schedule_scroll, Some(4));
        assert!(!out.scroll_list);
    }

    #[test]
    fn list_row_click_behaves_like_enter() {
        let click = reduce(
            None,
            HoverEvent::ListRowClick {
                generation: 2,
                username: "bob".into(),
            },
        );
        let enter = reduce(
            None,
            HoverEvent::ListRowEnter {
                generation: 2,
                username: "bob".into(),
            },
        );
        assert_eq!(click, enter);
        assert_eq!(click.schedule_scroll, Some(2));
    }

    #[test]
    fn leave_clears() {
        let current = list(2, "bob");
        let out = reduce(Some(&current), HoverEvent::Leave);
        assert_eq!(out.hovered, None);
        let missed = reduce(Some(&current), HoverEvent::TouchMissed);
        assert_eq!(missed.hovered, None);
    }

    #[test]
    fn search_first_match_selects_from_list() {
        let out = reduce(
            None,
            HoverEvent::SearchChanged {
                query_blank: false,
                first_match: Some((2, "ann".into())),
            },
        );
        assert_eq!(out.hovered, Some(list(2, "ann")));
        assert_eq!(out.schedule_scroll, Some(2));
    }

    #[test]
    fn search_match_already_hovered_is_left_alone() {
        let current = HoveredProfile::new(2, "ann", Origin::Pyramid);
        let out = reduce(
            Some(&current),
            HoverEvent::SearchChanged {
                query_blank: false,
                first_match: Some((2, "ann".into())),
            },
        );
        assert_eq!(out, HoverOutcome::keep(Some(&current)));
    }

    #[test]
    fn search_without_match_clears() {
        let current = list(2, "ann");
        let out = reduce(
            Some(&current),
            HoverEvent::SearchChanged {
                query_blank: false,
                first_match: None,
            },
        );
        assert_eq!(out.hovered, None);
    }

    #[test]
    fn cleared_search_keeps_hover_and_rescrolls_list() {
        let current = list(2, "ann");
        let out = reduce(
            Some(&current),
            HoverEvent::SearchChanged {
                query_blank: true,
                first_match: None,
            },
        );
        assert_eq!(out.hovered, Some(current));
        assert!(out.scroll_list);

        let idle = reduce(
            None,
            HoverEvent::SearchChanged {
                query_blank: true,
                first_match: None,
            },
        );
        assert!(!idle.scroll_list);
    }

    #[test]
    fn tap_on_same_icon_activates() {
        let mut t = TapTracker::new();
        t.begin(1, 7, 3, "cat");
        assert!(t.is_tracking());
        assert_eq!(
            t.finish(7, LiftTarget::Icon("cat")),
            TapResult::Activate {
                generation: 3,
                username: "cat".into()
            }
        );
        assert!(!t.is_tracking());
    }

    #[test]
    fn tap_lifted_elsewhere() {
        let mut t = TapTracker::new();
        t.begin(1, 7, 3, "cat");
        assert_eq!(t.finish(7, LiftTarget::Icon("dan")), TapResult::Ignore);

        t.begin(1, 7, 3, "cat");
        assert_eq!(t.finish(8, LiftTarget::Icon("cat")), TapResult::Ignore);

        t.begin(1, 7, 3, "cat");
        assert_eq!(t.finish(7, LiftTarget::Nothing), TapResult::Clear);
    }

    #[test]
    fn multi_touch_and_cancel_are_not_taps() {
        let mut t = TapTracker::new();
        t.begin(2, 1, 3, "cat");
        assert_eq!(t.finish(1, LiftTarget::Icon("cat")), TapResult::Ignore);

        t.begin(1, 1, 3, "cat");
        t.cancel();
        assert_eq!(t.finish(1, LiftTarget::Icon("cat")), TapResult::Ignore);
    }
}
