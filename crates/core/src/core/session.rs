//! One running pyramid: store, controller and hover state machine wired together.
//!
//! Front-ends forward raw input here and read back the store; the session takes
//! care of routing hover outcomes to the controller (pyramid scrolls) and of
//! reporting list scroll-into-view requests back to the caller.

use std::rc::Rc;

use loyalists::{is_blank_query, DatasetError, Roster};
use thiserror::Error;

use crate::config::PyramidConfig;
use crate::controller::{Controller, ScrollSchedule};
use crate::hover::{reduce, HoverEvent, LiftTarget, TapResult, TapTracker};
use crate::list::ListView;
use crate::placement::{AvatarPlacement, AvatarPlacer};
use crate::scene::Scene;
use crate::store::Store;

#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Dataset(#[from] DatasetError),
    #[error("invalid configuration: {0}")]
    Config(&'static str),
}

/// Side effects of a hover transition the caller may need to act on.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Reaction {
    /// Bring the hovered list row into view.
    pub scroll_list: bool,
    /// What happened to a requested pyramid scroll, if one was requested.
    pub pyramid_scroll: Option<ScrollSchedule>,
}

#[derive(Debug)]
pub struct Session {
    config: PyramidConfig,
    store: Store,
    controller: Controller,
    tap: TapTracker,
}

impl Session {
    /// The generation count starts at the lower navigation bound.
    pub fn new(roster: Roster, config: PyramidConfig) -> Result<Self, SessionError> {
        config.validate().map_err(SessionError::Config)?;
        let total = roster.dataset.generation_count() as f64;
        let initial = config.interaction.min_generations.min(total);
        let store = Store::new(
            Rc::new(roster),
            config.geometry,
            config.layout.clone(),
            initial,
        );
        let controller = Controller::new(store.clone(), config.interaction);
        tracing::debug!(total, initial, "session ready");
        Ok(Self {
            config,
            store,
            controller,
            tap: TapTracker::new(),
        })
    }

    pub fn from_json(text: &str, config: PyramidConfig) -> Result<Self, SessionError> {
        let roster = Roster::from_json(text)?;
        Self::new(roster, config)
    }

    pub fn config(&self) -> &PyramidConfig {
        &self.config
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn controller(&self) -> &Controller {
        &self.controller
    }

    pub fn controller_mut(&mut self) -> &mut Controller {
        &mut self.controller
    }

    pub fn roster(&self) -> &Rc<Roster> {
        self.store.roster()
    }

    fn apply(&mut self, event: HoverEvent, now_ms: f64) -> Reaction {
        let current = self.store.hovered();
        let outcome = reduce(current.as_ref(), event);
        if outcome.hovered != current {
            match &outcome.hovered {
                Some(h) => tracing::debug!(
                    generation = h.generation,
                    username = %h.username,
                    origin = h.origin.label(),
                    "hover"
                ),
                None => tracing::debug!("hover cleared"),
            }
        }
        self.store.set_hovered(outcome.hovered);

        let controller = &mut self.controller;
        let pyramid_scroll = outcome
            .schedule_scroll
            .map(|generation| controller.schedule_scroll_to_generation(generation, now_ms));

        Reaction {
            scroll_list: outcome.scroll_list,
            pyramid_scroll,
        }
    }

    pub fn hover_avatar(&mut self, generation: usize, username: &str) -> Reaction {
        self.apply(
            HoverEvent::AvatarEnter {
                generation,
                username: username.to_string(),
            },
            0.0,
        )
    }

    pub fn click_avatar(&mut self, generation: usize, username: &str) -> Reaction {
        self.apply(
            HoverEvent::AvatarClick {
                generation,
                username: username.to_string(),
            },
            0.0,
        )
    }

    pub fn hover_list_row(&mut self, generation: usize, username: &str, now_ms: f64) -> Reaction {
        self.apply(
            HoverEvent::ListRowEnter {
                generation,
                username: username.to_string(),
            },
            now_ms,
        )
    }

    pub fn click_list_row(&mut self, generation: usize, username: &str, now_ms: f64) -> Reaction {
        self.apply(
            HoverEvent::ListRowClick {
                generation,
                username: username.to_string(),
            },
            now_ms,
        )
    }

    /// Pointer left an avatar or a list row.
    pub fn leave(&mut self) -> Reaction {
        self.apply(HoverEvent::Leave, 0.0)
    }

    /// Updates the query and selects the first match, if the query changed.
    pub fn set_search_query(&mut self, query: &str, now_ms: f64) -> Reaction {
        if self.store.search_query() == query {
            return Reaction::default();
        }
        self.store.set_search_query(query);

        let query_blank = is_blank_query(query);
        let first_match = if query_blank {
            None
        } else {
            self.store
                .filtered_loyalists()
                .first_match()
                .map(|(g, u)| (g, u.to_string()))
        };
        self.apply(
            HoverEvent::SearchChanged {
                query_blank,
                first_match,
            },
            now_ms,
        )
    }

    pub fn wheel(&mut self, delta_y: f64, now_ms: f64) {
        self.controller.wheel(delta_y, now_ms);
    }

    /// A touch began over the pyramid, optionally on an avatar.
    pub fn touch_start(
        &mut self,
        touch_count: usize,
        touch_id: i32,
        client_y: f64,
        on_avatar: Option<(usize, &str)>,
    ) {
        match on_avatar {
            Some((generation, username)) => {
                self.tap.begin(touch_count, touch_id, generation, username)
            }
            None => self.tap.cancel(),
        }
        self.controller.touch_start(touch_count, client_y);
    }

    pub fn touch_move(&mut self, touch_count: usize, client_y: f64) {
        self.controller.touch_move(touch_count, client_y);
    }

    /// A touch lifted. Confirms an avatar tap, then finishes the drag.
    pub fn touch_end(&mut self, touch_id: i32, lift: LiftTarget<'_>) -> Reaction {
        let reaction = match self.tap.finish(touch_id, lift) {
            TapResult::Activate {
                generation,
                username,
            } => self.apply(
                HoverEvent::Tap {
                    generation,
                    username,
                },
                0.0,
            ),
            TapResult::Clear => self.apply(HoverEvent::TouchMissed, 0.0),
            TapResult::Ignore => Reaction::default(),
        };
        self.controller
            .touch_end(matches!(lift, LiftTarget::Icon(_)));
        reaction
    }

    pub fn touch_cancel(&mut self) {
        self.tap.cancel();
        self.controller.touch_cancel();
    }

    pub fn tick(&mut self, now_ms: f64) -> bool {
        self.controller.tick(now_ms)
    }

    pub fn needs_frames(&self) -> bool {
        self.controller.needs_frames()
    }

    pub fn placements(&self) -> Vec<AvatarPlacement> {
        let segments = self.store.segments();
        AvatarPlacer::new(
            &self.config.geometry,
            &self.config.layout,
            &self.config.placement,
        )
        .place(&segments, &self.roster().dataset)
    }

    /// Vector scene for the current generation count and hover.
    pub fn scene(&self) -> Scene {
        let segments = self.store.segments();
        let placements = self.placements();
        let hovered = self.store.hovered();
        Scene::build(
            &self.config.geometry,
            &segments,
            &placements,
            &self.roster().directory,
            hovered.as_ref(),
        )
    }

    pub fn list_view(&self) -> ListView {
        let filtered = self.store.filtered_loyalists();
        let hovered = self.store.hovered();
        ListView::build(self.roster(), &filtered, hovered.as_ref())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{HoveredProfile, Origin};
    use loyalists::{Dataset, Directory};

    fn session(sizes: &[usize]) -> Session {
        let generations = sizes
            .iter()
            .enumerate()
            .map(|(g, n)| (0..*n).map(|i| format!("g{}_{}", g + 1, i)).collect())
            .collect();
        let roster = Roster::new(Dataset::new(generations).unwrap(), Directory::default());
        Session::new(roster, PyramidConfig::default()).unwrap()
    }

    fn run(s: &mut Session, from: f64, to: f64) {
        let mut now = from;
        while now <= to {
            s.tick(now);
            now += 16.0;
        }
    }

    #[test]
    fn starts_at_lower_bound() {
        assert_eq!(session(&[1, 3, 4, 5, 6, 7]).store().generations(), 4.0);
        assert_eq!(session(&[1, 3]).store().generations(), 2.0);
    }

    #[test]
    fn rejects_invalid_config() {
        let roster = Roster::new(
            Dataset::new(vec![vec!["a".into()]]).unwrap(),
            Directory::default(),
        );
        let mut config = PyramidConfig::default();
        config.interaction.epsilon = 0.0;
        assert!(matches!(
            Session::new(roster, config),
            Err(SessionError::Config(_))
        ));
    }

    #[test]
    fn empty_roster_json_is_an_error() {
        let err = Session::from_json(r#"{"generations": []}"#, PyramidConfig::default());
        assert!(matches!(err, Err(SessionError::Dataset(DatasetError::Empty))));
    }

    #[test]
    fn empty_generation_keeps_its_segment() {
        let mut s = session(&[1, 3, 0, 5, 2]);
        assert_eq!(s.controller().bounds(), (4.0, 5.0));
        assert_eq!(s.store().segments().len(), 5);
        let placed = s.placements();
        assert!(placed.iter().all(|p| p.generation != 3));
        assert_eq!(placed.iter().filter(|p| p.generation == 4).count(), 5);
        assert_eq!(s.list_view().groups.len(), 4);

        s.hover_list_row(4, "g4_0", 0.0);
        assert!(s.store().is_hovered("g4_0"));
    }

    #[test]
    fn list_hover_on_four_generation_dataset() {
        let mut s = session(&[1, 3, 4, 5]);
        assert_eq!(s.store().generations(), 4.0);

        let reaction = s.hover_list_row(4, "g4_4", 0.0);
        assert_eq!(
            s.store().hovered(),
            Some(HoveredProfile::new(4, "g4_4", Origin::List))
        );
        // Target is min(total, 4 + 1) = 4, which is where we already are.
        assert_eq!(s.controller().scroll_target(4), 4.0);
        assert_eq!(reaction.pyramid_scroll, Some(ScrollSchedule::AlreadyThere));
        assert!(!reaction.scroll_list);
        assert!(!s.needs_frames());
    }

    #[test]
    fn list_hover_scrolls_pyramid_after_delay() {
        let mut s = session(&[1; 10]);
        let reaction = s.hover_list_row(7, "g7_0", 1_000.0);
        assert_eq!(
            reaction.pyramid_scroll,
            Some(ScrollSchedule::Armed { target: 8.0 })
        );
        s.tick(1_100.0);
        assert_eq!(s.store().generations(), 4.0);
        run(&mut s, 1_120.0, 2_000.0);
        assert_eq!(s.store().generations(), 8.0);
    }

    #[test]
    fn avatar_hover_requests_list_scroll() {
        let mut s = session(&[1; 6]);
        let reaction = s.hover_avatar(2, "g2_0");
        assert!(reaction.scroll_list);
        assert_eq!(reaction.pyramid_scroll, None);
        s.leave();
        assert!(s.store().hovered().is_none());
    }

    #[test]
    fn list_click_scrolls_pyramid_after_delay() {
        let mut s = session(&[1; 10]);
        let reaction = s.click_list_row(9, "g9_0", 0.0);
        assert_eq!(
            reaction.pyramid_scroll,
            Some(ScrollSchedule::Armed { target: 10.0 })
        );
        assert_eq!(s.controller().tween_target(), None);
        assert_eq!(s.controller().pending_scroll_target(), Some(10.0));

        s.tick(100.0);
        assert_eq!(s.controller().tween_target(), None);
        s.tick(120.0);
        assert_eq!(s.controller().tween_target(), Some(10.0));
        run(&mut s, 136.0, 1_000.0);
        assert_eq!(s.store().generations(), 10.0);
    }

    #[test]
    fn list_hover_then_click_keeps_one_timer() {
        let mut s = session(&[1; 10]);
        s.hover_list_row(9, "g9_0", 0.0);
        let reaction = s.click_list_row(9, "g9_0", 60.0);
        assert_eq!(
            reaction.pyramid_scroll,
            Some(ScrollSchedule::Pending { target: 10.0 })
        );
        assert_eq!(s.controller().next_deadline_ms(), Some(120.0));
    }

    #[test]
    fn drag_after_list_hover_is_not_overridden() {
        let mut s = session(&[1; 10]);
        s.hover_list_row(9, "g9_0", 0.0);
        s.touch_start(1, 5, 300.0, None);
        s.tick(100.0);
        s.touch_move(1, 280.0);
        s.tick(130.0);
        s.tick(400.0);
        assert!((s.store().generations() - 4.3).abs() < 1e-9);
        assert_eq!(s.controller().tween_target(), None);
    }

    #[test]
    fn search_selects_first_match() {
        let mut s = session(&[1, 3, 4, 5, 2, 2]);
        let reaction = s.set_search_query("g5_", 0.0);
        assert_eq!(
            s.store().hovered(),
            Some(HoveredProfile::new(5, "g5_0", Origin::List))
        );
        assert_eq!(
            reaction.pyramid_scroll,
            Some(ScrollSchedule::Armed { target: 6.0 })
        );
        assert_eq!(s.list_view().row_count(), 2);
    }

    #[test]
    fn search_without_match_clears_hover() {
        let mut s = session(&[1, 3, 4, 5]);
        s.hover_avatar(2, "g2_1");
        s.set_search_query("nobody", 0.0);
        assert!(s.store().hovered().is_none());
        assert_eq!(s.list_view().row_count(), 0);
    }

    #[test]
    fn clearing_search_rescrolls_list_to_hovered() {
        let mut s = session(&[1, 3, 4, 5]);
        s.set_search_query("g3_2", 0.0);
        assert!(s.store().is_hovered("g3_2"));
        let reaction = s.set_search_query("", 0.0);
        assert!(reaction.scroll_list);
        assert!(s.store().is_hovered("g3_2"));
        assert_eq!(s.list_view().row_count(), 13);
    }

    #[test]
    fn repeated_query_is_ignored() {
        let mut s = session(&[1, 3, 4, 5]);
        s.set_search_query("g2", 0.0);
        s.leave();
        let reaction = s.set_search_query("g2", 0.0);
        assert_eq!(reaction, Reaction::default());
        assert!(s.store().hovered().is_none());
    }

    #[test]
    fn tap_on_avatar_selects_it() {
        let mut s = session(&[1; 6]);
        s.touch_start(1, 3, 200.0, Some((2, "g2_0")));
        let reaction = s.touch_end(3, LiftTarget::Icon("g2_0"));
        assert!(reaction.scroll_list);
        assert_eq!(
            s.store().hovered(),
            Some(HoveredProfile::new(2, "g2_0", Origin::Pyramid))
        );
    }

    #[test]
    fn drag_released_off_icons_clears_selection() {
        let mut s = session(&[1; 10]);
        s.hover_avatar(2, "g2_0");
        s.touch_start(1, 3, 400.0, None);
        s.touch_move(1, 300.0);
        s.touch_end(3, LiftTarget::Nothing);
        assert!(s.store().hovered().is_none());
        assert_eq!(s.controller().tween_target(), Some(6.0));
    }

    #[test]
    fn scene_reflects_state() {
        let mut s = session(&[1, 3, 4, 5, 6]);
        s.hover_list_row(3, "g3_1", 0.0);
        let scene = s.scene();
        let dimmed = scene.avatars().filter(|a| a.grayscale).count();
        // Gens 1-4 are populated at 4 generations; everyone but the hovered one is dimmed.
        assert_eq!(dimmed, 1 + 3 + 4 + 5 - 1);
    }
}
