//! Observable application state shared by the pyramid and the list panel.
//!
//! The store is the single source of truth for three fields: the fractional
//! generation count, the hovered/selected profile, and the search query. Writers
//! go through typed setters; every effective change is pushed synchronously to
//! subscribers, after the state borrow has been released, so subscribers may read
//! (or even write) the store from inside their callback.
//!
//! Derived values (`segments`, `filtered_loyalists`) are recomputed lazily and
//! memoized against the input they were computed from.

use std::cell::RefCell;
use std::rc::Rc;

use loyalists::{FilteredLoyalists, Roster};

use crate::config::{LayoutConfig, PyramidGeometry};
use crate::layout::{Layout, Segment};

/// Which panel set the current hover.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Origin {
    Pyramid,
    List,
}

impl Origin {
    pub fn label(self) -> &'static str {
        match self {
            Origin::Pyramid => "pyramid",
            Origin::List => "list",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HoveredProfile {
    /// 1-based generation.
    pub generation: usize,
    pub username: String,
    pub origin: Origin,
}

impl HoveredProfile {
    pub fn new(generation: usize, username: impl Into<String>, origin: Origin) -> Self {
        Self {
            generation,
            username: username.into(),
            origin,
        }
    }
}

/// Which field a notification is about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Change {
    Generations,
    Hovered,
    SearchQuery,
}

pub type Subscriber = Rc<dyn Fn(Change)>;

#[derive(Debug, Clone)]
struct State {
    generations: f64,
    hovered: Option<HoveredProfile>,
    search_query: String,
}

struct Inner {
    state: RefCell<State>,
    subscribers: Rc<RefCell<Vec<Subscriber>>>,
    roster: Rc<Roster>,
    layout: Layout,
    segments_memo: RefCell<Option<(u64, Rc<[Segment]>)>>,
    filtered_memo: RefCell<Option<(String, Rc<FilteredLoyalists>)>>,
}

/// Cheap-to-clone handle; all clones share one state.
#[derive(Clone)]
pub struct Store {
    inner: Rc<Inner>,
}

impl std::fmt::Debug for Store {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Store")
            .field("state", &*self.inner.state.borrow())
            .field("subscribers", &self.inner.subscribers.borrow().len())
            .finish()
    }
}

impl Store {
    pub fn new(
        roster: Rc<Roster>,
        geometry: PyramidGeometry,
        layout: LayoutConfig,
        initial_generations: f64,
    ) -> Self {
        Self {
            inner: Rc::new(Inner {
                state: RefCell::new(State {
                    generations: initial_generations,
                    hovered: None,
                    search_query: String::new(),
                }),
                subscribers: Rc::new(RefCell::new(Vec::new())),
                roster,
                layout: Layout::new(geometry, layout),
                segments_memo: RefCell::new(None),
                filtered_memo: RefCell::new(None),
            }),
        }
    }

    pub fn roster(&self) -> &Rc<Roster> {
        &self.inner.roster
    }

    pub fn layout(&self) -> &Layout {
        &self.inner.layout
    }

    pub fn subscribe(&self, subscriber: Subscriber) -> Subscription {
        self.inner.subscribers.borrow_mut().push(Rc::clone(&subscriber));
        Subscription {
            subscriber,
            subscribers: Rc::clone(&self.inner.subscribers),
        }
    }

    pub fn subscriber_count(&self) -> usize {
        self.inner.subscribers.borrow().len()
    }

    fn notify(&self, change: Change) {
        // Snapshot so callbacks can subscribe/unsubscribe while we iterate.
        let subscribers = self.inner.subscribers.borrow().clone();
        for subscriber in subscribers {
            (subscriber)(change);
        }
    }

    pub fn generations(&self) -> f64 {
        self.inner.state.borrow().generations
    }

    /// Tier count handed to the layout: one extra, not yet populated, tier.
    pub fn generations_in_pyramid(&self) -> f64 {
        self.generations() + 1.0
    }

    pub fn set_generations(&self, value: f64) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.generations == value {
                return;
            }
            state.generations = value;
        }
        self.notify(Change::Generations);
    }

    pub fn hovered(&self) -> Option<HoveredProfile> {
        self.inner.state.borrow().hovered.clone()
    }

    pub fn is_hovered(&self, username: &str) -> bool {
        self.inner
            .state
            .borrow()
            .hovered
            .as_ref()
            .is_some_and(|h| h.username == username)
    }

    pub fn set_hovered(&self, hovered: Option<HoveredProfile>) {
        {
            let mut state = self.inner.state.borrow_mut();
            if state.hovered == hovered {
                return;
            }
            state.hovered = hovered;
        }
        self.notify(Change::Hovered);
    }

    pub fn search_query(&self) -> String {
        self.inner.state.borrow().search_query.clone()
    }

    pub fn set_search_query(&self, query: impl Into<String>) {
        let query = query.into();
        {
            let mut state = self.inner.state.borrow_mut();
            if state.search_query == query {
                return;
            }
            state.search_query = query;
        }
        self.notify(Change::SearchQuery);
    }

    /// Segments for the current generation count.
    pub fn segments(&self) -> Rc<[Segment]> {
        let count = self.generations_in_pyramid();
        let key = count.to_bits();
        if let Some((memo_key, segments)) = self.inner.segments_memo.borrow().as_ref() {
            if *memo_key == key {
                return Rc::clone(segments);
            }
        }
        let segments: Rc<[Segment]> = self.inner.layout.segments(count).into();
        *self.inner.segments_memo.borrow_mut() = Some((key, Rc::clone(&segments)));
        segments
    }

    /// Roster filtered by the current search query.
    pub fn filtered_loyalists(&self) -> Rc<FilteredLoyalists> {
        let query = self.search_query();
        if let Some((memo_query, filtered)) = self.inner.filtered_memo.borrow().as_ref() {
            if *memo_query == query {
                return Rc::clone(filtered);
            }
        }
        let roster = &self.inner.roster;
        let filtered = Rc::new(FilteredLoyalists::new(
            &roster.dataset,
            &roster.directory,
            &query,
        ));
        *self.inner.filtered_memo.borrow_mut() = Some((query, Rc::clone(&filtered)));
        filtered
    }
}

/// Keeps a subscriber registered; dropping it unsubscribes.
pub struct Subscription {
    subscriber: Subscriber,
    subscribers: Rc<RefCell<Vec<Subscriber>>>,
}

impl Drop for Subscription {
    fn drop(&mut self) {
        let mut subscribers = self.subscribers.borrow_mut();
        subscribers.retain(|item| !Rc::ptr_eq(item, &self.subscriber));
    }
}
