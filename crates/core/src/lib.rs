//! # pyramid
//!
//! Layout and interaction engine for the loyalist pyramid: a stack of trapezoid
//! tiers, one per generation, that grows as the viewer scrolls deeper.
//!
//! ## Quick Start
//!
//! ```
//! use pyramid::prelude::*;
//!
//! let roster = Roster::from_json(
//!     r#"{"generations": [["apex"], ["ann", "bob"], ["cat"], ["dan"], ["eve"]]}"#,
//! )
//! .unwrap();
//! let mut session = Session::new(roster, PyramidConfig::default()).unwrap();
//!
//! // Wheel down, then let the frame loop run.
//! session.wheel(250.0, 0.0);
//! session.tick(16.0);
//! assert!(session.store().generations() > 4.0);
//!
//! let svg = session.scene().to_svg();
//! assert!(svg.contains("Gen IV"));
//! ```
//!
//! ## Feature Flags
//!
//! - `std` (default): enables the `pyramid-cli` binary
//! - `serde` (default): serialization of the configuration structs
//!
//! ## Modules
//!
//! - [`layout`]: segment heights and trapezoid geometry
//! - [`controller`]: tweening, wheel/touch handling, hover-driven scrolls
//! - [`store`]: observable shared state
//! - [`hover`] and [`session`]: hover/selection state machine and its wiring
//! - [`placement`], [`scene`], [`list`]: presentation models

#[path = "core/config.rs"]
pub mod config;

#[path = "core/layout.rs"]
pub mod layout;

#[path = "core/tween.rs"]
pub mod tween;

#[path = "core/schedule.rs"]
pub mod schedule;

#[path = "core/store.rs"]
pub mod store;

#[path = "core/controller.rs"]
pub mod controller;

#[path = "core/hover.rs"]
pub mod hover;

#[path = "core/placement.rs"]
pub mod placement;

#[path = "core/scene.rs"]
pub mod scene;

#[path = "core/list.rs"]
pub mod list;

#[path = "core/session.rs"]
pub mod session;

pub use loyalists;

/// Prelude module for convenient imports.
///
/// ```
/// use pyramid::prelude::*;
/// ```
pub mod prelude {
    pub use crate::config::{
        InteractionConfig, LayoutConfig, PlacementConfig, PyramidConfig, PyramidGeometry,
    };
    pub use crate::controller::{apply_overscroll, Controller, Gesture, ScrollSchedule};
    pub use crate::hover::LiftTarget;
    pub use crate::layout::{Layout, Segment};
    pub use crate::list::{ListView, ScrollMetrics, Span};
    pub use crate::placement::{AvatarPlacement, AvatarPlacer};
    pub use crate::scene::{to_roman, Scene, SceneItem};
    pub use crate::session::{Reaction, Session, SessionError};
    pub use crate::store::{Change, HoveredProfile, Origin, Store, Subscription};
    pub use crate::tween::ease_in_out_cubic;
    pub use loyalists::{Dataset, DatasetError, Directory, Roster};
}
