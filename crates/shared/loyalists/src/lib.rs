//! Loyalist roster: generations of usernames plus their display names and avatars.
//!
//! The roster is loaded once at startup and treated as read-only afterwards.
//! Generation numbers are 1-based everywhere in the public API; storage is 0-based.

pub mod dataset;
pub mod directory;
pub mod search;
pub mod validate;

pub use dataset::{Dataset, DatasetError, Roster};
pub use directory::Directory;
pub use search::{is_blank_query, FilteredLoyalists};
pub use validate::ValidationReport;
