//! Domain types and services for the character viewer.
//!
//! Purpose: model catalogue records, navigation state and the query cache
//! that binds them, independently of HTTP on either side.
//!
//! Public surface:
//! - `character`: catalogue records and identifiers.
//! - `navigation`: URL-derived screen state and transitions.
//! - `ports`: the catalogue read port and its fixture implementation.
//! - `query_cache`: keyed single-flight cache exposing tri-state results.
//! - `viewer`: service resolving navigation state into screens.

pub mod character;
pub mod navigation;
pub mod ports;
pub mod query_cache;
pub mod viewer;

pub use self::character::{Character, CharacterId, CharacterPage, CharacterStatus};
pub use self::navigation::{NavigationIntent, NavigationState, Navigator};
pub use self::viewer::{CharacterViewer, Screen};
