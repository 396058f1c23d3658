//! `abm-spatial` — the Spatial Model: buildings, floors, rooms, doors, and
//! routing over the door graph.
//!
//! # Crate layout
//!
//! | Module      | Contents                                                        |
//! |-------------|-----------------------------------------------------------------|
//! | [`space`]   | `Space`, `Building`, `Floor`, `Room`, `Door`, `Component`, kinds |
//! | [`builder`] | `SpaceBuilder` — incremental, validated construction            |
//! | [`router`]  | `Router` trait, `Path`, `DijkstraRouter`                        |
//! | [`layout`]  | `LayoutSpec` + JSON loading of hierarchical layouts             |
//! | [`error`]   | `SpatialError`, `SpatialResult<T>`                              |
//!
//! # Lifecycle
//!
//! A `Space` is built once through [`SpaceBuilder`] (or from a
//! [`LayoutSpec`]) and is read-only afterwards.  All structural validation
//! happens in the builder, so runtime queries never fail on missing
//! topology, only on genuinely unreachable targets.

pub mod builder;
pub mod error;
pub mod layout;
pub mod router;
pub mod space;


pub use builder::SpaceBuilder;
pub use error::{SpatialError, SpatialResult};
pub use layout::{load_layout_json, load_layout_reader, LayoutSpec};
pub use router::{DijkstraRouter, Path, Router};
pub use space::{
    Attachment, Building, Component, ComponentKind, Door, DoorKind, DoorSpec, Floor, Hop, Room,
    RoomType, Space,
};
