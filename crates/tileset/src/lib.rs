//! Animation clock and collision-shape lookup for tile sheets.
//!
//! A [`TilesetRegistry`] is filled once from [`TilesetDescriptor`]s and then
//! shared read-only. Renderers and physics code query it through
//! [`TileQueryFacade`]: which sheet cell an animated tile shows at a given
//! simulation time, and which shapes a tile collides with.

mod animation;
mod collision;
pub mod content;
mod error;
mod facade;
mod ids;
mod registry;

pub use animation::{AnimationClock, AnimationFrame, AnimationTrack};
pub use collision::{
    effective_class, Bounds, CollisionPrimitive, CollisionShape, CollisionShapeIndex, Point,
    ShapeKind, TileCollisionRecord,
};
pub use content::{
    load_descriptor_file, AnimationDescriptor, CollisionDescriptor, FrameDescriptor,
    ShapeDescriptor, TilesetDescriptor, TilesetLoadError,
};
pub use error::{ShapeError, TileDataError, TileDataErrorCode, TrackError};
pub use facade::TileQueryFacade;
pub use ids::{SourceRect, TileId, TilesetId};
pub use registry::{SharedRegistry, TilesetEntry, TilesetRegistry};
