mod loader;
mod tsx;
mod types;

pub use loader::{
    load_descriptor_file, parse_json_str, parse_tsx_str, LoadErrorCode, SourceLocation,
    TilesetLoadError,
};
pub use types::{
    AnimationDescriptor, CollisionDescriptor, FrameDescriptor, ShapeDescriptor,
    TilesetDescriptor,
};
