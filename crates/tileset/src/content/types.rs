use serde::{Deserialize, Serialize};

use crate::collision::Point;
use crate::ids::{TileId, TilesetId};

/// Parsed tileset as handed over by a loader, before validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TilesetDescriptor {
    pub id: TilesetId,
    pub tile_width: u32,
    pub tile_height: u32,
    pub columns: u32,
    pub tile_count: u32,
    #[serde(default)]
    pub spacing: u32,
    #[serde(default)]
    pub margin: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    #[serde(default)]
    pub animations: Vec<AnimationDescriptor>,
    #[serde(default)]
    pub collisions: Vec<CollisionDescriptor>,
}

impl TilesetDescriptor {
    pub fn new(
        id: impl Into<TilesetId>,
        tile_width: u32,
        tile_height: u32,
        columns: u32,
        tile_count: u32,
    ) -> Self {
        Self {
            id: id.into(),
            tile_width,
            tile_height,
            columns,
            tile_count,
            spacing: 0,
            margin: 0,
            image: None,
            animations: Vec::new(),
            collisions: Vec::new(),
        }
    }

    pub fn with_animation(mut self, animation: AnimationDescriptor) -> Self {
        self.animations.push(animation);
        self
    }

    pub fn with_collision(mut self, collision: CollisionDescriptor) -> Self {
        self.collisions.push(collision);
        self
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnimationDescriptor {
    pub tile: TileId,
    pub frames: Vec<FrameDescriptor>,
}

impl AnimationDescriptor {
    pub fn new(tile: TileId) -> Self {
        Self {
            tile,
            frames: Vec::new(),
        }
    }

    pub fn frame(mut self, tile: TileId, duration_ms: i64) -> Self {
        self.frames.push(FrameDescriptor { tile, duration_ms });
        self
    }
}

/// Signed so that zero and negative durations in source data survive parsing
/// and are rejected by registration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDescriptor {
    pub tile: TileId,
    pub duration_ms: i64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CollisionDescriptor {
    pub tile: TileId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default)]
    pub shapes: Vec<ShapeDescriptor>,
}

impl CollisionDescriptor {
    pub fn new(tile: TileId) -> Self {
        Self {
            tile,
            class: None,
            shapes: Vec::new(),
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }

    pub fn shape(mut self, shape: ShapeDescriptor) -> Self {
        self.shapes.push(shape);
        self
    }
}

/// One shape as written in source data. `kind` is kept as text so that kinds
/// the resolver does not support reach validation instead of vanishing here.
///
/// For rects `x`/`y`/`width`/`height` describe the box; for polygons and
/// polylines `x`/`y` is the origin the `points` are relative to.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShapeDescriptor {
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub class: Option<String>,
    #[serde(default)]
    pub x: f32,
    #[serde(default)]
    pub y: f32,
    #[serde(default)]
    pub width: f32,
    #[serde(default)]
    pub height: f32,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub points: Vec<Point>,
}

impl ShapeDescriptor {
    pub fn rect(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            kind: "rect".to_string(),
            class: None,
            x,
            y,
            width,
            height,
            points: Vec::new(),
        }
    }

    pub fn polygon(origin: Point, points: Vec<Point>) -> Self {
        Self::with_points("polygon", origin, points)
    }

    pub fn polyline(origin: Point, points: Vec<Point>) -> Self {
        Self::with_points("polyline", origin, points)
    }

    fn with_points(kind: &str, origin: Point, points: Vec<Point>) -> Self {
        Self {
            kind: kind.to_string(),
            class: None,
            x: origin.x,
            y: origin.y,
            width: 0.0,
            height: 0.0,
            points,
        }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = Some(class.into());
        self
    }
}
