use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::content::ShapeDescriptor;
use crate::error::{ShapeError, TileDataError};
use crate::ids::{TileId, TilesetId};
use crate::registry::TilesetRegistry;

const POLYGON_MIN_VERTICES: usize = 3;
const POLYLINE_MIN_VERTICES: usize = 2;

/// Point in tile-space units, origin at the tile's top-left corner.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }

    fn offset(self, by: Point) -> Point {
        Point::new(self.x + by.x, self.y + by.y)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min: Point,
    pub max: Point,
}

impl Bounds {
    fn around(points: impl IntoIterator<Item = Point>) -> Option<Self> {
        let mut points = points.into_iter();
        let first = points.next()?;
        let mut bounds = Bounds {
            min: first,
            max: first,
        };
        for point in points {
            bounds.min.x = bounds.min.x.min(point.x);
            bounds.min.y = bounds.min.y.min(point.y);
            bounds.max.x = bounds.max.x.max(point.x);
            bounds.max.y = bounds.max.y.max(point.y);
        }
        Some(bounds)
    }

    pub fn width(&self) -> f32 {
        self.max.x - self.min.x
    }

    pub fn height(&self) -> f32 {
        self.max.y - self.min.y
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShapeKind {
    Rect,
    Polygon,
    Polyline,
}

impl ShapeKind {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "rect" => Some(Self::Rect),
            "polygon" => Some(Self::Polygon),
            "polyline" => Some(Self::Polyline),
            _ => None,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Rect => "rect",
            Self::Polygon => "polygon",
            Self::Polyline => "polyline",
        }
    }
}

/// Collision geometry in local tile space. Polygon and polyline vertices are
/// relative to `origin`.
#[derive(Debug, Clone, PartialEq)]
pub enum CollisionShape {
    Rect {
        x: f32,
        y: f32,
        width: f32,
        height: f32,
    },
    Polygon {
        origin: Point,
        points: Vec<Point>,
    },
    Polyline {
        origin: Point,
        points: Vec<Point>,
    },
}

impl CollisionShape {
    pub fn kind(&self) -> ShapeKind {
        match self {
            Self::Rect { .. } => ShapeKind::Rect,
            Self::Polygon { .. } => ShapeKind::Polygon,
            Self::Polyline { .. } => ShapeKind::Polyline,
        }
    }

    /// Vertices with the origin applied. A rect yields its four corners
    /// clockwise from (x, y).
    pub fn vertices(&self) -> Vec<Point> {
        match self {
            Self::Rect {
                x,
                y,
                width,
                height,
            } => vec![
                Point::new(*x, *y),
                Point::new(x + width, *y),
                Point::new(x + width, y + height),
                Point::new(*x, y + height),
            ],
            Self::Polygon { origin, points } | Self::Polyline { origin, points } => {
                points.iter().map(|point| point.offset(*origin)).collect()
            }
        }
    }

    pub fn bounds(&self) -> Option<Bounds> {
        Bounds::around(self.vertices())
    }

    /// Zero-area rects and polygons, and zero-length polylines. Such shapes
    /// never intersect anything.
    pub fn is_degenerate(&self) -> bool {
        match self {
            Self::Rect { width, height, .. } => *width == 0.0 || *height == 0.0,
            Self::Polygon { points, .. } => signed_area(points) == 0.0,
            Self::Polyline { points, .. } => points
                .windows(2)
                .all(|pair| pair[0].x == pair[1].x && pair[0].y == pair[1].y),
        }
    }

    /// Same shape moved by `offset`, e.g. into world space at a tile's
    /// placement.
    pub fn translated(&self, offset: Point) -> CollisionShape {
        match self {
            Self::Rect {
                x,
                y,
                width,
                height,
            } => Self::Rect {
                x: x + offset.x,
                y: y + offset.y,
                width: *width,
                height: *height,
            },
            Self::Polygon { origin, points } => Self::Polygon {
                origin: origin.offset(offset),
                points: points.clone(),
            },
            Self::Polyline { origin, points } => Self::Polyline {
                origin: origin.offset(offset),
                points: points.clone(),
            },
        }
    }
}

fn signed_area(points: &[Point]) -> f32 {
    let mut twice_area = 0.0;
    for (index, a) in points.iter().enumerate() {
        let b = points[(index + 1) % points.len()];
        twice_area += a.x * b.y - b.x * a.y;
    }
    twice_area * 0.5
}

#[derive(Debug, Clone, PartialEq)]
pub struct CollisionPrimitive {
    pub shape: CollisionShape,
    pub class: Option<String>,
}

impl CollisionPrimitive {
    pub fn new(shape: CollisionShape) -> Self {
        Self { shape, class: None }
    }

    pub fn with_class(mut self, class: impl Into<String>) -> Self {
        self.class = non_empty(Some(class.into()));
        self
    }

    pub fn class(&self) -> Option<&str> {
        self.class.as_deref()
    }

    pub(crate) fn from_descriptor(
        index: usize,
        descriptor: &ShapeDescriptor,
    ) -> Result<Self, ShapeError> {
        let Some(kind) = ShapeKind::parse(&descriptor.kind) else {
            return Err(ShapeError::UnknownKind {
                index,
                kind: descriptor.kind.clone(),
            });
        };

        let origin = Point::new(descriptor.x, descriptor.y);
        let shape = match kind {
            ShapeKind::Rect => CollisionShape::Rect {
                x: descriptor.x,
                y: descriptor.y,
                width: descriptor.width,
                height: descriptor.height,
            },
            ShapeKind::Polygon => {
                require_vertices(index, kind, &descriptor.points, POLYGON_MIN_VERTICES)?;
                CollisionShape::Polygon {
                    origin,
                    points: descriptor.points.clone(),
                }
            }
            ShapeKind::Polyline => {
                require_vertices(index, kind, &descriptor.points, POLYLINE_MIN_VERTICES)?;
                CollisionShape::Polyline {
                    origin,
                    points: descriptor.points.clone(),
                }
            }
        };

        let finite = match &shape {
            CollisionShape::Rect {
                x,
                y,
                width,
                height,
            } => [x, y, width, height].iter().all(|value| value.is_finite()),
            CollisionShape::Polygon { origin, points }
            | CollisionShape::Polyline { origin, points } => {
                origin.is_finite() && points.iter().all(|point| point.is_finite())
            }
        };
        if !finite {
            return Err(ShapeError::NonFinite { index });
        }

        Ok(Self {
            shape,
            class: non_empty(descriptor.class.clone()),
        })
    }
}

fn require_vertices(
    index: usize,
    kind: ShapeKind,
    points: &[Point],
    min: usize,
) -> Result<(), ShapeError> {
    if points.len() < min {
        return Err(ShapeError::TooFewVertices {
            index,
            kind: kind.as_str(),
            min,
            found: points.len(),
        });
    }
    Ok(())
}

pub(crate) fn non_empty(label: Option<String>) -> Option<String> {
    label.filter(|value| !value.is_empty())
}

/// All collision geometry attached to one tile id.
#[derive(Debug, Clone, PartialEq)]
pub struct TileCollisionRecord {
    pub(crate) tile: TileId,
    pub(crate) tile_class: Option<String>,
    pub(crate) primitives: Vec<CollisionPrimitive>,
}

impl TileCollisionRecord {
    pub fn tile(&self) -> TileId {
        self.tile
    }

    pub fn tile_class(&self) -> Option<&str> {
        self.tile_class.as_deref()
    }

    pub fn primitives(&self) -> &[CollisionPrimitive] {
        &self.primitives
    }
}

/// Primitive label first, then the tile label. The index never applies this
/// precedence on its own.
pub fn effective_class<'a>(
    primitive: &'a CollisionPrimitive,
    tile_class: Option<&'a str>,
) -> Option<&'a str> {
    primitive.class().or(tile_class)
}

/// Read-only view over the collision tables of a registry.
#[derive(Debug, Clone)]
pub struct CollisionShapeIndex {
    registry: Arc<TilesetRegistry>,
}

impl CollisionShapeIndex {
    pub fn new(registry: Arc<TilesetRegistry>) -> Self {
        Self { registry }
    }

    pub fn shapes_for(
        &self,
        tileset: &TilesetId,
        tile: TileId,
    ) -> Result<&[CollisionPrimitive], TileDataError> {
        Ok(self
            .registry
            .lookup_collision(tileset, tile)?
            .map(TileCollisionRecord::primitives)
            .unwrap_or_default())
    }

    pub fn class_of(
        &self,
        tileset: &TilesetId,
        tile: TileId,
    ) -> Result<Option<&str>, TileDataError> {
        Ok(self
            .registry
            .lookup_collision(tileset, tile)?
            .and_then(TileCollisionRecord::tile_class))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn polygon(points: &[(f32, f32)]) -> ShapeDescriptor {
        ShapeDescriptor::polygon(
            Point::new(0.0, 0.0),
            points.iter().map(|&(x, y)| Point::new(x, y)).collect(),
        )
    }

    #[test]
    fn unknown_kind_is_rejected() {
        let mut descriptor = ShapeDescriptor::rect(0.0, 0.0, 24.0, 24.0);
        descriptor.kind = "ellipse".to_string();
        let err = CollisionPrimitive::from_descriptor(3, &descriptor).expect_err("err");
        assert_eq!(
            err,
            ShapeError::UnknownKind {
                index: 3,
                kind: "ellipse".to_string()
            }
        );
    }

    #[test]
    fn polygon_needs_three_vertices() {
        let err = CollisionPrimitive::from_descriptor(0, &polygon(&[(0.0, 0.0), (1.0, 1.0)]))
            .expect_err("err");
        assert!(matches!(
            err,
            ShapeError::TooFewVertices {
                min: 3,
                found: 2,
                ..
            }
        ));
    }

    #[test]
    fn polyline_needs_two_vertices() {
        let descriptor =
            ShapeDescriptor::polyline(Point::new(1.0, 1.0), vec![Point::new(0.0, 0.0)]);
        let err = CollisionPrimitive::from_descriptor(0, &descriptor).expect_err("err");
        assert!(matches!(err, ShapeError::TooFewVertices { min: 2, .. }));
    }

    #[test]
    fn nan_coordinates_are_rejected() {
        let descriptor = ShapeDescriptor::rect(f32::NAN, 0.0, 24.0, 24.0);
        let err = CollisionPrimitive::from_descriptor(0, &descriptor).expect_err("err");
        assert_eq!(err, ShapeError::NonFinite { index: 0 });
    }

    #[test]
    fn empty_class_becomes_none() {
        let descriptor = ShapeDescriptor::rect(0.0, 0.0, 24.0, 8.0).with_class("");
        let primitive = CollisionPrimitive::from_descriptor(0, &descriptor).expect("primitive");
        assert_eq!(primitive.class(), None);
    }

    #[test]
    fn degenerate_shapes_report_without_panicking() {
        let flat_rect = CollisionShape::Rect {
            x: 0.0,
            y: 0.0,
            width: 24.0,
            height: 0.0,
        };
        let collinear = CollisionShape::Polygon {
            origin: Point::default(),
            points: vec![Point::new(0.0, 0.0), Point::new(1.0, 1.0), Point::new(2.0, 2.0)],
        };
        let dot = CollisionShape::Polyline {
            origin: Point::new(5.0, 5.0),
            points: vec![Point::new(0.0, 0.0), Point::new(0.0, 0.0)],
        };
        for shape in [&flat_rect, &collinear, &dot] {
            assert!(shape.is_degenerate(), "shape={shape:?}");
            assert!(shape.bounds().is_some());
        }
        let ramp = CollisionShape::Polyline {
            origin: Point::default(),
            points: vec![Point::new(0.0, 24.0), Point::new(24.0, 0.0)],
        };
        assert!(!ramp.is_degenerate());
    }

    #[test]
    fn bounds_apply_origin_and_keep_out_of_tile_coordinates() {
        let shape = CollisionShape::Polyline {
            origin: Point::new(4.25, 23.25),
            points: vec![
                Point::new(-0.5, 0.5),
                Point::new(19.75, -23.25),
                Point::new(-4.0, -23.25),
            ],
        };
        let bounds = shape.bounds().expect("bounds");
        assert_eq!(bounds.min, Point::new(0.25, 0.0));
        assert_eq!(bounds.max, Point::new(24.0, 23.75));
        assert_eq!((bounds.width(), bounds.height()), (23.75, 23.75));
    }

    #[test]
    fn translated_moves_origin_only() {
        let shape = CollisionShape::Polygon {
            origin: Point::new(1.0, 2.0),
            points: vec![Point::new(0.0, 0.0), Point::new(4.0, 0.0), Point::new(0.0, 4.0)],
        };
        let moved = shape.translated(Point::new(48.0, 24.0));
        assert_eq!(moved.vertices()[1], Point::new(53.0, 26.0));
        let rect = CollisionShape::Rect {
            x: 0.0,
            y: 16.0,
            width: 24.0,
            height: 8.0,
        }
        .translated(Point::new(24.0, 0.0));
        assert_eq!(
            rect,
            CollisionShape::Rect {
                x: 24.0,
                y: 16.0,
                width: 24.0,
                height: 8.0
            }
        );
    }

    #[test]
    fn effective_class_prefers_primitive_label() {
        let labelled = CollisionPrimitive::new(CollisionShape::Rect {
            x: 0.0,
            y: 0.0,
            width: 1.0,
            height: 1.0,
        })
        .with_class("death");
        let plain = CollisionPrimitive::new(labelled.shape.clone());
        assert_eq!(effective_class(&labelled, Some("ground")), Some("death"));
        assert_eq!(effective_class(&plain, Some("ground")), Some("ground"));
        assert_eq!(effective_class(&plain, None), None);
    }
}
