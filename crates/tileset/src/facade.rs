use std::sync::Arc;

use crate::animation::AnimationClock;
use crate::collision::{CollisionPrimitive, CollisionShapeIndex};
use crate::error::TileDataError;
use crate::ids::{SourceRect, TileId, TilesetId};
use crate::registry::TilesetRegistry;

/// Per-frame entry point for the renderer and the physics step.
///
/// Only answers queries; the registry tables behind it are not reachable
/// through this type.
#[derive(Debug, Clone)]
pub struct TileQueryFacade {
    registry: Arc<TilesetRegistry>,
    clock: AnimationClock,
    shapes: CollisionShapeIndex,
}

impl TileQueryFacade {
    pub fn new(registry: Arc<TilesetRegistry>) -> Self {
        Self {
            clock: AnimationClock::new(Arc::clone(&registry)),
            shapes: CollisionShapeIndex::new(Arc::clone(&registry)),
            registry,
        }
    }

    pub fn draw_source_tile(
        &self,
        tileset: &TilesetId,
        tile: TileId,
        sim_time_ms: i64,
    ) -> Result<TileId, TileDataError> {
        self.clock.resolve(tileset, tile, sim_time_ms)
    }

    /// Sheet pixels to blit for `tile` at `sim_time_ms`.
    pub fn draw_source_rect(
        &self,
        tileset: &TilesetId,
        tile: TileId,
        sim_time_ms: i64,
    ) -> Result<SourceRect, TileDataError> {
        let source = self.clock.resolve(tileset, tile, sim_time_ms)?;
        self.registry.tileset(tileset)?.source_rect(source)
    }

    pub fn collision_shapes(
        &self,
        tileset: &TilesetId,
        tile: TileId,
    ) -> Result<&[CollisionPrimitive], TileDataError> {
        self.shapes.shapes_for(tileset, tile)
    }

    pub fn tile_class(
        &self,
        tileset: &TilesetId,
        tile: TileId,
    ) -> Result<Option<&str>, TileDataError> {
        self.shapes.class_of(tileset, tile)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collision::{CollisionShape, Point};
    use crate::content::{
        AnimationDescriptor, CollisionDescriptor, ShapeDescriptor, TilesetDescriptor,
    };
    use crate::error::TileDataErrorCode;

    fn facade() -> TileQueryFacade {
        let death_ledge = ShapeDescriptor::polygon(
            Point::new(0.0, 16.0),
            vec![
                Point::new(0.0, 0.0),
                Point::new(0.0, 8.0),
                Point::new(24.0, 8.0),
                Point::new(24.0, -16.0),
            ],
        )
        .with_class("deat");
        let mut registry = TilesetRegistry::new();
        registry
            .register(
                TilesetDescriptor::new("platforms", 24, 24, 48, 2304)
                    .with_animation(
                        AnimationDescriptor::new(TileId(48))
                            .frame(TileId(48), 45)
                            .frame(TileId(49), 45)
                            .frame(TileId(50), 45)
                            .frame(TileId(51), 45),
                    )
                    .with_collision(
                        CollisionDescriptor::new(TileId(96))
                            .with_class("death")
                            .shape(death_ledge),
                    ),
            )
            .expect("register");
        TileQueryFacade::new(Arc::new(registry))
    }

    #[test]
    fn draw_source_follows_the_clock() {
        let facade = facade();
        let platforms = TilesetId::from("platforms");
        assert_eq!(
            facade.draw_source_tile(&platforms, TileId(48), 0).expect("tile"),
            TileId(48)
        );
        assert_eq!(
            facade.draw_source_tile(&platforms, TileId(48), 100).expect("tile"),
            TileId(50)
        );
        assert_eq!(
            facade.draw_source_tile(&platforms, TileId(7), 100).expect("tile"),
            TileId(7)
        );
    }

    #[test]
    fn draw_source_rect_points_at_the_resolved_cell() {
        let facade = facade();
        let rect = facade
            .draw_source_rect(&TilesetId::from("platforms"), TileId(48), 135)
            .expect("rect");
        assert_eq!(
            rect,
            SourceRect {
                x: 3 * 24,
                y: 24,
                width: 24,
                height: 24
            }
        );
    }

    #[test]
    fn draw_source_rect_rejects_tiles_outside_the_sheet() {
        let facade = facade();
        let err = facade
            .draw_source_rect(&TilesetId::from("platforms"), TileId(2304), 0)
            .expect_err("err");
        assert_eq!(err.code(), TileDataErrorCode::InvalidTile);
        assert_eq!(
            facade
                .draw_source_tile(&TilesetId::from("platforms"), TileId(2304), 0)
                .expect("tile"),
            TileId(2304)
        );
    }

    #[test]
    fn draw_source_rect_reports_overflow_without_panicking() {
        let mut registry = TilesetRegistry::new();
        registry
            .register(TilesetDescriptor::new("open", 24, 24, 1, 0))
            .expect("register");
        let facade = TileQueryFacade::new(Arc::new(registry));
        let err = facade
            .draw_source_rect(&TilesetId::from("open"), TileId(u32::MAX), 0)
            .expect_err("err");
        assert_eq!(err.code(), TileDataErrorCode::InvalidTile);
    }

    #[test]
    fn negative_time_is_rejected() {
        let facade = facade();
        let err = facade
            .draw_source_tile(&TilesetId::from("platforms"), TileId(48), -1)
            .expect_err("err");
        assert_eq!(err, TileDataError::InvalidTime { time_ms: -1 });
    }

    #[test]
    fn shapes_and_labels_are_kept_apart() {
        let facade = facade();
        let platforms = TilesetId::from("platforms");
        let shapes = facade.collision_shapes(&platforms, TileId(96)).expect("shapes");
        assert_eq!(shapes.len(), 1);
        assert_eq!(shapes[0].class(), Some("deat"));
        assert!(matches!(shapes[0].shape, CollisionShape::Polygon { .. }));
        assert_eq!(
            facade.tile_class(&platforms, TileId(96)).expect("class"),
            Some("death")
        );
        assert!(facade
            .collision_shapes(&platforms, TileId(48))
            .expect("shapes")
            .is_empty());
        assert_eq!(facade.tile_class(&platforms, TileId(48)).expect("class"), None);
    }

    #[test]
    fn unknown_tileset_fails_every_query() {
        let facade = facade();
        let missing = TilesetId::from("missing");
        let codes = [
            facade.draw_source_tile(&missing, TileId(0), 0).map(|_| ()),
            facade.draw_source_rect(&missing, TileId(0), 0).map(|_| ()),
            facade.collision_shapes(&missing, TileId(0)).map(|_| ()),
            facade.tile_class(&missing, TileId(0)).map(|_| ()),
        ]
        .into_iter()
        .map(|result| result.expect_err("err").code())
        .collect::<Vec<_>>();
        assert!(codes
            .iter()
            .all(|code| *code == TileDataErrorCode::UnknownTileset));
    }
}
