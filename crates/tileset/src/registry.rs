use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use tracing::{info, warn};

use crate::animation::AnimationTrack;
use crate::collision::{non_empty, CollisionPrimitive, TileCollisionRecord};
use crate::content::TilesetDescriptor;
use crate::error::{ShapeError, TileDataError, TrackError};
use crate::ids::{SourceRect, TileId, TilesetId};

/// Validated, immutable tables for one tile sheet.
#[derive(Debug, Clone)]
pub struct TilesetEntry {
    id: TilesetId,
    tile_width: u32,
    tile_height: u32,
    columns: u32,
    tile_count: u32,
    spacing: u32,
    margin: u32,
    image: Option<String>,
    animations: HashMap<TileId, AnimationTrack>,
    collisions: HashMap<TileId, TileCollisionRecord>,
}

impl TilesetEntry {
    /// Validates every record of `descriptor`. Nothing is kept if any record
    /// is rejected.
    pub fn from_descriptor(descriptor: TilesetDescriptor) -> Result<Self, TileDataError> {
        let TilesetDescriptor {
            id,
            tile_width,
            tile_height,
            columns,
            tile_count,
            spacing,
            margin,
            image,
            animations: animation_descriptors,
            collisions: collision_descriptors,
        } = descriptor;

        if columns == 0 || tile_width == 0 || tile_height == 0 {
            return Err(TileDataError::InvalidTileset {
                tileset: id,
                reason: format!(
                    "columns and tile size must be non-zero (columns={columns}, tile_size={tile_width}x{tile_height})"
                ),
            });
        }
        // A tile count of zero means the sheet size is unknown and ids are not range checked.
        let in_sheet = |tile: TileId| tile_count == 0 || tile.0 < tile_count;

        let mut animations = HashMap::with_capacity(animation_descriptors.len());
        for animation in &animation_descriptors {
            let invalid = |source: TrackError| TileDataError::InvalidTrack {
                tileset: id.clone(),
                tile: animation.tile,
                source,
            };
            if !in_sheet(animation.tile) {
                return Err(invalid(TrackError::BaseOutOfRange { tile_count }));
            }
            let track = AnimationTrack::from_descriptor(animation).map_err(invalid)?;
            if let Some((index, frame)) = track
                .frames()
                .iter()
                .enumerate()
                .find(|(_, frame)| !in_sheet(frame.source_tile))
            {
                return Err(invalid(TrackError::SourceOutOfRange {
                    index,
                    source_tile: frame.source_tile,
                    tile_count,
                }));
            }
            if animations.insert(animation.tile, track).is_some() {
                return Err(invalid(TrackError::DuplicateTrack));
            }
        }

        let mut collisions = HashMap::with_capacity(collision_descriptors.len());
        for record in collision_descriptors {
            let invalid = |source: ShapeError| TileDataError::InvalidShape {
                tileset: id.clone(),
                tile: record.tile,
                source,
            };
            if !in_sheet(record.tile) {
                return Err(invalid(ShapeError::TileOutOfRange { tile_count }));
            }
            let primitives = record
                .shapes
                .iter()
                .enumerate()
                .map(|(index, shape)| CollisionPrimitive::from_descriptor(index, shape))
                .collect::<Result<Vec<_>, _>>()
                .map_err(invalid)?;
            let parsed = TileCollisionRecord {
                tile: record.tile,
                tile_class: non_empty(record.class.clone()),
                primitives,
            };
            if collisions.insert(record.tile, parsed).is_some() {
                return Err(invalid(ShapeError::DuplicateRecord));
            }
        }

        Ok(Self {
            id,
            tile_width,
            tile_height,
            columns,
            tile_count,
            spacing,
            margin,
            image,
            animations,
            collisions,
        })
    }

    pub fn id(&self) -> &TilesetId {
        &self.id
    }

    pub fn tile_size(&self) -> (u32, u32) {
        (self.tile_width, self.tile_height)
    }

    pub fn columns(&self) -> u32 {
        self.columns
    }

    pub fn tile_count(&self) -> u32 {
        self.tile_count
    }

    pub fn image(&self) -> Option<&str> {
        self.image.as_deref()
    }

    pub fn animation(&self, tile: TileId) -> Option<&AnimationTrack> {
        self.animations.get(&tile)
    }

    pub fn collision(&self, tile: TileId) -> Option<&TileCollisionRecord> {
        self.collisions.get(&tile)
    }

    pub fn animation_count(&self) -> usize {
        self.animations.len()
    }

    pub fn collision_count(&self) -> usize {
        self.collisions.len()
    }

    /// Tiles with an animation, in ascending id order.
    pub fn animated_tiles(&self) -> Vec<TileId> {
        sorted_keys(&self.animations)
    }

    /// Tiles with collision data, in ascending id order.
    pub fn collision_tiles(&self) -> Vec<TileId> {
        sorted_keys(&self.collisions)
    }

    /// Pixel rectangle of `tile` inside the sheet image. Fails for ids past
    /// a known tile count and for offsets that do not fit in `u32`.
    pub fn source_rect(&self, tile: TileId) -> Result<SourceRect, TileDataError> {
        let invalid = |reason: String| TileDataError::InvalidTile {
            tileset: self.id.clone(),
            tile,
            reason,
        };
        if self.tile_count != 0 && tile.0 >= self.tile_count {
            return Err(invalid(format!("outside the sheet of {} tiles", self.tile_count)));
        }

        let offset = |index: u32, size: u32| {
            size
                .checked_add(self.spacing)
                .and_then(|stride| index.checked_mul(stride))
                .and_then(|start| start.checked_add(self.margin))
        };
        match (
            offset(tile.column(self.columns), self.tile_width),
            offset(tile.row(self.columns), self.tile_height),
        ) {
            (Some(x), Some(y)) => Ok(SourceRect {
                x,
                y,
                width: self.tile_width,
                height: self.tile_height,
            }),
            _ => Err(invalid("pixel offset overflows u32".to_string())),
        }
    }
}

fn sorted_keys<V>(table: &HashMap<TileId, V>) -> Vec<TileId> {
    let mut keys = table.keys().copied().collect::<Vec<_>>();
    keys.sort_unstable();
    keys
}

/// Owner of all registered tilesets. Build it at load time, then share it
/// read-only (usually behind an `Arc`).
#[derive(Debug, Default, Clone)]
pub struct TilesetRegistry {
    tilesets: HashMap<TilesetId, TilesetEntry>,
}

impl TilesetRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, descriptor: TilesetDescriptor) -> Result<(), TileDataError> {
        if self.tilesets.contains_key(&descriptor.id) {
            let err = TileDataError::DuplicateTileset {
                tileset: descriptor.id,
            };
            warn!(error = %err, "tileset_registration_rejected");
            return Err(err);
        }

        let entry = TilesetEntry::from_descriptor(descriptor).map_err(|err| {
            warn!(error = %err, code = ?err.code(), "tileset_registration_rejected");
            err
        })?;
        info!(
            tileset = %entry.id,
            columns = entry.columns,
            tile_count = entry.tile_count,
            animated_tiles = entry.animation_count(),
            collision_tiles = entry.collision_count(),
            "tileset_registered"
        );
        self.tilesets.insert(entry.id.clone(), entry);
        Ok(())
    }

    pub fn tileset(&self, tileset: &TilesetId) -> Result<&TilesetEntry, TileDataError> {
        self.tilesets
            .get(tileset)
            .ok_or_else(|| TileDataError::unknown_tileset(tileset))
    }

    pub fn contains(&self, tileset: &TilesetId) -> bool {
        self.tilesets.contains_key(tileset)
    }

    pub fn len(&self) -> usize {
        self.tilesets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tilesets.is_empty()
    }

    pub fn tileset_ids(&self) -> Vec<&TilesetId> {
        let mut ids = self.tilesets.keys().collect::<Vec<_>>();
        ids.sort();
        ids
    }

    /// `Ok(None)` for a static tile of a known tileset.
    pub fn lookup_animation(
        &self,
        tileset: &TilesetId,
        tile: TileId,
    ) -> Result<Option<&AnimationTrack>, TileDataError> {
        Ok(self.tileset(tileset)?.animation(tile))
    }

    /// `Ok(None)` for a tile of a known tileset that has no collision data.
    pub fn lookup_collision(
        &self,
        tileset: &TilesetId,
        tile: TileId,
    ) -> Result<Option<&TileCollisionRecord>, TileDataError> {
        Ok(self.tileset(tileset)?.collision(tile))
    }
}

/// Published registry that readers snapshot and reloads replace wholesale.
///
/// Readers clone the current `Arc` and query it without holding the lock, so
/// a swap never changes tables under a reader that is mid-frame.
#[derive(Debug, Default)]
pub struct SharedRegistry {
    current: RwLock<Arc<TilesetRegistry>>,
}

impl SharedRegistry {
    pub fn new(registry: TilesetRegistry) -> Self {
        Self {
            current: RwLock::new(Arc::new(registry)),
        }
    }

    pub fn snapshot(&self) -> Arc<TilesetRegistry> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Publishes `registry` and returns the one it replaced.
    pub fn swap(&self, registry: TilesetRegistry) -> Arc<TilesetRegistry> {
        let next = Arc::new(registry);
        let tileset_count = next.len();
        let previous = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            std::mem::replace(&mut *current, next)
        };
        info!(
            tileset_count,
            previous_tileset_count = previous.len(),
            "registry_swapped"
        );
        previous
    }
}
