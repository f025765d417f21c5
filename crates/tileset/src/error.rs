use thiserror::Error;

use crate::ids::{TileId, TilesetId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TileDataErrorCode {
    DuplicateTileset,
    UnknownTileset,
    InvalidTileset,
    InvalidTrack,
    InvalidShape,
    InvalidTime,
    InvalidTile,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TrackError {
    #[error("animation has no frames")]
    EmptyFrames,
    #[error("frame {index} has non-positive duration {duration_ms} ms")]
    NonPositiveDuration { index: usize, duration_ms: i64 },
    #[error("frame {index} duration {duration_ms} ms does not fit in 32 bits")]
    DurationTooLong { index: usize, duration_ms: i64 },
    #[error("frame {index} shows tile {source_tile}, outside the sheet of {tile_count} tiles")]
    SourceOutOfRange {
        index: usize,
        source_tile: TileId,
        tile_count: u32,
    },
    #[error("base tile is outside the sheet of {tile_count} tiles")]
    BaseOutOfRange { tile_count: u32 },
    #[error("tile already has an animation")]
    DuplicateTrack,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShapeError {
    #[error("shape {index} has unsupported kind '{kind}'; allowed kinds: rect, polygon, polyline")]
    UnknownKind { index: usize, kind: String },
    #[error("shape {index} ({kind}) needs at least {min} vertices, found {found}")]
    TooFewVertices {
        index: usize,
        kind: &'static str,
        min: usize,
        found: usize,
    },
    #[error("shape {index} has a non-finite coordinate")]
    NonFinite { index: usize },
    #[error("tile is outside the sheet of {tile_count} tiles")]
    TileOutOfRange { tile_count: u32 },
    #[error("tile already has a collision record")]
    DuplicateRecord,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TileDataError {
    #[error("tileset '{tileset}' is already registered")]
    DuplicateTileset { tileset: TilesetId },
    #[error("tileset '{tileset}' is not registered")]
    UnknownTileset { tileset: TilesetId },
    #[error("tileset '{tileset}' is invalid: {reason}")]
    InvalidTileset { tileset: TilesetId, reason: String },
    #[error("invalid animation for tile {tile} in tileset '{tileset}': {source}")]
    InvalidTrack {
        tileset: TilesetId,
        tile: TileId,
        #[source]
        source: TrackError,
    },
    #[error("invalid collision shape for tile {tile} in tileset '{tileset}': {source}")]
    InvalidShape {
        tileset: TilesetId,
        tile: TileId,
        #[source]
        source: ShapeError,
    },
    #[error("simulation time must not be negative, got {time_ms} ms")]
    InvalidTime { time_ms: i64 },
    #[error("tile {tile} in tileset '{tileset}' has no source rectangle: {reason}")]
    InvalidTile {
        tileset: TilesetId,
        tile: TileId,
        reason: String,
    },
}

impl TileDataError {
    pub fn code(&self) -> TileDataErrorCode {
        match self {
            Self::DuplicateTileset { .. } => TileDataErrorCode::DuplicateTileset,
            Self::UnknownTileset { .. } => TileDataErrorCode::UnknownTileset,
            Self::InvalidTileset { .. } => TileDataErrorCode::InvalidTileset,
            Self::InvalidTrack { .. } => TileDataErrorCode::InvalidTrack,
            Self::InvalidShape { .. } => TileDataErrorCode::InvalidShape,
            Self::InvalidTime { .. } => TileDataErrorCode::InvalidTime,
            Self::InvalidTile { .. } => TileDataErrorCode::InvalidTile,
        }
    }

    pub(crate) fn unknown_tileset(tileset: &TilesetId) -> Self {
        Self::UnknownTileset {
            tileset: tileset.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_tileset_and_tile() {
        let err = TileDataError::InvalidTrack {
            tileset: TilesetId::from("sparks"),
            tile: TileId(21),
            source: TrackError::NonPositiveDuration {
                index: 2,
                duration_ms: 0,
            },
        };
        assert_eq!(err.code(), TileDataErrorCode::InvalidTrack);
        assert_eq!(
            err.to_string(),
            "invalid animation for tile 21 in tileset 'sparks': frame 2 has non-positive duration 0 ms"
        );
    }
}
