use std::sync::Arc;

use crate::content::AnimationDescriptor;
use crate::error::{TileDataError, TrackError};
use crate::ids::{TileId, TilesetId};
use crate::registry::TilesetRegistry;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AnimationFrame {
    pub source_tile: TileId,
    pub duration_ms: u32,
}

/// Looping frame sequence shown in place of `base_tile`.
///
/// Frame start offsets are computed once so that picking the frame for a
/// point in time is a binary search over integers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationTrack {
    base_tile: TileId,
    frames: Vec<AnimationFrame>,
    frame_starts: Vec<u64>,
    cycle_length_ms: u64,
}

impl AnimationTrack {
    pub fn new(base_tile: TileId, frames: Vec<AnimationFrame>) -> Result<Self, TrackError> {
        if frames.is_empty() {
            return Err(TrackError::EmptyFrames);
        }

        let mut frame_starts = Vec::with_capacity(frames.len());
        let mut cycle_length_ms = 0u64;
        for (index, frame) in frames.iter().enumerate() {
            if frame.duration_ms == 0 {
                return Err(TrackError::NonPositiveDuration {
                    index,
                    duration_ms: 0,
                });
            }
            frame_starts.push(cycle_length_ms);
            cycle_length_ms += u64::from(frame.duration_ms);
        }

        Ok(Self {
            base_tile,
            frames,
            frame_starts,
            cycle_length_ms,
        })
    }

    pub(crate) fn from_descriptor(descriptor: &AnimationDescriptor) -> Result<Self, TrackError> {
        let mut frames = Vec::with_capacity(descriptor.frames.len());
        for (index, frame) in descriptor.frames.iter().enumerate() {
            if frame.duration_ms <= 0 {
                return Err(TrackError::NonPositiveDuration {
                    index,
                    duration_ms: frame.duration_ms,
                });
            }
            let duration_ms =
                u32::try_from(frame.duration_ms).map_err(|_| TrackError::DurationTooLong {
                    index,
                    duration_ms: frame.duration_ms,
                })?;
            frames.push(AnimationFrame {
                source_tile: frame.tile,
                duration_ms,
            });
        }
        Self::new(descriptor.tile, frames)
    }

    pub fn base_tile(&self) -> TileId {
        self.base_tile
    }

    pub fn frames(&self) -> &[AnimationFrame] {
        &self.frames
    }

    /// Start of each frame within one cycle; the first is always 0.
    pub fn frame_starts(&self) -> &[u64] {
        &self.frame_starts
    }

    pub fn cycle_length_ms(&self) -> u64 {
        self.cycle_length_ms
    }

    /// Index of the frame visible at `time_ms`. Frame intervals are half-open,
    /// so a time on a boundary belongs to the later frame and a whole number of
    /// cycles folds back to frame 0.
    pub fn frame_index_at(&self, time_ms: u64) -> usize {
        let phase = time_ms % self.cycle_length_ms;
        self.frame_starts.partition_point(|&start| start <= phase) - 1
    }

    pub fn source_at(&self, time_ms: u64) -> TileId {
        self.frames[self.frame_index_at(time_ms)].source_tile
    }
}

/// Picks the sheet cell to draw for a tile from absolute simulation time.
///
/// There is no per-tile state: the answer depends only on the arguments, so
/// seeking, pausing or replaying the clock reproduces the same frames.
#[derive(Debug, Clone)]
pub struct AnimationClock {
    registry: Arc<TilesetRegistry>,
}

impl AnimationClock {
    pub fn new(registry: Arc<TilesetRegistry>) -> Self {
        Self { registry }
    }

    pub fn resolve(
        &self,
        tileset: &TilesetId,
        base_tile: TileId,
        sim_time_ms: i64,
    ) -> Result<TileId, TileDataError> {
        let time_ms = u64::try_from(sim_time_ms).map_err(|_| TileDataError::InvalidTime {
            time_ms: sim_time_ms,
        })?;
        Ok(match self.registry.lookup_animation(tileset, base_tile)? {
            Some(track) => track.source_at(time_ms),
            None => base_tile,
        })
    }
}
