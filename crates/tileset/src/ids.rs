use std::fmt;

use serde::{Deserialize, Serialize};

/// Name of a tile sheet. Tile ids are only unique within one tileset.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TilesetId(String);

impl TilesetId {
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TilesetId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TilesetId {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

impl From<String> for TilesetId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Local index of a cell in a tileset, counted row by row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize,
)]
#[serde(transparent)]
pub struct TileId(pub u32);

impl TileId {
    pub fn row(self, columns: u32) -> u32 {
        self.0 / columns
    }

    pub fn column(self, columns: u32) -> u32 {
        self.0 % columns
    }
}

impl fmt::Display for TileId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Pixel rectangle of one cell inside the sheet image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SourceRect {
    pub x: u32,
    pub y: u32,
    pub width: u32,
    pub height: u32,
}
