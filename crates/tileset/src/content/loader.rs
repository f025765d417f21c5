use std::fmt;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::info;

use super::tsx::parse_tsx_document;
use super::types::TilesetDescriptor;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceLocation {
    pub line: usize,
    pub column: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadErrorCode {
    ReadFile,
    UnsupportedFormat,
    XmlMalformed,
    JsonMalformed,
    InvalidRoot,
    MissingAttribute,
    InvalidValue,
}

#[derive(Debug, Clone)]
pub struct TilesetLoadError {
    pub code: LoadErrorCode,
    pub message: String,
    pub file_path: Option<PathBuf>,
    pub location: Option<SourceLocation>,
}

impl TilesetLoadError {
    pub(crate) fn new(code: LoadErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            file_path: None,
            location: None,
        }
    }

    pub(crate) fn in_file(mut self, path: &Path) -> Self {
        self.file_path = Some(path.to_path_buf());
        self
    }
}

impl fmt::Display for TilesetLoadError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}: {}", self.code, self.message)?;
        match (&self.file_path, self.location) {
            (Some(path), Some(loc)) => write!(
                f,
                " (file={}, line={}, column={})",
                path.display(),
                loc.line,
                loc.column
            ),
            (Some(path), None) => write!(f, " (file={})", path.display()),
            (None, Some(loc)) => write!(f, " (line={}, column={})", loc.line, loc.column),
            (None, None) => Ok(()),
        }
    }
}

impl std::error::Error for TilesetLoadError {}

/// Parses a Tiled `.tsx` document. The tileset is named after its `name`
/// attribute.
pub fn parse_tsx_str(raw: &str) -> Result<TilesetDescriptor, TilesetLoadError> {
    parse_tsx_document(raw, None)
}

pub fn parse_json_str(raw: &str) -> Result<TilesetDescriptor, TilesetLoadError> {
    let deserializer = &mut serde_json::Deserializer::from_str(raw);
    serde_path_to_error::deserialize(deserializer).map_err(|error| {
        let inner = error.inner();
        let location = SourceLocation {
            line: inner.line(),
            column: inner.column(),
        };
        TilesetLoadError {
            code: LoadErrorCode::JsonMalformed,
            message: format!("invalid tileset JSON at '{}': {}", error.path(), inner),
            file_path: None,
            location: Some(location),
        }
    })
}

/// Loads a `.tsx` or `.json` tileset file. A `.tsx` tileset without a `name`
/// attribute is named after the file stem.
pub fn load_descriptor_file(path: &Path) -> Result<TilesetDescriptor, TilesetLoadError> {
    let extension = path
        .extension()
        .and_then(|ext| ext.to_str())
        .map(str::to_ascii_lowercase);
    let is_tsx = match extension.as_deref() {
        Some("tsx") => true,
        Some("json") => false,
        _ => {
            return Err(TilesetLoadError::new(
                LoadErrorCode::UnsupportedFormat,
                "tileset file must end in .tsx or .json".to_string(),
            )
            .in_file(path))
        }
    };

    let raw = fs::read_to_string(path).map_err(|source| {
        TilesetLoadError::new(
            LoadErrorCode::ReadFile,
            format!("failed to read tileset file: {source}"),
        )
        .in_file(path)
    })?;
    let parsed = if is_tsx {
        let stem = path.file_stem().and_then(|stem| stem.to_str());
        parse_tsx_document(&raw, stem)
    } else {
        parse_json_str(&raw)
    };
    let descriptor = parsed.map_err(|error| error.in_file(path))?;

    info!(
        tileset = %descriptor.id,
        path = %path.display(),
        animated_tiles = descriptor.animations.len(),
        collision_tiles = descriptor.collisions.len(),
        "tileset_file_loaded"
    );
    Ok(descriptor)
}
