use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use thiserror::Error;
use tileset::{
    load_descriptor_file, CollisionShape, TileDataError, TileId, TileQueryFacade,
    TilesetDescriptor, TilesetId, TilesetLoadError, TilesetRegistry,
};
use tracing::debug;

pub const LOG_ENV_VAR: &str = "TILESET_PROBE_LOG";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandKind {
    Summary { paths: Vec<PathBuf> },
    Frame {
        path: PathBuf,
        tile: TileId,
        time_ms: i64,
    },
    Timeline { path: PathBuf, tile: TileId },
    Shapes { path: PathBuf, tile: TileId },
    Dump { path: PathBuf },
}

impl CommandKind {
    fn name(&self) -> &'static str {
        match self {
            Self::Summary { .. } => "summary",
            Self::Frame { .. } => "frame",
            Self::Timeline { .. } => "timeline",
            Self::Shapes { .. } => "shapes",
            Self::Dump { .. } => "dump",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Invocation {
    Help,
    Run {
        log_filter: Option<String>,
        command: CommandKind,
    },
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error(transparent)]
    Load(#[from] TilesetLoadError),
    #[error(transparent)]
    TileData(#[from] TileDataError),
    #[error("failed to encode tileset as JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("failed to write output: {0}")]
    Output(#[from] io::Error),
}

pub fn parse_args(args: &[String]) -> Result<Invocation, String> {
    if args.is_empty() {
        return Err(usage_text());
    }
    if args[0] == "-h" || args[0] == "--help" {
        return Ok(Invocation::Help);
    }

    let mut log_filter = None;
    let mut index = 0usize;
    while index < args.len() {
        match args[index].as_str() {
            "--log" => {
                let value = args
                    .get(index + 1)
                    .ok_or_else(|| "missing value for --log".to_string())?;
                log_filter = Some(value.clone());
                index += 2;
            }
            _ => break,
        }
    }

    let command = args
        .get(index)
        .ok_or_else(|| "missing subcommand".to_string())?
        .as_str();
    let command_args = &args[(index + 1)..];

    let command = match command {
        "summary" => {
            if command_args.is_empty() {
                return Err("summary requires at least one tileset file".to_string());
            }
            CommandKind::Summary {
                paths: command_args.iter().map(PathBuf::from).collect(),
            }
        }
        "frame" => {
            let [path, tile, time_ms] = command_args else {
                return Err("frame requires <file> <tile> <time_ms>".to_string());
            };
            CommandKind::Frame {
                path: PathBuf::from(path),
                tile: parse_tile(tile)?,
                time_ms: time_ms
                    .parse::<i64>()
                    .map_err(|_| format!("invalid time_ms value '{time_ms}' (expected i64)"))?,
            }
        }
        "timeline" => {
            let [path, tile] = command_args else {
                return Err("timeline requires <file> <tile>".to_string());
            };
            CommandKind::Timeline {
                path: PathBuf::from(path),
                tile: parse_tile(tile)?,
            }
        }
        "shapes" => {
            let [path, tile] = command_args else {
                return Err("shapes requires <file> <tile>".to_string());
            };
            CommandKind::Shapes {
                path: PathBuf::from(path),
                tile: parse_tile(tile)?,
            }
        }
        "dump" => {
            let [path] = command_args else {
                return Err("dump requires exactly one tileset file".to_string());
            };
            CommandKind::Dump {
                path: PathBuf::from(path),
            }
        }
        other => return Err(format!("unknown subcommand '{other}'")),
    };

    Ok(Invocation::Run {
        log_filter,
        command,
    })
}

fn parse_tile(raw: &str) -> Result<TileId, String> {
    raw.parse::<u32>()
        .map(TileId)
        .map_err(|_| format!("invalid tile value '{raw}' (expected u32)"))
}

pub fn usage_text() -> String {
    [
        "tileset_probe - inspect tile animations and collision shapes",
        "",
        "Usage:",
        "  tileset_probe [--log <filter>] summary <file>...",
        "  tileset_probe [--log <filter>] frame <file> <tile> <time_ms>",
        "  tileset_probe [--log <filter>] timeline <file> <tile>",
        "  tileset_probe [--log <filter>] shapes <file> <tile>",
        "  tileset_probe [--log <filter>] dump <file>",
        "",
        "Files are Tiled .tsx tilesets or .json tileset descriptors.",
        "",
        "Logging:",
        "  --log overrides TILESET_PROBE_LOG, which overrides RUST_LOG (default: info)",
    ]
    .join("\n")
}

pub fn run<W: Write>(kind: CommandKind, stdout: &mut W) -> Result<(), ProbeError> {
    debug!(command = kind.name(), "probe_command_started");
    match kind {
        CommandKind::Summary { paths } => {
            let mut registry = TilesetRegistry::new();
            let mut ids = Vec::with_capacity(paths.len());
            for path in &paths {
                let descriptor = load_descriptor_file(path)?;
                ids.push(descriptor.id.clone());
                registry.register(descriptor)?;
            }
            for id in &ids {
                let entry = registry.tileset(id)?;
                let (tile_width, tile_height) = entry.tile_size();
                writeln!(
                    stdout,
                    "tileset={} tile_size={}x{} columns={} tiles={} animated={} collision={} image={}",
                    entry.id(),
                    tile_width,
                    tile_height,
                    entry.columns(),
                    entry.tile_count(),
                    entry.animation_count(),
                    entry.collision_count(),
                    entry.image().unwrap_or("-"),
                )?;
            }
        }
        CommandKind::Frame {
            path,
            tile,
            time_ms,
        } => {
            let (id, facade, _) = load_single(&path)?;
            let source = facade.draw_source_tile(&id, tile, time_ms)?;
            let rect = facade.draw_source_rect(&id, tile, time_ms)?;
            writeln!(
                stdout,
                "tileset={id} tile={tile} time_ms={time_ms} source={source} rect={},{},{},{}",
                rect.x, rect.y, rect.width, rect.height
            )?;
        }
        CommandKind::Timeline { path, tile } => {
            let (id, _, registry) = load_single(&path)?;
            let Some(track) = registry.lookup_animation(&id, tile)? else {
                writeln!(stdout, "tileset={id} tile={tile} static")?;
                return Ok(());
            };
            for (index, (frame, start)) in track
                .frames()
                .iter()
                .zip(track.frame_starts())
                .enumerate()
            {
                writeln!(
                    stdout,
                    "frame={index} start_ms={start} end_ms={} source={}",
                    start + u64::from(frame.duration_ms),
                    frame.source_tile
                )?;
            }
            writeln!(stdout, "cycle_ms={}", track.cycle_length_ms())?;
        }
        CommandKind::Shapes { path, tile } => {
            let (id, facade, _) = load_single(&path)?;
            let shapes = facade.collision_shapes(&id, tile)?;
            writeln!(
                stdout,
                "tileset={id} tile={tile} class={} shapes={}",
                facade.tile_class(&id, tile)?.unwrap_or("-"),
                shapes.len()
            )?;
            for (index, primitive) in shapes.iter().enumerate() {
                writeln!(
                    stdout,
                    "shape={index} kind={} class={} {} degenerate={}",
                    primitive.shape.kind().as_str(),
                    primitive.class().unwrap_or("-"),
                    describe_geometry(&primitive.shape),
                    primitive.shape.is_degenerate()
                )?;
            }
        }
        CommandKind::Dump { path } => {
            let descriptor = load_descriptor_file(&path)?;
            write_descriptor_json(&descriptor, stdout)?;
        }
    }
    Ok(())
}

type LoadedTileset = (TilesetId, TileQueryFacade, Arc<TilesetRegistry>);

fn load_single(path: &Path) -> Result<LoadedTileset, ProbeError> {
    let descriptor = load_descriptor_file(path)?;
    let id = descriptor.id.clone();
    let mut registry = TilesetRegistry::new();
    registry.register(descriptor)?;
    let registry = Arc::new(registry);
    Ok((id, TileQueryFacade::new(Arc::clone(&registry)), registry))
}

fn describe_geometry(shape: &CollisionShape) -> String {
    match shape {
        CollisionShape::Rect {
            x,
            y,
            width,
            height,
        } => format!("rect={x},{y},{width},{height}"),
        CollisionShape::Polygon { points, .. } | CollisionShape::Polyline { points, .. } => {
            match shape.bounds() {
                Some(bounds) => format!(
                    "vertices={} bounds={},{}..{},{}",
                    points.len(),
                    bounds.min.x,
                    bounds.min.y,
                    bounds.max.x,
                    bounds.max.y
                ),
                None => "vertices=0".to_string(),
            }
        }
    }
}

fn write_descriptor_json<W: Write>(
    descriptor: &TilesetDescriptor,
    stdout: &mut W,
) -> Result<(), ProbeError> {
    serde_json::to_writer_pretty(&mut *stdout, descriptor)?;
    writeln!(stdout)?;
    Ok(())
}
