use std::str::FromStr;

use roxmltree::{Document, Node};
use tracing::debug;

use super::loader::{LoadErrorCode, SourceLocation, TilesetLoadError};
use super::types::{
    AnimationDescriptor, CollisionDescriptor, FrameDescriptor, ShapeDescriptor,
    TilesetDescriptor,
};
use crate::collision::Point;
use crate::ids::{TileId, TilesetId};

/// Object child elements that describe a shape kind other than a rect.
const SHAPE_ELEMENTS: &[&str] = &["polygon", "polyline", "ellipse", "point", "text"];

pub(crate) fn parse_tsx_document(
    raw: &str,
    fallback_name: Option<&str>,
) -> Result<TilesetDescriptor, TilesetLoadError> {
    let doc = Document::parse(raw).map_err(|error| TilesetLoadError {
        code: LoadErrorCode::XmlMalformed,
        message: format!("malformed XML: {error}"),
        file_path: None,
        location: Some(SourceLocation {
            line: error.pos().row as usize,
            column: error.pos().col as usize,
        }),
    })?;

    let root = doc.root_element();
    if root.tag_name().name() != "tileset" {
        return Err(error_at_node(
            LoadErrorCode::InvalidRoot,
            format!(
                "root element must be <tileset>, found <{}>",
                root.tag_name().name()
            ),
            &doc,
            root,
        ));
    }

    let name = match (root.attribute("name"), fallback_name) {
        (Some(name), _) if !name.is_empty() => name,
        (_, Some(fallback)) => fallback,
        _ => {
            return Err(error_at_node(
                LoadErrorCode::MissingAttribute,
                "<tileset> has no name attribute".to_string(),
                &doc,
                root,
            ))
        }
    };

    let mut descriptor = TilesetDescriptor {
        id: TilesetId::new(name),
        tile_width: required_attr(&doc, root, "tilewidth")?,
        tile_height: required_attr(&doc, root, "tileheight")?,
        columns: required_attr(&doc, root, "columns")?,
        tile_count: required_attr(&doc, root, "tilecount")?,
        spacing: optional_attr(&doc, root, "spacing")?.unwrap_or(0),
        margin: optional_attr(&doc, root, "margin")?.unwrap_or(0),
        image: None,
        animations: Vec::new(),
        collisions: Vec::new(),
    };

    for child in root.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "image" => descriptor.image = child.attribute("source").map(ToString::to_string),
            "tile" => parse_tile(&doc, child, &mut descriptor)?,
            other => debug!(
                tileset = %descriptor.id,
                element = other,
                "tsx_element_ignored"
            ),
        }
    }

    Ok(descriptor)
}

fn parse_tile(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    descriptor: &mut TilesetDescriptor,
) -> Result<(), TilesetLoadError> {
    let tile = TileId(required_attr(doc, node, "id")?);
    let class = class_attr(node);
    let mut shapes = Vec::new();
    let mut has_objects = false;

    for child in node.children().filter(Node::is_element) {
        match child.tag_name().name() {
            "animation" => {
                let mut animation = AnimationDescriptor::new(tile);
                for frame in child
                    .children()
                    .filter(|frame| frame.is_element() && frame.has_tag_name("frame"))
                {
                    animation.frames.push(FrameDescriptor {
                        tile: TileId(required_attr(doc, frame, "tileid")?),
                        duration_ms: required_attr(doc, frame, "duration")?,
                    });
                }
                descriptor.animations.push(animation);
            }
            "objectgroup" => {
                has_objects = true;
                for object in child
                    .children()
                    .filter(|object| object.is_element() && object.has_tag_name("object"))
                {
                    shapes.push(parse_object(doc, object)?);
                }
            }
            _ => {}
        }
    }

    if has_objects || class.is_some() {
        descriptor.collisions.push(CollisionDescriptor {
            tile,
            class,
            shapes,
        });
    }
    Ok(())
}

fn parse_object(
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> Result<ShapeDescriptor, TilesetLoadError> {
    let rotation = optional_attr::<f32>(doc, node, "rotation")?.unwrap_or(0.0);
    if rotation != 0.0 {
        return Err(error_at_node(
            LoadErrorCode::InvalidValue,
            format!("object rotation {rotation} is not supported for tile collision"),
            doc,
            node,
        ));
    }

    let x = optional_attr(doc, node, "x")?.unwrap_or(0.0);
    let y = optional_attr(doc, node, "y")?.unwrap_or(0.0);
    let shape_child = node
        .children()
        .find(|child| child.is_element() && SHAPE_ELEMENTS.contains(&child.tag_name().name()));

    let mut shape = match shape_child {
        Some(child) if matches!(child.tag_name().name(), "polygon" | "polyline") => {
            let points = parse_points(doc, child)?;
            ShapeDescriptor {
                kind: child.tag_name().name().to_string(),
                class: None,
                x,
                y,
                width: 0.0,
                height: 0.0,
                points,
            }
        }
        // Passed through by name so registration rejects it.
        Some(child) => ShapeDescriptor {
            kind: child.tag_name().name().to_string(),
            class: None,
            x,
            y,
            width: optional_attr(doc, node, "width")?.unwrap_or(0.0),
            height: optional_attr(doc, node, "height")?.unwrap_or(0.0),
            points: Vec::new(),
        },
        None if node.has_attribute("gid") => ShapeDescriptor {
            kind: "tile".to_string(),
            class: None,
            x,
            y,
            width: 0.0,
            height: 0.0,
            points: Vec::new(),
        },
        None => ShapeDescriptor::rect(
            x,
            y,
            optional_attr(doc, node, "width")?.unwrap_or(0.0),
            optional_attr(doc, node, "height")?.unwrap_or(0.0),
        ),
    };
    shape.class = class_attr(node);
    Ok(shape)
}

fn parse_points(doc: &Document<'_>, node: Node<'_, '_>) -> Result<Vec<Point>, TilesetLoadError> {
    let raw = node.attribute("points").ok_or_else(|| {
        error_at_node(
            LoadErrorCode::MissingAttribute,
            format!("<{}> requires a points attribute", node.tag_name().name()),
            doc,
            node,
        )
    })?;

    let mut points = Vec::new();
    for pair in raw.split_whitespace() {
        let parsed = pair
            .split_once(',')
            .and_then(|(x, y)| Some(Point::new(x.parse().ok()?, y.parse().ok()?)));
        let Some(point) = parsed else {
            return Err(error_at_node(
                LoadErrorCode::InvalidValue,
                format!("'{pair}' is not an x,y point"),
                doc,
                node,
            ));
        };
        points.push(point);
    }
    Ok(points)
}

/// Tiled wrote the class as `type` before 1.9 and as `class` since.
fn class_attr(node: Node<'_, '_>) -> Option<String> {
    node.attribute("class")
        .or_else(|| node.attribute("type"))
        .filter(|value| !value.is_empty())
        .map(ToString::to_string)
}

fn required_attr<T: FromStr>(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    name: &str,
) -> Result<T, TilesetLoadError> {
    optional_attr(doc, node, name)?.ok_or_else(|| {
        error_at_node(
            LoadErrorCode::MissingAttribute,
            format!(
                "<{}> is missing required attribute '{}'",
                node.tag_name().name(),
                name
            ),
            doc,
            node,
        )
    })
}

fn optional_attr<T: FromStr>(
    doc: &Document<'_>,
    node: Node<'_, '_>,
    name: &str,
) -> Result<Option<T>, TilesetLoadError> {
    let Some(value) = node.attribute(name) else {
        return Ok(None);
    };
    value.trim().parse::<T>().map(Some).map_err(|_| {
        error_at_node(
            LoadErrorCode::InvalidValue,
            format!(
                "attribute '{}' on <{}> has invalid value '{}'",
                name,
                node.tag_name().name(),
                value
            ),
            doc,
            node,
        )
    })
}

fn error_at_node(
    code: LoadErrorCode,
    message: String,
    doc: &Document<'_>,
    node: Node<'_, '_>,
) -> TilesetLoadError {
    let pos = doc.text_pos_at(node.range().start);
    TilesetLoadError {
        code,
        message,
        file_path: None,
        location: Some(SourceLocation {
            line: pos.row as usize,
            column: pos.col as usize,
        }),
    }
}
