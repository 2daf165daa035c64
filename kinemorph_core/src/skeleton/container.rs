// kinemorph_core/src/skeleton/container.rs

//! Minimal reader for binary glTF (`.glb`) files: just enough to reach the
//! node hierarchy in the JSON chunk.

use crate::error::{StructureError, StructureResult};
use crate::geometry::Trs;
use crate::skeleton::{NodeTransform, SkeletonNode};
use crate::types::{from_xyzw, Mat4, Vec3};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info};

pub const GLB_MAGIC: u32 = 0x4654_6C67;
pub const GLB_VERSION: u32 = 2;
pub const CHUNK_TYPE_JSON: u32 = 0x4E4F_534A;

const HEADER_LEN: usize = 12;
const CHUNK_HEADER_LEN: usize = 8;

// --- JSON document ---

#[derive(Debug, Deserialize)]
struct GltfDocument {
    #[serde(default)]
    nodes: Vec<GltfNode>,
}

#[derive(Debug, Deserialize)]
struct GltfNode {
    name: Option<String>,
    #[serde(default)]
    children: Vec<usize>,
    /// Column-major.
    matrix: Option<[f64; 16]>,
    translation: Option<[f64; 3]>,
    /// `[x, y, z, w]`
    rotation: Option<[f64; 4]>,
    scale: Option<[f64; 3]>,
}

impl From<GltfNode> for SkeletonNode {
    fn from(node: GltfNode) -> Self {
        let transform = match node.matrix {
            Some(m) => NodeTransform::Matrix(Mat4::from_column_slice(&m)),
            None => {
                let defaults = Trs::default();
                NodeTransform::Trs(Trs {
                    translation: node
                        .translation
                        .map_or(defaults.translation, Vec3::from),
                    rotation: node.rotation.map_or(defaults.rotation, from_xyzw),
                    scale: node.scale.map_or(defaults.scale, Vec3::from),
                })
            }
        };
        SkeletonNode {
            name: node.name,
            children: node.children,
            transform,
        }
    }
}

// --- Binary container ---

/// Reads the node list out of a `.glb` file.
pub fn load_glb(path: impl AsRef<Path>) -> StructureResult<Vec<SkeletonNode>> {
    let path = path.as_ref();
    let bytes = std::fs::read(path)?;
    let nodes = parse_glb(&bytes)?;
    info!(path = %path.display(), nodes = nodes.len(), "loaded model container");
    Ok(nodes)
}

/// Parses the node list out of an in-memory `.glb` buffer.
///
/// The 12-byte header must carry the glTF magic and version 2. Chunks are
/// walked in order and the first JSON chunk is decoded; every other chunk is
/// skipped.
pub fn parse_glb(bytes: &[u8]) -> StructureResult<Vec<SkeletonNode>> {
    let magic = read_u32(bytes, 0)?;
    if magic != GLB_MAGIC {
        return Err(StructureError::BadMagic {
            found: magic,
            expected: GLB_MAGIC,
        });
    }
    let version = read_u32(bytes, 4)?;
    if version != GLB_VERSION {
        return Err(StructureError::UnsupportedVersion(version));
    }
    let total = read_u32(bytes, 8)? as usize;
    if total > bytes.len() {
        return Err(StructureError::Truncated {
            offset: 0,
            needed: total,
            available: bytes.len(),
        });
    }

    let mut offset = HEADER_LEN;
    while offset < total {
        let length = read_u32(bytes, offset)? as usize;
        let chunk_type = read_u32(bytes, offset + 4)?;
        let start = offset + CHUNK_HEADER_LEN;
        let payload = slice(bytes, start, length)?;

        if chunk_type == CHUNK_TYPE_JSON {
            let text = std::str::from_utf8(payload)?;
            let document: GltfDocument = serde_json::from_str(text)?;
            debug!(nodes = document.nodes.len(), "decoded JSON chunk");
            return Ok(document.nodes.into_iter().map(SkeletonNode::from).collect());
        }

        debug!(chunk_type, length, "skipping chunk");
        offset = start + length;
    }

    Err(StructureError::MissingJsonChunk)
}

fn slice(bytes: &[u8], offset: usize, len: usize) -> StructureResult<&[u8]> {
    offset
        .checked_add(len)
        .and_then(|end| bytes.get(offset..end))
        .ok_or(StructureError::Truncated {
            offset,
            needed: len,
            available: bytes.len().saturating_sub(offset),
        })
}

fn read_u32(bytes: &[u8], offset: usize) -> StructureResult<u32> {
    let raw = slice(bytes, offset, 4)?;
    Ok(u32::from_le_bytes([raw[0], raw[1], raw[2], raw[3]]))
}
