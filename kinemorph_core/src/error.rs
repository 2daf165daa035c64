// kinemorph_core/src/error.rs

//! Error types for model loading, clip conditioning and the full pipeline.

use crate::skeleton::BoneRole;
use thiserror::Error;

/// Unrecoverable problems with a model file or its node hierarchy.
/// Any of these aborts skeleton construction; no partial skeleton is produced.
#[derive(Debug, Error)]
pub enum StructureError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("bad container magic {found:#010x}, expected {expected:#010x}")]
    BadMagic { found: u32, expected: u32 },

    #[error("unsupported container version {0}, only version 2 is supported")]
    UnsupportedVersion(u32),

    #[error("container truncated: needed {needed} bytes at offset {offset}, have {available}")]
    Truncated {
        offset: usize,
        needed: usize,
        available: usize,
    },

    #[error("container has no JSON chunk")]
    MissingJsonChunk,

    #[error("JSON chunk is not valid UTF-8")]
    InvalidUtf8(#[from] std::str::Utf8Error),

    #[error("failed to decode node JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("node {parent} references child index {child}, but only {count} nodes exist")]
    DanglingChild {
        parent: usize,
        child: usize,
        count: usize,
    },

    #[error("node {node} is its own ancestor in the node hierarchy")]
    CyclicHierarchy { node: usize },

    #[error("no root node found in the node hierarchy")]
    MissingRoot,

    #[error("several root candidates and none is named 'root': {0:?}")]
    AmbiguousRoot(Vec<String>),

    #[error("mapping failed: no node matches required bone role {0}")]
    UnresolvedRole(BoneRole),
}

/// Problems with a landmark clip or the conditioner settings used on it.
#[derive(Debug, Error)]
pub enum ClipError {
    #[error("frame rate must be positive and finite, got {0}")]
    InvalidFrameRate(f64),

    #[error("clip streams disagree in length: body {body}, left hand {left}, right hand {right}")]
    StreamLengthMismatch {
        body: usize,
        left: usize,
        right: usize,
    },

    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
}

impl ClipError {
    pub fn invalid_config(reason: impl Into<String>) -> Self {
        Self::InvalidConfig(reason.into())
    }
}

/// Umbrella error for callers driving the whole pipeline.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Structure(#[from] StructureError),

    #[error(transparent)]
    Clip(#[from] ClipError),
}

pub type StructureResult<T> = std::result::Result<T, StructureError>;
pub type ClipResult<T> = std::result::Result<T, ClipError>;
pub type Result<T> = std::result::Result<T, PipelineError>;
