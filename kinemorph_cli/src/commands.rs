// kinemorph_cli/src/commands.rs

use crate::cli::SolveArgs;
use crate::config::load_config;
use anyhow::{Context, Result};
use kinemorph_core::prelude::*;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::Path;
use tracing::info;

/// The document written by `kinemorph solve`.
#[derive(Debug, Serialize)]
pub struct SolvedClip {
    pub fps: f64,
    /// Role name of every slot, in output order.
    pub slots: Vec<String>,
    /// Per frame, one `[w, x, y, z]` per slot. Unsolved slots hold `[0, 0, 0, 0.5]`.
    pub frames: Vec<Vec<[f64; 4]>>,
}

impl SolvedClip {
    pub fn new(fps: f64, results: &[RotationResult]) -> Self {
        Self {
            fps,
            slots: OUTPUT_ROLES.iter().map(ToString::to_string).collect(),
            frames: results.iter().map(RotationResult::to_array).collect(),
        }
    }
}

/// One line of `kinemorph bones`.
#[derive(Debug, Serialize, PartialEq)]
pub struct BoneEntry {
    pub role: String,
    pub node: String,
}

pub fn run_solve(args: &SolveArgs) -> Result<()> {
    let mut config = load_config(args.config.as_deref()).context("failed to load configuration")?;
    if let Some(window) = args.window {
        config.conditioner.window = window;
    }

    let pipeline = Pipeline::from_model_path(&args.model, config)
        .with_context(|| format!("failed to prepare model {}", args.model.display()))?;
    let clip = read_clip(&args.clip)?;

    let results = pipeline
        .process_clip(&clip)
        .with_context(|| format!("failed to process clip {}", args.clip.display()))?;
    let document = serde_json::to_string_pretty(&SolvedClip::new(clip.fps, &results))?;

    match &args.output {
        Some(path) => {
            fs::write(path, document)
                .with_context(|| format!("failed to write {}", path.display()))?;
            info!(path = %path.display(), frames = results.len(), "wrote rotations");
        }
        None => writeln!(std::io::stdout(), "{document}")?,
    }
    Ok(())
}

pub fn run_bones(model: &Path) -> Result<()> {
    let nodes = kinemorph_core::skeleton::load_glb(model)
        .with_context(|| format!("failed to load model {}", model.display()))?;
    let skeleton = kinemorph_core::skeleton::resolve(&nodes)
        .with_context(|| format!("failed to map the skeleton of {}", model.display()))?;

    let document = serde_json::to_string_pretty(&bone_entries(&skeleton))?;
    writeln!(std::io::stdout(), "{document}")?;
    Ok(())
}

pub fn bone_entries(skeleton: &ResolvedSkeleton) -> Vec<BoneEntry> {
    skeleton
        .mapping()
        .into_iter()
        .map(|(role, node)| BoneEntry {
            role: role.to_string(),
            node: node.to_owned(),
        })
        .collect()
}

fn read_clip(path: &Path) -> Result<LandmarkClip> {
    let text =
        fs::read_to_string(path).with_context(|| format!("failed to read clip {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("failed to parse clip {}", path.display()))
}
