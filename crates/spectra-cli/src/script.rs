//! JSON operation scripts.
//!
//! A script is a list of steps run in order against one session:
//!
//! ```json
//! { "steps": [
//!     { "op": "filter", "filter": { "radial_low_pass": { "radius_percent": 25 } } },
//!     { "op": "stroke", "target": "magnitude", "color": [0, 0, 0],
//!       "locks": ["blue"], "shapes": [{ "disc": { "center": [8, 8], "radius": 3 } }] },
//!     { "op": "snapshot", "name": "masked" },
//!     { "op": "apply" },
//!     { "op": "reset" }
//! ] }
//! ```

use std::path::{Path, PathBuf};

use glam::IVec2;
use serde::Deserialize;
use spectra_core::{
    Channel, ChannelLocks, EngineError, Filter, Session, Stroke, StrokeMask, StrokeTarget,
};

use crate::render::{self, RenderError};

/// Default pen width for line shapes.
const DEFAULT_PEN_WIDTH: u32 = 1;

/// A parsed script.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Script {
    pub steps: Vec<Step>,
}

/// One engine operation.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(tag = "op", rename_all = "snake_case")]
pub enum Step {
    Filter { filter: Filter },
    Stroke(StrokeSpec),
    /// Commit `result` as the new original.
    Apply,
    /// Discard frequency-domain edits.
    Reset,
    /// Write every buffer to `<out>/<name>/`.
    Snapshot { name: String },
}

/// Pen geometry plus the stroke's color, target and locks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct StrokeSpec {
    pub target: StrokeTarget,
    pub color: [u8; 3],
    #[serde(default)]
    pub locks: Vec<Channel>,
    pub shapes: Vec<Shape>,
}

/// Primitive painted into a stroke mask, in image pixel coordinates.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Shape {
    Point([i32; 2]),
    Disc {
        center: [i32; 2],
        radius: u32,
    },
    Line {
        from: [i32; 2],
        to: [i32; 2],
        #[serde(default = "default_pen_width")]
        width: u32,
    },
}

fn default_pen_width() -> u32 {
    DEFAULT_PEN_WIDTH
}

impl StrokeSpec {
    /// Rasterize the shapes into a stroke for a `width` x `height` image.
    pub fn to_stroke(&self, width: u32, height: u32) -> Stroke {
        let mut mask = StrokeMask::new(width, height);
        for shape in &self.shapes {
            match *shape {
                Shape::Point(p) => mask.paint_point(IVec2::from_array(p)),
                Shape::Disc { center, radius } => {
                    mask.paint_disc(IVec2::from_array(center), radius)
                }
                Shape::Line { from, to, width } => {
                    mask.paint_line(IVec2::from_array(from), IVec2::from_array(to), width)
                }
            }
        }
        Stroke {
            target: self.target,
            mask,
            color: self.color,
            locks: ChannelLocks::of(&self.locks),
        }
    }
}

impl Script {
    /// Read and parse a script file.
    pub fn from_file(path: &Path) -> Result<Self, ScriptError> {
        let text = std::fs::read_to_string(path).map_err(|source| ScriptError::Read {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self, ScriptError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Run every step in order. Stops at the first failing step.
    pub fn run(&self, session: &mut Session, out_dir: &Path) -> Result<(), ScriptError> {
        for (index, step) in self.steps.iter().enumerate() {
            tracing::debug!("step {}: {:?}", index, step);
            run_step(session, step, out_dir).map_err(|source| ScriptError::Step { index, source })?;
        }
        tracing::info!("script finished: {} steps", self.steps.len());
        Ok(())
    }
}

fn run_step(session: &mut Session, step: &Step, out_dir: &Path) -> Result<(), StepError> {
    match step {
        Step::Filter { filter } => {
            let outcome = session.apply_filter(*filter)?;
            if outcome.applied != *filter {
                tracing::info!("filter ran as {:?}", outcome.applied);
            }
        }
        Step::Stroke(spec) => {
            let original = session.original()?;
            let stroke = spec.to_stroke(original.width, original.height);
            let outcome = session.apply_stroke(&stroke)?;
            tracing::info!(
                "{:?} stroke: {} pixels changed, {} skipped",
                spec.target,
                outcome.pixels_changed,
                outcome.pixels_skipped
            );
        }
        Step::Apply => {
            session.apply_result_to_original()?;
        }
        Step::Reset => {
            session.reset_frequency_edits()?;
        }
        Step::Snapshot { name } => {
            let dir: PathBuf = out_dir.join(name);
            render::write_outputs(session, &dir)?;
        }
    }
    Ok(())
}

/// Errors from a single step.
#[derive(Debug, thiserror::Error)]
pub enum StepError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

/// Errors that can occur while loading or running a script.
#[derive(Debug, thiserror::Error)]
pub enum ScriptError {
    #[error("failed to read script {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid script: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("step {index} failed: {source}")]
    Step { index: usize, source: StepError },
}
