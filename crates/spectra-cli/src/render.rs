//! Writes the engine's image buffers to PNG files.

use std::path::{Path, PathBuf};

use spectra_core::image::{Channel, DisplayImage};
use spectra_core::{EngineError, Session};

/// Write `original`, `result`, the magnitude display and the three phase
/// displays into `dir`, creating it if needed. Returns the written paths.
pub fn write_outputs(session: &Session, dir: &Path) -> Result<Vec<PathBuf>, RenderError> {
    std::fs::create_dir_all(dir)?;

    let mut layers: Vec<(String, DisplayImage)> = vec![
        ("original".into(), session.original()?.to_display()),
        ("result".into(), session.result()?.to_display()),
        ("magnitude".into(), session.magnitude_display()?.clone()),
    ];
    for ch in Channel::ALL {
        layers.push((format!("phase_{}", ch.letter()), session.phase_display(ch)?.clone()));
    }

    let mut written = Vec::with_capacity(layers.len());
    for (name, display) in layers {
        let path = dir.join(format!("{name}.png"));
        display
            .to_rgb8()
            .save(&path)
            .map_err(|source| RenderError::Encode {
                path: path.display().to_string(),
                source,
            })?;
        written.push(path);
    }
    tracing::info!("wrote {} images to {}", written.len(), dir.display());
    Ok(written)
}

/// Errors that can occur while writing outputs.
#[derive(Debug, thiserror::Error)]
pub enum RenderError {
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to encode {path}: {source}")]
    Encode {
        path: String,
        source: image::ImageError,
    },
}
