//! Spectra CLI: headless driver for the frequency-domain editing engine.
//!
//! Loads an image, optionally runs a JSON operation script against it, and
//! writes the original, the reconstruction and the four spectrum displays
//! as PNG files.

mod image_loader;
mod render;
mod script;

use std::path::{Path, PathBuf};

use clap::Parser;
use spectra_core::{EngineConfig, EngineError, Session};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

use image_loader::ImageLoadError;
use render::RenderError;
use script::{Script, ScriptError};

/// Environment variable naming the default output directory.
const OUT_DIR_ENV: &str = "SPECTRA_OUT_DIR";

#[derive(Parser)]
#[command(name = "spectra")]
#[command(version, about = "Edit an image through its Fourier spectrum", long_about = None)]
struct Cli {
    /// Input image
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Output directory (defaults to $SPECTRA_OUT_DIR, then the current directory)
    #[arg(short, long, value_name = "DIR")]
    out: Option<PathBuf>,

    /// Engine configuration file (JSON)
    #[arg(short, long, value_name = "FILE")]
    config: Option<PathBuf>,

    /// Operation script to run after loading (JSON)
    #[arg(short, long, value_name = "FILE")]
    script: Option<PathBuf>,
}

fn main() {
    init_tracing();
    let cli = Cli::parse();

    if let Err(e) = run(cli) {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer = tracing_subscriber::fmt::layer().with_target(false);
    tracing_subscriber::registry().with(filter).with(fmt_layer).init();
}

fn run(cli: Cli) -> Result<(), CliError> {
    let config = match &cli.config {
        Some(path) => load_config(path)?,
        None => EngineConfig::default(),
    };
    let out_dir = resolve_out_dir(cli.out, std::env::var_os(OUT_DIR_ENV).map(PathBuf::from));

    let image = image_loader::load_image(&cli.input)?;
    let mut session = Session::new(config);
    session.load(image)?;

    if let Some(path) = &cli.script {
        Script::from_file(path)?.run(&mut session, &out_dir)?;
    }

    render::write_outputs(&session, &out_dir)?;
    Ok(())
}

fn load_config(path: &Path) -> Result<EngineConfig, CliError> {
    let text = std::fs::read_to_string(path).map_err(|source| CliError::ConfigRead {
        path: path.display().to_string(),
        source,
    })?;
    let config = EngineConfig::from_json(&text)?;
    tracing::debug!("config: {:?}", config);
    Ok(config)
}

/// `--out` wins over the environment, which wins over the working directory.
fn resolve_out_dir(flag: Option<PathBuf>, env: Option<PathBuf>) -> PathBuf {
    flag.or(env).unwrap_or_else(|| PathBuf::from("."))
}

#[derive(Debug, thiserror::Error)]
enum CliError {
    #[error("failed to read config {path}: {source}")]
    ConfigRead {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    ConfigParse(#[from] serde_json::Error),
    #[error(transparent)]
    Load(#[from] ImageLoadError),
    #[error(transparent)]
    Engine(#[from] EngineError),
    #[error(transparent)]
    Script(#[from] ScriptError),
    #[error(transparent)]
    Render(#[from] RenderError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_flag_overrides_env_out_dir() {
        let dir = resolve_out_dir(Some("a".into()), Some("b".into()));
        assert_eq!(dir, PathBuf::from("a"));
        let dir = resolve_out_dir(None, Some("b".into()));
        assert_eq!(dir, PathBuf::from("b"));
        assert_eq!(resolve_out_dir(None, None), PathBuf::from("."));
    }

    #[test]
    fn test_parses_all_flags() {
        let cli = Cli::try_parse_from([
            "spectra", "in.png", "--out", "o", "--config", "c.json", "--script", "s.json",
        ])
        .unwrap();
        assert_eq!(cli.input, PathBuf::from("in.png"));
        assert_eq!(cli.out, Some(PathBuf::from("o")));
        assert_eq!(cli.script, Some(PathBuf::from("s.json")));
    }
}
