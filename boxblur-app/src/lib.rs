//! Command-line driver: load, blur, save.

use boxblur_compute::{
    read_bmp, write_bmp, BlurConfig, BlurEngine, ConfigError, EngineError, ImageError,
};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

/// Optional override file, looked up in the working directory.
pub const CONFIG_FILE: &str = "boxblur.json";

#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("read failed: {0}")]
    Read(#[source] ImageError),

    #[error("save failed: {0}")]
    Save(#[source] ImageError),

    #[error(transparent)]
    Engine(#[from] EngineError),
}

/// Load the configuration, falling back to the reference constants.
pub fn load_config(dir: impl AsRef<Path>) -> Result<BlurConfig, AppError> {
    Ok(BlurConfig::load_or_default(dir.as_ref().join(CONFIG_FILE))?)
}

/// Run one blur job and return the time spent in the threaded section.
pub fn run(config: &BlurConfig) -> Result<Duration, AppError> {
    // Fail on a bad config before touching any file.
    let engine = BlurEngine::from_config(config)?;

    let image = read_bmp(&config.input).map_err(AppError::Read)?;
    log::info!(
        "Read {} ({}x{})",
        config.input.display(),
        image.pixels.width(),
        image.pixels.height()
    );

    let outcome = engine.run(image.pixels)?;

    write_bmp(&config.output, &image.header, &outcome.grid).map_err(AppError::Save)?;
    log::info!("Saved {}", config.output.display());

    Ok(outcome.elapsed)
}

/// Console line reporting the compute time.
pub fn format_elapsed(elapsed: Duration) -> String {
    format!("The execution time: {:.3} seconds", elapsed.as_secs_f64())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn elapsed_has_three_decimals() {
        assert_eq!(
            format_elapsed(Duration::from_millis(1234)),
            "The execution time: 1.234 seconds"
        );
        assert_eq!(
            format_elapsed(Duration::from_micros(500)),
            "The execution time: 0.001 seconds"
        );
        assert_eq!(
            format_elapsed(Duration::ZERO),
            "The execution time: 0.000 seconds"
        );
    }
}
