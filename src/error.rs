use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while reading or validating a scene description.
#[derive(Debug, Error)]
pub enum SceneError {
    #[error("could not read scene file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("malformed scene description: {0}")]
    Json(#[from] serde_json::Error),

    #[error("sphere radius must be positive and finite, got {0}")]
    InvalidRadius(f64),

    #[error("plane normal must have non-zero length")]
    DegenerateNormal,

    #[error("reflectivity must lie in [0, 1], got {0}")]
    InvalidReflectivity(f64),
}

/// Errors raised by the parallel pixel pipeline.
#[derive(Debug, Error)]
pub enum RenderError {
    #[error("a render needs at least one worker thread")]
    NoWorkers,

    #[error("image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: usize, height: usize },

    #[error("image of {width}x{height} pixels is too large to render")]
    ImageTooLarge { width: usize, height: usize },

    #[error("field of view must lie strictly between 0 and 180 degrees, got {0}")]
    InvalidFieldOfView(f64),

    #[error("failed to spawn render worker: {0}")]
    Spawn(#[source] io::Error),

    #[error("work queue closed before every pixel was queued")]
    QueueClosed,

    #[error("render finished with {received} of {expected} pixels")]
    MissingResults { expected: usize, received: usize },
}

/// Errors raised while encoding a finished image.
#[derive(Debug, Error)]
pub enum OutputError {
    #[error(transparent)]
    Io(#[from] io::Error),

    #[error(transparent)]
    Image(#[from] image::ImageError),

    #[error("unsupported output format {0:?}; use .png or .ppm")]
    UnsupportedFormat(String),
}
