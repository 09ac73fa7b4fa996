//! Error types for the I/O-bearing surfaces of the crate.
//!
//! SVG and color transforms never fail: they fall back to text patching or
//! neutral defaults. Only loading/persisting files and rendering previews
//! report errors.

use std::path::PathBuf;

/// Errors produced by stores, configuration loading, and previews.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Reading or writing a file failed.
    #[error("failed to access '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed.
    #[error("invalid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The SVG markup could not be tokenized even leniently.
    #[error("malformed SVG at byte {position}: {message}")]
    Parse { position: usize, message: String },

    /// The SVG could not be rasterized.
    #[error("failed to render preview: {0}")]
    Render(String),

    /// The rasterized preview could not be encoded.
    #[error("failed to encode preview: {0}")]
    Encode(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn io_error_mentions_path() {
        let err = Error::io(
            "icons/variants.js",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        let message = err.to_string();
        assert!(message.contains("icons/variants.js"));
        assert!(message.contains("gone"));
    }

    #[test]
    fn json_error_converts() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{").unwrap_err().into();
        assert!(matches!(err, Error::Json(_)));
    }
}
