//! Error types shared by the payload, render and dispatch layers.

use std::path::PathBuf;

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, QrgenError>;

/// Errors produced while turning a request into rendered QR output.
#[derive(Debug, Error)]
pub enum QrgenError {
    /// The payload does not fit into any QR version at the requested level.
    #[error("QR encoding failed: {0}")]
    Encode(#[from] qrcode::types::QrError),

    /// The raster image could not be serialized.
    #[error("image encoding failed: {0}")]
    Image(#[from] image::ImageError),

    /// A required query parameter was not supplied.
    #[error("missing required field: {0}")]
    MissingField(&'static str),

    /// A query parameter was supplied but could not be parsed into its type.
    #[error("invalid value for {field}: {value:?}")]
    InvalidField { field: &'static str, value: String },

    /// The request path names no known route.
    #[error("unknown route: {0}")]
    UnknownRoute(String),

    /// The format suffix is not one of the supported output formats.
    #[error("unknown output format: {0}")]
    UnknownFormat(String),

    /// The `err` parameter is not one of `L`, `M`, `Q`, `H`.
    #[error("unknown error correction level: {0}")]
    UnknownErrorCorrection(String),

    /// Render options could not be loaded or are out of range.
    #[error(transparent)]
    Config(#[from] ConfigError),
}

/// Errors that can occur when loading render options.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The config file exists but could not be read.
    #[error("failed to read config file '{}': {}", path.display(), source)]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The config file is not valid TOML for [`RenderOptions`](crate::RenderOptions).
    #[error("failed to parse config file '{}': {}", path.display(), source)]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },

    /// Options given as a string are not valid TOML.
    #[error("failed to parse render options: {0}")]
    Syntax(#[from] toml::de::Error),

    /// An option lies outside the range the renderers can draw.
    #[error("{field} = {value} is out of range {min}..={max}")]
    OutOfRange {
        field: &'static str,
        value: u32,
        min: u32,
        max: u32,
    },
}
