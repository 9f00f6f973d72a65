//! Error-correction levels, output formats and their static lookup tables.

use std::fmt;
use std::str::FromStr;

use qrcode::EcLevel;

use crate::error::QrgenError;

/// Media type used when the requested output format is not recognized.
pub const FALLBACK_MEDIA_TYPE: &str = "application/octet-stream";

/// QR redundancy tier, ordered from the least to the most redundant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum ErrorCorrectionLevel {
    /// Recovers about 7% of damaged codewords.
    L,
    /// Recovers about 15% of damaged codewords.
    #[default]
    M,
    /// Recovers about 25% of damaged codewords.
    Q,
    /// Recovers about 30% of damaged codewords.
    H,
}

/// Level name, level and the encoder constant it maps to.
static EC_LEVELS: [(&str, ErrorCorrectionLevel, EcLevel); 4] = [
    ("L", ErrorCorrectionLevel::L, EcLevel::L),
    ("M", ErrorCorrectionLevel::M, EcLevel::M),
    ("Q", ErrorCorrectionLevel::Q, EcLevel::Q),
    ("H", ErrorCorrectionLevel::H, EcLevel::H),
];

impl ErrorCorrectionLevel {
    pub const ALL: [ErrorCorrectionLevel; 4] = [Self::L, Self::M, Self::Q, Self::H];

    /// Looks a level up by its single-letter name.
    pub fn lookup(name: &str) -> Option<Self> {
        EC_LEVELS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, level, _)| *level)
    }

    /// Like [`lookup`](Self::lookup), but an unknown name selects the default level `M`.
    pub fn lookup_or_default(name: &str) -> Self {
        match Self::lookup(name) {
            Some(level) => level,
            None => {
                log::warn!("unknown error correction level {name:?}, using M");
                Self::M
            }
        }
    }

    pub fn name(self) -> &'static str {
        EC_LEVELS[self as usize].0
    }

    /// The encoder constant for this level.
    pub fn ec_level(self) -> EcLevel {
        EC_LEVELS[self as usize].2
    }
}

impl fmt::Display for ErrorCorrectionLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ErrorCorrectionLevel {
    type Err = QrgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| QrgenError::UnknownErrorCorrection(s.to_string()))
    }
}

/// Output format of a rendered symbol.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum OutputFormat {
    /// PNG raster image.
    #[default]
    Png,
    /// Standalone SVG document with one rectangle per dark module.
    Svg,
    /// Bare `<svg>` element meant to be embedded in another document.
    SvgFragment,
    /// Standalone SVG document drawing every dark module in a single path.
    SvgPath,
    /// Half-block text art.
    Ascii,
    /// Run-length compressed HTML table.
    Html,
}

/// Path name, format and response media type.
static FORMATS: [(&str, OutputFormat, &str); 6] = [
    ("png", OutputFormat::Png, "image/png"),
    ("svg", OutputFormat::Svg, "image/svg+xml"),
    ("svg-fragment", OutputFormat::SvgFragment, "image/svg+xml"),
    ("svg-path", OutputFormat::SvgPath, "image/svg+xml"),
    ("ascii", OutputFormat::Ascii, "text/plain"),
    ("html", OutputFormat::Html, "text/html"),
];

impl OutputFormat {
    pub const ALL: [OutputFormat; 6] = [
        Self::Png,
        Self::Svg,
        Self::SvgFragment,
        Self::SvgPath,
        Self::Ascii,
        Self::Html,
    ];

    /// Looks a format up by its route suffix (`png`, `svg-fragment`, ...).
    pub fn lookup(name: &str) -> Option<Self> {
        FORMATS
            .iter()
            .find(|(n, _, _)| *n == name)
            .map(|(_, format, _)| *format)
    }

    pub fn name(self) -> &'static str {
        FORMATS[self as usize].0
    }

    pub fn media_type(self) -> &'static str {
        FORMATS[self as usize].2
    }
}

/// Media type for a looked-up format, falling back to
/// [`FALLBACK_MEDIA_TYPE`] when the format was not recognized.
pub fn media_type(format: Option<OutputFormat>) -> &'static str {
    match format {
        Some(format) => format.media_type(),
        None => FALLBACK_MEDIA_TYPE,
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OutputFormat {
    type Err = QrgenError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::lookup(s).ok_or_else(|| QrgenError::UnknownFormat(s.to_string()))
    }
}
