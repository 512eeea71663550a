//! Error types for the palette engine.

use thiserror::Error;

/// Errors produced by palette loading, saving and parsing.
///
/// Each variant carries enough context to be shown to a user as-is; the
/// caller decides how to surface it.
#[derive(Debug, Error)]
pub enum PaletteError {
    /// Raw palette data did not contain a single full RGB triplet.
    #[error("raw palette data too short: need at least {needed} bytes, got {got}")]
    TooShort { needed: usize, got: usize },

    /// The image codec could not decode the data.
    #[error("unable to load palette image: {0}")]
    Image(String),

    /// A palette image was not square or its side was not a multiple of 16.
    #[error("palette image must be square with sides a multiple of 16, got {width}x{height}")]
    ImageDimensions { width: u32, height: u32 },

    /// A text palette did not start with the expected header.
    #[error("invalid {format} header: expected '{expected}', found '{found}'")]
    InvalidHeader {
        format: &'static str,
        expected: &'static str,
        found: String,
    },

    /// A JASC-PAL colour count was missing, malformed or out of range.
    #[error("invalid colour count '{0}': must be a number between 1 and 256")]
    InvalidCount(String),

    /// A colour component token was not an integer in 0..=255.
    #[error("invalid {component} component '{token}' on line {line}")]
    InvalidComponent {
        component: &'static str,
        token: String,
        line: usize,
    },

    /// The data ended in the middle of an RGB triplet.
    #[error("missing {component} component on line {line}")]
    MissingComponent {
        component: &'static str,
        line: usize,
    },

    /// A text palette contained no colours at all.
    #[error("no colours found in {0} data")]
    NoColours(&'static str),

    /// A colour string could not be parsed.
    #[error("invalid colour: {0}")]
    InvalidColour(String),

    /// The requested format name is unknown or was compiled out.
    #[error("unsupported palette format: {0}")]
    UnsupportedFormat(String),

    /// A translation range string could not be parsed.
    #[error("invalid translation '{input}': {reason}")]
    InvalidTranslation { input: String, reason: String },

    /// Configuration JSON could not be parsed.
    #[error("invalid colour configuration: {0}")]
    Config(String),

    /// Reading or writing a palette file failed.
    #[error("I/O error: {0}")]
    Io(String),
}

impl From<std::io::Error> for PaletteError {
    fn from(e: std::io::Error) -> Self {
        PaletteError::Io(e.to_string())
    }
}
