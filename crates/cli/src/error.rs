//! Structured CLI errors with meaningful exit codes.
//!
//! Exit code scheme:
//! - 0:  success
//! - 2:  clap arg parse error (automatic, before our code runs)
//! - 10: palette error (bad header, bad component, bad image, unsupported format)
//! - 11: I/O error (reading or writing a palette or config file)
//! - 12: input error (unknown extension, bad config, bad translation)
//! - 13: serialization error

use palkit_core::PaletteError;
use std::fmt;

/// Errors produced by CLI operations, each mapped to a distinct exit code.
pub enum CliError {
    /// A palette load, save or decode failure.
    Palette(PaletteError),
    /// An I/O error on a palette or config file.
    Io(String),
    /// A user input error (unknown format, bad config file, bad translation).
    Input(String),
    /// A serialization error (JSON output failure).
    Serialization(String),
}

impl CliError {
    /// Returns the process exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Palette(_) => 10,
            CliError::Io(_) => 11,
            CliError::Input(_) => 12,
            CliError::Serialization(_) => 13,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Palette(e) => write!(f, "palette error: {e}"),
            CliError::Io(msg) => write!(f, "file error: {msg}"),
            CliError::Input(msg) => write!(f, "bad input: {msg}"),
            CliError::Serialization(msg) => write!(f, "cannot write JSON output: {msg}"),
        }
    }
}

impl From<PaletteError> for CliError {
    fn from(e: PaletteError) -> Self {
        match e {
            PaletteError::Io(msg) => CliError::Io(msg),
            e @ (PaletteError::Config(_) | PaletteError::InvalidTranslation { .. }) => {
                CliError::Input(e.to_string())
            }
            other => CliError::Palette(other),
        }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(e: serde_json::Error) -> Self {
        CliError::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use palkit_core::{ColourConfig, Palette, PaletteFormat, Translation};
    use std::path::Path;

    #[test]
    fn bad_jasc_header_exits_with_palette_code() {
        let err = Palette::new()
            .load_mem(b"JASC-PAX\n0100\n1\n0 0 0\n", PaletteFormat::Jasc)
            .unwrap_err();
        let cli_err = CliError::from(err);
        assert_eq!(cli_err.exit_code(), 10);
        let msg = cli_err.to_string();
        assert!(msg.starts_with("palette error:"), "{msg}");
        assert!(msg.contains("JASC-PAX"), "{msg}");
    }

    #[test]
    fn missing_palette_file_exits_with_io_code() {
        let err = Palette::new()
            .load_file(Path::new("/no/such/dir/doom.pal"), PaletteFormat::Jasc)
            .unwrap_err();
        let cli_err = CliError::from(err);
        assert_eq!(cli_err.exit_code(), 11);
        let msg = cli_err.to_string();
        assert!(msg.starts_with("file error:"), "{msg}");
        assert!(msg.contains("doom.pal"), "{msg}");
    }

    #[test]
    fn bad_translation_exits_with_input_code() {
        let err = "0:15".parse::<Translation>().unwrap_err();
        let cli_err = CliError::from(err);
        assert_eq!(cli_err.exit_code(), 12);
        assert!(cli_err.to_string().contains("'0:15'"));
    }

    #[test]
    fn unknown_match_metric_in_config_exits_with_input_code() {
        let err = ColourConfig::from_json(r#"{"match_metric": "fuzzy"}"#).unwrap_err();
        let cli_err = CliError::from(err);
        assert_eq!(cli_err.exit_code(), 12);
        assert!(cli_err.to_string().starts_with("bad input:"));
    }

    #[test]
    fn short_raw_palette_exits_with_palette_code() {
        let err = Palette::new()
            .load_mem(&[0, 0], PaletteFormat::Raw)
            .unwrap_err();
        assert_eq!(CliError::from(err).exit_code(), 10);
    }

    #[test]
    fn json_output_failure_exits_with_serialization_code() {
        let bad_json = serde_json::from_str::<serde_json::Value>("{invalid");
        let cli_err = CliError::from(bad_json.unwrap_err());
        assert_eq!(cli_err.exit_code(), 13);
        assert!(cli_err.to_string().starts_with("cannot write JSON output:"));
    }
}
