//! Render options, optionally loaded from a TOML file.

use std::path::Path;

use serde::Deserialize;

use crate::error::ConfigError;

/// Widest quiet zone accepted, in modules.
pub const MAX_BORDER: u32 = 64;
/// Largest PNG module edge accepted, in pixels.
pub const MAX_BOX_SIZE: u32 = 100;

/// Drawing parameters shared by the image and text renderers.
///
/// ```toml
/// border = 2
/// box_size = 8
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RenderOptions {
    /// Width of the light quiet zone around the symbol, in modules.
    pub border: u32,
    /// Edge length of one module in the PNG output, in pixels.
    pub box_size: u32,
}

impl Default for RenderOptions {
    fn default() -> Self {
        RenderOptions {
            border: 4,
            box_size: 10,
        }
    }
}

impl RenderOptions {
    /// Parses options from TOML and checks them with [`validate`](Self::validate).
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let options: RenderOptions = toml::from_str(content)?;
        options.validate()?;
        Ok(options)
    }

    /// Checks `border <= MAX_BORDER` and `1 <= box_size <= MAX_BOX_SIZE`, which
    /// keeps every image and viewBox dimension well inside `u32`.
    pub fn validate(&self) -> Result<(), ConfigError> {
        check_range("border", self.border, 0, MAX_BORDER)?;
        check_range("box_size", self.box_size, 1, MAX_BOX_SIZE)
    }

    /// Loads options from `path`.
    /// Returns the defaults if no path is given or the file doesn't exist.
    /// Returns an error if the file exists but cannot be read or parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let Some(path) = path else {
            return Ok(RenderOptions::default());
        };
        if !path.exists() {
            log::debug!("no render config at {}, using defaults", path.display());
            return Ok(RenderOptions::default());
        }

        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let options: RenderOptions = toml::from_str(&content).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        options.validate()?;
        Ok(options)
    }
}

fn check_range(field: &'static str, value: u32, min: u32, max: u32) -> Result<(), ConfigError> {
    if (min..=max).contains(&value) {
        Ok(())
    } else {
        Err(ConfigError::OutOfRange {
            field,
            value,
            min,
            max,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let options = RenderOptions::default();
        assert_eq!(options.border, 4);
        assert_eq!(options.box_size, 10);
        assert_eq!(RenderOptions::from_toml_str("").unwrap(), options);
    }

    #[test]
    fn test_partial_override() {
        let options = RenderOptions::from_toml_str("border = 1").unwrap();
        assert_eq!(options, RenderOptions { border: 1, box_size: 10 });
    }

    #[test]
    fn test_rejects_unknown_keys() {
        assert!(RenderOptions::from_toml_str("margin = 3").is_err());
    }

    #[test]
    fn test_rejects_out_of_range() {
        assert!(matches!(
            RenderOptions::from_toml_str("box_size = 200000000"),
            Err(ConfigError::OutOfRange { field: "box_size", value: 200_000_000, .. })
        ));
        assert!(matches!(
            RenderOptions::from_toml_str("border = 3000000000"),
            Err(ConfigError::OutOfRange { field: "border", .. })
        ));
        assert!(matches!(
            RenderOptions::from_toml_str("box_size = 0"),
            Err(ConfigError::OutOfRange { field: "box_size", min: 1, .. })
        ));
        assert!(matches!(
            RenderOptions::from_toml_str("border = \"wide\""),
            Err(ConfigError::Syntax(_))
        ));
    }

    #[test]
    fn test_accepts_range_limits() {
        let options = RenderOptions::from_toml_str("border = 64\nbox_size = 100").unwrap();
        assert_eq!(options, RenderOptions { border: MAX_BORDER, box_size: MAX_BOX_SIZE });
        assert!(RenderOptions::from_toml_str("border = 0\nbox_size = 1").is_ok());
    }

    #[test]
    fn test_load_missing_file_gives_defaults() {
        let options = RenderOptions::load(Some(Path::new("/nonexistent/qrgen.toml"))).unwrap();
        assert_eq!(options, RenderOptions::default());
        assert_eq!(RenderOptions::load(None).unwrap(), RenderOptions::default());
    }

    #[test]
    fn test_load_from_file() {
        let path = std::env::temp_dir().join(format!("qrgen-config-{}.toml", std::process::id()));
        std::fs::write(&path, "border = 0\nbox_size = 3\n").unwrap();
        let options = RenderOptions::load(Some(path.as_path()));
        std::fs::write(&path, "border = \"wide\"").unwrap();
        let broken = RenderOptions::load(Some(path.as_path()));
        std::fs::write(&path, "box_size = 200000000").unwrap();
        let oversized = RenderOptions::load(Some(path.as_path()));
        std::fs::remove_file(&path).unwrap();

        assert_eq!(options.unwrap(), RenderOptions { border: 0, box_size: 3 });
        assert!(matches!(broken, Err(ConfigError::Parse { .. })));
        assert!(matches!(oversized, Err(ConfigError::OutOfRange { field: "box_size", .. })));
    }
}
