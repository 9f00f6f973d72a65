//! The QR encoder seam.
//!
//! Building the symbol itself (segment selection, Reed-Solomon codewords,
//! module placement and masking) is delegated to the `qrcode` crate. Renderers
//! only ever see the resulting [`ModuleMatrix`].

use qrcode::{Color, QrCode};

use crate::error::Result;
use crate::format::ErrorCorrectionLevel;

/// A grid of modules, `true` meaning dark, stored row-major.
///
/// Matrices produced by an encoder are square. Renderers that only walk rows
/// (such as the HTML table) also accept ragged or empty grids built with
/// [`ModuleMatrix::from_rows`].
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ModuleMatrix {
    rows: Vec<Vec<bool>>,
}

impl ModuleMatrix {
    pub fn from_rows(rows: Vec<Vec<bool>>) -> Self {
        ModuleMatrix { rows }
    }

    /// Builds a square matrix from a flat, row-major module list.
    pub fn from_flat(width: usize, modules: &[bool]) -> Self {
        let rows = if width == 0 {
            Vec::new()
        } else {
            modules.chunks(width).map(<[bool]>::to_vec).collect()
        };
        ModuleMatrix { rows }
    }

    /// Number of rows; equal to the symbol width for encoder output.
    pub fn size(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        self.rows.iter().map(Vec::as_slice)
    }

    /// Returns the module at column `x`, row `y`. Coordinates outside the grid
    /// (the quiet zone) are light.
    pub fn get(&self, x: i64, y: i64) -> bool {
        if x < 0 || y < 0 {
            return false;
        }
        self.rows
            .get(y as usize)
            .and_then(|row| row.get(x as usize))
            .copied()
            .unwrap_or(false)
    }
}

/// Turns a payload into a module matrix at a given error-correction level.
pub trait QrEncoder {
    fn encode(&self, payload: &str, level: ErrorCorrectionLevel) -> Result<ModuleMatrix>;
}

/// [`QrEncoder`] backed by the `qrcode` crate, picking the smallest version that
/// fits the payload.
#[derive(Debug, Clone, Copy, Default)]
pub struct QrcodeEncoder;

impl QrEncoder for QrcodeEncoder {
    fn encode(&self, payload: &str, level: ErrorCorrectionLevel) -> Result<ModuleMatrix> {
        let code = QrCode::with_error_correction_level(payload.as_bytes(), level.ec_level())?;
        let width = code.width();
        let modules: Vec<bool> = code
            .to_colors()
            .into_iter()
            .map(|c| c == Color::Dark)
            .collect();
        log::debug!(
            "encoded {} bytes at level {} into {}x{} modules",
            payload.len(),
            level,
            width,
            width
        );
        Ok(ModuleMatrix::from_flat(width, &modules))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QrgenError;

    #[test]
    fn test_encode_version_one() {
        // 13 bytes fit into a version 1 symbol at level M
        let matrix = QrcodeEncoder.encode("Hello, world!", ErrorCorrectionLevel::M).unwrap();
        assert_eq!(matrix.size(), 21);
        assert!(matrix.rows().all(|row| row.len() == 21));
    }

    #[test]
    fn test_finder_pattern_corners() {
        let matrix = QrcodeEncoder.encode("HELLO WORLD", ErrorCorrectionLevel::Q).unwrap();
        let n = matrix.size() as i64;
        // the outer ring of every finder pattern is dark, the ring inside it light
        for (x, y) in [(0, 0), (n - 1, 0), (0, n - 1)] {
            assert!(matrix.get(x, y));
        }
        assert!(!matrix.get(1, 1));
        assert!(matrix.get(3, 3));
    }

    #[test]
    fn test_higher_level_needs_more_modules() {
        let payload = "https://example.com/some/fairly/long/path?with=query";
        let low = QrcodeEncoder.encode(payload, ErrorCorrectionLevel::L).unwrap();
        let high = QrcodeEncoder.encode(payload, ErrorCorrectionLevel::H).unwrap();
        assert!(high.size() > low.size());
    }

    #[test]
    fn test_payload_too_long() {
        let payload = "x".repeat(4000);
        let err = QrcodeEncoder.encode(&payload, ErrorCorrectionLevel::H).unwrap_err();
        assert!(matches!(err, QrgenError::Encode(_)));
    }

    #[test]
    fn test_get_outside_is_light() {
        let matrix = ModuleMatrix::from_rows(vec![vec![true, true], vec![true, true]]);
        assert!(matrix.get(1, 1));
        assert!(!matrix.get(-1, 0));
        assert!(!matrix.get(0, 2));
        assert!(!matrix.get(2, 0));
    }

    #[test]
    fn test_from_flat() {
        let matrix = ModuleMatrix::from_flat(2, &[true, false, false, true]);
        assert_eq!(matrix, ModuleMatrix::from_rows(vec![vec![true, false], vec![false, true]]));
        assert!(ModuleMatrix::from_flat(0, &[]).is_empty());
    }
}
