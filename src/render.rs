use std::io::Cursor;
use std::path::Path;

use image::{ImageBuffer, ImageFormat, Luma};

use crate::config::RenderOptions;
use crate::encoder::{ModuleMatrix, QrEncoder, QrcodeEncoder};
use crate::error::Result;
use crate::format::{self, ErrorCorrectionLevel, OutputFormat};

/*---- Fixed HTML document parts ----*/

const HTML_PREAMBLE: &str = r#"
<!DOCTYPE html>
<html>
<style>
table.qr{
    border:none;
    border-collapse: collapse;
    margin: 20px;
}
.qr td{
    width: 10px;
    height: 10px;
}
.black{
    background-color: black;
}
.white{
    background-color: white;
}
</style>
<body>
<table class="qr">
"#;

const HTML_FOOTER: &str = "\n</table></body></html>\n";

const SVG_PROLOG: &str = "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n";
const SVG_DOCTYPE: &str = "<!DOCTYPE svg PUBLIC \"-//W3C//DTD SVG 1.1//EN\" \"http://www.w3.org/Graphics/SVG/1.1/DTD/svg11.dtd\">\n";

/// Rendered output together with the media type it should be served as.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rendered {
    pub bytes: Vec<u8>,
    pub media_type: &'static str,
}

impl Rendered {
    /// The output as text, for the textual formats.
    pub fn text(&self) -> Option<&str> {
        std::str::from_utf8(&self.bytes).ok()
    }
}

/// Encodes payloads and draws them in any [`OutputFormat`].
///
/// A renderer only holds immutable options, so one instance can serve
/// concurrent requests.
///
/// # Example
///
/// ```
/// use qrgen::format::{ErrorCorrectionLevel, OutputFormat};
/// use qrgen::config::RenderOptions;
/// use qrgen::render::Renderer;
///
/// let out = Renderer::new(RenderOptions::default())
///     .render("WIFI:S:home;;", ErrorCorrectionLevel::M, OutputFormat::Svg)
///     .unwrap();
/// assert_eq!(out.media_type, "image/svg+xml");
/// ```
#[derive(Debug, Clone)]
pub struct Renderer<E = QrcodeEncoder> {
    encoder: E,
    options: RenderOptions,
}

impl Renderer<QrcodeEncoder> {
    pub fn new(options: RenderOptions) -> Self {
        Renderer {
            encoder: QrcodeEncoder,
            options,
        }
    }

    /// Builds a renderer from a TOML options file, see [`RenderOptions::load`].
    pub fn from_config(path: Option<&Path>) -> Result<Self> {
        Ok(Renderer::new(RenderOptions::load(path)?))
    }
}

impl Default for Renderer<QrcodeEncoder> {
    fn default() -> Self {
        Renderer::new(RenderOptions::default())
    }
}

impl<E: QrEncoder> Renderer<E> {
    pub fn with_encoder(encoder: E, options: RenderOptions) -> Self {
        Renderer { encoder, options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Encodes `payload` at `level` and draws it as `format`.
    ///
    /// # Errors
    ///
    /// Returns [`QrgenError::Encode`](crate::QrgenError::Encode) when the payload
    /// does not fit in a QR symbol, and [`QrgenError::Image`](crate::QrgenError::Image)
    /// when the PNG cannot be written.
    pub fn render(
        &self,
        payload: &str,
        level: ErrorCorrectionLevel,
        format: OutputFormat,
    ) -> Result<Rendered> {
        log::info!("generate {}, level={}, text={}", format, level, payload);
        let matrix = self.encoder.encode(payload, level)?;
        self.render_matrix(&matrix, format)
    }

    /// Draws an already encoded matrix.
    ///
    /// Fails with [`QrgenError::Config`](crate::QrgenError::Config) when the
    /// options are out of range.
    pub fn render_matrix(&self, matrix: &ModuleMatrix, format: OutputFormat) -> Result<Rendered> {
        self.options.validate()?;
        let border = self.options.border;
        let bytes = match format {
            OutputFormat::Png => to_png(matrix, &self.options)?,
            OutputFormat::Svg => to_svg_string(matrix, border).into_bytes(),
            OutputFormat::SvgFragment => to_svg_fragment(matrix, border).into_bytes(),
            OutputFormat::SvgPath => to_svg_path_string(matrix, border).into_bytes(),
            OutputFormat::Ascii => to_ascii(matrix, border).into_bytes(),
            OutputFormat::Html => to_html_table(matrix).into_bytes(),
        };
        Ok(Rendered {
            bytes,
            media_type: format.media_type(),
        })
    }

    /// Renders with level and format given by name, never rejecting either.
    ///
    /// An unknown level falls back to `M`. An unknown format still produces the
    /// PNG raster, but tags it as `application/octet-stream`.
    pub fn render_named(&self, payload: &str, level: &str, format: &str) -> Result<Rendered> {
        let level = ErrorCorrectionLevel::lookup_or_default(level);
        match OutputFormat::lookup(format) {
            Some(format) => self.render(payload, level, format),
            None => {
                log::warn!("unknown output format {format:?}, sending raw raster");
                let matrix = self.encoder.encode(payload, level)?;
                Ok(Rendered {
                    bytes: to_png(&matrix, &self.options)?,
                    media_type: format::media_type(None),
                })
            }
        }
    }
}

/// Encodes and renders with the default encoder and options.
pub fn render(
    payload: &str,
    level: ErrorCorrectionLevel,
    format: OutputFormat,
) -> Result<Rendered> {
    Renderer::new(RenderOptions::default()).render(payload, level, format)
}

/*---- Raster ----*/

/// Draws the matrix into a grayscale image buffer.
///
/// Every module becomes a `box_size` x `box_size` square, and the symbol is
/// surrounded by `border` light modules. Options outside the ranges checked by
/// [`RenderOptions::validate`] are rejected.
pub fn to_image_buffer(
    matrix: &ModuleMatrix,
    options: &RenderOptions,
) -> Result<ImageBuffer<Luma<u8>, Vec<u8>>> {
    options.validate()?;
    let border = options.border as i64;
    let scale = options.box_size;
    let size = (matrix.size() as u64 + 2 * u64::from(options.border)) * u64::from(scale);
    let size = u32::try_from(size).map_err(|_| {
        image::ImageError::Limits(image::error::LimitError::from_kind(
            image::error::LimitErrorKind::DimensionError,
        ))
    })?;
    let mut img = ImageBuffer::new(size, size);

    for (x, y, pixel) in img.enumerate_pixels_mut() {
        let qr_x = (x / scale) as i64 - border;
        let qr_y = (y / scale) as i64 - border;
        *pixel = if matrix.get(qr_x, qr_y) {
            Luma([0u8]) // Black
        } else {
            Luma([255u8]) // White
        };
    }

    Ok(img)
}

/// Draws the matrix and serializes it as PNG.
pub fn to_png(matrix: &ModuleMatrix, options: &RenderOptions) -> Result<Vec<u8>> {
    let img = to_image_buffer(matrix, options)?;
    let mut bytes = Vec::new();
    img.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)?;
    Ok(bytes)
}

/*---- Vector ----*/

fn svg_open(matrix: &ModuleMatrix, border: u32) -> String {
    let dimension = matrix.size() as u64 + 2 * u64::from(border);
    format!(
        "<svg xmlns=\"http://www.w3.org/2000/svg\" version=\"1.1\" width=\"{0}mm\" height=\"{0}mm\" viewBox=\"0 0 {0} {0}\">\n",
        dimension
    )
}

fn svg_rects(matrix: &ModuleMatrix, border: u32, out: &mut String) {
    for (y, row) in matrix.rows().enumerate() {
        for (x, &dark) in row.iter().enumerate() {
            if dark {
                out.push_str(&format!(
                    "\t<rect x=\"{}\" y=\"{}\" width=\"1\" height=\"1\" fill=\"#000000\"/>\n",
                    x as u64 + u64::from(border),
                    y as u64 + u64::from(border)
                ));
            }
        }
    }
}

/// Returns a standalone SVG document drawing one rectangle per dark module,
/// with `border` modules of quiet zone. Always uses Unix newlines.
pub fn to_svg_string(matrix: &ModuleMatrix, border: u32) -> String {
    let mut result = String::new();
    result += SVG_PROLOG;
    result += &svg_open(matrix, border);
    result += "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n";
    svg_rects(matrix, border, &mut result);
    result += "</svg>\n";
    result
}

/// Returns a bare `<svg>` element, without XML prolog or background, for
/// embedding in another document.
pub fn to_svg_fragment(matrix: &ModuleMatrix, border: u32) -> String {
    let mut result = svg_open(matrix, border);
    svg_rects(matrix, border, &mut result);
    result += "</svg>\n";
    result
}

/// Returns a standalone SVG document where all dark modules form a single path.
pub fn to_svg_path_string(matrix: &ModuleMatrix, border: u32) -> String {
    let mut result = String::new();
    result += SVG_PROLOG;
    result += SVG_DOCTYPE;
    result += &svg_open(matrix, border);
    result += "\t<rect width=\"100%\" height=\"100%\" fill=\"#FFFFFF\"/>\n";
    result += "\t<path d=\"";
    let mut first = true;
    for (y, row) in matrix.rows().enumerate() {
        for (x, &dark) in row.iter().enumerate() {
            if dark {
                if !first {
                    result += " ";
                }
                first = false;
                result += &format!(
                    "M{},{}h1v1h-1z",
                    x as u64 + u64::from(border),
                    y as u64 + u64::from(border)
                );
            }
        }
    }
    result += "\" fill=\"#000000\"/>\n";
    result += "</svg>\n";
    result
}

/*---- Text ----*/

/// Draws the matrix with half-block characters, two module rows per line, so
/// the symbol keeps its square shape in a terminal.
pub fn to_ascii(matrix: &ModuleMatrix, border: u32) -> String {
    const BLOCKS: [char; 4] = [' ', '▀', '▄', '█'];
    let border = border as i64;
    let end = matrix.size() as i64 + border;
    let mut out = String::new();
    for y in (-border..end).step_by(2) {
        for x in -border..end {
            let top = matrix.get(x, y) as usize;
            let bottom = matrix.get(x, y + 1) as usize;
            out.push(BLOCKS[top | bottom << 1]);
        }
        out.push('\n');
    }
    out
}

/// Renders the matrix as an HTML table, merging runs of equal modules in a row
/// into one cell with a `colspan`.
///
/// # Example
///
/// ```
/// use qrgen::encoder::ModuleMatrix;
/// use qrgen::render::to_html_table;
///
/// let matrix = ModuleMatrix::from_rows(vec![vec![true, true, false]]);
/// let html = to_html_table(&matrix);
/// assert!(html.contains(r#"<tr><td class="black" colspan="2" /><td class="white" /></tr>"#));
/// ```
pub fn to_html_table(matrix: &ModuleMatrix) -> String {
    let mut out = String::from(HTML_PREAMBLE);
    for row in matrix.rows() {
        out.push_str("<tr>");
        let mut run: Option<(bool, usize)> = None;
        for &dark in row {
            run = match run {
                Some((value, count)) if value == dark => Some((value, count + 1)),
                Some((value, count)) => {
                    push_cell(&mut out, value, count);
                    Some((dark, 1))
                }
                None => Some((dark, 1)),
            };
        }
        if let Some((value, count)) = run {
            push_cell(&mut out, value, count);
        }
        out.push_str("</tr>\n");
    }
    out.push_str(HTML_FOOTER);
    out
}

fn push_cell(out: &mut String, dark: bool, count: usize) {
    let class = if dark { "black" } else { "white" };
    if count > 1 {
        out.push_str(&format!("<td class=\"{class}\" colspan=\"{count}\" />"));
    } else {
        out.push_str(&format!("<td class=\"{class}\" />"));
    }
}
