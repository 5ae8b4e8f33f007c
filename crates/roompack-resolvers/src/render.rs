//! Card rendering
//!
//! Cards are the base image with the title written vertically: one column
//! per line of the title, columns placed right to left, characters top to
//! bottom. The font size is chosen so the longest line fits the image height.

use ab_glyph::{point, Font, FontArc, PxScale};
use async_trait::async_trait;
use image::{DynamicImage, ImageFormat, Rgba, RgbaImage};
use roompack_bundle::{ResolveError, ResolveResult};
use std::io::Cursor;
use std::path::Path;

/// Encodings a card can be rendered in
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CardFormat {
    /// `image/png`
    Png,
    /// `image/jpeg`
    Jpeg,
}

impl CardFormat {
    /// Format for a media type, if cards support it
    #[must_use]
    pub fn from_media_type(media_type: &str) -> Option<Self> {
        match media_type {
            "image/png" => Some(Self::Png),
            "image/jpeg" => Some(Self::Jpeg),
            _ => None,
        }
    }

    /// Media type of the encoded card
    #[inline]
    #[must_use]
    pub fn media_type(self) -> &'static str {
        match self {
            Self::Png => "image/png",
            Self::Jpeg => "image/jpeg",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            Self::Png => ImageFormat::Png,
            Self::Jpeg => ImageFormat::Jpeg,
        }
    }
}

/// Produces one card image from the base image and a title
#[async_trait]
pub trait CardRenderer: Send + Sync {
    /// Render `title` onto `base` and encode the result as `format`
    async fn render(&self, base: &[u8], title: &str, format: CardFormat) -> ResolveResult<Vec<u8>>;
}

/// Layout tuning for vertical text
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LayoutOptions {
    /// Margin kept free above and below the text, in pixels
    pub padding: f32,
    /// Upper bound on the font size, in pixels
    pub max_font_size: f32,
}

impl Default for LayoutOptions {
    fn default() -> Self {
        Self {
            padding: 10.0,
            max_font_size: 80.0,
        }
    }
}

/// Position of one character; `y` is the baseline
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GlyphCell {
    /// Character to draw
    pub ch: char,
    /// Left edge of the column
    pub x: f32,
    /// Baseline
    pub y: f32,
}

/// Result of laying out a title
#[derive(Debug, Clone, PartialEq)]
pub struct VerticalLayout {
    /// Font size (and square cell size) in pixels
    pub font_size: f32,
    /// Characters in drawing order
    pub cells: Vec<GlyphCell>,
}

/// Lay out `text` vertically on a `width` x `height` canvas
#[must_use]
pub fn vertical_layout(width: u32, height: u32, text: &str, options: LayoutOptions) -> VerticalLayout {
    let lines: Vec<&str> = text.split('\n').collect();
    let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);

    let (width, height) = (width as f32, height as f32);
    let usable = (height - options.padding * 2.0).max(0.0);
    let font_size = if longest == 0 {
        options.max_font_size
    } else {
        (usable / longest as f32).min(options.max_font_size).floor()
    };

    let cell = font_size;
    let start_y = (height - cell * longest as f32) / 2.0;
    let columns = lines.len() as f32;

    let mut cells = Vec::with_capacity(text.len());
    for (i, line) in lines.iter().enumerate() {
        let x = (width + columns * cell) / 2.0 - cell * (i as f32 + 1.0);
        for (j, ch) in line.chars().enumerate() {
            let y = start_y + cell * (j as f32 + 1.0);
            cells.push(GlyphCell { ch, x, y });
        }
    }

    VerticalLayout { font_size, cells }
}

/// Decode the base image into an RGBA canvas
///
/// # Errors
/// `ResolveError::Render` if the bytes are not a valid image of `format`
pub fn decode_base(base: &[u8], format: CardFormat) -> ResolveResult<RgbaImage> {
    image::load_from_memory_with_format(base, format.image_format())
        .map(|img| img.to_rgba8())
        .map_err(|e| ResolveError::Render(format!("failed to decode base image: {e}")))
}

/// Encode a canvas as `format`
///
/// JPEG has no alpha channel, so the canvas is flattened to RGB first.
///
/// # Errors
/// `ResolveError::Render` if encoding fails
pub fn encode_card(canvas: RgbaImage, format: CardFormat) -> ResolveResult<Vec<u8>> {
    let image = match format {
        CardFormat::Png => DynamicImage::ImageRgba8(canvas),
        CardFormat::Jpeg => DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(canvas).to_rgb8()),
    };
    let mut out = Cursor::new(Vec::new());
    image
        .write_to(&mut out, format.image_format())
        .map_err(|e| ResolveError::Render(format!("failed to encode card: {e}")))?;
    Ok(out.into_inner())
}

/// Renders titles with an outline font onto the base image
#[derive(Clone)]
pub struct GlyphCardRenderer {
    font: FontArc,
    options: LayoutOptions,
    color: Rgba<u8>,
}

impl GlyphCardRenderer {
    /// Create renderer from a parsed font
    #[inline]
    #[must_use]
    pub fn new(font: FontArc) -> Self {
        Self {
            font,
            options: LayoutOptions::default(),
            color: Rgba([255, 255, 255, 255]),
        }
    }

    /// Load a TrueType/OpenType font file
    ///
    /// # Errors
    /// - `ResolveError::Io` if the file cannot be read
    /// - `ResolveError::Render` if it is not a usable font
    pub fn from_file(path: impl AsRef<Path>) -> ResolveResult<Self> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|e| ResolveError::io_error(path, e))?;
        let font = FontArc::try_from_vec(bytes)
            .map_err(|e| ResolveError::Render(format!("invalid font {}: {e}", path.display())))?;
        Ok(Self::new(font))
    }

    /// With layout options
    #[inline]
    #[must_use]
    pub fn with_options(mut self, options: LayoutOptions) -> Self {
        self.options = options;
        self
    }

    /// With glyph color
    #[inline]
    #[must_use]
    pub fn with_color(mut self, color: [u8; 4]) -> Self {
        self.color = Rgba(color);
        self
    }

    /// Draw `title` onto `canvas` in place
    pub fn paint(&self, canvas: &mut RgbaImage, title: &str) {
        let layout = vertical_layout(canvas.width(), canvas.height(), title, self.options);
        let scale = PxScale::from(layout.font_size);
        let (width, height) = canvas.dimensions();

        for cell in &layout.cells {
            let glyph = self
                .font
                .glyph_id(cell.ch)
                .with_scale_and_position(scale, point(cell.x, cell.y));
            let Some(outlined) = self.font.outline_glyph(glyph) else {
                continue;
            };
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, coverage| {
                let px = bounds.min.x as i64 + i64::from(gx);
                let py = bounds.min.y as i64 + i64::from(gy);
                if px < 0 || py < 0 || px >= i64::from(width) || py >= i64::from(height) {
                    return;
                }
                let pixel = canvas.get_pixel_mut(px as u32, py as u32);
                blend(pixel, self.color, coverage);
            });
        }
    }
}

impl std::fmt::Debug for GlyphCardRenderer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GlyphCardRenderer")
            .field("options", &self.options)
            .field("color", &self.color)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl CardRenderer for GlyphCardRenderer {
    async fn render(&self, base: &[u8], title: &str, format: CardFormat) -> ResolveResult<Vec<u8>> {
        let mut canvas = decode_base(base, format)?;
        self.paint(&mut canvas, title);
        encode_card(canvas, format)
    }
}

fn blend(pixel: &mut Rgba<u8>, color: Rgba<u8>, coverage: f32) {
    let alpha = coverage.clamp(0.0, 1.0);
    for channel in 0..3 {
        let under = f32::from(pixel.0[channel]);
        let over = f32::from(color.0[channel]);
        pixel.0[channel] = (under + (over - under) * alpha).round() as u8;
    }
    pixel.0[3] = pixel.0[3].max((alpha * 255.0).round() as u8);
}
