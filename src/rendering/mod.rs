//! Rendering pipeline: state -> layout -> display list -> bitmap -> PNG
//!
//! `render` is the toolkit-independent "renderable surface": it turns the
//! current state into a `Frame` that any `Rasterizer` can paint.

pub mod layout;
pub mod paint;
pub mod raster;

use std::io::Cursor;

use image::{ExtendedColorType, ImageEncoder};

use crate::data_url::DataUrl;
use crate::state::CompositionState;
use crate::{ComposerConfig, Error, Result};

pub use layout::{FrameGeometry, Rect, RoundedRect};
pub use paint::{DisplayItem, ImageSource, PaintCommand};
pub use raster::{RasterOptions, SoftwareRasterizer};

/// Straight-alpha RGBA pixels
pub type Bitmap = image::RgbaImage;

/// A laid-out mockup ready to be rasterized
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    /// Size in CSS pixels
    pub width: u32,
    pub height: u32,
    pub items: Vec<DisplayItem>,
}

/// Lay out and paint the mockup for `state`.
pub fn render(state: &CompositionState, config: &ComposerConfig) -> Frame {
    let geometry = &config.frame;
    let layout = layout::layout_frame(geometry);
    let items =
        paint::build_display_list(&layout, state, &config.top_image_url, geometry.overlay_inset);
    Frame {
        width: geometry.width,
        height: geometry.height,
        items,
    }
}

/// An encoded PNG together with its pixel size
#[derive(Debug, Clone)]
pub struct Screenshot {
    pub width: u32,
    pub height: u32,
    pub png_data: Vec<u8>,
}

impl Screenshot {
    /// Wrap the PNG bytes as a `data:image/png` URL.
    pub fn to_data_url(&self) -> DataUrl {
        DataUrl::from_bytes("image/png", &self.png_data)
    }
}

pub fn encode_png(bitmap: &Bitmap) -> Result<Screenshot> {
    let mut png_data = Vec::new();
    image::codecs::png::PngEncoder::new(Cursor::new(&mut png_data))
        .write_image(
            bitmap.as_raw(),
            bitmap.width(),
            bitmap.height(),
            ExtendedColorType::Rgba8,
        )
        .map_err(|e| Error::EncodeError(e.to_string()))?;
    Ok(Screenshot {
        width: bitmap.width(),
        height: bitmap.height(),
        png_data,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_uses_configured_geometry_and_top_image() {
        let config = ComposerConfig {
            top_image_url: "https://img.test/top.jpg".to_string(),
            ..Default::default()
        };
        let frame = render(&CompositionState::new(), &config);
        assert_eq!((frame.width, frame.height), (360, 720));
        let remote: Vec<&str> = frame
            .items
            .iter()
            .filter_map(|item| match &item.command {
                PaintCommand::Image {
                    source: ImageSource::Remote(url),
                    ..
                } => Some(url.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(remote, vec!["https://img.test/top.jpg"]);
    }

    #[test]
    fn encode_png_writes_signature() {
        let bitmap = Bitmap::from_pixel(4, 2, image::Rgba([1, 2, 3, 4]));
        let shot = encode_png(&bitmap).unwrap();
        assert_eq!((shot.width, shot.height), (4, 2));
        assert_eq!(&shot.png_data[0..8], b"\x89PNG\r\n\x1a\n");
        assert!(shot.to_data_url().as_str().starts_with("data:image/png;base64,iVBORw0KGgo"));
        let decoded = image::load_from_memory(&shot.png_data).unwrap().to_rgba8();
        assert_eq!(decoded.get_pixel(3, 1).0, [1, 2, 3, 4]);
    }
}
