/// Software rasterizer for `Frame` display lists

use std::sync::Arc;
use std::time::Instant;

use embedded_graphics::mono_font::MonoTextStyle;
use embedded_graphics::pixelcolor::Rgb888;
use embedded_graphics::prelude::*;
use embedded_graphics::primitives::{Polyline, PrimitiveStyle};
use embedded_graphics::text::{Baseline, Text};
use image::imageops::FilterType;
use image::DynamicImage;

use crate::platform::AssetLoader;
use crate::rendering::layout::{Rect, RoundedRect};
use crate::rendering::paint::{
    GradientDirection, Icon, ImageSource, PaintCommand, Rgba, TextShadow, TextStyle,
};
use crate::rendering::{Bitmap, Frame};
use crate::{Error, Rasterizer, Result};

/// Knobs for a single rasterization. Every render starts from a fully
/// transparent canvas.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RasterOptions {
    /// Device pixels per CSS pixel
    pub scale: u32,
    /// Emit per-command debug logs
    pub logging: bool,
    /// Fetch remote images; when off they are left out
    pub use_cors: bool,
    /// Tolerate remote images that fail to load instead of failing the render
    pub allow_taint: bool,
}

impl RasterOptions {
    /// The fixed configuration used when exporting a composition
    pub fn export() -> Self {
        Self {
            scale: 2,
            logging: false,
            use_cors: true,
            allow_taint: true,
        }
    }
}

/// Paints display lists on the CPU, fetching remote images through an
/// `AssetLoader`.
pub struct SoftwareRasterizer {
    assets: Arc<dyn AssetLoader>,
}

impl SoftwareRasterizer {
    pub fn new(assets: Arc<dyn AssetLoader>) -> Self {
        Self { assets }
    }

    fn resolve_image(
        &self,
        source: &ImageSource,
        options: &RasterOptions,
    ) -> Result<Option<DynamicImage>> {
        match source {
            ImageSource::Inline(data) => {
                // A broken upload renders as nothing, like a broken <img>.
                match data.decode().and_then(|bytes| Ok(image::load_from_memory(&bytes)?)) {
                    Ok(img) => Ok(Some(img)),
                    Err(e) => {
                        log::warn!("Skipping undecodable uploaded image: {}", e);
                        Ok(None)
                    }
                }
            }
            ImageSource::Remote(url) => {
                if !options.use_cors {
                    if options.logging {
                        log::debug!("Remote image {} not fetched (use_cors disabled)", url);
                    }
                    return Ok(None);
                }
                let loaded = self
                    .assets
                    .load(url)
                    .and_then(|bytes| Ok(image::load_from_memory(&bytes)?));
                match loaded {
                    Ok(img) => Ok(Some(img)),
                    Err(e) if options.allow_taint => {
                        log::warn!("Skipping remote image {}: {}", url, e);
                        Ok(None)
                    }
                    Err(e @ Error::AssetError { .. }) => Err(e),
                    Err(e) => Err(Error::AssetError {
                        url: url.clone(),
                        reason: e.to_string(),
                    }),
                }
            }
        }
    }
}

impl Rasterizer for SoftwareRasterizer {
    fn rasterize(&self, frame: &Frame, options: &RasterOptions) -> Result<Bitmap> {
        if options.scale == 0 {
            return Err(Error::RenderError("scale must be at least 1".into()));
        }
        let (width, height) = match (
            frame.width.checked_mul(options.scale),
            frame.height.checked_mul(options.scale),
        ) {
            (Some(w), Some(h)) if w > 0 && h > 0 => (w, h),
            _ => {
                return Err(Error::RenderError(format!(
                    "invalid target size {}x{} at scale {}",
                    frame.width, frame.height, options.scale
                )))
            }
        };

        let started = Instant::now();
        let mut bitmap = Bitmap::new(width, height);

        for (index, item) in frame.items.iter().enumerate() {
            if options.logging {
                log::debug!("paint #{} {}", index, command_name(&item.command));
            }
            let mut canvas = Canvas::new(&mut bitmap, options.scale, item.clip);
            match &item.command {
                PaintCommand::SolidRect { shape, rgba } => canvas.fill_shape(shape, |_, _| *rgba),
                PaintCommand::Gradient {
                    shape,
                    from,
                    to,
                    direction,
                } => {
                    let rect = shape.rect;
                    canvas.fill_shape(shape, |x, y| {
                        lerp(*from, *to, gradient_t(&rect, *direction, x, y))
                    })
                }
                PaintCommand::Image { rect, source } => {
                    if let Some(img) = self.resolve_image(source, options)? {
                        canvas.draw_image(rect, &img);
                    }
                }
                PaintCommand::Text {
                    x,
                    y,
                    text,
                    style,
                    rgba,
                    shadow,
                } => canvas.draw_text(*x, *y, text, *style, *rgba, *shadow),
                PaintCommand::Icon { rect, icon, rgba } => canvas.draw_icon(rect, *icon, *rgba),
            }
        }

        if options.logging {
            log::debug!(
                "Rasterized {}x{} ({} items) in {:?}",
                width,
                height,
                frame.items.len(),
                started.elapsed()
            );
        }
        Ok(bitmap)
    }
}

fn command_name(command: &PaintCommand) -> &'static str {
    match command {
        PaintCommand::SolidRect { .. } => "solid-rect",
        PaintCommand::Gradient { .. } => "gradient",
        PaintCommand::Image { .. } => "image",
        PaintCommand::Text { .. } => "text",
        PaintCommand::Icon { .. } => "icon",
    }
}

/// Position along the gradient line, 0 at the start color and 1 at the end.
fn gradient_t(rect: &Rect, direction: GradientDirection, x: f32, y: f32) -> f32 {
    let w = rect.width as f32;
    let h = rect.height as f32;
    let (dx, dy) = match direction {
        GradientDirection::Angle(deg) => {
            let rad = deg.to_radians();
            (rad.sin(), -rad.cos())
        }
        GradientDirection::ToBottomRight => {
            // Perpendicular to the bottom-left/top-right diagonal.
            let n = (w * w + h * h).sqrt().max(f32::EPSILON);
            (h / n, w / n)
        }
    };
    let len = (w * dx).abs() + (h * dy).abs();
    if len <= f32::EPSILON {
        return 0.0;
    }
    let mx = rect.x as f32 + w / 2.0;
    let my = rect.y as f32 + h / 2.0;
    (((x - mx) * dx + (y - my) * dy) / len + 0.5).clamp(0.0, 1.0)
}

fn lerp(from: Rgba, to: Rgba, t: f32) -> Rgba {
    let mix = |a: u8, b: u8| (a as f32 + (b as f32 - a as f32) * t).round() as u8;
    (mix(from.0, to.0), mix(from.1, to.1), mix(from.2, to.2), mix(from.3, to.3))
}

/// Source-over compositing in straight alpha
fn blend_over(dst: image::Rgba<u8>, src: Rgba) -> image::Rgba<u8> {
    let sa = src.3 as f32 / 255.0;
    if sa <= 0.0 {
        return dst;
    }
    if src.3 == 255 {
        return image::Rgba([src.0, src.1, src.2, 255]);
    }
    let da = dst[3] as f32 / 255.0;
    let oa = sa + da * (1.0 - sa);
    let channel = |s: u8, d: u8| ((s as f32 * sa + d as f32 * da * (1.0 - sa)) / oa).round() as u8;
    image::Rgba([
        channel(src.0, dst[0]),
        channel(src.1, dst[1]),
        channel(src.2, dst[2]),
        (oa * 255.0).round() as u8,
    ])
}

/// Target for one display item: CSS coordinates in, device pixels out.
struct Canvas<'a> {
    bitmap: &'a mut Bitmap,
    scale: u32,
    clip: Option<RoundedRect>,
    /// Alpha applied to colors coming through `DrawTarget`
    alpha: u8,
}

impl<'a> Canvas<'a> {
    fn new(bitmap: &'a mut Bitmap, scale: u32, clip: Option<RoundedRect>) -> Self {
        Self {
            bitmap,
            scale,
            clip,
            alpha: 255,
        }
    }

    fn visible(&self, x: f32, y: f32) -> bool {
        self.clip.map_or(true, |c| c.contains(x, y))
    }

    /// CSS coordinate at the center of a device pixel
    fn css(&self, device: i64) -> f32 {
        (device as f32 + 0.5) / self.scale as f32
    }

    fn blend(&mut self, dx: i64, dy: i64, rgba: Rgba) {
        let (w, h) = (self.bitmap.width() as i64, self.bitmap.height() as i64);
        if dx < 0 || dy < 0 || dx >= w || dy >= h {
            return;
        }
        let (cx, cy) = (self.css(dx), self.css(dy));
        if !self.visible(cx, cy) {
            return;
        }
        let px = self.bitmap.get_pixel_mut(dx as u32, dy as u32);
        *px = blend_over(*px, rgba);
    }

    /// Device-pixel span of `rect`, clamped to the bitmap
    fn device_span(&self, rect: &Rect) -> (i64, i64, i64, i64) {
        let s = self.scale as i64;
        let x0 = (rect.x as i64 * s).max(0);
        let y0 = (rect.y as i64 * s).max(0);
        let x1 = (rect.right() as i64 * s).min(self.bitmap.width() as i64);
        let y1 = (rect.bottom() as i64 * s).min(self.bitmap.height() as i64);
        (x0, y0, x1, y1)
    }

    fn fill_shape(&mut self, shape: &RoundedRect, color: impl Fn(f32, f32) -> Rgba) {
        let (x0, y0, x1, y1) = self.device_span(&shape.rect);
        for dy in y0..y1 {
            let cy = self.css(dy);
            for dx in x0..x1 {
                let cx = self.css(dx);
                if shape.contains(cx, cy) {
                    self.blend(dx, dy, color(cx, cy));
                }
            }
        }
    }

    fn draw_image(&mut self, rect: &Rect, img: &DynamicImage) {
        let dw = rect.width * self.scale;
        let dh = rect.height * self.scale;
        if dw == 0 || dh == 0 {
            return;
        }
        let fitted = img.resize_to_fill(dw, dh, FilterType::Triangle).to_rgba8();
        let ox = rect.x as i64 * self.scale as i64;
        let oy = rect.y as i64 * self.scale as i64;
        for (ix, iy, px) in fitted.enumerate_pixels() {
            let [r, g, b, a] = px.0;
            self.blend(ox + ix as i64, oy + iy as i64, (r, g, b, a));
        }
    }

    fn draw_text(
        &mut self,
        x: i32,
        y: i32,
        text: &str,
        style: TextStyle,
        rgba: Rgba,
        shadow: Option<TextShadow>,
    ) {
        if let Some(shadow) = shadow {
            self.draw_glyphs(x + shadow.dx, y + shadow.dy, text, style, shadow.rgba);
        }
        self.draw_glyphs(x, y, text, style, rgba);
    }

    fn draw_glyphs(&mut self, x: i32, y: i32, text: &str, style: TextStyle, (r, g, b, a): Rgba) {
        self.alpha = a;
        let character_style = MonoTextStyle::new(style.font(), Rgb888::new(r, g, b));
        let _ = Text::with_baseline(text, Point::new(x, y), character_style, Baseline::Top)
            .draw(self);
    }

    fn draw_icon(&mut self, rect: &Rect, icon: Icon, (r, g, b, a): Rgba) {
        match icon {
            Icon::Upload => {
                // 24-unit outline: tray, arrow head, arrow stem
                const STROKES: [&[(i32, i32)]; 3] = [
                    &[(3, 15), (3, 19), (5, 21), (19, 21), (21, 19), (21, 15)],
                    &[(17, 8), (12, 3), (7, 8)],
                    &[(12, 3), (12, 15)],
                ];
                let unit = (rect.width.min(rect.height) / 24).max(1) as i32;
                let style = PrimitiveStyle::with_stroke(Rgb888::new(r, g, b), (2 * unit) as u32);
                self.alpha = a;
                for stroke in STROKES {
                    let points: Vec<Point> = stroke
                        .iter()
                        .map(|(ux, uy)| Point::new(rect.x + ux * unit, rect.y + uy * unit))
                        .collect();
                    let _ = Polyline::new(&points).into_styled(style).draw(self);
                }
            }
        }
    }
}

impl OriginDimensions for Canvas<'_> {
    fn size(&self) -> Size {
        Size::new(self.bitmap.width() / self.scale, self.bitmap.height() / self.scale)
    }
}

impl DrawTarget for Canvas<'_> {
    type Color = Rgb888;
    type Error = core::convert::Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> std::result::Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let s = self.scale as i64;
        let alpha = self.alpha;
        for Pixel(point, color) in pixels {
            let rgba = (color.r(), color.g(), color.b(), alpha);
            for sy in 0..s {
                for sx in 0..s {
                    self.blend(point.x as i64 * s + sx, point.y as i64 * s + sy, rgba);
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::assets::StaticAssets;
    use crate::rendering::paint::DisplayItem;

    fn solid(rect: Rect, rgba: Rgba) -> DisplayItem {
        DisplayItem {
            command: PaintCommand::SolidRect {
                shape: RoundedRect::square(rect),
                rgba,
            },
            clip: None,
        }
    }

    fn rasterizer() -> SoftwareRasterizer {
        SoftwareRasterizer::new(Arc::new(StaticAssets::new()))
    }

    #[test]
    fn scale_multiplies_dimensions() {
        let frame = Frame {
            width: 10,
            height: 5,
            items: vec![solid(Rect::new(0, 0, 10, 5), (255, 0, 0, 255))],
        };
        let bitmap = rasterizer().rasterize(&frame, &RasterOptions::export()).unwrap();
        assert_eq!(bitmap.dimensions(), (20, 10));
        assert_eq!(bitmap.get_pixel(19, 9).0, [255, 0, 0, 255]);
    }

    #[test]
    fn transparent_background_stays_clear_outside_shapes() {
        let frame = Frame {
            width: 10,
            height: 10,
            items: vec![solid(Rect::new(0, 0, 5, 10), (0, 0, 255, 255))],
        };
        let bitmap = rasterizer().rasterize(&frame, &RasterOptions::export()).unwrap();
        assert_eq!(bitmap.get_pixel(15, 5).0, [0, 0, 0, 0]);
        assert_eq!(bitmap.get_pixel(2, 5).0, [0, 0, 255, 255]);
    }

    #[test]
    fn clip_limits_painting() {
        let mut item = solid(Rect::new(0, 0, 10, 10), (0, 255, 0, 255));
        item.clip = Some(RoundedRect::square(Rect::new(0, 0, 4, 4)));
        let frame = Frame {
            width: 10,
            height: 10,
            items: vec![item],
        };
        let opts = RasterOptions {
            scale: 1,
            ..RasterOptions::export()
        };
        let bitmap = rasterizer().rasterize(&frame, &opts).unwrap();
        assert_eq!(bitmap.get_pixel(1, 1).0[3], 255);
        assert_eq!(bitmap.get_pixel(6, 6).0[3], 0);
    }

    #[test]
    fn zero_scale_is_rejected() {
        let frame = Frame {
            width: 1,
            height: 1,
            items: vec![],
        };
        let opts = RasterOptions {
            scale: 0,
            ..RasterOptions::export()
        };
        assert!(matches!(rasterizer().rasterize(&frame, &opts), Err(Error::RenderError(_))));
    }

    #[test]
    fn missing_remote_image_respects_taint_policy() {
        let frame = Frame {
            width: 4,
            height: 4,
            items: vec![DisplayItem {
                command: PaintCommand::Image {
                    rect: Rect::new(0, 0, 4, 4),
                    source: ImageSource::Remote("https://img.test/missing.jpg".into()),
                },
                clip: None,
            }],
        };
        let tolerant = RasterOptions::export();
        assert!(rasterizer().rasterize(&frame, &tolerant).is_ok());

        let strict = RasterOptions {
            allow_taint: false,
            ..RasterOptions::export()
        };
        assert!(matches!(
            rasterizer().rasterize(&frame, &strict),
            Err(Error::AssetError { .. })
        ));
    }

    #[test]
    fn text_paints_glyph_pixels() {
        let frame = Frame {
            width: 40,
            height: 20,
            items: vec![DisplayItem {
                command: PaintCommand::Text {
                    x: 0,
                    y: 0,
                    text: "HI".into(),
                    style: TextStyle::Label,
                    rgba: (255, 255, 255, 255),
                    shadow: None,
                },
                clip: None,
            }],
        };
        let bitmap = rasterizer().rasterize(&frame, &RasterOptions::export()).unwrap();
        assert!(bitmap.pixels().any(|p| p.0 == [255, 255, 255, 255]));
    }

    fn render_label(text: &str) -> Bitmap {
        let frame = Frame {
            width: 60,
            height: 20,
            items: vec![DisplayItem {
                command: PaintCommand::Text {
                    x: 0,
                    y: 0,
                    text: text.into(),
                    style: TextStyle::Label,
                    rgba: (255, 255, 255, 255),
                    shadow: None,
                },
                clip: None,
            }],
        };
        rasterizer().rasterize(&frame, &RasterOptions::export()).unwrap()
    }

    #[test]
    fn latin1_handle_keeps_accented_glyphs() {
        assert_ne!(render_label("@zoë"), render_label("@zo?"));
        assert_ne!(render_label("@Ñandú"), render_label("@?and?"));
    }

    #[test]
    fn blend_over_mixes_translucent_source() {
        let out = blend_over(image::Rgba([0, 0, 0, 255]), (255, 255, 255, 128));
        assert_eq!(out.0[3], 255);
        assert!(out.0[0] > 120 && out.0[0] < 135);
        let untouched = blend_over(image::Rgba([1, 2, 3, 4]), (9, 9, 9, 0));
        assert_eq!(untouched.0, [1, 2, 3, 4]);
    }

    #[test]
    fn angle_gradient_runs_start_to_end() {
        let rect = Rect::new(0, 0, 100, 100);
        // 180deg points straight down.
        assert!(gradient_t(&rect, GradientDirection::Angle(180.0), 50.0, 0.0) < 0.01);
        assert!(gradient_t(&rect, GradientDirection::Angle(180.0), 50.0, 100.0) > 0.99);
        assert!(gradient_t(&rect, GradientDirection::ToBottomRight, 0.0, 0.0) < 0.01);
        assert!(gradient_t(&rect, GradientDirection::ToBottomRight, 100.0, 100.0) > 0.99);
    }
}
