/// Display list for the phone mockup

use embedded_graphics::mono_font::iso_8859_1::{FONT_6X12, FONT_7X14, FONT_7X14_BOLD};
use embedded_graphics::mono_font::MonoFont;

use crate::data_url::DataUrl;
use crate::rendering::layout::{center_column, stack_lines, FrameLayout, Rect, RoundedRect};
use crate::state::CompositionState;

pub type Rgba = (u8, u8, u8, u8);

pub const WHITE: Rgba = (255, 255, 255, 255);
pub const WHITE_90: Rgba = (255, 255, 255, 230);
pub const GRAY_900: Rgba = (17, 24, 39, 255);
pub const GRAY_800: Rgba = (31, 41, 55, 255);
pub const GRAY_700: Rgba = (55, 65, 81, 255);
pub const GRAY_400: Rgba = (156, 163, 175, 255);
/// hsl(220 10% 12%) and hsl(220 10% 8%)
pub const FRAME_LIGHT: Rgba = (28, 30, 34, 255);
pub const FRAME_DARK: Rgba = (18, 20, 22, 255);

pub const TOP_HANDLE: &str = "@wobbles";
pub const CHANNEL_LABEL: &str = "jellyjelly";
pub const PLACEHOLDER_PROMPT: &str = "Upload your image above";

const FRAME_GRADIENT_ANGLE: f32 = 145.0;
const OVERLAY_LINE_GAP: u32 = 4;
const PLACEHOLDER_GAP: u32 = 8;
const ICON_SIZE: u32 = 48;

/// `0 2px 4px rgba(0,0,0,0.8)`; the blur is approximated by a softer offset copy.
pub const LABEL_SHADOW: TextShadow = TextShadow {
    dx: 0,
    dy: 2,
    rgba: (0, 0, 0, 150),
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextStyle {
    /// Small semibold label (handles)
    Label,
    /// Extra-small secondary label
    Caption,
    /// Small regular body text
    Body,
}

impl TextStyle {
    /// Latin-1 bitmap fonts; characters outside that range draw as `?`.
    pub fn font(&self) -> &'static MonoFont<'static> {
        match self {
            TextStyle::Label => &FONT_7X14_BOLD,
            TextStyle::Caption => &FONT_6X12,
            TextStyle::Body => &FONT_7X14,
        }
    }

    pub fn line_height(&self) -> u32 {
        match self {
            TextStyle::Label | TextStyle::Body => 20,
            TextStyle::Caption => 16,
        }
    }

    /// Advance width of a single line in CSS pixels
    pub fn text_width(&self, text: &str) -> u32 {
        let font = self.font();
        let n = text.chars().count() as u32;
        if n == 0 {
            return 0;
        }
        n * font.character_size.width + (n - 1) * font.character_spacing
    }

    /// Offset from the top of the line box to the top of the glyph cell
    pub fn glyph_offset(&self) -> i32 {
        let glyph_h = self.font().character_size.height;
        (self.line_height().saturating_sub(glyph_h) / 2) as i32
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TextShadow {
    pub dx: i32,
    pub dy: i32,
    pub rgba: Rgba,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum GradientDirection {
    /// CSS angle in degrees (0 points up, 90 points right)
    Angle(f32),
    ToBottomRight,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Fetched over the network at raster time
    Remote(String),
    /// Embedded payload from an upload
    Inline(DataUrl),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Icon {
    Upload,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PaintCommand {
    SolidRect {
        shape: RoundedRect,
        rgba: Rgba,
    },
    Gradient {
        shape: RoundedRect,
        from: Rgba,
        to: Rgba,
        direction: GradientDirection,
    },
    /// Image scaled to cover `rect`, cropped centered
    Image {
        rect: Rect,
        source: ImageSource,
    },
    Text {
        x: i32,
        y: i32,
        text: String,
        style: TextStyle,
        rgba: Rgba,
        shadow: Option<TextShadow>,
    },
    Icon {
        rect: Rect,
        icon: Icon,
        rgba: Rgba,
    },
}

/// A paint command with an optional clip shape
#[derive(Debug, Clone, PartialEq)]
pub struct DisplayItem {
    pub command: PaintCommand,
    pub clip: Option<RoundedRect>,
}

impl DisplayItem {
    fn unclipped(command: PaintCommand) -> Self {
        Self { command, clip: None }
    }

    fn clipped(command: PaintCommand, clip: RoundedRect) -> Self {
        Self { command, clip: Some(clip) }
    }
}

/// Paint the mockup for the given state, back to front.
pub fn build_display_list(
    layout: &FrameLayout,
    state: &CompositionState,
    top_image_url: &str,
    overlay_inset: u32,
) -> Vec<DisplayItem> {
    let screen = layout.screen;
    let mut items = vec![
        DisplayItem::unclipped(PaintCommand::Gradient {
            shape: layout.frame,
            from: FRAME_LIGHT,
            to: FRAME_DARK,
            direction: GradientDirection::Angle(FRAME_GRADIENT_ANGLE),
        }),
        DisplayItem::unclipped(PaintCommand::SolidRect {
            shape: screen,
            rgba: WHITE,
        }),
    ];

    // Top half
    items.push(DisplayItem::clipped(
        PaintCommand::SolidRect {
            shape: RoundedRect::square(layout.top_panel),
            rgba: GRAY_900,
        },
        screen,
    ));
    items.push(DisplayItem::clipped(
        PaintCommand::Image {
            rect: layout.top_panel,
            source: ImageSource::Remote(top_image_url.to_string()),
        },
        screen,
    ));
    items.extend(
        overlay_labels(&layout.top_panel, Some(TOP_HANDLE), overlay_inset)
            .into_iter()
            .map(|c| DisplayItem::clipped(c, screen)),
    );

    // Bottom half
    let bottom = layout.bottom_panel;
    items.push(DisplayItem::clipped(
        PaintCommand::SolidRect {
            shape: RoundedRect::square(bottom),
            rgba: GRAY_800,
        },
        screen,
    ));
    match &state.image {
        Some(image) => {
            items.push(DisplayItem::clipped(
                PaintCommand::Image {
                    rect: bottom,
                    source: ImageSource::Inline(image.clone()),
                },
                screen,
            ));
            let handle = state.display_handle();
            items.extend(
                overlay_labels(&bottom, handle.as_deref(), overlay_inset)
                    .into_iter()
                    .map(|c| DisplayItem::clipped(c, screen)),
            );
        }
        None => items.extend(
            placeholder(&bottom)
                .into_iter()
                .map(|c| DisplayItem::clipped(c, screen)),
        ),
    }

    // The notch sits above the screen.
    items.push(DisplayItem::unclipped(PaintCommand::SolidRect {
        shape: layout.notch,
        rgba: FRAME_DARK,
    }));

    items
}

/// Handle line (when present) followed by the channel label.
fn overlay_labels(panel: &Rect, handle: Option<&str>, inset: u32) -> Vec<PaintCommand> {
    let mut lines: Vec<(&str, TextStyle, Rgba)> = Vec::with_capacity(2);
    if let Some(handle) = handle {
        lines.push((handle, TextStyle::Label, WHITE));
    }
    lines.push((CHANNEL_LABEL, TextStyle::Caption, WHITE_90));

    let heights: Vec<u32> = lines.iter().map(|(_, s, _)| s.line_height()).collect();
    let x = panel.x + inset as i32;
    stack_lines(panel.y + inset as i32, &heights, OVERLAY_LINE_GAP)
        .into_iter()
        .zip(lines)
        .map(|(y, (text, style, rgba))| PaintCommand::Text {
            x,
            y: y + style.glyph_offset(),
            text: text.to_string(),
            style,
            rgba,
            shadow: Some(LABEL_SHADOW),
        })
        .collect()
}

fn placeholder(panel: &Rect) -> Vec<PaintCommand> {
    let style = TextStyle::Body;
    let boxes = center_column(
        panel,
        &[
            (ICON_SIZE, ICON_SIZE),
            (style.text_width(PLACEHOLDER_PROMPT), style.line_height()),
        ],
        PLACEHOLDER_GAP,
    );
    vec![
        PaintCommand::Gradient {
            shape: RoundedRect::square(*panel),
            from: GRAY_700,
            to: GRAY_800,
            direction: GradientDirection::ToBottomRight,
        },
        PaintCommand::Icon {
            rect: boxes[0],
            icon: Icon::Upload,
            rgba: GRAY_400,
        },
        PaintCommand::Text {
            x: boxes[1].x,
            y: boxes[1].y + style.glyph_offset(),
            text: PLACEHOLDER_PROMPT.to_string(),
            style,
            rgba: GRAY_400,
            shadow: None,
        },
    ]
}
