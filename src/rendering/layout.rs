/// Fixed layout of the phone mockup in CSS pixels

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Rect {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl Rect {
    pub const fn new(x: i32, y: i32, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn right(&self) -> i32 {
        self.x + self.width as i32
    }

    pub fn bottom(&self) -> i32 {
        self.y + self.height as i32
    }

    /// Shrink by `amount` on every side.
    pub fn inset(&self, amount: u32) -> Rect {
        Rect {
            x: self.x + amount as i32,
            y: self.y + amount as i32,
            width: self.width.saturating_sub(amount * 2),
            height: self.height.saturating_sub(amount * 2),
        }
    }

    /// Split into two equal-height halves, top first.
    pub fn split_vertical(&self) -> (Rect, Rect) {
        let top_h = self.height / 2;
        let top = Rect { height: top_h, ..*self };
        let bottom = Rect {
            y: self.y + top_h as i32,
            height: self.height - top_h,
            ..*self
        };
        (top, bottom)
    }

    pub fn contains(&self, px: f32, py: f32) -> bool {
        px >= self.x as f32
            && px < self.right() as f32
            && py >= self.y as f32
            && py < self.bottom() as f32
    }
}

/// A rectangle with per-corner radii, clockwise from top-left.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoundedRect {
    pub rect: Rect,
    pub radii: [u32; 4],
}

impl RoundedRect {
    pub fn uniform(rect: Rect, radius: u32) -> Self {
        Self { rect, radii: [radius; 4] }
    }

    pub fn square(rect: Rect) -> Self {
        Self::uniform(rect, 0)
    }

    /// Overlapping radii are scaled down uniformly, as CSS does.
    fn radius_scale(&self) -> f32 {
        let [tl, tr, br, bl] = self.radii.map(|r| r as f32);
        let w = self.rect.width as f32;
        let h = self.rect.height as f32;
        [(w, tl + tr), (h, tr + br), (w, br + bl), (h, bl + tl)]
            .iter()
            .filter(|(_, sum)| *sum > 0.0)
            .map(|(side, sum)| side / sum)
            .fold(1.0_f32, f32::min)
    }

    /// Point-in-shape test at CSS pixel coordinates.
    pub fn contains(&self, px: f32, py: f32) -> bool {
        if !self.rect.contains(px, py) {
            return false;
        }
        let left = self.rect.x as f32;
        let top = self.rect.y as f32;
        let right = self.rect.right() as f32;
        let bottom = self.rect.bottom() as f32;
        let factor = self.radius_scale();
        let corners = [
            (left, top, 1.0, 1.0),
            (right, top, -1.0, 1.0),
            (right, bottom, -1.0, -1.0),
            (left, bottom, 1.0, -1.0),
        ];
        for (i, (cx, cy, sx, sy)) in corners.iter().enumerate() {
            let r = self.radii[i] as f32 * factor;
            if r <= 0.0 {
                continue;
            }
            let ox = cx + sx * r;
            let oy = cy + sy * r;
            let in_corner_x = if *sx > 0.0 { px < ox } else { px > ox };
            let in_corner_y = if *sy > 0.0 { py < oy } else { py > oy };
            if in_corner_x && in_corner_y {
                let dx = px - ox;
                let dy = py - oy;
                if dx * dx + dy * dy > r * r {
                    return false;
                }
            }
        }
        true
    }
}

/// Dimensions of the mockup; the defaults match the larger breakpoint of the
/// web preview.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameGeometry {
    pub width: u32,
    pub height: u32,
    pub padding: u32,
    pub frame_radius: u32,
    pub screen_radius: u32,
    pub notch_width: u32,
    pub notch_height: u32,
    pub notch_radius: u32,
    /// Distance of the overlay text block from the panel's top-left corner
    pub overlay_inset: u32,
}

impl Default for FrameGeometry {
    fn default() -> Self {
        Self {
            width: 360,
            height: 720,
            padding: 12,
            frame_radius: 48,
            screen_radius: 40,
            notch_width: 160,
            notch_height: 28,
            notch_radius: 24,
            overlay_inset: 16,
        }
    }
}

/// Resolved boxes of the mockup
#[derive(Debug, Clone, PartialEq)]
pub struct FrameLayout {
    pub frame: RoundedRect,
    pub screen: RoundedRect,
    pub notch: RoundedRect,
    pub top_panel: Rect,
    pub bottom_panel: Rect,
}

pub fn layout_frame(geometry: &FrameGeometry) -> FrameLayout {
    let outer = Rect::new(0, 0, geometry.width, geometry.height);
    let screen = outer.inset(geometry.padding);
    let (top_panel, bottom_panel) = screen.split_vertical();

    let notch_w = geometry.notch_width.min(geometry.width);
    let notch = Rect::new(
        ((geometry.width - notch_w) / 2) as i32,
        0,
        notch_w,
        geometry.notch_height,
    );

    FrameLayout {
        frame: RoundedRect::uniform(outer, geometry.frame_radius),
        screen: RoundedRect::uniform(screen, geometry.screen_radius),
        notch: RoundedRect {
            rect: notch,
            radii: [0, 0, geometry.notch_radius, geometry.notch_radius],
        },
        top_panel,
        bottom_panel,
    }
}

/// Top edges of lines stacked downward from `top` with `gap` between them.
pub fn stack_lines(top: i32, line_heights: &[u32], gap: u32) -> Vec<i32> {
    let mut y = top;
    let mut out = Vec::with_capacity(line_heights.len());
    for h in line_heights {
        out.push(y);
        y += (*h + gap) as i32;
    }
    out
}

/// Boxes of a column of `(width, height)` items centered inside `container`.
pub fn center_column(container: &Rect, items: &[(u32, u32)], gap: u32) -> Vec<Rect> {
    let total_h: u32 = items.iter().map(|(_, h)| *h).sum::<u32>()
        + gap * (items.len().saturating_sub(1) as u32);
    let top = container.y + (container.height as i32 - total_h as i32) / 2;
    let heights: Vec<u32> = items.iter().map(|(_, h)| *h).collect();
    stack_lines(top, &heights, gap)
        .into_iter()
        .zip(items)
        .map(|(y, (w, h))| Rect {
            x: container.x + (container.width as i32 - *w as i32) / 2,
            y,
            width: *w,
            height: *h,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_frame_splits_screen_into_equal_panels() {
        let l = layout_frame(&FrameGeometry::default());
        assert_eq!(l.screen.rect, Rect::new(12, 12, 336, 696));
        assert_eq!(l.top_panel, Rect::new(12, 12, 336, 348));
        assert_eq!(l.bottom_panel, Rect::new(12, 360, 336, 348));
        assert_eq!(l.top_panel.height, l.bottom_panel.height);
        assert_eq!(l.notch.rect, Rect::new(100, 0, 160, 28));
    }

    #[test]
    fn rounded_rect_excludes_corners() {
        let r = RoundedRect::uniform(Rect::new(0, 0, 100, 100), 20);
        assert!(!r.contains(0.5, 0.5));
        assert!(!r.contains(99.5, 99.5));
        assert!(r.contains(50.0, 50.0));
        assert!(r.contains(20.0, 0.5));
        assert!(!r.contains(100.5, 50.0));
    }

    #[test]
    fn notch_only_rounds_bottom() {
        let l = layout_frame(&FrameGeometry::default());
        assert!(l.notch.contains(100.5, 0.5));
        assert!(!l.notch.contains(100.5, 27.5));
        assert!(l.notch.contains(130.0, 27.5));
    }

    #[test]
    fn center_column_stacks_and_centers() {
        let boxes = center_column(&Rect::new(0, 0, 100, 100), &[(48, 48), (20, 20)], 8);
        assert_eq!(boxes[0], Rect::new(26, 12, 48, 48));
        assert_eq!(boxes[1], Rect::new(40, 68, 20, 20));
    }
}
