use serde::{Deserialize, Serialize};

/// Offset used before anything has been persisted.
pub const DEFAULT_OFFSET: PositionOffset = PositionOffset { x: 20.0, y: 20.0 };

/// Axis aligned box in viewport pixels, as reported by the page.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub const fn new(left: f64, top: f64, width: f64, height: f64) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f64 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f64 {
        self.top + self.height
    }

    pub fn area(&self) -> f64 {
        self.width * self.height
    }

    /// A box with no area has not been laid out yet and must not be used as
    /// an anchor.
    pub fn is_laid_out(&self) -> bool {
        self.width != 0.0 && self.height != 0.0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Overlay placement relative to the bottom-left corner of its media element:
/// `x` grows to the right, `y` grows upwards from the bottom edge.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PositionOffset {
    pub x: f64,
    pub y: f64,
}

impl Default for PositionOffset {
    fn default() -> Self {
        DEFAULT_OFFSET
    }
}

/// Overlay `top`/`left` relative to its positioning parent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct OverlayPosition {
    pub top: f64,
    pub left: f64,
}

impl OverlayPosition {
    pub const fn new(top: f64, left: f64) -> Self {
        Self { top, left }
    }

    /// Top-left corner of the overlay in viewport coordinates.
    pub fn to_viewport(self, parent_box: Rect) -> Point {
        Point::new(parent_box.left + self.left, parent_box.top + self.top)
    }
}

/// Anchor an overlay to `target_box` using `offset`, expressed relative to
/// `parent_box`.
pub fn compute_overlay_position(
    target_box: Rect,
    parent_box: Rect,
    offset: PositionOffset,
) -> OverlayPosition {
    OverlayPosition {
        top: target_box.bottom() - offset.y - parent_box.top,
        left: target_box.left + offset.x - parent_box.left,
    }
}

/// Inverse of [`compute_overlay_position`]: derive the offset that keeps a
/// dropped overlay where it was relative to the target.
pub fn compute_offset_from_drop(overlay_box: Rect, target_box: Rect) -> PositionOffset {
    PositionOffset {
        x: overlay_box.left - target_box.left,
        y: target_box.bottom() - overlay_box.top,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rendered_box(target: Rect, parent: Rect, offset: PositionOffset) -> Rect {
        let pos = compute_overlay_position(target, parent, offset);
        let corner = pos.to_viewport(parent);
        Rect::new(corner.x, corner.y, 60.0, 24.0)
    }

    #[test]
    fn forward_anchors_to_bottom_left() {
        let target = Rect::new(100.0, 50.0, 640.0, 360.0);
        let parent = Rect::new(10.0, 20.0, 800.0, 600.0);
        let pos = compute_overlay_position(target, parent, DEFAULT_OFFSET);
        assert_eq!(pos, OverlayPosition::new(410.0 - 20.0 - 20.0, 100.0 + 20.0 - 10.0));
    }

    #[test]
    fn offset_survives_round_trip() {
        let cases = [
            (
                Rect::new(0.0, 0.0, 320.0, 180.0),
                Rect::new(0.0, 0.0, 1024.0, 768.0),
                PositionOffset { x: 20.0, y: 20.0 },
            ),
            (
                Rect::new(-40.0, 300.0, 1280.0, 720.0),
                Rect::new(12.5, -8.0, 400.0, 400.0),
                PositionOffset { x: -15.0, y: 700.0 },
            ),
            (
                Rect::new(7.0, 9.0, 50.0, 50.0),
                Rect::new(7.0, 9.0, 50.0, 50.0),
                PositionOffset { x: 0.0, y: 0.0 },
            ),
        ];

        for (target, parent, offset) in cases {
            let dropped = rendered_box(target, parent, offset);
            assert_eq!(compute_offset_from_drop(dropped, target), offset);
        }
    }

    #[test]
    fn offset_is_invariant_under_target_movement() {
        let parent = Rect::new(0.0, 0.0, 1000.0, 1000.0);
        let offset = PositionOffset { x: 30.0, y: 45.0 };
        let before = Rect::new(100.0, 100.0, 400.0, 300.0);
        let after = Rect::new(250.0, 40.0, 400.0, 300.0);

        let a = compute_overlay_position(before, parent, offset);
        let b = compute_overlay_position(after, parent, offset);
        assert_eq!(b.left - a.left, after.left - before.left);
        assert_eq!(b.top - a.top, after.bottom() - before.bottom());
    }

    #[test]
    fn zero_area_box_is_not_laid_out() {
        assert!(!Rect::new(10.0, 10.0, 0.0, 200.0).is_laid_out());
        assert!(!Rect::new(10.0, 10.0, 200.0, 0.0).is_laid_out());
        assert!(Rect::new(10.0, 10.0, 1.0, 1.0).is_laid_out());
    }
}
