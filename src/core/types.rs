use serde::{Deserialize, Serialize};

/// Display-space extent of one rendered frame, in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Viewport {
    pub width: u32,
    pub height: u32,
}

impl Viewport {
    #[must_use]
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    #[must_use]
    pub fn is_valid(self) -> bool {
        self.width > 0 && self.height > 0
    }
}

/// Absolute point on the page, in model units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelPoint {
    pub x: i32,
    pub y: i32,
}

impl ModelPoint {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }

    /// Resolves a staff-relative point against this staff origin.
    #[must_use]
    pub const fn offset(self, point: StaffPoint) -> Self {
        Self {
            x: self.x + point.x,
            y: self.y + point.y,
        }
    }
}

/// Point relative to the origin of its staff, in model units.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StaffPoint {
    pub x: i32,
    pub y: i32,
}

impl StaffPoint {
    #[must_use]
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelSize {
    pub width: i32,
    pub height: i32,
}

impl ModelSize {
    #[must_use]
    pub const fn new(width: i32, height: i32) -> Self {
        Self { width, height }
    }
}

/// Axis-aligned box in model units. Barline segments use staff-relative boxes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ModelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl ModelRect {
    #[must_use]
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Center point, with integer halving toward zero.
    #[must_use]
    pub const fn center(self) -> StaffPoint {
        StaffPoint {
            x: self.x + self.width / 2,
            y: self.y + self.height / 2,
        }
    }

    #[must_use]
    pub fn union(self, other: Self) -> Self {
        let left = self.x.min(other.x);
        let top = self.y.min(other.y);
        let right = (self.x + self.width).max(other.x + other.width);
        let bottom = (self.y + self.height).max(other.y + other.height);
        Self::new(left, top, right - left, bottom - top)
    }

    #[must_use]
    pub const fn translated(self, origin: ModelPoint) -> Self {
        Self::new(self.x + origin.x, self.y + origin.y, self.width, self.height)
    }
}

#[cfg(test)]
mod tests {
    use super::{ModelPoint, ModelRect, StaffPoint};

    #[test]
    fn rect_union_covers_both_boxes() {
        let merged = ModelRect::new(10, 0, 4, 40).union(ModelRect::new(12, 38, 4, 42));
        assert_eq!(merged, ModelRect::new(10, 0, 6, 80));
        assert_eq!(merged.center(), StaffPoint::new(13, 40));
    }

    #[test]
    fn staff_point_resolves_against_origin() {
        let origin = ModelPoint::new(100, 250);
        assert_eq!(origin.offset(StaffPoint::new(7, -3)), ModelPoint::new(107, 247));
    }
}
