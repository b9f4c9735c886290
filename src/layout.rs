//! Page geometry in PDF user space

/// An axis-aligned rectangle in points, normalized so width and height are never negative
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    /// Build a rectangle from two opposite corners given in any order
    ///
    /// PDF rectangles are written as `[x0 y0 x1 y1]` but producers do not agree on
    /// which corner comes first, so both orders normalize to the same value.
    pub fn from_corners(x0: f64, y0: f64, x1: f64, y1: f64) -> Self {
        Self {
            x: x0.min(x1),
            y: y0.min(y1),
            width: (x1 - x0).abs(),
            height: (y1 - y0).abs(),
        }
    }

    /// Right edge
    pub fn max_x(&self) -> f64 {
        self.x + self.width
    }

    /// Top edge
    pub fn max_y(&self) -> f64 {
        self.y + self.height
    }

    /// Whether the point lies inside or on the edge of the rectangle
    pub fn contains(&self, x: f64, y: f64) -> bool {
        x >= self.x && x <= self.max_x() && y >= self.y && y <= self.max_y()
    }
}

impl std::fmt::Display for Rect {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "[{:.2} {:.2} {:.2} {:.2}]",
            self.x,
            self.y,
            self.max_x(),
            self.max_y()
        )
    }
}
