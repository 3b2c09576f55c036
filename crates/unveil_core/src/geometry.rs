//! Document-space geometry
//!
//! All rectangles are in document coordinates: `y` grows downward from the top
//! of the page and does not change when the page scrolls. The visible viewport
//! is a rect at `(0, scroll_y)` with the window size.

use serde::{Deserialize, Serialize};

/// 2D point
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub const ZERO: Point = Point { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// 2D size
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub const ZERO: Size = Size {
        width: 0.0,
        height: 0.0,
    };

    pub const fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Area in square pixels (zero for degenerate sizes)
    pub fn area(&self) -> f32 {
        self.width.max(0.0) * self.height.max(0.0)
    }
}

/// 2D rectangle
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Rect {
    pub origin: Point,
    pub size: Size,
}

impl Rect {
    pub const ZERO: Rect = Rect {
        origin: Point::ZERO,
        size: Size::ZERO,
    };

    pub const fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            origin: Point::new(x, y),
            size: Size::new(width, height),
        }
    }

    pub fn from_origin_size(origin: Point, size: Size) -> Self {
        Self { origin, size }
    }

    /// The viewport rect for a window of `size` scrolled to `scroll_y`
    pub fn viewport(size: Size, scroll_y: f32) -> Self {
        Self::new(0.0, scroll_y, size.width, size.height)
    }

    pub fn x(&self) -> f32 {
        self.origin.x
    }

    pub fn y(&self) -> f32 {
        self.origin.y
    }

    pub fn width(&self) -> f32 {
        self.size.width
    }

    pub fn height(&self) -> f32 {
        self.size.height
    }

    pub fn top(&self) -> f32 {
        self.origin.y
    }

    pub fn bottom(&self) -> f32 {
        self.origin.y + self.size.height
    }

    pub fn left(&self) -> f32 {
        self.origin.x
    }

    pub fn right(&self) -> f32 {
        self.origin.x + self.size.width
    }

    pub fn center(&self) -> Point {
        Point::new(
            self.origin.x + self.size.width / 2.0,
            self.origin.y + self.size.height / 2.0,
        )
    }

    /// Offset the rect by a delta
    pub fn offset(&self, dx: f32, dy: f32) -> Self {
        Rect {
            origin: Point::new(self.origin.x + dx, self.origin.y + dy),
            size: self.size,
        }
    }

    /// Grow the rect by `amount` on every side; negative amounts shrink it
    ///
    /// A shrunk rect never goes below zero size and stays centered.
    pub fn inflate(&self, amount: f32) -> Self {
        let width = (self.size.width + 2.0 * amount).max(0.0);
        let height = (self.size.height + 2.0 * amount).max(0.0);
        Rect::new(
            self.center().x - width / 2.0,
            self.center().y - height / 2.0,
            width,
            height,
        )
    }

    /// Overlapping region of two rects, `None` if they do not overlap
    ///
    /// Rects that only touch along an edge produce a zero-area intersection.
    pub fn intersection(&self, other: &Rect) -> Option<Rect> {
        let left = self.left().max(other.left());
        let top = self.top().max(other.top());
        let right = self.right().min(other.right());
        let bottom = self.bottom().min(other.bottom());

        if right < left || bottom < top {
            return None;
        }

        Some(Rect::new(left, top, right - left, bottom - top))
    }

    /// Fraction of this rect's area that lies inside `viewport` (0.0 to 1.0)
    ///
    /// A zero-area rect counts as fully visible when its origin lies inside the
    /// viewport, and invisible otherwise.
    pub fn visible_fraction(&self, viewport: &Rect) -> f32 {
        let area = self.size.area();
        if area <= 0.0 {
            let inside = self.top() >= viewport.top()
                && self.top() <= viewport.bottom()
                && self.left() >= viewport.left()
                && self.left() <= viewport.right();
            return if inside { 1.0 } else { 0.0 };
        }

        match self.intersection(viewport) {
            Some(overlap) => (overlap.size.area() / area).clamp(0.0, 1.0),
            None => 0.0,
        }
    }
}

impl From<Size> for Rect {
    /// Convert Size to Rect at origin (0, 0)
    fn from(size: Size) -> Self {
        Rect {
            origin: Point::ZERO,
            size,
        }
    }
}
