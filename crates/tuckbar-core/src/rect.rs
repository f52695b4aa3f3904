/// An axis-aligned rectangle in screen or window coordinates.
///
/// Stored as edges rather than origin + size because every Win32 API
/// this crate talks to (window rects, work areas, region boxes) reports
/// edges, and the visibility rules compare edges directly.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Self {
            left,
            top,
            right,
            bottom,
        }
    }

    pub fn width(&self) -> i32 {
        self.right - self.left
    }

    pub fn height(&self) -> i32 {
        self.bottom - self.top
    }

    /// Whether the rectangle encloses no pixels.
    pub fn is_empty(&self) -> bool {
        self.width() <= 0 || self.height() <= 0
    }

    /// Whether `other` lies entirely inside `self` (edges may touch).
    pub fn contains(&self, other: &Rect) -> bool {
        other.left >= self.left
            && other.top >= self.top
            && other.right <= self.right
            && other.bottom <= self.bottom
    }

    /// Returns the same rectangle moved so its top-left corner is `(0, 0)`.
    ///
    /// Window regions are expressed relative to the window, not the screen.
    pub fn to_origin(&self) -> Rect {
        Rect::new(0, 0, self.width(), self.height())
    }

    /// Shrinks every edge inward by `margin` pixels.
    pub fn inset(&self, margin: i32) -> Rect {
        Rect::new(
            self.left + margin,
            self.top + margin,
            self.right - margin,
            self.bottom - margin,
        )
    }
}
