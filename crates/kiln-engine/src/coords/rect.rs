use glam::Vec2;

/// Axis-aligned rectangle (top-left origin), used for destination quads and
/// texture source regions.
#[derive(Debug, Copy, Clone, Default, PartialEq)]
pub struct Rect {
    pub origin: Vec2,
    pub size: Vec2,
}

impl Rect {
    #[inline]
    pub const fn new(x: f32, y: f32, w: f32, h: f32) -> Self {
        Self {
            origin: Vec2::new(x, y),
            size: Vec2::new(w, h),
        }
    }

    #[inline]
    pub const fn from_origin_size(origin: Vec2, size: Vec2) -> Self {
        Self { origin, size }
    }

    #[inline]
    pub fn min(self) -> Vec2 {
        self.origin
    }

    #[inline]
    pub fn max(self) -> Vec2 {
        self.origin + self.size
    }

    #[inline]
    pub fn is_empty(self) -> bool {
        self.size.x <= 0.0 || self.size.y <= 0.0
    }

    /// Normalizes the rectangle so width/height are non-negative.
    #[inline]
    pub fn normalized(self) -> Self {
        let min = self.origin.min(self.origin + self.size);
        let size = self.size.abs();
        Self::from_origin_size(min, size)
    }

    /// Half-open containment: [min, max).
    #[inline]
    pub fn contains(self, p: Vec2) -> bool {
        let r = self.normalized();
        p.x >= r.origin.x && p.y >= r.origin.y && p.x < r.max().x && p.y < r.max().y
    }

    #[inline]
    pub fn intersect(self, other: Rect) -> Option<Rect> {
        let a = self.normalized();
        let b = other.normalized();

        let lo = a.min().max(b.min());
        let hi = a.max().min(b.max());
        let size = hi - lo;

        if size.x <= 0.0 || size.y <= 0.0 {
            None
        } else {
            Some(Rect::from_origin_size(lo, size))
        }
    }

    /// Corners in quad winding order: top-left, top-right, bottom-right, bottom-left.
    #[inline]
    pub fn corners(self) -> [Vec2; 4] {
        let Vec2 { x, y } = self.origin;
        let Vec2 { x: w, y: h } = self.size;
        [
            Vec2::new(x, y),
            Vec2::new(x + w, y),
            Vec2::new(x + w, y + h),
            Vec2::new(x, y + h),
        ]
    }
}
