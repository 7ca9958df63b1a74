use crate::viewport::Point;

/// Pan/zoom transform applied to the whole node-link group:
/// `screen = world * k + (x, y)`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ZoomTransform {
    pub k: f64,
    pub x: f64,
    pub y: f64,
}

impl Default for ZoomTransform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl ZoomTransform {
    pub const IDENTITY: ZoomTransform = ZoomTransform {
        k: 1.0,
        x: 0.0,
        y: 0.0,
    };

    pub fn apply(&self, p: Point) -> Point {
        Point::new(p.x * self.k + self.x, p.y * self.k + self.y)
    }

    pub fn invert(&self, p: Point) -> Point {
        Point::new((p.x - self.x) / self.k, (p.y - self.y) / self.k)
    }

    pub fn translate_by(&mut self, dx: f64, dy: f64) {
        self.x += dx;
        self.y += dy;
    }

    /// Sets the scale, clamped to `[min, max]`, keeping the world point under
    /// `anchor` fixed on screen.
    pub fn scale_to_at(&mut self, k: f64, anchor: Point, min: f64, max: f64) {
        let world = self.invert(anchor);
        self.k = k.clamp(min, max);
        self.x = anchor.x - world.x * self.k;
        self.y = anchor.y - world.y * self.k;
    }

    pub fn scale_by_at(&mut self, factor: f64, anchor: Point, min: f64, max: f64) {
        self.scale_to_at(self.k * factor, anchor, min, max);
    }

    /// SVG `transform` attribute value.
    pub fn to_svg(&self) -> String {
        format!("translate({:.2},{:.2}) scale({:.4})", self.x, self.y, self.k)
    }
}
