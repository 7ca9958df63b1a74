use crate::config::LayoutConfig;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance_sq(&self, other: Point) -> f64 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }
}

/// Drawable area of one mounted graph. Height follows width at a fixed
/// aspect ratio, never dropping below the configured floor.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn from_width(width: f64, config: &LayoutConfig) -> Self {
        let width = width.max(1.0);
        Self {
            width,
            height: (width * config.aspect_ratio).max(config.min_height),
        }
    }

    pub fn center(&self) -> Point {
        Point::new(self.width / 2.0, self.height / 2.0)
    }

    /// Clamps `p` so a circle of `radius` around it stays inside.
    pub fn clamp(&self, p: Point, radius: f64) -> Point {
        Point::new(
            clamp_axis(p.x, radius, self.width),
            clamp_axis(p.y, radius, self.height),
        )
    }
}

fn clamp_axis(v: f64, radius: f64, extent: f64) -> f64 {
    let hi = extent - radius;
    if hi < radius {
        // Viewport narrower than the node; pin to the middle.
        return extent / 2.0;
    }
    v.clamp(radius, hi)
}

/// Force strengths and radii derived from a viewport so that layout density
/// looks the same at every size.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ForceParams {
    pub charge_strength: f64,
    pub node_radius: f64,
    pub collide_radius: f64,
    pub center: Point,
}

impl ForceParams {
    pub fn for_viewport(viewport: &Viewport, config: &LayoutConfig) -> Self {
        let scale = (viewport.width / config.reference_width).min(1.0);
        let node_radius = (viewport.width * config.node_radius_fraction)
            .clamp(config.min_node_radius, config.max_node_radius);
        Self {
            charge_strength: config.charge_strength * scale,
            node_radius,
            collide_radius: node_radius * config.collide_scale,
            center: viewport.center(),
        }
    }
}
