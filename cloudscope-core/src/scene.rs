//! Framework-neutral display list produced by the renderer each frame.

use crate::palette::CategoryPalette;
use crate::tooltip::TooltipBox;
use crate::transform::ZoomTransform;
use crate::viewport::{Point, Viewport};
use cloudscope_scanner::Category;

pub const PLACEHOLDER_TEXT: &str = "No resources to display";

/// One drawn node. `center` and `radius` are in world coordinates; apply
/// the scene transform to get screen coordinates.
#[derive(Debug, Clone, PartialEq)]
pub struct NodeGlyph {
    pub index: usize,
    pub id: String,
    pub category: Category,
    pub center: Point,
    pub radius: f64,
    /// Short category tag drawn inside the circle.
    pub tag: &'static str,
    /// Display name drawn below the circle, already truncated.
    pub label: String,
    pub palette: CategoryPalette,
    pub pinned: bool,
    pub hovered: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EdgeLine {
    pub from: Point,
    pub to: Point,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scene {
    pub viewport: Viewport,
    pub transform: ZoomTransform,
    /// Set when there is nothing to lay out.
    pub placeholder: Option<&'static str>,
    pub edges: Vec<EdgeLine>,
    pub nodes: Vec<NodeGlyph>,
    /// In screen coordinates, outside the transform.
    pub tooltip: Option<TooltipBox>,
}

impl Scene {
    pub fn placeholder(viewport: Viewport, transform: ZoomTransform) -> Self {
        Self {
            viewport,
            transform,
            placeholder: Some(PLACEHOLDER_TEXT),
            edges: Vec::new(),
            nodes: Vec::new(),
            tooltip: None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        self.placeholder.is_some()
    }

    pub fn screen_position(&self, glyph: &NodeGlyph) -> Point {
        self.transform.apply(glyph.center)
    }

    pub fn screen_radius(&self, glyph: &NodeGlyph) -> f64 {
        glyph.radius * self.transform.k
    }

    /// Categories present in the scene, in priority order.
    pub fn categories(&self) -> Vec<Category> {
        let mut categories: Vec<Category> = self.nodes.iter().map(|n| n.category).collect();
        categories.sort_by_key(|c| c.priority());
        categories.dedup();
        categories
    }
}
