// Conversions between terminal cells, viewport units and canvas coordinates

use cloudscope_core::Viewport;
use cloudscope_core::tooltip::{TextMetrics, TooltipBox};
use cloudscope_core::viewport::Point;
use ratatui::layout::Rect;

/// Viewport units per terminal column.
pub const UNITS_PER_COLUMN: f64 = 10.0;

/// Logical viewport width for a graph area `columns` wide.
pub fn viewport_width(columns: u16) -> f64 {
    columns.max(1) as f64 * UNITS_PER_COLUMN
}

/// Centre of the cell at (`column`, `row`) in viewport units, or `None` when
/// the cell is outside `area`.
pub fn cell_to_viewport(column: u16, row: u16, area: Rect, viewport: &Viewport) -> Option<Point> {
    if area.width == 0 || area.height == 0 {
        return None;
    }
    if column < area.x || column >= area.x + area.width || row < area.y || row >= area.y + area.height {
        return None;
    }
    let cw = viewport.width / area.width as f64;
    let ch = viewport.height / area.height as f64;
    Some(Point::new(
        (column - area.x) as f64 * cw + cw / 2.0,
        (row - area.y) as f64 * ch + ch / 2.0,
    ))
}

/// Canvas y grows upwards; viewport y grows downwards.
pub fn to_canvas(p: Point, viewport: &Viewport) -> (f64, f64) {
    (p.x, viewport.height - p.y)
}

/// Text metrics for laying the tooltip out in cells.
pub fn cell_metrics(area: Rect, viewport: &Viewport) -> TextMetrics {
    let cw = viewport.width / area.width.max(1) as f64;
    let ch = viewport.height / area.height.max(1) as f64;
    TextMetrics {
        char_width: cw,
        line_height: ch,
        // One cell each side for the border.
        padding: cw.max(ch),
    }
}

/// Cell rectangle covering `tooltip`, kept inside `area`.
pub fn tooltip_rect(tooltip: &TooltipBox, area: Rect, viewport: &Viewport) -> Rect {
    let cw = viewport.width / area.width.max(1) as f64;
    let ch = viewport.height / area.height.max(1) as f64;

    let longest = tooltip.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
    let width = (longest + 2).min(area.width);
    let height = (tooltip.lines.len() as u16 + 2).min(area.height);

    let x = ((tooltip.x / cw).floor().max(0.0) as u16).min(area.width - width);
    let y = ((tooltip.y / ch).floor().max(0.0) as u16).min(area.height - height);

    Rect::new(area.x + x, area.y + y, width, height)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn area() -> Rect {
        Rect::new(2, 1, 80, 30)
    }

    fn viewport() -> Viewport {
        Viewport {
            width: 800.0,
            height: 600.0,
        }
    }

    #[test]
    fn test_cell_to_viewport_corners() {
        let vp = viewport();
        let top_left = cell_to_viewport(2, 1, area(), &vp).unwrap();
        assert_eq!(top_left, Point::new(5.0, 10.0));

        let bottom_right = cell_to_viewport(81, 30, area(), &vp).unwrap();
        assert_eq!(bottom_right, Point::new(795.0, 590.0));
    }

    #[test]
    fn test_cell_outside_area() {
        let vp = viewport();
        assert!(cell_to_viewport(1, 5, area(), &vp).is_none());
        assert!(cell_to_viewport(82, 5, area(), &vp).is_none());
        assert!(cell_to_viewport(10, 31, area(), &vp).is_none());
    }

    #[test]
    fn test_canvas_flips_y() {
        let vp = viewport();
        assert_eq!(to_canvas(Point::new(10.0, 0.0), &vp), (10.0, 600.0));
        assert_eq!(to_canvas(Point::new(10.0, 600.0), &vp), (10.0, 0.0));
    }

    #[test]
    fn test_tooltip_rect_stays_in_area() {
        let vp = viewport();
        let tooltip = TooltipBox {
            x: 790.0,
            y: 590.0,
            width: 100.0,
            height: 60.0,
            lines: vec!["Type: Compute".to_string(), "Name: web".to_string()],
            opacity: 1.0,
        };
        let rect = tooltip_rect(&tooltip, area(), &vp);
        assert_eq!(rect.width, 15);
        assert_eq!(rect.height, 4);
        assert!(rect.x + rect.width <= area().x + area().width);
        assert!(rect.y + rect.height <= area().y + area().height);
    }

    #[test]
    fn test_viewport_width_has_minimum() {
        assert_eq!(viewport_width(0), UNITS_PER_COLUMN);
        assert_eq!(viewport_width(120), 1200.0);
    }
}
