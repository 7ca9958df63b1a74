// Tests for the interactive graph renderer

use cloudscope_core::model::{FunctionDetail, Relation, ResourceDetail};
use cloudscope_core::scene::PLACEHOLDER_TEXT;
use cloudscope_core::tooltip::TooltipPhase;
use cloudscope_core::transform::ZoomTransform;
use cloudscope_core::{
    Category, GraphRenderer, LayoutConfig, Point, RendererState, Resource, ScanResult,
};

fn inventory(n: usize) -> ScanResult {
    let categories = Category::ALL;
    ScanResult::new(
        (0..n)
            .map(|i| {
                let category = categories[i % categories.len()];
                Resource::new(format!("res-{}", i), category, format!("name-{}", i))
            })
            .collect(),
    )
}

fn renderer(width: f64) -> GraphRenderer {
    GraphRenderer::new(width, LayoutConfig::default())
}

fn assert_in_bounds(renderer: &GraphRenderer) {
    let sim = renderer.simulation().expect("simulation");
    let r = sim.params().node_radius;
    let vp = renderer.viewport();
    for node in sim.nodes() {
        assert!(node.x >= r && node.x <= vp.width - r, "x out of bounds: {:?}", node);
        assert!(node.y >= r && node.y <= vp.height - r, "y out of bounds: {:?}", node);
    }
}

fn screen_of(renderer: &GraphRenderer, index: usize) -> Point {
    let node = renderer.simulation().unwrap().node(index).unwrap().position();
    renderer.transform().apply(node)
}

// ============================================================================
// State Machine Tests
// ============================================================================

#[test]
fn test_empty_result_shows_placeholder_without_simulation() {
    let mut r = renderer(800.0);
    r.set_data(ScanResult::default());

    assert_eq!(r.state(), RendererState::Idle);
    assert!(r.simulation().is_none());
    assert_eq!(r.live_handles(), 0);

    let scene = r.scene();
    assert_eq!(scene.placeholder, Some(PLACEHOLDER_TEXT));
    assert!(scene.nodes.is_empty());
}

#[test]
fn test_data_enters_laying_out_then_steady() {
    let mut r = renderer(800.0);
    r.set_data(inventory(6));
    assert_eq!(r.state(), RendererState::LayingOut);

    let mut frames = 0;
    while r.state() == RendererState::LayingOut && frames < 1000 {
        r.tick();
        frames += 1;
    }
    assert_eq!(r.state(), RendererState::InteractiveSteady);
    assert!(!r.tick());
}

#[test]
fn test_new_data_replaces_layout() {
    let mut r = renderer(800.0);
    r.set_data(inventory(4));
    r.settle();
    assert_eq!(r.state(), RendererState::InteractiveSteady);

    r.set_data(inventory(9));
    assert_eq!(r.state(), RendererState::LayingOut);
    assert_eq!(r.simulation().unwrap().len(), 9);
    assert_eq!(r.simulation().unwrap().ticks(), 0);
}

#[test]
fn test_empty_data_after_graph_returns_to_idle() {
    let mut r = renderer(800.0);
    r.set_data(inventory(3));
    r.set_data(ScanResult::default());
    assert_eq!(r.state(), RendererState::Idle);
    assert!(r.scene().is_placeholder());
}

// ============================================================================
// Scoped Handle Tests
// ============================================================================

#[test]
fn test_handles_acquired_on_mount_and_released_on_unmount() {
    let mut r = renderer(800.0);
    r.set_data(inventory(3));
    assert_eq!(r.live_handles(), 2);

    r.unmount();
    assert_eq!(r.live_handles(), 0);
    assert_eq!(r.state(), RendererState::Idle);
}

#[test]
fn test_reinitialising_does_not_leak_handles() {
    let mut r = renderer(800.0);
    for n in 1..20 {
        r.set_data(inventory(n));
        assert_eq!(r.live_handles(), 2);
    }
    r.set_data(ScanResult::default());
    assert_eq!(r.live_handles(), 0);
}

// ============================================================================
// Layout Tests
// ============================================================================

#[test]
fn test_nodes_stay_in_bounds_while_laying_out() {
    let mut r = renderer(360.0);
    r.set_data(inventory(40));
    for _ in 0..400 {
        r.tick();
        assert_in_bounds(&r);
    }
}

#[test]
fn test_resize_keeps_state_and_bounds() {
    let mut r = renderer(1200.0);
    r.set_data(inventory(12));
    r.settle();
    let ticks_before = r.simulation().unwrap().ticks();

    r.resize(500.0);
    assert_eq!(r.viewport().width, 500.0);
    assert_eq!(r.viewport().height, 375.0);
    assert_eq!(r.simulation().unwrap().len(), 12);
    assert_eq!(r.simulation().unwrap().ticks(), ticks_before);
    assert_eq!(r.state(), RendererState::LayingOut);
    assert_in_bounds(&r);

    r.settle();
    assert_in_bounds(&r);
    assert_eq!(r.state(), RendererState::InteractiveSteady);
}

#[test]
fn test_resize_applies_height_floor() {
    let mut r = renderer(800.0);
    r.resize(200.0);
    assert_eq!(r.viewport().height, 320.0);
}

#[test]
fn test_node_radius_tracks_width_with_cap() {
    let mut r = renderer(400.0);
    r.set_data(inventory(2));
    assert_eq!(r.scene().nodes[0].radius, 15.0);

    r.resize(2000.0);
    assert_eq!(r.scene().nodes[0].radius, 30.0);
}

// ============================================================================
// Drag Tests
// ============================================================================

#[test]
fn test_drag_pins_node_and_keeps_simulation_warm() {
    let mut r = renderer(800.0);
    r.set_data(inventory(8));
    r.settle();

    let start = screen_of(&r, 3);
    r.pointer_down(start);
    assert_eq!(r.dragging(), Some(3));
    assert_eq!(r.state(), RendererState::LayingOut);

    let target = Point::new(120.0, 140.0);
    r.pointer_move(target);
    for _ in 0..300 {
        r.tick();
    }
    let node = r.simulation().unwrap().node(3).unwrap().clone();
    assert_eq!((node.x, node.y), (120.0, 140.0));
    assert!(node.is_pinned());
    assert_eq!(r.state(), RendererState::LayingOut);
    assert!(r.scene().nodes[3].pinned);

    r.pointer_up(target);
    assert_eq!(r.dragging(), None);
    assert!(!r.simulation().unwrap().node(3).unwrap().is_pinned());

    let mut frames = 0;
    while r.state() == RendererState::LayingOut && frames < 2000 {
        r.tick();
        frames += 1;
    }
    assert_eq!(r.state(), RendererState::InteractiveSteady);
}

#[test]
fn test_drag_respects_zoom_transform() {
    let mut r = renderer(800.0);
    r.set_data(inventory(1));
    r.settle();
    r.zoom_by(2.0);

    let start = screen_of(&r, 0);
    r.pointer_down(start);
    assert_eq!(r.dragging(), Some(0));

    let world = Point::new(200.0, 200.0);
    r.pointer_move(r.transform().apply(world));
    r.tick();
    let node = r.simulation().unwrap().node(0).unwrap();
    assert!((node.x - 200.0).abs() < 1e-9);
    assert!((node.y - 200.0).abs() < 1e-9);
}

// ============================================================================
// Pan / Zoom Tests
// ============================================================================

#[test]
fn test_zoom_is_clamped() {
    let mut r = renderer(800.0);
    for _ in 0..20 {
        r.wheel(Point::new(100.0, 100.0), 1.0);
    }
    assert_eq!(r.transform().k, 2.0);
    for _ in 0..40 {
        r.wheel(Point::new(100.0, 100.0), -1.0);
    }
    assert_eq!(r.transform().k, 0.5);
}

#[test]
fn test_zoom_does_not_move_nodes() {
    let mut r = renderer(800.0);
    r.set_data(inventory(5));
    r.settle();
    let before: Vec<_> = r.scene().nodes.iter().map(|n| n.center).collect();

    r.wheel(Point::new(300.0, 200.0), 2.0);
    r.pan_by(40.0, -25.0);
    let scene = r.scene();
    let after: Vec<_> = scene.nodes.iter().map(|n| n.center).collect();
    assert_eq!(before, after);
    assert_ne!(scene.transform, ZoomTransform::IDENTITY);
}

#[test]
fn test_reset_view() {
    let mut r = renderer(800.0);
    r.zoom_by(1.5);
    r.pan_by(10.0, 10.0);
    r.reset_view();
    assert_eq!(r.transform(), ZoomTransform::IDENTITY);
}

// ============================================================================
// Hover Tests
// ============================================================================

fn function_result() -> ScanResult {
    ScanResult::new(vec![
        Resource::new("arn:aws:lambda:eu-west-1:1:function:resize", Category::Function, "resize")
            .with_detail(ResourceDetail::Function(FunctionDetail {
                runtime: Some("go1.x".to_string()),
                memory: Some(128),
                timeout: Some(3),
            })),
    ])
}

#[test]
fn test_hover_shows_tooltip_with_detail() {
    let mut r = renderer(800.0);
    r.set_data(function_result());
    r.settle();

    let p = screen_of(&r, 0);
    r.pointer_move(p);
    assert_eq!(r.hovered(), Some(0));

    let scene = r.scene();
    assert!(scene.nodes[0].hovered);
    let tooltip = scene.tooltip.expect("tooltip");
    assert!(tooltip.lines.contains(&"Type: Function".to_string()));
    assert!(tooltip.lines.contains(&"Name: resize".to_string()));
    assert!(tooltip.lines.contains(&"Runtime: go1.x".to_string()));
    assert!(tooltip.lines.contains(&"Memory: 128 MB".to_string()));
    assert!(tooltip.lines.contains(&"Timeout: 3 s".to_string()));
    assert_eq!(tooltip.opacity, 1.0);
}

#[test]
fn test_tooltip_clamped_near_viewport_edge() {
    let mut r = renderer(800.0);
    r.set_data(function_result());
    r.settle();
    r.pointer_down(screen_of(&r, 0));
    let corner = Point::new(799.0, 599.0);
    r.pointer_move(corner);
    for _ in 0..5 {
        r.tick();
    }
    r.pointer_up(screen_of(&r, 0));

    let scene = r.scene();
    let tooltip = scene.tooltip.expect("tooltip");
    let vp = scene.viewport;
    assert!(tooltip.x >= 0.0 && tooltip.x + tooltip.width <= vp.width);
    assert!(tooltip.y >= 0.0 && tooltip.y + tooltip.height <= vp.height);
}

#[test]
fn test_pointer_out_fades_and_removes_tooltip() {
    let mut r = renderer(800.0);
    r.set_data(function_result());
    r.settle();

    r.pointer_move(screen_of(&r, 0));
    r.pointer_move(Point::new(5.0, 5.0));
    assert_eq!(r.hovered(), None);
    assert!(matches!(
        r.tooltip().unwrap().phase(),
        TooltipPhase::Fading { .. }
    ));

    r.tick();
    assert!(r.scene().tooltip.unwrap().opacity < 1.0);

    let fade = r.config().tooltip_fade_frames;
    for _ in 1..fade {
        r.tick();
    }
    assert_eq!(r.tooltip().unwrap().phase(), TooltipPhase::Hidden);
    assert!(r.scene().tooltip.is_none());
}

#[test]
fn test_pointer_leave_hides_tooltip() {
    let mut r = renderer(800.0);
    r.set_data(function_result());
    r.settle();
    r.pointer_move(screen_of(&r, 0));
    r.pointer_leave();
    assert_eq!(r.hovered(), None);
    assert!(!r.tooltip().unwrap().is_visible());
}

// ============================================================================
// Edge Tests
// ============================================================================

#[test]
fn test_scene_draws_resolved_links_only() {
    let mut data = inventory(3);
    data.links = vec![
        Relation {
            source: "res-0".to_string(),
            target: "res-2".to_string(),
            kind: None,
        },
        Relation {
            source: "res-0".to_string(),
            target: "missing".to_string(),
            kind: None,
        },
    ];
    let mut r = renderer(800.0);
    r.set_data(data);
    r.settle();

    let scene = r.scene();
    assert_eq!(scene.edges.len(), 1);
    assert_eq!(scene.edges[0].from, scene.nodes[0].center);
    assert_eq!(scene.edges[0].to, scene.nodes[2].center);
}

#[test]
fn test_scene_categories_in_priority_order() {
    let mut r = renderer(800.0);
    r.set_data(inventory(8));
    assert_eq!(r.scene().categories(), Category::ALL.to_vec());
}
