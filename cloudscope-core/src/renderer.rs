use crate::config::LayoutConfig;
use crate::graph::ScanGraph;
use crate::model::ScanResult;
use crate::palette::{palette_for, truncate_label};
use crate::scene::{EdgeLine, NodeGlyph, Scene};
use crate::simulation::Simulation;
use crate::tooltip::{TextMetrics, Tooltip, TooltipContent};
use crate::transform::ZoomTransform;
use crate::viewport::{Point, Viewport};
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use tracing::{Span, debug, info};

/// Zoom factor of one wheel notch.
const WHEEL_STEP: f64 = 1.2;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RendererState {
    /// Nothing to lay out; the placeholder is shown.
    Idle,
    /// The simulation is still moving nodes.
    LayingOut,
    /// Converged, still interactive.
    InteractiveSteady,
}

/// Counts live simulation and tooltip handles so leaks are observable.
#[derive(Debug, Clone, Default)]
pub struct HandleRegistry {
    live: Arc<AtomicUsize>,
}

impl HandleRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    fn acquire(&self) -> HandleGuard {
        self.live.fetch_add(1, Ordering::SeqCst);
        HandleGuard {
            live: self.live.clone(),
        }
    }

    pub fn live(&self) -> usize {
        self.live.load(Ordering::SeqCst)
    }
}

/// Released on drop.
#[derive(Debug)]
struct HandleGuard {
    live: Arc<AtomicUsize>,
}

impl Drop for HandleGuard {
    fn drop(&mut self) {
        self.live.fetch_sub(1, Ordering::SeqCst);
    }
}

#[derive(Debug)]
struct SimulationHandle {
    simulation: Simulation,
    _guard: HandleGuard,
}

#[derive(Debug)]
struct TooltipHandle {
    tooltip: Tooltip,
    _guard: HandleGuard,
}

/// Everything tied to one ScanResult. Dropping it releases both handles.
#[derive(Debug)]
struct Mounted {
    data: ScanResult,
    graph: ScanGraph,
    simulation: SimulationHandle,
    tooltip: TooltipHandle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Pointer {
    Idle,
    DraggingNode { index: usize },
    Panning { last: Point },
}

/// Interactive force-directed graph for one viewport.
///
/// The host feeds it data, pointer and resize events, calls [`tick`] once per
/// frame and draws the [`Scene`] it returns. Pointer positions are always in
/// screen (viewport) coordinates.
///
/// [`tick`]: GraphRenderer::tick
pub struct GraphRenderer {
    config: LayoutConfig,
    viewport: Viewport,
    transform: ZoomTransform,
    mounted: Option<Mounted>,
    pointer: Pointer,
    hovered: Option<usize>,
    handles: HandleRegistry,
    span: Span,
}

impl GraphRenderer {
    pub fn new(width: f64, config: LayoutConfig) -> Self {
        Self {
            viewport: Viewport::from_width(width, &config),
            config,
            transform: ZoomTransform::IDENTITY,
            mounted: None,
            pointer: Pointer::Idle,
            hovered: None,
            handles: HandleRegistry::new(),
            span: Span::none(),
        }
    }

    /// Parent span for every event this renderer emits.
    pub fn with_span(mut self, span: Span) -> Self {
        self.span = span;
        self
    }

    pub fn config(&self) -> &LayoutConfig {
        &self.config
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn transform(&self) -> ZoomTransform {
        self.transform
    }

    pub fn data(&self) -> Option<&ScanResult> {
        self.mounted.as_ref().map(|m| &m.data)
    }

    pub fn simulation(&self) -> Option<&Simulation> {
        self.mounted.as_ref().map(|m| &m.simulation.simulation)
    }

    pub fn tooltip(&self) -> Option<&Tooltip> {
        self.mounted.as_ref().map(|m| &m.tooltip.tooltip)
    }

    pub fn hovered(&self) -> Option<usize> {
        self.hovered
    }

    pub fn dragging(&self) -> Option<usize> {
        match self.pointer {
            Pointer::DraggingNode { index } => Some(index),
            _ => None,
        }
    }

    /// Number of simulation and tooltip handles currently held.
    pub fn live_handles(&self) -> usize {
        self.handles.live()
    }

    pub fn state(&self) -> RendererState {
        match self.mounted {
            None => RendererState::Idle,
            Some(ref m) if m.simulation.simulation.is_running() => RendererState::LayingOut,
            Some(_) => RendererState::InteractiveSteady,
        }
    }

    /// Replaces whatever is shown. Previous handles are released before new
    /// ones are acquired; an empty result goes back to the placeholder.
    pub fn set_data(&mut self, data: ScanResult) {
        self.unmount();

        if data.is_empty() {
            info!(parent: &self.span, "Empty scan result, showing placeholder");
            return;
        }

        let simulation = Simulation::new(data.nodes.len(), self.viewport, &self.config);
        let tooltip = Tooltip::new(self.config.tooltip_offset, self.config.tooltip_fade_frames);
        let graph = ScanGraph::build(&data, &self.span);

        info!(
            parent: &self.span,
            nodes = data.nodes.len(),
            links = graph.edge_count(),
            width = self.viewport.width,
            height = self.viewport.height,
            "Laying out scan result"
        );

        self.mounted = Some(Mounted {
            data,
            graph,
            simulation: SimulationHandle {
                simulation,
                _guard: self.handles.acquire(),
            },
            tooltip: TooltipHandle {
                tooltip,
                _guard: self.handles.acquire(),
            },
        });
    }

    /// Tears down the simulation and tooltip.
    pub fn unmount(&mut self) {
        if self.mounted.take().is_some() {
            debug!(parent: &self.span, "Released simulation and tooltip");
        }
        self.pointer = Pointer::Idle;
        self.hovered = None;
    }

    /// Frame callback. Returns whether anything visible changed.
    pub fn tick(&mut self) -> bool {
        let span = &self.span;
        let Some(ref mut m) = self.mounted else {
            return false;
        };

        let fading = !m.tooltip.tooltip.is_visible() && m.tooltip.tooltip.node().is_some();
        m.tooltip.tooltip.advance_frame();

        let sim = &mut m.simulation.simulation;
        let moved = sim.step();
        if moved && !sim.is_running() {
            info!(
                parent: span,
                ticks = sim.ticks(),
                energy = sim.kinetic_energy(),
                "Layout converged"
            );
        }
        moved || fading
    }

    /// Runs the layout to convergence, bounded by `settle_max_ticks`.
    pub fn settle(&mut self) -> usize {
        let max = self.config.settle_max_ticks;
        match self.mounted {
            Some(ref mut m) => m.simulation.simulation.run_until_settled(max),
            None => 0,
        }
    }

    /// Adopts a new container width. Existing positions survive; they are
    /// re-centred and re-clamped.
    pub fn resize(&mut self, width: f64) {
        let viewport = Viewport::from_width(width, &self.config);
        if viewport == self.viewport {
            return;
        }
        debug!(
            parent: &self.span,
            width = viewport.width,
            height = viewport.height,
            "Viewport resized"
        );
        self.viewport = viewport;
        if let Some(ref mut m) = self.mounted {
            m.simulation.simulation.resize(viewport, &self.config);
        }
    }

    /// Starts dragging the node under `p`, or panning if there is none.
    pub fn pointer_down(&mut self, p: Point) {
        let world = self.transform.invert(p);
        let hit = self
            .mounted
            .as_ref()
            .and_then(|m| m.simulation.simulation.node_at(world));

        match (hit, self.mounted.as_mut()) {
            (Some(index), Some(m)) => {
                let sim = &mut m.simulation.simulation;
                sim.set_alpha_target(self.config.drag_alpha_target);
                sim.restart();
                sim.pin(index, world);
                self.pointer = Pointer::DraggingNode { index };
                debug!(parent: &self.span, node = index, "Drag started");
            }
            _ => self.pointer = Pointer::Panning { last: p },
        }
    }

    pub fn pointer_move(&mut self, p: Point) {
        match self.pointer {
            Pointer::DraggingNode { index } => {
                let world = self.transform.invert(p);
                if let Some(ref mut m) = self.mounted {
                    m.simulation.simulation.pin(index, world);
                    m.tooltip.tooltip.move_to(p);
                }
            }
            Pointer::Panning { last } => {
                self.transform.translate_by(p.x - last.x, p.y - last.y);
                self.pointer = Pointer::Panning { last: p };
            }
            Pointer::Idle => self.hover(p),
        }
    }

    pub fn pointer_up(&mut self, p: Point) {
        if let Pointer::DraggingNode { index } = self.pointer {
            if let Some(ref mut m) = self.mounted {
                let sim = &mut m.simulation.simulation;
                sim.unpin(index);
                sim.set_alpha_target(0.0);
            }
            debug!(parent: &self.span, node = index, "Drag ended");
        }
        self.pointer = Pointer::Idle;
        self.hover(p);
    }

    /// Pointer left the viewport: ends any gesture and fades the tooltip.
    pub fn pointer_leave(&mut self) {
        if let Pointer::DraggingNode { index } = self.pointer {
            if let Some(ref mut m) = self.mounted {
                m.simulation.simulation.unpin(index);
                m.simulation.simulation.set_alpha_target(0.0);
            }
        }
        self.pointer = Pointer::Idle;
        self.hovered = None;
        if let Some(ref mut m) = self.mounted {
            m.tooltip.tooltip.hide();
        }
    }

    fn hover(&mut self, p: Point) {
        let Some(ref mut m) = self.mounted else {
            return;
        };
        let world = self.transform.invert(p);
        let hit = m.simulation.simulation.node_at(world);
        let tooltip = &mut m.tooltip.tooltip;

        match (hit, self.hovered) {
            (Some(index), Some(current)) if index == current => tooltip.move_to(p),
            (Some(index), _) => {
                if let Some(resource) = m.data.nodes.get(index) {
                    tooltip.show(index, TooltipContent::for_resource(resource), p);
                }
                self.hovered = Some(index);
            }
            (None, Some(_)) => {
                tooltip.hide();
                self.hovered = None;
            }
            (None, None) => {}
        }
    }

    /// Zooms by `notches` wheel steps anchored at `p`; positive zooms in.
    pub fn wheel(&mut self, p: Point, notches: f64) {
        self.zoom_at(p, WHEEL_STEP.powf(notches));
    }

    pub fn zoom_at(&mut self, p: Point, factor: f64) {
        self.transform
            .scale_by_at(factor, p, self.config.min_zoom, self.config.max_zoom);
    }

    /// Zooms around the viewport centre.
    pub fn zoom_by(&mut self, factor: f64) {
        self.zoom_at(self.viewport.center(), factor);
    }

    pub fn pan_by(&mut self, dx: f64, dy: f64) {
        self.transform.translate_by(dx, dy);
    }

    pub fn reset_view(&mut self) {
        self.transform = ZoomTransform::IDENTITY;
    }

    pub fn scene(&self) -> Scene {
        self.scene_with_metrics(TextMetrics::default())
    }

    /// Builds the display list, laying the tooltip out with `metrics`.
    pub fn scene_with_metrics(&self, metrics: TextMetrics) -> Scene {
        let Some(ref m) = self.mounted else {
            return Scene::placeholder(self.viewport, self.transform);
        };
        let sim = &m.simulation.simulation;
        let radius = sim.params().node_radius;

        let nodes = sim
            .nodes()
            .iter()
            .zip(m.data.nodes.iter())
            .map(|(node, resource)| NodeGlyph {
                index: node.index,
                id: resource.id.clone(),
                category: resource.category,
                center: node.position(),
                radius,
                tag: resource.category.tag(),
                label: truncate_label(&resource.display_name, self.config.label_max_chars),
                palette: palette_for(resource.category),
                pinned: node.is_pinned(),
                hovered: self.hovered == Some(node.index),
            })
            .collect();

        let edges = m
            .graph
            .edges()
            .into_iter()
            .filter_map(|(a, b)| {
                Some(EdgeLine {
                    from: sim.node(a)?.position(),
                    to: sim.node(b)?.position(),
                })
            })
            .collect();

        Scene {
            viewport: self.viewport,
            transform: self.transform,
            placeholder: None,
            edges,
            nodes,
            tooltip: m.tooltip.tooltip.layout(&self.viewport, metrics),
        }
    }
}
