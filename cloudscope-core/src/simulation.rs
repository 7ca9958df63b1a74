// Force-directed layout: many-body repulsion, centering and collision
// avoidance, integrated once per frame and clamped to the viewport.

use crate::config::LayoutConfig;
use crate::viewport::{ForceParams, Point, Viewport};
use std::f64::consts::PI;

const INITIAL_RADIUS: f64 = 10.0;
const DISTANCE_MIN_SQ: f64 = 1.0;

/// A resource's position state during layout. `index` refers to the node
/// sequence of the ScanResult the simulation was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct LayoutNode {
    pub index: usize,
    pub x: f64,
    pub y: f64,
    pub vx: f64,
    pub vy: f64,
    pub fx: Option<f64>,
    pub fy: Option<f64>,
}

impl LayoutNode {
    pub fn position(&self) -> Point {
        Point::new(self.x, self.y)
    }

    pub fn is_pinned(&self) -> bool {
        self.fx.is_some() || self.fy.is_some()
    }
}

/// Deterministic source for the tiny offsets that separate coincident nodes.
#[derive(Debug, Clone)]
struct Lcg(u64);

impl Lcg {
    const A: u64 = 1_664_525;
    const C: u64 = 1_013_904_223;
    const M: u64 = 4_294_967_296;

    fn next(&mut self) -> f64 {
        self.0 = (Self::A.wrapping_mul(self.0).wrapping_add(Self::C)) % Self::M;
        self.0 as f64 / Self::M as f64
    }

    fn jiggle(&mut self) -> f64 {
        (self.next() - 0.5) * 1e-6
    }
}

/// Incremental physics simulation stepped by the host once per frame.
///
/// Energy (`alpha`) moves toward `alpha_target` every tick and scales all
/// forces. The simulation stops on its own once alpha drops below
/// `alpha_min`; raising the target and calling [`Simulation::restart`] keeps
/// it running, which is what dragging does.
#[derive(Debug, Clone)]
pub struct Simulation {
    nodes: Vec<LayoutNode>,
    viewport: Viewport,
    params: ForceParams,
    alpha: f64,
    alpha_min: f64,
    alpha_decay: f64,
    alpha_target: f64,
    velocity_decay: f64,
    running: bool,
    ticks: u64,
    rng: Lcg,
}

impl Simulation {
    /// Places `count` nodes on a phyllotaxis spiral around the viewport
    /// centre.
    pub fn new(count: usize, viewport: Viewport, config: &LayoutConfig) -> Self {
        let params = ForceParams::for_viewport(&viewport, config);
        let center = viewport.center();
        let angle_step = PI * (3.0 - 5.0_f64.sqrt());

        let nodes = (0..count)
            .map(|i| {
                let radius = INITIAL_RADIUS * (0.5 + i as f64).sqrt();
                let angle = i as f64 * angle_step;
                let p = viewport.clamp(
                    Point::new(center.x + radius * angle.cos(), center.y + radius * angle.sin()),
                    params.node_radius,
                );
                LayoutNode {
                    index: i,
                    x: p.x,
                    y: p.y,
                    vx: 0.0,
                    vy: 0.0,
                    fx: None,
                    fy: None,
                }
            })
            .collect();

        Self {
            nodes,
            viewport,
            params,
            alpha: 1.0,
            alpha_min: config.alpha_min,
            alpha_decay: config.alpha_decay,
            alpha_target: 0.0,
            velocity_decay: config.velocity_decay,
            running: count > 0,
            ticks: 0,
            rng: Lcg(1),
        }
    }

    pub fn nodes(&self) -> &[LayoutNode] {
        &self.nodes
    }

    pub fn node(&self, index: usize) -> Option<&LayoutNode> {
        self.nodes.get(index)
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn params(&self) -> ForceParams {
        self.params
    }

    pub fn alpha(&self) -> f64 {
        self.alpha
    }

    pub fn alpha_min(&self) -> f64 {
        self.alpha_min
    }

    pub fn alpha_target(&self) -> f64 {
        self.alpha_target
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// True until alpha has decayed below `alpha_min`.
    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn set_alpha(&mut self, alpha: f64) {
        self.alpha = alpha.clamp(0.0, 1.0);
    }

    pub fn set_alpha_target(&mut self, target: f64) {
        self.alpha_target = target.clamp(0.0, 1.0);
    }

    pub fn restart(&mut self) {
        self.running = !self.nodes.is_empty();
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Sum of squared velocities.
    pub fn kinetic_energy(&self) -> f64 {
        self.nodes.iter().map(|n| n.vx * n.vx + n.vy * n.vy).sum()
    }

    /// Host frame callback: ticks once if running, stopping once cool.
    /// Returns whether a tick happened.
    pub fn step(&mut self) -> bool {
        if !self.running {
            return false;
        }
        self.tick();
        if self.alpha < self.alpha_min {
            self.running = false;
        }
        true
    }

    /// Steps until the simulation stops or `max_ticks` is reached; returns the
    /// number of ticks taken.
    pub fn run_until_settled(&mut self, max_ticks: usize) -> usize {
        let mut taken = 0;
        while taken < max_ticks && self.step() {
            taken += 1;
        }
        taken
    }

    /// One integration step regardless of the running flag.
    pub fn tick(&mut self) {
        self.alpha += (self.alpha_target - self.alpha) * self.alpha_decay;
        self.ticks += 1;

        self.apply_many_body();
        self.apply_center();
        self.apply_collide();

        let keep = 1.0 - self.velocity_decay;
        for node in &mut self.nodes {
            match node.fx {
                Some(fx) => {
                    node.x = fx;
                    node.vx = 0.0;
                }
                None => {
                    node.vx *= keep;
                    node.x += node.vx;
                }
            }
            match node.fy {
                Some(fy) => {
                    node.y = fy;
                    node.vy = 0.0;
                }
                None => {
                    node.vy *= keep;
                    node.y += node.vy;
                }
            }
        }

        self.clamp_to_viewport();
    }

    fn apply_many_body(&mut self) {
        let strength = self.params.charge_strength * self.alpha;
        let n = self.nodes.len();
        for i in 0..n {
            for j in (i + 1)..n {
                let mut dx = self.nodes[j].x - self.nodes[i].x;
                let mut dy = self.nodes[j].y - self.nodes[i].y;
                if dx == 0.0 {
                    dx = self.rng.jiggle();
                }
                if dy == 0.0 {
                    dy = self.rng.jiggle();
                }
                let l = (dx * dx + dy * dy).max(DISTANCE_MIN_SQ);
                let w = strength / l;
                // Negative strength pushes i away from j and j away from i.
                self.nodes[i].vx += dx * w;
                self.nodes[i].vy += dy * w;
                self.nodes[j].vx -= dx * w;
                self.nodes[j].vy -= dy * w;
            }
        }
    }

    fn apply_center(&mut self) {
        let n = self.nodes.len();
        if n == 0 {
            return;
        }
        let (sx, sy) = self
            .nodes
            .iter()
            .fold((0.0, 0.0), |(sx, sy), node| (sx + node.x, sy + node.y));
        let dx = sx / n as f64 - self.params.center.x;
        let dy = sy / n as f64 - self.params.center.y;
        for node in &mut self.nodes {
            node.x -= dx;
            node.y -= dy;
        }
    }

    fn apply_collide(&mut self) {
        let r = self.params.collide_radius;
        let reach = 2.0 * r;
        let n = self.nodes.len();
        for i in 0..n {
            let xi = self.nodes[i].x + self.nodes[i].vx;
            let yi = self.nodes[i].y + self.nodes[i].vy;
            for j in (i + 1)..n {
                let mut x = xi - (self.nodes[j].x + self.nodes[j].vx);
                let mut y = yi - (self.nodes[j].y + self.nodes[j].vy);
                let mut l = x * x + y * y;
                if l >= reach * reach {
                    continue;
                }
                if x == 0.0 {
                    x = self.rng.jiggle();
                    l += x * x;
                }
                if y == 0.0 {
                    y = self.rng.jiggle();
                    l += y * y;
                }
                let dist = l.sqrt();
                let push = (reach - dist) / dist;
                x *= push;
                y *= push;
                // Equal radii split the correction evenly.
                self.nodes[i].vx += x * 0.5;
                self.nodes[i].vy += y * 0.5;
                self.nodes[j].vx -= x * 0.5;
                self.nodes[j].vy -= y * 0.5;
            }
        }
    }

    fn clamp_to_viewport(&mut self) {
        let radius = self.params.node_radius;
        let viewport = self.viewport;
        for node in &mut self.nodes {
            let p = viewport.clamp(node.position(), radius);
            node.x = p.x;
            node.y = p.y;
        }
    }

    /// Fixes a node at `p` (clamped into the viewport) until unpinned.
    pub fn pin(&mut self, index: usize, p: Point) {
        let p = self.viewport.clamp(p, self.params.node_radius);
        if let Some(node) = self.nodes.get_mut(index) {
            node.fx = Some(p.x);
            node.fy = Some(p.y);
        }
    }

    pub fn unpin(&mut self, index: usize) {
        if let Some(node) = self.nodes.get_mut(index) {
            node.fx = None;
            node.fy = None;
        }
    }

    /// Adopts a resized viewport: recomputes force parameters, moves every
    /// node (and pin) by the shift of the centre, re-clamps and reheats.
    pub fn resize(&mut self, viewport: Viewport, config: &LayoutConfig) {
        let old_center = self.viewport.center();
        let new_center = viewport.center();
        let (dx, dy) = (new_center.x - old_center.x, new_center.y - old_center.y);

        self.viewport = viewport;
        self.params = ForceParams::for_viewport(&viewport, config);

        let radius = self.params.node_radius;
        for node in &mut self.nodes {
            node.x += dx;
            node.y += dy;
            if let (Some(fx), Some(fy)) = (node.fx, node.fy) {
                let p = viewport.clamp(Point::new(fx + dx, fy + dy), radius);
                node.fx = Some(p.x);
                node.fy = Some(p.y);
            }
        }
        self.clamp_to_viewport();

        if !self.nodes.is_empty() {
            self.alpha = self.alpha.max(config.resize_alpha);
            self.running = true;
        }
    }

    /// Topmost node whose footprint contains the world point `p`.
    pub fn node_at(&self, p: Point) -> Option<usize> {
        let r_sq = self.params.node_radius * self.params.node_radius;
        self.nodes
            .iter()
            .rev()
            .find(|node| node.position().distance_sq(p) <= r_sq)
            .map(|node| node.index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn viewport(width: f64) -> (Viewport, LayoutConfig) {
        let config = LayoutConfig::default();
        (Viewport::from_width(width, &config), config)
    }

    fn assert_inside(sim: &Simulation) {
        let r = sim.params().node_radius;
        let vp = sim.viewport();
        for node in sim.nodes() {
            assert!(node.x >= r - 1e-9 && node.x <= vp.width - r + 1e-9, "x escaped: {:?}", node);
            assert!(node.y >= r - 1e-9 && node.y <= vp.height - r + 1e-9, "y escaped: {:?}", node);
        }
    }

    #[test]
    fn test_nodes_stay_inside_after_every_tick() {
        let (vp, config) = viewport(400.0);
        let mut sim = Simulation::new(60, vp, &config);
        for _ in 0..300 {
            sim.tick();
            assert_inside(&sim);
        }
    }

    #[test]
    fn test_single_node_settles_at_center() {
        let (vp, config) = viewport(800.0);
        let mut sim = Simulation::new(1, vp, &config);
        sim.run_until_settled(1000);
        let node = &sim.nodes()[0];
        assert!((node.x - 400.0).abs() < 1e-6);
        assert!((node.y - 300.0).abs() < 1e-6);
    }

    #[test]
    fn test_converges_and_stops() {
        let (vp, config) = viewport(800.0);
        let mut sim = Simulation::new(12, vp, &config);
        let ticks = sim.run_until_settled(10_000);
        assert!(!sim.is_running());
        assert!(sim.alpha() < sim.alpha_min());
        assert!(ticks <= 301, "took {} ticks", ticks);
        assert!(!sim.step());
    }

    #[test]
    fn test_collision_separates_nodes() {
        let (vp, config) = viewport(800.0);
        let mut sim = Simulation::new(8, vp, &config);
        sim.run_until_settled(1000);
        let min_gap = sim.params().node_radius * 2.0;
        let nodes = sim.nodes();
        for i in 0..nodes.len() {
            for j in (i + 1)..nodes.len() {
                let d = nodes[i].position().distance_sq(nodes[j].position()).sqrt();
                assert!(d >= min_gap, "nodes {} and {} overlap at {}", i, j, d);
            }
        }
    }

    #[test]
    fn test_layout_is_deterministic() {
        let (vp, config) = viewport(640.0);
        let mut a = Simulation::new(20, vp, &config);
        let mut b = Simulation::new(20, vp, &config);
        a.run_until_settled(1000);
        b.run_until_settled(1000);
        assert_eq!(a.nodes(), b.nodes());
    }

    #[test]
    fn test_pinned_node_holds_position() {
        let (vp, config) = viewport(800.0);
        let mut sim = Simulation::new(5, vp, &config);
        sim.pin(2, Point::new(100.0, 120.0));
        for _ in 0..50 {
            sim.tick();
        }
        let node = sim.node(2).unwrap();
        assert_eq!((node.x, node.y), (100.0, 120.0));
        assert!(node.is_pinned());
    }

    #[test]
    fn test_pin_outside_viewport_is_clamped() {
        let (vp, config) = viewport(800.0);
        let mut sim = Simulation::new(3, vp, &config);
        sim.pin(0, Point::new(-500.0, 10_000.0));
        sim.tick();
        let node = sim.node(0).unwrap();
        let r = sim.params().node_radius;
        assert_eq!((node.x, node.y), (r, vp.height - r));
    }

    #[test]
    fn test_pin_release_still_converges() {
        let (vp, config) = viewport(800.0);
        let mut sim = Simulation::new(10, vp, &config);
        sim.run_until_settled(1000);
        assert!(!sim.is_running());

        sim.set_alpha_target(config.drag_alpha_target);
        sim.restart();
        sim.pin(0, Point::new(50.0, 50.0));
        for _ in 0..200 {
            assert!(sim.step(), "simulation stopped while dragging");
        }
        assert!(sim.alpha() > 0.2);

        sim.unpin(0);
        sim.set_alpha_target(0.0);
        sim.run_until_settled(1000);
        assert!(!sim.is_running());
        assert!(sim.kinetic_energy() < 1.0);
    }

    #[test]
    fn test_resize_keeps_nodes_and_reclamps() {
        let (vp, config) = viewport(1000.0);
        let mut sim = Simulation::new(15, vp, &config);
        sim.run_until_settled(1000);
        let count = sim.len();

        let smaller = Viewport::from_width(420.0, &config);
        sim.resize(smaller, &config);
        assert_eq!(sim.len(), count);
        assert!(sim.is_running());
        assert_eq!(sim.params().center, smaller.center());
        assert_inside(&sim);

        sim.run_until_settled(1000);
        assert_inside(&sim);
    }

    #[test]
    fn test_node_at_hits_footprint() {
        let (vp, config) = viewport(800.0);
        let sim = Simulation::new(1, vp, &config);
        let node = sim.node(0).unwrap().position();
        assert_eq!(sim.node_at(node), Some(0));
        assert_eq!(sim.node_at(Point::new(node.x + 29.0, node.y)), Some(0));
        assert_eq!(sim.node_at(Point::new(node.x + 31.0, node.y)), None);
    }

    #[test]
    fn test_empty_simulation_never_runs() {
        let (vp, config) = viewport(800.0);
        let mut sim = Simulation::new(0, vp, &config);
        assert!(!sim.is_running());
        sim.restart();
        assert!(!sim.step());
    }
}
