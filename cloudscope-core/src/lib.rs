//! Resource normalization and force-directed graph engine for cloudscope.
//!
//! The [`normalize`] module folds per-category fetch outcomes into a single
//! [`model::ScanResult`]. The [`renderer`] module owns the layout simulation,
//! pan/zoom, drag and hover state for one mounted viewport and produces a
//! [`scene::Scene`] that the terminal viewer and the [`svg`] exporter draw.

pub mod config;
pub mod error;
pub mod graph;
pub mod model;
pub mod normalize;
pub mod palette;
pub mod remote;
pub mod renderer;
pub mod report;
pub mod scan;
pub mod scene;
pub mod simulation;
pub mod svg;
pub mod tooltip;
pub mod transform;
pub mod viewport;

pub use cloudscope_scanner::{Category, Credentials};
pub use config::{AppConfig, LayoutConfig, ScanConfig};
pub use error::CoreError;
pub use model::{Relation, Resource, ResourceDetail, ScanResult, ScanSummary};
pub use normalize::Normalizer;
pub use renderer::{GraphRenderer, RendererState};
pub use viewport::{Point, Viewport};
