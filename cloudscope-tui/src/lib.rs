//! Terminal viewer for cloudscope resource graphs.
//!
//! Draws the [`cloudscope_core::scene::Scene`] produced by a
//! [`cloudscope_core::GraphRenderer`] on a braille canvas and forwards mouse
//! and key input back to it.

pub mod mapping;
pub mod viewer;

pub use viewer::{GraphViewer, run_viewer};
