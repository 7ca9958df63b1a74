use crate::error::{CoreError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "~/.config/cloudscope/config.toml";

/// Everything a component needs to know, passed in explicitly.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub layout: LayoutConfig,
    pub scan: ScanConfig,
    #[serde(skip)]
    pub config_path: Option<PathBuf>,
}

/// Layout, interaction and visual constants of the graph renderer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    /// Viewport height as a fraction of its width.
    pub aspect_ratio: f64,
    /// Lower bound on the viewport height.
    pub min_height: f64,
    /// Width at which `charge_strength` applies unscaled.
    pub reference_width: f64,
    /// Many-body strength at the reference width; negative repels.
    pub charge_strength: f64,
    /// Node radius as a fraction of the viewport width.
    pub node_radius_fraction: f64,
    pub min_node_radius: f64,
    pub max_node_radius: f64,
    /// Collision footprint radius as a multiple of the node radius.
    pub collide_scale: f64,
    pub min_zoom: f64,
    pub max_zoom: f64,
    pub alpha_min: f64,
    pub alpha_decay: f64,
    pub velocity_decay: f64,
    /// Energy target held while a node is dragged.
    pub drag_alpha_target: f64,
    /// Energy the layout is reheated to after a resize.
    pub resize_alpha: f64,
    pub label_max_chars: usize,
    /// Distance between the pointer and the tooltip corner.
    pub tooltip_offset: f64,
    pub tooltip_fade_frames: u32,
    /// Upper bound on ticks when settling a layout for export.
    pub settle_max_ticks: usize,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            aspect_ratio: 0.75,
            min_height: 320.0,
            reference_width: 800.0,
            charge_strength: -200.0,
            node_radius_fraction: 0.0375,
            min_node_radius: 6.0,
            max_node_radius: 30.0,
            collide_scale: 5.0 / 3.0,
            min_zoom: 0.5,
            max_zoom: 2.0,
            alpha_min: 0.001,
            // Decays from 1 to alpha_min in 300 ticks.
            alpha_decay: 1.0 - 0.001_f64.powf(1.0 / 300.0),
            velocity_decay: 0.4,
            drag_alpha_target: 0.3,
            resize_alpha: 0.3,
            label_max_chars: 20,
            tooltip_offset: 12.0,
            tooltip_fade_frames: 12,
            settle_max_ticks: 600,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ScanConfig {
    pub region: String,
    pub timeout_secs: u64,
    pub gateway: Option<String>,
    pub remote: Option<String>,
    pub source_dir: Option<String>,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            region: "us-east-1".to_string(),
            timeout_secs: 10,
            gateway: None,
            remote: None,
            source_dir: None,
        }
    }
}

impl LayoutConfig {
    /// Rejects values the layout cannot work with: non-finite numbers,
    /// inverted bounds and non-positive scales.
    pub fn validate(&self) -> Result<()> {
        let finite = [
            ("aspect_ratio", self.aspect_ratio),
            ("min_height", self.min_height),
            ("reference_width", self.reference_width),
            ("charge_strength", self.charge_strength),
            ("node_radius_fraction", self.node_radius_fraction),
            ("min_node_radius", self.min_node_radius),
            ("max_node_radius", self.max_node_radius),
            ("collide_scale", self.collide_scale),
            ("min_zoom", self.min_zoom),
            ("max_zoom", self.max_zoom),
            ("alpha_min", self.alpha_min),
            ("alpha_decay", self.alpha_decay),
            ("velocity_decay", self.velocity_decay),
            ("drag_alpha_target", self.drag_alpha_target),
            ("resize_alpha", self.resize_alpha),
            ("tooltip_offset", self.tooltip_offset),
        ];
        if let Some((name, _)) = finite.iter().find(|(_, v)| !v.is_finite()) {
            return Err(invalid(format!("{} must be a finite number", name)));
        }

        let positive = [
            ("aspect_ratio", self.aspect_ratio),
            ("reference_width", self.reference_width),
            ("node_radius_fraction", self.node_radius_fraction),
            ("min_node_radius", self.min_node_radius),
            ("collide_scale", self.collide_scale),
            ("min_zoom", self.min_zoom),
            ("alpha_min", self.alpha_min),
            ("alpha_decay", self.alpha_decay),
        ];
        if let Some((name, v)) = positive.iter().find(|(_, v)| *v <= 0.0) {
            return Err(invalid(format!("{} must be positive, got {}", name, v)));
        }

        if self.min_node_radius > self.max_node_radius {
            return Err(invalid(format!(
                "min_node_radius ({}) exceeds max_node_radius ({})",
                self.min_node_radius, self.max_node_radius
            )));
        }
        if self.min_zoom > self.max_zoom {
            return Err(invalid(format!(
                "min_zoom ({}) exceeds max_zoom ({})",
                self.min_zoom, self.max_zoom
            )));
        }
        if self.min_height < 0.0 {
            return Err(invalid("min_height must not be negative".to_string()));
        }
        for (name, v) in [
            ("alpha_decay", self.alpha_decay),
            ("velocity_decay", self.velocity_decay),
            ("drag_alpha_target", self.drag_alpha_target),
            ("resize_alpha", self.resize_alpha),
        ] {
            if !(0.0..=1.0).contains(&v) {
                return Err(invalid(format!("{} must be within [0, 1], got {}", name, v)));
            }
        }
        Ok(())
    }
}

fn invalid(message: String) -> CoreError {
    CoreError::Config {
        path: "[layout]".to_string(),
        message,
    }
}

impl AppConfig {
    /// Loads `path`, or the default location when `path` is `None`.
    ///
    /// A missing file at the default location yields the defaults; a missing
    /// file that was asked for explicitly is an error.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let (path, explicit) = match path {
            Some(p) => (expand(p), true),
            None => (expand(Path::new(DEFAULT_CONFIG_PATH)), false),
        };

        if !path.exists() {
            if explicit {
                return Err(CoreError::Config {
                    path: path.display().to_string(),
                    message: "file not found".to_string(),
                });
            }
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(&path)?;
        let mut config = Self::from_toml(&content).map_err(|e| CoreError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.layout.validate().map_err(|e| match e {
            CoreError::Config { message, .. } => CoreError::Config {
                path: path.display().to_string(),
                message,
            },
            other => other,
        })?;
        config.config_path = Some(path);
        Ok(config)
    }

    pub fn from_toml(content: &str) -> std::result::Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}
