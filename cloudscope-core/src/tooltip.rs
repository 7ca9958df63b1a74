use crate::model::Resource;
use crate::viewport::{Point, Viewport};

/// What a hovered node's tooltip says.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipContent {
    pub rows: Vec<(String, String)>,
}

impl TooltipContent {
    pub fn for_resource(resource: &Resource) -> Self {
        let mut rows = vec![
            ("Type".to_string(), resource.category.label().to_string()),
            ("Name".to_string(), resource.display_name.clone()),
            ("ID".to_string(), resource.id.clone()),
        ];
        if let Some(ref detail) = resource.detail {
            rows.extend(
                detail
                    .fields()
                    .into_iter()
                    .map(|(label, value)| (label.to_string(), value)),
            );
        }
        Self { rows }
    }

    pub fn lines(&self) -> Vec<String> {
        self.rows
            .iter()
            .map(|(label, value)| format!("{}: {}", label, value))
            .collect()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TooltipPhase {
    Hidden,
    Visible,
    Fading { frames_left: u32 },
}

/// Size of text in viewport units, supplied by whoever draws the tooltip.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TextMetrics {
    pub char_width: f64,
    pub line_height: f64,
    pub padding: f64,
}

impl Default for TextMetrics {
    fn default() -> Self {
        Self {
            char_width: 7.0,
            line_height: 16.0,
            padding: 8.0,
        }
    }
}

/// A laid-out tooltip, fully inside its viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct TooltipBox {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub lines: Vec<String>,
    pub opacity: f64,
}

/// Floating hover tooltip of one mounted graph. Positions are in viewport
/// (screen) coordinates, outside the pan/zoom transform.
#[derive(Debug, Clone)]
pub struct Tooltip {
    phase: TooltipPhase,
    node: Option<usize>,
    content: Option<TooltipContent>,
    anchor: Point,
    offset: f64,
    fade_frames: u32,
}

impl Tooltip {
    pub fn new(offset: f64, fade_frames: u32) -> Self {
        Self {
            phase: TooltipPhase::Hidden,
            node: None,
            content: None,
            anchor: Point::default(),
            offset,
            fade_frames,
        }
    }

    pub fn phase(&self) -> TooltipPhase {
        self.phase
    }

    /// Node the tooltip describes, while visible or fading.
    pub fn node(&self) -> Option<usize> {
        self.node
    }

    pub fn content(&self) -> Option<&TooltipContent> {
        self.content.as_ref()
    }

    pub fn is_visible(&self) -> bool {
        self.phase == TooltipPhase::Visible
    }

    pub fn show(&mut self, node: usize, content: TooltipContent, anchor: Point) {
        self.node = Some(node);
        self.content = Some(content);
        self.anchor = anchor;
        self.phase = TooltipPhase::Visible;
    }

    pub fn move_to(&mut self, anchor: Point) {
        self.anchor = anchor;
    }

    /// Starts fading out; a hidden or already fading tooltip is unaffected.
    pub fn hide(&mut self) {
        if self.phase == TooltipPhase::Visible {
            if self.fade_frames == 0 {
                self.clear();
            } else {
                self.phase = TooltipPhase::Fading {
                    frames_left: self.fade_frames,
                };
            }
        }
    }

    /// Advances the fade by one frame, removing the tooltip once it is done.
    pub fn advance_frame(&mut self) {
        if let TooltipPhase::Fading { frames_left } = self.phase {
            if frames_left <= 1 {
                self.clear();
            } else {
                self.phase = TooltipPhase::Fading {
                    frames_left: frames_left - 1,
                };
            }
        }
    }

    fn clear(&mut self) {
        self.phase = TooltipPhase::Hidden;
        self.node = None;
        self.content = None;
    }

    pub fn opacity(&self) -> f64 {
        match self.phase {
            TooltipPhase::Hidden => 0.0,
            TooltipPhase::Visible => 1.0,
            TooltipPhase::Fading { frames_left } => {
                frames_left as f64 / self.fade_frames.max(1) as f64
            }
        }
    }

    /// Places the tooltip below-right of the pointer, flipping to the other
    /// side when it would overflow, then clamping it fully inside `viewport`.
    pub fn layout(&self, viewport: &Viewport, metrics: TextMetrics) -> Option<TooltipBox> {
        if self.phase == TooltipPhase::Hidden {
            return None;
        }
        let content = self.content.as_ref()?;
        let lines = content.lines();
        let longest = lines.iter().map(|l| l.chars().count()).max().unwrap_or(0);
        let width = longest as f64 * metrics.char_width + 2.0 * metrics.padding;
        let height = lines.len() as f64 * metrics.line_height + 2.0 * metrics.padding;

        let mut x = self.anchor.x + self.offset;
        if x + width > viewport.width {
            x = self.anchor.x - self.offset - width;
        }
        let mut y = self.anchor.y + self.offset;
        if y + height > viewport.height {
            y = self.anchor.y - self.offset - height;
        }

        Some(TooltipBox {
            x: clamp_start(x, width, viewport.width),
            y: clamp_start(y, height, viewport.height),
            width,
            height,
            lines,
            opacity: self.opacity(),
        })
    }
}

fn clamp_start(v: f64, size: f64, extent: f64) -> f64 {
    v.clamp(0.0, (extent - size).max(0.0))
}
