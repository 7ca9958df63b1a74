use crate::mapping::{cell_metrics, cell_to_viewport, to_canvas, tooltip_rect, viewport_width};
use anyhow::Result;
use cloudscope_core::palette::Rgb;
use cloudscope_core::scene::Scene;
use cloudscope_core::{GraphRenderer, LayoutConfig, RendererState, ScanResult};
use crossterm::{
    event::{
        self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEvent, KeyEventKind,
        KeyModifiers, MouseButton, MouseEvent, MouseEventKind,
    },
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Alignment, Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols::Marker,
    text::{Line, Span},
    widgets::{
        Block, Borders, Clear, Paragraph,
        canvas::{Canvas, Circle, Line as CanvasLine},
    },
};
use std::io;
use std::time::{Duration, Instant};

const FRAME: Duration = Duration::from_millis(16);
const ZOOM_STEP: f64 = 1.2;
/// Arrow-key pan as a fraction of the viewport width.
const PAN_FRACTION: f64 = 0.05;

fn color(rgb: Rgb) -> Color {
    Color::Rgb(rgb.0, rgb.1, rgb.2)
}

/// Interactive terminal view over one [`GraphRenderer`].
pub struct GraphViewer {
    renderer: GraphRenderer,
    title: String,
    area: Rect,
    should_quit: bool,
}

impl GraphViewer {
    pub fn new(result: ScanResult, config: LayoutConfig, title: impl Into<String>) -> Self {
        let mut renderer =
            GraphRenderer::new(viewport_width(80), config).with_span(tracing::info_span!("viewer"));
        renderer.set_data(result);
        Self {
            renderer,
            title: title.into(),
            area: Rect::default(),
            should_quit: false,
        }
    }

    pub fn renderer(&self) -> &GraphRenderer {
        &self.renderer
    }

    pub fn should_quit(&self) -> bool {
        self.should_quit
    }

    /// Adopts the graph area of the latest layout, resizing the viewport when
    /// its width changed.
    pub fn set_area(&mut self, area: Rect) {
        if area.width != self.area.width {
            self.renderer.resize(viewport_width(area.width));
        }
        self.area = area;
    }

    pub fn handle_key(&mut self, key: KeyEvent) {
        if key.kind != KeyEventKind::Press {
            return;
        }
        let step = self.renderer.viewport().width * PAN_FRACTION;
        match key.code {
            KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.should_quit = true;
            }
            KeyCode::Char('q') | KeyCode::Esc => self.should_quit = true,
            KeyCode::Left => self.renderer.pan_by(step, 0.0),
            KeyCode::Right => self.renderer.pan_by(-step, 0.0),
            KeyCode::Up => self.renderer.pan_by(0.0, step),
            KeyCode::Down => self.renderer.pan_by(0.0, -step),
            KeyCode::Char('+') | KeyCode::Char('=') => self.renderer.zoom_by(ZOOM_STEP),
            KeyCode::Char('-') => self.renderer.zoom_by(1.0 / ZOOM_STEP),
            KeyCode::Char('0') => self.renderer.reset_view(),
            _ => {}
        }
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent) {
        let viewport = self.renderer.viewport();
        let Some(p) = cell_to_viewport(mouse.column, mouse.row, self.area, &viewport) else {
            if !matches!(mouse.kind, MouseEventKind::Up(_)) {
                self.renderer.pointer_leave();
            }
            return;
        };

        match mouse.kind {
            MouseEventKind::Down(MouseButton::Left) => self.renderer.pointer_down(p),
            MouseEventKind::Drag(MouseButton::Left) | MouseEventKind::Moved => {
                self.renderer.pointer_move(p)
            }
            MouseEventKind::Up(MouseButton::Left) => self.renderer.pointer_up(p),
            MouseEventKind::ScrollUp => self.renderer.wheel(p, 1.0),
            MouseEventKind::ScrollDown => self.renderer.wheel(p, -1.0),
            _ => {}
        }
    }

    pub fn handle_event(&mut self, event: Event) {
        match event {
            Event::Key(key) => self.handle_key(key),
            Event::Mouse(mouse) => self.handle_mouse(mouse),
            // Resizes are picked up by the next layout pass.
            _ => {}
        }
    }

    fn ui(&mut self, f: &mut Frame) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([
                Constraint::Min(5),    // Graph
                Constraint::Length(1), // Hints bar
            ])
            .split(f.area());

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(Color::Cyan));
        let inner = block.inner(chunks[0]);
        self.set_area(inner);
        f.render_widget(block, chunks[0]);

        let viewport = self.renderer.viewport();
        let scene = self
            .renderer
            .scene_with_metrics(cell_metrics(inner, &viewport));

        if scene.is_placeholder() {
            render_placeholder(f, inner, &scene);
        } else {
            render_graph(f, inner, &scene);
            render_tooltip(f, inner, &scene);
        }
        self.render_hints(f, chunks[1]);
    }

    fn render_hints(&self, f: &mut Frame, area: Rect) {
        let state = match self.renderer.state() {
            RendererState::Idle => "idle",
            RendererState::LayingOut => "laying out",
            RendererState::InteractiveSteady => "steady",
        };
        let key = |s: &'static str| Span::styled(s, Style::default().add_modifier(Modifier::BOLD));
        let hints = Paragraph::new(Line::from(vec![
            key("drag"),
            Span::raw(" move/pan | "),
            key("wheel +/-"),
            Span::raw(" zoom | "),
            key("←↑↓→"),
            Span::raw(" pan | "),
            key("0"),
            Span::raw(" reset | "),
            key("q"),
            Span::raw(" quit | "),
            Span::raw(format!("{} | {:.0}%", state, self.renderer.transform().k * 100.0)),
        ]))
        .style(Style::default().fg(Color::DarkGray));
        f.render_widget(hints, area);
    }
}

fn render_placeholder(f: &mut Frame, area: Rect, scene: &Scene) {
    let text = scene.placeholder.unwrap_or_default();
    let top = area.y + area.height / 2;
    let line = Rect::new(area.x, top, area.width, 1.min(area.height));
    let placeholder = Paragraph::new(text)
        .alignment(Alignment::Center)
        .style(Style::default().fg(Color::DarkGray));
    f.render_widget(placeholder, line);
}

fn render_graph(f: &mut Frame, area: Rect, scene: &Scene) {
    let viewport = scene.viewport;
    let transform = scene.transform;

    let canvas = Canvas::default()
        .marker(Marker::Braille)
        .x_bounds([0.0, viewport.width])
        .y_bounds([0.0, viewport.height])
        .paint(|ctx| {
            for edge in &scene.edges {
                let (x1, y1) = to_canvas(transform.apply(edge.from), &viewport);
                let (x2, y2) = to_canvas(transform.apply(edge.to), &viewport);
                ctx.draw(&CanvasLine::new(x1, y1, x2, y2, Color::DarkGray));
            }
            ctx.layer();

            for node in &scene.nodes {
                let (x, y) = to_canvas(scene.screen_position(node), &viewport);
                let radius = scene.screen_radius(node);
                ctx.draw(&Circle {
                    x,
                    y,
                    radius,
                    color: color(node.palette.outer),
                });
                ctx.draw(&Circle {
                    x,
                    y,
                    radius: radius * 0.55,
                    color: color(node.palette.inner),
                });
            }
            ctx.layer();

            let ch = viewport.height / area.height.max(1) as f64;
            let cw = viewport.width / area.width.max(1) as f64;
            for node in &scene.nodes {
                let (x, y) = to_canvas(scene.screen_position(node), &viewport);
                let radius = scene.screen_radius(node);
                let tag_style = Style::default().fg(Color::White).add_modifier(Modifier::BOLD);
                let label_style = if node.hovered || node.pinned {
                    Style::default().fg(Color::Yellow)
                } else {
                    Style::default().fg(Color::Gray)
                };
                let tag_x = x - node.tag.chars().count() as f64 * cw / 2.0;
                ctx.print(tag_x, y, Line::styled(node.tag, tag_style));
                let label_x = x - node.label.chars().count() as f64 * cw / 2.0;
                ctx.print(label_x, y - radius - ch, Line::styled(node.label.clone(), label_style));
            }
        });
    f.render_widget(canvas, area);
}

fn render_tooltip(f: &mut Frame, area: Rect, scene: &Scene) {
    let Some(ref tooltip) = scene.tooltip else {
        return;
    };
    let rect = tooltip_rect(tooltip, area, &scene.viewport);
    let fg = if tooltip.opacity > 0.5 {
        Color::White
    } else {
        Color::DarkGray
    };
    let lines: Vec<Line> = tooltip
        .lines
        .iter()
        .map(|l| Line::from(l.clone()))
        .collect();
    let widget = Paragraph::new(lines)
        .style(Style::default().fg(fg))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(fg)),
        );
    f.render_widget(Clear, rect);
    f.render_widget(widget, rect);
}

fn run_loop<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    viewer: &mut GraphViewer,
) -> Result<()> {
    let mut last_frame = Instant::now();
    loop {
        terminal.draw(|f| viewer.ui(f))?;

        let timeout = FRAME.saturating_sub(last_frame.elapsed());
        if event::poll(timeout)? {
            viewer.handle_event(event::read()?);
            // Drain bursts of mouse motion before the next frame.
            while event::poll(Duration::ZERO)? {
                viewer.handle_event(event::read()?);
            }
        }

        if viewer.should_quit() {
            break;
        }

        if last_frame.elapsed() >= FRAME {
            viewer.renderer.tick();
            last_frame = Instant::now();
        }
    }
    Ok(())
}

/// Opens the full-screen graph viewer and blocks until the user quits.
pub fn run_viewer(result: ScanResult, config: LayoutConfig, title: impl Into<String>) -> Result<()> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut viewer = GraphViewer::new(result, config, title);
    let result = run_loop(&mut terminal, &mut viewer);

    // Restore terminal
    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        LeaveAlternateScreen,
        DisableMouseCapture
    )?;
    terminal.show_cursor()?;

    result
}
