//! Ratatui-based terminal UI.
//!
//! Shows the input samples, both fitted curves and their control polygons.
//! The order can be changed live; without an input file the viewer cycles
//! through built-in NACA sections.

use std::io;
use std::path::PathBuf;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use log::LevelFilter;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::analysis::service::MAX_REQUEST_ORDER;
use crate::app::pipeline::{load_airfoil, run_fit, Airfoil, InputSource, RunOutput};
use crate::cli::DEFAULT_SWEEP_ORDERS;
use crate::data::naca::DEMO_SECTIONS;
use crate::domain::{AirfoilFit, FitConfig, Point};
use crate::error::AppError;

mod plotters_chart;

use plotters_chart::FoilPlottersChart;

/// Points per surface of the generated demo sections.
const DEMO_POINTS: usize = 60;

/// Start the TUI.
pub fn run(file: Option<PathBuf>, config: FitConfig) -> Result<(), AppError> {
    // The terminal is owned by the UI; log lines would corrupt the screen.
    log::set_max_level(LevelFilter::Off);

    let mut app = App::new(file, config)?;

    let _guard = TerminalGuard::new()?;
    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal =
        Terminal::new(backend).map_err(|e| AppError::internal(format!("Failed to initialize terminal: {e}")))?;

    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::internal(format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::internal(format!("Failed to enter alternate screen: {e}")));
        }
        Ok(Self)
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
    }
}

struct App {
    config: FitConfig,
    airfoil: Airfoil,
    /// Index into `DEMO_SECTIONS` when no file was given.
    demo: Option<usize>,
    show_polygons: bool,
    status: String,
    run: Option<RunOutput>,
}

impl App {
    fn new(file: Option<PathBuf>, config: FitConfig) -> Result<Self, AppError> {
        let (airfoil, demo) = match file {
            Some(path) => (load_airfoil(&InputSource::File(path))?, None),
            None => (load_airfoil(&demo_source(0))?, Some(0)),
        };
        let mut app = Self {
            config,
            airfoil,
            demo,
            show_polygons: true,
            status: String::new(),
            run: None,
        };
        app.refit();
        Ok(app)
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::internal(format!("Terminal draw error: {e}")))?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::internal(format!("Event poll error: {e}")))?
            {
                continue;
            }

            match event::read().map_err(|e| AppError::internal(format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    if self.handle_key(key.code) {
                        break;
                    }
                    needs_redraw = true;
                }
                Event::Resize(_, _) => {
                    needs_redraw = true;
                }
                _ => {}
            }
        }
        Ok(())
    }

    /// Returns `true` when the user asked to quit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Left => self.set_order(self.config.order.saturating_sub(1)),
            KeyCode::Right => self.set_order(self.config.order + 1),
            KeyCode::Char('n') => self.next_demo(),
            KeyCode::Char('p') => {
                self.show_polygons = !self.show_polygons;
                self.status = format!("control polygons: {}", if self.show_polygons { "on" } else { "off" });
            }
            KeyCode::Char('d') => self.write_debug(),
            _ => {}
        }
        false
    }

    fn set_order(&mut self, order: usize) {
        let order = order.clamp(1, MAX_REQUEST_ORDER);
        if order == self.config.order {
            return;
        }
        self.config.order = order;
        self.refit();
    }

    fn next_demo(&mut self) {
        let Some(idx) = self.demo else {
            self.status = "Viewing a file; NACA demo cycling is disabled.".to_string();
            return;
        };
        let next = (idx + 1) % DEMO_SECTIONS.len();
        match load_airfoil(&demo_source(next)) {
            Ok(airfoil) => {
                self.airfoil = airfoil;
                self.demo = Some(next);
                self.refit();
            }
            Err(err) => self.status = format!("Failed to load demo section: {err}"),
        }
    }

    fn refit(&mut self) {
        match run_fit(&self.airfoil, &self.config) {
            Ok(run) => {
                self.status = format!(
                    "{} | order {} | total SSE {:.3e}",
                    self.airfoil.name,
                    run.fit.order,
                    run.fit.total_sse()
                );
                self.run = Some(run);
            }
            Err(err) => {
                self.status = format!("Fit failed: {err}");
                self.run = None;
            }
        }
    }

    fn write_debug(&mut self) {
        let mut orders = DEFAULT_SWEEP_ORDERS.to_vec();
        orders.push(self.config.order);
        let result = crate::debug::write_debug_bundle(
            &PathBuf::from("debug"),
            &self.airfoil.name,
            &self.airfoil.upper,
            &self.airfoil.lower,
            &orders,
            &self.config,
        );
        self.status = match result {
            Ok(path) => format!("Wrote debug bundle: {}", path.display()),
            Err(err) => format!("Debug write failed: {err}"),
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(frame.area());

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let source = match self.demo {
            Some(idx) => format!("demo {}/{}", idx + 1, DEMO_SECTIONS.len()),
            None => "file".to_string(),
        };
        let mut lines = vec![Line::from(vec![
            Span::styled("foil", Style::default().fg(Color::Cyan)),
            Span::raw(format!(
                " - {} ({source}) | order {} | upper n={} lower n={}",
                self.airfoil.name,
                self.config.order,
                self.airfoil.upper.len(),
                self.airfoil.lower.len()
            )),
        ])];
        if let Some(run) = &self.run {
            lines.push(Line::from(Span::styled(
                format!(
                    "chord={:.4} | upper SSE={:.3e} rms={:.2e} | lower SSE={:.3e} rms={:.2e}",
                    run.fit.chord,
                    run.fit.upper.sse,
                    run.fit.upper.rms_distance(),
                    run.fit.lower.sse,
                    run.fit.lower.rms_distance()
                ),
                Style::default().fg(Color::Gray),
            )));
        }
        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(30)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_polygons(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Bezier fit").borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let Some(run) = &self.run else {
            let msg = Paragraph::new("No fit available.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        };

        let data = ChartData::new(&self.airfoil, &run.fit, self.show_polygons);
        let widget = FoilPlottersChart {
            curves: [data.upper_curve.as_slice(), data.lower_curve.as_slice()],
            polygons: [data.upper_polygon.as_slice(), data.lower_polygon.as_slice()],
            samples: &data.samples,
            x_bounds: data.x_bounds,
            y_bounds: data.y_bounds,
            fmt_x: fmt_axis_x,
            fmt_y: fmt_axis_y,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_polygons(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let mut items = Vec::new();
        if let Some(run) = &self.run {
            for s in [&run.fit.upper, &run.fit.lower] {
                items.push(ListItem::new(Line::from(Span::styled(
                    s.side.display_name(),
                    Style::default().fg(Color::Cyan),
                ))));
                for (i, p) in s.control_points.iter().enumerate() {
                    items.push(ListItem::new(format!("P{i:<2} {:>8.4} {:>8.4}", p.x, p.y)));
                }
            }
        }
        let list = List::new(items).block(Block::default().title("Control points").borders(Borders::ALL));
        frame.render_widget(list, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "←/→ order  n next NACA  p polygons  d debug  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn demo_source(idx: usize) -> InputSource {
    InputSource::naca(DEMO_SECTIONS[idx % DEMO_SECTIONS.len()], DEMO_POINTS)
}

/// Chart series for Plotters.
struct ChartData {
    upper_curve: Vec<(f64, f64)>,
    lower_curve: Vec<(f64, f64)>,
    upper_polygon: Vec<(f64, f64)>,
    lower_polygon: Vec<(f64, f64)>,
    samples: Vec<(f64, f64)>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
}

impl ChartData {
    fn new(airfoil: &Airfoil, fit: &AirfoilFit, show_polygons: bool) -> Self {
        let pairs = |points: &[Point]| points.iter().map(|p| (p.x, p.y)).collect::<Vec<_>>();
        let polygon = |points: &[Point]| if show_polygons { pairs(points) } else { Vec::new() };

        let data = Self {
            upper_curve: pairs(&fit.upper.curve),
            lower_curve: pairs(&fit.lower.curve),
            upper_polygon: polygon(&fit.upper.control_points),
            lower_polygon: polygon(&fit.lower.control_points),
            samples: airfoil
                .upper
                .iter()
                .chain(airfoil.lower.iter())
                .map(|p| (p.x, p.y))
                .collect(),
            x_bounds: [0.0, 1.0],
            y_bounds: [-1.0, 1.0],
        };
        let (x_bounds, y_bounds) = data.bounds();
        Self {
            x_bounds,
            y_bounds,
            ..data
        }
    }

    fn bounds(&self) -> ([f64; 2], [f64; 2]) {
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let all = [
            &self.upper_curve,
            &self.lower_curve,
            &self.upper_polygon,
            &self.lower_polygon,
            &self.samples,
        ];
        for &(x, y) in all.into_iter().flatten() {
            if x.is_finite() && y.is_finite() {
                x_min = x_min.min(x);
                x_max = x_max.max(x);
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        }
        if !(x_min.is_finite() && x_max > x_min) {
            x_min = 0.0;
            x_max = 1.0;
        }
        if !(y_min.is_finite() && y_max > y_min) {
            y_min = -0.1;
            y_max = 0.1;
        }
        let x_pad = ((x_max - x_min) * 0.02).max(1e-12);
        let y_pad = ((y_max - y_min) * 0.05).max(1e-12);
        ([x_min - x_pad, x_max + x_pad], [y_min - y_pad, y_max + y_pad])
    }
}

fn fmt_axis_x(v: f64) -> String {
    format!("{v:.2}")
}

fn fmt_axis_y(v: f64) -> String {
    format!("{v:.3}")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn demo_app() -> App {
        App::new(None, FitConfig::with_order(3)).unwrap()
    }

    #[test]
    fn order_keys_refit_within_bounds() {
        let mut app = demo_app();
        assert_eq!(app.run.as_ref().unwrap().fit.order, 3);

        assert!(!app.handle_key(KeyCode::Right));
        assert_eq!(app.run.as_ref().unwrap().fit.order, 4);

        for _ in 0..10 {
            app.handle_key(KeyCode::Left);
        }
        assert_eq!(app.config.order, 1);
        assert!(app.handle_key(KeyCode::Char('q')));
    }

    #[test]
    fn n_cycles_demo_sections() {
        let mut app = demo_app();
        assert_eq!(app.airfoil.name, "NACA 0012");
        app.handle_key(KeyCode::Char('n'));
        assert_eq!(app.airfoil.name, "NACA 2412");
        assert_eq!(app.demo, Some(1));
    }

    #[test]
    fn chart_bounds_cover_every_series() {
        let app = demo_app();
        let run = app.run.as_ref().unwrap();
        let data = ChartData::new(&app.airfoil, &run.fit, true);
        for &(x, y) in data.samples.iter().chain(data.upper_polygon.iter()) {
            assert!(x >= data.x_bounds[0] && x <= data.x_bounds[1]);
            assert!(y >= data.y_bounds[0] && y <= data.y_bounds[1]);
        }
        let hidden = ChartData::new(&app.airfoil, &run.fit, false);
        assert!(hidden.upper_polygon.is_empty());
    }
}
