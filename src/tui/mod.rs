//! Ratatui-based terminal UI.
//!
//! The TUI is the outer surface of the refresh pipeline: a metric selector
//! (single selection), a refresh key, a bar chart and a status line. All data
//! handling goes through `RefreshController` and `ViewBinding`; this module
//! only turns key presses into calls and prepared chart data into widgets.

use std::io;
use std::time::Duration;

use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph},
};

use crate::app::{DataSource, RefreshController, RefreshResult};
use crate::data::Fetcher;
use crate::domain::{DashConfig, Metric, MetricTable};
use crate::error::AppError;
use crate::report::fmt_count;
use crate::view::{Renderer, ViewBinding};

mod plotters_chart;

use plotters_chart::MetricBarChart;

/// Start the TUI.
pub fn run<F: Fetcher>(controller: RefreshController<F>, config: &DashConfig) -> Result<(), AppError> {
    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

    let mut app = App::new(controller, config);
    app.event_loop(&mut terminal)
}

/// Ensures the terminal is restored (raw mode, alternate screen) on exit.
struct TerminalGuard;

impl TerminalGuard {
    fn new() -> Result<Self, AppError> {
        enable_raw_mode().map_err(|e| AppError::new(4, format!("Failed to enable raw mode: {e}")))?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(AppError::new(4, format!("Failed to enter alternate screen: {e}")));
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

/// Chart data prepared by the view binding's render hook.
///
/// `draw_chart` only reads this; it never looks at the table directly, so what
/// is on screen is always the result of the last `render` call.
#[derive(Debug, Clone)]
struct ChartView {
    window: usize,
    metric: Metric,
    bars: Vec<(f64, f64)>,
    dates: Vec<String>,
    x_bounds: [f64; 2],
    y_bounds: [f64; 2],
    latest: Option<(String, f64)>,
    renders: usize,
}

impl ChartView {
    fn new(window: usize) -> Self {
        Self {
            window,
            metric: Metric::TotalCases,
            bars: Vec::new(),
            dates: Vec::new(),
            x_bounds: [0.0, 1.0],
            y_bounds: [0.0, 1.0],
            latest: None,
            renders: 0,
        }
    }
}

impl Renderer for ChartView {
    fn render(&mut self, table: &MetricTable, metric: Metric) {
        let (bars, dates, x_bounds, y_bounds) = chart_series(table, metric, self.window);
        self.latest = table.latest().map(|r| (r.date.clone(), r.value(metric)));
        self.metric = metric;
        self.bars = bars;
        self.dates = dates;
        self.x_bounds = x_bounds;
        self.y_bounds = y_bounds;
        self.renders += 1;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    None,
    Quit,
    Refresh,
}

struct App<F> {
    controller: RefreshController<F>,
    view: ViewBinding<ChartView>,
    status: String,
    refreshing: bool,
}

impl<F: Fetcher> App<F> {
    fn new(controller: RefreshController<F>, config: &DashConfig) -> Self {
        let view = ViewBinding::new(controller.table(), config.metric, ChartView::new(config.window));
        Self {
            controller,
            view,
            status: "Showing bundled snapshot. Press r to fetch live data.".to_string(),
            refreshing: false,
        }
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                self.draw_frame(terminal)?;
                needs_redraw = false;
            }

            if !event::poll(Duration::from_millis(100))
                .map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
                continue;
            }

            match event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))? {
                Event::Key(key) => {
                    if key.kind != KeyEventKind::Press {
                        continue;
                    }
                    match self.handle_key(key.code) {
                        Action::Quit => break,
                        Action::Refresh => {
                            self.refreshing = true;
                            self.status = "Fetching live data...".to_string();
                            self.draw_frame(terminal)?;

                            self.refresh();

                            // Keys pressed while the fetch blocked were aimed at a
                            // disabled control; drop them instead of replaying.
                            discard_pending_input()?;
                        }
                        Action::None => {}
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

    fn draw_frame<B: ratatui::backend::Backend>(&self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        terminal
            .draw(|f| self.draw(f))
            .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
        Ok(())
    }

    fn handle_key(&mut self, code: KeyCode) -> Action {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return Action::Quit,
            KeyCode::Char('r') => {
                if !self.refreshing {
                    return Action::Refresh;
                }
            }
            KeyCode::Right | KeyCode::Down | KeyCode::Tab => {
                self.view.select_next();
            }
            KeyCode::Left | KeyCode::Up | KeyCode::BackTab => {
                self.view.select_prev();
            }
            KeyCode::Char(c @ '1'..='3') => {
                let idx = c as usize - '1' as usize;
                self.view.select(Metric::ALL[idx]);
            }
            _ => {}
        }
        Action::None
    }

    fn refresh(&mut self) {
        let result = self.controller.refresh(&mut self.view);
        self.refreshing = false;
        self.status = match result {
            RefreshResult::Updated { rows } => {
                format!("Live data loaded: {rows} rows.")
            }
            RefreshResult::Failed(err) => {
                format!("Live data unavailable ({err}). Still showing {}.", source_label(self.controller.source()))
            }
        };
    }

    fn draw(&self, frame: &mut ratatui::Frame<'_>) {
        let size = frame.area();
        let chunks = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Length(4), Constraint::Min(0), Constraint::Length(3)])
            .split(size);

        self.draw_header(frame, chunks[0]);
        self.draw_body(frame, chunks[1]);
        self.draw_footer(frame, chunks[2]);
    }

    fn draw_header(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chart = self.view.renderer();
        let table = self.view.table();

        let mut lines: Vec<Line> = Vec::new();
        lines.push(Line::from(vec![
            Span::styled("covid", Style::default().fg(Color::Cyan)),
            Span::raw(" - England cumulative metrics"),
        ]));

        let latest = chart
            .latest
            .as_ref()
            .map(|(date, v)| format!("{date}: {}", fmt_count(*v)))
            .unwrap_or_else(|| "-".to_string());

        lines.push(Line::from(Span::styled(
            format!(
                "source: {} | rows: {} | {}: {latest}",
                source_label(self.controller.source()),
                table.len(),
                chart.metric.display_name(),
            ),
            Style::default().fg(Color::Gray),
        )));

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(24)])
            .split(area);

        self.draw_chart(frame, chunks[0]);
        self.draw_selector(frame, chunks[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chart = self.view.renderer();
        let title = match self.view.table().len() {
            n if chart.window == 0 || chart.window >= n => chart.metric.display_name().to_string(),
            _ => format!("{} (last {} days)", chart.metric.display_name(), chart.window),
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        if chart.bars.is_empty() {
            let msg = Paragraph::new("No rows to display.").style(Style::default().fg(Color::Yellow));
            frame.render_widget(msg, inner);
            return;
        }

        let widget = MetricBarChart {
            bars: &chart.bars,
            dates: &chart.dates,
            x_bounds: chart.x_bounds,
            y_bounds: chart.y_bounds,
            y_label: chart.metric.key(),
            fmt_y: fmt_axis_y,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_selector(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = Metric::ALL
            .iter()
            .enumerate()
            .map(|(i, m)| ListItem::new(format!("{} {}", i + 1, m.display_name())))
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Metric").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let selected = Metric::ALL.iter().position(|m| *m == self.view.selection());
        let mut state = ListState::default();
        state.select(selected);
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let refresh_style = if self.refreshing {
            Style::default().fg(Color::DarkGray).add_modifier(Modifier::CROSSED_OUT)
        } else {
            Style::default().fg(Color::Gray)
        };
        let line = Line::from(vec![
            Span::styled("r refresh", refresh_style),
            Span::styled("  ←/→ metric  1-3 select  q quit", Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }
}

fn discard_pending_input() -> Result<(), AppError> {
    while event::poll(Duration::ZERO).map_err(|e| AppError::new(4, format!("Event poll error: {e}")))? {
        event::read().map_err(|e| AppError::new(4, format!("Event read error: {e}")))?;
    }
    Ok(())
}

fn source_label(source: DataSource) -> String {
    match source {
        DataSource::Bundled => "bundled snapshot".to_string(),
        DataSource::Live { fetched_at } => format!("live data @ {}", fetched_at.format("%H:%M:%S")),
    }
}

/// Build bar series for Plotters over the trailing window.
fn chart_series(
    table: &MetricTable,
    metric: Metric,
    window: usize,
) -> (Vec<(f64, f64)>, Vec<String>, [f64; 2], [f64; 2]) {
    let rows = table.tail(window);

    let bars: Vec<(f64, f64)> = rows
        .iter()
        .enumerate()
        .map(|(i, r)| (i as f64, r.value(metric)))
        .collect();
    let dates: Vec<String> = rows.iter().map(|r| r.date.clone()).collect();

    let x_bounds = [-0.5, (bars.len().max(1) as f64) - 0.5];

    let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(_, y) in &bars {
        y_min = y_min.min(y);
        y_max = y_max.max(y);
    }
    if !y_min.is_finite() || !y_max.is_finite() {
        y_min = 0.0;
        y_max = 1.0;
    }

    // Cumulative series grow slowly; anchoring at the window minimum keeps the
    // day-to-day growth visible.
    let pad = ((y_max - y_min).abs() * 0.05).max(1.0);
    let y_bounds = [(y_min - pad).max(0.0).min(y_min), y_max + pad];

    (bars, dates, x_bounds, y_bounds)
}

fn fmt_axis_y(v: f64) -> String {
    let abs = v.abs();
    if abs >= 1e6 {
        format!("{:.1}M", v / 1e6)
    } else if abs >= 1e3 {
        format!("{:.1}k", v / 1e3)
    } else {
        format!("{v:.0}")
    }
}
