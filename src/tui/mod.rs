//! Ratatui-based terminal dashboard.
//!
//! The dashboard reads the merged long table from disk, renders one line per
//! selected country, and offers two tabs: index level and YoY percent change.
//! On the level tab a dashed OLS trend line can be overlaid per country, with
//! the latest-point insight metrics shown in a side panel.

use std::io;
use std::time::Duration;

use chrono::{Datelike, NaiveDate};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use plotters::style::RGBColor;
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::{Line, Span, Text},
    widgets::{Block, Borders, Clear, List, ListItem, Paragraph},
    Terminal,
};

use crate::cli::DashArgs;
use crate::domain::{DateWindow, LongTable, Metric, PipelineConfig};
use crate::error::AppError;
use crate::fit::{fit_country_trends, fit_one_country};

mod plotters_chart;

use plotters_chart::{ChartLine, SeriesPlottersChart};

/// Countries highlighted when no `-c` flags are given.
const DEFAULT_COUNTRIES: [&str; 2] = ["New Zealand", "United Kingdom"];

/// Line colors, assigned by the country's position in the full country list so
/// a country keeps its color as others are toggled on and off.
const PALETTE: [(u8, u8, u8); 10] = [
    (0, 255, 255),
    (0, 220, 90),
    (255, 215, 0),
    (255, 105, 180),
    (255, 80, 80),
    (100, 149, 237),
    (255, 160, 60),
    (186, 120, 255),
    (120, 220, 220),
    (200, 200, 200),
];

/// Start the dashboard.
///
/// The merged table is loaded before the terminal is switched to raw mode so a
/// missing file produces a normal error message rather than a garbled screen.
pub fn run(config: PipelineConfig, args: DashArgs) -> Result<(), AppError> {
    let table = crate::app::pipeline::load_long_table(&config)?;
    let mut app = App::new(config, table, args)?;

    let _guard = TerminalGuard::new()?;

    let backend = CrosstermBackend::new(io::stdout());
    let mut terminal = Terminal::new(backend)
        .map_err(|e| AppError::new(4, format!("Failed to initialize terminal: {e}")))?;

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

struct App {
    config: PipelineConfig,
    table: LongTable,
    /// Every country present in the table, sorted; `selected` is parallel.
    countries: Vec<String>,
    selected: Vec<bool>,
    cursor: usize,
    metric: Metric,
    /// Full date range of the table; the window is clamped to it.
    bounds: (NaiveDate, NaiveDate),
    window: DateWindow,
    show_trend: bool,
    status: String,
}

impl App {
    fn new(config: PipelineConfig, table: LongTable, args: DashArgs) -> Result<Self, AppError> {
        let Some(bounds) = table.date_bounds() else {
            return Err(AppError::new(3, "Merged table is empty. Run `cpi merge` after `cpi batch`."));
        };

        let countries = table.countries();
        let selected = initial_selection(&countries, &args.countries);
        let status = format!("{} rows, {} countries", table.len(), countries.len());

        Ok(Self {
            config,
            table,
            countries,
            selected,
            cursor: 0,
            metric: args.metric,
            bounds,
            window: DateWindow { start: bounds.0, end: bounds.1 },
            show_trend: true,
            status,
        })
    }

    fn event_loop<B: ratatui::backend::Backend>(&mut self, terminal: &mut Terminal<B>) -> Result<(), AppError> {
        let mut needs_redraw = true;
        loop {
            if needs_redraw {
                terminal
                    .draw(|f| self.draw(f))
                    .map_err(|e| AppError::new(4, format!("Terminal draw error: {e}")))?;
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

    /// Returns `true` when the app should exit.
    fn handle_key(&mut self, code: KeyCode) -> bool {
        match code {
            KeyCode::Char('q') | KeyCode::Esc => return true,
            KeyCode::Tab | KeyCode::Char('m') => {
                self.metric = match self.metric {
                    Metric::Level => Metric::Yoy,
                    Metric::Yoy => Metric::Level,
                };
                self.status = format!("tab: {}", self.metric.display_name());
            }
            KeyCode::Up => {
                if self.cursor > 0 {
                    self.cursor -= 1;
                }
            }
            KeyCode::Down => {
                if self.cursor + 1 < self.countries.len() {
                    self.cursor += 1;
                }
            }
            KeyCode::Char(' ') | KeyCode::Enter => {
                if let Some(flag) = self.selected.get_mut(self.cursor) {
                    *flag = !*flag;
                    self.status = format!(
                        "{} {}",
                        self.countries[self.cursor],
                        if *flag { "shown" } else { "hidden" }
                    );
                }
            }
            KeyCode::Char('a') => {
                self.selected.iter_mut().for_each(|f| *f = true);
                self.status = "All countries shown.".to_string();
            }
            KeyCode::Left => self.shift_window_start(-1),
            KeyCode::Right => self.shift_window_start(1),
            KeyCode::Char(',') => self.shift_window_end(-1),
            KeyCode::Char('.') => self.shift_window_end(1),
            KeyCode::Char('t') => {
                self.show_trend = !self.show_trend;
                self.status = format!("trend overlay {}", if self.show_trend { "on" } else { "off" });
            }
            KeyCode::Char('r') => self.reload(),
            _ => {}
        }
        false
    }

    fn shift_window_start(&mut self, years: i32) {
        let next = shift_year(self.window.start, years).clamp(self.bounds.0, self.window.end);
        self.window.start = next;
        self.status = format!("window: {} .. {}", self.window.start, self.window.end);
    }

    fn shift_window_end(&mut self, years: i32) {
        let next = shift_year(self.window.end, years).clamp(self.window.start, self.bounds.1);
        self.window.end = next;
        self.status = format!("window: {} .. {}", self.window.start, self.window.end);
    }

    /// Re-read the merged table from disk, keeping the current selection for
    /// countries that still exist.
    fn reload(&mut self) {
        let table = match crate::app::pipeline::load_long_table(&self.config) {
            Ok(table) => table,
            Err(err) => {
                self.status = format!("Reload failed: {err}");
                return;
            }
        };
        let Some(bounds) = table.date_bounds() else {
            self.status = "Reload failed: merged table is empty.".to_string();
            return;
        };

        let previously_shown: Vec<String> = self
            .countries
            .iter()
            .zip(&self.selected)
            .filter(|&(_, &on)| on)
            .map(|(c, _)| c.clone())
            .collect();

        self.countries = table.countries();
        self.selected = self
            .countries
            .iter()
            .map(|c| previously_shown.contains(c))
            .collect();
        if !self.selected.iter().any(|&on| on) {
            self.selected = initial_selection(&self.countries, &[]);
        }
        self.cursor = self.cursor.min(self.countries.len().saturating_sub(1));
        self.bounds = bounds;
        self.window = DateWindow {
            start: self.window.start.clamp(bounds.0, bounds.1),
            end: self.window.end.clamp(bounds.0, bounds.1),
        };
        self.status = format!("Reloaded: {} rows, {} countries", table.len(), self.countries.len());
        self.table = table;
    }

    fn draw(&mut self, frame: &mut ratatui::Frame<'_>) {
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
        let shown = self.selected.iter().filter(|&&on| on).count();
        let lines = vec![
            Line::from(vec![
                Span::styled("cpi", Style::default().fg(Color::Cyan)),
                Span::raw(" — quarterly core CPI dashboard"),
            ]),
            Line::from(Span::styled(
                format!(
                    "tab: {} | window: {} .. {} | countries: {shown}/{} | trend: {}",
                    self.metric.display_name(),
                    self.window.start,
                    self.window.end,
                    self.countries.len(),
                    if self.show_trend { "on" } else { "off" },
                ),
                Style::default().fg(Color::Gray),
            )),
        ];

        let p = Paragraph::new(Text::from(lines)).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    fn draw_body(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let chunks = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Min(0), Constraint::Length(34)])
            .split(area);

        self.draw_chart(frame, chunks[0]);

        let side = Layout::default()
            .direction(Direction::Vertical)
            .constraints([Constraint::Min(0), Constraint::Length(10)])
            .split(chunks[1]);

        self.draw_country_list(frame, side[0]);
        self.draw_insight(frame, side[1]);
    }

    fn draw_chart(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let title = match self.metric {
            Metric::Level => "Core CPI (index level)",
            Metric::Yoy => "Core CPI (YoY %)",
        };
        let block = Block::default().title(title).borders(Borders::ALL);
        let inner = block.inner(area);
        frame.render_widget(block, area);
        frame.render_widget(Clear, inner);

        let (lines, x_bounds, y_bounds) = self.chart_series();
        if lines.is_empty() {
            // Explicit "no data" state instead of an empty set of axes.
            let msg = Paragraph::new("No data for the current selection.")
                .style(Style::default().fg(Color::Yellow))
                .block(Block::default());
            frame.render_widget(msg, inner);
            return;
        }

        let widget = SeriesPlottersChart {
            lines: &lines,
            x_bounds,
            y_bounds,
            x_label: "quarter",
            y_label: match self.metric {
                Metric::Level => "index",
                Metric::Yoy => "yoy %",
            },
            fmt_x: fmt_axis_date,
            fmt_y: fmt_axis_value,
        };
        frame.render_widget(widget, inner);
    }

    fn draw_country_list(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let items: Vec<ListItem> = self
            .countries
            .iter()
            .enumerate()
            .map(|(idx, country)| {
                let mark = if self.selected[idx] { "[x]" } else { "[ ]" };
                let style = if self.selected[idx] {
                    Style::default().fg(palette_tui(idx))
                } else {
                    Style::default().fg(Color::DarkGray)
                };
                ListItem::new(format!("{mark} {country}")).style(style)
            })
            .collect();

        let list = List::new(items)
            .block(Block::default().title("Countries").borders(Borders::ALL))
            .highlight_style(Style::default().fg(Color::Black).bg(Color::White))
            .highlight_symbol("» ");

        let mut state = ratatui::widgets::ListState::default();
        state.select(Some(self.cursor));
        frame.render_stateful_widget(list, area, &mut state);
    }

    fn draw_insight(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let block = Block::default().title("Trend (level)").borders(Borders::ALL);

        let mut lines: Vec<Line> = Vec::new();
        if self.metric != Metric::Level {
            lines.push(Line::from(Span::styled(
                "Trend fits apply to the level tab.",
                Style::default().fg(Color::Gray),
            )));
        } else {
            let shown: Vec<String> = self
                .countries
                .iter()
                .zip(&self.selected)
                .filter(|&(_, &on)| on)
                .map(|(c, _)| c.clone())
                .collect();
            let trends = fit_country_trends(&self.table, &shown, self.window);
            if trends.is_empty() {
                lines.push(Line::from(Span::styled(
                    "No fit (need 2+ points).",
                    Style::default().fg(Color::Gray),
                )));
            } else {
                lines.push(Line::from(Span::styled(
                    format!("{:<14} {:>6} {:>6}", "country", "ann%", "dev%"),
                    Style::default().fg(Color::Gray),
                )));
                for trend in &trends {
                    lines.push(Line::from(format!(
                        "{:<14} {:>6.2} {:>6.2}",
                        truncate_name(&trend.country, 14),
                        trend.insight.annualized_pct,
                        trend.insight.pct_deviation,
                    )));
                }
            }
        }

        let p = Paragraph::new(Text::from(lines)).block(block);
        frame.render_widget(p, area);
    }

    fn draw_footer(&self, frame: &mut ratatui::Frame<'_>, area: Rect) {
        let help = "Tab tab  ↑/↓ move  Space toggle  a all  ←/→ start ±1y  ,/. end ±1y  t trend  r reload  q quit";
        let line = Line::from(vec![
            Span::styled(help, Style::default().fg(Color::Gray)),
            Span::raw(" | "),
            Span::styled(&self.status, Style::default().fg(Color::Yellow)),
        ]);
        let p = Paragraph::new(line).block(Block::default().borders(Borders::ALL));
        frame.render_widget(p, area);
    }

    /// Build the chart lines for the current tab, selection, and window.
    fn chart_series(&self) -> (Vec<ChartLine>, [f64; 2], [f64; 2]) {
        let mut lines = Vec::new();
        let (mut x_min, mut x_max) = (f64::INFINITY, f64::NEG_INFINITY);
        let (mut y_min, mut y_max) = (f64::INFINITY, f64::NEG_INFINITY);

        let mut note = |pts: &[(f64, f64)]| {
            for &(x, y) in pts {
                x_min = x_min.min(x);
                x_max = x_max.max(x);
                y_min = y_min.min(y);
                y_max = y_max.max(y);
            }
        };

        for (idx, country) in self.countries.iter().enumerate() {
            if !self.selected[idx] {
                continue;
            }

            let pts = metric_points(&self.table, country, self.window, self.metric);
            if pts.len() < 2 {
                continue;
            }
            note(&pts);
            lines.push(ChartLine { points: pts, color: palette_rgb(idx), dashed: false });

            // The dashed overlay only makes sense on the level tab: the fit is
            // `cpi ~ time index`, not a fit of the YoY series.
            if self.show_trend && self.metric == Metric::Level {
                if let Some(trend) = fit_one_country(&self.table, country, self.window) {
                    let fitted: Vec<(f64, f64)> = trend
                        .points
                        .iter()
                        .map(|p| (day_number(p.date), p.fitted))
                        .collect();
                    note(&fitted);
                    lines.push(ChartLine { points: fitted, color: palette_rgb(idx), dashed: true });
                }
            }
        }

        if lines.is_empty() {
            return (lines, [0.0, 1.0], [0.0, 1.0]);
        }

        if x_max <= x_min {
            x_max = x_min + 1.0;
        }
        let pad = ((y_max - y_min).abs() * 0.05).max(1e-12);
        (lines, [x_min, x_max], [y_min - pad, y_max + pad])
    }
}

/// Date-ordered `(x, y)` points for one country under one metric.
///
/// Rows with no YoY value (the first four quarters of each country) are
/// skipped on the YoY tab rather than plotted as zero.
fn metric_points(table: &LongTable, country: &str, window: DateWindow, metric: Metric) -> Vec<(f64, f64)> {
    let mut pts: Vec<(NaiveDate, f64)> = table
        .rows
        .iter()
        .filter(|r| r.country == country && window.contains(r.date))
        .filter_map(|r| {
            let value = match metric {
                Metric::Level => Some(r.cpi),
                Metric::Yoy => r.cpi_yoy,
            };
            value.map(|v| (r.date, v))
        })
        .collect();
    pts.sort_by_key(|&(date, _)| date);
    pts.into_iter().map(|(date, v)| (day_number(date), v)).collect()
}

/// Mark the requested countries as shown, falling back to the defaults, then
/// to everything, so the dashboard never starts blank.
fn initial_selection(countries: &[String], requested: &[String]) -> Vec<bool> {
    let mut selected: Vec<bool> = countries
        .iter()
        .map(|c| requested.iter().any(|r| r.eq_ignore_ascii_case(c)))
        .collect();

    if !selected.iter().any(|&on| on) {
        for (idx, country) in countries.iter().enumerate() {
            if DEFAULT_COUNTRIES.contains(&country.as_str()) {
                selected[idx] = true;
            }
        }
    }
    if !selected.iter().any(|&on| on) {
        selected.iter_mut().for_each(|f| *f = true);
    }
    selected
}

/// Shift a date by whole years, clamping Feb 29 to Feb 28 when needed.
fn shift_year(date: NaiveDate, years: i32) -> NaiveDate {
    let target = date.year() + years;
    date.with_year(target)
        .or_else(|| NaiveDate::from_ymd_opt(target, date.month(), 28))
        .unwrap_or(date)
}

fn day_number(date: NaiveDate) -> f64 {
    date.num_days_from_ce() as f64
}

fn fmt_axis_date(v: f64) -> String {
    NaiveDate::from_num_days_from_ce_opt(v.round() as i32)
        .map(|d| d.format("%Y-%m").to_string())
        .unwrap_or_default()
}

fn fmt_axis_value(v: f64) -> String {
    format!("{v:.1}")
}

fn palette_rgb(idx: usize) -> RGBColor {
    let (r, g, b) = PALETTE[idx % PALETTE.len()];
    RGBColor(r, g, b)
}

fn palette_tui(idx: usize) -> Color {
    let (r, g, b) = PALETTE[idx % PALETTE.len()];
    Color::Rgb(r, g, b)
}

fn truncate_name(s: &str, max: usize) -> String {
    if s.chars().count() <= max {
        return s.to_string();
    }
    let mut out: String = s.chars().take(max.saturating_sub(1)).collect();
    out.push('.');
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::LongRow;

    fn names(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn initial_selection_prefers_requested_countries() {
        let countries = names(&["Canada", "Japan", "New Zealand"]);
        let selected = initial_selection(&countries, &names(&["japan"]));
        assert_eq!(selected, vec![false, true, false]);
    }

    #[test]
    fn initial_selection_falls_back_to_defaults_then_all() {
        let countries = names(&["Canada", "New Zealand", "United Kingdom"]);
        let selected = initial_selection(&countries, &[]);
        assert_eq!(selected, vec![false, true, true]);

        let countries = names(&["Canada", "Japan"]);
        let selected = initial_selection(&countries, &names(&["France"]));
        assert_eq!(selected, vec![true, true]);
    }

    #[test]
    fn shift_year_handles_leap_day() {
        let leap = NaiveDate::from_ymd_opt(2020, 2, 29).unwrap();
        assert_eq!(shift_year(leap, 1), NaiveDate::from_ymd_opt(2021, 2, 28).unwrap());
        let plain = NaiveDate::from_ymd_opt(2020, 4, 1).unwrap();
        assert_eq!(shift_year(plain, -5), NaiveDate::from_ymd_opt(2015, 4, 1).unwrap());
    }

    #[test]
    fn metric_points_skips_missing_yoy_values() {
        let dates: Vec<NaiveDate> = (0..6usize)
            .map(|i| {
                NaiveDate::from_ymd_opt(2020 + (i / 4) as i32, 1 + 3 * (i % 4) as u32, 1).unwrap()
            })
            .collect();
        let rows = dates
            .iter()
            .enumerate()
            .map(|(i, &date)| LongRow {
                date,
                country: "X".to_string(),
                cpi: 100.0 + i as f64,
                cpi_yoy: if i >= 4 { Some(1.0) } else { None },
            })
            .collect();
        let table = LongTable { rows };
        let window = DateWindow { start: dates[0], end: dates[5] };

        assert_eq!(metric_points(&table, "X", window, Metric::Level).len(), 6);
        assert_eq!(metric_points(&table, "X", window, Metric::Yoy).len(), 2);
        assert!(metric_points(&table, "Y", window, Metric::Level).is_empty());
    }

    #[test]
    fn axis_date_labels_round_trip() {
        let date = NaiveDate::from_ymd_opt(2021, 7, 1).unwrap();
        assert_eq!(fmt_axis_date(day_number(date)), "2021-07");
    }
}
