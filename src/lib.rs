use crossterm::event::{KeyCode, KeyEvent, KeyEventKind};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, error, info, warn};

use ratatui::layout::{Constraint, Layout};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, BorderType, Borders, Paragraph, Wrap};
use ratatui::{buffer::Buffer, layout::Rect, widgets::Widget};

pub mod aggregate;
pub mod chart_export;
pub mod config;
pub mod dataset;
pub mod error;
pub mod logging;
pub mod metrics;
pub mod view;
pub mod widgets;

pub use config::{AppConfig, ColorParser, ConfigManager, Theme};
pub use dataset::{OpenOptions, TourismTable};
pub use error::{DashboardError, DashboardResult};
pub use tourism_dash_cli::Args;
pub use view::{build_view, DashboardState, DashboardView};

use chart_export::{export_dashboard, ChartExportFormat, ExportPalette, BLUES_R};
use metrics::{Facility, Metric, TopNCount};
use view::PieView;
use widgets::banner::Banner;
use widgets::charts::{BubbleChart, DonutChart, TopTownsChart};
use widgets::controls::Controls;
use widgets::debug::DebugState;
use widgets::selectors::{Dropdown, MultiSelect, SelectorColors, Slider};

/// Application name used for the config, cache and log directories
pub const APP_NAME: &str = "tourism-dash";

pub const TITLE: &str = "Lebanon Tourism Dashboard";
pub const DESCRIPTION: &str = "This dashboard provides an overview of tourism in Lebanon by \
    examining the presence of key facilities such as hotels, restaurants, cafes, and guest houses \
    across various towns. It also explores patterns and relationships between these facilities to \
    better understand how tourism infrastructure is distributed and connected throughout the \
    country.";
pub const QUOTE: &str =
    "“From the mountains to the sea, Lebanon invites the world to discover its beauty.”";
pub const FOOTER: &str = "Course: MSBA 601 – Data Visualization and Communication · \
    Instructor: Dr. Fouad Zablith · Created by Noor Hamad | April 2025";

pub const SLIDER_LABEL: &str = "Select number of top towns to display";
pub const MULTISELECT_LABEL: &str = "Select facilities to include in the pie chart:";
pub const X_METRIC_LABEL: &str = "X-axis Metric";
pub const Y_METRIC_LABEL: &str = "Y-axis Metric";
pub const SIZE_METRIC_LABEL: &str = "Bubble Size Metric";

const BANNER_HEIGHT: u16 = 8;

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    /// Recompute the view from the current widget values
    Rerun,
    Export,
    Exit,
    Resize(u16, u16), // resized (width, height)
}

/// Control that receives ←/→ and Space.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Focus {
    #[default]
    TopN,
    Facilities,
    XMetric,
    YMetric,
    SizeMetric,
}

impl Focus {
    pub const ALL: [Self; 5] = [
        Self::TopN,
        Self::Facilities,
        Self::XMetric,
        Self::YMetric,
        Self::SizeMetric,
    ];

    fn index(self) -> usize {
        Self::ALL.iter().position(|f| *f == self).unwrap_or(0)
    }

    pub fn next(self) -> Self {
        Self::ALL[(self.index() + 1) % Self::ALL.len()]
    }

    pub fn prev(self) -> Self {
        Self::ALL[(self.index() + Self::ALL.len() - 1) % Self::ALL.len()]
    }
}

/// Chart export settings for the `e` key
#[derive(Debug, Clone)]
pub struct ExportSettings {
    pub dir: PathBuf,
    pub format: ChartExportFormat,
    pub palette: ExportPalette,
}

impl Default for ExportSettings {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("."),
            format: ChartExportFormat::Png,
            palette: ExportPalette::default(),
        }
    }
}

/// Pie colours converted for the current terminal.
pub fn pie_palette(parser: &ColorParser) -> Vec<Color> {
    BLUES_R
        .iter()
        .map(|&(r, g, b)| {
            parser
                .parse(&format!("#{:02x}{:02x}{:02x}", r, g, b))
                .unwrap_or(Color::Rgb(r, g, b))
        })
        .collect()
}

pub struct App {
    table: Arc<TourismTable>,
    state: DashboardState,
    view: Option<DashboardView>,
    error: Option<String>,
    focus: Focus,
    facility_cursor: usize,
    inspected: Option<usize>,
    theme: Theme,
    palette: Vec<Color>,
    banner: Option<Banner>,
    export: ExportSettings,
    status: Option<String>,
    debug: DebugState,
}

impl App {
    /// The view is empty until the first `AppEvent::Rerun`.
    pub fn new(table: Arc<TourismTable>, state: DashboardState, theme: Theme) -> Self {
        Self {
            table,
            state,
            view: None,
            error: None,
            focus: Focus::default(),
            facility_cursor: 0,
            inspected: None,
            theme,
            palette: pie_palette(&ColorParser::new()),
            banner: None,
            export: ExportSettings::default(),
            status: None,
            debug: DebugState::default(),
        }
    }

    pub fn with_banner(mut self, banner: Option<Banner>) -> Self {
        self.banner = banner;
        self
    }

    pub fn with_export(mut self, export: ExportSettings) -> Self {
        self.export = export;
        self
    }

    pub fn enable_debug(&mut self) {
        self.debug.enabled = true;
    }

    pub fn state(&self) -> &DashboardState {
        &self.state
    }

    pub fn view(&self) -> Option<&DashboardView> {
        self.view.as_ref()
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn focus(&self) -> Focus {
        self.focus
    }

    pub fn inspected(&self) -> Option<usize> {
        self.inspected
    }

    pub fn status(&self) -> Option<&str> {
        self.status.as_deref()
    }

    pub fn event(&mut self, event: &AppEvent) -> Option<AppEvent> {
        self.debug.num_events += 1;

        match event {
            AppEvent::Key(key) => {
                if self.debug.enabled {
                    self.debug.on_key(key);
                }
                self.key(key)
            }
            AppEvent::Rerun => {
                self.rerun();
                None
            }
            AppEvent::Export => {
                self.export_charts();
                None
            }
            AppEvent::Resize(_, _) | AppEvent::Exit => None,
        }
    }

    fn key(&mut self, event: &KeyEvent) -> Option<AppEvent> {
        if event.kind != KeyEventKind::Press {
            return None;
        }

        match event.code {
            KeyCode::Char('q') | KeyCode::Esc => Some(AppEvent::Exit),
            KeyCode::Tab => {
                self.focus = self.focus.next();
                None
            }
            KeyCode::BackTab => {
                self.focus = self.focus.prev();
                None
            }
            KeyCode::Left => self.adjust(false),
            KeyCode::Right => self.adjust(true),
            KeyCode::Char(' ') | KeyCode::Enter if self.focus == Focus::Facilities => {
                let facility = Facility::ALL[self.facility_cursor % Facility::ALL.len()];
                self.state.facilities.toggle(facility);
                self.debug.last_action = format!("toggle {}", facility.label());
                Some(AppEvent::Rerun)
            }
            KeyCode::Char(']') => {
                self.step_inspector(true);
                None
            }
            KeyCode::Char('[') => {
                self.step_inspector(false);
                None
            }
            KeyCode::Char('e') => Some(AppEvent::Export),
            _ => None,
        }
    }

    /// ←/→ on the focused control. Returns `Rerun` when a widget value changed.
    fn adjust(&mut self, forward: bool) -> Option<AppEvent> {
        let step_metric = |m: Metric| if forward { m.next() } else { m.prev() };

        match self.focus {
            Focus::TopN => {
                let before = self.state.top_n;
                self.state.top_n = if forward {
                    before.increment()
                } else {
                    before.decrement()
                };
                if self.state.top_n == before {
                    return None;
                }
                self.debug.last_action = format!("top_n={}", self.state.top_n.get());
            }
            Focus::Facilities => {
                let len = Facility::ALL.len();
                self.facility_cursor = if forward {
                    (self.facility_cursor + 1) % len
                } else {
                    (self.facility_cursor + len - 1) % len
                };
                return None;
            }
            Focus::XMetric => self.state.metrics.x = step_metric(self.state.metrics.x),
            Focus::YMetric => self.state.metrics.y = step_metric(self.state.metrics.y),
            Focus::SizeMetric => self.state.metrics.size = step_metric(self.state.metrics.size),
        }
        Some(AppEvent::Rerun)
    }

    fn step_inspector(&mut self, forward: bool) {
        let len = self
            .view
            .as_ref()
            .map(|v| v.scatter.points.len())
            .unwrap_or(0);
        if len == 0 {
            self.inspected = None;
            return;
        }
        self.inspected = Some(match (self.inspected, forward) {
            (None, true) => 0,
            (None, false) => len - 1,
            (Some(i), true) => (i + 1) % len,
            (Some(i), false) => (i + len - 1) % len,
        });
    }

    /// Rebuild every chart from the full table.
    pub fn rerun(&mut self) {
        let started = Instant::now();
        match build_view(&self.table, &self.state) {
            Ok(view) => {
                let points = view.scatter.points.len();
                self.inspected = self.inspected.filter(|i| *i < points);
                self.view = Some(view);
                self.error = None;
            }
            Err(e) => {
                error!(error = %e, "failed to build dashboard view");
                self.view = None;
                self.error = Some(e.to_string());
            }
        }
        let elapsed = started.elapsed();
        self.debug.on_rerun(elapsed);
        debug!(elapsed_us = elapsed.as_micros() as u64, "rerun complete");
    }

    fn export_charts(&mut self) {
        let Some(view) = &self.view else {
            self.status = Some("Nothing to export".to_string());
            return;
        };
        self.status = Some(
            match export_dashboard(
                view,
                &self.export.dir,
                self.export.format,
                &self.export.palette,
            ) {
                Ok(paths) => {
                    info!(count = paths.len(), "charts exported from dashboard");
                    format!(
                        "Exported {} {} chart(s) to {}",
                        paths.len(),
                        self.export.format.as_str(),
                        self.export.dir.display()
                    )
                }
                Err(e) => {
                    error!(error = %e, "chart export failed");
                    format!("Export failed: {}", e)
                }
            },
        );
    }

    fn selector_colors(&self) -> SelectorColors {
        SelectorColors {
            border: self.theme.get("primary"),
            active: self.theme.get("focus"),
            text: self.theme.get("text_primary"),
            dimmed: self.theme.get("dimmed"),
        }
    }

    fn render_header(&self, area: Rect, buf: &mut Buffer) {
        let [title, description, quote] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .areas(area);

        Paragraph::new(TITLE)
            .style(
                Style::default()
                    .fg(self.theme.get("text_primary"))
                    .add_modifier(Modifier::BOLD),
            )
            .centered()
            .render(title, buf);
        Paragraph::new(DESCRIPTION)
            .wrap(Wrap { trim: true })
            .render(description, buf);
        Paragraph::new(QUOTE)
            .style(
                Style::default()
                    .fg(self.theme.get("secondary"))
                    .add_modifier(Modifier::ITALIC),
            )
            .centered()
            .render(quote, buf);
    }

    /// Section title and description; returns the area left for controls and chart.
    fn render_section_intro(&self, title: &str, text: &str, area: Rect, buf: &mut Buffer) -> Rect {
        let [heading, description, rest] = Layout::vertical([
            Constraint::Length(1),
            Constraint::Length(2),
            Constraint::Fill(1),
        ])
        .areas(area);

        Paragraph::new(title)
            .style(
                Style::default()
                    .fg(self.theme.get("primary"))
                    .add_modifier(Modifier::BOLD),
            )
            .render(heading, buf);
        Paragraph::new(text)
            .style(Style::default().fg(self.theme.get("text_secondary")))
            .wrap(Wrap { trim: true })
            .render(description, buf);
        rest
    }

    fn render_bar_section(&self, view: &DashboardView, area: Rect, buf: &mut Buffer) {
        let rest = self.render_section_intro(view.bar.title, view::BAR_DESCRIPTION, area, buf);
        let [slider, chart] =
            Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(rest);

        Slider {
            label: SLIDER_LABEL,
            value: self.state.top_n.get() as u8,
            min: TopNCount::MIN,
            max: TopNCount::MAX,
            focused: self.focus == Focus::TopN,
            colors: self.selector_colors(),
        }
        .render(slider, buf);

        TopTownsChart {
            spec: &view.bar,
            bar_color: self.theme.get("bar"),
            text_color: self.theme.get("text_primary"),
            border_color: self.theme.get("primary"),
        }
        .render(chart, buf);
    }

    fn render_pie_section(&self, view: &DashboardView, area: Rect, buf: &mut Buffer) {
        let rest = self.render_section_intro(view::PIE_TITLE, view::PIE_DESCRIPTION, area, buf);
        let [select, chart] =
            Layout::vertical([Constraint::Length(4), Constraint::Fill(1)]).areas(rest);

        MultiSelect {
            label: MULTISELECT_LABEL,
            options: &Facility::ALL,
            selection: &self.state.facilities,
            cursor: self.facility_cursor,
            focused: self.focus == Focus::Facilities,
            colors: self.selector_colors(),
        }
        .render(select, buf);

        match &view.pie {
            PieView::Chart(spec) => DonutChart {
                spec,
                palette: &self.palette,
                text_color: self.theme.get("text_primary"),
                border_color: self.theme.get("primary"),
            }
            .render(chart, buf),
            PieView::NoSelection { message } => {
                let info = Block::default()
                    .borders(Borders::ALL)
                    .border_type(BorderType::Rounded)
                    .title("Info")
                    .border_style(Style::default().fg(self.theme.get("primary")));
                Paragraph::new(*message)
                    .block(info)
                    .style(Style::default().fg(self.theme.get("primary")))
                    .wrap(Wrap { trim: true })
                    .render(chart, buf);
            }
        }
    }

    fn render_scatter_section(&self, view: &DashboardView, area: Rect, buf: &mut Buffer) {
        let rest = self.render_section_intro(
            view.scatter.title,
            view::SCATTER_DESCRIPTION,
            area,
            buf,
        );
        let [dropdowns, chart] =
            Layout::vertical([Constraint::Length(3), Constraint::Fill(1)]).areas(rest);
        let [x, y, size] = Layout::horizontal([Constraint::Ratio(1, 3); 3]).areas(dropdowns);

        let metrics = self.state.metrics;
        for (label, value, focus, area) in [
            (X_METRIC_LABEL, metrics.x, Focus::XMetric, x),
            (Y_METRIC_LABEL, metrics.y, Focus::YMetric, y),
            (SIZE_METRIC_LABEL, metrics.size, Focus::SizeMetric, size),
        ] {
            Dropdown {
                label,
                value,
                focused: self.focus == focus,
                colors: self.selector_colors(),
            }
            .render(area, buf);
        }

        BubbleChart {
            spec: &view.scatter,
            selected: self.inspected,
            color: self.theme.get("bubble"),
            highlight: self.theme.get("focus"),
            text_color: self.theme.get("text_primary"),
            border_color: self.theme.get("primary"),
        }
        .render(chart, buf);
    }

    fn render_error(&self, message: &str, area: Rect, buf: &mut Buffer) {
        let block = Block::default()
            .borders(Borders::ALL)
            .border_type(BorderType::Rounded)
            .title("Error")
            .border_style(Style::default().fg(self.theme.get("error")));
        Paragraph::new(vec![
            Line::from(Span::styled(
                message.to_string(),
                Style::default().fg(self.theme.get("error")),
            )),
            Line::from(""),
            Line::from("Fix the data file and restart, or press q to quit."),
        ])
        .block(block)
        .wrap(Wrap { trim: true })
        .render(area, buf);
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        self.debug.num_frames += 1;

        let banner_height = if self.banner.is_some() {
            BANNER_HEIGHT
        } else {
            0
        };
        let debug_height = if self.debug.enabled { 1 } else { 0 };
        let [banner, header, body, footer, controls, debug_bar] = Layout::vertical([
            Constraint::Length(banner_height),
            Constraint::Length(5),
            Constraint::Fill(1),
            Constraint::Length(1),
            Constraint::Length(1),
            Constraint::Length(debug_height),
        ])
        .areas(area);

        if let Some(image) = self.banner.as_mut() {
            image.render(banner, buf);
        }
        self.render_header(header, buf);

        match (&self.view, &self.error) {
            (_, Some(message)) => self.render_error(message, body, buf),
            (Some(view), None) => {
                let [top, bottom] =
                    Layout::vertical([Constraint::Percentage(55), Constraint::Fill(1)])
                        .areas(body);
                let [bar, pie] =
                    Layout::horizontal([Constraint::Percentage(50), Constraint::Fill(1)])
                        .areas(top);
                self.render_bar_section(view, bar, buf);
                self.render_pie_section(view, pie, buf);
                self.render_scatter_section(view, bottom, buf);
            }
            (None, None) => Paragraph::new("Loading…").centered().render(body, buf),
        }

        Paragraph::new(FOOTER)
            .style(Style::default().fg(self.theme.get("dimmed")))
            .centered()
            .render(footer, buf);

        Controls::new()
            .with_status(self.status.as_deref())
            .with_colors(self.theme.get("controls_bg"), self.theme.get("success"))
            .render(controls, buf);

        if self.debug.enabled {
            self.debug.render(debug_bar, buf);
        }
    }
}

/// Load the banner, logging and skipping it when the file is missing or unreadable.
pub fn load_banner(path: &Path) -> Option<Banner> {
    match Banner::load(path) {
        Ok(banner) => Some(banner),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "banner image unavailable");
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn focus_cycles_both_ways() {
        assert_eq!(Focus::TopN.next(), Focus::Facilities);
        assert_eq!(Focus::SizeMetric.next(), Focus::TopN);
        assert_eq!(Focus::TopN.prev(), Focus::SizeMetric);
    }

    #[test]
    fn palette_has_one_colour_per_shade() {
        let parser = ColorParser::with_capabilities(true, true);
        let palette = pie_palette(&parser);
        assert_eq!(palette.len(), BLUES_R.len());
        assert_eq!(palette[0], Color::Rgb(8, 48, 107));
    }

    #[test]
    fn missing_banner_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_banner(&dir.path().join("pic.jpeg")).is_none());
    }
}
