//! Terminal renderings of the three dashboard charts.

use std::f64::consts::{FRAC_PI_2, TAU};

use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    symbols,
    text::{Line, Span},
    widgets::{
        canvas::{Canvas, Points},
        Axis, Bar, BarChart, BarGroup, Block, BorderType, Borders, Chart, Dataset, GraphType,
        Paragraph, Widget,
    },
};

use crate::view::{BarChartSpec, PieChartSpec, PieSlice, ScatterChartSpec};

const LEGEND_WIDTH: u16 = 36;

fn chart_block(title: &str, border: Color) -> Block<'static> {
    Block::default()
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .title(title.to_string())
        .border_style(Style::default().fg(border))
}

/// Compact number for labels: integers without decimals, NaN as "n/a".
pub fn format_value(v: f64) -> String {
    if v.is_nan() {
        "n/a".to_string()
    } else if (v - v.round()).abs() < 1e-9 {
        format!("{:.0}", v)
    } else {
        format!("{:.2}", v)
    }
}

/// Horizontal bars, largest at the top.
pub struct TopTownsChart<'a> {
    pub spec: &'a BarChartSpec,
    pub bar_color: Color,
    pub text_color: Color,
    pub border_color: Color,
}

impl Widget for TopTownsChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = chart_block(self.spec.title, self.border_color);
        let inner = block.inner(area);
        block.render(area, buf);

        let [chart_area, axis_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

        // `bars` is ascending; a horizontal BarChart draws its first bar at the top.
        let bars: Vec<Bar> = self
            .spec
            .bars
            .iter()
            .rev()
            .map(|bar| {
                Bar::default()
                    .value(bar.hotels.max(0) as u64)
                    .label(Line::from(bar.town.clone()))
                    .text_value(bar.hotels.to_string())
            })
            .collect();

        BarChart::default()
            .direction(Direction::Horizontal)
            .bar_width(1)
            .bar_gap(0)
            .bar_style(Style::default().fg(self.bar_color))
            .value_style(Style::default().fg(self.text_color).bg(self.bar_color))
            .label_style(Style::default().fg(self.text_color))
            .data(BarGroup::default().bars(&bars))
            .render(chart_area, buf);

        Paragraph::new(self.spec.x_label)
            .style(Style::default().fg(self.text_color))
            .centered()
            .render(axis_area, buf);
    }
}

/// Index of the wedge covering `angle` (radians, counter-clockwise from +x).
pub fn slice_at(slices: &[PieSlice], angle: f64) -> Option<usize> {
    let offset = (FRAC_PI_2 - angle).rem_euclid(TAU);
    let mut last_visible = None;
    for (idx, slice) in slices.iter().enumerate() {
        if slice.share <= 0.0 {
            continue;
        }
        let lo = FRAC_PI_2 - slice.start;
        let hi = FRAC_PI_2 - slice.end;
        if offset >= lo && offset < hi {
            return Some(idx);
        }
        last_visible = Some(idx);
    }
    // float drift at the closing edge of the last wedge
    last_visible
}

/// Donut drawn with half-block pixels plus a legend of counts and percentages.
pub struct DonutChart<'a> {
    pub spec: &'a PieChartSpec,
    pub palette: &'a [Color],
    pub text_color: Color,
    pub border_color: Color,
}

impl DonutChart<'_> {
    fn color(&self, idx: usize) -> Color {
        if self.palette.is_empty() {
            Color::Blue
        } else {
            self.palette[idx % self.palette.len()]
        }
    }

    /// Pixel centres per wedge for a `width` x `height` half-block pixel grid over [-1, 1]^2.
    fn wedge_pixels(
        &self,
        slices: &[PieSlice],
        width: u16,
        height: u16,
    ) -> Vec<Vec<(f64, f64)>> {
        let mut pixels = vec![Vec::new(); slices.len()];
        if width == 0 || height == 0 {
            return pixels;
        }
        for py in 0..height {
            let y = -1.0 + (f64::from(py) + 0.5) * 2.0 / f64::from(height);
            for px in 0..width {
                let x = -1.0 + (f64::from(px) + 0.5) * 2.0 / f64::from(width);
                let r = x.hypot(y);
                if r > 1.0 || r < self.spec.hole {
                    continue;
                }
                if let Some(idx) = slice_at(slices, y.atan2(x)) {
                    pixels[idx].push((x, y));
                }
            }
        }
        pixels
    }

    fn legend(&self, slices: &[PieSlice]) -> Vec<Line<'static>> {
        let mut lines: Vec<Line> = slices
            .iter()
            .enumerate()
            .map(|(idx, slice)| {
                Line::from(vec![
                    Span::styled("██ ", Style::default().fg(self.color(idx))),
                    Span::styled(
                        format!(
                            "{:<13}{:>6} {:>6.1}%",
                            slice.facility.label(),
                            slice.count,
                            slice.share * 100.0
                        ),
                        Style::default().fg(self.text_color),
                    ),
                ])
            })
            .collect();
        lines.push(Line::from(""));
        lines.push(Line::from(Span::styled(
            format!("{:<16}{:>6}", "Total", self.spec.distribution.total()),
            Style::default()
                .fg(self.text_color)
                .add_modifier(Modifier::BOLD),
        )));
        lines
    }
}

impl Widget for DonutChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = chart_block(self.spec.title, self.border_color);
        let inner = block.inner(area);
        block.render(area, buf);

        let [plot_area, legend_area] =
            Layout::horizontal([Constraint::Fill(1), Constraint::Length(LEGEND_WIDTH)])
                .areas(inner);

        // Half-block pixels are square when a cell is twice as tall as it is wide.
        let width = plot_area.width.min(plot_area.height.saturating_mul(2));
        let height = width / 2;
        let donut_area = Rect {
            x: plot_area.x + (plot_area.width - width) / 2,
            y: plot_area.y + (plot_area.height - height) / 2,
            width,
            height,
        };

        let slices = self.spec.slices();
        let pixels = self.wedge_pixels(&slices, width, height * 2);
        let colors: Vec<Color> = (0..slices.len()).map(|idx| self.color(idx)).collect();

        Canvas::default()
            .marker(symbols::Marker::HalfBlock)
            .x_bounds([-1.0, 1.0])
            .y_bounds([-1.0, 1.0])
            .paint(|ctx| {
                for (coords, color) in pixels.iter().zip(&colors) {
                    ctx.draw(&Points {
                        coords: coords.as_slice(),
                        color: *color,
                    });
                }
            })
            .render(donut_area, buf);

        let legend = self.legend(&slices);
        let legend_height = (legend.len() as u16).min(legend_area.height);
        let legend_rect = Rect {
            y: legend_area.y + (legend_area.height - legend_height) / 2,
            height: legend_height,
            ..legend_area
        };
        Paragraph::new(legend).render(legend_rect, buf);
    }
}

/// Marker size class for a bubble, from its radius relative to the largest bubble.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BubbleTier {
    Small,
    Medium,
    Large,
}

impl BubbleTier {
    pub const ALL: [Self; 3] = [Self::Small, Self::Medium, Self::Large];

    /// `None` for bubbles with no area (zero, negative or missing size).
    pub fn from_relative(relative: f64) -> Option<Self> {
        if !(relative > 0.0) {
            None
        } else if relative <= 1.0 / 3.0 {
            Some(Self::Small)
        } else if relative <= 2.0 / 3.0 {
            Some(Self::Medium)
        } else {
            Some(Self::Large)
        }
    }

    pub fn marker(self) -> symbols::Marker {
        match self {
            Self::Small => symbols::Marker::Braille,
            Self::Medium => symbols::Marker::Dot,
            Self::Large => symbols::Marker::Block,
        }
    }
}

/// Status line describing the inspected point.
pub fn inspector_line(spec: &ScatterChartSpec, selected: Option<usize>) -> String {
    match selected.and_then(|idx| spec.points.get(idx).map(|p| (idx, p))) {
        Some((idx, point)) => format!(
            "▸ {}  {}={}  {}={}  {}={}  ({}/{})",
            point.label.as_deref().unwrap_or("(unnamed)"),
            spec.x_label,
            format_value(point.x),
            spec.y_label,
            format_value(point.y),
            spec.size_label,
            format_value(point.size),
            idx + 1,
            spec.points.len()
        ),
        None => "Press [ or ] to inspect individual towns".to_string(),
    }
}

/// Bubble plot with size tiers and an optional highlighted point.
pub struct BubbleChart<'a> {
    pub spec: &'a ScatterChartSpec,
    pub selected: Option<usize>,
    pub color: Color,
    pub highlight: Color,
    pub text_color: Color,
    pub border_color: Color,
}

impl BubbleChart<'_> {
    fn tier_points(&self) -> Vec<Vec<(f64, f64)>> {
        let mut tiers = vec![Vec::new(); BubbleTier::ALL.len()];
        for point in &self.spec.points {
            if !(point.x.is_finite() && point.y.is_finite()) {
                continue;
            }
            if let Some(tier) = BubbleTier::from_relative(self.spec.relative_radius(point)) {
                tiers[tier as usize].push((point.x, point.y));
            }
        }
        tiers
    }
}

fn padded_bounds(lo: f64, hi: f64) -> [f64; 2] {
    let span = if hi > lo { hi - lo } else { 1.0 };
    [lo - span * 0.05, hi + span * 0.05]
}

fn axis_labels(bounds: [f64; 2]) -> Vec<String> {
    let mid = (bounds[0] + bounds[1]) / 2.0;
    [bounds[0], mid, bounds[1]]
        .iter()
        .map(|v| format!("{:.1}", v))
        .collect()
}

impl Widget for BubbleChart<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        let block = chart_block(self.spec.title, self.border_color).title_bottom(Line::from(
            format!(" bubble size: {} ", self.spec.size_label),
        ));
        let inner = block.inner(area);
        block.render(area, buf);

        let [chart_area, inspector_area] =
            Layout::vertical([Constraint::Fill(1), Constraint::Length(1)]).areas(inner);

        let ((x_min, x_max), (y_min, y_max)) =
            self.spec.bounds().unwrap_or(((0.0, 1.0), (0.0, 1.0)));
        let x_bounds = padded_bounds(x_min, x_max);
        let y_bounds = padded_bounds(y_min, y_max);

        let tiers = self.tier_points();
        let selected: Vec<(f64, f64)> = self
            .selected
            .and_then(|idx| self.spec.points.get(idx))
            .filter(|p| p.x.is_finite() && p.y.is_finite())
            .map(|p| vec![(p.x, p.y)])
            .unwrap_or_default();

        let mut datasets: Vec<Dataset> = BubbleTier::ALL
            .iter()
            .zip(&tiers)
            .map(|(tier, points)| {
                Dataset::default()
                    .marker(tier.marker())
                    .graph_type(GraphType::Scatter)
                    .style(Style::default().fg(self.color))
                    .data(points)
            })
            .collect();
        datasets.push(
            Dataset::default()
                .marker(symbols::Marker::Block)
                .graph_type(GraphType::Scatter)
                .style(Style::default().fg(self.highlight))
                .data(&selected),
        );

        let axis_style = Style::default().fg(self.text_color);
        Chart::new(datasets)
            .x_axis(
                Axis::default()
                    .title(self.spec.x_label)
                    .bounds(x_bounds)
                    .labels(axis_labels(x_bounds))
                    .style(axis_style),
            )
            .y_axis(
                Axis::default()
                    .title(self.spec.y_label)
                    .bounds(y_bounds)
                    .labels(axis_labels(y_bounds))
                    .style(axis_style),
            )
            .render(chart_area, buf);

        let inspector_style = if self.selected.is_some() {
            Style::default().fg(self.highlight)
        } else {
            Style::default().fg(self.text_color)
        };
        Paragraph::new(inspector_line(self.spec, self.selected))
            .style(inspector_style)
            .render(inspector_area, buf);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate::{FacilityDistribution, ScatterPoint};
    use crate::metrics::Facility;
    use crate::view::PIE_HOLE;

    fn pie(counts: Vec<(Facility, u64)>) -> PieChartSpec {
        PieChartSpec {
            title: "Distribution of Facilities Across Towns",
            distribution: FacilityDistribution { counts },
            hole: PIE_HOLE,
        }
    }

    #[test]
    fn slice_lookup_runs_clockwise_from_top() {
        let spec = pie(vec![(Facility::Hotels, 1), (Facility::Cafes, 3)]);
        let slices = spec.slices();
        // first wedge covers twelve to three o'clock
        assert_eq!(slice_at(&slices, FRAC_PI_2 - 0.1), Some(0));
        assert_eq!(slice_at(&slices, 0.1), Some(0));
        assert_eq!(slice_at(&slices, -0.1), Some(1));
        assert_eq!(slice_at(&slices, std::f64::consts::PI), Some(1));
    }

    #[test]
    fn zero_share_slices_are_never_hit() {
        let spec = pie(vec![(Facility::Hotels, 0), (Facility::Cafes, 2)]);
        let slices = spec.slices();
        for angle in [-3.0, -1.0, 0.0, 1.0, 3.0] {
            assert_eq!(slice_at(&slices, angle), Some(1));
        }
        let empty = pie(vec![(Facility::Hotels, 0)]);
        assert_eq!(slice_at(&empty.slices(), 0.0), None);
    }

    #[test]
    fn bubble_tiers() {
        assert_eq!(BubbleTier::from_relative(0.0), None);
        assert_eq!(BubbleTier::from_relative(f64::NAN), None);
        assert_eq!(BubbleTier::from_relative(0.2), Some(BubbleTier::Small));
        assert_eq!(BubbleTier::from_relative(0.5), Some(BubbleTier::Medium));
        assert_eq!(BubbleTier::from_relative(1.0), Some(BubbleTier::Large));
    }

    #[test]
    fn inspector_reports_raw_values() {
        let spec = ScatterChartSpec {
            title: "Tourism Facility Correlation",
            x_label: "Total number of hotels",
            y_label: "Total number of cafes",
            size_label: "Total number of restaurants",
            points: vec![ScatterPoint {
                x: 3.0,
                y: 2.5,
                size: f64::NAN,
                label: Some("Jbeil".to_string()),
            }],
        };
        let line = inspector_line(&spec, Some(0));
        assert!(line.contains("Jbeil"));
        assert!(line.contains("Total number of hotels=3"));
        assert!(line.contains("Total number of cafes=2.50"));
        assert!(line.contains("Total number of restaurants=n/a"));
        assert!(line.ends_with("(1/1)"));
        assert!(inspector_line(&spec, None).contains("[ or ]"));
    }

    #[test]
    fn donut_renders_legend() {
        let spec = pie(vec![(Facility::Restaurants, 30), (Facility::Hotels, 10)]);
        let palette = [Color::Blue, Color::Cyan];
        let area = Rect::new(0, 0, 80, 14);
        let mut buf = Buffer::empty(area);
        DonutChart {
            spec: &spec,
            palette: &palette,
            text_color: Color::White,
            border_color: Color::Cyan,
        }
        .render(area, &mut buf);
        let text: String = (0..area.height)
            .flat_map(|y| (0..area.width).map(move |x| (x, y)))
            .map(|(x, y)| buf[(x, y)].symbol().to_string())
            .collect();
        assert!(text.contains("Restaurants"));
        assert!(text.contains("75.0%"));
        assert!(text.contains("25.0%"));
    }
}
