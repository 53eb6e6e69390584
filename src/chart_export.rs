//! Chart export to PNG (plotters bitmap backend) and SVG (plotters SVG backend).

use plotters::coord::Shift;
use plotters::prelude::*;
use std::path::{Path, PathBuf};
use tourism_dash_cli::ExportFormatArg;
use tracing::{debug, info, warn};

use crate::config::{parse_hex, ColorConfig};
use crate::error::{DashboardError, DashboardResult};
use crate::view::{BarChartSpec, DashboardView, PieChartSpec, PieView, ScatterChartSpec};

/// Bar fill, `#1f77b4`.
pub const BAR_RGB: (u8, u8, u8) = (0x1f, 0x77, 0xb4);
/// Bubble fill, same blue as the bars.
pub const BUBBLE_RGB: (u8, u8, u8) = (0x1f, 0x77, 0xb4);
/// DarkSlateGrey bubble outline.
pub const OUTLINE_RGB: (u8, u8, u8) = (0x2f, 0x4f, 0x4f);
pub const BUBBLE_OPACITY: f64 = 0.7;
/// Reversed sequential Blues; first slice gets the darkest shade.
pub const BLUES_R: [(u8, u8, u8); 9] = [
    (8, 48, 107),
    (8, 81, 156),
    (33, 113, 181),
    (66, 146, 198),
    (107, 174, 214),
    (158, 202, 225),
    (198, 219, 239),
    (222, 235, 247),
    (247, 251, 255),
];

const SIZE: (u32, u32) = (900, 600);
const MAX_BUBBLE_RADIUS: f64 = 20.0;
const ARC_STEPS_PER_TURN: f64 = 180.0;

/// Export format for chart files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ChartExportFormat {
    #[default]
    Png,
    Svg,
}

impl ChartExportFormat {
    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Svg => "svg",
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Png => "PNG",
            Self::Svg => "SVG",
        }
    }
}

impl From<ExportFormatArg> for ChartExportFormat {
    fn from(arg: ExportFormatArg) -> Self {
        match arg {
            ExportFormatArg::Png => Self::Png,
            ExportFormatArg::Svg => Self::Svg,
        }
    }
}

/// Fill and outline colours of the exported bar and bubble charts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportPalette {
    pub bar: (u8, u8, u8),
    pub bubble: (u8, u8, u8),
    pub outline: (u8, u8, u8),
}

impl Default for ExportPalette {
    fn default() -> Self {
        Self {
            bar: BAR_RGB,
            bubble: BUBBLE_RGB,
            outline: OUTLINE_RGB,
        }
    }
}

impl ExportPalette {
    /// Take `bar`, `bubble` and `bubble_outline` from the theme colours. A value that is not
    /// `#rrggbb` (a terminal colour name or index) keeps the default for that key.
    pub fn from_colors(colors: &ColorConfig) -> Self {
        let pick = |key: &str, value: &str, fallback: (u8, u8, u8)| {
            parse_hex(value.trim()).unwrap_or_else(|_| {
                debug!(key, value, "not a hex colour, export keeps the default");
                fallback
            })
        };
        let default = Self::default();
        Self {
            bar: pick("bar", &colors.bar, default.bar),
            bubble: pick("bubble", &colors.bubble, default.bubble),
            outline: pick("bubble_outline", &colors.bubble_outline, default.outline),
        }
    }
}

/// Colour of pie slice `idx`, cycling through the palette.
pub fn slice_rgb(idx: usize) -> (u8, u8, u8) {
    BLUES_R[idx % BLUES_R.len()]
}

/// Write `top_towns`, `facilities` and `correlation` charts into `dir`, creating it if needed.
/// The facilities chart is skipped when nothing is selected. Returns the written paths.
pub fn export_dashboard(
    view: &DashboardView,
    dir: &Path,
    format: ChartExportFormat,
    palette: &ExportPalette,
) -> DashboardResult<Vec<PathBuf>> {
    std::fs::create_dir_all(dir)?;
    let path_for = |stem: &str| dir.join(format!("{stem}.{}", format.extension()));
    let mut written = Vec::with_capacity(3);

    let path = path_for("top_towns");
    render(&path, format, palette, Chart::Bar(&view.bar))?;
    written.push(path);

    match &view.pie {
        PieView::Chart(spec) => {
            let path = path_for("facilities");
            render(&path, format, palette, Chart::Donut(spec))?;
            written.push(path);
        }
        PieView::NoSelection { message } => {
            warn!(%message, "skipping facilities chart export");
        }
    }

    let path = path_for("correlation");
    render(&path, format, palette, Chart::Bubble(&view.scatter))?;
    written.push(path);

    info!(
        dir = %dir.display(),
        format = format.as_str(),
        files = written.len(),
        "exported dashboard charts"
    );
    Ok(written)
}

fn export_error(err: impl std::fmt::Display) -> DashboardError {
    DashboardError::Export(err.to_string())
}

type DrawResult<DB> = Result<(), DrawingAreaErrorKind<<DB as DrawingBackend>::ErrorType>>;

#[derive(Clone, Copy)]
enum Chart<'a> {
    Bar(&'a BarChartSpec),
    Donut(&'a PieChartSpec),
    Bubble(&'a ScatterChartSpec),
}

/// Open the backend for `format` and draw `chart` into `path`.
fn render(
    path: &Path,
    format: ChartExportFormat,
    palette: &ExportPalette,
    chart: Chart<'_>,
) -> DashboardResult<()> {
    match format {
        ChartExportFormat::Png => finish(
            BitMapBackend::new(path, SIZE).into_drawing_area(),
            palette,
            chart,
        ),
        ChartExportFormat::Svg => finish(
            SVGBackend::new(path, SIZE).into_drawing_area(),
            palette,
            chart,
        ),
    }
}

fn finish<DB: DrawingBackend>(
    root: DrawingArea<DB, Shift>,
    palette: &ExportPalette,
    chart: Chart<'_>,
) -> DashboardResult<()> {
    root.fill(&WHITE).map_err(export_error)?;
    match chart {
        Chart::Bar(spec) => draw_bar_chart(&root, spec, palette.bar),
        Chart::Donut(spec) => draw_donut_chart(&root, spec),
        Chart::Bubble(spec) => draw_bubble_chart(&root, spec, palette),
    }
    .map_err(export_error)?;
    root.present().map_err(export_error)
}

fn rgb((r, g, b): (u8, u8, u8)) -> RGBColor {
    RGBColor(r, g, b)
}

/// Horizontal bars, one row per town, largest at the top.
fn draw_bar_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &BarChartSpec,
    color: (u8, u8, u8),
) -> DrawResult<DB> {
    let rows = spec.bars.len().max(1);
    let x_max = spec
        .bars
        .iter()
        .map(|bar| bar.hotels)
        .max()
        .unwrap_or(0)
        .max(1) as f64
        * 1.05;

    let mut chart = ChartBuilder::on(root)
        .caption(spec.title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(140)
        .build_cartesian_2d(0.0..x_max, (0..rows).into_segmented())?;

    let label_for = |value: &SegmentValue<usize>| match value {
        SegmentValue::CenterOf(idx) => spec
            .bars
            .get(*idx)
            .map(|bar| bar.town.clone())
            .unwrap_or_default(),
        _ => String::new(),
    };

    chart
        .configure_mesh()
        .disable_x_mesh()
        .disable_y_mesh()
        .x_desc(spec.x_label)
        .y_labels(rows)
        .y_label_formatter(&label_for)
        .draw()?;

    let fill = rgb(color).filled();
    chart.draw_series(spec.bars.iter().enumerate().map(|(idx, bar)| {
        let mut rect = Rectangle::new(
            [
                (0.0, SegmentValue::Exact(idx)),
                (bar.hotels as f64, SegmentValue::Exact(idx + 1)),
            ],
            fill,
        );
        rect.set_margin(2, 2, 0, 0);
        rect
    }))?;

    Ok(())
}

/// Ring polygon for one wedge, in pixel coordinates.
fn wedge_points(
    center: (i32, i32),
    outer: f64,
    inner: f64,
    start: f64,
    end: f64,
) -> Vec<(i32, i32)> {
    let sweep = start - end;
    let steps = ((sweep / std::f64::consts::TAU) * ARC_STEPS_PER_TURN).ceil().max(1.0) as usize;
    let at = |radius: f64, angle: f64| {
        (
            center.0 + (radius * angle.cos()).round() as i32,
            center.1 - (radius * angle.sin()).round() as i32,
        )
    };

    let mut points = Vec::with_capacity(2 * (steps + 1));
    for step in 0..=steps {
        points.push(at(outer, start - sweep * step as f64 / steps as f64));
    }
    for step in (0..=steps).rev() {
        points.push(at(inner, start - sweep * step as f64 / steps as f64));
    }
    points
}

/// Donut with a legend of counts and percentages on the right.
fn draw_donut_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &PieChartSpec,
) -> DrawResult<DB> {
    let root = root.titled(spec.title, ("sans-serif", 26))?;
    let (width, height) = root.dim_in_pixel();
    let (plot, legend) = root.split_horizontally((width as f64 * 0.65) as u32);

    let (pw, ph) = plot.dim_in_pixel();
    let center = ((pw / 2) as i32, (ph / 2) as i32);
    let outer = f64::from(pw.min(ph)) * 0.42;
    let inner = outer * spec.hole;

    let slices = spec.slices();
    for (idx, slice) in slices.iter().enumerate() {
        if slice.share <= 0.0 {
            continue;
        }
        let points = wedge_points(center, outer, inner, slice.start, slice.end);
        plot.draw(&Polygon::new(points, rgb(slice_rgb(idx)).filled()))?;

        let mid = (slice.start + slice.end) / 2.0;
        let label_radius = (outer + inner) / 2.0;
        let label_pos = (
            center.0 + (label_radius * mid.cos()) as i32 - 18,
            center.1 - (label_radius * mid.sin()) as i32 - 8,
        );
        let text_color = if idx < 4 { WHITE } else { BLACK };
        plot.draw(&Text::new(
            format!("{:.1}%", slice.share * 100.0),
            label_pos,
            ("sans-serif", 16).into_font().color(&text_color),
        ))?;
    }

    let row_height = 28;
    let legend_top = (height as i32 / 2) - (slices.len() as i32 * row_height) / 2;
    for (idx, slice) in slices.iter().enumerate() {
        let y = legend_top + idx as i32 * row_height;
        legend.draw(&Rectangle::new(
            [(10, y), (28, y + 18)],
            rgb(slice_rgb(idx)).filled(),
        ))?;
        legend.draw(&Text::new(
            format!("{} ({})", slice.facility.label(), slice.count),
            (36, y + 2),
            ("sans-serif", 16),
        ))?;
    }

    Ok(())
}

/// Scatter of x/y metrics with bubble area proportional to the size metric.
fn draw_bubble_chart<DB: DrawingBackend>(
    root: &DrawingArea<DB, Shift>,
    spec: &ScatterChartSpec,
    palette: &ExportPalette,
) -> DrawResult<DB> {
    let ((x_min, x_max), (y_min, y_max)) = spec.bounds().unwrap_or(((0.0, 1.0), (0.0, 1.0)));
    let pad = |lo: f64, hi: f64| {
        let span = if hi > lo { hi - lo } else { 1.0 };
        (lo - span * 0.08)..(hi + span * 0.08)
    };

    let mut chart = ChartBuilder::on(root)
        .caption(spec.title, ("sans-serif", 26))
        .margin(20)
        .x_label_area_size(45)
        .y_label_area_size(60)
        .build_cartesian_2d(pad(x_min, x_max), pad(y_min, y_max))?;

    chart
        .configure_mesh()
        .x_desc(spec.x_label)
        .y_desc(spec.y_label)
        .draw()?;

    let fill = rgb(palette.bubble).mix(BUBBLE_OPACITY).filled();
    let outline = rgb(palette.outline).stroke_width(1);
    let visible = spec
        .points
        .iter()
        .filter(|p| p.x.is_finite() && p.y.is_finite())
        .map(|p| (p, (spec.relative_radius(p) * MAX_BUBBLE_RADIUS).round() as i32))
        .filter(|(_, radius)| *radius > 0);

    chart.draw_series(visible.clone().map(|(p, radius)| {
        EmptyElement::at((p.x, p.y))
            + Circle::new((0, 0), radius, fill)
            + Circle::new((0, 0), radius, outline)
    }))?;

    chart.draw_series(visible.filter_map(|(p, radius)| {
        p.label.as_ref().map(|label| {
            EmptyElement::at((p.x, p.y))
                + Text::new(label.clone(), (radius + 2, -6), ("sans-serif", 11))
        })
    }))?;

    Ok(())
}
