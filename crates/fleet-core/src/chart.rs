//! Instance-count chart: maps the visible daemons onto a fixed-height plot,
//! smooths the series with a cardinal spline and places the hover tooltip.
//!
//! Everything here is expressed in chart units (the SVG view box). The
//! dashboard maps those units onto terminal cells when drawing.

use crate::model::DaemonRecord;
use crate::palette::{ChartPalette, Theme};
use std::fmt::Write;

pub const CHART_HEIGHT: f64 = 300.0;
pub const CHART_PAD_X: f64 = 40.0;
pub const CHART_PAD_Y: f64 = 28.0;
pub const MIN_CHART_WIDTH: f64 = 320.0;
pub const DEFAULT_CHART_WIDTH: f64 = 800.0;
pub const GRID_DIVISIONS: usize = 4;
pub const TANGENT_DIVISOR: f64 = 6.0;
pub const POINT_RADIUS: f64 = 6.0;

pub const TOOLTIP_WIDTH: f64 = 150.0;
pub const TOOLTIP_HEIGHT: f64 = 60.0;
pub const TOOLTIP_OFFSET: f64 = 12.0;
pub const TOOLTIP_EDGE_MARGIN: f64 = 4.0;

#[derive(Debug, Clone, PartialEq)]
pub struct ChartPoint {
    pub index: usize,
    pub value: u64,
    pub label: String,
}

pub fn chart_points(records: &[&DaemonRecord]) -> Vec<ChartPoint> {
    records
        .iter()
        .enumerate()
        .map(|(index, record)| ChartPoint {
            index,
            value: record.instance,
            label: if record.daemon_name.is_empty() {
                format!("Item {}", index + 1)
            } else {
                record.daemon_name.clone()
            },
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenPoint {
    pub x: f64,
    pub y: f64,
}

impl ScreenPoint {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Linear map from `[0, n-1] x [0, y_max]` to the padded plot area.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartScale {
    pub width: f64,
    pub height: f64,
    pub x_max: f64,
    pub y_max: f64,
}

impl ChartScale {
    /// The y domain always starts at zero; an all-zero series gets a top of 1.
    pub fn for_points(points: &[ChartPoint], width: f64) -> Self {
        let x_max = points.len().saturating_sub(1) as f64;
        let observed = points.iter().map(|point| point.value).max().unwrap_or(0);
        let y_max = if observed == 0 { 1.0 } else { observed as f64 };
        Self {
            width,
            height: CHART_HEIGHT,
            x_max,
            y_max,
        }
    }

    pub fn x(&self, index: f64) -> f64 {
        let span = if self.x_max == 0.0 { 1.0 } else { self.x_max };
        CHART_PAD_X + index / span * (self.width - CHART_PAD_X * 2.0)
    }

    pub fn y(&self, value: f64) -> f64 {
        self.height - CHART_PAD_Y - value / self.y_max * (self.height - CHART_PAD_Y * 2.0)
    }

    pub fn map(&self, point: &ChartPoint) -> ScreenPoint {
        ScreenPoint::new(self.x(point.index as f64), self.y(point.value as f64))
    }

    pub fn baseline(&self) -> f64 {
        self.y(0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CubicSegment {
    pub from: ScreenPoint,
    pub control1: ScreenPoint,
    pub control2: ScreenPoint,
    pub to: ScreenPoint,
}

impl CubicSegment {
    pub fn at(&self, t: f64) -> ScreenPoint {
        let u = 1.0 - t;
        let b0 = u * u * u;
        let b1 = 3.0 * u * u * t;
        let b2 = 3.0 * u * t * t;
        let b3 = t * t * t;
        ScreenPoint::new(
            b0 * self.from.x + b1 * self.control1.x + b2 * self.control2.x + b3 * self.to.x,
            b0 * self.from.y + b1 * self.control1.y + b2 * self.control2.y + b3 * self.to.y,
        )
    }
}

/// Catmull-Rom style smoothing: each interior tangent comes from the two
/// neighbours divided by [`TANGENT_DIVISOR`]; endpoints reuse themselves as the
/// missing neighbour.
pub fn smooth_segments(coords: &[ScreenPoint]) -> Vec<CubicSegment> {
    if coords.len() < 2 {
        return Vec::new();
    }
    (0..coords.len() - 1)
        .map(|i| {
            let p0 = coords[i.saturating_sub(1)];
            let p1 = coords[i];
            let p2 = coords[i + 1];
            let p3 = coords.get(i + 2).copied().unwrap_or(p2);
            CubicSegment {
                from: p1,
                control1: ScreenPoint::new(
                    p1.x + (p2.x - p0.x) / TANGENT_DIVISOR,
                    p1.y + (p2.y - p0.y) / TANGENT_DIVISOR,
                ),
                control2: ScreenPoint::new(
                    p2.x - (p3.x - p1.x) / TANGENT_DIVISOR,
                    p2.y - (p3.y - p1.y) / TANGENT_DIVISOR,
                ),
                to: p2,
            }
        })
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GridLine {
    pub y: f64,
    pub value: f64,
    pub label: i64,
}

fn grid_lines(scale: &ChartScale) -> Vec<GridLine> {
    (0..=GRID_DIVISIONS)
        .map(|step| {
            let value = scale.y_max / GRID_DIVISIONS as f64 * step as f64;
            GridLine {
                y: scale.y(value),
                value,
                label: value.round() as i64,
            }
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlottedPoint {
    pub point: ChartPoint,
    pub at: ScreenPoint,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ChartModel {
    pub scale: ChartScale,
    pub points: Vec<PlottedPoint>,
    pub segments: Vec<CubicSegment>,
    pub grid: Vec<GridLine>,
    pub theme: Theme,
    pub palette: ChartPalette,
}

/// Builds the chart for the visible records. Fewer than two points render
/// nothing.
pub fn render_chart(records: &[&DaemonRecord], width: f64, theme: Theme) -> Option<ChartModel> {
    let points = chart_points(records);
    if points.len() < 2 {
        return None;
    }
    let scale = ChartScale::for_points(&points, width.max(MIN_CHART_WIDTH));
    let plotted: Vec<PlottedPoint> = points
        .into_iter()
        .map(|point| PlottedPoint {
            at: scale.map(&point),
            point,
        })
        .collect();
    let coords: Vec<ScreenPoint> = plotted.iter().map(|plotted| plotted.at).collect();
    Some(ChartModel {
        segments: smooth_segments(&coords),
        grid: grid_lines(&scale),
        points: plotted,
        scale,
        theme,
        palette: ChartPalette::for_theme(theme),
    })
}

fn num(value: f64) -> String {
    let rounded = (value * 1000.0).round() / 1000.0;
    let mut text = format!("{rounded:.3}");
    while text.ends_with('0') {
        text.pop();
    }
    if text.ends_with('.') {
        text.pop();
    }
    if text == "-0" {
        text = "0".to_string();
    }
    text
}

impl ChartModel {
    pub fn width(&self) -> f64 {
        self.scale.width
    }

    pub fn height(&self) -> f64 {
        self.scale.height
    }

    pub fn y_domain(&self) -> (f64, f64) {
        (0.0, self.scale.y_max)
    }

    pub fn baseline_y(&self) -> f64 {
        self.scale.baseline()
    }

    /// SVG path data for the smoothed curve.
    pub fn line_path(&self) -> String {
        let Some(first) = self.points.first() else {
            return String::new();
        };
        let mut d = format!("M {} {}", num(first.at.x), num(first.at.y));
        for segment in &self.segments {
            let _ = write!(
                d,
                " C {} {}, {} {}, {} {}",
                num(segment.control1.x),
                num(segment.control1.y),
                num(segment.control2.x),
                num(segment.control2.y),
                num(segment.to.x),
                num(segment.to.y)
            );
        }
        d
    }

    /// The curve closed down to the zero baseline.
    pub fn area_path(&self) -> String {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return String::new();
        };
        let baseline = num(self.baseline_y());
        format!(
            "{} L {} {} L {} {} Z",
            self.line_path(),
            num(last.at.x),
            baseline,
            num(first.at.x),
            baseline
        )
    }

    /// Polyline approximation of the curve, `steps` samples per segment.
    pub fn sample_curve(&self, steps: usize) -> Vec<ScreenPoint> {
        let steps = steps.max(1);
        let mut samples = Vec::with_capacity(self.segments.len() * steps + 1);
        if let Some(first) = self.segments.first() {
            samples.push(first.from);
        }
        for segment in &self.segments {
            for step in 1..=steps {
                samples.push(segment.at(step as f64 / steps as f64));
            }
        }
        samples
    }

    pub fn to_svg(&self) -> String {
        let palette = &self.palette;
        let width = num(self.width());
        let height = num(self.height());
        let mut svg = String::new();
        let _ = writeln!(
            svg,
            r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 {width} {height}" width="{width}" height="{height}" role="img" aria-label="Daemon instance counts trend">"#
        );
        let _ = writeln!(svg, "  <defs>");
        let _ = writeln!(
            svg,
            r#"    <linearGradient id="chartStroke" x1="0%" y1="0%" x2="0%" y2="100%"><stop offset="0%" stop-color="{}"/><stop offset="55%" stop-color="{}"/><stop offset="100%" stop-color="{}"/></linearGradient>"#,
            palette.stroke_start, palette.stroke_mid, palette.stroke_end
        );
        let _ = writeln!(
            svg,
            r#"    <linearGradient id="chartFill" x1="0%" y1="0%" x2="0%" y2="100%"><stop offset="0%" stop-color="{}"/><stop offset="55%" stop-color="{}"/><stop offset="100%" stop-color="{}"/></linearGradient>"#,
            palette.fill_top, palette.fill_mid, palette.fill_bottom
        );
        let _ = writeln!(svg, "  </defs>");
        for line in &self.grid {
            let y = num(line.y);
            let _ = writeln!(
                svg,
                r#"  <line x1="{}" x2="{}" y1="{y}" y2="{y}" stroke="{}" stroke-width="1"/>"#,
                num(CHART_PAD_X),
                num(self.width() - CHART_PAD_X),
                palette.grid
            );
            let _ = writeln!(
                svg,
                r#"  <text x="8" y="{}" font-size="10" fill="{}" font-family="ui-monospace,monospace">{}</text>"#,
                num(line.y + 4.0),
                palette.label,
                line.label
            );
        }
        let _ = writeln!(
            svg,
            r#"  <path d="{}" fill="url(#chartFill)" opacity="0.85"/>"#,
            self.area_path()
        );
        let _ = writeln!(
            svg,
            r#"  <path d="{}" fill="none" stroke="url(#chartStroke)" stroke-width="4" stroke-linecap="round"/>"#,
            self.line_path()
        );
        for plotted in &self.points {
            let _ = writeln!(
                svg,
                r#"  <circle cx="{}" cy="{}" r="{}" fill="{}" stroke="{}" stroke-width="1.4" opacity="{}"><title>{}: {}</title></circle>"#,
                num(plotted.at.x),
                num(plotted.at.y),
                num(POINT_RADIUS),
                palette.point,
                palette.point_stroke,
                palette.point_opacity,
                escape_xml(&plotted.point.label),
                plotted.point.value
            );
        }
        svg.push_str("</svg>\n");
        svg
    }
}

fn escape_xml(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for ch in text.chars() {
        match ch {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(ch),
        }
    }
    escaped
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HorizontalSide {
    Right,
    Left,
    /// Flipped left but clamped to the left margin.
    Pinned,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerticalSide {
    Above,
    Below,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TooltipPlacement {
    pub left: f64,
    pub top: f64,
    pub horizontal: HorizontalSide,
    pub vertical: VerticalSide,
}

/// Positions the tooltip beside `anchor`: right and above by default, flipped
/// left when it would cross the right edge, pinned to the left margin when
/// the flip overshoots, and below when there is no room above.
pub fn place_tooltip(anchor: ScreenPoint, chart_width: f64) -> TooltipPlacement {
    let mut left = anchor.x + TOOLTIP_OFFSET;
    let mut horizontal = HorizontalSide::Right;
    if left + TOOLTIP_WIDTH > chart_width - TOOLTIP_EDGE_MARGIN {
        left = anchor.x - TOOLTIP_WIDTH - TOOLTIP_OFFSET;
        horizontal = HorizontalSide::Left;
    }
    if left < TOOLTIP_EDGE_MARGIN {
        left = TOOLTIP_EDGE_MARGIN;
        horizontal = HorizontalSide::Pinned;
    }

    let mut top = anchor.y - TOOLTIP_HEIGHT - TOOLTIP_OFFSET;
    let mut vertical = VerticalSide::Above;
    if top < TOOLTIP_EDGE_MARGIN {
        top = anchor.y + TOOLTIP_OFFSET;
        vertical = VerticalSide::Below;
    }

    TooltipPlacement {
        left,
        top,
        horizontal,
        vertical,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tooltip {
    pub label: String,
    pub value: u64,
    pub anchor: ScreenPoint,
    pub placement: TooltipPlacement,
}

/// Tracks the chart container width. The floor wins over the container.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ChartViewport {
    width: f64,
}

impl Default for ChartViewport {
    fn default() -> Self {
        Self {
            width: DEFAULT_CHART_WIDTH,
        }
    }
}

impl ChartViewport {
    pub fn width(&self) -> f64 {
        self.width
    }

    /// Returns true when the effective width changed and the chart must be
    /// re-mapped.
    pub fn observe_width(&mut self, container_width: f64) -> bool {
        let next = if container_width.is_finite() {
            container_width.max(MIN_CHART_WIDTH)
        } else {
            MIN_CHART_WIDTH
        };
        if (next - self.width).abs() < f64::EPSILON {
            return false;
        }
        self.width = next;
        true
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ActiveSource {
    Hover,
    Focus,
}

/// Which point currently owns the tooltip. Hover and keyboard focus share one
/// slot, so at most one tooltip is visible.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ChartInteraction {
    active: Option<(usize, ActiveSource)>,
}

impl ChartInteraction {
    pub fn active_index(&self) -> Option<usize> {
        self.active.map(|(index, _)| index)
    }

    pub fn hover(&mut self, index: usize) {
        self.active = Some((index, ActiveSource::Hover));
    }

    pub fn focus(&mut self, index: usize) {
        self.active = Some((index, ActiveSource::Focus));
    }

    pub fn leave(&mut self, index: usize) {
        if matches!(self.active, Some((active, ActiveSource::Hover)) if active == index) {
            self.active = None;
        }
    }

    pub fn blur(&mut self, index: usize) {
        if matches!(self.active, Some((active, ActiveSource::Focus)) if active == index) {
            self.active = None;
        }
    }

    pub fn clear(&mut self) {
        self.active = None;
    }

    /// Moves keyboard focus by `delta`, clamped to the available points.
    pub fn step_focus(&mut self, delta: isize, point_count: usize) {
        if point_count == 0 {
            self.active = None;
            return;
        }
        let next = match self.active_index() {
            Some(current) => (current as isize + delta).clamp(0, point_count as isize - 1) as usize,
            None if delta < 0 => point_count - 1,
            None => 0,
        };
        self.focus(next);
    }

    /// Finds the point under `position` (within `radius` chart units).
    pub fn hit_test(model: &ChartModel, position: ScreenPoint, radius: f64) -> Option<usize> {
        model
            .points
            .iter()
            .enumerate()
            .map(|(index, plotted)| {
                let dx = plotted.at.x - position.x;
                let dy = plotted.at.y - position.y;
                (index, dx * dx + dy * dy)
            })
            .filter(|(_, distance)| *distance <= radius * radius)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(index, _)| index)
    }

    pub fn tooltip(&self, model: &ChartModel) -> Option<Tooltip> {
        let index = self.active_index()?;
        let plotted = model.points.get(index)?;
        Some(Tooltip {
            label: plotted.point.label.clone(),
            value: plotted.point.value,
            anchor: plotted.at,
            placement: place_tooltip(plotted.at, model.width()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn records(values: &[u64]) -> Vec<DaemonRecord> {
        values
            .iter()
            .enumerate()
            .map(|(idx, value)| DaemonRecord::new(idx.to_string(), format!("d{idx}"), *value))
            .collect()
    }

    fn model(values: &[u64], width: f64) -> ChartModel {
        let owned = records(values);
        let refs: Vec<&DaemonRecord> = owned.iter().collect();
        render_chart(&refs, width, Theme::Dark).expect("chart")
    }

    fn close(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn fewer_than_two_points_render_nothing() {
        let owned = records(&[5]);
        let refs: Vec<&DaemonRecord> = owned.iter().collect();
        assert!(render_chart(&refs, 800.0, Theme::Dark).is_none());
        assert!(render_chart(&[], 800.0, Theme::Dark).is_none());
    }

    #[test]
    fn three_point_scenario_maps_and_closes_to_baseline() {
        let chart = model(&[2, 4, 0], 800.0);
        assert_eq!(chart.y_domain(), (0.0, 4.0));
        assert_eq!(chart.points.len(), 3);

        let coords: Vec<(f64, f64)> = chart.points.iter().map(|p| (p.at.x, p.at.y)).collect();
        assert_eq!(coords, vec![(40.0, 150.0), (400.0, 28.0), (760.0, 272.0)]);

        assert_eq!(chart.segments.len(), 2);
        assert_eq!(chart.segments[0].from, chart.points[0].at);
        assert_eq!(chart.segments[0].to, chart.points[1].at);
        assert_eq!(chart.segments[1].to, chart.points[2].at);

        assert!(chart.line_path().starts_with("M 40 150 C "));
        assert!(chart.line_path().ends_with(", 760 272"));
        assert!(chart.area_path().ends_with("L 760 272 L 40 272 Z"));
        assert!(close(chart.baseline_y(), 272.0));
    }

    #[test]
    fn tangents_use_neighbours_over_six() {
        let chart = model(&[2, 4, 0], 800.0);
        let first = chart.segments[0];
        // Endpoint reuses itself as the previous neighbour.
        assert!(close(first.control1.x, 40.0 + (400.0 - 40.0) / 6.0));
        assert!(close(first.control1.y, 150.0 + (28.0 - 150.0) / 6.0));
        assert!(close(first.control2.x, 400.0 - (760.0 - 40.0) / 6.0));
        assert!(close(first.control2.y, 28.0 - (272.0 - 150.0) / 6.0));
        let last = chart.segments[1];
        // The last point stands in for its missing right neighbour.
        assert!(close(last.control2.x, 760.0 - (760.0 - 400.0) / 6.0));
        assert!(close(last.control2.y, 272.0 - (272.0 - 28.0) / 6.0));
    }

    #[test]
    fn all_zero_series_gets_unit_domain() {
        let chart = model(&[0, 0, 0], 800.0);
        assert_eq!(chart.y_domain(), (0.0, 1.0));
        assert!(chart.points.iter().all(|p| close(p.at.y, 272.0)));
    }

    #[test]
    fn grid_spans_domain_in_quarters() {
        let chart = model(&[2, 6], 800.0);
        let labels: Vec<i64> = chart.grid.iter().map(|line| line.label).collect();
        assert_eq!(labels, vec![0, 2, 3, 5, 6]);
        assert!(close(chart.grid[0].y, 272.0));
        assert!(close(chart.grid[4].y, 28.0));
    }

    #[test]
    fn sampled_curve_passes_through_points() {
        let chart = model(&[1, 3, 2, 5], 640.0);
        let samples = chart.sample_curve(8);
        assert_eq!(samples.len(), 3 * 8 + 1);
        for plotted in &chart.points {
            assert!(samples
                .iter()
                .any(|s| close(s.x, plotted.at.x) && close(s.y, plotted.at.y)));
        }
    }

    #[test]
    fn narrow_chart_flips_rightmost_tooltip_left() {
        let chart = model(&[1, 2, 3], 320.0);
        let rightmost = chart.points[2].at;
        let placement = place_tooltip(rightmost, chart.width());
        assert_eq!(placement.horizontal, HorizontalSide::Left);
        assert!(placement.left + TOOLTIP_WIDTH <= rightmost.x);
    }

    #[test]
    fn tooltip_defaults_right_and_above_and_clamps() {
        let roomy = place_tooltip(ScreenPoint::new(100.0, 200.0), 800.0);
        assert_eq!(roomy.horizontal, HorizontalSide::Right);
        assert_eq!(roomy.vertical, VerticalSide::Above);
        assert!(close(roomy.left, 112.0));
        assert!(close(roomy.top, 128.0));

        let cramped = place_tooltip(ScreenPoint::new(160.0, 30.0), 320.0);
        assert_eq!(cramped.horizontal, HorizontalSide::Pinned);
        assert!(close(cramped.left, TOOLTIP_EDGE_MARGIN));
        assert_eq!(cramped.vertical, VerticalSide::Below);
        assert!(close(cramped.top, 42.0));
    }

    #[test]
    fn viewport_never_drops_below_floor() {
        let mut viewport = ChartViewport::default();
        assert!(close(viewport.width(), DEFAULT_CHART_WIDTH));
        assert!(viewport.observe_width(200.0));
        assert!(close(viewport.width(), MIN_CHART_WIDTH));
        assert!(!viewport.observe_width(100.0));
        assert!(viewport.observe_width(1024.0));
        assert!(close(viewport.width(), 1024.0));
    }

    #[test]
    fn only_one_tooltip_follows_hover_and_focus() {
        let chart = model(&[1, 2, 3], 800.0);
        let mut interaction = ChartInteraction::default();
        interaction.focus(0);
        interaction.hover(2);
        let tooltip = interaction.tooltip(&chart).expect("tooltip");
        assert_eq!(tooltip.label, "d2");
        assert_eq!(tooltip.value, 3);

        interaction.blur(0);
        assert_eq!(interaction.active_index(), Some(2));
        interaction.leave(2);
        assert!(interaction.tooltip(&chart).is_none());
    }

    #[test]
    fn keyboard_focus_steps_and_clamps() {
        let mut interaction = ChartInteraction::default();
        interaction.step_focus(-1, 3);
        assert_eq!(interaction.active_index(), Some(2));
        interaction.step_focus(1, 3);
        assert_eq!(interaction.active_index(), Some(2));
        interaction.step_focus(-5, 3);
        assert_eq!(interaction.active_index(), Some(0));
    }

    #[test]
    fn hit_test_picks_nearest_point() {
        let chart = model(&[2, 4, 0], 800.0);
        let hit = ChartInteraction::hit_test(&chart, ScreenPoint::new(402.0, 30.0), 10.0);
        assert_eq!(hit, Some(1));
        assert!(ChartInteraction::hit_test(&chart, ScreenPoint::new(200.0, 200.0), 10.0).is_none());
    }

    #[test]
    fn svg_export_contains_curve_and_labels() {
        let chart = model(&[2, 4, 0], 800.0);
        let svg = chart.to_svg();
        assert!(svg.starts_with("<svg"));
        assert!(svg.contains(&chart.line_path()));
        assert!(svg.contains("viewBox=\"0 0 800 300\""));
        assert_eq!(svg.matches("<circle").count(), 3);
        assert_eq!(svg.matches("<line ").count(), GRID_DIVISIONS + 1);
    }

    #[test]
    fn unnamed_daemons_get_item_labels() {
        let owned = vec![DaemonRecord::new("a", "", 1), DaemonRecord::new("b", "beta", 2)];
        let refs: Vec<&DaemonRecord> = owned.iter().collect();
        let points = chart_points(&refs);
        assert_eq!(points[0].label, "Item 1");
        assert_eq!(points[1].label, "beta");
    }
}
