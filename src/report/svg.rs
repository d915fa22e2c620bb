use std::fmt::Write;

use super::ChartSpec;

const WIDTH: f64 = 800.0;
const HEIGHT: f64 = 600.0;
const MARGIN_LEFT: f64 = 80.0;
const MARGIN_RIGHT: f64 = 30.0;
const MARGIN_TOP: f64 = 70.0;
const MARGIN_BOTTOM: f64 = 60.0;
const TARGET_TICKS: f64 = 8.0;
const PALETTE: [&str; 4] = ["#1f77b4", "#ff7f0e", "#2ca02c", "#d62728"];

#[derive(Debug, Clone, Copy, PartialEq)]
struct Axis {
    low: f64,
    high: f64,
}

impl Axis {
    fn from_values<'a>(values: impl Iterator<Item = &'a f64>) -> Self {
        let (low, high) = values
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
                (lo.min(*v), hi.max(*v))
            });
        if !low.is_finite() {
            return Axis {
                low: 0.0,
                high: 1.0,
            };
        }
        if high - low <= f64::EPSILON * low.abs().max(1.0) {
            return Axis {
                low: low - 1.0,
                high: high + 1.0,
            };
        }
        Axis { low, high }
    }

    fn padded(self, fraction: f64) -> Self {
        let pad = (self.high - self.low) * fraction;
        Axis {
            low: self.low - pad,
            high: self.high + pad,
        }
    }

    fn span(self) -> f64 {
        self.high - self.low
    }

    fn nice_ticks(self) -> Vec<f64> {
        let raw_step = self.span() / TARGET_TICKS;
        let magnitude = 10f64.powf(raw_step.log10().floor());
        let step = [1.0, 2.0, 5.0, 10.0]
            .into_iter()
            .map(|m| m * magnitude)
            .find(|s| *s >= raw_step)
            .unwrap_or(10.0 * magnitude);

        let first = (self.low / step).ceil() as i64;
        let last = (self.high / step).floor() as i64;
        (first..=last).map(|k| k as f64 * step).collect()
    }
}

struct Frame {
    x: Axis,
    y: Axis,
}

impl Frame {
    fn plot_width() -> f64 {
        WIDTH - MARGIN_LEFT - MARGIN_RIGHT
    }

    fn plot_height() -> f64 {
        HEIGHT - MARGIN_TOP - MARGIN_BOTTOM
    }

    fn px(&self, x: f64) -> f64 {
        MARGIN_LEFT + (x - self.x.low) / self.x.span() * Self::plot_width()
    }

    fn py(&self, y: f64) -> f64 {
        MARGIN_TOP + (self.y.high - y) / self.y.span() * Self::plot_height()
    }
}

pub fn render_svg(chart: &ChartSpec) -> String {
    let x = Axis::from_values(chart.series.iter().flat_map(|s| s.x.iter()));
    let y = match chart.y_range {
        Some((low, high)) => Axis { low, high },
        None => Axis::from_values(chart.series.iter().flat_map(|s| s.y.iter())).padded(0.05),
    };
    let frame = Frame { x, y };

    let mut out = String::new();
    let _ = write_document(&mut out, chart, &frame);
    out
}

fn write_document(out: &mut String, chart: &ChartSpec, frame: &Frame) -> std::fmt::Result {
    let (plot_w, plot_h) = (Frame::plot_width(), Frame::plot_height());
    writeln!(
        out,
        r#"<svg xmlns="http://www.w3.org/2000/svg" width="{WIDTH}" height="{HEIGHT}" viewBox="0 0 {WIDTH} {HEIGHT}" font-family="sans-serif" font-size="12">"#
    )?;
    writeln!(out, r#"<rect width="100%" height="100%" fill="white"/>"#)?;
    writeln!(
        out,
        r#"<defs><clipPath id="plot"><rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{plot_w}" height="{plot_h}"/></clipPath></defs>"#
    )?;

    for (i, line) in chart.title.lines().enumerate() {
        writeln!(
            out,
            r#"<text x="{:.1}" y="{:.1}" text-anchor="middle" font-size="14">{}</text>"#,
            WIDTH / 2.0,
            22.0 + 18.0 * i as f64,
            escape(line)
        )?;
    }

    let y_ticks = chart
        .y_ticks
        .clone()
        .unwrap_or_else(|| frame.y.nice_ticks());
    for tick in y_ticks
        .iter()
        .filter(|t| **t >= frame.y.low && **t <= frame.y.high)
    {
        let py = frame.py(*tick);
        writeln!(
            out,
            r##"<line x1="{MARGIN_LEFT}" y1="{py:.2}" x2="{:.2}" y2="{py:.2}" stroke="#dddddd"/>"##,
            MARGIN_LEFT + plot_w
        )?;
        writeln!(
            out,
            r#"<text x="{:.2}" y="{:.2}" text-anchor="end">{}</text>"#,
            MARGIN_LEFT - 6.0,
            py + 4.0,
            format_tick(*tick)
        )?;
    }

    for tick in frame.x.nice_ticks() {
        let px = frame.px(tick);
        writeln!(
            out,
            r##"<line x1="{px:.2}" y1="{MARGIN_TOP}" x2="{px:.2}" y2="{:.2}" stroke="#dddddd"/>"##,
            MARGIN_TOP + plot_h
        )?;
        writeln!(
            out,
            r#"<text x="{px:.2}" y="{:.2}" text-anchor="middle">{}</text>"#,
            MARGIN_TOP + plot_h + 18.0,
            format_tick(tick)
        )?;
    }

    writeln!(
        out,
        r#"<rect x="{MARGIN_LEFT}" y="{MARGIN_TOP}" width="{plot_w}" height="{plot_h}" fill="none" stroke="black"/>"#
    )?;
    writeln!(
        out,
        r#"<text x="{:.1}" y="{:.1}" text-anchor="middle">{}</text>"#,
        MARGIN_LEFT + plot_w / 2.0,
        HEIGHT - 15.0,
        escape(chart.x_label)
    )?;
    writeln!(
        out,
        r#"<text x="20" y="{:.1}" text-anchor="middle" transform="rotate(-90 20 {:.1})">{}</text>"#,
        MARGIN_TOP + plot_h / 2.0,
        MARGIN_TOP + plot_h / 2.0,
        escape(chart.y_label)
    )?;

    for (i, series) in chart.series.iter().enumerate() {
        let color = PALETTE[i % PALETTE.len()];
        for segment in finite_segments(&series.x, &series.y) {
            let points = segment
                .iter()
                .map(|(x, y)| format!("{:.2},{:.2}", frame.px(*x), frame.py(*y)))
                .collect::<Vec<_>>()
                .join(" ");
            writeln!(
                out,
                r#"<polyline clip-path="url(#plot)" fill="none" stroke="{color}" stroke-width="1.5" points="{points}"/>"#
            )?;
        }
    }

    if chart.series.len() > 1 {
        for (i, series) in chart.series.iter().enumerate() {
            let color = PALETTE[i % PALETTE.len()];
            let ly = MARGIN_TOP + 16.0 + 18.0 * i as f64;
            let lx = MARGIN_LEFT + 12.0;
            writeln!(
                out,
                r#"<line x1="{lx:.1}" y1="{ly:.1}" x2="{:.1}" y2="{ly:.1}" stroke="{color}" stroke-width="2"/>"#,
                lx + 24.0
            )?;
            writeln!(
                out,
                r#"<text x="{:.1}" y="{:.1}">{}</text>"#,
                lx + 30.0,
                ly + 4.0,
                escape(&series.label)
            )?;
        }
    }

    writeln!(out, "</svg>")
}

fn finite_segments(xs: &[f64], ys: &[f64]) -> Vec<Vec<(f64, f64)>> {
    let mut segments = Vec::new();
    let mut current = Vec::new();
    for (x, y) in xs.iter().zip(ys) {
        if x.is_finite() && y.is_finite() {
            current.push((*x, *y));
        } else if !current.is_empty() {
            segments.push(std::mem::take(&mut current));
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

fn format_tick(value: f64) -> String {
    let rounded = (value * 1e6).round() / 1e6;
    if rounded == rounded.trunc() {
        format!("{}", rounded as i64)
    } else {
        format!("{rounded}")
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
}
