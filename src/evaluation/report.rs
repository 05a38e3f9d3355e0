use crate::evaluation::metrics::{format_r2, format_rmse, group_thousands};
use crate::evaluation::EvaluationReport;
use plotters::prelude::*;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use std::path::Path;
use thiserror::Error;

const WIDTH: u32 = 1400;
const HEIGHT: u32 = 600;
const FONT: &str = "sans-serif";

#[derive(Error, Debug)]
#[error("Failed to render report: {0}")]
pub struct RenderError(String);

fn render_err<E: std::fmt::Display>(e: E) -> RenderError {
    RenderError(e.to_string())
}

/// Rows of the metrics table: label, train cell, test cell.
pub fn metrics_rows(report: &EvaluationReport) -> [[String; 3]; 2] {
    [
        [
            "RMSE".to_string(),
            format_rmse(report.train.rmse),
            format_rmse(report.test.rmse),
        ],
        [
            "R²".to_string(),
            format_r2(report.train.r2),
            format_r2(report.test.r2),
        ],
    ]
}

/// Writes the two-panel SVG: metrics table on the left, predicted vs actual
/// test prices on the right.
pub fn render_report(report: &EvaluationReport, path: &Path) -> Result<(), RenderError> {
    let root = SVGBackend::new(path, (WIDTH, HEIGHT)).into_drawing_area();
    root.fill(&WHITE).map_err(render_err)?;

    let (left, right) = root.split_horizontally(WIDTH / 3);
    draw_metrics_table(&left, report)?;
    draw_scatter(&right, report)?;

    root.present().map_err(render_err)?;
    Ok(())
}

fn draw_metrics_table<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    report: &EvaluationReport,
) -> Result<(), RenderError> {
    let area = area.titled("Metrics", (FONT, 24)).map_err(render_err)?;
    let (w, h) = area.dim_in_pixel();
    let (w, h) = (w as i32, h as i32);

    let cell_w = (w - 40) / 3;
    let cell_h = 48;
    let x0 = 20;
    let y0 = h / 2 - cell_h * 3 / 2;

    let centered = TextStyle::from((FONT, 18).into_font()).pos(Pos::new(HPos::Center, VPos::Center));
    let header = ["", "Train", "Test"];
    let rows = metrics_rows(report);

    for (r, cells) in std::iter::once(header.map(String::from))
        .chain(rows)
        .enumerate()
    {
        for (c, text) in cells.iter().enumerate() {
            let x = x0 + c as i32 * cell_w;
            let y = y0 + r as i32 * cell_h;
            area.draw(&Rectangle::new(
                [(x, y), (x + cell_w, y + cell_h)],
                BLACK.stroke_width(1),
            ))
            .map_err(render_err)?;
            area.draw(&Text::new(
                text.clone(),
                (x + cell_w / 2, y + cell_h / 2),
                centered.clone(),
            ))
            .map_err(render_err)?;
        }
    }
    Ok(())
}

fn draw_scatter<DB: DrawingBackend>(
    area: &DrawingArea<DB, plotters::coord::Shift>,
    report: &EvaluationReport,
) -> Result<(), RenderError> {
    let points: Vec<(f64, f64)> = report
        .test_points
        .iter()
        .copied()
        .filter(|(a, p)| a.is_finite() && p.is_finite())
        .collect();
    let (lo, hi) = axis_bounds(&points);

    let mut chart = ChartBuilder::on(area)
        .caption("Predicted vs Actual (test set)", (FONT, 22))
        .margin(20)
        .x_label_area_size(50)
        .y_label_area_size(90)
        .build_cartesian_2d(lo..hi, lo..hi)
        .map_err(render_err)?;

    let price_label = |v: &f64| group_thousands(v.round() as i64);
    chart
        .configure_mesh()
        .x_desc("Actual price")
        .y_desc("Predicted price")
        .x_label_formatter(&price_label)
        .y_label_formatter(&price_label)
        .draw()
        .map_err(render_err)?;

    chart
        .draw_series(
            points
                .iter()
                .map(|&(a, p)| Circle::new((a, p), 3, BLUE.mix(0.6).filled())),
        )
        .map_err(render_err)?;

    // Perfect-prediction diagonal.
    chart
        .draw_series(LineSeries::new(vec![(lo, lo), (hi, hi)], BLACK.stroke_width(1)))
        .map_err(render_err)?;

    if !report.outliers.is_empty() {
        chart
            .draw_series(report.outliers.iter().map(|o| {
                EmptyElement::at((o.actual, o.predicted))
                    + Circle::new((0, 0), 5, RED.filled())
                    + Text::new(
                        group_thousands(o.abs_error.trunc() as i64),
                        (6, -14),
                        (FONT, 12).into_font(),
                    )
            }))
            .map_err(render_err)?
            .label("Outliers")
            .legend(|(x, y)| Circle::new((x, y), 5, RED.filled()));

        chart
            .configure_series_labels()
            .background_style(&WHITE.mix(0.8))
            .border_style(&BLACK)
            .draw()
            .map_err(render_err)?;
    }

    Ok(())
}

/// Shared range for both axes covering every point, padded so that the
/// extremes are not drawn on the frame.
fn axis_bounds(points: &[(f64, f64)]) -> (f64, f64) {
    let (mut lo, mut hi) = (f64::INFINITY, f64::NEG_INFINITY);
    for &(a, p) in points {
        lo = lo.min(a).min(p);
        hi = hi.max(a).max(p);
    }
    if !lo.is_finite() || !hi.is_finite() {
        return (0.0, 1.0);
    }
    let pad = ((hi - lo) * 0.05).max(1.0);
    (lo - pad, hi + pad)
}
