use serde::Serialize;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Outlier {
    /// Position in the input slices.
    pub index: usize,
    pub actual: f64,
    pub predicted: f64,
    pub abs_error: f64,
}

/// The `n` points with the largest absolute error, largest first.
/// Equal errors keep their input order; NaN errors are never selected.
pub fn top_outliers(actual: &[f64], predicted: &[f64], n: usize) -> Vec<Outlier> {
    let mut points: Vec<Outlier> = actual
        .iter()
        .zip(predicted)
        .enumerate()
        .map(|(index, (&a, &p))| Outlier {
            index,
            actual: a,
            predicted: p,
            abs_error: (a - p).abs(),
        })
        .filter(|o| !o.abs_error.is_nan())
        .collect();

    // stable sort
    points.sort_by(|x, y| y.abs_error.partial_cmp(&x.abs_error).unwrap_or(Ordering::Equal));
    points.truncate(n);
    points
}
