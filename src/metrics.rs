//! Prediction error metrics on index subsets.

use ndarray::ArrayView2;

/// Sum of squared residuals of `y - x * coef` over the rows in `idx`, across all response columns.
///
/// No normalization is applied.
pub fn sse(coef: &ArrayView2<f64>, x: &ArrayView2<f64>, y: &ArrayView2<f64>, idx: &[usize]) -> f64 {
    idx.iter()
        .map(|&i| {
            let fitted = x.row(i).dot(coef);
            y.row(i)
                .iter()
                .zip(fitted.iter())
                .map(|(obs, pred)| (obs - pred).powi(2))
                .sum::<f64>()
        })
        .sum()
}

/// Mean squared error over the rows in `idx`; 0.0 for an empty subset.
pub fn mse(coef: &ArrayView2<f64>, x: &ArrayView2<f64>, y: &ArrayView2<f64>, idx: &[usize]) -> f64 {
    if idx.is_empty() {
        return 0.0;
    }
    sse(coef, x, y, idx) / idx.len() as f64
}
