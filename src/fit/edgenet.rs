//! Cyclic coordinate descent for edge-regularized regression.
//!
//! Minimizes
//!
//! ```text
//! ||Y - X B||_F^2 + lambda * alpha * ||B||_1 + lambda * (1 - alpha) * ||B||_F^2
//!     + psigx * tr(B' Gx B) + psigy * tr(B Gy B')
//! ```
//!
//! over the `p x q` coefficient matrix `B`, one coordinate at a time with
//! soft thresholding. `Gx` and `Gy` are the penalty operators attached to the
//! dataset; a missing graph contributes nothing regardless of its weight.
//! A coordinate with zero curvature (e.g. a predictor that is all zeros on the
//! training rows) is held at zero when nothing pulls it away.

use super::ModelFit;
use crate::cv::CvFold;
use crate::data::GraphPenalizedData;
use crate::error::{EdgeregError, Result};
use crate::types::Penalties;
use ndarray::{Array2, ArrayView2, Axis};
use serde::{Deserialize, Serialize};

/// Solver configuration for [`Edgenet`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EdgenetConfig {
    /// Maximum number of full sweeps over all coordinates.
    pub max_iter: usize,
    /// Convergence threshold on the summed absolute coefficient change of a sweep.
    pub thresh: f64,
}

impl Default for EdgenetConfig {
    fn default() -> Self {
        Self {
            max_iter: 100_000,
            thresh: 1e-5,
        }
    }
}

/// Coordinate-descent fitter for graph-penalized linear models.
#[derive(Debug, Clone, Copy, Default)]
pub struct Edgenet {
    config: EdgenetConfig,
}

impl Edgenet {
    pub fn new(config: EdgenetConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EdgenetConfig {
        &self.config
    }

    /// Fit on every sample of the dataset.
    pub fn fit_full(
        &self,
        data: &GraphPenalizedData,
        penalties: &Penalties,
    ) -> Result<Array2<f64>> {
        let rows: Vec<usize> = (0..data.n_samples()).collect();
        self.fit_rows(data, penalties, &rows)
    }

    /// Fit on the given sample rows only.
    pub fn fit_rows(
        &self,
        data: &GraphPenalizedData,
        penalties: &Penalties,
        rows: &[usize],
    ) -> Result<Array2<f64>> {
        check_penalties(penalties)?;
        if rows.is_empty() {
            return Err(EdgeregError::InvalidInput(
                "cannot fit on an empty set of rows".to_string(),
            ));
        }

        let x = data.design().select(Axis(0), rows);
        let y = data.response().select(Axis(0), rows);
        let gx = data.predictor_graph().filter(|_| penalties.psigx > 0.0);
        let gy = data.response_graph().filter(|_| penalties.psigy > 0.0);

        let p = x.ncols();
        let q = y.ncols();
        let col_norms: Vec<f64> = x.axis_iter(Axis(1)).map(|c| c.dot(&c)).collect();
        let l1 = penalties.lambda * penalties.alpha / 2.0;
        let l2 = penalties.lambda * (1.0 - penalties.alpha);

        let mut coef = Array2::<f64>::zeros((p, q));
        let mut resid = y;
        let mut last_change = f64::INFINITY;

        for iter in 0..self.config.max_iter {
            let mut change = 0.0;
            for k in 0..q {
                for j in 0..p {
                    let old = coef[[j, k]];
                    let xj = x.column(j);

                    let mut denom = col_norms[j] + l2;
                    let mut numer = xj.dot(&resid.column(k)) + col_norms[j] * old;
                    if let Some(g) = &gx {
                        denom += penalties.psigx * g[[j, j]];
                        numer -= penalties.psigx * off_diagonal_dot(g, j, coef.column(k).iter(), old);
                    }
                    if let Some(g) = &gy {
                        denom += penalties.psigy * g[[k, k]];
                        numer -= penalties.psigy * off_diagonal_dot(g, k, coef.row(j).iter(), old);
                    }
                    let shrunk = soft_threshold(numer, l1);
                    // A coordinate with no curvature and no pull stays at zero.
                    let new = if denom == 0.0 && shrunk == 0.0 {
                        0.0
                    } else if denom <= 0.0 {
                        return Err(EdgeregError::NumericalError(format!(
                            "non-positive curvature {denom:e} at coefficient ({j}, {k})"
                        )));
                    } else {
                        shrunk / denom
                    };
                    if !new.is_finite() {
                        return Err(EdgeregError::NumericalError(format!(
                            "coefficient ({j}, {k}) diverged"
                        )));
                    }
                    let delta = new - old;
                    if delta != 0.0 {
                        resid.column_mut(k).scaled_add(-delta, &xj);
                        coef[[j, k]] = new;
                        change += delta.abs();
                    }
                }
            }

            last_change = change;
            if change <= self.config.thresh {
                log::debug!(
                    "edgenet converged after {} sweeps (change {:.3e}, lambda {}, psigx {}, psigy {})",
                    iter + 1,
                    change,
                    penalties.lambda,
                    penalties.psigx,
                    penalties.psigy
                );
                return Ok(coef);
            }
        }

        log::warn!(
            "edgenet hit max_iter {} without converging (last change {:.3e})",
            self.config.max_iter,
            last_change
        );
        Err(EdgeregError::ConvergenceError {
            iterations: self.config.max_iter,
            last_change,
        })
    }
}

impl ModelFit for Edgenet {
    fn fit(
        &self,
        data: &GraphPenalizedData,
        penalties: &Penalties,
        fold: &CvFold,
    ) -> Result<Array2<f64>> {
        self.fit_rows(data, penalties, fold.train())
    }
}

/// `sum_{l != idx} g[idx, l] * values[l]`, given `values[idx] == own`.
fn off_diagonal_dot<'v>(
    g: &ArrayView2<f64>,
    idx: usize,
    values: impl Iterator<Item = &'v f64>,
    own: f64,
) -> f64 {
    let full: f64 = g.row(idx).iter().zip(values).map(|(a, b)| a * b).sum();
    full - g[[idx, idx]] * own
}

fn soft_threshold(value: f64, threshold: f64) -> f64 {
    if value > threshold {
        value - threshold
    } else if value < -threshold {
        value + threshold
    } else {
        0.0
    }
}

fn check_penalties(penalties: &Penalties) -> Result<()> {
    let Penalties {
        lambda,
        alpha,
        psigx,
        psigy,
    } = *penalties;
    for (name, value) in [("lambda", lambda), ("psigx", psigx), ("psigy", psigy)] {
        if !value.is_finite() || value < 0.0 {
            return Err(EdgeregError::InvalidParameter(format!(
                "{name} must be finite and non-negative, got {value}"
            )));
        }
    }
    if !(0.0..=1.0).contains(&alpha) {
        return Err(EdgeregError::InvalidParameter(format!(
            "alpha must lie in [0, 1], got {alpha}"
        )));
    }
    Ok(())
}
