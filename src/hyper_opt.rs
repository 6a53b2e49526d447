//! Hyperparameter tuning for edge-regularized regression.
//!
//! Drives an [`EdgenetLoss`] with argmin's derivative-free Nelder-Mead
//! solver inside the box `[0, upper]` of every searched slot. The search
//! strategy is entirely argmin's; this module only builds the starting
//! simplex, keeps candidates inside the box, and maps the best vector back to
//! named penalties.

use crate::error::{EdgeregError, Result};
use crate::fit::ModelFit;
use crate::loss::{EdgenetLoss, LASSO_MIXING};
use crate::types::{GraphWeight, Penalties};
use argmin::core::{CostFunction, Error as ArgminError, Executor, State};
use argmin::solver::neldermead::NelderMead;
use serde::{Deserialize, Serialize};

/// Configuration for [`optimize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuneConfig {
    /// Maximum number of Nelder-Mead iterations
    pub max_iters: u64,
    /// Upper bound of the shrinkage search interval
    pub lambda_upper: f64,
    /// Upper bound of the predictor-graph weight search interval
    pub psigx_upper: f64,
    /// Upper bound of the response-graph weight search interval
    pub psigy_upper: f64,
    /// Stop once the standard deviation of simplex costs drops below this
    pub sd_tolerance: f64,
    /// Fit the folds of each candidate concurrently
    pub parallel_folds: bool,
}

impl Default for TuneConfig {
    fn default() -> Self {
        Self {
            max_iters: 200,
            lambda_upper: 10.0,
            psigx_upper: 10.0,
            psigy_upper: 10.0,
            sd_tolerance: 1e-6,
            parallel_folds: false,
        }
    }
}

/// Best hyperparameters found by [`optimize`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TuneResult {
    pub lambda: f64,
    /// Searched optimum, or the pinned value.
    pub psigx: f64,
    /// Searched optimum, or the pinned value.
    pub psigy: f64,
    /// Mean cross-validated SSE at the optimum.
    pub best_score: f64,
    pub n_iters: u64,
}

impl TuneResult {
    /// Penalties for refitting the final model with the tuned values.
    pub fn penalties(&self) -> Penalties {
        Penalties::new(self.lambda, LASSO_MIXING, self.psigx, self.psigy)
    }
}

/// Cost wrapper that projects candidates onto the search box.
struct BoxedLoss<'l, 'a, F: ModelFit> {
    loss: &'l EdgenetLoss<'a, F>,
    upper: Vec<f64>,
    parallel: bool,
}

impl<F: ModelFit> BoxedLoss<'_, '_, F> {
    fn project(&self, params: &[f64]) -> Vec<f64> {
        params
            .iter()
            .zip(self.upper.iter())
            .map(|(&v, &ub)| v.clamp(0.0, ub))
            .collect()
    }
}

impl<F: ModelFit> CostFunction for BoxedLoss<'_, '_, F> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
        let projected = self.project(params);
        let score = if self.parallel {
            self.loss.evaluate_parallel(&projected)?
        } else {
            self.loss.evaluate(&projected)?
        };
        Ok(score)
    }
}

/// Search the box for the hyperparameters minimizing the cross-validated loss.
///
/// # Example
/// ```ignore
/// let data = GraphPenalizedData::new(x, y)?
///     .with_predictor_graph(gx, GraphWeight::from_sentinel(-1.0))?;
/// let cv = CvSet::shuffled(data.n_samples(), 5, 42)?;
/// let loss = EdgenetLoss::new(&data, &cv, Edgenet::default())?;
/// let tuned = optimize(&loss, TuneConfig::default())?;
/// let coef = Edgenet::default().fit_full(&data, &tuned.penalties())?;
/// ```
pub fn optimize<F: ModelFit>(loss: &EdgenetLoss<'_, F>, config: TuneConfig) -> Result<TuneResult> {
    let upper = search_bounds(loss, &config)?;
    let simplex = initial_simplex(&upper);

    let problem = BoxedLoss {
        loss,
        upper: upper.clone(),
        parallel: config.parallel_folds,
    };
    let solver = NelderMead::<Vec<f64>, f64>::new(simplex).with_sd_tolerance(config.sd_tolerance)?;

    let res = Executor::new(problem, solver)
        .configure(|state| state.max_iters(config.max_iters))
        .run()?;

    let state = res.state();
    let best = state.get_best_param().cloned().ok_or_else(|| {
        EdgeregError::ArgminError("Nelder-Mead finished without a best parameter".to_string())
    })?;
    let best: Vec<f64> = best
        .iter()
        .zip(upper.iter())
        .map(|(&v, &ub)| v.clamp(0.0, ub))
        .collect();
    let penalties = loss.penalties(&best)?;

    log::debug!(
        "tuning finished after {} iterations: lambda {}, psigx {}, psigy {}, score {:.6e}",
        state.get_iter(),
        penalties.lambda,
        penalties.psigx,
        penalties.psigy,
        state.get_best_cost()
    );

    Ok(TuneResult {
        lambda: penalties.lambda,
        psigx: penalties.psigx,
        psigy: penalties.psigy,
        best_score: state.get_best_cost(),
        n_iters: state.get_iter(),
    })
}

/// Upper bound of every slot of the hyperparameter vector, in slot order.
fn search_bounds<F: ModelFit>(loss: &EdgenetLoss<'_, F>, config: &TuneConfig) -> Result<Vec<f64>> {
    let mut upper = vec![config.lambda_upper];
    if loss.psigx() == GraphWeight::Searched {
        upper.push(config.psigx_upper);
    }
    if loss.psigy() == GraphWeight::Searched {
        upper.push(config.psigy_upper);
    }
    if let Some(bad) = upper.iter().find(|ub| !ub.is_finite() || **ub <= 0.0) {
        return Err(EdgeregError::InvalidParameter(format!(
            "search upper bounds must be positive and finite, got {bad}"
        )));
    }
    Ok(upper)
}

/// `n + 1` vertices: a base point at 10% of each bound, then one vertex per
/// slot moved to half its bound.
fn initial_simplex(upper: &[f64]) -> Vec<Vec<f64>> {
    let base: Vec<f64> = upper.iter().map(|ub| 0.1 * ub).collect();
    let mut simplex = vec![base.clone()];
    for (i, ub) in upper.iter().enumerate() {
        let mut vertex = base.clone();
        vertex[i] = 0.5 * ub;
        simplex.push(vertex);
    }
    simplex
}
