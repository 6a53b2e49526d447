//! Cross-validated objective of an edge-regularized regression model.
//!
//! [`EdgenetLoss`] turns a hyperparameter vector into the mean held-out sum
//! of squared errors across the folds of a [`CvSet`]. It is what a
//! derivative-free optimizer minimizes.
//!
//! The vector layout is fixed when the objective is constructed:
//!
//! | slot | value                                         |
//! |------|-----------------------------------------------|
//! | 0    | shrinkage `lambda`                            |
//! | 1    | predictor-graph weight, if searched           |
//! | next | response-graph weight, if searched            |
//!
//! Pinned graph weights never occupy a slot and are passed to the fitter at
//! their recorded value. The elastic-net mixing is always 1.0.

use crate::cv::{CvFold, CvSet};
use crate::data::GraphPenalizedData;
use crate::error::{EdgeregError, Result};
use crate::fit::ModelFit;
use crate::metrics::sse;
use crate::types::{GraphWeight, Penalties};
use argmin::core::{CostFunction, Error as ArgminError};
use rayon::prelude::*;

/// Elastic-net mixing used for every fit made by the objective.
pub const LASSO_MIXING: f64 = 1.0;

/// Mean cross-validated SSE as a function of the searched hyperparameters.
pub struct EdgenetLoss<'a, F: ModelFit> {
    data: &'a GraphPenalizedData,
    cv_set: &'a CvSet,
    fitter: F,
    psigx: GraphWeight,
    psigy: GraphWeight,
    n_folds: usize,
}

impl<'a, F: ModelFit> EdgenetLoss<'a, F> {
    /// Bind an objective to a dataset and a fold partition.
    ///
    /// The searched/pinned state of both graph weights is read from `data`
    /// here and never re-checked.
    pub fn new(data: &'a GraphPenalizedData, cv_set: &'a CvSet, fitter: F) -> Result<Self> {
        if cv_set.n_samples() != data.n_samples() {
            return Err(EdgeregError::ShapeMismatch {
                expected_shape: format!("cv set over {} samples", data.n_samples()),
                actual_shape: format!("cv set over {} samples", cv_set.n_samples()),
            });
        }
        if cv_set.fold_count() < 1 {
            return Err(EdgeregError::InvalidCvSet(
                "objective needs at least one fold".to_string(),
            ));
        }

        Ok(Self {
            data,
            cv_set,
            fitter,
            psigx: data.psigx(),
            psigy: data.psigy(),
            n_folds: cv_set.fold_count(),
        })
    }

    /// Length of the hyperparameter vector this objective accepts.
    pub fn n_params(&self) -> usize {
        1 + usize::from(self.psigx.is_searched()) + usize::from(self.psigy.is_searched())
    }

    pub fn n_folds(&self) -> usize {
        self.n_folds
    }

    pub fn psigx(&self) -> GraphWeight {
        self.psigx
    }

    pub fn psigy(&self) -> GraphWeight {
        self.psigy
    }

    pub fn data(&self) -> &'a GraphPenalizedData {
        self.data
    }

    pub fn cv_set(&self) -> &'a CvSet {
        self.cv_set
    }

    pub fn fitter(&self) -> &F {
        &self.fitter
    }

    /// Map a hyperparameter vector to the penalties handed to the fitter.
    pub fn penalties(&self, params: &[f64]) -> Result<Penalties> {
        let expected = self.n_params();
        if params.len() != expected {
            return Err(EdgeregError::ParameterLength {
                expected,
                actual: params.len(),
            });
        }
        if let Some(bad) = params.iter().find(|v| !v.is_finite()) {
            return Err(EdgeregError::InvalidParameter(format!(
                "hyperparameters must be finite, got {bad}"
            )));
        }

        let psigx = match self.psigx {
            GraphWeight::Fixed(value) => value,
            GraphWeight::Searched => params[1],
        };
        let psigy = match self.psigy {
            GraphWeight::Fixed(value) => value,
            GraphWeight::Searched => params[1 + usize::from(self.psigx.is_searched())],
        };

        Ok(Penalties::new(params[0], LASSO_MIXING, psigx, psigy))
    }

    /// Held-out SSE of every fold, in fold order.
    pub fn fold_errors(&self, params: &[f64]) -> Result<Vec<f64>> {
        let penalties = self.penalties(params)?;
        self.cv_set
            .folds()
            .iter()
            .enumerate()
            .map(|(i, fold)| self.fold_error(&penalties, i, fold))
            .collect()
    }

    /// Mean held-out SSE across folds.
    ///
    /// Any fold failure aborts the whole evaluation.
    pub fn evaluate(&self, params: &[f64]) -> Result<f64> {
        let errors = self.fold_errors(params)?;
        let mean = mean(&errors);
        log::debug!("edgenet loss at {params:?}: {mean:.6e} over {} folds", self.n_folds);
        Ok(mean)
    }

    /// Same as [`evaluate`](Self::evaluate) with folds fitted concurrently.
    pub fn evaluate_parallel(&self, params: &[f64]) -> Result<f64> {
        let penalties = self.penalties(params)?;
        let errors: Vec<f64> = (0..self.n_folds)
            .into_par_iter()
            .map(|i| {
                let fold = self.cv_set.fold(i)?;
                self.fold_error(&penalties, i, fold)
            })
            .collect::<Result<Vec<f64>>>()?;
        let mean = mean(&errors);
        log::debug!(
            "edgenet loss at {params:?}: {mean:.6e} over {} folds (parallel)",
            self.n_folds
        );
        Ok(mean)
    }

    fn fold_error(&self, penalties: &Penalties, index: usize, fold: &CvFold) -> Result<f64> {
        let coef = self.fitter.fit(self.data, penalties, fold)?;
        let expected = (self.data.n_predictors(), self.data.n_responses());
        if coef.dim() != expected {
            return Err(EdgeregError::ShapeMismatch {
                expected_shape: format!("{expected:?}"),
                actual_shape: format!("{:?}", coef.dim()),
            });
        }

        let err = sse(
            &coef.view(),
            &self.data.design(),
            &self.data.response(),
            fold.test(),
        );
        if !err.is_finite() {
            log::warn!("fold {index} produced a non-finite error for {penalties:?}");
            return Err(EdgeregError::NumericalError(format!(
                "fold {index} produced a non-finite error"
            )));
        }
        Ok(err)
    }
}

impl<F: ModelFit> CostFunction for EdgenetLoss<'_, F> {
    type Param = Vec<f64>;
    type Output = f64;

    fn cost(&self, params: &Self::Param) -> std::result::Result<Self::Output, ArgminError> {
        Ok(self.evaluate(params)?)
    }
}

fn mean(values: &[f64]) -> f64 {
    values.iter().sum::<f64>() / values.len() as f64
}
