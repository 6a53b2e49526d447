//! Core hyperparameter types shared by the dataset, the fitter and the objective.

use serde::{Deserialize, Serialize};

/// Sentinel value callers use to mark a graph weight as "optimize me".
pub const SEARCH_SENTINEL: f64 = -1.0;

/// A graph-penalty weight that is either pinned by the caller or left to the optimizer.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub enum GraphWeight {
    /// Held at this value for every evaluation.
    Fixed(f64),
    /// Drawn from the hyperparameter vector.
    Searched,
}

impl GraphWeight {
    /// Interpret a raw scalar, where [`SEARCH_SENTINEL`] means `Searched`.
    pub fn from_sentinel(value: f64) -> Self {
        if value == SEARCH_SENTINEL {
            GraphWeight::Searched
        } else {
            GraphWeight::Fixed(value)
        }
    }

    /// Whether this weight occupies a slot in the hyperparameter vector.
    pub fn is_searched(&self) -> bool {
        matches!(self, GraphWeight::Searched)
    }

    /// The pinned value, if any.
    pub fn fixed_value(&self) -> Option<f64> {
        match self {
            GraphWeight::Fixed(v) => Some(*v),
            GraphWeight::Searched => None,
        }
    }
}

impl Default for GraphWeight {
    fn default() -> Self {
        GraphWeight::Fixed(0.0)
    }
}

/// Fully resolved penalties for a single fit.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Penalties {
    /// Shrinkage strength.
    pub lambda: f64,
    /// Elastic-net mixing; 1.0 is pure lasso.
    pub alpha: f64,
    /// Predictor-graph weight.
    pub psigx: f64,
    /// Response-graph weight.
    pub psigy: f64,
}

impl Penalties {
    /// Create a new set of penalties.
    pub fn new(lambda: f64, alpha: f64, psigx: f64, psigy: f64) -> Self {
        Self {
            lambda,
            alpha,
            psigx,
            psigy,
        }
    }

    /// Lasso penalties without any graph term.
    pub fn lasso(lambda: f64) -> Self {
        Self::new(lambda, 1.0, 0.0, 0.0)
    }
}
