//! Model fitting for graph-penalized regression.
//!
//! The cross-validated objective only talks to a [`ModelFit`]; the shipped
//! [`Edgenet`] coordinate-descent solver is one implementation, and tests can
//! substitute any closure with the same signature.

mod edgenet;

pub use edgenet::{Edgenet, EdgenetConfig};

use crate::cv::CvFold;
use crate::data::GraphPenalizedData;
use crate::error::Result;
use crate::types::Penalties;
use ndarray::Array2;

/// Fits a `p x q` coefficient matrix on the training subset of a fold.
pub trait ModelFit: Sync {
    fn fit(
        &self,
        data: &GraphPenalizedData,
        penalties: &Penalties,
        fold: &CvFold,
    ) -> Result<Array2<f64>>;
}

impl<F> ModelFit for F
where
    F: Fn(&GraphPenalizedData, &Penalties, &CvFold) -> Result<Array2<f64>> + Sync,
{
    fn fit(
        &self,
        data: &GraphPenalizedData,
        penalties: &Penalties,
        fold: &CvFold,
    ) -> Result<Array2<f64>> {
        self(data, penalties, fold)
    }
}
