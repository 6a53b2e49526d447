//! Dataset for graph-penalized linear models.
//!
//! Holds the design and response matrices, the optional graph penalty
//! operators, and the two graph weights the caller either pinned or left to
//! the optimizer.

use crate::error::{EdgeregError, Result};
use crate::types::GraphWeight;
use ndarray::{Array2, ArrayView2};

/// Complete input of an edge-regularized regression problem.
#[derive(Debug, Clone)]
pub struct GraphPenalizedData {
    x: Array2<f64>,
    y: Array2<f64>,
    gx: Option<Array2<f64>>,
    gy: Option<Array2<f64>>,
    psigx: GraphWeight,
    psigy: GraphWeight,
}

impl GraphPenalizedData {
    /// Create a dataset from an `n x p` design and an `n x q` response.
    ///
    /// Both graph weights start as `Fixed(0.0)` until a graph is attached.
    pub fn new(x: Array2<f64>, y: Array2<f64>) -> Result<Self> {
        if x.nrows() != y.nrows() {
            return Err(EdgeregError::ShapeMismatch {
                expected_shape: format!("response with {} rows", x.nrows()),
                actual_shape: format!("{:?}", y.dim()),
            });
        }
        if x.nrows() == 0 || x.ncols() == 0 || y.ncols() == 0 {
            return Err(EdgeregError::InvalidInput(format!(
                "design {:?} and response {:?} must be non-empty",
                x.dim(),
                y.dim()
            )));
        }
        if x.iter().chain(y.iter()).any(|v| !v.is_finite()) {
            return Err(EdgeregError::InvalidInput(
                "design and response must contain only finite values".to_string(),
            ));
        }

        Ok(Self {
            x,
            y,
            gx: None,
            gy: None,
            psigx: GraphWeight::default(),
            psigy: GraphWeight::default(),
        })
    }

    /// Attach a `p x p` predictor-graph penalty matrix and its weight.
    pub fn with_predictor_graph(mut self, gx: Array2<f64>, weight: GraphWeight) -> Result<Self> {
        check_graph(&gx, self.n_predictors(), "predictor")?;
        check_weight(weight, "predictor")?;
        self.gx = Some(gx);
        self.psigx = weight;
        Ok(self)
    }

    /// Attach a `q x q` response-graph penalty matrix and its weight.
    pub fn with_response_graph(mut self, gy: Array2<f64>, weight: GraphWeight) -> Result<Self> {
        check_graph(&gy, self.n_responses(), "response")?;
        check_weight(weight, "response")?;
        self.gy = Some(gy);
        self.psigy = weight;
        Ok(self)
    }

    pub fn design(&self) -> ArrayView2<'_, f64> {
        self.x.view()
    }

    pub fn response(&self) -> ArrayView2<'_, f64> {
        self.y.view()
    }

    pub fn predictor_graph(&self) -> Option<ArrayView2<'_, f64>> {
        self.gx.as_ref().map(|g| g.view())
    }

    pub fn response_graph(&self) -> Option<ArrayView2<'_, f64>> {
        self.gy.as_ref().map(|g| g.view())
    }

    /// Predictor-graph weight as recorded at construction.
    pub fn psigx(&self) -> GraphWeight {
        self.psigx
    }

    /// Response-graph weight as recorded at construction.
    pub fn psigy(&self) -> GraphWeight {
        self.psigy
    }

    pub fn n_samples(&self) -> usize {
        self.x.nrows()
    }

    pub fn n_predictors(&self) -> usize {
        self.x.ncols()
    }

    pub fn n_responses(&self) -> usize {
        self.y.ncols()
    }
}

fn check_graph(g: &Array2<f64>, dim: usize, which: &str) -> Result<()> {
    if g.dim() != (dim, dim) {
        return Err(EdgeregError::ShapeMismatch {
            expected_shape: format!("{which} graph ({dim}, {dim})"),
            actual_shape: format!("{:?}", g.dim()),
        });
    }
    if g.iter().any(|v| !v.is_finite()) {
        return Err(EdgeregError::InvalidInput(format!(
            "{which} graph must contain only finite values"
        )));
    }
    Ok(())
}

fn check_weight(weight: GraphWeight, which: &str) -> Result<()> {
    match weight {
        GraphWeight::Fixed(v) if !v.is_finite() || v < 0.0 => Err(EdgeregError::InvalidParameter(
            format!("{which} graph weight must be non-negative, got {v}"),
        )),
        _ => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_new_rejects_row_mismatch() {
        let x = array![[1.0], [2.0], [3.0]];
        let y = array![[1.0], [2.0]];
        assert!(matches!(
            GraphPenalizedData::new(x, y),
            Err(EdgeregError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn test_new_rejects_non_finite() {
        let x = array![[1.0], [f64::NAN]];
        let y = array![[1.0], [2.0]];
        assert!(matches!(
            GraphPenalizedData::new(x, y),
            Err(EdgeregError::InvalidInput(_))
        ));
    }

    #[test]
    fn test_default_weights_are_pinned_at_zero() {
        let data = GraphPenalizedData::new(array![[1.0], [2.0]], array![[1.0], [2.0]]).unwrap();
        assert_eq!(data.psigx(), GraphWeight::Fixed(0.0));
        assert_eq!(data.psigy(), GraphWeight::Fixed(0.0));
        assert!(data.predictor_graph().is_none());
        assert_eq!(data.n_samples(), 2);
        assert_eq!(data.n_predictors(), 1);
        assert_eq!(data.n_responses(), 1);
    }

    #[test]
    fn test_graph_shape_checked() {
        let data = GraphPenalizedData::new(
            array![[1.0, 0.0], [0.0, 1.0]],
            array![[1.0], [2.0]],
        )
        .unwrap();
        let bad = array![[1.0]];
        assert!(
            data.clone()
                .with_predictor_graph(bad, GraphWeight::Searched)
                .is_err()
        );
        let good = array![[1.0, -1.0], [-1.0, 1.0]];
        let data = data
            .with_predictor_graph(good, GraphWeight::from_sentinel(-1.0))
            .unwrap();
        assert!(data.psigx().is_searched());
        assert!(!data.psigy().is_searched());
    }

    #[test]
    fn test_negative_fixed_weight_rejected() {
        let data = GraphPenalizedData::new(array![[1.0], [2.0]], array![[1.0], [2.0]]).unwrap();
        assert!(matches!(
            data.with_response_graph(array![[0.0]], GraphWeight::Fixed(-2.0)),
            Err(EdgeregError::InvalidParameter(_))
        ));
    }
}
