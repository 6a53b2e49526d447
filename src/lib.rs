//! # edgereg
//!
//! Cross-validated objective for edge-regularized (graph-penalized) linear
//! regression, built to be minimized by a derivative-free hyperparameter
//! optimizer.
//!
//! An [`EdgenetLoss`](loss::EdgenetLoss) binds a
//! [`GraphPenalizedData`](data::GraphPenalizedData) and a
//! [`CvSet`](cv::CvSet) to a [`ModelFit`](fit::ModelFit) collaborator and maps
//! a hyperparameter vector `[lambda, psigx?, psigy?]` to the mean held-out sum
//! of squared errors across folds. Graph weights pinned on the dataset never
//! occupy a slot in the vector.
//!
//! ## Example
//!
//! ```ignore
//! use edgereg::prelude::*;
//!
//! let data = GraphPenalizedData::new(x, y)?
//!     .with_predictor_graph(laplacian, GraphWeight::from_sentinel(-1.0))?;
//! let cv = CvSet::kfold(data.n_samples(), 5)?;
//! let loss = EdgenetLoss::new(&data, &cv, Edgenet::default())?;
//!
//! let score = loss.evaluate(&[0.1, 1.0])?;
//! let tuned = optimize(&loss, TuneConfig::default())?;
//! ```

pub mod cv;
pub mod data;
pub mod error;
pub mod fit;
pub mod hyper_opt;
pub mod loss;
pub mod metrics;
pub mod types;

pub mod prelude {
    //! Convenient re-exports of commonly used types.
    pub use crate::cv::{CvFold, CvSet};
    pub use crate::data::GraphPenalizedData;
    pub use crate::error::{EdgeregError, Result};
    pub use crate::fit::{Edgenet, EdgenetConfig, ModelFit};
    pub use crate::hyper_opt::{TuneConfig, TuneResult, optimize};
    pub use crate::loss::EdgenetLoss;
    pub use crate::metrics::{mse, sse};
    pub use crate::types::{GraphWeight, Penalties, SEARCH_SENTINEL};
}
