//! Cross-validation fold partitions.
//!
//! A [`CvSet`] is built once before optimization starts and is then shared
//! read-only by every objective evaluation. Construction checks that the
//! test subsets tile `0..n` exactly once and that every fold has a non-empty
//! training subset disjoint from its test subset.

use crate::error::{EdgeregError, Result};
use rand::SeedableRng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};

/// A single train/test split.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvFold {
    train: Vec<usize>,
    test: Vec<usize>,
}

impl CvFold {
    pub fn new(train: Vec<usize>, test: Vec<usize>) -> Self {
        Self { train, test }
    }

    /// Sample indices the model is fitted on.
    pub fn train(&self) -> &[usize] {
        &self.train
    }

    /// Held-out sample indices the fit is scored on.
    pub fn test(&self) -> &[usize] {
        &self.test
    }
}

/// An immutable collection of folds over `n_samples` samples.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CvSet {
    n_samples: usize,
    folds: Vec<CvFold>,
}

impl CvSet {
    /// Contiguous k-fold split in sample order.
    ///
    /// Fold `i` tests on `[i * n / k, (i + 1) * n / k)` with the last fold
    /// absorbing the remainder.
    pub fn kfold(n_samples: usize, n_folds: usize) -> Result<Self> {
        check_fold_count(n_samples, n_folds)?;
        let fold_size = n_samples / n_folds;
        let folds = (0..n_folds)
            .map(|i| {
                let test_start = i * fold_size;
                let test_end = if i == n_folds - 1 {
                    n_samples
                } else {
                    (i + 1) * fold_size
                };
                let test: Vec<usize> = (test_start..test_end).collect();
                let train: Vec<usize> = (0..test_start).chain(test_end..n_samples).collect();
                CvFold::new(train, test)
            })
            .collect();
        Self::from_folds(n_samples, folds)
    }

    /// Seeded shuffle followed by round-robin assignment into `n_folds` folds.
    pub fn shuffled(n_samples: usize, n_folds: usize, seed: u64) -> Result<Self> {
        check_fold_count(n_samples, n_folds)?;
        let mut indices: Vec<usize> = (0..n_samples).collect();
        let mut rng = rand_chacha::ChaCha8Rng::seed_from_u64(seed);
        indices.shuffle(&mut rng);

        let mut fold_ids = vec![0usize; n_samples];
        for (position, &idx) in indices.iter().enumerate() {
            fold_ids[idx] = position % n_folds;
        }
        Self::from_fold_ids(&fold_ids)
    }

    /// Build folds from one fold id per sample; ids must cover `0..k` without gaps.
    pub fn from_fold_ids(fold_ids: &[usize]) -> Result<Self> {
        let n_samples = fold_ids.len();
        let n_folds = fold_ids.iter().max().map_or(0, |m| m + 1);
        check_fold_count(n_samples, n_folds)?;

        let mut tests: Vec<Vec<usize>> = vec![Vec::new(); n_folds];
        for (idx, &id) in fold_ids.iter().enumerate() {
            tests[id].push(idx);
        }
        if let Some(empty) = tests.iter().position(|t| t.is_empty()) {
            return Err(EdgeregError::InvalidCvSet(format!(
                "fold id {empty} is never used"
            )));
        }

        let folds = (0..n_folds)
            .map(|fold_idx| {
                let train: Vec<usize> = (0..n_samples)
                    .filter(|&i| fold_ids[i] != fold_idx)
                    .collect();
                CvFold::new(train, tests[fold_idx].clone())
            })
            .collect();
        Self::from_folds(n_samples, folds)
    }

    /// Build from explicit folds, validating the partition invariants.
    pub fn from_folds(n_samples: usize, folds: Vec<CvFold>) -> Result<Self> {
        check_fold_count(n_samples, folds.len())?;

        let mut tested = vec![false; n_samples];
        for (fold_idx, fold) in folds.iter().enumerate() {
            if fold.test.is_empty() || fold.train.is_empty() {
                return Err(EdgeregError::InvalidCvSet(format!(
                    "fold {fold_idx} has an empty train or test subset"
                )));
            }
            let mut in_test = vec![false; n_samples];
            for &i in &fold.test {
                if i >= n_samples {
                    return Err(out_of_range(fold_idx, i, n_samples));
                }
                if tested[i] {
                    return Err(EdgeregError::InvalidCvSet(format!(
                        "sample {i} is tested more than once"
                    )));
                }
                tested[i] = true;
                in_test[i] = true;
            }
            for &i in &fold.train {
                if i >= n_samples {
                    return Err(out_of_range(fold_idx, i, n_samples));
                }
                if in_test[i] {
                    return Err(EdgeregError::InvalidCvSet(format!(
                        "sample {i} is in both train and test of fold {fold_idx}"
                    )));
                }
            }
        }
        if let Some(untested) = tested.iter().position(|t| !t) {
            return Err(EdgeregError::InvalidCvSet(format!(
                "sample {untested} is never tested"
            )));
        }

        Ok(Self { n_samples, folds })
    }

    /// One in-sample fold: train and test are both every sample.
    pub fn resubstitution(n_samples: usize) -> Result<Self> {
        check_fold_count(n_samples, 1)?;
        let all: Vec<usize> = (0..n_samples).collect();
        Ok(Self {
            n_samples,
            folds: vec![CvFold::new(all.clone(), all)],
        })
    }

    pub fn fold_count(&self) -> usize {
        self.folds.len()
    }

    pub fn n_samples(&self) -> usize {
        self.n_samples
    }

    pub fn fold(&self, index: usize) -> Result<&CvFold> {
        self.folds.get(index).ok_or_else(|| {
            EdgeregError::InvalidCvSet(format!(
                "fold {index} requested but only {} exist",
                self.folds.len()
            ))
        })
    }

    pub fn folds(&self) -> &[CvFold] {
        &self.folds
    }
}

fn check_fold_count(n_samples: usize, n_folds: usize) -> Result<()> {
    if n_folds < 1 {
        return Err(EdgeregError::InvalidCvSet(
            "fold count must be at least 1".to_string(),
        ));
    }
    if n_folds > n_samples {
        return Err(EdgeregError::InvalidCvSet(format!(
            "fold count {n_folds} exceeds sample count {n_samples}"
        )));
    }
    Ok(())
}

fn out_of_range(fold_idx: usize, i: usize, n_samples: usize) -> EdgeregError {
    EdgeregError::InvalidCvSet(format!(
        "fold {fold_idx} references sample {i} but only {n_samples} exist"
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn assert_partition(cv: &CvSet) {
        let n = cv.n_samples();
        let mut seen = vec![0usize; n];
        for fold in cv.folds() {
            for &i in fold.test() {
                seen[i] += 1;
            }
            for &i in fold.train() {
                assert!(!fold.test().contains(&i));
            }
            assert_eq!(fold.train().len() + fold.test().len(), n);
        }
        assert!(seen.iter().all(|&c| c == 1));
    }

    #[test]
    fn test_kfold_contiguous() {
        let cv = CvSet::kfold(10, 3).unwrap();
        assert_eq!(cv.fold_count(), 3);
        assert_eq!(cv.fold(0).unwrap().test(), &[0, 1, 2]);
        assert_eq!(cv.fold(1).unwrap().test(), &[3, 4, 5]);
        assert_eq!(cv.fold(2).unwrap().test(), &[6, 7, 8, 9]);
        assert_eq!(cv.fold(1).unwrap().train(), &[0, 1, 2, 6, 7, 8, 9]);
        assert_partition(&cv);
    }

    #[test]
    fn test_fold_count_bounds() {
        assert!(matches!(
            CvSet::kfold(5, 0),
            Err(EdgeregError::InvalidCvSet(_))
        ));
        assert!(matches!(
            CvSet::kfold(3, 4),
            Err(EdgeregError::InvalidCvSet(_))
        ));
        // A single fold would leave an empty training subset.
        assert!(CvSet::kfold(4, 1).is_err());
    }

    #[test]
    fn test_shuffled_is_reproducible() {
        let a = CvSet::shuffled(20, 4, 7).unwrap();
        let b = CvSet::shuffled(20, 4, 7).unwrap();
        assert_eq!(a, b);
        assert_partition(&a);
        for fold in a.folds() {
            assert_eq!(fold.test().len(), 5);
        }
    }

    #[test]
    fn test_from_fold_ids() {
        let cv = CvSet::from_fold_ids(&[1, 0, 1, 0, 2]).unwrap();
        assert_eq!(cv.fold_count(), 3);
        assert_eq!(cv.fold(0).unwrap().test(), &[1, 3]);
        assert_eq!(cv.fold(1).unwrap().test(), &[0, 2]);
        assert_eq!(cv.fold(2).unwrap().train(), &[0, 1, 2, 3]);
        assert_partition(&cv);

        assert!(CvSet::from_fold_ids(&[0, 2, 0, 2]).is_err());
        assert!(CvSet::from_fold_ids(&[]).is_err());
    }

    #[test]
    fn test_from_folds_rejects_overlap() {
        let folds = vec![
            CvFold::new(vec![2, 3], vec![0, 1]),
            CvFold::new(vec![0, 3], vec![1, 2]),
        ];
        assert!(CvSet::from_folds(4, folds).is_err());
    }

    #[test]
    fn test_from_folds_rejects_untested_and_leaky() {
        let untested = vec![
            CvFold::new(vec![2, 3], vec![0]),
            CvFold::new(vec![0, 3], vec![1, 2]),
        ];
        assert!(CvSet::from_folds(4, untested).is_err());

        let leaky = vec![
            CvFold::new(vec![0, 2, 3], vec![0, 1]),
            CvFold::new(vec![0, 1], vec![2, 3]),
        ];
        assert!(CvSet::from_folds(4, leaky).is_err());

        let out_of_range = vec![
            CvFold::new(vec![2, 9], vec![0, 1]),
            CvFold::new(vec![0, 1], vec![2, 3]),
        ];
        assert!(CvSet::from_folds(4, out_of_range).is_err());
    }

    #[test]
    fn test_resubstitution() {
        let cv = CvSet::resubstitution(3).unwrap();
        assert_eq!(cv.fold_count(), 1);
        assert_eq!(cv.fold(0).unwrap().train(), cv.fold(0).unwrap().test());
        assert!(cv.fold(1).is_err());
        assert!(CvSet::resubstitution(0).is_err());
    }

    proptest! {
        #[test]
        fn prop_kfold_partitions(n in 2usize..60, k in 2usize..10) {
            prop_assume!(k <= n);
            let cv = CvSet::kfold(n, k).unwrap();
            prop_assert_eq!(cv.fold_count(), k);
            assert_partition(&cv);
        }

        #[test]
        fn prop_shuffled_partitions(n in 2usize..60, k in 2usize..10, seed in any::<u64>()) {
            prop_assume!(k <= n);
            let cv = CvSet::shuffled(n, k, seed).unwrap();
            prop_assert_eq!(cv.fold_count(), k);
            assert_partition(&cv);
        }
    }
}
