//! Random train/test partitioning of a raw dataset

use thiserror::Error;

use crate::dataset::RawDataset;
use crate::deterministic::permutation;

/// Float noise tolerated before rounding the test size up,
/// so that `(1 - 0.7) * 10` yields 3 rows and not 4.
const SIZE_EPSILON: f64 = 1e-9;

#[derive(Debug, Error, PartialEq)]
pub enum SplitError {
    #[error("train ratio must be in (0, 1), got {0}")]
    InvalidRatio(f64),

    #[error("splitting {rows} rows gives {train} train and {test} test rows; both must be non-empty")]
    EmptySubset { rows: usize, train: usize, test: usize },
}

/// Two disjoint, exhaustive subsets of a dataset
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SplitResult {
    pub train: RawDataset,
    pub test: RawDataset,
}

/// Number of test rows: `ceil((1 - train_ratio) * rows)`.
pub fn test_size(rows: usize, train_ratio: f64) -> usize {
    let exact = (1.0 - train_ratio) * rows as f64;
    let rounded = (exact - SIZE_EPSILON).ceil().max(0.0) as usize;
    rounded.min(rows)
}

/// Shuffle row positions with `seed` and cut the permutation: the first
/// `test_size` positions go to test, the rest to train.
pub fn train_test_split(
    dataset: &RawDataset,
    train_ratio: f64,
    seed: u64,
) -> Result<SplitResult, SplitError> {
    if !(train_ratio > 0.0 && train_ratio < 1.0) {
        return Err(SplitError::InvalidRatio(train_ratio));
    }

    let rows = dataset.len();
    let n_test = test_size(rows, train_ratio);
    let n_train = rows - n_test;
    if n_train == 0 || n_test == 0 {
        return Err(SplitError::EmptySubset {
            rows,
            train: n_train,
            test: n_test,
        });
    }

    let order = permutation(rows, seed);
    let (test_idx, train_idx) = order.split_at(n_test);

    Ok(SplitResult {
        train: dataset.select(train_idx),
        test: dataset.select(test_idx),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::deterministic::SPLIT_SEED;
    use csv::StringRecord;
    use std::collections::HashSet;

    fn numbered(rows: usize) -> RawDataset {
        RawDataset::new(
            StringRecord::from(vec!["row", "value"]),
            (0..rows)
                .map(|i| StringRecord::from(vec![i.to_string(), (i * 10).to_string()]))
                .collect(),
        )
    }

    fn row_ids(dataset: &RawDataset) -> HashSet<String> {
        dataset.rows.iter().map(|r| r[0].to_string()).collect()
    }

    #[test]
    fn test_size_rounding() {
        assert_eq!(test_size(100, 0.8), 20);
        assert_eq!(test_size(10, 0.7), 3);
        assert_eq!(test_size(7, 0.8), 2);
        assert_eq!(test_size(3, 0.5), 2);
        assert_eq!(test_size(0, 0.8), 0);
    }

    #[test]
    fn test_split_80_20() {
        let dataset = numbered(100);
        let split = train_test_split(&dataset, 0.8, SPLIT_SEED).unwrap();

        assert_eq!(split.train.len(), 80);
        assert_eq!(split.test.len(), 20);
        assert_eq!(split.train.headers, dataset.headers);
        assert_eq!(split.test.headers, dataset.headers);
    }

    #[test]
    fn test_split_is_disjoint_and_exhaustive() {
        let dataset = numbered(257);
        let split = train_test_split(&dataset, 0.75, SPLIT_SEED).unwrap();

        let train = row_ids(&split.train);
        let test = row_ids(&split.test);
        assert!(train.is_disjoint(&test));
        assert_eq!(train.len() + test.len(), 257);
        assert_eq!(train.union(&test).count(), 257);
    }

    #[test]
    fn test_split_is_not_positional() {
        let dataset = numbered(100);
        let split = train_test_split(&dataset, 0.8, SPLIT_SEED).unwrap();
        assert_ne!(split.train.rows, dataset.rows[..80].to_vec());
        assert_ne!(split.test.rows, dataset.rows[80..].to_vec());
    }

    #[test]
    fn test_split_determinism() {
        let dataset = numbered(64);
        let first = train_test_split(&dataset, 0.8, SPLIT_SEED).unwrap();
        let second = train_test_split(&dataset, 0.8, SPLIT_SEED).unwrap();
        assert_eq!(first, second);
    }

    #[test]
    fn test_ratio_within_one_row() {
        for rows in [10, 33, 99, 1000] {
            for ratio in [0.6, 0.7, 0.8, 0.9] {
                let split = train_test_split(&numbered(rows), ratio, SPLIT_SEED).unwrap();
                let expected = ratio * rows as f64;
                assert!((split.train.len() as f64 - expected).abs() <= 1.0);
            }
        }
    }

    #[test]
    fn test_rejects_bad_ratio() {
        let dataset = numbered(10);
        assert_eq!(
            train_test_split(&dataset, 1.0, SPLIT_SEED).unwrap_err(),
            SplitError::InvalidRatio(1.0)
        );
        assert!(train_test_split(&dataset, 0.0, SPLIT_SEED).is_err());
    }

    #[test]
    fn test_rejects_empty_subset() {
        assert_eq!(
            train_test_split(&numbered(1), 0.8, SPLIT_SEED).unwrap_err(),
            SplitError::EmptySubset { rows: 1, train: 0, test: 1 }
        );
        assert!(train_test_split(&numbered(0), 0.8, SPLIT_SEED).is_err());
    }
}
