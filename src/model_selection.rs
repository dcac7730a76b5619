use crate::functions;
use crate::pipeline::{FitError, Pipeline};
use rand::seq::SliceRandom as _;
use rand::Rng;
use rayon::iter::{IntoParallelIterator, ParallelIterator};
use std::num::NonZeroUsize;
use std::ops::Range;
use thiserror::Error;

/// Result of a randomized train/test partition, column-major.
#[derive(Debug)]
pub struct TrainTestSplit {
    pub x_train: Vec<Vec<f64>>,
    pub x_test: Vec<Vec<f64>>,
    pub y_train: Vec<f64>,
    pub y_test: Vec<f64>,
}

/// Randomly partitions rows into train and test sets. The test partition
/// holds `ceil(rows * test_fraction)` rows.
pub fn train_test_split<R: Rng + ?Sized>(
    rng: &mut R,
    features: &[&[f64]],
    target: &[f64],
    test_fraction: f64,
) -> Result<TrainTestSplit, SplitError> {
    if target.is_empty() {
        return Err(SplitError::EmptyRows);
    }
    if features.iter().any(|c| c.len() != target.len()) {
        return Err(SplitError::RowSizeMismatch);
    }
    if !(0.0..1.0).contains(&test_fraction) || test_fraction == 0.0 {
        return Err(SplitError::InvalidTestFraction(test_fraction));
    }

    let rows = target.len();
    let test_len = (rows as f64 * test_fraction).ceil() as usize;
    if test_len >= rows {
        return Err(SplitError::DegenerateSplit(test_fraction));
    }

    let mut indices = (0..rows).collect::<Vec<_>>();
    indices.shuffle(rng);
    let (test_index, train_index) = indices.split_at(test_len);

    Ok(TrainTestSplit {
        x_train: gather_columns(features, train_index),
        x_test: gather_columns(features, test_index),
        y_train: train_index.iter().map(|&i| target[i]).collect(),
        y_test: test_index.iter().map(|&i| target[i]).collect(),
    })
}

fn gather_columns(features: &[&[f64]], index: &[usize]) -> Vec<Vec<f64>> {
    features
        .iter()
        .map(|column| index.iter().map(|&i| column[i]).collect())
        .collect()
}

#[derive(Debug, Error, Clone)]
pub enum SplitError {
    #[error("features and target must have one or more rows")]
    EmptyRows,

    #[error("some of features or target have a different row count from others")]
    RowSizeMismatch,

    #[error("test fraction must be within (0, 1), got {0}")]
    InvalidTestFraction(f64),

    #[error("test fraction {0} leaves an empty train partition")]
    DegenerateSplit(f64),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scoring {
    NegMeanSquaredError,
}

#[derive(Debug, Clone)]
pub struct CrossValidationOptions {
    folds: NonZeroUsize,
    scoring: Scoring,
    parallel: bool,
}

impl CrossValidationOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn folds(mut self, folds: NonZeroUsize) -> Self {
        self.folds = folds;
        self
    }

    pub fn scoring(mut self, scoring: Scoring) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }
}

impl Default for CrossValidationOptions {
    fn default() -> Self {
        Self {
            folds: NonZeroUsize::new(10).expect("never fails"),
            scoring: Scoring::NegMeanSquaredError,
            parallel: false,
        }
    }
}

/// Scores the pipeline with k-fold cross-validation, one score per fold.
///
/// Folds are contiguous row ranges; the first `rows % folds` folds hold
/// one extra row. Each fold refits the pipeline on the remaining rows and
/// scores its predictions on the held-out rows.
pub fn cross_val_score(
    pipeline: &Pipeline,
    features: &[&[f64]],
    target: &[f64],
    options: &CrossValidationOptions,
) -> Result<Vec<f64>, CrossValidationError> {
    let rows = target.len();
    let folds = options.folds.get();
    if rows < folds {
        return Err(CrossValidationError::TooFewRows { rows, folds });
    }

    let ranges = fold_ranges(rows, folds);
    if options.parallel {
        ranges
            .into_par_iter()
            .map(|range| eval_fold(pipeline, features, target, range, options.scoring))
            .collect()
    } else {
        ranges
            .into_iter()
            .map(|range| eval_fold(pipeline, features, target, range, options.scoring))
            .collect()
    }
}

fn fold_ranges(rows: usize, folds: usize) -> Vec<Range<usize>> {
    let base = rows / folds;
    let remainder = rows % folds;
    let mut start = 0;
    (0..folds)
        .map(|i| {
            let len = base + usize::from(i < remainder);
            let range = start..start + len;
            start += len;
            range
        })
        .collect()
}

fn eval_fold(
    pipeline: &Pipeline,
    features: &[&[f64]],
    target: &[f64],
    test: Range<usize>,
    scoring: Scoring,
) -> Result<f64, CrossValidationError> {
    let train_columns = features
        .iter()
        .map(|c| {
            c[..test.start]
                .iter()
                .chain(c[test.end..].iter())
                .copied()
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    let train_target = target[..test.start]
        .iter()
        .chain(target[test.end..].iter())
        .copied()
        .collect::<Vec<_>>();

    let train_refs = train_columns.iter().map(|c| c.as_slice()).collect::<Vec<_>>();
    let fitted = pipeline.fit(&train_refs, &train_target)?;

    let test_columns = features
        .iter()
        .map(|c| &c[test.clone()])
        .collect::<Vec<_>>();
    let predicted = fitted.predict(&test_columns);

    Ok(match scoring {
        Scoring::NegMeanSquaredError => -functions::mean(
            predicted
                .iter()
                .zip(target[test].iter())
                .map(|(p, y)| (p - y).powi(2)),
        ),
    })
}

#[derive(Debug, Error, Clone)]
pub enum CrossValidationError {
    #[error("cannot cross-validate {rows} rows with {folds} folds")]
    TooFewRows { rows: usize, folds: usize },

    #[error("pipeline fitting failed: {0}")]
    Fit(#[from] FitError),
}
