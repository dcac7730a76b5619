use crate::decision_tree::{DecisionTreeOptions, DecisionTreeRegressor};
use crate::design::{Design, DesignError};
use crate::poly::PolynomialFeatures;
use rand::rngs::StdRng;
use rand::SeedableRng as _;
use thiserror::Error;

/// A two-stage pipeline configuration: polynomial feature expansion
/// followed by a decision-tree regressor. Fitting produces a
/// [`FittedPipeline`]; the configuration itself stays reusable, so
/// cross-validation can refit it fold by fold.
#[derive(Debug, Clone)]
pub struct Pipeline {
    poly: PolynomialFeatures,
    tree: DecisionTreeOptions,
    seed: Option<u64>,
}

impl Pipeline {
    pub fn new(poly: PolynomialFeatures) -> Self {
        Self {
            poly,
            tree: DecisionTreeOptions::default(),
            seed: None,
        }
    }

    pub fn tree_options(mut self, options: DecisionTreeOptions) -> Self {
        self.tree = options;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn fit(&self, features: &[&[f64]], target: &[f64]) -> Result<FittedPipeline, FitError> {
        let expanded = self.poly.transform(features);
        let columns = expanded.iter().map(|c| c.as_slice()).collect();
        let design = Design::new(columns, target)?;

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let tree = DecisionTreeRegressor::fit(&mut rng, design, self.tree.clone());
        Ok(FittedPipeline {
            poly: self.poly.clone(),
            tree,
        })
    }
}

#[derive(Debug)]
pub struct FittedPipeline {
    poly: PolynomialFeatures,
    tree: DecisionTreeRegressor,
}

impl FittedPipeline {
    pub fn predict(&self, features: &[&[f64]]) -> Vec<f64> {
        let expanded = self.poly.transform(features);
        let rows = expanded.first().map_or(0, |c| c.len());
        (0..rows)
            .map(|row| {
                let xs = expanded.iter().map(|c| c[row]).collect::<Vec<_>>();
                self.tree.predict(&xs)
            })
            .collect()
    }
}

#[derive(Debug, Error, Clone)]
pub enum FitError {
    #[error("features and target must have one or more rows")]
    EmptyRows,

    #[error("some of features or target have a different row count from others")]
    RowSizeMismatch,

    #[error("target contains non finite numbers")]
    NonFiniteTarget,
}

impl From<DesignError> for FitError {
    fn from(e: DesignError) -> Self {
        match e {
            DesignError::EmptyDesign => Self::EmptyRows,
            DesignError::RowSizeMismatch => Self::RowSizeMismatch,
            DesignError::NonFiniteTarget => Self::NonFiniteTarget,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fitted_pipeline_memorizes_training_rows() -> Result<(), anyhow::Error> {
        let a = (0..30).map(|i| 1.0 + i as f64 * 0.3).collect::<Vec<_>>();
        let b = (0..30).map(|i| 9.0 - i as f64 * 0.2).collect::<Vec<_>>();
        let target = a
            .iter()
            .zip(b.iter())
            .map(|(x, y)| 2.0 * x - y)
            .collect::<Vec<_>>();

        let pipeline = Pipeline::new(PolynomialFeatures::new(4).include_bias(false)).seed(0);
        let fitted = pipeline.fit(&[&a, &b], &target)?;

        let predicted = fitted.predict(&[&a, &b]);
        for (p, y) in predicted.iter().zip(target.iter()) {
            assert!((p - y).abs() < 1e-9);
        }
        Ok(())
    }

    #[test]
    fn mismatched_rows_are_rejected() {
        let a = [1.0, 2.0, 3.0];
        let target = [1.0, 2.0];
        let pipeline = Pipeline::new(PolynomialFeatures::new(1).include_bias(false));
        assert!(matches!(
            pipeline.fit(&[&a], &target).err(),
            Some(FitError::RowSizeMismatch)
        ));
    }
}
