use crate::functions;
use crate::model_selection::{
    cross_val_score, train_test_split, CrossValidationError, CrossValidationOptions, SplitError,
};
use crate::pipeline::{FitError, Pipeline};
use crate::plot::{PlotError, PlotSurface};
use crate::poly::PolynomialFeatures;
use crate::table::{FeatureTable, TableError};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use thiserror::Error;

const DEGREES: [usize; 3] = [1, 4, 15];
const FOLDS: usize = 10;

/// Column subset fitted at each polynomial degree. The subsets differ per
/// degree on purpose; keep the mapping as-is.
fn feature_subset(degree: usize) -> &'static [&'static str] {
    match degree {
        1 => &["RM", "LSTAT", "PTRATIO"],
        4 => &["RM", "PTRATIO"],
        _ => &["PTRATIO", "LSTAT"],
    }
}

#[derive(Debug, Clone)]
pub struct ExperimentOptions {
    seed: Option<u64>,
    parallel: bool,
}

impl ExperimentOptions {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds train/test partitioning and tree fitting for reproducible runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    /// Evaluates cross-validation folds in parallel.
    pub fn parallel(mut self, enabled: bool) -> Self {
        self.parallel = enabled;
        self
    }

    /// Fits one pipeline per degree in {1, 4, 15} and draws one subplot per
    /// degree on `surface`: the predicted curve over a random test
    /// partition (test fraction = degree x 0.05), a scatter of every
    /// selected raw column against `prices`, and a title carrying 10-fold
    /// cross-validated MSE statistics. Renders the figure at the end.
    pub fn run(
        &self,
        surface: &mut dyn PlotSurface,
        table: &FeatureTable,
        prices: &[f64],
    ) -> Result<(), ExperimentError> {
        if prices.len() != table.rows_len() {
            return Err(TableError::RowSizeMismatch.into());
        }

        let mut rng = match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };
        let cv = CrossValidationOptions::new()
            .folds(std::num::NonZeroUsize::new(FOLDS).expect("never fails"))
            .parallel(self.parallel);

        for (i, &degree) in DEGREES.iter().enumerate() {
            let columns = table.select(feature_subset(degree))?;

            surface.subplot(1, DEGREES.len(), i + 1);
            surface.clear_ticks();

            let pipeline = Pipeline::new(PolynomialFeatures::new(degree).include_bias(false))
                .seed(rng.gen());
            let fitted = pipeline.fit(&columns, prices)?;

            let split = train_test_split(&mut rng, &columns, prices, degree as f64 * 0.05)?;
            let scores = cross_val_score(&pipeline, &columns, prices, &cv)?;

            let x_test = split.x_test.iter().map(|c| c.as_slice()).collect::<Vec<_>>();
            let predicted = fitted.predict(&x_test);
            surface.plot(&split.x_test[0], &predicted, "Model");

            for column in &columns {
                surface.scatter(column, prices, "b", 20.0, "Samples");
            }
            surface.xlabel("features");
            surface.ylabel("prices");
            surface.legend();
            surface.title(&panel_title(degree, &scores));
        }
        surface.show()?;
        Ok(())
    }
}

impl Default for ExperimentOptions {
    fn default() -> Self {
        Self {
            seed: None,
            parallel: false,
        }
    }
}

/// Runs the experiment with default options.
pub fn run(
    surface: &mut dyn PlotSurface,
    table: &FeatureTable,
    prices: &[f64],
) -> Result<(), ExperimentError> {
    ExperimentOptions::default().run(surface, table, prices)
}

fn panel_title(degree: usize, scores: &[f64]) -> String {
    let (mean, stddev) = functions::mean_and_stddev(scores.iter().copied());
    format!(
        "Degree {}\nMSE = {}(+/- {})",
        degree,
        functions::format_exp(-mean, 2),
        functions::format_exp(stddev, 2)
    )
}

#[derive(Debug, Error)]
pub enum ExperimentError {
    #[error("feature table is invalid: {0}")]
    Table(#[from] TableError),

    #[error("pipeline fitting failed: {0}")]
    Fit(#[from] FitError),

    #[error("train/test split failed: {0}")]
    Split(#[from] SplitError),

    #[error("cross-validation failed: {0}")]
    CrossValidation(#[from] CrossValidationError),

    #[error("plotting failed: {0}")]
    Plot(#[from] PlotError),
}
