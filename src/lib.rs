pub use decision_tree::{DecisionTreeOptions, DecisionTreeRegressor};
pub use experiment::{run, ExperimentError, ExperimentOptions};
pub use pipeline::{FitError, FittedPipeline, Pipeline};
pub use poly::PolynomialFeatures;
pub use table::{FeatureTable, TableError};

pub mod experiment;
pub mod model_selection;
pub mod pipeline;
pub mod plot;
pub mod poly;
pub mod table;

mod decision_tree;
mod design;
mod functions;
