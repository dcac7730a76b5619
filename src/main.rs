use anyhow::ensure;
use overfit::plot::BitmapSurface;
use overfit::{ExperimentOptions, FeatureTable};
use serde::Deserialize;
use std::path::PathBuf;
use structopt::StructOpt;

#[derive(Debug, Deserialize)]
struct Column {
    name: String,
    data: Vec<f64>,
}

#[derive(Debug, StructOpt)]
struct Opt {
    /// Path of the rendered figure.
    #[structopt(long, default_value = "overfit.png")]
    output: PathBuf,

    /// Figure width in pixels.
    #[structopt(long, default_value = "1280")]
    width: u32,

    /// Figure height in pixels.
    #[structopt(long, default_value = "480")]
    height: u32,

    /// Seed for train/test partitioning and tree fitting.
    #[structopt(long)]
    seed: Option<u64>,

    /// Evaluate cross-validation folds in parallel.
    #[structopt(long)]
    parallel: bool,
}

fn main() -> anyhow::Result<()> {
    let opt = Opt::from_args();
    let columns: Vec<Column> = serde_json::from_reader(std::io::stdin().lock())?;
    ensure!(columns.len() > 1, "too few columns");

    // The last column is the target (prices), the rest are features.
    let (features, target) = columns.split_at(columns.len() - 1);
    let table = FeatureTable::new(
        features
            .iter()
            .map(|c| (c.name.as_str(), c.data.as_slice()))
            .collect(),
    )?;

    let mut options = ExperimentOptions::new().parallel(opt.parallel);
    if let Some(seed) = opt.seed {
        options = options.seed(seed);
    }

    let mut surface = BitmapSurface::new(opt.output, (opt.width, opt.height));
    options.run(&mut surface, &table, &target[0].data)?;

    Ok(())
}
