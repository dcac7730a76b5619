use ordered_float::OrderedFloat;
use std::ops::Range;
use thiserror::Error;

/// Row-indexed view over expanded feature columns and the target.
///
/// Rows are addressed through a permutation (`row_index`) restricted to
/// `row_range`, so the tree builder can sort and split rows without
/// copying column data.
#[derive(Debug, Clone)]
pub struct Design<'a> {
    row_index: Vec<usize>,
    row_range: Range<usize>,
    features: Vec<&'a [f64]>,
    target: &'a [f64],
}

impl<'a> Design<'a> {
    pub fn new(features: Vec<&'a [f64]>, target: &'a [f64]) -> Result<Self, DesignError> {
        if features.is_empty() || target.is_empty() {
            return Err(DesignError::EmptyDesign);
        }

        if features.iter().any(|c| c.len() != target.len()) {
            return Err(DesignError::RowSizeMismatch);
        }

        if target.iter().any(|t| !t.is_finite()) {
            return Err(DesignError::NonFiniteTarget);
        }

        Ok(Self {
            row_index: (0..target.len()).collect(),
            row_range: Range {
                start: 0,
                end: target.len(),
            },
            features,
            target,
        })
    }

    pub fn features_len(&self) -> usize {
        self.features.len()
    }

    pub fn rows_len(&self) -> usize {
        self.row_range.end - self.row_range.start
    }

    fn rows(&self) -> impl '_ + Iterator<Item = usize> + Clone {
        self.row_index[self.row_range.start..self.row_range.end]
            .iter()
            .copied()
    }

    pub fn feature(&self, index: usize) -> impl '_ + Iterator<Item = f64> + Clone {
        let column = self.features[index];
        self.rows().map(move |i| column[i])
    }

    pub fn target(&self) -> impl '_ + Iterator<Item = f64> + Clone {
        self.rows().map(move |i| self.target[i])
    }

    pub fn is_single_target(&self) -> bool {
        let mut ys = self.target();
        ys.next().map_or(true, |first| ys.all(|y| y == first))
    }

    pub fn sort_rows_by_feature(&mut self, index: usize) {
        let column = self.features[index];
        self.row_index[self.row_range.start..self.row_range.end]
            .sort_by_key(|&i| OrderedFloat(column[i]));
    }

    pub fn thresholds(&self, index: usize) -> impl '_ + Iterator<Item = (usize, f64)> {
        // Assumption: the rows have been sorted by `index`.
        let column = self.features[index];
        self.rows()
            .map(move |i| column[i])
            .enumerate()
            .scan(None, |prev, (i, x)| {
                if prev.is_none() {
                    *prev = Some(x);
                    Some(None)
                } else if *prev != Some(x) {
                    let y = prev.expect("never fails");
                    *prev = Some(x);
                    Some(Some((i, (x + y) / 2.0)))
                } else {
                    Some(None)
                }
            })
            .flatten()
    }

    pub fn with_split<F, T>(&mut self, row: usize, mut f: F) -> (T, T)
    where
        F: FnMut(&mut Self) -> T,
    {
        let row = row + self.row_range.start;
        let original = self.row_range.clone();

        self.row_range.end = row;
        let left = f(self);
        self.row_range.end = original.end;

        self.row_range.start = row;
        let right = f(self);
        self.row_range.start = original.start;

        (left, right)
    }
}

#[derive(Debug, Error, Clone)]
pub enum DesignError {
    #[error("features and target must have one or more rows")]
    EmptyDesign,

    #[error("some of features or target have a different row count from others")]
    RowSizeMismatch,

    #[error("target contains non finite numbers")]
    NonFiniteTarget,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn thresholds_are_midpoints_between_distinct_values() -> Result<(), anyhow::Error> {
        let xs = [3.0, 1.0, 2.0, 2.0];
        let ys = [0.0, 1.0, 2.0, 3.0];
        let mut design = Design::new(vec![&xs[..]], &ys)?;

        design.sort_rows_by_feature(0);
        let thresholds = design.thresholds(0).collect::<Vec<_>>();
        assert_eq!(thresholds, vec![(1, 1.5), (3, 2.5)]);
        Ok(())
    }

    #[test]
    fn with_split_restores_the_original_range() -> Result<(), anyhow::Error> {
        let xs = [1.0, 2.0, 3.0, 4.0];
        let ys = [10.0, 20.0, 30.0, 40.0];
        let mut design = Design::new(vec![&xs[..]], &ys)?;

        design.sort_rows_by_feature(0);
        let (left, right) = design.with_split(1, |d| d.target().collect::<Vec<_>>());
        assert_eq!(left, vec![10.0]);
        assert_eq!(right, vec![20.0, 30.0, 40.0]);
        assert_eq!(design.rows_len(), 4);
        Ok(())
    }

    #[test]
    fn non_finite_target_is_rejected() {
        let xs = [1.0, 2.0];
        let ys = [1.0, f64::NAN];
        assert!(matches!(
            Design::new(vec![&xs[..]], &ys).err(),
            Some(DesignError::NonFiniteTarget)
        ));
    }
}
