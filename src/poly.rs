use itertools::Itertools as _;

/// Expands feature columns into all monomial combinations up to a degree.
///
/// For two columns `[a, b]` and degree 2 the expansion (without bias) is
/// `[a, b, a^2, ab, b^2]`: monomials are emitted in ascending degree and,
/// within a degree, in lexicographic order of their column indices.
#[derive(Debug, Clone)]
pub struct PolynomialFeatures {
    degree: usize,
    include_bias: bool,
}

impl PolynomialFeatures {
    pub fn new(degree: usize) -> Self {
        Self {
            degree,
            include_bias: true,
        }
    }

    pub fn include_bias(mut self, include_bias: bool) -> Self {
        self.include_bias = include_bias;
        self
    }

    /// Number of output columns for `features` input columns.
    pub fn expanded_len(&self, features: usize) -> usize {
        let monomials: usize = (1..=self.degree)
            .map(|d| (0..features).combinations_with_replacement(d).count())
            .sum();
        monomials + usize::from(self.include_bias)
    }

    /// Expands the columns, producing one output column per monomial.
    pub fn transform(&self, features: &[&[f64]]) -> Vec<Vec<f64>> {
        let rows = features.first().map_or(0, |c| c.len());

        let mut expanded = Vec::with_capacity(self.expanded_len(features.len()));
        if self.include_bias {
            expanded.push(vec![1.0; rows]);
        }
        for degree in 1..=self.degree {
            for monomial in (0..features.len()).combinations_with_replacement(degree) {
                let column = (0..rows)
                    .map(|row| monomial.iter().map(|&i| features[i][row]).product::<f64>())
                    .collect();
                expanded.push(column);
            }
        }
        expanded
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn degree_two_without_bias() {
        let a = [1.0, 3.0];
        let b = [2.0, 4.0];
        let poly = PolynomialFeatures::new(2).include_bias(false);

        let expanded = poly.transform(&[&a, &b]);
        // [a, b, a^2, ab, b^2]
        assert_eq!(
            expanded,
            vec![
                vec![1.0, 3.0],
                vec![2.0, 4.0],
                vec![1.0, 9.0],
                vec![2.0, 12.0],
                vec![4.0, 16.0],
            ]
        );
    }

    #[test]
    fn bias_column_is_all_ones() {
        let a = [5.0, 6.0, 7.0];
        let poly = PolynomialFeatures::new(1);

        let expanded = poly.transform(&[&a]);
        assert_eq!(expanded, vec![vec![1.0, 1.0, 1.0], vec![5.0, 6.0, 7.0]]);
    }

    #[test]
    fn expanded_len_matches_transform() {
        let a = [1.0, 2.0];
        let b = [3.0, 4.0];
        for degree in 1..=15 {
            let poly = PolynomialFeatures::new(degree).include_bias(false);
            assert_eq!(poly.transform(&[&a, &b]).len(), poly.expanded_len(2));
        }
    }
}
