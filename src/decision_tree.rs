use crate::design::Design;
use crate::functions;
use rand::seq::SliceRandom as _;
use rand::Rng;

#[derive(Debug, Clone, Default)]
pub struct DecisionTreeOptions {
    /// Number of candidate columns considered at each split.
    /// `None` means all columns.
    pub max_features: Option<usize>,
}

/// An unpruned regression tree grown until the leaves are pure, splitting
/// on the threshold with the largest variance reduction.
#[derive(Debug)]
pub struct DecisionTreeRegressor {
    root: Node,
}

impl DecisionTreeRegressor {
    pub fn fit<R: Rng + ?Sized>(
        rng: &mut R,
        mut design: Design,
        options: DecisionTreeOptions,
    ) -> Self {
        let mut builder = NodeBuilder { rng, options };
        let root = builder.build(&mut design);
        Self { root }
    }

    pub fn predict(&self, xs: &[f64]) -> f64 {
        self.root.predict(xs)
    }
}

#[derive(Debug)]
struct Node {
    label: f64,
    children: Option<Children>,
}

impl Node {
    fn new(label: f64) -> Self {
        Self {
            label,
            children: None,
        }
    }

    fn predict(&self, xs: &[f64]) -> f64 {
        if let Some(children) = &self.children {
            if xs[children.split.feature] <= children.split.threshold {
                children.left.predict(xs)
            } else {
                children.right.predict(xs)
            }
        } else {
            self.label
        }
    }
}

#[derive(Debug)]
struct Children {
    split: SplitPoint,
    left: Box<Node>,
    right: Box<Node>,
}

#[derive(Debug)]
struct SplitPoint {
    information_gain: f64,
    feature: usize,
    threshold: f64,
}

#[derive(Debug)]
struct NodeBuilder<R> {
    rng: R,
    options: DecisionTreeOptions,
}

impl<R: Rng> NodeBuilder<R> {
    fn build(&mut self, design: &mut Design) -> Node {
        if design.is_single_target() {
            let label = design.target().next().expect("never fails");
            return Node::new(label);
        }

        let mut node = Node::new(functions::mean(design.target()));
        let impurity = functions::mse(design.target());
        let rows = design.rows_len();

        let max_features = self
            .options
            .max_features
            .unwrap_or_else(|| design.features_len());
        let candidates = (0..design.features_len())
            .filter(|&i| !design.feature(i).any(|x| x.is_nan()))
            .collect::<Vec<_>>();

        let mut best: Option<SplitPoint> = None;
        for &feature in candidates
            .choose_multiple(&mut self.rng, std::cmp::min(candidates.len(), max_features))
        {
            design.sort_rows_by_feature(feature);
            for (row, threshold) in design.thresholds(feature) {
                let impurity_l = functions::mse(design.target().take(row));
                let impurity_r = functions::mse(design.target().skip(row));
                let n_l = row as f64 / rows as f64;
                let n_r = 1.0 - n_l;

                let information_gain = impurity - (n_l * impurity_l + n_r * impurity_r);
                if best
                    .as_ref()
                    .map_or(true, |t| t.information_gain < information_gain)
                {
                    best = Some(SplitPoint {
                        information_gain,
                        feature,
                        threshold,
                    });
                }
            }
        }

        if let Some(split) = best {
            node.children = Some(self.build_children(design, split));
        }
        node
    }

    fn build_children(&mut self, design: &mut Design, split: SplitPoint) -> Children {
        design.sort_rows_by_feature(split.feature);
        let row = design
            .feature(split.feature)
            .take_while(|&x| x <= split.threshold)
            .count();
        let (left, right) = design.with_split(row, |design| Box::new(self.build(design)));
        Children { split, left, right }
    }
}
