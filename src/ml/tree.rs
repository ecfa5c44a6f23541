use rand::seq::index;
use rand_chacha::ChaCha8Rng;

/// Splits must lower the weighted impurity by more than this.
const MIN_IMPURITY_DECREASE: f64 = 1e-12;

#[derive(Debug, Clone, Copy)]
pub struct TreeParams {
    pub max_depth: usize,
    pub min_samples_split: usize,
    pub max_features: usize,
}

#[derive(Debug, Clone)]
enum Node {
    Leaf {
        distribution: Vec<f64>,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: usize,
        right: usize,
    },
}

/// CART classification tree on weighted samples, Gini criterion.
#[derive(Debug, Clone)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

struct Builder<'a> {
    x: &'a [Vec<f64>],
    y: &'a [usize],
    weights: &'a [f64],
    n_classes: usize,
    params: TreeParams,
    nodes: Vec<Node>,
}

struct BestSplit {
    feature: usize,
    threshold: f64,
    impurity: f64,
}

fn gini(distribution: &[f64], total: f64) -> f64 {
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - distribution
        .iter()
        .map(|w| (w / total).powi(2))
        .sum::<f64>()
}

impl DecisionTree {
    /// Grows a tree over the samples with a positive weight.
    ///
    /// `y` holds class indices in `0..n_classes`; `weights` is per sample and
    /// already includes bootstrap multiplicity and class weighting.
    pub fn fit(
        x: &[Vec<f64>],
        y: &[usize],
        weights: &[f64],
        n_classes: usize,
        params: TreeParams,
        rng: &mut ChaCha8Rng,
    ) -> Self {
        let samples: Vec<usize> = (0..y.len()).filter(|&i| weights[i] > 0.0).collect();
        let mut builder = Builder {
            x,
            y,
            weights,
            n_classes,
            params,
            nodes: Vec::new(),
        };
        builder.grow(samples, 0, rng);
        Self {
            nodes: builder.nodes,
        }
    }

    /// Class distribution of the leaf `row` falls into.
    pub fn predict_proba_row(&self, row: &[f64]) -> &[f64] {
        let mut current = 0;
        loop {
            match &self.nodes[current] {
                Node::Leaf { distribution } => return distribution,
                Node::Split {
                    feature,
                    threshold,
                    left,
                    right,
                } => {
                    current = if row[*feature] <= *threshold {
                        *left
                    } else {
                        *right
                    };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    pub fn depth(&self) -> usize {
        fn walk(nodes: &[Node], at: usize) -> usize {
            match &nodes[at] {
                Node::Leaf { .. } => 0,
                Node::Split { left, right, .. } => {
                    1 + walk(nodes, *left).max(walk(nodes, *right))
                }
            }
        }
        if self.nodes.is_empty() {
            0
        } else {
            walk(&self.nodes, 0)
        }
    }
}

impl Builder<'_> {
    fn distribution(&self, samples: &[usize]) -> (Vec<f64>, f64) {
        let mut dist = vec![0.0; self.n_classes];
        for &i in samples {
            dist[self.y[i]] += self.weights[i];
        }
        let total = dist.iter().sum();
        (dist, total)
    }

    fn leaf(&mut self, mut distribution: Vec<f64>, total: f64) -> usize {
        if total > 0.0 {
            distribution.iter_mut().for_each(|w| *w /= total);
        }
        self.nodes.push(Node::Leaf { distribution });
        self.nodes.len() - 1
    }

    fn grow(&mut self, samples: Vec<usize>, depth: usize, rng: &mut ChaCha8Rng) -> usize {
        let (distribution, total) = self.distribution(&samples);
        let impurity = gini(&distribution, total);

        if depth >= self.params.max_depth
            || samples.len() < self.params.min_samples_split
            || impurity <= 0.0
        {
            return self.leaf(distribution, total);
        }

        let split = match self.best_split(&samples, total, rng) {
            Some(split) if split.impurity < impurity - MIN_IMPURITY_DECREASE => split,
            _ => return self.leaf(distribution, total),
        };

        let (left_samples, right_samples): (Vec<usize>, Vec<usize>) = samples
            .into_iter()
            .partition(|&i| self.x[i][split.feature] <= split.threshold);

        // reserve the slot so children are appended after their parent
        let at = self.nodes.len();
        self.nodes.push(Node::Leaf {
            distribution: Vec::new(),
        });
        let left = self.grow(left_samples, depth + 1, rng);
        let right = self.grow(right_samples, depth + 1, rng);
        self.nodes[at] = Node::Split {
            feature: split.feature,
            threshold: split.threshold,
            left,
            right,
        };
        at
    }

    fn best_split(&self, samples: &[usize], total: f64, rng: &mut ChaCha8Rng) -> Option<BestSplit> {
        let width = self.x[samples[0]].len();
        let candidates = index::sample(rng, width, self.params.max_features.min(width));

        let mut best: Option<BestSplit> = None;
        let mut order = samples.to_vec();

        for feature in candidates.iter() {
            order.sort_by(|&a, &b| self.x[a][feature].total_cmp(&self.x[b][feature]));

            let mut left = vec![0.0; self.n_classes];
            let mut left_total = 0.0;
            let (mut right, _) = self.distribution(&order);
            let mut right_total = total;

            for pair in order.windows(2) {
                let (i, next) = (pair[0], pair[1]);
                let w = self.weights[i];
                left[self.y[i]] += w;
                right[self.y[i]] -= w;
                left_total += w;
                right_total -= w;

                let value = self.x[i][feature];
                let next_value = self.x[next][feature];
                if next_value <= value {
                    continue;
                }

                let impurity = (left_total * gini(&left, left_total)
                    + right_total * gini(&right, right_total))
                    / total;

                if best.as_ref().map_or(true, |b| impurity < b.impurity) {
                    best = Some(BestSplit {
                        feature,
                        threshold: value + (next_value - value) / 2.0,
                        impurity,
                    });
                }
            }
        }

        best
    }
}
