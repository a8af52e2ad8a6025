// ============================================================
// Layer 5 - Decision Tree (Gini, sparse input)
// ============================================================
// One tree of the random forest. Grown to full depth by default:
// a node becomes a leaf only when
//   - it is pure (Gini impurity 0), or
//   - it has fewer than `min_samples_split` samples, or
//   - it cannot be split so both sides keep `min_samples_leaf`, or
//   - no sampled feature separates its samples, or
//   - `max_depth` is reached (unbounded by default).
//
// Split search at a node:
//   1. Gather the non-zero values of every feature present in the
//      node's rows. Features absent from all of them are constant
//      zero there and can never split.
//   2. Visit those features in random order until `max_features`
//      non-constant ones have been evaluated.
//   3. For each, sort the values (the implicit zeros form one block)
//      and sweep the thresholds halfway between distinct neighbours,
//      keeping the one with the lowest weighted Gini impurity.
//
// Samples carry weights (bootstrap draw counts). Weighted class
// totals drive impurity, while leaf-size limits count distinct rows.
//
// Nodes live in a flat arena (Vec<Node>) and the tree is grown
// with an explicit stack, so deep trees never recurse.

use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::ml::sparse::CsrMatrix;

/// Values closer than this are treated as equal when placing thresholds
const FEATURE_THRESHOLD: f64 = 1e-7;

/// Impurity at or below this makes a node a leaf
const IMPURITY_EPSILON: f64 = 1e-12;

/// How many features each split may consider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MaxFeatures {
    /// floor(sqrt(n_features)), at least 1
    Sqrt,
    /// every feature
    All,
}

impl MaxFeatures {
    pub fn resolve(self, n_features: usize) -> usize {
        match self {
            MaxFeatures::Sqrt => ((n_features as f64).sqrt() as usize).max(1),
            MaxFeatures::All  => n_features.max(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TreeParams {
    pub min_samples_split: usize,
    pub min_samples_leaf:  usize,
    pub max_depth:         Option<usize>,
    pub max_features:      MaxFeatures,
}

impl Default for TreeParams {
    fn default() -> Self {
        Self {
            min_samples_split: 2,
            min_samples_leaf:  1,
            max_depth:         None,
            max_features:      MaxFeatures::Sqrt,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
enum Node {
    Split { feature: u32, threshold: f64, left: usize, right: usize },
    Leaf  { proba: Vec<f64> },
}

/// A fitted classification tree over class indices `0..n_classes`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionTree {
    nodes: Vec<Node>,
}

/// Best threshold found for one feature
#[derive(Debug, Clone, Copy)]
struct Split {
    feature:   u32,
    threshold: f64,
    /// Σ_children (Σ_c w_c²) / W; larger means lower weighted Gini
    proxy:     f64,
}

enum FeatureScan {
    /// every node sample has the same value
    Constant,
    /// feature varies; `None` when no threshold respects min_samples_leaf
    Evaluated(Option<Split>),
}

impl DecisionTree {
    /// Grow a tree.
    ///
    /// `y[i]` is the class index of row `i`, `weights[i]` how many times
    /// it was drawn; rows with weight 0 are left out.
    pub fn fit<R: Rng + ?Sized>(
        x:         &CsrMatrix,
        y:         &[usize],
        weights:   &[f64],
        n_classes: usize,
        params:    &TreeParams,
        rng:       &mut R,
    ) -> Self {
        let max_features = params.max_features.resolve(x.n_cols());
        let min_leaf     = params.min_samples_leaf.max(1);

        let root_rows: Vec<usize> = (0..x.n_rows()).filter(|&i| weights[i] > 0.0).collect();

        let mut nodes = vec![Node::Leaf { proba: Vec::new() }];
        let mut stack = vec![(0usize, root_rows, 0usize)];

        while let Some((id, rows, depth)) = stack.pop() {
            let counts = class_weights(&rows, y, weights, n_classes);

            let is_leaf = rows.len() < params.min_samples_split
                || rows.len() < 2 * min_leaf
                || params.max_depth.is_some_and(|d| depth >= d)
                || gini(&counts) <= IMPURITY_EPSILON;

            let split = if is_leaf {
                None
            } else {
                best_split(x, &rows, y, weights, &counts, max_features, min_leaf, rng)
            };

            match split {
                None => nodes[id] = leaf(&counts),
                Some(s) => {
                    let (left_rows, right_rows): (Vec<usize>, Vec<usize>) = rows
                        .into_iter()
                        .partition(|&r| x.get(r, s.feature) <= s.threshold);

                    let left  = nodes.len();
                    nodes.push(Node::Leaf { proba: Vec::new() });
                    let right = nodes.len();
                    nodes.push(Node::Leaf { proba: Vec::new() });

                    nodes[id] = Node::Split {
                        feature:   s.feature,
                        threshold: s.threshold,
                        left,
                        right,
                    };
                    stack.push((right, right_rows, depth + 1));
                    stack.push((left,  left_rows,  depth + 1));
                }
            }
        }

        Self { nodes }
    }

    /// Class probabilities for row `row` of `x`
    pub fn predict_proba_row(&self, x: &CsrMatrix, row: usize) -> &[f64] {
        let mut id = 0;
        loop {
            match &self.nodes[id] {
                Node::Leaf { proba } => return proba,
                Node::Split { feature, threshold, left, right } => {
                    id = if x.get(row, *feature) <= *threshold { *left } else { *right };
                }
            }
        }
    }

    pub fn node_count(&self) -> usize {
        self.nodes.len()
    }

    #[cfg(test)]
    pub fn leaf_count(&self) -> usize {
        self.nodes.iter().filter(|n| matches!(n, Node::Leaf { .. })).count()
    }
}

fn class_weights(rows: &[usize], y: &[usize], weights: &[f64], n_classes: usize) -> Vec<f64> {
    let mut counts = vec![0.0; n_classes];
    for &r in rows {
        counts[y[r]] += weights[r];
    }
    counts
}

fn gini(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    1.0 - counts.iter().map(|c| (c / total).powi(2)).sum::<f64>()
}

fn leaf(counts: &[f64]) -> Node {
    let total: f64 = counts.iter().sum();
    let proba = if total > 0.0 {
        counts.iter().map(|c| c / total).collect()
    } else {
        vec![1.0 / counts.len() as f64; counts.len()]
    };
    Node::Leaf { proba }
}

/// Σ_c w_c² / W for one side of a split
fn side_proxy(counts: &[f64]) -> f64 {
    let total: f64 = counts.iter().sum();
    if total <= 0.0 {
        return 0.0;
    }
    counts.iter().map(|c| c * c).sum::<f64>() / total
}

#[allow(clippy::too_many_arguments)]
fn best_split<R: Rng + ?Sized>(
    x:            &CsrMatrix,
    rows:         &[usize],
    y:            &[usize],
    weights:      &[f64],
    node_counts:  &[f64],
    max_features: usize,
    min_leaf:     usize,
    rng:          &mut R,
) -> Option<Split> {
    // ── Step 1: non-zero values per feature within this node ──────────────
    let mut by_feature: HashMap<u32, Vec<(f64, usize)>> = HashMap::new();
    for &r in rows {
        let (cols, values) = x.row(r);
        for (&c, &v) in cols.iter().zip(values) {
            by_feature.entry(c).or_default().push((v, r));
        }
    }

    // Sorting first keeps the visiting order a pure function of the RNG
    let mut candidates: Vec<u32> = by_feature.keys().copied().collect();
    candidates.sort_unstable();
    candidates.shuffle(rng);

    // ── Step 2: evaluate features until max_features varied ones are seen ──
    let mut best: Option<Split> = None;
    let mut visited = 0;

    for feature in candidates {
        if visited >= max_features {
            break;
        }
        let Some(entries) = by_feature.get_mut(&feature) else {
            continue;
        };
        match scan_feature(feature, entries, rows.len(), y, weights, node_counts, min_leaf) {
            FeatureScan::Constant => continue,
            FeatureScan::Evaluated(found) => {
                visited += 1;
                if let Some(split) = found {
                    if best.map_or(true, |b| split.proxy > b.proxy) {
                        best = Some(split);
                    }
                }
            }
        }
    }

    best
}

/// One position in the sorted sweep: a single non-zero row, or the block
/// of every row whose value is zero
enum SweepItem {
    Row { value: f64, row: usize },
    Zeros,
}

impl SweepItem {
    fn value(&self) -> f64 {
        match self {
            SweepItem::Row { value, .. } => *value,
            SweepItem::Zeros             => 0.0,
        }
    }
}

fn scan_feature(
    feature:     u32,
    entries:     &mut [(f64, usize)],
    n_rows:      usize,
    y:           &[usize],
    weights:     &[f64],
    node_counts: &[f64],
    min_leaf:    usize,
) -> FeatureScan {
    let n_zero = n_rows - entries.len();
    entries.sort_unstable_by(|a, b| a.0.total_cmp(&b.0));

    // ── Build the sweep order with the zero block in its sorted place ─────
    let mut zero_counts = node_counts.to_vec();
    for &(_, r) in entries.iter() {
        zero_counts[y[r]] -= weights[r];
    }

    let mut items: Vec<SweepItem> = Vec::with_capacity(entries.len() + 1);
    let mut zeros_placed = n_zero == 0;
    for &(value, row) in entries.iter() {
        if !zeros_placed && value > 0.0 {
            items.push(SweepItem::Zeros);
            zeros_placed = true;
        }
        items.push(SweepItem::Row { value, row });
    }
    if !zeros_placed {
        items.push(SweepItem::Zeros);
    }

    let first = items[0].value();
    if items.iter().all(|it| (it.value() - first).abs() <= FEATURE_THRESHOLD) {
        return FeatureScan::Constant;
    }

    // ── Sweep thresholds left to right ────────────────────────────────────
    let mut left_counts = vec![0.0; node_counts.len()];
    let mut left_rows   = 0usize;
    let mut best: Option<Split> = None;

    for i in 0..items.len() - 1 {
        match &items[i] {
            SweepItem::Row { row, .. } => {
                left_counts[y[*row]] += weights[*row];
                left_rows += 1;
            }
            SweepItem::Zeros => {
                for (l, z) in left_counts.iter_mut().zip(&zero_counts) {
                    *l += *z;
                }
                left_rows += n_zero;
            }
        }

        let here = items[i].value();
        let next = items[i + 1].value();
        if here + FEATURE_THRESHOLD >= next {
            continue;
        }
        let right_rows = n_rows - left_rows;
        if left_rows < min_leaf || right_rows < min_leaf {
            continue;
        }

        let right_counts: Vec<f64> = node_counts
            .iter()
            .zip(&left_counts)
            .map(|(n, l)| n - l)
            .collect();
        let proxy = side_proxy(&left_counts) + side_proxy(&right_counts);

        if best.map_or(true, |b| proxy > b.proxy) {
            let mut threshold = (here + next) / 2.0;
            if threshold >= next {
                threshold = here;
            }
            best = Some(Split { feature, threshold, proxy });
        }
    }

    FeatureScan::Evaluated(best)
}

// ─── Unit Tests ───────────────────────────────────────────────────────────────
#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    /// Feature 0 decides the class; feature 1 is noise
    fn separable() -> (CsrMatrix, Vec<usize>) {
        let mut x = CsrMatrix::new(2);
        let mut y = Vec::new();
        for i in 0..20 {
            let signal = if i % 2 == 0 { 1.0 } else { 0.0 };
            x.push_row(vec![(0, signal), (1, (i % 3) as f64)]);
            y.push(usize::from(i % 2 == 0));
        }
        (x, y)
    }

    fn all_features() -> TreeParams {
        TreeParams { max_features: MaxFeatures::All, ..TreeParams::default() }
    }

    #[test]
    fn test_learns_separable_data() {
        let (x, y) = separable();
        let w      = vec![1.0; y.len()];
        let tree   = DecisionTree::fit(&x, &y, &w, 2, &all_features(), &mut StdRng::seed_from_u64(1));

        for (i, &label) in y.iter().enumerate() {
            let proba = tree.predict_proba_row(&x, i);
            assert_eq!(proba[label], 1.0, "row {i}");
        }
    }

    #[test]
    fn test_pure_node_is_a_single_leaf() {
        let (x, _) = separable();
        let y      = vec![0usize; x.n_rows()];
        let w      = vec![1.0; y.len()];
        let tree   = DecisionTree::fit(&x, &y, &w, 1, &TreeParams::default(), &mut StdRng::seed_from_u64(1));
        assert_eq!(tree.node_count(), 1);
    }

    #[test]
    fn test_min_samples_split_stops_growth() {
        let (x, y) = separable();
        let w      = vec![1.0; y.len()];
        let params = TreeParams { min_samples_split: 100, ..all_features() };
        let tree   = DecisionTree::fit(&x, &y, &w, 2, &params, &mut StdRng::seed_from_u64(1));
        assert_eq!(tree.node_count(), 1);
        let proba = tree.predict_proba_row(&x, 0);
        assert!((proba[0] - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_zero_weight_rows_are_ignored() {
        let (x, y) = separable();
        // keep only class-0 rows
        let w: Vec<f64> = y.iter().map(|&c| if c == 0 { 1.0 } else { 0.0 }).collect();
        let tree = DecisionTree::fit(&x, &y, &w, 2, &all_features(), &mut StdRng::seed_from_u64(1));
        assert_eq!(tree.node_count(), 1);
        assert_eq!(tree.predict_proba_row(&x, 0), &[1.0, 0.0]);
    }

    #[test]
    fn test_constant_features_make_a_leaf() {
        let mut x = CsrMatrix::new(3);
        for _ in 0..6 {
            x.push_row(vec![(1, 2.0)]);
        }
        let y    = vec![0, 1, 0, 1, 0, 1];
        let w    = vec![1.0; 6];
        let tree = DecisionTree::fit(&x, &y, &w, 2, &all_features(), &mut StdRng::seed_from_u64(3));
        assert_eq!(tree.leaf_count(), 1);
    }

    #[test]
    fn test_max_features_resolution() {
        assert_eq!(MaxFeatures::Sqrt.resolve(10_000), 100);
        assert_eq!(MaxFeatures::Sqrt.resolve(0), 1);
        assert_eq!(MaxFeatures::All.resolve(7), 7);
    }
}
