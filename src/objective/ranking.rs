//! Ranking objectives.

use super::{Objective, TargetDomain};
use crate::eval::{Backend, Batch};

/// LambdaRank objective for learning to rank (LambdaMART).
///
/// The cross-sample-coupled path: documents within a query group are
/// compared pairwise, with each pair's gradient weighted by the NDCG change
/// that swapping the pair would cause. Targets are graded relevance labels
/// (0 for bad up to e.g. 3 for perfect).
///
/// Query group boundaries are part of the objective's immutable
/// configuration: `query_groups[i]` is the start index of query i, with a
/// final element marking the end. Without explicit groups the whole batch is
/// treated as one query.
#[derive(Debug, Clone)]
pub struct LambdaRankLoss {
    /// Query group boundaries; empty means one group spanning the batch.
    pub query_groups: Vec<usize>,
    /// Sigmoid steepness for the pairwise comparison.
    pub sigma: f32,
}

impl LambdaRankLoss {
    /// Create a LambdaRank objective treating each batch as a single query.
    pub fn new(sigma: f32) -> Self {
        debug_assert!(sigma > 0.0, "sigma must be positive, got {}", sigma);
        Self {
            query_groups: Vec::new(),
            sigma,
        }
    }

    /// Set explicit query group boundaries.
    ///
    /// Must have at least 2 elements (start of the first query, end of the
    /// last) in non-decreasing order.
    pub fn with_query_groups(mut self, query_groups: Vec<usize>) -> Self {
        debug_assert!(
            query_groups.len() >= 2,
            "query_groups must have at least 2 elements"
        );
        self.query_groups = query_groups;
        self
    }

    /// DCG gain for a relevance label.
    #[inline]
    fn gain(label: f32) -> f64 {
        (2.0f64).powf(label as f64) - 1.0
    }

    /// DCG position discount.
    #[inline]
    fn discount(pos: usize) -> f64 {
        1.0 / (2.0 + pos as f64).log2()
    }

    /// Ideal DCG of a label set.
    fn ideal_dcg(labels: &[f32]) -> f64 {
        let mut sorted: Vec<f32> = labels.to_vec();
        sorted.sort_by(|a, b| b.partial_cmp(a).unwrap_or(std::cmp::Ordering::Equal));
        sorted
            .iter()
            .enumerate()
            .map(|(pos, &label)| Self::gain(label) * Self::discount(pos))
            .sum()
    }
}

impl Objective for LambdaRankLoss {
    fn name(&self) -> &'static str {
        "lambdarank"
    }

    fn target_domain(&self) -> TargetDomain {
        TargetDomain::NonNegative
    }

    fn compute(&self, batch: &Batch<'_>, _backend: Backend, grads: &mut [f32], mut hess: Option<&mut [f32]>) {
        let n_rows = batch.n_rows();
        let predictions = batch.raw_scores();
        let targets = batch.targets();
        let weights = batch.weights();

        grads[..n_rows].fill(0.0);
        if let Some(h) = hess.as_deref_mut() {
            h[..n_rows].fill(0.0);
        }

        let whole_batch = [0, n_rows];
        let groups: &[usize] = if self.query_groups.is_empty() {
            &whole_batch
        } else {
            &self.query_groups
        };

        let sigma = self.sigma as f64;

        for q in 0..groups.len() - 1 {
            let start = groups[q];
            let end = groups[q + 1].min(n_rows);
            if end <= start + 1 {
                continue; // pairs need at least 2 docs
            }

            let labels = &targets[start..end];
            let preds = &predictions[start..end];

            let idcg = Self::ideal_dcg(labels);
            if idcg <= 0.0 {
                continue;
            }

            // Current ranking: indices sorted by descending score.
            let mut order: Vec<usize> = (0..labels.len()).collect();
            order.sort_by(|&a, &b| {
                preds[b]
                    .partial_cmp(&preds[a])
                    .unwrap_or(std::cmp::Ordering::Equal)
            });

            for (pos_i, &idx_i) in order.iter().enumerate() {
                for (pos_j, &idx_j) in order.iter().enumerate() {
                    // Only pairs where document i is strictly more relevant.
                    if labels[idx_i] <= labels[idx_j] {
                        continue;
                    }

                    let score_diff = (preds[idx_i] - preds[idx_j]) as f64;
                    let pair_sigmoid = 1.0 / (1.0 + (-sigma * score_diff).exp());

                    let delta_ndcg = ((Self::gain(labels[idx_i]) - Self::gain(labels[idx_j]))
                        * (Self::discount(pos_i) - Self::discount(pos_j))
                        / idcg)
                        .abs();

                    let lambda = -sigma * (1.0 - pair_sigmoid) * delta_ndcg;
                    let w = if weights.is_empty() {
                        1.0
                    } else {
                        weights[start + idx_i] as f64
                    };

                    grads[start + idx_i] += (w * lambda) as f32;
                    grads[start + idx_j] -= (w * lambda) as f32;

                    if let Some(h) = hess.as_deref_mut() {
                        let curvature =
                            w * sigma * sigma * pair_sigmoid * (1.0 - pair_sigmoid) * delta_ndcg;
                        h[start + idx_i] += curvature as f32;
                        h[start + idx_j] += curvature as f32;
                    }
                }
            }
        }
    }

    fn base_score(&self, _n_rows: usize, _targets: &[f32], _weights: &[f32], outputs: &mut [f32]) {
        outputs.fill(0.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn gain_and_discount_shapes() {
        assert_eq!(LambdaRankLoss::gain(0.0), 0.0);
        assert_eq!(LambdaRankLoss::gain(2.0), 3.0);
        assert!(LambdaRankLoss::discount(0) > LambdaRankLoss::discount(1));
    }

    #[test]
    fn ideal_dcg_uses_best_ordering() {
        let forward = LambdaRankLoss::ideal_dcg(&[2.0, 0.0, 1.0]);
        let sorted = LambdaRankLoss::ideal_dcg(&[2.0, 1.0, 0.0]);
        assert_eq!(forward, sorted);
    }
}
