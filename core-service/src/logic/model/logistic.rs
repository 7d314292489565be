//! Binary logistic regression trained with seeded SGD (log loss, L2 penalty).

use rand::{rngs::StdRng, seq::SliceRandom, SeedableRng};
use serde::{Deserialize, Serialize};

use super::vectorizer::SparseVector;

const MAX_DLOSS: f32 = 1e4;

/// Training hyper-parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticConfig {
    pub n_epochs: usize,
    pub alpha: f32,
    pub random_state: u64,
}

impl Default for LogisticConfig {
    fn default() -> Self {
        Self {
            n_epochs: 50,
            alpha: 1e-4,
            random_state: crate::constants::DEFAULT_TRAIN_SEED,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogisticRegression {
    weights: Vec<f32>,
    intercept: f32,
    config: LogisticConfig,
}

impl LogisticRegression {
    pub fn new(n_features: usize, config: LogisticConfig) -> Self {
        Self {
            weights: vec![0.0; n_features],
            intercept: 0.0,
            config,
        }
    }

    /// Fit on rows with targets in {0.0, 1.0} (1.0 = spam)
    pub fn fit(&mut self, rows: &[SparseVector], targets: &[f32]) {
        let mut rng = StdRng::seed_from_u64(self.config.random_state);
        let mut order: Vec<usize> = (0..rows.len().min(targets.len())).collect();
        let alpha = self.config.alpha;
        let mut t = 1usize;
        let mut w_scale = 1.0f32;

        // 'optimal' learning-rate schedule
        let typw = (1.0 / alpha.sqrt()).sqrt();
        let initial_eta0 = typw / 1.0_f32.max(gradient(1.0, -typw));
        let optimal_init = 1.0 / (initial_eta0 * alpha);

        for _ in 0..self.config.n_epochs {
            order.shuffle(&mut rng);

            for &i in &order {
                let row = &rows[i];
                let p = self.dot(row) * w_scale + self.intercept;
                let eta = 1.0 / (alpha * (optimal_init + t as f32 - 1.0));
                let dloss = gradient(targets[i], p).clamp(-MAX_DLOSS, MAX_DLOSS);

                w_scale *= 1.0 - eta * alpha;

                let update = -eta * dloss;
                if update != 0.0 {
                    let scaled = update / w_scale;
                    for (idx, value) in &row.0 {
                        if let Some(w) = self.weights.get_mut(*idx as usize) {
                            *w += scaled * *value;
                        }
                    }
                    self.intercept += update;
                }

                if !(1e-6..=1e6).contains(&w_scale) {
                    self.weights.iter_mut().for_each(|w| *w *= w_scale);
                    w_scale = 1.0;
                }

                t += 1;
            }
        }

        if w_scale != 1.0 {
            self.weights.iter_mut().for_each(|w| *w *= w_scale);
        }
    }

    fn dot(&self, row: &SparseVector) -> f32 {
        row.0
            .iter()
            .filter_map(|(idx, value)| self.weights.get(*idx as usize).map(|w| w * value))
            .sum()
    }

    /// Probability of the positive (spam) class
    pub fn predict_proba(&self, row: &SparseVector) -> f32 {
        sigmoid(self.dot(row) + self.intercept)
    }

    pub fn num_features(&self) -> usize {
        self.weights.len()
    }
}

#[inline(always)]
fn gradient(y: f32, p: f32) -> f32 {
    if p > -16.0 {
        let exp_tmp = (-p).exp();
        ((1.0 - y) - y * exp_tmp) / (1.0 + exp_tmp)
    } else {
        p.exp() - y
    }
}

#[inline(always)]
fn sigmoid(z: f32) -> f32 {
    let z = z.clamp(-35.0, 35.0);
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let exp_z = z.exp();
        exp_z / (1.0 + exp_z)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn toy() -> (Vec<SparseVector>, Vec<f32>) {
        let rows = vec![
            SparseVector(vec![(0, 1.0)]),
            SparseVector(vec![(0, 0.8), (2, 0.6)]),
            SparseVector(vec![(1, 1.0)]),
            SparseVector(vec![(1, 0.6), (2, 0.8)]),
        ];
        (rows, vec![1.0, 1.0, 0.0, 0.0])
    }

    #[test]
    fn test_separates_toy_data() {
        let (rows, targets) = toy();
        let mut model = LogisticRegression::new(3, LogisticConfig::default());
        model.fit(&rows, &targets);

        assert!(model.predict_proba(&rows[0]) > 0.5);
        assert!(model.predict_proba(&rows[2]) < 0.5);
    }

    #[test]
    fn test_same_seed_same_weights() {
        let (rows, targets) = toy();
        let mut a = LogisticRegression::new(3, LogisticConfig::default());
        let mut b = LogisticRegression::new(3, LogisticConfig::default());
        a.fit(&rows, &targets);
        b.fit(&rows, &targets);
        assert_eq!(a, b);
    }

    #[test]
    fn test_probability_in_unit_interval() {
        let (rows, targets) = toy();
        let mut model = LogisticRegression::new(3, LogisticConfig::default());
        model.fit(&rows, &targets);

        for row in &rows {
            let p = model.predict_proba(row);
            assert!((0.0..=1.0).contains(&p));
        }
        assert!((0.0..=1.0).contains(&model.predict_proba(&SparseVector::default())));
    }
}
