//! Лес условного вывода

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::decision_tree::{best_gini_split, count_positives, weighted_gini};

const MAX_DEPTH: usize = 30;
const MIN_SPLIT: usize = 20;
// Критическое значение z для остановки (двусторонний тест, уровень 0.05)
const Z_CRITICAL: f64 = 1.96;
// Доля подвыборки без возвращения
const SUBSAMPLE_FRACTION: f64 = 0.632;

enum CondNode {
    Leaf {
        label: i32,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<CondNode>,
        right: Box<CondNode>,
    },
}

/// Лес деревьев условного вывода: деревья растут на подвыборках без
/// возвращения, переменная разделения выбирается по силе связи с целевой
/// (точечно-бисериальная корреляция), рост останавливается, когда связь
/// статистически незначима
pub struct ConditionalForest {
    n_trees: usize,
    seed: u64,
    trees: Vec<CondNode>,
    is_trained: bool,
}

impl ConditionalForest {
    pub fn new(n_trees: usize, seed: u64) -> Self {
        Self {
            n_trees,
            seed,
            trees: Vec::new(),
            is_trained: false,
        }
    }

    pub fn train(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<(), String> {
        let n_samples = X.nrows();
        if n_samples == 0 || X.ncols() == 0 {
            return Err("Empty dataset".to_string());
        }
        if y.len() != n_samples {
            return Err("Feature/target size mismatch".to_string());
        }

        let mut rng = StdRng::seed_from_u64(self.seed);
        let subsample = ((n_samples as f64 * SUBSAMPLE_FRACTION) as usize).max(1);

        self.trees.clear();
        for _ in 0..self.n_trees {
            // Подвыборка без возвращения: частичный Фишер-Йетс
            let mut indices: Vec<usize> = (0..n_samples).collect();
            for k in 0..subsample {
                let j = rng.gen_range(k..indices.len());
                indices.swap(k, j);
            }
            indices.truncate(subsample);

            self.trees.push(build_tree(X, y, indices, 0));
        }

        self.is_trained = true;
        Ok(())
    }

    pub fn predict(&self, X: &Array2<f64>) -> Result<Vec<i32>, String> {
        if !self.is_trained {
            return Err("Model not trained".to_string());
        }

        let mut predictions = Vec::with_capacity(X.nrows());
        for i in 0..X.nrows() {
            let row: Vec<f64> = (0..X.ncols()).map(|j| X[[i, j]]).collect();
            let votes: usize = self
                .trees
                .iter()
                .filter(|tree| predict_single(tree, &row) == 1)
                .count();
            predictions.push(if votes * 2 > self.trees.len() { 1 } else { 0 });
        }
        Ok(predictions)
    }
}

impl Default for ConditionalForest {
    fn default() -> Self {
        Self::new(100, 42)
    }
}

fn build_tree(X: &Array2<f64>, y: &Array1<f64>, indices: Vec<usize>, depth: usize) -> CondNode {
    let positives = count_positives(y, &indices);
    let label = if positives * 2 > indices.len() { 1 } else { 0 };

    if depth >= MAX_DEPTH || indices.len() < MIN_SPLIT {
        return CondNode::Leaf { label };
    }
    if weighted_gini(indices.len(), positives) <= 1e-12 {
        return CondNode::Leaf { label };
    }

    // Выбор переменной: максимальная |корреляция| с целевой
    let (feature, correlation) = match strongest_association(X, y, &indices) {
        Some(found) => found,
        None => return CondNode::Leaf { label },
    };

    // Незначимая связь - узел не делится
    let z = correlation.abs() * (indices.len() as f64).sqrt();
    if z < Z_CRITICAL {
        return CondNode::Leaf { label };
    }

    // Порог ищется уже только по выбранной переменной
    let (_, threshold, _) = match best_gini_split(X, y, &indices, &[feature]) {
        Some(found) => found,
        None => return CondNode::Leaf { label },
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) =
        indices.iter().partition(|&&i| X[[i, feature]] < threshold);

    CondNode::Split {
        feature,
        threshold,
        left: Box::new(build_tree(X, y, left_indices, depth + 1)),
        right: Box::new(build_tree(X, y, right_indices, depth + 1)),
    }
}

/// Признак с наибольшей точечно-бисериальной корреляцией на узле
fn strongest_association(
    X: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
) -> Option<(usize, f64)> {
    let n = indices.len() as f64;
    let y_mean = indices.iter().map(|&i| y[i]).sum::<f64>() / n;
    let y_var = indices.iter().map(|&i| (y[i] - y_mean).powi(2)).sum::<f64>() / n;
    if y_var < 1e-12 {
        return None;
    }

    let mut best: Option<(usize, f64)> = None;
    for feature in 0..X.ncols() {
        let x_mean = indices.iter().map(|&i| X[[i, feature]]).sum::<f64>() / n;
        let x_var = indices
            .iter()
            .map(|&i| (X[[i, feature]] - x_mean).powi(2))
            .sum::<f64>()
            / n;
        if x_var < 1e-12 {
            continue;
        }

        let covariance = indices
            .iter()
            .map(|&i| (X[[i, feature]] - x_mean) * (y[i] - y_mean))
            .sum::<f64>()
            / n;
        let correlation = covariance / (x_var.sqrt() * y_var.sqrt());

        let improves = match best {
            Some((_, r)) => correlation.abs() > r.abs() + 1e-12,
            None => true,
        };
        if improves {
            best = Some((feature, correlation));
        }
    }

    best
}

fn predict_single(node: &CondNode, sample: &[f64]) -> i32 {
    match node {
        CondNode::Leaf { label } => *label,
        CondNode::Split {
            feature,
            threshold,
            left,
            right,
        } => {
            if sample[*feature] < *threshold {
                predict_single(left, sample)
            } else {
                predict_single(right, sample)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let n = 80;
        let mut X = Array2::zeros((n, 3));
        let mut y = Array1::zeros(n);
        for i in 0..n {
            let positive = i < 40;
            X[[i, 0]] = (i % 4) as f64; // шум
            X[[i, 1]] = if positive { 6.0 + (i % 3) as f64 } else { (i % 3) as f64 };
            X[[i, 2]] = 1.0; // константа, должна игнорироваться
            y[i] = if positive { 1.0 } else { 0.0 };
        }
        (X, y)
    }

    #[test]
    fn test_untrained_predict_fails() {
        let forest = ConditionalForest::new(10, 42);
        assert!(forest.predict(&Array2::zeros((1, 3))).is_err());
    }

    #[test]
    fn test_learns_separable_data() {
        let (X, y) = separable_data();
        let mut forest = ConditionalForest::new(30, 42);
        forest.train(&X, &y).unwrap();

        let predictions = forest.predict(&X).unwrap();
        for (i, &label) in predictions.iter().enumerate() {
            assert_eq!(label, y[i] as i32);
        }
    }

    #[test]
    fn test_same_seed_is_deterministic() {
        let (X, y) = separable_data();
        let mut a = ConditionalForest::new(20, 7);
        let mut b = ConditionalForest::new(20, 7);
        a.train(&X, &y).unwrap();
        b.train(&X, &y).unwrap();

        assert_eq!(a.predict(&X).unwrap(), b.predict(&X).unwrap());
    }

    #[test]
    fn test_strongest_association_picks_informative_feature() {
        let (X, y) = separable_data();
        let indices: Vec<usize> = (0..X.nrows()).collect();
        let (feature, correlation) = strongest_association(&X, &y, &indices).unwrap();

        assert_eq!(feature, 1);
        assert!(correlation.abs() > 0.9);
    }
}
