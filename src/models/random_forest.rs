//! Случайный лес (бэггинг деревьев Джини)

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::models::decision_tree::{best_gini_split, count_positives, weighted_gini};

const MAX_DEPTH: usize = 30;
// Деревья леса доращиваются почти до чистых листьев
const MIN_SPLIT: usize = 2;

enum ForestNode {
    Leaf {
        label: i32,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<ForestNode>,
        right: Box<ForestNode>,
    },
}

/// Бэггинг: каждое дерево обучается на бутстреп-выборке, в каждом узле
/// рассматривается случайное подмножество признаков. Seed фиксирует результат
pub struct RandomForest {
    n_trees: usize,
    seed: u64,
    trees: Vec<ForestNode>,
    is_trained: bool,
}

impl RandomForest {
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
        let mtry = ((X.ncols() as f64).sqrt().round() as usize).clamp(1, X.ncols());

        self.trees.clear();
        for _ in 0..self.n_trees {
            // Бутстреп-выборка с возвращением
            let indices: Vec<usize> = (0..n_samples).map(|_| rng.gen_range(0..n_samples)).collect();
            self.trees.push(build_tree(X, y, indices, 0, mtry, &mut rng));
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
            // Большинство; при равенстве - класс 0
            predictions.push(if votes * 2 > self.trees.len() { 1 } else { 0 });
        }
        Ok(predictions)
    }
}

impl Default for RandomForest {
    fn default() -> Self {
        Self::new(100, 42)
    }
}

fn build_tree(
    X: &Array2<f64>,
    y: &Array1<f64>,
    indices: Vec<usize>,
    depth: usize,
    mtry: usize,
    rng: &mut StdRng,
) -> ForestNode {
    let positives = count_positives(y, &indices);
    let label = if positives * 2 > indices.len() { 1 } else { 0 };

    if depth >= MAX_DEPTH || indices.len() < MIN_SPLIT {
        return ForestNode::Leaf { label };
    }
    if weighted_gini(indices.len(), positives) <= 1e-12 {
        return ForestNode::Leaf { label };
    }

    // Случайное подмножество признаков для этого узла
    let mut features: Vec<usize> = (0..X.ncols()).collect();
    for k in 0..mtry {
        let j = rng.gen_range(k..features.len());
        features.swap(k, j);
    }
    features.truncate(mtry);

    let (feature, threshold, _) = match best_gini_split(X, y, &indices, &features) {
        Some(found) => found,
        None => return ForestNode::Leaf { label },
    };

    let (left_indices, right_indices): (Vec<usize>, Vec<usize>) =
        indices.iter().partition(|&&i| X[[i, feature]] < threshold);

    ForestNode::Split {
        feature,
        threshold,
        left: Box::new(build_tree(X, y, left_indices, depth + 1, mtry, rng)),
        right: Box::new(build_tree(X, y, right_indices, depth + 1, mtry, rng)),
    }
}

fn predict_single(node: &ForestNode, sample: &[f64]) -> i32 {
    match node {
        ForestNode::Leaf { label } => *label,
        ForestNode::Split {
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
