//! Дерево решений (классификация выживаемости)

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};

// Значения по умолчанию повторяют конфигурацию дерева импутации
const MAX_DEPTH: usize = 30;
const MIN_SPLIT: usize = 20;
const COMPLEXITY: f64 = 0.01;

enum TreeNode {
    Leaf {
        label: i32,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Дерево классификации по критерию Джини с детерминированным
/// перебором порогов
pub struct SurvivalTree {
    max_depth: usize,
    min_samples_split: usize,
    complexity: f64,
    root: Option<TreeNode>,
    is_trained: bool,
}

impl SurvivalTree {
    pub fn new() -> Self {
        Self::with_params(MAX_DEPTH, MIN_SPLIT, COMPLEXITY)
    }

    pub fn with_params(max_depth: usize, min_samples_split: usize, complexity: f64) -> Self {
        Self {
            max_depth,
            min_samples_split,
            complexity,
            root: None,
            is_trained: false,
        }
    }

    pub fn train(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<(), String> {
        if X.nrows() == 0 || X.ncols() == 0 {
            return Err("Empty dataset".to_string());
        }
        if y.len() != X.nrows() {
            return Err("Feature/target size mismatch".to_string());
        }

        let indices: Vec<usize> = (0..X.nrows()).collect();
        let positives = count_positives(y, &indices);
        let root_impurity = weighted_gini(indices.len(), positives);

        self.root = Some(self.build_tree(X, y, 0, indices, root_impurity));
        self.is_trained = true;
        Ok(())
    }

    fn build_tree(
        &self,
        X: &Array2<f64>,
        y: &Array1<f64>,
        depth: usize,
        indices: Vec<usize>,
        root_impurity: f64,
    ) -> TreeNode {
        let positives = count_positives(y, &indices);
        // Большинство; при равенстве голосов - класс 0
        let label = if positives * 2 > indices.len() { 1 } else { 0 };

        if depth >= self.max_depth || indices.len() < self.min_samples_split {
            return TreeNode::Leaf { label };
        }

        let node_impurity = weighted_gini(indices.len(), positives);
        if node_impurity <= 1e-12 {
            return TreeNode::Leaf { label };
        }

        let split = best_gini_split(X, y, &indices, &(0..X.ncols()).collect::<Vec<usize>>());
        let (best_feature, best_threshold, best_score) = match split {
            Some(found) => found,
            None => return TreeNode::Leaf { label },
        };

        // cp-правило как у rpart: улучшение сравнивается с корневой неоднородностью
        if node_impurity - best_score < self.complexity * root_impurity {
            return TreeNode::Leaf { label };
        }

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| X[[i, best_feature]] < best_threshold);

        TreeNode::Split {
            feature: best_feature,
            threshold: best_threshold,
            left: Box::new(self.build_tree(X, y, depth + 1, left_indices, root_impurity)),
            right: Box::new(self.build_tree(X, y, depth + 1, right_indices, root_impurity)),
        }
    }

    pub fn predict(&self, X: &Array2<f64>) -> Result<Vec<i32>, String> {
        if !self.is_trained {
            return Err("Model not trained".to_string());
        }
        let root = self.root.as_ref().ok_or("Model not trained")?;

        let mut predictions = Vec::with_capacity(X.nrows());
        for i in 0..X.nrows() {
            let row: Vec<f64> = (0..X.ncols()).map(|j| X[[i, j]]).collect();
            predictions.push(predict_single(root, &row));
        }
        Ok(predictions)
    }
}

impl Default for SurvivalTree {
    fn default() -> Self {
        Self::new()
    }
}

fn predict_single(node: &TreeNode, sample: &[f64]) -> i32 {
    match node {
        TreeNode::Leaf { label } => *label,
        TreeNode::Split {
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

pub(crate) fn count_positives(y: &Array1<f64>, indices: &[usize]) -> usize {
    indices.iter().filter(|&&i| y[i] > 0.5).count()
}

/// Неоднородность Джини, взвешенная числом наблюдений в узле
pub(crate) fn weighted_gini(n: usize, positives: usize) -> f64 {
    if n == 0 {
        return 0.0;
    }
    let p1 = positives as f64 / n as f64;
    let p0 = 1.0 - p1;
    n as f64 * (1.0 - p0 * p0 - p1 * p1)
}

/// Лучшее разделение по Джини среди кандидатов-признаков.
/// Возвращает (признак, порог, суммарная неоднородность детей)
pub(crate) fn best_gini_split(
    X: &Array2<f64>,
    y: &Array1<f64>,
    indices: &[usize],
    features: &[usize],
) -> Option<(usize, f64, f64)> {
    let mut best: Option<(usize, f64, f64)> = None;

    for &feature in features {
        let mut pairs: Vec<(f64, usize)> = indices.iter().map(|&i| (X[[i, feature]], i)).collect();
        pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

        // Префиксные счетчики положительного класса
        let n = pairs.len();
        let mut prefix_pos = vec![0usize; n + 1];
        for (k, &(_, idx)) in pairs.iter().enumerate() {
            prefix_pos[k + 1] = prefix_pos[k] + usize::from(y[idx] > 0.5);
        }

        for k in 1..n {
            if pairs[k].0 - pairs[k - 1].0 < 1e-12 {
                continue;
            }
            let threshold = (pairs[k - 1].0 + pairs[k].0) / 2.0;
            let left = weighted_gini(k, prefix_pos[k]);
            let right = weighted_gini(n - k, prefix_pos[n] - prefix_pos[k]);
            let total = left + right;

            let improves = match best {
                Some((_, _, score)) => total < score - 1e-12,
                None => true,
            };
            if improves {
                best = Some((feature, threshold, total));
            }
        }
    }

    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        let n = 40;
        let mut X = Array2::zeros((n, 2));
        let mut y = Array1::zeros(n);
        for i in 0..n {
            let positive = i < 20;
            X[[i, 0]] = if positive { 10.0 } else { 1.0 };
            X[[i, 1]] = (i % 7) as f64; // шумовой признак
            y[i] = if positive { 1.0 } else { 0.0 };
        }
        (X, y)
    }

    #[test]
    fn test_untrained_predict_fails() {
        let tree = SurvivalTree::new();
        assert!(tree.predict(&Array2::zeros((1, 2))).is_err());
    }

    #[test]
    fn test_learns_separable_data() {
        let (X, y) = separable_data();
        let mut tree = SurvivalTree::new();
        tree.train(&X, &y).unwrap();

        let predictions = tree.predict(&X).unwrap();
        for (i, &label) in predictions.iter().enumerate() {
            assert_eq!(label, y[i] as i32);
        }
    }

    #[test]
    fn test_small_dataset_predicts_majority() {
        // Меньше min_samples_split строк: корень остается листом
        let mut X = Array2::zeros((6, 1));
        let mut y = Array1::zeros(6);
        for i in 0..6 {
            X[[i, 0]] = i as f64;
            y[i] = if i < 4 { 1.0 } else { 0.0 };
        }

        let mut tree = SurvivalTree::new();
        tree.train(&X, &y).unwrap();
        assert_eq!(tree.predict(&X).unwrap(), vec![1; 6]);
    }

    #[test]
    fn test_tie_votes_predict_zero() {
        let mut X = Array2::zeros((4, 1));
        let mut y = Array1::zeros(4);
        for i in 0..4 {
            X[[i, 0]] = i as f64;
            y[i] = if i % 2 == 0 { 1.0 } else { 0.0 };
        }

        let mut tree = SurvivalTree::new();
        tree.train(&X, &y).unwrap();
        assert_eq!(tree.predict(&X).unwrap(), vec![0; 4]);
    }

    #[test]
    fn test_weighted_gini() {
        assert_eq!(weighted_gini(0, 0), 0.0);
        assert_eq!(weighted_gini(10, 0), 0.0);
        assert_eq!(weighted_gini(10, 10), 0.0);
        // Равная смесь: 10 * 0.5 = 5
        assert!((weighted_gini(10, 5) - 5.0).abs() < 1e-12);
    }
}
