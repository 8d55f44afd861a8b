//! Импутация возраста деревом регрессии

use ndarray::{Array1, Array2};

use crate::preprocessing::feature_engineering::FALLBACK_FARE;
use crate::types::RawPassenger;

// Гиперпараметры дерева - фиксированная конфигурация
const MAX_DEPTH: usize = 30;
const MIN_SPLIT: usize = 20;
const COMPLEXITY: f64 = 0.01;

enum TreeNode {
    Leaf {
        value: f64,
    },
    Split {
        feature: usize,
        threshold: f64,
        left: Box<TreeNode>,
        right: Box<TreeNode>,
    },
}

/// Дерево регрессии с детерминированным перебором порогов:
/// кандидаты - середины между соседними различными значениями признака
struct RegressionTree {
    max_depth: usize,
    min_samples_split: usize,
    complexity: f64,
    root: Option<TreeNode>,
}

impl RegressionTree {
    fn new(max_depth: usize, min_samples_split: usize, complexity: f64) -> Self {
        Self {
            max_depth,
            min_samples_split,
            complexity,
            root: None,
        }
    }

    fn fit(&mut self, x: &Array2<f64>, y: &Array1<f64>) -> Result<(), String> {
        if x.nrows() == 0 {
            return Err("Empty dataset".to_string());
        }

        let indices: Vec<usize> = (0..x.nrows()).collect();
        let root_sse = Self::sse(y, &indices);
        self.root = Some(self.build_tree(x, y, 0, indices, root_sse));
        Ok(())
    }

    fn sse(y: &Array1<f64>, indices: &[usize]) -> f64 {
        if indices.is_empty() {
            return 0.0;
        }
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
        indices.iter().map(|&i| (y[i] - mean).powi(2)).sum()
    }

    fn build_tree(
        &self,
        x: &Array2<f64>,
        y: &Array1<f64>,
        depth: usize,
        indices: Vec<usize>,
        root_sse: f64,
    ) -> TreeNode {
        let mean = indices.iter().map(|&i| y[i]).sum::<f64>() / indices.len() as f64;
        if depth >= self.max_depth || indices.len() < self.min_samples_split {
            return TreeNode::Leaf { value: mean };
        }

        let node_sse = Self::sse(y, &indices);
        if node_sse <= 1e-12 {
            return TreeNode::Leaf { value: mean };
        }

        // Поиск лучшего разделения
        let mut best_feature = 0;
        let mut best_threshold = 0.0;
        let mut best_score = f64::INFINITY;

        for feature in 0..x.ncols() {
            let mut pairs: Vec<(f64, usize)> =
                indices.iter().map(|&i| (x[[i, feature]], i)).collect();
            pairs.sort_by(|a, b| a.0.partial_cmp(&b.0).unwrap_or(std::cmp::Ordering::Equal));

            // Префиксные суммы для пересчета SSE за O(1) на порог
            let n = pairs.len();
            let mut prefix_sum = vec![0.0; n + 1];
            let mut prefix_sq = vec![0.0; n + 1];
            for (k, &(_, idx)) in pairs.iter().enumerate() {
                prefix_sum[k + 1] = prefix_sum[k] + y[idx];
                prefix_sq[k + 1] = prefix_sq[k] + y[idx] * y[idx];
            }

            for k in 1..n {
                if pairs[k].0 - pairs[k - 1].0 < 1e-12 {
                    continue;
                }
                let threshold = (pairs[k - 1].0 + pairs[k].0) / 2.0;

                let left_n = k as f64;
                let right_n = (n - k) as f64;
                let left_sum = prefix_sum[k];
                let right_sum = prefix_sum[n] - prefix_sum[k];
                let left_sse = prefix_sq[k] - left_sum * left_sum / left_n;
                let right_sse =
                    (prefix_sq[n] - prefix_sq[k]) - right_sum * right_sum / right_n;
                let total = left_sse + right_sse;

                if total < best_score - 1e-12 {
                    best_score = total;
                    best_feature = feature;
                    best_threshold = threshold;
                }
            }
        }

        // Сплит принимается, только если улучшение не меньше cp * SSE корня
        if best_score.is_infinite() || node_sse - best_score < self.complexity * root_sse {
            return TreeNode::Leaf { value: mean };
        }

        let (left_indices, right_indices): (Vec<usize>, Vec<usize>) = indices
            .iter()
            .partition(|&&i| x[[i, best_feature]] < best_threshold);

        TreeNode::Split {
            feature: best_feature,
            threshold: best_threshold,
            left: Box::new(self.build_tree(x, y, depth + 1, left_indices, root_sse)),
            right: Box::new(self.build_tree(x, y, depth + 1, right_indices, root_sse)),
        }
    }

    fn predict_row(&self, sample: &[f64]) -> Result<f64, String> {
        let root = self.root.as_ref().ok_or("Model not trained")?;
        Ok(Self::predict_single(root, sample))
    }

    fn predict_single(node: &TreeNode, sample: &[f64]) -> f64 {
        match node {
            TreeNode::Leaf { value } => *value,
            TreeNode::Split {
                feature,
                threshold,
                left,
                right,
            } => {
                if sample[*feature] < *threshold {
                    Self::predict_single(left, sample)
                } else {
                    Self::predict_single(right, sample)
                }
            }
        }
    }
}

/// Импутация возраста: дерево обучается на строках с наблюдаемым возрастом
/// по признакам {pclass, sex, sib_sp, parch, fare, embarked}
pub struct AgeImputer {
    tree: RegressionTree,
}

impl AgeImputer {
    pub fn fit(rows: &[RawPassenger]) -> Result<Self, String> {
        let known: Vec<&RawPassenger> = rows.iter().filter(|r| r.age.is_some()).collect();
        if known.is_empty() {
            return Err("No observed ages available to fit the age model".to_string());
        }

        let mut x = Array2::zeros((known.len(), 6));
        let mut y = Array1::zeros(known.len());
        for (i, row) in known.iter().enumerate() {
            for (j, value) in Self::encode(row).iter().enumerate() {
                x[[i, j]] = *value;
            }
            y[i] = row.age.unwrap_or(0.0);
        }

        let mut tree = RegressionTree::new(MAX_DEPTH, MIN_SPLIT, COMPLEXITY);
        tree.fit(&x, &y)?;
        Ok(Self { tree })
    }

    /// Наблюдаемый возраст возвращается как есть, пропуск заполняется моделью
    pub fn impute(&self, row: &RawPassenger) -> Result<f64, String> {
        match row.age {
            Some(age) => Ok(age),
            None => self.tree.predict_row(&Self::encode(row)),
        }
    }

    // Пропуски fare/embarked на этом шаге еще не заполнены (импутация возраста
    // идет раньше шагов 10-11), кодируем их теми же финальными константами
    fn encode(row: &RawPassenger) -> [f64; 6] {
        let sex = if row.sex == "female" { 1.0 } else { 0.0 };
        let embarked = match row.embarked.as_deref() {
            Some("S") => 2.0,
            Some("Q") => 1.0,
            _ => 0.0, // "C" и пропуски
        };

        [
            row.pclass as f64,
            sex,
            row.sib_sp as f64,
            row.parch as f64,
            row.fare.unwrap_or(FALLBACK_FARE),
            embarked,
        ]
    }
}
