//! Логистическая регрессия для предсказания выживаемости

#![allow(non_snake_case)]

use ndarray::{Array1, Array2};

const LEARNING_RATE: f64 = 0.1;
const EPOCHS: usize = 500;

/// Полнобатчевый градиентный спуск со стандартизацией признаков.
/// Нулевая инициализация весов, фиксированный шаг - результат детерминирован
pub struct LogisticModel {
    weights: Option<Array1<f64>>,
    bias: f64,
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
    is_trained: bool,
}

impl LogisticModel {
    pub fn new() -> Self {
        Self {
            weights: None,
            bias: 0.0,
            mean: None,
            std: None,
            is_trained: false,
        }
    }

    pub fn train(&mut self, X: &Array2<f64>, y: &Array1<f64>) -> Result<(), String> {
        let n_samples = X.nrows();
        let n_features = X.ncols();

        if n_samples == 0 || n_features == 0 {
            return Err("Empty dataset".to_string());
        }
        if y.len() != n_samples {
            return Err("Feature/target size mismatch".to_string());
        }

        // Стандартизация: (x - mean) / std, нулевой разброс заменяем единицей
        let mut mean = Array1::zeros(n_features);
        let mut std = Array1::zeros(n_features);
        for j in 0..n_features {
            let mut sum = 0.0;
            for i in 0..n_samples {
                sum += X[[i, j]];
            }
            mean[j] = sum / n_samples as f64;

            let mut variance = 0.0;
            for i in 0..n_samples {
                variance += (X[[i, j]] - mean[j]).powi(2);
            }
            std[j] = (variance / n_samples as f64).sqrt();
            if std[j] < 1e-10 {
                std[j] = 1.0;
            }
        }

        let mut weights: Array1<f64> = Array1::zeros(n_features);
        let mut bias = 0.0;

        for _ in 0..EPOCHS {
            let mut grad_w: Array1<f64> = Array1::zeros(n_features);
            let mut grad_b = 0.0;

            for i in 0..n_samples {
                let mut z = bias;
                for j in 0..n_features {
                    z += weights[j] * (X[[i, j]] - mean[j]) / std[j];
                }
                let error = sigmoid(z) - y[i];

                for j in 0..n_features {
                    grad_w[j] += error * (X[[i, j]] - mean[j]) / std[j];
                }
                grad_b += error;
            }

            for j in 0..n_features {
                weights[j] -= LEARNING_RATE * grad_w[j] / n_samples as f64;
            }
            bias -= LEARNING_RATE * grad_b / n_samples as f64;
        }

        self.weights = Some(weights);
        self.bias = bias;
        self.mean = Some(mean);
        self.std = Some(std);
        self.is_trained = true;

        Ok(())
    }

    /// Вероятность выживания для каждой строки
    pub fn predict_proba(&self, X: &Array2<f64>) -> Result<Array1<f64>, String> {
        if !self.is_trained {
            return Err("Model not trained".to_string());
        }
        let weights = self.weights.as_ref().ok_or("Model not trained")?;
        let mean = self.mean.as_ref().ok_or("Scaler not fitted")?;
        let std = self.std.as_ref().ok_or("Scaler not fitted")?;

        let mut probabilities = Array1::zeros(X.nrows());
        for i in 0..X.nrows() {
            let mut z = self.bias;
            for j in 0..X.ncols() {
                z += weights[j] * (X[[i, j]] - mean[j]) / std[j];
            }
            probabilities[i] = sigmoid(z);
        }

        Ok(probabilities)
    }

    pub fn predict(&self, X: &Array2<f64>) -> Result<Vec<i32>, String> {
        let probabilities = self.predict_proba(X)?;
        Ok(probabilities
            .iter()
            .map(|&p| if p > 0.5 { 1 } else { 0 })
            .collect())
    }
}

impl Default for LogisticModel {
    fn default() -> Self {
        Self::new()
    }
}

fn sigmoid(z: f64) -> f64 {
    1.0 / (1.0 + (-z).exp())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn separable_data() -> (Array2<f64>, Array1<f64>) {
        // Один информативный признак: отрицательные значения - класс 0
        let n = 40;
        let mut X = Array2::zeros((n, 2));
        let mut y = Array1::zeros(n);
        for i in 0..n {
            let positive = i % 2 == 0;
            X[[i, 0]] = if positive { 2.0 + (i % 5) as f64 } else { -2.0 - (i % 5) as f64 };
            X[[i, 1]] = 1.0; // константный признак, std схлопывается в 1
            y[i] = if positive { 1.0 } else { 0.0 };
        }
        (X, y)
    }

    #[test]
    fn test_untrained_predict_fails() {
        let model = LogisticModel::new();
        let X = Array2::zeros((1, 2));
        assert!(model.predict(&X).is_err());
    }

    #[test]
    fn test_size_mismatch_fails() {
        let mut model = LogisticModel::new();
        let X = Array2::zeros((4, 2));
        let y = Array1::zeros(3);
        assert!(model.train(&X, &y).is_err());
    }

    #[test]
    fn test_learns_separable_data() {
        let (X, y) = separable_data();
        let mut model = LogisticModel::new();
        model.train(&X, &y).unwrap();

        let predictions = model.predict(&X).unwrap();
        for (i, &label) in predictions.iter().enumerate() {
            assert_eq!(label, y[i] as i32);
        }
    }

    #[test]
    fn test_training_is_deterministic() {
        let (X, y) = separable_data();
        let mut a = LogisticModel::new();
        let mut b = LogisticModel::new();
        a.train(&X, &y).unwrap();
        b.train(&X, &y).unwrap();

        assert_eq!(
            a.predict_proba(&X).unwrap().to_vec(),
            b.predict_proba(&X).unwrap().to_vec()
        );
    }
}
