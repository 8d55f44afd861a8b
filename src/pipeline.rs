//! Батч-пайплайн: загрузка -> feature engineering -> модели -> артефакты

#![allow(non_snake_case)]

use std::path::PathBuf;

use chrono::Utc;
use ndarray::Array1;

use crate::data::{loader, Exporter};
use crate::error::{PipelineError, PipelineResult};
use crate::models::{ConditionalForest, LogisticModel, RandomForest, SurvivalTree};
use crate::preprocessing::FeatureEngineer;
use crate::types::{ModelScore, Passenger, PipelineReport};

const FOREST_TREES: usize = 100;

pub struct PipelineConfig {
    pub train_path: PathBuf,
    pub test_path: PathBuf,
    pub out_dir: PathBuf,
    pub seed: u64,
}

/// Один прогон пайплайна. Частичный вывод не считается валидным:
/// любая ошибка прерывает прогон целиком
pub fn run(config: &PipelineConfig) -> PipelineResult<PipelineReport> {
    let combined = loader::load_combined(&config.train_path, &config.test_path)?;
    tracing::info!("Loaded {} passengers", combined.len());

    let exporter = Exporter::new(&config.out_dir)?;
    exporter.write_raw("original", &combined)?;

    let imputed_ages = combined.iter().filter(|r| r.age.is_none()).count();
    let engineered = FeatureEngineer::derive(&combined)?;
    exporter.write_engineered("feature_engineered", &engineered)?;
    tracing::info!("Derived features, {} ages imputed", imputed_ages);

    // Разделение обратно на выборки: у тестовой нет survived
    let train_rows: Vec<Passenger> = engineered
        .iter()
        .filter(|p| p.survived.is_some())
        .cloned()
        .collect();
    let test_rows: Vec<Passenger> = engineered
        .iter()
        .filter(|p| p.survived.is_none())
        .cloned()
        .collect();
    if train_rows.is_empty() {
        return Err(PipelineError::EmptyInput(
            "training partition is empty".to_string(),
        ));
    }

    let X_train = FeatureEngineer::survival_features(&train_rows);
    let y_train = FeatureEngineer::survival_targets(&train_rows);
    let X_test = FeatureEngineer::survival_features(&test_rows);
    let test_ids: Vec<i32> = test_rows.iter().map(|p| p.passenger_id).collect();

    let mut scores = Vec::new();

    let mut logistic = LogisticModel::new();
    logistic.train(&X_train, &y_train)?;
    scores.push(finish_model(
        "logistic",
        logistic.predict(&X_train)?,
        logistic.predict(&X_test)?,
        &y_train,
        &test_ids,
        &exporter,
    )?);

    let mut tree = SurvivalTree::new();
    tree.train(&X_train, &y_train)?;
    scores.push(finish_model(
        "decision_tree",
        tree.predict(&X_train)?,
        tree.predict(&X_test)?,
        &y_train,
        &test_ids,
        &exporter,
    )?);

    let mut forest = RandomForest::new(FOREST_TREES, config.seed);
    forest.train(&X_train, &y_train)?;
    scores.push(finish_model(
        "random_forest",
        forest.predict(&X_train)?,
        forest.predict(&X_test)?,
        &y_train,
        &test_ids,
        &exporter,
    )?);

    let mut cforest = ConditionalForest::new(FOREST_TREES, config.seed);
    cforest.train(&X_train, &y_train)?;
    scores.push(finish_model(
        "conditional_forest",
        cforest.predict(&X_train)?,
        cforest.predict(&X_test)?,
        &y_train,
        &test_ids,
        &exporter,
    )?);

    let report = PipelineReport {
        generated_at: Utc::now().to_rfc3339(),
        rows_total: combined.len(),
        rows_train: train_rows.len(),
        rows_test: test_rows.len(),
        imputed_ages,
        scores,
    };
    exporter.write_report(&report)?;

    Ok(report)
}

fn finish_model(
    name: &str,
    train_predictions: Vec<i32>,
    test_predictions: Vec<i32>,
    y_train: &Array1<f64>,
    test_ids: &[i32],
    exporter: &Exporter,
) -> PipelineResult<ModelScore> {
    let accuracy = training_accuracy(&train_predictions, y_train);
    tracing::info!("Model {}: training accuracy {:.3}", name, accuracy);

    exporter.write_submission(&format!("submission_{name}"), test_ids, &test_predictions)?;

    Ok(ModelScore {
        model: name.to_string(),
        training_accuracy: accuracy,
    })
}

fn training_accuracy(predictions: &[i32], targets: &Array1<f64>) -> f64 {
    if targets.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(targets.iter())
        .filter(|(&p, &t)| p == t as i32)
        .count();
    correct as f64 / targets.len() as f64
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;

    fn train_csv() -> String {
        let mut csv = String::from(
            "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n",
        );
        for i in 0..15 {
            csv.push_str(&format!(
                "{},0,3,\"Panula, Mr. Ernesti Arvid\",male,{},1,0,3101295,7.925,,S\n",
                i + 1,
                20 + i
            ));
        }
        for i in 0..15 {
            csv.push_str(&format!(
                "{},1,1,\"Graham, Mrs. William Thompson\",female,{},1,0,PC 17582,153.4625,C125,S\n",
                i + 16,
                30 + i
            ));
        }
        csv
    }

    fn test_csv() -> String {
        "PassengerId,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked\n\
         892,3,\"Kelly, Mr. James\",male,34.5,0,0,330911,7.8292,,Q\n\
         893,1,\"Wilkes, Mrs. James (Ellen Needs)\",female,,1,0,363272,,,\n"
            .to_string()
    }

    #[test]
    fn test_run_produces_all_artifacts() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.csv");
        let test_path = dir.path().join("test.csv");
        fs::write(&train_path, train_csv()).unwrap();
        fs::write(&test_path, test_csv()).unwrap();

        let config = PipelineConfig {
            train_path,
            test_path,
            out_dir: dir.path().join("output"),
            seed: 42,
        };
        let report = run(&config).unwrap();

        assert_eq!(report.rows_total, 32);
        assert_eq!(report.rows_train, 30);
        assert_eq!(report.rows_test, 2);
        assert_eq!(report.imputed_ages, 1);
        assert_eq!(report.scores.len(), 4);

        for name in [
            "original.csv",
            "feature_engineered.csv",
            "submission_logistic.csv",
            "submission_decision_tree.csv",
            "submission_random_forest.csv",
            "submission_conditional_forest.csv",
            "report.json",
        ] {
            assert!(
                config.out_dir.join(name).exists(),
                "missing artifact {name}"
            );
        }

        // Submission: строка на каждого тестового пассажира, метки 0/1
        let submission =
            fs::read_to_string(config.out_dir.join("submission_logistic.csv")).unwrap();
        let lines: Vec<&str> = submission.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("892,"));
        for line in &lines[1..] {
            let label = line.split(',').nth(1).unwrap();
            assert!(label == "0" || label == "1");
        }

        // В снимке после feature engineering нет пустых age/fare/embarked
        let engineered =
            fs::read_to_string(config.out_dir.join("feature_engineered.csv")).unwrap();
        let mut reader = csv::Reader::from_reader(engineered.as_bytes());
        for record in reader.deserialize() {
            let p: Passenger = record.unwrap();
            assert!(p.age.is_finite());
            assert!(p.fare.is_finite());
            assert!(!p.embarked.is_empty());
            assert_eq!(p.family_size, p.sib_sp + p.parch + 1);
        }
    }

    #[test]
    fn test_run_fails_on_missing_column() {
        let dir = tempfile::tempdir().unwrap();
        let train_path = dir.path().join("train.csv");
        let test_path = dir.path().join("test.csv");
        fs::write(&train_path, "PassengerId,Pclass\n1,3\n").unwrap();
        fs::write(&test_path, test_csv()).unwrap();

        let config = PipelineConfig {
            train_path,
            test_path,
            out_dir: dir.path().join("output"),
            seed: 42,
        };
        assert!(matches!(
            run(&config),
            Err(PipelineError::MissingColumn { .. })
        ));
    }

    #[test]
    fn test_training_accuracy() {
        let targets: Array1<f64> = vec![1.0, 0.0, 1.0, 0.0].into_iter().collect();
        assert_eq!(training_accuracy(&[1, 0, 1, 0], &targets), 1.0);
        assert_eq!(training_accuracy(&[1, 0, 0, 0], &targets), 0.75);
        assert_eq!(training_accuracy(&[0, 1, 0, 1], &targets), 0.0);
    }
}
