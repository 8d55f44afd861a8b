//! Выгрузка артефактов пайплайна

use std::fs;
use std::path::{Path, PathBuf};

use serde::Serialize;

use crate::error::PipelineResult;
use crate::types::{Passenger, PipelineReport, RawPassenger};

/// Строка submission-файла для Kaggle
#[derive(Debug, Clone, Serialize)]
struct SubmissionRow {
    #[serde(rename = "PassengerId")]
    passenger_id: i32,
    #[serde(rename = "Survived")]
    survived: i32,
}

/// Пишет снимки таблицы и submission-файлы в выходную директорию.
/// Шаг некритичный и перезапускаемый, восстановление частичной записи не нужно.
pub struct Exporter {
    out_dir: PathBuf,
}

impl Exporter {
    pub fn new(out_dir: &Path) -> PipelineResult<Self> {
        fs::create_dir_all(out_dir)?;
        Ok(Self {
            out_dir: out_dir.to_path_buf(),
        })
    }

    /// Снимок исходной таблицы
    pub fn write_raw(&self, name: &str, rows: &[RawPassenger]) -> PipelineResult<PathBuf> {
        self.write_records(name, rows)
    }

    /// Снимок таблицы после feature engineering
    pub fn write_engineered(&self, name: &str, rows: &[Passenger]) -> PipelineResult<PathBuf> {
        self.write_records(name, rows)
    }

    /// Submission-файл: PassengerId,Survived
    pub fn write_submission(
        &self,
        name: &str,
        ids: &[i32],
        labels: &[i32],
    ) -> PipelineResult<PathBuf> {
        let rows: Vec<SubmissionRow> = ids
            .iter()
            .zip(labels.iter())
            .map(|(&passenger_id, &survived)| SubmissionRow {
                passenger_id,
                survived,
            })
            .collect();
        self.write_records(name, &rows)
    }

    /// Сводка запуска в report.json
    pub fn write_report(&self, report: &PipelineReport) -> PipelineResult<PathBuf> {
        let path = self.out_dir.join("report.json");
        fs::write(&path, serde_json::to_string_pretty(report)?)?;
        Ok(path)
    }

    fn write_records<T: Serialize>(&self, name: &str, rows: &[T]) -> PipelineResult<PathBuf> {
        let path = self.out_dir.join(format!("{name}.csv"));
        let mut writer = csv::Writer::from_path(&path)?;
        for row in rows {
            writer.serialize(row)?;
        }
        writer.flush()?;

        tracing::debug!("Wrote {} rows to {}", rows.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_write_submission() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path()).unwrap();

        let path = exporter
            .write_submission("submission_test", &[892, 893], &[0, 1])
            .unwrap();

        let contents = fs::read_to_string(path).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next(), Some("PassengerId,Survived"));
        assert_eq!(lines.next(), Some("892,0"));
        assert_eq!(lines.next(), Some("893,1"));
        assert_eq!(lines.next(), None);
    }

    #[test]
    fn test_write_raw_preserves_kaggle_headers() {
        let dir = tempfile::tempdir().unwrap();
        let exporter = Exporter::new(dir.path()).unwrap();

        let row = RawPassenger {
            passenger_id: 1,
            survived: Some(0),
            pclass: 3,
            name: "Braund, Mr. Owen Harris".to_string(),
            sex: "male".to_string(),
            age: Some(22.0),
            sib_sp: 1,
            parch: 0,
            ticket: "A/5 21171".to_string(),
            fare: Some(7.25),
            cabin: None,
            embarked: Some("S".to_string()),
        };
        let path = exporter.write_raw("original", &[row]).unwrap();

        let contents = fs::read_to_string(path).unwrap();
        let header = contents.lines().next().unwrap();
        assert_eq!(
            header,
            "PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked"
        );
    }
}
