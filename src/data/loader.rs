//! Загрузка таблиц пассажиров из CSV

use std::path::Path;

use crate::error::{PipelineError, PipelineResult};
use crate::types::RawPassenger;

/// Колонки, без которых feature engineering невозможен
const REQUIRED_COLUMNS: [&str; 8] = [
    "Name", "Age", "SibSp", "Parch", "Fare", "Embarked", "Pclass", "Sex",
];

/// Читает одну выборку (train или test) и проверяет обязательные колонки
pub fn load_partition(path: &Path) -> PipelineResult<Vec<RawPassenger>> {
    let mut reader = csv::Reader::from_path(path)?;

    let headers = reader.headers()?.clone();
    for column in REQUIRED_COLUMNS {
        if !headers.iter().any(|h| h == column) {
            return Err(PipelineError::MissingColumn {
                column: column.to_string(),
                path: path.display().to_string(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.deserialize() {
        let row: RawPassenger = record?;
        rows.push(row);
    }

    if rows.is_empty() {
        return Err(PipelineError::EmptyInput(format!(
            "no rows in {}",
            path.display()
        )));
    }

    tracing::debug!("Loaded {} rows from {}", rows.len(), path.display());
    Ok(rows)
}

/// Объединяет train и test в одну таблицу (train идет первым)
pub fn load_combined(train: &Path, test: &Path) -> PipelineResult<Vec<RawPassenger>> {
    let mut rows = load_partition(train)?;
    rows.extend(load_partition(test)?);
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    const TRAIN_CSV: &str = "\
PassengerId,Survived,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
1,0,3,\"Braund, Mr. Owen Harris\",male,22,1,0,A/5 21171,7.25,,S
2,1,1,\"Cumings, Mrs. John Bradley (Florence Briggs Thayer)\",female,38,1,0,PC 17599,71.2833,C85,C
";

    const TEST_CSV: &str = "\
PassengerId,Pclass,Name,Sex,Age,SibSp,Parch,Ticket,Fare,Cabin,Embarked
892,3,\"Kelly, Mr. James\",male,34.5,0,0,330911,7.8292,,Q
893,3,\"Wilkes, Mrs. James (Ellen Needs)\",female,,1,0,363272,,,
";

    fn write_temp(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_load_train_partition() {
        let file = write_temp(TRAIN_CSV);
        let rows = load_partition(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].name, "Braund, Mr. Owen Harris");
        assert_eq!(rows[0].survived, Some(0));
        assert_eq!(rows[0].age, Some(22.0));
        assert_eq!(rows[0].embarked.as_deref(), Some("S"));
    }

    #[test]
    fn test_load_test_partition_without_survived() {
        let file = write_temp(TEST_CSV);
        let rows = load_partition(file.path()).unwrap();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].survived, None);
        // Пустые поля становятся None
        assert_eq!(rows[1].age, None);
        assert_eq!(rows[1].fare, None);
        assert_eq!(rows[1].embarked, None);
    }

    #[test]
    fn test_missing_column_is_fatal() {
        let file = write_temp("PassengerId,Pclass,Sex\n1,3,male\n");
        let err = load_partition(file.path()).unwrap_err();

        match err {
            PipelineError::MissingColumn { column, .. } => assert_eq!(column, "Name"),
            other => panic!("expected MissingColumn, got {other}"),
        }
    }

    #[test]
    fn test_combined_keeps_train_first() {
        let train = write_temp(TRAIN_CSV);
        let test = write_temp(TEST_CSV);
        let rows = load_combined(train.path(), test.path()).unwrap();

        assert_eq!(rows.len(), 4);
        assert!(rows[0].survived.is_some());
        assert!(rows[2].survived.is_none());
        assert_eq!(rows[2].passenger_id, 892);
    }
}
