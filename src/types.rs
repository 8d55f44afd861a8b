/// Типы данных для пайплайна Titanic

use serde::{Deserialize, Serialize};

/// Строка исходной таблицы пассажиров (train.csv / test.csv)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawPassenger {
    #[serde(rename = "PassengerId")]
    pub passenger_id: i32,
    // В тестовой выборке колонки Survived нет
    #[serde(rename = "Survived", default)]
    pub survived: Option<i32>,
    #[serde(rename = "Pclass")]
    pub pclass: i32,
    #[serde(rename = "Name")]
    pub name: String,
    #[serde(rename = "Sex")]
    pub sex: String,
    #[serde(rename = "Age")]
    pub age: Option<f64>,
    #[serde(rename = "SibSp")]
    pub sib_sp: i32,
    #[serde(rename = "Parch")]
    pub parch: i32,
    #[serde(rename = "Ticket")]
    pub ticket: String,
    #[serde(rename = "Fare")]
    pub fare: Option<f64>,
    #[serde(rename = "Cabin")]
    pub cabin: Option<String>,
    #[serde(rename = "Embarked")]
    pub embarked: Option<String>,
}

/// Пассажир после feature engineering: пропусков в age/fare/embarked уже нет
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Passenger {
    pub passenger_id: i32,
    pub survived: Option<i32>,
    pub pclass: i32,
    pub name: String,
    pub sex: String,
    pub age: f64,
    pub sib_sp: i32,
    pub parch: i32,
    pub ticket: String,
    pub fare: f64,
    pub cabin: Option<String>,
    pub embarked: String, // "C" | "Q" | "S"
    pub title: Option<String>,
    pub title_bin: String, // "title_1" | "title_2" | "title_3"
    pub surname: Option<String>,
    pub age_bin: String, // "0-12" | "18-25" | "other"
    pub family_size: i32,
    pub family_size_bin: String, // "singleton" | "1-4" | "1-11"
    pub family_id: String,
    pub mother: bool,
}

/// Итоги обучения одной модели
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ModelScore {
    pub model: String,
    pub training_accuracy: f64,
}

/// Сводка по запуску пайплайна (сериализуется в report.json)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineReport {
    pub generated_at: String,
    pub rows_total: usize,
    pub rows_train: usize,
    pub rows_test: usize,
    pub imputed_ages: usize,
    pub scores: Vec<ModelScore>,
}
