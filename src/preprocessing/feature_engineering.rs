//! Feature engineering для таблицы пассажиров

use ndarray::{Array1, Array2};
use once_cell::sync::Lazy;
use regex::Regex;

use crate::preprocessing::imputation::AgeImputer;
use crate::types::{Passenger, RawPassenger};

/// Медианный тариф третьего класса, фиксированная константа
pub const FALLBACK_FARE: f64 = 8.05;
/// Порт посадки по умолчанию
pub const FALLBACK_EMBARKED: &str = "C";
/// Сентинел для семей с family_size <= 2
pub const SMALL_FAMILY_ID: &str = "small_family_unit";

// Корзины титулов - фиксированные списки, не выводятся из данных
const TITLE_BIN_1: [&str; 5] = ["Capt", "Don", "Jonkheer", "Rev", "Mr"];
const TITLE_BIN_2: [&str; 4] = ["Col", "Dr", "Major", "Master"];

static TITLE_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)([A-Za-z]+)\.").unwrap());
static SURNAME_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([^,]+),").unwrap());

pub struct FeatureEngineer;

impl FeatureEngineer {
    /// Гоноратив перед точкой, без самой точки. None, если совпадения нет
    pub fn extract_title(name: &str) -> Option<String> {
        TITLE_RE.captures(name).map(|caps| caps[1].to_string())
    }

    pub fn bin_title(title: Option<&str>) -> String {
        match title {
            Some(t) if TITLE_BIN_1.contains(&t) => "title_1".to_string(),
            Some(t) if TITLE_BIN_2.contains(&t) => "title_2".to_string(),
            // Несовпавшие и пропущенные титулы попадают в общую корзину
            _ => "title_3".to_string(),
        }
    }

    /// Фамилия - токен до первой запятой
    pub fn extract_surname(name: &str) -> Option<String> {
        SURNAME_RE
            .captures(name)
            .map(|caps| caps[1].trim().to_string())
    }

    /// Диапазоны [0,12], (12,18], (18,25], (25,80]; средние два и хвост
    /// схлопнуты в "other"
    pub fn bin_age(age: f64) -> String {
        if (0.0..=12.0).contains(&age) {
            "0-12".to_string()
        } else if age > 18.0 && age <= 25.0 {
            "18-25".to_string()
        } else {
            "other".to_string()
        }
    }

    pub fn family_size(sib_sp: i32, parch: i32) -> i32 {
        sib_sp + parch + 1
    }

    pub fn bin_family_size(family_size: i32) -> String {
        if family_size <= 1 {
            "singleton".to_string()
        } else if family_size <= 4 {
            "1-4".to_string()
        } else {
            "1-11".to_string()
        }
    }

    /// Фамилия + размер семьи; маленькие семьи схлопываются в сентинел
    pub fn family_id(surname: Option<&str>, family_size: i32) -> String {
        if family_size <= 2 {
            return SMALL_FAMILY_ID.to_string();
        }
        format!("{}_{}", surname.unwrap_or("unknown"), family_size)
    }

    pub fn is_mother(sex: &str, parch: i32, age: f64, title: Option<&str>) -> bool {
        sex == "female" && parch != 0 && age > 18.0 && title != Some("Miss")
    }

    /// Полная последовательность преобразований. Порядок шагов фиксирован:
    /// поздние шаги зависят от колонок, выведенных ранними
    pub fn derive(rows: &[RawPassenger]) -> Result<Vec<Passenger>, String> {
        if rows.is_empty() {
            return Err("No passengers provided".to_string());
        }

        // Шаги 1-3: титул и фамилия
        let titles: Vec<Option<String>> =
            rows.iter().map(|r| Self::extract_title(&r.name)).collect();
        let surnames: Vec<Option<String>> = rows
            .iter()
            .map(|r| Self::extract_surname(&r.name))
            .collect();

        // Шаг 4: импутация возраста деревом регрессии
        let imputer = AgeImputer::fit(rows)?;
        let ages = rows
            .iter()
            .map(|r| imputer.impute(r))
            .collect::<Result<Vec<f64>, String>>()?;

        // Шаги 5-11: корзины, семейные признаки, константные импутации
        let mut passengers = Vec::with_capacity(rows.len());
        for (i, row) in rows.iter().enumerate() {
            let age = ages[i];
            let title = titles[i].clone();
            let surname = surnames[i].clone();
            let family_size = Self::family_size(row.sib_sp, row.parch);
            let embarked = match row.embarked.as_deref() {
                Some(port) if !port.is_empty() => port.to_string(),
                _ => FALLBACK_EMBARKED.to_string(),
            };

            passengers.push(Passenger {
                passenger_id: row.passenger_id,
                survived: row.survived,
                pclass: row.pclass,
                name: row.name.clone(),
                sex: row.sex.clone(),
                age,
                sib_sp: row.sib_sp,
                parch: row.parch,
                ticket: row.ticket.clone(),
                fare: row.fare.unwrap_or(FALLBACK_FARE),
                cabin: row.cabin.clone(),
                embarked,
                title_bin: Self::bin_title(title.as_deref()),
                age_bin: Self::bin_age(age),
                family_size,
                family_size_bin: Self::bin_family_size(family_size),
                family_id: Self::family_id(surname.as_deref(), family_size),
                mother: Self::is_mother(&row.sex, row.parch, age, title.as_deref()),
                title,
                surname,
            });
        }

        Ok(passengers)
    }

    /// Матрица признаков для моделей выживаемости: {title_bin, age, pclass, sib_sp}
    pub fn survival_features(passengers: &[Passenger]) -> Array2<f64> {
        let mut features = Array2::zeros((passengers.len(), 4));
        for (i, p) in passengers.iter().enumerate() {
            features[[i, 0]] = Self::encode_title_bin(&p.title_bin);
            features[[i, 1]] = p.age;
            features[[i, 2]] = p.pclass as f64;
            features[[i, 3]] = p.sib_sp as f64;
        }
        features
    }

    pub fn survival_targets(passengers: &[Passenger]) -> Array1<f64> {
        passengers
            .iter()
            .map(|p| p.survived.unwrap_or(0) as f64)
            .collect()
    }

    fn encode_title_bin(title_bin: &str) -> f64 {
        match title_bin {
            "title_1" => 1.0,
            "title_2" => 2.0,
            _ => 3.0,
        }
    }
}
