/// Модуль предобработки данных

pub mod feature_engineering;
pub mod imputation;

pub use feature_engineering::FeatureEngineer;
pub use imputation::AgeImputer;
