/// Модели выживаемости

pub mod conditional_forest;
pub mod decision_tree;
pub mod logistic;
pub mod random_forest;

pub use conditional_forest::ConditionalForest;
pub use decision_tree::SurvivalTree;
pub use logistic::LogisticModel;
pub use random_forest::RandomForest;
