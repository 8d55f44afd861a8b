/// Загрузка и выгрузка таблиц

pub mod exporter;
pub mod loader;

pub use exporter::Exporter;
pub use loader::{load_combined, load_partition};
