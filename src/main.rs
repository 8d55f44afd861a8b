/// CLI батч-пайплайна Titanic

use std::path::PathBuf;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use titanic_ml::pipeline::{self, PipelineConfig};

#[derive(Parser)]
#[command(
    name = "titanic-ml",
    about = "Feature engineering and survival models for the Titanic dataset"
)]
struct Cli {
    /// Путь к train.csv
    #[arg(long, default_value = "data/train.csv")]
    train: PathBuf,

    /// Путь к test.csv
    #[arg(long, default_value = "data/test.csv")]
    test: PathBuf,

    /// Директория для артефактов
    #[arg(long, default_value = "output")]
    out_dir: PathBuf,

    /// Seed для лесов
    #[arg(long, default_value_t = 42)]
    seed: u64,
}

fn main() -> anyhow::Result<()> {
    // Инициализация логирования
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let config = PipelineConfig {
        train_path: cli.train,
        test_path: cli.test,
        out_dir: cli.out_dir,
        seed: cli.seed,
    };

    let report = pipeline::run(&config)?;

    tracing::info!(
        "Pipeline finished: {} rows ({} train / {} test), {} ages imputed",
        report.rows_total,
        report.rows_train,
        report.rows_test,
        report.imputed_ages
    );
    for score in &report.scores {
        tracing::info!(
            "{}: training accuracy {:.3}",
            score.model,
            score.training_accuracy
        );
    }

    Ok(())
}
