use pricecast::evaluation::{self, metrics, EvaluationError};
use pricecast::{config, telemetry};
use std::process::ExitCode;
use tracing::error;

fn main() -> ExitCode {
    telemetry::init_tracing();

    let config = match config::AppConfig::load() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "failed to load configuration");
            return ExitCode::FAILURE;
        }
    };

    match evaluation::run(&config) {
        Ok(report) => {
            println!("Train RMSE: {}", metrics::format_rmse(report.train.rmse));
            println!("Train R2:   {}", metrics::format_r2(report.train.r2));
            println!("Test RMSE:  {}", metrics::format_rmse(report.test.rmse));
            println!("Test R2:    {}", metrics::format_r2(report.test.r2));
            println!("Visualization saved to {}", config.evaluation.output_path.display());
            ExitCode::SUCCESS
        }
        Err(e @ EvaluationError::ModelMissing(_)) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
        Err(e) => {
            error!(error = %e, "evaluation failed");
            ExitCode::FAILURE
        }
    }
}
