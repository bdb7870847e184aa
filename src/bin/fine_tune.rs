use forecast_tuner::{update_models, FineTuneConfig, ModelLayout, TunerError};
use std::path::PathBuf;
use std::process::ExitCode;

const REPORT_FILE_NAME: &str = "update_report.json";

fn run(root: PathBuf) -> Result<(), TunerError> {
    let layout = ModelLayout::new(root);
    let config = FineTuneConfig::default();
    log::info!(
        "Refreshing models in {} on {} to {}",
        layout.root().display(),
        config.window_start,
        config.window_end
    );

    let report = update_models(&layout, &config)?;

    let report_path = layout.root().join(REPORT_FILE_NAME);
    report.save(&report_path)?;

    for skipped in &report.skipped {
        log::info!("Skipped {}: {}", skipped.name, skipped.reason);
    }
    for fresh in &report.fresh_init {
        log::warn!("Fresh weights for {}: {}", fresh.name, fresh.reason);
    }
    log::info!(
        "Done: {} updated, {} skipped, report written to {}",
        report.updated.len(),
        report.skipped.len(),
        report_path.display()
    );
    Ok(())
}

fn main() -> ExitCode {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    // Optional working directory, defaults to the current one
    let root = std::env::args()
        .nth(1)
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from("."));

    match run(root) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Model refresh failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
