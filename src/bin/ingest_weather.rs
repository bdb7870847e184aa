use forecast_tuner::{CityCoordinates, IngestConfig, TunerError, WeatherIngester};
use std::path::PathBuf;
use std::process::ExitCode;

async fn run(city_file: Option<PathBuf>) -> Result<(), TunerError> {
    let cities = match city_file {
        Some(path) => {
            log::info!("Loading city coordinates from {}", path.display());
            CityCoordinates::load(&path)?
        }
        None => {
            log::info!("No city file given, using the built-in city list");
            CityCoordinates::default_cities()
        }
    };

    let config = IngestConfig::default();
    log::info!(
        "Fetching {} cities from {} to {}",
        cities.len(),
        config.start_date,
        config.end_date
    );
    let ingester = WeatherIngester::new(config)?;
    let report = ingester.ingest_all(&cities).await?;

    for failed in &report.failed_slices {
        log::warn!("Missing {} {}: {}", failed.city, failed.year, failed.reason);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> ExitCode {
    let env = env_logger::Env::default().default_filter_or("info");
    env_logger::init_from_env(env);

    let city_file = std::env::args().nth(1).map(PathBuf::from);
    match run(city_file).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("Ingestion failed: {}", e);
            ExitCode::FAILURE
        }
    }
}
