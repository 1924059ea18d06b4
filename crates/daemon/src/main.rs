use frontline::{
    current_hour, get_config_info, hour_range, setup_logger, AerodromePipeline, BatchRunner, Cli,
    GeoTable, HttpFetcher, InmetClient, MetarSource, RedemetClient, SensorSource, StationLocator,
};
use frontline_core::ensure_dir_exists;
use slog::{error, info, warn, Logger};
use std::{path::PathBuf, sync::Arc};

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    let cli = get_config_info();
    let logger = setup_logger(&cli);

    info!(logger, "Frontline starting...");
    info!(logger, "  Model reports dir: {}", cli.ticks_dir());
    info!(logger, "  METSAR output dir: {}", cli.out_dir());
    info!(logger, "  Data dir: {}", cli.data_dir());
    info!(logger, "  Max station distance: {} km", cli.max_distance_km());
    info!(logger, "  Workers: {}", cli.max_workers());

    let hours = hour_range(cli.dini.as_deref(), cli.dfnl.as_deref(), current_hour()?)?;
    if hours.is_empty() {
        warn!(logger, "empty date range, nothing to do");
        return Ok(());
    }

    let result = run(&cli, &logger, &hours).await;
    if let Err(err) = &result {
        error!(logger, "Error processing reports: {}", err);
    }
    result
}

async fn run(
    cli: &Cli,
    logger: &Logger,
    hours: &[time::PrimitiveDateTime],
) -> Result<(), anyhow::Error> {
    let fetcher = Arc::new(HttpFetcher::new(
        logger.clone(),
        cli.user_agent(),
        cli.request_timeout(),
    )?);

    let mut geo = GeoTable::with_builtin_aerodromes();

    let redemet = cli
        .redemet_key()
        .map(|key| RedemetClient::new(logger.clone(), fetcher.clone(), key));
    match &redemet {
        Some(redemet) => match redemet.aerodromes().await {
            Ok(aerodromes) => {
                for (icao, coordinates) in aerodromes {
                    geo.add_aerodrome(&icao, coordinates);
                }
            }
            Err(err) => error!(logger, "REDEMET aerodromes list not loaded: {}", err),
        },
        None => warn!(logger, "no REDEMET key, observed METARs disabled"),
    }

    let inmet = InmetClient::new(logger.clone(), fetcher.clone());
    match inmet.stations().await {
        Ok(stations) => {
            for station in stations {
                geo.add_station(station);
            }
        }
        Err(err) => error!(logger, "INMET automatic stations not loaded: {}", err),
    }
    info!(
        logger,
        "aerodromes: {} stations: {}",
        geo.aerodrome_count(),
        geo.station_count()
    );

    let out_dir = PathBuf::from(cli.out_dir());
    if !ensure_dir_exists(&out_dir) {
        return Err(anyhow::anyhow!(
            "unable to create output folder: {}",
            out_dir.display()
        ));
    }

    let locator = StationLocator::new(logger.clone(), Arc::new(geo), cli.max_distance_km());
    let sensors: Arc<dyn SensorSource> = Arc::new(inmet);
    let metars = redemet.map(|redemet| Arc::new(redemet) as Arc<dyn MetarSource>);
    let pipeline = AerodromePipeline::new(logger.clone(), locator, sensors, metars, out_dir);

    let runner = BatchRunner::new(
        logger.clone(),
        pipeline,
        PathBuf::from(cli.ticks_dir()),
        cli.data_dir(),
        cli.max_workers(),
        cli.code(),
    );
    let summary = runner.run(hours).await?;
    info!(
        logger,
        "done: {} reports, {} synthesized, {} passed through, {} failed",
        summary.files,
        summary.synthesized,
        summary.passed_through,
        summary.failed
    );
    Ok(())
}
