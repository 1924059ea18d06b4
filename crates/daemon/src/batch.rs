use anyhow::{anyhow, Error};
use frontline_core::{ensure_dir_exists, list_files_matching};
use slog::{debug, error, info, warn, Logger};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::{macros::format_description, Duration, OffsetDateTime, PrimitiveDateTime, Time};
use tokio::sync::Semaphore;
use tokio::task::JoinSet;

use crate::{
    decode, reports_file_path, save_reports, select_hour, MetarSource, Metsar, Observation,
    ObservationSynthesizer, ReportKind, ReportRecord, SensorSource, StationLocator,
};

/// Model reports are named `saida_carrapato_<ICAO>_<YYYYMMDDHH>.txt`.
pub const MODEL_REPORT_PREFIX: &str = "saida_carrapato_";

/// Parses `YYYY-MM-DDTHH:MM`, dropping the minutes.
pub fn parse_hour(text: &str) -> Result<PrimitiveDateTime, Error> {
    let parsed = PrimitiveDateTime::parse(
        text.trim(),
        format_description!("[year]-[month]-[day]T[hour]:[minute]"),
    )
    .map_err(|e| anyhow!("date format error ({}): {}", text, e))?;
    truncate_to_hour(parsed)
}

fn truncate_to_hour(moment: PrimitiveDateTime) -> Result<PrimitiveDateTime, Error> {
    let hour = Time::from_hms(moment.hour(), 0, 0)?;
    Ok(moment.replace_time(hour))
}

/// Current UTC hour.
pub fn current_hour() -> Result<PrimitiveDateTime, Error> {
    let now = OffsetDateTime::now_utc();
    truncate_to_hour(PrimitiveDateTime::new(now.date(), now.time()))
}

/// Hours to process for the `--dini`/`--dfnl` pair:
/// - neither: the current hour
/// - only the start: from the start up to the current hour (exclusive)
/// - only the end: the hour before the end
/// - both: from the start up to the end (exclusive)
pub fn hour_range(
    dini: Option<&str>,
    dfnl: Option<&str>,
    now: PrimitiveDateTime,
) -> Result<Vec<PrimitiveDateTime>, Error> {
    let now = truncate_to_hour(now)?;
    let (start, end) = match (dini, dfnl) {
        (None, None) => return Ok(vec![now]),
        (Some(dini), None) => (parse_hour(dini)?, now),
        (None, Some(dfnl)) => {
            let end = parse_hour(dfnl)?;
            (end - Duration::HOUR, end)
        }
        (Some(dini), Some(dfnl)) => (parse_hour(dini)?, parse_hour(dfnl)?),
    };

    let mut hours = vec![];
    let mut hour = start;
    while hour < end {
        hours.push(hour);
        hour += Duration::HOUR;
    }
    Ok(hours)
}

/// ICAO code embedded in a model report file name.
pub fn aerodrome_from_file_name(name: &str) -> Option<String> {
    let rest = name.strip_prefix(MODEL_REPORT_PREFIX)?;
    let (icao, _) = rest.split_once('_')?;
    let icao = icao.trim().to_uppercase();
    if icao.len() == 4 && icao.bytes().all(|b| b.is_ascii_alphanumeric()) {
        Some(icao)
    } else {
        None
    }
}

/// Model report files for one hour, optionally only for one aerodrome.
pub fn model_report_files(
    ticks_dir: &Path,
    hour: PrimitiveDateTime,
    code: Option<&str>,
) -> Result<Vec<PathBuf>, Error> {
    let stamp = hour.format(format_description!("[year][month][day][hour]"))?;
    let prefix = match code {
        Some(code) => format!("{}{}_", MODEL_REPORT_PREFIX, code),
        None => MODEL_REPORT_PREFIX.to_string(),
    };
    let files = list_files_matching(ticks_dir, &prefix, &format!("{}.txt", stamp))?;
    Ok(files
        .into_iter()
        .filter(|file| {
            file.file_name()
                .and_then(|name| name.to_str())
                .and_then(aerodrome_from_file_name)
                .is_some()
        })
        .collect())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    pub aerodrome: String,
    pub output: PathBuf,
    /// false when the model report was passed through unchanged
    pub synthesized: bool,
    pub records: Vec<ReportRecord>,
}

/// Turns one model report into a METSAR file.
pub struct AerodromePipeline {
    logger: Logger,
    locator: StationLocator,
    synthesizer: ObservationSynthesizer,
    sensors: Arc<dyn SensorSource>,
    metars: Option<Arc<dyn MetarSource>>,
    out_dir: PathBuf,
}

impl AerodromePipeline {
    pub fn new(
        logger: Logger,
        locator: StationLocator,
        sensors: Arc<dyn SensorSource>,
        metars: Option<Arc<dyn MetarSource>>,
        out_dir: PathBuf,
    ) -> Self {
        AerodromePipeline {
            synthesizer: ObservationSynthesizer::new(logger.clone()),
            logger,
            locator,
            sensors,
            metars,
            out_dir,
        }
    }

    pub async fn process(&self, file: &Path, hour: PrimitiveDateTime) -> Result<Outcome, Error> {
        let name = file
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("invalid model report path: {}", file.display()))?;
        let aerodrome = aerodrome_from_file_name(name)
            .ok_or_else(|| anyhow!("no ICAO code in file name: {}", name))?;
        let raw = tokio::fs::read_to_string(file)
            .await
            .map_err(|e| anyhow!("error reading {}: {}", file.display(), e))?;
        let raw = raw.trim();

        let decoded = decode(raw);
        let model = Observation {
            identifier: decoded.identifier.clone().or_else(|| Some(aerodrome.clone())),
            ..decoded
        };
        let mut records = vec![ReportRecord::new(ReportKind::Metaf, &aerodrome, hour, &model)?];

        if let Some(metars) = &self.metars {
            if let Some(metar) = metars.observed_metar(&aerodrome, hour).await {
                debug!(self.logger, "observed METAR for {}: {}", aerodrome, metar);
                records.push(ReportRecord::new(
                    ReportKind::Metar,
                    &aerodrome,
                    hour,
                    &decode(&metar),
                )?);
            }
        }

        let output = self.output_path(name);
        let (text, synthesized) = match self.metsar(&aerodrome, hour, &model).await {
            Some(metsar) => {
                records.push(ReportRecord::new(
                    ReportKind::Metsar,
                    &aerodrome,
                    hour,
                    &metsar.observation,
                )?);
                (metsar.text, true)
            }
            None => {
                warn!(
                    self.logger,
                    "{}: METSAR from model report (pass-through)", aerodrome
                );
                (raw.to_string(), false)
            }
        };

        tokio::fs::write(&output, &text)
            .await
            .map_err(|e| anyhow!("error writing {}: {}", output.display(), e))?;
        info!(self.logger, "{} -> {}", aerodrome, text);

        Ok(Outcome {
            aerodrome,
            output,
            synthesized,
            records,
        })
    }

    fn output_path(&self, name: &str) -> PathBuf {
        self.out_dir.join(name.replace("carrapato", "frontline"))
    }

    /// Writes the model report unchanged under its output name.
    pub async fn pass_through(&self, file: &Path) -> Result<PathBuf, Error> {
        let name = file
            .file_name()
            .and_then(|name| name.to_str())
            .ok_or_else(|| anyhow!("invalid model report path: {}", file.display()))?;
        let raw = tokio::fs::read_to_string(file)
            .await
            .map_err(|e| anyhow!("error reading {}: {}", file.display(), e))?;
        let output = self.output_path(name);
        tokio::fs::write(&output, raw.trim())
            .await
            .map_err(|e| anyhow!("error writing {}: {}", output.display(), e))?;
        Ok(output)
    }

    async fn metsar(
        &self,
        aerodrome: &str,
        hour: PrimitiveDateTime,
        model: &Observation,
    ) -> Option<Metsar> {
        let station = self.locator.locate(aerodrome)?;

        let records = match self
            .sensors
            .day_records(&station.station_id, hour.date())
            .await
        {
            Ok(records) => records,
            Err(e) => {
                error!(
                    self.logger,
                    "station data for {} not found: {}", station.station_id, e
                );
                return None;
            }
        };

        let Some(record) = select_hour(&records, hour.hour()) else {
            warn!(
                self.logger,
                "station {} has no record for {:02}00", station.station_id, hour.hour()
            );
            return None;
        };

        Some(
            self.synthesizer
                .synthesize(Some(record), model, station.altitude_m),
        )
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct HourSummary {
    pub files: usize,
    pub synthesized: usize,
    pub passed_through: usize,
    pub failed: usize,
}

/// Runs the pipeline over every model report of each hour, a bounded number of
/// aerodromes at a time. An hour is fully drained before the next one starts.
pub struct BatchRunner {
    logger: Logger,
    pipeline: Arc<AerodromePipeline>,
    ticks_dir: PathBuf,
    data_dir: String,
    max_workers: usize,
    code: Option<String>,
}

impl BatchRunner {
    pub fn new(
        logger: Logger,
        pipeline: AerodromePipeline,
        ticks_dir: PathBuf,
        data_dir: String,
        max_workers: usize,
        code: Option<String>,
    ) -> Self {
        BatchRunner {
            logger,
            pipeline: Arc::new(pipeline),
            ticks_dir,
            data_dir,
            max_workers: max_workers.max(1),
            code,
        }
    }

    pub async fn run(&self, hours: &[PrimitiveDateTime]) -> Result<HourSummary, Error> {
        let mut total = HourSummary::default();
        for hour in hours {
            info!(
                self.logger,
                "processing aerodrome: {} date: {}",
                self.code.as_deref().unwrap_or("all"),
                hour
            );
            let summary = self.run_hour(*hour).await?;
            total.files += summary.files;
            total.synthesized += summary.synthesized;
            total.passed_through += summary.passed_through;
            total.failed += summary.failed;
        }
        Ok(total)
    }

    pub async fn run_hour(&self, hour: PrimitiveDateTime) -> Result<HourSummary, Error> {
        let files = model_report_files(&self.ticks_dir, hour, self.code.as_deref())?;
        let mut summary = HourSummary {
            files: files.len(),
            ..Default::default()
        };
        if files.is_empty() {
            debug!(self.logger, "no model reports for {}", hour);
            return Ok(summary);
        }

        let semaphore = Arc::new(Semaphore::new(self.max_workers));
        let mut set = JoinSet::new();
        for file in files {
            let semaphore = Arc::clone(&semaphore);
            let pipeline = Arc::clone(&self.pipeline);
            set.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => {
                        // own task, so a panic comes back as a JoinError
                        let unit = {
                            let file = file.clone();
                            tokio::spawn(async move { pipeline.process(&file, hour).await })
                        };
                        unit.await
                            .unwrap_or_else(|e| Err(anyhow!("unit aborted: {}", e)))
                    }
                    Err(e) => Err(anyhow!("worker pool closed: {}", e)),
                };
                (file, result)
            });
        }

        let mut records = vec![];
        while let Some(joined) = set.join_next().await {
            match joined {
                Ok((_, Ok(outcome))) => {
                    if outcome.synthesized {
                        summary.synthesized += 1;
                    } else {
                        summary.passed_through += 1;
                    }
                    records.extend(outcome.records);
                }
                Ok((file, Err(e))) => {
                    error!(
                        self.logger,
                        "error processing model report {}: {}",
                        file.display(),
                        e
                    );
                    match self.pipeline.pass_through(&file).await {
                        Ok(output) => {
                            summary.passed_through += 1;
                            warn!(
                                self.logger,
                                "model report passed through to {}",
                                output.display()
                            );
                        }
                        Err(e) => {
                            summary.failed += 1;
                            error!(self.logger, "pass-through failed: {}", e);
                        }
                    }
                }
                Err(e) => {
                    summary.failed += 1;
                    error!(self.logger, "worker task failed: {}", e);
                }
            }
        }

        if !records.is_empty() {
            self.persist(hour, &records);
        }
        Ok(summary)
    }

    fn persist(&self, hour: PrimitiveDateTime, records: &[ReportRecord]) {
        let path = match reports_file_path(&self.data_dir, hour) {
            Ok(path) => path,
            Err(e) => {
                error!(self.logger, "{}", e);
                return;
            }
        };
        if let Some(folder) = path.parent() {
            ensure_dir_exists(folder);
        }
        if let Err(e) = save_reports(&self.logger, records, &path) {
            error!(self.logger, "error saving reports: {}", e);
        }
    }
}
