use anyhow::{anyhow, Error};
use parquet::file::properties::WriterProperties;
use parquet::file::writer::SerializedFileWriter;
use parquet::record::RecordWriter;
use parquet_derive::ParquetRecordWriter;
use slog::{info, Logger};
use std::fmt;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use time::{macros::format_description, PrimitiveDateTime};

use crate::{Observation, Visibility};

/// Visibility stored for CAVOK reports.
pub const CAVOK_VISIBILITY: i64 = 9999;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// Model report read from the input directory
    Metaf,
    /// Observed report from REDEMET
    Metar,
    /// Synthesized report
    Metsar,
}

impl fmt::Display for ReportKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReportKind::Metaf => write!(f, "metaf"),
            ReportKind::Metar => write!(f, "metar"),
            ReportKind::Metsar => write!(f, "metsar"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, ParquetRecordWriter)]
pub struct ReportRecord {
    pub kind: String,
    pub aerodrome: String,
    pub date: String,
    pub time: String,
    pub temperature: Option<i64>,
    pub dewpoint: Option<i64>,
    pub wind_speed: Option<i64>,
    pub wind_direction: Option<i64>,
    pub wind_gust: Option<i64>,
    pub visibility: Option<i64>,
    pub qnh: Option<i64>,
    pub message: String,
}

impl ReportRecord {
    pub fn new(
        kind: ReportKind,
        aerodrome: &str,
        hour: PrimitiveDateTime,
        observation: &Observation,
    ) -> Result<Self, Error> {
        let date = hour
            .format(format_description!("[year]-[month]-[day]"))
            .map_err(|e| anyhow!("error formatting report date: {}", e))?;
        let time = hour
            .format(format_description!("[hour]:[minute]:[second]"))
            .map_err(|e| anyhow!("error formatting report time: {}", e))?;

        Ok(ReportRecord {
            kind: kind.to_string(),
            aerodrome: observation
                .identifier
                .clone()
                .unwrap_or_else(|| aerodrome.to_string()),
            date,
            time,
            temperature: observation.temperature.map(|t| t.celsius as i64),
            dewpoint: observation.dewpoint.map(|t| t.celsius as i64),
            wind_speed: observation.wind.speed.map(|s| s.kt as i64),
            wind_direction: observation.wind.degrees().map(|d| d as i64),
            wind_gust: observation.wind.gust.map(|g| g.kt as i64),
            visibility: observation.visibility.map(|v| match v {
                Visibility::Cavok => CAVOK_VISIBILITY,
                Visibility::Meters(meters) => meters as i64,
            }),
            qnh: observation.pressure.qnh_hpa().map(|q| q as i64),
            message: observation.raw.clone(),
        })
    }
}

/// `<data_dir>/<YYYY-MM-DD>/reports_<YYYYMMDDHH>.parquet`
pub fn reports_file_path(data_dir: &str, hour: PrimitiveDateTime) -> Result<PathBuf, Error> {
    let day = hour
        .format(format_description!("[year]-[month]-[day]"))
        .map_err(|e| anyhow!("error formatting folder date: {}", e))?;
    let stamp = hour
        .format(format_description!("[year][month][day][hour]"))
        .map_err(|e| anyhow!("error formatting file date: {}", e))?;
    Ok(Path::new(data_dir)
        .join(day)
        .join(format!("reports_{}.parquet", stamp)))
}

/// Writes all records of one hour as a single row group.
pub fn save_reports(logger: &Logger, records: &[ReportRecord], path: &Path) -> Result<(), Error> {
    let file =
        File::create(path).map_err(|e| anyhow!("failed to create parquet file: {}", e))?;
    let schema = records
        .schema()
        .map_err(|e| anyhow!("failed to build report schema: {}", e))?;
    let props = WriterProperties::builder().build();
    let mut writer = SerializedFileWriter::new(file, schema, Arc::new(props))
        .map_err(|e| anyhow!("failed to create parquet writer: {}", e))?;

    info!(
        logger,
        "writing {} reports to {}",
        records.len(),
        path.display()
    );
    let mut row_group = writer
        .next_row_group()
        .map_err(|e| anyhow!("failed to create row group: {}", e))?;
    records
        .write_to_row_group(&mut row_group)
        .map_err(|e| anyhow!("failed to write reports: {}", e))?;
    row_group
        .close()
        .map_err(|e| anyhow!("failed to close row group: {}", e))?;
    writer
        .close()
        .map_err(|e| anyhow!("failed to close parquet writer: {}", e))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decode;
    use parquet::file::reader::{FileReader, SerializedFileReader};
    use slog::{o, Discard};
    use time::macros::datetime;

    #[test]
    fn record_from_observation() {
        let hour = datetime!(2021-05-01 12:00);
        let observation = decode("METAR SBSP 011200Z 09012G25KT CAVOK M02/M05 Q1013=");
        let record = ReportRecord::new(ReportKind::Metaf, "SBSP", hour, &observation).unwrap();

        assert_eq!(record.kind, "metaf");
        assert_eq!(record.aerodrome, "SBSP");
        assert_eq!(record.date, "2021-05-01");
        assert_eq!(record.time, "12:00:00");
        assert_eq!(record.temperature, Some(-2));
        assert_eq!(record.dewpoint, Some(-5));
        assert_eq!(record.wind_speed, Some(12));
        assert_eq!(record.wind_direction, Some(90));
        assert_eq!(record.wind_gust, Some(25));
        assert_eq!(record.visibility, Some(CAVOK_VISIBILITY));
        assert_eq!(record.qnh, Some(1013));
        assert_eq!(record.message, observation.raw);
    }

    #[test]
    fn missing_fields_stay_empty() {
        let hour = datetime!(2021-05-01 12:00);
        let observation = decode("METAF SBXX 011200Z=");
        let record = ReportRecord::new(ReportKind::Metsar, "SBXX", hour, &observation).unwrap();
        assert_eq!(record.temperature, None);
        assert_eq!(record.visibility, None);
        assert_eq!(record.qnh, None);
        assert_eq!(record.wind_direction, None);
    }

    #[test]
    fn writes_one_row_per_report() {
        let dir = tempfile::tempdir().unwrap();
        let hour = datetime!(2021-05-01 12:00);
        let path = reports_file_path(dir.path().to_str().unwrap(), hour).unwrap();
        assert!(path.ends_with("2021-05-01/reports_2021050112.parquet"));
        std::fs::create_dir_all(path.parent().unwrap()).unwrap();

        let records: Vec<ReportRecord> = [
            (ReportKind::Metaf, "METAF SBSP 011200Z 09012KT 9999 22/18 Q1013="),
            (ReportKind::Metsar, "METSAR SBSP 011200Z 11004KT 9999 21/15 Q1015="),
            (ReportKind::Metaf, "METAF SBMT 011200Z 36005KT CAVOK 23/17 Q1014="),
        ]
        .iter()
        .map(|(kind, raw)| ReportRecord::new(*kind, "SBSP", hour, &decode(raw)).unwrap())
        .collect();

        let logger = Logger::root(Discard, o!());
        save_reports(&logger, &records, &path).unwrap();

        let reader = SerializedFileReader::new(File::open(&path).unwrap()).unwrap();
        assert_eq!(reader.metadata().file_metadata().num_rows(), 3);
    }
}
