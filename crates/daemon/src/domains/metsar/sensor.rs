use serde::Deserialize;
use time::{macros::format_description, Date};

use crate::{lenient_f64, ReportTime};

#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum SensorError {
    #[error("invalid measurement date: {0}")]
    InvalidDate(String),
    #[error("invalid measurement hour: {0}")]
    InvalidHour(String),
}

/// One hourly record of an automatic ground station.
///
/// Every measured value may arrive as a JSON string, a number or null, so they all
/// go through [`lenient_f64`].
#[derive(Debug, Clone, PartialEq, Default, Deserialize)]
pub struct SensorRecord {
    #[serde(rename = "CD_ESTACAO", default)]
    pub station_id: Option<String>,
    /// `YYYY-MM-DD`
    #[serde(rename = "DT_MEDICAO")]
    pub date: String,
    /// `HHMM`, UTC
    #[serde(rename = "HR_MEDICAO")]
    pub hour: String,
    /// Dry bulb temperature, °C
    #[serde(rename = "TEM_INS", default, deserialize_with = "lenient_f64")]
    pub temperature_c: Option<f64>,
    /// Dew point, °C
    #[serde(rename = "PTO_INS", default, deserialize_with = "lenient_f64")]
    pub dewpoint_c: Option<f64>,
    /// Degrees true
    #[serde(rename = "VEN_DIR", default, deserialize_with = "lenient_f64")]
    pub wind_direction: Option<f64>,
    /// m/s
    #[serde(rename = "VEN_VEL", default, deserialize_with = "lenient_f64")]
    pub wind_speed_mps: Option<f64>,
    /// m/s
    #[serde(rename = "VEN_RAJ", default, deserialize_with = "lenient_f64")]
    pub wind_gust_mps: Option<f64>,
    /// Station level pressure (QFE), hPa
    #[serde(rename = "PRE_INS", default, deserialize_with = "lenient_f64")]
    pub station_pressure_hpa: Option<f64>,
}

impl SensorRecord {
    /// Hour of day of the measurement, from the first two digits of `HR_MEDICAO`.
    pub fn hour_of_day(&self) -> Option<u8> {
        let hour = self.hour.trim();
        if hour.len() != 4 || !hour.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        hour[0..2].parse().ok().filter(|h| *h < 24)
    }

    /// Day of month from `DT_MEDICAO` combined with `HR_MEDICAO`.
    pub fn report_time(&self) -> Result<ReportTime, SensorError> {
        let date = Date::parse(self.date.trim(), format_description!("[year]-[month]-[day]"))
            .map_err(|_| SensorError::InvalidDate(self.date.clone()))?;
        let hour = self
            .hour_of_day()
            .ok_or_else(|| SensorError::InvalidHour(self.hour.clone()))?;
        let minute: u8 = self.hour.trim()[2..4]
            .parse()
            .ok()
            .filter(|m| *m < 60)
            .ok_or_else(|| SensorError::InvalidHour(self.hour.clone()))?;

        Ok(ReportTime {
            day: date.day(),
            hour,
            minute,
        })
    }
}

/// Picks the record measured at `hour` (UTC) out of a day of records.
pub fn select_hour(records: &[SensorRecord], hour: u8) -> Option<&SensorRecord> {
    records
        .iter()
        .find(|record| record.hour_of_day() == Some(hour))
}
