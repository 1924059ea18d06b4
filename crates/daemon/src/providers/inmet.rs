use anyhow::{anyhow, Error};
use async_trait::async_trait;
use serde::Deserialize;
use slog::{debug, info, warn, Logger};
use std::collections::HashMap;
use std::sync::Arc;
use time::{macros::format_description, Date};
use tokio::sync::Mutex;

use crate::{lenient_f64, Coordinates, GroundStation, HttpFetcher, SensorRecord, SensorSource};

pub const INMET_BASE_URL: &str = "https://apitempo.inmet.gov.br";

/// Situation of a station that is currently reporting.
pub const OPERATIONAL: &str = "Operante";

#[derive(Debug, Deserialize)]
struct StationEntry {
    #[serde(rename = "CD_ESTACAO")]
    id: Option<String>,
    #[serde(rename = "CD_SITUACAO")]
    situation: Option<String>,
    #[serde(rename = "VL_LATITUDE", default, deserialize_with = "lenient_f64")]
    latitude: Option<f64>,
    #[serde(rename = "VL_LONGITUDE", default, deserialize_with = "lenient_f64")]
    longitude: Option<f64>,
    #[serde(rename = "VL_ALTITUDE", default, deserialize_with = "lenient_f64")]
    altitude: Option<f64>,
}

/// Operational automatic stations out of the station list. A missing altitude is
/// stored as 0 m, stations without coordinates are skipped.
pub fn stations_from_json(body: &str) -> Result<Vec<GroundStation>, Error> {
    let entries: Vec<StationEntry> = serde_json::from_str(body)?;
    Ok(entries
        .into_iter()
        .filter(|entry| entry.situation.as_deref() == Some(OPERATIONAL))
        .filter_map(|entry| {
            Some(GroundStation {
                id: entry.id?.trim().to_string(),
                coordinates: Coordinates::new(entry.latitude?, entry.longitude?),
                altitude_m: entry.altitude.unwrap_or(0.0),
            })
        })
        .collect())
}

/// Station records already fetched, keyed by station and day. Only the latest day is
/// kept, since hours are processed in order.
type DayCache = HashMap<(String, Date), Vec<SensorRecord>>;

pub struct InmetClient {
    logger: Logger,
    fetcher: Arc<HttpFetcher>,
    base_url: String,
    days: Mutex<DayCache>,
}

impl InmetClient {
    pub fn new(logger: Logger, fetcher: Arc<HttpFetcher>) -> Self {
        InmetClient {
            logger,
            fetcher,
            base_url: INMET_BASE_URL.to_string(),
            days: Mutex::new(HashMap::new()),
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn stations_url(&self) -> String {
        format!("{}/estacoes/T", self.base_url)
    }

    fn day_url(&self, station: &str, date: Date) -> Result<String, Error> {
        let day = date.format(format_description!("[year]-[month]-[day]"))?;
        Ok(format!("{}/estacao/{}/{}/{}", self.base_url, day, day, station))
    }

    pub async fn stations(&self) -> Result<Vec<GroundStation>, Error> {
        let url = self.stations_url();
        let body = self.fetcher.fetch_text(&url).await?;
        let stations = stations_from_json(&body)?;
        if stations.is_empty() {
            warn!(self.logger, "INMET returned no operational stations");
        } else {
            info!(self.logger, "INMET operational stations: {}", stations.len());
        }
        Ok(stations)
    }
}

#[async_trait]
impl SensorSource for InmetClient {
    async fn day_records(&self, station: &str, date: Date) -> Result<Vec<SensorRecord>, Error> {
        let key = (station.to_string(), date);
        if let Some(records) = self.days.lock().await.get(&key) {
            debug!(self.logger, "INMET day for {} on {} from cache", station, date);
            return Ok(records.clone());
        }

        let url = self.day_url(station, date)?;
        let body = self.fetcher.fetch_text(&url).await?;
        let records: Vec<SensorRecord> = serde_json::from_str(&body)
            .map_err(|e| anyhow!("INMET data for {} on {} unusable: {}", station, date, e))?;

        let mut days = self.days.lock().await;
        days.retain(|(_, day), _| *day == date);
        days.insert(key, records.clone());
        Ok(records)
    }
}
