//! Remote data sources: observed METARs and aerodromes from REDEMET, automatic
//! ground stations and their hourly measurements from INMET.

mod inmet;
mod redemet;

pub use inmet::*;
pub use redemet::*;

use anyhow::Error;
use async_trait::async_trait;
use time::{Date, PrimitiveDateTime};

use crate::SensorRecord;

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait MetarSource: Sync + Send {
    /// Observed report for `icao` at the given hour, `None` when the provider has none.
    async fn observed_metar(&self, icao: &str, hour: PrimitiveDateTime) -> Option<String>;
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SensorSource: Sync + Send {
    /// Every hourly record of `station` for one UTC day.
    async fn day_records(&self, station: &str, date: Date) -> Result<Vec<SensorRecord>, Error>;
}
