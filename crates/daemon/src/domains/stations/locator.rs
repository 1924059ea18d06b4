use slog::{debug, error, warn, Logger};
use std::sync::Arc;

use crate::{haversine_km, GeoTable};

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum LocateError {
    #[error("ICAO code {0} not found in table")]
    UnknownAerodrome(String),
    #[error("no ground stations loaded")]
    NoStations,
    #[error("nearest station to {aerodrome} is {station} at {distance_km:.2} km (limit {max_distance_km} km)")]
    OutOfRange {
        aerodrome: String,
        station: String,
        distance_km: f64,
        max_distance_km: f64,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearestStation {
    pub station_id: String,
    pub altitude_m: f64,
    pub distance_km: f64,
}

/// Resolves an aerodrome to the closest operational ground station.
pub struct StationLocator {
    logger: Logger,
    geo: Arc<GeoTable>,
    max_distance_km: f64,
}

impl StationLocator {
    pub fn new(logger: Logger, geo: Arc<GeoTable>, max_distance_km: f64) -> Self {
        StationLocator {
            logger,
            geo,
            max_distance_km,
        }
    }

    /// Linear scan over every station. On an exact tie the station that sorts first
    /// by identifier is kept.
    pub fn nearest(&self, icao: &str) -> Result<NearestStation, LocateError> {
        let aerodrome = self
            .geo
            .aerodrome(icao)
            .ok_or_else(|| LocateError::UnknownAerodrome(icao.to_string()))?;

        let mut nearest: Option<NearestStation> = None;
        for station in self.geo.stations() {
            let distance_km = haversine_km(aerodrome, station.coordinates);
            let closer = match &nearest {
                Some(best) => distance_km < best.distance_km,
                None => true,
            };
            if closer {
                nearest = Some(NearestStation {
                    station_id: station.id.clone(),
                    altitude_m: station.altitude_m,
                    distance_km,
                });
            }
        }

        let nearest = nearest.ok_or(LocateError::NoStations)?;
        debug!(
            self.logger,
            "near station of {} is {} @ dst: {:.2} km alt: {:.2} m",
            icao,
            nearest.station_id,
            nearest.distance_km,
            nearest.altitude_m
        );

        if nearest.distance_km > self.max_distance_km {
            return Err(LocateError::OutOfRange {
                aerodrome: icao.to_string(),
                station: nearest.station_id,
                distance_km: nearest.distance_km,
                max_distance_km: self.max_distance_km,
            });
        }
        Ok(nearest)
    }

    /// Like [`StationLocator::nearest`], logging the failure instead of returning it.
    pub fn locate(&self, icao: &str) -> Option<NearestStation> {
        match self.nearest(icao) {
            Ok(station) => Some(station),
            Err(err @ LocateError::OutOfRange { .. }) => {
                warn!(self.logger, "near station too far: {}", err);
                None
            }
            Err(err) => {
                error!(self.logger, "{}", err);
                None
            }
        }
    }
}
