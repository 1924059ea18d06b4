//! Aerodrome and ground station coordinates.
//!
//! A [`GeoTable`] is filled once at startup (built-in aerodromes, optionally the
//! provider's aerodrome list, and the operational ground stations) and then shared
//! read-only behind an `Arc`.

mod aerodromes;

use std::collections::{BTreeMap, HashMap};

/// Mean earth radius in kilometres.
pub const EARTH_RADIUS_KM: f64 = 6371.0;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Self {
        Coordinates {
            latitude,
            longitude,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GroundStation {
    pub id: String,
    pub coordinates: Coordinates,
    pub altitude_m: f64,
}

/// ICAO codes of the built-in aerodrome table, in alphabetical order.
pub fn builtin_aerodrome_codes() -> impl Iterator<Item = &'static str> {
    aerodromes::AERODROMES.iter().map(|(icao, _, _)| *icao)
}

/// Great-circle distance in kilometres between two points given in decimal degrees.
pub fn haversine_km(from: Coordinates, to: Coordinates) -> f64 {
    let lat_1 = from.latitude.to_radians();
    let lat_2 = to.latitude.to_radians();
    let d_lat = lat_2 - lat_1;
    let d_lng = (to.longitude - from.longitude).to_radians();

    let a = (d_lat / 2.0).sin().powi(2) + lat_1.cos() * lat_2.cos() * (d_lng / 2.0).sin().powi(2);

    2.0 * EARTH_RADIUS_KM * a.sqrt().asin()
}

#[derive(Debug, Default, Clone)]
pub struct GeoTable {
    aerodromes: HashMap<String, Coordinates>,
    // keyed by id so iteration order is stable
    stations: BTreeMap<String, GroundStation>,
}

impl GeoTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// A table preloaded with the built-in aerodrome coordinates and no stations.
    pub fn with_builtin_aerodromes() -> Self {
        let mut table = Self::new();
        for (icao, latitude, longitude) in aerodromes::AERODROMES {
            table.add_aerodrome(icao, Coordinates::new(*latitude, *longitude));
        }
        table
    }

    /// Adds or replaces an aerodrome. Identifiers are trimmed and upper-cased.
    pub fn add_aerodrome(&mut self, icao: &str, coordinates: Coordinates) {
        self.aerodromes
            .insert(icao.trim().to_uppercase(), coordinates);
    }

    /// Adds or replaces a ground station.
    pub fn add_station(&mut self, station: GroundStation) {
        self.stations.insert(station.id.clone(), station);
    }

    pub fn aerodrome(&self, icao: &str) -> Option<Coordinates> {
        self.aerodromes.get(icao).copied()
    }

    /// Ground stations ordered by identifier.
    pub fn stations(&self) -> impl Iterator<Item = &GroundStation> {
        self.stations.values()
    }

    pub fn aerodrome_count(&self) -> usize {
        self.aerodromes.len()
    }

    pub fn station_count(&self) -> usize {
        self.stations.len()
    }
}
