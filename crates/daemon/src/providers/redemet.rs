use anyhow::{anyhow, Error};
use async_trait::async_trait;
use serde::Deserialize;
use slog::{debug, error, info, Logger};
use std::sync::Arc;
use time::{macros::format_description, PrimitiveDateTime};

use crate::{lenient_f64, Coordinates, HttpFetcher, MetarSource};

pub const REDEMET_BASE_URL: &str = "https://api-redemet.decea.mil.br";

#[derive(Debug, Deserialize)]
struct Envelope<T> {
    #[serde(default)]
    status: bool,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct MetarPage {
    #[serde(default)]
    data: Vec<MetarMessage>,
}

#[derive(Debug, Deserialize)]
struct MetarMessage {
    mens: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AerodromeEntry {
    cod: Option<String>,
    #[serde(default, deserialize_with = "lenient_f64")]
    lat_dec: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    lon_dec: Option<f64>,
}

/// First message of a METAR query response.
pub fn metar_from_json(body: &str) -> Result<Option<String>, Error> {
    let envelope: Envelope<MetarPage> = serde_json::from_str(body)?;
    if !envelope.status {
        return Err(anyhow!("status error"));
    }
    Ok(envelope
        .data
        .and_then(|page| page.data.into_iter().next())
        .and_then(|message| message.mens)
        .map(|mens| mens.trim().to_string())
        .filter(|mens| !mens.is_empty()))
}

/// Aerodrome list, identifiers trimmed and upper-cased, missing coordinates as 0.0.
pub fn aerodromes_from_json(body: &str) -> Result<Vec<(String, Coordinates)>, Error> {
    let envelope: Envelope<Vec<AerodromeEntry>> = serde_json::from_str(body)?;
    if !envelope.status {
        return Err(anyhow!("aerodromes list status error"));
    }
    Ok(envelope
        .data
        .unwrap_or_default()
        .into_iter()
        .filter_map(|entry| {
            let icao = entry.cod?.trim().to_uppercase();
            Some((
                icao,
                Coordinates::new(entry.lat_dec.unwrap_or(0.0), entry.lon_dec.unwrap_or(0.0)),
            ))
        })
        .filter(|(icao, _)| !icao.is_empty())
        .collect())
}

pub struct RedemetClient {
    logger: Logger,
    fetcher: Arc<HttpFetcher>,
    base_url: String,
    api_key: String,
}

impl RedemetClient {
    pub fn new(logger: Logger, fetcher: Arc<HttpFetcher>, api_key: String) -> Self {
        RedemetClient {
            logger,
            fetcher,
            base_url: REDEMET_BASE_URL.to_string(),
            api_key,
        }
    }

    pub fn with_base_url(mut self, base_url: &str) -> Self {
        self.base_url = base_url.trim_end_matches('/').to_string();
        self
    }

    fn aerodromes_url(&self) -> String {
        format!(
            "{}/aerodromos/?api_key={}&pais=Brasil",
            self.base_url, self.api_key
        )
    }

    fn metar_url(&self, icao: &str, hour: PrimitiveDateTime) -> Result<String, Error> {
        let date = hour
            .format(format_description!("[year][month][day][hour]"))
            .map_err(|e| anyhow!("error formatting REDEMET date: {}", e))?;
        Ok(format!(
            "{}/mensagens/metar/{}?api_key={}&data_ini={}&data_fim={}",
            self.base_url, icao, self.api_key, date, date
        ))
    }

    pub async fn aerodromes(&self) -> Result<Vec<(String, Coordinates)>, Error> {
        let url = self.aerodromes_url();
        let body = self.fetcher.fetch_text(&url).await?;
        let aerodromes = aerodromes_from_json(&body)?;
        info!(self.logger, "REDEMET aerodromes: {}", aerodromes.len());
        Ok(aerodromes)
    }
}

#[async_trait]
impl MetarSource for RedemetClient {
    async fn observed_metar(&self, icao: &str, hour: PrimitiveDateTime) -> Option<String> {
        let url = match self.metar_url(icao, hour) {
            Ok(url) => url,
            Err(e) => {
                error!(self.logger, "{}", e);
                return None;
            }
        };

        let body = match self.fetcher.fetch_text(&url).await {
            Ok(body) => body,
            Err(e) => {
                error!(self.logger, "REDEMET data for {} not found: {}", icao, e);
                return None;
            }
        };
        match metar_from_json(&body) {
            Ok(Some(metar)) => Some(metar),
            Ok(None) => {
                debug!(self.logger, "REDEMET has no METAR for {} at {}", icao, hour);
                None
            }
            Err(e) => {
                error!(self.logger, "REDEMET data for {} unusable: {}", icao, e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use slog::{o, Discard};
    use time::macros::datetime;

    fn client() -> RedemetClient {
        let logger = Logger::root(Discard, o!());
        let fetcher = HttpFetcher::new(logger.clone(), "frontline-test".to_string(), 1).unwrap();
        RedemetClient::new(logger, Arc::new(fetcher), "secret".to_string())
    }

    #[test]
    fn request_urls() {
        let client = client();
        assert_eq!(
            client.metar_url("SBSP", datetime!(2021-05-01 09:00)).unwrap(),
            "https://api-redemet.decea.mil.br/mensagens/metar/SBSP?api_key=secret\
             &data_ini=2021050109&data_fim=2021050109"
        );

        let local = client.with_base_url("http://localhost:8080/");
        assert_eq!(
            local.aerodromes_url(),
            "http://localhost:8080/aerodromos/?api_key=secret&pais=Brasil"
        );
    }

    #[test]
    fn first_metar_message() {
        let body = r#"{"status": true, "message": 200, "data": {"current_page": 1,
            "data": [{"id_localidade": "SBSP", "validade_inicial": "2021-05-01 12:00:00",
                      "mens": " METAR SBSP 011200Z 09012KT 9999 22/18 Q1013= "}]}}"#;
        assert_eq!(
            metar_from_json(body).unwrap().as_deref(),
            Some("METAR SBSP 011200Z 09012KT 9999 22/18 Q1013=")
        );
    }

    #[test]
    fn empty_or_failed_metar_responses() {
        let empty = r#"{"status": true, "data": {"data": []}}"#;
        assert_eq!(metar_from_json(empty).unwrap(), None);

        let no_data = r#"{"status": true}"#;
        assert_eq!(metar_from_json(no_data).unwrap(), None);

        let no_mens = r#"{"status": true, "data": {"data": [{"id_localidade": "SBSP"}]}}"#;
        assert_eq!(metar_from_json(no_mens).unwrap(), None);

        assert!(metar_from_json(r#"{"status": false, "data": null}"#).is_err());
        assert!(metar_from_json("<html>").is_err());
    }

    #[test]
    fn aerodrome_list() {
        let body = r#"{"status": true, "data": [
            {"cod": " sbsp", "lat_dec": "-23.62", "lon_dec": -46.656389},
            {"cod": "SBXX", "lat_dec": null, "lon_dec": ""},
            {"nome": "no code"}
        ]}"#;
        let aerodromes = aerodromes_from_json(body).unwrap();
        assert_eq!(
            aerodromes,
            vec![
                ("SBSP".to_string(), Coordinates::new(-23.62, -46.656389)),
                ("SBXX".to_string(), Coordinates::new(0.0, 0.0)),
            ]
        );
    }
}
