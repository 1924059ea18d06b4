use slog::{debug, warn, Logger};
use std::ops::RangeInclusive;

use crate::{
    Observation, Pressure, SensorRecord, Speed, Temperature, Visibility, Wind, WindDirection,
};

/// Sensor temperatures further than this from the model are not trusted.
pub const TEMPERATURE_TOLERANCE_C: i16 = 10;

/// Sensor temperatures outside this range are instrument faults and are ignored.
pub const PLAUSIBLE_TEMPERATURE_C: RangeInclusive<f64> = -90.0..=60.0;

/// A gust is only reported when it exceeds the mean speed by at least this many knots.
pub const GUST_MIN_EXCESS_KT: u16 = 10;

/// The canonical observation together with its encoded form.
#[derive(Debug, Clone, PartialEq)]
pub struct Metsar {
    pub observation: Observation,
    pub text: String,
}

/// Merges a ground station measurement with a decoded model report, field by field.
pub struct ObservationSynthesizer {
    logger: Logger,
}

impl ObservationSynthesizer {
    pub fn new(logger: Logger) -> Self {
        ObservationSynthesizer { logger }
    }

    pub fn synthesize(
        &self,
        sensor: Option<&SensorRecord>,
        model: &Observation,
        altitude_m: f64,
    ) -> Metsar {
        let time = match sensor.map(SensorRecord::report_time) {
            Some(Ok(time)) => Some(time),
            Some(Err(err)) => {
                warn!(self.logger, "using model time: {}", err);
                model.time
            }
            None => model.time,
        };

        let temperature = self.temperature(
            "temperature",
            sensor.and_then(|s| s.temperature_c),
            model.temperature,
        );
        let dewpoint = self.temperature(
            "dewpoint",
            sensor.and_then(|s| s.dewpoint_c),
            model.dewpoint,
        );

        let mut observation = Observation {
            identifier: model.identifier.clone(),
            time,
            wind: wind(sensor, &model.wind),
            visibility: model.visibility,
            temperature: Some(temperature),
            dewpoint: Some(dewpoint),
            pressure: pressure(sensor, &model.pressure, altitude_m),
            ..Default::default()
        };
        let text = render(&observation);
        observation.raw = text.clone();

        Metsar { observation, text }
    }

    fn temperature(
        &self,
        field: &str,
        sensor_c: Option<f64>,
        model: Option<Temperature>,
    ) -> Temperature {
        let sensor_c = match sensor_c {
            Some(c) if !PLAUSIBLE_TEMPERATURE_C.contains(&c) => {
                warn!(self.logger, "{} from sensor ({}) ignored", field, c);
                None
            }
            other => other.map(|c| c.trunc() as i16),
        };
        let celsius = match (sensor_c, model.map(|t| t.celsius)) {
            (Some(sensor), Some(model))
                if (i32::from(sensor) - i32::from(model)).abs()
                    <= i32::from(TEMPERATURE_TOLERANCE_C) =>
            {
                sensor
            }
            (Some(sensor), Some(model)) => {
                debug!(
                    self.logger,
                    "{} from sensor ({}) too far from model ({}), keeping model",
                    field,
                    sensor,
                    model
                );
                model
            }
            (Some(sensor), None) => sensor,
            (None, Some(model)) => model,
            (None, None) => 0,
        };
        Temperature::from_celsius(celsius)
    }
}

fn wind(sensor: Option<&SensorRecord>, model: &Wind) -> Wind {
    let sensor_direction = sensor
        .and_then(|s| s.wind_direction)
        .filter(|d| (0.0..=360.0).contains(d))
        .map(|d| WindDirection::Degrees(d.round() as u16));

    let (direction, variable_between) = match sensor_direction {
        Some(direction) => (Some(direction), None),
        None => (model.direction, model.variable_between),
    };

    let speed = sensor
        .and_then(|s| s.wind_speed_mps)
        .and_then(Speed::from_mps_f64)
        .or(model.speed);
    let gust = sensor
        .and_then(|s| s.wind_gust_mps)
        .and_then(Speed::from_mps_f64)
        .or(model.gust);

    let wind = Wind {
        direction,
        speed,
        gust,
        variable_between,
    };
    Wind {
        gust: significant_gust(&wind),
        ..wind
    }
}

/// The gust, if it is large enough to be reported against the mean speed.
pub fn significant_gust(wind: &Wind) -> Option<Speed> {
    let speed_kt = wind.speed.map(|s| s.kt).unwrap_or(0);
    wind.gust
        .filter(|gust| gust.kt >= speed_kt.saturating_add(GUST_MIN_EXCESS_KT))
}

/// Reduces station pressure to sea level with the standard atmosphere.
pub fn qnh_from_qfe(qfe_hpa: f64, altitude_m: f64) -> f64 {
    qfe_hpa * (5.2561 * (288.0 / (288.0 - 0.0065 * altitude_m)).ln()).exp()
}

fn pressure(sensor: Option<&SensorRecord>, model: &Pressure, altitude_m: f64) -> Pressure {
    let qnh = sensor
        .and_then(|s| s.station_pressure_hpa)
        .filter(|qfe| *qfe > 0.0)
        .map(|qfe| qnh_from_qfe(qfe, altitude_m))
        .filter(|qnh| qnh.is_finite() && (0.0..10000.0).contains(qnh))
        .map(|qnh| qnh.trunc() as u16)
        .or_else(|| model.qnh_hpa());

    Pressure {
        hpa: qnh,
        inhg: None,
    }
}

/// Encodes an observation as `METSAR <id> <ddhhmm>Z <wind>KT <vis> <tt>/<dd> Q<qnh>=`.
pub fn render(observation: &Observation) -> String {
    format!(
        "METSAR {} {} {} {} {} {}=",
        observation.identifier.as_deref().unwrap_or_default(),
        observation
            .time
            .map(|time| time.to_string())
            .unwrap_or_default(),
        wind_group(&observation.wind),
        visibility_group(observation.visibility),
        temperature_group(observation.temperature, observation.dewpoint),
        qnh_group(&observation.pressure),
    )
}

fn speed_digits(kt: u16) -> String {
    if kt >= 100 {
        "P99".to_string()
    } else {
        format!("{:02}", kt)
    }
}

fn wind_group(wind: &Wind) -> String {
    let direction = match wind.direction {
        Some(WindDirection::Degrees(degrees)) => format!("{:03}", degrees),
        Some(WindDirection::Variable) => "VRB".to_string(),
        None => "000".to_string(),
    };
    let mut group = direction + &speed_digits(wind.speed.map(|s| s.kt).unwrap_or(0));
    if let Some(gust) = significant_gust(wind) {
        group.push('G');
        group.push_str(&speed_digits(gust.kt));
    }
    group + "KT"
}

fn visibility_group(visibility: Option<Visibility>) -> String {
    match visibility {
        Some(Visibility::Cavok) => "CAVOK".to_string(),
        Some(Visibility::Meters(meters)) => format!("{:04}", meters),
        None => String::new(),
    }
}

fn signed_digits(celsius: i16) -> String {
    if celsius < 0 {
        format!("M{:02}", celsius.unsigned_abs())
    } else {
        format!("{:02}", celsius)
    }
}

fn temperature_group(temperature: Option<Temperature>, dewpoint: Option<Temperature>) -> String {
    format!(
        "{}/{}",
        signed_digits(temperature.map(|t| t.celsius).unwrap_or(0)),
        signed_digits(dewpoint.map(|t| t.celsius).unwrap_or(0))
    )
}

fn qnh_group(pressure: &Pressure) -> String {
    match pressure.qnh_hpa() {
        Some(qnh) => format!("Q{:04}", qnh),
        None => "Q////".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{decode, ReportTime};
    use slog::{o, Discard};

    const SBSP: &str = "METAR SBSP 011200Z 09012KT 9999 22/18 Q1013=";

    fn synthesizer() -> ObservationSynthesizer {
        ObservationSynthesizer::new(Logger::root(Discard, o!()))
    }

    fn record(hour: &str) -> SensorRecord {
        SensorRecord {
            date: "2021-05-01".to_string(),
            hour: hour.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn model_only_renders_model_fields() {
        let model = decode(SBSP);
        let metsar = synthesizer().synthesize(None, &model, 0.0);
        assert_eq!(metsar.text, "METSAR SBSP 011200Z 09012KT 9999 22/18 Q1013=");
        assert_eq!(metsar.observation.raw, metsar.text);
        assert_eq!(metsar.observation.pressure.hpa, Some(1013));
    }

    #[test]
    fn sensor_values_take_over() {
        let model = decode(SBSP);
        let sensor = SensorRecord {
            temperature_c: Some(21.7),
            dewpoint_c: Some(15.2),
            wind_direction: Some(110.0),
            wind_speed_mps: Some(2.1),
            wind_gust_mps: Some(10.8),
            station_pressure_hpa: Some(925.8),
            ..record("1300")
        };

        let metsar = synthesizer().synthesize(Some(&sensor), &model, 776.0);
        assert_eq!(metsar.text, "METSAR SBSP 011300Z 11004G21KT 9999 21/15 Q1015=");
        assert_eq!(
            metsar.observation.time,
            Some(ReportTime {
                day: 1,
                hour: 13,
                minute: 0
            })
        );
    }

    #[test]
    fn temperature_tolerance_band() {
        let model = decode("METAR SBSP 011200Z 09012KT 9999 03/01 Q1013=");
        let synthesizer = synthesizer();

        let close = SensorRecord {
            temperature_c: Some(5.0),
            ..record("1200")
        };
        let metsar = synthesizer.synthesize(Some(&close), &model, 0.0);
        assert_eq!(metsar.observation.temperature.unwrap().celsius, 5);
        // no sensor dewpoint, model value kept
        assert_eq!(metsar.observation.dewpoint.unwrap().celsius, 1);

        let far = SensorRecord {
            temperature_c: Some(20.0),
            ..record("1200")
        };
        let metsar = synthesizer.synthesize(Some(&far), &model, 0.0);
        assert_eq!(metsar.observation.temperature.unwrap().celsius, 3);

        let edge = SensorRecord {
            temperature_c: Some(13.0),
            ..record("1200")
        };
        let metsar = synthesizer.synthesize(Some(&edge), &model, 0.0);
        assert_eq!(metsar.observation.temperature.unwrap().celsius, 13);
    }

    #[test]
    fn implausible_sensor_temperatures_keep_model() {
        let model = decode("METAR SBPA 011200Z 09012KT 9999 M05/M08 Q1013=");
        let broken = SensorRecord {
            temperature_c: Some(99999.0),
            dewpoint_c: Some(-99999.0),
            ..record("1200")
        };
        let metsar = synthesizer().synthesize(Some(&broken), &model, 0.0);
        assert_eq!(metsar.observation.temperature.unwrap().celsius, -5);
        assert_eq!(metsar.observation.dewpoint.unwrap().celsius, -8);
        assert!(metsar.text.contains(" M05/M08 "));

        let model = decode("METAR SBPA 011200Z 09012KT 9999 Q1013=");
        let metsar = synthesizer().synthesize(Some(&broken), &model, 0.0);
        assert!(metsar.text.contains(" 00/00 "));
    }

    #[test]
    fn no_temperature_anywhere_is_zero() {
        let model = decode("METAR SBSP 011200Z 09012KT 9999 Q1013=");
        let metsar = synthesizer().synthesize(None, &model, 0.0);
        assert_eq!(metsar.text, "METSAR SBSP 011200Z 09012KT 9999 00/00 Q1013=");
    }

    #[test]
    fn gust_needs_ten_knots_over_speed() {
        let model = decode("METAR SBSP 011200Z 09010G18KT 9999 22/18 Q1013=");
        let metsar = synthesizer().synthesize(None, &model, 0.0);
        assert!(metsar.text.contains(" 09010KT "));
        assert_eq!(metsar.observation.wind.gust, None);

        let model = decode("METAR SBSP 011200Z 09010G21KT 9999 22/18 Q1013=");
        let metsar = synthesizer().synthesize(None, &model, 0.0);
        assert!(metsar.text.contains(" 09010G21KT "));

        let model = decode("METAR SBSP 011200Z 09010G20KT 9999 22/18 Q1013=");
        let metsar = synthesizer().synthesize(None, &model, 0.0);
        assert!(metsar.text.contains(" 09010G20KT "));
    }

    #[test]
    fn gust_rule_applies_after_source_selection() {
        // model gust 21 against sensor speed 14 kt is no longer significant
        let model = decode("METAR SBSP 011200Z 09010G21KT 9999 22/18 Q1013=");
        let sensor = SensorRecord {
            wind_speed_mps: Some(7.2),
            ..record("1200")
        };
        let metsar = synthesizer().synthesize(Some(&sensor), &model, 0.0);
        assert!(metsar.text.contains(" 09014KT "), "{}", metsar.text);
    }

    #[test]
    fn pressure_fallbacks() {
        let synthesizer = synthesizer();

        let model = decode("METAR KXYZ 011200Z 09012KT 9999 22/18 A2992=");
        let metsar = synthesizer.synthesize(None, &model, 0.0);
        assert!(metsar.text.ends_with(" Q1013="));

        let model = decode("METAR SBSP 011200Z 09012KT 9999 22/18=");
        let metsar = synthesizer.synthesize(None, &model, 0.0);
        assert!(metsar.text.ends_with(" Q////="));
        assert_eq!(metsar.observation.pressure.hpa, None);
    }

    #[test]
    fn qnh_reduction() {
        assert_eq!(qnh_from_qfe(1013.0, 0.0), 1013.0);
        assert_eq!(qnh_from_qfe(925.8, 776.0).trunc(), 1015.0);
        assert_eq!(qnh_from_qfe(1000.4, 10.0).trunc(), 1001.0);
    }

    #[test]
    fn visibility_and_signs() {
        let model = decode("METAR SBPA 011200Z VRB03KT CAVOK M02/M05 Q1030=");
        let metsar = synthesizer().synthesize(None, &model, 0.0);
        assert_eq!(metsar.text, "METSAR SBPA 011200Z VRB03KT CAVOK M02/M05 Q1030=");

        let model = decode("METAR SBPA 011200Z 36005KT 22/18 Q1010=");
        let metsar = synthesizer().synthesize(None, &model, 0.0);
        assert_eq!(metsar.text, "METSAR SBPA 011200Z 36005KT  22/18 Q1010=");
    }

    #[test]
    fn speeds_over_ninety_nine_knots() {
        let mut observation = decode(SBSP);
        observation.wind.speed = Some(Speed::from_knots(105));
        observation.wind.gust = Some(Speed::from_knots(130));
        assert!(render(&observation).contains(" 090P99GP99KT "));
    }

    #[test]
    fn kt_and_mps_render_alike() {
        for direction in (0..=360).step_by(10) {
            for mps in 0..=50u16 {
                let kt = Speed::from_mps(mps).kt;
                let group = format!(" {:03}{:02}KT ", direction, kt);

                let in_kt = decode(&format!("METAR SBSP 011200Z{}9999 22/18 Q1013=", group));
                let in_mps = decode(&format!(
                    "METAR SBSP 011200Z {:03}{:02}MPS 9999 22/18 Q1013=",
                    direction, mps
                ));
                assert_eq!(in_kt.wind, in_mps.wind, "{}", group);
                assert!(render(&in_kt).contains(&group), "{}", group);
                assert_eq!(render(&in_kt), render(&in_mps));
            }
        }
    }
}
