use regex::{Captures, Regex};
use std::sync::LazyLock;

use super::weather::{catalogue_pattern, phenomenon_text};
use crate::{
    CloudKind, CloudLayer, Observation, PresentWeather, Pressure, Remarks, ReportTime, Speed,
    Temperature, Trend, Visibility, Wind, WindDirection, FT_TO_M,
};

/// Leading tokens that name the message type rather than carry data.
const MESSAGE_TYPES: &[&str] = &["METAR", "METAF", "SPECI", "METSAR"];

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("report token pattern must compile")
}

static IDENTIFIER: LazyLock<Regex> = LazyLock::new(|| pattern(r"[A-Z]{4}"));
static REPORT_TIME: LazyLock<Regex> = LazyLock::new(|| pattern(r"([0-9]{6})Z"));

static WIND_GUST_KT: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"\b([0-9]{3})([0-9]{2})G([0-9]{2})KT\b"));
static WIND_GUST_MPS: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"\b([0-9]{3})([0-9]{2})G([0-9]{2})MPS\b"));
static WIND_KT: LazyLock<Regex> = LazyLock::new(|| pattern(r"\b([0-9]{3})([0-9]{2})KT\b"));
static WIND_MPS: LazyLock<Regex> = LazyLock::new(|| pattern(r"\b([0-9]{3})([0-9]{2})MPS\b"));
static WIND_VARIABLE: LazyLock<Regex> = LazyLock::new(|| pattern(r"\bVRB([0-9]{2})(KT|MPS)\b"));
static WIND_BOUNDS: LazyLock<Regex> = LazyLock::new(|| pattern(r"\b([0-9]{3})V([0-9]{3})\b"));

static VISIBILITY: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?:^|\s)([0-9]{4})(?:\s|=|$)|CAVOK"));
static CLOUDS: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"\b(SKC|NSC|FEW|SCT|BKN|OVC|VV)([0-9]{3})?"));
static TEMPERATURES: LazyLock<Regex> =
    LazyLock::new(|| pattern(r"(?:^|\s)(M?[0-9]{2})/(M?[0-9]{2})(?:\s|=|$)"));
static PRESSURE_HPA: LazyLock<Regex> = LazyLock::new(|| pattern(r"\bQ([0-9]{4})\b"));
static PRESSURE_INHG: LazyLock<Regex> = LazyLock::new(|| pattern(r"\bA([0-9]{2})([0-9]{2})\b"));
static WEATHER: LazyLock<Regex> = LazyLock::new(|| {
    pattern(&format!(
        r"(?:^|\s)({})(?:\s|=|$)",
        catalogue_pattern()
    ))
});
static TREND: LazyLock<Regex> = LazyLock::new(|| pattern(r"\b(NOSIG|BECMG|TEMPO)\b"));

/// Decodes an encoded METAR/METAF report.
///
/// Decoding is best effort: every field group is extracted independently from the
/// whole report and a missing or malformed group only leaves that field unset.
pub fn decode(raw: &str) -> Observation {
    let text = strip_message_type(raw);
    let (temperature, dewpoint) = match temperatures(text) {
        Some((temperature, dewpoint)) => (Some(temperature), Some(dewpoint)),
        None => (None, None),
    };

    Observation {
        identifier: identifier(text),
        time: report_time(text),
        wind: wind(text),
        visibility: visibility(text),
        clouds: clouds(text),
        temperature,
        dewpoint,
        pressure: pressure(text),
        weather: present_weather(text),
        trend: trend(text),
        automated: text.contains("AUTO"),
        corrected: text.contains("COR"),
        remarks: remarks(text),
        raw: raw.trim().to_string(),
    }
}

/// Drops the leading message-type token, if there is one.
pub fn strip_message_type(raw: &str) -> &str {
    let text = raw.trim();
    match text.split_once(char::is_whitespace) {
        Some((head, rest)) if MESSAGE_TYPES.contains(&head) => rest.trim_start(),
        None if MESSAGE_TYPES.contains(&text.trim_end_matches('=')) => "",
        _ => text,
    }
}

fn identifier(text: &str) -> Option<String> {
    IDENTIFIER.find(text).map(|m| m.as_str().to_string())
}

fn report_time(text: &str) -> Option<ReportTime> {
    REPORT_TIME
        .captures(text)
        .and_then(|caps| ReportTime::from_digits(&caps[1]))
}

fn number<T: std::str::FromStr>(caps: &Captures, index: usize) -> Option<T> {
    caps.get(index)?.as_str().parse().ok()
}

fn direction(caps: &Captures, index: usize) -> Option<u16> {
    number::<u16>(caps, index).filter(|degrees| *degrees <= 360)
}

fn gust_group(
    re: &Regex,
    text: &str,
    speed: fn(u16) -> Speed,
) -> Option<(u16, Speed, Option<Speed>)> {
    let caps = re.captures(text)?;
    Some((
        direction(&caps, 1)?,
        speed(number(&caps, 2)?),
        Some(speed(number(&caps, 3)?)),
    ))
}

fn plain_group(
    re: &Regex,
    text: &str,
    speed: fn(u16) -> Speed,
) -> Option<(u16, Speed, Option<Speed>)> {
    let caps = re.captures(text)?;
    Some((direction(&caps, 1)?, speed(number(&caps, 2)?), None))
}

/// Fixed-direction wind groups in priority order: gusts before plain, knots before
/// metres per second.
fn fixed_wind(text: &str) -> Option<(u16, Speed, Option<Speed>)> {
    gust_group(&WIND_GUST_KT, text, Speed::from_knots)
        .or_else(|| gust_group(&WIND_GUST_MPS, text, Speed::from_mps))
        .or_else(|| plain_group(&WIND_KT, text, Speed::from_knots))
        .or_else(|| plain_group(&WIND_MPS, text, Speed::from_mps))
}

fn variable_wind(text: &str) -> Option<Speed> {
    let caps = WIND_VARIABLE.captures(text)?;
    let ss = number::<u16>(&caps, 1)?;
    match &caps[2] {
        "KT" => Some(Speed::from_knots(ss)),
        _ => Some(Speed::from_mps(ss)),
    }
}

fn wind(text: &str) -> Wind {
    let variable_between = WIND_BOUNDS
        .captures(text)
        .and_then(|caps| Some((direction(&caps, 1)?, direction(&caps, 2)?)));

    if let Some((degrees, speed, gust)) = fixed_wind(text) {
        return Wind {
            direction: Some(WindDirection::Degrees(degrees)),
            speed: Some(speed),
            gust,
            variable_between,
        };
    }

    match variable_wind(text) {
        Some(speed) => Wind {
            direction: Some(WindDirection::Variable),
            speed: Some(speed),
            gust: None,
            variable_between,
        },
        None => Wind {
            variable_between,
            ..Wind::default()
        },
    }
}

fn visibility(text: &str) -> Option<Visibility> {
    let caps = VISIBILITY.captures(text)?;
    match caps.get(1) {
        Some(meters) => meters.as_str().parse().ok().map(Visibility::Meters),
        None => Some(Visibility::Cavok),
    }
}

/// Cloud layers in order of first appearance. A type seen again overwrites the
/// earlier layer of that type.
fn clouds(text: &str) -> Vec<CloudLayer> {
    let mut layers: Vec<CloudLayer> = Vec::new();
    for caps in CLOUDS.captures_iter(text) {
        let Some(kind) = CloudKind::from_code(&caps[1]) else {
            continue;
        };
        let base_ft = number::<u32>(&caps, 2).map(|hundreds| hundreds * 100);
        let layer = CloudLayer {
            kind,
            base_ft,
            base_m: base_ft.map(|ft| (ft as f64 * FT_TO_M * 100.0).round() / 100.0),
        };

        match layers.iter_mut().find(|existing| existing.kind == kind) {
            Some(existing) => *existing = layer,
            None => layers.push(layer),
        }
    }
    layers
}

fn signed_celsius(token: &str) -> Option<i16> {
    match token.strip_prefix('M') {
        Some(magnitude) => magnitude.parse::<i16>().ok().map(|c| -c),
        None => token.parse().ok(),
    }
}

fn temperatures(text: &str) -> Option<(Temperature, Temperature)> {
    let caps = TEMPERATURES.captures(text)?;
    let temperature = signed_celsius(&caps[1])?;
    let dewpoint = signed_celsius(&caps[2])?;
    Some((
        Temperature::from_celsius(temperature),
        Temperature::from_celsius(dewpoint),
    ))
}

fn pressure(text: &str) -> Pressure {
    Pressure {
        hpa: PRESSURE_HPA
            .captures(text)
            .and_then(|caps| number::<u16>(&caps, 1)),
        inhg: PRESSURE_INHG
            .captures(text)
            .and_then(|caps| format!("{}.{}", &caps[1], &caps[2]).parse().ok()),
    }
}

fn present_weather(text: &str) -> Option<PresentWeather> {
    let caps = WEATHER.captures(text)?;
    let code = caps[1].to_string();
    Some(PresentWeather {
        text: phenomenon_text(&code),
        code,
    })
}

fn trend(text: &str) -> Trend {
    match TREND.find(text).map(|m| m.as_str()) {
        Some("NOSIG") => Trend::NoSignificantChange,
        Some("BECMG") => Trend::Becoming,
        Some("TEMPO") => Trend::Temporary,
        _ => Trend::None,
    }
}

fn remarks(text: &str) -> Remarks {
    Remarks {
        precip_discriminator: text.contains("AO2"),
        precip_sensor_unavailable: text.contains("PWINO"),
        maintenance_needed: text.contains('$'),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_basic_report() {
        let obs = decode("METAR SBSP 011200Z 09012KT 9999 22/18 Q1013=");

        assert_eq!(obs.identifier.as_deref(), Some("SBSP"));
        assert_eq!(obs.time.map(|t| t.to_string()).as_deref(), Some("011200Z"));
        assert_eq!(obs.wind.degrees(), Some(90));
        assert_eq!(obs.wind.speed, Some(Speed { kt: 12, mps: 6 }));
        assert_eq!(obs.wind.gust, None);
        assert_eq!(obs.visibility, Some(Visibility::Meters(9999)));
        assert_eq!(obs.temperature.map(|t| t.celsius), Some(22));
        assert_eq!(obs.dewpoint.map(|t| t.celsius), Some(18));
        assert_eq!(obs.pressure.hpa, Some(1013));
        assert_eq!(obs.pressure.inhg, None);
        assert_eq!(obs.trend, Trend::None);
        assert!(obs.weather.is_none());
        assert_eq!(obs.raw, "METAR SBSP 011200Z 09012KT 9999 22/18 Q1013=");
    }

    #[test]
    fn strips_only_known_message_types() {
        assert_eq!(strip_message_type("METAF SBGR 0112"), "SBGR 0112");
        assert_eq!(strip_message_type("  SPECI   SBGR"), "SBGR");
        assert_eq!(strip_message_type("SBGR 011200Z"), "SBGR 011200Z");
        assert_eq!(strip_message_type("METAR="), "");
    }

    #[test]
    fn identifier_after_prefix_strip() {
        let obs = decode("METAF SBKP 011200Z 00000KT CAVOK 25/10 Q1015=");
        assert_eq!(obs.identifier.as_deref(), Some("SBKP"));
    }

    #[test]
    fn gust_form_takes_priority() {
        let obs = decode("METAR SBPA 011200Z 27015G28KT 8000 18/12 Q1008=");
        assert_eq!(obs.wind.degrees(), Some(270));
        assert_eq!(obs.wind.speed, Some(Speed::from_knots(15)));
        assert_eq!(obs.wind.gust, Some(Speed { kt: 28, mps: 14 }));
    }

    #[test]
    fn mps_wind_derives_knots() {
        let obs = decode("METAR UUEE 011200Z 18005MPS 9999 M03/M07 Q1021=");
        assert_eq!(obs.wind.degrees(), Some(180));
        assert_eq!(obs.wind.speed, Some(Speed { kt: 10, mps: 5 }));

        let obs = decode("METAR UUEE 011200Z 18005G10MPS 9999 M03/M07 Q1021=");
        assert_eq!(obs.wind.gust, Some(Speed { kt: 19, mps: 10 }));
    }

    #[test]
    fn knots_preferred_over_mps() {
        let obs = decode("METAR XXXX 011200Z 18005MPS 20012KT 9999 10/05 Q1000=");
        assert_eq!(obs.wind.degrees(), Some(200));
        assert_eq!(obs.wind.speed, Some(Speed::from_knots(12)));
    }

    #[test]
    fn variable_wind_and_bounds() {
        let obs = decode("METAR SBBR 011200Z VRB03KT 9999 27/14 Q1017=");
        assert_eq!(obs.wind.direction, Some(WindDirection::Variable));
        assert_eq!(obs.wind.speed, Some(Speed { kt: 3, mps: 2 }));
        assert_eq!(obs.wind.degrees(), None);

        let obs = decode("METAR SBBR 011200Z 12010KT 090V150 9999 27/14 Q1017=");
        assert_eq!(obs.wind.degrees(), Some(120));
        assert_eq!(obs.wind.variable_between, Some((90, 150)));
    }

    #[test]
    fn out_of_range_direction_is_unset() {
        let obs = decode("METAR SBBR 011200Z 99910KT 9999 27/14 Q1017=");
        assert_eq!(obs.wind.direction, None);
        assert_eq!(obs.wind.speed, None);
    }

    #[test]
    fn visibility_cavok_and_meters_are_exclusive() {
        let cavok = decode("METAR SBGL 011200Z 09008KT CAVOK 30/20 Q1012=");
        assert_eq!(cavok.visibility, Some(Visibility::Cavok));

        let unrestricted = decode("METAR SBGL 011200Z 09008KT 9999 30/20 Q1012=");
        assert_eq!(unrestricted.visibility, Some(Visibility::Meters(9999)));

        assert_ne!(cavok.visibility, unrestricted.visibility);
        assert!(cavok.visibility.unwrap().is_unrestricted());
        assert!(unrestricted.visibility.unwrap().is_unrestricted());

        let reduced = decode("METAR SBGL 011200Z 09008KT 0800 FG 18/18 Q1012=");
        assert_eq!(reduced.visibility, Some(Visibility::Meters(800)));
        assert!(!reduced.visibility.unwrap().is_unrestricted());
    }

    #[test]
    fn clouds_convert_and_last_wins() {
        let obs = decode("METAR SBCT 011200Z 09008KT 9999 FEW015 BKN040 FEW020 18/12 Q1018=");
        assert_eq!(obs.clouds.len(), 2);

        let few = obs.cloud(CloudKind::Few).unwrap();
        assert_eq!(few.base_ft, Some(2000));
        assert_eq!(few.base_m, Some(609.6));
        assert_eq!(obs.clouds[0].kind, CloudKind::Few);

        let bkn = obs.cloud(CloudKind::Broken).unwrap();
        assert_eq!(bkn.base_ft, Some(4000));
        assert_eq!(bkn.base_m, Some(1219.2));
    }

    #[test]
    fn clouds_without_height() {
        let obs = decode("METAR SBCT 011200Z 09008KT 9999 NSC 18/12 Q1018=");
        let nsc = obs.cloud(CloudKind::NoSignificantCloud).unwrap();
        assert_eq!(nsc.base_ft, None);
        assert_eq!(nsc.base_m, None);
    }

    #[test]
    fn negative_temperatures() {
        let obs = decode("METAR SAWH 011200Z 27020KT 9999 M02/M08 Q0995=");
        let temperature = obs.temperature.unwrap();
        let dewpoint = obs.dewpoint.unwrap();
        assert_eq!(temperature.celsius, -2);
        assert_eq!(temperature.fahrenheit, 28);
        assert_eq!(dewpoint.celsius, -8);
        assert_eq!(dewpoint.fahrenheit, 17);

        let obs = decode("METAR SAWH 011200Z 27020KT 9999 03/M01 Q0995=");
        assert_eq!(obs.temperature.map(|t| t.celsius), Some(3));
        assert_eq!(obs.dewpoint.map(|t| t.celsius), Some(-1));
    }

    #[test]
    fn temperature_requires_both_parts() {
        let obs = decode("METAR SBSP 011200Z 09012KT 9999 22/ Q1013=");
        assert!(obs.temperature.is_none());
        assert!(obs.dewpoint.is_none());
    }

    #[test]
    fn pressure_in_inches() {
        let obs = decode("METAR KJFK 011251Z 31012KT 10SM FEW250 24/08 A2992 RMK AO2 SLP132=");
        assert_eq!(obs.pressure.hpa, None);
        assert_eq!(obs.pressure.inhg, Some(29.92));
        assert!(obs.remarks.precip_discriminator);
        assert!(!obs.remarks.precip_sensor_unavailable);
        assert!(!obs.remarks.maintenance_needed);
    }

    #[test]
    fn present_weather_with_text() {
        let obs = decode("METAR SBPA 011200Z 18010KT 4000 -RA BR BKN008 16/15 Q1010=");
        let weather = obs.weather.unwrap();
        assert_eq!(weather.code, "-RA");
        assert_eq!(weather.text.as_deref(), Some("Light rain."));

        let obs = decode("METAR SBPA 011200Z 18010KT 4000 +TSRA 16/15 Q1010=");
        assert_eq!(obs.weather.unwrap().code, "+TSRA");
    }

    #[test]
    fn weather_codes_inside_identifiers_are_ignored() {
        let obs = decode("METAR SBBR 011200Z 18010KT 9999 27/14 Q1017=");
        assert!(obs.weather.is_none());
    }

    #[test]
    fn trend_flags_and_report_type() {
        let obs = decode("METAR COR SBSP 011200Z AUTO 09012KT 9999 22/18 Q1013 TEMPO 3000 RA NOSIG=");
        assert_eq!(obs.trend, Trend::Temporary);
        assert!(obs.corrected);
        assert!(obs.automated);

        let obs = decode("METAR SBSP 011200Z 09012KT 9999 22/18 Q1013 NOSIG=");
        assert_eq!(obs.trend, Trend::NoSignificantChange);
        assert!(!obs.corrected);
        assert!(!obs.automated);
    }

    #[test]
    fn maintenance_and_pwino_remarks() {
        let obs = decode("METAR KBOS 011254Z 00000KT 10SM CLR 20/10 A3001 RMK AO2 PWINO $");
        assert!(obs.remarks.precip_sensor_unavailable);
        assert!(obs.remarks.maintenance_needed);
    }

    #[test]
    fn empty_and_garbage_reports_are_partial() {
        let obs = decode("");
        assert_eq!(obs, Observation::default());

        let obs = decode("METAR ????");
        assert!(obs.identifier.is_none());
        assert!(obs.time.is_none());
        assert!(obs.visibility.is_none());
        assert_eq!(obs.raw, "METAR ????");
    }
}
