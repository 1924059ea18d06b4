use std::fmt;

/// kt -> m/s
pub const KT_TO_MPS: f64 = 0.514444444;
/// m/s -> kt
pub const MPS_TO_KT: f64 = 1.943844492;
/// ft -> m
pub const FT_TO_M: f64 = 0.3048;
/// inHg -> hPa
pub const INHG_TO_HPA: f64 = 33.8639;

/// A speed carried in both knots and metres per second.
///
/// The unit that was not measured is always derived by conversion and rounded
/// half away from zero, so the two never disagree by more than the rounding.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Speed {
    pub kt: u16,
    pub mps: u16,
}

impl Speed {
    pub fn from_knots(kt: u16) -> Self {
        Speed {
            kt,
            mps: (kt as f64 * KT_TO_MPS).round() as u16,
        }
    }

    pub fn from_mps(mps: u16) -> Self {
        Speed {
            kt: (mps as f64 * MPS_TO_KT).round() as u16,
            mps,
        }
    }

    /// Builds a speed from a fractional m/s sensor reading.
    pub fn from_mps_f64(mps: f64) -> Option<Self> {
        if !mps.is_finite() || mps < 0.0 {
            return None;
        }
        Some(Speed {
            kt: (mps * MPS_TO_KT).round() as u16,
            mps: mps.round() as u16,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindDirection {
    Degrees(u16),
    Variable,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Wind {
    pub direction: Option<WindDirection>,
    pub speed: Option<Speed>,
    pub gust: Option<Speed>,
    /// `dddVddd` bounds, (min, max)
    pub variable_between: Option<(u16, u16)>,
}

impl Wind {
    pub fn degrees(&self) -> Option<u16> {
        match self.direction {
            Some(WindDirection::Degrees(d)) => Some(d),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Visibility {
    /// Prevailing visibility in metres. 9999 means 10 km or more.
    Meters(u16),
    /// Ceiling and visibility OK
    Cavok,
}

impl Visibility {
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Visibility::Cavok | Visibility::Meters(9999))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CloudKind {
    Few,
    Scattered,
    Broken,
    Overcast,
    VerticalVisibility,
    SkyClear,
    NoSignificantCloud,
}

impl CloudKind {
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "FEW" => Some(CloudKind::Few),
            "SCT" => Some(CloudKind::Scattered),
            "BKN" => Some(CloudKind::Broken),
            "OVC" => Some(CloudKind::Overcast),
            "VV" => Some(CloudKind::VerticalVisibility),
            "SKC" => Some(CloudKind::SkyClear),
            "NSC" => Some(CloudKind::NoSignificantCloud),
            _ => None,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            CloudKind::Few => "FEW",
            CloudKind::Scattered => "SCT",
            CloudKind::Broken => "BKN",
            CloudKind::Overcast => "OVC",
            CloudKind::VerticalVisibility => "VV",
            CloudKind::SkyClear => "SKC",
            CloudKind::NoSignificantCloud => "NSC",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CloudLayer {
    pub kind: CloudKind,
    pub base_ft: Option<u32>,
    pub base_m: Option<f64>,
}

/// A temperature in whole degrees Celsius with its derived Fahrenheit value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Temperature {
    pub celsius: i16,
    pub fahrenheit: i16,
}

impl Temperature {
    pub fn from_celsius(celsius: i16) -> Self {
        Temperature {
            celsius,
            fahrenheit: (celsius as f64 * 9.0 / 5.0 + 32.0).trunc() as i16,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Pressure {
    pub hpa: Option<u16>,
    pub inhg: Option<f64>,
}

impl Pressure {
    /// QNH in hPa, converting from inHg when only the altimeter setting is known.
    pub fn qnh_hpa(&self) -> Option<u16> {
        self.hpa
            .or_else(|| self.inhg.map(|inhg| (inhg * INHG_TO_HPA).trunc() as u16))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentWeather {
    pub code: String,
    pub text: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Trend {
    #[default]
    None,
    NoSignificantChange,
    Becoming,
    Temporary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Remarks {
    /// AO2: automated station with precipitation discriminator
    pub precip_discriminator: bool,
    /// PWINO: precipitation identifier sensor not available
    pub precip_sensor_unavailable: bool,
    /// `$`: station needs maintenance
    pub maintenance_needed: bool,
}

/// Day of month and UTC time of a report, rendered as `ddhhmmZ`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ReportTime {
    pub day: u8,
    pub hour: u8,
    pub minute: u8,
}

impl ReportTime {
    /// Parses the six digits of a `ddhhmm` group.
    pub fn from_digits(digits: &str) -> Option<Self> {
        if digits.len() != 6 || !digits.bytes().all(|b| b.is_ascii_digit()) {
            return None;
        }
        Some(ReportTime {
            day: digits[0..2].parse().ok()?,
            hour: digits[2..4].parse().ok()?,
            minute: digits[4..6].parse().ok()?,
        })
    }
}

impl fmt::Display for ReportTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}{:02}{:02}Z", self.day, self.hour, self.minute)
    }
}

/// One decoded or synthesized aerodrome weather report.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Observation {
    pub identifier: Option<String>,
    pub time: Option<ReportTime>,
    pub wind: Wind,
    pub visibility: Option<Visibility>,
    pub clouds: Vec<CloudLayer>,
    pub temperature: Option<Temperature>,
    pub dewpoint: Option<Temperature>,
    pub pressure: Pressure,
    pub weather: Option<PresentWeather>,
    pub trend: Trend,
    pub automated: bool,
    pub corrected: bool,
    pub remarks: Remarks,
    /// The encoded text the observation was built from
    pub raw: String,
}

impl Observation {
    pub fn cloud(&self, kind: CloudKind) -> Option<&CloudLayer> {
        self.clouds.iter().find(|layer| layer.kind == kind)
    }
}
