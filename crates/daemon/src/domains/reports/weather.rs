//! Present weather phenomena catalogue.

/// Codes that accept a `-`/`+` intensity prefix, with their descriptive text.
const PRECIPITATION: &[(&str, &str)] = &[
    ("DZ", "Drizzle."),
    ("RA", "Rain."),
    ("SN", "Snow."),
    ("SG", "Snow grains."),
    ("PL", "Ice pellets."),
    ("GS", "Small hail."),
    ("GR", "Hail."),
    ("DS", "Duststorm."),
    ("SS", "Sandstorm."),
    ("RASN", "Rain and snow."),
    ("SNRA", "Snow and rain."),
    ("SHSN", "Snow showers."),
    ("SHRA", "Rain showers."),
    ("SHGR", "Hail showers."),
    ("TSGR", "Thunderstorm with hail."),
    ("FZRA", "Freezing rain."),
    ("FZDZ", "Freezing drizzle."),
    ("TSRA", "Thunderstorm with rain."),
    ("TSGS", "Thunderstorm with small hail."),
    ("TSSN", "Thunderstorm with snow."),
];

/// Codes reported without intensity.
const OBSCURATION: &[(&str, &str)] = &[
    ("DU", "Dust."),
    ("SQ", "Squall."),
    ("BR", "Mist."),
    ("HZ", "Haze."),
    ("FU", "Smoke."),
    ("IC", "Ice crystals."),
    ("TS", "Thunderstorm."),
    ("FG", "Fog."),
    ("VA", "Volcanic ash."),
    ("BLSN", "Blowing snow."),
    ("FZFG", "Freezing fog."),
    ("VCFG", "Fog in vicinity."),
    ("MIFG", "Shallow fog."),
    ("PRFG", "Aerodrome partially covered by fog."),
    ("BCFG", "Fog patches."),
    ("DRSN", "Low drifting snow."),
    ("DRSA", "Low drifting sand."),
    ("DRDU", "Low drifting dust."),
    ("BLDU", "Blowing dust."),
    ("VCTS", "Thunderstorm in vicinity."),
];

/// Builds the alternation used by the decoder: `[-+]?(precip)|(obscuration)`,
/// longest codes first inside each group.
pub(crate) fn catalogue_pattern() -> String {
    fn alternation(table: &[(&str, &str)]) -> String {
        let mut codes: Vec<&str> = table.iter().map(|(code, _)| *code).collect();
        codes.sort_by(|a, b| b.len().cmp(&a.len()).then(a.cmp(b)));
        codes.join("|")
    }

    format!(
        "[-+]?(?:{})|(?:{})",
        alternation(PRECIPITATION),
        alternation(OBSCURATION)
    )
}

/// Descriptive text for a weather code such as `-RA`, `+TSRA` or `BR`.
///
/// Returns `None` for codes outside the catalogue, including intensity prefixes on
/// codes that do not take one.
pub fn phenomenon_text(code: &str) -> Option<String> {
    let (intensity, base) = match code.as_bytes().first() {
        Some(b'-') => (Some("Light"), &code[1..]),
        Some(b'+') => (Some("Heavy"), &code[1..]),
        _ => (None, code),
    };

    if let Some((_, text)) = PRECIPITATION.iter().find(|(c, _)| *c == base) {
        return Some(match intensity {
            Some(prefix) => format!("{} {}", prefix, lowercase_first(text)),
            None => text.to_string(),
        });
    }

    match intensity {
        Some(_) => None,
        None => OBSCURATION
            .iter()
            .find(|(c, _)| *c == base)
            .map(|(_, text)| text.to_string()),
    }
}

fn lowercase_first(text: &str) -> String {
    let mut chars = text.chars();
    match chars.next() {
        Some(first) => first.to_lowercase().chain(chars).collect(),
        None => String::new(),
    }
}
