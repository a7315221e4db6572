//! Static lookup tables used to fill in metadata a playlist leaves out.
//!
//! Every table is an ordered list of `(result, patterns)` pairs. Lookups walk
//! the table top to bottom and the first hit wins, so order is significant.

use lazy_static::lazy_static;
use regex::Regex;

use crate::channels::Quality;

/// Glyph on both sides of an embedded country code.
pub const MARKER: char = '┃';

/// Country assumed when nothing in an entry points elsewhere.
pub const DEFAULT_COUNTRY: &str = "AL";

pub const DEFAULT_ICON: &str = "fas fa-tv";

const QUALITY_KEYWORDS: &[(Quality, &[&str])] = &[
    (Quality::Uhd4k, &["4k", "uhd"]),
    (Quality::Fhd, &["fhd", "1080p", "full hd"]),
    (Quality::Hd, &["hd", "720p"]),
];

// tvg-id segment -> country code. Scanned in this order for embedded segments.
const TVG_ID_CODES: &[(&str, &str)] = &[
    ("al", "AL"),
    ("sq", "AL"),
    ("xk", "XK"),
    ("ks", "XK"),
    ("mk", "MK"),
    ("us", "US"),
    ("en", "US"),
    ("uk", "UK"),
    ("gb", "UK"),
    ("it", "IT"),
    ("gr", "GR"),
    ("el", "GR"),
    ("de", "DE"),
    ("fr", "FR"),
    ("es", "ES"),
    ("tr", "TR"),
    ("ru", "RU"),
];

// Substrings of a group-title that mark it as belonging to a home market.
// Kept apart from NAME_COUNTRY_PATTERNS: the two sets do not agree and
// existing catalogs depend on both.
const CATEGORY_COUNTRY_KEYWORDS: &[(&str, &[&str])] = &[
    ("AL", &["albania", "shqip", "al"]),
    ("XK", &["kosova", "kosovo", "xk"]),
    ("MK", &["macedonia", "maqedoni", "mk"]),
];

// Broadcaster and network names, matched case-insensitively against the
// normalized channel name.
const NAME_COUNTRY_PATTERNS: &[(&str, &[&str])] = &[
    ("AL", &["albania", "shqip", "rtsh", "tv klan", "top channel", "abc news"]),
    ("XK", &["kosova", "kosovo", "rtk", "tv 21", "rtv 21", "k.tv"]),
    ("MK", &["macedonia", "maqedoni", "a1", "sitel"]),
    ("US", &["cnn", "fox", "hbo", "discovery", "national geographic", "mtv"]),
    ("UK", &["bbc", "sky", "itv", "channel 4"]),
    ("IT", &["rai", "italia", "italy"]),
    ("GR", &["ert", "greece", "greqi"]),
    ("DE", &["dw", "zdf", "ard", "germany"]),
    ("FR", &["france", "tf1", "france 24"]),
    ("ES", &["spain", "spanj", "tv.e"]),
    ("TR", &["turkey", "turqi", "trt"]),
    ("RU", &["russia", "rusi", "rt rus"]),
];

// Uppercase labels used when a category has to be synthesized.
const COUNTRY_LABELS: &[(&str, &str)] = &[
    ("AL", "ALBANIA"),
    ("XK", "KOSOVA"),
    ("MK", "MAQEDONI"),
    ("US", "USA"),
    ("UK", "UK"),
    ("IT", "ITALIA"),
    ("GR", "GREQI"),
    ("DE", "GJERMANI"),
    ("FR", "FRANCE"),
    ("ES", "SPAIN"),
    ("TR", "TURQI"),
    ("RU", "RUSI"),
];

// Display names for the catalog's country map.
const LOCALIZED_COUNTRY_NAMES: &[(&str, &str)] = &[
    ("AL", "Shqipëri"),
    ("XK", "Kosovë"),
    ("MK", "Maqedoni"),
    ("US", "SHBA"),
    ("UK", "Angli"),
    ("IT", "Itali"),
    ("GR", "Greqi"),
    ("DE", "Gjermani"),
    ("FR", "Francë"),
    ("ES", "Spanjë"),
    ("TR", "Turqi"),
    ("RU", "Rusi"),
];

const COUNTRY_ICONS: &[(&str, &str)] = &[
    ("AL", "fas fa-home"),
    ("XK", "fas fa-flag"),
    ("MK", "fas fa-mountain"),
    ("US", "fas fa-flag-usa"),
    ("UK", "fas fa-crown"),
    ("IT", "fas fa-pizza-slice"),
    ("GR", "fas fa-olive-branch"),
    ("DE", "fas fa-car"),
];

const THEME_ICONS: &[(&str, &[&str])] = &[
    ("fas fa-futbol", &["sport"]),
    ("fas fa-newspaper", &["news"]),
    ("fas fa-film", &["movie", "film"]),
    ("fas fa-music", &["music"]),
    ("fas fa-child", &["kids", "children"]),
];

/// Fixed language list advertised by every catalog.
pub const CATALOG_LANGUAGES: &[&str] = &["sq", "en", "mk", "it", "el", "de", "fr", "es", "tr", "ru"];

lazy_static! {
    /// Pipe-style country marker such as `┃AL┃ `, `|AL| ` or `║ AL ║`.
    pub static ref COUNTRY_MARKER_PREFIX: Regex =
        Regex::new(r"^[┃|‖│║╏]+\s*[A-Z]{2}\s*[┃|‖│║╏]+\s*").unwrap();

    static ref EMBEDDED_MARKER: Regex = Regex::new(r"┃([A-Z]{2})┃").unwrap();

    // Applied once each, in this order.
    static ref NAME_PREFIXES: Vec<Regex> = vec![
        COUNTRY_MARKER_PREFIX.clone(),
        Regex::new(r"^\[[A-Z]{2}\]\s*").unwrap(),
        Regex::new(r"^\([A-Z]{2}\)\s*").unwrap(),
        Regex::new(r"^[A-Z]{2}:\s*").unwrap(),
        Regex::new(r"^[A-Z]{2}\s*-\s*").unwrap(),
        Regex::new(r"^HD\s*").unwrap(),
        Regex::new(r"^FHD\s*").unwrap(),
        Regex::new(r"^4K\s*").unwrap(),
        Regex::new(r"^SD\s*").unwrap(),
    ];

    static ref NAME_SUFFIXES: Vec<Regex> = vec![
        Regex::new(r"(?i)\s*\((?:HD|FHD|4K|SD|1080p|720p|480p)\)$").unwrap(),
        Regex::new(r"(?i)\s*\[(?:HD|FHD|4K|SD|1080p|720p|480p)\]$").unwrap(),
    ];

    static ref QUALITY_SUFFIX: Regex = Regex::new(r"(?i)(HD|FHD|4K|SD)$").unwrap();

    static ref COMPILED_NAME_COUNTRY_PATTERNS: Vec<(&'static str, Vec<Regex>)> = NAME_COUNTRY_PATTERNS
        .iter()
        .map(|(code, patterns)| {
            let compiled = patterns
                .iter()
                .map(|p| Regex::new(&format!("(?i){p}")).unwrap())
                .collect();
            (*code, compiled)
        })
        .collect();
}

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Formats `code` as the marker token, e.g. `┃AL┃`.
pub fn country_marker(code: &str) -> String {
    format!("{MARKER}{code}{MARKER}")
}

/// Strips decorative prefixes and a trailing quality annotation from a
/// display title.
pub fn clean_channel_name(name: &str) -> String {
    let mut cleaned = name.to_string();
    for prefix in NAME_PREFIXES.iter() {
        cleaned = prefix.replace(&cleaned, "").into_owned();
    }
    for suffix in NAME_SUFFIXES.iter() {
        cleaned = suffix.replace(&cleaned, "").into_owned();
    }
    cleaned.trim().to_string()
}

/// Rewrites a raw group-title to `┃CC┃ TEXT` when it names a home market.
pub fn normalize_category(category: &str) -> String {
    let lower = category.to_lowercase();
    for (code, keywords) in CATEGORY_COUNTRY_KEYWORDS {
        if keywords.iter().any(|k| lower.contains(k)) {
            return format!("{} {}", country_marker(code), category.to_uppercase());
        }
    }
    category.to_string()
}

pub fn detect_quality(text: &str) -> Quality {
    let lower = text.to_lowercase();
    QUALITY_KEYWORDS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(quality, _)| *quality)
        .unwrap_or(Quality::Sd)
}

pub fn ends_with_quality(name: &str) -> bool {
    QUALITY_SUFFIX.is_match(name)
}

/// Looks for a known country segment in a `tvg-id` such as `rtsh1.al` or
/// `bbc.uk.hd`.
pub fn country_from_tvg_id(tvg_id: &str) -> Option<&'static str> {
    let lower = tvg_id.to_lowercase();
    let parts: Vec<&str> = lower.split('.').collect();
    if parts.len() > 1 {
        if let Some(code) = parts.last().and_then(|last| lookup(TVG_ID_CODES, last)) {
            return Some(code);
        }
    }

    TVG_ID_CODES
        .iter()
        .find(|(segment, _)| {
            lower.contains(&format!(".{segment}.")) || lower.ends_with(&format!(".{segment}"))
        })
        .map(|(_, code)| *code)
}

/// Guesses the country from broadcaster names, falling back to
/// [`DEFAULT_COUNTRY`].
pub fn detect_country(name: &str) -> &'static str {
    COMPILED_NAME_COUNTRY_PATTERNS
        .iter()
        .find(|(_, patterns)| patterns.iter().any(|p| p.is_match(name)))
        .map(|(code, _)| *code)
        .unwrap_or(DEFAULT_COUNTRY)
}

pub fn country_label(code: &str) -> String {
    lookup(COUNTRY_LABELS, code)
        .map(str::to_string)
        .unwrap_or_else(|| code.to_string())
}

pub fn localized_country_name(code: &str) -> Option<&'static str> {
    lookup(LOCALIZED_COUNTRY_NAMES, code)
}

/// Category text without its leading country marker.
pub fn category_display_name(category: &str) -> String {
    COUNTRY_MARKER_PREFIX.replace(category, "").into_owned()
}

pub fn category_icon(category: &str) -> &'static str {
    if let Some(icon) = EMBEDDED_MARKER
        .captures(category)
        .and_then(|caps| lookup(COUNTRY_ICONS, &caps[1]))
    {
        return icon;
    }

    let lower = category.to_lowercase();
    THEME_ICONS
        .iter()
        .find(|(_, keywords)| keywords.iter().any(|k| lower.contains(k)))
        .map(|(icon, _)| *icon)
        .unwrap_or(DEFAULT_ICON)
}
