use std::fmt;

use lazy_static::lazy_static;
use rand::Rng;
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::catalog::{Catalog, CatalogBuilder, Conversion};
use crate::heuristics;

const EXTINF_TAG: &str = "#EXTINF:";
const DEFAULT_LANGUAGE: &str = "sq";

lazy_static! {
    // One pattern per key, each searched on its own so a stray quote in one
    // attribute cannot swallow the next.
    static ref TVG_NAME_REGEX: Regex = Regex::new(r#"tvg-name="([^"]+)""#).unwrap();
    static ref TVG_LOGO_REGEX: Regex = Regex::new(r#"tvg-logo="([^"]+)""#).unwrap();
    static ref GROUP_TITLE_REGEX: Regex = Regex::new(r#"group-title="([^"]+)""#).unwrap();
    static ref TVG_ID_REGEX: Regex = Regex::new(r#"tvg-id="([^"]+)""#).unwrap();
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Quality {
    #[serde(rename = "SD")]
    Sd,
    #[serde(rename = "HD")]
    Hd,
    #[serde(rename = "FHD")]
    Fhd,
    #[serde(rename = "4K")]
    Uhd4k,
}

impl Quality {
    pub fn as_str(&self) -> &'static str {
        match self {
            Quality::Sd => "SD",
            Quality::Hd => "HD",
            Quality::Fhd => "FHD",
            Quality::Uhd4k => "4K",
        }
    }
}

impl fmt::Display for Quality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One playable stream in the catalog. Field order and names are what the
/// channel browser reads from `channels.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Channel {
    pub id: u32,
    pub name: String,
    pub url: String,
    pub logo: String,
    pub category: String,
    pub country: String,
    pub quality: Quality,
    pub working: bool,
    /// Synthetic placeholder, not a measured audience.
    pub viewers: u32,
    pub language: String,
    #[serde(rename = "isLive")]
    pub is_live: bool,
}

/// Metadata of an EXTINF line waiting for its resource line.
#[derive(Debug, Clone, PartialEq)]
struct PendingEntry {
    name: String,
    logo: String,
    category: Option<String>,
    country: Option<&'static str>,
    quality: Quality,
}

/// Splits the text after `#EXTINF:` at the first comma outside quotes. With
/// an unbalanced quote the first comma is used instead.
fn split_title(rest: &str) -> (&str, &str) {
    let mut in_quotes = false;
    for (i, c) in rest.char_indices() {
        match c {
            '"' => in_quotes = !in_quotes,
            ',' if !in_quotes => return (&rest[..i], rest[i + 1..].trim()),
            _ => {}
        }
    }
    match rest.split_once(',') {
        Some((head, title)) if in_quotes => (head, title.trim()),
        _ => (rest, ""),
    }
}

fn attribute<'a>(regex: &Regex, head: &'a str) -> Option<&'a str> {
    regex
        .captures(head)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
}

fn parse_extinf(line: &str) -> PendingEntry {
    let rest = line.strip_prefix(EXTINF_TAG).unwrap_or(line);
    let (head, title) = split_title(rest);

    let raw_name = attribute(&TVG_NAME_REGEX, head).unwrap_or(title);

    PendingEntry {
        name: heuristics::clean_channel_name(raw_name),
        logo: attribute(&TVG_LOGO_REGEX, head).unwrap_or_default().to_string(),
        category: attribute(&GROUP_TITLE_REGEX, head).map(heuristics::normalize_category),
        country: attribute(&TVG_ID_REGEX, head).and_then(heuristics::country_from_tvg_id),
        quality: heuristics::detect_quality(raw_name),
    }
}

impl PendingEntry {
    fn into_channel(self, id: u32, url: &str, language: &str, viewers: u32) -> Channel {
        let country = self
            .country
            .unwrap_or_else(|| heuristics::detect_country(&self.name));
        let marker = heuristics::country_marker(country);

        let category = match self.category {
            Some(category) => category,
            None => format!("{} {}", marker, heuristics::country_label(country).to_uppercase()),
        };

        let mut name = self.name;
        if !name.starts_with(heuristics::MARKER) {
            name = format!("{marker} {name}").trim_end().to_string();
        }
        if !name.contains(self.quality.as_str()) && !heuristics::ends_with_quality(&name) {
            name.push(' ');
            name.push_str(self.quality.as_str());
        }

        Channel {
            id,
            name,
            url: url.to_string(),
            logo: self.logo,
            category,
            country: country.to_string(),
            quality: self.quality,
            working: true,
            viewers,
            language: language.to_string(),
            is_live: true,
        }
    }
}

/// Turns extended M3U text into a [`Catalog`].
///
/// A converter only carries options; every call builds its own accumulators,
/// so one instance can be shared between threads.
#[derive(Debug, Clone)]
pub struct Converter {
    language: String,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new()
    }
}

impl Converter {
    pub fn new() -> Self {
        Self::with_language(DEFAULT_LANGUAGE)
    }

    /// Stamps `language` on every channel instead of `"sq"`.
    pub fn with_language(language: impl Into<String>) -> Self {
        Self {
            language: language.into(),
        }
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn parse(&self, content: &str) -> Catalog {
        self.convert(content).catalog
    }

    /// Like [`Converter::parse`], but also reports how many entries were kept
    /// and dropped.
    pub fn convert(&self, content: &str) -> Conversion {
        self.convert_with_rng(content, &mut rand::rng())
    }

    pub fn parse_with_rng<R: Rng>(&self, content: &str, rng: &mut R) -> Catalog {
        self.convert_with_rng(content, rng).catalog
    }

    /// Single forward scan holding at most one unfinished entry. Malformed
    /// input is skipped, never reported as an error.
    pub fn convert_with_rng<R: Rng>(&self, content: &str, rng: &mut R) -> Conversion {
        let mut builder = CatalogBuilder::default();
        let mut pending: Option<PendingEntry> = None;

        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() {
                continue;
            }

            if line.starts_with(EXTINF_TAG) {
                if let Some(dropped) = pending.replace(parse_extinf(line)) {
                    debug!("Dropping entry '{}': no stream URL before next EXTINF", dropped.name);
                    builder.record_dropped();
                }
                builder.record_metadata_line();
            } else if line.starts_with('#') {
                continue;
            } else if let Some(entry) = pending.take() {
                let id = builder.next_id();
                let viewers = rng.random_range(100..1100);
                builder.push(entry.into_channel(id, line, &self.language, viewers));
            } else {
                debug!("Ignoring stream URL without EXTINF: {}", line);
                builder.record_orphan();
            }
        }

        if let Some(dropped) = pending {
            debug!("Dropping entry '{}': playlist ended before its stream URL", dropped.name);
            builder.record_dropped();
        }

        builder.finish()
    }
}

/// Parses `content` with the default converter.
pub fn parse_m3u(content: &str) -> Catalog {
    Converter::new().parse(content)
}
