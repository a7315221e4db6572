//! The catalog document handed to the channel browser, and the per-call
//! accumulators that build it.

use chrono::{SecondsFormat, Utc};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::channels::{Channel, Quality};
use crate::heuristics;

pub const CATALOG_VERSION: &str = "3.0.0";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategorySummary {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub count: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub version: String,
    pub last_updated: String,
    pub total_channels: usize,
    pub categories: Vec<CategorySummary>,
    pub channels: Vec<Channel>,
    pub countries: IndexMap<String, String>,
    pub qualities: Vec<Quality>,
    pub languages: Vec<String>,
}

/// Counters describing how much of a playlist made it into the catalog.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParseStats {
    /// `#EXTINF` lines seen.
    pub metadata_lines: usize,
    pub channels: usize,
    /// Metadata lines that never got a stream URL.
    pub dropped_entries: usize,
    /// Stream URLs with no metadata line in front of them.
    pub orphan_lines: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Conversion {
    pub catalog: Catalog,
    pub stats: ParseStats,
}

/// Accumulators owned by a single conversion.
#[derive(Debug, Default)]
pub(crate) struct CatalogBuilder {
    channels: Vec<Channel>,
    category_counts: IndexMap<String, usize>,
    countries: IndexMap<String, String>,
    qualities: Vec<Quality>,
    stats: ParseStats,
}

impl CatalogBuilder {
    pub(crate) fn next_id(&self) -> u32 {
        self.channels.len() as u32 + 1
    }

    pub(crate) fn record_metadata_line(&mut self) {
        self.stats.metadata_lines += 1;
    }

    pub(crate) fn record_dropped(&mut self) {
        self.stats.dropped_entries += 1;
    }

    pub(crate) fn record_orphan(&mut self) {
        self.stats.orphan_lines += 1;
    }

    pub(crate) fn push(&mut self, channel: Channel) {
        *self
            .category_counts
            .entry(channel.category.clone())
            .or_insert(0) += 1;

        if !self.countries.contains_key(&channel.country) {
            if let Some(name) = heuristics::localized_country_name(&channel.country) {
                self.countries.insert(channel.country.clone(), name.to_string());
            }
        }

        if !self.qualities.contains(&channel.quality) {
            self.qualities.push(channel.quality);
        }

        self.channels.push(channel);
    }

    pub(crate) fn finish(self) -> Conversion {
        let mut categories: Vec<CategorySummary> = self
            .category_counts
            .into_iter()
            .map(|(id, count)| CategorySummary {
                name: heuristics::category_display_name(&id),
                icon: heuristics::category_icon(&id).to_string(),
                id,
                count,
            })
            .collect();
        // sort_by is stable: equal counts keep first-seen order.
        categories.sort_by(|a, b| b.count.cmp(&a.count));

        let mut stats = self.stats;
        stats.channels = self.channels.len();

        let catalog = Catalog {
            version: CATALOG_VERSION.to_string(),
            last_updated: Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true),
            total_channels: self.channels.len(),
            categories,
            channels: self.channels,
            countries: self.countries,
            qualities: self.qualities,
            languages: heuristics::CATALOG_LANGUAGES
                .iter()
                .map(|l| l.to_string())
                .collect(),
        };

        Conversion { catalog, stats }
    }
}
