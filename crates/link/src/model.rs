use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Input records
// ---------------------------------------------------------------------------

/// Platform availability as reported by the games catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Platforms {
    pub windows: Option<bool>,
    pub mac: Option<bool>,
    pub linux: Option<bool>,
}

/// One game from the games-catalog source.
///
/// Only `name`, `publisher` and `release_date` take part in linking; the
/// remaining attributes are carried through to the output untouched.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GameRecord {
    pub name: String,
    pub publisher: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Price in minor currency units (1999 = 19.99).
    pub price_cents: Option<i64>,
    pub currency: Option<String>,
    pub platforms: Platforms,
    pub genres: Option<Vec<String>>,
    pub recommendations_count: Option<u64>,
    pub data_source: Option<String>,
}

/// One rating record from the ratings source. Every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NoteRecord {
    pub name: Option<String>,
    pub name_original: Option<String>,
    pub alternative_names: Option<Vec<String>>,
    pub publisher: Option<String>,
    pub release_date: Option<NaiveDate>,
    /// Metacritic score, 0-100.
    pub metacritic: Option<i64>,
    /// User rating, 0.0-5.0.
    pub rating: Option<f64>,
    pub ratings_count: Option<u64>,
    pub data_source: Option<String>,
}

/// Operator-supplied canonical publisher definition.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct PublisherIdentity {
    pub name: String,
    pub symbol: String,
    /// Name variants used by the games catalog.
    #[serde(default)]
    pub catalog_names: Vec<String>,
    /// Name variant used by the ratings source.
    #[serde(default)]
    pub ratings_name: Option<String>,
}

// ---------------------------------------------------------------------------
// Market data
// ---------------------------------------------------------------------------

/// Close price and volume for one trading day.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StockValue {
    pub close_price: Option<f64>,
    pub volume: Option<u64>,
}

/// Sparse daily history keyed by trading date, always iterated in date order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PriceHistory {
    days: BTreeMap<NaiveDate, StockValue>,
}

impl PriceHistory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a trading day. A later insert for the same date replaces the earlier one.
    pub fn insert(&mut self, date: NaiveDate, value: StockValue) {
        self.days.insert(date, value);
    }

    pub fn get(&self, date: NaiveDate) -> Option<&StockValue> {
        self.days.get(&date)
    }

    pub fn len(&self) -> usize {
        self.days.len()
    }

    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    /// Earliest trading day.
    pub fn first_date(&self) -> Option<NaiveDate> {
        self.days.keys().next().copied()
    }

    /// Most recent trading day.
    pub fn latest(&self) -> Option<(NaiveDate, &StockValue)> {
        self.days.iter().next_back().map(|(d, v)| (*d, v))
    }

    pub(crate) fn days(&self) -> &BTreeMap<NaiveDate, StockValue> {
        &self.days
    }
}

impl FromIterator<(NaiveDate, StockValue)> for PriceHistory {
    fn from_iter<I: IntoIterator<Item = (NaiveDate, StockValue)>>(iter: I) -> Self {
        Self {
            days: iter.into_iter().collect(),
        }
    }
}

/// Resolved company and market record for one publisher identity.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PublisherProfile {
    /// Name the profile was looked up with. Falls back to the identity name.
    pub used_name: Option<String>,
    pub symbol: String,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub currency: Option<String>,
    pub market: Option<String>,
    pub country: Option<String>,
    pub history: PriceHistory,
}

/// Pre-loaded records for one run.
#[derive(Debug, Clone, Default)]
pub struct LinkInput {
    pub games: Vec<GameRecord>,
    pub notes: Vec<NoteRecord>,
    pub profiles: Vec<PublisherProfile>,
}

// ---------------------------------------------------------------------------
// Matching
// ---------------------------------------------------------------------------

/// A note selected for a game, with the score that won it.
#[derive(Debug, Clone, Copy)]
pub struct NoteMatch<'a> {
    pub note_index: usize,
    pub note: &'a NoteRecord,
    pub score: f64,
}

/// A game paired with at most one note and exactly one publisher profile.
#[derive(Debug, Clone, Copy)]
pub struct MatchResult<'a> {
    pub game_index: usize,
    pub game: &'a GameRecord,
    pub note: Option<NoteMatch<'a>>,
    pub profile: &'a PublisherProfile,
}

// ---------------------------------------------------------------------------
// Temporal alignment
// ---------------------------------------------------------------------------

/// Market state on the trading day nearest to one offset from release.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct AlignedStockSnapshot {
    pub date: NaiveDate,
    pub close_price: Option<f64>,
    pub volume: Option<u64>,
    /// Percent change of the close price against the anchor, 2 decimals.
    pub price_variation: Option<f64>,
    /// Percent change of the volume against the anchor, 2 decimals.
    pub volume_variation: Option<f64>,
}

/// The anchor plus the six fixed comparison points around a release.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct StockAlignment {
    pub at_release: Option<AlignedStockSnapshot>,
    pub month_before: Option<AlignedStockSnapshot>,
    pub week_before: Option<AlignedStockSnapshot>,
    pub day_before: Option<AlignedStockSnapshot>,
    pub day_after: Option<AlignedStockSnapshot>,
    pub week_after: Option<AlignedStockSnapshot>,
    pub month_after: Option<AlignedStockSnapshot>,
}

impl StockAlignment {
    /// True when no anchor was found, so every point is absent.
    pub fn is_empty(&self) -> bool {
        self.at_release.is_none()
    }
}

// ---------------------------------------------------------------------------
// Output
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DataSource {
    Catalog,
    Ratings,
    Market,
}

impl std::fmt::Display for DataSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Catalog => write!(f, "catalog"),
            Self::Ratings => write!(f, "ratings"),
            Self::Market => write!(f, "market"),
        }
    }
}

/// Publisher fields copied into every linked record.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PublisherBlock {
    pub used_name: String,
    pub symbol: String,
    pub short_name: Option<String>,
    pub long_name: Option<String>,
    pub currency: Option<String>,
    pub market: Option<String>,
    pub country: Option<String>,
}

/// Most recent trading day in a publisher's history.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct LatestQuote {
    pub date: NaiveDate,
    pub close_price: Option<f64>,
    pub volume: Option<u64>,
}

/// One combined record per (publisher, game).
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LinkedRecord {
    pub publisher: PublisherBlock,
    pub game: GameRecord,
    pub note: Option<NoteRecord>,
    pub note_score: Option<f64>,
    pub stock: StockAlignment,
    pub latest: Option<LatestQuote>,
    pub data_sources: Vec<DataSource>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct LinkSummary {
    pub publishers_processed: usize,
    pub publishers_without_profile: Vec<String>,
    pub total_records: usize,
    pub with_note: usize,
    pub with_anchor: usize,
    pub notes_unselected: usize,
    pub games_unclaimed: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkMeta {
    pub config_name: String,
    pub engine_version: String,
    pub run_at: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct LinkResult {
    pub meta: LinkMeta,
    pub summary: LinkSummary,
    pub records: Vec<LinkedRecord>,
}
