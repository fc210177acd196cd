//! Lenient loaders for the three record sources.
//!
//! A document that is not an array of objects (or a CSV without the required
//! columns) is an error. Inside a well-formed document every field is read
//! on its own: a missing, mistyped or unparseable value becomes `None`, and
//! the rest of the record is kept.

use chrono::NaiveDate;
use serde_json::{Map, Value};

use crate::error::LinkError;
use crate::model::{GameRecord, NoteRecord, Platforms, PriceHistory, PublisherProfile, StockValue};

/// Accepted release-date layouts, tried in order.
pub const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d %b, %Y", "%b %d, %Y"];

pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

// ---------------------------------------------------------------------------
// Field extraction
// ---------------------------------------------------------------------------

/// One object of an input array, with the context needed to report bad fields.
struct Fields<'a> {
    source: &'a str,
    index: usize,
    map: &'a Map<String, Value>,
}

impl<'a> Fields<'a> {
    fn present(&self, key: &str) -> Option<&'a Value> {
        self.map.get(key).filter(|v| !v.is_null())
    }

    fn malformed<T>(&self, key: &str, value: &Value) -> Option<T> {
        log::warn!("{} #{}: ignoring malformed '{key}': {value}", self.source, self.index);
        None
    }

    fn string(&self, key: &str) -> Option<String> {
        match self.present(key)? {
            Value::String(s) if s.trim().is_empty() => None,
            Value::String(s) => Some(s.clone()),
            Value::Number(n) => Some(n.to_string()),
            other => self.malformed(key, other),
        }
    }

    fn float(&self, key: &str) -> Option<f64> {
        let value = self.present(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse::<f64>().ok(),
            _ => None,
        };
        match parsed {
            Some(f) if f.is_finite() => Some(f),
            _ => self.malformed(key, value),
        }
    }

    fn int(&self, key: &str) -> Option<i64> {
        let value = self.present(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_i64(),
            Value::String(s) => s.trim().parse::<i64>().ok(),
            _ => None,
        };
        parsed.or_else(|| self.malformed(key, value))
    }

    fn count(&self, key: &str) -> Option<u64> {
        let value = self.present(key)?;
        let parsed = match value {
            Value::Number(n) => n.as_u64(),
            Value::String(s) => s.trim().parse::<u64>().ok(),
            _ => None,
        };
        parsed.or_else(|| self.malformed(key, value))
    }

    fn boolean(&self, key: &str) -> Option<bool> {
        match self.present(key)? {
            Value::Bool(b) => Some(*b),
            other => self.malformed(key, other),
        }
    }

    fn date(&self, key: &str) -> Option<NaiveDate> {
        let value = self.present(key)?;
        match value {
            Value::String(s) => parse_date(s).or_else(|| self.malformed(key, value)),
            other => self.malformed(key, other),
        }
    }

    fn strings(&self, key: &str) -> Option<Vec<String>> {
        let value = self.present(key)?;
        let Value::Array(items) = value else {
            return self.malformed(key, value);
        };
        let names: Vec<String> = items
            .iter()
            .filter_map(|item| match item {
                Value::String(s) => Some(s.clone()),
                // {"name": "Action"} as used by catalog genre lists
                Value::Object(o) => o.get("name").and_then(Value::as_str).map(str::to_owned),
                _ => None,
            })
            .collect();
        Some(names)
    }
}

/// Parse `json` as an array and hand each object to `f`.
/// Non-object entries are skipped with a warning.
fn each_object<T>(
    source: &str,
    json: &str,
    mut f: impl FnMut(&Fields<'_>) -> Option<T>,
) -> Result<Vec<T>, LinkError> {
    let doc: Value = serde_json::from_str(json).map_err(|e| LinkError::InputParse {
        source: source.into(),
        detail: e.to_string(),
    })?;
    let Value::Array(items) = doc else {
        return Err(LinkError::InputParse {
            source: source.into(),
            detail: "expected a JSON array of records".into(),
        });
    };

    let mut out = Vec::with_capacity(items.len());
    for (index, item) in items.iter().enumerate() {
        let Value::Object(map) = item else {
            log::warn!("{source} #{index}: skipping non-object entry");
            continue;
        };
        if let Some(record) = f(&Fields { source, index, map }) {
            out.push(record);
        }
    }
    Ok(out)
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Games-catalog records. Entries without a name are skipped.
pub fn load_games_json(json: &str) -> Result<Vec<GameRecord>, LinkError> {
    each_object("games", json, |f| {
        let Some(name) = f.string("name") else {
            log::warn!("games #{}: skipping record without a name", f.index);
            return None;
        };
        Some(GameRecord {
            name,
            publisher: f.string("publisher"),
            release_date: f.date("release_date"),
            price_cents: f.int("price"),
            currency: f.string("currency"),
            platforms: Platforms {
                windows: f.boolean("for_windows"),
                mac: f.boolean("for_mac"),
                linux: f.boolean("for_linux"),
            },
            genres: f.strings("genres"),
            recommendations_count: f.count("recommendations_count"),
            data_source: f.string("data_source"),
        })
    })
}

/// Ratings records. Kept even without a name; such notes are never selected.
pub fn load_notes_json(json: &str) -> Result<Vec<NoteRecord>, LinkError> {
    each_object("notes", json, |f| {
        Some(NoteRecord {
            name: f.string("name"),
            name_original: f.string("name_original"),
            alternative_names: f.strings("alternative_names"),
            publisher: f.string("publisher"),
            release_date: f.date("release_date").or_else(|| f.date("released")),
            metacritic: f.int("metacritic"),
            rating: f.float("rating"),
            ratings_count: f.count("ratings_count"),
            data_source: f.string("data_source"),
        })
    })
}

/// Publisher profiles. Entries without a symbol are skipped.
///
/// `history` may be an object keyed by date (`{"2023-06-14": {"close": ..,
/// "volume": ..}}`) or an array of `{"date", "close", "volume"}` rows.
pub fn load_profiles_json(json: &str) -> Result<Vec<PublisherProfile>, LinkError> {
    each_object("profiles", json, |f| {
        let Some(symbol) = f.string("symbol") else {
            log::warn!("profiles #{}: skipping profile without a symbol", f.index);
            return None;
        };
        let history = match f.present("history") {
            Some(value) => history_from_json(&symbol, value),
            None => PriceHistory::new(),
        };
        Some(PublisherProfile {
            used_name: f.string("used_name"),
            short_name: f.string("short_name"),
            long_name: f.string("long_name"),
            currency: f.string("currency"),
            market: f.string("market"),
            country: f.string("country"),
            symbol,
            history,
        })
    })
}

fn history_from_json(symbol: &str, value: &Value) -> PriceHistory {
    let source = format!("{symbol} history");
    let mut history = PriceHistory::new();

    let mut push = |index: usize, date: Option<&str>, row: &Map<String, Value>| {
        let Some(date) = date.and_then(parse_date) else {
            log::warn!("{source} #{index}: skipping row without a valid date");
            return;
        };
        let f = Fields {
            source: &source,
            index,
            map: row,
        };
        history.insert(
            date,
            StockValue {
                close_price: f.float("close").or_else(|| f.float("close_price")),
                volume: f.count("volume"),
            },
        );
    };

    match value {
        Value::Object(days) => {
            for (index, (date, row)) in days.iter().enumerate() {
                match row {
                    Value::Object(row) => push(index, Some(date.as_str()), row),
                    _ => log::warn!("{source} #{index}: skipping non-object row"),
                }
            }
        }
        Value::Array(rows) => {
            for (index, row) in rows.iter().enumerate() {
                match row {
                    Value::Object(row) => push(index, row.get("date").and_then(Value::as_str), row),
                    _ => log::warn!("{source} #{index}: skipping non-object row"),
                }
            }
        }
        other => log::warn!("{source}: ignoring malformed history: {other}"),
    }

    history
}

// ---------------------------------------------------------------------------
// CSV price history
// ---------------------------------------------------------------------------

/// Load a `date,close,volume` CSV. Extra columns are ignored, header names are
/// matched case-insensitively (`Date`, `Close`, `Volume` as exported by most
/// market-data tools). Rows with a bad date are skipped; a bad close or
/// volume only blanks that value.
pub fn load_price_history_csv(symbol: &str, csv_data: &str) -> Result<PriceHistory, LinkError> {
    let source = format!("{symbol} history");
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(csv_data.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| LinkError::InputParse {
            source: source.clone(),
            detail: e.to_string(),
        })?
        .iter()
        .map(|h| h.trim().to_lowercase())
        .collect();

    let idx = |name: &str| -> Result<usize, LinkError> {
        headers
            .iter()
            .position(|h| h == name)
            .ok_or_else(|| LinkError::InputParse {
                source: source.clone(),
                detail: format!("missing column '{name}'"),
            })
    };
    let date_idx = idx("date")?;
    let close_idx = idx("close")?;
    let volume_idx = idx("volume")?;

    let mut history = PriceHistory::new();
    for (index, record) in reader.records().enumerate() {
        let record = match record {
            Ok(r) => r,
            Err(e) => {
                log::warn!("{source} row {}: {e}", index + 1);
                continue;
            }
        };

        // Timestamps such as "2023-06-14 00:00:00-04:00" keep their date part.
        let raw_date = record.get(date_idx).unwrap_or("");
        let Some(date) = raw_date.get(..10).and_then(parse_date).or_else(|| parse_date(raw_date)) else {
            log::warn!("{source} row {}: skipping unparseable date '{raw_date}'", index + 1);
            continue;
        };

        let close_price = record
            .get(close_idx)
            .and_then(|s| s.trim().parse::<f64>().ok())
            .filter(|f| f.is_finite());
        let volume = record.get(volume_idx).and_then(|s| parse_volume(s.trim()));
        if close_price.is_none() || volume.is_none() {
            log::warn!("{source} row {}: malformed close or volume", index + 1);
        }

        history.insert(date, StockValue { close_price, volume });
    }

    Ok(history)
}

/// Volumes are sometimes exported as floats ("1200.0").
fn parse_volume(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().or_else(|| {
        raw.parse::<f64>()
            .ok()
            .filter(|f| f.is_finite() && *f >= 0.0 && f.fract() == 0.0)
            .map(|f| f as u64)
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn date_formats() {
        assert_eq!(parse_date("2023-06-15"), Some(date("2023-06-15")));
        assert_eq!(parse_date("15 Jun, 2023"), Some(date("2023-06-15")));
        assert_eq!(parse_date("Jun 15, 2023"), Some(date("2023-06-15")));
        assert_eq!(parse_date("Coming soon"), None);
    }

    #[test]
    fn games_keep_record_on_bad_field() {
        let json = r#"[
            {"name": "Far Cry 6", "publisher": "Ubisoft", "release_date": "07 Oct, 2021",
             "price": "not-a-number", "for_windows": true, "genres": [{"id": "1", "name": "Action"}]},
            {"name": "Anno 1800", "publisher": "Ubisoft", "release_date": "To be announced", "price": 5999}
        ]"#;
        let games = load_games_json(json).unwrap();
        assert_eq!(games.len(), 2);
        assert_eq!(games[0].price_cents, None);
        assert_eq!(games[0].release_date, Some(date("2021-10-07")));
        assert_eq!(games[0].platforms.windows, Some(true));
        assert_eq!(games[0].platforms.mac, None);
        assert_eq!(games[0].genres.as_deref(), Some(&["Action".to_string()][..]));
        assert_eq!(games[1].release_date, None);
        assert_eq!(games[1].price_cents, Some(5999));
    }

    #[test]
    fn games_without_name_are_skipped() {
        let json = r#"[{"publisher": "Ubisoft"}, {"name": "", "publisher": "Ubisoft"}, 42]"#;
        assert!(load_games_json(json).unwrap().is_empty());
    }

    #[test]
    fn notes_fields_independently_optional() {
        let json = r#"[
            {"name": "Far Cry 6", "released": "2021-10-07", "metacritic": null, "rating": "4.1"},
            {"publisher": "Ubisoft", "ratings_count": -3}
        ]"#;
        let notes = load_notes_json(json).unwrap();
        assert_eq!(notes.len(), 2);
        assert_eq!(notes[0].release_date, Some(date("2021-10-07")));
        assert_eq!(notes[0].metacritic, None);
        assert_eq!(notes[0].rating, Some(4.1));
        assert_eq!(notes[1].name, None);
        assert_eq!(notes[1].ratings_count, None);
    }

    #[test]
    fn not_an_array_is_an_error() {
        let err = load_notes_json(r#"{"results": []}"#).unwrap_err();
        assert!(matches!(err, LinkError::InputParse { ref source, .. } if source == "notes"));
        assert!(load_games_json("not json").is_err());
    }

    #[test]
    fn profiles_with_object_history() {
        let json = r#"[{
            "symbol": "UBI.PA", "long_name": "Ubisoft Entertainment SA", "currency": "EUR",
            "history": {
                "2023-06-14": {"close": 25.5, "volume": 1000},
                "2023-06-15": {"close": "bad", "volume": 900},
                "garbage": {"close": 1.0, "volume": 1}
            }
        }]"#;
        let profiles = load_profiles_json(json).unwrap();
        assert_eq!(profiles.len(), 1);
        let h = &profiles[0].history;
        assert_eq!(h.len(), 2);
        assert_eq!(h.get(date("2023-06-14")).unwrap().close_price, Some(25.5));
        assert_eq!(h.get(date("2023-06-15")).unwrap().close_price, None);
        assert_eq!(h.get(date("2023-06-15")).unwrap().volume, Some(900));
    }

    #[test]
    fn profiles_with_array_history() {
        let json = r#"[{"symbol": "EA", "history": [
            {"date": "2023-06-15", "close": 130.0, "volume": 5},
            {"date": "2023-06-14", "close_price": 128.0, "volume": 4}
        ]}, {"long_name": "No symbol"}]"#;
        let profiles = load_profiles_json(json).unwrap();
        assert_eq!(profiles.len(), 1);
        assert_eq!(profiles[0].history.first_date(), Some(date("2023-06-14")));
        assert_eq!(profiles[0].history.latest().unwrap().1.close_price, Some(130.0));
    }

    #[test]
    fn csv_history_skips_bad_rows() {
        let csv = "\
Date,Open,High,Low,Close,Volume
2023-06-14 00:00:00-04:00,99,101,98,100.0,1000000
2023-06-15,100,112,99,oops,900000
not-a-date,1,1,1,1,1
2023-06-16,1,1,1,110.0,1200.0
";
        let h = load_price_history_csv("EA", csv).unwrap();
        assert_eq!(h.len(), 3);
        assert_eq!(h.get(date("2023-06-14")).unwrap().close_price, Some(100.0));
        assert_eq!(h.get(date("2023-06-15")).unwrap().close_price, None);
        assert_eq!(h.get(date("2023-06-15")).unwrap().volume, Some(900_000));
        assert_eq!(h.get(date("2023-06-16")).unwrap().volume, Some(1200));
    }

    #[test]
    fn csv_history_requires_columns() {
        let err = load_price_history_csv("EA", "day,price\n2023-06-14,1\n").unwrap_err();
        assert!(err.to_string().contains("missing column 'date'"));
    }
}
