//! Release-date alignment of a publisher's price history.
//!
//! The anchor is the last trading day at or before release. Six comparison
//! points are then looked up relative to the release date: "before" points
//! take the last trading day at or before their target, "after" points the
//! first trading day at or after it (always later than the anchor). Every
//! point reports its change against the anchor in percent.

use chrono::{Days, NaiveDate};

use crate::model::{AlignedStockSnapshot, PriceHistory, StockAlignment, StockValue};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Before,
    After,
}

/// The fixed comparison points around a release.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentOffset {
    MonthBefore,
    WeekBefore,
    DayBefore,
    DayAfter,
    WeekAfter,
    MonthAfter,
}

impl AlignmentOffset {
    pub const ALL: [AlignmentOffset; 6] = [
        Self::MonthBefore,
        Self::WeekBefore,
        Self::DayBefore,
        Self::DayAfter,
        Self::WeekAfter,
        Self::MonthAfter,
    ];

    pub fn days(&self) -> u64 {
        match self {
            Self::MonthBefore | Self::MonthAfter => 30,
            Self::WeekBefore | Self::WeekAfter => 7,
            Self::DayBefore | Self::DayAfter => 1,
        }
    }

    pub fn direction(&self) -> Direction {
        match self {
            Self::MonthBefore | Self::WeekBefore | Self::DayBefore => Direction::Before,
            Self::DayAfter | Self::WeekAfter | Self::MonthAfter => Direction::After,
        }
    }

    /// Calendar target for this offset. `None` past the calendar range.
    pub fn target(&self, release: NaiveDate) -> Option<NaiveDate> {
        let days = Days::new(self.days());
        match self.direction() {
            Direction::Before => release.checked_sub_days(days),
            Direction::After => release.checked_add_days(days),
        }
    }
}

impl std::fmt::Display for AlignmentOffset {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::MonthBefore => write!(f, "month_before"),
            Self::WeekBefore => write!(f, "week_before"),
            Self::DayBefore => write!(f, "day_before"),
            Self::DayAfter => write!(f, "day_after"),
            Self::WeekAfter => write!(f, "week_after"),
            Self::MonthAfter => write!(f, "month_after"),
        }
    }
}

// ---------------------------------------------------------------------------
// Nearest-date queries
// ---------------------------------------------------------------------------

impl PriceHistory {
    /// Last trading day on or before `date`.
    pub fn at_or_before(&self, date: NaiveDate) -> Option<(NaiveDate, &StockValue)> {
        self.days().range(..=date).next_back().map(|(d, v)| (*d, v))
    }

    /// First trading day on or after `date`.
    pub fn at_or_after(&self, date: NaiveDate) -> Option<(NaiveDate, &StockValue)> {
        self.days().range(date..).next().map(|(d, v)| (*d, v))
    }
}

// ---------------------------------------------------------------------------
// Alignment
// ---------------------------------------------------------------------------

/// `(value - anchor) / anchor * 100`, rounded to 2 decimals.
/// Absent when either side is absent or the anchor is zero.
pub fn percent_change(value: Option<f64>, anchor: Option<f64>) -> Option<f64> {
    let (value, anchor) = (value?, anchor?);
    if anchor == 0.0 {
        return None;
    }
    let pct = (value - anchor) / anchor * 100.0;
    pct.is_finite().then(|| round2(pct))
}

fn round2(x: f64) -> f64 {
    (x * 100.0).round() / 100.0
}

fn snapshot(date: NaiveDate, value: &StockValue, anchor: &StockValue) -> AlignedStockSnapshot {
    AlignedStockSnapshot {
        date,
        close_price: value.close_price,
        volume: value.volume,
        price_variation: percent_change(value.close_price, anchor.close_price),
        volume_variation: percent_change(
            value.volume.map(|v| v as f64),
            anchor.volume.map(|v| v as f64),
        ),
    }
}

/// Locate the trading day for one offset, given the anchor date.
pub fn locate(
    history: &PriceHistory,
    release: NaiveDate,
    anchor: NaiveDate,
    offset: AlignmentOffset,
) -> Option<(NaiveDate, &StockValue)> {
    let target = offset.target(release)?;
    match offset.direction() {
        Direction::Before => history.at_or_before(target),
        Direction::After => history
            .at_or_after(target)
            .filter(|(date, _)| *date > anchor),
    }
}

/// Align `history` around `release`.
///
/// Without a release date or without any trading day at or before it, every
/// point is absent.
pub fn align_release(history: &PriceHistory, release: Option<NaiveDate>) -> StockAlignment {
    let Some(release) = release else {
        return StockAlignment::default();
    };
    let Some((anchor_date, anchor)) = history.at_or_before(release) else {
        return StockAlignment::default();
    };

    let point = |offset| {
        locate(history, release, anchor_date, offset).map(|(date, value)| snapshot(date, value, anchor))
    };

    StockAlignment {
        at_release: Some(snapshot(anchor_date, anchor, anchor)),
        month_before: point(AlignmentOffset::MonthBefore),
        week_before: point(AlignmentOffset::WeekBefore),
        day_before: point(AlignmentOffset::DayBefore),
        day_after: point(AlignmentOffset::DayAfter),
        week_after: point(AlignmentOffset::WeekAfter),
        month_after: point(AlignmentOffset::MonthAfter),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn day(close: f64, volume: u64) -> StockValue {
        StockValue {
            close_price: Some(close),
            volume: Some(volume),
        }
    }

    fn history(rows: &[(&str, f64, u64)]) -> PriceHistory {
        rows.iter().map(|(d, c, v)| (date(d), day(*c, *v))).collect()
    }

    #[test]
    fn empty_history_is_fully_absent() {
        let aligned = align_release(&PriceHistory::new(), Some(date("2023-06-15")));
        assert_eq!(aligned, StockAlignment::default());
        assert!(aligned.is_empty());
    }

    #[test]
    fn missing_release_is_fully_absent() {
        let h = history(&[("2023-06-14", 100.0, 1_000_000)]);
        assert!(align_release(&h, None).is_empty());
    }

    #[test]
    fn history_starting_after_release_has_no_anchor() {
        let h = history(&[("2023-07-01", 100.0, 1), ("2023-08-01", 110.0, 1)]);
        assert!(align_release(&h, Some(date("2023-06-15"))).is_empty());
    }

    #[test]
    fn week_after_variation() {
        let h = history(&[
            ("2023-06-14", 100.0, 1_000_000),
            ("2023-06-21", 110.0, 900_000),
        ]);
        let aligned = align_release(&h, Some(date("2023-06-14")));

        let anchor = aligned.at_release.unwrap();
        assert_eq!(anchor.date, date("2023-06-14"));
        assert_eq!(anchor.price_variation, Some(0.0));

        let week = aligned.week_after.unwrap();
        assert_eq!(week.date, date("2023-06-21"));
        assert_eq!(week.close_price, Some(110.0));
        assert_eq!(week.price_variation, Some(10.0));
        assert_eq!(week.volume_variation, Some(-10.0));
    }

    #[test]
    fn anchor_skips_back_over_weekend() {
        // release on a Sunday, last trading day the Friday before
        let h = history(&[("2023-06-16", 50.0, 10), ("2023-06-19", 55.0, 10)]);
        let aligned = align_release(&h, Some(date("2023-06-18")));
        assert_eq!(aligned.at_release.unwrap().date, date("2023-06-16"));
        assert_eq!(aligned.day_after.unwrap().date, date("2023-06-19"));
        assert_eq!(aligned.day_after.unwrap().price_variation, Some(10.0));
        // day before (Saturday) resolves back to the anchor itself
        assert_eq!(aligned.day_before.unwrap().date, date("2023-06-16"));
    }

    #[test]
    fn before_offsets_scan_backward() {
        let h = history(&[
            ("2023-05-10", 80.0, 100),
            ("2023-06-05", 90.0, 100),
            ("2023-06-15", 100.0, 100),
        ]);
        let aligned = align_release(&h, Some(date("2023-06-15")));
        // 30 days before = 2023-05-16 -> 2023-05-10
        assert_eq!(aligned.month_before.unwrap().date, date("2023-05-10"));
        assert_eq!(aligned.month_before.unwrap().price_variation, Some(-20.0));
        // 7 days before = 2023-06-08 -> 2023-06-05
        assert_eq!(aligned.week_before.unwrap().date, date("2023-06-05"));
        assert_eq!(aligned.week_before.unwrap().price_variation, Some(-10.0));
    }

    #[test]
    fn after_offsets_absent_past_history_end() {
        let h = history(&[("2023-06-14", 100.0, 100), ("2023-06-16", 101.0, 100)]);
        let aligned = align_release(&h, Some(date("2023-06-15")));
        assert_eq!(aligned.day_after.unwrap().date, date("2023-06-16"));
        assert!(aligned.week_after.is_none());
        assert!(aligned.month_after.is_none());
        assert!(aligned.month_before.is_none());
    }

    #[test]
    fn zero_anchor_gives_absent_variation() {
        let h: PriceHistory = [
            (date("2023-06-14"), StockValue { close_price: Some(0.0), volume: Some(0) }),
            (date("2023-06-21"), day(5.0, 10)),
        ]
        .into_iter()
        .collect();
        let week = align_release(&h, Some(date("2023-06-14"))).week_after.unwrap();
        assert_eq!(week.close_price, Some(5.0));
        assert_eq!(week.price_variation, None);
        assert_eq!(week.volume_variation, None);
    }

    #[test]
    fn missing_volume_only_drops_volume_variation() {
        let h: PriceHistory = [
            (date("2023-06-14"), StockValue { close_price: Some(20.0), volume: None }),
            (date("2023-06-15"), day(21.0, 10)),
        ]
        .into_iter()
        .collect();
        let next = align_release(&h, Some(date("2023-06-14"))).day_after.unwrap();
        assert_eq!(next.price_variation, Some(5.0));
        assert_eq!(next.volume_variation, None);
    }

    #[test]
    fn percent_change_rounds_to_cents() {
        assert_eq!(percent_change(Some(1.0), Some(3.0)), Some(-66.67));
        assert_eq!(percent_change(Some(2.0), Some(3.0)), Some(-33.33));
        assert_eq!(percent_change(None, Some(3.0)), None);
    }

    #[test]
    fn offset_targets() {
        let release = date("2023-06-15");
        assert_eq!(AlignmentOffset::MonthBefore.target(release), Some(date("2023-05-16")));
        assert_eq!(AlignmentOffset::DayAfter.target(release), Some(date("2023-06-16")));
        assert_eq!(AlignmentOffset::WeekAfter.to_string(), "week_after");
    }
}
