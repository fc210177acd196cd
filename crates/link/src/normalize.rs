//! Name canonicalization for publisher and game names.
//!
//! Two independent normal forms: publisher names lose corporate suffixes and
//! parentheticals, game names keep every word and numeral. `NameNormalizer`
//! memoizes both for the lifetime of one run.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::similarity;

/// Corporate-form tokens dropped from publisher names as whole words.
pub const CORPORATE_SUFFIXES: &[&str] = &[
    "ab", "ag", "bv", "co", "company", "corp", "corporation", "entertainment", "gmbh",
    "group", "holding", "holdings", "inc", "incorporated", "kk", "limited", "llc", "ltd",
    "nv", "oyj", "plc", "sa", "spa",
];

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"\([^)]*\)").unwrap());
static PUNCTUATION: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").unwrap());

/// Canonical publisher form: `"Ubisoft Entertainment S.A. (FR)"` -> `"ubisoft"`.
pub fn sanitize_publisher_name(raw: &str) -> String {
    let lower = raw.to_lowercase();
    let without_parens = PARENTHETICAL.replace_all(&lower, " ");
    let with_and = without_parens.replace('&', "and");
    let without_punct = PUNCTUATION.replace_all(&with_and, "");

    without_punct
        .split_whitespace()
        .filter(|token| !CORPORATE_SUFFIXES.contains(token))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Canonical game form: `"STAR WARS™: Squadrons"` -> `"star wars squadrons"`.
pub fn normalize_game_name(raw: &str) -> String {
    let spaced: String = raw
        .to_lowercase()
        .replace('&', "and")
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { ' ' })
        .collect();

    spaced.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Which input collection a publisher field comes from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordSource {
    Catalog,
    Ratings,
}

/// The names a publisher profile can be recognized by.
///
/// Long and short names are compared by similarity. The rest are exact
/// (sanitized) matches: `used_names` for every source, plus the variants
/// written by one particular source.
#[derive(Debug, Clone, Default)]
pub struct PublisherNames<'a> {
    pub long_name: Option<&'a str>,
    pub short_name: Option<&'a str>,
    pub used_names: Vec<&'a str>,
    pub catalog_names: Vec<&'a str>,
    pub ratings_names: Vec<&'a str>,
}

impl<'a> PublisherNames<'a> {
    /// Names accepted by exact match for records from `source`.
    pub fn exact_names(&self, source: RecordSource) -> impl Iterator<Item = &'a str> + '_ {
        let variants = match source {
            RecordSource::Catalog => &self.catalog_names,
            RecordSource::Ratings => &self.ratings_names,
        };
        self.used_names.iter().chain(variants).copied()
    }
}

/// Per-run memoizing normalizer.
///
/// Results are identical to calling the free functions directly; the cache
/// only saves recomputation for names that recur across comparisons.
#[derive(Debug, Default)]
pub struct NameNormalizer {
    publishers: HashMap<String, String>,
    games: HashMap<String, String>,
}

impl NameNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn publisher(&mut self, raw: &str) -> String {
        if let Some(hit) = self.publishers.get(raw) {
            return hit.clone();
        }
        let sanitized = sanitize_publisher_name(raw);
        self.publishers.insert(raw.to_owned(), sanitized.clone());
        sanitized
    }

    pub fn game(&mut self, raw: &str) -> String {
        if let Some(hit) = self.games.get(raw) {
            return hit.clone();
        }
        let normalized = normalize_game_name(raw);
        self.games.insert(raw.to_owned(), normalized.clone());
        normalized
    }

    /// Number of distinct raw names cached so far, both kinds combined.
    pub fn cached(&self) -> usize {
        self.publishers.len() + self.games.len()
    }

    /// Whether `candidate` names the same publisher as `names`.
    ///
    /// Checked in order, first success wins: similarity to the long name
    /// above `threshold`, similarity to the short name above `threshold`,
    /// exact equality with a used name or a variant of `source`.
    pub fn same_publisher(
        &mut self,
        candidate: &str,
        names: &PublisherNames<'_>,
        source: RecordSource,
        threshold: f64,
    ) -> bool {
        let candidate = self.publisher(candidate);

        for name in [names.long_name, names.short_name].into_iter().flatten() {
            let canonical = self.publisher(name);
            if similarity::ratio(&candidate, &canonical) > threshold {
                return true;
            }
        }

        names
            .exact_names(source)
            .any(|name| candidate == self.publisher(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn names<'a>(long: Option<&'a str>, short: Option<&'a str>, used: &'a str) -> PublisherNames<'a> {
        PublisherNames {
            long_name: long,
            short_name: short,
            used_names: vec![used],
            ..Default::default()
        }
    }

    const CATALOG: RecordSource = RecordSource::Catalog;

    #[test]
    fn publisher_strips_suffixes_and_parentheticals() {
        assert_eq!(sanitize_publisher_name("Ubisoft Entertainment SA"), "ubisoft");
        assert_eq!(sanitize_publisher_name("CD PROJEKT S.A. (Poland)"), "cd projekt");
        assert_eq!(sanitize_publisher_name("Take-Two Interactive Software, Inc."), "taketwo interactive software");
        assert_eq!(sanitize_publisher_name("Koei Tecmo Holdings Co., Ltd."), "koei tecmo");
    }

    #[test]
    fn publisher_ampersand_becomes_and() {
        assert_eq!(sanitize_publisher_name("Focus Home & Interactive"), "focus home and interactive");
        assert_eq!(sanitize_publisher_name("Focus Home and Interactive"), "focus home and interactive");
        assert_eq!(sanitize_publisher_name("Dotemu&Co"), "dotemuandco");
    }

    #[test]
    fn publisher_suffix_only_removed_as_whole_word() {
        // "inc" inside a word is kept
        assert_eq!(sanitize_publisher_name("Incredible Games Inc"), "incredible games");
        assert_eq!(sanitize_publisher_name("Capcom Co., Ltd."), "capcom");
    }

    #[test]
    fn game_keeps_numerals_and_suffix_words() {
        assert_eq!(normalize_game_name("Far Cry® 6"), "far cry 6");
        assert_eq!(normalize_game_name("Group Therapy Inc"), "group therapy inc");
        assert_eq!(normalize_game_name("Ratchet & Clank"), "ratchet and clank");
        assert_eq!(normalize_game_name("R&D Simulator"), "randd simulator");
    }

    #[test]
    fn game_punctuation_insensitive() {
        assert_eq!(normalize_game_name("Star-Wars"), "star wars");
        assert_eq!(normalize_game_name("STAR WARS™"), "star wars");
        assert_eq!(normalize_game_name("  star   wars  "), "star wars");
    }

    #[test]
    fn cache_returns_same_result() {
        let mut n = NameNormalizer::new();
        let first = n.game("Assassin's Creed® Mirage");
        let second = n.game("Assassin's Creed® Mirage");
        assert_eq!(first, second);
        assert_eq!(first, normalize_game_name("Assassin's Creed® Mirage"));
        assert_eq!(n.cached(), 1);

        n.publisher("Ubisoft");
        n.publisher("Ubisoft");
        assert_eq!(n.cached(), 2);
    }

    #[test]
    fn same_publisher_by_long_name() {
        let mut n = NameNormalizer::new();
        let p = names(Some("Ubisoft Entertainment SA"), Some("UBISOFT ENTERTAINMENT"), "Ubisoft");
        assert!(n.same_publisher("Ubisoft Entertainment", &p, CATALOG, 0.9));
        assert!(!n.same_publisher("Electronic Arts", &p, CATALOG, 0.9));
    }

    #[test]
    fn same_publisher_by_short_name() {
        let mut n = NameNormalizer::new();
        let p = names(Some("Kabushiki Kaisha Square Enix Holdings"), Some("SQUARE ENIX"), "SQEX");
        assert!(n.same_publisher("Square Enix Co., Ltd.", &p, CATALOG, 0.9));
    }

    #[test]
    fn same_publisher_falls_back_to_used_name() {
        let mut n = NameNormalizer::new();
        let p = names(None, None, "Bandai Namco");
        assert!(n.same_publisher("Bandai Namco Entertainment", &p, CATALOG, 0.9));
        assert!(!n.same_publisher("Sega", &p, CATALOG, 0.9));
    }

    #[test]
    fn source_variants_match_only_their_source() {
        let mut n = NameNormalizer::new();
        let p = PublisherNames {
            long_name: Some("Electronic Arts Inc."),
            short_name: Some("Electronic Arts"),
            used_names: vec!["Electronic Arts"],
            catalog_names: vec!["EA Games"],
            ratings_names: vec!["ea-sports"],
        };
        assert!(n.same_publisher("EA Games", &p, RecordSource::Catalog, 0.9));
        assert!(!n.same_publisher("EA Games", &p, RecordSource::Ratings, 0.9));
        assert!(n.same_publisher("ea-sports", &p, RecordSource::Ratings, 0.9));
        assert!(!n.same_publisher("ea-sports", &p, RecordSource::Catalog, 0.9));
        // used names apply to both
        assert!(n.same_publisher("Electronic Arts", &p, RecordSource::Ratings, 0.9));
    }

    #[test]
    fn similarity_must_exceed_threshold() {
        let mut n = NameNormalizer::new();
        // identical after sanitizing -> 1.0, but a threshold of 1.0 is exclusive
        let p = names(Some("Capcom Co., Ltd."), None, "Something Else");
        assert!(!n.same_publisher("Capcom", &p, CATALOG, 1.0));
        assert!(n.same_publisher("Capcom", &p, CATALOG, 0.99));
    }

    proptest! {
        #[test]
        fn publisher_idempotent(raw in "[A-Za-z0-9 &().,'-]{0,40}") {
            let once = sanitize_publisher_name(&raw);
            prop_assert_eq!(sanitize_publisher_name(&once), once);
        }

        #[test]
        fn game_idempotent(raw in "[A-Za-z0-9 &:!'®™.-]{0,40}") {
            let once = normalize_game_name(&raw);
            prop_assert_eq!(normalize_game_name(&once), once);
        }

        #[test]
        fn used_name_always_matches_itself(used in "[A-Za-z0-9 &.,-]{0,30}") {
            let mut n = NameNormalizer::new();
            let p = names(None, None, &used);
            prop_assert!(n.same_publisher(&used, &p, CATALOG, 0.9));
        }
    }
}
