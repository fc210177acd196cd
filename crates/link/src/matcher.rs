use chrono::NaiveDate;

use crate::config::MatchingConfig;
use crate::model::{GameRecord, MatchResult, NoteMatch, NoteRecord, PublisherProfile};
use crate::normalize::{NameNormalizer, PublisherNames, RecordSource};
use crate::similarity;

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

/// Score added for a release-date gap, by absolute day distance.
///
/// The 7-day bucket takes precedence over the 30-day one it overlaps with,
/// which leaves the ranges effectively disjoint.
pub fn date_adjustment(day_distance: u64) -> f64 {
    match day_distance {
        0..=7 => 0.30,
        8..=30 => 0.25,
        31..=90 => 0.15,
        91..=180 => 0.10,
        181..=365 => -0.10,
        366..=730 => -0.30,
        _ => -0.50,
    }
}

/// Absolute days between two release dates, when both are known.
pub fn release_gap_days(a: Option<NaiveDate>, b: Option<NaiveDate>) -> Option<u64> {
    match (a, b) {
        (Some(a), Some(b)) => Some((a - b).num_days().unsigned_abs()),
        _ => None,
    }
}

/// Name similarity plus date adjustment, unclamped.
///
/// `None` when the note has no name. A missing release date on either side
/// contributes no adjustment.
pub fn score_note(normalizer: &mut NameNormalizer, game: &GameRecord, note: &NoteRecord) -> Option<f64> {
    let note_name = note.name.as_deref()?;
    let game_name = normalizer.game(&game.name);
    let note_name = normalizer.game(note_name);

    let base = if game_name == note_name {
        1.0
    } else {
        similarity::ratio(&game_name, &note_name)
    };

    let adjustment = release_gap_days(game.release_date, note.release_date)
        .map(date_adjustment)
        .unwrap_or(0.0);

    Some(base + adjustment)
}

/// Inclusive threshold test used for note selection.
pub fn meets_threshold(score: f64, threshold: f64) -> bool {
    score >= threshold
}

// ---------------------------------------------------------------------------
// Partitioning
// ---------------------------------------------------------------------------

/// Indices of the games and notes attributed to one publisher, in input order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PublisherPartition {
    pub games: Vec<usize>,
    pub notes: Vec<usize>,
}

/// Select the games and notes whose publisher field names this publisher.
/// Games are checked against catalog variants, notes against ratings
/// variants. Records without a publisher field belong to no partition.
pub fn partition_for_publisher(
    normalizer: &mut NameNormalizer,
    names: &PublisherNames<'_>,
    games: &[GameRecord],
    notes: &[NoteRecord],
    similarity_threshold: f64,
) -> PublisherPartition {
    let mut partition = PublisherPartition::default();

    for (i, game) in games.iter().enumerate() {
        if let Some(ref publisher) = game.publisher {
            if normalizer.same_publisher(publisher, names, RecordSource::Catalog, similarity_threshold) {
                partition.games.push(i);
            }
        }
    }

    for (i, note) in notes.iter().enumerate() {
        if let Some(ref publisher) = note.publisher {
            if normalizer.same_publisher(publisher, names, RecordSource::Ratings, similarity_threshold) {
                partition.notes.push(i);
            }
        }
    }

    partition
}

// ---------------------------------------------------------------------------
// Selection
// ---------------------------------------------------------------------------

/// Pick the best-scoring note for `game` among `candidates`.
///
/// Strictly higher scores replace the current best, so the first candidate
/// wins ties. The winner is kept only if it meets `threshold`. Notes are not
/// consumed: the same note may be selected by several games.
pub fn select_note<'a>(
    normalizer: &mut NameNormalizer,
    game: &GameRecord,
    notes: &'a [NoteRecord],
    candidates: &[usize],
    threshold: f64,
) -> Option<NoteMatch<'a>> {
    let mut best: Option<NoteMatch<'a>> = None;

    for &ni in candidates {
        let note = &notes[ni];
        let Some(score) = score_note(normalizer, game, note) else {
            continue;
        };
        if best.map_or(true, |b| score > b.score) {
            best = Some(NoteMatch {
                note_index: ni,
                note,
                score,
            });
        }
    }

    match best {
        Some(m) if meets_threshold(m.score, threshold) => {
            log::debug!("'{}': selected note #{} (score {:.3})", game.name, m.note_index, m.score);
            Some(m)
        }
        Some(m) => {
            log::debug!(
                "'{}': best note #{} scored {:.3}, below {threshold}",
                game.name,
                m.note_index,
                m.score
            );
            None
        }
        None => None,
    }
}

/// Partition, then match every game of one publisher against its notes.
/// Produces exactly one `MatchResult` per partitioned game.
pub fn match_publisher<'a>(
    normalizer: &mut NameNormalizer,
    profile: &'a PublisherProfile,
    names: &PublisherNames<'_>,
    games: &'a [GameRecord],
    notes: &'a [NoteRecord],
    config: &MatchingConfig,
) -> Vec<MatchResult<'a>> {
    let partition =
        partition_for_publisher(normalizer, names, games, notes, config.publisher_similarity);
    log::debug!(
        "{}: {} games, {} notes after partitioning",
        profile.symbol,
        partition.games.len(),
        partition.notes.len()
    );

    partition
        .games
        .iter()
        .map(|&gi| {
            let game = &games[gi];
            MatchResult {
                game_index: gi,
                game,
                note: select_note(normalizer, game, notes, &partition.notes, config.note_threshold),
                profile,
            }
        })
        .collect()
}
