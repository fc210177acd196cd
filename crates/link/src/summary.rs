use crate::model::{LinkSummary, LinkedRecord};

/// Compute summary statistics from linked records.
///
/// `note_selected` and `game_claimed` are per-input flags collected while
/// matching, indexed like the note and game collections.
pub fn compute_summary(
    records: &[LinkedRecord],
    publishers_processed: usize,
    publishers_without_profile: Vec<String>,
    note_selected: &[bool],
    game_claimed: &[bool],
) -> LinkSummary {
    LinkSummary {
        publishers_processed,
        publishers_without_profile,
        total_records: records.len(),
        with_note: records.iter().filter(|r| r.note.is_some()).count(),
        with_anchor: records.iter().filter(|r| !r.stock.is_empty()).count(),
        notes_unselected: note_selected.iter().filter(|s| !**s).count(),
        games_unclaimed: game_claimed.iter().filter(|c| !**c).count(),
    }
}
