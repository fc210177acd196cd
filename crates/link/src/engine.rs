use crate::align::align_release;
use crate::config::LinkConfig;
use crate::error::LinkError;
use crate::matcher::match_publisher;
use crate::model::{
    DataSource, LatestQuote, LinkInput, LinkMeta, LinkResult, LinkedRecord, MatchResult,
    PublisherBlock, PublisherIdentity, PublisherProfile,
};
use crate::normalize::{NameNormalizer, PublisherNames};
use crate::summary::compute_summary;

/// Link games, notes and market data for every configured publisher.
///
/// Publishers are processed in config order and games in input order, so the
/// output is stable for a fixed input. A publisher without a profile is
/// skipped and reported in the summary.
pub fn run(config: &LinkConfig, input: &LinkInput) -> Result<LinkResult, LinkError> {
    config.validate()?;

    let mut normalizer = NameNormalizer::new();
    let mut records = Vec::new();
    let mut note_selected = vec![false; input.notes.len()];
    let mut game_claimed = vec![false; input.games.len()];
    let mut without_profile = Vec::new();
    let mut processed = 0;

    for identity in &config.publishers {
        let Some(profile) = find_profile(identity, &input.profiles) else {
            log::warn!("{} ({}): no publisher profile, skipping", identity.name, identity.symbol);
            without_profile.push(identity.symbol.clone());
            continue;
        };
        processed += 1;

        let names = publisher_names(identity, profile);
        let matches = match_publisher(
            &mut normalizer,
            profile,
            &names,
            &input.games,
            &input.notes,
            &config.matching,
        );

        for m in &matches {
            game_claimed[m.game_index] = true;
            if let Some(note) = m.note {
                note_selected[note.note_index] = true;
            }
            records.push(link_record(identity, m));
        }
    }

    log::debug!("{} distinct names normalized", normalizer.cached());

    let summary = compute_summary(&records, processed, without_profile, &note_selected, &game_claimed);
    log::info!(
        "linked {} records for {} publishers: {} with a note, {} with market data",
        summary.total_records,
        summary.publishers_processed,
        summary.with_note,
        summary.with_anchor,
    );

    Ok(LinkResult {
        meta: LinkMeta {
            config_name: config.name.clone(),
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            run_at: chrono::Utc::now().to_rfc3339(),
        },
        summary,
        records,
    })
}

/// Profile for an identity, joined on ticker symbol (case-insensitive).
pub fn find_profile<'a>(
    identity: &PublisherIdentity,
    profiles: &'a [PublisherProfile],
) -> Option<&'a PublisherProfile> {
    profiles
        .iter()
        .find(|p| p.symbol.eq_ignore_ascii_case(&identity.symbol))
}

/// Names used for publisher equivalence: the profile's long and short names,
/// the profile's used name and the identity name for every source, and the
/// identity's per-source variants.
pub fn publisher_names<'a>(
    identity: &'a PublisherIdentity,
    profile: &'a PublisherProfile,
) -> PublisherNames<'a> {
    let mut used_names: Vec<&str> = profile.used_name.as_deref().into_iter().collect();
    if !used_names.contains(&identity.name.as_str()) {
        used_names.push(&identity.name);
    }

    PublisherNames {
        long_name: profile.long_name.as_deref(),
        short_name: profile.short_name.as_deref(),
        used_names,
        catalog_names: identity.catalog_names.iter().map(String::as_str).collect(),
        ratings_names: identity.ratings_name.as_deref().into_iter().collect(),
    }
}

/// Assemble the output record for one match, aligning the price history.
pub fn link_record(identity: &PublisherIdentity, m: &MatchResult<'_>) -> LinkedRecord {
    let profile = m.profile;
    let history = &profile.history;

    let mut data_sources = vec![DataSource::Catalog];
    if m.note.is_some() {
        data_sources.push(DataSource::Ratings);
    }
    if !history.is_empty() {
        data_sources.push(DataSource::Market);
    }

    LinkedRecord {
        publisher: PublisherBlock {
            used_name: profile.used_name.clone().unwrap_or_else(|| identity.name.clone()),
            symbol: profile.symbol.clone(),
            short_name: profile.short_name.clone(),
            long_name: profile.long_name.clone(),
            currency: profile.currency.clone(),
            market: profile.market.clone(),
            country: profile.country.clone(),
        },
        game: m.game.clone(),
        note: m.note.map(|n| n.note.clone()),
        note_score: m.note.map(|n| n.score),
        stock: align_release(history, m.game.release_date),
        latest: history.latest().map(|(date, value)| LatestQuote {
            date,
            close_price: value.close_price,
            volume: value.volume,
        }),
        data_sources,
    }
}
