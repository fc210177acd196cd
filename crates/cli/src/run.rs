//! `gamestock run` and `gamestock validate`: config-driven linking.

use std::path::{Path, PathBuf};

use gamestock_link::load::{
    load_games_json, load_notes_json, load_price_history_csv, load_profiles_json,
};
use gamestock_link::model::PublisherProfile;
use gamestock_link::{LinkConfig, LinkError, LinkInput};

use crate::exit_codes::{link_exit_code, EXIT_LINK_OUTPUT, EXIT_LINK_RUNTIME};
use crate::CliError;

fn link_err(code: u8, msg: impl Into<String>) -> CliError {
    CliError { code, message: msg.into(), hint: None }
}

impl From<LinkError> for CliError {
    fn from(err: LinkError) -> Self {
        let hint = match &err {
            LinkError::UnknownPublisher(_) => {
                Some("run `gamestock validate <config>` to list configured publishers".to_string())
            }
            _ => None,
        };
        CliError { code: link_exit_code(&err), message: err.to_string(), hint }
    }
}

fn read_config(config_path: &Path) -> Result<LinkConfig, CliError> {
    let config_str = std::fs::read_to_string(config_path)
        .map_err(|e| link_err(EXIT_LINK_RUNTIME, format!("cannot read config: {e}")))?;
    Ok(LinkConfig::from_toml(&config_str)?)
}

fn read_input(base_dir: &Path, file: &str) -> Result<String, CliError> {
    let path = base_dir.join(file);
    std::fs::read_to_string(&path)
        .map_err(|e| LinkError::Io(format!("cannot read {}: {e}", path.display())).into())
}

/// Load every input file the config names. Paths resolve against `base_dir`.
pub fn load_inputs(config: &LinkConfig, base_dir: &Path) -> Result<LinkInput, CliError> {
    let inputs = &config.inputs;

    let games = match inputs.games {
        Some(ref file) => load_games_json(&read_input(base_dir, file)?)?,
        None => {
            log::warn!("no [inputs].games configured, nothing to link");
            Vec::new()
        }
    };
    let notes = match inputs.notes {
        Some(ref file) => load_notes_json(&read_input(base_dir, file)?)?,
        None => Vec::new(),
    };
    let mut profiles = match inputs.profiles {
        Some(ref file) => load_profiles_json(&read_input(base_dir, file)?)?,
        None => Vec::new(),
    };

    if let Some(ref dir) = inputs.history {
        attach_csv_histories(&mut profiles, &base_dir.join(dir))?;
    }

    log::info!(
        "loaded {} games, {} notes, {} profiles",
        games.len(),
        notes.len(),
        profiles.len()
    );
    Ok(LinkInput { games, notes, profiles })
}

/// Fill empty inline histories from `<dir>/<SYMBOL>.csv` when present.
fn attach_csv_histories(profiles: &mut [PublisherProfile], dir: &Path) -> Result<(), CliError> {
    for profile in profiles.iter_mut().filter(|p| p.history.is_empty()) {
        let path = dir.join(format!("{}.csv", profile.symbol));
        if !path.is_file() {
            log::debug!("{}: no price file at {}", profile.symbol, path.display());
            continue;
        }
        let csv_data = std::fs::read_to_string(&path)
            .map_err(|e| LinkError::Io(format!("cannot read {}: {e}", path.display())))?;
        profile.history = load_price_history_csv(&profile.symbol, &csv_data)?;
        log::debug!("{}: {} trading days from {}", profile.symbol, profile.history.len(), path.display());
    }
    Ok(())
}

pub fn cmd_run(
    config_path: PathBuf,
    json_output: bool,
    output_file: Option<PathBuf>,
    publishers: Vec<String>,
) -> Result<(), CliError> {
    let mut config = read_config(&config_path)?;
    if !publishers.is_empty() {
        config.retain_publishers(&publishers)?;
    }

    // Resolve file paths relative to config file's directory
    let base_dir = config_path.parent().unwrap_or_else(|| Path::new("."));
    let input = load_inputs(&config, base_dir)?;

    let result = gamestock_link::run(&config, &input)?;

    // Output
    let json_str = serde_json::to_string_pretty(&result)
        .map_err(|e| link_err(EXIT_LINK_OUTPUT, format!("JSON serialization error: {e}")))?;

    let output_path = output_file.or_else(|| config.output.json.as_ref().map(|p| base_dir.join(p)));
    if let Some(ref path) = output_path {
        std::fs::write(path, &json_str)
            .map_err(|e| link_err(EXIT_LINK_OUTPUT, format!("cannot write output: {e}")))?;
        eprintln!("wrote {}", path.display());
    }

    if json_output {
        println!("{json_str}");
    }

    // Human summary to stderr
    let s = &result.summary;
    eprintln!(
        "linked {} games across {} publisher(s): {} with a note, {} with market data",
        s.total_records, s.publishers_processed, s.with_note, s.with_anchor,
    );
    if !s.publishers_without_profile.is_empty() {
        eprintln!("no profile: {}", s.publishers_without_profile.join(", "));
    }
    eprintln!(
        "unclaimed: {} game(s), {} note(s)",
        s.games_unclaimed, s.notes_unselected,
    );

    Ok(())
}

pub fn cmd_validate(config_path: PathBuf) -> Result<(), CliError> {
    let config = read_config(&config_path)?;
    let symbols: Vec<&str> = config.publishers.iter().map(|p| p.symbol.as_str()).collect();
    eprintln!(
        "valid: '{}' with {} publisher(s): {}",
        config.name,
        config.publishers.len(),
        symbols.join(", "),
    );
    Ok(())
}
