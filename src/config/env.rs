//! `LOCUS_*` environment overrides
//!
//! A variable that is set but cannot be parsed fails the whole load with the
//! accepted values and, for small typos, the closest one. Unset variables
//! leave the file or default value in place.

use crate::domain::value_objects::ExpandMode;
use crate::error::{LocusError, LocusResult};

use super::types::{Config, Verbosity};

const BOOLEANS: &[&str] = &["true", "false", "1", "0"];
const EXPAND_MODES: &[&str] = &["shallow", "full"];
const VERBOSITIES: &[&str] = &["quiet", "normal", "verbose", "debug"];

/// Apply overrides from an arbitrary variable lookup
pub(crate) fn apply_overrides(
    mut config: Config,
    var: impl Fn(&str) -> Option<String>,
) -> LocusResult<Config> {
    if let Some(url) = var("LOCUS_API_URL") {
        config.api.base_url = Some(url);
    }
    if let Some(token) = var("LOCUS_API_TOKEN") {
        config.api.token = Some(token);
    }
    if let Some(raw) = var("LOCUS_TIMEOUT_SECS") {
        config.api.timeout_secs = parse_var("LOCUS_TIMEOUT_SECS", &raw, &[], |s| {
            s.parse().ok().filter(|secs| *secs > 0)
        })?;
    }
    if let Some(raw) = var("LOCUS_INCLUDE_INACTIVE") {
        config.tree.include_inactive =
            parse_var("LOCUS_INCLUDE_INACTIVE", &raw, BOOLEANS, |s| match s {
                "true" | "1" => Some(true),
                "false" | "0" => Some(false),
                _ => None,
            })?;
    }
    if let Some(raw) = var("LOCUS_EXPAND_MODE") {
        config.expansion.default_mode =
            parse_var("LOCUS_EXPAND_MODE", &raw, EXPAND_MODES, |s| {
                s.parse::<ExpandMode>().ok()
            })?;
    }
    if let Some(org) = var("LOCUS_ORGANIZATION") {
        config.matcher.organization_id = (!org.trim().is_empty()).then_some(org);
    }
    if let Some(raw) = var("LOCUS_VERBOSITY") {
        config.output.verbosity = parse_var("LOCUS_VERBOSITY", &raw, VERBOSITIES, |s| match s {
            "quiet" => Some(Verbosity::Quiet),
            "normal" => Some(Verbosity::Normal),
            "verbose" => Some(Verbosity::Verbose),
            "debug" => Some(Verbosity::Debug),
            _ => None,
        })?;
    }
    Ok(config)
}

/// Parse a trimmed, lowercased value; `accepted` empty means "a positive number"
fn parse_var<T>(
    var: &str,
    raw: &str,
    accepted: &[&str],
    parse: impl FnOnce(&str) -> Option<T>,
) -> LocusResult<T> {
    let value = raw.trim().to_lowercase();
    parse(&value).ok_or_else(|| LocusError::InvalidEnv {
        var: var.to_string(),
        value: raw.to_string(),
        accepted: if accepted.is_empty() {
            "a positive number".to_string()
        } else {
            format!("one of {}", accepted.join(", "))
        },
        suggestion: closest(&value, accepted).map(str::to_string),
    })
}

/// The candidate within two edits of `input`, if any
pub(crate) fn closest<'a>(input: &str, candidates: &[&'a str]) -> Option<&'a str> {
    candidates
        .iter()
        .map(|c| (*c, edit_distance(input, c)))
        .filter(|(_, dist)| (1..=2).contains(dist))
        .min_by_key(|(_, dist)| *dist)
        .map(|(c, _)| c)
}

/// Levenshtein distance over chars, one rolling row
pub(crate) fn edit_distance(a: &str, b: &str) -> usize {
    let b: Vec<char> = b.chars().collect();
    let mut row: Vec<usize> = (0..=b.len()).collect();

    for (i, ca) in a.chars().enumerate() {
        let mut diagonal = row[0];
        row[0] = i + 1;
        for (j, cb) in b.iter().enumerate() {
            let above = row[j + 1];
            row[j + 1] = if ca == *cb {
                diagonal
            } else {
                1 + diagonal.min(above).min(row[j])
            };
            diagonal = above;
        }
    }
    row[b.len()]
}
