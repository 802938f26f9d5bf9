//! Plain-text reports for suggestions, deletion checks and search hits

use locus::application::ConfirmedSelection;
use locus::config::ConfigWarning;
use locus::domain::entities::{CoverageArea, SearchHit};
use locus::domain::services::{CoverageAreaDeletionCheck, LocationDeletionCheck};

use super::theme::{icon, icons, icons_ascii};

pub fn print_config_warning(warning: &ConfigWarning, unicode: bool) {
    let location = match warning.line {
        Some(line) => format!("{}:{}", warning.file.display(), line),
        None => warning.file.display().to_string(),
    };
    let hint = warning
        .suggestion
        .as_ref()
        .map(|s| format!(" (did you mean '{}'?)", s))
        .unwrap_or_default();
    eprintln!(
        "{} unknown config key '{}' in {}{}",
        icon(unicode, icons::WARNING, icons_ascii::WARNING),
        warning.key,
        location,
        hint
    );
}

pub fn render_suggestion(matches: &[CoverageArea], confirmed: &ConfirmedSelection) -> String {
    if matches.is_empty() {
        let ids: Vec<&str> = confirmed.location_ids.iter().map(|id| id.as_str()).collect();
        return format!(
            "No existing coverage area contains the selection.\nCreate one with: {}",
            ids.join(", ")
        );
    }

    let mut lines = Vec::with_capacity(matches.len());
    for (rank, area) in matches.iter().enumerate() {
        let marker = if confirmed.coverage_area_ids.contains(&area.id) {
            "*"
        } else {
            " "
        };
        lines.push(format!(
            "{} {}. {} [{}] - {} units",
            marker,
            rank + 1,
            area.name,
            area.id,
            area.unit_count()
        ));
    }
    lines.join("\n")
}

pub fn render_location_check(check: &LocationDeletionCheck, unicode: bool) -> String {
    match &check.reason {
        None => format!(
            "{} location '{}' can be deleted",
            icon(unicode, icons::SUCCESS, icons_ascii::SUCCESS),
            check.location_id
        ),
        Some(reason) => {
            let mut text = format!(
                "{} location '{}' cannot be deleted: {}",
                icon(unicode, icons::ERROR, icons_ascii::ERROR),
                check.location_id,
                reason
            );
            for id in &check.blocking_descendants {
                text.push_str(&format!("\n  child: {}", id));
            }
            for id in &check.referencing_areas {
                text.push_str(&format!("\n  coverage area: {}", id));
            }
            text
        }
    }
}

pub fn render_coverage_area_check(check: &CoverageAreaDeletionCheck, unicode: bool) -> String {
    match &check.reason {
        None => format!(
            "{} coverage area '{}' can be deleted ({} inactive assignments)",
            icon(unicode, icons::SUCCESS, icons_ascii::SUCCESS),
            check.coverage_area_id,
            check.total_assignment_count
        ),
        Some(reason) => format!(
            "{} coverage area '{}' has {}; deleting requires confirmation",
            icon(unicode, icons::WARNING, icons_ascii::WARNING),
            check.coverage_area_id,
            reason
        ),
    }
}

pub fn render_search_hit(hit: &SearchHit) -> String {
    format!("{}  [{}]", hit.path.join(" › "), hit.id)
}
