use std::process::ExitCode;

use anyhow::Result;

use locus::application::LocationEngine;
use locus::domain::value_objects::{CoverageAreaId, LocationId};

use crate::cli::DeleteTarget;
use crate::ui;

/// Exits non-zero when the delete would be refused
pub async fn run(
    engine: &LocationEngine,
    target: DeleteTarget,
    json: bool,
    unicode: bool,
) -> Result<ExitCode> {
    let (ok, text, event) = match target {
        DeleteTarget::Location { id } => {
            let id = LocationId::from(id);
            engine.load_tree().await?;
            let check = engine.can_delete_location(&id).await?;
            let event = serde_json::json!({
                "event": "check_delete",
                "kind": "location",
                "id": check.location_id,
                "ok": check.ok,
                "reason": check.reason,
                "blockingDescendants": check.blocking_descendants,
                "referencingAreas": check.referencing_areas,
            });
            (check.ok, ui::report::render_location_check(&check, unicode), event)
        }
        DeleteTarget::CoverageArea { id } => {
            let check = engine
                .can_delete_coverage_area(&CoverageAreaId::from(id))
                .await?;
            let event = serde_json::json!({
                "event": "check_delete",
                "kind": "coverage_area",
                "id": check.coverage_area_id,
                "ok": check.ok,
                "reason": check.reason,
                "activeAssignments": check.active_assignment_count,
                "totalAssignments": check.total_assignment_count,
            });
            (check.ok, ui::report::render_coverage_area_check(&check, unicode), event)
        }
    };

    if json {
        ui::json::emit(event)?;
    } else {
        println!("{}", text);
    }
    Ok(if ok { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}
