use std::process::ExitCode;

use anyhow::Result;

use locus::application::LocationEngine;
use locus::domain::value_objects::LocationId;

use crate::ui;

pub async fn run(
    engine: &LocationEngine,
    select: &[String],
    all: bool,
    json: bool,
) -> Result<ExitCode> {
    engine.set_selection(select.iter().map(|s| LocationId::from(s.as_str())));

    let matches = if all {
        engine.containing_coverage_areas().await?
    } else {
        engine.suggest_coverage_area().await?.into_iter().collect()
    };
    let confirmed = engine.confirm().await?;

    if json {
        ui::json::emit(serde_json::json!({
            "event": "suggest",
            "matches": matches,
            "confirmed": confirmed,
        }))?;
    } else {
        println!("{}", ui::report::render_suggestion(&matches, &confirmed));
    }
    Ok(ExitCode::SUCCESS)
}
