use std::process::ExitCode;

use anyhow::Result;

use locus::application::LocationEngine;

use crate::ui;

pub async fn run(engine: &LocationEngine, term: &str, json: bool) -> Result<ExitCode> {
    engine.load_tree().await?;
    let hits = engine.search(term);

    if json {
        ui::json::emit(serde_json::json!({
            "event": "search",
            "term": term,
            "hits": hits,
        }))?;
        return Ok(ExitCode::SUCCESS);
    }

    if hits.is_empty() {
        println!("No locations match '{}'", term);
        return Ok(ExitCode::FAILURE);
    }
    for hit in &hits {
        println!("{}", ui::report::render_search_hit(hit));
    }
    Ok(ExitCode::SUCCESS)
}
