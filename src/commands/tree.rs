use std::process::ExitCode;

use anyhow::Result;

use locus::application::LocationEngine;
use locus::config::ExpansionConfig;
use locus::domain::value_objects::{ExpandMode, LocationId};

use crate::cli::ExpandScope;
use crate::ui;

pub struct TreeOptions {
    pub expand: Option<ExpandScope>,
    pub subtree: bool,
    pub include_inactive: bool,
    pub json: bool,
    pub unicode: bool,
}

pub async fn run(
    engine: &LocationEngine,
    expansion: &ExpansionConfig,
    select: &[String],
    options: TreeOptions,
) -> Result<ExitCode> {
    let TreeOptions {
        expand,
        subtree,
        include_inactive,
        json,
        unicode,
    } = options;

    if include_inactive || engine.options().include_inactive {
        // Inactive units only come with the full tree
        engine.load_tree().await?;
    } else {
        engine.load_roots().await?;
    }

    let roots: Vec<LocationId> = engine.with_store(|store| {
        store.roots().into_iter().map(|n| n.id.clone()).collect()
    });
    match expand {
        Some(ExpandScope::None) => {}
        Some(ExpandScope::Roots) => {
            for root in &roots {
                engine.expand(root, expansion.default_mode).await?;
            }
        }
        Some(ExpandScope::All) => {
            for root in &roots {
                engine.expand(root, ExpandMode::Full).await?;
            }
        }
        None if expansion.auto_expand_roots => {
            engine.auto_expand_roots().await?;
        }
        None => {}
    }
    if expand == Some(ExpandScope::All) {
        let all: Vec<LocationId> =
            engine.with_store(|store| store.nodes().map(|n| n.id.clone()).collect());
        for id in &all {
            engine.expand(id, ExpandMode::Shallow).await?;
        }
    }

    for raw in select {
        let id = LocationId::from(raw.as_str());
        if subtree {
            engine.select_subtree(&id).await?;
        } else if !engine.is_selected(&id) {
            engine.toggle(&id)?;
        }
    }

    let rows = engine.visible_rows()?;
    if json {
        ui::json::emit(serde_json::json!({
            "event": "tree",
            "rows": rows,
            "selected": engine.selected_ids(),
        }))?;
    } else {
        println!("{}", ui::tree_view::render_rows(&rows, unicode));
        println!();
        println!(
            "{}",
            ui::tree_view::render_status_bar(engine.selected_ids().len(), engine.node_count(), unicode)
        );
    }
    Ok(ExitCode::SUCCESS)
}
