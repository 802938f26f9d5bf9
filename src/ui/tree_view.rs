//! Terminal rendering of the visible tree rows

use locus::application::VisibleRow;
use locus::domain::value_objects::SelectionState;

use super::theme::{icon, icons, icons_ascii};

/// Render a single row: indent, expansion marker, selection marker, label
pub fn render_row(row: &VisibleRow, unicode: bool) -> String {
    let indent = "  ".repeat(row.depth);

    let expand_icon = if row.loading {
        format!("{} ", icon(unicode, icons::LOADING, icons_ascii::LOADING))
    } else if row.has_children == Some(false) {
        // Leaf: keep columns aligned with the marker it would have had
        " ".repeat(if unicode { 2 } else { 4 })
    } else if row.expanded {
        format!("{} ", icon(unicode, icons::EXPAND, icons_ascii::EXPAND))
    } else {
        format!("{} ", icon(unicode, icons::COLLAPSE, icons_ascii::COLLAPSE))
    };

    let state_icon = match row.selection {
        SelectionState::Selected => icon(unicode, icons::SELECTED, icons_ascii::SELECTED),
        SelectionState::Unselected => icon(unicode, icons::UNSELECTED, icons_ascii::UNSELECTED),
        SelectionState::Indeterminate => icon(unicode, icons::PARTIAL, icons_ascii::PARTIAL),
    };

    let mut suffix = String::new();
    if row.has_children == Some(true) && row.child_count > 0 {
        suffix.push_str(&format!(" ({})", row.child_count));
    }
    if !row.is_active {
        suffix.push_str(" (inactive)");
    }

    format!("{}{}{} {}{}", indent, expand_icon, state_icon, row.name, suffix)
}

pub fn render_rows(rows: &[VisibleRow], unicode: bool) -> String {
    rows.iter()
        .map(|row| render_row(row, unicode))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Selection count and the icon legend
pub fn render_status_bar(selected: usize, loaded: usize, unicode: bool) -> String {
    format!(
        "Selected: {} of {} loaded locations\n\n{} = selected    {} = partial    {} = not selected",
        selected,
        loaded,
        icon(unicode, icons::SELECTED, icons_ascii::SELECTED),
        icon(unicode, icons::PARTIAL, icons_ascii::PARTIAL),
        icon(unicode, icons::UNSELECTED, icons_ascii::UNSELECTED),
    )
}
