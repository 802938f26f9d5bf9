//! Terminal output for the `locus` binary

pub mod json;
pub mod report;
pub mod theme;
pub mod tree_view;
