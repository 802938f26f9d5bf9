//! Application Layer
//!
//! Use cases that orchestrate domain logic and the data-source port.
//! `LocationEngine` is the single entry point; its operations are split by
//! concern:
//!
//! - `engine` - session state, initial loads, selection
//! - `expansion` - lazy, coalesced child loading and expand/collapse
//! - `coverage` - coverage-area suggestion, adoption and confirmation
//! - `integrity` - deletion pre-checks
//! - `mutations` - validated writes with re-sync on failure
//! - `snapshot` - render-ready views

mod coverage;
mod engine;
mod expansion;
mod integrity;
mod mutations;
mod snapshot;

pub use coverage::{ConfirmedSelection, CoverageCatalog};
pub use engine::{EngineOptions, LocationEngine};
pub use expansion::{ExpansionPhase, NodeExpansion};
pub use mutations::DeleteConfirmation;
pub use snapshot::{TreeNodeView, VisibleRow};
