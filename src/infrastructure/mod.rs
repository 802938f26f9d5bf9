//! Infrastructure Layer
//!
//! Concrete implementations of the `LocationDataSource` port.
//!
//! ## Structure
//!
//! - `rest` - HTTP backend (reqwest)
//! - `memory` - in-memory dataset, loadable from a JSON snapshot
//! - `legacy` - payload normalization shared by both

pub mod legacy;
pub mod memory;
pub mod rest;

pub use memory::{Dataset, InMemorySource};
pub use rest::{RestConfig, RestSource};
