//! Common test utilities for Locus scenario and property tests.
//!
//! This module provides:
//! - `ProbeSource`: an in-memory source that counts calls, delays child
//!   fetches and fails on demand
//! - Fixtures: a small Camarines Sur hierarchy with coverage areas and
//!   assignments

#![allow(dead_code)]

pub mod fixtures;
pub mod probe;

pub use fixtures::*;
pub use probe::*;
