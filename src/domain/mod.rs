//! Domain Layer
//!
//! The hierarchy model and its rules, without I/O.
//!
//! ## Structure
//!
//! - `entities/` - Locations, coverage areas, assignments, the store and the selection
//! - `value_objects/` - Ids, location types, selection and expansion enums
//! - `services/` - Tree builder, coverage-area matcher, integrity verdicts
//! - `policies/` - Parent-type rules
//! - `ports/` - The data-source interface the infrastructure layer implements
//!
//! ## Design Principles
//!
//! 1. **No I/O** - This layer never touches the network directly
//! 2. **Pure Functions** - Services are stateless and testable
//! 3. **Ports & Adapters** - All I/O goes through trait-defined ports

pub mod entities;
pub mod policies;
pub mod ports;
pub mod services;
pub mod value_objects;
