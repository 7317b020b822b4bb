//! # Snapshot Testing Support
//!
//! Utilities for testing the transform engine via snapshot assertions and
//! invariant checks.
//!
//! ## Modules
//!
//! - **`outline`**: Renders a value as an indented, line-per-node text dump
//!   for `insta` inline snapshots
//! - **`invariants`**: Runtime checks that a value is in canonical form
//!   (void shape, no mergeable neighbours, texts around inlines, selection
//!   on real text)
//!
//! ## Testing Strategy
//!
//! Every transform test can end with `invariants(&value, &schema)`: whatever
//! a command did, what it publishes must already be normalized.

pub mod invariants;
pub mod outline;

pub use invariants::check as invariants;
pub use outline::outline;
