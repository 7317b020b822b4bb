/*!
 * # Editing Core
 *
 * Every change to a document goes through this module. Callers describe an
 * edit as one or more **Commands** (`Cmd`); the engine compiles them into
 * primitive **Operations** applied to a private working copy, normalizes
 * the result, and publishes a new immutable `Value` only when the whole
 * batch succeeds.
 *
 * ## Architecture Overview
 *
 * ### 1. Immutable Snapshots
 * - A `Value` is never mutated in place once published
 * - `Editor::apply` takes `&Value` and returns a `Change` holding a fresh value
 * - A failed command leaves the caller's value exactly as it was
 *
 * ### 2. Command-Based Editing
 * - `Cmd` is the public edit vocabulary (insert, remove, wrap, mark, type...)
 * - Commands compile to `Operation`s: tree, text, selection and mark primitives
 * - The operation log of every change is returned for incremental hosts
 *
 * ### 3. Refs Through Edits
 * - Multi-step transforms register path, point and range refs on the
 *   working copy and read them back after later operations
 * - The selection is carried through every operation the same way
 *
 * ### 4. Normalization
 * - After each command the tree is brought back to canonical form
 * - Fixes are applied one at a time until none remain, under a budget
 *
 * ## Module Structure
 *
 * - **`commands`**: `Cmd` plus the option and property bags it carries
 * - **`operation`**: primitive operations and how they move points and paths
 * - **`transaction`**: the working copy, its operation log and live refs
 * - **`transforms`**: one module per command family
 * - **`normalize`**: the canonical-form rules
 * - **`editor`**: `Editor`, the stateless entry point
 * - **`document`**: `Document`, a stateful host with versions, mentions and listeners
 * - **`patch`**: what a published edit touched
 *
 * ## Usage Pattern
 *
 * ```rust
 * use neuraxis_richtext_engine::editing::{Cmd, Document};
 * use neuraxis_richtext_engine::models::{Element, Path, Point, Range, Schema, Value};
 *
 * let value = Value::new(vec![Element::paragraph("hello").into()])
 *     .with_selection(Range::collapsed(Point::new([0, 0], 5)));
 * let mut doc = Document::new(value, Schema::default()).unwrap();
 *
 * let patch = doc.apply(Cmd::insert_text(" world")).unwrap();
 * assert_eq!(patch.version, 1);
 * assert_eq!(doc.value().string(&Path::new([0])), "hello world");
 * ```
 */

mod commands;
pub mod document;
mod editor;
mod error;
mod keys;
mod normalize;
mod operation;
mod patch;
mod transaction;
mod transforms;

pub use commands::{Cmd, NodeOptions, Properties};
pub use document::{Document, EditorError};
pub use editor::{Change, Editor};
pub use error::TransformError;
pub use keys::Key;
pub use operation::Operation;
pub use patch::Patch;

pub(crate) use transaction::Transaction;
