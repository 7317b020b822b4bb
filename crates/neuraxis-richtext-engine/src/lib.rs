pub mod editing;
pub mod formatting;
pub mod io;
pub mod mentions;
pub mod models;
pub mod query;
pub mod snapshot;

// Re-export key types for easier usage
pub use editing::{Change, Cmd, Document, Editor, EditorError, Key, Patch, TransformError};
pub use io::*;
pub use mentions::{CandidateSource, MentionEngine, StaticCandidates};
pub use models::{Element, ElementType, Mark, Node, Path, Point, Range, Schema, Text, Value};
