//! # Document Model
//!
//! The tree a rich-text document is made of, and read-only ways to walk it.
//!
//! - **`node`**: `Element`, `Text`, the closed set of element tags and marks
//! - **`path`** / **`point`**: positional addresses, ranges and locations
//! - **`schema`**: which tags are inline, void or markable
//! - **`value`**: the root, lookups and pre-order traversal
//! - **`matcher`**: predicates and modes for matched traversal
//!
//! Nothing in here mutates a tree in place for callers; see `editing`.

pub mod matcher;
pub mod node;
pub mod path;
pub mod point;
pub mod schema;
pub mod value;

pub use matcher::{Mode, NodeMatch};
pub use node::{
    Element, ElementType, Mark, Marks, Node, NodeProps, Text, UnknownElementType, UnknownMark,
};
pub use path::Path;
pub use point::{Affinity, Edge, Location, Point, Range};
pub use schema::Schema;
pub use value::{NodeRef, Nodes, Value};
