use serde::{Deserialize, Serialize};

use super::{ElementType, NodeRef, Path, Schema};

/// Structural predicate over `(node, path)` pairs.
///
/// The root only ever matches [`NodeMatch::Path`] with the root path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "kind", content = "value")]
pub enum NodeMatch {
    /// Element with exactly this tag.
    Type(ElementType),
    /// Element with any of these tags.
    AnyType(Vec<ElementType>),
    /// Any non-inline element.
    Block,
    /// Block whose children are inline content.
    LeafBlock,
    Inline,
    Void,
    Text,
    Element,
    /// The node at exactly this path.
    Path(Path),
}

impl NodeMatch {
    pub fn lists() -> Self {
        NodeMatch::AnyType(ElementType::LIST_TYPES.to_vec())
    }

    pub fn matches(&self, node: NodeRef<'_>, path: &Path, schema: &Schema) -> bool {
        if let NodeMatch::Path(target) = self {
            return target == path;
        }
        match node {
            NodeRef::Root(_) => false,
            NodeRef::Text(_) => matches!(self, NodeMatch::Text),
            NodeRef::Element(element) => match self {
                NodeMatch::Type(kind) => element.kind == *kind,
                NodeMatch::AnyType(kinds) => kinds.contains(&element.kind),
                NodeMatch::Block => schema.is_block(element),
                NodeMatch::LeafBlock => node.is_leaf_block(schema),
                NodeMatch::Inline => schema.is_inline(element),
                NodeMatch::Void => schema.is_void(element),
                NodeMatch::Element => true,
                NodeMatch::Text | NodeMatch::Path(_) => false,
            },
        }
    }
}

/// Which matches a traversal keeps when matches nest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    All,
    /// Outermost match of each branch.
    Highest,
    /// Innermost match of each branch.
    #[default]
    Lowest,
}

impl Mode {
    /// Filters pre-ordered matched paths according to the mode.
    pub(crate) fn filter(self, matched: Vec<Path>) -> Vec<Path> {
        match self {
            Mode::All => matched,
            Mode::Highest => {
                let mut kept: Vec<Path> = Vec::new();
                for path in matched {
                    if kept.last().is_some_and(|last| last.is_ancestor_of(&path)) {
                        continue;
                    }
                    kept.push(path);
                }
                kept
            }
            Mode::Lowest => {
                let mut kept: Vec<Path> = Vec::new();
                for path in matched {
                    if kept.last().is_some_and(|last| last.is_ancestor_of(&path)) {
                        kept.pop();
                    }
                    kept.push(path);
                }
                kept
            }
        }
    }
}
