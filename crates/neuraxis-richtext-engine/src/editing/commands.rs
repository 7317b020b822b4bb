use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{
    Edge, Element, ElementType, Location, Mark, Mode, Node, NodeMatch, NodeProps, Path,
};
use crate::query::Unit;

/// Where a node transform applies and which nodes it touches.
///
/// `at` defaults to the selection. `matcher` defaults to the node at `at`
/// when `at` is a path, and to blocks otherwise.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NodeOptions {
    pub at: Option<Location>,
    #[serde(rename = "match")]
    pub matcher: Option<NodeMatch>,
    pub mode: Mode,
    /// Split nodes at the edges of a range so only the covered part is affected.
    pub split: bool,
}

impl NodeOptions {
    pub fn matching(matcher: NodeMatch) -> Self {
        Self {
            matcher: Some(matcher),
            ..Self::default()
        }
    }

    pub fn at(mut self, at: impl Into<Location>) -> Self {
        self.at = Some(at.into());
        self
    }

    pub fn mode(mut self, mode: Mode) -> Self {
        self.mode = mode;
        self
    }

    pub fn split(mut self) -> Self {
        self.split = true;
        self
    }
}

/// A shallow patch over a node's non-structural fields.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Properties {
    #[serde(rename = "type", skip_serializing_if = "Option::is_none")]
    pub kind: Option<ElementType>,
    /// `None` removes the attribute.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, Option<String>>,
    /// `false` removes the mark.
    #[serde(skip_serializing_if = "BTreeMap::is_empty")]
    pub marks: BTreeMap<Mark, bool>,
}

impl Properties {
    pub fn kind(kind: ElementType) -> Self {
        Self {
            kind: Some(kind),
            ..Self::default()
        }
    }

    pub fn mark(mark: Mark, on: bool) -> Self {
        Self {
            marks: BTreeMap::from([(mark, on)]),
            ..Self::default()
        }
    }

    /// `props` with this patch merged over it.
    pub fn merge_into(&self, props: &NodeProps) -> NodeProps {
        match props {
            NodeProps::Element { kind, attributes } => {
                let mut attributes = attributes.clone();
                for (key, value) in &self.attributes {
                    match value {
                        Some(value) => attributes.insert(key.clone(), value.clone()),
                        None => attributes.remove(key),
                    };
                }
                NodeProps::Element {
                    kind: self.kind.unwrap_or(*kind),
                    attributes,
                }
            }
            NodeProps::Text { marks } => {
                let mut marks = marks.clone();
                for (mark, on) in &self.marks {
                    if *on {
                        marks.insert(*mark);
                    } else {
                        marks.remove(mark);
                    }
                }
                NodeProps::Text { marks }
            }
        }
    }
}

/// A high-level edit, compiled into primitive operations by the editor.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "cmd", rename_all = "snake_case")]
pub enum Cmd {
    /// Inserts `nodes` at `at`, or at the selection. `select` defaults to
    /// true exactly when the location came from the selection.
    InsertNodes {
        nodes: Vec<Node>,
        #[serde(default)]
        at: Option<Location>,
        #[serde(default)]
        select: Option<bool>,
    },
    RemoveNodes {
        #[serde(default)]
        options: NodeOptions,
    },
    SetNodes {
        properties: Properties,
        #[serde(default)]
        options: NodeOptions,
    },
    /// Wraps the matched run in a copy of `wrapper` with no children.
    WrapNodes {
        wrapper: Element,
        #[serde(default)]
        options: NodeOptions,
    },
    /// Lifts the children of matched nodes out into their grandparent.
    UnwrapNodes {
        #[serde(default)]
        options: NodeOptions,
    },
    /// Moves matched nodes up one level, splitting their parent if needed.
    LiftNodes {
        #[serde(default)]
        options: NodeOptions,
    },
    /// Moves matched nodes to sit before the node currently at `to`.
    MoveNodes {
        to: Path,
        #[serde(default)]
        options: NodeOptions,
    },
    /// Splits the ancestors of a point up to the matched node.
    SplitNodes {
        #[serde(default)]
        options: NodeOptions,
        #[serde(default)]
        always: bool,
    },
    Select {
        target: Location,
    },
    Deselect,
    Collapse {
        edge: Edge,
    },
    Move {
        #[serde(default = "one")]
        distance: usize,
        #[serde(default)]
        unit: Unit,
        #[serde(default)]
        reverse: bool,
        #[serde(default)]
        edge: Option<Edge>,
    },
    AddMark {
        mark: Mark,
    },
    RemoveMark {
        mark: Mark,
    },
    InsertText {
        text: String,
        #[serde(default)]
        at: Option<Location>,
    },
    Delete {
        #[serde(default)]
        unit: Unit,
        #[serde(default)]
        reverse: bool,
    },
    DeleteFragment,
    InsertBreak,
}

fn one() -> usize {
    1
}

impl Cmd {
    /// Inserts at the selection and selects the end of what was inserted.
    pub fn insert(node: impl Into<Node>) -> Self {
        Cmd::InsertNodes {
            nodes: vec![node.into()],
            at: None,
            select: None,
        }
    }

    pub fn select(target: impl Into<Location>) -> Self {
        Cmd::Select {
            target: target.into(),
        }
    }

    /// Moves the whole selection `distance` steps of `unit`.
    pub fn step(distance: usize, unit: Unit, reverse: bool) -> Self {
        Cmd::Move {
            distance,
            unit,
            reverse,
            edge: None,
        }
    }

    pub fn insert_text(text: impl Into<String>) -> Self {
        Cmd::InsertText {
            text: text.into(),
            at: None,
        }
    }
}
