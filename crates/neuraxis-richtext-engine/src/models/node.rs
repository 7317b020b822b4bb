use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Type tag carried by an element node.
///
/// Whether an element is laid out as a block or inline, and whether it is
/// void, is decided by the [`Schema`](crate::models::Schema), not by the tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ElementType {
    Paragraph,
    HeadingOne,
    HeadingTwo,
    BulletedList,
    NumberedList,
    ListItem,
    Mention,
}

impl ElementType {
    /// Container tags that hold `list-item` blocks.
    pub const LIST_TYPES: [ElementType; 2] = [ElementType::NumberedList, ElementType::BulletedList];

    pub fn is_list(self) -> bool {
        Self::LIST_TYPES.contains(&self)
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ElementType::Paragraph => "paragraph",
            ElementType::HeadingOne => "heading-one",
            ElementType::HeadingTwo => "heading-two",
            ElementType::BulletedList => "bulleted-list",
            ElementType::NumberedList => "numbered-list",
            ElementType::ListItem => "list-item",
            ElementType::Mention => "mention",
        }
    }
}

impl fmt::Display for ElementType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown element type: {0}")]
pub struct UnknownElementType(pub String);

impl FromStr for ElementType {
    type Err = UnknownElementType;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        [
            ElementType::Paragraph,
            ElementType::HeadingOne,
            ElementType::HeadingTwo,
            ElementType::BulletedList,
            ElementType::NumberedList,
            ElementType::ListItem,
            ElementType::Mention,
        ]
        .into_iter()
        .find(|t| t.as_str() == s)
        .ok_or_else(|| UnknownElementType(s.to_string()))
    }
}

/// A boolean text style attached to a run of text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mark {
    Bold,
    Italic,
    Code,
    Underline,
}

impl Mark {
    pub fn as_str(self) -> &'static str {
        match self {
            Mark::Bold => "bold",
            Mark::Italic => "italic",
            Mark::Code => "code",
            Mark::Underline => "underline",
        }
    }
}

impl fmt::Display for Mark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown mark: {0}")]
pub struct UnknownMark(pub String);

impl FromStr for Mark {
    type Err = UnknownMark;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "bold" => Ok(Mark::Bold),
            "italic" => Ok(Mark::Italic),
            "code" => Ok(Mark::Code),
            "underline" => Ok(Mark::Underline),
            other => Err(UnknownMark(other.to_string())),
        }
    }
}

/// The set of marks active on a text leaf.
pub type Marks = BTreeSet<Mark>;

/// A text leaf. Offsets into `text` are byte offsets on char boundaries.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "TextRepr", into = "TextRepr")]
pub struct Text {
    pub text: String,
    pub marks: Marks,
}

/// JSON shape of a text leaf: marks are flattened as `"bold": true` fields.
#[derive(Serialize, Deserialize)]
struct TextRepr {
    text: String,
    #[serde(flatten)]
    rest: BTreeMap<String, serde_json::Value>,
}

impl From<TextRepr> for Text {
    fn from(repr: TextRepr) -> Self {
        let marks = repr
            .rest
            .into_iter()
            .filter(|(_, v)| v.as_bool() == Some(true))
            .filter_map(|(k, _)| k.parse::<Mark>().ok())
            .collect();
        Text {
            text: repr.text,
            marks,
        }
    }
}

impl From<Text> for TextRepr {
    fn from(text: Text) -> Self {
        TextRepr {
            text: text.text,
            rest: text
                .marks
                .into_iter()
                .map(|m| (m.as_str().to_string(), serde_json::Value::Bool(true)))
                .collect(),
        }
    }
}

impl Text {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            marks: Marks::new(),
        }
    }

    pub fn with_marks(text: impl Into<String>, marks: impl IntoIterator<Item = Mark>) -> Self {
        Self {
            text: text.into(),
            marks: marks.into_iter().collect(),
        }
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// An element node: a type tag, string attributes and ordered children.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Element {
    #[serde(rename = "type")]
    pub kind: ElementType,
    #[serde(flatten, default)]
    pub attributes: BTreeMap<String, String>,
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(kind: ElementType, children: Vec<Node>) -> Self {
        Self {
            kind,
            attributes: BTreeMap::new(),
            children,
        }
    }

    /// A paragraph holding a single unmarked text leaf.
    pub fn paragraph(text: impl Into<String>) -> Self {
        Self::new(ElementType::Paragraph, vec![Node::Text(Text::new(text))])
    }

    /// A mention inline carrying `username`, with its placeholder text child.
    pub fn mention(username: impl Into<String>) -> Self {
        Self::new(ElementType::Mention, vec![Node::Text(Text::new(""))])
            .with_attribute("username", username)
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attribute(&self, key: &str) -> Option<&str> {
        self.attributes.get(key).map(String::as_str)
    }
}

/// A non-root document node.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Node {
    Element(Element),
    Text(Text),
}

impl Node {
    pub fn text(text: impl Into<String>) -> Self {
        Node::Text(Text::new(text))
    }

    pub fn as_text(&self) -> Option<&Text> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            Node::Text(_) => None,
        }
    }

    pub(crate) fn as_text_mut(&mut self) -> Option<&mut Text> {
        match self {
            Node::Text(t) => Some(t),
            Node::Element(_) => None,
        }
    }

    pub fn is_text(&self) -> bool {
        matches!(self, Node::Text(_))
    }

    pub fn children(&self) -> &[Node] {
        match self {
            Node::Element(e) => &e.children,
            Node::Text(_) => &[],
        }
    }

    pub(crate) fn children_mut(&mut self) -> Option<&mut Vec<Node>> {
        match self {
            Node::Element(e) => Some(&mut e.children),
            Node::Text(_) => None,
        }
    }

    /// Concatenated text of every leaf below this node.
    pub fn string(&self) -> String {
        match self {
            Node::Text(t) => t.text.clone(),
            Node::Element(e) => e.children.iter().map(Node::string).collect(),
        }
    }

    /// Length used when splitting or merging: bytes for text, children for elements.
    pub fn split_len(&self) -> usize {
        match self {
            Node::Text(t) => t.len(),
            Node::Element(e) => e.children.len(),
        }
    }

    pub fn props(&self) -> NodeProps {
        match self {
            Node::Element(e) => NodeProps::Element {
                kind: e.kind,
                attributes: e.attributes.clone(),
            },
            Node::Text(t) => NodeProps::Text {
                marks: t.marks.clone(),
            },
        }
    }

    /// Replaces the non-structural fields of the node. Mismatched kinds are ignored.
    pub(crate) fn set_props(&mut self, props: &NodeProps) {
        match (self, props) {
            (Node::Element(e), NodeProps::Element { kind, attributes }) => {
                e.kind = *kind;
                e.attributes = attributes.clone();
            }
            (Node::Text(t), NodeProps::Text { marks }) => {
                t.marks = marks.clone();
            }
            _ => {}
        }
    }

    /// An empty node of the same kind carrying `props`, used as the right half of a split.
    pub(crate) fn empty_with_props(props: &NodeProps) -> Node {
        match props {
            NodeProps::Element { kind, attributes } => Node::Element(Element {
                kind: *kind,
                attributes: attributes.clone(),
                children: Vec::new(),
            }),
            NodeProps::Text { marks } => Node::Text(Text {
                text: String::new(),
                marks: marks.clone(),
            }),
        }
    }
}

impl From<Element> for Node {
    fn from(e: Element) -> Self {
        Node::Element(e)
    }
}

impl From<Text> for Node {
    fn from(t: Text) -> Self {
        Node::Text(t)
    }
}

/// The non-structural fields of a node: tag and attributes, or marks.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NodeProps {
    Element {
        #[serde(rename = "type")]
        kind: ElementType,
        attributes: BTreeMap<String, String>,
    },
    Text {
        marks: Marks,
    },
}
