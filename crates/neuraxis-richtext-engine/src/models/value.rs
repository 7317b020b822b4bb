use serde::{Deserialize, Serialize};

use super::{Element, Location, Marks, Mode, Node, NodeMatch, Path, Point, Range, Schema, Text};

/// The document root: top-level blocks, the selection and pending cursor marks.
///
/// A `Value` is an immutable snapshot as far as callers are concerned. Edits
/// go through [`Editor`](crate::editing::Editor), which returns a new value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Value {
    pub children: Vec<Node>,
    #[serde(default)]
    pub selection: Option<Range>,
    /// Marks to apply to text typed at a collapsed cursor.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marks: Option<Marks>,
}

/// Borrowed view of any node in the tree, root included.
#[derive(Debug, Clone, Copy)]
pub enum NodeRef<'a> {
    Root(&'a Value),
    Element(&'a Element),
    Text(&'a Text),
}

impl<'a> NodeRef<'a> {
    pub fn children(self) -> &'a [Node] {
        match self {
            NodeRef::Root(value) => &value.children,
            NodeRef::Element(element) => &element.children,
            NodeRef::Text(_) => &[],
        }
    }

    pub fn as_element(self) -> Option<&'a Element> {
        match self {
            NodeRef::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn as_text(self) -> Option<&'a Text> {
        match self {
            NodeRef::Text(text) => Some(text),
            _ => None,
        }
    }

    pub fn is_root(self) -> bool {
        matches!(self, NodeRef::Root(_))
    }

    pub fn is_text(self) -> bool {
        matches!(self, NodeRef::Text(_))
    }

    pub fn is_block(self, schema: &Schema) -> bool {
        self.as_element().is_some_and(|e| schema.is_block(e))
    }

    pub fn is_inline(self, schema: &Schema) -> bool {
        self.as_element().is_some_and(|e| schema.is_inline(e))
    }

    pub fn is_void(self, schema: &Schema) -> bool {
        self.as_element().is_some_and(|e| schema.is_void(e))
    }

    /// A block whose content is text and inline elements.
    pub fn is_leaf_block(self, schema: &Schema) -> bool {
        if !self.is_block(schema) {
            return false;
        }
        match self.children().first() {
            None | Some(Node::Text(_)) => true,
            Some(Node::Element(first)) => schema.is_inline(first),
        }
    }

    /// True when this node holds at least one block child.
    pub fn has_block_children(self, schema: &Schema) -> bool {
        self.children()
            .iter()
            .any(|child| matches!(child, Node::Element(e) if schema.is_block(e)))
    }

    pub fn string(self) -> String {
        match self {
            NodeRef::Text(text) => text.text.clone(),
            other => other.children().iter().map(Node::string).collect(),
        }
    }
}

impl<'a> From<&'a Node> for NodeRef<'a> {
    fn from(node: &'a Node) -> Self {
        match node {
            Node::Element(element) => NodeRef::Element(element),
            Node::Text(text) => NodeRef::Text(text),
        }
    }
}

/// Pre-order traversal of `(node, path)` pairs, optionally scoped to a span.
///
/// When scoped, the ancestors of both ends are yielded along with every node
/// between them in document order.
pub struct Nodes<'a> {
    stack: Vec<(NodeRef<'a>, Path)>,
    from: Option<Path>,
    to: Option<Path>,
}

impl<'a> Iterator for Nodes<'a> {
    type Item = (NodeRef<'a>, Path);

    fn next(&mut self) -> Option<Self::Item> {
        while let Some((node, path)) = self.stack.pop() {
            if let Some(to) = &self.to
                && path.is_after(to)
            {
                self.stack.clear();
                return None;
            }
            if let Some(from) = &self.from
                && path.is_before(from)
            {
                continue;
            }
            for (index, child) in node.children().iter().enumerate().rev() {
                self.stack.push((NodeRef::from(child), path.child(index)));
            }
            return Some((node, path));
        }
        None
    }
}

impl Value {
    pub fn new(children: Vec<Node>) -> Self {
        Self {
            children,
            selection: None,
            marks: None,
        }
    }

    pub fn with_selection(mut self, selection: Range) -> Self {
        self.selection = Some(selection);
        self
    }

    pub fn root(&self) -> NodeRef<'_> {
        NodeRef::Root(self)
    }

    /// The node at `path`; the root for the empty path.
    pub fn node(&self, path: &Path) -> Option<NodeRef<'_>> {
        if path.is_root() {
            return Some(self.root());
        }
        self.get(path).map(NodeRef::from)
    }

    /// The non-root node at `path`.
    pub fn get(&self, path: &Path) -> Option<&Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.children.get(first)?;
        for &index in rest {
            node = node.children().get(index)?;
        }
        Some(node)
    }

    pub(crate) fn get_mut(&mut self, path: &Path) -> Option<&mut Node> {
        let (&first, rest) = path.split_first()?;
        let mut node = self.children.get_mut(first)?;
        for &index in rest {
            node = node.children_mut()?.get_mut(index)?;
        }
        Some(node)
    }

    /// Children of the root or of the element at `path`. `None` for text leaves.
    pub fn children_at(&self, path: &Path) -> Option<&[Node]> {
        match self.node(path)? {
            NodeRef::Text(_) => None,
            node => Some(node.children()),
        }
    }

    pub(crate) fn children_at_mut(&mut self, path: &Path) -> Option<&mut Vec<Node>> {
        if path.is_root() {
            return Some(&mut self.children);
        }
        self.get_mut(path)?.children_mut()
    }

    pub fn has(&self, path: &Path) -> bool {
        self.node(path).is_some()
    }

    pub fn text(&self, path: &Path) -> Option<&Text> {
        self.get(path)?.as_text()
    }

    pub fn element(&self, path: &Path) -> Option<&Element> {
        self.get(path)?.as_element()
    }

    pub fn parent(&self, path: &Path) -> Option<NodeRef<'_>> {
        self.node(&path.parent()?)
    }

    /// Concatenated text below `path`, empty when it does not resolve.
    pub fn string(&self, path: &Path) -> String {
        self.node(path).map(NodeRef::string).unwrap_or_default()
    }

    /// Path of the first text leaf at or below `path`.
    pub fn first_text(&self, path: &Path) -> Option<Path> {
        let mut current = path.clone();
        loop {
            match self.node(&current)? {
                NodeRef::Text(_) => return Some(current),
                node if node.children().is_empty() => return None,
                _ => current = current.child(0),
            }
        }
    }

    /// Path of the last text leaf at or below `path`.
    pub fn last_text(&self, path: &Path) -> Option<Path> {
        let mut current = path.clone();
        loop {
            match self.node(&current)? {
                NodeRef::Text(_) => return Some(current),
                node => {
                    let count = node.children().len();
                    if count == 0 {
                        return None;
                    }
                    current = current.child(count - 1);
                }
            }
        }
    }

    pub fn start(&self, path: &Path) -> Option<Point> {
        Some(Point::new(self.first_text(path)?, 0))
    }

    pub fn end(&self, path: &Path) -> Option<Point> {
        let last = self.last_text(path)?;
        let len = self.text(&last)?.len();
        Some(Point::new(last, len))
    }

    /// Range covering all content below `path`.
    pub fn range_of(&self, path: &Path) -> Option<Range> {
        Some(Range::new(self.start(path)?, self.end(path)?))
    }

    pub fn nodes(&self) -> Nodes<'_> {
        Nodes {
            stack: vec![(self.root(), Path::root())],
            from: None,
            to: None,
        }
    }

    pub fn nodes_between(&self, from: &Path, to: &Path) -> Nodes<'_> {
        Nodes {
            stack: vec![(self.root(), Path::root())],
            from: Some(from.clone()),
            to: Some(to.clone()),
        }
    }

    /// First and last paths a location spans, or `None` when it does not resolve.
    pub fn span(&self, at: &Location) -> Option<(Path, Path)> {
        match at {
            Location::Path(path) => {
                self.node(path)?;
                let first = self.first_text(path).unwrap_or_else(|| path.clone());
                let last = self.last_text(path).unwrap_or_else(|| path.clone());
                Some((first, last))
            }
            Location::Point(point) => Some((point.path.clone(), point.path.clone())),
            Location::Range(range) => {
                let (start, end) = range.edges();
                Some((start.path, end.path))
            }
        }
    }

    pub fn nodes_at(&self, at: &Location) -> Nodes<'_> {
        match self.span(at) {
            Some((from, to)) => self.nodes_between(&from, &to),
            None => Nodes {
                stack: Vec::new(),
                from: None,
                to: None,
            },
        }
    }

    /// Paths of the nodes in `at` accepted by `matcher`, filtered by `mode`.
    pub fn matches(
        &self,
        at: &Location,
        matcher: &NodeMatch,
        mode: Mode,
        schema: &Schema,
    ) -> Vec<Path> {
        let matched = self
            .nodes_at(at)
            .filter(|(node, path)| matcher.matches(*node, path, schema))
            .map(|(_, path)| path)
            .collect();
        mode.filter(matched)
    }

    /// `path` itself or its nearest ancestor accepted by `matcher`.
    pub fn closest(&self, path: &Path, matcher: &NodeMatch, schema: &Schema) -> Option<Path> {
        let mut current = Some(path.clone());
        while let Some(candidate) = current {
            let node = self.node(&candidate)?;
            if matcher.matches(node, &candidate, schema) {
                return Some(candidate);
            }
            current = candidate.parent();
        }
        None
    }

    /// The block that holds `path` as inline content.
    pub fn leaf_block_of(&self, path: &Path, schema: &Schema) -> Option<Path> {
        self.closest(path, &NodeMatch::Block, schema)
    }

    pub fn void_above(&self, path: &Path, schema: &Schema) -> Option<Path> {
        self.closest(path, &NodeMatch::Void, schema)
    }

    /// Every text leaf in document order.
    pub fn texts(&self) -> impl Iterator<Item = (Path, &Text)> + '_ {
        self.nodes()
            .filter_map(|(node, path)| node.as_text().map(|text| (path, text)))
    }

    /// The last text leaf that precedes `path` in document order.
    pub fn previous_text(&self, path: &Path) -> Option<Path> {
        self.texts()
            .map(|(p, _)| p)
            .take_while(|p| p.is_before(path))
            .last()
    }

    /// The first text leaf that follows `path` in document order.
    pub fn next_text(&self, path: &Path) -> Option<Path> {
        self.texts().map(|(p, _)| p).find(|p| p.is_after(path))
    }

    /// True when `point` addresses a text leaf on a char boundary.
    pub fn is_valid_point(&self, point: &Point) -> bool {
        self.text(&point.path)
            .is_some_and(|t| t.text.is_char_boundary(point.offset))
    }
}
