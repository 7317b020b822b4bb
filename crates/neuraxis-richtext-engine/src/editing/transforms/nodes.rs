use log::debug;

use super::default_match;
use crate::editing::{NodeOptions, Operation, Properties, Transaction, TransformError};
use crate::models::{
    Affinity, Element, Location, Mode, Node, NodeMatch, NodeProps, Path, Point, Range,
};

impl Transaction<'_> {
    fn node_at(&self, path: &Path) -> Result<&Node, TransformError> {
        self.value
            .get(path)
            .ok_or_else(|| TransformError::InvalidPath(path.clone()))
    }

    pub(crate) fn insert_node(&mut self, path: Path, node: Node) -> Result<(), TransformError> {
        self.apply(Operation::InsertNode { path, node })
    }

    pub(crate) fn remove_node(&mut self, path: &Path) -> Result<(), TransformError> {
        let node = self.node_at(path)?.clone();
        self.apply(Operation::RemoveNode {
            path: path.clone(),
            node,
        })
    }

    /// Moves the node at `from` so it sits where the node currently at `to`
    /// sits, before that node. `to` may be one past the last child.
    pub(crate) fn move_node(&mut self, from: &Path, to: &Path) -> Result<(), TransformError> {
        if from == to {
            return Ok(());
        }
        if from.is_ancestor_of(to) {
            return Err(TransformError::CannotMoveIntoSelf {
                from: from.clone(),
                to: to.clone(),
            });
        }
        let new_path = if from.ends_before(to) {
            let depth = from.len() - 1;
            let mut indices = to.indices().to_vec();
            indices[depth] -= 1;
            Path::new(indices)
        } else {
            to.clone()
        };
        if new_path == *from {
            return Ok(());
        }
        self.apply(Operation::MoveNode {
            path: from.clone(),
            new_path,
        })
    }

    pub(crate) fn split_node(&mut self, path: &Path, position: usize) -> Result<(), TransformError> {
        let properties = self.node_at(path)?.props();
        self.apply(Operation::SplitNode {
            path: path.clone(),
            position,
            properties,
        })
    }

    /// Merges the node at `path` into its previous sibling.
    pub(crate) fn merge_node(&mut self, path: &Path) -> Result<(), TransformError> {
        let previous = path
            .previous()
            .ok_or_else(|| TransformError::InvalidPath(path.clone()))?;
        let position = self.node_at(&previous)?.split_len();
        let properties = self.node_at(path)?.props();
        self.apply(Operation::MergeNode {
            path: path.clone(),
            position,
            properties,
        })
    }

    pub(crate) fn set_node(&mut self, path: &Path, props: NodeProps) -> Result<(), TransformError> {
        let properties = self.node_at(path)?.props();
        if properties == props {
            return Ok(());
        }
        self.apply(Operation::SetNode {
            path: path.clone(),
            properties,
            new_properties: props,
        })
    }

    /// Splits every ancestor of `at` from its text up to and including
    /// `highest`. Without `always`, a level where the point sits on an edge
    /// is left whole.
    pub(crate) fn split_nodes(
        &mut self,
        at: &Point,
        highest: &Path,
        always: bool,
    ) -> Result<(), TransformError> {
        let mut at = at.clone();
        let mut always = always;
        if let Some(void) = self.value.void_above(&at.path, self.schema()) {
            let Some(after) = self.value.next_text(&void) else {
                return Ok(());
            };
            at = Point::new(after, 0);
            always = true;
        }

        let before = self.point_ref(at.clone(), Affinity::Backward);
        let mut position = at.offset;
        for depth in (highest.len().max(1)..=at.path.len()).rev() {
            let path = at.path.prefix(depth);
            let point = self.point(before).unwrap_or_else(|| at.clone());
            let is_start = self.value.start(&path).as_ref() == Some(&point);
            let is_end = self.value.end(&path).as_ref() == Some(&point);
            let split = always || !(is_start || is_end);
            if split {
                self.split_node(&path, position)?;
            }
            position = path.index().unwrap_or(0) + usize::from(split || is_end);
        }
        self.unref_point(before);
        Ok(())
    }

    pub(super) fn split_nodes_at(
        &mut self,
        options: NodeOptions,
        always: bool,
    ) -> Result<(), TransformError> {
        let Some(at) = self.resolve_at(options.at)? else {
            return Ok(());
        };
        let point = match at {
            Location::Path(path) => {
                let parent = path
                    .parent()
                    .filter(|parent| !parent.is_root())
                    .ok_or_else(|| TransformError::InvalidPath(path.clone()))?;
                let index = path.index().unwrap_or(0);
                return self.split_node(&parent, index);
            }
            Location::Point(point) => point,
            Location::Range(range) if range.is_collapsed() => range.anchor,
            Location::Range(range) => self.delete_fragment(&range)?,
        };
        let matcher = options.matcher.unwrap_or(NodeMatch::Block);
        let highest = self
            .value
            .matches(&Location::Point(point.clone()), &matcher, options.mode, self.schema())
            .into_iter()
            .find(|path| !path.is_root());
        match highest {
            Some(highest) => self.split_nodes(&point, &highest, always),
            None => Ok(()),
        }
    }

    /// Splits the lowest `matcher` node around `point` unless the point is on
    /// one of its edges.
    pub(crate) fn split_inside(
        &mut self,
        point: &Point,
        matcher: &NodeMatch,
    ) -> Result<(), TransformError> {
        let lowest = self
            .value
            .matches(&Location::Point(point.clone()), matcher, Mode::Lowest, self.schema())
            .into_iter()
            .rfind(|path| !path.is_root());
        match lowest {
            Some(lowest) => self.split_nodes(point, &lowest, false),
            None => Ok(()),
        }
    }

    /// Inserts `nodes` as consecutive siblings.
    ///
    /// A point location splits the text (for inline content) or the block
    /// (for blocks) it sits in. An expanded range is deleted first. With no
    /// location and no selection the nodes are appended at the end.
    pub(crate) fn insert_nodes(
        &mut self,
        nodes: Vec<Node>,
        at: Option<Location>,
        select: Option<bool>,
    ) -> Result<(), TransformError> {
        let Some(first) = nodes.first() else {
            return Ok(());
        };
        let is_inline = match first {
            Node::Text(_) => true,
            Node::Element(element) => self.schema().is_inline(element),
        };

        let explicit = at.is_some();
        let at = match at.or_else(|| self.value.selection.clone().map(Location::Range)) {
            Some(at) => at,
            None => match self.value.end(&Path::root()) {
                Some(end) => Location::Point(end),
                None => Location::Path(Path::from([self.value.children.len()])),
            },
        };
        let select = select.unwrap_or(!explicit);

        let point = match &at {
            Location::Range(range) if range.is_collapsed() => Some(range.anchor.clone()),
            Location::Range(range) => Some(self.delete_fragment(range)?),
            Location::Point(point) => Some(point.clone()),
            Location::Path(_) => None,
        };

        let target = match (point, at) {
            (Some(point), _) => {
                let text = self
                    .value
                    .text(&point.path)
                    .ok_or_else(|| TransformError::InvalidPath(point.path.clone()))?;
                if !text.text.is_char_boundary(point.offset) {
                    return Err(TransformError::InvalidOffset {
                        path: point.path.clone(),
                        offset: point.offset,
                    });
                }
                match self.value.void_above(&point.path, self.schema()) {
                    Some(void) if is_inline => void.next().unwrap_or(void),
                    _ => {
                        let highest = if is_inline {
                            point.path.clone()
                        } else {
                            self.value
                                .leaf_block_of(&point.path, self.schema())
                                .ok_or_else(|| TransformError::InvalidPath(point.path.clone()))?
                        };
                        let at_end = self.value.end(&highest).as_ref() == Some(&point);
                        let highest_ref = self.path_ref(highest.clone(), Affinity::Forward);
                        self.split_nodes(&point, &highest, false)?;
                        let path = self.unref_path(highest_ref).unwrap_or(highest);
                        match path.next() {
                            Some(next) if at_end => next,
                            _ => path,
                        }
                    }
                }
            }
            (None, Location::Path(path)) => path,
            (None, _) => return Ok(()),
        };

        let parent = target
            .parent()
            .ok_or_else(|| TransformError::InvalidPath(target.clone()))?;
        let len = self
            .value
            .children_at(&parent)
            .ok_or_else(|| TransformError::InvalidPath(target.clone()))?
            .len();
        let mut index = target.index().unwrap_or(0);
        if index > len {
            return Err(TransformError::InvalidPath(target));
        }
        if self.value.void_above(&parent, self.schema()).is_some() {
            debug!("not inserting into the void at {parent}");
            return Ok(());
        }

        for node in nodes {
            self.insert_node(parent.child(index), node)?;
            index += 1;
        }

        if select && let Some(end) = self.value.end(&parent.child(index - 1)) {
            self.set_selection(Some(Range::collapsed(end)))?;
        }
        Ok(())
    }

    pub(crate) fn remove_nodes(&mut self, options: NodeOptions) -> Result<(), TransformError> {
        let Some(at) = self.resolve_at(options.at)? else {
            return Ok(());
        };
        let matcher = options.matcher.unwrap_or_else(|| default_match(&at));
        let refs: Vec<_> = self
            .value
            .matches(&at, &matcher, options.mode, self.schema())
            .into_iter()
            .filter(|path| !path.is_root())
            .collect::<Vec<_>>()
            .into_iter()
            .map(|path| self.path_ref(path, Affinity::Forward))
            .collect();
        for r in refs {
            if let Some(path) = self.unref_path(r) {
                self.remove_node(&path)?;
            }
        }
        Ok(())
    }

    /// Patches every matched node. With `split`, texts or blocks cut by the
    /// edges of a range are split first so only the covered part changes.
    pub(crate) fn set_nodes(
        &mut self,
        properties: &Properties,
        options: NodeOptions,
    ) -> Result<(), TransformError> {
        let from_selection = options.at.is_none();
        let Some(mut at) = self.resolve_at(options.at)? else {
            return Ok(());
        };
        let matcher = options.matcher.unwrap_or_else(|| default_match(&at));

        if options.split
            && let Location::Range(range) = &at
            && range.is_expanded()
        {
            let r = self.range_ref(range.clone(), true);
            self.split_inside(&range.end(), &matcher)?;
            if let Some(current) = self.range(r) {
                self.split_inside(&current.start(), &matcher)?;
            }
            let Some(range) = self.unref_range(r) else {
                return Ok(());
            };
            if from_selection {
                self.set_selection(Some(range.clone()))?;
            }
            at = Location::Range(range);
        }

        for path in self.value.matches(&at, &matcher, options.mode, self.schema()) {
            if path.is_root() {
                continue;
            }
            let props = properties.merge_into(&self.node_at(&path)?.props());
            self.set_node(&path, props)?;
        }
        Ok(())
    }

    /// Wraps the matched run in `wrapper`, placed at their common ancestor.
    /// An inline wrapper wraps within each block separately.
    pub(crate) fn wrap_nodes(
        &mut self,
        wrapper: Element,
        options: NodeOptions,
    ) -> Result<(), TransformError> {
        let Some(at) = self.resolve_at(options.at)? else {
            return Ok(());
        };
        let inline_wrapper = self.schema().is_inline(&wrapper);
        let matcher = options.matcher.unwrap_or_else(|| match &at {
            Location::Path(path) => NodeMatch::Path(path.clone()),
            _ if inline_wrapper => NodeMatch::Text,
            _ => NodeMatch::Block,
        });

        let roots = if inline_wrapper {
            self.value
                .matches(&at, &NodeMatch::Block, Mode::Lowest, self.schema())
        } else {
            vec![Path::root()]
        };
        let root_refs: Vec<_> = roots
            .into_iter()
            .map(|root| self.path_ref(root, Affinity::Forward))
            .collect();

        for root_ref in root_refs {
            let Some(root) = self.unref_path(root_ref) else {
                continue;
            };
            let scoped = match &at {
                Location::Range(range) => {
                    let Some(span) = self
                        .value
                        .range_of(&root)
                        .and_then(|whole| range.intersection(&whole))
                    else {
                        continue;
                    };
                    Location::Range(span)
                }
                other => other.clone(),
            };

            let matched = self
                .value
                .matches(&scoped, &matcher, options.mode, self.schema());
            let (Some(first), Some(last)) = (matched.first(), matched.last()) else {
                continue;
            };
            if first.is_root() || last.is_root() {
                continue;
            }
            let common = if first == last {
                first.parent().unwrap_or_default()
            } else {
                first.common(last)
            };
            let depth = common.len() + 1;
            let first_index = first[depth - 1];
            let last_index = last[depth - 1];
            let Some(wrapper_path) = last.prefix(depth).next() else {
                continue;
            };

            let shell = Element {
                children: Vec::new(),
                ..wrapper.clone()
            };
            self.insert_node(wrapper_path.clone(), shell.into())?;
            let wrapper_ref = self.path_ref(wrapper_path, Affinity::Forward);
            for offset in 0..=(last_index - first_index) {
                let Some(wrapper_path) = self.path(wrapper_ref) else {
                    break;
                };
                self.move_node(&common.child(first_index), &wrapper_path.child(offset))?;
            }
            self.unref_path(wrapper_ref);
        }
        Ok(())
    }

    /// Lifts the children of each matched node into its parent. With `split`
    /// only the children inside the range are lifted.
    pub(crate) fn unwrap_nodes(&mut self, options: NodeOptions) -> Result<(), TransformError> {
        let Some(at) = self.resolve_at(options.at)? else {
            return Ok(());
        };
        let matcher = options.matcher.unwrap_or_else(|| default_match(&at));
        let at = match at {
            Location::Path(path) => match self.value.range_of(&path) {
                Some(range) => Location::Range(range),
                None => Location::Path(path),
            },
            other => other,
        };
        let range_ref = match &at {
            Location::Range(range) if options.split => Some(self.range_ref(range.clone(), false)),
            _ => None,
        };

        let wrappers: Vec<_> = self
            .value
            .matches(&at, &matcher, options.mode, self.schema())
            .into_iter()
            .filter(|path| !path.is_root())
            .rev()
            .collect::<Vec<_>>()
            .into_iter()
            .map(|path| self.path_ref(path, Affinity::Forward))
            .collect();

        for wrapper_ref in wrappers {
            let Some(wrapper) = self.unref_path(wrapper_ref) else {
                continue;
            };
            let count = self.value.children_at(&wrapper).map_or(0, <[Node]>::len);
            if count == 0 {
                continue;
            }
            let mut first = 0;
            let mut last = count - 1;
            if let Some(r) = range_ref
                && let Some(current) = self.range(r)
                && let Some(whole) = self.value.range_of(&wrapper)
            {
                let Some(span) = current.intersection(&whole) else {
                    continue;
                };
                let depth = wrapper.len();
                if wrapper.is_ancestor_of(&span.start().path) {
                    first = span.start().path[depth];
                }
                if wrapper.is_ancestor_of(&span.end().path) {
                    last = span.end().path[depth];
                }
            }

            let children: Vec<_> = (first..=last)
                .map(|index| self.path_ref(wrapper.child(index), Affinity::Forward))
                .collect();
            for child in children {
                if let Some(path) = self.unref_path(child) {
                    self.lift_node(&path)?;
                }
            }
        }

        if let Some(r) = range_ref {
            self.unref_range(r);
        }
        Ok(())
    }

    /// Moves the node at `path` up one level, next to its parent. A middle
    /// child splits the parent in two.
    fn lift_node(&mut self, path: &Path) -> Result<(), TransformError> {
        let invalid = || TransformError::InvalidPath(path.clone());
        if path.len() < 2 {
            return Err(invalid());
        }
        let parent = path.parent().ok_or_else(invalid)?;
        let after_parent = parent.next().ok_or_else(invalid)?;
        let index = path.index().ok_or_else(invalid)?;
        let length = self.value.children_at(&parent).ok_or_else(invalid)?.len();

        if length == 1 {
            self.move_node(path, &after_parent)?;
            self.remove_node(&parent)
        } else if index == 0 {
            self.move_node(path, &parent)
        } else if index == length - 1 {
            self.move_node(path, &after_parent)
        } else {
            self.split_node(&parent, index + 1)?;
            self.move_node(path, &after_parent)
        }
    }

    pub(crate) fn lift_nodes(&mut self, options: NodeOptions) -> Result<(), TransformError> {
        let Some(at) = self.resolve_at(options.at)? else {
            return Ok(());
        };
        let matcher = options.matcher.unwrap_or_else(|| default_match(&at));
        let refs: Vec<_> = self
            .value
            .matches(&at, &matcher, options.mode, self.schema())
            .into_iter()
            .filter(|path| !path.is_root())
            .collect::<Vec<_>>()
            .into_iter()
            .map(|path| self.path_ref(path, Affinity::Forward))
            .collect();
        for r in refs {
            if let Some(path) = self.unref_path(r) {
                self.lift_node(&path)?;
            }
        }
        Ok(())
    }

    /// Moves every matched node, in order, to sit before the node at `to`.
    pub(crate) fn move_nodes(&mut self, options: NodeOptions, to: Path) -> Result<(), TransformError> {
        let Some(at) = self.resolve_at(options.at)? else {
            return Ok(());
        };
        let matcher = options.matcher.unwrap_or_else(|| default_match(&at));
        let to_ref = self.path_ref(to, Affinity::Forward);
        let refs: Vec<_> = self
            .value
            .matches(&at, &matcher, options.mode, self.schema())
            .into_iter()
            .filter(|path| !path.is_root())
            .collect::<Vec<_>>()
            .into_iter()
            .map(|path| self.path_ref(path, Affinity::Forward))
            .collect();
        for r in refs {
            let (Some(path), Some(to)) = (self.unref_path(r), self.path(to_ref)) else {
                continue;
            };
            self.move_node(&path, &to)?;
        }
        self.unref_path(to_ref);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use crate::editing::{Cmd, NodeOptions, Properties, Transaction};
    use crate::models::{
        Element, ElementType, Location, Node, NodeMatch, Path, Point, Range, Schema, Value,
    };
    use pretty_assertions::assert_eq;

    fn item(text: &str) -> Node {
        Element::new(ElementType::ListItem, vec![Node::text(text)]).into()
    }

    fn list(items: &[&str]) -> Node {
        Element::new(
            ElementType::BulletedList,
            items.iter().map(|text| item(text)).collect(),
        )
        .into()
    }

    fn run(value: Value, cmds: Vec<Cmd>) -> Value {
        let schema = Schema::default();
        let mut tx = Transaction::new(value, &schema);
        for cmd in cmds {
            tx.run(cmd).unwrap();
        }
        tx.finish().0
    }

    #[test]
    fn move_node_takes_the_place_of_the_target() {
        let value = Value::new(vec![
            Element::paragraph("a").into(),
            Element::paragraph("b").into(),
            Element::paragraph("c").into(),
        ]);
        let value = run(
            value,
            vec![Cmd::MoveNodes {
                to: Path::from([3]),
                options: NodeOptions::default().at(Path::from([0])),
            }],
        );
        let texts: Vec<String> = value.children.iter().map(Node::string).collect();
        assert_eq!(texts, vec!["b", "c", "a"]);
    }

    #[test]
    fn move_into_own_subtree_is_rejected() {
        let schema = Schema::default();
        let value = Value::new(vec![list(&["a", "b"])]);
        let mut tx = Transaction::new(value, &schema);
        let err = tx.move_node(&Path::from([0]), &Path::from([0, 1])).unwrap_err();
        assert_eq!(
            err,
            crate::editing::TransformError::CannotMoveIntoSelf {
                from: Path::from([0]),
                to: Path::from([0, 1]),
            }
        );
    }

    #[test]
    fn inserting_a_block_mid_text_splits_the_block() {
        let value = Value::new(vec![Element::paragraph("hello").into()])
            .with_selection(Range::collapsed(Point::new([0, 0], 2)));
        let value = run(value, vec![Cmd::insert(Element::paragraph("new"))]);
        let texts: Vec<String> = value.children.iter().map(Node::string).collect();
        assert_eq!(texts, vec!["he", "new", "llo"]);
        assert_eq!(value.selection, Some(Range::collapsed(Point::new([1, 0], 3))));
    }

    #[test]
    fn inserting_without_selection_appends() {
        let value = Value::new(vec![Element::paragraph("a").into()]);
        let value = run(value, vec![Cmd::insert(Element::paragraph("b"))]);
        let texts: Vec<String> = value.children.iter().map(Node::string).collect();
        assert_eq!(texts, vec!["a", "b"]);
        assert_eq!(value.selection, Some(Range::collapsed(Point::new([1, 0], 1))));
    }

    #[test]
    fn inserting_at_a_bad_path_fails() {
        let schema = Schema::default();
        let value = Value::new(vec![Element::paragraph("a").into()]);
        let mut tx = Transaction::new(value, &schema);
        let err = tx
            .run(Cmd::InsertNodes {
                nodes: vec![Element::paragraph("b").into()],
                at: Some(Location::Path(Path::from([5]))),
                select: None,
            })
            .unwrap_err();
        assert_eq!(err, crate::editing::TransformError::InvalidPath(Path::from([5])));
    }

    #[test]
    fn wrap_then_unwrap_a_middle_item() {
        let value = Value::new(vec![list(&["a", "b", "c"])]);
        let value = run(
            value,
            vec![Cmd::UnwrapNodes {
                options: NodeOptions::matching(NodeMatch::lists())
                    .at(Range::collapsed(Point::new([0, 1, 0], 0)))
                    .split(),
            }],
        );
        assert_eq!(value.children.len(), 3);
        assert_eq!(value.children[1], item("b"));
        assert_eq!(value.children[0], list(&["a"]));
        assert_eq!(value.children[2], list(&["c"]));

        let value = run(
            value,
            vec![Cmd::WrapNodes {
                wrapper: Element::new(ElementType::NumberedList, vec![]),
                options: NodeOptions::default().at(Point::new([1, 0], 0)),
            }],
        );
        assert_eq!(
            value.children[1],
            Element::new(ElementType::NumberedList, vec![item("b")]).into()
        );
    }

    #[test]
    fn set_nodes_patches_each_block_in_range() {
        let value = Value::new(vec![
            Element::paragraph("a").into(),
            Element::paragraph("b").into(),
        ])
        .with_selection(Range::new(Point::new([0, 0], 0), Point::new([1, 0], 1)));
        let value = run(
            value,
            vec![Cmd::SetNodes {
                properties: Properties::kind(ElementType::HeadingTwo),
                options: NodeOptions::default(),
            }],
        );
        for child in &value.children {
            assert_eq!(child.as_element().map(|e| e.kind), Some(ElementType::HeadingTwo));
        }
    }

    #[test]
    fn lifting_only_child_removes_parent() {
        let value = Value::new(vec![list(&["only"])]);
        let value = run(
            value,
            vec![Cmd::LiftNodes {
                options: NodeOptions::default().at(Path::from([0, 0])),
            }],
        );
        assert_eq!(value.children, vec![item("only")]);
    }
}
