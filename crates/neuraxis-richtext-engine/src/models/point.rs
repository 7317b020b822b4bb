use std::cmp::Ordering;

use serde::{Deserialize, Serialize};

use super::Path;

/// A cursor position: a text leaf and a byte offset into its string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    pub path: Path,
    pub offset: usize,
}

impl Point {
    pub fn new(path: impl Into<Path>, offset: usize) -> Self {
        Self {
            path: path.into(),
            offset,
        }
    }

    pub fn compare(&self, other: &Point) -> Ordering {
        match self.path.compare(&other.path) {
            Ordering::Equal => self.offset.cmp(&other.offset),
            unequal => unequal,
        }
    }

    pub fn is_before(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Less
    }

    pub fn is_after(&self, other: &Point) -> bool {
        self.compare(other) == Ordering::Greater
    }
}

/// Which side a tracked position sticks to when content is inserted or
/// split exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Affinity {
    #[default]
    Forward,
    Backward,
}

/// A span between two points. The anchor may come after the focus.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Range {
    pub anchor: Point,
    pub focus: Point,
}

/// One end of a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Edge {
    Anchor,
    Focus,
    Start,
    End,
}

impl Range {
    pub fn new(anchor: Point, focus: Point) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(point: Point) -> Self {
        Self {
            anchor: point.clone(),
            focus: point,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    pub fn is_expanded(&self) -> bool {
        !self.is_collapsed()
    }

    pub fn is_backward(&self) -> bool {
        self.anchor.is_after(&self.focus)
    }

    /// `(start, end)` in document order, whatever the direction.
    pub fn edges(&self) -> (Point, Point) {
        if self.is_backward() {
            (self.focus.clone(), self.anchor.clone())
        } else {
            (self.anchor.clone(), self.focus.clone())
        }
    }

    pub fn start(&self) -> Point {
        self.edges().0
    }

    pub fn end(&self) -> Point {
        self.edges().1
    }

    pub fn point(&self, edge: Edge) -> Point {
        match edge {
            Edge::Anchor => self.anchor.clone(),
            Edge::Focus => self.focus.clone(),
            Edge::Start => self.start(),
            Edge::End => self.end(),
        }
    }

    pub fn contains(&self, point: &Point) -> bool {
        let (start, end) = self.edges();
        !point.is_before(&start) && !point.is_after(&end)
    }

    /// Overlap of two ranges as a forward range, if any.
    pub fn intersection(&self, other: &Range) -> Option<Range> {
        let (s1, e1) = self.edges();
        let (s2, e2) = other.edges();
        let start = if s1.is_before(&s2) { s2 } else { s1 };
        let end = if e1.is_before(&e2) { e1 } else { e2 };
        if end.is_before(&start) {
            None
        } else {
            Some(Range::new(start, end))
        }
    }
}

/// Where a transform applies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Location {
    Path(Path),
    Point(Point),
    Range(Range),
}

impl From<Path> for Location {
    fn from(path: Path) -> Self {
        Location::Path(path)
    }
}

impl From<Point> for Location {
    fn from(point: Point) -> Self {
        Location::Point(point)
    }
}

impl From<Range> for Location {
    fn from(range: Range) -> Self {
        Location::Range(range)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backward_range_edges_are_ordered() {
        let range = Range::new(Point::new([0, 0], 5), Point::new([0, 0], 1));
        assert!(range.is_backward());
        let (start, end) = range.edges();
        assert_eq!(start, Point::new([0, 0], 1));
        assert_eq!(end, Point::new([0, 0], 5));
        assert_eq!(range.point(Edge::Focus), start);
    }

    #[test]
    fn points_compare_by_path_then_offset() {
        assert!(Point::new([0, 1], 0).is_after(&Point::new([0, 0], 9)));
        assert!(Point::new([0, 0], 2).is_before(&Point::new([0, 0], 3)));
    }

    #[test]
    fn intersection_of_disjoint_ranges_is_none() {
        let a = Range::new(Point::new([0, 0], 0), Point::new([0, 0], 2));
        let b = Range::new(Point::new([1, 0], 0), Point::new([1, 0], 2));
        assert_eq!(a.intersection(&b), None);

        let c = Range::new(Point::new([0, 0], 1), Point::new([1, 0], 1));
        assert_eq!(
            a.intersection(&c),
            Some(Range::new(Point::new([0, 0], 1), Point::new([0, 0], 2)))
        );
    }
}
