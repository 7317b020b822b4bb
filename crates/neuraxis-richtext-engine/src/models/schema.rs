use std::collections::BTreeSet;

use super::{Element, ElementType};

/// Per-tag capabilities consulted by traversal, positions and transforms.
///
/// Replaces overriding `is_inline`/`is_void` on a live editor object: a tag is
/// inline or void because the schema says so.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schema {
    pub inline: BTreeSet<ElementType>,
    pub void: BTreeSet<ElementType>,
    /// Voids whose placeholder text may carry marks.
    pub markable_void: BTreeSet<ElementType>,
}

impl Schema {
    /// No inline or void tags: every element is a block.
    pub fn plain() -> Self {
        Self {
            inline: BTreeSet::new(),
            void: BTreeSet::new(),
            markable_void: BTreeSet::new(),
        }
    }

    /// `mention` is an inline, markable void.
    pub fn with_mentions() -> Self {
        let mention = BTreeSet::from([ElementType::Mention]);
        Self {
            inline: mention.clone(),
            void: mention.clone(),
            markable_void: mention,
        }
    }

    pub fn is_inline(&self, element: &Element) -> bool {
        self.inline.contains(&element.kind)
    }

    pub fn is_block(&self, element: &Element) -> bool {
        !self.is_inline(element)
    }

    pub fn is_void(&self, element: &Element) -> bool {
        self.void.contains(&element.kind)
    }

    pub fn is_markable_void(&self, element: &Element) -> bool {
        self.is_void(element) && self.markable_void.contains(&element.kind)
    }
}

impl Default for Schema {
    fn default() -> Self {
        Self::with_mentions()
    }
}
