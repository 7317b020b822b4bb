use crate::models::Path;

/// Failure of a primitive operation or a transform built on them.
///
/// A transform that fails leaves the caller's value untouched: all work
/// happens on a private working copy.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransformError {
    #[error("Path {0} does not resolve to a node")]
    InvalidPath(Path),
    #[error("Node at {0} is not a text leaf")]
    NotText(Path),
    #[error("Node at {0} is not an element")]
    NotElement(Path),
    #[error("Offset {offset} is not a char boundary inside the text at {path}")]
    InvalidOffset { path: Path, offset: usize },
    #[error("Cannot move {from} into its own subtree at {to}")]
    CannotMoveIntoSelf { from: Path, to: Path },
    #[error("Normalization did not settle after {0} fixes")]
    NormalizationLoop(usize),
}
