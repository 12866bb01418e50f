use thiserror::Error;

/// Fatal transform failures.
///
/// Every variant is an invariant violation: a step carried positions that do
/// not exist in the document it was applied to, or content whose shape cannot
/// be stitched into the tree at those positions. None of these are
/// recoverable — a caller that hits one must discard the whole batch, never
/// commit a prefix of it.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TransformError {
    #[error("position {pos} outside of document (size {size})")]
    OutOfBounds { pos: usize, size: usize },

    #[error("inverted range {from}..{to}")]
    InvertedRange { from: usize, to: usize },

    #[error("replace at {from}..{to} does not line up with block boundaries")]
    InvalidReplace { from: usize, to: usize },

    #[error("gap {gap_from}..{gap_to} does not fit in replaced range {from}..{to}")]
    InvalidGap {
        from: usize,
        to: usize,
        gap_from: usize,
        gap_to: usize,
    },

    #[error("no text position at or after {pos}")]
    NoTextPosition { pos: usize },
}
