//! Primitive edit operations and their classification.
//!
//! The step set is closed: the four variants below are the only edit shapes
//! the document provider emits, so classification is total and infallible.

use crate::doc::{Block, BlockKind, Doc, Mark, Slice};
use crate::error::TransformError;
use crate::transform::map::{Assoc, StepMap};

/// A primitive edit against one document snapshot.
#[derive(Debug, Clone, PartialEq)]
pub enum Step {
    /// Delete `[from, to)` and insert `slice` at `from`.
    Replace { from: usize, to: usize, slice: Slice },
    /// Like `Replace`, but `[gap_from, gap_to)` is preserved verbatim and
    /// relocated to offset `insert` inside the slice. Used for structural
    /// rewraps that keep inner content untouched.
    ReplaceAround {
        from: usize,
        to: usize,
        gap_from: usize,
        gap_to: usize,
        insert: usize,
        slice: Slice,
    },
    /// Annotate `[from, to)` without changing content.
    AddMark { from: usize, to: usize, mark: Mark },
    /// Strip a mark instance from `[from, to)` without changing content.
    RemoveMark { from: usize, to: usize, mark: Mark },
}

/// Classification of a step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StepKind {
    Replace,
    ReplaceAround,
    AddMark,
    RemoveMark,
}

/// Derived quantities of a step, per its kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StepFootprint {
    pub kind: StepKind,
    pub from: usize,
    pub to: usize,
    /// Length of the original span being removed (or, for mark steps,
    /// covered).
    pub removed_size: usize,
    /// Length of the new content; for a replace-around this counts the
    /// relocated gap plus the inserted content.
    pub inserted_size: usize,
    pub gap: Option<(usize, usize)>,
}

impl Step {
    // === Constructors for the common host gestures ===

    pub fn insert_text(at: usize, text: impl Into<String>) -> Step {
        Step::Replace {
            from: at,
            to: at,
            slice: Slice::inline_text(text),
        }
    }

    pub fn delete_range(from: usize, to: usize) -> Step {
        Step::Replace {
            from,
            to,
            slice: Slice::empty(),
        }
    }

    pub fn replace_text(from: usize, to: usize, text: impl Into<String>) -> Step {
        Step::Replace {
            from,
            to,
            slice: Slice::inline_text(text),
        }
    }

    /// Split the block at a content position (the Enter gesture).
    pub fn split_block(at: usize) -> Step {
        Step::Replace {
            from: at,
            to: at,
            slice: Slice {
                blocks: vec![Block::paragraph(""), Block::paragraph("")],
                open_start: true,
                open_end: true,
            },
        }
    }

    /// Rewrap a whole block as `kind`, preserving its content as the gap.
    /// `from`/`to` are the block's outer extent.
    pub fn set_block_kind(from: usize, to: usize, kind: BlockKind) -> Step {
        Step::ReplaceAround {
            from,
            to,
            gap_from: from + 1,
            gap_to: to - 1,
            insert: 1,
            slice: Slice::blocks(vec![Block::new(kind, Vec::new())]),
        }
    }

    pub fn add_mark(from: usize, to: usize, mark: Mark) -> Step {
        Step::AddMark { from, to, mark }
    }

    pub fn remove_mark(from: usize, to: usize, mark: Mark) -> Step {
        Step::RemoveMark { from, to, mark }
    }

    // === Classification ===

    pub fn footprint(&self) -> StepFootprint {
        match self {
            Step::Replace { from, to, slice } => StepFootprint {
                kind: StepKind::Replace,
                from: *from,
                to: *to,
                removed_size: to - from,
                inserted_size: slice.size(),
                gap: None,
            },
            Step::ReplaceAround {
                from,
                to,
                gap_from,
                gap_to,
                slice,
                ..
            } => StepFootprint {
                kind: StepKind::ReplaceAround,
                from: *from,
                to: *to,
                removed_size: (gap_from - from) + (to - gap_to),
                inserted_size: (gap_to - gap_from) + slice.size(),
                gap: Some((*gap_from, *gap_to)),
            },
            Step::AddMark { from, to, .. } => StepFootprint {
                kind: StepKind::AddMark,
                from: *from,
                to: *to,
                removed_size: to - from,
                inserted_size: 0,
                gap: None,
            },
            Step::RemoveMark { from, to, .. } => StepFootprint {
                kind: StepKind::RemoveMark,
                from: *from,
                to: *to,
                removed_size: to - from,
                inserted_size: 0,
                gap: None,
            },
        }
    }

    // === Application ===

    pub fn apply(&self, doc: &Doc) -> Result<Doc, TransformError> {
        match self {
            Step::Replace { from, to, slice } => doc.replace(*from, *to, slice),
            Step::ReplaceAround {
                from,
                to,
                gap_from,
                gap_to,
                insert,
                slice,
            } => {
                if !(from <= gap_from && gap_from <= gap_to && gap_to <= to) {
                    return Err(TransformError::InvalidGap {
                        from: *from,
                        to: *to,
                        gap_from: *gap_from,
                        gap_to: *gap_to,
                    });
                }
                if slice.open_start || slice.open_end {
                    return Err(TransformError::InvalidReplace {
                        from: *from,
                        to: *to,
                    });
                }
                let gap = doc.slice(*gap_from, *gap_to)?;
                // Relocate the gap to `insert` inside the slice, then treat
                // the whole thing as one replace.
                let inner = Doc::new(slice.blocks.clone());
                let combined = inner.replace(*insert, *insert, &gap)?;
                doc.replace(*from, *to, &Slice::blocks(combined.blocks))
            }
            Step::AddMark { from, to, mark } => doc.add_mark(*from, *to, mark),
            Step::RemoveMark { from, to, mark } => doc.remove_mark(*from, *to, mark),
        }
    }

    /// This step's position delta.
    pub fn pos_map(&self) -> StepMap {
        match self {
            Step::Replace { from, to, slice } => {
                StepMap::new(vec![(*from, to - from, slice.size())])
            }
            Step::ReplaceAround {
                from,
                to,
                gap_from,
                gap_to,
                insert,
                slice,
            } => StepMap::new(vec![
                (*from, gap_from - from, *insert),
                (*gap_to, to - gap_to, slice.size() - insert),
            ]),
            Step::AddMark { .. } | Step::RemoveMark { .. } => StepMap::identity(),
        }
    }

    /// Rebuild this step with every position passed through `map`. Range
    /// starts map forward past content inserted at them, range ends map
    /// backward, so the rebuilt step covers exactly the image of the
    /// original content.
    pub fn mapped(&self, map: impl Fn(usize, Assoc) -> usize) -> Step {
        match self {
            Step::Replace { from, to, slice } => {
                let from = map(*from, Assoc::After);
                let to = map(*to, Assoc::Before).max(from);
                Step::Replace {
                    from,
                    to,
                    slice: slice.clone(),
                }
            }
            Step::ReplaceAround {
                from,
                to,
                gap_from,
                gap_to,
                insert,
                slice,
            } => {
                let from = map(*from, Assoc::After);
                let to = map(*to, Assoc::Before).max(from);
                let gap_from = map(*gap_from, Assoc::After).clamp(from, to);
                let gap_to = map(*gap_to, Assoc::Before).clamp(gap_from, to);
                Step::ReplaceAround {
                    from,
                    to,
                    gap_from,
                    gap_to,
                    insert: *insert,
                    slice: slice.clone(),
                }
            }
            Step::AddMark { from, to, mark } => {
                let from = map(*from, Assoc::After);
                let to = map(*to, Assoc::Before).max(from);
                Step::AddMark {
                    from,
                    to,
                    mark: mark.clone(),
                }
            }
            Step::RemoveMark { from, to, mark } => {
                let from = map(*from, Assoc::After);
                let to = map(*to, Assoc::Before).max(from);
                Step::RemoveMark {
                    from,
                    to,
                    mark: mark.clone(),
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::MarkKind;
    use std::collections::BTreeMap;

    fn doc(lines: &[&str]) -> Doc {
        Doc::new(lines.iter().map(|l| Block::paragraph(*l)).collect())
    }

    #[test]
    fn classify_replace() {
        let step = Step::replace_text(2, 5, "hello");
        let fp = step.footprint();
        assert_eq!(fp.kind, StepKind::Replace);
        assert_eq!(fp.removed_size, 3);
        assert_eq!(fp.inserted_size, 5);
    }

    #[test]
    fn classify_replace_around_counts_gap() {
        // Block "abc": extent [0, 5), content [1, 4).
        let step = Step::set_block_kind(0, 5, BlockKind::Heading(1));
        let fp = step.footprint();
        assert_eq!(fp.kind, StepKind::ReplaceAround);
        assert_eq!(fp.removed_size, 2);
        // Gap (3 chars) plus the new block's two tokens.
        assert_eq!(fp.inserted_size, 5);
        assert_eq!(fp.gap, Some((1, 4)));
    }

    #[test]
    fn set_block_kind_preserves_content() {
        let d = doc(&["abc"]);
        let step = Step::set_block_kind(0, 5, BlockKind::Heading(2));
        let next = step.apply(&d).unwrap();
        assert_eq!(next.blocks.len(), 1);
        assert_eq!(next.blocks[0].kind, BlockKind::Heading(2));
        assert_eq!(next.text(), "abc");
        assert_eq!(next.size(), d.size());
    }

    #[test]
    fn replace_around_preserves_marks_in_gap() {
        let mark = Mark::new(MarkKind::PendingInsert, "alice", BTreeMap::new());
        let d = doc(&["abc"]).add_mark(2, 3, &mark).unwrap();
        let step = Step::set_block_kind(0, 5, BlockKind::Heading(1));
        let next = step.apply(&d).unwrap();
        assert_eq!(next.marks_at(3).unwrap().len(), 1);
    }

    #[test]
    fn split_block_step() {
        let d = doc(&["Helloworld"]);
        let next = Step::split_block(6).apply(&d).unwrap();
        assert_eq!(next.text(), "Hello\nworld");
        assert_eq!(Step::split_block(6).pos_map().map(6, Assoc::After), 8);
    }

    #[test]
    fn pos_map_matches_size_delta() {
        let d = doc(&["Hello world"]);
        for step in [
            Step::insert_text(3, "xy"),
            Step::delete_range(2, 7),
            Step::replace_text(1, 4, "zzz"),
            Step::set_block_kind(0, 13, BlockKind::Heading(1)),
        ] {
            let next = step.apply(&d).unwrap();
            let mapped_end = step.pos_map().map(d.size(), Assoc::After);
            assert_eq!(mapped_end, next.size(), "size delta for {step:?}");
        }
    }
}
