//! Document model: an immutable-by-convention tree of blocks and text runs
//! with a linear position space.
//!
//! Positions count characters plus one open and one close token per block,
//! so a block's footprint is `text_len + 2` and every integer in
//! `[0, doc.size()]` names a real place in the tree: either a boundary
//! between blocks or a content offset inside one. The engine never mutates a
//! `Doc`; every edit produces a new snapshot and the old one stays valid for
//! any position previously resolved against it.

pub mod mark;
pub mod node;

use serde::{Deserialize, Serialize};

pub use mark::{Mark, MarkId, MarkKind, SuggestionAttrs};
pub use node::{Block, BlockKind, TextRun};

use crate::error::TransformError;

/// One immutable version of the document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Doc {
    pub blocks: Vec<Block>,
}

/// Where a position lands in the tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Resolved {
    /// Between blocks: before the open token of block `index`, or at the end
    /// of the document when `index == blocks.len()`.
    Boundary(usize),
    /// Inside block `block`'s content, `offset` characters in
    /// (`0..=text_len`).
    Content { block: usize, offset: usize },
}

/// Content cut out of a document.
///
/// `open_start` / `open_end` record whether the edge blocks were cut through
/// their content rather than taken whole; an open edge carries no boundary
/// token on that side and must be stitched onto a matching cut edge when the
/// slice is inserted.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slice {
    pub blocks: Vec<Block>,
    pub open_start: bool,
    pub open_end: bool,
}

impl Slice {
    pub fn empty() -> Self {
        Slice {
            blocks: Vec::new(),
            open_start: false,
            open_end: false,
        }
    }

    /// Inline text: a single cut-open paragraph, insertable at any content
    /// position.
    pub fn inline_text(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            return Slice::empty();
        }
        Slice {
            blocks: vec![Block::new(
                BlockKind::Paragraph,
                vec![TextRun::plain(text)],
            )],
            open_start: true,
            open_end: true,
        }
    }

    /// Inline runs carrying their marks, cut open at both edges.
    pub fn runs(runs: Vec<TextRun>) -> Self {
        if runs.iter().all(TextRun::is_empty) {
            return Slice::empty();
        }
        Slice {
            blocks: vec![Block::new(BlockKind::Paragraph, runs)],
            open_start: true,
            open_end: true,
        }
    }

    pub fn blocks(blocks: Vec<Block>) -> Self {
        Slice {
            blocks,
            open_start: false,
            open_end: false,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }

    /// Footprint in the position space: block sizes minus the boundary
    /// tokens the open edges do not carry.
    pub fn size(&self) -> usize {
        let blocks: usize = self.blocks.iter().map(Block::size).sum();
        blocks - self.open_start as usize - self.open_end as usize
    }

    /// Concatenated text content. Block boundaries contribute nothing.
    pub fn text(&self) -> String {
        self.blocks.iter().map(|b| b.text()).collect()
    }
}

impl Doc {
    pub fn new(blocks: Vec<Block>) -> Self {
        Doc { blocks }
    }

    /// One paragraph per line of `text`. Convenience for hosts and tests.
    pub fn from_text(text: &str) -> Self {
        Doc {
            blocks: text.lines().map(Block::paragraph).collect(),
        }
    }

    pub fn size(&self) -> usize {
        self.blocks.iter().map(Block::size).sum()
    }

    /// Content text with one `\n` per block boundary. A readable projection
    /// for assertions; the inverse of [`Doc::from_text`] for plain docs.
    pub fn text(&self) -> String {
        self.blocks
            .iter()
            .map(|b| b.text())
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub(crate) fn resolve(&self, pos: usize) -> Result<Resolved, TransformError> {
        let size = self.size();
        if pos > size {
            return Err(TransformError::OutOfBounds { pos, size });
        }
        let mut start = 0;
        for (i, block) in self.blocks.iter().enumerate() {
            if pos == start {
                return Ok(Resolved::Boundary(i));
            }
            let len = block.text_len();
            if pos <= start + 1 + len {
                return Ok(Resolved::Content {
                    block: i,
                    offset: pos - start - 1,
                });
            }
            start += block.size();
        }
        Ok(Resolved::Boundary(self.blocks.len()))
    }

    /// Marks active at a position: the marks of the character the position
    /// trails, or of the character it faces when it sits at a content start.
    /// Block boundaries carry no marks.
    pub fn marks_at(&self, pos: usize) -> Result<Vec<Mark>, TransformError> {
        match self.resolve(pos)? {
            Resolved::Boundary(_) => Ok(Vec::new()),
            Resolved::Content { block, offset } => {
                let block = &self.blocks[block];
                if offset == 0 {
                    return Ok(block
                        .runs
                        .first()
                        .map(|r| r.marks.clone())
                        .unwrap_or_default());
                }
                let target = offset - 1;
                let mut run_start = 0;
                for run in &block.runs {
                    let run_end = run_start + run.len();
                    if target < run_end {
                        return Ok(run.marks.clone());
                    }
                    run_start = run_end;
                }
                Ok(Vec::new())
            }
        }
    }

    /// Visit every text run overlapping `[from, to)`. The visitor receives
    /// the run and its absolute start position.
    pub fn nodes_between(&self, from: usize, to: usize, mut visitor: impl FnMut(&TextRun, usize)) {
        let mut start = 0;
        for block in &self.blocks {
            if start >= to {
                break;
            }
            let mut run_pos = start + 1;
            for run in &block.runs {
                let run_end = run_pos + run.len();
                if run_end > from && run_pos < to {
                    visitor(run, run_pos);
                }
                run_pos = run_end;
            }
            start += block.size();
        }
    }

    /// The nearest content position at `pos` or after it; falls back to the
    /// end of the last block's content when `pos` is the document end.
    pub fn snap_to_text(&self, pos: usize) -> Result<usize, TransformError> {
        match self.resolve(pos)? {
            Resolved::Content { .. } => Ok(pos),
            Resolved::Boundary(i) if i < self.blocks.len() => Ok(pos + 1),
            Resolved::Boundary(_) => {
                if self.blocks.is_empty() {
                    Err(TransformError::NoTextPosition { pos })
                } else {
                    Ok(self.size() - 1)
                }
            }
        }
    }

    /// Cut out the content covering `[from, to)`.
    pub fn slice(&self, from: usize, to: usize) -> Result<Slice, TransformError> {
        if from > to {
            return Err(TransformError::InvertedRange { from, to });
        }
        let size = self.size();
        if to > size {
            return Err(TransformError::OutOfBounds { pos: to, size });
        }
        if from == to {
            return Ok(Slice::empty());
        }
        let mut blocks = Vec::new();
        let mut open_start = false;
        let mut open_end = false;
        let mut start = 0;
        for block in &self.blocks {
            let end = start + block.size();
            if end > from && start < to {
                if blocks.is_empty() {
                    open_start = from > start;
                }
                open_end = to < end;
                let len = block.text_len();
                let content_start = start + 1;
                let lo = from.saturating_sub(content_start).min(len);
                let hi = to.saturating_sub(content_start).min(len);
                blocks.push(Block::new(block.kind, block.cut(lo, hi)));
            }
            start = end;
        }
        Ok(Slice {
            blocks,
            open_start,
            open_end,
        })
    }

    fn cut_before(&self, pos: usize) -> Result<(Vec<Block>, Option<Block>), TransformError> {
        match self.resolve(pos)? {
            Resolved::Boundary(i) => Ok((self.blocks[..i].to_vec(), None)),
            Resolved::Content { block, offset } => {
                let cut = Block::new(self.blocks[block].kind, self.blocks[block].cut(0, offset));
                Ok((self.blocks[..block].to_vec(), Some(cut)))
            }
        }
    }

    fn cut_after(&self, pos: usize) -> Result<(Option<Block>, Vec<Block>), TransformError> {
        match self.resolve(pos)? {
            Resolved::Boundary(i) => Ok((None, self.blocks[i..].to_vec())),
            Resolved::Content { block, offset } => {
                let len = self.blocks[block].text_len();
                let cut = Block::new(self.blocks[block].kind, self.blocks[block].cut(offset, len));
                Ok((Some(cut), self.blocks[block + 1..].to_vec()))
            }
        }
    }

    /// Delete `[from, to)` and insert `slice` at `from`, producing the next
    /// snapshot. Open slice edges must line up with cut edges of the target
    /// range; a mismatch means the step's shape is wrong for this document
    /// and is fatal.
    pub fn replace(&self, from: usize, to: usize, slice: &Slice) -> Result<Doc, TransformError> {
        if from > to {
            return Err(TransformError::InvertedRange { from, to });
        }
        let (left, left_open) = self.cut_before(from)?;
        let (right_open, right) = self.cut_after(to)?;

        let fits = if slice.is_empty() {
            left_open.is_some() == right_open.is_some()
        } else {
            slice.open_start == left_open.is_some() && slice.open_end == right_open.is_some()
        };
        if !fits {
            return Err(TransformError::InvalidReplace { from, to });
        }

        let mut blocks = left;
        // The block currently open on its right edge, still collecting runs.
        let mut pending = left_open;

        let last = slice.blocks.len().wrapping_sub(1);
        for (i, sblock) in slice.blocks.iter().enumerate() {
            let merges_left = i == 0 && slice.open_start;
            let stays_open = i == last && slice.open_end;
            if merges_left {
                match pending.as_mut() {
                    Some(p) => p.extend_runs(sblock.runs.iter().cloned()),
                    None => return Err(TransformError::InvalidReplace { from, to }),
                }
            } else {
                if let Some(p) = pending.take() {
                    blocks.push(p);
                }
                pending = Some(sblock.clone());
            }
            if !stays_open {
                if let Some(p) = pending.take() {
                    blocks.push(p);
                }
            }
        }

        match (pending, right_open) {
            (Some(mut p), Some(r)) => {
                p.extend_runs(r.runs);
                blocks.push(p);
            }
            (None, None) => {}
            // Ruled out by the fit check above.
            (Some(_), None) | (None, Some(_)) => {
                return Err(TransformError::InvalidReplace { from, to });
            }
        }
        blocks.extend(right);
        Ok(Doc { blocks })
    }

    /// Apply a mark over the text in `[from, to)`. Boundary tokens inside
    /// the range are skipped; only runs can wear marks.
    pub fn add_mark(&self, from: usize, to: usize, mark: &Mark) -> Result<Doc, TransformError> {
        self.rebuild_marked(from, to, |run| run.with_mark(mark))
    }

    /// Strip the mark instance from the text in `[from, to)`.
    pub fn remove_mark(&self, from: usize, to: usize, mark: &Mark) -> Result<Doc, TransformError> {
        self.rebuild_marked(from, to, |run| run.without_mark(mark))
    }

    fn rebuild_marked(
        &self,
        from: usize,
        to: usize,
        apply: impl Fn(&TextRun) -> TextRun,
    ) -> Result<Doc, TransformError> {
        if from > to {
            return Err(TransformError::InvertedRange { from, to });
        }
        let size = self.size();
        if to > size {
            return Err(TransformError::OutOfBounds { pos: to, size });
        }
        let mut blocks = Vec::with_capacity(self.blocks.len());
        let mut start = 0;
        for block in &self.blocks {
            let len = block.text_len();
            let content_start = start + 1;
            let lo = from.saturating_sub(content_start).min(len);
            let hi = to.saturating_sub(content_start).min(len);
            if hi <= lo || to <= content_start || from >= content_start + len {
                blocks.push(block.clone());
            } else {
                let mut rebuilt = Block::new(block.kind, Vec::new());
                rebuilt.extend_runs(block.cut(0, lo));
                for run in block.cut(lo, hi) {
                    rebuilt.push_run(apply(&run));
                }
                rebuilt.extend_runs(block.cut(hi, len));
                blocks.push(rebuilt);
            }
            start += block.size();
        }
        Ok(Doc { blocks })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::BTreeMap;

    fn doc(lines: &[&str]) -> Doc {
        Doc::new(lines.iter().map(|l| Block::paragraph(*l)).collect())
    }

    #[test]
    fn size_counts_tokens_and_chars() {
        let d = doc(&["Hello", "world"]);
        assert_eq!(d.size(), 14);
        assert_eq!(d.text(), "Hello\nworld");
    }

    #[test]
    fn resolve_covers_every_position() {
        let d = doc(&["ab"]);
        assert_eq!(d.resolve(0).unwrap(), Resolved::Boundary(0));
        assert_eq!(
            d.resolve(1).unwrap(),
            Resolved::Content {
                block: 0,
                offset: 0
            }
        );
        assert_eq!(
            d.resolve(3).unwrap(),
            Resolved::Content {
                block: 0,
                offset: 2
            }
        );
        assert_eq!(d.resolve(4).unwrap(), Resolved::Boundary(1));
        assert!(d.resolve(5).is_err());
    }

    #[test]
    fn slice_then_replace_is_identity() {
        let d = doc(&["Hello world", "Second line"]);
        for (from, to) in [(1, 4), (3, 12), (5, 20), (0, 13), (12, 14)] {
            let s = d.slice(from, to).unwrap();
            assert_eq!(s.size(), to - from, "slice size for {from}..{to}");
            let back = d.replace(from, to, &s).unwrap();
            assert_eq!(back, d, "round trip for {from}..{to}");
        }
    }

    #[test]
    fn inline_text_slice_round_trips_content() {
        let s = Slice::inline_text("lo w");
        assert!(s.open_start && s.open_end);
        assert_eq!(s.size(), 4);
        assert_eq!(s.text(), "lo w");
        assert_eq!(Slice::inline_text("").text(), "");
    }

    #[test]
    fn insert_text_mid_block() {
        let d = doc(&["Helloworld"]);
        let next = d.replace(6, 6, &Slice::inline_text(" big ")).unwrap();
        assert_eq!(next.text(), "Hello big world");
        assert_eq!(next.size(), d.size() + 5);
    }

    #[test]
    fn delete_across_block_boundary_joins() {
        let d = doc(&["Hello", "world"]);
        // Remove "lo", the boundary, and "wo".
        let next = d.replace(4, 10, &Slice::empty()).unwrap();
        assert_eq!(next.text(), "Helrld");
        assert_eq!(next.blocks.len(), 1);
    }

    #[test]
    fn split_block_with_open_slice() {
        let d = doc(&["Helloworld"]);
        let split = Slice {
            blocks: vec![
                Block::paragraph(""),
                Block::paragraph(""),
            ],
            open_start: true,
            open_end: true,
        };
        assert_eq!(split.size(), 2);
        let next = d.replace(6, 6, &split).unwrap();
        assert_eq!(next.text(), "Hello\nworld");
        assert_eq!(next.blocks.len(), 2);
    }

    #[test]
    fn replace_rejects_mismatched_edges() {
        let d = doc(&["Hello"]);
        // Closed block content cannot be stitched into the middle of text.
        let closed = Slice::blocks(vec![Block::paragraph("x")]);
        assert!(matches!(
            d.replace(3, 3, &closed),
            Err(TransformError::InvalidReplace { .. })
        ));
    }

    #[test]
    fn marks_at_prefers_trailing_character() {
        let mark = Mark::new(MarkKind::PendingInsert, "alice", BTreeMap::new());
        let d = doc(&["abcd"]).add_mark(2, 4, &mark).unwrap();
        assert!(d.marks_at(1).unwrap().is_empty());
        assert!(d.marks_at(2).unwrap().is_empty());
        assert_eq!(d.marks_at(3).unwrap().len(), 1);
        assert_eq!(d.marks_at(4).unwrap().len(), 1);
        assert!(d.marks_at(5).unwrap().is_empty());
    }

    #[test]
    fn add_then_remove_mark_restores_doc() {
        let original = doc(&["Hello world"]);
        let mark = Mark::new(MarkKind::PendingDelete, "alice", BTreeMap::new());
        let marked = original.add_mark(3, 8, &mark).unwrap();
        assert_eq!(marked.blocks[0].runs.len(), 3);
        let stripped = marked.remove_mark(0, marked.size(), &mark).unwrap();
        assert_eq!(stripped, original);
    }

    #[test]
    fn snap_to_text_advances_past_boundaries() {
        let d = doc(&["ab", "cd"]);
        assert_eq!(d.snap_to_text(0).unwrap(), 1);
        assert_eq!(d.snap_to_text(2).unwrap(), 2);
        assert_eq!(d.snap_to_text(4).unwrap(), 5);
        assert_eq!(d.snap_to_text(8).unwrap(), 7);
    }
}
