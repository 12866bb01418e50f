use serde::{Deserialize, Serialize};

use crate::doc::mark::{Mark, MarkKind};

/// Block-level node kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BlockKind {
    Paragraph,
    Heading(u8),
}

/// A run of text wearing one set of marks.
///
/// Runs are the leaves of the tree. Adjacent runs with identical mark sets
/// are coalesced when blocks are rebuilt, so a run boundary always reflects a
/// change in marks or a surviving cut point.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    pub text: String,
    pub marks: Vec<Mark>,
}

impl TextRun {
    pub fn new(text: impl Into<String>, marks: Vec<Mark>) -> Self {
        Self {
            text: text.into(),
            marks,
        }
    }

    pub fn plain(text: impl Into<String>) -> Self {
        Self::new(text, Vec::new())
    }

    /// Length in characters. Positions count characters, not bytes, so a run
    /// can never be cut inside a UTF-8 sequence.
    pub fn len(&self) -> usize {
        self.text.chars().count()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Sub-run over `[from, to)` in character offsets.
    pub fn cut(&self, from: usize, to: usize) -> TextRun {
        let start = byte_of_char(&self.text, from);
        let end = byte_of_char(&self.text, to);
        TextRun {
            text: self.text[start..end].to_string(),
            marks: self.marks.clone(),
        }
    }

    /// True when both runs wear exactly the same mark instances.
    pub fn marks_eq(&self, other: &TextRun) -> bool {
        if self.marks.len() != other.marks.len() {
            return false;
        }
        let mut a: Vec<_> = self.marks.iter().map(|m| m.id).collect();
        let mut b: Vec<_> = other.marks.iter().map(|m| m.id).collect();
        a.sort();
        b.sort();
        a == b
    }

    /// Add a mark to this run's set.
    ///
    /// A mark with the same id is replaced in place; a mark of the same kind
    /// by the same author is superseded (last applied wins). Marks of other
    /// authors stack as independent instances.
    pub fn with_mark(&self, mark: &Mark) -> TextRun {
        let mut marks: Vec<Mark> = self
            .marks
            .iter()
            .filter(|m| {
                m.id != mark.id && !(m.kind == mark.kind && m.attrs.author == mark.attrs.author)
            })
            .cloned()
            .collect();
        marks.push(mark.clone());
        TextRun {
            text: self.text.clone(),
            marks,
        }
    }

    /// Remove the mark instance with the given identity, if present.
    pub fn without_mark(&self, mark: &Mark) -> TextRun {
        TextRun {
            text: self.text.clone(),
            marks: self
                .marks
                .iter()
                .filter(|m| m.id != mark.id)
                .cloned()
                .collect(),
        }
    }

    pub fn pending_marks(&self) -> impl Iterator<Item = &Mark> {
        self.marks
            .iter()
            .filter(|m| matches!(m.kind, MarkKind::PendingInsert | MarkKind::PendingDelete))
    }
}

/// A block-level node: a kind plus its text runs.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Block {
    pub kind: BlockKind,
    pub runs: Vec<TextRun>,
}

impl Block {
    pub fn new(kind: BlockKind, runs: Vec<TextRun>) -> Self {
        let mut block = Block {
            kind,
            runs: Vec::new(),
        };
        for run in runs {
            block.push_run(run);
        }
        block
    }

    pub fn paragraph(text: impl Into<String>) -> Self {
        let text = text.into();
        if text.is_empty() {
            Block::new(BlockKind::Paragraph, Vec::new())
        } else {
            Block::new(BlockKind::Paragraph, vec![TextRun::plain(text)])
        }
    }

    pub fn heading(level: u8, text: impl Into<String>) -> Self {
        Block::new(BlockKind::Heading(level), vec![TextRun::plain(text.into())])
    }

    /// Content length in characters.
    pub fn text_len(&self) -> usize {
        self.runs.iter().map(TextRun::len).sum()
    }

    /// Footprint in the linear position space: content plus the open and
    /// close tokens.
    pub fn size(&self) -> usize {
        self.text_len() + 2
    }

    pub fn text(&self) -> String {
        self.runs.iter().map(|r| r.text.as_str()).collect()
    }

    /// Append a run, coalescing with the tail when the mark sets match.
    pub fn push_run(&mut self, run: TextRun) {
        if run.is_empty() {
            return;
        }
        if let Some(last) = self.runs.last_mut() {
            if last.marks_eq(&run) {
                last.text.push_str(&run.text);
                return;
            }
        }
        self.runs.push(run);
    }

    pub fn extend_runs(&mut self, runs: impl IntoIterator<Item = TextRun>) {
        for run in runs {
            self.push_run(run);
        }
    }

    /// Runs covering `[from, to)` in content-local character offsets.
    pub fn cut(&self, from: usize, to: usize) -> Vec<TextRun> {
        let mut out = Vec::new();
        let mut offset = 0;
        for run in &self.runs {
            let run_end = offset + run.len();
            if run_end > from && offset < to {
                let lo = from.saturating_sub(offset);
                let hi = (to - offset).min(run.len());
                let piece = run.cut(lo, hi);
                if !piece.is_empty() {
                    out.push(piece);
                }
            }
            offset = run_end;
            if offset >= to {
                break;
            }
        }
        out
    }
}

/// Byte offset of the character at `idx`, or the string's length when `idx`
/// is at or past the end.
pub(crate) fn byte_of_char(s: &str, idx: usize) -> usize {
    s.char_indices()
        .nth(idx)
        .map(|(b, _)| b)
        .unwrap_or(s.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn cut_respects_char_boundaries() {
        let run = TextRun::plain("héllo 世界");
        assert_eq!(run.len(), 8);
        assert_eq!(run.cut(1, 4).text, "éll");
        assert_eq!(run.cut(6, 8).text, "世界");
    }

    #[test]
    fn push_run_coalesces_equal_mark_sets() {
        let mut block = Block::paragraph("He");
        block.push_run(TextRun::plain("llo"));
        assert_eq!(block.runs.len(), 1);
        assert_eq!(block.text(), "Hello");

        let mark = Mark::new(MarkKind::PendingInsert, "alice", BTreeMap::new());
        block.push_run(TextRun::new("!", vec![mark]));
        assert_eq!(block.runs.len(), 2);
    }

    #[test]
    fn same_author_same_kind_mark_is_superseded() {
        let first = Mark::new(MarkKind::PendingInsert, "alice", BTreeMap::new());
        let second = Mark::new(MarkKind::PendingInsert, "alice", BTreeMap::new());
        let run = TextRun::plain("x").with_mark(&first).with_mark(&second);
        assert_eq!(run.marks.len(), 1);
        assert!(run.marks[0].is_same(&second));
    }

    #[test]
    fn cross_author_marks_stack() {
        let alice = Mark::new(MarkKind::PendingDelete, "alice", BTreeMap::new());
        let bob = Mark::new(MarkKind::PendingDelete, "bob", BTreeMap::new());
        let run = TextRun::plain("x").with_mark(&alice).with_mark(&bob);
        assert_eq!(run.marks.len(), 2);
    }
}
