//! The suggestion transformer: rewrites a batch of primitive edits so that
//! deletions are kept in place as `pending-delete` annotations and
//! insertions are tagged `pending-insert`.
//!
//! Coordinates are the hard part. Step `i` of a batch is expressed against
//! the document after steps `0..i`, but the output transform diverges from
//! that replay as soon as one step is rewritten (reinserted content exists
//! only in the output). Positions are therefore carried from the replay
//! coordinates back to the base snapshot through the inverted maps of every
//! replayed step, then forward through the output transform's own mapping —
//! the full accumulated mapping, never a shortcut.

use crate::doc::{Block, BlockKind, Doc, Mark, MarkKind, Slice};
use crate::error::TransformError;
use crate::suggest::session::Session;
use crate::transform::{Assoc, Step, StepFootprint, StepKind, StepMap, Transform};

/// An ordered batch of steps against one base snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Batch {
    pub steps: Vec<Step>,
    /// Set on batches the engine produces itself (resolver output) so a
    /// re-entrant pass does not annotate its own rewrites.
    pub bypass: bool,
    /// Set on undo/redo replays, which must pass through untouched.
    pub history: bool,
}

impl Batch {
    pub fn new(steps: Vec<Step>) -> Self {
        Batch {
            steps,
            bypass: false,
            history: false,
        }
    }

    pub fn bypassed(mut self) -> Self {
        self.bypass = true;
        self
    }

    pub fn from_history(mut self) -> Self {
        self.history = true;
        self
    }
}

/// A rewritten batch ready to commit.
#[derive(Debug, Clone)]
pub struct Rewrite {
    pub transform: Transform,
    /// Caret repositioning for backspace/forward-delete gestures: the start
    /// of the reinserted span, so the cursor does not jump.
    pub caret: Option<usize>,
    /// Always true: the host must not route this batch through the
    /// transformer again.
    pub bypass: bool,
}

/// Rewrite `batch` so its edits become pending suggestions.
///
/// Returns `Ok(None)` when the batch passes through untouched (tracking
/// disabled, bypass/history flag set, or nothing trackable in the batch);
/// the host then applies the original batch unchanged.
pub fn intercept_batch(
    base: &Doc,
    batch: &Batch,
    session: &Session,
) -> Result<Option<Rewrite>, TransformError> {
    if batch.bypass || batch.history || !session.enabled {
        tracing::trace!(
            bypass = batch.bypass,
            history = batch.history,
            enabled = session.enabled,
            "batch passes through untracked"
        );
        return Ok(None);
    }

    let mut output = Transform::new(base.clone());
    // Replays the *original* steps so each step's coordinates can be
    // resolved against the document it was expressed against.
    let mut intermediate = Transform::new(base.clone());
    // Inverted maps of the replayed steps, newest last.
    let mut undone: Vec<StepMap> = Vec::new();
    let mut caret = None;
    let mut changed = false;

    for step in &batch.steps {
        let fp = step.footprint();
        match fp.kind {
            StepKind::AddMark | StepKind::RemoveMark => {
                // Formatting changes are not content suggestions; forward
                // them with remapped coordinates.
                let mapped = step.mapped(|p, a| map_to_output(&undone, &output, p, a));
                output.step(mapped)?;
            }
            StepKind::Replace | StepKind::ReplaceAround => {
                let pieces = removed_pieces(intermediate.doc(), &fp)?;
                let removed_text: String = pieces.iter().map(Slice::text).collect();
                let extend = pending_mark_at(intermediate.doc(), fp.from, session)?;
                let mapped = step.mapped(|p, a| map_to_output(&undone, &output, p, a));
                let mfrom = mapped.footprint().from;
                output.step(mapped)?;

                match extend {
                    Some(mark) if fp.inserted_size > 0 => {
                        // Typing inside an already-pending region grows the
                        // same region instead of nesting a new annotation.
                        tracing::trace!(from = fp.from, "extending pending span");
                        output.add_mark(mfrom, mfrom + fp.inserted_size, mark)?;
                        changed = true;
                    }
                    _ => {
                        let mut insert_at = mfrom;
                        if removed_text.chars().any(|c| !c.is_whitespace()) {
                            let mark = Mark::new(
                                MarkKind::PendingDelete,
                                session.author.clone(),
                                session.metadata.clone(),
                            );
                            let mut at = mfrom;
                            let mut span_start = None;
                            for piece in &pieces {
                                if piece.size() == 0 {
                                    continue;
                                }
                                let (start, end) = reinsert_piece(&mut output, at, piece)?;
                                output.add_mark(start, end, mark.clone())?;
                                span_start.get_or_insert(start);
                                at = end;
                            }
                            insert_at = at;
                            if fp.inserted_size == 0 {
                                // Backspace/forward-delete: keep the caret at
                                // the reinsertion point.
                                caret = span_start;
                            }
                            changed = true;
                        }
                        if fp.inserted_size > 0 {
                            let mark = Mark::new(
                                MarkKind::PendingInsert,
                                session.author.clone(),
                                session.metadata.clone(),
                            );
                            output.add_mark(insert_at, insert_at + fp.inserted_size, mark)?;
                            changed = true;
                        }
                    }
                }
            }
        }

        undone.push(step.pos_map().invert());
        intermediate.step(step.clone())?;
    }

    if !changed {
        tracing::debug!(steps = batch.steps.len(), "batch had no trackable change");
        return Ok(None);
    }
    tracing::debug!(
        steps = batch.steps.len(),
        rewritten = output.steps().len(),
        author = %session.author,
        "rewrote batch as suggestions"
    );
    Ok(Some(Rewrite {
        transform: output,
        caret,
        bypass: true,
    }))
}

/// Carry a position from the replay's current coordinates to the output's:
/// back to the base snapshot through the inverted replay maps, then forward
/// through the output transform's mapping.
fn map_to_output(undone: &[StepMap], output: &Transform, pos: usize, assoc: Assoc) -> usize {
    let mut p = pos;
    for map in undone.iter().rev() {
        p = map.map(p, assoc);
    }
    output.mapping().map(p, assoc)
}

/// The content a step removes: the replaced range, minus the preserved gap
/// for a replace-around.
fn removed_pieces(doc: &Doc, fp: &StepFootprint) -> Result<Vec<Slice>, TransformError> {
    let mut pieces = Vec::new();
    match fp.gap {
        None => {
            if fp.to > fp.from {
                pieces.push(doc.slice(fp.from, fp.to)?);
            }
        }
        Some((gap_from, gap_to)) => {
            if gap_from > fp.from {
                pieces.push(doc.slice(fp.from, gap_from)?);
            }
            if fp.to > gap_to {
                pieces.push(doc.slice(gap_to, fp.to)?);
            }
        }
    }
    Ok(pieces)
}

/// This session's own pending-insert mark active at `pos`, if any. Only
/// insert marks are candidates for extension: growing a pending-delete over
/// freshly typed text would schedule that text for removal on accept.
fn pending_mark_at(
    doc: &Doc,
    pos: usize,
    session: &Session,
) -> Result<Option<Mark>, TransformError> {
    Ok(doc
        .marks_at(pos)?
        .into_iter()
        .find(|m| m.kind == MarkKind::PendingInsert && m.attrs.author == session.author))
}

fn split_slice(kind: BlockKind) -> Slice {
    Slice {
        blocks: vec![Block::paragraph(""), Block::new(kind, Vec::new())],
        open_start: true,
        open_end: true,
    }
}

/// Put removed content back into the output document at `at`.
///
/// Whole-block pieces go back at a block boundary. Pieces with cut edges are
/// relinearized: inline runs joined by block splits, so the reinserted text
/// keeps its marks and the splits keep each inner block's kind. Returns the
/// covered `[start, end)` range.
fn reinsert_piece(
    output: &mut Transform,
    at: usize,
    piece: &Slice,
) -> Result<(usize, usize), TransformError> {
    if !piece.open_start && !piece.open_end {
        let start = nearest_boundary(output.doc(), at)?;
        output.insert(start, piece.clone())?;
        return Ok((start, start + piece.size()));
    }

    let start = output.doc().snap_to_text(at)?;
    let mut p = start;
    for (i, block) in piece.blocks.iter().enumerate() {
        if i > 0 || !piece.open_start {
            output.insert(p, split_slice(block.kind))?;
            p += 2;
        }
        if !block.runs.is_empty() {
            let runs = Slice::runs(block.runs.clone());
            let size = runs.size();
            output.insert(p, runs)?;
            p += size;
        }
    }
    if !piece.open_end && !piece.blocks.is_empty() {
        // The piece carried a trailing block boundary (the deletion joined
        // two blocks); restore the split.
        output.insert(p, split_slice(BlockKind::Paragraph))?;
        p += 2;
    }
    Ok((start, p))
}

/// The block boundary at `pos`, or the start boundary of the block
/// containing it.
fn nearest_boundary(doc: &Doc, pos: usize) -> Result<usize, TransformError> {
    let mut start = 0;
    for block in &doc.blocks {
        let end = start + block.size();
        if pos <= start {
            return Ok(start);
        }
        if pos < end {
            return Ok(start);
        }
        start = end;
    }
    Ok(start)
}
