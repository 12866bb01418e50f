//! Accept/reject resolution: converting pending spans into final edits.

use crate::doc::{Doc, MarkKind};
use crate::error::TransformError;
use crate::suggest::spans::find_suggestion_spans;
use crate::suggest::transformer::Rewrite;
use crate::transform::{Assoc, Transform};

/// What to do with the pending spans in a range.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    /// Materialize: insertions keep their text, deletions are carried out.
    Accept,
    /// Discard: insertions are removed, deleted text is restored.
    Reject,
}

impl Resolution {
    /// The mark kind whose spans are removed as content. Accepting a
    /// deletion finalizes the removal; rejecting an insertion undoes it.
    fn removes(self) -> MarkKind {
        match self {
            Resolution::Accept => MarkKind::PendingDelete,
            Resolution::Reject => MarkKind::PendingInsert,
        }
    }
}

/// Resolve every pending span overlapping `[from, to)` into one atomic
/// batch. Returns `Ok(None)` when the range holds no pending spans.
///
/// The batch is marked bypass so the transformer does not re-annotate the
/// resolver's own rewrites. Each span's range is remapped through the edits
/// already in the batch, so spans resolved earlier in the same call cannot
/// invalidate the coordinates of later ones.
pub fn resolve_range(
    doc: &Doc,
    action: Resolution,
    from: usize,
    to: usize,
) -> Result<Option<Rewrite>, TransformError> {
    let spans = find_suggestion_spans(doc, from, to);
    if spans.is_empty() {
        tracing::debug!(?action, from, to, "no pending spans in range");
        return Ok(None);
    }
    tracing::debug!(?action, from, to, spans = spans.len(), "resolving spans");

    let mut tr = Transform::new(doc.clone());
    for span in &spans {
        let f = tr.mapping().map(span.from, Assoc::Before);
        let t = tr.mapping().map(span.to, Assoc::After);
        if t <= f {
            // Swallowed by an earlier span's deletion.
            continue;
        }
        if span.mark.kind == action.removes() {
            tr.delete(f, t)?;
        } else {
            tr.remove_mark(f, t, span.mark.clone())?;
        }
    }
    if !tr.docs_changed() {
        return Ok(None);
    }
    Ok(Some(Rewrite {
        transform: tr,
        caret: None,
        bypass: true,
    }))
}

/// Resolve every pending span in the document.
pub fn resolve_all(doc: &Doc, action: Resolution) -> Result<Option<Rewrite>, TransformError> {
    resolve_range(doc, action, 0, doc.size())
}
