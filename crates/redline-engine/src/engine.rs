//! The engine facade: owns the document snapshot and the active session,
//! routes incoming batches through the transformer, and exposes the
//! accept/reject surface.

use crate::doc::Doc;
use crate::error::TransformError;
use crate::suggest::{
    Batch, Resolution, Session, SuggestionSpan, find_suggestion_spans, intercept_batch,
    resolve_all, resolve_range,
};
use crate::transform::Transform;

/// Host callbacks fired around document replacement.
///
/// All methods default to no-ops so a host only implements what it renders.
pub trait ViewHooks {
    fn on_attach(&mut self, _doc: &Doc) {}
    fn on_document_changed(&mut self, _doc: &Doc, _version: u64) {}
    fn on_detach(&mut self) {}
}

/// A hook implementation that ignores every notification.
#[derive(Debug, Default)]
pub struct NoHooks;

impl ViewHooks for NoHooks {}

/// The outcome of applying one batch.
#[derive(Debug, Clone, PartialEq)]
pub struct Applied {
    /// Whether the batch was rewritten into suggestions (false means it was
    /// applied verbatim: tracking off, history replay, or nothing trackable).
    pub tracked: bool,
    /// Where the host should place the caret, when the rewrite moved it.
    pub caret: Option<usize>,
    /// Snapshot version after the commit, monotonically increasing.
    pub version: u64,
}

/// Owns one document and one tracking session.
///
/// Every mutation goes through [`SuggestionEngine::apply_batch`] or one of
/// the resolve methods; both commit a fresh snapshot and bump the version,
/// so hosts can cache renders keyed on it.
pub struct SuggestionEngine<H: ViewHooks = NoHooks> {
    doc: Doc,
    session: Session,
    version: u64,
    hooks: H,
}

impl SuggestionEngine<NoHooks> {
    pub fn new(doc: Doc, session: Session) -> Self {
        Self::with_hooks(doc, session, NoHooks)
    }
}

impl<H: ViewHooks> SuggestionEngine<H> {
    pub fn with_hooks(doc: Doc, session: Session, mut hooks: H) -> Self {
        hooks.on_attach(&doc);
        SuggestionEngine {
            doc,
            session,
            version: 0,
            hooks,
        }
    }

    pub fn doc(&self) -> &Doc {
        &self.doc
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Replace the active session. Marks already in the document keep the
    /// author they were minted with.
    pub fn configure(&mut self, session: Session) {
        tracing::debug!(author = %session.author, enabled = session.enabled, "session replaced");
        self.session = session;
    }

    /// Apply one batch of edits, rewriting it into suggestions when the
    /// session tracks changes.
    pub fn apply_batch(&mut self, batch: Batch) -> Result<Applied, TransformError> {
        match intercept_batch(&self.doc, &batch, &self.session)? {
            Some(rewrite) => {
                let caret = rewrite.caret;
                self.commit(rewrite.transform);
                Ok(Applied {
                    tracked: true,
                    caret,
                    version: self.version,
                })
            }
            None => {
                let mut tr = Transform::new(self.doc.clone());
                for step in &batch.steps {
                    tr.step(step.clone())?;
                }
                self.commit(tr);
                Ok(Applied {
                    tracked: false,
                    caret: None,
                    version: self.version,
                })
            }
        }
    }

    /// Every pending span overlapping `[from, to)`.
    pub fn spans_in(&self, from: usize, to: usize) -> Vec<SuggestionSpan> {
        find_suggestion_spans(&self.doc, from, to)
    }

    /// Every pending span in the document.
    pub fn spans(&self) -> Vec<SuggestionSpan> {
        find_suggestion_spans(&self.doc, 0, self.doc.size())
    }

    /// Accept every pending span overlapping `[from, to)`. Returns false
    /// when the range held nothing to resolve.
    pub fn accept_range(&mut self, from: usize, to: usize) -> Result<bool, TransformError> {
        self.resolve(resolve_range(&self.doc, Resolution::Accept, from, to)?)
    }

    /// Reject every pending span overlapping `[from, to)`.
    pub fn reject_range(&mut self, from: usize, to: usize) -> Result<bool, TransformError> {
        self.resolve(resolve_range(&self.doc, Resolution::Reject, from, to)?)
    }

    pub fn accept_all(&mut self) -> Result<bool, TransformError> {
        self.resolve(resolve_all(&self.doc, Resolution::Accept)?)
    }

    pub fn reject_all(&mut self) -> Result<bool, TransformError> {
        self.resolve(resolve_all(&self.doc, Resolution::Reject)?)
    }

    fn resolve(
        &mut self,
        rewrite: Option<crate::suggest::Rewrite>,
    ) -> Result<bool, TransformError> {
        match rewrite {
            Some(rw) => {
                self.commit(rw.transform);
                Ok(true)
            }
            None => Ok(false),
        }
    }

    fn commit(&mut self, tr: Transform) {
        if !tr.docs_changed() {
            return;
        }
        self.doc = tr.into_doc();
        self.version += 1;
        self.hooks.on_document_changed(&self.doc, self.version);
    }
}

impl<H: ViewHooks> Drop for SuggestionEngine<H> {
    fn drop(&mut self) {
        self.hooks.on_detach();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::Block;
    use crate::transform::Step;

    #[test]
    fn untracked_batches_apply_verbatim() {
        let doc = Doc::new(vec![Block::paragraph("Hello world")]);
        let mut engine = SuggestionEngine::new(doc, Session::disabled("alice"));
        let applied = engine
            .apply_batch(Batch::new(vec![Step::delete_range(1, 6)]))
            .unwrap();
        assert!(!applied.tracked);
        assert_eq!(engine.doc().text(), " world");
        assert_eq!(engine.version(), 1);
        assert!(engine.spans().is_empty());
    }

    #[test]
    fn tracked_deletion_keeps_text_in_place() {
        let doc = Doc::new(vec![Block::paragraph("Hello world")]);
        let mut engine = SuggestionEngine::new(doc, Session::new("alice"));
        let applied = engine
            .apply_batch(Batch::new(vec![Step::delete_range(1, 6)]))
            .unwrap();
        assert!(applied.tracked);
        assert_eq!(applied.caret, Some(1));
        assert_eq!(engine.doc().text(), "Hello world");
        let spans = engine.spans();
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].from, spans[0].to), (1, 6));
    }

    #[test]
    fn version_counts_commits() {
        struct Counting(u64);
        impl ViewHooks for Counting {
            fn on_document_changed(&mut self, _doc: &Doc, version: u64) {
                self.0 = version;
            }
        }
        let doc = Doc::new(vec![Block::paragraph("Hello")]);
        let mut engine = SuggestionEngine::with_hooks(doc, Session::new("alice"), Counting(0));
        engine
            .apply_batch(Batch::new(vec![Step::insert_text(3, "x")]))
            .unwrap();
        engine.accept_all().unwrap();
        assert_eq!(engine.version(), 2);
        assert_eq!(engine.hooks.0, 2);
    }

    #[test]
    fn resolving_empty_document_is_a_no_op() {
        let doc = Doc::new(vec![Block::paragraph("Hello")]);
        let mut engine = SuggestionEngine::new(doc, Session::new("alice"));
        assert!(!engine.accept_all().unwrap());
        assert_eq!(engine.version(), 0);
    }
}
