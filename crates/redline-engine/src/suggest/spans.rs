use serde::Serialize;

use crate::doc::{Doc, Mark};

/// One pending suggestion: a mark instance and its merged covering range.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SuggestionSpan {
    pub mark: Mark,
    pub from: usize,
    pub to: usize,
}

/// Find every suggestion span overlapping `[from, to)`.
///
/// Walks the tree once. Discontiguous placements of the same mark instance
/// (a span split across runs or blocks) are merged into one entry covering
/// the min/max envelope of every node that wears it. Results are in
/// first-encounter order, which is stable for a given snapshot.
pub fn find_suggestion_spans(doc: &Doc, from: usize, to: usize) -> Vec<SuggestionSpan> {
    let mut spans: Vec<SuggestionSpan> = Vec::new();
    doc.nodes_between(from, to, |run, run_from| {
        let run_to = run_from + run.len();
        for mark in run.pending_marks() {
            match spans.iter_mut().find(|s| s.mark.id == mark.id) {
                Some(span) => {
                    span.from = span.from.min(run_from);
                    span.to = span.to.max(run_to);
                }
                None => spans.push(SuggestionSpan {
                    mark: mark.clone(),
                    from: run_from,
                    to: run_to,
                }),
            }
        }
    });
    spans
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::doc::{Block, MarkKind};
    use std::collections::BTreeMap;

    #[test]
    fn locates_single_span() {
        let mark = Mark::new(MarkKind::PendingInsert, "alice", BTreeMap::new());
        let doc = Doc::new(vec![Block::paragraph("Hello world")])
            .add_mark(3, 8, &mark)
            .unwrap();
        let spans = find_suggestion_spans(&doc, 0, doc.size());
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].from, spans[0].to), (3, 8));
        assert!(spans[0].mark.is_same(&mark));
    }

    #[test]
    fn merges_split_placements_of_one_instance() {
        // "Hello cat world" with [cat] marked, then an unmarked edit splits
        // the marked region across runs; the locator must still report one
        // span covering the whole envelope.
        let mark = Mark::new(MarkKind::PendingDelete, "alice", BTreeMap::new());
        let doc = Doc::new(vec![Block::paragraph("Hello cat world")])
            .add_mark(7, 10, &mark)
            .unwrap();
        // Drop the mark from the middle character so the instance sits on
        // two separate runs.
        let doc = doc.remove_mark(8, 9, &mark).unwrap();
        let spans = find_suggestion_spans(&doc, 0, doc.size());
        assert_eq!(spans.len(), 1);
        assert_eq!((spans[0].from, spans[0].to), (7, 10));
    }

    #[test]
    fn range_outside_marks_finds_nothing() {
        let mark = Mark::new(MarkKind::PendingInsert, "alice", BTreeMap::new());
        let doc = Doc::new(vec![Block::paragraph("Hello world")])
            .add_mark(1, 3, &mark)
            .unwrap();
        assert!(find_suggestion_spans(&doc, 5, 9).is_empty());
    }

    #[test]
    fn distinct_instances_stay_distinct() {
        let alice = Mark::new(MarkKind::PendingDelete, "alice", BTreeMap::new());
        let bob = Mark::new(MarkKind::PendingDelete, "bob", BTreeMap::new());
        let doc = Doc::new(vec![Block::paragraph("Hello world")])
            .add_mark(1, 5, &alice)
            .unwrap()
            .add_mark(3, 8, &bob)
            .unwrap();
        let spans = find_suggestion_spans(&doc, 0, doc.size());
        assert_eq!(spans.len(), 2);
    }
}
