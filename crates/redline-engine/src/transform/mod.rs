//! Transform layer: steps, position maps, and the accumulator that applies
//! an ordered sequence of steps to an immutable document snapshot.

pub mod map;
pub mod step;

pub use map::{Assoc, Mapping, StepMap};
pub use step::{Step, StepFootprint, StepKind};

use crate::doc::{Doc, Mark, Slice};
use crate::error::TransformError;

/// Accumulator of committed steps over a starting snapshot.
///
/// `step` is atomic: the step is applied to a scratch document first and
/// only then committed together with its position map, so a failing step
/// leaves the accumulator exactly as it was.
#[derive(Debug, Clone)]
pub struct Transform {
    doc: Doc,
    steps: Vec<Step>,
    mapping: Mapping,
}

impl Transform {
    pub fn new(doc: Doc) -> Self {
        Transform {
            doc,
            steps: Vec::new(),
            mapping: Mapping::new(),
        }
    }

    /// The current document, with every committed step applied.
    pub fn doc(&self) -> &Doc {
        &self.doc
    }

    pub fn steps(&self) -> &[Step] {
        &self.steps
    }

    pub fn mapping(&self) -> &Mapping {
        &self.mapping
    }

    /// True when at least one step has been committed.
    pub fn docs_changed(&self) -> bool {
        !self.steps.is_empty()
    }

    pub fn into_doc(self) -> Doc {
        self.doc
    }

    /// Apply and commit one step.
    pub fn step(&mut self, step: Step) -> Result<(), TransformError> {
        let next = step.apply(&self.doc)?;
        self.mapping.append_map(step.pos_map());
        self.steps.push(step);
        self.doc = next;
        Ok(())
    }

    // === Convenience builders ===

    pub fn replace(&mut self, from: usize, to: usize, slice: Slice) -> Result<(), TransformError> {
        self.step(Step::Replace { from, to, slice })
    }

    pub fn insert(&mut self, at: usize, slice: Slice) -> Result<(), TransformError> {
        self.replace(at, at, slice)
    }

    pub fn delete(&mut self, from: usize, to: usize) -> Result<(), TransformError> {
        self.replace(from, to, Slice::empty())
    }

    pub fn add_mark(&mut self, from: usize, to: usize, mark: Mark) -> Result<(), TransformError> {
        self.step(Step::AddMark { from, to, mark })
    }

    pub fn remove_mark(
        &mut self,
        from: usize,
        to: usize,
        mark: Mark,
    ) -> Result<(), TransformError> {
        self.step(Step::RemoveMark { from, to, mark })
    }
}
