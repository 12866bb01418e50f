//! Position mapping across committed steps.
//!
//! Every step publishes a [`StepMap`]: the ranges it touched, each as
//! `(start, old_size, new_size)` in the coordinates of the document the step
//! was applied to. A [`Mapping`] is an append-only list of step maps; mapping
//! a position is a left-to-right fold over every accumulated map, never a
//! shortcut over the subset that looks relevant.

/// Which side a position sticks to when content is inserted at it or the
/// range around it is deleted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Assoc {
    /// Stay before insertions; collapse deleted ranges to their start. The
    /// default, matching the "nothing was here" convention for deletions.
    #[default]
    Before,
    /// Move after insertions; collapse deleted ranges to their end's image.
    After,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct MapRange {
    start: usize,
    old_size: usize,
    new_size: usize,
}

/// The position delta of a single step.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StepMap {
    /// Touched ranges in old-document coordinates, ascending, disjoint.
    ranges: Vec<MapRange>,
}

impl StepMap {
    pub fn identity() -> Self {
        StepMap::default()
    }

    /// Build from `(start, old_size, new_size)` triples.
    pub fn new(ranges: Vec<(usize, usize, usize)>) -> Self {
        StepMap {
            ranges: ranges
                .into_iter()
                .map(|(start, old_size, new_size)| MapRange {
                    start,
                    old_size,
                    new_size,
                })
                .collect(),
        }
    }

    /// Map a position through this step's delta.
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        let mut diff: isize = 0;
        for range in &self.ranges {
            if range.start > pos {
                break;
            }
            let end = range.start + range.old_size;
            if pos <= end {
                let side = if range.old_size == 0 {
                    assoc
                } else if pos == range.start {
                    Assoc::Before
                } else if pos == end {
                    Assoc::After
                } else {
                    assoc
                };
                let base = (range.start as isize + diff) as usize;
                return match side {
                    Assoc::Before => base,
                    Assoc::After => base + range.new_size,
                };
            }
            diff += range.new_size as isize - range.old_size as isize;
        }
        (pos as isize + diff) as usize
    }

    /// The reverse delta: replays a position from after this step back to
    /// before it. Range starts are re-expressed in new-document coordinates.
    pub fn invert(&self) -> StepMap {
        let mut diff: isize = 0;
        let mut ranges = Vec::with_capacity(self.ranges.len());
        for range in &self.ranges {
            ranges.push(MapRange {
                start: (range.start as isize + diff) as usize,
                old_size: range.new_size,
                new_size: range.old_size,
            });
            diff += range.new_size as isize - range.old_size as isize;
        }
        StepMap { ranges }
    }
}

/// Append-only log of step maps.
#[derive(Debug, Clone, Default)]
pub struct Mapping {
    maps: Vec<StepMap>,
}

impl Mapping {
    pub fn new() -> Self {
        Mapping::default()
    }

    pub fn append_map(&mut self, map: StepMap) {
        self.maps.push(map);
    }

    pub fn len(&self) -> usize {
        self.maps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.maps.is_empty()
    }

    /// Map through every accumulated delta, oldest first.
    pub fn map(&self, pos: usize, assoc: Assoc) -> usize {
        self.map_from(0, pos, assoc)
    }

    /// Map through the deltas from `index` onward. Lets a caller resolve a
    /// position expressed against the document as it stood after the first
    /// `index` steps.
    pub fn map_from(&self, index: usize, pos: usize, assoc: Assoc) -> usize {
        self.maps[index..]
            .iter()
            .fold(pos, |p, m| m.map(p, assoc))
    }
}
