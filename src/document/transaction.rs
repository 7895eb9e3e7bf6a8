use crate::types::span::Span;

/// Which side a position sticks to when content is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Assoc {
    Before,
    After,
}

/// A single change within a `Transaction`. Positions refer to the document
/// as it was right before the step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// The content in `[from, to)` got replaced by `inserted` positions of
    /// new content.
    Replace {
        from: usize,
        to: usize,
        inserted: usize,
    },
    AddAnnotation {
        from: usize,
        to: usize,
    },
    RemoveAnnotation {
        from: usize,
        to: usize,
    },
}

impl Step {
    /// Map a position from before this step to after it.
    #[must_use]
    pub fn map(&self, position: usize, assoc: Assoc) -> usize {
        let Step::Replace { from, to, inserted } = *self else {
            return position;
        };

        if position < from {
            position
        } else if position > to {
            position - (to - from) + inserted
        } else if from == to && position == from {
            match assoc {
                Assoc::Before => position,
                Assoc::After => position + inserted,
            }
        } else {
            match assoc {
                Assoc::Before => from,
                Assoc::After => from + inserted,
            }
        }
    }

    /// The range this step touched, in positions right after the step.
    #[must_use]
    pub fn touched(&self) -> Span {
        match *self {
            Step::Replace { from, inserted, .. } => Span::new(from, from + inserted),
            Step::AddAnnotation { from, to } | Step::RemoveAnnotation { from, to } => {
                Span::new(from, to)
            }
        }
    }
}

/// A committed document edit: the steps it consists of and whether it was
/// issued by the annotation engine itself.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Transaction {
    steps: Vec<Step>,
    system: bool,
}

impl Transaction {
    #[must_use]
    pub fn new(steps: Vec<Step>) -> Self {
        Self {
            steps,
            system: false,
        }
    }

    /// A transaction tagged as written by the engine. These never trigger a
    /// new check.
    #[must_use]
    pub fn system(steps: Vec<Step>) -> Self {
        Self {
            steps,
            system: true,
        }
    }

    #[must_use]
    pub fn steps(&self) -> &[Step] { &self.steps }

    #[must_use]
    pub fn is_system_edit(&self) -> bool { self.system }

    #[must_use]
    pub fn doc_changed(&self) -> bool { !self.steps.is_empty() }

    /// Append the steps of a later transaction.
    #[must_use]
    pub fn then(mut self, other: Transaction) -> Self {
        self.steps.extend(other.steps);
        self.system &= other.system;
        self
    }

    /// Map a position from before the whole transaction to after it.
    #[must_use]
    pub fn map(&self, position: usize, assoc: Assoc) -> usize {
        self.steps
            .iter()
            .fold(position, |position, step| step.map(position, assoc))
    }

    /// Map a span through the transaction, growing it over content inserted
    /// at its edges.
    #[must_use]
    pub fn map_span(&self, span: Span) -> Span {
        let from = self.map(span.from, Assoc::Before);
        let to = self.map(span.to, Assoc::After);

        Span::new(from, to.max(from))
    }

    /// The ranges touched by each step, expressed in positions of the final
    /// document.
    #[must_use]
    pub fn changed_ranges(&self) -> Vec<Span> {
        self.steps
            .iter()
            .enumerate()
            .map(|(index, step)| {
                self.steps[index + 1..]
                    .iter()
                    .fold(step.touched(), |span, later| {
                        let from = later.map(span.from, Assoc::Before);
                        let to = later.map(span.to, Assoc::After);
                        Span::new(from, to.max(from))
                    })
            })
            .collect()
    }
}
