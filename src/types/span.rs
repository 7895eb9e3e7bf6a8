/// A half-open range `[from, to)`. Depending on the context it either holds
/// document positions or character offsets into an extracted `FlatText`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Span {
    pub from: usize,
    pub to: usize,
}

impl Span {
    #[must_use]
    pub fn new(from: usize, to: usize) -> Self {
        debug_assert!(from <= to, "Span start ({from}) must not exceed its end ({to})");

        Self { from, to }
    }

    #[must_use]
    pub fn len(&self) -> usize { self.to - self.from }

    #[must_use]
    pub fn is_empty(&self) -> bool { self.from == self.to }

    /// The smallest span covering both `self` and `other`.
    #[must_use]
    pub fn union(&self, other: &Self) -> Self {
        Self::new(self.from.min(other.from), self.to.max(other.to))
    }

    /// Whether the two spans share at least one position. An empty span
    /// intersects a span that contains or borders it.
    #[must_use]
    pub fn intersects(&self, other: &Self) -> bool {
        if self.is_empty() || other.is_empty() {
            return self.from <= other.to && other.from <= self.to;
        }

        self.from < other.to && other.from < self.to
    }

    /// Grow the span by `padding` on both sides, clipped to `[0, limit]`.
    #[must_use]
    pub fn padded(&self, padding: usize, limit: usize) -> Self {
        Self::new(
            self.from.saturating_sub(padding).min(limit),
            self.to.saturating_add(padding).min(limit),
        )
    }
}
