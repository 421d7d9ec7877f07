//! Caret and selection model

/// One selection range. `anchor == head` is a caret.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash)]
pub struct SelectionRange {
    pub anchor: usize,
    pub head: usize,
}

impl SelectionRange {
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    pub fn cursor(pos: usize) -> Self {
        Self::new(pos, pos)
    }

    pub fn from(&self) -> usize {
        self.anchor.min(self.head)
    }

    pub fn to(&self) -> usize {
        self.anchor.max(self.head)
    }

    pub fn is_empty(&self) -> bool {
        self.anchor == self.head
    }

    /// Same direction as `self`, covering `from..to`.
    pub fn with_span(&self, from: usize, to: usize) -> Self {
        if self.anchor > self.head {
            Self::new(to, from)
        } else {
            Self::new(from, to)
        }
    }
}

/// The editor selection: one or more ranges and the index of the main one.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Selection {
    ranges: Vec<SelectionRange>,
    main: usize,
}

impl Default for Selection {
    fn default() -> Self {
        Self::cursor(0)
    }
}

impl Selection {
    /// Build a selection; an empty list becomes a caret at 0.
    pub fn new(ranges: Vec<SelectionRange>, main: usize) -> Self {
        if ranges.is_empty() {
            return Self::default();
        }
        let main = main.min(ranges.len() - 1);
        Self { ranges, main }
    }

    pub fn single(anchor: usize, head: usize) -> Self {
        Self::new(vec![SelectionRange::new(anchor, head)], 0)
    }

    pub fn cursor(pos: usize) -> Self {
        Self::single(pos, pos)
    }

    pub fn ranges(&self) -> &[SelectionRange] {
        &self.ranges
    }

    pub fn main(&self) -> SelectionRange {
        self.ranges[self.main]
    }

    pub fn main_index(&self) -> usize {
        self.main
    }

    /// Whether any anchor or head lies within `[from, to]`.
    pub fn touches(&self, from: usize, to: usize) -> bool {
        self.ranges.iter().any(|r| {
            (from <= r.anchor && r.anchor <= to) || (from <= r.head && r.head <= to)
        })
    }

    /// Apply `f` to every endpoint.
    pub fn map<F>(&self, f: F) -> Self
    where
        F: Fn(usize) -> usize,
    {
        Self {
            ranges: self
                .ranges
                .iter()
                .map(|r| SelectionRange::new(f(r.anchor), f(r.head)))
                .collect(),
            main: self.main,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_touches_is_inclusive() {
        let sel = Selection::cursor(5);
        assert!(sel.touches(5, 9));
        assert!(sel.touches(0, 5));
        assert!(!sel.touches(6, 9));
    }

    #[test]
    fn test_touches_checks_both_endpoints() {
        let sel = Selection::single(2, 20);
        assert!(sel.touches(18, 22));
        assert!(sel.touches(0, 3));
        // Selection spans the range but no endpoint lies in it
        assert!(!sel.touches(5, 10));
    }

    #[test]
    fn test_multi_range() {
        let sel = Selection::new(
            vec![SelectionRange::cursor(1), SelectionRange::new(10, 4)],
            1,
        );
        assert_eq!(sel.main().from(), 4);
        assert_eq!(sel.main().to(), 10);
        assert!(sel.touches(9, 12));
    }

    #[test]
    fn test_empty_ranges_default_to_caret() {
        let sel = Selection::new(Vec::new(), 3);
        assert_eq!(sel, Selection::cursor(0));
    }

    #[test]
    fn test_with_span_keeps_direction() {
        let backwards = SelectionRange::new(8, 2);
        assert_eq!(backwards.with_span(4, 6), SelectionRange::new(6, 4));
        assert_eq!(SelectionRange::new(2, 8).with_span(4, 6), SelectionRange::new(4, 6));
    }
}
