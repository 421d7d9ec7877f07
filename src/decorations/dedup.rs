//! Range deduplication
//!
//! Independent classifiers (and the same classifier visiting a node from two
//! windows) can emit identical annotations. This sorts the multiset into the
//! canonical order and collapses structural duplicates, so that identical
//! inputs always produce identical, order-identical outputs.

use super::Annotation;

/// Sort by `(from, to, kind, payload)` and drop exact duplicates.
///
/// Same span with a different kind or payload is kept.
pub fn dedup(mut annotations: Vec<Annotation>) -> Vec<Annotation> {
    annotations.sort_unstable();
    annotations.dedup();
    annotations
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorations::{StyleClass, WidgetSpec};

    #[test]
    fn test_dedup_sorts_by_span() {
        let out = dedup(vec![
            Annotation::mark(5..9, StyleClass::Emphasis),
            Annotation::hidden(0..2),
            Annotation::mark(5..7, StyleClass::Link),
        ]);
        let spans: Vec<_> = out.iter().map(|a| a.span()).collect();
        assert_eq!(spans, vec![0..2, 5..7, 5..9]);
    }

    #[test]
    fn test_dedup_collapses_exact_duplicates() {
        let out = dedup(vec![
            Annotation::line(0, StyleClass::Blockquote),
            Annotation::hidden(3..4),
            Annotation::line(0, StyleClass::Blockquote),
            Annotation::hidden(3..4),
        ]);
        assert_eq!(out.len(), 2);
    }

    #[test]
    fn test_dedup_keeps_same_span_different_payload() {
        let out = dedup(vec![
            Annotation::mark(0..2, StyleClass::ActiveMark),
            Annotation::hidden(0..2),
            Annotation::mark(0..2, StyleClass::HeadingMark),
        ]);
        assert_eq!(out.len(), 3);
    }

    #[test]
    fn test_dedup_is_deterministic() {
        let input = vec![
            Annotation::widget(
                3..9,
                WidgetSpec::LinkUrl {
                    url: "u".to_string(),
                },
            ),
            Annotation::mark(0..12, StyleClass::Link),
            Annotation::hidden(3..9),
            Annotation::mark(0..12, StyleClass::Link),
        ];
        let mut reversed = input.clone();
        reversed.reverse();
        assert_eq!(dedup(input), dedup(reversed));
    }

    #[test]
    fn test_dedup_invariant() {
        let out = dedup(vec![
            Annotation::hidden(4..5),
            Annotation::line(0, StyleClass::CodeBlock),
            Annotation::hidden(4..5),
            Annotation::mark(1..3, StyleClass::Strong),
            Annotation::line(0, StyleClass::CodeBlock),
        ]);
        for pair in out.windows(2) {
            assert!((pair[0].from, pair[0].to) <= (pair[1].from, pair[1].to));
            assert_ne!(pair[0], pair[1]);
        }
    }
}
