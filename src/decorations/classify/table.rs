use super::ClassifyContext;
use crate::decorations::{Annotation, WidgetSpec};
use crate::markdown::{NodeKind, SyntaxNode};

/// Replace the whole table with the table widget while the caret is outside
/// it. The widget is never clamped: a partly visible table is still replaced
/// as a unit.
///
/// Tables nested in a blockquote or list item stay raw. Their lines carry
/// container prefixes the grid cannot write back.
pub(super) fn classify(ctx: &ClassifyContext<'_>, node: &SyntaxNode, out: &mut Vec<Annotation>) {
    if node.start >= node.end || ctx.selection.touches(node.start, node.end) {
        return;
    }
    if in_container(ctx, node) {
        return;
    }
    out.push(Annotation::widget(
        node.span(),
        WidgetSpec::Table {
            raw: ctx.text[node.span()].to_string(),
        },
    ));
}

fn in_container(ctx: &ClassifyContext<'_>, node: &SyntaxNode) -> bool {
    ctx.tree.path_at(node.start).iter().any(|n| {
        matches!(n.kind, NodeKind::Blockquote | NodeKind::ListItem) && n.start < node.start
    })
}

#[cfg(test)]
mod tests {
    use crate::config::Settings;
    use crate::decorations::classify::tests::{run, run_with, widgets};
    use crate::decorations::{Selection, SelectionRange, Viewport, WidgetSpec};

    const TABLE: &str = "| a | b |\n| - | - |\n| 1 | 2 |";

    #[test]
    fn test_table_replaced_when_caret_outside() {
        let text = format!("{}\n\nafter", TABLE);
        let set = run(&text, text.len());
        assert_eq!(
            widgets(&set),
            vec![(
                0..TABLE.len(),
                WidgetSpec::Table {
                    raw: TABLE.to_string()
                }
            )]
        );
    }

    #[test]
    fn test_table_raw_while_caret_inside() {
        let set = run(TABLE, 3);
        assert!(widgets(&set).is_empty());
    }

    #[test]
    fn test_any_selection_endpoint_inside_keeps_raw() {
        let text = format!("x\n\n{}", TABLE);
        let selection = Selection::new(
            vec![SelectionRange::cursor(0), SelectionRange::cursor(5)],
            0,
        );
        let set = run_with(&text, selection, Viewport::full(&text), &Settings::default());
        assert!(widgets(&set).is_empty());
    }

    #[test]
    fn test_table_in_blockquote_stays_raw() {
        let text = "intro\n\n> | a | b |\n> | - | - |\n> | 1 | 2 |";
        let set = run(text, 0);
        assert!(widgets(&set).is_empty());
    }

    #[test]
    fn test_table_in_list_item_stays_raw() {
        let text = "intro\n\n- | a | b |\n  | - | - |\n  | 1 | 2 |";
        let set = run(text, 0);
        assert!(widgets(&set).is_empty());
    }

    #[test]
    fn test_table_after_blockquote_still_replaced() {
        let text = format!("> quote\n\n{}", TABLE);
        let set = run(&text, 0);
        assert_eq!(widgets(&set).len(), 1);
        assert_eq!(widgets(&set)[0].0, 9..text.len());
    }
}
