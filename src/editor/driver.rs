//! Decoration driver
//!
//! [`LiveEngine`] ties the pieces together for a host editor: it reparses the
//! document when it changes, runs the classifier passes over the visible
//! windows, keeps the widget store in sync and carries out widget actions.
//!
//! The static pass is cached per document version and viewport, so a caret
//! move only reruns the cursor pass.

use log::{debug, warn};
use std::ops::Range;

use super::host::{EditorHost, Shell};
use crate::config::Settings;
use crate::decorations::classify::{classify, ClassifyContext, Pass};
use crate::decorations::{Annotation, DecorationSet, Viewport};
use crate::error::{Error, Result};
use crate::markdown::{CmarkParser, MarkdownOptions, MarkdownParser, StyleCommand, SyntaxTree};
use crate::widgets::{
    image_hover, ImageTooltip, ModifierState, Widget, WidgetAction, WidgetEvent, WidgetId,
    WidgetStore,
};

/// Why the decorations are being recomputed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EngineEvent {
    /// The document text changed
    DocumentChanged,
    /// The visible ranges changed
    ViewportChanged,
    /// The caret or selection moved
    SelectionChanged,
}

/// What a parsed tree was built from.
#[derive(Debug)]
enum Source {
    /// Host version counter
    Version(u64),
    /// Copy of the text, for hosts without a version
    Text(String),
}

impl Source {
    fn of(host: &dyn EditorHost) -> Self {
        match host.version() {
            Some(version) => Source::Version(version),
            None => Source::Text(host.text().to_string()),
        }
    }

    fn matches(&self, host: &dyn EditorHost) -> bool {
        match (self, host.version()) {
            (Source::Version(parsed), Some(current)) => *parsed == current,
            (Source::Text(parsed), None) => parsed == host.text(),
            _ => false,
        }
    }
}

struct ParsedDocument {
    source: Source,
    tree: SyntaxTree,
    generation: u64,
}

struct StaticCache {
    generation: u64,
    windows: Vec<Range<usize>>,
    dark_mode: bool,
    annotations: Vec<Annotation>,
}

/// The live decoration engine for one editor view.
pub struct LiveEngine {
    parser: Box<dyn MarkdownParser>,
    settings: Settings,
    dark_mode: bool,
    document: Option<ParsedDocument>,
    generation: u64,
    static_cache: Option<StaticCache>,
    store: WidgetStore,
    decorations: DecorationSet,
}

impl LiveEngine {
    /// Engine with the default pulldown-cmark parser.
    pub fn new(settings: Settings) -> Self {
        let parser = CmarkParser::new(MarkdownOptions::from_settings(&settings));
        Self::with_parser(settings, Box::new(parser))
    }

    /// Engine with a custom parser.
    pub fn with_parser(settings: Settings, parser: Box<dyn MarkdownParser>) -> Self {
        Self {
            parser,
            settings,
            dark_mode: false,
            document: None,
            generation: 0,
            static_cache: None,
            store: WidgetStore::new(),
            decorations: DecorationSet::default(),
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    /// Replace the settings. Caches and widgets are rebuilt on the next
    /// update.
    pub fn set_settings(&mut self, settings: Settings) {
        self.parser = Box::new(CmarkParser::new(MarkdownOptions::from_settings(&settings)));
        self.settings = settings;
        self.invalidate();
        self.store.clear();
    }

    /// Host dark mode, used when the theme follows the system.
    pub fn set_dark_mode(&mut self, dark_mode: bool) {
        if self.dark_mode != dark_mode {
            self.dark_mode = dark_mode;
            self.static_cache = None;
        }
    }

    /// Decorations of the last update.
    pub fn decorations(&self) -> &DecorationSet {
        &self.decorations
    }

    /// Syntax tree of the last parsed document version.
    pub fn tree(&self) -> Option<&SyntaxTree> {
        self.document.as_ref().map(|d| &d.tree)
    }

    pub fn widgets(&self) -> &WidgetStore {
        &self.store
    }

    /// Widget lookup for rendering.
    pub fn widget(&self, id: WidgetId) -> Option<&dyn Widget> {
        self.store.get(id)
    }

    fn invalidate(&mut self) {
        self.document = None;
        self.static_cache = None;
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Recompute
    // ─────────────────────────────────────────────────────────────────────────

    /// Recompute the decorations for the host's current state.
    pub fn update(&mut self, host: &dyn EditorHost, event: EngineEvent) -> DecorationSet {
        let text = host.text();
        let stale = !self.document.as_ref().is_some_and(|d| d.source.matches(host));
        if stale {
            self.generation += 1;
            let tree = self.parser.parse(text);
            debug!(
                "Reparsed document ({} bytes, generation {})",
                text.len(),
                self.generation
            );
            self.document = Some(ParsedDocument {
                source: Source::of(host),
                tree,
                generation: self.generation,
            });
        }
        let Some(document) = self.document.as_ref() else {
            return DecorationSet::default();
        };

        let viewport = Viewport::new(host.visible_ranges(), text);
        let dark_mode = self.settings.theme.is_dark(self.dark_mode);
        let ctx = ClassifyContext {
            text,
            tree: &document.tree,
            selection: host.selection(),
            settings: &self.settings,
            dark_mode,
        };

        let cached = self.static_cache.as_ref().filter(|c| {
            c.generation == document.generation
                && c.windows == viewport.windows()
                && c.dark_mode == dark_mode
        });
        let mut annotations = match cached {
            Some(cache) => cache.annotations.clone(),
            None => {
                let annotations = classify(&ctx, &viewport, Pass::Static);
                self.static_cache = Some(StaticCache {
                    generation: document.generation,
                    windows: viewport.windows().to_vec(),
                    dark_mode,
                    annotations: annotations.clone(),
                });
                annotations
            }
        };
        annotations.extend(classify(&ctx, &viewport, Pass::Cursor));

        let decorations = DecorationSet::new(annotations);
        debug!(
            "Decorations updated on {:?}: {} annotations over {} window(s)",
            event,
            decorations.len(),
            viewport.windows().len()
        );
        self.store.reconcile(&decorations, &self.settings);
        self.decorations = decorations.clone();
        decorations
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Widget Actions
    // ─────────────────────────────────────────────────────────────────────────

    /// Deliver `event` to a widget and carry out whatever it asks for.
    ///
    /// A document edit is only applied if the widget's span still holds the
    /// text the widget was built from; otherwise it is refused with
    /// [`Error::StaleWidget`].
    pub fn handle_widget_event(
        &mut self,
        host: &mut dyn EditorHost,
        shell: &dyn Shell,
        id: WidgetId,
        event: WidgetEvent,
    ) -> Result<DecorationSet> {
        let widget = self.store.get_mut(id).ok_or(Error::UnknownWidget(id.0))?;
        let span = widget.span();
        let expected = widget.expected_text().to_string();

        match widget.on_event(event) {
            None => Ok(self.decorations.clone()),
            Some(WidgetAction::Dispatch(transaction)) => {
                if host.text().get(span.clone()) != Some(expected.as_str()) {
                    warn!(
                        "Refusing write-back from stale widget at {}..{}",
                        span.start, span.end
                    );
                    return Err(Error::StaleWidget {
                        from: span.start,
                        to: span.end,
                    });
                }
                let event = if transaction.changes.is_empty() {
                    EngineEvent::SelectionChanged
                } else {
                    EngineEvent::DocumentChanged
                };
                debug!(
                    "Widget {} dispatched {} change(s)",
                    id.0,
                    transaction.changes.len()
                );
                host.apply(transaction);
                Ok(self.update(host, event))
            }
            Some(WidgetAction::OpenUrl(url)) => {
                shell.open_url(&url).inspect_err(|e| warn!("Failed to open {}: {}", url, e))?;
                Ok(self.decorations.clone())
            }
            Some(WidgetAction::CopyText(text)) => {
                shell
                    .copy_text(&text)
                    .inspect_err(|e| warn!("Failed to copy code: {}", e))?;
                Ok(self.decorations.clone())
            }
        }
    }

    // ─────────────────────────────────────────────────────────────────────────
    // Commands
    // ─────────────────────────────────────────────────────────────────────────

    /// Toggle an inline style on the host selection as one transaction.
    pub fn toggle_style(&mut self, host: &mut dyn EditorHost, command: StyleCommand) -> DecorationSet {
        let transaction = command.toggle(host.text(), host.selection());
        host.apply(transaction);
        self.update(host, EngineEvent::DocumentChanged)
    }

    /// Image hover preview at `pos` of the last parsed document.
    pub fn image_hover(
        &self,
        host: &dyn EditorHost,
        pos: usize,
        modifier: &dyn ModifierState,
    ) -> Option<ImageTooltip> {
        let document = self.document.as_ref().filter(|d| d.source.matches(host))?;
        image_hover(&document.tree, host.text(), pos, modifier, &self.settings)
    }
}

impl std::fmt::Debug for LiveEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LiveEngine")
            .field("generation", &self.generation)
            .field("dark_mode", &self.dark_mode)
            .field("decorations", &self.decorations.len())
            .field("widgets", &self.store)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::decorations::{AnnotationKind, Selection, StyleClass, WidgetSpec};
    use crate::editor::host::RecordingShell;
    use crate::editor::{MemoryHost, Transaction};
    use std::cell::Cell;
    use std::rc::Rc;

    const TABLE: &str = "| a | b |\n| - | - |\n| 1 | 2 |";

    fn init_logs() {
        let _ = env_logger::builder().is_test(true).try_init();
    }

    fn table_host() -> MemoryHost {
        let mut host = MemoryHost::new(format!("intro\n\n{}", TABLE));
        host.set_selection(Selection::cursor(0));
        host
    }

    fn only_widget(engine: &LiveEngine) -> WidgetId {
        let ids = engine.widgets().ids();
        assert_eq!(ids.len(), 1, "expected exactly one widget");
        ids[0]
    }

    fn click_cell(row: usize, col: usize) -> WidgetEvent {
        WidgetEvent::CellClick {
            row,
            col,
            modified: false,
        }
    }

    #[test]
    fn test_table_edit_round_trip() {
        init_logs();
        let mut host = table_host();
        let shell = RecordingShell::default();
        let mut engine = LiveEngine::new(Settings::default());

        let set = engine.update(&host, EngineEvent::DocumentChanged);
        let widget: Vec<_> = set.of_kind(AnnotationKind::ReplaceWithWidget).collect();
        assert_eq!(widget.len(), 1);
        assert_eq!(widget[0].span(), 7..7 + TABLE.len());

        let id = only_widget(&engine);
        engine
            .handle_widget_event(&mut host, &shell, id, click_cell(1, 0))
            .unwrap();
        engine
            .handle_widget_event(&mut host, &shell, id, WidgetEvent::Input("9".to_string()))
            .unwrap();
        engine
            .handle_widget_event(&mut host, &shell, id, WidgetEvent::Commit)
            .unwrap();

        assert_eq!(host.text(), "intro\n\n| a | b |\n| - | - |\n| 9 | 2 |");
        assert_eq!(engine.widgets().len(), 1);
    }

    #[test]
    fn test_stale_widget_is_refused() {
        init_logs();
        let mut host = table_host();
        let shell = RecordingShell::default();
        let mut engine = LiveEngine::new(Settings::default());
        engine.update(&host, EngineEvent::DocumentChanged);
        let id = only_widget(&engine);

        engine
            .handle_widget_event(&mut host, &shell, id, click_cell(1, 1))
            .unwrap();
        engine
            .handle_widget_event(&mut host, &shell, id, WidgetEvent::Input("x".to_string()))
            .unwrap();

        // The host edits the table before the engine sees the change
        host.apply(Transaction::replace(9..10, "A"));
        let before = host.text().to_string();

        let result = engine.handle_widget_event(&mut host, &shell, id, WidgetEvent::Commit);
        assert!(matches!(
            result,
            Err(Error::StaleWidget { from: 7, to }) if to == 7 + TABLE.len()
        ));
        assert_eq!(host.text(), before);
    }

    #[test]
    fn test_widget_identity_survives_caret_moves() {
        let mut host = table_host();
        let shell = RecordingShell::default();
        let mut engine = LiveEngine::new(Settings::default());
        engine.update(&host, EngineEvent::DocumentChanged);
        let id = only_widget(&engine);
        engine
            .handle_widget_event(&mut host, &shell, id, click_cell(1, 0))
            .unwrap();

        host.set_selection(Selection::cursor(3));
        engine.update(&host, EngineEvent::SelectionChanged);
        assert_eq!(only_widget(&engine), id);
        assert!(matches!(
            engine.widget(id).map(|w| w.render()),
            Some(crate::widgets::WidgetView::Table(view)) if view.rows[0][0].editing.is_some()
        ));

        // Caret into the table: the widget disappears
        host.set_selection(Selection::cursor(10));
        engine.update(&host, EngineEvent::SelectionChanged);
        assert!(engine.widgets().is_empty());
        assert!(matches!(
            engine.handle_widget_event(&mut host, &shell, id, WidgetEvent::Commit),
            Err(Error::UnknownWidget(_))
        ));
    }

    #[test]
    fn test_link_widget_click_reveals_url() {
        let mut host = MemoryHost::new("see [a](http://x.y) now");
        host.set_selection(Selection::cursor(0));
        let shell = RecordingShell::default();
        let mut engine = LiveEngine::new(Settings::default());
        engine.update(&host, EngineEvent::DocumentChanged);
        let id = only_widget(&engine);

        engine
            .handle_widget_event(&mut host, &shell, id, WidgetEvent::Click { modified: true })
            .unwrap();
        assert_eq!(shell.opened.borrow().as_slice(), ["http://x.y"]);

        let set = engine
            .handle_widget_event(&mut host, &shell, id, WidgetEvent::Click { modified: false })
            .unwrap();
        assert_eq!(host.selection(), &Selection::cursor(8));
        assert!(host.is_focused());
        assert_eq!(set.of_kind(AnnotationKind::ReplaceWithWidget).count(), 0);
    }

    #[test]
    fn test_code_copy() {
        let mut host = MemoryHost::new("```rust\nlet x = 1;\n```");
        host.set_selection(Selection::cursor(0));
        let shell = RecordingShell::default();
        let mut engine = LiveEngine::new(Settings::default());
        engine.update(&host, EngineEvent::DocumentChanged);
        let id = only_widget(&engine);

        engine
            .handle_widget_event(&mut host, &shell, id, WidgetEvent::Click { modified: false })
            .unwrap();
        assert_eq!(shell.copied.borrow().as_slice(), ["let x = 1;"]);
    }

    #[test]
    fn test_heading_reveal_on_selection_change() {
        let mut host = MemoryHost::new("# Title");
        host.set_selection(Selection::cursor(0));
        let mut engine = LiveEngine::new(Settings::default());

        let set = engine.update(&host, EngineEvent::DocumentChanged);
        assert!(set.is_hidden(0));
        assert_eq!(set.line_styles_at(0), vec![StyleClass::Heading(1)]);

        host.set_selection(Selection::cursor(2));
        let set = engine.update(&host, EngineEvent::SelectionChanged);
        assert!(!set.is_hidden(0));
        assert_eq!(set.line_styles_at(0), vec![StyleClass::Heading(1)]);
    }

    #[test]
    fn test_update_is_idempotent() {
        let mut host = MemoryHost::new("> **a** `b`\n\n```\nc\n```");
        host.set_selection(Selection::cursor(0));
        let mut engine = LiveEngine::new(Settings::default());
        let first = engine.update(&host, EngineEvent::DocumentChanged);
        let second = engine.update(&host, EngineEvent::ViewportChanged);
        assert_eq!(first, second);
    }

    #[test]
    fn test_text_change_detected_without_event() {
        let mut host = MemoryHost::new("plain");
        let mut engine = LiveEngine::new(Settings::default());
        engine.update(&host, EngineEvent::DocumentChanged);

        host.apply(Transaction::replace(0..5, "# Head"));
        let set = engine.update(&host, EngineEvent::SelectionChanged);
        assert_eq!(set.line_styles_at(0), vec![StyleClass::Heading(1)]);
    }

    /// Parser that counts how often it runs.
    struct CountingParser {
        inner: CmarkParser,
        parses: Rc<Cell<usize>>,
    }

    impl MarkdownParser for CountingParser {
        fn parse(&self, text: &str) -> SyntaxTree {
            self.parses.set(self.parses.get() + 1);
            self.inner.parse(text)
        }
    }

    fn counting_engine() -> (LiveEngine, Rc<Cell<usize>>) {
        let parses = Rc::new(Cell::new(0));
        let parser = CountingParser {
            inner: CmarkParser::default(),
            parses: Rc::clone(&parses),
        };
        (LiveEngine::with_parser(Settings::default(), Box::new(parser)), parses)
    }

    #[test]
    fn test_caret_move_reuses_tree() {
        let mut host = MemoryHost::new("# Title\n\nbody");
        let (mut engine, parses) = counting_engine();
        engine.update(&host, EngineEvent::DocumentChanged);
        assert_eq!(parses.get(), 1);

        host.set_selection(Selection::cursor(3));
        engine.update(&host, EngineEvent::SelectionChanged);
        engine.update(&host, EngineEvent::ViewportChanged);
        assert_eq!(parses.get(), 1);

        host.apply(Transaction::replace(9..9, "more "));
        engine.update(&host, EngineEvent::DocumentChanged);
        assert_eq!(parses.get(), 2);
    }

    /// Host without a version counter, compared by text.
    struct UnversionedHost(MemoryHost);

    impl EditorHost for UnversionedHost {
        fn text(&self) -> &str {
            self.0.text()
        }

        fn selection(&self) -> &Selection {
            self.0.selection()
        }

        fn visible_ranges(&self) -> Vec<Range<usize>> {
            self.0.visible_ranges()
        }

        fn apply(&mut self, transaction: Transaction) {
            self.0.apply(transaction)
        }
    }

    #[test]
    fn test_unversioned_host_compared_by_text() {
        let mut host = UnversionedHost(MemoryHost::new("plain"));
        let (mut engine, parses) = counting_engine();
        engine.update(&host, EngineEvent::DocumentChanged);
        engine.update(&host, EngineEvent::SelectionChanged);
        assert_eq!(parses.get(), 1);

        host.apply(Transaction::replace(0..5, "# Head"));
        let set = engine.update(&host, EngineEvent::SelectionChanged);
        assert_eq!(parses.get(), 2);
        assert_eq!(set.line_styles_at(0), vec![StyleClass::Heading(1)]);
    }

    #[test]
    fn test_quoted_table_gets_no_widget() {
        let text = "intro\n\n> | a | b |\n> | - | - |\n> | 1 | 2 |";
        let mut host = MemoryHost::new(text);
        host.set_selection(Selection::cursor(0));
        let mut engine = LiveEngine::new(Settings::default());
        let set = engine.update(&host, EngineEvent::DocumentChanged);
        assert_eq!(set.of_kind(AnnotationKind::ReplaceWithWidget).count(), 0);
        assert!(engine.widgets().is_empty());
        assert_eq!(host.text(), text);
    }

    #[test]
    fn test_viewport_limits_decorations() {
        let text = "# One\n\n# Two\n\n# Three";
        let mut host = MemoryHost::new(text);
        host.set_selection(Selection::cursor(text.len()));
        host.set_visible(vec![7..12]);
        let mut engine = LiveEngine::new(Settings::default());
        let set = engine.update(&host, EngineEvent::DocumentChanged);
        assert!(set.line_styles_at(0).is_empty());
        assert_eq!(set.line_styles_at(7), vec![StyleClass::Heading(1)]);
        assert!(set.line_styles_at(14).is_empty());
    }

    #[test]
    fn test_toggle_style_command() {
        let mut host = MemoryHost::new("hello");
        host.set_selection(Selection::single(0, 5));
        let mut engine = LiveEngine::new(Settings::default());
        let set = engine.toggle_style(&mut host, StyleCommand::Bold);
        assert_eq!(host.text(), "**hello**");
        assert_eq!(host.selection(), &Selection::single(2, 7));
        assert!(set
            .iter()
            .any(|a| a.style() == Some(StyleClass::Strong) && a.span() == (0..9)));
    }

    #[test]
    fn test_image_hover_through_engine() {
        let mut host = MemoryHost::new("![i](p.png)");
        host.set_selection(Selection::cursor(0));
        let mut engine = LiveEngine::new(Settings::default());
        engine.update(&host, EngineEvent::DocumentChanged);
        let tooltip = engine
            .image_hover(&host, 2, &crate::widgets::FixedModifier(true))
            .unwrap();
        assert_eq!(tooltip.url, "p.png");
        assert!(engine
            .image_hover(&host, 2, &crate::widgets::FixedModifier(false))
            .is_none());
    }

    #[test]
    fn test_set_settings_rebuilds() {
        let mut host = MemoryHost::new("see [a](http://x.y) now");
        host.set_selection(Selection::cursor(0));
        let mut engine = LiveEngine::new(Settings::default());
        engine.update(&host, EngineEvent::DocumentChanged);

        engine.set_settings(Settings {
            link_placeholder: "→".to_string(),
            ..Settings::default()
        });
        assert!(engine.widgets().is_empty());
        let set = engine.update(&host, EngineEvent::DocumentChanged);
        assert!(set.iter().any(|a| a.widget_spec()
            == Some(&WidgetSpec::LinkUrl {
                url: "http://x.y".to_string()
            })));
        let id = only_widget(&engine);
        assert!(matches!(
            engine.widget(id).map(|w| w.render()),
            Some(crate::widgets::WidgetView::LinkIcon { glyph, .. }) if glyph == "→"
        ));
    }
}
