//! Span-annotated syntax tree
//!
//! The parser adapter produces a tree of [`SyntaxNode`]s whose spans are byte
//! offsets into the document. Every sibling list is sorted by start offset and
//! siblings never overlap, which lets [`SyntaxTree::nodes_in`] prune whole
//! subtrees with a binary search instead of walking the full document.

use std::ops::Range;

// ─────────────────────────────────────────────────────────────────────────────
// Node Kinds
// ─────────────────────────────────────────────────────────────────────────────

/// Kind of a syntax node.
///
/// Delimiter kinds (`HeaderMark`, `QuoteMark`, `EmphasisMark`,
/// `StrikethroughMark`, `CodeMark`, `LinkMark`, `Url`) are synthesized from
/// the source text by the parser adapter.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum NodeKind {
    /// Root node spanning the whole text
    Document,
    Paragraph,
    /// Fenced code block, with its (possibly empty) info string
    FencedCode { info: String },
    IndentedCode,
    /// `---` delimited metadata block at the very top of the document
    FrontMatterBlock,
    /// `#`-style heading with its level
    AtxHeading(u8),
    /// Underlined heading: `===` gives level 1, `---` level 2
    SetextHeading(u8),
    /// The `#` run of an ATX heading, or the underline of a setext heading
    HeaderMark,
    Blockquote,
    /// A single `>` of a blockquote line
    QuoteMark,
    StrongEmphasis,
    Emphasis,
    Strikethrough,
    EmphasisMark,
    StrikethroughMark,
    /// Inline HTML tag such as `<u>`
    InlineHtml,
    InlineCode,
    /// Backtick run of an inline code span
    CodeMark,
    Link,
    Image,
    /// `[`, `](`, `)` and `![` punctuation of inline links and images
    LinkMark,
    /// Destination of an inline link or image
    Url,
    Table,
    TableRow,
    TableCell,
    List,
    ListItem,
    HtmlBlock,
    Other,
}

impl NodeKind {
    /// Whether this kind is one of the synthesized delimiter kinds.
    pub fn is_mark(&self) -> bool {
        matches!(
            self,
            NodeKind::HeaderMark
                | NodeKind::QuoteMark
                | NodeKind::EmphasisMark
                | NodeKind::StrikethroughMark
                | NodeKind::CodeMark
                | NodeKind::LinkMark
                | NodeKind::Url
        )
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Node
// ─────────────────────────────────────────────────────────────────────────────

/// A node of the syntax tree: a kind, a byte span and ordered children.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxNode {
    pub kind: NodeKind,
    pub start: usize,
    pub end: usize,
    pub children: Vec<SyntaxNode>,
}

impl SyntaxNode {
    pub fn new(kind: NodeKind, start: usize, end: usize) -> Self {
        Self {
            kind,
            start,
            end,
            children: Vec::new(),
        }
    }

    /// Create a childless node, used for synthesized delimiters.
    pub fn leaf(kind: NodeKind, range: Range<usize>) -> Self {
        Self::new(kind, range.start, range.end)
    }

    pub fn span(&self) -> Range<usize> {
        self.start..self.end
    }

    /// `start <= pos <= end`.
    pub fn contains(&self, pos: usize) -> bool {
        self.start <= pos && pos <= self.end
    }

    /// Whether the node touches or overlaps `range`.
    pub fn intersects(&self, range: &Range<usize>) -> bool {
        self.start <= range.end && self.end >= range.start
    }

    /// First direct child of the given kind.
    pub fn child(&self, kind: &NodeKind) -> Option<&SyntaxNode> {
        self.children.iter().find(|c| &c.kind == kind)
    }

    /// Direct children of the given kind.
    pub fn children_of<'a>(
        &'a self,
        kind: &'a NodeKind,
    ) -> impl Iterator<Item = &'a SyntaxNode> + 'a {
        self.children.iter().filter(move |c| &c.kind == kind)
    }

    /// Pre-order iterator over this node and all its descendants.
    pub fn descendants(&self) -> NodesIn<'_> {
        NodesIn::new(self, self.start..self.end)
    }

    /// Restore start-offset order among direct children.
    pub(crate) fn sort_children(&mut self) {
        self.children.sort_by_key(|c| (c.start, c.end));
    }

    /// Insert `leaf` into the deepest descendant whose span contains it,
    /// keeping every sibling list sorted.
    pub(crate) fn insert_deepest(&mut self, leaf: SyntaxNode) {
        let host = self
            .children
            .iter()
            .position(|c| !c.kind.is_mark() && c.start <= leaf.start && leaf.end <= c.end);
        match host {
            Some(idx) => self.children[idx].insert_deepest(leaf),
            None => {
                let at = self.children.partition_point(|c| c.start < leaf.start);
                self.children.insert(at, leaf);
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Syntax Tree
// ─────────────────────────────────────────────────────────────────────────────

/// An immutable parse of one document version.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxTree {
    root: SyntaxNode,
}

impl SyntaxTree {
    pub fn new(root: SyntaxNode) -> Self {
        Self { root }
    }

    pub fn root(&self) -> &SyntaxNode {
        &self.root
    }

    /// Lazily walk, in pre-order, every node intersecting `window`
    /// (touching counts). Subtrees outside the window are never entered.
    pub fn nodes_in(&self, window: Range<usize>) -> NodesIn<'_> {
        NodesIn::new(&self.root, window)
    }

    /// Deepest node containing `pos` (inclusive on both ends). On a boundary
    /// shared by two siblings, the earlier sibling wins.
    pub fn innermost_at(&self, pos: usize) -> Option<&SyntaxNode> {
        self.path_at(pos).pop()
    }

    /// Chain of nodes containing `pos`, from the root to the innermost.
    pub fn path_at(&self, pos: usize) -> Vec<&SyntaxNode> {
        let mut path = Vec::new();
        if !self.root.contains(pos) {
            return path;
        }
        let mut node = &self.root;
        path.push(node);
        loop {
            let idx = node.children.partition_point(|c| c.end < pos);
            match node.children.get(idx) {
                Some(child) if child.contains(pos) => {
                    path.push(child);
                    node = child;
                }
                _ => return path,
            }
        }
    }

    /// Nearest node on the path to `pos` (innermost first) matching `pred`.
    pub fn ancestor_at<F>(&self, pos: usize, pred: F) -> Option<&SyntaxNode>
    where
        F: Fn(&NodeKind) -> bool,
    {
        self.path_at(pos).into_iter().rev().find(|n| pred(&n.kind))
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Viewport Iterator
// ─────────────────────────────────────────────────────────────────────────────

/// Pre-order iterator over the nodes intersecting a window.
///
/// Holds one slice iterator per open level. Each sibling list is entered at
/// the first child that can still reach the window and abandoned at the first
/// child starting after it.
pub struct NodesIn<'a> {
    root: Option<&'a SyntaxNode>,
    stack: Vec<std::slice::Iter<'a, SyntaxNode>>,
    window: Range<usize>,
}

impl<'a> NodesIn<'a> {
    fn new(root: &'a SyntaxNode, window: Range<usize>) -> Self {
        Self {
            root: Some(root),
            stack: Vec::new(),
            window,
        }
    }

    fn enter(&mut self, node: &'a SyntaxNode) {
        let first = node.children.partition_point(|c| c.end < self.window.start);
        if first < node.children.len() {
            self.stack.push(node.children[first..].iter());
        }
    }
}

impl<'a> Iterator for NodesIn<'a> {
    type Item = &'a SyntaxNode;

    fn next(&mut self) -> Option<Self::Item> {
        if let Some(root) = self.root.take() {
            if root.intersects(&self.window) {
                self.enter(root);
                return Some(root);
            }
            return None;
        }

        loop {
            let level = self.stack.last_mut()?;
            match level.next() {
                Some(node) if node.start > self.window.end => {
                    self.stack.pop();
                }
                Some(node) if node.end < self.window.start => {}
                Some(node) => {
                    self.enter(node);
                    return Some(node);
                }
                None => {
                    self.stack.pop();
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
