//! Markdown parser adapter using pulldown-cmark
//!
//! This module turns pulldown-cmark's offset iterator into a [`SyntaxTree`]
//! and synthesizes what the event stream does not carry: delimiter nodes
//! (heading marks, quote marks, emphasis marks, code marks, link
//! punctuation and destinations) and the front matter block.

use pulldown_cmark::{CodeBlockKind, Event, HeadingLevel, Options, Parser, Tag};
use std::ops::Range;

use crate::config::Settings;
use crate::markdown::front_matter::detect_front_matter;
use crate::markdown::tree::{NodeKind, SyntaxNode, SyntaxTree};
use crate::string_utils::{line_at, lines_in, trim_line_terminators};

// ─────────────────────────────────────────────────────────────────────────────
// Public Types
// ─────────────────────────────────────────────────────────────────────────────

/// A Markdown grammar producing a span-annotated tree over the raw text.
pub trait MarkdownParser {
    fn parse(&self, text: &str) -> SyntaxTree;
}

/// Configuration options for markdown parsing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkdownOptions {
    /// Enable GitHub Flavored Markdown tables
    pub tables: bool,
    /// Enable strikethrough syntax (~~text~~)
    pub strikethrough: bool,
    /// Enable task lists (- [ ] and - [x])
    pub tasklist: bool,
    /// Recognize a leading `---` front matter block
    pub front_matter: bool,
    /// Lines scanned for the closing front matter delimiter
    pub front_matter_line_cap: usize,
}

impl Default for MarkdownOptions {
    fn default() -> Self {
        Self {
            tables: true,
            strikethrough: true,
            tasklist: true,
            front_matter: true,
            front_matter_line_cap: Settings::DEFAULT_FRONT_MATTER_LINE_CAP,
        }
    }
}

impl MarkdownOptions {
    /// Options derived from engine settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            front_matter_line_cap: settings.front_matter_line_cap,
            ..Self::default()
        }
    }

    /// Convert to pulldown-cmark options.
    fn to_cmark_options(&self) -> Options {
        let mut options = Options::empty();
        if self.tables {
            options.insert(Options::ENABLE_TABLES);
        }
        if self.strikethrough {
            options.insert(Options::ENABLE_STRIKETHROUGH);
        }
        if self.tasklist {
            options.insert(Options::ENABLE_TASKLISTS);
        }
        options
    }
}

/// The default parser, backed by pulldown-cmark.
#[derive(Debug, Clone, Default)]
pub struct CmarkParser {
    options: MarkdownOptions,
}

impl CmarkParser {
    pub fn new(options: MarkdownOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &MarkdownOptions {
        &self.options
    }
}

impl MarkdownParser for CmarkParser {
    fn parse(&self, text: &str) -> SyntaxTree {
        let front_matter = if self.options.front_matter {
            detect_front_matter(text, self.options.front_matter_line_cap)
        } else {
            None
        };

        // The body is parsed on its own so the closing `---` is never read
        // as a setext underline.
        let body_start = front_matter.as_ref().map_or(0, |span| span.body_start);
        let mut builder = TreeBuilder::new(text, body_start);
        if let Some(span) = front_matter {
            builder.attach(SyntaxNode::leaf(NodeKind::FrontMatterBlock, span.block()));
        }

        let parser = Parser::new_ext(&text[body_start..], self.options.to_cmark_options());
        for (event, range) in parser.into_offset_iter() {
            match event {
                Event::Start(tag) => {
                    let kind = builder.kind_for(&tag, &range);
                    builder.open(kind, range);
                }
                Event::End(_) => builder.close(),
                Event::Code(_) => builder.leaf(NodeKind::InlineCode, range),
                Event::InlineHtml(_) => builder.leaf(NodeKind::InlineHtml, range),
                _ => {}
            }
        }

        SyntaxTree::new(builder.finish())
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tree Construction
// ─────────────────────────────────────────────────────────────────────────────

struct TreeBuilder<'t> {
    text: &'t str,
    /// Offset of the parsed body within `text`
    offset: usize,
    stack: Vec<SyntaxNode>,
}

impl<'t> TreeBuilder<'t> {
    fn new(text: &'t str, offset: usize) -> Self {
        Self {
            text,
            offset,
            stack: vec![SyntaxNode::new(NodeKind::Document, 0, text.len())],
        }
    }

    fn absolute(&self, range: &Range<usize>) -> Range<usize> {
        range.start + self.offset..range.end + self.offset
    }

    fn kind_for(&self, tag: &Tag<'_>, range: &Range<usize>) -> NodeKind {
        match tag {
            Tag::Paragraph => NodeKind::Paragraph,
            Tag::Heading { level, .. } => {
                heading_kind(self.text, self.absolute(range).start, heading_level(*level))
            }
            Tag::BlockQuote(_) => NodeKind::Blockquote,
            Tag::CodeBlock(CodeBlockKind::Fenced(info)) => NodeKind::FencedCode {
                info: info.trim().to_string(),
            },
            Tag::CodeBlock(CodeBlockKind::Indented) => NodeKind::IndentedCode,
            Tag::HtmlBlock => NodeKind::HtmlBlock,
            Tag::List(_) => NodeKind::List,
            Tag::Item => NodeKind::ListItem,
            Tag::Table(_) => NodeKind::Table,
            Tag::TableHead | Tag::TableRow => NodeKind::TableRow,
            Tag::TableCell => NodeKind::TableCell,
            Tag::Emphasis => NodeKind::Emphasis,
            Tag::Strong => NodeKind::StrongEmphasis,
            Tag::Strikethrough => NodeKind::Strikethrough,
            Tag::Link { .. } => NodeKind::Link,
            Tag::Image { .. } => NodeKind::Image,
            _ => NodeKind::Other,
        }
    }

    fn open(&mut self, kind: NodeKind, range: Range<usize>) {
        let span = self.absolute(&range);
        self.stack.push(SyntaxNode::new(kind, span.start, span.end));
    }

    fn close(&mut self) {
        if self.stack.len() < 2 {
            return;
        }
        if let Some(node) = self.stack.pop() {
            let node = self.complete(node);
            self.attach(node);
        }
    }

    fn leaf(&mut self, kind: NodeKind, range: Range<usize>) {
        let span = self.absolute(&range);
        let node = self.complete(SyntaxNode::leaf(kind, span));
        self.attach(node);
    }

    fn attach(&mut self, node: SyntaxNode) {
        if let Some(parent) = self.stack.last_mut() {
            parent.children.push(node);
        }
    }

    /// Trim the span and add the synthesized delimiter children.
    fn complete(&self, mut node: SyntaxNode) -> SyntaxNode {
        let trimmed = trim_line_terminators(self.text, node.span());
        node.end = trimmed.end.max(node.start);

        let text = self.text;
        let marks = match &node.kind {
            NodeKind::AtxHeading(_) => atx_marks(text, &node),
            NodeKind::SetextHeading(_) => setext_marks(text, &node),
            NodeKind::Emphasis => delimiter_marks(text, &node, NodeKind::EmphasisMark, 1),
            NodeKind::StrongEmphasis => delimiter_marks(text, &node, NodeKind::EmphasisMark, 2),
            NodeKind::Strikethrough => {
                delimiter_marks(text, &node, NodeKind::StrikethroughMark, 2)
            }
            NodeKind::InlineCode => code_marks(text, &node),
            NodeKind::Link | NodeKind::Image => link_marks(text, &node),
            _ => Vec::new(),
        };
        node.children.extend(marks);
        node.sort_children();

        // Only the outermost quote owns the `>` marks of nested quotes
        let nested = self.stack.iter().any(|n| n.kind == NodeKind::Blockquote);
        if node.kind == NodeKind::Blockquote && !nested {
            for mark in quote_marks(text, &node) {
                node.insert_deepest(mark);
            }
        }
        node
    }

    fn finish(mut self) -> SyntaxNode {
        while self.stack.len() > 1 {
            self.close();
        }
        let mut root = self
            .stack
            .pop()
            .unwrap_or_else(|| SyntaxNode::new(NodeKind::Document, 0, self.text.len()));
        root.sort_children();
        root
    }
}

fn heading_level(level: HeadingLevel) -> u8 {
    match level {
        HeadingLevel::H1 => 1,
        HeadingLevel::H2 => 2,
        HeadingLevel::H3 => 3,
        HeadingLevel::H4 => 4,
        HeadingLevel::H5 => 5,
        HeadingLevel::H6 => 6,
    }
}

fn heading_kind(text: &str, start: usize, level: u8) -> NodeKind {
    let first = skip_spaces(text.as_bytes(), start, text.len());
    if text.as_bytes().get(first) == Some(&b'#') {
        NodeKind::AtxHeading(level)
    } else {
        NodeKind::SetextHeading(level)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Delimiter Synthesis
// ─────────────────────────────────────────────────────────────────────────────

fn skip_spaces(bytes: &[u8], mut pos: usize, limit: usize) -> usize {
    while pos < limit && matches!(bytes[pos], b' ' | b'\t') {
        pos += 1;
    }
    pos
}

fn run_length(bytes: &[u8], pos: usize, limit: usize, byte: u8) -> usize {
    bytes[pos.min(limit)..limit]
        .iter()
        .take_while(|b| **b == byte)
        .count()
}

fn atx_marks(text: &str, node: &SyntaxNode) -> Vec<SyntaxNode> {
    let bytes = text.as_bytes();
    let start = skip_spaces(bytes, node.start, node.end);
    let run = run_length(bytes, start, node.end, b'#');
    if run == 0 {
        return Vec::new();
    }
    vec![SyntaxNode::leaf(NodeKind::HeaderMark, start..start + run)]
}

fn setext_marks(text: &str, node: &SyntaxNode) -> Vec<SyntaxNode> {
    let line = line_at(text, node.end);
    if line.start <= node.start {
        return Vec::new();
    }
    let content = &text[line.clone()];
    let Some(offset) = content.find(|c| c == '=' || c == '-') else {
        return Vec::new();
    };
    let start = line.start + offset;
    let end = line.start + content.trim_end().len();
    vec![SyntaxNode::leaf(NodeKind::HeaderMark, start..end.max(start))]
}

/// Opening and closing runs of `want` delimiter bytes (fewer for `~`).
fn delimiter_marks(text: &str, node: &SyntaxNode, kind: NodeKind, want: usize) -> Vec<SyntaxNode> {
    let bytes = text.as_bytes();
    let Some(&first) = bytes.get(node.start) else {
        return Vec::new();
    };
    if !matches!(first, b'*' | b'_' | b'~') {
        return Vec::new();
    }
    let n = run_length(bytes, node.start, node.end, first).min(want);
    let closing = node.end.saturating_sub(n);
    if n == 0 || node.end - node.start < 2 * n || run_length(bytes, closing, node.end, first) < n {
        return Vec::new();
    }
    vec![
        SyntaxNode::leaf(kind.clone(), node.start..node.start + n),
        SyntaxNode::leaf(kind, closing..node.end),
    ]
}

fn code_marks(text: &str, node: &SyntaxNode) -> Vec<SyntaxNode> {
    let bytes = text.as_bytes();
    let n = run_length(bytes, node.start, node.end, b'`');
    let closing = node.end.saturating_sub(n);
    if n == 0 || node.end - node.start < 2 * n || run_length(bytes, closing, node.end, b'`') < n {
        return Vec::new();
    }
    vec![
        SyntaxNode::leaf(NodeKind::CodeMark, node.start..node.start + n),
        SyntaxNode::leaf(NodeKind::CodeMark, closing..node.end),
    ]
}

/// Punctuation and destination of an inline `[text](url)` / `![alt](url)`.
/// Reference links, autolinks and shortcut links get no marks.
fn link_marks(text: &str, node: &SyntaxNode) -> Vec<SyntaxNode> {
    let bytes = text.as_bytes();
    let opener: &[u8] = if node.kind == NodeKind::Image { b"![" } else { b"[" };
    if node.end <= node.start
        || !bytes[node.start..node.end].starts_with(opener)
        || bytes[node.end - 1] != b')'
    {
        return Vec::new();
    }

    let label_start = node.start + opener.len();
    let Some(close) = matching_bracket(bytes, label_start, node.end) else {
        return Vec::new();
    };
    if bytes.get(close + 1) != Some(&b'(') {
        return Vec::new();
    }

    let mut marks = vec![
        SyntaxNode::leaf(NodeKind::LinkMark, node.start..label_start),
        SyntaxNode::leaf(NodeKind::LinkMark, close..close + 2),
    ];
    let url = destination(bytes, close + 2, node.end - 1);
    if !url.is_empty() {
        marks.push(SyntaxNode::leaf(NodeKind::Url, url));
    }
    marks.push(SyntaxNode::leaf(NodeKind::LinkMark, node.end - 1..node.end));
    marks
}

fn matching_bracket(bytes: &[u8], from: usize, limit: usize) -> Option<usize> {
    let mut depth = 0usize;
    let mut i = from;
    while i < limit {
        match bytes[i] {
            b'\\' => i += 1,
            b'[' => depth += 1,
            b']' if depth == 0 => return Some(i),
            b']' => depth -= 1,
            _ => {}
        }
        i += 1;
    }
    None
}

fn destination(bytes: &[u8], from: usize, limit: usize) -> Range<usize> {
    let start = skip_spaces(bytes, from, limit);
    let mut i = start;

    if bytes.get(start) == Some(&b'<') {
        while i < limit && bytes[i] != b'>' {
            if bytes[i] == b'\\' {
                i += 1;
            }
            i += 1;
        }
        return start..(i + 1).min(limit);
    }

    let mut depth = 0usize;
    while i < limit {
        match bytes[i] {
            b'\\' => i += 1,
            b'(' => depth += 1,
            b')' if depth == 0 => break,
            b')' => depth -= 1,
            b if b.is_ascii_whitespace() => break,
            _ => {}
        }
        i += 1;
    }
    start..i.min(limit)
}

/// Every leading `>` on the lines of an outermost blockquote.
fn quote_marks(text: &str, node: &SyntaxNode) -> Vec<SyntaxNode> {
    let bytes = text.as_bytes();
    let mut marks = Vec::new();
    for line in lines_in(text, node.span()) {
        let end = line.end.min(node.end);
        let mut pos = line.start.max(node.start);
        loop {
            pos = skip_spaces(bytes, pos, end);
            if pos < end && bytes[pos] == b'>' {
                marks.push(SyntaxNode::leaf(NodeKind::QuoteMark, pos..pos + 1));
                pos += 1;
            } else {
                break;
            }
        }
    }
    marks
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(text: &str) -> SyntaxTree {
        CmarkParser::default().parse(text)
    }

    fn find<'a>(tree: &'a SyntaxTree, kind: &NodeKind) -> Vec<&'a SyntaxNode> {
        tree.root().descendants().filter(|n| &n.kind == kind).collect()
    }

    fn spans(tree: &SyntaxTree, kind: &NodeKind) -> Vec<Range<usize>> {
        find(tree, kind).iter().map(|n| n.span()).collect()
    }

    fn assert_sorted(node: &SyntaxNode) {
        for pair in node.children.windows(2) {
            assert!(
                pair[0].end <= pair[1].start,
                "overlapping siblings {:?} and {:?}",
                pair[0],
                pair[1]
            );
        }
        for child in &node.children {
            assert!(node.start <= child.start && child.end <= node.end);
            assert_sorted(child);
        }
    }

    #[test]
    fn test_parse_empty_document() {
        let tree = parse("");
        assert_eq!(tree.root().kind, NodeKind::Document);
        assert!(tree.root().children.is_empty());
    }

    #[test]
    fn test_parse_atx_heading() {
        let tree = parse("# Title");
        let heading = find(&tree, &NodeKind::AtxHeading(1));
        assert_eq!(heading.len(), 1);
        assert_eq!(heading[0].span(), 0..7);
        assert_eq!(spans(&tree, &NodeKind::HeaderMark), vec![0..1]);
    }

    #[test]
    fn test_parse_heading_trailing_newline_trimmed() {
        let tree = parse("### Three\n\nbody\n");
        assert_eq!(spans(&tree, &NodeKind::AtxHeading(3)), vec![0..9]);
        assert_eq!(spans(&tree, &NodeKind::HeaderMark), vec![0..3]);
        assert_eq!(spans(&tree, &NodeKind::Paragraph), vec![11..15]);
    }

    #[test]
    fn test_parse_setext_headings() {
        let tree = parse("Title\n===\n\nSub\n---");
        assert_eq!(spans(&tree, &NodeKind::SetextHeading(1)), vec![0..9]);
        assert_eq!(spans(&tree, &NodeKind::SetextHeading(2)), vec![11..18]);
        assert_eq!(spans(&tree, &NodeKind::HeaderMark), vec![6..9, 15..18]);
    }

    #[test]
    fn test_parse_front_matter_block() {
        let tree = parse("---\ntitle: X\n---\nBody");
        assert_eq!(spans(&tree, &NodeKind::FrontMatterBlock), vec![0..16]);
        assert_eq!(spans(&tree, &NodeKind::Paragraph), vec![17..21]);
        assert!(find(&tree, &NodeKind::SetextHeading(2)).is_empty());
    }

    #[test]
    fn test_parse_front_matter_disabled() {
        let parser = CmarkParser::new(MarkdownOptions {
            front_matter: false,
            ..MarkdownOptions::default()
        });
        let tree = parser.parse("---\ntitle: X\n---\nBody");
        assert!(find(&tree, &NodeKind::FrontMatterBlock).is_empty());
    }

    #[test]
    fn test_parse_emphasis_marks() {
        let tree = parse("a *b* **c**");
        assert_eq!(spans(&tree, &NodeKind::Emphasis), vec![2..5]);
        assert_eq!(spans(&tree, &NodeKind::StrongEmphasis), vec![6..11]);
        assert_eq!(
            spans(&tree, &NodeKind::EmphasisMark),
            vec![2..3, 4..5, 6..8, 9..11]
        );
    }

    #[test]
    fn test_parse_strikethrough_marks() {
        let tree = parse("~~gone~~");
        assert_eq!(spans(&tree, &NodeKind::Strikethrough), vec![0..8]);
        assert_eq!(spans(&tree, &NodeKind::StrikethroughMark), vec![0..2, 6..8]);
    }

    #[test]
    fn test_parse_inline_code_marks() {
        let tree = parse("use `x` and ``a ` b``");
        assert_eq!(spans(&tree, &NodeKind::InlineCode), vec![4..7, 12..21]);
        assert_eq!(
            spans(&tree, &NodeKind::CodeMark),
            vec![4..5, 6..7, 12..14, 19..21]
        );
    }

    #[test]
    fn test_parse_inline_link() {
        let tree = parse("[a](http://x.y)");
        assert_eq!(spans(&tree, &NodeKind::Link), vec![0..15]);
        assert_eq!(spans(&tree, &NodeKind::LinkMark), vec![0..1, 2..4, 14..15]);
        assert_eq!(spans(&tree, &NodeKind::Url), vec![4..14]);
    }

    #[test]
    fn test_parse_link_with_title_and_angle_url() {
        let text = "[a](<b c> \"t\")";
        let tree = parse(text);
        let url = spans(&tree, &NodeKind::Url);
        assert_eq!(url.len(), 1);
        assert_eq!(&text[url[0].clone()], "<b c>");
    }

    #[test]
    fn test_parse_image() {
        let tree = parse("![i](p.png)");
        assert_eq!(spans(&tree, &NodeKind::Image), vec![0..11]);
        assert_eq!(spans(&tree, &NodeKind::LinkMark), vec![0..2, 3..5, 10..11]);
        assert_eq!(spans(&tree, &NodeKind::Url), vec![5..10]);
    }

    #[test]
    fn test_parse_reference_link_has_no_url() {
        let tree = parse("[a][r]\n\n[r]: http://x");
        assert_eq!(find(&tree, &NodeKind::Link).len(), 1);
        assert!(find(&tree, &NodeKind::Url).is_empty());
    }

    #[test]
    fn test_parse_blockquote_marks() {
        let tree = parse("> a\n> b");
        assert_eq!(spans(&tree, &NodeKind::Blockquote), vec![0..7]);
        assert_eq!(spans(&tree, &NodeKind::QuoteMark), vec![0..1, 4..5]);
        assert_eq!(
            tree.innermost_at(4).map(|n| n.kind.clone()),
            Some(NodeKind::QuoteMark)
        );
        assert_sorted(tree.root());
    }

    #[test]
    fn test_parse_nested_blockquote_marks_once() {
        let tree = parse("> > a");
        assert_eq!(find(&tree, &NodeKind::Blockquote).len(), 2);
        assert_eq!(spans(&tree, &NodeKind::QuoteMark), vec![0..1, 2..3]);
    }

    #[test]
    fn test_parse_fenced_code() {
        let text = "```rust\nfn main() {}\n```\n";
        let tree = parse(text);
        let code = find(
            &tree,
            &NodeKind::FencedCode {
                info: "rust".to_string(),
            },
        );
        assert_eq!(code.len(), 1);
        assert_eq!(code[0].span(), 0..24);
    }

    #[test]
    fn test_parse_unterminated_fence_extends_to_end() {
        let text = "```\ncode";
        let tree = parse(text);
        let code = find(&tree, &NodeKind::FencedCode { info: String::new() });
        assert_eq!(code[0].span(), 0..text.len());
    }

    #[test]
    fn test_parse_table_rows() {
        let text = "| a | b |\n| - | - |\n| 1 | 2 |";
        let tree = parse(text);
        let table = find(&tree, &NodeKind::Table);
        assert_eq!(table.len(), 1);
        assert_eq!(table[0].span(), 0..text.len());
        assert_eq!(table[0].children_of(&NodeKind::TableRow).count(), 2);
    }

    #[test]
    fn test_parse_inline_html_tags() {
        let tree = parse("a <u>b</u>");
        assert_eq!(spans(&tree, &NodeKind::InlineHtml), vec![2..5, 6..10]);
    }

    #[test]
    fn test_siblings_sorted_and_disjoint() {
        let text = "---\na: 1\n---\n# H *e*\n\n> q **s\n> t** [l](u)\n\n| x |\n|---|\n| `c` |\n";
        assert_sorted(parse(text).root());
    }
}
