//! Markdown parsing module that converts markdown text into a [`Document`].
//!
//! pulldown-cmark does the parsing; this module only folds its event stream
//! into [`Block`]s and [`InlineNode`] trees.

use std::mem;
use std::sync::OnceLock;

use pulldown_cmark::{BlockQuoteKind, CodeBlockKind, Event, Options, Parser, Tag, TagEnd};
use regex::Regex;

use crate::document::{Block, DirectiveArgument, Document, ListItem, QuoteKind};
use crate::inline::{InlineNode, MathSegment};

/// Parse markdown content into a [`Document`].
///
/// Strikethrough, tables, task lists, GitHub alerts and `$`-delimited math
/// are enabled. Text adjacent to inline math is grouped with it into a single
/// [`InlineNode::MathSegments`] node, and `[text]{spec}` in plain text becomes
/// an [`InlineNode::InlineAttributes`] node. Lines of the form
/// `@Name(arguments) {` ... `}` (or a lone `@Name(arguments)`) become
/// [`Block::Directive`]s.
pub fn parse_markdown(content: &str) -> Document {
    Document::new(parse_blocks(content))
}

/// Lift block directives out of `content`, handing the Markdown between them
/// to pulldown-cmark.
fn parse_blocks(content: &str) -> Vec<Block> {
    let lines: Vec<&str> = content.split_inclusive('\n').collect();
    let mut blocks = Vec::new();
    let mut markdown = String::new();
    let mut fence: Option<Fence> = None;
    let mut index = 0;

    while index < lines.len() {
        let line = lines[index];
        index += 1;

        if let Some(open) = fence {
            if open.closed_by(line) {
                fence = None;
            }
            markdown.push_str(line);
            continue;
        }
        if let Some(open) = Fence::opened_by(line) {
            fence = Some(open);
            markdown.push_str(line);
            continue;
        }
        let Some(directive) = DirectiveLine::parse(line) else {
            markdown.push_str(line);
            continue;
        };

        blocks.extend(parse_commonmark(&mem::take(&mut markdown)));
        let children = if directive.has_body {
            let end = directive_body_end(&lines, index);
            let body = lines[index..end].concat();
            index = (end + 1).min(lines.len());
            parse_blocks(&body)
        } else {
            Vec::new()
        };
        blocks.push(Block::Directive {
            name: directive.name,
            arguments: directive.arguments,
            blocks: children,
        });
    }

    blocks.extend(parse_commonmark(&markdown));
    blocks
}

fn parse_commonmark(content: &str) -> Vec<Block> {
    if content.is_empty() {
        return Vec::new();
    }
    let options = Options::ENABLE_STRIKETHROUGH
        | Options::ENABLE_TABLES
        | Options::ENABLE_TASKLISTS
        | Options::ENABLE_MATH
        | Options::ENABLE_GFM;
    let parser = Parser::new_ext(content, options);
    let mut processor = MarkdownProcessor::new();

    for event in parser {
        processor.process_event(event);
    }

    processor.finalize()
}

/// Index of the line closing a directive body starting at `start`, or
/// `lines.len()` when the body runs to the end of the input.
fn directive_body_end(lines: &[&str], start: usize) -> usize {
    let mut depth = 1;
    let mut fence: Option<Fence> = None;
    for (index, line) in lines.iter().enumerate().skip(start) {
        if let Some(open) = fence {
            if open.closed_by(line) {
                fence = None;
            }
        } else if let Some(open) = Fence::opened_by(line) {
            fence = Some(open);
        } else if DirectiveLine::parse(line).is_some_and(|directive| directive.has_body) {
            depth += 1;
        } else if line.trim() == "}" {
            depth -= 1;
            if depth == 0 {
                return index;
            }
        }
    }
    lines.len()
}

/// An open fenced code block; directives are not recognised inside one.
#[derive(Clone, Copy)]
struct Fence {
    marker: char,
    len: usize,
}

impl Fence {
    fn opened_by(line: &str) -> Option<Self> {
        let rest = strip_indent(line)?;
        let marker = rest.chars().next().filter(|&c| matches!(c, '`' | '~'))?;
        let len = rest.chars().take_while(|&c| c == marker).count();
        (len >= 3).then_some(Self { marker, len })
    }

    fn closed_by(&self, line: &str) -> bool {
        let Some(rest) = strip_indent(line) else {
            return false;
        };
        let len = rest.chars().take_while(|&c| c == self.marker).count();
        len >= self.len && rest[len * self.marker.len_utf8()..].trim().is_empty()
    }
}

/// `line` without up to three spaces of indentation; `None` when indented further.
fn strip_indent(line: &str) -> Option<&str> {
    let rest = line.trim_start_matches(' ');
    (line.len() - rest.len() <= 3).then_some(rest)
}

/// The opening line of a block directive.
struct DirectiveLine {
    name: String,
    arguments: Vec<DirectiveArgument>,
    has_body: bool,
}

impl DirectiveLine {
    fn parse(line: &str) -> Option<Self> {
        static DIRECTIVE_REGEX: OnceLock<Regex> = OnceLock::new();
        let directive_regex = DIRECTIVE_REGEX.get_or_init(|| {
            Regex::new(r"^ {0,3}@([A-Za-z][\w-]*)(?:\((.*)\))?\s*(\{)?$")
                .expect("Invalid directive regex")
        });

        let caps = directive_regex.captures(line.trim_end())?;
        Some(Self {
            name: caps.get(1)?.as_str().to_string(),
            arguments: caps
                .get(2)
                .map(|arguments| parse_arguments(arguments.as_str()))
                .unwrap_or_default(),
            has_body: caps.get(3).is_some(),
        })
    }
}

/// Split `name: value, "quoted, value", positional` on commas outside quotes.
fn parse_arguments(source: &str) -> Vec<DirectiveArgument> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    let mut quoted = false;
    for c in source.chars() {
        match c {
            '"' => {
                quoted = !quoted;
                current.push(c);
            }
            ',' if !quoted => pieces.push(mem::take(&mut current)),
            _ => current.push(c),
        }
    }
    pieces.push(current);

    pieces
        .iter()
        .map(|piece| piece.trim())
        .filter(|piece| !piece.is_empty())
        .map(|piece| match piece.split_once(':') {
            Some((name, value)) if is_argument_name(name.trim()) => {
                DirectiveArgument::new(name.trim(), unquote(value.trim()))
            }
            _ => DirectiveArgument::new("", unquote(piece)),
        })
        .collect()
}

fn is_argument_name(name: &str) -> bool {
    let mut chars = name.chars();
    chars.next().is_some_and(|c| c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-')
}

fn unquote(value: &str) -> &str {
    value
        .strip_prefix('"')
        .and_then(|inner| inner.strip_suffix('"'))
        .unwrap_or(value)
}

/// A block container still collecting children.
enum Container {
    Root(Vec<Block>),
    BlockQuote {
        kind: Option<QuoteKind>,
        blocks: Vec<Block>,
    },
    List {
        start: Option<u64>,
        items: Vec<ListItem>,
    },
    Item(ListItem),
    Table {
        head: Vec<Vec<InlineNode>>,
        rows: Vec<Vec<Vec<InlineNode>>>,
        row: Vec<Vec<InlineNode>>,
    },
}

/// The leaf block currently receiving inline content.
#[derive(Clone, Copy)]
enum Leaf {
    Paragraph,
    Heading,
    TableCell,
    /// Inline content directly inside a tight list item.
    Implicit,
}

/// An inline element still collecting children.
enum InlineFrame {
    Strong(Vec<InlineNode>),
    Emphasis(Vec<InlineNode>),
    Strikethrough(Vec<InlineNode>),
    Link {
        destination: Option<String>,
        title: Option<String>,
        children: Vec<InlineNode>,
    },
    Image {
        source: Option<String>,
        title: Option<String>,
        alt: String,
    },
}

/// Folds pulldown-cmark events into blocks.
///
/// Block containers (quotes, lists, items, tables) live on `containers`, with
/// the document root at the bottom. Inline content of the current leaf block
/// accumulates in `inlines`, with open inline elements on `inline_stack`.
///
/// pulldown-cmark does not wrap the text of tight list items in paragraphs,
/// so inline content arriving with no leaf open starts an implicit paragraph,
/// flushed when the next block starts or the item ends.
struct MarkdownProcessor {
    containers: Vec<Container>,
    leaf: Option<Leaf>,
    inlines: Vec<InlineNode>,
    inline_stack: Vec<InlineFrame>,
    code: Option<(Option<String>, String)>,
    html: Option<String>,
}

impl MarkdownProcessor {
    fn new() -> Self {
        Self {
            containers: vec![Container::Root(Vec::new())],
            leaf: None,
            inlines: Vec::new(),
            inline_stack: Vec::new(),
            code: None,
            html: None,
        }
    }

    fn process_event(&mut self, event: Event) {
        match event {
            Event::Start(tag) => self.start_tag(tag),
            Event::End(tag) => self.end_tag(tag),
            Event::Text(text) => {
                if let Some((_, code)) = self.code.as_mut() {
                    code.push_str(&text);
                } else if let Some(html) = self.html.as_mut() {
                    html.push_str(&text);
                } else {
                    self.push_inline(InlineNode::Text(text.into_string()));
                }
            }
            Event::Code(code) => self.push_inline(InlineNode::InlineCode(code.into_string())),
            Event::InlineMath(latex) | Event::DisplayMath(latex) => {
                self.push_inline(InlineNode::MathSegments(vec![MathSegment::Latex(
                    latex.into_string(),
                )]));
            }
            Event::Html(html) => match self.html.as_mut() {
                Some(block) => block.push_str(&html),
                None => self.push_inline(InlineNode::InlineHtml(html.into_string())),
            },
            Event::InlineHtml(html) => self.push_inline(InlineNode::InlineHtml(html.into_string())),
            Event::FootnoteReference(label) => {
                self.push_inline(InlineNode::Text(format!("[^{label}]")));
            }
            Event::SoftBreak => self.push_inline(InlineNode::SoftBreak),
            Event::HardBreak => self.push_inline(InlineNode::LineBreak),
            Event::Rule => {
                self.flush_implicit();
                self.push_block(Block::ThematicBreak);
            }
            Event::TaskListMarker(checked) => {
                if let Some(Container::Item(item)) = self.containers.last_mut() {
                    item.checked = Some(checked);
                }
            }
        }
    }

    fn start_tag(&mut self, tag: Tag) {
        match tag {
            Tag::Paragraph => {
                self.flush_implicit();
                self.leaf = Some(Leaf::Paragraph);
            }
            Tag::Heading { .. } => {
                self.flush_implicit();
                self.leaf = Some(Leaf::Heading);
            }
            Tag::BlockQuote(kind) => {
                self.flush_implicit();
                self.containers.push(Container::BlockQuote {
                    kind: kind.map(quote_kind),
                    blocks: Vec::new(),
                });
            }
            Tag::CodeBlock(kind) => {
                self.flush_implicit();
                let language = match kind {
                    CodeBlockKind::Fenced(lang) if !lang.is_empty() => Some(lang.into_string()),
                    _ => None,
                };
                self.code = Some((language, String::new()));
            }
            Tag::HtmlBlock => {
                self.flush_implicit();
                self.html = Some(String::new());
            }
            Tag::List(start) => {
                self.flush_implicit();
                self.containers.push(Container::List {
                    start,
                    items: Vec::new(),
                });
            }
            Tag::Item => self.containers.push(Container::Item(ListItem::default())),
            Tag::Table(_) => {
                self.flush_implicit();
                self.containers.push(Container::Table {
                    head: Vec::new(),
                    rows: Vec::new(),
                    row: Vec::new(),
                });
            }
            Tag::TableCell => self.leaf = Some(Leaf::TableCell),
            Tag::Emphasis => self.inline_stack.push(InlineFrame::Emphasis(Vec::new())),
            Tag::Strong => self.inline_stack.push(InlineFrame::Strong(Vec::new())),
            Tag::Strikethrough => self.inline_stack.push(InlineFrame::Strikethrough(Vec::new())),
            Tag::Link {
                dest_url, title, ..
            } => self.inline_stack.push(InlineFrame::Link {
                destination: non_empty(dest_url.into_string()),
                title: non_empty(title.into_string()),
                children: Vec::new(),
            }),
            Tag::Image {
                dest_url, title, ..
            } => self.inline_stack.push(InlineFrame::Image {
                source: non_empty(dest_url.into_string()),
                title: non_empty(title.into_string()),
                alt: String::new(),
            }),
            // Table head and row boundaries are handled on their end events;
            // other extensions are not enabled and their text flows inline.
            _ => {}
        }
    }

    fn end_tag(&mut self, tag: TagEnd) {
        match tag {
            TagEnd::Paragraph => {
                let children = self.take_leaf();
                self.push_block(Block::Paragraph(children));
            }
            TagEnd::Heading(level) => {
                let children = self.take_leaf();
                self.push_block(Block::Heading {
                    level: level as u8,
                    children,
                });
            }
            TagEnd::BlockQuote(_) => {
                self.flush_implicit();
                if let Some(Container::BlockQuote { kind, blocks }) = self.pop_container() {
                    self.push_block(Block::BlockQuote { kind, blocks });
                }
            }
            TagEnd::CodeBlock => {
                if let Some((language, code)) = self.code.take() {
                    self.push_block(Block::CodeBlock { language, code });
                }
            }
            TagEnd::HtmlBlock => {
                if let Some(html) = self.html.take() {
                    self.push_block(Block::HtmlBlock(html));
                }
            }
            TagEnd::List(_) => {
                if let Some(Container::List { start, items }) = self.pop_container() {
                    let block = match start {
                        Some(start) => Block::OrderedList { start, items },
                        None => Block::UnorderedList(items),
                    };
                    self.push_block(block);
                }
            }
            TagEnd::Item => {
                self.flush_implicit();
                if let Some(Container::Item(item)) = self.pop_container() {
                    if let Some(Container::List { items, .. }) = self.containers.last_mut() {
                        items.push(item);
                    }
                }
            }
            TagEnd::TableCell => {
                let cell = self.take_leaf();
                if let Some(Container::Table { row, .. }) = self.containers.last_mut() {
                    row.push(cell);
                }
            }
            TagEnd::TableHead => {
                if let Some(Container::Table { head, row, .. }) = self.containers.last_mut() {
                    *head = mem::take(row);
                }
            }
            TagEnd::TableRow => {
                if let Some(Container::Table { rows, row, .. }) = self.containers.last_mut() {
                    rows.push(mem::take(row));
                }
            }
            TagEnd::Table => {
                if let Some(Container::Table { head, rows, .. }) = self.pop_container() {
                    self.push_block(Block::Table { head, rows });
                }
            }
            TagEnd::Emphasis
            | TagEnd::Strong
            | TagEnd::Strikethrough
            | TagEnd::Link
            | TagEnd::Image => {
                if let Some(frame) = self.inline_stack.pop() {
                    self.push_inline(frame.into_node());
                }
            }
            _ => {}
        }
    }

    /// Add an inline node to the innermost open element or the current leaf.
    fn push_inline(&mut self, node: InlineNode) {
        if self.leaf.is_none() {
            self.leaf = Some(Leaf::Implicit);
        }
        match self.inline_stack.last_mut() {
            Some(InlineFrame::Image { alt, .. }) => alt.push_str(&node.plain_text()),
            Some(
                InlineFrame::Strong(children)
                | InlineFrame::Emphasis(children)
                | InlineFrame::Strikethrough(children)
                | InlineFrame::Link { children, .. },
            ) => push_child(children, node),
            None => push_child(&mut self.inlines, node),
        }
    }

    /// Close the current leaf and return its inline content.
    fn take_leaf(&mut self) -> Vec<InlineNode> {
        // Unclosed inline elements cannot survive a block end; keep their content.
        while let Some(frame) = self.inline_stack.pop() {
            self.push_inline(frame.into_node());
        }
        self.leaf = None;
        expand_inline_attributes(mem::take(&mut self.inlines))
    }

    /// Turn pending tight-list text into a paragraph.
    fn flush_implicit(&mut self) {
        if let Some(Leaf::Implicit) = self.leaf {
            let children = self.take_leaf();
            if !children.is_empty() {
                self.push_block(Block::Paragraph(children));
            }
        }
    }

    fn push_block(&mut self, block: Block) {
        match self.containers.last_mut() {
            Some(Container::Root(blocks))
            | Some(Container::BlockQuote { blocks, .. })
            | Some(Container::Item(ListItem { blocks, .. })) => blocks.push(block),
            Some(Container::List { items, .. }) => {
                // Blocks directly in a list belong to its last item.
                match items.last_mut() {
                    Some(item) => item.blocks.push(block),
                    None => items.push(ListItem {
                        checked: None,
                        blocks: vec![block],
                    }),
                }
            }
            Some(Container::Table { .. }) | None => {
                log::warn!("Dropping block outside of a block container: {block:?}");
            }
        }
    }

    /// Pop a container, never the document root.
    fn pop_container(&mut self) -> Option<Container> {
        if self.containers.len() > 1 {
            self.containers.pop()
        } else {
            None
        }
    }

    /// Close everything still open and return the document's blocks.
    fn finalize(mut self) -> Vec<Block> {
        self.flush_implicit();
        if self.leaf.is_some() {
            let children = self.take_leaf();
            self.push_block(Block::Paragraph(children));
        }
        while self.containers.len() > 1 {
            self.end_open_container();
        }
        match self.containers.pop() {
            Some(Container::Root(blocks)) => blocks,
            _ => Vec::new(),
        }
    }

    fn end_open_container(&mut self) {
        match self.containers.last() {
            Some(Container::BlockQuote { .. }) => self.end_tag(TagEnd::BlockQuote(None)),
            Some(Container::List { start, .. }) => {
                let ordered = start.is_some();
                self.end_tag(TagEnd::List(ordered))
            }
            Some(Container::Item(_)) => self.end_tag(TagEnd::Item),
            Some(Container::Table { .. }) => self.end_tag(TagEnd::Table),
            Some(Container::Root(_)) | None => {}
        }
    }
}

impl InlineFrame {
    fn into_node(self) -> InlineNode {
        match self {
            InlineFrame::Strong(children) => InlineNode::Strong(children),
            InlineFrame::Emphasis(children) => InlineNode::Emphasis(children),
            InlineFrame::Strikethrough(children) => InlineNode::Strikethrough(children),
            InlineFrame::Link {
                destination,
                title,
                children,
            } => InlineNode::Link {
                destination,
                title,
                children,
            },
            // Alt text wins over the title attribute.
            InlineFrame::Image { source, title, alt } => InlineNode::Image {
                title: if alt.is_empty() {
                    title.unwrap_or_default()
                } else {
                    alt
                },
                source,
            },
        }
    }
}

/// Push `node`, merging adjacent text and folding text next to math into one group.
fn push_child(children: &mut Vec<InlineNode>, node: InlineNode) {
    let node = match node {
        InlineNode::Text(text) => match children.last_mut() {
            Some(InlineNode::Text(previous)) => {
                previous.push_str(&text);
                return;
            }
            Some(InlineNode::MathSegments(segments)) => {
                match segments.last_mut() {
                    Some(MathSegment::Text(previous)) => previous.push_str(&text),
                    _ => segments.push(MathSegment::Text(text)),
                }
                return;
            }
            _ => InlineNode::Text(text),
        },
        InlineNode::MathSegments(mut incoming) => match children.last_mut() {
            Some(InlineNode::MathSegments(segments)) => {
                segments.append(&mut incoming);
                return;
            }
            Some(InlineNode::Text(_)) => {
                if let Some(InlineNode::Text(text)) = children.pop() {
                    incoming.insert(0, MathSegment::Text(text));
                }
                InlineNode::MathSegments(incoming)
            }
            _ => InlineNode::MathSegments(incoming),
        },
        other => other,
    };
    children.push(node);
}

fn attributes_regex() -> &'static Regex {
    static ATTRIBUTES_REGEX: OnceLock<Regex> = OnceLock::new();
    ATTRIBUTES_REGEX.get_or_init(|| {
        Regex::new(r"\[([^\[\]]+)\]\{([^{}]*)\}").expect("Invalid inline attributes regex")
    })
}

/// Split `[text]{spec}` out of text nodes, descending into styled children,
/// link children and the text parts of math groups.
fn expand_inline_attributes(nodes: Vec<InlineNode>) -> Vec<InlineNode> {
    let mut expanded = Vec::with_capacity(nodes.len());
    for node in nodes {
        match node {
            InlineNode::Text(text) => expanded.extend(expand_text(&text)),
            InlineNode::Strong(children) => {
                expanded.push(InlineNode::Strong(expand_inline_attributes(children)));
            }
            InlineNode::Emphasis(children) => {
                expanded.push(InlineNode::Emphasis(expand_inline_attributes(children)));
            }
            InlineNode::Strikethrough(children) => {
                expanded.push(InlineNode::Strikethrough(expand_inline_attributes(children)));
            }
            InlineNode::Link {
                destination,
                title,
                children,
            } => expanded.push(InlineNode::Link {
                destination,
                title,
                children: expand_inline_attributes(children),
            }),
            InlineNode::MathSegments(segments) => expand_math(segments, &mut expanded),
            other => expanded.push(other),
        }
    }
    expanded
}

/// Text and attribute nodes for one run of plain text.
fn expand_text(text: &str) -> Vec<InlineNode> {
    let mut nodes = Vec::new();
    let mut last = 0;
    for caps in attributes_regex().captures_iter(text) {
        let (Some(whole), Some(inner), Some(spec)) = (caps.get(0), caps.get(1), caps.get(2))
        else {
            continue;
        };
        if whole.start() > last {
            nodes.push(InlineNode::text(&text[last..whole.start()]));
        }
        nodes.push(InlineNode::InlineAttributes {
            spec: spec.as_str().to_string(),
            children: vec![InlineNode::text(inner.as_str())],
        });
        last = whole.end();
    }
    if last < text.len() {
        nodes.push(InlineNode::text(&text[last..]));
    }
    nodes
}

/// Close the math group around each attribute span found in its text parts.
fn expand_math(segments: Vec<MathSegment>, out: &mut Vec<InlineNode>) {
    let mut group = Vec::new();
    for segment in segments {
        let text = match segment {
            MathSegment::Text(text) => text,
            latex => {
                group.push(latex);
                continue;
            }
        };
        for node in expand_text(&text) {
            match node {
                InlineNode::Text(text) => group.push(MathSegment::Text(text)),
                attributes => {
                    flush_math_group(&mut group, out);
                    out.push(attributes);
                }
            }
        }
    }
    flush_math_group(&mut group, out);
}

/// Emit a math group; one holding no LaTeX is plain text again.
fn flush_math_group(group: &mut Vec<MathSegment>, out: &mut Vec<InlineNode>) {
    if group.is_empty() {
        return;
    }
    let segments = mem::take(group);
    if segments.iter().any(|segment| matches!(segment, MathSegment::Latex(_))) {
        out.push(InlineNode::MathSegments(segments));
        return;
    }
    let text: String = segments
        .into_iter()
        .filter_map(|segment| match segment {
            MathSegment::Text(text) => Some(text),
            MathSegment::Latex(_) => None,
        })
        .collect();
    out.push(InlineNode::Text(text));
}

fn quote_kind(kind: BlockQuoteKind) -> QuoteKind {
    match kind {
        BlockQuoteKind::Note => QuoteKind::Note,
        BlockQuoteKind::Tip => QuoteKind::Tip,
        BlockQuoteKind::Important => QuoteKind::Important,
        BlockQuoteKind::Warning => QuoteKind::Warning,
        BlockQuoteKind::Caution => QuoteKind::Caution,
    }
}

fn non_empty(s: String) -> Option<String> {
    if s.is_empty() { None } else { Some(s) }
}
