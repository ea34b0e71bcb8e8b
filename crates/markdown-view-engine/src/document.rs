//! Block-level content model.
//!
//! Blocks only group inline content the way the source document does; how
//! they are laid out is up to the renderer.

use crate::inline::InlineNode;

/// A parsed Markdown document.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Document {
    pub blocks: Vec<Block>,
}

impl Document {
    pub fn new(blocks: Vec<Block>) -> Self {
        Self { blocks }
    }

    pub fn is_empty(&self) -> bool {
        self.blocks.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph(Vec<InlineNode>),
    /// ATX or setext heading, `level` in `1..=6`.
    Heading {
        level: u8,
        children: Vec<InlineNode>,
    },
    BlockQuote {
        kind: Option<QuoteKind>,
        blocks: Vec<Block>,
    },
    OrderedList {
        start: u64,
        items: Vec<ListItem>,
    },
    UnorderedList(Vec<ListItem>),
    CodeBlock {
        language: Option<String>,
        code: String,
    },
    HtmlBlock(String),
    ThematicBreak,
    Table {
        head: Vec<Vec<InlineNode>>,
        rows: Vec<Vec<Vec<InlineNode>>>,
    },
    /// A block directive, `@Name(arguments) { ... }`.
    Directive {
        name: String,
        arguments: Vec<DirectiveArgument>,
        blocks: Vec<Block>,
    },
}

/// One `name: value` entry of a directive's argument list. Positional
/// arguments have an empty name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DirectiveArgument {
    pub name: String,
    pub value: String,
}

impl DirectiveArgument {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// GitHub-style alert kind of a block quote (`> [!NOTE]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QuoteKind {
    Note,
    Tip,
    Important,
    Warning,
    Caution,
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    /// `Some` for task list items, carrying the checkbox state.
    pub checked: Option<bool>,
    pub blocks: Vec<Block>,
}
