//! # Document Rendering
//!
//! Maps a [`Document`] onto renderer-ready blocks: every piece of inline
//! content goes through [`render_inline`], so each paragraph, heading and
//! table cell becomes a list of compacted [`Group`]s. Block structure is kept
//! as-is; laying blocks out is the renderer's job.
//!
//! Directives keep their name and arguments and render their children like
//! a block quote does.
//!
//! [`describe`] produces a stable plain-text dump of the result, used by the
//! CLI's `--dump` mode and by snapshot tests.

use std::fmt::Write;

use crate::attributed::StyledText;
use crate::attributes::{AttributeContainer, Font, FontWidth, TextStyle};
use crate::document::{Block, DirectiveArgument, Document, ListItem, QuoteKind};
use crate::flatten::{RenderContext, render_inline};
use crate::highlight::find_matches;
use crate::runs::{Group, Run};

#[derive(Debug, Clone, PartialEq)]
pub enum RenderedBlock {
    Paragraph(Vec<Group>),
    Heading {
        level: u8,
        groups: Vec<Group>,
    },
    BlockQuote {
        kind: Option<QuoteKind>,
        blocks: Vec<RenderedBlock>,
    },
    OrderedList {
        start: u64,
        items: Vec<RenderedItem>,
    },
    UnorderedList(Vec<RenderedItem>),
    /// Code is trimmed and set in the code font; highlights mark search hits.
    CodeBlock {
        language: Option<String>,
        code: StyledText,
    },
    HtmlBlock(String),
    ThematicBreak,
    Table {
        head: Vec<Vec<Group>>,
        rows: Vec<Vec<Vec<Group>>>,
    },
    Directive {
        name: String,
        arguments: Vec<DirectiveArgument>,
        blocks: Vec<RenderedBlock>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct RenderedItem {
    pub checked: Option<bool>,
    pub blocks: Vec<RenderedBlock>,
}

/// Render every block of `document` with `ctx`.
pub fn render_document(document: &Document, ctx: &RenderContext) -> Vec<RenderedBlock> {
    log::debug!("Rendering {} blocks", document.blocks.len());
    render_blocks(&document.blocks, ctx)
}

fn render_blocks(blocks: &[Block], ctx: &RenderContext) -> Vec<RenderedBlock> {
    blocks.iter().map(|block| render_block(block, ctx)).collect()
}

fn render_block(block: &Block, ctx: &RenderContext) -> RenderedBlock {
    match block {
        Block::Paragraph(children) => RenderedBlock::Paragraph(render_inline(children, ctx)),
        Block::Heading { level, children } => {
            let font = Font::new(heading_style(*level)).bold();
            let heading_ctx = ctx.clone().with_base(ctx.base.clone().with_font(font));
            RenderedBlock::Heading {
                level: *level,
                groups: render_inline(children, &heading_ctx),
            }
        }
        Block::BlockQuote { kind, blocks } => RenderedBlock::BlockQuote {
            kind: *kind,
            blocks: render_blocks(blocks, ctx),
        },
        Block::OrderedList { start, items } => RenderedBlock::OrderedList {
            start: *start,
            items: render_items(items, ctx),
        },
        Block::UnorderedList(items) => RenderedBlock::UnorderedList(render_items(items, ctx)),
        Block::CodeBlock { language, code } => RenderedBlock::CodeBlock {
            language: language.clone(),
            code: render_code(code, ctx),
        },
        Block::HtmlBlock(html) => RenderedBlock::HtmlBlock(html.clone()),
        Block::ThematicBreak => RenderedBlock::ThematicBreak,
        Block::Table { head, rows } => RenderedBlock::Table {
            head: head.iter().map(|cell| render_inline(cell, ctx)).collect(),
            rows: rows
                .iter()
                .map(|row| row.iter().map(|cell| render_inline(cell, ctx)).collect())
                .collect(),
        },
        Block::Directive {
            name,
            arguments,
            blocks,
        } => RenderedBlock::Directive {
            name: name.clone(),
            arguments: arguments.clone(),
            blocks: render_blocks(blocks, ctx),
        },
    }
}

fn render_items(items: &[ListItem], ctx: &RenderContext) -> Vec<RenderedItem> {
    items
        .iter()
        .map(|item| RenderedItem {
            checked: item.checked,
            blocks: render_blocks(&item.blocks, ctx),
        })
        .collect()
}

fn render_code(code: &str, ctx: &RenderContext) -> StyledText {
    let code = code.trim();
    let font = Font::new(ctx.code_style).monospaced();
    let attributes = ctx.base.clone().with_font(font);
    let highlights = if ctx.highlight_code {
        find_matches(code, &ctx.search_text)
    } else {
        Vec::new()
    };
    StyledText::new(code, attributes).with_highlights(highlights)
}

fn heading_style(level: u8) -> TextStyle {
    match level {
        1 => TextStyle::Title,
        2 => TextStyle::Title2,
        3 => TextStyle::Title3,
        _ => TextStyle::Body,
    }
}

/// Dump rendered blocks as indented text, one run or span per line.
///
/// Styled text lists each display span with its attributes; highlighted
/// spans are marked `[hl]`. The format is stable across runs.
pub fn describe(blocks: &[RenderedBlock]) -> String {
    let mut out = String::new();
    for block in blocks {
        describe_block(&mut out, block, 0);
    }
    out
}

fn describe_block(out: &mut String, block: &RenderedBlock, depth: usize) {
    let pad = "  ".repeat(depth);
    match block {
        RenderedBlock::Paragraph(groups) => {
            line(out, &pad, "paragraph");
            describe_groups(out, groups, depth + 1);
        }
        RenderedBlock::Heading { level, groups } => {
            line(out, &pad, &format!("heading {level}"));
            describe_groups(out, groups, depth + 1);
        }
        RenderedBlock::BlockQuote { kind, blocks } => {
            match kind {
                Some(kind) => line(out, &pad, &format!("quote {kind:?}")),
                None => line(out, &pad, "quote"),
            }
            for block in blocks {
                describe_block(out, block, depth + 1);
            }
        }
        RenderedBlock::OrderedList { start, items } => {
            line(out, &pad, &format!("ordered list from {start}"));
            describe_items(out, items, depth + 1);
        }
        RenderedBlock::UnorderedList(items) => {
            line(out, &pad, "list");
            describe_items(out, items, depth + 1);
        }
        RenderedBlock::CodeBlock { language, code } => {
            let language = language.as_deref().unwrap_or("plain");
            line(out, &pad, &format!("code {language}"));
            describe_styled(out, code, depth + 1);
        }
        RenderedBlock::HtmlBlock(html) => line(out, &pad, &format!("html block {html:?}")),
        RenderedBlock::ThematicBreak => line(out, &pad, "rule"),
        RenderedBlock::Table { head, rows } => {
            line(out, &pad, "table");
            describe_row(out, "head", head, depth + 1);
            for row in rows {
                describe_row(out, "row", row, depth + 1);
            }
        }
        RenderedBlock::Directive {
            name,
            arguments,
            blocks,
        } => {
            line(out, &pad, &format!("directive {}", directive_header(name, arguments)));
            for block in blocks {
                describe_block(out, block, depth + 1);
            }
        }
    }
}

/// `Name` or `Name(key: "value", "positional")`.
pub fn directive_header(name: &str, arguments: &[DirectiveArgument]) -> String {
    if arguments.is_empty() {
        return name.to_string();
    }
    let arguments: Vec<_> = arguments
        .iter()
        .map(|argument| {
            if argument.name.is_empty() {
                format!("{:?}", argument.value)
            } else {
                format!("{}: {:?}", argument.name, argument.value)
            }
        })
        .collect();
    format!("{name}({})", arguments.join(", "))
}

fn describe_items(out: &mut String, items: &[RenderedItem], depth: usize) {
    let pad = "  ".repeat(depth);
    for item in items {
        match item.checked {
            Some(true) => line(out, &pad, "item [x]"),
            Some(false) => line(out, &pad, "item [ ]"),
            None => line(out, &pad, "item"),
        }
        for block in &item.blocks {
            describe_block(out, block, depth + 1);
        }
    }
}

fn describe_row(out: &mut String, label: &str, cells: &[Vec<Group>], depth: usize) {
    let pad = "  ".repeat(depth);
    line(out, &pad, label);
    for cell in cells {
        line(out, &format!("{pad}  "), "cell");
        describe_groups(out, cell, depth + 2);
    }
}

fn describe_groups(out: &mut String, groups: &[Group], depth: usize) {
    let pad = "  ".repeat(depth);
    for (index, group) in groups.iter().enumerate() {
        line(out, &pad, &format!("group {index}"));
        for run in group {
            describe_run(out, run, depth + 1);
        }
    }
}

fn describe_run(out: &mut String, run: &Run, depth: usize) {
    let pad = "  ".repeat(depth);
    match run {
        Run::StyledText(text) => {
            line(out, &pad, "text");
            describe_styled(out, text, depth + 1);
        }
        Run::Math(latex) => line(out, &pad, &format!("math {latex:?}")),
        Run::Image {
            title,
            source,
            link,
        } => {
            let mut desc = format!("image {title:?}");
            if let Some(source) = source {
                let _ = write!(desc, " src={source}");
            }
            if let Some(link) = link {
                let _ = write!(desc, " link={link}");
            }
            line(out, &pad, &desc);
        }
        Run::RawHtml { html, link } => {
            let mut desc = format!("raw html {html:?}");
            if let Some(link) = link {
                let _ = write!(desc, " link={link}");
            }
            line(out, &pad, &desc);
        }
    }
}

fn describe_styled(out: &mut String, text: &StyledText, depth: usize) {
    let pad = "  ".repeat(depth);
    let spans = text.spans();
    if spans.is_empty() {
        line(out, &pad, "\"\"");
    }
    for span in spans {
        let mut desc = format!("{:?} {}", span.text, describe_attributes(span.attributes));
        if span.highlighted {
            desc.push_str(" [hl]");
        }
        line(out, &pad, &desc);
    }
}

/// Attribute summary such as `title2 bold mono bg=#8e8e9333`; `plain` when empty.
pub fn describe_attributes(attributes: &AttributeContainer) -> String {
    let mut parts = Vec::new();
    if let Some(font) = attributes.font {
        if font.style != TextStyle::Body {
            parts.push(format!("{:?}", font.style).to_lowercase());
        }
        if font.is_bold() {
            parts.push("bold".to_string());
        }
        if font.italic {
            parts.push("italic".to_string());
        }
        if font.is_monospaced() {
            parts.push("mono".to_string());
        }
        if font.width == FontWidth::Compressed {
            parts.push("compressed".to_string());
        }
    }
    if let Some(color) = attributes.foreground {
        parts.push(format!("fg={color}"));
    }
    if let Some(color) = attributes.background {
        parts.push(format!("bg={color}"));
    }
    if let Some(style) = attributes.strikethrough {
        parts.push(format!("strike={style:?}").to_lowercase());
    }
    if let Some(link) = &attributes.link {
        parts.push(format!("link={link}"));
    }
    if let Some(alt) = &attributes.alternate_description {
        parts.push(format!("alt={alt:?}"));
    }

    if parts.is_empty() {
        "plain".to_string()
    } else {
        parts.join(" ")
    }
}

fn line(out: &mut String, pad: &str, text: &str) {
    out.push_str(pad);
    out.push_str(text);
    out.push('\n');
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Color, StrikethroughStyle};
    use crate::inline::InlineNode;
    use crate::markdown::parse_markdown;
    use pretty_assertions::assert_eq;
    use rstest::rstest;

    fn render(markdown: &str, ctx: &RenderContext) -> Vec<RenderedBlock> {
        render_document(&parse_markdown(markdown), ctx)
    }

    #[rstest]
    #[case(1, TextStyle::Title)]
    #[case(2, TextStyle::Title2)]
    #[case(3, TextStyle::Title3)]
    #[case(4, TextStyle::Body)]
    #[case(6, TextStyle::Body)]
    fn test_heading_levels_map_to_bold_styles(#[case] level: u8, #[case] style: TextStyle) {
        let doc = Document::new(vec![Block::Heading {
            level,
            children: vec![InlineNode::text("Title")],
        }]);
        let blocks = render_document(&doc, &RenderContext::new());
        let RenderedBlock::Heading { groups, .. } = &blocks[0] else {
            panic!("expected heading, got {:?}", blocks[0]);
        };
        let font = groups[0][0].as_styled_text().unwrap().segments()[0]
            .attributes
            .font
            .unwrap();
        assert_eq!(font, Font::new(style).bold());
    }

    #[test]
    fn test_heading_keeps_base_foreground() {
        let base = AttributeContainer::new().with_foreground(Color::WHITE);
        let ctx = RenderContext::new().with_base(base);
        let blocks = render("## Hi", &ctx);
        let RenderedBlock::Heading { groups, .. } = &blocks[0] else {
            panic!("expected heading");
        };
        let attributes = &groups[0][0].as_styled_text().unwrap().segments()[0].attributes;
        assert_eq!(attributes.foreground, Some(Color::WHITE));
    }

    #[test]
    fn test_paragraph_lines_become_groups() {
        let blocks = render("first line\nsecond line", &RenderContext::new());
        let RenderedBlock::Paragraph(groups) = &blocks[0] else {
            panic!("expected paragraph");
        };
        let texts: Vec<_> = groups
            .iter()
            .map(|group| group[0].visible_text().unwrap())
            .collect();
        assert_eq!(texts, vec!["first line", "second line"]);
    }

    #[test]
    fn test_code_block_is_trimmed_and_highlighted() {
        let ctx = RenderContext::new().with_search_text("MAIN");
        let blocks = render("```rust\n\nfn main() {}\n\n```\n", &ctx);
        let RenderedBlock::CodeBlock { language, code } = &blocks[0] else {
            panic!("expected code block");
        };
        assert_eq!(language.as_deref(), Some("rust"));
        assert_eq!(code.content(), "fn main() {}");
        assert_eq!(code.highlights(), &[3..7]);
        let font = code.segments()[0].attributes.font.unwrap();
        assert!(font.is_monospaced());
        assert_eq!(font.style, TextStyle::Callout);
    }

    #[test]
    fn test_code_highlighting_can_be_disabled() {
        let ctx = RenderContext::new()
            .with_search_text("main")
            .with_highlight_code(false);
        let blocks = render("    fn main() {}\n", &ctx);
        let RenderedBlock::CodeBlock { code, .. } = &blocks[0] else {
            panic!("expected code block");
        };
        assert!(code.highlights().is_empty());
    }

    #[test]
    fn test_lists_and_quotes_keep_structure() {
        let blocks = render("> - [ ] todo\n> - plain", &RenderContext::new());
        let RenderedBlock::BlockQuote { kind: None, blocks } = &blocks[0] else {
            panic!("expected quote");
        };
        let RenderedBlock::UnorderedList(items) = &blocks[0] else {
            panic!("expected list");
        };
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].checked, Some(false));
        assert_eq!(items[1].checked, None);
    }

    #[test]
    fn test_describe_attributes() {
        assert_eq!(describe_attributes(&AttributeContainer::new()), "plain");
        let attributes = AttributeContainer::new()
            .with_font(Font::new(TextStyle::Title2).bold().italic())
            .with_strikethrough(StrikethroughStyle::Single)
            .with_background(Color::YELLOW);
        assert_eq!(
            describe_attributes(&attributes),
            "title2 bold italic bg=#ffff00 strike=single"
        );
    }

    #[test]
    fn test_describe_marks_highlights() {
        let ctx = RenderContext::new().with_search_text("me");
        let dump = describe(&render("find **me** here", &ctx));
        assert_eq!(
            dump,
            "paragraph\n  group 0\n    text\n      \"find \" plain\n      \"me\" bold [hl]\n      \" here\" plain\n"
        );
    }

    #[test]
    fn test_directive_renders_children_with_context() {
        let ctx = RenderContext::new().with_search_text("tip");
        let dump = describe(&render("@Callout(kind: tip) {\nA tip.\n}", &ctx));
        assert_eq!(
            dump,
            "directive Callout(kind: \"tip\")\n  paragraph\n    group 0\n      text\n        \"A \" plain\n        \"tip\" plain [hl]\n        \".\" plain\n"
        );
    }

    #[test]
    fn test_directive_header() {
        let arguments = [
            DirectiveArgument::new("source", "a.png"),
            DirectiveArgument::new("", "wide"),
        ];
        assert_eq!(directive_header("Note", &[]), "Note");
        assert_eq!(
            directive_header("Image", &arguments),
            "Image(source: \"a.png\", \"wide\")"
        );
    }

    #[test]
    fn test_describe_empty_document() {
        assert_eq!(describe(&render("", &RenderContext::new())), "");
    }
}
