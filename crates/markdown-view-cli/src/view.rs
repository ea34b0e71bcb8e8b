//! Converts rendered blocks into ratatui lines.

use std::sync::OnceLock;

use markdown_view_engine::{
    AttributeContainer, DisplaySpan, Group, RenderedBlock, RenderedItem, Run, StyledText, Theme,
    directive_header,
};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use regex::Regex;

/// Lines for a whole document, with a blank line between top-level blocks.
pub fn document_lines(blocks: &[RenderedBlock], theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    for (index, block) in blocks.iter().enumerate() {
        if index > 0 {
            lines.push(Line::default());
        }
        lines.extend(block_lines(block, theme));
    }
    lines
}

fn block_lines(block: &RenderedBlock, theme: &Theme) -> Vec<Line<'static>> {
    match block {
        RenderedBlock::Paragraph(groups) => group_lines(groups, theme),
        RenderedBlock::Heading { level, groups } => {
            let marker = format!("{} ", "#".repeat(*level as usize));
            prefixed(group_lines(groups, theme), &marker, &" ".repeat(marker.len()))
        }
        RenderedBlock::BlockQuote { kind, blocks } => {
            let mut lines = Vec::new();
            if let Some(kind) = kind {
                lines.push(Line::from(Span::styled(
                    format!("{kind:?}"),
                    Style::default().add_modifier(Modifier::BOLD),
                )));
            }
            for block in blocks {
                lines.extend(block_lines(block, theme));
            }
            prefixed(lines, "│ ", "│ ")
        }
        RenderedBlock::Directive {
            name,
            arguments,
            blocks,
        } => {
            let mut lines = vec![Line::from(Span::styled(
                format!("@{}", directive_header(name, arguments)),
                Style::default().add_modifier(Modifier::BOLD),
            ))];
            for block in blocks {
                lines.extend(block_lines(block, theme));
            }
            prefixed(lines, "┃ ", "┃ ")
        }
        RenderedBlock::OrderedList { start, items } => items
            .iter()
            .zip(*start..)
            .flat_map(|(item, number)| item_lines(item, &format!("{number}. "), theme))
            .collect(),
        RenderedBlock::UnorderedList(items) => items
            .iter()
            .flat_map(|item| item_lines(item, "• ", theme))
            .collect(),
        RenderedBlock::CodeBlock { code, .. } => prefixed(styled_lines(code, theme), "  ", "  "),
        RenderedBlock::HtmlBlock(html) => strip_html(html)
            .lines()
            .map(|line| Line::from(line.to_string()))
            .collect(),
        RenderedBlock::ThematicBreak => vec![Line::from("─".repeat(40))],
        RenderedBlock::Table { head, rows } => {
            let mut lines = vec![row_line(head, theme, true)];
            lines.extend(rows.iter().map(|row| row_line(row, theme, false)));
            lines
        }
    }
}

fn item_lines(item: &RenderedItem, marker: &str, theme: &Theme) -> Vec<Line<'static>> {
    let marker = match item.checked {
        Some(true) => format!("{marker}[x] "),
        Some(false) => format!("{marker}[ ] "),
        None => marker.to_string(),
    };
    let lines = item
        .blocks
        .iter()
        .flat_map(|block| block_lines(block, theme))
        .collect();
    prefixed(lines, &marker, &" ".repeat(marker.chars().count()))
}

fn row_line(cells: &[Vec<Group>], theme: &Theme, head: bool) -> Line<'static> {
    let mut spans = Vec::new();
    for (index, cell) in cells.iter().enumerate() {
        if index > 0 {
            spans.push(Span::raw(" │ "));
        }
        for (group_index, group) in cell.iter().enumerate() {
            if group_index > 0 {
                spans.push(Span::raw(" "));
            }
            spans.extend(group.iter().flat_map(|run| run_spans(run, theme)));
        }
    }
    let line = Line::from(spans);
    if head {
        line.style(Style::default().add_modifier(Modifier::BOLD))
    } else {
        line
    }
}

/// One line per group.
pub fn group_lines(groups: &[Group], theme: &Theme) -> Vec<Line<'static>> {
    groups
        .iter()
        .map(|group| {
            let spans: Vec<_> = group.iter().flat_map(|run| run_spans(run, theme)).collect();
            Line::from(spans)
        })
        .collect()
}

fn run_spans(run: &Run, theme: &Theme) -> Vec<Span<'static>> {
    match run {
        Run::StyledText(text) => text.spans().iter().map(|span| styled_span(span, theme)).collect(),
        Run::Math(latex) => vec![Span::styled(
            format!("${latex}$"),
            Style::default().add_modifier(Modifier::ITALIC),
        )],
        Run::Image { title, link, .. } => {
            let mut style = Style::default().add_modifier(Modifier::DIM);
            if link.is_some() {
                style = style.add_modifier(Modifier::UNDERLINED);
            }
            vec![Span::styled(format!("[image: {title}]"), style)]
        }
        Run::RawHtml { html, link } => {
            let text = strip_html(html);
            if text.is_empty() {
                return Vec::new();
            }
            let style = if link.is_some() {
                Style::default().add_modifier(Modifier::UNDERLINED)
            } else {
                Style::default()
            };
            vec![Span::styled(text, style)]
        }
    }
}

/// Lines of a multi-line styled text, breaking spans at newlines.
fn styled_lines(text: &StyledText, theme: &Theme) -> Vec<Line<'static>> {
    let mut lines = Vec::new();
    let mut current = Vec::new();
    for span in text.spans() {
        let style = span_style(span.attributes, span.highlighted, theme);
        let mut pieces = span.text.split('\n');
        if let Some(first) = pieces.next()
            && !first.is_empty()
        {
            current.push(Span::styled(first.to_string(), style));
        }
        for piece in pieces {
            lines.push(Line::from(std::mem::take(&mut current)));
            if !piece.is_empty() {
                current.push(Span::styled(piece.to_string(), style));
            }
        }
    }
    lines.push(Line::from(current));
    lines
}

fn styled_span(span: &DisplaySpan<'_>, theme: &Theme) -> Span<'static> {
    Span::styled(
        span.text.to_string(),
        span_style(span.attributes, span.highlighted, theme),
    )
}

/// Terminal style for a span; highlight colors are painted over the base style.
pub fn span_style(attributes: &AttributeContainer, highlighted: bool, theme: &Theme) -> Style {
    let mut style = Style::default();
    if let Some(font) = attributes.font {
        if font.is_bold() {
            style = style.add_modifier(Modifier::BOLD);
        }
        if font.italic {
            style = style.add_modifier(Modifier::ITALIC);
        }
    }
    if attributes.strikethrough.is_some() {
        style = style.add_modifier(Modifier::CROSSED_OUT);
    }
    if attributes.link.is_some() {
        style = style.add_modifier(Modifier::UNDERLINED).fg(Color::Blue);
    }
    if let Some(color) = attributes.foreground {
        style = style.fg(terminal_color(color));
    }
    if let Some(color) = attributes.background {
        style = style.bg(terminal_color(color));
    }
    if highlighted {
        style = style
            .bg(terminal_color(theme.highlight_background))
            .fg(terminal_color(theme.highlight_foreground));
    }
    style
}

/// Terminal color, blending translucent colors onto a black background.
pub fn terminal_color(color: markdown_view_engine::Color) -> Color {
    let blend = |channel: u8| (u16::from(channel) * u16::from(color.a) / 255) as u8;
    Color::Rgb(blend(color.r), blend(color.g), blend(color.b))
}

/// Visible text of an HTML fragment: tags removed, entities decoded.
pub fn strip_html(html: &str) -> String {
    static TAG_REGEX: OnceLock<Regex> = OnceLock::new();
    let tag_regex = TAG_REGEX.get_or_init(|| Regex::new(r"<[^>]*>").expect("Invalid tag regex"));
    let text = tag_regex.replace_all(html, "");
    html_escape::decode_html_entities(&text).into_owned()
}

/// Prefix the first line with `first` and every later line with `rest`.
fn prefixed(lines: Vec<Line<'static>>, first: &str, rest: &str) -> Vec<Line<'static>> {
    lines
        .into_iter()
        .enumerate()
        .map(|(index, line)| {
            let prefix = if index == 0 { first } else { rest };
            let mut spans = vec![Span::raw(prefix.to_string())];
            spans.extend(line.spans);
            Line::from(spans).style(line.style)
        })
        .collect()
}

/// Number of highlighted ranges across every block.
pub fn count_matches(blocks: &[RenderedBlock]) -> usize {
    blocks.iter().map(block_matches).sum()
}

fn block_matches(block: &RenderedBlock) -> usize {
    match block {
        RenderedBlock::Paragraph(groups) | RenderedBlock::Heading { groups, .. } => {
            group_matches(groups)
        }
        RenderedBlock::BlockQuote { blocks, .. } | RenderedBlock::Directive { blocks, .. } => {
            count_matches(blocks)
        }
        RenderedBlock::OrderedList { items, .. } | RenderedBlock::UnorderedList(items) => items
            .iter()
            .map(|item| count_matches(&item.blocks))
            .sum(),
        RenderedBlock::CodeBlock { code, .. } => code.highlights().len(),
        RenderedBlock::HtmlBlock(_) | RenderedBlock::ThematicBreak => 0,
        RenderedBlock::Table { head, rows } => {
            head.iter().map(|cell| group_matches(cell)).sum::<usize>()
                + rows
                    .iter()
                    .flatten()
                    .map(|cell| group_matches(cell))
                    .sum::<usize>()
        }
    }
}

fn group_matches(groups: &[Group]) -> usize {
    groups
        .iter()
        .flatten()
        .filter_map(Run::as_styled_text)
        .map(|text| text.highlights().len())
        .sum()
}
