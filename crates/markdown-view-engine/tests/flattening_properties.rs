use markdown_view_engine::{
    AttributeContainer, Block, Font, IdentityResolver, InlineNode, MathSegment, RenderContext, Run,
    StyleOverride, compact, find_matches, flatten, parse_markdown, render_inline,
};
use pretty_assertions::assert_eq;
use rstest::rstest;

fn text(s: &str) -> InlineNode {
    InlineNode::text(s)
}

fn flat(nodes: &[InlineNode]) -> Vec<Run> {
    flatten(nodes, &AttributeContainer::new(), "", &IdentityResolver)
}

/// Visible text of styled runs, concatenated in order.
fn visible(runs: &[Run]) -> String {
    runs.iter().filter_map(Run::visible_text).collect()
}

/// Inline content of the first paragraph of `markdown`.
fn inlines(markdown: &str) -> Vec<InlineNode> {
    match parse_markdown(markdown).blocks.into_iter().next() {
        Some(Block::Paragraph(children)) => children,
        other => panic!("expected a paragraph, got {other:?}"),
    }
}

#[rstest]
#[case("plain words only")]
#[case("**bold *nested* text** then `code` and ~~struck~~")]
#[case("a [link](https://example.com) and ![img](x.png) and <b>html</b> end")]
#[case("math $x^2$ between $y$ words")]
#[case("[**deep *deeper ~~deepest~~***](https://example.com/)")]
fn order_preservation(#[case] markdown: &str) {
    let nodes = inlines(markdown);
    let expected: String = nodes
        .iter()
        .map(|node| match node {
            // Images, math and raw HTML are not visible text runs.
            InlineNode::Image { .. } | InlineNode::InlineHtml(_) => String::new(),
            InlineNode::MathSegments(segments) => segments
                .iter()
                .filter_map(|segment| match segment {
                    MathSegment::Text(text) => Some(text.as_str()),
                    MathSegment::Latex(_) => None,
                })
                .collect(),
            other => other.plain_text(),
        })
        .collect();

    let runs = flat(&nodes);
    assert_eq!(visible(&runs), expected);
    assert_eq!(visible(&compact(runs)), expected);
}

#[test]
fn inheritance_isolation() {
    let runs = flat(&[
        InlineNode::Strong(vec![text("a"), InlineNode::Emphasis(vec![text("b")])]),
        text("c"),
    ]);

    let attributes: Vec<_> = runs
        .iter()
        .map(|run| run.as_styled_text().unwrap().segments()[0].attributes.clone())
        .collect();
    assert_eq!(attributes[0].font, Some(Font::default().bold()));
    assert_eq!(attributes[1].font, Some(Font::default().bold().italic()));
    assert_eq!(attributes[2], AttributeContainer::new());
}

#[test]
fn resolver_overrides_do_not_leak_to_siblings() {
    let ctx = RenderContext::new().with_resolver(
        |_spec: &str, inherited: &AttributeContainer| StyleOverride {
            bold: true,
            ..StyleOverride::default()
        }
        .apply(inherited),
    );
    let nodes = vec![
        InlineNode::InlineAttributes {
            spec: ".loud".into(),
            children: vec![text("loud")],
        },
        text(" quiet"),
    ];

    let groups = render_inline(&nodes, &ctx);
    let styled = groups[0][0].as_styled_text().unwrap();
    assert_eq!(styled.content(), "loud quiet");
    assert!(styled.segments()[0].attributes.font.unwrap().is_bold());
    assert_eq!(styled.segments()[1].attributes, AttributeContainer::new());
}

#[rstest]
#[case("**a**b`c`d $m$ e ![i](i.png) f<br>g")]
#[case("one two three")]
#[case("")]
fn compaction_is_idempotent(#[case] markdown: &str) {
    let nodes: Vec<InlineNode> = parse_markdown(markdown)
        .blocks
        .into_iter()
        .flat_map(|block| match block {
            Block::Paragraph(children) => children,
            _ => Vec::new(),
        })
        .collect();
    let once = compact(flat(&nodes));
    assert_eq!(compact(once.clone()), once);
}

#[rstest]
#[case("banana", "an")]
#[case("AaAaA", "aa")]
#[case("Straße STRASSE straße", "STRASSE")]
#[case("ΣΊΣΥΦΟΣ σίσυφος", "σίσυφος")]
#[case("no hits", "zzz")]
fn highlight_ranges_never_overlap(#[case] haystack: &str, #[case] query: &str) {
    let ranges = find_matches(haystack, query);
    for pair in ranges.windows(2) {
        assert!(pair[0].end <= pair[1].start, "{ranges:?} overlap");
    }
    for range in &ranges {
        assert_eq!(haystack[range.clone()].to_lowercase(), query.to_lowercase());
    }
}

#[test]
fn group_splitting() {
    let groups = render_inline(
        &[text("a"), InlineNode::SoftBreak, text("b")],
        &RenderContext::new(),
    );
    let texts: Vec<Vec<_>> = groups
        .iter()
        .map(|group| group.iter().filter_map(Run::visible_text).collect())
        .collect();
    assert_eq!(texts, vec![vec!["a"], vec!["b"]]);
}

#[test]
fn hello_world_keeps_distinct_attributes_after_compaction() {
    let groups = render_inline(
        &[InlineNode::Strong(vec![
            text("Hello "),
            InlineNode::Emphasis(vec![text("world")]),
        ])],
        &RenderContext::new(),
    );
    assert_eq!(groups.len(), 1);

    let styled = groups[0][0].as_styled_text().unwrap();
    let segments: Vec<_> = styled
        .segments()
        .iter()
        .map(|segment| (&styled.content()[segment.range.clone()], segment.attributes.font))
        .collect();
    assert_eq!(
        segments,
        vec![
            ("Hello ", Some(Font::default().bold())),
            ("world", Some(Font::default().bold().italic())),
        ]
    );
}

#[test]
fn cat_dog_compacts_to_one_run() {
    let groups = render_inline(&[text("cat"), text("dog")], &RenderContext::new());
    assert_eq!(groups[0].len(), 1);
    assert_eq!(groups[0][0].visible_text(), Some("catdog"));
    assert_eq!(groups[0][0].as_styled_text().unwrap().segments().len(), 1);
}

#[test]
fn find_me_here_highlight() {
    let ctx = RenderContext::new().with_search_text("ME");
    let groups = render_inline(&[text("find me here")], &ctx);
    let styled = groups[0][0].as_styled_text().unwrap();
    assert_eq!(styled.highlights(), &[5..7]);
}

#[test]
fn invalid_link_renders_unlinked() {
    let runs = flat(&[InlineNode::link("not a url", vec![text("x")])]);
    let styled = runs[0].as_styled_text().unwrap();
    assert_eq!(styled.content(), "x");
    assert_eq!(styled.segments()[0].attributes.link, None);
}

#[test]
fn deeply_nested_styles_flatten_to_one_run() {
    const DEPTH: usize = 200;
    let mut node = text("deep");
    for level in 0..DEPTH {
        node = match level % 3 {
            0 => InlineNode::Strong(vec![node]),
            1 => InlineNode::Emphasis(vec![node]),
            _ => InlineNode::Strikethrough(vec![node]),
        };
    }

    let groups = render_inline(&[node], &RenderContext::new().with_search_text("EE"));
    assert_eq!(groups.len(), 1);
    assert_eq!(groups[0].len(), 1);

    let styled = groups[0][0].as_styled_text().unwrap();
    assert_eq!(styled.content(), "deep");
    assert_eq!(styled.highlights(), &[1..3]);
    let font = styled.segments()[0].attributes.font.unwrap();
    assert!(font.is_bold());
    assert!(font.italic);
    assert!(styled.segments()[0].attributes.strikethrough.is_some());
}
