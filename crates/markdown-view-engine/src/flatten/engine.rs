use url::Url;

use super::context::{RenderContext, parse_destination};
use super::resolver::AttributeResolver;
use crate::attributes::{AttributeContainer, StrikethroughStyle, Theme};
use crate::compact::compact;
use crate::highlight::build_styled_text;
use crate::inline::{InlineNode, MathSegment};
use crate::runs::{Group, Run};

/// Depth-first walker producing runs from inline nodes.
///
/// Holds only shared references; the inherited attributes travel as an
/// argument and are cloned before every override.
pub struct Flattener<'a> {
    theme: &'a Theme,
    search_text: &'a str,
    base_url: Option<&'a Url>,
    resolver: &'a dyn AttributeResolver,
}

impl<'a> Flattener<'a> {
    pub fn new(ctx: &'a RenderContext) -> Self {
        Self {
            theme: &ctx.theme,
            search_text: &ctx.search_text,
            base_url: ctx.base_url.as_ref(),
            resolver: ctx.resolver.as_ref(),
        }
    }

    /// Flatten `nodes` starting from `container`.
    ///
    /// Breaks anywhere in `nodes` are dropped; split first with
    /// [`split_groups`] to keep them as group separators.
    pub fn flatten(&self, nodes: &[InlineNode], container: &AttributeContainer) -> Vec<Run> {
        let mut runs = Vec::new();
        self.flatten_into(nodes, container, &mut runs);
        runs
    }

    fn flatten_into(&self, nodes: &[InlineNode], container: &AttributeContainer, out: &mut Vec<Run>) {
        for node in nodes {
            self.flatten_node(node, container, out);
        }
    }

    fn flatten_node(&self, node: &InlineNode, container: &AttributeContainer, out: &mut Vec<Run>) {
        match node {
            InlineNode::Text(text) => {
                out.push(self.styled(text, container));
            }
            InlineNode::Strong(children) => {
                let font = container.font_or_default().bold();
                let container = container.clone().with_font(font);
                self.flatten_into(children, &container, out);
            }
            InlineNode::Emphasis(children) => {
                let font = container.font_or_default().italic();
                let container = container.clone().with_font(font);
                self.flatten_into(children, &container, out);
            }
            InlineNode::Strikethrough(children) => {
                let container = container
                    .clone()
                    .with_strikethrough(StrikethroughStyle::Single);
                self.flatten_into(children, &container, out);
            }
            InlineNode::Link {
                destination,
                title,
                children,
            } => {
                let url = destination.as_deref().and_then(|d| self.resolve_url(d));
                match url {
                    Some(url) => {
                        let container = container.clone().with_link(url, title.clone());
                        self.flatten_into(children, &container, out);
                    }
                    None => self.flatten_into(children, container, out),
                }
            }
            InlineNode::InlineCode(code) => {
                let font = container.font_or_default().monospaced().compressed();
                let container = container
                    .clone()
                    .with_background(self.theme.code_background)
                    .with_font(font);
                out.push(self.styled(code, &container));
            }
            InlineNode::SymbolLink(destination) => {
                if let Some(destination) = destination {
                    let container = container
                        .clone()
                        .with_background(self.theme.symbol_link_background);
                    out.push(self.styled(destination, &container));
                }
            }
            InlineNode::Image { title, source } => {
                out.push(Run::Image {
                    title: title.clone(),
                    source: source.as_deref().map(|source| self.image_source(source)),
                    link: container.link.clone(),
                });
            }
            InlineNode::InlineHtml(html) => {
                out.push(Run::RawHtml {
                    html: html.clone(),
                    link: container.link.clone(),
                });
            }
            InlineNode::InlineAttributes { spec, children } => {
                let container = self.resolver.resolve(spec, container);
                self.flatten_into(children, &container, out);
            }
            InlineNode::SoftBreak | InlineNode::LineBreak => {}
            InlineNode::MathSegments(segments) => {
                for segment in segments {
                    match segment {
                        MathSegment::Text(text) => out.push(self.styled(text, container)),
                        MathSegment::Latex(latex) => out.push(Run::Math(latex.clone())),
                    }
                }
            }
        }
    }

    fn styled(&self, text: &str, container: &AttributeContainer) -> Run {
        Run::StyledText(build_styled_text(text, container, self.search_text))
    }

    fn resolve_url(&self, destination: &str) -> Option<Url> {
        parse_destination(self.base_url, destination)
    }

    /// Image sources resolve like links; one that does not is kept verbatim.
    fn image_source(&self, source: &str) -> String {
        match self.resolve_url(source) {
            Some(url) => url.to_string(),
            None => source.to_string(),
        }
    }
}

/// Flatten `nodes` with the default theme and no base URL.
pub fn flatten(
    nodes: &[InlineNode],
    base: &AttributeContainer,
    search_text: &str,
    resolver: &dyn AttributeResolver,
) -> Vec<Run> {
    let theme = Theme::default();
    let flattener = Flattener {
        theme: &theme,
        search_text,
        base_url: None,
        resolver,
    };
    flattener.flatten(nodes, base)
}

/// Split a top-level inline list at soft and hard breaks.
///
/// Breaks are discarded. Adjacent, leading or trailing breaks produce empty
/// groups; an empty list is a single empty group.
pub fn split_groups(nodes: &[InlineNode]) -> Vec<&[InlineNode]> {
    nodes.split(InlineNode::is_break).collect()
}

/// Split, flatten and compact an inline list into groups of runs.
///
/// Every group starts from `ctx.base`; no state carries over between groups.
pub fn render_inline(nodes: &[InlineNode], ctx: &RenderContext) -> Vec<Group> {
    let flattener = Flattener::new(ctx);
    split_groups(nodes)
        .into_iter()
        .map(|group| {
            let runs = flattener.flatten(group, &ctx.base);
            log::trace!("Flattened {} nodes into {} runs", group.len(), runs.len());
            compact(runs)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::attributes::{Color, Font, TextStyle};
    use crate::flatten::IdentityResolver;
    use pretty_assertions::assert_eq;

    fn text(s: &str) -> InlineNode {
        InlineNode::text(s)
    }

    fn flat(nodes: &[InlineNode]) -> Vec<Run> {
        flatten(nodes, &AttributeContainer::new(), "", &IdentityResolver)
    }

    fn styled(run: &Run) -> &crate::attributed::StyledText {
        run.as_styled_text().expect("expected a styled text run")
    }

    #[test]
    fn strong_with_nested_emphasis() {
        let runs = flat(&[InlineNode::Strong(vec![
            text("Hello "),
            InlineNode::Emphasis(vec![text("world")]),
        ])]);

        assert_eq!(runs.len(), 2);
        let hello = styled(&runs[0]).uniform_attributes().unwrap();
        let world = styled(&runs[1]).uniform_attributes().unwrap();
        assert_eq!(hello.font, Some(Font::default().bold()));
        assert_eq!(world.font, Some(Font::default().bold().italic()));
    }

    #[test]
    fn sibling_overrides_do_not_leak() {
        let runs = flat(&[
            InlineNode::Strong(vec![
                text("a"),
                InlineNode::Emphasis(vec![text("b")]),
            ]),
            text("c"),
        ]);

        assert_eq!(runs.len(), 3);
        let c = styled(&runs[2]);
        assert_eq!(c.content(), "c");
        assert_eq!(c.uniform_attributes(), Some(&AttributeContainer::new()));
    }

    #[test]
    fn emphasis_keeps_inherited_text_style() {
        let base = AttributeContainer::new().with_font(Font::new(TextStyle::Title));
        let runs = flatten(
            &[InlineNode::Emphasis(vec![text("x")])],
            &base,
            "",
            &IdentityResolver,
        );
        let font = styled(&runs[0]).uniform_attributes().unwrap().font.unwrap();
        assert_eq!(font.style, TextStyle::Title);
        assert!(font.italic);
    }

    #[test]
    fn strikethrough_and_highlight_combine() {
        let runs = flatten(
            &[InlineNode::Strikethrough(vec![text("old news")])],
            &AttributeContainer::new(),
            "NEWS",
            &IdentityResolver,
        );
        let run = styled(&runs[0]);
        assert_eq!(
            run.uniform_attributes().unwrap().strikethrough,
            Some(StrikethroughStyle::Single)
        );
        assert_eq!(run.highlights(), &[4..8]);
    }

    #[test]
    fn search_text_reaches_nested_children() {
        let runs = flatten(
            &[InlineNode::Strong(vec![InlineNode::Emphasis(vec![text("deep match")])])],
            &AttributeContainer::new(),
            "match",
            &IdentityResolver,
        );
        assert_eq!(styled(&runs[0]).highlights(), &[5..10]);
    }

    #[test]
    fn valid_link_sets_target_and_description() {
        let runs = flat(&[InlineNode::Link {
            destination: Some("https://apple.com".into()),
            title: Some("Apple".into()),
            children: vec![text("Apple Link")],
        }]);
        let attributes = styled(&runs[0]).uniform_attributes().unwrap();
        assert_eq!(attributes.link.as_ref().unwrap().as_str(), "https://apple.com/");
        assert_eq!(attributes.alternate_description.as_deref(), Some("Apple"));
    }

    #[test]
    fn invalid_or_absent_link_renders_unlinked() {
        for destination in [Some("not a url".to_string()), None] {
            let runs = flat(&[InlineNode::Link {
                destination,
                title: Some("t".into()),
                children: vec![InlineNode::Strong(vec![text("x")])],
            }]);
            let attributes = styled(&runs[0]).uniform_attributes().unwrap();
            assert_eq!(attributes.link, None);
            assert_eq!(attributes.alternate_description, None);
            assert!(attributes.font.unwrap().is_bold());
        }
    }

    #[test]
    fn inline_code_is_monospaced_on_code_background_and_highlighted() {
        let runs = flatten(
            &[InlineNode::Emphasis(vec![InlineNode::InlineCode("let x".into())])],
            &AttributeContainer::new(),
            "X",
            &IdentityResolver,
        );
        let run = styled(&runs[0]);
        let attributes = run.uniform_attributes().unwrap();
        let font = attributes.font.unwrap();
        assert!(font.is_monospaced());
        assert!(font.italic);
        assert_eq!(font.width, crate::attributes::FontWidth::Compressed);
        assert_eq!(attributes.background, Some(Theme::default().code_background));
        assert_eq!(run.highlights(), &[4..5]);
    }

    #[test]
    fn symbol_link_present_and_absent() {
        let runs = flat(&[
            InlineNode::SymbolLink(None),
            InlineNode::SymbolLink(Some("Vec::new".into())),
        ]);
        assert_eq!(runs.len(), 1);
        let run = styled(&runs[0]);
        assert_eq!(run.content(), "Vec::new");
        assert_eq!(
            run.uniform_attributes().unwrap().background,
            Some(Theme::default().symbol_link_background)
        );
    }

    #[test]
    fn image_and_html_inherit_enclosing_link() {
        let runs = flat(&[
            InlineNode::link(
                "https://example.com",
                vec![
                    InlineNode::Image {
                        title: "logo".into(),
                        source: Some("https://example.com/logo.png".into()),
                    },
                    InlineNode::InlineHtml("<kbd>".into()),
                ],
            ),
            InlineNode::Image {
                title: "bare".into(),
                source: None,
            },
        ]);

        let link = Url::parse("https://example.com").ok();
        assert_eq!(
            runs,
            vec![
                Run::Image {
                    title: "logo".into(),
                    source: Some("https://example.com/logo.png".into()),
                    link: link.clone(),
                },
                Run::RawHtml {
                    html: "<kbd>".into(),
                    link,
                },
                Run::Image {
                    title: "bare".into(),
                    source: None,
                    link: None,
                },
            ]
        );
    }

    #[test]
    fn image_sources_resolve_against_base_url() {
        let image = InlineNode::Image {
            title: "shot".into(),
            source: Some("img/shot.png".into()),
        };
        let source_of = |runs: Vec<Run>| match runs.into_iter().next() {
            Some(Run::Image { source, .. }) => source,
            other => panic!("expected image, got {other:?}"),
        };

        let ctx = RenderContext::new().with_base_url(Url::parse("file:///notes/").unwrap());
        let resolved = Flattener::new(&ctx).flatten(&[image.clone()], &ctx.base);
        assert_eq!(source_of(resolved).as_deref(), Some("file:///notes/img/shot.png"));

        let unresolved = flat(&[image]);
        assert_eq!(source_of(unresolved).as_deref(), Some("img/shot.png"));
    }

    #[test]
    fn inline_attributes_use_resolver() {
        let resolver = |spec: &str, inherited: &AttributeContainer| {
            if spec == "highlight" {
                inherited.clone().with_background(Color::YELLOW)
            } else {
                inherited.clone()
            }
        };
        let runs = flatten(
            &[
                InlineNode::InlineAttributes {
                    spec: "highlight".into(),
                    children: vec![text("marked")],
                },
                text("plain"),
            ],
            &AttributeContainer::new(),
            "",
            &resolver,
        );

        assert_eq!(
            styled(&runs[0]).uniform_attributes().unwrap().background,
            Some(Color::YELLOW)
        );
        assert_eq!(styled(&runs[1]).uniform_attributes().unwrap().background, None);
    }

    #[test]
    fn nested_breaks_are_dropped() {
        let runs = flat(&[InlineNode::Strong(vec![
            text("a"),
            InlineNode::SoftBreak,
            text("b"),
            InlineNode::LineBreak,
        ])]);
        let contents: Vec<_> = runs.iter().filter_map(Run::visible_text).collect();
        assert_eq!(contents, vec!["a", "b"]);
    }

    #[test]
    fn math_segments_interleave_text_and_latex() {
        let runs = flatten(
            &[InlineNode::MathSegments(vec![
                MathSegment::Text("area is ".into()),
                MathSegment::Latex(r"\pi r^2".into()),
                MathSegment::Text(" for radius r".into()),
            ])],
            &AttributeContainer::new(),
            "r",
            &IdentityResolver,
        );

        assert_eq!(runs.len(), 3);
        assert_eq!(styled(&runs[0]).highlights(), &[1..2]);
        assert_eq!(runs[1], Run::Math(r"\pi r^2".into()));
        assert_eq!(styled(&runs[2]).content(), " for radius r");
        assert_eq!(styled(&runs[2]).highlights(), &[3..4, 5..6, 12..13]);
    }

    #[test]
    fn empty_children_produce_no_runs() {
        assert!(flat(&[InlineNode::Strong(vec![]), InlineNode::Emphasis(vec![])]).is_empty());
    }

    #[test]
    fn split_groups_at_top_level_breaks() {
        let nodes = [text("a"), InlineNode::SoftBreak, text("b")];
        let groups = split_groups(&nodes);
        assert_eq!(groups, vec![&nodes[0..1], &nodes[2..3]]);
    }

    #[test]
    fn split_groups_keeps_empty_groups() {
        let nodes = [InlineNode::LineBreak, text("a"), InlineNode::SoftBreak, InlineNode::SoftBreak];
        let lengths: Vec<_> = split_groups(&nodes).iter().map(|g| g.len()).collect();
        assert_eq!(lengths, vec![0, 1, 0, 0]);
        assert_eq!(split_groups(&[]).len(), 1);
    }

    #[test]
    fn render_inline_compacts_each_group_from_the_same_base() {
        let base = AttributeContainer::new().with_foreground(Color::BLACK);
        let ctx = RenderContext::new().with_base(base.clone());
        let groups = render_inline(
            &[
                text("cat"),
                text("dog"),
                InlineNode::LineBreak,
                InlineNode::Strong(vec![text("bold")]),
            ],
            &ctx,
        );

        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].len(), 1);
        assert_eq!(styled(&groups[0][0]).content(), "catdog");
        assert_eq!(styled(&groups[0][0]).uniform_attributes(), Some(&base));

        let bold = styled(&groups[1][0]).uniform_attributes().unwrap();
        assert_eq!(bold.foreground, Some(Color::BLACK));
        assert!(bold.font.unwrap().is_bold());
    }

    #[test]
    fn render_inline_resolves_relative_links_with_base_url() {
        let ctx = RenderContext::new().with_base_url(Url::parse("https://docs.rs/").unwrap());
        let groups = render_inline(&[InlineNode::link("url/latest", vec![text("docs")])], &ctx);
        let link = styled(&groups[0][0]).uniform_attributes().unwrap().link.clone();
        assert_eq!(link.unwrap().as_str(), "https://docs.rs/url/latest");
    }
}
