/// One inline markup element.
///
/// Children are ordered and that order is preserved by every consumer.
/// `Link` and `Image` destinations may be absent when a reference could not
/// be resolved by the parser.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum InlineNode {
    /// Plain text.
    Text(String),
    /// `**strong**` content.
    Strong(Vec<InlineNode>),
    /// `*emphasized*` content.
    Emphasis(Vec<InlineNode>),
    /// `~~struck~~` content.
    Strikethrough(Vec<InlineNode>),
    /// A hyperlink wrapping its children.
    Link {
        destination: Option<String>,
        title: Option<String>,
        children: Vec<InlineNode>,
    },
    /// A backtick code span. No further markup inside.
    InlineCode(String),
    /// A symbol reference (double backticks in documentation dialects).
    SymbolLink(Option<String>),
    /// An image reference. `title` doubles as the fallback text.
    Image {
        title: String,
        source: Option<String>,
    },
    /// Raw inline HTML, passed through untouched.
    InlineHtml(String),
    /// Custom inline attributes, e.g. `^[text](class: "note")`.
    InlineAttributes {
        spec: String,
        children: Vec<InlineNode>,
    },
    SoftBreak,
    LineBreak,
    /// Text interleaved with inline LaTeX.
    MathSegments(Vec<MathSegment>),
}

/// A piece of a [`InlineNode::MathSegments`] group.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum MathSegment {
    Text(String),
    Latex(String),
}

impl InlineNode {
    /// Convenience constructor for [`InlineNode::Text`].
    pub fn text(s: impl Into<String>) -> Self {
        InlineNode::Text(s.into())
    }

    /// Convenience constructor for a link with no title.
    pub fn link(destination: impl Into<String>, children: Vec<InlineNode>) -> Self {
        InlineNode::Link {
            destination: Some(destination.into()),
            title: None,
            children,
        }
    }

    /// Whether this node separates groups at the top level.
    pub fn is_break(&self) -> bool {
        matches!(self, InlineNode::SoftBreak | InlineNode::LineBreak)
    }

    /// Concatenated text content in document order, ignoring markup.
    ///
    /// Images, raw HTML and breaks contribute nothing; LaTeX contributes its source.
    pub fn plain_text(&self) -> String {
        let mut out = String::new();
        self.collect_text(&mut out);
        out
    }

    fn collect_text(&self, out: &mut String) {
        match self {
            InlineNode::Text(s) | InlineNode::InlineCode(s) => out.push_str(s),
            InlineNode::SymbolLink(destination) => {
                if let Some(d) = destination {
                    out.push_str(d);
                }
            }
            InlineNode::Strong(children)
            | InlineNode::Emphasis(children)
            | InlineNode::Strikethrough(children)
            | InlineNode::Link { children, .. }
            | InlineNode::InlineAttributes { children, .. } => {
                for child in children {
                    child.collect_text(out);
                }
            }
            InlineNode::MathSegments(segments) => {
                for segment in segments {
                    match segment {
                        MathSegment::Text(s) | MathSegment::Latex(s) => out.push_str(s),
                    }
                }
            }
            InlineNode::Image { .. }
            | InlineNode::InlineHtml(_)
            | InlineNode::SoftBreak
            | InlineNode::LineBreak => {}
        }
    }
}
