use url::Url;

use crate::attributed::StyledText;

/// One indivisible renderable unit produced by flattening.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Run {
    StyledText(StyledText),
    /// Inline LaTeX source, typeset by the renderer.
    Math(String),
    /// An image reference; `link` is the hyperlink inherited from an enclosing link.
    /// `source` is resolved against the base URL when it can be, else verbatim.
    Image {
        title: String,
        source: Option<String>,
        link: Option<Url>,
    },
    RawHtml {
        html: String,
        link: Option<Url>,
    },
}

/// The runs between two top-level breaks.
pub type Group = Vec<Run>;

impl Run {
    /// Text a reader sees for styled runs; `None` for images, math and HTML.
    pub fn visible_text(&self) -> Option<&str> {
        match self {
            Run::StyledText(text) => Some(text.content()),
            Run::Math(_) | Run::Image { .. } | Run::RawHtml { .. } => None,
        }
    }

    pub fn as_styled_text(&self) -> Option<&StyledText> {
        match self {
            Run::StyledText(text) => Some(text),
            _ => None,
        }
    }
}
