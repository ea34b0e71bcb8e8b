use std::fmt;
use std::sync::Arc;

use url::Url;

use super::resolver::{AttributeResolver, IdentityResolver};
use crate::attributes::{AttributeContainer, TextStyle, Theme};

/// Everything a flattening pass reads besides the nodes themselves.
///
/// Passed explicitly down the call chain; cloning is cheap (the resolver is
/// shared) and a context is safe to share between threads rendering
/// independent groups.
#[derive(Clone)]
pub struct RenderContext {
    /// Ambient attributes every group starts from (default font, foreground).
    pub base: AttributeContainer,
    /// Search term to highlight; empty disables highlighting.
    pub search_text: String,
    pub theme: Theme,
    /// Base for resolving relative link destinations. Without it only
    /// absolute URLs become links.
    pub base_url: Option<Url>,
    /// Base text style of code block content.
    pub code_style: TextStyle,
    /// Whether search matches are also highlighted inside code blocks.
    pub highlight_code: bool,
    pub resolver: Arc<dyn AttributeResolver>,
}

impl RenderContext {
    pub fn new() -> Self {
        Self {
            base: AttributeContainer::default(),
            search_text: String::new(),
            theme: Theme::default(),
            base_url: None,
            code_style: TextStyle::Callout,
            highlight_code: true,
            resolver: Arc::new(IdentityResolver),
        }
    }

    pub fn with_base(mut self, base: AttributeContainer) -> Self {
        self.base = base;
        self
    }

    pub fn with_search_text(mut self, search_text: impl Into<String>) -> Self {
        self.search_text = search_text.into();
        self
    }

    pub fn with_theme(mut self, theme: Theme) -> Self {
        self.theme = theme;
        self
    }

    pub fn with_base_url(mut self, base_url: Url) -> Self {
        self.base_url = Some(base_url);
        self
    }

    pub fn with_code_style(mut self, code_style: TextStyle) -> Self {
        self.code_style = code_style;
        self
    }

    pub fn with_highlight_code(mut self, highlight_code: bool) -> Self {
        self.highlight_code = highlight_code;
        self
    }

    pub fn with_resolver(mut self, resolver: impl AttributeResolver + 'static) -> Self {
        self.resolver = Arc::new(resolver);
        self
    }

    /// Parse a link or image destination, resolving it against `base_url`.
    ///
    /// Malformed destinations yield `None` rather than an error.
    pub fn resolve_url(&self, destination: &str) -> Option<Url> {
        parse_destination(self.base_url.as_ref(), destination)
    }
}

pub(crate) fn parse_destination(base_url: Option<&Url>, destination: &str) -> Option<Url> {
    let parsed = match base_url {
        Some(base) => base.join(destination),
        None => Url::parse(destination),
    };
    match parsed {
        Ok(url) => Some(url),
        Err(e) => {
            log::debug!("Ignoring link destination {destination:?}: {e}");
            None
        }
    }
}

impl Default for RenderContext {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for RenderContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RenderContext")
            .field("base", &self.base)
            .field("search_text", &self.search_text)
            .field("theme", &self.theme)
            .field("base_url", &self.base_url)
            .field("code_style", &self.code_style)
            .field("highlight_code", &self.highlight_code)
            .finish_non_exhaustive()
    }
}
