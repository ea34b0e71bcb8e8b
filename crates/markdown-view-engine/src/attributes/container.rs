use serde::{Deserialize, Serialize};
use url::Url;

use super::{Color, Font};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StrikethroughStyle {
    Single,
    Double,
    Dashed,
}

/// Inherited style attributes for a run of text.
///
/// Every entry is optional: an absent entry means "whatever the renderer's
/// ambient style is". The flattener clones the container before each
/// override, so a child's container never aliases its parent's.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct AttributeContainer {
    pub font: Option<Font>,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
    pub strikethrough: Option<StrikethroughStyle>,
    pub link: Option<Url>,
    /// Accessible description, taken from a link's title.
    pub alternate_description: Option<String>,
}

impl AttributeContainer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current font, falling back to the default body font.
    pub fn font_or_default(&self) -> Font {
        self.font.unwrap_or_default()
    }

    pub fn with_font(mut self, font: Font) -> Self {
        self.font = Some(font);
        self
    }

    pub fn with_foreground(mut self, color: Color) -> Self {
        self.foreground = Some(color);
        self
    }

    pub fn with_background(mut self, color: Color) -> Self {
        self.background = Some(color);
        self
    }

    pub fn with_strikethrough(mut self, style: StrikethroughStyle) -> Self {
        self.strikethrough = Some(style);
        self
    }

    pub fn with_link(mut self, link: Url, alternate_description: Option<String>) -> Self {
        self.link = Some(link);
        self.alternate_description = alternate_description;
        self
    }
}
