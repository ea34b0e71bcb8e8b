use serde::{Deserialize, Serialize};

/// Semantic text size a renderer maps onto concrete metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TextStyle {
    #[default]
    Body,
    Title,
    Title2,
    Title3,
    Headline,
    Callout,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWeight {
    #[default]
    Regular,
    Bold,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontDesign {
    #[default]
    Default,
    Monospaced,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum FontWidth {
    #[default]
    Standard,
    Compressed,
}

/// A font description built from a base text style and modifiers.
///
/// Modifiers compose: `Font::default().bold().italic()` is bold italic body
/// text. Each modifier owns one property, so applying it again is a no-op.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Font {
    pub style: TextStyle,
    pub weight: FontWeight,
    pub italic: bool,
    pub design: FontDesign,
    pub width: FontWidth,
}

impl Font {
    pub fn new(style: TextStyle) -> Self {
        Self {
            style,
            ..Self::default()
        }
    }

    pub fn bold(self) -> Self {
        Self {
            weight: FontWeight::Bold,
            ..self
        }
    }

    pub fn italic(self) -> Self {
        Self {
            italic: true,
            ..self
        }
    }

    pub fn monospaced(self) -> Self {
        Self {
            design: FontDesign::Monospaced,
            ..self
        }
    }

    pub fn compressed(self) -> Self {
        Self {
            width: FontWidth::Compressed,
            ..self
        }
    }

    pub fn is_bold(&self) -> bool {
        self.weight == FontWeight::Bold
    }

    pub fn is_monospaced(&self) -> bool {
        self.design == FontDesign::Monospaced
    }
}
