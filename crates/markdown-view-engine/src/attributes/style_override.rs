use serde::{Deserialize, Serialize};

use super::{AttributeContainer, Color, StrikethroughStyle, TextStyle};

/// A partial style applied on top of an inherited [`AttributeContainer`].
///
/// Flags only ever add a modifier; `None` fields keep the inherited value.
#[derive(Debug, Clone, PartialEq, Default, Deserialize, Serialize)]
#[serde(default, deny_unknown_fields)]
pub struct StyleOverride {
    pub text_style: Option<TextStyle>,
    pub bold: bool,
    pub italic: bool,
    pub monospaced: bool,
    pub strikethrough: Option<StrikethroughStyle>,
    pub foreground: Option<Color>,
    pub background: Option<Color>,
}

impl StyleOverride {
    pub fn apply(&self, inherited: &AttributeContainer) -> AttributeContainer {
        let mut container = inherited.clone();

        let mut font = container.font_or_default();
        if let Some(style) = self.text_style {
            font.style = style;
        }
        if self.bold {
            font = font.bold();
        }
        if self.italic {
            font = font.italic();
        }
        if self.monospaced {
            font = font.monospaced();
        }
        if container.font.is_some() || font != Default::default() {
            container.font = Some(font);
        }

        if let Some(style) = self.strikethrough {
            container.strikethrough = Some(style);
        }
        if let Some(color) = self.foreground {
            container.foreground = Some(color);
        }
        if let Some(color) = self.background {
            container.background = Some(color);
        }
        container
    }
}
