use super::Color;

/// Colors the engine applies on its own account.
///
/// Highlight colors are not written into run attributes; they describe how a
/// renderer paints the highlight ranges on top of a run's own style.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Theme {
    pub code_background: Color,
    pub symbol_link_background: Color,
    pub highlight_background: Color,
    pub highlight_foreground: Color,
}

impl Default for Theme {
    fn default() -> Self {
        Self {
            code_background: Color::GRAY.with_opacity(0.2),
            symbol_link_background: Color::GRAY.with_opacity(0.3),
            highlight_background: Color::YELLOW,
            highlight_foreground: Color::BLACK,
        }
    }
}
