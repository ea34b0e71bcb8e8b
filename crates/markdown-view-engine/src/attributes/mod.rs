//! # Style Attributes
//!
//! The inherited style state threaded through flattening.
//!
//! ## Modules
//!
//! - **`font`**: `Font` with its composable modifiers (bold, italic, monospaced, compressed)
//! - **`color`**: RGBA `Color` and hex parsing
//! - **`container`**: `AttributeContainer`, the copy-on-descent attribute map
//! - **`style_override`**: `StyleOverride`, a partial set of attributes applied on top
//!   of an inherited container (used by custom attribute resolvers)
//! - **`theme`**: `Theme`, the palette for code spans, symbol links and search highlights

pub mod color;
pub mod container;
pub mod font;
pub mod style_override;
pub mod theme;

pub use color::{Color, ColorParseError};
pub use container::{AttributeContainer, StrikethroughStyle};
pub use font::{Font, FontDesign, FontWeight, FontWidth, TextStyle};
pub use style_override::StyleOverride;
pub use theme::Theme;
