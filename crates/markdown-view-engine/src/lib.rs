pub mod attributed;
pub mod attributes;
pub mod compact;
pub mod document;
pub mod flatten;
pub mod highlight;
pub mod inline;
pub mod io;
pub mod markdown;
pub mod render;
pub mod runs;

// Re-export key types for easier usage
pub use attributed::{AttributeSegment, DisplaySpan, StyledText};
pub use attributes::{
    AttributeContainer, Color, ColorParseError, Font, StrikethroughStyle, StyleOverride,
    TextStyle, Theme,
};
pub use compact::compact;
pub use document::{Block, DirectiveArgument, Document, ListItem, QuoteKind};
pub use flatten::{
    AttributeResolver, ClassResolver, Flattener, IdentityResolver, RenderContext, flatten,
    render_inline, split_groups,
};
pub use highlight::{build_styled_text, find_matches};
pub use inline::{InlineNode, MathSegment};
pub use io::{IoError, load_document, read_file};
pub use markdown::parse_markdown;
pub use render::{RenderedBlock, RenderedItem, describe, directive_header, render_document};
pub use runs::{Group, Run};
