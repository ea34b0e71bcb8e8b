//! # Inline Markup Model
//!
//! The tree of inline nodes handed over by a Markdown parser, one list per
//! paragraph, heading, table cell or list item line.
//!
//! ## Modules
//!
//! - **`types`**: `InlineNode` enum and the `MathSegment` pieces of a math group
//!
//! ## Breaks
//!
//! `SoftBreak` and `LineBreak` carry no content. At the top level of an inline
//! list they separate groups (see [`crate::flatten::split_groups`]); nested inside
//! a styled subtree they are dropped.

pub mod types;

pub use types::{InlineNode, MathSegment};
