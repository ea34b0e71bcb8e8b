//! # Inline Flattening
//!
//! Turns a tree of [`InlineNode`](crate::inline::InlineNode)s into flat, ordered
//! [`Run`](crate::runs::Run)s with resolved, inherited style attributes.
//!
//! ## Architecture
//!
//! The walk is depth-first and order preserving. Each styling node clones the
//! inherited [`AttributeContainer`](crate::attributes::AttributeContainer),
//! overrides one property and recurses, so siblings never see each other's
//! overrides. Leaves become runs; text leaves go through the search
//! highlighter.
//!
//! ## Modules
//!
//! - **`context`**: `RenderContext`, the explicit replacement for ambient view state
//!   (base attributes, search text, theme, base URL, resolver)
//! - **`resolver`**: `AttributeResolver` extension point for custom inline attributes
//! - **`engine`**: `Flattener`, `flatten()`, `split_groups()` and `render_inline()`
//!
//! ## Groups
//!
//! `render_inline()` first splits the top-level list at soft and hard breaks,
//! then flattens and compacts every group with the same base attributes.

pub mod context;
pub mod engine;
pub mod resolver;

pub use context::RenderContext;
pub use engine::{Flattener, flatten, render_inline, split_groups};
pub use resolver::{AttributeResolver, ClassResolver, IdentityResolver};
