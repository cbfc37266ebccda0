//! Cross-step machinery for step-by-step equation animations.
//!
//! When one derivation step is replaced by the next, the rendering layer
//! wants to move tokens that survived the step and fade in tokens that did
//! not, instead of abruptly replacing the whole equation. The [`layout`]
//! module links each token of the new equation to the token it evolved from,
//! giving it a stable [`LayoutId`](layout::LayoutId) to animate under. The
//! [`highlight`] module resolves the display color of each token from the
//! highlight rules attached to a derivation step.

pub mod highlight;
pub mod layout;

pub use highlight::{resolve_colors, HighlightRule, Highlights, ResolvedColor, DEFAULT_COLOR};
pub use layout::{match_tokens, seed, LayoutId, MatchedToken};
