//! Tokenizer for the LaTeX subset used in step-by-step equation animations.
//!
//! An equation string like `x_{n+1} = r x_n` is decomposed into an ordered
//! sequence of semantic [`Token`]s (terms, operators, fractions, groups, and
//! so on). The rendering layer draws each token on its own, which is what
//! makes it possible to animate individual pieces of an equation as one
//! derivation step is replaced by the next.
//!
//! Tokenization never fails: malformed input degrades to a best-effort token
//! sequence instead of producing an error.

pub mod tokenizer;

pub use tokenizer::{tokenize, Token, TokenKind};
