use std::fmt;
use std::mem::discriminant;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The different kinds of semantic tokens produced by the tokenizer, along
/// with any kind-specific payload.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TokenKind {
    /// A binary operator: one of `+`, `-`, `=`, or an operator command such
    /// as `\cdot` or `\times`.
    Operator,

    /// A bare parenthesis, i.e. one not introduced by `\left` or `\right`.
    Paren,

    /// A variable or number, with at most one subscript and at most one
    /// superscript attached, e.g. `x`, `42`, `x_n`, `x_{n+1}`, `r^2`.
    Term,

    /// A `\frac{..}{..}` construct. The interiors of the two brace groups
    /// are carried along raw, without being tokenized themselves.
    Fraction {
        numerator_inner: String,
        denominator_inner: String,
    },

    /// A `\sqrt{..}` or `\sqrt[n]{..}` construct, carrying the raw interior
    /// of the mandatory brace group.
    Sqrt { inner: String },

    /// A `\text{..}` construct.
    Text,

    /// A command with no dedicated rule, e.g. `\alpha`. A brace group
    /// following such a command is not part of the token; it is tokenized
    /// independently as a [`TokenKind::Group`].
    Command,

    /// A bare brace group, carrying its raw interior.
    Group { inner: String },

    /// `\left` together with its delimiter.
    LeftDelim,

    /// `\right` together with its delimiter.
    RightDelim,
}

impl TokenKind {
    /// Returns true if both kinds are the same variant, ignoring any
    /// payload. `Fraction { .. }` tokens with different interiors are still
    /// the same kind of token for matching purposes.
    pub fn same_variant(&self, other: &TokenKind) -> bool {
        discriminant(self) == discriminant(other)
    }
}

/// A semantic token produced by the tokenizer.
///
/// Tokens are immutable once produced. Joining the [`display`](Self::display)
/// texts of a token sequence with single spaces reconstructs an equation
/// visually equivalent to the input.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Token {
    /// The kind of token.
    pub kind: TokenKind,

    /// The canonical source substring this token represents. This is the
    /// text used for equality when matching tokens across derivation steps,
    /// and for re-rendering.
    pub content: String,

    /// The substring to show. Equal to `content` for every kind except
    /// `\left` / `\right` tokens, which display only their delimiter.
    pub display: String,

    /// The position of this token within one `tokenize` call, starting at
    /// zero. Ids restart on every call, so they are not stable across calls;
    /// cross-call identity is the matcher's job.
    pub sequence_id: u32,
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.display)
    }
}
