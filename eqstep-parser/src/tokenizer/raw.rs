use logos::Logos;
use std::ops::Range;

/// The different kinds of raw lexemes produced by the first stage of the
/// tokenizer. These are later assembled into semantic
/// [`Token`](super::Token)s by the scanner.
#[derive(Logos, Clone, Copy, Debug, PartialEq)]
pub enum RawKind {
    /// A backslash followed by a command name, e.g. `\frac`.
    #[regex(r"\\[a-zA-Z]+")]
    Command,

    /// A lone backslash, i.e. one not followed by an alphabetic character.
    /// The character after it (if any) is escaped and never opens or closes
    /// a group.
    #[token("\\")]
    Backslash,

    #[token("{")]
    OpenBrace,

    #[token("}")]
    CloseBrace,

    #[token("[")]
    OpenBracket,

    #[token("]")]
    CloseBracket,

    #[token("(")]
    OpenParen,

    #[token(")")]
    CloseParen,

    #[token("+")]
    Add,

    #[token("-")]
    Sub,

    #[token("=")]
    Eq,

    #[token("_")]
    Subscript,

    #[token("^")]
    Superscript,

    /// A maximal run of alphanumeric characters, e.g. `x`, `42` or `2x`.
    #[regex(r"[a-zA-Z0-9]+")]
    Alnum,

    #[regex(r"[ \t\n\r]+")]
    Whitespace,

    /// Any other character. The scanner drops these without complaint.
    #[regex(r".", priority = 0)]
    Symbol,
}

/// A raw lexeme produced by the first stage of the tokenizer.
#[derive(Debug, Clone, PartialEq)]
pub struct RawToken<'source> {
    /// The region of the equation string that this lexeme originated from.
    pub span: Range<usize>,

    /// The kind of lexeme.
    pub kind: RawKind,

    /// The verbatim source text of the lexeme.
    pub lexeme: &'source str,
}
