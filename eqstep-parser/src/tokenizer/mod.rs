pub mod raw;
pub mod token;

use logos::{Lexer, Logos};
use raw::{RawKind, RawToken};
pub use token::{Token, TokenKind};

/// The commands that tokenize as binary operators.
const OPERATOR_COMMANDS: [&str; 5] = ["\\cdot", "\\times", "\\div", "\\pm", "\\mp"];

/// Returns an iterator over the raw lexemes produced by the first stage of
/// the tokenizer.
pub fn tokenize_raw(input: &str) -> Lexer<RawKind> {
    RawKind::lexer(input)
}

/// Returns an owned array containing all of the raw lexemes of the input.
/// This allows the scanner to look ahead and backtrack while assembling
/// semantic tokens.
fn raw_tokens(input: &str) -> Box<[RawToken]> {
    let mut lexer = tokenize_raw(input);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        // the catch-all lexeme makes errors unreachable, but an error must
        // never abort the scan either way
        let Ok(kind) = result else { continue };
        tokens.push(RawToken {
            span: lexer.span(),
            kind,
            lexeme: lexer.slice(),
        });
    }

    tokens.into_boxed_slice()
}

/// Tokenizes the given equation into semantic tokens.
///
/// This never fails: unrecognized characters are dropped, a group left open
/// at the end of the input is closed there, and a command missing its
/// arguments keeps whatever arguments it found. Malformed equations degrade
/// to a best-effort token sequence instead of producing an error.
pub fn tokenize(input: &str) -> Vec<Token> {
    Scanner::new(input).scan()
}

/// The result of extracting a `{..}` or `[..]` group.
struct Extraction {
    /// The interior plus the surrounding delimiters.
    content: String,

    /// The interior alone.
    inner: String,
}

impl Extraction {
    /// The extraction produced when the opening delimiter is absent.
    fn none() -> Self {
        Self {
            content: String::new(),
            inner: String::new(),
        }
    }
}

/// Assembles the raw lexemes of an equation into semantic tokens.
struct Scanner<'source> {
    /// The equation being tokenized. Group interiors are recovered verbatim
    /// from this text via the raw lexemes' spans.
    source: &'source str,

    /// The raw lexemes of the source.
    tokens: Box<[RawToken<'source>]>,

    /// The index of the next raw lexeme to be consumed.
    cursor: usize,

    /// The sequence id to assign to the next semantic token.
    next_id: u32,
}

impl<'source> Scanner<'source> {
    fn new(source: &'source str) -> Self {
        Self {
            source,
            tokens: raw_tokens(source),
            cursor: 0,
            next_id: 0,
        }
    }

    /// Consumes the entire input, producing the semantic token sequence.
    fn scan(mut self) -> Vec<Token> {
        let mut tokens = Vec::new();

        while let Some(raw) = self.tokens.get(self.cursor).cloned() {
            let token = match raw.kind {
                RawKind::Command | RawKind::Backslash => {
                    self.cursor += 1;
                    self.command(&raw)
                }
                RawKind::OpenBrace => self.group(),
                RawKind::Add | RawKind::Sub | RawKind::Eq => {
                    self.cursor += 1;
                    self.symbol_token(TokenKind::Operator, raw.lexeme)
                }
                RawKind::OpenParen | RawKind::CloseParen => {
                    self.cursor += 1;
                    self.symbol_token(TokenKind::Paren, raw.lexeme)
                }
                RawKind::Alnum => {
                    self.cursor += 1;
                    self.term(raw.lexeme)
                }
                // whitespace and anything unrecognized at the top level is
                // dropped without a token and without an error
                _ => {
                    self.cursor += 1;
                    continue;
                }
            };
            tokens.push(token);
        }

        tokens
    }

    /// Allocates the sequence id for the next emitted token.
    fn mint(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Returns the kind of the current raw lexeme, if any.
    fn peek_kind(&self) -> Option<RawKind> {
        self.tokens.get(self.cursor).map(|tok| tok.kind)
    }

    /// Consumes and returns the first character of the current raw lexeme.
    /// A multi-character lexeme is split: only its first character is
    /// consumed and the rest stays in the stream.
    fn take_char(&mut self) -> Option<char> {
        let tok = self.tokens.get_mut(self.cursor)?;
        let mut chars = tok.lexeme.chars();
        let first = chars.next()?;
        let rest = chars.as_str();

        if rest.is_empty() {
            self.cursor += 1;
        } else {
            tok.span.start += first.len_utf8();
            tok.lexeme = rest;
        }

        Some(first)
    }

    /// Builds a single-lexeme token whose content and display are the lexeme
    /// itself.
    fn symbol_token(&mut self, kind: TokenKind, lexeme: &str) -> Token {
        Token {
            kind,
            content: lexeme.to_owned(),
            display: lexeme.to_owned(),
            sequence_id: self.mint(),
        }
    }

    /// Dispatches a command by name. The command lexeme itself has already
    /// been consumed.
    fn command(&mut self, raw: &RawToken<'source>) -> Token {
        match raw.lexeme {
            "\\left" | "\\right" => self.delimiter(raw.lexeme),
            "\\frac" => self.fraction(),
            "\\sqrt" => self.sqrt(),
            "\\text" => self.text(),
            name if OPERATOR_COMMANDS.contains(&name) => {
                self.symbol_token(TokenKind::Operator, name)
            }
            // a generic command never consumes a following brace group; the
            // group becomes an independent token on the next iteration
            name => self.symbol_token(TokenKind::Command, name),
        }
    }

    /// Builds a `\left` / `\right` token from the single character following
    /// the command.
    fn delimiter(&mut self, name: &str) -> Token {
        let Some(delim) = self.take_char() else {
            // `\left` at the very end of the input degrades to a generic
            // command token
            return self.symbol_token(TokenKind::Command, name);
        };

        let kind = if name == "\\left" {
            TokenKind::LeftDelim
        } else {
            TokenKind::RightDelim
        };

        Token {
            kind,
            content: format!("{name}{delim}"),
            display: delim.to_string(),
            sequence_id: self.mint(),
        }
    }

    /// Builds a `\frac{..}{..}` token from the two following brace groups.
    fn fraction(&mut self) -> Token {
        let numerator = self.brace_group();
        let denominator = self.brace_group();
        let content = format!("\\frac{}{}", numerator.content, denominator.content);

        Token {
            kind: TokenKind::Fraction {
                numerator_inner: numerator.inner,
                denominator_inner: denominator.inner,
            },
            display: content.clone(),
            content,
            sequence_id: self.mint(),
        }
    }

    /// Builds a `\sqrt{..}` token, consuming an optional `[..]` root index
    /// before the mandatory brace group.
    fn sqrt(&mut self) -> Token {
        let index = if self.peek_kind() == Some(RawKind::OpenBracket) {
            self.bracket_group()
        } else {
            Extraction::none()
        };
        let body = self.brace_group();
        let content = format!("\\sqrt{}{}", index.content, body.content);

        Token {
            kind: TokenKind::Sqrt { inner: body.inner },
            display: content.clone(),
            content,
            sequence_id: self.mint(),
        }
    }

    /// Builds a `\text{..}` token. The braces stay part of the content.
    fn text(&mut self) -> Token {
        let body = self.brace_group();
        let content = format!("\\text{}", body.content);

        Token {
            kind: TokenKind::Text,
            display: content.clone(),
            content,
            sequence_id: self.mint(),
        }
    }

    /// Builds a bare `{..}` group token starting at the current raw lexeme.
    fn group(&mut self) -> Token {
        let body = self.brace_group();

        Token {
            kind: TokenKind::Group { inner: body.inner },
            display: body.content.clone(),
            content: body.content,
            sequence_id: self.mint(),
        }
    }

    /// Builds a term from an alphanumeric base, attaching at most one
    /// subscript and at most one superscript.
    fn term(&mut self, base: &str) -> Token {
        let mut content = base.to_owned();

        if let Some(sub) = self.script(RawKind::Subscript) {
            content.push('_');
            content.push_str(&sub);
        }
        if let Some(sup) = self.script(RawKind::Superscript) {
            content.push('^');
            content.push_str(&sup);
        }

        Token {
            kind: TokenKind::Term,
            display: content.clone(),
            content,
            sequence_id: self.mint(),
        }
    }

    /// Consumes a `_` or `^` marker and the script that follows it: either a
    /// brace group (braces included in the returned text) or a single
    /// alphanumeric character.
    ///
    /// A marker followed by neither is still consumed, and the script is
    /// simply absent.
    fn script(&mut self, marker: RawKind) -> Option<String> {
        if self.peek_kind() != Some(marker) {
            return None;
        }
        self.cursor += 1;

        match self.peek_kind() {
            Some(RawKind::OpenBrace) => Some(self.brace_group().content),
            Some(RawKind::Alnum) => self.take_char().map(String::from),
            _ => None,
        }
    }

    /// Extracts a balanced `{..}` group starting at the current raw lexeme.
    ///
    /// A backslash escapes the lexeme after it, so escaped braces never
    /// affect the nesting depth. If the input ends before the group closes,
    /// everything up to the end of the input is returned rather than an
    /// error. If the current lexeme is not an opening brace, the empty
    /// extraction is returned and the cursor stays put.
    fn brace_group(&mut self) -> Extraction {
        if self.peek_kind() != Some(RawKind::OpenBrace) {
            return Extraction::none();
        }
        let start = self.tokens[self.cursor].span.end;
        self.cursor += 1;

        let mut depth = 1usize;
        let mut end = self.source.len();
        while let Some(tok) = self.tokens.get(self.cursor) {
            let (kind, lexeme_start) = (tok.kind, tok.span.start);
            if kind == RawKind::Backslash {
                self.cursor += 2;
                continue;
            }
            self.cursor += 1;

            match kind {
                RawKind::OpenBrace => depth += 1,
                RawKind::CloseBrace => {
                    depth -= 1;
                    if depth == 0 {
                        end = lexeme_start;
                        break;
                    }
                }
                _ => (),
            }
        }

        let inner = &self.source[start..end];
        Extraction {
            content: format!("{{{inner}}}"),
            inner: inner.to_owned(),
        }
    }

    /// Extracts a `[..]` group starting at the current raw lexeme. Brackets
    /// do not nest: everything up to the first `]` (or the end of the input)
    /// is the interior.
    fn bracket_group(&mut self) -> Extraction {
        if self.peek_kind() != Some(RawKind::OpenBracket) {
            return Extraction::none();
        }
        let start = self.tokens[self.cursor].span.end;
        self.cursor += 1;

        let mut end = self.source.len();
        while let Some(tok) = self.tokens.get(self.cursor) {
            let (kind, lexeme_start) = (tok.kind, tok.span.start);
            self.cursor += 1;

            if kind == RawKind::CloseBracket {
                end = lexeme_start;
                break;
            }
        }

        let inner = &self.source[start..end];
        Extraction {
            content: format!("[{inner}]"),
            inner: inner.to_owned(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    /// Compares the kind and content of each produced token against the
    /// expected list.
    fn compare_tokens<const N: usize>(input: &str, expected: [(TokenKind, &str); N]) {
        let tokens = tokenize(input);
        let actual = tokens
            .iter()
            .map(|token| (token.kind.clone(), token.content.as_str()))
            .collect::<Vec<_>>();

        assert_eq!(actual, expected.to_vec());
    }

    /// Removes all whitespace from the given string.
    fn strip_whitespace(s: &str) -> String {
        s.chars().filter(|c| !c.is_whitespace()).collect()
    }

    #[test]
    fn logistic_step() {
        compare_tokens(
            "x_{n+1} = r x_n",
            [
                (TokenKind::Term, "x_{n+1}"),
                (TokenKind::Operator, "="),
                (TokenKind::Term, "r"),
                (TokenKind::Term, "x_n"),
            ],
        );
    }

    #[test]
    fn operator_commands() {
        compare_tokens(
            "a \\cdot b \\pm c",
            [
                (TokenKind::Term, "a"),
                (TokenKind::Operator, "\\cdot"),
                (TokenKind::Term, "b"),
                (TokenKind::Operator, "\\pm"),
                (TokenKind::Term, "c"),
            ],
        );
    }

    #[test]
    fn fraction() {
        let tokens = tokenize("\\frac{a}{b}");

        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].kind,
            TokenKind::Fraction {
                numerator_inner: "a".to_owned(),
                denominator_inner: "b".to_owned(),
            },
        );
        assert_eq!(tokens[0].content, "\\frac{a}{b}");
    }

    #[test]
    fn unterminated_fraction() {
        // the missing closing brace is supplied at the end of the input
        let tokens = tokenize("\\frac{a}{b");

        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].kind,
            TokenKind::Fraction {
                numerator_inner: "a".to_owned(),
                denominator_inner: "b".to_owned(),
            },
        );
        assert_eq!(tokens[0].content, "\\frac{a}{b}");
    }

    #[test]
    fn fraction_missing_groups() {
        // whitespace breaks the adjacency between `\frac` and its groups,
        // so they are tokenized independently
        compare_tokens(
            "\\frac ab",
            [
                (
                    TokenKind::Fraction {
                        numerator_inner: String::new(),
                        denominator_inner: String::new(),
                    },
                    "\\frac",
                ),
                (TokenKind::Term, "ab"),
            ],
        );
    }

    #[test]
    fn nested_braces() {
        compare_tokens(
            "\\frac{1 - \\frac{a}{b}}{c}",
            [(
                TokenKind::Fraction {
                    numerator_inner: "1 - \\frac{a}{b}".to_owned(),
                    denominator_inner: "c".to_owned(),
                },
                "\\frac{1 - \\frac{a}{b}}{c}",
            )],
        );
    }

    #[test]
    fn escaped_brace_in_group() {
        compare_tokens(
            "{a \\} b}",
            [(
                TokenKind::Group {
                    inner: "a \\} b".to_owned(),
                },
                "{a \\} b}",
            )],
        );
    }

    #[test]
    fn left_right_delimiters() {
        let tokens = tokenize("\\left( x \\right)");

        assert_eq!(tokens.len(), 3);
        assert_eq!(tokens[0].kind, TokenKind::LeftDelim);
        assert_eq!(tokens[0].content, "\\left(");
        assert_eq!(tokens[0].display, "(");
        assert_eq!(tokens[1].content, "x");
        assert_eq!(tokens[2].kind, TokenKind::RightDelim);
        assert_eq!(tokens[2].content, "\\right)");
        assert_eq!(tokens[2].display, ")");
    }

    #[test]
    fn bare_parens() {
        compare_tokens(
            "f(x)",
            [
                (TokenKind::Term, "f"),
                (TokenKind::Paren, "("),
                (TokenKind::Term, "x"),
                (TokenKind::Paren, ")"),
            ],
        );
    }

    #[test]
    fn sqrt_with_index() {
        let tokens = tokenize("\\sqrt[3]{x+1}");

        assert_eq!(tokens.len(), 1);
        assert_eq!(
            tokens[0].kind,
            TokenKind::Sqrt {
                inner: "x+1".to_owned(),
            },
        );
        assert_eq!(tokens[0].content, "\\sqrt[3]{x+1}");
    }

    #[test]
    fn text_keeps_braces() {
        compare_tokens(
            "\\text{if } x",
            [
                (TokenKind::Text, "\\text{if }"),
                (TokenKind::Term, "x"),
            ],
        );
    }

    #[test]
    fn unknown_command_does_not_consume_group() {
        compare_tokens(
            "\\foo{bar}",
            [
                (TokenKind::Command, "\\foo"),
                (
                    TokenKind::Group {
                        inner: "bar".to_owned(),
                    },
                    "{bar}",
                ),
            ],
        );
    }

    #[test]
    fn single_char_scripts() {
        // only one character of an alphanumeric run joins the script
        compare_tokens(
            "x_nm^2y",
            [
                (TokenKind::Term, "x_n"),
                (TokenKind::Term, "m^2"),
                (TokenKind::Term, "y"),
            ],
        );
    }

    #[test]
    fn dangling_script_marker() {
        compare_tokens(
            "x_+ y",
            [
                (TokenKind::Term, "x"),
                (TokenKind::Operator, "+"),
                (TokenKind::Term, "y"),
            ],
        );
    }

    #[test]
    fn unrecognized_characters_dropped() {
        compare_tokens(
            "a , b ! c",
            [
                (TokenKind::Term, "a"),
                (TokenKind::Term, "b"),
                (TokenKind::Term, "c"),
            ],
        );
    }

    #[test]
    fn empty_input() {
        assert_eq!(tokenize(""), Vec::new());
    }

    #[test]
    fn sequence_ids_count_up_from_zero() {
        let tokens = tokenize("K x_{n+1} = K x_n + r");

        for (i, token) in tokens.iter().enumerate() {
            assert_eq!(token.sequence_id, i as u32);
        }
    }

    #[test]
    fn deterministic() {
        let input = "K x_{n+1} = K x_n + r \\cdot (1 - \\frac{K x_n}{K}) \\cdot K x_n";

        assert_eq!(tokenize(input), tokenize(input));
    }

    #[test]
    fn content_reconstructs_input() {
        let input = "P_{n+1} = P_n + r \\cdot (1 - \\frac{P_n}{K}) \\cdot P_n";
        let joined = tokenize(input)
            .iter()
            .map(|token| token.content.clone())
            .collect::<Vec<_>>()
            .join(" ");

        assert_eq!(strip_whitespace(&joined), strip_whitespace(input));
    }
}
