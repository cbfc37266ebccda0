use eqstep_parser::{tokenize, Token, TokenKind};
use std::collections::HashMap;
use std::fmt::Write;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// The color applied to every token no highlight rule matches.
pub const DEFAULT_COLOR: &str = "#e9ecf2";

/// The highlight rules attached to one derivation step.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Highlights {
    /// Content to color, applied identically to every occurrence of that
    /// content. The occurrence machinery is bypassed entirely.
    Map(HashMap<String, String>),

    /// Ordered rules, optionally pinned to a specific occurrence of their
    /// pattern. The first rule that matches a token wins.
    List(Vec<HighlightRule>),
}

/// A single ordered highlight rule.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct HighlightRule {
    /// The token content to match. Whitespace is stripped from both sides
    /// of the comparison, so `x_{n + 1}` and `x_{n+1}` are the same pattern.
    pub pattern: String,

    /// The color applied when the rule matches.
    pub color: String,

    /// When set, the rule applies only to this occurrence of the pattern
    /// (zero-based). When absent, the rule applies to every occurrence.
    pub occurrence: Option<usize>,
}

/// The color resolution for one token.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ResolvedColor {
    /// The whole token renders in one color.
    Solid(String),

    /// A fraction whose halves were recolored token by token. Each half is
    /// the reassembled interior where colored tokens are wrapped in a scoped
    /// `\color` directive and uncolored tokens are left bare.
    FractionParts {
        numerator: String,
        denominator: String,
    },
}

/// Resolves the display color of every token in the sequence.
///
/// Occurrence counting is scoped to this one call: the counter starts at
/// zero, is threaded through the two halves of every fraction, and is
/// discarded on return. Nothing persists across renders.
pub fn resolve_colors(tokens: &[Token], rules: &Highlights) -> Vec<ResolvedColor> {
    let mut occurrences = HashMap::new();

    tokens
        .iter()
        .map(|token| match &token.kind {
            TokenKind::Fraction {
                numerator_inner,
                denominator_inner,
            } => ResolvedColor::FractionParts {
                numerator: color_fraction_part(numerator_inner, rules, &mut occurrences),
                denominator: color_fraction_part(denominator_inner, rules, &mut occurrences),
            },
            _ => ResolvedColor::Solid(color_for(&token.content, rules, &mut occurrences)),
        })
        .collect()
}

/// Resolves the color for a single content.
///
/// For list rules this advances the content's occurrence counter whenever
/// any rule's pattern matched the content, even if that rule's occurrence
/// index did not. The counter tracks "how many times this content has been
/// seen by a matching rule", not "how many times it appeared".
fn color_for(
    content: &str,
    rules: &Highlights,
    occurrences: &mut HashMap<String, usize>,
) -> String {
    let clean = strip_whitespace(content);

    match rules {
        Highlights::Map(map) => map
            .iter()
            .find(|(pattern, _)| strip_whitespace(pattern) == clean)
            .map(|(_, color)| color.clone())
            .unwrap_or_else(|| DEFAULT_COLOR.to_owned()),
        Highlights::List(list) => {
            let seen = occurrences.entry(clean.clone()).or_insert(0);
            let mut color = None;
            let mut pattern_matched = false;

            for rule in list {
                if strip_whitespace(&rule.pattern) != clean {
                    continue;
                }
                pattern_matched = true;

                if rule.occurrence.is_none() || rule.occurrence == Some(*seen) {
                    color = Some(rule.color.clone());
                    break;
                }
            }

            if pattern_matched {
                *seen += 1;
            }

            color.unwrap_or_else(|| DEFAULT_COLOR.to_owned())
        }
    }
}

/// Recolors one half of a fraction. The interior is tokenized on its own,
/// every token is resolved through the same occurrence counter as the rest
/// of the equation, and the result is reassembled with single spaces between
/// tokens.
fn color_fraction_part(
    inner: &str,
    rules: &Highlights,
    occurrences: &mut HashMap<String, usize>,
) -> String {
    let mut out = String::new();

    for (i, token) in tokenize(inner).iter().enumerate() {
        let color = color_for(&token.content, rules, occurrences);

        if i > 0 {
            out.push(' ');
        }
        if color == DEFAULT_COLOR {
            out.push_str(&token.content);
        } else {
            // braces limit the scope of the color directive to this token
            let _ = write!(out, "{{\\color{{{color}}}{}}}", token.content);
        }
    }

    out
}

/// Removes all whitespace from the given string.
fn strip_whitespace(s: &str) -> String {
    s.chars().filter(|c| !c.is_whitespace()).collect()
}
