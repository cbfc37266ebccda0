use eqstep_parser::Token;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// A cross-step identity for a token.
///
/// The id has no meaning beyond identity: two tokens from two different
/// derivation steps carrying the same `LayoutId` are the same visual element
/// as far as the animation layer is concerned, and it may move one into the
/// other instead of replacing it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum LayoutId {
    /// The token continues a token from the previous step. The inner id is
    /// the sequence id at the root of the lineage, passed through unchanged
    /// across any number of steps.
    Inherited(u32),

    /// The token has no predecessor; the inner id is its own sequence id.
    Fresh(u32),
}

impl LayoutId {
    /// The underlying id, regardless of how the identity was obtained.
    pub fn id(self) -> u32 {
        match self {
            Self::Inherited(id) | Self::Fresh(id) => id,
        }
    }

    /// Returns true if the identity was minted in the current step. The
    /// rendering layer fades these tokens in instead of moving them.
    pub fn is_new(self) -> bool {
        matches!(self, Self::Fresh(_))
    }
}

/// A token annotated with the layout identity it should render under.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MatchedToken {
    /// The token itself, untouched tokenizer output.
    pub token: Token,

    /// The identity assigned by the matcher.
    pub layout_id: LayoutId,
}

/// Lifts the first equation of a derivation into matched tokens, minting a
/// fresh identity for each. Every later step goes through [`match_tokens`]
/// against the step before it.
pub fn seed(tokens: Vec<Token>) -> Vec<MatchedToken> {
    tokens
        .into_iter()
        .map(|token| MatchedToken {
            layout_id: LayoutId::Fresh(token.sequence_id),
            token,
        })
        .collect()
}

/// Links each token of the next step to the previous step's token it evolved
/// from, so the rendering layer can animate continuity instead of replacing
/// everything.
///
/// Matching runs in two passes, and each previous token can be claimed by at
/// most one next token:
///
/// 1. **Exact pass**: the first unclaimed previous token with identical kind
///    and content.
/// 2. **Similarity pass**: for tokens still unmatched, the first unclaimed
///    previous token of the same kind whose content shares the leading
///    alphabetic base (`x_n` and `x_{n+1}` both reduce to `x`).
///
/// Both passes take the first qualifying previous token in array order, not
/// the nearest one by position. A matched token inherits the previous
/// token's identity as [`LayoutId::Inherited`]; anything left unmatched gets
/// a [`LayoutId::Fresh`] identity. Matching cannot fail; the worst case is
/// that every token is treated as new.
pub fn match_tokens(prev: &[MatchedToken], next: Vec<Token>) -> Vec<MatchedToken> {
    let mut claimed = vec![false; prev.len()];
    let mut annotated: Vec<(Token, Option<LayoutId>)> =
        next.into_iter().map(|token| (token, None)).collect();

    // exact pass
    for (token, layout_id) in annotated.iter_mut() {
        let found = prev.iter().enumerate().find(|(i, p)| {
            !claimed[*i] && p.token.kind == token.kind && p.token.content == token.content
        });

        if let Some((i, p)) = found {
            claimed[i] = true;
            *layout_id = Some(LayoutId::Inherited(p.layout_id.id()));
        }
    }

    // similarity pass
    for (token, layout_id) in annotated.iter_mut() {
        if layout_id.is_some() {
            continue;
        }

        let found = prev.iter().enumerate().find(|(i, p)| {
            !claimed[*i]
                && p.token.kind.same_variant(&token.kind)
                && share_base(&p.token.content, &token.content)
        });

        if let Some((i, p)) = found {
            claimed[i] = true;
            *layout_id = Some(LayoutId::Inherited(p.layout_id.id()));
        }
    }

    annotated
        .into_iter()
        .map(|(token, layout_id)| MatchedToken {
            layout_id: layout_id.unwrap_or(LayoutId::Fresh(token.sequence_id)),
            token,
        })
        .collect()
}

/// Returns true if both contents start with the same non-empty alphabetic
/// base, e.g. `x_n` and `x_{n+1}`.
fn share_base(a: &str, b: &str) -> bool {
    let base = alphabetic_base(a);
    !base.is_empty() && base == alphabetic_base(b)
}

/// The maximal leading run of alphabetic characters of the content. Empty
/// for contents that open with a backslash, brace or digit.
fn alphabetic_base(content: &str) -> &str {
    let end = content
        .find(|c: char| !c.is_ascii_alphabetic())
        .unwrap_or(content.len());
    &content[..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use eqstep_parser::tokenize;
    use pretty_assertions::assert_eq;

    /// Matches two equation strings and returns the layout ids assigned to
    /// the second one's tokens.
    fn ids_after_step(prev: &str, next: &str) -> Vec<LayoutId> {
        let prev = seed(tokenize(prev));
        match_tokens(&prev, tokenize(next))
            .into_iter()
            .map(|matched| matched.layout_id)
            .collect()
    }

    #[test]
    fn exact_match_keeps_identity() {
        assert_eq!(ids_after_step("x_n", "x_n"), vec![LayoutId::Inherited(0)]);
    }

    #[test]
    fn similar_term_keeps_identity() {
        assert_eq!(
            ids_after_step("x_n", "x_{n+1}"),
            vec![LayoutId::Inherited(0)],
        );
    }

    #[test]
    fn unmatched_token_is_new() {
        assert_eq!(ids_after_step("y", "z"), vec![LayoutId::Fresh(0)]);
        assert!(ids_after_step("y", "z")[0].is_new());
    }

    #[test]
    fn each_previous_token_claimed_once() {
        // both `x`s survive, each claiming its own predecessor in order
        assert_eq!(
            ids_after_step("x + x", "x + x"),
            vec![
                LayoutId::Inherited(0),
                LayoutId::Inherited(1),
                LayoutId::Inherited(2),
            ],
        );
    }

    #[test]
    fn extra_similar_token_is_new() {
        // `x_n` claims the only predecessor; `x_m` has nothing left to claim
        assert_eq!(
            ids_after_step("x_n", "x_n + x_m"),
            vec![
                LayoutId::Inherited(0),
                LayoutId::Fresh(1),
                LayoutId::Fresh(2),
            ],
        );
    }

    #[test]
    fn operator_command_never_similar_to_term() {
        // `\cdot` has no alphabetic base and a different kind; `c` cannot
        // inherit from it
        let prev = seed(tokenize("\\cdot"));
        let matched = match_tokens(&prev, tokenize("c"));

        assert_eq!(matched[0].layout_id, LayoutId::Fresh(0));
    }

    #[test]
    fn identity_passes_through_multiple_steps() {
        let first = seed(tokenize("x_n"));
        let second = match_tokens(&first, tokenize("x_{n+1}"));
        let third = match_tokens(&second, tokenize("x_{n+2}"));

        // the lineage still points at the original token
        assert_eq!(third[0].layout_id, LayoutId::Inherited(0));
    }

    #[test]
    fn substitution_step() {
        // the `=` and the operators survive the P -> Kx substitution; the
        // substituted terms come in fresh
        let ids = ids_after_step(
            "P_{n+1} = P_n + r \\cdot P_n",
            "K x_{n+1} = K x_n + r \\cdot K x_n",
        );

        let new_count = ids.iter().filter(|id| id.is_new()).count();
        assert_eq!(ids.len(), 10);
        // `=`, `+`, `r`, `\cdot` carry over
        assert_eq!(new_count, 6);
    }

    #[test]
    fn first_in_array_order_wins() {
        // the first unclaimed `x`-based predecessor is taken even when a
        // positionally closer one exists
        let prev = seed(tokenize("x_a + x_b"));
        let matched = match_tokens(&prev, tokenize("x_b"));

        // exact pass claims `x_b` directly, so order only decides among
        // similarity candidates
        assert_eq!(matched[0].layout_id, LayoutId::Inherited(2));

        let prev = seed(tokenize("x_a + x_b"));
        let matched = match_tokens(&prev, tokenize("x_c"));

        // no exact match: the similarity pass takes `x_a`, the first in
        // array order
        assert_eq!(matched[0].layout_id, LayoutId::Inherited(0));
    }
}
