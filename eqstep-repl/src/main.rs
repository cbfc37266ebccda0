use eqstep_motion::{match_tokens, seed, LayoutId, MatchedToken};
use eqstep_parser::tokenize;
use rustyline::{error::ReadlineError, DefaultEditor};
use std::{fs::File, io::{self, BufReader, IsTerminal, Read}};

/// Tokenizes one derivation step and matches it against the step before it,
/// printing how each token will animate. Returns the matched tokens so the
/// next step can diff against them.
fn step(input: &str, prev: Option<Vec<MatchedToken>>) -> Vec<MatchedToken> {
    let tokens = tokenize(input);
    let matched = match prev {
        Some(prev) => match_tokens(&prev, tokens),
        None => seed(tokens),
    };

    for entry in &matched {
        let motion = match entry.layout_id {
            LayoutId::Inherited(id) => format!("moves as #{id}"),
            LayoutId::Fresh(_) => "fades in".to_owned(),
        };
        println!("  {:<20} {:<12} {}", entry.token.content, kind_name(&entry.token), motion);
    }

    matched
}

/// A short label for the token's kind, for the printed table.
fn kind_name(token: &eqstep_parser::Token) -> &'static str {
    use eqstep_parser::TokenKind::*;

    match token.kind {
        Operator => "operator",
        Paren => "paren",
        Term => "term",
        Fraction { .. } => "fraction",
        Sqrt { .. } => "sqrt",
        Text => "text",
        Command => "command",
        Group { .. } => "group",
        LeftDelim => "left-delim",
        RightDelim => "right-delim",
    }
}

/// Runs every non-empty line of the input as one derivation step.
fn run_derivation(input: &str) {
    let mut prev = None;

    for line in input.lines() {
        if line.trim().is_empty() {
            continue;
        }
        println!("{line}");
        prev = Some(step(line, prev.take()));
    }
}

fn main() {
    let mut args = std::env::args();
    args.next();

    if let Some(filename) = args.next() {
        // run a derivation file, one equation per line
        let mut file = BufReader::new(File::open(filename).unwrap());
        let mut input = String::new();
        file.read_to_string(&mut input).unwrap();

        run_derivation(&input);
    } else if !io::stdin().is_terminal() {
        // read the derivation from stdin
        let mut input = String::new();
        io::stdin().read_to_string(&mut input).unwrap();

        run_derivation(&input);
    } else {
        // interactive mode: each entered equation is diffed against the one
        // before it; a blank line starts a new derivation
        let mut rl = DefaultEditor::new().unwrap();
        let mut prev: Option<Vec<MatchedToken>> = None;

        loop {
            match rl.readline("eq> ") {
                Ok(input) => {
                    if input.trim().is_empty() {
                        prev = None;
                        continue;
                    }
                    let _ = rl.add_history_entry(&input);
                    prev = Some(step(&input, prev.take()));
                }
                Err(ReadlineError::Eof | ReadlineError::Interrupted) => break,
                Err(err) => {
                    eprintln!("{}", err);
                    break;
                }
            }
        }
    }
}
