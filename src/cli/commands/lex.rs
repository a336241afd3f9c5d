use super::{load_script, print_json};
use crate::cli::args::ScriptArgs;
use crate::token::{Token, TokenKind};
use anyhow::Result;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Serialize)]
struct LexReport<'a> {
    tokens: &'a [Token],
    lexemes: BTreeMap<TokenKind, Vec<&'a str>>,
    counts: &'a BTreeMap<TokenKind, usize>,
    total: usize,
}

pub(crate) struct Lex;

impl Lex {
    pub(crate) fn run(args: &ScriptArgs) -> Result<()> {
        let script = load_script(args)?;
        let tokenized = script.tokenized();

        let report = LexReport {
            tokens: tokenized.tokens(),
            lexemes: tokenized.lexemes_by_kind(),
            counts: tokenized.counts(),
            total: tokenized.total(),
        };

        if args.json {
            return print_json(&report);
        }

        for token in report.tokens {
            println!(
                "{}:{} {} \"{}\"",
                token.line_no(),
                token.col_no(),
                token.kind(),
                token.lexeme()
            );
        }

        println!();

        for (kind, lexemes) in &report.lexemes {
            println!(
                "{} ({}): {}",
                kind,
                report.counts.get(kind).copied().unwrap_or_default(),
                lexemes.join(" ")
            );
        }

        println!("Total: {}", report.total);

        Ok(())
    }
}
