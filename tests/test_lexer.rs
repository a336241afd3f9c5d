use anyhow::Result;
use minipy::{tokenize, LexerError, TokenKind};

mod common;

#[test]
fn lexer_script_counts() -> Result<()> {
    let tokenized = tokenize(&common::get_script("heuristic.py")?)?;

    let counts = tokenized.counts();
    assert_eq!(counts[&TokenKind::Keyword], 4);
    assert_eq!(counts[&TokenKind::Literal], 1);
    assert!(!counts.contains_key(&TokenKind::EndOfInput));

    assert_eq!(tokenized.total(), counts.values().sum::<usize>());
    assert_eq!(tokenized.tokens().len(), tokenized.total() + 1);
    Ok(())
}

#[test]
fn lexer_unique_lexemes() -> Result<()> {
    let tokenized = tokenize("x = x + 1\ny = 'a' + 'a'")?;
    let lexemes = tokenized.lexemes_by_kind();

    assert_eq!(lexemes[&TokenKind::Identifier], ["x", "y"]);
    assert_eq!(lexemes[&TokenKind::Operator], ["=", "+"]);
    assert_eq!(lexemes[&TokenKind::Literal], ["'a'"]);
    Ok(())
}

#[test]
fn lexer_error_position() {
    match tokenize("x = 1\ny = $") {
        Err(error @ LexerError::UnrecognizedCharacter { .. }) => {
            assert_eq!(error.fragment(), "$");
            assert_eq!(error.position(), (2, 5));
        }
        other => panic!("Expected UnrecognizedCharacter, got {:?}", other),
    }
}
