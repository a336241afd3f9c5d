use crate::error::LexerError;
use crate::token::{Token, TokenKind, KEYWORDS};
use log::{debug, trace};
use lookahead::{Lookahead, WithLookahead};
use serde::Serialize;
use std::collections::BTreeMap;
use unicode_segmentation::{Graphemes, UnicodeSegmentation};

type Result<T> = std::result::Result<T, LexerError>;

const QUOTES: [&str; 2] = ["\"", "'"];
const FORMAT_PREFIXES: [&str; 2] = ["f", "F"];

fn is_digit(grapheme: &str) -> bool {
    grapheme.chars().all(|c| c.is_ascii_digit())
}

fn is_word_start(grapheme: &str) -> bool {
    grapheme.starts_with(|c: char| c.is_alphabetic() || c == '_')
}

fn is_word_part(grapheme: &str) -> bool {
    grapheme.chars().all(|c| c.is_alphanumeric() || c == '_')
}

/// Turns source text into [`Token`]s, one grapheme at a time.
///
/// The iterator yields `Err` at most once; nothing is lexed past an error.
pub struct Lexer<'a> {
    buffer: Lookahead<Graphemes<'a>>,
    line_no: usize,
    col_no: usize,
    failed: bool,
}

impl<'a> Iterator for Lexer<'a> {
    type Item = Result<Token>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        self.skip_insignificant();
        self.buffer.peek()?;

        let result = self
            .handle_literal()
            .transpose()
            .or_else(|| self.handle_number().transpose())
            .or_else(|| self.handle_word().map(Ok))
            .or_else(|| self.handle_reserved().map(Ok))
            .unwrap_or_else(|| Err(self.unrecognized()));

        trace!("{:?}", result);

        self.failed = result.is_err();
        Some(result)
    }
}

impl<'a> Lexer<'a> {
    pub fn new<S: AsRef<str> + ?Sized>(input_text: &'a S) -> Self {
        let input_text = input_text.as_ref();

        debug!("Creating lexer:\n{}", input_text);

        Self {
            buffer: input_text.graphemes(true).lookahead(),
            line_no: 1,
            col_no: 1,
            failed: false,
        }
    }

    /// Line and column of the next grapheme.
    pub fn position(&self) -> (usize, usize) {
        (self.line_no, self.col_no)
    }

    fn advance(&mut self, amount: usize) {
        for _ in 0..amount {
            match self.buffer.next() {
                Some(grapheme) if grapheme.contains('\n') => {
                    self.line_no += 1;
                    self.col_no = 1;
                }
                Some(_) => self.col_no += 1,
                None => break,
            }
        }
    }

    /// Consumes graphemes up to, not including, the first one matching
    /// `terminator`, or up to the end of input.
    fn crawl<P>(&mut self, terminator: P) -> String
    where
        P: Fn(&&str) -> bool,
    {
        let amount = match self.buffer.find_ahead(&terminator) {
            Some(i) => i,
            None => self.buffer.peek_slice(usize::MAX).len(),
        };

        let string = self.buffer.peek_slice(amount).concat();
        trace!(r#"Crawl: "{}""#, string);
        self.advance(amount);

        string
    }

    fn skip_insignificant(&mut self) {
        while let Some(grapheme) = self.buffer.peek().copied() {
            if grapheme.chars().all(char::is_whitespace) {
                self.advance(1);
            } else if grapheme == "#" {
                let comment = self.crawl(|g| g.contains('\n'));
                trace!("Skipping comment: {}", comment);
            } else {
                break;
            }
        }
    }

    fn handle_literal(&mut self) -> Result<Option<Token>> {
        let (line_no, col_no) = (self.line_no, self.col_no);

        let prefix_len = match self.buffer.peek_slice(2) {
            [quote, ..] if QUOTES.contains(quote) => 0,
            [prefix, quote]
                if FORMAT_PREFIXES.contains(prefix) && QUOTES.contains(quote) =>
            {
                1
            }
            _ => return Ok(None),
        };

        let quote: &str = match self.buffer.peek_nth(prefix_len).copied() {
            Some(quote) => quote,
            None => return Ok(None),
        };

        let mut lexeme = self.buffer.peek_slice(prefix_len + 1).concat();
        self.advance(prefix_len + 1);

        let end = self
            .buffer
            .find_ahead(|g| *g == quote || g.contains('\n'));

        match end {
            Some(i) if self.buffer.peek_nth(i) == Some(&quote) => {
                lexeme += &self.buffer.peek_slice(i + 1).concat();
                self.advance(i + 1);

                Ok(Some(Token::new(TokenKind::Literal, lexeme, line_no, col_no)))
            }
            _ => {
                lexeme += &self.crawl(|g| g.contains('\n'));

                Err(LexerError::UnterminatedLiteral {
                    fragment: lexeme,
                    line_no,
                    col_no,
                })
            }
        }
    }

    fn handle_number(&mut self) -> Result<Option<Token>> {
        let (line_no, col_no) = (self.line_no, self.col_no);

        if !self.buffer.peek().map_or(false, |g| is_digit(g)) {
            return Ok(None);
        }

        let mut lexeme = self.crawl(|g| !is_digit(g));

        let fractional = matches!(
            self.buffer.peek_slice(2),
            [dot, digit] if *dot == "." && is_digit(digit)
        );

        if fractional {
            self.advance(1);
            lexeme.push('.');
            lexeme += &self.crawl(|g| !is_digit(g));
        } else if lexeme.parse::<i64>().is_err() {
            return Err(LexerError::NumberOutOfRange {
                fragment: lexeme,
                line_no,
                col_no,
            });
        }

        Ok(Some(Token::new(TokenKind::Constant, lexeme, line_no, col_no)))
    }

    fn handle_word(&mut self) -> Option<Token> {
        let (line_no, col_no) = (self.line_no, self.col_no);

        if !self.buffer.peek().map_or(false, |g| is_word_start(g)) {
            return None;
        }

        let word = self.crawl(|g| !is_word_part(g));

        let kind = if KEYWORDS.contains(&word.as_str()) {
            TokenKind::Keyword
        } else {
            TokenKind::Identifier
        };

        Some(Token::new(kind, word, line_no, col_no))
    }

    fn handle_reserved(&mut self) -> Option<Token> {
        let (line_no, col_no) = (self.line_no, self.col_no);

        for length in (1..=TokenKind::LOOKAHEAD_DEPTH).rev() {
            let graphemes = self.buffer.peek_slice(length);

            if graphemes.len() != length {
                continue;
            }

            let symbol = graphemes.concat();
            trace!("Checking reserved symbols for {}", symbol);

            if let Some(kind) = TokenKind::from_symbol(&symbol) {
                self.advance(length);
                return Some(Token::new(kind, symbol, line_no, col_no));
            }
        }

        None
    }

    fn unrecognized(&mut self) -> LexerError {
        let fragment = self
            .buffer
            .peek()
            .map(ToString::to_string)
            .unwrap_or_default();

        LexerError::UnrecognizedCharacter {
            fragment,
            line_no: self.line_no,
            col_no: self.col_no,
        }
    }
}

/// Output of [`tokenize`]: the tokens, terminated by
/// [`TokenKind::EndOfInput`], and how often each kind occurs.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Tokenized {
    tokens: Vec<Token>,
    counts: BTreeMap<TokenKind, usize>,
}

impl Tokenized {
    fn new(tokens: Vec<Token>) -> Self {
        let mut counts: BTreeMap<TokenKind, usize> =
            TokenKind::SOURCE_KINDS.iter().map(|k| (*k, 0)).collect();

        for token in &tokens {
            if let Some(count) = counts.get_mut(&token.kind()) {
                *count += 1;
            }
        }

        Self { tokens, counts }
    }

    pub fn tokens(&self) -> &[Token] {
        &self.tokens
    }

    pub fn into_tokens(self) -> Vec<Token> {
        self.tokens
    }

    /// Occurrences per kind. [`TokenKind::EndOfInput`] is not counted.
    pub fn counts(&self) -> &BTreeMap<TokenKind, usize> {
        &self.counts
    }

    /// Number of tokens, excluding [`TokenKind::EndOfInput`].
    pub fn total(&self) -> usize {
        self.counts.values().sum()
    }

    /// Unique lexemes per kind, in order of first appearance.
    pub fn lexemes_by_kind(&self) -> BTreeMap<TokenKind, Vec<&str>> {
        let mut lexemes: BTreeMap<TokenKind, Vec<&str>> = TokenKind::SOURCE_KINDS
            .iter()
            .map(|k| (*k, Vec::new()))
            .collect();

        for token in &self.tokens {
            if let Some(seen) = lexemes.get_mut(&token.kind()) {
                if !seen.contains(&token.lexeme()) {
                    seen.push(token.lexeme());
                }
            }
        }

        lexemes
    }
}

/// Lexes all of `source`.
pub fn tokenize(source: &str) -> Result<Tokenized> {
    let mut lexer = Lexer::new(source);
    let mut tokens = Vec::new();

    for result in &mut lexer {
        tokens.push(result?);
    }

    let (line_no, col_no) = lexer.position();
    tokens.push(Token::end_of_input(line_no, col_no));

    debug!("Lexed {} tokens", tokens.len());

    Ok(Tokenized::new(tokens))
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{bail, Result};

    static DOUBLE_QUOTED_STRING: &str = r#""This is a double-quoted string""#;
    static SINGLE_QUOTED_STRING: &str = "'This is a single-quoted string'";
    static FORMAT_STRING: &str = r#"f"Hello {name}""#;
    static NEWLINE_IN_STRING: &str = "'This is a string \n with a newline'";
    static UNTERMINATED_STRING: &str = r#""This is an unterminated string"#;

    fn kinds_and_lexemes(input: &str) -> Result<Vec<(TokenKind, String)>> {
        Ok(tokenize(input)?
            .into_tokens()
            .into_iter()
            .map(|t| (t.kind(), t.lexeme().to_string()))
            .collect())
    }

    fn single_token_test(input: &str, expected: TokenKind) -> Result<Token> {
        let mut tokens = tokenize(input)?.into_tokens();

        if tokens.len() != 2 {
            bail!("Expected one token and end-of-input, got {:?}", tokens);
        }

        let token = tokens.remove(0);
        assert_eq!(token.kind(), expected, "{:?}", token);
        assert_eq!(token.lexeme(), input);

        Ok(token)
    }

    mod literals {
        use super::*;

        #[test]
        fn lexer_string_test() -> Result<()> {
            for string in &[SINGLE_QUOTED_STRING, DOUBLE_QUOTED_STRING] {
                single_token_test(string, TokenKind::Literal)?;
            }

            Ok(())
        }

        #[test]
        fn lexer_format_string_test() -> Result<()> {
            single_token_test(FORMAT_STRING, TokenKind::Literal)?;
            Ok(())
        }

        #[test]
        fn lexer_other_quote_inside_string_test() -> Result<()> {
            single_token_test(r#""it's""#, TokenKind::Literal)?;
            Ok(())
        }

        #[test]
        fn lexer_newline_in_string_test() -> Result<()> {
            match tokenize(NEWLINE_IN_STRING) {
                Err(LexerError::UnterminatedLiteral {
                    fragment,
                    line_no,
                    col_no,
                }) => {
                    assert_eq!(fragment, "'This is a string ");
                    assert_eq!((line_no, col_no), (1, 1));
                    Ok(())
                }
                other => bail!("Expected UnterminatedLiteral, got {:?}", other),
            }
        }

        #[test]
        fn lexer_unterminated_string_test() -> Result<()> {
            match tokenize(UNTERMINATED_STRING) {
                Err(err @ LexerError::UnterminatedLiteral { .. }) => {
                    assert_eq!(err.fragment(), UNTERMINATED_STRING);
                    Ok(())
                }
                other => bail!("Expected UnterminatedLiteral, got {:?}", other),
            }
        }
    }

    mod constants {
        use super::*;

        #[test]
        fn lexer_integer_test() -> Result<()> {
            single_token_test("42", TokenKind::Constant)?;
            Ok(())
        }

        #[test]
        fn lexer_decimal_test() -> Result<()> {
            single_token_test("3.25", TokenKind::Constant)?;
            Ok(())
        }

        #[test]
        fn lexer_trailing_dot_test() -> Result<()> {
            let tokens = kinds_and_lexemes("7.")?;

            assert_eq!(tokens[0], (TokenKind::Constant, "7".to_string()));
            assert_eq!(tokens[1], (TokenKind::Punctuation, ".".to_string()));
            Ok(())
        }

        #[test]
        fn lexer_out_of_range_test() -> Result<()> {
            match tokenize("x = 99999999999999999999") {
                Err(LexerError::NumberOutOfRange { col_no, .. }) => {
                    assert_eq!(col_no, 5);
                    Ok(())
                }
                other => bail!("Expected NumberOutOfRange, got {:?}", other),
            }
        }
    }

    mod words {
        use super::*;

        #[test]
        fn lexer_keywords_test() -> Result<()> {
            for keyword in KEYWORDS {
                single_token_test(keyword, TokenKind::Keyword)?;
            }

            Ok(())
        }

        #[test]
        fn lexer_identifier_test() -> Result<()> {
            single_token_test("_private1", TokenKind::Identifier)?;
            single_token_test("as", TokenKind::Identifier)?;
            single_token_test("define", TokenKind::Identifier)?;
            Ok(())
        }
    }

    mod reserved {
        use super::*;

        #[test]
        fn lexer_longest_operator_test() -> Result<()> {
            let tokens = kinds_and_lexemes("a //= b ** c")?;
            let operators: Vec<&str> = tokens
                .iter()
                .filter(|(k, _)| *k == TokenKind::Operator)
                .map(|(_, l)| l.as_str())
                .collect();

            assert_eq!(operators, ["//=", "**"]);
            Ok(())
        }

        #[test]
        fn lexer_punctuation_test() -> Result<()> {
            for symbol in ["(", ")", "[", "]", "{", "}", ":", ",", "."] {
                single_token_test(symbol, TokenKind::Punctuation)?;
            }

            Ok(())
        }

        #[test]
        fn lexer_unrecognized_character_test() -> Result<()> {
            match tokenize("x = 1\ny = ?") {
                Err(err @ LexerError::UnrecognizedCharacter { .. }) => {
                    assert_eq!(err.fragment(), "?");
                    assert_eq!(err.position(), (2, 5));
                    Ok(())
                }
                other => {
                    bail!("Expected UnrecognizedCharacter, got {:?}", other)
                }
            }
        }
    }

    #[test]
    fn lexer_statement_test() -> Result<()> {
        let tokens = kinds_and_lexemes("def f(a):\n    return a + 1")?;

        let expected = [
            (TokenKind::Keyword, "def"),
            (TokenKind::Identifier, "f"),
            (TokenKind::Punctuation, "("),
            (TokenKind::Identifier, "a"),
            (TokenKind::Punctuation, ")"),
            (TokenKind::Punctuation, ":"),
            (TokenKind::Keyword, "return"),
            (TokenKind::Identifier, "a"),
            (TokenKind::Operator, "+"),
            (TokenKind::Constant, "1"),
            (TokenKind::EndOfInput, ""),
        ];

        assert_eq!(tokens.len(), expected.len());

        for (token, (kind, lexeme)) in tokens.iter().zip(expected) {
            assert_eq!(token.0, kind);
            assert_eq!(token.1, lexeme);
        }

        Ok(())
    }

    #[test]
    fn lexer_comments_and_positions_test() -> Result<()> {
        let tokenized = tokenize("# leading comment\nx = 1 # trailing\n  y")?;
        let tokens = tokenized.tokens();

        assert_eq!(tokens.len(), 5);
        assert_eq!((tokens[0].line_no(), tokens[0].col_no()), (2, 1));
        assert_eq!((tokens[3].line_no(), tokens[3].col_no()), (3, 3));
        assert_eq!(tokens[4].kind(), TokenKind::EndOfInput);

        Ok(())
    }

    #[test]
    fn lexer_counts_test() -> Result<()> {
        let tokenized = tokenize("x = x + 1\nprint(x)")?;

        assert_eq!(tokenized.counts()[&TokenKind::Identifier], 4);
        assert_eq!(tokenized.counts()[&TokenKind::Operator], 2);
        assert_eq!(tokenized.counts()[&TokenKind::Constant], 1);
        assert_eq!(tokenized.counts()[&TokenKind::Punctuation], 2);
        assert_eq!(tokenized.counts()[&TokenKind::Keyword], 0);
        assert_eq!(tokenized.total(), 9);

        let lexemes = tokenized.lexemes_by_kind();
        assert_eq!(lexemes[&TokenKind::Identifier], ["x", "print"]);

        Ok(())
    }
}
