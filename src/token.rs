use serde::Serialize;
use std::fmt;

/// Reserved words. These are classified as [`TokenKind::Keyword`] even though
/// they match the identifier pattern.
pub const KEYWORDS: [&str; 21] = [
    "def", "class", "import", "if", "elif", "else", "while", "for", "in",
    "try", "except", "finally", "pass", "break", "return", "and", "or", "not",
    "True", "False", "None",
];

/// Operators, longest first so the lexer can match greedily.
pub const OPERATORS: [&str; 32] = [
    "//=", "**=", ">>=", "<<=", //
    "//", "**", "==", "!=", "<=", ">=", "+=", "-=", "*=", "/=", "%=", "&=",
    "|=", "^=", ">>", "<<", //
    "+", "-", "*", "/", "%", "<", ">", "=", "&", "|", "^", "~",
];

/// Punctuation characters.
pub const PUNCTUATION: [&str; 10] = ["(", ")", "[", "]", "{", "}", ":", ",", ".", ";"];

/// Keywords that begin a compound construct. Used by the parser to end a
/// block heuristically.
pub const CONSTRUCT_KEYWORDS: [&str; 7] =
    ["def", "class", "if", "for", "while", "try", "import"];

/// The category of a [`Token`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum TokenKind {
    Keyword,
    Identifier,
    Constant,
    Literal,
    Operator,
    Punctuation,
    EndOfInput,
}

impl TokenKind {
    /// Maximum length of an operator or punctuation lexeme, in graphemes.
    pub(crate) const LOOKAHEAD_DEPTH: usize = 3;

    /// All kinds that occur in source text, in display order.
    pub const SOURCE_KINDS: [TokenKind; 6] = [
        TokenKind::Keyword,
        TokenKind::Identifier,
        TokenKind::Constant,
        TokenKind::Literal,
        TokenKind::Operator,
        TokenKind::Punctuation,
    ];

    /// Classifies a reserved lexeme as operator or punctuation.
    pub(crate) fn from_symbol(symbol: &str) -> Option<Self> {
        if OPERATORS.contains(&symbol) {
            Some(TokenKind::Operator)
        } else if PUNCTUATION.contains(&symbol) {
            Some(TokenKind::Punctuation)
        } else {
            None
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TokenKind::Keyword => "keyword",
            TokenKind::Identifier => "identifier",
            TokenKind::Constant => "constant",
            TokenKind::Literal => "literal",
            TokenKind::Operator => "operator",
            TokenKind::Punctuation => "punctuation",
            TokenKind::EndOfInput => "end-of-input",
        };

        write!(f, "{}", name)
    }
}

/// Minimal lexical unit: a kind, its literal text and where it starts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Token {
    kind: TokenKind,
    lexeme: String,
    line_no: usize,
    col_no: usize,
}

impl Token {
    /// Create a new [`Token`].
    pub fn new<S: Into<String>>(
        kind: TokenKind,
        lexeme: S,
        line_no: usize,
        col_no: usize,
    ) -> Self {
        Self {
            kind,
            lexeme: lexeme.into(),
            line_no,
            col_no,
        }
    }

    /// Create the terminating [`Token`].
    pub fn end_of_input(line_no: usize, col_no: usize) -> Self {
        Self::new(TokenKind::EndOfInput, "", line_no, col_no)
    }

    pub fn kind(&self) -> TokenKind {
        self.kind
    }

    pub fn lexeme(&self) -> &str {
        &self.lexeme
    }

    pub fn line_no(&self) -> usize {
        self.line_no
    }

    pub fn col_no(&self) -> usize {
        self.col_no
    }

    /// Whether this token has `kind` and exactly the text `lexeme`.
    pub fn is(&self, kind: TokenKind, lexeme: &str) -> bool {
        self.kind == kind && self.lexeme == lexeme
    }

    pub fn is_keyword(&self, keyword: &str) -> bool {
        self.is(TokenKind::Keyword, keyword)
    }

    pub fn is_punctuation(&self, punctuation: &str) -> bool {
        self.is(TokenKind::Punctuation, punctuation)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.kind == TokenKind::EndOfInput {
            write!(f, "{}", self.kind)
        } else {
            write!(f, r#"{} "{}""#, self.kind, self.lexeme)
        }
    }
}
