use logos::Logos;
use std::fmt;
use std::rc::Rc;

/// Raw lexical categories recognised by the generated scanner.
/// The `#[derive(Logos)]` macro from the `logos` crate generates the matcher;
/// [`crate::lexer::Lexer`] turns these into positioned [`Token`]s.
#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")] // Ignore whitespace, positions are recomputed from offsets
#[logos(skip r"//[^\n]*")] // Line comments
pub enum RawToken {
    // Words are classified against the lexer's reserved-word table.
    #[regex("[a-zA-Z_][a-zA-Z0-9_]*")]
    Word,

    #[regex("[0-9]+")]
    Integer,

    #[regex(r#""[^"\n]*""#)]
    String,

    // Matches only when the closing quote is missing before a newline or EOF.
    #[regex(r#""[^"\n]*"#)]
    UnterminatedString,

    // Nested block comments are consumed by the lexer wrapper.
    #[token("/*")]
    BlockCommentStart,

    #[token("==")]
    EqualEqual,

    #[token("!=")]
    BangEqual,

    #[token("<=")]
    LessEqual,

    #[token(">=")]
    GreaterEqual,

    #[token("&&")]
    AndAnd,

    #[token("||")]
    OrOr,

    #[token("->")]
    Arrow,

    #[token("=")]
    Equal,

    #[token("!")]
    Bang,

    #[token("<")]
    Less,

    #[token(">")]
    Greater,

    #[token("+")]
    Plus,

    #[token("-")]
    Minus,

    #[token("*")]
    Star,

    #[token("/")]
    Slash,

    #[token("(")]
    LeftParen,

    #[token(")")]
    RightParen,

    #[token("{")]
    LeftBrace,

    #[token("}")]
    RightBrace,

    #[token(",")]
    Comma,

    #[token(";")]
    Semicolon,
}

/// Token categories seen by the parser.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenKind {
    // Literals
    Identifier,
    Integer,
    String,

    // Keywords
    Var,
    Fun,
    Return,
    If,
    Else,
    While,
    For,
    Include,
    True,
    False,
    Null,
    Print,

    // Operators
    Plus,
    Minus,
    Star,
    Slash,
    Bang,
    Equal,
    EqualEqual,
    BangEqual,
    Less,
    LessEqual,
    Greater,
    GreaterEqual,
    AndAnd,
    OrOr,
    Arrow,

    // Punctuation
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    Comma,
    Semicolon,

    Eof,
}

/// Keywords registered in a fresh lexer's reserved-word table.
pub const KEYWORDS: &[(&str, TokenKind)] = &[
    ("var", TokenKind::Var),
    ("fun", TokenKind::Fun),
    ("return", TokenKind::Return),
    ("if", TokenKind::If),
    ("else", TokenKind::Else),
    ("while", TokenKind::While),
    ("for", TokenKind::For),
    ("include", TokenKind::Include),
    ("true", TokenKind::True),
    ("false", TokenKind::False),
    ("null", TokenKind::Null),
    ("print", TokenKind::Print),
];

impl TokenKind {
    /// Every kind whose source text is fixed.
    pub const FIXED: &'static [TokenKind] = &[
        TokenKind::Var,
        TokenKind::Fun,
        TokenKind::Return,
        TokenKind::If,
        TokenKind::Else,
        TokenKind::While,
        TokenKind::For,
        TokenKind::Include,
        TokenKind::True,
        TokenKind::False,
        TokenKind::Null,
        TokenKind::Print,
        TokenKind::Plus,
        TokenKind::Minus,
        TokenKind::Star,
        TokenKind::Slash,
        TokenKind::Bang,
        TokenKind::Equal,
        TokenKind::EqualEqual,
        TokenKind::BangEqual,
        TokenKind::Less,
        TokenKind::LessEqual,
        TokenKind::Greater,
        TokenKind::GreaterEqual,
        TokenKind::AndAnd,
        TokenKind::OrOr,
        TokenKind::Arrow,
        TokenKind::LeftParen,
        TokenKind::RightParen,
        TokenKind::LeftBrace,
        TokenKind::RightBrace,
        TokenKind::Comma,
        TokenKind::Semicolon,
    ];

    /// Returns the source text for kinds that always have the same lexeme.
    pub fn fixed_text(&self) -> Option<&'static str> {
        let text = match self {
            TokenKind::Var => "var",
            TokenKind::Fun => "fun",
            TokenKind::Return => "return",
            TokenKind::If => "if",
            TokenKind::Else => "else",
            TokenKind::While => "while",
            TokenKind::For => "for",
            TokenKind::Include => "include",
            TokenKind::True => "true",
            TokenKind::False => "false",
            TokenKind::Null => "null",
            TokenKind::Print => "print",
            TokenKind::Plus => "+",
            TokenKind::Minus => "-",
            TokenKind::Star => "*",
            TokenKind::Slash => "/",
            TokenKind::Bang => "!",
            TokenKind::Equal => "=",
            TokenKind::EqualEqual => "==",
            TokenKind::BangEqual => "!=",
            TokenKind::Less => "<",
            TokenKind::LessEqual => "<=",
            TokenKind::Greater => ">",
            TokenKind::GreaterEqual => ">=",
            TokenKind::AndAnd => "&&",
            TokenKind::OrOr => "||",
            TokenKind::Arrow => "->",
            TokenKind::LeftParen => "(",
            TokenKind::RightParen => ")",
            TokenKind::LeftBrace => "{",
            TokenKind::RightBrace => "}",
            TokenKind::Comma => ",",
            TokenKind::Semicolon => ";",
            TokenKind::Identifier | TokenKind::Integer | TokenKind::String | TokenKind::Eof => {
                return None
            }
        };
        Some(text)
    }

    /// Keywords that may begin a statement; used for panic-mode synchronisation.
    pub fn starts_statement(&self) -> bool {
        matches!(
            self,
            TokenKind::Var
                | TokenKind::Fun
                | TokenKind::Return
                | TokenKind::If
                | TokenKind::While
                | TokenKind::For
                | TokenKind::Include
                | TokenKind::Print
        )
    }

    pub(crate) fn from_raw(raw: RawToken) -> Option<TokenKind> {
        let kind = match raw {
            RawToken::EqualEqual => TokenKind::EqualEqual,
            RawToken::BangEqual => TokenKind::BangEqual,
            RawToken::LessEqual => TokenKind::LessEqual,
            RawToken::GreaterEqual => TokenKind::GreaterEqual,
            RawToken::AndAnd => TokenKind::AndAnd,
            RawToken::OrOr => TokenKind::OrOr,
            RawToken::Arrow => TokenKind::Arrow,
            RawToken::Equal => TokenKind::Equal,
            RawToken::Bang => TokenKind::Bang,
            RawToken::Less => TokenKind::Less,
            RawToken::Greater => TokenKind::Greater,
            RawToken::Plus => TokenKind::Plus,
            RawToken::Minus => TokenKind::Minus,
            RawToken::Star => TokenKind::Star,
            RawToken::Slash => TokenKind::Slash,
            RawToken::LeftParen => TokenKind::LeftParen,
            RawToken::RightParen => TokenKind::RightParen,
            RawToken::LeftBrace => TokenKind::LeftBrace,
            RawToken::RightBrace => TokenKind::RightBrace,
            RawToken::Comma => TokenKind::Comma,
            RawToken::Semicolon => TokenKind::Semicolon,
            RawToken::Word
            | RawToken::Integer
            | RawToken::String
            | RawToken::UnterminatedString
            | RawToken::BlockCommentStart => return None,
        };
        Some(kind)
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.fixed_text() {
            Some(text) => write!(f, "'{}'", text),
            None => match self {
                TokenKind::Identifier => write!(f, "identifier"),
                TokenKind::Integer => write!(f, "integer"),
                TokenKind::String => write!(f, "string"),
                _ => write!(f, "end of file"),
            },
        }
    }
}

/// A positioned token. Immutable once produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// Source text. For string literals this is the content without quotes.
    pub lexeme: Rc<str>,
    /// Folded value of an integer literal.
    pub integer: Option<i64>,
    pub file: Rc<str>,
    pub line: usize,
    pub column: usize,
}

impl Token {
    pub fn new(kind: TokenKind, lexeme: Rc<str>, file: Rc<str>, line: usize, column: usize) -> Self {
        Token {
            kind,
            lexeme,
            integer: None,
            file,
            line,
            column,
        }
    }

    /// A token that does not come from source text, e.g. one supplied by
    /// repair-mode error recovery.
    pub fn synthetic(kind: TokenKind, at: &Token) -> Self {
        let lexeme: Rc<str> = Rc::from(kind.fixed_text().unwrap_or(""));
        Token::new(kind, lexeme, at.file.clone(), at.line, at.column)
    }
}

impl fmt::Display for Token {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self.kind {
            TokenKind::Eof => write!(f, "end"),
            TokenKind::String => write!(f, "\"{}\"", self.lexeme),
            _ => write!(f, "'{}'", self.lexeme),
        }
    }
}
