use lumen::error::ErrorCategory;
use lumen::lexer::Lexer;
use lumen::token::{Token, TokenKind};
use proptest::prelude::*;

fn tokens(source: &str) -> Vec<Token> {
    let mut lexer = Lexer::new("<test>", source);
    let mut tokens = Vec::new();
    loop {
        let token = lexer.next_token().expect("lexing failed");
        if token.kind == TokenKind::Eof {
            break;
        }
        tokens.push(token);
    }
    tokens
}

fn kinds(source: &str) -> Vec<TokenKind> {
    tokens(source).into_iter().map(|token| token.kind).collect()
}

#[test]
fn test_lexer() {
    let input = r#"
        int count = 10;
        fun add(int a, b) -> int { return a + b; }
        print add(count, 2), "done";
    "#;

    let expected = vec![
        TokenKind::Identifier,
        TokenKind::Identifier,
        TokenKind::Equal,
        TokenKind::Integer,
        TokenKind::Semicolon,
        TokenKind::Fun,
        TokenKind::Identifier,
        TokenKind::LeftParen,
        TokenKind::Identifier,
        TokenKind::Identifier,
        TokenKind::Comma,
        TokenKind::Identifier,
        TokenKind::RightParen,
        TokenKind::Arrow,
        TokenKind::Identifier,
        TokenKind::LeftBrace,
        TokenKind::Return,
        TokenKind::Identifier,
        TokenKind::Plus,
        TokenKind::Identifier,
        TokenKind::Semicolon,
        TokenKind::RightBrace,
        TokenKind::Print,
        TokenKind::Identifier,
        TokenKind::LeftParen,
        TokenKind::Identifier,
        TokenKind::Comma,
        TokenKind::Integer,
        TokenKind::RightParen,
        TokenKind::Comma,
        TokenKind::String,
        TokenKind::Semicolon,
    ];

    assert_eq!(kinds(input), expected);
}

#[test]
fn two_character_operators_win_over_prefixes() {
    assert_eq!(
        kinds("== != <= >= && || -> = ! < > -"),
        vec![
            TokenKind::EqualEqual,
            TokenKind::BangEqual,
            TokenKind::LessEqual,
            TokenKind::GreaterEqual,
            TokenKind::AndAnd,
            TokenKind::OrOr,
            TokenKind::Arrow,
            TokenKind::Equal,
            TokenKind::Bang,
            TokenKind::Less,
            TokenKind::Greater,
            TokenKind::Minus,
        ]
    );
}

#[test]
fn literals_carry_their_values() {
    let tokens = tokens(r#"42 "hello world" name"#);
    assert_eq!(tokens[0].integer, Some(42));
    assert_eq!(&*tokens[1].lexeme, "hello world");
    assert_eq!(&*tokens[2].lexeme, "name");
    assert_eq!(tokens[2].integer, None);
}

#[test]
fn comments_are_skipped() {
    let source = "var // trailing\n /* block /* nested */ still */ x;";
    assert_eq!(
        kinds(source),
        vec![TokenKind::Var, TokenKind::Identifier, TokenKind::Semicolon]
    );
}

#[test]
fn keywords_are_classified() {
    let source = "var fun return if else while for include true false null print";
    let kinds = kinds(source);
    assert_eq!(kinds.len(), 12);
    assert!(kinds.iter().all(|kind| *kind != TokenKind::Identifier));
}

#[test]
fn unknown_character_is_a_lexical_error() {
    let mut lexer = Lexer::new("<test>", "var @");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Var);
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err.category, ErrorCategory::Lexical);
    assert_eq!((err.line, err.column), (1, 5));
    assert!(err.message.contains("'@'"));
}

#[test]
fn unterminated_string_is_a_lexical_error() {
    let mut lexer = Lexer::new("<test>", "\"open\nvar");
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err.message, "Unterminated string.");
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Var);
}

#[test]
fn oversized_integer_is_a_lexical_error() {
    let mut lexer = Lexer::new("<test>", "99999999999999999999");
    let err = lexer.next_token().unwrap_err();
    assert_eq!(err.message, "Integer literal too large.");
}

#[test]
fn lexer_keeps_going_after_an_error() {
    let mut lexer = Lexer::new("<test>", "1 $ 2");
    assert!(lexer.next_token().is_ok());
    assert!(lexer.next_token().is_err());
    assert_eq!(lexer.next_token().unwrap().integer, Some(2));
    assert_eq!(lexer.next_token().unwrap().kind, TokenKind::Eof);
}

#[test]
fn identifiers_are_memoised_in_the_reserved_table() {
    let mut lexer = Lexer::new("<test>", "counter");
    assert_eq!(lexer.classify("counter"), None);
    lexer.next_token().unwrap();
    assert_eq!(lexer.classify("counter"), Some(TokenKind::Identifier));
    assert_eq!(lexer.classify("while"), Some(TokenKind::While));
}

#[derive(Debug, Clone)]
enum Piece {
    Fixed(TokenKind),
    Identifier(String),
    Integer(i64),
    Text(String),
}

impl Piece {
    fn kind(&self) -> TokenKind {
        match self {
            Piece::Fixed(kind) => *kind,
            Piece::Identifier(_) => TokenKind::Identifier,
            Piece::Integer(_) => TokenKind::Integer,
            Piece::Text(_) => TokenKind::String,
        }
    }

    fn source(&self) -> String {
        match self {
            Piece::Fixed(kind) => kind.fixed_text().unwrap_or_default().to_string(),
            Piece::Identifier(name) => name.clone(),
            Piece::Integer(value) => value.to_string(),
            Piece::Text(text) => format!("\"{}\"", text),
        }
    }
}

fn piece() -> impl Strategy<Value = Piece> {
    prop_oneof![
        proptest::sample::select(TokenKind::FIXED).prop_map(Piece::Fixed),
        "id_[a-z0-9_]{0,8}".prop_map(Piece::Identifier),
        (0..=i64::MAX).prop_map(Piece::Integer),
        "[a-z0-9 ]{0,12}".prop_map(Piece::Text),
    ]
}

proptest! {
    #[test]
    fn printed_tokens_lex_back_to_the_same_stream(pieces in prop::collection::vec(piece(), 0..40)) {
        let source = pieces.iter().map(Piece::source).collect::<Vec<_>>().join(" ");
        let lexed = tokens(&source);

        prop_assert_eq!(lexed.len(), pieces.len());
        for (token, piece) in lexed.iter().zip(&pieces) {
            prop_assert_eq!(token.kind, piece.kind());
            match piece {
                Piece::Identifier(name) => prop_assert_eq!(&*token.lexeme, name.as_str()),
                Piece::Integer(value) => prop_assert_eq!(token.integer, Some(*value)),
                Piece::Text(text) => prop_assert_eq!(&*token.lexeme, text.as_str()),
                Piece::Fixed(_) => {}
            }
        }
    }
}
