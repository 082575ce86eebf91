//! Lexer for marker expressions using logos

use logos::Logos;

/// Byte range in expression text
pub type Span = std::ops::Range<usize>;

fn unescape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    let mut chars = s.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            match chars.next() {
                Some('n') => out.push('\n'),
                Some('t') => out.push('\t'),
                Some('r') => out.push('\r'),
                Some(other) => out.push(other),
                None => out.push('\\'),
            }
        } else {
            out.push(c);
        }
    }
    out
}

#[derive(Logos, Debug, Clone, PartialEq)]
#[logos(skip r"[ \t\n\r]+")]
pub enum Token {
    // Declaration keywords
    #[token("let")]
    Let,
    #[token("const")]
    Const,
    #[token("var")]
    Var,

    // Literal keywords
    #[token("true")]
    True,
    #[token("false")]
    False,
    #[token("null")]
    Null,

    // Comparison operators (longer patterns first)
    #[token("==")]
    EqEq,
    #[token("!=")]
    NotEq,
    #[token("<=")]
    LessOrEqual,
    #[token(">=")]
    GreaterOrEqual,
    #[token("<")]
    Less,
    #[token(">")]
    Greater,

    // Boolean operators
    #[token("&&")]
    AndAnd,
    #[token("||")]
    OrOr,
    #[token("!")]
    Bang,

    // Arithmetic operators
    #[token("+")]
    Plus,
    #[token("-")]
    Minus,
    #[token("*")]
    Star,
    #[token("/")]
    Slash,
    #[token("%")]
    Percent,

    // Assignment (after == so it never splits it)
    #[token("=")]
    Equals,

    // Delimiters
    #[token("(")]
    ParenOpen,
    #[token(")")]
    ParenClose,
    #[token(",")]
    Comma,
    #[token(".")]
    Dot,
    #[token("?")]
    Question,
    #[token(":")]
    Colon,

    // Literals - identifiers must come after keywords
    #[regex(r"[a-zA-Z_][a-zA-Z0-9_]*", |lex| lex.slice().to_string(), priority = 1)]
    Ident(String),

    #[regex(r#""([^"\\]|\\.)*""#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len()-1])
    })]
    #[regex(r#"'([^'\\]|\\.)*'"#, |lex| {
        let s = lex.slice();
        unescape(&s[1..s.len()-1])
    })]
    Str(String),

    #[regex(r"[0-9]+(\.[0-9]+)?", |lex| lex.slice().parse::<f64>().ok())]
    Number(f64),
}

/// Lex expression text into tokens with spans
///
/// A character outside the grammar fails the whole lex; the offending spans
/// are returned so the caller can report every one of them.
pub fn lex(input: &str) -> Result<Vec<(Token, Span)>, Vec<Span>> {
    let mut tokens = Vec::new();
    let mut invalid = Vec::new();
    for (tok, span) in Token::lexer(input).spanned() {
        match tok {
            Ok(tok) => tokens.push((tok, span)),
            Err(()) => invalid.push(span),
        }
    }
    if invalid.is_empty() {
        Ok(tokens)
    } else {
        Err(invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tokens(input: &str) -> Vec<Token> {
        lex(input)
            .expect("Should lex")
            .into_iter()
            .map(|(tok, _)| tok)
            .collect()
    }

    #[test]
    fn test_declaration_keywords() {
        let tokens = tokens("let const var");
        assert_eq!(tokens, vec![Token::Let, Token::Const, Token::Var]);
    }

    #[test]
    fn test_literal_keywords() {
        let tokens = tokens("true false null");
        assert_eq!(tokens, vec![Token::True, Token::False, Token::Null]);
    }

    #[test]
    fn test_identifiers_and_strings() {
        let tokens = tokens(r#"title "hello world""#);
        assert_eq!(
            tokens,
            vec![
                Token::Ident("title".to_string()),
                Token::Str("hello world".to_string())
            ]
        );
    }

    #[test]
    fn test_single_quoted_strings() {
        let tokens = tokens("'abc'");
        assert_eq!(tokens, vec![Token::Str("abc".to_string())]);
    }

    #[test]
    fn test_string_escapes() {
        let tokens = tokens(r#""a\"b\nc""#);
        assert_eq!(tokens, vec![Token::Str("a\"b\nc".to_string())]);
    }

    #[test]
    fn test_numbers() {
        let tokens = tokens("42 3.14 -10");
        assert_eq!(
            tokens,
            vec![
                Token::Number(42.0),
                Token::Number(3.14),
                Token::Minus,
                Token::Number(10.0)
            ]
        );
    }

    #[test]
    fn test_comparison_operators() {
        let tokens = tokens("== != <= >= < >");
        assert_eq!(
            tokens,
            vec![
                Token::EqEq,
                Token::NotEq,
                Token::LessOrEqual,
                Token::GreaterOrEqual,
                Token::Less,
                Token::Greater
            ]
        );
    }

    #[test]
    fn test_equals_vs_eqeq() {
        let tokens = tokens("x = y == z");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("x".to_string()),
                Token::Equals,
                Token::Ident("y".to_string()),
                Token::EqEq,
                Token::Ident("z".to_string()),
            ]
        );
    }

    #[test]
    fn test_arithmetic_operators() {
        let tokens = tokens("1+2*3/4%5");
        assert_eq!(
            tokens,
            vec![
                Token::Number(1.0),
                Token::Plus,
                Token::Number(2.0),
                Token::Star,
                Token::Number(3.0),
                Token::Slash,
                Token::Number(4.0),
                Token::Percent,
                Token::Number(5.0),
            ]
        );
    }

    #[test]
    fn test_member_access_and_call() {
        let tokens = tokens("app.content include(\"nav\")");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("app".to_string()),
                Token::Dot,
                Token::Ident("content".to_string()),
                Token::Ident("include".to_string()),
                Token::ParenOpen,
                Token::Str("nav".to_string()),
                Token::ParenClose,
            ]
        );
    }

    #[test]
    fn test_declaration_expression() {
        let tokens = tokens("let x = 5");
        assert_eq!(
            tokens,
            vec![
                Token::Let,
                Token::Ident("x".to_string()),
                Token::Equals,
                Token::Number(5.0),
            ]
        );
    }

    #[test]
    fn test_ternary_tokens() {
        let tokens = tokens("ok ? 1 : 2");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("ok".to_string()),
                Token::Question,
                Token::Number(1.0),
                Token::Colon,
                Token::Number(2.0),
            ]
        );
    }

    #[test]
    fn test_invalid_character_fails_the_lex() {
        let spans = lex("title @").expect_err("Should reject '@'");
        assert_eq!(spans, vec![6..7]);

        // Every invalid character is reported, not just the first
        let spans = lex("a # b @").expect_err("Should reject both");
        assert_eq!(spans.len(), 2);
    }

    #[test]
    fn test_keyword_prefix_identifiers() {
        // Identifiers that merely start with a keyword stay identifiers
        let tokens = tokens("letter variant construct");
        assert_eq!(
            tokens,
            vec![
                Token::Ident("letter".to_string()),
                Token::Ident("variant".to_string()),
                Token::Ident("construct".to_string()),
            ]
        );
    }
}
