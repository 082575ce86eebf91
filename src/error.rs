//! Error types for expression parsing, evaluation, and the render pipeline

use ariadne::{Color, Label, Report, ReportKind, Source};
use thiserror::Error;

/// Byte range in expression text
pub type Span = std::ops::Range<usize>;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ParseError {
    #[error("Parse error at {span:?}: {message}")]
    Syntax {
        span: Span,
        message: String,
        expected: Vec<String>,
    },
}

impl ParseError {
    /// Format the error with source context using ariadne
    ///
    /// `source` is the raw expression text of the marker; `name` labels the
    /// report, typically the view or scheme the marker came from.
    pub fn format(&self, source: &str, name: &str) -> String {
        let mut buf = Vec::new();
        match self {
            ParseError::Syntax {
                span,
                message,
                expected,
            } => {
                let expected_str = if expected.is_empty() {
                    String::new()
                } else {
                    format!("\nExpected: {}", expected.join(", "))
                };

                // Clamp so truncated markers still report cleanly
                let span = span.start.min(source.len())..span.end.min(source.len());

                Report::build(ReportKind::Error, name, span.start)
                    .with_message(message)
                    .with_label(
                        Label::new((name, span))
                            .with_message(format!("{}{}", message, expected_str))
                            .with_color(Color::Red),
                    )
                    .finish()
                    .write((name, Source::from(source)), &mut buf)
                    .ok();
            }
        }
        String::from_utf8_lossy(&buf).into_owned()
    }
}

impl<'a> From<chumsky::error::Rich<'a, crate::expr::lexer::Token>> for ParseError {
    fn from(err: chumsky::error::Rich<'a, crate::expr::lexer::Token>) -> Self {
        use crate::expr::lexer::Token;
        use chumsky::error::RichReason;

        // Check if a declaration keyword landed where a name was expected
        let reserved = match err.found() {
            Some(Token::Let) => Some("let"),
            Some(Token::Const) => Some("const"),
            Some(Token::Var) => Some("var"),
            _ => None,
        };

        let message = match err.reason() {
            RichReason::ExpectedFound { found, .. } => {
                if let Some(keyword) = reserved {
                    format!(
                        "Cannot use '{}' here - it's a reserved declaration keyword",
                        keyword
                    )
                } else {
                    let found_str = match found {
                        Some(tok) => format_token(tok),
                        None => "end of input".to_string(),
                    };
                    format!("Unexpected {}", found_str)
                }
            }
            RichReason::Custom(msg) => msg.to_string(),
        };

        let expected: Vec<String> = err
            .expected()
            .filter_map(|e| match e {
                chumsky::error::RichPattern::Token(tok) => Some(format_token(tok)),
                chumsky::error::RichPattern::Label(label) => Some(label.to_string()),
                chumsky::error::RichPattern::EndOfInput => Some("end of input".to_string()),
                chumsky::error::RichPattern::Identifier(s) => Some(format!("identifier '{}'", s)),
                chumsky::error::RichPattern::Any => Some("any token".to_string()),
                chumsky::error::RichPattern::SomethingElse => None,
            })
            .collect();

        ParseError::Syntax {
            span: err.span().into_range(),
            message,
            expected,
        }
    }
}

/// Format a token for human-readable error messages
fn format_token(tok: &crate::expr::lexer::Token) -> String {
    use crate::expr::lexer::Token;
    match tok {
        Token::Ident(s) => format!("identifier '{}'", s),
        Token::Str(s) => format!("string \"{}\"", s),
        Token::Number(n) => format!("number {}", n),
        Token::Let => "keyword 'let'".to_string(),
        Token::Const => "keyword 'const'".to_string(),
        Token::Var => "keyword 'var'".to_string(),
        Token::True => "keyword 'true'".to_string(),
        Token::False => "keyword 'false'".to_string(),
        Token::Null => "keyword 'null'".to_string(),
        Token::EqEq => "'=='".to_string(),
        Token::NotEq => "'!='".to_string(),
        Token::LessOrEqual => "'<='".to_string(),
        Token::GreaterOrEqual => "'>='".to_string(),
        Token::Less => "'<'".to_string(),
        Token::Greater => "'>'".to_string(),
        Token::AndAnd => "'&&'".to_string(),
        Token::OrOr => "'||'".to_string(),
        Token::Bang => "'!'".to_string(),
        Token::Plus => "'+'".to_string(),
        Token::Minus => "'-'".to_string(),
        Token::Star => "'*'".to_string(),
        Token::Slash => "'/'".to_string(),
        Token::Percent => "'%'".to_string(),
        Token::Equals => "'='".to_string(),
        Token::ParenOpen => "'('".to_string(),
        Token::ParenClose => "')'".to_string(),
        Token::Comma => "','".to_string(),
        Token::Dot => "'.'".to_string(),
        Token::Question => "'?'".to_string(),
        Token::Colon => "':'".to_string(),
    }
}

/// A failure while evaluating one marker expression
///
/// Never aborts a pass; the marker renders as empty output and the failure
/// is accumulated as a [`RenderError`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum EvalError {
    #[error("{0}")]
    Parse(ParseError),

    #[error("unknown identifier: {name}")]
    UnknownIdentifier { name: String },

    #[error("unknown function: {name}")]
    UnknownFunction { name: String },

    #[error("{function} expects {expected} argument(s), got {got}")]
    Arity {
        function: String,
        expected: String,
        got: usize,
    },

    #[error("type error: {message}")]
    Type { message: String },

    #[error("recursion limit reached: {message}")]
    RecursionLimit { message: String },
}

impl EvalError {
    pub(crate) fn type_error(message: impl Into<String>) -> Self {
        EvalError::Type {
            message: message.into(),
        }
    }
}

/// One failed marker, recorded in document order for the whole render call
#[derive(Error, Debug, Clone, PartialEq)]
#[error("in '{{{{ {expression} }}}}': {cause}")]
pub struct RenderError {
    /// Raw expression text as found in the marker
    pub expression: String,
    pub cause: EvalError,
}

/// Terminal outcomes of a render call
///
/// Display strings double as the user-visible response messages.
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The requested scheme is missing or has empty markup
    #[error("Html scheme not found.")]
    SchemeNotFound,

    /// Markers failed and the ignore-errors gate is off
    #[error("Internal Server Error.")]
    EvaluationFailed { errors: Vec<RenderError> },

    /// The fixed-point loop hit its pass limit without settling
    #[error("template resolution did not converge after {passes} passes")]
    DidNotConverge { passes: usize },
}

impl PipelineError {
    /// HTTP-equivalent status for this outcome
    pub fn status(&self) -> u16 {
        match self {
            PipelineError::SchemeNotFound => 404,
            PipelineError::EvaluationFailed { .. } | PipelineError::DidNotConverge { .. } => 500,
        }
    }

    /// Structured error payload: `{status, message}`
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "status": self.status(),
            "message": self.to_string(),
        })
    }
}
