//! Parser for marker expressions using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::expr::ast::*;
use crate::expr::lexer::Token;

/// Parse the raw text of one marker into a [`MarkerExpr`]
///
/// Characters outside the grammar fail the parse with one error per
/// offending span. Empty input is also rejected, so an empty marker
/// surfaces as an accumulated error rather than empty output.
pub fn parse(input: &str) -> Result<MarkerExpr, Vec<crate::ParseError>> {
    let len = input.len();

    let tokens = crate::expr::lexer::lex(input).map_err(|spans| {
        spans
            .into_iter()
            .map(|span| crate::ParseError::Syntax {
                message: format!("Unrecognized character '{}'", &input[span.clone()]),
                span,
                expected: Vec::new(),
            })
            .collect::<Vec<_>>()
    })?;

    // Convert the lexed tokens to a spanned token stream
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    marker_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

fn fold_binary(first: Expr, rest: Vec<(BinaryOp, Expr)>) -> Expr {
    rest.into_iter().fold(first, |lhs, (op, rhs)| Expr::Binary {
        op,
        lhs: Box::new(lhs),
        rhs: Box::new(rhs),
    })
}

fn marker_parser<'a, I>() -> impl Parser<'a, I, MarkerExpr, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let ident = select! {
        Token::Ident(name) => name,
    };

    let expr = recursive(|expr| {
        let literal = select! {
            Token::Null => Expr::Null,
            Token::True => Expr::Bool(true),
            Token::False => Expr::Bool(false),
            Token::Number(n) => Expr::Number(n),
            Token::Str(s) => Expr::Str(s),
        };

        // Call must be tried before bare identifier
        let call = ident
            .clone()
            .then(
                expr.clone()
                    .separated_by(just(Token::Comma))
                    .allow_trailing()
                    .collect::<Vec<_>>()
                    .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
            )
            .map(|(function, args)| Expr::Call { function, args });

        let primary = choice((
            literal,
            call,
            ident.clone().map(Expr::Ident),
            expr.clone()
                .delimited_by(just(Token::ParenOpen), just(Token::ParenClose)),
        ))
        .boxed();

        // Member chains: app.content.title
        let member = primary
            .then(
                just(Token::Dot)
                    .ignore_then(ident.clone())
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(base, fields)| {
                fields.into_iter().fold(base, |object, field| Expr::Member {
                    object: Box::new(object),
                    field,
                })
            });

        let unary = choice((
            just(Token::Minus).to(UnaryOp::Neg),
            just(Token::Bang).to(UnaryOp::Not),
        ))
        .repeated()
        .collect::<Vec<_>>()
        .then(member)
        .map(|(ops, operand)| {
            ops.into_iter().rev().fold(operand, |operand, op| Expr::Unary {
                op,
                operand: Box::new(operand),
            })
        })
        .boxed();

        let product = unary
            .clone()
            .then(
                choice((
                    just(Token::Star).to(BinaryOp::Mul),
                    just(Token::Slash).to(BinaryOp::Div),
                    just(Token::Percent).to(BinaryOp::Rem),
                ))
                .then(unary)
                .repeated()
                .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| fold_binary(first, rest));

        let sum = product
            .clone()
            .then(
                choice((
                    just(Token::Plus).to(BinaryOp::Add),
                    just(Token::Minus).to(BinaryOp::Sub),
                ))
                .then(product)
                .repeated()
                .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| fold_binary(first, rest))
            .boxed();

        let comparison = sum
            .clone()
            .then(
                choice((
                    just(Token::LessOrEqual).to(BinaryOp::Le),
                    just(Token::GreaterOrEqual).to(BinaryOp::Ge),
                    just(Token::Less).to(BinaryOp::Lt),
                    just(Token::Greater).to(BinaryOp::Gt),
                ))
                .then(sum)
                .repeated()
                .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| fold_binary(first, rest));

        let equality = comparison
            .clone()
            .then(
                choice((
                    just(Token::EqEq).to(BinaryOp::Eq),
                    just(Token::NotEq).to(BinaryOp::Ne),
                ))
                .then(comparison)
                .repeated()
                .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| fold_binary(first, rest))
            .boxed();

        let conjunction = equality
            .clone()
            .then(
                just(Token::AndAnd)
                    .to(BinaryOp::And)
                    .then(equality)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| fold_binary(first, rest));

        let disjunction = conjunction
            .clone()
            .then(
                just(Token::OrOr)
                    .to(BinaryOp::Or)
                    .then(conjunction)
                    .repeated()
                    .collect::<Vec<_>>(),
            )
            .map(|(first, rest)| fold_binary(first, rest))
            .boxed();

        // Ternary binds loosest and right-associates through the recursion
        disjunction
            .then(
                just(Token::Question)
                    .ignore_then(expr.clone())
                    .then_ignore(just(Token::Colon))
                    .then(expr)
                    .or_not(),
            )
            .map(|(cond, branches)| match branches {
                Some((then_value, else_value)) => Expr::Ternary {
                    cond: Box::new(cond),
                    then_value: Box::new(then_value),
                    else_value: Box::new(else_value),
                },
                None => cond,
            })
            .boxed()
    });

    let decl_kind = choice((
        just(Token::Let).to(DeclKind::Let),
        just(Token::Const).to(DeclKind::Const),
        just(Token::Var).to(DeclKind::Var),
    ));

    let declaration = decl_kind
        .then(ident.clone())
        .then_ignore(just(Token::Equals))
        .then(expr.clone())
        .map(|((kind, name), value)| MarkerExpr::Declaration { kind, name, value });

    // Bare assignment: `x = 5` - tried before the expression form, backtracks
    // when the `=` is absent
    let assignment = ident
        .then_ignore(just(Token::Equals))
        .then(expr.clone())
        .map(|(name, value)| MarkerExpr::Assignment { name, value });

    choice((declaration, assignment, expr.map(MarkerExpr::Value))).then_ignore(end())
}
