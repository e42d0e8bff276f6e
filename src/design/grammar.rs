//! Parser implementation using chumsky

use chumsky::input::{Stream, ValueInput};
use chumsky::prelude::*;

use crate::design::ast::*;
use crate::design::lexer::Token;

/// Parse design source into a [`Design`]
pub fn parse(input: &str) -> Result<Design, Vec<crate::ParseError>> {
    let len = input.len();

    // Lex up front so unreadable input is an error rather than skipped
    let tokens = crate::design::lexer::lex(input)?;
    let token_iter = tokens.into_iter().map(|(tok, span)| (tok, span.into()));

    // Turn the token iterator into a stream that chumsky can use
    let token_stream = Stream::from_iter(token_iter)
        // Split (Token, SimpleSpan) into token and span parts
        .map((len..len).into(), |(t, s): (_, _)| (t, s));

    design_parser()
        .parse(token_stream)
        .into_result()
        .map_err(|errs| errs.into_iter().map(|e| e.into()).collect())
}

/// Helper to extract span range from chumsky's MapExtra
fn span_range(e: &impl chumsky::span::Span<Offset = usize>) -> std::ops::Range<usize> {
    e.start()..e.end()
}

fn design_parser<'a, I>() -> impl Parser<'a, I, Design, extra::Err<Rich<'a, Token>>> + Clone
where
    I: ValueInput<'a, Token = Token, Span = SimpleSpan>,
{
    let identifier = select! {
        Token::Ident(s) => Identifier::new(s),
    };

    let string_literal = select! {
        Token::String(s) => s,
    };

    let expression_text = select! {
        Token::Expr(s) => s,
    };

    // `report` is a keyword token, every other type name is lexed as an identifier
    let value_type = choice((
        just(Token::Report).to(ValueType::Report),
        identifier.clone().try_map(|id: Identifier, span| {
            ValueType::from_keyword(id.as_str())
                .ok_or_else(|| Rich::custom(span, format!("unknown value type '{}'", id)))
        }),
    ));

    let expression = expression_text
        .then(just(Token::Colon).ignore_then(value_type.clone()).or_not())
        .map(|(text, value_type)| Expression::typed(text, value_type.unwrap_or_default()));

    // parameter Title: string
    let parameter = just(Token::Parameter)
        .ignore_then(identifier.clone())
        .then_ignore(just(Token::Colon))
        .then(value_type)
        .map_with(|(name, value_type), e| {
            Spanned::new(ParameterDecl { name, value_type }, span_range(&e.span()))
        });

    let element = choice((
        just(Token::Text)
            .ignore_then(string_literal.clone())
            .map(Element::StaticText),
        just(Token::TextField)
            .ignore_then(expression.clone())
            .map(Element::TextField),
        just(Token::Subreport)
            .ignore_then(expression)
            .map(|expression| Element::Subreport(SubreportElement { expression })),
    ))
    .map_with(|element, e| Spanned::new(element, span_range(&e.span())));

    let section_kind = identifier.try_map(|id: Identifier, span| {
        SectionKind::from_keyword(id.as_str())
            .ok_or_else(|| Rich::custom(span, format!("unknown section '{}'", id)))
    });

    // section detail { ... }
    let section = just(Token::Section)
        .ignore_then(section_kind)
        .then(
            element
                .repeated()
                .collect::<Vec<_>>()
                .delimited_by(just(Token::BraceOpen), just(Token::BraceClose)),
        )
        .map(|(kind, elements)| Section { kind, elements });

    // Parameters are declared before any section
    let body = parameter
        .repeated()
        .collect::<Vec<_>>()
        .then(section.repeated().collect::<Vec<_>>())
        .delimited_by(just(Token::BraceOpen), just(Token::BraceClose));

    just(Token::Report)
        .ignore_then(string_literal)
        .then(body)
        .then_ignore(end())
        .map(|(name, (parameters, sections))| Design {
            name,
            parameters,
            sections,
        })
}
