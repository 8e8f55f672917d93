use std::iter::Peekable;

use logos::Logos;

use crate::{
    ast::Parameter,
    error::ParseError,
    interpreter::{parser::core::ParseResult, types::core::RuntimeType},
};

/// Lexical tokens of parameter declarations and type annotations.
#[derive(Logos, Debug, PartialEq, Clone)]
#[logos(skip r"[ \t\r\n\f]+")]
enum DeclToken {
    /// `Number`
    #[token("Number")]
    Number,
    /// `Pointer`
    #[token("Pointer")]
    Pointer,
    /// `fn`
    #[token("fn")]
    Fn,
    /// `->`
    #[token("->")]
    Arrow,
    /// `:`
    #[token(":")]
    Colon,
    /// `,`
    #[token(",")]
    Comma,
    /// `[`
    #[token("[")]
    LBracket,
    /// `]`
    #[token("]")]
    RBracket,
    /// Parameter names such as `x` or `step_2`.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*", |lex| lex.slice().to_string())]
    Identifier(String),
}

impl std::fmt::Display for DeclToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Number => write!(f, "Number"),
            Self::Pointer => write!(f, "Pointer"),
            Self::Fn => write!(f, "fn"),
            Self::Arrow => write!(f, "->"),
            Self::Colon => write!(f, ":"),
            Self::Comma => write!(f, ","),
            Self::LBracket => write!(f, "["),
            Self::RBracket => write!(f, "]"),
            Self::Identifier(name) => write!(f, "{name}"),
        }
    }
}

fn invalid(details: impl Into<String>) -> ParseError {
    ParseError::InvalidDeclaration { details: details.into() }
}

fn lex(text: &str) -> ParseResult<Vec<DeclToken>> {
    let mut lexer = DeclToken::lexer(text);
    let mut tokens = Vec::new();
    while let Some(token) = lexer.next() {
        match token {
            Ok(token) => tokens.push(token),
            Err(()) => return Err(invalid(format!("unrecognized text '{}'", lexer.slice()))),
        }
    }
    Ok(tokens)
}

/// Parses a structural type annotation.
///
/// Grammar:
/// ```text
///     type := "Number"
///           | "Pointer"
///           | "[" (type ("," type)*)? "]"
///           | "fn" type "->" type
/// ```
/// In `fn P -> R`, `P` is the parameter type: a single type for one
/// parameter, a tuple type for several.
///
/// # Errors
/// Returns `ParseError::InvalidDeclaration` if `text` is not exactly one type.
///
/// # Example
/// ```
/// use calctree::interpreter::{parser::declaration::parse_type, types::core::RuntimeType};
///
/// let pair = RuntimeType::tuple(vec![RuntimeType::number(), RuntimeType::number()]);
/// assert_eq!(parse_type("[Number, Number]").unwrap(), pair);
///
/// let ty = parse_type("fn [Number, Number] -> Number").unwrap();
/// assert_eq!(ty, RuntimeType::function(RuntimeType::number(), pair));
/// ```
pub fn parse_type(text: &str) -> ParseResult<RuntimeType> {
    let tokens = lex(text)?;
    let mut tokens = tokens.into_iter().peekable();
    let ty = type_expr(&mut tokens)?;
    match tokens.next() {
        None => Ok(ty),
        Some(extra) => Err(invalid(format!("unexpected '{extra}' after type {ty}"))),
    }
}

/// Parses one parameter declaration: a name, optionally followed by `:` and
/// a type. Undeclared types default to `Number`.
///
/// # Errors
/// Returns `ParseError::InvalidDeclaration` for a missing name, a malformed
/// type or trailing text.
pub fn parse_parameter(text: &str) -> ParseResult<Parameter> {
    let tokens = lex(text)?;
    let mut tokens = tokens.into_iter().peekable();

    let name = match tokens.next() {
        Some(DeclToken::Identifier(name)) => name,
        Some(other) => return Err(invalid(format!("expected a parameter name, found '{other}'"))),
        None => return Err(invalid("expected a parameter name")),
    };

    let ty = match tokens.next() {
        None => RuntimeType::number(),
        Some(DeclToken::Colon) => type_expr(&mut tokens)?,
        Some(other) => {
            return Err(invalid(format!("expected ':' after parameter '{name}', found '{other}'")));
        },
    };

    match tokens.next() {
        None => Ok(Parameter { name, ty }),
        Some(extra) => Err(invalid(format!("unexpected '{extra}' after parameter '{name}'"))),
    }
}

fn type_expr<I>(tokens: &mut Peekable<I>) -> ParseResult<RuntimeType>
    where I: Iterator<Item = DeclToken>
{
    match tokens.next() {
        Some(DeclToken::Number) => Ok(RuntimeType::number()),
        Some(DeclToken::Pointer) => Ok(RuntimeType::pointer()),
        Some(DeclToken::LBracket) => {
            let mut children = Vec::new();
            if tokens.next_if_eq(&DeclToken::RBracket).is_some() {
                return Ok(RuntimeType::tuple(children));
            }
            loop {
                children.push(type_expr(tokens)?);
                match tokens.next() {
                    Some(DeclToken::Comma) => {},
                    Some(DeclToken::RBracket) => break,
                    Some(other) => return Err(invalid(format!("expected ',' or ']' in tuple type, found '{other}'"))),
                    None => return Err(invalid("unterminated tuple type")),
                }
            }
            Ok(RuntimeType::tuple(children))
        },
        Some(DeclToken::Fn) => {
            let params = type_expr(tokens)?;
            match tokens.next() {
                Some(DeclToken::Arrow) => {},
                _ => return Err(invalid(format!("expected '->' after fn {params}"))),
            }
            let returns = type_expr(tokens)?;
            Ok(RuntimeType::function(returns, params))
        },
        Some(other) => Err(invalid(format!("expected a type, found '{other}'"))),
        None => Err(invalid("expected a type")),
    }
}
