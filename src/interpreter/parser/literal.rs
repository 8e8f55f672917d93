use std::collections::HashSet;

use crate::{
    ast::{Arena, Node, NodePos, Notation, Parameter, alloc_tuple},
    error::ParseError,
    interpreter::parser::{
        core::{ParseResult, Parser},
        declaration::parse_parameter,
    },
};

/// What binding a parameter name for a body parse replaced, so it can be put
/// back afterwards.
struct ScopedName {
    name:            String,
    added_keyword:   bool,
    shadowed_fixity: Option<Notation>,
}

impl Parser {
    /// Parses the body of a tuple literal into a tuple chain and returns its
    /// head.
    ///
    /// The body is split on the list separator wherever no bracket is open,
    /// and every element is parsed as an expression of its own. A blank body
    /// builds the empty tuple: a lone head link with no element.
    ///
    /// # Errors
    /// Returns `ParseError::EmptyExpression` for an element with no lexemes,
    /// or the error raised while parsing an element.
    pub(super) fn tuple_literal(&mut self, body: &str, arena: &mut Arena) -> ParseResult<NodePos> {
        if body.trim().is_empty() {
            return Ok(alloc_tuple(arena, Vec::new()));
        }

        let separator = self.config.list_separator().to_string();
        let mut elements = Vec::new();
        for element in self.split_top_level(body, &separator, None) {
            if element.trim().is_empty() {
                return Err(ParseError::EmptyExpression { context: "tuple element".to_string() });
            }
            elements.push(self.parse_fragment(element, arena)?);
        }

        Ok(alloc_tuple(arena, elements))
    }

    /// Parses the body of a function literal: an optional parameter header,
    /// the parameter separator, and the body expression.
    ///
    /// Without a parameter separator the whole body is the expression and the
    /// function takes no parameters. While the body is parsed every parameter
    /// name is a keyword and a constant, shadowing whatever the name meant
    /// before; the previous meaning is restored afterwards, even when parsing
    /// fails.
    ///
    /// # Errors
    /// Returns `ParseError::InvalidDeclaration` for a malformed or duplicated
    /// parameter, `ParseError::EmptyExpression` for an empty body, or the error
    /// raised while parsing the body.
    pub(super) fn function_literal(&mut self, body: &str, arena: &mut Arena) -> ParseResult<NodePos> {
        let separator = self.config.parameter_separator().to_string();
        let parts = self.split_top_level(body, &separator, Some(1));
        let (header, expression) = match parts.as_slice() {
            [header, expression] => (*header, *expression),
            _ => ("", body),
        };

        let parameters = self.parse_parameters(header)?;
        if expression.trim().is_empty() {
            return Err(ParseError::EmptyExpression { context: "function body".to_string() });
        }

        let scope = self.bind_names(&parameters);
        let parsed = self.parse_fragment(expression, arena);
        self.restore_names(scope);

        Ok(arena.alloc(Node::function(parameters, parsed?)))
    }

    fn parse_parameters(&self, header: &str) -> ParseResult<Vec<Parameter>> {
        if header.trim().is_empty() {
            return Ok(Vec::new());
        }

        let mut seen = HashSet::new();
        let mut parameters = Vec::new();
        for declaration in self.split_top_level(header, self.config.list_separator(), None) {
            let parameter = parse_parameter(declaration)?;
            if !seen.insert(parameter.name.clone()) {
                return Err(ParseError::InvalidDeclaration { details: format!("parameter '{}' is declared twice",
                                                                             parameter.name) });
            }
            parameters.push(parameter);
        }
        Ok(parameters)
    }

    fn bind_names(&mut self, parameters: &[Parameter]) -> Vec<ScopedName> {
        parameters.iter()
                  .map(|parameter| {
                      let name = parameter.name.clone();
                      let added_keyword = self.tokenizer.insert_keyword(&name);
                      let shadowed_fixity = self.config.replace_fixity(&name, Some(Notation::Constant));
                      ScopedName { name,
                                   added_keyword,
                                   shadowed_fixity }
                  })
                  .collect()
    }

    fn restore_names(&mut self, scope: Vec<ScopedName>) {
        for scoped in scope.into_iter().rev() {
            if scoped.added_keyword {
                self.tokenizer.remove_keyword(&scoped.name);
            }
            self.config.replace_fixity(&scoped.name, scoped.shadowed_fixity);
        }
    }

    /// Splits `text` on `separator` wherever no bracket of any kind is open.
    /// With a `limit`, at most that many splits are made.
    fn split_top_level<'t>(&self, text: &'t str, separator: &str, limit: Option<usize>) -> Vec<&'t str> {
        let mut opens: Vec<&str> = Vec::new();
        let mut closes: Vec<&str> = Vec::new();
        for (open, close) in self.config.brackets() {
            opens.push(open);
            closes.push(close);
        }
        for raw in self.config.raw_brackets() {
            opens.push(&raw.open);
            closes.push(&raw.close);
        }

        let mut parts = Vec::new();
        let mut depth = 0usize;
        let mut start = 0;
        let mut i = 0;

        while i < text.len() {
            let rest = &text[i..];
            if let Some(open) = opens.iter().find(|open| rest.starts_with(**open)) {
                depth += 1;
                i += open.len();
                continue;
            }
            if let Some(close) = closes.iter().find(|close| rest.starts_with(**close)) {
                depth = depth.saturating_sub(1);
                i += close.len();
                continue;
            }
            if depth == 0
               && !separator.is_empty()
               && rest.starts_with(separator)
               && limit.is_none_or(|limit| parts.len() < limit)
            {
                parts.push(&text[start..i]);
                i += separator.len();
                start = i;
                continue;
            }
            i += rest.chars().next().map_or(1, char::len_utf8);
        }

        parts.push(&text[start..]);
        parts
    }
}
