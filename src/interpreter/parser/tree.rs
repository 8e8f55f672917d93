use crate::{
    ast::{APPLY, Arena, Node, NodePos, NodeState, Notation},
    error::ParseError,
    interpreter::{
        lexer::Lexeme,
        parser::core::{ParseResult, Parser},
    },
    util::num::is_numeric_literal,
};

/// Working state of one shunting-yard pass.
#[derive(Default)]
struct Stacks {
    operands:  Vec<NodePos>,
    operators: Vec<Lexeme>,
}

impl Parser {
    /// Builds an operator tree from merged lexemes and returns its root.
    ///
    /// Rules, applied per lexeme:
    /// - numbers and constants become leaves; a pending postfix operator on
    ///   top of the operator stack takes the new leaf as its operand unless a
    ///   tuple literal follows (which would make the leaf a callee);
    /// - open brackets are pushed, close brackets reduce back to their
    ///   matching open bracket;
    /// - postfix operators written after an operand take it at once, after
    ///   reducing pending operators of at least their level; written before
    ///   an operand, they are pushed and wait for it;
    /// - prefix operators take the operand already built;
    /// - infix operators first reduce every pending operator of a level
    ///   greater than or equal to their own, so operators of one level reduce
    ///   left to right (`2 ^ 3 ^ 2` is `(2 ^ 3) ^ 2`);
    /// - a raw bracket region becomes a tuple or function literal, and a tuple
    ///   literal directly after an operand applies that operand to it.
    ///
    /// A lone operator lexeme parses to a childless operator node: a reference
    /// to the operator as a function value.
    ///
    /// # Errors
    /// Returns `ParseError::NotReady` for an unconfigured parser, and a syntax
    /// error for unbalanced brackets, missing operands, leftover operands or
    /// unknown lexemes.
    ///
    /// # Example
    /// ```
    /// use calctree::{
    ///     ast::{Arena, tree_to_string},
    ///     interpreter::parser::core::Parser,
    /// };
    ///
    /// let mut arena = Arena::new();
    /// let mut parser = Parser::standard();
    /// let lexemes = ["2", "^", "3", "^", "2"].map(String::from);
    /// let root = parser.build_tree(&lexemes, &mut arena).unwrap();
    ///
    /// assert_eq!(tree_to_string(&arena, root), "((2 ^ 3) ^ 2)");
    /// ```
    #[tracing::instrument(level = "trace", skip_all, fields(count = lexemes.len()))]
    pub fn build_tree(&mut self, lexemes: &[Lexeme], arena: &mut Arena) -> ParseResult<NodePos> {
        self.ready()?;
        self.build_fragment(lexemes, arena)
    }

    pub(super) fn build_fragment(&mut self,
                                 lexemes: &[Lexeme],
                                 arena: &mut Arena)
                                 -> ParseResult<NodePos> {
        if let [single] = lexemes
           && matches!(self.config.fixity(single),
                       Some(Notation::Infix | Notation::Prefix | Notation::Postfix))
        {
            return Ok(arena.alloc(Node::operator(single.clone(), None, None)));
        }

        let mut stacks = Stacks::default();
        let mut previous_operand = false;
        let mut i = 0;

        while i < lexemes.len() {
            let lexeme = &lexemes[i];

            if let Some(raw) = self.config.raw_bracket(lexeme).cloned() {
                let (body, consumed) = match (lexemes.get(i + 1), lexemes.get(i + 2)) {
                    (Some(next), _) if *next == raw.close => ("", 2),
                    (Some(body), Some(close)) if *close == raw.close => (body.as_str(), 3),
                    _ => return Err(ParseError::UnbalancedBrackets { bracket: raw.open }),
                };
                let callee_follows = self.tuple_follows(lexemes, i + consumed);

                let node = match raw.state {
                    NodeState::Tuple => {
                        let tuple = self.tuple_literal(body, arena)?;
                        if previous_operand {
                            let callee = stacks.operands
                                               .pop()
                                               .ok_or_else(|| ParseError::MissingOperand { operator: raw.open.clone() })?;
                            apply(callee, tuple, arena)
                        } else {
                            tuple
                        }
                    },
                    NodeState::Function => self.function_literal(body, arena)?,
                    NodeState::Number | NodeState::Operator => {
                        return Err(ParseError::UnexpectedLexeme { lexeme:  raw.open,
                                                                  details: "raw brackets build tuples or functions only".to_string(), });
                    },
                };

                self.push_operand(&mut stacks, arena, node, callee_follows);
                previous_operand = true;
                i += consumed;
                continue;
            }

            if is_numeric_literal(lexeme) || self.config.fixity(lexeme) == Some(Notation::Constant) {
                let leaf = if is_numeric_literal(lexeme) {
                    Node::number(lexeme.clone())
                } else {
                    Node::operator(lexeme.clone(), None, None)
                };
                let leaf = arena.alloc(leaf);
                self.push_operand(&mut stacks, arena, leaf, self.tuple_follows(lexemes, i + 1));
                previous_operand = true;
            } else if self.config.is_open_bracket(lexeme) {
                stacks.operators.push(lexeme.clone());
                previous_operand = false;
            } else if self.config.is_close_bracket(lexeme) {
                if !previous_operand {
                    return Err(match stacks.operators.last() {
                                   Some(top) if self.config.is_open_bracket(top) => {
                                       ParseError::EmptyExpression { context: "brackets".to_string() }
                                   },
                                   Some(top) => ParseError::MissingOperand { operator: top.clone() },
                                   None => ParseError::UnbalancedBrackets { bracket: lexeme.clone() },
                               });
                }
                self.close_bracket(&mut stacks, lexeme, arena)?;
                let group = stacks.operands
                                  .pop()
                                  .ok_or_else(|| ParseError::EmptyExpression { context: "brackets".to_string() })?;
                self.push_operand(&mut stacks, arena, group, self.tuple_follows(lexemes, i + 1));
                previous_operand = true;
            } else {
                match self.config.fixity(lexeme) {
                    Some(Notation::Postfix) if previous_operand => {
                        self.reduce_at_least(&mut stacks, self.config.level(lexeme).unwrap_or(0), arena)?;
                        let operand = stacks.operands
                                            .pop()
                                            .ok_or_else(|| ParseError::MissingOperand { operator: lexeme.clone() })?;
                        let node = arena.alloc(Node::operator(lexeme.clone(), None, Some(operand)));
                        self.push_operand(&mut stacks, arena, node, self.tuple_follows(lexemes, i + 1));
                    },
                    Some(Notation::Postfix) => {
                        stacks.operators.push(lexeme.clone());
                        previous_operand = false;
                    },
                    Some(Notation::Prefix) => {
                        if !previous_operand {
                            return Err(ParseError::MissingOperand { operator: lexeme.clone() });
                        }
                        let operand = stacks.operands
                                            .pop()
                                            .ok_or_else(|| ParseError::MissingOperand { operator: lexeme.clone() })?;
                        let node = arena.alloc(Node::operator(lexeme.clone(), Some(operand), None));
                        self.push_operand(&mut stacks, arena, node, self.tuple_follows(lexemes, i + 1));
                        previous_operand = true;
                    },
                    Some(Notation::Infix) => {
                        if !previous_operand {
                            return Err(ParseError::UnexpectedLexeme { lexeme:  lexeme.clone(),
                                                                      details: "an infix operator needs a left operand".to_string(), });
                        }
                        self.reduce_at_least(&mut stacks, self.config.level(lexeme).unwrap_or(0), arena)?;
                        stacks.operators.push(lexeme.clone());
                        previous_operand = false;
                    },
                    Some(Notation::Constant) | None => {
                        return Err(ParseError::UnexpectedLexeme { lexeme:  lexeme.clone(),
                                                                  details: "not a number, bracket or registered operator".to_string(), });
                    },
                }
            }

            i += 1;
        }

        while let Some(top) = stacks.operators.pop() {
            if self.config.is_open_bracket(&top) {
                return Err(ParseError::UnbalancedBrackets { bracket: top });
            }
            self.reduce(&mut stacks, &top, arena)?;
        }

        match stacks.operands.as_slice() {
            [] => Err(ParseError::EmptyExpression { context: "expression".to_string() }),
            [root] => Ok(*root),
            operands => Err(ParseError::DanglingOperands { count: operands.len() }),
        }
    }

    fn tuple_follows(&self, lexemes: &[Lexeme], at: usize) -> bool {
        lexemes.get(at).is_some_and(|next| self.config.opens_tuple(next))
    }

    /// Pushes a finished operand, first handing it to every postfix operator
    /// waiting on top of the operator stack.
    fn push_operand(&self, stacks: &mut Stacks, arena: &mut Arena, operand: NodePos, callee_follows: bool) {
        let mut operand = operand;
        if !callee_follows {
            while let Some(top) = stacks.operators.last()
                  && self.config.fixity(top) == Some(Notation::Postfix)
            {
                let lexeme = stacks.operators.pop().unwrap_or_default();
                operand = arena.alloc(Node::operator(lexeme, None, Some(operand)));
            }
        }
        stacks.operands.push(operand);
    }

    /// Reduces every pending operator whose level is at least `level`,
    /// stopping at the innermost open bracket.
    fn reduce_at_least(&self, stacks: &mut Stacks, level: u8, arena: &mut Arena) -> ParseResult<()> {
        while let Some(top) = stacks.operators.last() {
            if self.config.is_open_bracket(top) || self.config.level(top).unwrap_or(0) < level {
                break;
            }
            let top = stacks.operators.pop().unwrap_or_default();
            self.reduce(stacks, &top, arena)?;
        }
        Ok(())
    }

    fn close_bracket(&self, stacks: &mut Stacks, close: &str, arena: &mut Arena) -> ParseResult<()> {
        loop {
            let top = stacks.operators
                            .pop()
                            .ok_or_else(|| ParseError::UnbalancedBrackets { bracket: close.to_string() })?;
            if self.config.is_open_bracket(&top) {
                if self.config.closing_bracket(&top) == Some(close) {
                    return Ok(());
                }
                return Err(ParseError::UnbalancedBrackets { bracket: top });
            }
            self.reduce(stacks, &top, arena)?;
        }
    }

    fn reduce(&self, stacks: &mut Stacks, operator: &str, arena: &mut Arena) -> ParseResult<()> {
        let missing = || ParseError::MissingOperand { operator: operator.to_string() };
        let node = match self.config.fixity(operator) {
            Some(Notation::Infix) => {
                let right = stacks.operands.pop().ok_or_else(missing)?;
                let left = stacks.operands.pop().ok_or_else(missing)?;
                Node::operator(operator, Some(left), Some(right))
            },
            Some(Notation::Postfix) => {
                let operand = stacks.operands.pop().ok_or_else(missing)?;
                Node::operator(operator, None, Some(operand))
            },
            _ => {
                return Err(ParseError::UnexpectedLexeme { lexeme:  operator.to_string(),
                                                          details: "only infix and postfix operators wait on the stack".to_string(), });
            },
        };
        stacks.operands.push(arena.alloc(node));
        Ok(())
    }
}

/// Applies `callee` to the tuple literal `arguments`.
///
/// A function literal that has no arguments yet takes the tuple as its own
/// right child; any other callee is wrapped in an application node.
fn apply(callee: NodePos, arguments: NodePos, arena: &mut Arena) -> NodePos {
    let is_bare_literal = arena.get(callee)
                               .is_some_and(|node| node.state == NodeState::Function && node.right.is_none());
    if is_bare_literal {
        arena.set_right(callee, Some(arguments));
        callee
    } else {
        arena.alloc(Node::operator(APPLY, Some(callee), Some(arguments)))
    }
}
