use crate::{
    ast::Notation,
    error::RuntimeError,
    interpreter::{
        evaluator::core::{EvalContext, EvalResult},
        types::core::RuntimeType,
        value::{
            core::{Value, ValueKind},
            function::Function,
        },
    },
    util::num::{f64_to_address, f64_to_u64_checked, u64_to_f64_checked},
};

/// Signature shared by every built-in operator body.
pub type BuiltinFn = fn(&mut EvalContext<'_>, &[Value]) -> EvalResult<Value>;

/// One entry of the built-in catalog.
#[derive(Debug, Clone, Copy)]
pub struct BuiltinOperator {
    /// The lexeme the operator is written and registered as.
    pub lexeme:   &'static str,
    /// How the operator is written.
    pub notation: Notation,
    /// Precedence level; higher binds tighter.
    pub level:    u8,
    /// Builds the declared parameter type.
    pub params:   fn() -> RuntimeType,
    /// Builds the declared return type.
    pub returns:  fn() -> RuntimeType,
    /// Number of parameters.
    pub arity:    usize,
    /// The native body.
    pub func:     BuiltinFn,
}

impl BuiltinOperator {
    /// Builds the registrable function of this entry.
    ///
    /// # Errors
    /// Returns `RuntimeError::LambdaConstruction` if the declared types do
    /// not fit the arity.
    pub fn function(&self) -> EvalResult<Function> {
        Function::native(self.lexeme,
                         self.notation,
                         (self.returns)(),
                         (self.params)(),
                         self.arity,
                         self.func)
    }
}

macro_rules! builtin_operators {
    (
        $(
            $lexeme:literal => {
                notation: $notation:expr,
                level: $level:expr,
                params: $params:expr,
                returns: $returns:expr,
                arity: $arity:expr,
                func: $func:expr $(,)?
            }
        ),* $(,)?
    ) => {
        /// Every built-in operator, in declaration order.
        ///
        /// # Example
        /// ```
        /// use calctree::{ast::Notation, interpreter::evaluator::catalog::builtin_operators};
        ///
        /// let power = builtin_operators().into_iter().find(|op| op.lexeme == "^").unwrap();
        /// assert_eq!(power.notation, Notation::Infix);
        /// assert_eq!(power.level, 4);
        /// ```
        #[must_use]
        pub fn builtin_operators() -> Vec<BuiltinOperator> {
            vec![
                $(
                    BuiltinOperator { lexeme: $lexeme,
                                      notation: $notation,
                                      level: $level,
                                      params: $params,
                                      returns: $returns,
                                      arity: $arity,
                                      func: $func },
                )*
            ]
        }

        /// Lexemes of every built-in operator.
        pub const BUILTIN_OPERATORS: &[&str] = &[
            $($lexeme,)*
        ];
    };
}

builtin_operators! {
    "<-"    => { notation: Notation::Infix,    level: 0, params: RuntimeType::any_tuple, returns: RuntimeType::number,  arity: 2, func: store },
    "=="    => { notation: Notation::Infix,    level: 1, params: pair,                   returns: RuntimeType::number,  arity: 2, func: equal },
    "!="    => { notation: Notation::Infix,    level: 1, params: pair,                   returns: RuntimeType::number,  arity: 2, func: not_equal },
    "<"     => { notation: Notation::Infix,    level: 1, params: pair,                   returns: RuntimeType::number,  arity: 2, func: less },
    ">"     => { notation: Notation::Infix,    level: 1, params: pair,                   returns: RuntimeType::number,  arity: 2, func: greater },
    "<="    => { notation: Notation::Infix,    level: 1, params: pair,                   returns: RuntimeType::number,  arity: 2, func: less_equal },
    ">="    => { notation: Notation::Infix,    level: 1, params: pair,                   returns: RuntimeType::number,  arity: 2, func: greater_equal },
    "+"     => { notation: Notation::Infix,    level: 2, params: pair,                   returns: RuntimeType::number,  arity: 2, func: add },
    "-"     => { notation: Notation::Infix,    level: 2, params: pair,                   returns: RuntimeType::number,  arity: 2, func: subtract },
    "*"     => { notation: Notation::Infix,    level: 3, params: pair,                   returns: RuntimeType::number,  arity: 2, func: multiply },
    "/"     => { notation: Notation::Infix,    level: 3, params: pair,                   returns: RuntimeType::number,  arity: 2, func: divide },
    "%"     => { notation: Notation::Infix,    level: 3, params: pair,                   returns: RuntimeType::number,  arity: 2, func: remainder },
    "^"     => { notation: Notation::Infix,    level: 4, params: pair,                   returns: RuntimeType::number,  arity: 2, func: power },
    "!"     => { notation: Notation::Prefix,   level: 5, params: RuntimeType::number,    returns: RuntimeType::number,  arity: 1, func: factorial },
    "sqrt"  => { notation: Notation::Postfix,  level: 9, params: RuntimeType::number,    returns: RuntimeType::number,  arity: 1, func: sqrt },
    "ln"    => { notation: Notation::Postfix,  level: 9, params: RuntimeType::number,    returns: RuntimeType::number,  arity: 1, func: ln },
    "sin"   => { notation: Notation::Postfix,  level: 9, params: RuntimeType::number,    returns: RuntimeType::number,  arity: 1, func: sin },
    "cos"   => { notation: Notation::Postfix,  level: 9, params: RuntimeType::number,    returns: RuntimeType::number,  arity: 1, func: cos },
    "abs"   => { notation: Notation::Postfix,  level: 9, params: RuntimeType::number,    returns: RuntimeType::number,  arity: 1, func: abs },
    "floor" => { notation: Notation::Postfix,  level: 9, params: RuntimeType::number,    returns: RuntimeType::number,  arity: 1, func: floor },
    "sigma" => { notation: Notation::Postfix,  level: 9, params: RuntimeType::any_tuple, returns: RuntimeType::number,  arity: 1, func: sigma },
    "mem"   => { notation: Notation::Postfix,  level: 9, params: RuntimeType::number,    returns: RuntimeType::number,  arity: 1, func: recall },
    "ref"   => { notation: Notation::Postfix,  level: 9, params: RuntimeType::number,    returns: RuntimeType::pointer, arity: 1, func: reference },
    "deref" => { notation: Notation::Postfix,  level: 9, params: RuntimeType::pointer,   returns: RuntimeType::number,  arity: 1, func: dereference },
    "pi"    => { notation: Notation::Constant, level: 0, params: nothing,                returns: RuntimeType::number,  arity: 0, func: pi },
    "e"     => { notation: Notation::Constant, level: 0, params: nothing,                returns: RuntimeType::number,  arity: 0, func: euler },
}

fn pair() -> RuntimeType {
    RuntimeType::tuple(vec![RuntimeType::number(), RuntimeType::number()])
}

fn nothing() -> RuntimeType {
    RuntimeType::tuple(Vec::new())
}

fn operand(args: &[Value], origin: &str) -> EvalResult<f64> {
    match args {
        [value] => value.as_number(origin),
        _ => Err(RuntimeError::ArgumentCountMismatch { expected: 1,
                                                       found:    args.len(),
                                                       origin:   origin.to_string(), }),
    }
}

fn operands(args: &[Value], origin: &str) -> EvalResult<(f64, f64)> {
    match args {
        [left, right] => Ok((left.as_number(origin)?, right.as_number(origin)?)),
        _ => Err(RuntimeError::ArgumentCountMismatch { expected: 2,
                                                       found:    args.len(),
                                                       origin:   origin.to_string(), }),
    }
}

/// Defines an infix operator computing a number from two numbers.
macro_rules! arithmetic {
    ($fname:ident, $lexeme:literal, |$a:ident, $b:ident| $body:expr) => {
        fn $fname(_: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
            let ($a, $b) = operands(args, $lexeme)?;
            Ok(Value::number($body))
        }
    };
}

arithmetic!(add, "+", |a, b| a + b);
arithmetic!(subtract, "-", |a, b| a - b);
arithmetic!(multiply, "*", |a, b| a * b);
arithmetic!(power, "^", |a, b| a.powf(b));

/// Defines a comparison yielding `1` when it holds and `0` otherwise.
macro_rules! comparison {
    ($fname:ident, $lexeme:literal, $op:tt) => {
        #[allow(clippy::float_cmp)]
        fn $fname(_: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
            let (a, b) = operands(args, $lexeme)?;
            Ok(Value::number(if a $op b { 1.0 } else { 0.0 }))
        }
    };
}

comparison!(equal, "==", ==);
comparison!(not_equal, "!=", !=);
comparison!(less, "<", <);
comparison!(greater, ">", >);
comparison!(less_equal, "<=", <=);
comparison!(greater_equal, ">=", >=);

fn divide(_: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let (a, b) = operands(args, "/")?;
    if b == 0.0 {
        return Err(RuntimeError::DivisionByZero { origin: "/".to_string() });
    }
    Ok(Value::number(a / b))
}

fn remainder(_: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let (a, b) = operands(args, "%")?;
    if b == 0.0 {
        return Err(RuntimeError::DivisionByZero { origin: "%".to_string() });
    }
    Ok(Value::number(a % b))
}

/// Defines a postfix operator applying an `f64` method to its operand.
macro_rules! unary {
    ($fname:ident, $lexeme:literal, $method:ident) => {
        fn $fname(_: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
            Ok(Value::number(operand(args, $lexeme)?.$method()))
        }
    };
}

unary!(sin, "sin", sin);
unary!(cos, "cos", cos);
unary!(abs, "abs", abs);
unary!(floor, "floor", floor);

fn sqrt(_: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let x = operand(args, "sqrt")?;
    if x < 0.0 {
        return Err(RuntimeError::InvalidArgument { details: format!("cannot take the square root of {x}"),
                                                   origin:  "sqrt".to_string(), });
    }
    Ok(Value::number(x.sqrt()))
}

fn ln(_: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let x = operand(args, "ln")?;
    if x <= 0.0 {
        return Err(RuntimeError::InvalidArgument { details: format!("logarithm of non-positive value {x}"),
                                                   origin:  "ln".to_string(), });
    }
    Ok(Value::number(x.ln()))
}

/// `n!` for a non-negative integer `n`.
fn factorial(_: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let n = f64_to_u64_checked(operand(args, "!")?, "!")?;
    let product = (2..=n).try_fold(1_u64, u64::checked_mul)
                         .ok_or_else(|| RuntimeError::LiteralTooLarge { origin: "!".to_string() })?;
    Ok(Value::number(u64_to_f64_checked(product, "!")?))
}

/// Sums every number of a tuple, descending into nested tuples.
fn sigma(_: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let mut total = 0.0;
    let mut pending: Vec<&Value> = args.iter().rev().collect();
    while let Some(value) = pending.pop() {
        match value.kind() {
            ValueKind::Number(number) => total += number,
            ValueKind::Tuple(storage) => pending.extend(storage.elements().iter().rev()),
            _ => return Err(RuntimeError::ExpectedNumber { origin: "sigma".to_string() }),
        }
    }
    Ok(Value::number(total))
}

/// A number, dereferencing node pointers first.
fn number_behind(ctx: &mut EvalContext<'_>, value: &Value, origin: &str) -> EvalResult<f64> {
    match value.kind() {
        ValueKind::NodePointer(_) => value.deref(ctx)?.as_number(origin),
        _ => value.as_number(origin),
    }
}

/// `address <- value`: stores the number in the memory cell at the
/// truncated address and yields it. Cells hold numbers only, since `mem` is
/// declared to return a number, so a tuple or function operand is rejected
/// with `ExpectedNumber`. Pointers on either side are dereferenced first.
fn store(ctx: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let [address, value] = args else {
        return Err(RuntimeError::ArgumentCountMismatch { expected: 2,
                                                         found:    args.len(),
                                                         origin:   "<-".to_string(), });
    };
    let address = f64_to_address(number_behind(ctx, address, "<-")?, "<-")?;
    let stored = Value::number(number_behind(ctx, value, "<-")?);
    ctx.memory.write(address, stored.clone());
    Ok(stored)
}

fn recall(ctx: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let address = f64_to_address(operand(args, "mem")?, "mem")?;
    Ok(ctx.memory.read(address))
}

/// A pointer to a tree holding the operand.
fn reference(ctx: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let [value] = args else {
        return Err(RuntimeError::ArgumentCountMismatch { expected: 1,
                                                         found:    args.len(),
                                                         origin:   "ref".to_string(), });
    };
    Ok(Value::pointer(value.tree(ctx.arena)))
}

fn dereference(ctx: &mut EvalContext<'_>, args: &[Value]) -> EvalResult<Value> {
    let [pointer] = args else {
        return Err(RuntimeError::ArgumentCountMismatch { expected: 1,
                                                         found:    args.len(),
                                                         origin:   "deref".to_string(), });
    };
    let pointee = pointer.deref(ctx)?;
    Ok(Value::number(pointee.as_number("deref")?))
}

fn pi(_: &mut EvalContext<'_>, _: &[Value]) -> EvalResult<Value> {
    Ok(Value::number(std::f64::consts::PI))
}

fn euler(_: &mut EvalContext<'_>, _: &[Value]) -> EvalResult<Value> {
    Ok(Value::number(std::f64::consts::E))
}
