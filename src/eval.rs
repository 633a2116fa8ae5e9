//! Tree-walking evaluator.
//!
//! Statements evaluate to a [`Flow`], the explicit protocol that threads the
//! non-local `return` signal upward: every composite statement checks whether
//! its child is `Returning` and relays the flow instead of running further
//! siblings.  Expressions evaluate to a plain [`Value`]; only a `return`
//! statement originates the signal, and a function call absorbs it.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io;
use std::io::prelude::*;
use std::rc::Rc;

use thiserror::Error;

use crate::ast::{BinaryOp, Expr, FunctionLiteral, Stmt};

#[derive(Debug, Clone)]
pub enum Value {
    /// The absent value: produced by statements, bare `return`, and functions
    /// that fall off the end of their body.
    Nil,
    Number(f64),
    /// A function value is the function literal itself; no environment is
    /// captured when the literal is evaluated.
    Function(Rc<FunctionLiteral>),
}

impl Value {
    /// Any non-zero number is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Nil => false,
            Value::Number(n) => *n != 0.0,
            Value::Function(_) => true,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Nil, Value::Nil) => true,
            (Value::Number(l), Value::Number(r)) => l == r,
            // Functions compare by identity.
            (Value::Function(l), Value::Function(r)) => Rc::ptr_eq(l, r),
            _ => false,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Nil => write!(f, "nil"),
            Value::Number(n) => write!(f, "{}", n),
            Value::Function(func) => write!(f, "function/{}", func.parameters.len()),
        }
    }
}

/// Result of evaluating a statement.
///
/// `Returning` means a `return` statement executed somewhere below: the
/// carried value must propagate upward without any further sibling statement
/// running, until a function-call boundary absorbs it.
#[derive(Debug, PartialEq)]
pub enum Flow {
    Normal(Value),
    Returning(Value),
}

impl Flow {
    /// The carried value, whether or not it is propagating a return.
    pub fn value(self) -> Value {
        match self {
            Flow::Normal(value) | Flow::Returning(value) => value,
        }
    }
}

#[derive(Debug, Error)]
pub enum RuntimeError {
    #[error("division by zero")]
    DivisionByZero,
    #[error("unbound identifier: {0}")]
    UnboundIdentifier(String),
    #[error("arity mismatch: function takes {expected} arguments, {supplied} supplied")]
    ArityMismatch { expected: usize, supplied: usize },
    #[error("expression does not evaluate to a callable value")]
    NotCallable,
    #[error("type mismatch: operand is not a number")]
    TypeMismatch,
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),
}

/// A scope frame: bindings plus an optional parent frame.
///
/// Lookup walks the parent chain outward; writes always land in this frame.
#[derive(Debug)]
pub struct Env {
    parent: Option<Rc<Env>>,
    bindings: RefCell<HashMap<String, Value>>,
}

impl Env {
    /// Creates a root frame with no parent.
    pub fn new() -> Rc<Env> {
        Rc::new(Env {
            parent: None,
            bindings: RefCell::new(HashMap::new()),
        })
    }

    pub fn with_parent(parent: Rc<Env>) -> Rc<Env> {
        Rc::new(Env {
            parent: Some(parent),
            bindings: RefCell::new(HashMap::new()),
        })
    }

    /// Binds `name` in this frame, creating or overwriting the binding.
    /// Never touches a parent frame, even when the name is bound there.
    pub fn set(&self, name: &str, value: Value) {
        self.bindings.borrow_mut().insert(name.to_string(), value);
    }

    pub fn get(&self, name: &str) -> Option<Value> {
        match self.bindings.borrow().get(name) {
            Some(value) => Some(value.clone()),
            None => self.parent.as_ref().and_then(|p| p.get(name)),
        }
    }
}

#[derive(Debug)]
pub struct Evaluator<'o, W: Write> {
    output: &'o mut W,
}

impl<'o, W: Write> Evaluator<'o, W> {
    /// Creates an evaluator writing `print` output to `output`.
    pub fn new(output: &'o mut W) -> Evaluator<'o, W> {
        Evaluator { output }
    }

    pub fn eval_stmt(&mut self, stmt: &Stmt, env: &Rc<Env>) -> Result<Flow, RuntimeError> {
        match stmt {
            Stmt::Expr(expr) => Ok(Flow::Normal(self.eval_expr(expr, env)?)),
            Stmt::Assign(name, expr) => {
                let value = self.eval_expr(expr, env)?;
                env.set(name, value);
                Ok(Flow::Normal(Value::Nil))
            }
            Stmt::Block(statements) => {
                for statement in statements {
                    if let Flow::Returning(value) = self.eval_stmt(statement, env)? {
                        return Ok(Flow::Returning(value));
                    }
                }
                // A block's computed values are discarded unless returned.
                Ok(Flow::Normal(Value::Nil))
            }
            Stmt::If {
                condition,
                then_branch,
                else_branch,
            } => {
                let flow = if self.eval_expr(condition, env)?.is_truthy() {
                    self.eval_stmt(then_branch, env)?
                } else if let Some(else_branch) = else_branch {
                    self.eval_stmt(else_branch, env)?
                } else {
                    Flow::Normal(Value::Nil)
                };
                Ok(match flow {
                    Flow::Returning(value) => Flow::Returning(value),
                    Flow::Normal(_) => Flow::Normal(Value::Nil),
                })
            }
            Stmt::While { condition, body } => {
                while self.eval_expr(condition, env)?.is_truthy() {
                    if let Flow::Returning(value) = self.eval_stmt(body, env)? {
                        return Ok(Flow::Returning(value));
                    }
                }
                Ok(Flow::Normal(Value::Nil))
            }
            Stmt::Return(expr) => {
                let value = match expr {
                    Some(expr) => self.eval_expr(expr, env)?,
                    None => Value::Nil,
                };
                Ok(Flow::Returning(value))
            }
            Stmt::Print(arguments) => {
                for (i, argument) in arguments.iter().enumerate() {
                    let value = self.eval_expr(argument, env)?;
                    if i > 0 {
                        write!(self.output, " ")?;
                    }
                    write!(self.output, "{}", value)?;
                }
                writeln!(self.output)?;
                Ok(Flow::Normal(Value::Nil))
            }
        }
    }

    fn eval_expr(&mut self, expr: &Expr, env: &Rc<Env>) -> Result<Value, RuntimeError> {
        match expr {
            Expr::Number(n) => Ok(Value::Number(*n)),
            Expr::Boolean(b) => Ok(Value::Number(if *b { 1.0 } else { 0.0 })),
            Expr::Identifier(name) => env
                .get(name)
                .ok_or_else(|| RuntimeError::UnboundIdentifier(name.clone())),
            Expr::Function(literal) => Ok(Value::Function(literal.clone())),
            Expr::Negate(operand) => {
                let n = as_number(&self.eval_expr(operand, env)?)?;
                Ok(Value::Number(-n))
            }
            Expr::Not(operand) => {
                let value = self.eval_expr(operand, env)?;
                Ok(bool_value(!value.is_truthy()))
            }
            Expr::Binary(op, lhs, rhs) => self.eval_binary(*op, lhs, rhs, env),
            Expr::Call { callee, arguments } => self.eval_call(callee, arguments, env),
        }
    }

    fn eval_binary(
        &mut self,
        op: BinaryOp,
        lhs: &Expr,
        rhs: &Expr,
        env: &Rc<Env>,
    ) -> Result<Value, RuntimeError> {
        // Both operands are always evaluated, including for && and ||:
        // the logical operators do not short-circuit.
        let left = self.eval_expr(lhs, env)?;
        let right = self.eval_expr(rhs, env)?;
        match op {
            BinaryOp::Add => Ok(Value::Number(as_number(&left)? + as_number(&right)?)),
            BinaryOp::Sub => Ok(Value::Number(as_number(&left)? - as_number(&right)?)),
            BinaryOp::Mul => Ok(Value::Number(as_number(&left)? * as_number(&right)?)),
            BinaryOp::Div => {
                let divisor = as_number(&right)?;
                if divisor == 0.0 {
                    Err(RuntimeError::DivisionByZero)
                } else {
                    Ok(Value::Number(as_number(&left)? / divisor))
                }
            }
            BinaryOp::Less => Ok(bool_value(as_number(&left)? < as_number(&right)?)),
            BinaryOp::Greater => Ok(bool_value(as_number(&left)? > as_number(&right)?)),
            BinaryOp::LessEqual => Ok(bool_value(as_number(&left)? <= as_number(&right)?)),
            BinaryOp::GreaterEqual => Ok(bool_value(as_number(&left)? >= as_number(&right)?)),
            BinaryOp::Equal => Ok(bool_value(left == right)),
            BinaryOp::NotEqual => Ok(bool_value(left != right)),
            BinaryOp::And => Ok(bool_value(left.is_truthy() && right.is_truthy())),
            BinaryOp::Or => Ok(bool_value(left.is_truthy() || right.is_truthy())),
        }
    }

    fn eval_call(
        &mut self,
        callee: &Expr,
        arguments: &[Expr],
        env: &Rc<Env>,
    ) -> Result<Value, RuntimeError> {
        // Callee and arguments are all evaluated in the caller's scope.
        let function = match self.eval_expr(callee, env)? {
            Value::Function(function) => function,
            _ => return Err(RuntimeError::NotCallable),
        };
        // Arity is checked before any argument is evaluated, so an arity
        // error is reported even when an argument expression would itself
        // fail.
        if arguments.len() != function.parameters.len() {
            return Err(RuntimeError::ArityMismatch {
                expected: function.parameters.len(),
                supplied: arguments.len(),
            });
        }

        // The frame's parent is the caller's live scope, not the scope where
        // the function literal was written: scoping is dynamic.
        let frame = Env::with_parent(env.clone());
        for (parameter, argument) in function.parameters.iter().zip(arguments) {
            let value = self.eval_expr(argument, env)?;
            frame.set(parameter, value);
        }

        // The returning flag stops here: a call expression never reports
        // itself as returning to its own caller.
        Ok(self.eval_stmt(&function.body, &frame)?.value())
    }
}

fn as_number(value: &Value) -> Result<f64, RuntimeError> {
    match value {
        Value::Number(n) => Ok(*n),
        _ => Err(RuntimeError::TypeMismatch),
    }
}

fn bool_value(b: bool) -> Value {
    Value::Number(if b { 1.0 } else { 0.0 })
}
