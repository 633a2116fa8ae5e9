//! API to control the interpreter.

use std::io::prelude::*;
use std::rc::Rc;

use thiserror::Error;

use crate::diag::SyntaxError;
use crate::eval::{Env, Evaluator, RuntimeError};
use crate::parser::Parser;
use crate::scanner::tokenize;

pub use crate::eval::{Flow, Value};

/// Tree-walk interpreter.
///
/// Each call to [`Interpreter::eval`] runs one program (a single statement,
/// usually a block) against the same global environment, so definitions made
/// by one call are visible to the next.
///
/// # Example
///
/// Invoke the interpreter a first time to define a function then additional
/// times to call this function:
///
/// ```
/// # use tinyscript::interpreter::{Interpreter, Error};
///
/// let mut output: Vec<u8> = Vec::new();
/// let mut interp = Interpreter::new(&mut output);
///
/// let func_def = r#"
///     function max(x, y) {
///         if (x > y) {
///             return x;
///         } else {
///             return y;
///         }
///     }
/// "#;
/// interp.eval(func_def)?;
///
/// interp.eval("print(max(10,20))")?;
/// interp.eval("print(max(5,4))")?;
///
/// assert_eq!(output, b"20\n5\n");
/// # Ok::<(), Error>(())
/// ```
#[derive(Debug)]
pub struct Interpreter<'t, W: Write> {
    globals: Rc<Env>,
    evaluator: Evaluator<'t, W>,
}

/// Errors the interpreter can raise.
#[derive(Debug, Error)]
pub enum Error {
    /// Error occurring during lexical or syntactic analysis.
    #[error(transparent)]
    Syntax(#[from] SyntaxError),

    /// Error occurring during evaluation.
    #[error("runtime error: {0}")]
    Runtime(#[from] RuntimeError),
}

impl<'t, W: Write> Interpreter<'t, W> {
    pub fn new(output: &'t mut W) -> Interpreter<'t, W> {
        Interpreter {
            globals: Env::new(),
            evaluator: Evaluator::new(output),
        }
    }

    /// Tokenizes, parses, and evaluates one program in the global
    /// environment, returning its final flow.
    pub fn eval(&mut self, source: &str) -> Result<Flow, Error> {
        let tokens = tokenize(source)?;
        let program = Parser::new(tokens).parse_program()?;
        Ok(self.evaluator.eval_stmt(&program, &self.globals)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn interpret(input: &str) -> Result<String, Error> {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        interp.eval(input)?;
        let output = String::from_utf8(raw_output).expect("cannot convert output to string");
        Ok(output)
    }

    #[test]
    fn print_expr() -> Result<(), Error> {
        assert_eq!(interpret("print(3*2)")?, "6\n");
        Ok(())
    }

    #[test]
    fn assign_and_print() -> Result<(), Error> {
        assert_eq!(interpret("{x = 3; print(x + 1)}")?, "4\n");
        Ok(())
    }

    #[test]
    fn countdown_loop() -> Result<(), Error> {
        let prg = r#"
            {
                n = 5;
                acc = 1;
                while (n > 1) {
                    acc = acc * n;
                    n = n - 1
                };
                print(acc)
            }
        "#;
        assert_eq!(interpret(prg)?, "120\n");
        Ok(())
    }

    #[test]
    fn definitions_persist_across_eval_calls() -> Result<(), Error> {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        interp.eval("f = function(x) {return x + x}")?;
        interp.eval("print(f(21))")?;
        assert_eq!(raw_output, b"42\n");
        Ok(())
    }

    #[test]
    fn recursive_function() -> Result<(), Error> {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        let prg = r#"
            function fact(n) {
                if (n <= 1) { return 1 };
                return n * fact(n - 1)
            }
        "#;
        interp.eval(prg)?;
        interp.eval("print(fact(5))")?;
        assert_eq!(raw_output, b"120\n");
        Ok(())
    }

    #[test]
    fn newton_square_root() -> Result<(), Error> {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        let abs = r#"
            function abs(x) {
                if (x > 0) { return x } else { return -x }
            }
        "#;
        let square_root = r#"
            function squareRoot(number) {
                guess = number / 2;
                while (abs(guess * guess - number) > tolerance) {
                    guess = (guess + number / guess) / 2;
                };
                return guess;
            }
        "#;
        interp.eval(abs)?;
        interp.eval(square_root)?;
        interp.eval("tolerance = 0.00000001")?;
        interp.eval("print(squareRoot(16) > 3.999 && squareRoot(16) < 4.001)")?;
        assert_eq!(raw_output, b"1\n");
        Ok(())
    }

    #[test]
    fn returning_flow_surfaces_to_the_caller() -> Result<(), Error> {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        assert_eq!(
            interp.eval("return 5")?,
            Flow::Returning(Value::Number(5.0))
        );
        assert_eq!(interp.eval("1 + 1")?, Flow::Normal(Value::Number(2.0)));
        Ok(())
    }

    #[test]
    fn trailing_tokens_are_ignored() -> Result<(), Error> {
        let mut raw_output: Vec<u8> = Vec::new();
        let mut interp = Interpreter::new(&mut raw_output);
        assert_eq!(interp.eval("1 2 3")?, Flow::Normal(Value::Number(1.0)));
        Ok(())
    }

    #[test]
    fn syntax_error_is_reported() {
        match interpret("while (1") {
            Err(Error::Syntax(_)) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }

    #[test]
    fn runtime_error_is_reported() {
        match interpret("1/0") {
            Err(Error::Runtime(_)) => (),
            r => panic!("unexpected output: {:?}", r),
        }
    }
}
