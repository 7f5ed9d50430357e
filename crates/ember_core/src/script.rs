//! Boundary with the embedded formula runtime.
//!
//! The runtime itself lives outside the engine core; objects only need to
//! compile a handler once (when configuration is applied) and run it later
//! with a small argument object.

use std::rc::Rc;

use crate::callable::Callable;
use crate::error::FieldError;
use crate::value::Value;

/// A compiled formula.
pub trait Formula {
    /// Evaluates the formula with `args` in scope.  The result is usually a
    /// command value to be handed back to [`Environment::execute_command`].
    fn execute(&self, args: &dyn Callable) -> Result<Value, FieldError>;
}

/// The callable environment widgets and game objects are created in.
pub trait Environment {
    /// Compiles formula source (a string, or an already-built function value).
    fn create_formula(&self, source: &Value) -> Result<Rc<dyn Formula>, FieldError>;

    /// Applies the command produced by running a formula.
    fn execute_command(&self, command: Value) -> Result<(), FieldError>;
}

/// Runs `formula` with `args` and applies its result in `env`.
pub fn run_handler(
    env: &dyn Environment,
    formula: &dyn Formula,
    args: &dyn Callable,
) -> Result<(), FieldError> {
    let command = formula.execute(args)?;
    env.execute_command(command)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::callable::MapCallable;
    use std::cell::RefCell;

    struct Echo;

    impl Formula for Echo {
        fn execute(&self, args: &dyn Callable) -> Result<Value, FieldError> {
            args.get("yscroll")
        }
    }

    #[derive(Default)]
    struct Recorder {
        commands: RefCell<Vec<Value>>,
    }

    impl Environment for Recorder {
        fn create_formula(&self, _source: &Value) -> Result<Rc<dyn Formula>, FieldError> {
            Ok(Rc::new(Echo))
        }

        fn execute_command(&self, command: Value) -> Result<(), FieldError> {
            self.commands.borrow_mut().push(command);
            Ok(())
        }
    }

    #[test]
    fn handler_result_reaches_environment() {
        let env = Recorder::default();
        let formula = env.create_formula(&"yscroll".into()).unwrap();
        let args = MapCallable::new().with("yscroll", 40);
        run_handler(&env, formula.as_ref(), &args).unwrap();
        assert_eq!(*env.commands.borrow(), vec![Value::Int(40)]);
    }

    #[test]
    fn formula_errors_skip_the_command() {
        let env = Recorder::default();
        let args = MapCallable::new();
        assert!(run_handler(&env, &Echo, &args).is_err());
        assert!(env.commands.borrow().is_empty());
    }
}
