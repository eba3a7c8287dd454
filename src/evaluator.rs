use crate::ast::{AggregateKind, BinaryOp, Expr, UnaryOp};
use crate::error::{CalcError, Span};
use crate::function::{self, Function};
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::symbols::{SymbolTable, Value};
use crate::trig::AngleUnit;
use crate::value::{self, Complex};

use std::rc::Rc;

/// The native and derived definitions every session starts with.
const BUILTINS: &str = include_str!("builtins.txt");

/// A tree-walking evaluator with persistent session state. Each `evaluate`
/// call lexes, parses and runs one input against the same symbol table.
pub struct Evaluator {
    symbols: SymbolTable,
    angle_unit: AngleUnit,
}

impl Evaluator {
    pub fn new() -> Self {
        let mut evaluator = Self {
            symbols: SymbolTable::new(),
            angle_unit: AngleUnit::default(),
        };

        evaluator.load_builtins();
        evaluator
    }

    /// Loads the bundled definitions and constants, then protects them all
    /// so user code can't rebind or delete them.
    fn load_builtins(&mut self) {
        self.evaluate(BUILTINS)
            .expect("bundled built-in definitions failed to load");

        let constants = [
            ("pi", value::PI),
            ("\u{03C0}", value::PI),
            ("e", value::E),
            ("i", value::I),
        ];
        for (name, constant) in constants {
            self.symbols
                .insert(name.to_string(), Value::Number(constant));
        }

        self.symbols.protect_existing();
    }

    /// Runs one input. Returns the values of the visible statements in
    /// order; assignments and function definitions update the session
    /// silently. The first error aborts the remainder of the input.
    pub fn evaluate(&mut self, source: &str) -> Result<Vec<Complex>, CalcError> {
        let mut lexer = Lexer::new(source.to_string());
        let tokens = lexer.scan_tokens()?;

        let mut parser = Parser::new(tokens).with_known_variables(self.symbols.variable_names());
        let program = parser.parse()?;

        let mut results = Vec::new();
        for statement in &program.statements {
            let result = self.eval(statement)?;
            if !statement.is_silent() {
                results.push(result);
            }
        }

        Ok(results)
    }

    pub fn angle_unit(&self) -> AngleUnit {
        self.angle_unit
    }

    pub fn set_angle_unit(&mut self, unit: AngleUnit) {
        self.angle_unit = unit;
    }

    /// Deletes a user-defined global, for the shell's `del` command.
    pub fn remove_global(&mut self, name: &str) -> Result<bool, String> {
        self.symbols.remove_global(name)
    }

    fn eval(&mut self, expr: &Expr) -> Result<Complex, CalcError> {
        match expr {
            Expr::Number { value, .. } => Ok(*value),

            Expr::Identifier { name, span } => match self.symbols.get(name) {
                Some(Value::Number(n)) => Ok(*n),
                Some(Value::Function(_)) => Err(CalcError::undefined_name(
                    span.clone(),
                    format!("'{name}' is a function, not a variable"),
                )),
                None => Err(CalcError::undefined_name(
                    span.clone(),
                    format!("Undefined variable: '{name}'"),
                )),
            },

            Expr::Assign { name, value, span } => {
                let result = self.eval(value)?;
                self.symbols
                    .set_global(name, Value::Number(result))
                    .map_err(|message| CalcError::redefinition(span.clone(), message))?;
                Ok(result)
            }

            Expr::Binary {
                left,
                operator,
                right,
                span,
            } => {
                let l = self.eval(left)?;
                let r = self.eval(right)?;

                match operator {
                    BinaryOp::Add => Ok(l + r),
                    BinaryOp::Subtract => Ok(l - r),
                    BinaryOp::Multiply => Ok(l * r),
                    BinaryOp::Power => Ok(l.pow(&r)),
                    BinaryOp::Divide => l
                        .divide(&r)
                        .map_err(|message| CalcError::math_error(span.clone(), message)),
                    BinaryOp::IntDivide => l
                        .int_divide(&r)
                        .map_err(|message| CalcError::math_error(span.clone(), message)),
                }
            }

            Expr::Unary {
                operator,
                operand,
                span,
            } => {
                let v = self.eval(operand)?;

                match operator {
                    UnaryOp::Plus => Ok(v),
                    UnaryOp::Negate => Ok(v.negate()),
                    UnaryOp::Conjugate => Ok(v.conjugate()),
                    UnaryOp::Abs => Ok(Complex::real(v.modulus())),
                    UnaryOp::Factorial => v
                        .factorial()
                        .map_err(|message| CalcError::math_error(span.clone(), message)),
                }
            }

            Expr::Call { name, args, span } => self.eval_call(name, args, span),

            Expr::FuncDef {
                name,
                params,
                body,
                span,
            } => {
                let function =
                    Function::new(name.clone(), params.clone(), body.as_deref().cloned());
                self.symbols
                    .set_global(name, Value::Function(Rc::new(function)))
                    .map_err(|message| CalcError::redefinition(span.clone(), message))?;
                Ok(value::ZERO)
            }

            Expr::SigmaPi {
                kind,
                var,
                init,
                upper,
                body,
                span,
            } => self.eval_sigma_pi(kind, var, init, upper, body, span),
        }
    }

    fn eval_call(&mut self, name: &str, args: &[Expr], span: &Span) -> Result<Complex, CalcError> {
        let function = match self.symbols.get(name) {
            Some(Value::Function(f)) => Rc::clone(f),
            Some(Value::Number(_)) => {
                return Err(CalcError::undefined_name(
                    span.clone(),
                    format!("'{name}' is not a function"),
                ));
            }
            None => {
                return Err(CalcError::undefined_name(
                    span.clone(),
                    format!("Undefined function: '{name}'"),
                ));
            }
        };

        let min = function.min_arity();
        let max = function.max_arity();

        if args.len() < min {
            return Err(CalcError::arity_error(
                span.clone(),
                format!(
                    "Function '{name}' expects at least {min} argument(s), found {}",
                    args.len()
                ),
            ));
        }
        if args.len() > max {
            return Err(CalcError::arity_error(
                span.clone(),
                format!(
                    "Function '{name}' expects at most {max} argument(s), found {}",
                    args.len()
                ),
            ));
        }

        // Supplied arguments are evaluated against the caller's scope,
        // before the callee's scope exists.
        let mut supplied = Vec::with_capacity(args.len());
        for arg in args {
            supplied.push(self.eval(arg)?);
        }

        function
            .enter()
            .map_err(|message| CalcError::math_error(span.clone(), message))?;
        self.symbols.push_scope();

        // The closure guarantees the scope pop and depth decrement run on
        // every exit path, including errors.
        let result = (|| {
            for (param, argument) in function.params.iter().zip(&supplied) {
                self.symbols
                    .insert(param.name.clone(), Value::Number(*argument));
            }

            // Omitted optionals evaluate their defaults in the new scope,
            // so a default may reference parameters bound before it.
            for param in function.params.iter().skip(supplied.len()) {
                if let Some(default) = &param.default {
                    let fallback = self.eval(default)?;
                    self.symbols
                        .insert(param.name.clone(), Value::Number(fallback));
                }
            }

            match &function.body {
                Some(body) => self.eval(body),
                None => {
                    let mut arguments = Vec::with_capacity(function.params.len());
                    for param in &function.params {
                        if let Some(Value::Number(n)) = self.symbols.get(&param.name) {
                            arguments.push(*n);
                        }
                    }

                    function::dispatch_native(name, &arguments, self.angle_unit)
                        .map_err(|message| CalcError::math_error(span.clone(), message))
                }
            }
        })();

        self.symbols.pop_scope();
        function.exit();

        result
    }

    fn eval_sigma_pi(
        &mut self,
        kind: &AggregateKind,
        var: &str,
        init: &Expr,
        upper: &Expr,
        body: &Expr,
        span: &Span,
    ) -> Result<Complex, CalcError> {
        if self.symbols.contains(var) {
            return Err(CalcError::redefinition(
                span.clone(),
                format!("Variable '{var}' is already defined"),
            ));
        }

        let init_value = self.eval(init)?;
        let upper_value = self.eval(upper)?;

        if !init_value.is_real() || !upper_value.is_real() {
            return Err(CalcError::math_error(
                span.clone(),
                format!(
                    "Aggregation bounds must be real, found {init_value} and {upper_value}"
                ),
            ));
        }

        let mut accumulated = match kind {
            AggregateKind::Sum => value::ZERO,
            AggregateKind::Product => value::ONE,
        };
        let mut counter = init_value.real;

        self.symbols
            .insert(var.to_string(), Value::Number(Complex::real(counter)));

        // The bound variable is removed on every exit path.
        let result = (|| {
            while counter <= upper_value.real {
                self.symbols
                    .insert(var.to_string(), Value::Number(Complex::real(counter)));
                let term = self.eval(body)?;

                accumulated = match kind {
                    AggregateKind::Sum => accumulated + term,
                    AggregateKind::Product => accumulated * term,
                };
                counter += 1.0;
            }

            Ok(accumulated)
        })();

        self.symbols.remove(var);
        result
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}
