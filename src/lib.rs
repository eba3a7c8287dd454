// ccalc
//
// An interactive calculator over complex numbers: variables, user-defined
// functions with optional parameters, sum/product aggregations and
// trigonometry, with precise error diagnostics.

// Public modules
pub mod ast;
pub mod error;
pub mod evaluator;
pub mod function;
pub mod lexer;
pub mod parser;
pub mod repl;
pub mod runner;
pub mod symbols;
pub mod trig;
pub mod value;

// Re-export commonly used items
pub use ast::{Expr, Parameter, Program};
pub use error::{CalcError, ErrorKind, Span};
pub use evaluator::Evaluator;
pub use function::Function;
pub use lexer::{Lexer, Token, TokenType};
pub use parser::Parser;
pub use symbols::{SymbolTable, Value};
pub use trig::AngleUnit;
pub use value::Complex;

// Re-export main functions
pub use repl::start as start_repl;
pub use runner::run;
