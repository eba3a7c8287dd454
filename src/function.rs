use crate::ast::{Expr, Parameter};
use crate::trig::{self, AngleUnit};
use crate::value::Complex;

use std::cell::Cell;
use std::fmt;

pub const MAX_RECURSION_DEPTH: u32 = 100;

/// A user-defined or native function. Natives have no body and are
/// dispatched by name; everything else evaluates its body expression in a
/// fresh local scope.
#[derive(Debug)]
pub struct Function {
    pub name: String,
    pub params: Vec<Parameter>,
    pub body: Option<Expr>,
    depth: Cell<u32>,
}

impl Function {
    pub fn new(name: String, params: Vec<Parameter>, body: Option<Expr>) -> Self {
        Self {
            name,
            params,
            body,
            depth: Cell::new(0),
        }
    }

    pub fn is_native(&self) -> bool {
        self.body.is_none()
    }

    /// Required parameters come first, so the minimum arity is their count.
    pub fn min_arity(&self) -> usize {
        self.params.iter().filter(|p| p.is_required()).count()
    }

    pub fn max_arity(&self) -> usize {
        self.params.len()
    }

    /// Records one level of re-entry, failing once the depth limit is hit.
    /// Every successful `enter` must be paired with an `exit`.
    pub fn enter(&self) -> Result<(), String> {
        if self.depth.get() >= MAX_RECURSION_DEPTH {
            return Err(format!(
                "Maximum recursion depth ({MAX_RECURSION_DEPTH}) exceeded in function '{}'",
                self.name
            ));
        }

        self.depth.set(self.depth.get() + 1);
        Ok(())
    }

    pub fn exit(&self) {
        self.depth.set(self.depth.get().saturating_sub(1));
    }
}

impl fmt::Display for Function {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let params = self
            .params
            .iter()
            .map(|p| {
                if p.is_required() {
                    p.name.clone()
                } else {
                    format!("{} = ...", p.name)
                }
            })
            .collect::<Vec<_>>()
            .join(", ");

        write!(f, "fn {}({})", self.name, params)?;

        if self.is_native() {
            write!(f, " native")?;
        }

        Ok(())
    }
}

/// Runs a native function over already-evaluated arguments. Argument counts
/// are enforced by the caller through the declared parameters, so a shape
/// mismatch here means the declaration itself is wrong.
pub fn dispatch_native(
    name: &str,
    args: &[Complex],
    unit: AngleUnit,
) -> Result<Complex, String> {
    match (name, args) {
        ("root", [x, n]) => x.root(n),
        ("log", [x, b]) => x.log(b),

        ("sin", [x]) => trig::sin(x, unit),
        ("cos", [x]) => trig::cos(x, unit),
        ("tan", [x]) => trig::tan(x, unit),
        ("cot", [x]) => trig::cot(x, unit),
        ("sec", [x]) => trig::sec(x, unit),
        ("cosec", [x]) => trig::cosec(x, unit),

        ("asin", [x]) => trig::asin(x, unit),
        ("acos", [x]) => trig::acos(x, unit),
        ("atan", [x]) => trig::atan(x, unit),
        ("acot", [x]) => trig::acot(x, unit),

        ("floor", [x]) => Ok(x.floor()),
        ("ceil", [x]) => Ok(x.ceil()),
        ("arg", [x]) => Ok(Complex::real(x.argument())),

        _ => Err(format!(
            "Native function implementation not available for '{name}'"
        )),
    }
}
