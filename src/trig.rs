use crate::value::{self, Complex};

use std::f64::consts::{FRAC_PI_2, PI};

const REAL_TWO: Complex = Complex::new(2.0, 0.0);
const IM_TWO: Complex = Complex::new(0.0, 2.0);
const PI_HALF: Complex = Complex::new(FRAC_PI_2, 0.0);

/// The angle unit a session interprets trigonometric inputs and outputs in.
/// Non-radian units only make sense for real angles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AngleUnit {
    #[default]
    Radians,
    Degrees,
    Gradians,
}

impl AngleUnit {
    /// Matches a (prefix of a) unit name, as typed at the shell.
    pub fn from_prefix(input: &str) -> Option<AngleUnit> {
        let lower = input.to_lowercase();
        if lower.is_empty() {
            return None;
        }

        [
            ("radians", AngleUnit::Radians),
            ("degrees", AngleUnit::Degrees),
            ("gradians", AngleUnit::Gradians),
        ]
        .into_iter()
        .find(|(name, _)| name.starts_with(&lower))
        .map(|(_, unit)| unit)
    }

    pub fn name(&self) -> &'static str {
        match self {
            AngleUnit::Radians => "radians",
            AngleUnit::Degrees => "degrees",
            AngleUnit::Gradians => "gradians",
        }
    }
}

/// `sin x = (e^(ix) - e^(-ix)) / 2i`
pub fn sin(x: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    let x = resolve_in(x, unit)?;
    let z = value::I * x;
    let a = value::E.pow(&z);
    let b = value::E.pow(&z.negate());

    (a - b).divide(&IM_TWO)
}

/// `cos x = (e^(ix) + e^(-ix)) / 2`
pub fn cos(x: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    let x = resolve_in(x, unit)?;
    let z = value::I * x;
    let a = value::E.pow(&z);
    let b = value::E.pow(&z.negate());

    (a + b).divide(&REAL_TWO)
}

pub fn tan(x: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    let x = resolve_in(x, unit)?;
    if odd_multiple_of_half_pi(&x) {
        return Err("Odd multiple of PI / 2 was given to tan!".to_string());
    }

    sin(&x, AngleUnit::Radians)?.divide(&cos(&x, AngleUnit::Radians)?)
}

pub fn sec(x: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    let x = resolve_in(x, unit)?;
    if odd_multiple_of_half_pi(&x) {
        return Err("Odd multiple of PI / 2 was given to sec!".to_string());
    }

    cos(&x, AngleUnit::Radians)?.reciprocal()
}

pub fn cosec(x: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    let x = resolve_in(x, unit)?;
    if int_multiple_of_pi(&x) {
        return Err("Multiple of PI was given to cosec!".to_string());
    }

    sin(&x, AngleUnit::Radians)?.reciprocal()
}

pub fn cot(x: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    let x = resolve_in(x, unit)?;
    if int_multiple_of_pi(&x) {
        return Err("Multiple of PI was given to cot!".to_string());
    }

    cos(&x, AngleUnit::Radians)?.divide(&sin(&x, AngleUnit::Radians)?)
}

/// `asin z = ln((1 - z^2)^(1/2) - iz)^i`, the standard logarithmic form.
pub fn asin(z: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    let x = ((value::ONE - z.pow(&REAL_TWO)).root(&REAL_TWO)? - *z * value::I)
        .pow(&value::I)
        .natural_log();

    resolve_out(&x, unit)
}

pub fn acos(z: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    let half = asin(z, AngleUnit::Radians)?;
    resolve_out(&(PI_HALF - half), unit)
}

/// `atan z = -(i/2) ln((i - z) / (i + z))`
pub fn atan(z: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    let ln = (value::I - *z).divide(&(value::I + *z))?.natural_log();
    let x = (ln * value::I).divide(&REAL_TWO)?.negate();

    resolve_out(&x, unit)
}

/// `acot z = atan(1/z)`, special-cased at zero.
pub fn acot(z: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    if z.is_zero() {
        return resolve_out(&PI_HALF, unit);
    }

    atan(&z.reciprocal()?, unit)
}

fn odd_multiple_of_half_pi(x: &Complex) -> bool {
    x.is_real() && (x.real / FRAC_PI_2 % 2.0).abs() == 1.0
}

fn int_multiple_of_pi(x: &Complex) -> bool {
    x.is_real() && x.real.abs() % PI == 0.0
}

fn resolve_in(x: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    validate_angle(x, unit)?;

    Ok(match unit {
        AngleUnit::Degrees => Complex::real(x.real.to_radians()),
        AngleUnit::Gradians => Complex::real(x.real * PI / 200.0),
        AngleUnit::Radians => *x,
    })
}

fn resolve_out(x: &Complex, unit: AngleUnit) -> Result<Complex, String> {
    validate_angle(x, unit)?;

    Ok(match unit {
        AngleUnit::Degrees => Complex::real(x.real * 180.0 / PI),
        AngleUnit::Gradians => Complex::real(x.real * 200.0 / PI),
        AngleUnit::Radians => *x,
    })
}

fn validate_angle(x: &Complex, unit: AngleUnit) -> Result<(), String> {
    if unit == AngleUnit::Radians || x.is_real() {
        return Ok(());
    }

    Err(format!(
        "Current angle unit is {}. Complex angles require radians. Received number: {x}",
        unit.name()
    ))
}
