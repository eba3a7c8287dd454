use std::fmt;
use std::ops;

/// An immutable complex number. Every operation returns a new value; the
/// fallible ones (division, factorial, logarithm) return a message the
/// evaluator attaches to the offending node's span.
#[derive(Debug, Clone, Copy)]
pub struct Complex {
    pub real: f64,
    pub imaginary: f64,
}

pub const ZERO: Complex = Complex::new(0.0, 0.0);
pub const ONE: Complex = Complex::new(1.0, 0.0);
pub const I: Complex = Complex::new(0.0, 1.0);
pub const E: Complex = Complex::new(std::f64::consts::E, 0.0);
pub const PI: Complex = Complex::new(std::f64::consts::PI, 0.0);

impl Complex {
    pub const fn new(real: f64, imaginary: f64) -> Self {
        Self { real, imaginary }
    }

    pub const fn real(x: f64) -> Self {
        Self::new(x, 0.0)
    }

    pub fn is_real(&self) -> bool {
        self.imaginary == 0.0
    }

    pub fn is_imaginary(&self) -> bool {
        self.real == 0.0
    }

    pub fn is_zero(&self) -> bool {
        *self == ZERO
    }

    /// A real value with an integral real part.
    pub fn is_integer(&self) -> bool {
        self.is_real() && self.real == self.real.trunc()
    }

    pub fn conjugate(&self) -> Self {
        Self::new(self.real, -self.imaginary)
    }

    pub fn negate(&self) -> Self {
        Self::new(-self.real, -self.imaginary)
    }

    fn modulus_square(&self) -> f64 {
        self.real * self.real + self.imaginary * self.imaginary
    }

    /// The modulus; for real numbers this is the absolute value.
    pub fn modulus(&self) -> f64 {
        self.modulus_square().sqrt()
    }

    /// The principal argument. The purely-imaginary and negative-real-axis
    /// cases are handled before the quadrant-adjusted arctangent.
    pub fn argument(&self) -> f64 {
        if self.is_imaginary() {
            if self.imaginary == 0.0 {
                return 0.0;
            }
            return self.imaginary.signum() * std::f64::consts::FRAC_PI_2;
        }

        if self.is_real() && self.real < 0.0 {
            return std::f64::consts::PI;
        }

        let x = (self.imaginary / self.real).atan();

        if self.real > 0.0 {
            x
        } else {
            self.imaginary.signum() * std::f64::consts::PI + x
        }
    }

    /// Division. Fails on a zero divisor. A purely-real divisor divides
    /// componentwise, which loses less precision than the conjugate route.
    pub fn divide(&self, other: &Complex) -> Result<Complex, String> {
        if other.is_zero() {
            return Err("Division by 0!".to_string());
        }

        if other.is_real() {
            return Ok(Complex::new(
                self.real / other.real,
                self.imaginary / other.real,
            ));
        }

        let conj = other.conjugate();
        let divisor = other.modulus_square();

        (*self * conj).divide(&Complex::real(divisor))
    }

    /// Division with each component truncated toward zero.
    pub fn int_divide(&self, other: &Complex) -> Result<Complex, String> {
        let quot = self.divide(other)?;
        Ok(Complex::new(quot.real.trunc(), quot.imaginary.trunc()))
    }

    pub fn reciprocal(&self) -> Result<Complex, String> {
        ONE.divide(self)
    }

    /// Exponentiation via `a^b = e^(b ln a)`. The base-e case is computed
    /// directly as `e^x (cos y + i sin y)` so it never recurses through the
    /// logarithm. A zero base short-circuits: `ln 0` is infinite and would
    /// poison the identity with NaN. `0^0` is taken as 1, exponents with a
    /// positive real part give 0, the rest diverge.
    pub fn pow(&self, other: &Complex) -> Complex {
        if self.is_zero() {
            if other.is_zero() {
                return ONE;
            }
            if other.real > 0.0 {
                return ZERO;
            }
            return Complex::real(f64::INFINITY);
        }

        if *self != E {
            return E.pow(&(self.natural_log() * *other));
        }

        let real_exp = Complex::real(other.real.exp());
        let im_exp = Complex::new(other.imaginary.cos(), other.imaginary.sin());

        real_exp * im_exp
    }

    /// The natural logarithm, `ln z = ln |z| + i arg(z)`.
    pub fn natural_log(&self) -> Complex {
        Complex::new(self.modulus().ln(), self.argument())
    }

    /// Logarithm to the given base. Base e returns the natural log directly.
    pub fn log(&self, base: &Complex) -> Result<Complex, String> {
        let natural = self.natural_log();

        if *base == E {
            return Ok(natural);
        }

        natural.divide(&base.natural_log())
    }

    /// `root(a, b) = a^(1/b)`.
    pub fn root(&self, other: &Complex) -> Result<Complex, String> {
        Ok(self.pow(&other.reciprocal()?))
    }

    /// Factorial, defined for non-negative integers only.
    pub fn factorial(&self) -> Result<Complex, String> {
        if !self.is_integer() || self.real < 0.0 {
            return Err(format!("Can't compute factorial for value: {self}"));
        }

        let mut fact = 1.0;
        for i in 1..=(self.real as i64) {
            fact *= i as f64;
        }

        Ok(Complex::real(fact))
    }

    pub fn floor(&self) -> Self {
        Self::new(self.real.floor(), self.imaginary.floor())
    }

    pub fn ceil(&self) -> Self {
        Self::new(self.real.ceil(), self.imaginary.ceil())
    }
}

impl ops::Add for Complex {
    type Output = Complex;

    fn add(self, rhs: Complex) -> Complex {
        Complex::new(self.real + rhs.real, self.imaginary + rhs.imaginary)
    }
}

impl ops::Sub for Complex {
    type Output = Complex;

    fn sub(self, rhs: Complex) -> Complex {
        Complex::new(self.real - rhs.real, self.imaginary - rhs.imaginary)
    }
}

impl ops::Mul for Complex {
    type Output = Complex;

    /// `(a + bi)(c + di) = (ac - bd) + (ad + bc)i`
    fn mul(self, rhs: Complex) -> Complex {
        Complex::new(
            self.real * rhs.real - self.imaginary * rhs.imaginary,
            self.real * rhs.imaginary + self.imaginary * rhs.real,
        )
    }
}

impl ops::Neg for Complex {
    type Output = Complex;

    fn neg(self) -> Complex {
        self.negate()
    }
}

impl PartialEq for Complex {
    /// Componentwise equality.
    fn eq(&self, other: &Self) -> bool {
        self.real == other.real && self.imaginary == other.imaginary
    }
}

fn format_part(x: f64, imaginary: bool) -> String {
    if x == 0.0 {
        return String::new();
    }

    let mut val = format!("{x}");

    if imaginary && x.abs() == 1.0 {
        val = if x < 0.0 { "-".to_string() } else { String::new() };
    }

    if imaginary {
        val.push('i');
    }

    val
}

impl fmt::Display for Complex {
    /// Renders like `0`, `3`, `i`, `-i`, `2i`, `3 + 2i`, `3 - i`.
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_zero() {
            return write!(f, "0");
        }

        let im = format_part(self.imaginary, true);

        if self.is_imaginary() {
            return write!(f, "{im}");
        }

        let re = format_part(self.real, false);

        if self.is_real() {
            return write!(f, "{re}");
        }

        let sign = if self.imaginary > 0.0 { "+" } else { "-" };
        let im = im.strip_prefix('-').unwrap_or(&im);

        write!(f, "{re} {sign} {im}")
    }
}
