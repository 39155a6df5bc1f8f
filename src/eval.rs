//! Safe evaluation of arithmetic expressions.
//!
//! Supports decimal integer literals, `+ - * /` with the usual precedence,
//! and prefix signs. Arithmetic is exact over `i64` rationals, so `1/3*3`
//! is exactly `1` and every overflow is reported instead of wrapping.

use crate::error::{ArithmeticFault, EvalError};
use serde::Serialize;
use std::cmp::Ordering;
use std::fmt;

/// An exact rational value with a positive, reduced denominator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Value {
    numer: i64,
    denom: i64,
}

impl Value {
    /// An integer value.
    #[must_use]
    pub const fn integer(n: i64) -> Self {
        Self { numer: n, denom: 1 }
    }

    /// Build `numer / denom`, reducing to lowest terms.
    ///
    /// # Errors
    ///
    /// Fails on a zero denominator or if normalising overflows.
    pub fn ratio(numer: i64, denom: i64) -> Result<Self, ArithmeticFault> {
        if denom == 0 {
            return Err(ArithmeticFault::DivisionByZero);
        }
        let g = gcd(numer.unsigned_abs(), denom.unsigned_abs());
        let g = i64::try_from(g).map_err(|_| ArithmeticFault::Overflow)?;
        let (mut n, mut d) = (numer / g, denom / g);
        if d < 0 {
            n = n.checked_neg().ok_or(ArithmeticFault::Overflow)?;
            d = d.checked_neg().ok_or(ArithmeticFault::Overflow)?;
        }
        Ok(Self { numer: n, denom: d })
    }

    /// Numerator in lowest terms.
    #[must_use]
    pub fn numer(self) -> i64 {
        self.numer
    }

    /// Denominator in lowest terms (always positive).
    #[must_use]
    pub fn denom(self) -> i64 {
        self.denom
    }

    /// Whether the value is a whole number.
    #[must_use]
    pub fn is_integer(self) -> bool {
        self.denom == 1
    }

    /// Nearest `f64`.
    #[must_use]
    #[allow(clippy::cast_precision_loss)]
    pub fn to_f64(self) -> f64 {
        self.numer as f64 / self.denom as f64
    }

    /// Absolute distance to `other` as a float.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (self.to_f64() - other.to_f64()).abs()
    }

    fn checked_add(self, rhs: Self) -> Result<Self, ArithmeticFault> {
        let n = mul(self.numer, rhs.denom)?
            .checked_add(mul(rhs.numer, self.denom)?)
            .ok_or(ArithmeticFault::Overflow)?;
        Self::ratio(n, mul(self.denom, rhs.denom)?)
    }

    fn checked_sub(self, rhs: Self) -> Result<Self, ArithmeticFault> {
        self.checked_add(rhs.checked_neg()?)
    }

    fn checked_mul(self, rhs: Self) -> Result<Self, ArithmeticFault> {
        Self::ratio(mul(self.numer, rhs.numer)?, mul(self.denom, rhs.denom)?)
    }

    fn checked_div(self, rhs: Self) -> Result<Self, ArithmeticFault> {
        if rhs.numer == 0 {
            return Err(ArithmeticFault::DivisionByZero);
        }
        Self::ratio(mul(self.numer, rhs.denom)?, mul(self.denom, rhs.numer)?)
    }

    fn checked_neg(self) -> Result<Self, ArithmeticFault> {
        Ok(Self {
            numer: self.numer.checked_neg().ok_or(ArithmeticFault::Overflow)?,
            denom: self.denom,
        })
    }
}

impl PartialOrd for Value {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Value {
    fn cmp(&self, other: &Self) -> Ordering {
        let lhs = i128::from(self.numer) * i128::from(other.denom);
        let rhs = i128::from(other.numer) * i128::from(self.denom);
        lhs.cmp(&rhs)
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_integer() {
            write!(f, "{}", self.numer)
        } else {
            write!(f, "{}", self.to_f64())
        }
    }
}

/// Evaluate `text` as an arithmetic expression.
///
/// # Errors
///
/// [`EvalError::SyntaxInvalid`] if the text does not parse,
/// [`EvalError::ArithmeticInvalid`] on division by zero or overflow.
pub fn evaluate(text: &str) -> Result<Value, EvalError> {
    let chars: Vec<char> = text.chars().collect();
    let mut parser = Parser { chars: &chars, pos: 0 };
    let value = parser.expr()?;
    if parser.pos != chars.len() {
        return Err(parser.syntax("unexpected trailing input"));
    }
    Ok(value)
}

/// Recursive-descent parser over a character slice.
///
/// Recursion depth is bounded by the number of consecutive prefix signs.
struct Parser<'a> {
    chars: &'a [char],
    pos: usize,
}

impl Parser<'_> {
    fn peek(&self) -> Option<char> {
        self.chars.get(self.pos).copied()
    }

    fn syntax(&self, reason: &'static str) -> EvalError {
        EvalError::SyntaxInvalid {
            offset: self.pos,
            reason,
        }
    }

    fn expr(&mut self) -> Result<Value, EvalError> {
        let mut acc = self.term()?;
        while let Some(op @ ('+' | '-')) = self.peek() {
            self.pos += 1;
            let rhs = self.term()?;
            acc = if op == '+' { acc.checked_add(rhs) } else { acc.checked_sub(rhs) }
                .map_err(EvalError::ArithmeticInvalid)?;
        }
        Ok(acc)
    }

    fn term(&mut self) -> Result<Value, EvalError> {
        let mut acc = self.unary()?;
        while let Some(op @ ('*' | '/')) = self.peek() {
            self.pos += 1;
            let rhs = self.unary()?;
            acc = if op == '*' { acc.checked_mul(rhs) } else { acc.checked_div(rhs) }
                .map_err(EvalError::ArithmeticInvalid)?;
        }
        Ok(acc)
    }

    fn unary(&mut self) -> Result<Value, EvalError> {
        match self.peek() {
            Some('-') => {
                self.pos += 1;
                self.unary()?.checked_neg().map_err(EvalError::ArithmeticInvalid)
            }
            Some('+') => {
                self.pos += 1;
                self.unary()
            }
            _ => self.number(),
        }
    }

    fn number(&mut self) -> Result<Value, EvalError> {
        let start = self.pos;
        while self.peek().is_some_and(|c| c.is_ascii_digit()) {
            self.pos += 1;
        }
        let digits = &self.chars[start..self.pos];
        match digits {
            [] => Err(self.syntax("expected a number")),
            ['0', _, ..] => Err(EvalError::SyntaxInvalid {
                offset: start,
                reason: "leading zero in multi-digit literal",
            }),
            _ => {
                let mut n: i64 = 0;
                for &d in digits {
                    let digit = i64::from(d.to_digit(10).unwrap_or(0));
                    n = n
                        .checked_mul(10)
                        .and_then(|n| n.checked_add(digit))
                        .ok_or(EvalError::ArithmeticInvalid(ArithmeticFault::Overflow))?;
                }
                Ok(Value::integer(n))
            }
        }
    }
}

fn mul(a: i64, b: i64) -> Result<i64, ArithmeticFault> {
    a.checked_mul(b).ok_or(ArithmeticFault::Overflow)
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        (a, b) = (b, a % b);
    }
    a.max(1)
}
